pub mod analysis;
pub mod ast;
pub mod codegen;
pub mod errors;
pub mod position;
pub mod util;
