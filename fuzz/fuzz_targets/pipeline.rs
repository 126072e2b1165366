#![no_main]

use libfuzzer_sys::fuzz_target;

use bantam::analysis::{AnalysisResult, SemanticAnalyzer};
use bantam::ast::dump::load_ast;
use bantam::codegen::CodeGenerator;
use bantam::errors::Diagnostics;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else { return };
    let Ok(mut program) = load_ast(text) else { return };

    let mut diagnostics = Diagnostics::new();
    let Ok(AnalysisResult { class_table }) =
        SemanticAnalyzer::new(&mut diagnostics).analyze(&mut program)
    else {
        return;
    };

    if !diagnostics.has_errors() {
        let _ = CodeGenerator::new(&class_table, &program).render();
    }
});
