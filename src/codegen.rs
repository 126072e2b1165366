mod dispatch;
mod error;
mod locals;
mod name_table;
mod string_collector;

use std::fmt::Display;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, instrument, trace, trace_span};

use crate::analysis::class_table::ClassOrigin;
use crate::analysis::{ClassDescriptor, ClassTable};
use crate::ast::ty::STRING;
use crate::ast::{Feature, Method, Program};
use crate::util::align_up;

pub use dispatch::DispatchTable;
pub use error::CodegenError;
pub use locals::LocalCounter;
pub use name_table::ClassNameTable;
pub use string_collector::{StringCollector, StringPool};

pub const GC_FLAG_LABEL: &str = "gc_flag";
pub const CLASS_NAME_TABLE_LABEL: &str = "class_name_table";

/// The type tag of a string object.
const STRING_TAG: usize = 1;

/// The size of an object header: the class id, the object size and the dispatch table pointer.
const HEADER_SIZE: usize = 12;

const WORD_SIZE: usize = 4;

/// The size of a string object without its characters: the header, the length word and the
/// terminating NUL byte.
const STRING_BASE_SIZE: usize = HEADER_SIZE + WORD_SIZE + 1;

pub fn class_name_label(id: usize) -> String {
    format!("class_name_{}", id)
}

pub fn string_const_label(idx: usize) -> String {
    format!("StringConst_{}", idx)
}

pub fn file_name_label(idx: usize) -> String {
    format!("file_name_{}", idx)
}

pub fn template_label(class: &str) -> String {
    format!("{}_template", class)
}

pub fn dispatch_table_label(class: &str) -> String {
    format!("{}_dispatch_table", class)
}

pub fn init_label(class: &str) -> String {
    format!("{}_init", class)
}

pub fn method_label(class: &str, method: &str) -> String {
    format!("{}.{}", class, method)
}

/// The size in bytes of a string object holding `len` bytes, padded to a word boundary.
pub const fn string_object_size(len: usize) -> usize {
    align_up(STRING_BASE_SIZE + len, WORD_SIZE)
}

/// The size in bytes of an instance of a class with `field_count` fields.
pub const fn instance_size(field_count: usize) -> usize {
    HEADER_SIZE + WORD_SIZE * field_count
}

/// Escapes a string for an `.asciiz` directive.
///
/// ASCII control characters without a named escape are written as three-digit octal escapes, so
/// the directive stays on one line and an embedded NUL is kept.
fn escape_asciiz(value: &str) -> String {
    let mut result = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            c if c.is_ascii_control() => result.push_str(&format!("\\{:03o}", c as u32)),
            c => result.push(c),
        }
    }

    result
}

#[derive(Debug, Default)]
struct Assembly {
    text: String,
}

impl Assembly {
    fn section(&mut self, name: &str) {
        self.text.push('\t');
        self.text.push_str(name);
        self.text.push('\n');
    }

    fn label(&mut self, label: &str) {
        self.text.push_str(label);
        self.text.push_str(":\n");
    }

    fn directive(&mut self, name: &str, arg: impl Display) {
        self.text.push_str(&format!("\t{}\t{}\n", name, arg));
    }

    fn word(&mut self, value: impl Display) {
        self.directive(".word", value);
    }

    fn globl(&mut self, label: &str) {
        self.directive(".globl", label);
    }

    fn comment(&mut self, comment: impl Display) {
        self.text.push_str(&format!("\t# {}\n", comment));
    }

    fn instr(&mut self, instr: &str) {
        self.text.push('\t');
        self.text.push_str(instr);
        self.text.push('\n');
    }
}

/// Emits the data segment (class metadata, string constants, object templates and dispatch
/// tables) and label stubs for the text segment.
///
/// The class table must have gone through the analysis without errors.
pub struct CodeGenerator<'a> {
    table: &'a ClassTable,
    program: &'a Program,
    gc: bool,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(table: &'a ClassTable, program: &'a Program) -> Self {
        Self {
            table,
            program,
            gc: false,
            cancel: None,
        }
    }

    /// Sets the garbage-collection flag word emitted at the start of the data segment.
    pub fn with_gc(self, gc: bool) -> Self {
        Self { gc, ..self }
    }

    pub fn with_cancellation(self, flag: &'a AtomicBool) -> Self {
        Self {
            cancel: Some(flag),
            ..self
        }
    }

    fn check_cancelled(&self) -> Result<(), CodegenError> {
        match self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(CodegenError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Writes the whole assembly to `out` in one go.
    ///
    /// Nothing is written if the generation fails before the output is complete.
    pub fn generate(&self, mut out: impl Write) -> Result<(), CodegenError> {
        let asm = self.render()?;
        out.write_all(asm.as_bytes())?;
        out.flush()?;

        Ok(())
    }

    #[instrument(level = "trace", skip_all)]
    pub fn render(&self) -> Result<String, CodegenError> {
        let names = ClassNameTable::new(self.table)?;
        let strings = StringCollector::collect(self.program);

        debug!(
            class_count = names.len(),
            string_count = strings.len(),
            "generating the data segment"
        );

        let mut asm = Assembly::default();

        self.emit_data_header(&mut asm);
        self.check_cancelled()?;

        self.emit_strings(&mut asm, &names, &strings);
        self.emit_class_name_table(&mut asm, &names);
        self.check_cancelled()?;

        let classes = self.classes_by_id(&names)?;

        for desc in &classes {
            self.check_cancelled()?;
            self.emit_template(&mut asm, &names, desc);
        }

        for desc in &classes {
            self.check_cancelled()?;
            self.emit_dispatch_table(&mut asm, desc);
        }

        self.check_cancelled()?;
        self.emit_text(&mut asm, &classes);

        Ok(asm.text)
    }

    fn classes_by_id(
        &self,
        names: &ClassNameTable,
    ) -> Result<Vec<&'a ClassDescriptor>, CodegenError> {
        names
            .iter()
            .map(|(_, name)| {
                self.table
                    .get_by_name(name)
                    .ok_or_else(|| CodegenError::MissingClass {
                        name: name.to_owned(),
                    })
            })
            .collect()
    }

    fn emit_data_header(&self, asm: &mut Assembly) {
        asm.section(".data");
        asm.globl(GC_FLAG_LABEL);
        asm.globl(CLASS_NAME_TABLE_LABEL);

        asm.label(GC_FLAG_LABEL);
        asm.word(if self.gc { 1 } else { 0 });
    }

    fn emit_string_record(&self, asm: &mut Assembly, label: &str, value: &str) {
        asm.label(label);
        asm.word(STRING_TAG);
        asm.word(string_object_size(value.len()));
        asm.word(dispatch_table_label(STRING));
        // the object size above counts bytes; the length word counts characters
        asm.word(value.chars().count());
        asm.directive(".asciiz", format_args!("\"{}\"", escape_asciiz(value)));
        asm.directive(".align", 2);
    }

    fn emit_strings(&self, asm: &mut Assembly, names: &ClassNameTable, strings: &StringPool) {
        for (id, name) in names.iter() {
            self.emit_string_record(asm, &class_name_label(id), name);
        }

        // the runtime reports errors against the source file name
        for (idx, file) in self.source_files().iter() {
            self.emit_string_record(asm, &file_name_label(idx), file);
        }

        for (idx, value) in strings.iter() {
            self.emit_string_record(asm, &string_const_label(idx), value);
        }
    }

    fn source_files(&self) -> StringPool {
        let mut files = StringPool::new();

        for file in self.program.classes.iter().filter_map(|class| class.file.as_deref()) {
            files.insert(file);
        }

        files
    }

    fn emit_class_name_table(&self, asm: &mut Assembly, names: &ClassNameTable) {
        asm.label(CLASS_NAME_TABLE_LABEL);

        for (id, _) in names.iter() {
            asm.word(class_name_label(id));
        }

        for (_, name) in names.iter() {
            asm.globl(&template_label(name));
        }
    }

    fn emit_template(&self, asm: &mut Assembly, names: &ClassNameTable, desc: &ClassDescriptor) {
        let name = desc.name();
        let field_count = desc.declared_field_count();

        trace!(class = %name, field_count, "emitting an object template");

        asm.label(&template_label(name));
        asm.word(names.id_of(name).unwrap_or_default());
        asm.word(instance_size(field_count));
        asm.word(dispatch_table_label(name));

        for _ in 0..field_count {
            asm.word(0);
        }
    }

    fn emit_dispatch_table(&self, asm: &mut Assembly, desc: &ClassDescriptor) {
        let span = trace_span!("emit_dispatch_table", class = %desc.name());
        let _guard = span.enter();

        let Some(class) = self.table.id_of(desc.name()) else { return };
        let dispatch_table = DispatchTable::new(self.table, class);
        let label = dispatch_table_label(desc.name());

        asm.globl(&label);
        asm.label(&label);

        for (class_name, method) in dispatch_table.iter() {
            asm.word(method_label(class_name, method));
        }
    }

    fn user_method(&self, desc: &ClassDescriptor, name: &str) -> Option<&'a Method> {
        let program: &'a Program = self.program;
        let decl = desc.decl(&program.classes)?;

        decl.features.iter().find_map(|feature| match feature {
            Feature::Method(method) if method.name == name => Some(method),
            _ => None,
        })
    }

    fn emit_text(&self, asm: &mut Assembly, classes: &[&ClassDescriptor]) {
        asm.section(".text");

        for desc in classes {
            asm.label(&init_label(desc.name()));
            asm.instr("jr\t$ra");
        }

        for desc in classes {
            if !matches!(desc.origin(), ClassOrigin::User(_)) {
                continue;
            }

            for method_name in desc.declared_methods() {
                let Some(method) = self.user_method(desc, method_name) else { continue };
                let local_count = LocalCounter::count(method);

                asm.label(&method_label(desc.name(), method_name));
                asm.comment(format_args!("locals: {}", local_count));
                asm.instr("jr\t$ra");
            }
        }
    }
}
