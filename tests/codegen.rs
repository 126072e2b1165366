mod common;

use std::io::{self, Write};
use std::sync::atomic::AtomicBool;

use pretty_assertions::{assert_eq, assert_str_eq};

use bantam::analysis::ClassTable;
use bantam::ast::Program;
use bantam::codegen::{CodeGenerator, CodegenError, DispatchTable, LocalCounter, StringCollector};

use self::common::*;

fn compile(program: &mut Program) -> (ClassTable, String) {
    let (table, diagnostics) = analyze(program);
    assert!(errors(&diagnostics).is_empty(), "{:#?}", diagnostics);

    let asm = CodeGenerator::new(&table, program).render().unwrap();

    (table, asm)
}

struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "the pipe is closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn main_template() {
    let (_, asm) = compile(&mut main_program(vec![]));

    assert!(
        asm.contains("Main_template:\n\t.word\t3\n\t.word\t12\n\t.word\tMain_dispatch_table\n"),
        "{}",
        asm
    );
    assert!(asm.contains("\t.globl\tMain_template\n"));
    assert!(asm.contains("\t.globl\tMain_dispatch_table\nMain_dispatch_table:\n"));
}

#[test]
fn data_segment_header() {
    let mut program = main_program(vec![]);
    let (table, _) = analyze(&mut program);

    let asm = CodeGenerator::new(&table, &program).render().unwrap();
    assert!(asm.starts_with(
        "\t.data\n\t.globl\tgc_flag\n\t.globl\tclass_name_table\ngc_flag:\n\t.word\t0\n"
    ));

    let asm = CodeGenerator::new(&table, &program)
        .with_gc(true)
        .render()
        .unwrap();
    assert!(asm.contains("gc_flag:\n\t.word\t1\n"));
}

#[test]
fn class_names_come_in_id_order() {
    let (_, asm) = compile(&mut program(vec![
        main_class(vec![]),
        class("A", None, vec![]),
    ]));

    assert!(asm.contains(
        "class_name_table:\n\
         \t.word\tclass_name_0\n\
         \t.word\tclass_name_1\n\
         \t.word\tclass_name_2\n\
         \t.word\tclass_name_3\n\
         \t.word\tclass_name_4\n\
         \t.word\tclass_name_5\n"
    ));

    assert!(asm.contains(
        "class_name_3:\n\
         \t.word\t1\n\
         \t.word\t24\n\
         \t.word\tString_dispatch_table\n\
         \t.word\t4\n\
         \t.asciiz\t\"Main\"\n\
         \t.align\t2\n"
    ));
    assert!(asm.contains("class_name_5:\n\t.word\t1\n\t.word\t20\n"));
    assert!(asm.contains("A_template:\n\t.word\t5\n"));
}

#[test]
fn string_literals_become_string_constants() {
    let (_, asm) = compile(&mut main_program(vec![
        decl("s", "String", Some(string("hello"))),
        decl("t", "String", Some(string("hello"))),
        decl("u", "String", Some(string("a\"b"))),
    ]));

    assert!(
        asm.contains(
            "StringConst_0:\n\
             \t.word\t1\n\
             \t.word\t24\n\
             \t.word\tString_dispatch_table\n\
             \t.word\t5\n\
             \t.asciiz\t\"hello\"\n\
             \t.align\t2\n"
        ),
        "{}",
        asm
    );
    assert!(asm.contains("StringConst_1:\n"));
    assert!(asm.contains("\t.asciiz\t\"a\\\"b\"\n"));
    assert!(!asm.contains("StringConst_2:"));
}

#[test]
fn string_pool_deduplicates() {
    let program = main_program(vec![
        expr_stmt(string("x")),
        expr_stmt(call(Some(string("y")), "concat", vec![string("x")])),
    ]);

    let pool = StringCollector::collect(&program);

    assert_eq!(pool.iter().collect::<Vec<_>>(), vec![(0, "x"), (1, "y")]);
    assert_eq!(pool.get_index_of("y"), Some(1));
}

#[test]
fn templates_reserve_a_word_per_declared_field() {
    let (_, asm) = compile(&mut program(vec![
        main_class(vec![]),
        class(
            "Point",
            None,
            vec![field("x", "int", None), field("y", "int", Some(int(1)))],
        ),
        class("Point3", Some("Point"), vec![field("z", "int", None)]),
    ]));

    assert!(asm.contains(
        "Point_template:\n\
         \t.word\t5\n\
         \t.word\t20\n\
         \t.word\tPoint_dispatch_table\n\
         \t.word\t0\n\
         \t.word\t0\n"
    ));
    assert!(asm.contains(
        "Point3_template:\n\
         \t.word\t6\n\
         \t.word\t16\n\
         \t.word\tPoint3_dispatch_table\n\
         \t.word\t0\n"
    ));
}

#[test]
fn overrides_keep_their_slot() {
    let mut program = program(vec![
        main_class(vec![]),
        class(
            "Base",
            None,
            vec![
                method("m", "void", &[], vec![]),
                method("n", "void", &[], vec![]),
            ],
        ),
        class("Derived", Some("Base"), vec![method("m", "void", &[], vec![])]),
    ]);

    let (table, asm) = compile(&mut program);

    let base = DispatchTable::new(&table, table.id_of("Base").unwrap());
    let derived = DispatchTable::new(&table, table.id_of("Derived").unwrap());

    assert_eq!(base.len(), 5);
    assert_eq!(derived.len(), base.len());
    assert_eq!(base.get("m"), Some((3, "Base")));
    assert_eq!(derived.get("m"), Some((3, "Derived")));
    assert_eq!(derived.get("n"), Some((4, "Base")));
    assert_eq!(derived.get("clone"), Some((0, "Object")));

    assert_str_eq!(
        asm.split_once("Derived_dispatch_table:\n")
            .and_then(|(_, rest)| rest.split_once("\t.text\n"))
            .map(|(table, _)| table)
            .unwrap(),
        "\t.word\tObject.clone\n\
         \t.word\tObject.equals\n\
         \t.word\tObject.toString\n\
         \t.word\tDerived.m\n\
         \t.word\tBase.n\n"
    );
}

#[test]
fn builtin_dispatch_tables_inherit_from_object() {
    let (table, _) = compile(&mut main_program(vec![]));

    let string = DispatchTable::new(&table, table.id_of("String").unwrap());
    let methods = string
        .iter()
        .map(|(class, method)| format!("{}.{}", class, method))
        .collect::<Vec<_>>();

    assert_eq!(
        methods,
        vec![
            "Object.clone",
            "String.equals",
            "String.toString",
            "String.length",
            "String.substring",
            "String.concat",
        ]
    );
}

#[test]
fn locals_include_parameters_and_nested_declarations() {
    let mut program = program(vec![
        main_class(vec![]),
        class(
            "A",
            None,
            vec![method(
                "f",
                "int",
                &[("a", "int")],
                vec![
                    decl("b", "int", None),
                    block(vec![decl("c", "int", None)]),
                    ret(Some(var("a"))),
                ],
            )],
        ),
    ]);

    let (_, asm) = compile(&mut program);

    assert!(asm.contains("A.f:\n\t# locals: 3\n\tjr\t$ra\n"), "{}", asm);

    let bantam::ast::Feature::Method(f) = &program.classes[1].features[0] else {
        panic!("expected a method");
    };
    assert_eq!(LocalCounter::count(f), 3);
}

#[test]
fn text_section_stubs() {
    let (_, asm) = compile(&mut main_program(vec![]));

    let (_, text) = asm.split_once("\t.text\n").unwrap();

    assert_str_eq!(
        text,
        "Object_init:\n\
         \tjr\t$ra\n\
         String_init:\n\
         \tjr\t$ra\n\
         Sys_init:\n\
         \tjr\t$ra\n\
         Main_init:\n\
         \tjr\t$ra\n\
         TextIO_init:\n\
         \tjr\t$ra\n\
         Main.main:\n\
         \t# locals: 0\n\
         \tjr\t$ra\n"
    );
}

#[test]
fn missing_main_class_is_reported() {
    let mut program = program(vec![class("A", None, vec![])]);
    let (table, _) = analyze(&mut program);

    let result = CodeGenerator::new(&table, &program).render();

    assert!(matches!(
        result,
        Err(CodegenError::MissingClass { name }) if name == "Main"
    ));
}

#[test]
fn cancelled_generation_writes_nothing() {
    let mut program = main_program(vec![]);
    let (table, _) = analyze(&mut program);
    let cancel = AtomicBool::new(true);
    let mut out = vec![];

    let result = CodeGenerator::new(&table, &program)
        .with_cancellation(&cancel)
        .generate(&mut out);

    assert!(matches!(result, Err(CodegenError::Cancelled)));
    assert!(out.is_empty());
}

#[test]
fn write_failures_are_io_errors() {
    let mut program = main_program(vec![]);
    let (table, _) = analyze(&mut program);

    let result = CodeGenerator::new(&table, &program).generate(FailingWriter);

    assert!(matches!(result, Err(CodegenError::Io(_))));
}

#[test]
fn generate_matches_render() {
    let mut program = main_program(vec![expr_stmt(string("hi"))]);
    let (table, asm) = compile(&mut program);
    let mut out = vec![];

    CodeGenerator::new(&table, &program)
        .generate(&mut out)
        .unwrap();

    assert_str_eq!(String::from_utf8(out).unwrap(), asm);
}

#[test]
fn control_characters_stay_on_one_line() {
    let (_, asm) = compile(&mut main_program(vec![expr_stmt(string("a\rb\u{0}c"))]));

    assert!(!asm.contains('\r'));
    assert!(!asm.contains('\u{0}'));
    assert!(
        asm.contains(
            "StringConst_0:\n\
             \t.word\t1\n\
             \t.word\t24\n\
             \t.word\tString_dispatch_table\n\
             \t.word\t5\n\
             \t.asciiz\t\"a\\015b\\000c\"\n"
        ),
        "{}",
        asm
    );
}

#[test]
fn length_word_counts_characters() {
    let (_, asm) = compile(&mut main_program(vec![expr_stmt(string("h\u{e9}llo"))]));

    // six bytes, five characters
    assert!(
        asm.contains(
            "StringConst_0:\n\
             \t.word\t1\n\
             \t.word\t24\n\
             \t.word\tString_dispatch_table\n\
             \t.word\t5\n"
        ),
        "{}",
        asm
    );
}

#[test]
fn source_file_names_get_string_records() {
    let mut other = class("A", None, vec![]);
    other.file = Some("other.btm".to_owned());

    let (_, asm) = compile(&mut program(vec![
        main_class(vec![expr_stmt(string("x"))]),
        class("B", None, vec![]),
        other,
    ]));

    assert!(asm.contains(
        "file_name_0:\n\
         \t.word\t1\n\
         \t.word\t28\n\
         \t.word\tString_dispatch_table\n\
         \t.word\t8\n\
         \t.asciiz\t\"test.btm\"\n"
    ));
    assert!(asm.contains("file_name_1:\n"));
    assert!(asm.contains("\t.asciiz\t\"other.btm\"\n"));
    assert!(!asm.contains("file_name_2:"));

    let file_names = asm.find("file_name_0:").unwrap();
    assert!(asm.find("class_name_6:").unwrap() < file_names);
    assert!(file_names < asm.find("StringConst_0:").unwrap());
}
