mod common;

use std::sync::atomic::AtomicBool;

use insta::assert_snapshot;
use paste::paste;
use pretty_assertions::assert_eq;

use bantam::analysis::class_table::MemberKind;
use bantam::analysis::{SemanticAnalyzer, TypeChecker};
use bantam::ast::ty::{HasTy, ResolvedTy};
use bantam::ast::{BinOpKind, Expr, Qualifier, Stmt, UnOpKind};
use bantam::errors::Diagnostics;
use bantam::position::{Position, Span};

use self::common::*;

fn assert_single_error(diagnostics: &[bantam::errors::Diagnostic], expected: &str) {
    let errors = errors(diagnostics);

    assert_eq!(errors.len(), 1, "expected exactly one error, got {:#?}", errors);
    assert!(
        errors[0].contains(expected),
        "the error `{}` does not mention `{}`",
        errors[0],
        expected
    );
}

#[test]
fn hierarchy_has_builtins_and_user_classes() {
    let mut program = program(vec![
        main_class(vec![]),
        class("A", None, vec![]),
        class("B", Some("A"), vec![]),
    ]);

    let (table, diagnostics) = analyze(&mut program);

    assert!(errors(&diagnostics).is_empty());
    assert_eq!(table.len(), 3 + 4);

    for (id, desc) in table.iter() {
        let (last, _) = table.ancestors(id).last().unwrap();
        assert_eq!(last, table.root(), "{} is not rooted at Object", desc.name());
    }

    let b = table.id_of("B").unwrap();
    let a = table.id_of("A").unwrap();
    assert_eq!(table.get(b).unwrap().parent(), Some(a));
    assert_eq!(table.get(a).unwrap().parent(), Some(table.root()));
    assert!(table.get(a).unwrap().children().contains(&b));
}

#[test]
fn two_class_cycle_is_repaired() {
    let mut program = program(vec![
        main_class(vec![]),
        class("A", Some("B"), vec![]),
        class("B", Some("A"), vec![]),
    ]);

    let (table, diagnostics) = analyze(&mut program);

    assert_single_error(&diagnostics, "inheritance cycle");

    let root = Some(table.root());
    assert_eq!(table.get_by_name("A").unwrap().parent(), root);
    assert_eq!(table.get_by_name("B").unwrap().parent(), root);
}

#[test]
fn missing_superclass_falls_back_to_object() {
    let mut program = program(vec![main_class(vec![]), class("A", Some("B"), vec![])]);

    let (table, diagnostics) = analyze(&mut program);

    assert_single_error(&diagnostics, "missing superclass");
    assert_eq!(table.get_by_name("A").unwrap().parent(), Some(table.root()));
}

#[test]
fn final_superclass_is_reported_but_linked() {
    let mut program = program(vec![main_class(vec![]), class("A", Some("String"), vec![])]);

    let (table, diagnostics) = analyze(&mut program);

    assert_single_error(&diagnostics, "illegal superclass");
    assert_eq!(
        table.get_by_name("A").unwrap().parent(),
        table.id_of("String")
    );
}

#[test]
fn duplicate_classes_keep_the_first_definition() {
    let mut program = program(vec![
        main_class(vec![]),
        class("A", None, vec![field("x", "int", None)]),
        class("A", None, vec![field("y", "int", None)]),
    ]);

    let (table, diagnostics) = analyze(&mut program);

    assert_single_error(&diagnostics, "class `A` is already defined");

    let a = table.get_by_name("A").unwrap();
    assert!(a.fields().peek("x").is_some());
    assert!(a.fields().peek("y").is_none());
}

#[test]
fn builtin_classes_cannot_be_redefined() {
    let mut program = program(vec![main_class(vec![]), class("TextIO", None, vec![])]);

    let (table, diagnostics) = analyze(&mut program);

    assert_single_error(&diagnostics, "built-in class `TextIO`");
    assert!(table.get_by_name("TextIO").unwrap().is_builtin());
}

#[test]
fn members_are_bound_per_class() {
    let mut program = program(vec![
        main_class(vec![]),
        class(
            "A",
            None,
            vec![
                field("x", "int", None),
                method("get", "int", &[], vec![ret(Some(var("x")))]),
            ],
        ),
        class("B", Some("A"), vec![field("y", "boolean", None)]),
    ]);

    let (table, diagnostics) = analyze(&mut program);
    assert!(errors(&diagnostics).is_empty(), "{:#?}", diagnostics);

    let a = table.id_of("A").unwrap();
    let b = table.id_of("B").unwrap();
    let b_desc = table.get(b).unwrap();

    assert_eq!(b_desc.fields().peek("this").unwrap().ty, "B");
    assert_eq!(b_desc.fields().peek("super").unwrap().ty, "A");
    assert_eq!(b_desc.declared_field_count(), 1);
    assert_eq!(
        table
            .get(a)
            .unwrap()
            .members()
            .iter()
            .map(|member| (member.kind, member.name.as_str()))
            .collect::<Vec<_>>(),
        vec![(MemberKind::Field, "x"), (MemberKind::Method, "get")]
    );

    // inherited members are found through lookup, not copied
    assert!(b_desc.fields().peek("x").is_none());
    assert_eq!(table.lookup_field(b, "x").map(|(id, _)| id), Some(a));
    assert_eq!(table.lookup_method(b, "get").map(|(id, _)| id), Some(a));
    assert_eq!(
        table.lookup_method(b, "equals").map(|(id, _)| id),
        Some(table.root())
    );

    // the pseudo-bindings of a class are not visible from its subclasses
    assert_eq!(table.lookup_field(b, "this").unwrap().1.ty, "B");
}

#[test]
fn duplicate_and_reserved_members_are_rejected() {
    let mut program = program(vec![
        main_class(vec![]),
        class(
            "A",
            None,
            vec![
                field("x", "int", None),
                field("x", "boolean", None),
                field("super", "int", None),
            ],
        ),
    ]);

    let (table, diagnostics) = analyze(&mut program);
    let errors = errors(&diagnostics);

    assert_eq!(errors.len(), 2, "{:#?}", errors);
    assert!(errors[0].contains("field `x` is already defined"));
    assert!(errors[1].contains("reserved name"));

    let a = table.get_by_name("A").unwrap();
    assert_eq!(a.fields().peek("x").unwrap().ty, "int");
    assert_eq!(a.declared_field_count(), 1);
}

#[test]
fn subtype_relation() {
    let mut program = program(vec![
        main_class(vec![]),
        class("A", None, vec![]),
        class("B", Some("A"), vec![]),
        class("C", Some("B"), vec![]),
    ]);

    let (table, _) = analyze(&mut program);
    let ty = |name: &str| ResolvedTy::class(name);

    for (_, desc) in table.iter() {
        let class = ty(desc.name());

        assert!(table.is_subtype(&class, &class));
        assert!(table.is_subtype(&class, &ResolvedTy::object()));

        if desc.name() != "Object" {
            assert!(!table.is_subtype(&ResolvedTy::object(), &class));
        }
    }

    assert!(table.is_subtype(&ty("C"), &ty("A")));
    assert!(!table.is_subtype(&ty("A"), &ty("C")));
    assert!(!table.is_subtype(&ty("Main"), &ty("A")));

    assert!(table.is_subtype(&ResolvedTy::Null, &ty("C")));
    assert!(table.is_subtype(&ResolvedTy::Null, &ResolvedTy::array_of(ResolvedTy::Int)));
    assert!(!table.is_subtype(&ResolvedTy::Null, &ResolvedTy::Int));

    let c_array = ResolvedTy::array_of(ty("C"));
    let a_array = ResolvedTy::array_of(ty("A"));
    assert!(table.is_subtype(&c_array, &a_array));
    assert!(!table.is_subtype(&a_array, &c_array));
    assert!(table.is_subtype(&c_array, &ResolvedTy::object()));
    assert!(!table.is_subtype(
        &ResolvedTy::array_of(ResolvedTy::Int),
        &ResolvedTy::array_of(ResolvedTy::Boolean)
    ));
}

#[test]
fn incompatible_assignment_keeps_the_declared_type() {
    let mut program = main_program(vec![
        decl("x", "int", None),
        expr_stmt(assign("x", string("hello"))),
    ]);

    let (_, diagnostics) = analyze(&mut program);

    assert_single_error(&diagnostics, "incompatible types");

    let Stmt::Expr(stmt) = &method_body(&program, "Main", "main")[1] else {
        panic!("expected an expression statement");
    };
    assert_eq!(stmt.expr.ty(), Some(&ResolvedTy::Int));
}

#[test]
fn rerunning_the_type_checker_is_idempotent() {
    let mut program = main_program(vec![
        decl("io", "TextIO", Some(new("TextIO"))),
        expr_stmt(call(
            Some(call(Some(var("io")), "putString", vec![string("n = ")])),
            "putInt",
            vec![int(42)],
        )),
    ]);

    let (table, diagnostics) = analyze(&mut program);
    assert!(diagnostics.is_empty(), "{:#?}", diagnostics);

    let annotated = program.clone();
    let mut diagnostics = Diagnostics::new();
    TypeChecker::new(&mut diagnostics, &table)
        .check(&mut program)
        .unwrap();

    assert!(diagnostics.is_empty());
    assert_eq!(program, annotated);
}

#[test]
fn cancelled_analysis_publishes_nothing() {
    let cancel = AtomicBool::new(true);
    let mut program = main_program(vec![]);
    let mut diagnostics = Diagnostics::new();

    let result = SemanticAnalyzer::new(&mut diagnostics)
        .with_cancellation(&cancel)
        .analyze(&mut program);

    assert!(result.is_err());
    assert!(diagnostics.is_empty());
}

#[test]
fn main_alone_is_a_valid_entry_point() {
    let mut program = main_program(vec![]);

    let (table, diagnostics) = analyze(&mut program);

    assert!(diagnostics.is_empty(), "{:#?}", diagnostics);

    for name in ["Object", "String", "Sys", "Main", "TextIO"] {
        assert!(table.contains(name), "{} is missing", name);
    }
}

#[test]
fn missing_main_class_is_fatal() {
    let mut program = program(vec![class("A", None, vec![])]);

    let (_, diagnostics) = analyze(&mut program);

    assert_single_error(&diagnostics, "no `Main` class");
    assert_eq!(fatal_count(&diagnostics), 1);
}

#[test]
fn main_method_must_take_no_parameters() {
    let mut program = program(vec![class(
        "Main",
        None,
        vec![method("main", "void", &[("args", "int")], vec![])],
    )]);

    let (_, diagnostics) = analyze(&mut program);

    assert_single_error(&diagnostics, "invalid signature");
    assert_eq!(fatal_count(&diagnostics), 0);
}

#[test]
fn main_method_may_be_inherited() {
    let mut program = program(vec![
        class("Base", None, vec![method("main", "void", &[], vec![])]),
        class("Main", Some("Base"), vec![]),
    ]);

    let (_, diagnostics) = analyze(&mut program);

    assert!(diagnostics.is_empty(), "{:#?}", diagnostics);
}

#[test]
fn missing_main_method() {
    let mut program = program(vec![class("Main", None, vec![])]);

    let (_, diagnostics) = analyze(&mut program);

    assert_single_error(&diagnostics, "method named `main`");
}

#[test]
fn overrides_must_keep_the_signature() {
    let mut program = program(vec![
        main_class(vec![]),
        class(
            "Base",
            None,
            vec![method("m", "int", &[("x", "int")], vec![ret(Some(var("x")))])],
        ),
        class(
            "Derived",
            Some("Base"),
            vec![method("m", "boolean", &[("x", "int")], vec![ret(Some(boolean(true)))])],
        ),
    ]);

    let (_, diagnostics) = analyze(&mut program);

    assert_single_error(&diagnostics, "invalid override");
}

#[test]
fn override_signatures_compare_resolved_types() {
    let mut program = program(vec![
        main_class(vec![]),
        class("A", None, vec![]),
        class(
            "Base",
            None,
            vec![method("m", "int[]", &[("xs", "A[]")], vec![ret(Some(new_array("int", int(1))))])],
        ),
        class(
            "Derived",
            Some("Base"),
            vec![method("m", "int []", &[("xs", "A []")], vec![ret(Some(new_array("int", int(2))))])],
        ),
    ]);

    let (_, diagnostics) = analyze(&mut program);

    assert!(errors(&diagnostics).is_empty(), "{:#?}", diagnostics);
}

#[test]
fn override_with_a_different_element_type_is_rejected() {
    let mut program = program(vec![
        main_class(vec![]),
        class("A", None, vec![]),
        class("Base", None, vec![method("m", "void", &[("xs", "A[]")], vec![])]),
        class("Derived", Some("Base"), vec![method("m", "void", &[("xs", "Object []")], vec![])]),
    ]);

    let (_, diagnostics) = analyze(&mut program);

    assert_single_error(&diagnostics, "invalid override");
}

#[test]
fn diagnostics_report_their_line() {
    let mut duplicate = class("A", None, vec![]);
    duplicate.span = Span {
        start: Position {
            byte: 40,
            line: 7,
            col: 1,
        },
        end: Position {
            byte: 49,
            line: 7,
            col: 10,
        },
    };

    let mut program = program(vec![main_class(vec![]), class("A", None, vec![]), duplicate]);

    let (_, diagnostics) = analyze(&mut program);
    let lines = diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.level.is_error())
        .map(|diagnostic| diagnostic.line())
        .collect::<Vec<_>>();

    assert_eq!(lines, vec![Some(7)]);
}

#[test]
fn fields_are_visible_in_methods_and_through_objects() {
    let mut program = program(vec![
        main_class(vec![
            decl("p", "Point", Some(new("Point"))),
            decl("sum", "int", Some(bin_op(BinOpKind::Add, member(var("p"), "x"), int(1)))),
        ]),
        class(
            "Point",
            None,
            vec![
                field("x", "int", Some(int(0))),
                method(
                    "set",
                    "void",
                    &[("x", "int")],
                    vec![expr_stmt(assign_qualified(Qualifier::This, "x", var("x")))],
                ),
            ],
        ),
    ]);

    let (_, diagnostics) = analyze(&mut program);

    assert!(diagnostics.is_empty(), "{:#?}", diagnostics);
}

macro_rules! well_typed_tests {
    ($( $name:ident: [$( $stmt:expr ),* $(,)?]; )+) => {
        $(
            paste! {
                #[test]
                fn [<accepts_ $name>]() {
                    let mut program = main_program(vec![$( $stmt ),*]);
                    let (_, diagnostics) = analyze(&mut program);

                    assert!(diagnostics.is_empty(), "{:#?}", diagnostics);
                }
            }
        )+
    };
}

macro_rules! ill_typed_tests {
    ($( $name:ident: [$( $stmt:expr ),* $(,)?] => $expected:literal; )+) => {
        $(
            paste! {
                #[test]
                fn [<rejects_ $name>]() {
                    let mut program = main_program(vec![$( $stmt ),*]);
                    let (_, diagnostics) = analyze(&mut program);

                    assert_single_error(&diagnostics, $expected);
                }
            }
        )+
    };
}

well_typed_tests! {
    break_in_while: [while_stmt(boolean(true), block(vec![brk()]))];
    break_in_for: [for_stmt(None, None, None, brk())];
    null_for_objects: [decl("o", "Object", Some(var("null")))];
    array_length: [
        decl("a", "int[]", Some(new_array("int", int(3)))),
        decl("n", "int", Some(member(var("a"), "length"))),
        expr_stmt(elem("a", var("n"))),
    ];
    covariant_arrays: [decl("a", "Object[]", Some(new_array("Main", int(2))))];
    upcast_on_assignment: [decl("o", "Object", Some(new("Main")))];
    string_compared_to_null: [decl("b", "boolean", Some(bin_op(BinOpKind::Equals, string("s"), var("null"))))];
    downcast: [decl("s", "String", Some(cast("String", new("Object"))))];
    this_has_the_class_type: [decl("m", "Main", Some(var("this")))];
    instanceof_subclass: [decl("b", "boolean", Some(instanceof(new("Object"), "Main")))];
    dispatch_chain: [
        decl("io", "TextIO", Some(new("TextIO"))),
        expr_stmt(call(Some(call(Some(var("io")), "putString", vec![string("x")])), "putInt", vec![int(1)])),
    ];
    dispatch_on_arrays: [
        decl("a", "int[]", Some(new_array("int", int(1)))),
        decl("s", "String", Some(call(Some(var("a")), "toString", vec![]))),
    ];
    nested_scopes: [
        decl("x", "int", None),
        block(vec![decl("y", "int", Some(var("x")))]),
        block(vec![decl("y", "boolean", Some(boolean(false)))]),
    ];
    logic_and_negation: [
        decl("b", "boolean", Some(bin_op(BinOpKind::And, boolean(true), un_op(UnOpKind::Not, boolean(false))))),
        if_stmt(var("b"), block(vec![]), Some(block(vec![]))),
    ];
    bare_return_in_void: [ret(None)];
    array_element_assignment: [
        decl("a", "int[]", Some(new_array("int", int(3)))),
        decl("i", "int", Some(int(0))),
        decl("v", "int", Some(int(7))),
        expr_stmt(array_assign("a", var("i"), var("v"))),
    ];
}

ill_typed_tests! {
    break_outside_loop: [brk()] => "outside of a loop";
    unknown_name: [expr_stmt(var("y"))] => "unrecognized name `y`";
    int_plus_boolean: [decl("x", "int", Some(bin_op(BinOpKind::Add, int(1), boolean(true))))] => "operator `+`";
    non_boolean_condition: [if_stmt(int(1), block(vec![]), None)] => "incompatible types";
    non_boolean_loop_condition: [while_stmt(int(1), block(vec![]))] => "incompatible types";
    unknown_method: [expr_stmt(call(None, "foo", vec![]))] => "method not found";
    wrong_argument_count: [expr_stmt(call(Some(new("Object")), "equals", vec![]))] => "takes 1 argument";
    inexact_primitive_argument: [
        expr_stmt(call(Some(string("abc")), "substring", vec![boolean(true), int(1)]))
    ] => "must be exactly `int`";
    unrelated_cast: [expr_stmt(cast("String", new("TextIO")))] => "illegal cast";
    instanceof_supertype: [expr_stmt(instanceof(string("abc"), "Object"))] => "illegal instanceof";
    unknown_class_instantiation: [expr_stmt(new("Foo"))] => "`Foo` is not recognized";
    return_value_from_void: [ret(Some(int(1)))] => "cannot return a value";
    duplicate_local: [decl("x", "int", None), decl("x", "int", None)] => "already defined";
    reserved_local: [decl("this", "int", None)] => "reserved name";
    void_local: [decl("x", "void", None)] => "type `void`";
    unknown_local_type: [decl("x", "Foo", None)] => "`Foo` is not recognized";
    non_int_array_size: [expr_stmt(new_array("int", boolean(true)))] => "incompatible types";
    indexing_a_non_array: [decl("x", "int", None), expr_stmt(elem("x", int(0)))] => "not an array type";
    assigning_to_this: [expr_stmt(assign("this", new("Main")))] => "cannot be assigned";
    negating_a_boolean: [expr_stmt(un_op(UnOpKind::Negate, boolean(true)))] => "operator `-`";
    primitive_receiver: [expr_stmt(call(Some(int(1)), "toString", vec![]))] => "cannot call the method";
    no_such_field: [expr_stmt(member(new("Object"), "x"))] => "does not have a field named `x`";
    comparing_boolean_with_int: [expr_stmt(bin_op(BinOpKind::LessThan, boolean(true), int(1)))] => "incompatible types";
    greater_than_on_booleans: [expr_stmt(bin_op(BinOpKind::GreaterThan, boolean(true), boolean(false)))] => "incompatible types";
    less_equals_on_strings: [expr_stmt(bin_op(BinOpKind::LessEquals, string("a"), string("b")))] => "incompatible types";
    greater_equals_on_boolean: [expr_stmt(bin_op(BinOpKind::GreaterEquals, int(1), boolean(true)))] => "incompatible types";
    equality_of_unrelated_classes: [expr_stmt(bin_op(BinOpKind::Equals, new("TextIO"), new("Sys")))] => "incompatible types";
    inequality_of_int_and_boolean: [expr_stmt(bin_op(BinOpKind::NotEquals, int(0), boolean(false)))] => "incompatible types";
    or_with_int_operand: [expr_stmt(bin_op(BinOpKind::Or, int(0), boolean(true)))] => "incompatible types";
    and_with_int_operand: [expr_stmt(bin_op(BinOpKind::And, boolean(true), int(1)))] => "incompatible types";
    not_on_int: [expr_stmt(un_op(UnOpKind::Not, int(1)))] => "incompatible types";
    incrementing_a_boolean: [expr_stmt(un_op(UnOpKind::Increment, boolean(true)))] => "incompatible types";
    decrementing_a_boolean: [expr_stmt(un_op(UnOpKind::Decrement, boolean(true)))] => "incompatible types";
    boolean_array_index: [
        decl("a", "int[]", Some(new_array("int", int(1)))),
        expr_stmt(array_assign("a", boolean(true), int(1))),
    ] => "incompatible types";
    array_element_mismatch: [
        decl("a", "int[]", Some(new_array("int", int(1)))),
        expr_stmt(array_assign("a", int(0), boolean(true))),
    ] => "incompatible types";
    assigning_into_a_non_array: [
        decl("x", "int", None),
        expr_stmt(array_assign("x", int(0), int(1))),
    ] => "not an array type";
}

#[test]
fn unknown_method_falls_back_to_object() {
    let mut program = main_program(vec![expr_stmt(call(None, "foo", vec![]))]);

    analyze(&mut program);

    let Stmt::Expr(stmt) = &method_body(&program, "Main", "main")[0] else {
        panic!("expected an expression statement");
    };
    assert_eq!(stmt.expr.ty(), Some(&ResolvedTy::object()));
}

#[test]
fn cast_result_is_the_target_type() {
    let mut program = main_program(vec![expr_stmt(cast("String", new("TextIO")))]);

    analyze(&mut program);

    let Stmt::Expr(stmt) = &method_body(&program, "Main", "main")[0] else {
        panic!("expected an expression statement");
    };
    assert!(matches!(&*stmt.expr, Expr::Cast(_)));
    assert_eq!(stmt.expr.ty(), Some(&ResolvedTy::string()));
}

#[test]
fn hierarchy_tree_dump() {
    let mut program = program(vec![
        main_class(vec![]),
        class("A", None, vec![]),
        class("B", Some("A"), vec![]),
        class("C", Some("A"), vec![]),
    ]);

    let (table, _) = analyze(&mut program);
    let mut out = vec![];
    table.write_tree(&mut out).unwrap();

    assert_snapshot!(String::from_utf8(out).unwrap(), @r###"
    Object
      String
      Sys
      TextIO
      Main
      A
        B
        C
    "###);
}

#[test]
fn program_trees_load_from_ron() {
    let mut program = bantam::ast::dump::load_ast(
        r#"
        Program(classes: [
            Class(name: "Main", features: [
                Field(Field(name: "count", ty: "int")),
                Method(Method(name: "main", return_ty: "void", body: [
                    Expr(ExprStmt(expr: Assign(AssignExpr(
                        name: "count",
                        expr: Int(IntLit(value: 1)),
                    )))),
                ])),
            ]),
        ])
        "#,
    )
    .unwrap();

    let (table, diagnostics) = analyze(&mut program);

    assert!(diagnostics.is_empty(), "{:#?}", diagnostics);
    assert_eq!(table.get_by_name("Main").unwrap().declared_field_count(), 1);
}
