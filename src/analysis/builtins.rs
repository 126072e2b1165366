use once_cell::sync::Lazy;
use phf::phf_set;

use crate::ast::{Class, Expr, Feature, Field, Formal, IntLit, Method};
use crate::position::Span;

/// Identifiers that cannot name a class, member or variable.
pub static RESERVED_NAMES: phf::Set<&'static str> = phf_set! {
    "null",
    "this",
    "super",
    "void",
    "int",
    "boolean",
};

pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(name)
}

/// Classes the runtime provides.
///
/// `Object` comes first; the others extend it and cannot be subclassed.
pub static BUILTIN_CLASSES: Lazy<Vec<Class>> = Lazy::new(|| {
    vec![
        builtin_class(
            "Object",
            None,
            vec![
                method("clone", "Object", &[]),
                method("equals", "boolean", &[("o", "Object")]),
                method("toString", "String", &[]),
            ],
        ),
        builtin_class(
            "String",
            Some("Object"),
            vec![
                field("length", "int", None),
                method("length", "int", &[]),
                method("equals", "boolean", &[("str", "Object")]),
                method("toString", "String", &[]),
                method("substring", "String", &[("beginIndex", "int"), ("endIndex", "int")]),
                method("concat", "String", &[("str", "String")]),
            ],
        ),
        builtin_class(
            "Sys",
            Some("Object"),
            vec![
                method("exit", "void", &[("status", "int")]),
                method("time", "int", &[]),
                method("random", "int", &[]),
            ],
        ),
        builtin_class(
            "TextIO",
            Some("Object"),
            vec![
                field("readFD", "int", None),
                field("writeFD", "int", Some(1)),
                method("readStdin", "void", &[]),
                method("readFile", "void", &[("readFile", "String")]),
                method("writeStdout", "void", &[]),
                method("writeStderr", "void", &[]),
                method("writeFile", "void", &[("writeFile", "String")]),
                method("getString", "String", &[]),
                method("getInt", "int", &[]),
                method("putString", "TextIO", &[("output", "String")]),
                method("putInt", "TextIO", &[("output", "int")]),
            ],
        ),
    ]
});

fn builtin_class(name: &str, parent: Option<&str>, features: Vec<Feature>) -> Class {
    Class {
        name: name.to_owned(),
        parent: parent.map(str::to_owned),
        features,
        file: None,
        span: Span::default(),
    }
}

fn field(name: &str, ty: &str, init: Option<i32>) -> Feature {
    Feature::Field(Field {
        name: name.to_owned(),
        ty: ty.to_owned(),
        init: init.map(|value| {
            Box::new(Expr::Int(IntLit {
                value,
                ty: None,
                span: Span::default(),
            }))
        }),
        span: Span::default(),
    })
}

fn method(name: &str, return_ty: &str, params: &[(&str, &str)]) -> Feature {
    Feature::Method(Method {
        name: name.to_owned(),
        return_ty: return_ty.to_owned(),
        params: params
            .iter()
            .map(|&(name, ty)| Formal {
                name: name.to_owned(),
                ty: ty.to_owned(),
                span: Span::default(),
            })
            .collect(),
        body: vec![],
        span: Span::default(),
    })
}
