#![allow(dead_code)]

use bantam::analysis::{AnalysisResult, ClassTable, SemanticAnalyzer};
use bantam::ast::*;
use bantam::errors::{Diagnostic, Diagnostics, Level};
use bantam::position::Span;

pub fn program(classes: Vec<Class>) -> Program {
    Program {
        classes,
        span: Span::default(),
    }
}

pub fn class(name: &str, parent: Option<&str>, features: Vec<Feature>) -> Class {
    Class {
        name: name.to_owned(),
        parent: parent.map(str::to_owned),
        features,
        file: Some("test.btm".to_owned()),
        span: Span::default(),
    }
}

/// `class Main { void main() { <body> } }`
pub fn main_class(body: Vec<Stmt>) -> Class {
    class("Main", None, vec![method("main", "void", &[], body)])
}

pub fn main_program(body: Vec<Stmt>) -> Program {
    program(vec![main_class(body)])
}

pub fn field(name: &str, ty: &str, init: Option<Expr>) -> Feature {
    Feature::Field(Field {
        name: name.to_owned(),
        ty: ty.to_owned(),
        init: init.map(Box::new),
        span: Span::default(),
    })
}

pub fn method(name: &str, return_ty: &str, params: &[(&str, &str)], body: Vec<Stmt>) -> Feature {
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
        body,
        span: Span::default(),
    })
}

pub fn decl(name: &str, ty: &str, init: Option<Expr>) -> Stmt {
    Stmt::Decl(DeclStmt {
        name: name.to_owned(),
        ty: ty.to_owned(),
        init: init.map(Box::new),
        span: Span::default(),
    })
}

pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expr(ExprStmt {
        expr: Box::new(expr),
        span: Span::default(),
    })
}

pub fn if_stmt(cond: Expr, then_stmt: Stmt, else_stmt: Option<Stmt>) -> Stmt {
    Stmt::If(IfStmt {
        cond: Box::new(cond),
        then_stmt: Box::new(then_stmt),
        else_stmt: else_stmt.map(Box::new),
        span: Span::default(),
    })
}

pub fn while_stmt(cond: Expr, body: Stmt) -> Stmt {
    Stmt::While(WhileStmt {
        cond: Box::new(cond),
        body: Box::new(body),
        span: Span::default(),
    })
}

pub fn for_stmt(init: Option<Expr>, cond: Option<Expr>, update: Option<Expr>, body: Stmt) -> Stmt {
    Stmt::For(ForStmt {
        init: init.map(Box::new),
        cond: cond.map(Box::new),
        update: update.map(Box::new),
        body: Box::new(body),
        span: Span::default(),
    })
}

pub fn block(stmts: Vec<Stmt>) -> Stmt {
    Stmt::Block(BlockStmt {
        stmts,
        span: Span::default(),
    })
}

pub fn brk() -> Stmt {
    Stmt::Break(BreakStmt::default())
}

pub fn ret(expr: Option<Expr>) -> Stmt {
    Stmt::Return(ReturnStmt {
        expr: expr.map(Box::new),
        span: Span::default(),
    })
}

pub fn var(name: &str) -> Expr {
    Expr::Var(VarExpr {
        object: None,
        name: name.to_owned(),
        ty: None,
        span: Span::default(),
    })
}

pub fn member(object: Expr, name: &str) -> Expr {
    Expr::Var(VarExpr {
        object: Some(Box::new(object)),
        name: name.to_owned(),
        ty: None,
        span: Span::default(),
    })
}

pub fn elem(name: &str, index: Expr) -> Expr {
    Expr::ArrayElem(ArrayElemExpr {
        object: None,
        name: name.to_owned(),
        index: Box::new(index),
        ty: None,
        span: Span::default(),
    })
}

pub fn int(value: i32) -> Expr {
    Expr::Int(IntLit {
        value,
        ty: None,
        span: Span::default(),
    })
}

pub fn boolean(value: bool) -> Expr {
    Expr::Bool(BoolLit {
        value,
        ty: None,
        span: Span::default(),
    })
}

pub fn string(value: &str) -> Expr {
    Expr::String(StringLit {
        value: value.to_owned(),
        ty: None,
        span: Span::default(),
    })
}

pub fn assign(name: &str, expr: Expr) -> Expr {
    Expr::Assign(AssignExpr {
        qualifier: None,
        name: name.to_owned(),
        expr: Box::new(expr),
        ty: None,
        span: Span::default(),
    })
}

pub fn array_assign(name: &str, index: Expr, expr: Expr) -> Expr {
    Expr::ArrayAssign(ArrayAssignExpr {
        qualifier: None,
        name: name.to_owned(),
        index: Box::new(index),
        expr: Box::new(expr),
        ty: None,
        span: Span::default(),
    })
}

pub fn assign_qualified(qualifier: Qualifier, name: &str, expr: Expr) -> Expr {
    Expr::Assign(AssignExpr {
        qualifier: Some(qualifier),
        name: name.to_owned(),
        expr: Box::new(expr),
        ty: None,
        span: Span::default(),
    })
}

pub fn call(receiver: Option<Expr>, method: &str, args: Vec<Expr>) -> Expr {
    Expr::Dispatch(DispatchExpr {
        receiver: receiver.map(Box::new),
        method: method.to_owned(),
        args,
        ty: None,
        span: Span::default(),
    })
}

pub fn new(ty_name: &str) -> Expr {
    Expr::New(NewExpr {
        ty_name: ty_name.to_owned(),
        ty: None,
        span: Span::default(),
    })
}

pub fn new_array(elem_ty_name: &str, size: Expr) -> Expr {
    Expr::NewArray(NewArrayExpr {
        elem_ty_name: elem_ty_name.to_owned(),
        size: Box::new(size),
        ty: None,
        span: Span::default(),
    })
}

pub fn cast(ty_name: &str, expr: Expr) -> Expr {
    Expr::Cast(CastExpr {
        ty_name: ty_name.to_owned(),
        expr: Box::new(expr),
        ty: None,
        span: Span::default(),
    })
}

pub fn instanceof(expr: Expr, ty_name: &str) -> Expr {
    Expr::Instanceof(InstanceofExpr {
        expr: Box::new(expr),
        ty_name: ty_name.to_owned(),
        ty: None,
        span: Span::default(),
    })
}

pub fn bin_op(op: BinOpKind, lhs: Expr, rhs: Expr) -> Expr {
    Expr::BinOp(BinOpExpr {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        ty: None,
        span: Span::default(),
    })
}

pub fn un_op(op: UnOpKind, expr: Expr) -> Expr {
    Expr::UnOp(UnOpExpr {
        op,
        postfix: false,
        expr: Box::new(expr),
        ty: None,
        span: Span::default(),
    })
}

pub fn analyze(program: &mut Program) -> (ClassTable, Vec<Diagnostic>) {
    let mut diagnostics = Diagnostics::new();
    let AnalysisResult { class_table } = SemanticAnalyzer::new(&mut diagnostics)
        .analyze(program)
        .expect("the analysis is never cancelled here");

    (class_table, diagnostics.into_vec())
}

/// The messages of the diagnostics at the error level or above.
pub fn errors(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.level.is_error())
        .map(|diagnostic| diagnostic.message.message.clone())
        .collect()
}

pub fn fatal_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.level == Level::Fatal)
        .count()
}

/// Returns the statements of the method `name` of the class `class`.
pub fn method_body<'a>(program: &'a Program, class: &str, name: &str) -> &'a [Stmt] {
    program
        .classes
        .iter()
        .find(|decl| decl.name == class)
        .and_then(|decl| {
            decl.features.iter().find_map(|feature| match feature {
                Feature::Method(method) if method.name == name => Some(&method.body[..]),
                _ => None,
            })
        })
        .expect("the method exists")
}
