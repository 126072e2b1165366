pub mod dump;
pub mod ty;
mod visit;

use std::borrow::Cow;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::position::{HasSpan, Span};

use self::ty::{HasTy, ResolvedTy};

pub use visit::{AstRecurse, DefaultVisitor, DefaultVisitorMut, Visitor, VisitorMut};

macro_rules! impl_recurse {
    (|$s:ident: $type:ty, $visitor:ident| { const => $body_const:expr, mut => $body_mut:expr $(,)?}) => {
        impl AstRecurse for $type {
            fn recurse<V: Visitor<Output = ()>>(&$s, $visitor: &mut V) {
                $body_const;
            }

            fn recurse_mut<V: VisitorMut<Output = ()>>(&mut $s, $visitor: &mut V) {
                $body_mut;
            }
        }
    };
}

macro_rules! impl_has_span {
    (&$s:ident: $type:ty => $body:expr) => {
        impl HasSpan for $type {
            fn span(&$s) -> Cow<'_, Span> {
                $body
            }
        }
    };

    ($type:ty) => {
        impl HasSpan for $type {
            fn span(&self) -> Cow<'_, Span> {
                Cow::Borrowed(&self.span)
            }
        }
    };
}

macro_rules! impl_has_ty {
    ($( $type:ty ),+ $(,)?) => {
        $(
            impl HasTy for $type {
                fn ty(&self) -> Option<&ResolvedTy> {
                    self.ty.as_ref()
                }
            }
        )+
    };
}

macro_rules! define_op_kind {
    ($name:ident { $( $op:ident => $symbol:literal, )+ }) => {
        #[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash)]
        pub enum $name {
            $( $op, )+
        }

        impl $name {
            pub fn symbol(self) -> &'static str {
                match self {
                    $( Self::$op => $symbol, )+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.symbol())
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    pub classes: Vec<Class>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: Program, visitor| {
    const => for class in &self.classes {
        visitor.visit_class(class);
    },

    mut => for class in &mut self.classes {
        visitor.visit_class(class);
    },
});

impl_has_span!(Program);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Class {
    pub name: String,

    /// The declared superclass; `None` means the class implicitly extends `Object`.
    #[serde(default)]
    pub parent: Option<String>,

    #[serde(default)]
    pub features: Vec<Feature>,

    /// The source file the class was declared in.
    #[serde(default)]
    pub file: Option<String>,

    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: Class, visitor| {
    const => for feature in &self.features {
        visitor.visit_feature(feature);
    },

    mut => for feature in &mut self.features {
        visitor.visit_feature(feature);
    },
});

impl_has_span!(Class);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Feature {
    Field(Field),
    Method(Method),
}

impl Feature {
    pub fn name(&self) -> &str {
        match self {
            Self::Field(field) => &field.name,
            Self::Method(method) => &method.name,
        }
    }
}

impl_recurse!(|self: Feature, visitor| {
    const => match self {
        Self::Field(field) => visitor.visit_field(field),
        Self::Method(method) => visitor.visit_method(method),
    },

    mut => match self {
        Self::Field(field) => visitor.visit_field(field),
        Self::Method(method) => visitor.visit_method(method),
    },
});

impl_has_span!(&self: Feature => match self {
    Self::Field(field) => field.span(),
    Self::Method(method) => method.span(),
});

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: String,
    #[serde(default)]
    pub init: Option<Box<Expr>>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: Field, visitor| {
    const => if let Some(init) = &self.init {
        visitor.visit_expr(init);
    },

    mut => if let Some(init) = &mut self.init {
        visitor.visit_expr(init);
    },
});

impl_has_span!(Field);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub return_ty: String,
    #[serde(default)]
    pub params: Vec<Formal>,
    #[serde(default)]
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: Method, visitor| {
    const => {
        for param in &self.params {
            visitor.visit_formal(param);
        }

        for stmt in &self.body {
            visitor.visit_stmt(stmt);
        }
    },

    mut => {
        for param in &mut self.params {
            visitor.visit_formal(param);
        }

        for stmt in &mut self.body {
            visitor.visit_stmt(stmt);
        }
    },
});

impl_has_span!(Method);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Formal {
    pub name: String,
    pub ty: String,
    #[serde(default)]
    pub span: Span,
}

impl_has_span!(Formal);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Decl(DeclStmt),
    Expr(ExprStmt),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Break(BreakStmt),
    Block(BlockStmt),
    Return(ReturnStmt),
}

impl_recurse!(|self: Stmt, visitor| {
    const => match self {
        Self::Decl(stmt) => visitor.visit_decl(stmt),
        Self::Expr(stmt) => visitor.visit_expr_stmt(stmt),
        Self::If(stmt) => visitor.visit_if(stmt),
        Self::While(stmt) => visitor.visit_while(stmt),
        Self::For(stmt) => visitor.visit_for(stmt),
        Self::Break(stmt) => visitor.visit_break(stmt),
        Self::Block(stmt) => visitor.visit_block(stmt),
        Self::Return(stmt) => visitor.visit_return(stmt),
    },

    mut => match self {
        Self::Decl(stmt) => visitor.visit_decl(stmt),
        Self::Expr(stmt) => visitor.visit_expr_stmt(stmt),
        Self::If(stmt) => visitor.visit_if(stmt),
        Self::While(stmt) => visitor.visit_while(stmt),
        Self::For(stmt) => visitor.visit_for(stmt),
        Self::Break(stmt) => visitor.visit_break(stmt),
        Self::Block(stmt) => visitor.visit_block(stmt),
        Self::Return(stmt) => visitor.visit_return(stmt),
    },
});

impl_has_span!(&self: Stmt => match self {
    Self::Decl(stmt) => stmt.span(),
    Self::Expr(stmt) => stmt.span(),
    Self::If(stmt) => stmt.span(),
    Self::While(stmt) => stmt.span(),
    Self::For(stmt) => stmt.span(),
    Self::Break(stmt) => stmt.span(),
    Self::Block(stmt) => stmt.span(),
    Self::Return(stmt) => stmt.span(),
});

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeclStmt {
    pub name: String,
    pub ty: String,
    #[serde(default)]
    pub init: Option<Box<Expr>>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: DeclStmt, visitor| {
    const => if let Some(init) = &self.init {
        visitor.visit_expr(init);
    },

    mut => if let Some(init) = &mut self.init {
        visitor.visit_expr(init);
    },
});

impl_has_span!(DeclStmt);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExprStmt {
    pub expr: Box<Expr>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: ExprStmt, visitor| {
    const => visitor.visit_expr(&self.expr),
    mut => visitor.visit_expr(&mut self.expr),
});

impl_has_span!(ExprStmt);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IfStmt {
    pub cond: Box<Expr>,
    pub then_stmt: Box<Stmt>,
    #[serde(default)]
    pub else_stmt: Option<Box<Stmt>>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: IfStmt, visitor| {
    const => {
        visitor.visit_expr(&self.cond);
        visitor.visit_stmt(&self.then_stmt);

        if let Some(else_stmt) = &self.else_stmt {
            visitor.visit_stmt(else_stmt);
        }
    },

    mut => {
        visitor.visit_expr(&mut self.cond);
        visitor.visit_stmt(&mut self.then_stmt);

        if let Some(else_stmt) = &mut self.else_stmt {
            visitor.visit_stmt(else_stmt);
        }
    },
});

impl_has_span!(IfStmt);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WhileStmt {
    pub cond: Box<Expr>,
    pub body: Box<Stmt>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: WhileStmt, visitor| {
    const => {
        visitor.visit_expr(&self.cond);
        visitor.visit_stmt(&self.body);
    },

    mut => {
        visitor.visit_expr(&mut self.cond);
        visitor.visit_stmt(&mut self.body);
    },
});

impl_has_span!(WhileStmt);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ForStmt {
    #[serde(default)]
    pub init: Option<Box<Expr>>,
    #[serde(default)]
    pub cond: Option<Box<Expr>>,
    #[serde(default)]
    pub update: Option<Box<Expr>>,
    pub body: Box<Stmt>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: ForStmt, visitor| {
    const => {
        for expr in [&self.init, &self.cond, &self.update].into_iter().flatten() {
            visitor.visit_expr(expr);
        }

        visitor.visit_stmt(&self.body);
    },

    mut => {
        for expr in [&mut self.init, &mut self.cond, &mut self.update].into_iter().flatten() {
            visitor.visit_expr(expr);
        }

        visitor.visit_stmt(&mut self.body);
    },
});

impl_has_span!(ForStmt);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct BreakStmt {
    #[serde(default)]
    pub span: Span,
}

impl_has_span!(BreakStmt);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockStmt {
    #[serde(default)]
    pub stmts: Vec<Stmt>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: BlockStmt, visitor| {
    const => for stmt in &self.stmts {
        visitor.visit_stmt(stmt);
    },

    mut => for stmt in &mut self.stmts {
        visitor.visit_stmt(stmt);
    },
});

impl_has_span!(BlockStmt);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ReturnStmt {
    #[serde(default)]
    pub expr: Option<Box<Expr>>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: ReturnStmt, visitor| {
    const => if let Some(expr) = &self.expr {
        visitor.visit_expr(expr);
    },

    mut => if let Some(expr) = &mut self.expr {
        visitor.visit_expr(expr);
    },
});

impl_has_span!(ReturnStmt);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Dispatch(DispatchExpr),
    New(NewExpr),
    NewArray(NewArrayExpr),
    Instanceof(InstanceofExpr),
    Cast(CastExpr),
    Assign(AssignExpr),
    ArrayAssign(ArrayAssignExpr),
    BinOp(BinOpExpr),
    UnOp(UnOpExpr),
    Var(VarExpr),
    ArrayElem(ArrayElemExpr),
    Int(IntLit),
    Bool(BoolLit),
    String(StringLit),
}

impl_recurse!(|self: Expr, visitor| {
    const => match self {
        Self::Dispatch(expr) => visitor.visit_dispatch(expr),
        Self::New(expr) => visitor.visit_new(expr),
        Self::NewArray(expr) => visitor.visit_new_array(expr),
        Self::Instanceof(expr) => visitor.visit_instanceof(expr),
        Self::Cast(expr) => visitor.visit_cast(expr),
        Self::Assign(expr) => visitor.visit_assign(expr),
        Self::ArrayAssign(expr) => visitor.visit_array_assign(expr),
        Self::BinOp(expr) => visitor.visit_bin_op(expr),
        Self::UnOp(expr) => visitor.visit_un_op(expr),
        Self::Var(expr) => visitor.visit_var(expr),
        Self::ArrayElem(expr) => visitor.visit_array_elem(expr),
        Self::Int(expr) => visitor.visit_int_lit(expr),
        Self::Bool(expr) => visitor.visit_bool_lit(expr),
        Self::String(expr) => visitor.visit_string_lit(expr),
    },

    mut => match self {
        Self::Dispatch(expr) => visitor.visit_dispatch(expr),
        Self::New(expr) => visitor.visit_new(expr),
        Self::NewArray(expr) => visitor.visit_new_array(expr),
        Self::Instanceof(expr) => visitor.visit_instanceof(expr),
        Self::Cast(expr) => visitor.visit_cast(expr),
        Self::Assign(expr) => visitor.visit_assign(expr),
        Self::ArrayAssign(expr) => visitor.visit_array_assign(expr),
        Self::BinOp(expr) => visitor.visit_bin_op(expr),
        Self::UnOp(expr) => visitor.visit_un_op(expr),
        Self::Var(expr) => visitor.visit_var(expr),
        Self::ArrayElem(expr) => visitor.visit_array_elem(expr),
        Self::Int(expr) => visitor.visit_int_lit(expr),
        Self::Bool(expr) => visitor.visit_bool_lit(expr),
        Self::String(expr) => visitor.visit_string_lit(expr),
    },
});

impl_has_span!(&self: Expr => match self {
    Self::Dispatch(expr) => expr.span(),
    Self::New(expr) => expr.span(),
    Self::NewArray(expr) => expr.span(),
    Self::Instanceof(expr) => expr.span(),
    Self::Cast(expr) => expr.span(),
    Self::Assign(expr) => expr.span(),
    Self::ArrayAssign(expr) => expr.span(),
    Self::BinOp(expr) => expr.span(),
    Self::UnOp(expr) => expr.span(),
    Self::Var(expr) => expr.span(),
    Self::ArrayElem(expr) => expr.span(),
    Self::Int(expr) => expr.span(),
    Self::Bool(expr) => expr.span(),
    Self::String(expr) => expr.span(),
});

impl HasTy for Expr {
    fn ty(&self) -> Option<&ResolvedTy> {
        match self {
            Self::Dispatch(expr) => expr.ty(),
            Self::New(expr) => expr.ty(),
            Self::NewArray(expr) => expr.ty(),
            Self::Instanceof(expr) => expr.ty(),
            Self::Cast(expr) => expr.ty(),
            Self::Assign(expr) => expr.ty(),
            Self::ArrayAssign(expr) => expr.ty(),
            Self::BinOp(expr) => expr.ty(),
            Self::UnOp(expr) => expr.ty(),
            Self::Var(expr) => expr.ty(),
            Self::ArrayElem(expr) => expr.ty(),
            Self::Int(expr) => expr.ty(),
            Self::Bool(expr) => expr.ty(),
            Self::String(expr) => expr.ty(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DispatchExpr {
    /// The object the method is invoked on; `None` means `this`.
    #[serde(default)]
    pub receiver: Option<Box<Expr>>,
    pub method: String,
    #[serde(default)]
    pub args: Vec<Expr>,
    #[serde(default)]
    pub ty: Option<ResolvedTy>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: DispatchExpr, visitor| {
    const => {
        if let Some(receiver) = &self.receiver {
            visitor.visit_expr(receiver);
        }

        for arg in &self.args {
            visitor.visit_expr(arg);
        }
    },

    mut => {
        if let Some(receiver) = &mut self.receiver {
            visitor.visit_expr(receiver);
        }

        for arg in &mut self.args {
            visitor.visit_expr(arg);
        }
    },
});

impl_has_span!(DispatchExpr);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewExpr {
    pub ty_name: String,
    #[serde(default)]
    pub ty: Option<ResolvedTy>,
    #[serde(default)]
    pub span: Span,
}

impl_has_span!(NewExpr);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewArrayExpr {
    pub elem_ty_name: String,
    pub size: Box<Expr>,
    #[serde(default)]
    pub ty: Option<ResolvedTy>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: NewArrayExpr, visitor| {
    const => visitor.visit_expr(&self.size),
    mut => visitor.visit_expr(&mut self.size),
});

impl_has_span!(NewArrayExpr);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InstanceofExpr {
    pub expr: Box<Expr>,
    pub ty_name: String,
    #[serde(default)]
    pub ty: Option<ResolvedTy>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: InstanceofExpr, visitor| {
    const => visitor.visit_expr(&self.expr),
    mut => visitor.visit_expr(&mut self.expr),
});

impl_has_span!(InstanceofExpr);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CastExpr {
    pub ty_name: String,
    pub expr: Box<Expr>,
    #[serde(default)]
    pub ty: Option<ResolvedTy>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: CastExpr, visitor| {
    const => visitor.visit_expr(&self.expr),
    mut => visitor.visit_expr(&mut self.expr),
});

impl_has_span!(CastExpr);

/// Restricts a name lookup to the fields of the current class (`this`) or its superclass (`super`).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Qualifier {
    This,
    Super,
}

impl Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::This => "this",
            Self::Super => "super",
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssignExpr {
    #[serde(default)]
    pub qualifier: Option<Qualifier>,
    pub name: String,
    pub expr: Box<Expr>,
    #[serde(default)]
    pub ty: Option<ResolvedTy>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: AssignExpr, visitor| {
    const => visitor.visit_expr(&self.expr),
    mut => visitor.visit_expr(&mut self.expr),
});

impl_has_span!(AssignExpr);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ArrayAssignExpr {
    #[serde(default)]
    pub qualifier: Option<Qualifier>,
    pub name: String,
    pub index: Box<Expr>,
    pub expr: Box<Expr>,
    #[serde(default)]
    pub ty: Option<ResolvedTy>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: ArrayAssignExpr, visitor| {
    const => {
        visitor.visit_expr(&self.index);
        visitor.visit_expr(&self.expr);
    },

    mut => {
        visitor.visit_expr(&mut self.index);
        visitor.visit_expr(&mut self.expr);
    },
});

impl_has_span!(ArrayAssignExpr);

define_op_kind!(BinOpKind {
    Add => "+",
    Subtract => "-",
    Multiply => "*",
    Divide => "/",
    Modulus => "%",
    LessThan => "<",
    GreaterThan => ">",
    LessEquals => "<=",
    GreaterEquals => ">=",
    Equals => "==",
    NotEquals => "!=",
    And => "&&",
    Or => "||",
});

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BinOpExpr {
    pub op: BinOpKind,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    #[serde(default)]
    pub ty: Option<ResolvedTy>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: BinOpExpr, visitor| {
    const => {
        visitor.visit_expr(&self.lhs);
        visitor.visit_expr(&self.rhs);
    },

    mut => {
        visitor.visit_expr(&mut self.lhs);
        visitor.visit_expr(&mut self.rhs);
    },
});

impl_has_span!(BinOpExpr);

define_op_kind!(UnOpKind {
    Negate => "-",
    Not => "!",
    Increment => "++",
    Decrement => "--",
});

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UnOpExpr {
    pub op: UnOpKind,
    #[serde(default)]
    pub postfix: bool,
    pub expr: Box<Expr>,
    #[serde(default)]
    pub ty: Option<ResolvedTy>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: UnOpExpr, visitor| {
    const => visitor.visit_expr(&self.expr),
    mut => visitor.visit_expr(&mut self.expr),
});

impl_has_span!(UnOpExpr);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VarExpr {
    /// The object whose field is accessed; `None` for a plain name.
    #[serde(default)]
    pub object: Option<Box<Expr>>,
    pub name: String,
    #[serde(default)]
    pub ty: Option<ResolvedTy>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: VarExpr, visitor| {
    const => if let Some(object) = &self.object {
        visitor.visit_expr(object);
    },

    mut => if let Some(object) = &mut self.object {
        visitor.visit_expr(object);
    },
});

impl_has_span!(VarExpr);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ArrayElemExpr {
    #[serde(default)]
    pub object: Option<Box<Expr>>,
    pub name: String,
    pub index: Box<Expr>,
    #[serde(default)]
    pub ty: Option<ResolvedTy>,
    #[serde(default)]
    pub span: Span,
}

impl_recurse!(|self: ArrayElemExpr, visitor| {
    const => {
        if let Some(object) = &self.object {
            visitor.visit_expr(object);
        }

        visitor.visit_expr(&self.index);
    },

    mut => {
        if let Some(object) = &mut self.object {
            visitor.visit_expr(object);
        }

        visitor.visit_expr(&mut self.index);
    },
});

impl_has_span!(ArrayElemExpr);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IntLit {
    pub value: i32,
    #[serde(default)]
    pub ty: Option<ResolvedTy>,
    #[serde(default)]
    pub span: Span,
}

impl_has_span!(IntLit);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BoolLit {
    pub value: bool,
    #[serde(default)]
    pub ty: Option<ResolvedTy>,
    #[serde(default)]
    pub span: Span,
}

impl_has_span!(BoolLit);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StringLit {
    pub value: String,
    #[serde(default)]
    pub ty: Option<ResolvedTy>,
    #[serde(default)]
    pub span: Span,
}

impl_has_span!(StringLit);

impl_has_ty!(
    DispatchExpr,
    NewExpr,
    NewArrayExpr,
    InstanceofExpr,
    CastExpr,
    AssignExpr,
    ArrayAssignExpr,
    BinOpExpr,
    UnOpExpr,
    VarExpr,
    ArrayElemExpr,
    IntLit,
    BoolLit,
    StringLit,
);
