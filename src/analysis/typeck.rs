use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{instrument, trace, trace_span};

use crate::ast::ty::{HasTy, ResolvedTy};
use crate::ast::{self, AstRecurse, BinOpKind, Class, Expr, Program, UnOpKind, VisitorMut};
use crate::errors::Diagnostics;
use crate::position::{HasSpan, Span};

use super::builtins::is_reserved;
use super::class_table::{ClassId, ClassOrigin, ClassTable, DefinitionLocation, FieldKind};
use super::error::{ArgumentMismatch, MismatchedTypes, NameKind, SemanticError};
use super::scope::ScopeTable;
use super::Cancelled;

/// Type-checks method bodies and field initializers, annotating every expression with its type.
pub struct TypeChecker<'dia, 'emt, 'tbl> {
    diagnostics: &'dia mut Diagnostics<'emt>,
    table: &'tbl ClassTable,
    cancel: Option<&'tbl AtomicBool>,
}

impl<'dia, 'emt, 'tbl> TypeChecker<'dia, 'emt, 'tbl> {
    pub fn new(diagnostics: &'dia mut Diagnostics<'emt>, table: &'tbl ClassTable) -> Self {
        Self {
            diagnostics,
            table,
            cancel: None,
        }
    }

    /// Makes the checker stop between classes once `flag` is set.
    pub fn with_cancellation(self, flag: &'tbl AtomicBool) -> Self {
        Self {
            cancel: Some(flag),
            ..self
        }
    }

    #[instrument(level = "trace", skip_all)]
    pub fn check(self, program: &mut Program) -> Result<(), Cancelled> {
        for (idx, class) in program.classes.iter_mut().enumerate() {
            if self.cancel.map_or(false, |flag| flag.load(Ordering::Relaxed)) {
                return Err(Cancelled);
            }

            let Some(class_id) = self.table.id_of(&class.name) else { continue };

            // skip the classes that were rejected while building the hierarchy
            if self.table.get(class_id).map(|desc| desc.origin()) != Some(ClassOrigin::User(idx)) {
                continue;
            }

            let mut visitor = TypeVisitor {
                diagnostics: &mut *self.diagnostics,
                table: self.table,
                class: class_id,
                class_name: class.name.clone(),
                file: class.file.clone(),
                locals: ScopeTable::new(),
                method: None,
            };

            visitor.visit_class(class);
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
struct LocalBinding {
    ty: ResolvedTy,
    span: Span,
}

#[derive(Debug, Clone)]
struct MethodCtx {
    return_ty: ResolvedTy,
    loop_depth: usize,
}

struct TypeVisitor<'a, 'emt> {
    diagnostics: &'a mut Diagnostics<'emt>,
    table: &'a ClassTable,
    class: ClassId,
    class_name: String,
    file: Option<String>,
    locals: ScopeTable<LocalBinding>,
    method: Option<MethodCtx>,
}

impl TypeVisitor<'_, '_> {
    fn with_scope<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.locals.enter_scope();
        let result = f(self);
        self.locals.exit_scope();

        result
    }

    fn with_loop<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        if let Some(method) = &mut self.method {
            method.loop_depth += 1;
        }

        let result = self.with_scope(f);

        if let Some(method) = &mut self.method {
            method.loop_depth -= 1;
        }

        result
    }

    fn emit(&mut self, err: SemanticError) {
        self.diagnostics
            .error()
            .with_file(self.file.as_deref())
            .with_span_and_error(err)
            .emit();
    }

    fn is_subtype(&self, lhs: &ResolvedTy, rhs: &ResolvedTy) -> bool {
        self.table.is_subtype(lhs, rhs)
    }

    fn check_conforms(&mut self, actual_ty: &ResolvedTy, expected_ty: &ResolvedTy, span: &Span) {
        if !self.is_subtype(actual_ty, expected_ty) {
            self.emit(SemanticError::MismatchedTypes(Box::new(MismatchedTypes {
                span: span.clone(),
                expected_ty: expected_ty.clone(),
                actual_ty: actual_ty.clone(),
            })));
        }
    }

    fn check_expr_conforms(&mut self, expr: &Expr, expected_ty: &ResolvedTy) {
        self.check_conforms(&expr.res_ty(), expected_ty, &expr.span());
    }

    /// Resolves the declared type of a field, parameter, local or method.
    fn resolve_declared_ty(
        &mut self,
        ty_name: &str,
        kind: NameKind,
        name: &str,
        span: &Span,
    ) -> ResolvedTy {
        match self.table.resolve_ty_name(ty_name) {
            Some(ResolvedTy::Void) if kind != NameKind::Method => {
                self.emit(SemanticError::IllegalVoid {
                    kind,
                    name: name.to_owned(),
                    span: span.clone(),
                });

                ResolvedTy::Untyped
            }

            Some(ty) => ty,

            None => {
                self.emit(SemanticError::UnrecognizedTy {
                    ty_name: ty_name.to_owned(),
                    span: span.clone(),
                });

                ResolvedTy::Untyped
            }
        }
    }

    fn bind_local(&mut self, kind: NameKind, name: &str, ty: ResolvedTy, span: &Span) {
        if is_reserved(name) {
            self.emit(SemanticError::ReservedName {
                kind,
                name: name.to_owned(),
                span: span.clone(),
            });

            return;
        }

        let binding = LocalBinding {
            ty,
            span: span.clone(),
        };

        if self.locals.add(name.to_owned(), binding).is_err() {
            let previous = self
                .locals
                .peek(name)
                .map(|binding| binding.span.clone())
                .unwrap_or_default();

            self.emit(SemanticError::MultipleDefinition {
                kind,
                name: name.to_owned(),
                span: span.clone(),
                previous: DefinitionLocation::UserCode {
                    file: self.file.clone(),
                    span: previous,
                },
            });
        }
    }

    fn field_ty(&self, class: ClassId, name: &str) -> Option<ResolvedTy> {
        let (_, binding) = self.table.lookup_field(class, name)?;

        Some(match binding.kind {
            FieldKind::This | FieldKind::Super if binding.ty.is_empty() => ResolvedTy::Untyped,
            FieldKind::This | FieldKind::Super => ResolvedTy::class(binding.ty.as_str()),

            // an unknown field type has been reported when checking the declaration
            FieldKind::Declared => self
                .table
                .resolve_ty_name(&binding.ty)
                .unwrap_or(ResolvedTy::Untyped),
        })
    }

    /// Resolves an unqualified name: locals first, then the fields of the class and its ancestors.
    fn resolve_name(&mut self, name: &str, span: &Span) -> ResolvedTy {
        if name == "null" {
            return ResolvedTy::Null;
        }

        if let Some(local) = self.locals.lookup(name) {
            return local.ty.clone();
        }

        if let Some(ty) = self.field_ty(self.class, name) {
            return ty;
        }

        self.emit(SemanticError::UnrecognizedName {
            name: name.to_owned(),
            span: span.clone(),
        });

        ResolvedTy::Untyped
    }

    /// Resolves a field accessed through a value of the type `object_ty`.
    fn resolve_member_field(&mut self, object_ty: &ResolvedTy, name: &str, span: &Span) -> ResolvedTy {
        let found = match object_ty {
            ResolvedTy::Untyped => return ResolvedTy::Untyped,
            ResolvedTy::Array(_) if name == "length" => Some(ResolvedTy::Int),

            ResolvedTy::Class(class_name) => self.table.id_of(class_name).and_then(|class| {
                self.table
                    .lookup_field(class, name)
                    .filter(|(_, binding)| binding.kind == FieldKind::Declared)
                    .and_then(|_| self.field_ty(class, name))
            }),

            _ => None,
        };

        found.unwrap_or_else(|| {
            self.emit(SemanticError::NoSuchField {
                ty: object_ty.clone(),
                name: name.to_owned(),
                span: span.clone(),
            });

            ResolvedTy::Untyped
        })
    }

    /// Resolves the target of an assignment.
    fn resolve_assignee(&mut self, qualifier: Option<ast::Qualifier>, name: &str, span: &Span) -> ResolvedTy {
        let qualified_class = match qualifier {
            None if is_reserved(name) => {
                self.emit(SemanticError::NotAssignable {
                    name: name.to_owned(),
                    span: span.clone(),
                });

                return ResolvedTy::Untyped;
            }

            None => return self.resolve_name(name, span),
            Some(ast::Qualifier::This) => Some(self.class_name.clone()),

            Some(ast::Qualifier::Super) => self
                .table
                .get(self.class)
                .and_then(|desc| desc.parent())
                .and_then(|parent| self.table.get(parent))
                .map(|parent| parent.name().to_owned()),
        };

        match qualified_class {
            Some(class_name) => self.resolve_member_field(&ResolvedTy::Class(class_name), name, span),
            None => ResolvedTy::Untyped,
        }
    }

    fn check_int_index(&mut self, index: &Expr) {
        self.check_expr_conforms(index, &ResolvedTy::Int);
    }

    fn array_elem_ty(&mut self, array_ty: ResolvedTy, name: &str, span: &Span) -> ResolvedTy {
        if let Some(elem) = array_ty.elem_ty() {
            return elem.clone();
        }

        if !array_ty.is_untyped() {
            self.emit(SemanticError::NotAnArray {
                name: name.to_owned(),
                ty: array_ty,
                span: span.clone(),
            });
        }

        ResolvedTy::Untyped
    }

    fn check_override(&mut self, method: &ast::Method) {
        let table = self.table;
        let Some(desc) = table.get(self.class) else { return };
        let Some(parent) = desc.parent() else { return };
        let Some((def_class, overridden)) = table.lookup_method(parent, &method.name) else { return };

        // reserved names are never bound, and were reported by the binder
        let Some(own) = desc.methods().peek(&method.name) else { return };

        if !own.same_signature(overridden, table) {
            self.emit(SemanticError::InvalidOverride {
                class: self.class_name.clone(),
                method: method.name.clone(),
                overridden_class: table
                    .get(def_class)
                    .map(|desc| desc.name().to_owned())
                    .unwrap_or_default(),
                span: method.span.clone(),
            });
        }
    }

    fn args_match(&self, arg_ty: &ResolvedTy, param_ty: &ResolvedTy) -> bool {
        if arg_ty.is_untyped() || param_ty.is_untyped() {
            true
        } else if param_ty.requires_exact_match() {
            arg_ty == param_ty
        } else {
            self.is_subtype(arg_ty, param_ty)
        }
    }

    fn check_dispatch(&mut self, expr: &ast::DispatchExpr, recv_ty: &ResolvedTy) -> ResolvedTy {
        let table = self.table;

        let class = match recv_ty {
            ResolvedTy::Untyped => return ResolvedTy::Untyped,
            ResolvedTy::Class(name) => table.id_of(name),
            ResolvedTy::Array(_) => Some(table.root()),
            _ => None,
        };

        let Some(class) = class else {
            self.emit(SemanticError::InvalidReceiver {
                ty: recv_ty.clone(),
                method: expr.method.clone(),
                span: expr.span.clone(),
            });

            return ResolvedTy::Untyped;
        };

        let Some((_, method)) = table.lookup_method(class, &expr.method) else {
            self.emit(SemanticError::UnknownMethod {
                class: table.get(class).map(|desc| desc.name().to_owned()).unwrap_or_default(),
                method: expr.method.clone(),
                span: expr.span.clone(),
            });

            return ResolvedTy::object();
        };

        if method.params.len() != expr.args.len() {
            self.emit(SemanticError::InvalidNumberOfArguments {
                method: expr.method.clone(),
                expected_count: method.params.len(),
                supplied_count: expr.args.len(),
                span: expr.span.clone(),
            });
        }

        for (index, (arg, param)) in expr.args.iter().zip(&method.params).enumerate() {
            let param_ty = table
                .resolve_ty_name(&param.ty)
                .unwrap_or(ResolvedTy::Untyped);
            let arg_ty = arg.res_ty();

            if !self.args_match(&arg_ty, &param_ty) {
                self.emit(SemanticError::ArgumentMismatch(Box::new(ArgumentMismatch {
                    span: arg.span().into_owned(),
                    method: expr.method.clone(),
                    index,
                    exact: param_ty.requires_exact_match(),
                    expected_ty: param_ty,
                    actual_ty: arg_ty,
                })));
            }
        }

        table
            .resolve_ty_name(&method.return_ty)
            .unwrap_or(ResolvedTy::Untyped)
    }

    fn bin_op_ty(&mut self, expr: &ast::BinOpExpr) -> ResolvedTy {
        use BinOpKind::*;

        let lhs_ty = expr.lhs.res_ty();
        let rhs_ty = expr.rhs.res_ty();
        let is = |ty: &ResolvedTy, expected: &ResolvedTy| ty == expected || ty.is_untyped();

        let (valid, ty) = match expr.op {
            Add | Subtract | Multiply | Divide | Modulus => (
                is(&lhs_ty, &ResolvedTy::Int) && is(&rhs_ty, &ResolvedTy::Int),
                ResolvedTy::Int,
            ),

            LessThan | GreaterThan | LessEquals | GreaterEquals => (
                is(&lhs_ty, &ResolvedTy::Int) && is(&rhs_ty, &ResolvedTy::Int),
                ResolvedTy::Boolean,
            ),

            Equals | NotEquals => (
                self.is_subtype(&lhs_ty, &rhs_ty) || self.is_subtype(&rhs_ty, &lhs_ty),
                ResolvedTy::Boolean,
            ),

            And | Or => (
                is(&lhs_ty, &ResolvedTy::Boolean) && is(&rhs_ty, &ResolvedTy::Boolean),
                ResolvedTy::Boolean,
            ),
        };

        if !valid {
            self.emit(SemanticError::InvalidOperands {
                op: expr.op,
                lhs_ty,
                rhs_ty,
                span: expr.span.clone(),
            });
        }

        ty
    }
}

impl VisitorMut for TypeVisitor<'_, '_> {
    type Output = ();

    fn visit_program(&mut self, program: &mut Program) {
        program.recurse_mut(self);
    }

    fn visit_class(&mut self, class: &mut Class) {
        let span = trace_span!("typeck_class", name = %class.name);
        let _guard = span.enter();

        class.recurse_mut(self);
    }

    fn visit_feature(&mut self, feature: &mut ast::Feature) {
        feature.recurse_mut(self);
    }

    fn visit_method(&mut self, method: &mut ast::Method) {
        trace!(method = %method.name, "checking a method");

        let return_ty =
            self.resolve_declared_ty(&method.return_ty, NameKind::Method, &method.name, &method.span);
        self.check_override(method);

        self.locals = ScopeTable::new();
        self.method = Some(MethodCtx {
            return_ty,
            loop_depth: 0,
        });

        // the parameters and the top-level statements of the body share a frame
        self.with_scope(|this| method.recurse_mut(this));

        self.method = None;
    }

    fn visit_field(&mut self, field: &mut ast::Field) {
        let ty = self.resolve_declared_ty(&field.ty, NameKind::Field, &field.name, &field.span);

        if let Some(init) = &mut field.init {
            self.visit_expr(init);
            self.check_expr_conforms(init, &ty);
        }
    }

    fn visit_formal(&mut self, formal: &mut ast::Formal) {
        let ty = self.resolve_declared_ty(&formal.ty, NameKind::Parameter, &formal.name, &formal.span);
        self.bind_local(NameKind::Parameter, &formal.name, ty, &formal.span);
    }

    fn visit_stmt(&mut self, stmt: &mut ast::Stmt) {
        stmt.recurse_mut(self);
    }

    fn visit_decl(&mut self, stmt: &mut ast::DeclStmt) {
        let ty = self.resolve_declared_ty(&stmt.ty, NameKind::Local, &stmt.name, &stmt.span);

        if let Some(init) = &mut stmt.init {
            self.visit_expr(init);
            self.check_expr_conforms(init, &ty);
        }

        // bound after the initializer: `int x = x;` does not see itself
        self.bind_local(NameKind::Local, &stmt.name, ty, &stmt.span);
    }

    fn visit_expr_stmt(&mut self, stmt: &mut ast::ExprStmt) {
        stmt.recurse_mut(self);
    }

    fn visit_if(&mut self, stmt: &mut ast::IfStmt) {
        self.visit_expr(&mut stmt.cond);
        self.check_expr_conforms(&stmt.cond, &ResolvedTy::Boolean);

        self.with_scope(|this| this.visit_stmt(&mut stmt.then_stmt));

        if let Some(else_stmt) = &mut stmt.else_stmt {
            self.with_scope(|this| this.visit_stmt(else_stmt));
        }
    }

    fn visit_while(&mut self, stmt: &mut ast::WhileStmt) {
        self.visit_expr(&mut stmt.cond);
        self.check_expr_conforms(&stmt.cond, &ResolvedTy::Boolean);

        self.with_loop(|this| this.visit_stmt(&mut stmt.body));
    }

    fn visit_for(&mut self, stmt: &mut ast::ForStmt) {
        if let Some(init) = &mut stmt.init {
            self.visit_expr(init);
        }

        if let Some(cond) = &mut stmt.cond {
            self.visit_expr(cond);
            self.check_expr_conforms(cond, &ResolvedTy::Boolean);
        }

        if let Some(update) = &mut stmt.update {
            self.visit_expr(update);
        }

        self.with_loop(|this| this.visit_stmt(&mut stmt.body));
    }

    fn visit_break(&mut self, stmt: &mut ast::BreakStmt) {
        if self.method.as_ref().map_or(0, |method| method.loop_depth) == 0 {
            self.emit(SemanticError::BreakOutsideLoop {
                span: stmt.span.clone(),
            });
        }
    }

    fn visit_block(&mut self, stmt: &mut ast::BlockStmt) {
        self.with_scope(|this| stmt.recurse_mut(this));
    }

    fn visit_return(&mut self, stmt: &mut ast::ReturnStmt) {
        if let Some(expr) = &mut stmt.expr {
            self.visit_expr(expr);
        }

        let Some(return_ty) = self.method.as_ref().map(|method| method.return_ty.clone()) else {
            return;
        };

        match (&return_ty, &stmt.expr) {
            (ResolvedTy::Untyped, _) => {}

            (ResolvedTy::Void, Some(_)) => self.emit(SemanticError::UnexpectedReturnValue {
                span: stmt.span.clone(),
            }),

            (ResolvedTy::Void, None) => {}

            (_, None) => self.emit(SemanticError::MissingReturnValue {
                expected_ty: return_ty.clone(),
                span: stmt.span.clone(),
            }),

            (_, Some(expr)) => self.check_expr_conforms(expr, &return_ty),
        }
    }

    fn visit_expr(&mut self, expr: &mut Expr) {
        expr.recurse_mut(self);
    }

    fn visit_dispatch(&mut self, expr: &mut ast::DispatchExpr) {
        expr.recurse_mut(self);

        let recv_ty = match &expr.receiver {
            Some(receiver) => receiver.res_ty(),
            None => ResolvedTy::class(self.class_name.as_str()),
        };

        let ty = self.check_dispatch(expr, &recv_ty);
        expr.ty = Some(ty);
    }

    fn visit_new(&mut self, expr: &mut ast::NewExpr) {
        let ty = match self.table.resolve_ty_name(&expr.ty_name) {
            Some(ty @ ResolvedTy::Class(_)) => ty,

            _ => {
                self.emit(SemanticError::UnrecognizedTy {
                    ty_name: expr.ty_name.clone(),
                    span: expr.span.clone(),
                });

                ResolvedTy::object()
            }
        };

        expr.ty = Some(ty);
    }

    fn visit_new_array(&mut self, expr: &mut ast::NewArrayExpr) {
        expr.recurse_mut(self);
        self.check_expr_conforms(&expr.size, &ResolvedTy::Int);

        let ty = match self.table.resolve_ty_name(&expr.elem_ty_name) {
            Some(ResolvedTy::Void | ResolvedTy::Array(_)) | None => {
                self.emit(SemanticError::UnrecognizedTy {
                    ty_name: expr.elem_ty_name.clone(),
                    span: expr.span.clone(),
                });

                ResolvedTy::Untyped
            }

            Some(elem) => ResolvedTy::array_of(elem),
        };

        expr.ty = Some(ty);
    }

    fn visit_instanceof(&mut self, expr: &mut ast::InstanceofExpr) {
        expr.recurse_mut(self);
        let expr_ty = expr.expr.res_ty();

        match self.table.resolve_ty_name(&expr.ty_name) {
            Some(ty) => {
                if !self.is_subtype(&ty, &expr_ty) {
                    self.emit(SemanticError::IllegalInstanceof {
                        expr_ty,
                        ty,
                        span: expr.span.clone(),
                    });
                }
            }

            None => {
                self.emit(SemanticError::UnrecognizedTy {
                    ty_name: expr.ty_name.clone(),
                    span: expr.span.clone(),
                });
            }
        }

        expr.ty = Some(ResolvedTy::Boolean);
    }

    fn visit_cast(&mut self, expr: &mut ast::CastExpr) {
        expr.recurse_mut(self);
        let from = expr.expr.res_ty();

        let ty = match self.table.resolve_ty_name(&expr.ty_name) {
            Some(to) => {
                if !self.is_subtype(&from, &to) && !self.is_subtype(&to, &from) {
                    self.emit(SemanticError::IllegalCast {
                        from,
                        to: to.clone(),
                        span: expr.span.clone(),
                    });
                }

                to
            }

            None => {
                self.emit(SemanticError::UnrecognizedTy {
                    ty_name: expr.ty_name.clone(),
                    span: expr.span.clone(),
                });

                ResolvedTy::Untyped
            }
        };

        expr.ty = Some(ty);
    }

    fn visit_assign(&mut self, expr: &mut ast::AssignExpr) {
        expr.recurse_mut(self);

        let ty = self.resolve_assignee(expr.qualifier, &expr.name, &expr.span);
        self.check_expr_conforms(&expr.expr, &ty);

        expr.ty = Some(ty);
    }

    fn visit_array_assign(&mut self, expr: &mut ast::ArrayAssignExpr) {
        expr.recurse_mut(self);
        self.check_int_index(&expr.index);

        let array_ty = self.resolve_assignee(expr.qualifier, &expr.name, &expr.span);
        let elem_ty = self.array_elem_ty(array_ty, &expr.name, &expr.span);
        self.check_expr_conforms(&expr.expr, &elem_ty);

        expr.ty = Some(elem_ty);
    }

    fn visit_bin_op(&mut self, expr: &mut ast::BinOpExpr) {
        expr.recurse_mut(self);

        let ty = self.bin_op_ty(expr);
        expr.ty = Some(ty);
    }

    fn visit_un_op(&mut self, expr: &mut ast::UnOpExpr) {
        expr.recurse_mut(self);

        let operand_ty = expr.expr.res_ty();
        let expected_ty = match expr.op {
            UnOpKind::Negate | UnOpKind::Increment | UnOpKind::Decrement => ResolvedTy::Int,
            UnOpKind::Not => ResolvedTy::Boolean,
        };

        if operand_ty != expected_ty && !operand_ty.is_untyped() {
            self.emit(SemanticError::InvalidOperand {
                op: expr.op,
                ty: operand_ty,
                span: expr.span.clone(),
            });
        }

        expr.ty = Some(expected_ty);
    }

    fn visit_var(&mut self, expr: &mut ast::VarExpr) {
        expr.recurse_mut(self);

        let ty = match &expr.object {
            Some(object) => self.resolve_member_field(&object.res_ty(), &expr.name, &expr.span),
            None => self.resolve_name(&expr.name, &expr.span),
        };

        expr.ty = Some(ty);
    }

    fn visit_array_elem(&mut self, expr: &mut ast::ArrayElemExpr) {
        expr.recurse_mut(self);
        self.check_int_index(&expr.index);

        let array_ty = match &expr.object {
            Some(object) => self.resolve_member_field(&object.res_ty(), &expr.name, &expr.span),
            None => self.resolve_name(&expr.name, &expr.span),
        };

        let ty = self.array_elem_ty(array_ty, &expr.name, &expr.span);
        expr.ty = Some(ty);
    }

    fn visit_int_lit(&mut self, expr: &mut ast::IntLit) {
        expr.ty = Some(ResolvedTy::Int);
    }

    fn visit_bool_lit(&mut self, expr: &mut ast::BoolLit) {
        expr.ty = Some(ResolvedTy::Boolean);
    }

    fn visit_string_lit(&mut self, expr: &mut ast::StringLit) {
        expr.ty = Some(ResolvedTy::string());
    }
}
