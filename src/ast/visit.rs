use super::*;

pub trait AstRecurse {
    fn recurse<V: Visitor<Output = ()>>(&self, visitor: &mut V);
    fn recurse_mut<V: VisitorMut<Output = ()>>(&mut self, visitor: &mut V);
}

macro_rules! define_visitor {
    ($( $type:ident { $( $name:ident ( $arg:ident : $ty:ty ) );+ $(;)? } )+) => {
        pub trait Visitor
        where
            Self: Sized,
        {
            type Output;

            $(
                $(
                    fn $name(&mut self, $arg: &$ty) -> Self::Output;
                )+
            )+
        }

        pub trait VisitorMut
        where
            Self: Sized,
        {
            type Output;

            $(
                $(
                    fn $name(&mut self, $arg: &mut $ty) -> Self::Output;
                )+
            )+
        }

        pub trait DefaultVisitor
        where
            Self: Sized,
        {
            $( define_visitor!(@ $type { $( $name ( $arg : &$ty ) => recurse; )+ } ); )+
        }

        impl<T> Visitor for T
        where
            T: DefaultVisitor,
        {
            type Output = ();

            $(
                $(
                    fn $name(&mut self, $arg: &$ty) {
                        <Self as DefaultVisitor>::$name(self, $arg);
                    }
                )+
            )+
        }

        pub trait DefaultVisitorMut
        where
            Self: Sized,
        {
            $( define_visitor!(@ $type { $( $name ( $arg : &mut $ty ) => recurse_mut; )+ } ); )+
        }

        impl<T> VisitorMut for T
        where
            T: DefaultVisitorMut,
        {
            type Output = ();

            $(
                $(
                    fn $name(&mut self, $arg: &mut $ty) {
                        <Self as DefaultVisitorMut>::$name(self, $arg);
                    }
                )+
            )+
        }
    };

    (@ NonTerminal { $( $name:ident ( $arg:ident : $ty:ty ) => $recurse:ident; )+ }) => {
        $(
            fn $name(&mut self, $arg: $ty) {
                $arg.$recurse(self);
            }
        )+
    };

    (@ Terminal { $( $name:ident ( $arg:ident : $ty:ty ) => $recurse:ident; )+ }) => {
        $(
            #[allow(unused_variables)]
            fn $name(&mut self, $arg: $ty) {}
        )+
    };
}

define_visitor! {
    NonTerminal {
        // declarations
        visit_program(program: Program);
        visit_class(class: Class);
        visit_feature(feature: Feature);
        visit_method(method: Method);
        visit_field(field: Field);

        // stmt
        visit_stmt(stmt: Stmt);
        visit_decl(stmt: DeclStmt);
        visit_expr_stmt(stmt: ExprStmt);
        visit_if(stmt: IfStmt);
        visit_while(stmt: WhileStmt);
        visit_for(stmt: ForStmt);
        visit_block(stmt: BlockStmt);
        visit_return(stmt: ReturnStmt);

        // expr
        visit_expr(expr: Expr);
        visit_dispatch(expr: DispatchExpr);
        visit_new_array(expr: NewArrayExpr);
        visit_instanceof(expr: InstanceofExpr);
        visit_cast(expr: CastExpr);
        visit_assign(expr: AssignExpr);
        visit_array_assign(expr: ArrayAssignExpr);
        visit_bin_op(expr: BinOpExpr);
        visit_un_op(expr: UnOpExpr);
        visit_var(expr: VarExpr);
        visit_array_elem(expr: ArrayElemExpr);
    }

    Terminal {
        visit_formal(formal: Formal);
        visit_break(stmt: BreakStmt);
        visit_new(expr: NewExpr);
        visit_int_lit(expr: IntLit);
        visit_bool_lit(expr: BoolLit);
        visit_string_lit(expr: StringLit);
    }
}
