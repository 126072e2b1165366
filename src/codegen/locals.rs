use crate::ast::{self, DefaultVisitor, Method};

/// Counts the local variable slots a method needs: one per parameter and one per declaration
/// anywhere in its body.
pub struct LocalCounter {
    count: usize,
}

impl LocalCounter {
    pub fn count(method: &Method) -> usize {
        let mut counter = Self { count: 0 };
        counter.visit_method(method);

        counter.count
    }
}

impl DefaultVisitor for LocalCounter {
    fn visit_formal(&mut self, _formal: &ast::Formal) {
        self.count += 1;
    }

    fn visit_decl(&mut self, _stmt: &ast::DeclStmt) {
        self.count += 1;
    }
}
