use indexmap::IndexSet;

use crate::ast::{self, DefaultVisitor, Program};

/// The distinct string literals of a program, in the order a depth-first walk meets them.
#[derive(Debug, Clone, Default)]
pub struct StringPool {
    strings: IndexSet<String>,
}

impl StringPool {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the index of the string, which determines its label.
    pub fn insert(&mut self, value: &str) -> usize {
        match self.strings.get_index_of(value) {
            Some(idx) => idx,
            None => self.strings.insert_full(value.to_owned()).0,
        }
    }

    pub fn get_index_of(&self, value: &str) -> Option<usize> {
        self.strings.get_index_of(value)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.strings.iter().map(String::as_str).enumerate()
    }
}

pub struct StringCollector {
    pool: StringPool,
}

impl StringCollector {
    pub fn collect(program: &Program) -> StringPool {
        let mut collector = Self {
            pool: StringPool::new(),
        };

        collector.visit_program(program);

        collector.pool
    }
}

impl DefaultVisitor for StringCollector {
    fn visit_string_lit(&mut self, expr: &ast::StringLit) {
        self.pool.insert(&expr.value);
    }
}
