use std::collections::HashSet;

use tracing::{debug, instrument, trace};

use crate::ast::ty::OBJECT;
use crate::ast::Class;
use crate::errors::Diagnostics;

use super::builtins::{is_reserved, BUILTIN_CLASSES};
use super::class_table::{ClassDescriptor, ClassId, ClassOrigin, ClassTable, DefinitionLocation};
use super::error::{NameKind, SemanticError};

/// Builds the class table and links every class to its superclass.
///
/// Problems with the hierarchy are reported and repaired on the spot, so the result is always a
/// tree rooted at `Object`.
pub struct ClassHierarchyBuilder<'dia, 'emt, 'cls> {
    diagnostics: &'dia mut Diagnostics<'emt>,
    classes: &'cls [Class],
}

impl<'dia, 'emt, 'cls> ClassHierarchyBuilder<'dia, 'emt, 'cls> {
    pub fn new(diagnostics: &'dia mut Diagnostics<'emt>, classes: &'cls [Class]) -> Self {
        Self {
            diagnostics,
            classes,
        }
    }

    #[instrument(level = "trace", skip_all)]
    pub fn build(mut self) -> ClassTable {
        let mut table = Self::register_builtins();
        self.register_user_classes(&mut table);
        self.resolve_parents(&mut table);
        self.break_cycles(&mut table);

        debug!(class_count = table.len(), "built the class hierarchy");

        table
    }

    fn emit(&mut self, file: Option<&str>, err: SemanticError) {
        self.diagnostics
            .error()
            .with_file(file)
            .with_span_and_error(err)
            .emit();
    }

    fn register_builtins() -> ClassTable {
        let mut builtins = BUILTIN_CLASSES.iter().enumerate().map(|(idx, class)| {
            let mut desc = ClassDescriptor::new(
                class.name.clone(),
                class.parent.clone(),
                ClassOrigin::Builtin(idx),
                DefinitionLocation::Builtin,
            );

            // only the root may be extended
            desc.extendable = class.parent.is_none();

            desc
        });

        let mut table = match builtins.next() {
            Some(root) => ClassTable::new(root),
            None => unreachable!("the built-in class list starts with Object"),
        };

        for desc in builtins {
            table.insert(desc);
        }

        table
    }

    fn register_user_classes(&mut self, table: &mut ClassTable) {
        for (idx, class) in self.classes.iter().enumerate() {
            let file = class.file.as_deref();

            if is_reserved(&class.name) {
                self.emit(
                    file,
                    SemanticError::ReservedName {
                        kind: NameKind::Class,
                        name: class.name.clone(),
                        span: class.span.clone(),
                    },
                );

                continue;
            }

            if let Some(existing) = table.get_by_name(&class.name) {
                let err = if existing.is_builtin() {
                    SemanticError::BuiltinRedefined {
                        class: class.name.clone(),
                        span: class.span.clone(),
                    }
                } else {
                    SemanticError::MultipleClassDefinition {
                        class: class.name.clone(),
                        span: class.span.clone(),
                        previous: existing.location().clone(),
                    }
                };

                self.emit(file, err);

                continue;
            }

            let desc = ClassDescriptor::new(
                class.name.clone(),
                Some(class.parent.clone().unwrap_or_else(|| OBJECT.to_owned())),
                ClassOrigin::User(idx),
                DefinitionLocation::UserCode {
                    file: class.file.clone(),
                    span: class.span.clone(),
                },
            );

            trace!(name = %class.name, "registered a class");
            table.insert(desc);
        }
    }

    fn resolve_parents(&mut self, table: &mut ClassTable) {
        let root = table.root();
        let ids = table.ids().filter(|&id| id != root).collect::<Vec<_>>();

        for id in ids {
            let Some(desc) = table.get(id) else { continue };
            let name = desc.name().to_owned();
            let parent_name = desc.declared_parent().unwrap_or(OBJECT).to_owned();
            let location = desc.location().clone();

            let parent = match table.get_by_name(&parent_name) {
                Some(parent) => {
                    if !parent.is_extendable() {
                        self.emit(
                            location.file(),
                            SemanticError::FinalSuperclass {
                                class: name.clone(),
                                parent: parent_name.clone(),
                                span: location.span().cloned().unwrap_or_default(),
                            },
                        );
                    }

                    table.id_of(&parent_name).unwrap_or(root)
                }

                None => {
                    self.emit(
                        location.file(),
                        SemanticError::MissingSuperclass {
                            class: name.clone(),
                            parent: parent_name.clone(),
                            span: location.span().cloned().unwrap_or_default(),
                        },
                    );

                    root
                }
            };

            trace!(class = %name, parent = %parent_name, "linked a class to its parent");
            table.set_parent(id, parent);
        }
    }

    fn break_cycles(&mut self, table: &mut ClassTable) {
        let root = table.root();
        let ids = table.ids().collect::<Vec<_>>();

        for id in ids {
            let mut visited = HashSet::new();
            let mut current = Some(id);

            while let Some(node) = current {
                if !visited.insert(node) {
                    self.detach_cycle(table, node, root);

                    break;
                }

                current = table.get(node).and_then(|desc| desc.parent());
            }
        }
    }

    /// Reports the cycle passing through `start` and reattaches all of its members to the root.
    fn detach_cycle(&mut self, table: &mut ClassTable, start: ClassId, root: ClassId) {
        let mut cycle = vec![start];
        let mut node = table.get(start).and_then(|desc| desc.parent());

        while let Some(id) = node.filter(|&id| id != start) {
            cycle.push(id);
            node = table.get(id).and_then(|desc| desc.parent());

            if cycle.len() > table.len() {
                break;
            }
        }

        let names = cycle
            .iter()
            .filter_map(|&id| table.get(id))
            .map(|desc| desc.name().to_owned())
            .collect::<Vec<_>>();

        if let Some(desc) = table.get(start) {
            let location = desc.location().clone();

            debug!(cycle = ?names, "detected an inheritance cycle");

            self.emit(
                location.file(),
                SemanticError::InheritanceCycle {
                    class: desc.name().to_owned(),
                    cycle: names,
                    span: location.span().cloned().unwrap_or_default(),
                },
            );
        }

        for id in cycle {
            table.set_parent(id, root);
        }
    }
}
