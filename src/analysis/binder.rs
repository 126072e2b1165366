use tracing::{instrument, trace};

use crate::ast::{Class, Feature};
use crate::errors::Diagnostics;
use crate::position::Span;

use super::builtins::is_reserved;
use super::class_table::{
    ClassDescriptor, ClassTable, DefinitionLocation, FieldBinding, FieldKind, Member, MemberKind,
    MethodBinding, ParamSig,
};
use super::error::{NameKind, SemanticError};

/// Fills the field and method tables of every class with the class's own declarations.
///
/// Inherited members are not copied: lookups walk up the hierarchy instead.
pub struct MemberBinder<'dia, 'emt, 'cls> {
    diagnostics: &'dia mut Diagnostics<'emt>,
    classes: &'cls [Class],
}

impl<'dia, 'emt, 'cls> MemberBinder<'dia, 'emt, 'cls> {
    pub fn new(diagnostics: &'dia mut Diagnostics<'emt>, classes: &'cls [Class]) -> Self {
        Self {
            diagnostics,
            classes,
        }
    }

    #[instrument(level = "trace", skip_all)]
    pub fn bind(mut self, table: &mut ClassTable) {
        let ids = table.ids().collect::<Vec<_>>();

        for id in ids {
            let Some(desc) = table.get(id) else { continue };
            let parent_name = desc
                .parent()
                .and_then(|parent| table.get(parent))
                .map(|parent| parent.name().to_owned())
                .unwrap_or_default();
            let Some(decl) = desc.decl(self.classes) else { continue };

            if let Some(desc) = table.get_mut(id) {
                self.bind_class(desc, decl, parent_name);
            }
        }
    }

    fn location(class: &ClassDescriptor, decl: &Class, span: &Span) -> DefinitionLocation {
        if class.is_builtin() {
            DefinitionLocation::Builtin
        } else {
            DefinitionLocation::UserCode {
                file: decl.file.clone(),
                span: span.clone(),
            }
        }
    }

    fn bind_class(&mut self, desc: &mut ClassDescriptor, decl: &Class, parent_name: String) {
        desc.fields.enter_scope();
        desc.methods.enter_scope();

        let class_location = desc.location().clone();
        let pseudo_bindings = [
            ("this", desc.name().to_owned(), FieldKind::This),
            ("super", parent_name, FieldKind::Super),
        ];

        for (name, ty, kind) in pseudo_bindings {
            // the frame is fresh, so these cannot collide
            let _ = desc.fields.add(
                name.to_owned(),
                FieldBinding {
                    ty,
                    kind,
                    location: class_location.clone(),
                },
            );
        }

        for feature in &decl.features {
            let (kind, member_kind, name, span) = match feature {
                Feature::Field(field) => (NameKind::Field, MemberKind::Field, &field.name, &field.span),
                Feature::Method(method) => {
                    (NameKind::Method, MemberKind::Method, &method.name, &method.span)
                }
            };

            if is_reserved(name) {
                self.diagnostics
                    .error()
                    .with_file(decl.file.as_deref())
                    .with_span_and_error(SemanticError::ReservedName {
                        kind,
                        name: name.clone(),
                        span: span.clone(),
                    })
                    .emit();

                continue;
            }

            let location = Self::location(desc, decl, span);

            let previous = match feature {
                Feature::Field(field) => desc
                    .fields
                    .add(
                        field.name.clone(),
                        FieldBinding {
                            ty: field.ty.clone(),
                            kind: FieldKind::Declared,
                            location,
                        },
                    )
                    .err()
                    .and_then(|_| desc.fields.peek(&field.name))
                    .map(|binding| binding.location.clone()),

                Feature::Method(method) => desc
                    .methods
                    .add(
                        method.name.clone(),
                        MethodBinding {
                            return_ty: method.return_ty.clone(),
                            params: method
                                .params
                                .iter()
                                .map(|param| ParamSig {
                                    name: param.name.clone(),
                                    ty: param.ty.clone(),
                                })
                                .collect(),
                            location,
                        },
                    )
                    .err()
                    .and_then(|_| desc.methods.peek(&method.name))
                    .map(|binding| binding.location.clone()),
            };

            match previous {
                Some(previous) => {
                    self.diagnostics
                        .error()
                        .with_file(decl.file.as_deref())
                        .with_span_and_error(SemanticError::MultipleDefinition {
                            kind,
                            name: name.clone(),
                            span: span.clone(),
                            previous,
                        })
                        .emit();
                }

                None => {
                    trace!(class = %desc.name(), member = %name, kind = ?member_kind, "bound a member");

                    desc.members.push(Member {
                        kind: member_kind,
                        name: name.clone(),
                    });
                }
            }
        }
    }
}
