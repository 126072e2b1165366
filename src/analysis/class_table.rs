use std::io::{self, Write};
use std::iter::successors;

use indexmap::IndexMap;
use slotmap::{new_key_type, SlotMap};

use crate::ast::ty::{ResolvedTy, TyNameKind, OBJECT};
use crate::ast::Class;
use crate::position::Span;

use super::builtins::BUILTIN_CLASSES;
use super::scope::ScopeTable;

new_key_type! {
    pub struct ClassId;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionLocation {
    Builtin,
    UserCode { file: Option<String>, span: Span },
}

impl DefinitionLocation {
    pub fn span(&self) -> Option<&Span> {
        match self {
            Self::Builtin => None,
            Self::UserCode { span, .. } => Some(span),
        }
    }

    pub fn file(&self) -> Option<&str> {
        match self {
            Self::Builtin => None,
            Self::UserCode { file, .. } => file.as_deref(),
        }
    }
}

/// Where the declaration of a class comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassOrigin {
    /// An index into the built-in class declarations.
    Builtin(usize),

    /// An index into the classes of the analyzed program.
    User(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Declared,
    /// The `this` pseudo-binding.
    This,
    /// The `super` pseudo-binding.
    Super,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    /// The declared type name; the class name for the pseudo-bindings (empty for `super` at the root).
    pub ty: String,
    pub kind: FieldKind,
    pub location: DefinitionLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSig {
    pub name: String,
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBinding {
    pub return_ty: String,
    pub params: Vec<ParamSig>,
    pub location: DefinitionLocation,
}

impl MethodBinding {
    /// Whether both methods take the same parameter types and return the same type.
    ///
    /// Type names are compared after resolution, so `A[]` and `A []` agree.
    pub fn same_signature(&self, other: &MethodBinding, table: &ClassTable) -> bool {
        table.same_ty_name(&self.return_ty, &other.return_ty)
            && self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(lhs, rhs)| table.same_ty_name(&lhs.ty, &rhs.ty))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Member {
    pub kind: MemberKind,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    pub(super) name: String,
    pub(super) parent: Option<ClassId>,
    pub(super) declared_parent: Option<String>,
    pub(super) children: Vec<ClassId>,
    pub(super) fields: ScopeTable<FieldBinding>,
    pub(super) methods: ScopeTable<MethodBinding>,
    pub(super) members: Vec<Member>,
    pub(super) builtin: bool,
    pub(super) extendable: bool,
    pub(super) origin: ClassOrigin,
    pub(super) location: DefinitionLocation,
}

impl ClassDescriptor {
    pub(super) fn new(
        name: String,
        declared_parent: Option<String>,
        origin: ClassOrigin,
        location: DefinitionLocation,
    ) -> Self {
        Self {
            name,
            parent: None,
            declared_parent,
            children: vec![],
            fields: ScopeTable::new(),
            methods: ScopeTable::new(),
            members: vec![],
            builtin: matches!(origin, ClassOrigin::Builtin(_)),
            extendable: true,
            origin,
            location,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    /// The superclass name as written in the declaration.
    pub fn declared_parent(&self) -> Option<&str> {
        self.declared_parent.as_deref()
    }

    pub fn children(&self) -> &[ClassId] {
        &self.children
    }

    pub fn fields(&self) -> &ScopeTable<FieldBinding> {
        &self.fields
    }

    pub fn methods(&self) -> &ScopeTable<MethodBinding> {
        &self.methods
    }

    /// The class's own fields and methods in declaration order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn declared_methods(&self) -> impl Iterator<Item = &str> + '_ {
        self.members
            .iter()
            .filter(|member| member.kind == MemberKind::Method)
            .map(|member| member.name.as_str())
    }

    /// The number of fields declared by the class itself, not counting the pseudo-bindings.
    pub fn declared_field_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|(_, binding)| binding.kind == FieldKind::Declared)
            .count()
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    pub fn is_extendable(&self) -> bool {
        self.extendable
    }

    pub fn origin(&self) -> ClassOrigin {
        self.origin
    }

    pub fn location(&self) -> &DefinitionLocation {
        &self.location
    }

    /// Returns the declaration the descriptor was built from, given the classes of the program.
    pub fn decl<'a>(&self, classes: &'a [Class]) -> Option<&'a Class> {
        match self.origin {
            ClassOrigin::Builtin(idx) => BUILTIN_CLASSES.get(idx),
            ClassOrigin::User(idx) => classes.get(idx),
        }
    }
}

/// Owns every class descriptor of a compilation run.
///
/// Descriptors refer to each other by `ClassId`; iteration follows registration order.
#[derive(Debug, Clone)]
pub struct ClassTable {
    classes: SlotMap<ClassId, ClassDescriptor>,
    names: IndexMap<String, ClassId>,
    root: ClassId,
}

impl ClassTable {
    pub(super) fn new(root: ClassDescriptor) -> Self {
        let mut classes = SlotMap::with_key();
        let mut names = IndexMap::new();
        let name = root.name.clone();
        let root = classes.insert(root);
        names.insert(name, root);

        Self {
            classes,
            names,
            root,
        }
    }

    /// Registers a new class. Returns `None` if the name is already taken.
    pub(super) fn insert(&mut self, descriptor: ClassDescriptor) -> Option<ClassId> {
        if self.names.contains_key(&descriptor.name) {
            return None;
        }

        let name = descriptor.name.clone();
        let id = self.classes.insert(descriptor);
        self.names.insert(name, id);

        Some(id)
    }

    pub(super) fn get_mut(&mut self, id: ClassId) -> Option<&mut ClassDescriptor> {
        self.classes.get_mut(id)
    }

    /// Makes `parent` the superclass of `child`, detaching it from its previous parent if any.
    pub(super) fn set_parent(&mut self, child: ClassId, parent: ClassId) {
        if let Some(old) = self.classes.get(child).and_then(|desc| desc.parent) {
            if let Some(old) = self.classes.get_mut(old) {
                old.children.retain(|&id| id != child);
            }
        }

        if let Some(desc) = self.classes.get_mut(child) {
            desc.parent = Some(parent);
        }

        if let Some(desc) = self.classes.get_mut(parent) {
            desc.children.push(child);
        }
    }

    pub fn root(&self) -> ClassId {
        self.root
    }

    pub fn get(&self, id: ClassId) -> Option<&ClassDescriptor> {
        self.classes.get(id)
    }

    pub fn id_of(&self, name: &str) -> Option<ClassId> {
        self.names.get(name).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<&ClassDescriptor> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.names.values().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &ClassDescriptor)> + '_ {
        self.names
            .values()
            .filter_map(|&id| self.classes.get(id).map(|desc| (id, desc)))
    }

    /// Walks up the parent chain starting with `id` itself.
    ///
    /// The walk is bounded by the number of classes, so it terminates even on a malformed hierarchy.
    pub fn ancestors(&self, id: ClassId) -> impl Iterator<Item = (ClassId, &ClassDescriptor)> + '_ {
        successors(self.get(id).map(|desc| (id, desc)), |(_, desc)| {
            desc.parent
                .and_then(|parent| self.get(parent).map(|desc| (parent, desc)))
        })
        .take(self.len())
    }

    pub fn is_subclass(&self, sub: ClassId, sup: ClassId) -> bool {
        self.ancestors(sub).any(|(id, _)| id == sup)
    }

    pub fn is_subclass_by_name(&self, sub: &str, sup: &str) -> bool {
        match (self.id_of(sub), self.id_of(sup)) {
            (Some(sub), Some(sup)) => self.is_subclass(sub, sup),
            _ => false,
        }
    }

    /// Finds a field visible in `class`, searching its ancestors too.
    /// The `this` and `super` pseudo-bindings are only visible in their own class.
    pub fn lookup_field(&self, class: ClassId, name: &str) -> Option<(ClassId, &FieldBinding)> {
        self.ancestors(class).find_map(|(id, desc)| {
            desc.fields
                .lookup(name)
                .filter(|binding| id == class || binding.kind == FieldKind::Declared)
                .map(|binding| (id, binding))
        })
    }

    /// Finds a method callable on `class`, returning the most-derived declaration.
    pub fn lookup_method(&self, class: ClassId, name: &str) -> Option<(ClassId, &MethodBinding)> {
        self.ancestors(class)
            .find_map(|(id, desc)| desc.methods.lookup(name).map(|binding| (id, binding)))
    }

    /// Resolves a declared type name. `void` resolves as well; callers reject it where it's invalid.
    pub fn resolve_ty_name(&self, ty_name: &str) -> Option<ResolvedTy> {
        match TyNameKind::parse(ty_name) {
            TyNameKind::Int => Some(ResolvedTy::Int),
            TyNameKind::Boolean => Some(ResolvedTy::Boolean),
            TyNameKind::Void => Some(ResolvedTy::Void),
            TyNameKind::Named(name) if self.contains(name) => Some(ResolvedTy::class(name)),
            TyNameKind::Named(_) => None,

            TyNameKind::Array(elem) => match self.resolve_ty_name(elem)? {
                ResolvedTy::Void | ResolvedTy::Array(_) => None,
                elem => Some(ResolvedTy::array_of(elem)),
            },
        }
    }

    /// Whether two declared type names denote the same type.
    /// Unresolvable names only match when spelled identically.
    pub fn same_ty_name(&self, lhs: &str, rhs: &str) -> bool {
        match (self.resolve_ty_name(lhs), self.resolve_ty_name(rhs)) {
            (Some(lhs), Some(rhs)) => lhs == rhs,
            _ => lhs == rhs,
        }
    }

    /// The subtype relation on static types.
    pub fn is_subtype(&self, lhs: &ResolvedTy, rhs: &ResolvedTy) -> bool {
        if lhs == rhs {
            return true;
        }

        match (lhs, rhs) {
            (ResolvedTy::Untyped, _) | (_, ResolvedTy::Untyped) => true,
            (ResolvedTy::Null, ResolvedTy::Class(_) | ResolvedTy::Array(_)) => true,
            (ResolvedTy::Class(sub), ResolvedTy::Class(sup)) => self.is_subclass_by_name(sub, sup),
            (ResolvedTy::Array(_), ResolvedTy::Class(sup)) => sup == OBJECT,

            (ResolvedTy::Array(sub), ResolvedTy::Array(sup)) => {
                matches!((&**sub, &**sup), (ResolvedTy::Class(_), ResolvedTy::Class(_)))
                    && self.is_subtype(sub, sup)
            }

            _ => false,
        }
    }

    /// Writes the hierarchy as an indented tree, two spaces per level.
    pub fn write_tree(&self, mut out: impl Write) -> io::Result<()> {
        let mut stack = vec![(self.root, 0usize)];

        while let Some((id, depth)) = stack.pop() {
            let Some(desc) = self.get(id) else { continue };
            writeln!(out, "{:indent$}{}", "", desc.name, indent = depth * 2)?;

            // guards against a child list that loops back (never produced by the builder)
            if depth < self.len() {
                stack.extend(desc.children.iter().rev().map(|&child| (child, depth + 1)));
            }
        }

        Ok(())
    }
}
