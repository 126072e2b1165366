use indexmap::IndexMap;
use tracing::trace;

use crate::analysis::{ClassId, ClassTable};

/// The virtual-dispatch table of a class.
///
/// Slots are ordered by the root-most declaration of each method name; the value of a slot is
/// the class holding the most-derived definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchTable {
    slots: IndexMap<String, String>,
}

impl DispatchTable {
    pub fn new(table: &ClassTable, class: ClassId) -> Self {
        let mut chain = table.ancestors(class).collect::<Vec<_>>();
        chain.reverse();

        let mut slots = IndexMap::new();

        for (_, desc) in chain {
            for method in desc.declared_methods() {
                // an override keeps the slot of the overridden method
                if let Some(previous) = slots.insert(method.to_owned(), desc.name().to_owned()) {
                    trace!(class = %desc.name(), %method, overridden = %previous, "overrode a slot");
                }
            }
        }

        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the slot index of a method and the class defining it.
    pub fn get(&self, method: &str) -> Option<(usize, &str)> {
        self.slots
            .get_full(method)
            .map(|(idx, _, class)| (idx, class.as_str()))
    }

    /// Iterates over `(defining class, method name)` in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.slots
            .iter()
            .map(|(method, class)| (class.as_str(), method.as_str()))
    }
}
