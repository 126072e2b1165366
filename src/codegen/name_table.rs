use indexmap::IndexMap;
use phf::phf_map;

use crate::analysis::ClassTable;

use super::error::CodegenError;

/// The classes whose ids the runtime hard-codes.
static FIXED_IDS: phf::Map<&'static str, usize> = phf_map! {
    "Object" => 0,
    "String" => 1,
    "Sys" => 2,
    "Main" => 3,
    "TextIO" => 4,
};

/// Assigns every class a small integer id, used as the first word of its object template.
#[derive(Debug, Clone, Default)]
pub struct ClassNameTable {
    /// Sorted by id.
    names: IndexMap<String, usize>,
}

impl ClassNameTable {
    /// Fixed ids first; the rest follow in the table's registration order.
    pub fn new(table: &ClassTable) -> Result<Self, CodegenError> {
        let mut fixed = vec![None; FIXED_IDS.len()];
        let mut rest = vec![];

        for (_, desc) in table.iter() {
            match FIXED_IDS.get(desc.name()) {
                Some(&id) => fixed[id] = Some(desc.name().to_owned()),
                None => rest.push(desc.name().to_owned()),
            }
        }

        let mut names = IndexMap::with_capacity(fixed.len() + rest.len());

        for (id, name) in fixed.into_iter().enumerate() {
            let Some(name) = name else {
                let name = FIXED_IDS
                    .entries()
                    .find(|&(_, &fixed_id)| fixed_id == id)
                    .map(|(&name, _)| name.to_owned())
                    .unwrap_or_default();

                return Err(CodegenError::MissingClass { name });
            };

            names.insert(name, id);
        }

        for name in rest {
            let id = names.len();
            names.insert(name, id);
        }

        Ok(Self { names })
    }

    pub fn id_of(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over `(id, class name)` in increasing id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.names.iter().map(|(name, &id)| (id, name.as_str()))
    }
}
