use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a block kind. Stable for the lifetime of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Name <-> id table for block kinds.
///
/// Names are stored lowercased. Lookups accept any casing and surrounding
/// whitespace; when no exact name matches, the first registered name that
/// contains the query is used (`"iron"` finds `"iron_ore"`).
#[derive(Debug, Clone, Default)]
pub struct MaterialRegistry {
    names: Vec<String>,
    by_name: HashMap<String, MaterialId>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.register(name.as_ref());
        }
        registry
    }

    /// Registers `name`, returning the existing id if it is already known.
    pub fn register(&mut self, name: &str) -> MaterialId {
        let key = normalize(name);
        if let Some(id) = self.by_name.get(&key) {
            return *id;
        }
        let id = MaterialId(self.names.len() as u32);
        self.names.push(key.clone());
        self.by_name.insert(key, id);
        id
    }

    pub fn resolve(&self, name: &str) -> Option<MaterialId> {
        let key = normalize(name);
        if key.is_empty() {
            return None;
        }
        if let Some(id) = self.by_name.get(&key) {
            return Some(*id);
        }
        self.names
            .iter()
            .position(|candidate| candidate.contains(&key))
            .map(|index| MaterialId(index as u32))
    }

    pub fn canonical_name(&self, id: MaterialId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}
