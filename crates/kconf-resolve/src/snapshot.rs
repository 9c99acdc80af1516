//! The frozen result of a resolution run.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use sha2::{Digest, Sha256};

use kconf_schema::{SymbolType, Value};

use crate::env::Environment;
use crate::overrides::Overrides;

/// One resolved option.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SnapshotEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SymbolType,
    pub value: Value,
}

impl SnapshotEntry {
    /// `y`/`m`/`n` for bool and tristate, the literal text otherwise.
    pub fn render(&self) -> String {
        self.value.to_string()
    }
}

/// Immutable mapping from option name to resolved value, in declaration
/// order. Nothing hands out mutable access once it is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<SnapshotEntry>,
    index: HashMap<String, usize>,
}

impl Snapshot {
    /// Freeze a settled environment.
    pub(crate) fn freeze(env: &Environment<'_>) -> Self {
        let entries: Vec<SnapshotEntry> = env
            .graph()
            .options()
            .map(|(id, option)| SnapshotEntry {
                name: option.name.clone(),
                ty: option.ty,
                value: env.get(id).clone(),
            })
            .collect();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();
        Self { entries, index }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entry(name).map(|e| &e.value)
    }

    pub fn entry(&self, name: &str) -> Option<&SnapshotEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Rendered value of `name`.
    pub fn render(&self, name: &str) -> Option<String> {
        self.entry(name).map(SnapshotEntry::render)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SnapshotEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every value as an override, for re-resolving from this snapshot.
    pub fn to_overrides(&self) -> Overrides {
        self.entries.iter().map(|e| (e.name.as_str(), e.render())).collect()
    }

    /// SHA-256 over `name=value` lines in declaration order, as hex.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for entry in &self.entries {
            hasher.update(entry.name.as_bytes());
            hasher.update(b"=");
            hasher.update(entry.render().as_bytes());
            hasher.update(b"\n");
        }
        let digest: [u8; 32] = hasher.finalize().into();
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Serializes as a name → value map in declaration order. Ints stay
/// numbers; everything else is its rendered text.
impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            match &entry.value {
                Value::Int(i) => map.serialize_entry(&entry.name, i)?,
                other => map.serialize_entry(&entry.name, &other.to_string())?,
            }
        }
        map.end()
    }
}
