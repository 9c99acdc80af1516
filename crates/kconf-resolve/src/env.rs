//! The working value environment of one resolution run.

use kconf_schema::{OptionGraph, OptionId, Value};

use crate::snapshot::Snapshot;

/// Mapping from option to its currently assigned value.
///
/// Every declared option is present from the start, seeded with its type's
/// base default. Only the resolver mutates it, and only by committing a
/// whole pass at once.
#[derive(Debug, Clone)]
pub struct Environment<'g> {
    graph: &'g OptionGraph,
    values: Vec<Value>,
}

impl<'g> Environment<'g> {
    /// Every option at its type's base minimum.
    pub fn new(graph: &'g OptionGraph) -> Self {
        let values = graph.options().map(|(_, o)| o.ty.base_default()).collect();
        Self { graph, values }
    }

    /// Rebuild an environment from a frozen snapshot of the same graph.
    pub fn from_snapshot(graph: &'g OptionGraph, snapshot: &Snapshot) -> Self {
        let mut env = Self::new(graph);
        for (id, option) in graph.options() {
            if let Some(value) = snapshot.get(&option.name) {
                env.values[id.index()] = value.clone();
            }
        }
        env
    }

    pub fn graph(&self) -> &'g OptionGraph {
        self.graph
    }

    pub fn get(&self, id: OptionId) -> &Value {
        &self.values[id.index()]
    }

    /// Look up by name; `None` for symbols the graph does not declare.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.graph.lookup(name).map(|id| self.get(id))
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, id: OptionId, value: Value) {
        self.values[id.index()] = value;
    }

    /// Replace all values with the buffered results of a pass and return
    /// the ids whose value changed.
    pub(crate) fn commit(&mut self, next: Vec<Value>) -> Vec<OptionId> {
        debug_assert_eq!(next.len(), self.values.len());
        let changed = self
            .graph
            .option_ids()
            .filter(|id| self.values[id.index()] != next[id.index()])
            .collect();
        self.values = next;
        changed
    }
}
