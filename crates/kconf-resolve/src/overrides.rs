//! User overrides: explicit values requested for some options.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use kconf_schema::{OptionGraph, OptionId, SymbolType, Tristate, Value};

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticLog};

/// An override value as written in an override file. Booleans map to
/// `y`/`n`, numbers to their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    Flag(bool),
    Int(i64),
    Text(String),
}

impl From<OverrideValue> for String {
    fn from(value: OverrideValue) -> Self {
        match value {
            OverrideValue::Flag(b) => Tristate::from_bool(b).to_string(),
            OverrideValue::Int(i) => i.to_string(),
            OverrideValue::Text(s) => s,
        }
    }
}

/// A partial mapping from option name to the requested value text.
///
/// Values stay textual until resolution, where they are read according to
/// each option's declared type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, OverrideValue>",
    into = "BTreeMap<String, String>"
)]
pub struct Overrides {
    values: BTreeMap<String, String>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `value` for `name`, replacing any earlier request.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Builder-style [`Overrides::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Layer `other` on top; its entries win.
    pub fn merge(&mut self, other: &Overrides) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse a `NAME=VALUE` assignment.
    pub fn parse_assignment(text: &str) -> Option<(String, String)> {
        let (name, value) = text.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some((name.to_string(), value.trim().to_string()))
    }
}

impl From<BTreeMap<String, OverrideValue>> for Overrides {
    fn from(map: BTreeMap<String, OverrideValue>) -> Self {
        Self {
            values: map.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

impl From<Overrides> for BTreeMap<String, String> {
    fn from(overrides: Overrides) -> Self {
        overrides.values
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Overrides read against the graph: one typed request per option.
#[derive(Debug, Clone)]
pub(crate) struct Requests {
    values: Vec<Option<Value>>,
    /// Requests for options without a prompt; kept only to report them.
    ignored: Vec<(OptionId, Value)>,
}

impl Requests {
    /// Read every override as its option's type, logging names the graph
    /// does not declare and text that does not parse.
    pub(crate) fn parse(graph: &OptionGraph, overrides: &Overrides, log: &mut DiagnosticLog) -> Self {
        let mut values = vec![None; graph.len()];
        let mut ignored = Vec::new();

        for (name, text) in overrides.iter() {
            let Some(id) = graph.lookup(name) else {
                log.push(Diagnostic::warning(
                    DiagnosticKind::UnknownSymbol,
                    vec![name.to_string()],
                    format!("override for undeclared option '{name}' ignored"),
                ));
                continue;
            };
            let option = graph.option(id);
            let value = match option.ty.parse_value(text) {
                Ok(value) => normalize(value, option.ty, graph.group_of(id).is_some()),
                Err(err) => {
                    log.push(Diagnostic::warning(
                        DiagnosticKind::InvalidValue,
                        vec![name.to_string()],
                        format!("override for '{name}' ignored: {err}"),
                    ));
                    continue;
                }
            };
            if option.is_interactive() {
                values[id.index()] = Some(value);
            } else {
                ignored.push((id, value));
            }
        }

        Self { values, ignored }
    }

    #[cfg(test)]
    pub(crate) fn none(graph: &OptionGraph) -> Self {
        Self {
            values: vec![None; graph.len()],
            ignored: Vec::new(),
        }
    }

    pub(crate) fn get(&self, id: OptionId) -> Option<&Value> {
        self.values[id.index()].as_ref()
    }

    pub(crate) fn honored(&self, graph: &OptionGraph) -> Vec<(OptionId, Value)> {
        graph
            .option_ids()
            .filter_map(|id| self.get(id).map(|v| (id, v.clone())))
            .collect()
    }

    pub(crate) fn ignored(&self) -> &[(OptionId, Value)] {
        &self.ignored
    }
}

/// Bools never hold `m`, and choice members are either selected or not.
fn normalize(value: Value, ty: SymbolType, is_member: bool) -> Value {
    match value {
        Value::Tristate(Tristate::Module) if ty == SymbolType::Bool || is_member => {
            Value::Tristate(Tristate::Yes)
        }
        v => v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kconf_schema::OptionGraphBuilder;

    #[test]
    fn override_files_accept_mixed_value_types() {
        let text = r#"
NET = true
DEBUG = false
NR_CPUS = 8
ARCH = "arm64"
E1000 = "m"
"#;
        let overrides: Overrides = toml::from_str(text).unwrap();
        assert_eq!(overrides.get("NET"), Some("y"));
        assert_eq!(overrides.get("DEBUG"), Some("n"));
        assert_eq!(overrides.get("NR_CPUS"), Some("8"));
        assert_eq!(overrides.get("ARCH"), Some("arm64"));
        assert_eq!(overrides.get("E1000"), Some("m"));

        let json = serde_json::to_value(&overrides).unwrap();
        assert_eq!(json["NET"], serde_json::json!("y"));
    }

    #[test]
    fn merge_later_wins() {
        let mut base = Overrides::new().with("A", "y").with("B", "n");
        base.merge(&Overrides::new().with("B", "y"));
        assert_eq!(base.get("B"), Some("y"));
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn parse_assignment_splits_on_first_equals() {
        assert_eq!(
            Overrides::parse_assignment("CMDLINE=root=/dev/sda"),
            Some(("CMDLINE".into(), "root=/dev/sda".into()))
        );
        assert_eq!(Overrides::parse_assignment("=y"), None);
        assert_eq!(Overrides::parse_assignment("NOEQUALS"), None);
    }

    #[test]
    fn requests_are_typed_and_checked() {
        let mut b = OptionGraphBuilder::new();
        b.bool("B");
        b.option("N", SymbolType::Int).prompt("N");
        b.option("HIDDEN", SymbolType::Bool);
        let graph = b.build().unwrap();

        let overrides = Overrides::new()
            .with("B", "m")
            .with("N", "lots")
            .with("HIDDEN", "y")
            .with("NOPE", "y");
        let mut log = DiagnosticLog::new();
        let requests = Requests::parse(&graph, &overrides, &mut log);

        let b_id = graph.lookup("B").unwrap();
        assert_eq!(requests.get(b_id), Some(&Value::Tristate(Tristate::Yes)));
        assert_eq!(requests.get(graph.lookup("N").unwrap()), None);
        assert_eq!(requests.get(graph.lookup("HIDDEN").unwrap()), None);
        assert_eq!(requests.ignored().len(), 1);

        let kinds: Vec<_> = log.finish().into_iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::InvalidValue, DiagnosticKind::UnknownSymbol]
        );
    }
}
