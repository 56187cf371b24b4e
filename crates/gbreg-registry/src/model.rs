//! Registry data model.
//!
//! The upstream document is a JSON object mapping each GBID to its entry
//! history, newest first. Only the first entry of each history is ever
//! shown; older versions are carried along untouched.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One diagnostic record as published in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Short classification label (markdown)
    #[serde(rename = "Gb_type", default)]
    pub gb_type: String,

    /// Captured code or values at the break point
    #[serde(rename = "Context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Why the break happened (markdown)
    #[serde(rename = "Explanation", default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    /// Remediation suggestions (markdown)
    #[serde(rename = "Hints", default)]
    pub hints: Vec<String>,

    /// Supplementary notes
    #[serde(
        rename = "Additional_Info",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_info: Option<Vec<String>>,
}

impl RegistryEntry {
    /// Create an entry with only a type label.
    pub fn new(gb_type: impl Into<String>) -> Self {
        Self {
            gb_type: gb_type.into(),
            ..Default::default()
        }
    }

    /// Additional info lines, empty when absent.
    pub fn additional_info(&self) -> &[String] {
        self.additional_info.as_deref().unwrap_or_default()
    }

    /// Context snippet, `None` when absent or empty.
    pub fn context_text(&self) -> Option<&str> {
        self.context.as_deref().filter(|s| !s.is_empty())
    }

    /// Explanation, `None` when absent or empty.
    pub fn explanation_text(&self) -> Option<&str> {
        self.explanation.as_deref().filter(|s| !s.is_empty())
    }

    /// True when context, explanation or hints are missing or empty.
    pub fn has_missing_content(&self) -> bool {
        self.context_text().is_none()
            || self.explanation_text().is_none()
            || self.hints.is_empty()
    }
}

/// Canonical (upper-case) form of a GBID.
pub fn normalize_id(id: &str) -> String {
    id.trim().to_uppercase()
}

/// File stem used for a GBID in exported sites.
pub fn slug(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Snapshot of the graph-break registry.
///
/// Keeps the key order of the source document so listings match it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Registry {
    records: Vec<(String, Vec<RegistryEntry>)>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a registry document.
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    /// Number of ids, including ids with an empty history.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the registry holds no ids.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate ids and their full histories in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RegistryEntry])> {
        self.records
            .iter()
            .map(|(id, history)| (id.as_str(), history.as_slice()))
    }

    /// Iterate ids and their current entry, skipping empty histories.
    pub fn current_entries(&self) -> impl Iterator<Item = (&str, &RegistryEntry)> {
        self.records
            .iter()
            .filter_map(|(id, history)| history.first().map(|entry| (id.as_str(), entry)))
    }

    /// Look up the history for an id, ignoring case.
    pub fn history(&self, id: &str) -> Option<&[RegistryEntry]> {
        let wanted = normalize_id(id);
        self.records
            .iter()
            .find(|(key, _)| key.to_uppercase() == wanted)
            .map(|(_, history)| history.as_slice())
    }

    /// Look up the current entry for an id, ignoring case.
    pub fn current(&self, id: &str) -> Option<&RegistryEntry> {
        self.history(id).and_then(|history| history.first())
    }

    /// One record per id holding its current entry.
    pub fn flatten(&self) -> Vec<FlatRecord> {
        self.current_entries()
            .map(|(id, entry)| FlatRecord {
                id: id.to_string(),
                entry: entry.clone(),
            })
            .collect()
    }

    fn push(&mut self, id: String, history: Vec<RegistryEntry>) {
        // Last duplicate wins but keeps the first position.
        match self.records.iter_mut().find(|(key, _)| *key == id) {
            Some(existing) => existing.1 = history,
            None => self.records.push((id, history)),
        }
    }
}

impl FromIterator<(String, Vec<RegistryEntry>)> for Registry {
    fn from_iter<I: IntoIterator<Item = (String, Vec<RegistryEntry>)>>(iter: I) -> Self {
        let mut registry = Registry::new();
        for (id, history) in iter {
            registry.push(id, history);
        }
        registry
    }
}

impl Serialize for Registry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for (id, history) in &self.records {
            map.serialize_entry(id, history)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Registry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RegistryVisitor;

        impl<'de> Visitor<'de> for RegistryVisitor {
            type Value = Registry;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of GBID to entry history")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Registry, A::Error> {
                let mut registry = Registry::new();
                while let Some((id, history)) =
                    access.next_entry::<String, Vec<RegistryEntry>>()?
                {
                    registry.push(id, history);
                }
                Ok(registry)
            }
        }

        deserializer.deserialize_map(RegistryVisitor)
    }
}

/// A GBID joined with its current entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatRecord {
    pub id: String,
    #[serde(flatten)]
    pub entry: RegistryEntry,
}

impl FlatRecord {
    /// Fields considered by fuzzy search.
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        [
            Some(self.id.as_str()),
            Some(self.entry.gb_type.as_str()),
            self.entry.explanation.as_deref(),
            self.entry.context.as_deref(),
        ]
        .into_iter()
        .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "GB0002": [
            {"Gb_type": "data dependent branching", "Explanation": "Branch on a tensor value.", "Hints": []},
            {"Gb_type": "old label", "Hints": []}
        ],
        "GB0001": [
            {
                "Gb_type": "unsupported operator",
                "Context": "op: aten.foo",
                "Hints": ["rewrite using supported op"],
                "Additional_Info": ["tracked upstream"]
            }
        ],
        "GB0003": []
    }"#;

    #[test]
    fn keeps_source_order() {
        let registry = Registry::from_json(SAMPLE).unwrap();
        let ids: Vec<&str> = registry.iter().map(|(id, _)| id).collect();

        assert_eq!(ids, vec!["GB0002", "GB0001", "GB0003"]);
    }

    #[test]
    fn current_is_first_history_entry() {
        let registry = Registry::from_json(SAMPLE).unwrap();

        let entry = registry.current("GB0002").unwrap();
        assert_eq!(entry.gb_type, "data dependent branching");
        assert_eq!(registry.history("GB0002").unwrap().len(), 2);
    }

    #[test]
    fn lookup_ignores_case() {
        let registry = Registry::from_json(SAMPLE).unwrap();

        assert_eq!(registry.current("gb0001"), registry.current("GB0001"));
        assert!(registry.current("gb0001").is_some());
        assert!(registry.current("GB9999").is_none());
    }

    #[test]
    fn empty_history_has_no_current_entry() {
        let registry = Registry::from_json(SAMPLE).unwrap();

        assert_eq!(registry.len(), 3);
        assert!(registry.current("GB0003").is_none());
        assert_eq!(registry.flatten().len(), 2);
    }

    #[test]
    fn missing_optional_fields_decode() {
        let registry = Registry::from_json(r#"{"GB0100": [{"Gb_type": "bare"}]}"#).unwrap();
        let entry = registry.current("GB0100").unwrap();

        assert_eq!(entry.context, None);
        assert_eq!(entry.explanation, None);
        assert!(entry.hints.is_empty());
        assert!(entry.additional_info().is_empty());
        assert!(entry.has_missing_content());
    }

    #[test]
    fn empty_strings_count_as_missing_content() {
        let registry = Registry::from_json(
            r#"{"GB0101": [{"Gb_type": "t", "Context": "", "Explanation": "", "Hints": ["h"]}]}"#,
        )
        .unwrap();
        let entry = registry.current("GB0101").unwrap();

        assert_eq!(entry.context.as_deref(), Some(""));
        assert_eq!(entry.context_text(), None);
        assert_eq!(entry.explanation_text(), None);
        assert!(entry.has_missing_content());
    }

    #[test]
    fn complete_entry_has_no_missing_content() {
        let mut entry = RegistryEntry::new("t");
        entry.context = Some("x".to_string());
        entry.explanation = Some("why".to_string());
        entry.hints = vec!["h".to_string()];

        assert!(!entry.has_missing_content());
    }

    #[test]
    fn serializes_back_to_registry_shape() {
        let registry = Registry::from_json(SAMPLE).unwrap();
        let json = serde_json::to_string(&registry).unwrap();

        assert!(json.starts_with(r#"{"GB0002":[{"Gb_type":"data dependent branching""#));
        assert!(!json.contains("\"Context\":null"));
        assert_eq!(Registry::from_json(&json).unwrap(), registry);
    }

    #[test]
    fn flat_record_serializes_inline() {
        let registry = Registry::from_json(SAMPLE).unwrap();
        let record = &registry.flatten()[1];
        let value = serde_json::to_value(record).unwrap();

        assert_eq!(value["id"], "GB0001");
        assert_eq!(value["Gb_type"], "unsupported operator");
        assert_eq!(value["Hints"][0], "rewrite using supported op");
    }

    #[test]
    fn searchable_fields_skip_absent_values() {
        let registry = Registry::from_json(SAMPLE).unwrap();
        let records = registry.flatten();

        let fields: Vec<&str> = records[0].searchable_fields().collect();
        assert_eq!(
            fields,
            vec!["GB0002", "data dependent branching", "Branch on a tensor value."]
        );
    }

    #[test]
    fn duplicate_keys_keep_first_position() {
        let registry: Registry = vec![
            ("A".to_string(), vec![RegistryEntry::new("one")]),
            ("B".to_string(), vec![RegistryEntry::new("two")]),
            ("A".to_string(), vec![RegistryEntry::new("three")]),
        ]
        .into_iter()
        .collect();

        let flat = registry.flatten();
        assert_eq!(flat[0].id, "A");
        assert_eq!(flat[0].entry.gb_type, "three");
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn slug_and_normalize() {
        assert_eq!(normalize_id(" gb0001 "), "GB0001");
        assert_eq!(slug("GB0001"), "gb0001");
    }
}
