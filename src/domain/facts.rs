//! Fact domain types
//!
//! Canonical records produced by schedule normalization: one `FactDocument`
//! per physical item (circuit, fixture, door, ...) found on a drawing sheet.

use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Value of `FactDocument::doc_type` for every schedule fact.
pub const DOC_TYPE: &str = "schedule_row";

// ============================================================================
// Schedule Types
// ============================================================================

/// Closed set of schedule kinds a row can be normalized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    Panel,
    UnitPlan,
    LightingFixture,
    ElecEquipment,
    MechEquipment,
    PlumbEquipment,
    WallPartition,
    Door,
    Ceiling,
    Finish,
}

impl ScheduleType {
    #[cfg(test)]
    pub const ALL: [ScheduleType; 10] = [
        ScheduleType::Panel,
        ScheduleType::UnitPlan,
        ScheduleType::LightingFixture,
        ScheduleType::ElecEquipment,
        ScheduleType::MechEquipment,
        ScheduleType::PlumbEquipment,
        ScheduleType::WallPartition,
        ScheduleType::Door,
        ScheduleType::Ceiling,
        ScheduleType::Finish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleType::Panel => "panel",
            ScheduleType::UnitPlan => "unit_plan",
            ScheduleType::LightingFixture => "lighting_fixture",
            ScheduleType::ElecEquipment => "elec_equipment",
            ScheduleType::MechEquipment => "mech_equipment",
            ScheduleType::PlumbEquipment => "plumb_equipment",
            ScheduleType::WallPartition => "wall_partition",
            ScheduleType::Door => "door",
            ScheduleType::Ceiling => "ceiling",
            ScheduleType::Finish => "finish",
        }
    }
}

impl std::fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Identity Keys
// ============================================================================

/// Ordered field/value pairs that distinguish one fact within its schedule type.
///
/// Insertion order is kept for display and serialization; identity comparisons
/// go through [`IdentityKey::sorted`] so field order never changes an id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityKey {
    fields: Vec<(String, String)>,
}

impl IdentityKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, replacing any previous value under the same name.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Fields ordered lexicographically by name.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        pairs
    }
}

impl Serialize for IdentityKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// ============================================================================
// Attributes
// ============================================================================

/// A single extracted attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Number(f64),
    Text(String),
    Flag(bool),
}

/// Typed attribute mapping. Empty values never make it in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AttributeBag(BTreeMap<String, AttrValue>);

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_number(&mut self, name: &str, value: f64) {
        if value.is_finite() {
            self.0.insert(name.to_string(), AttrValue::Number(value));
        }
    }

    /// Store trimmed text; blank text is pruned.
    pub fn set_text(&mut self, name: &str, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.0
                .insert(name.to_string(), AttrValue::Text(value.to_string()));
        }
    }

    pub fn set_flag(&mut self, name: &str, value: bool) {
        self.0.insert(name.to_string(), AttrValue::Flag(value));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.0.get(name) {
            Some(AttrValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(AttrValue::Text(t)) => Some(t.as_str()),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.0.get(name), Some(AttrValue::Flag(true)))
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// ============================================================================
// Sheet Metadata
// ============================================================================

/// Sheet-level metadata merged into every fact from that sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, alias = "job", alias = "job_id", skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discipline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub levels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

// ============================================================================
// Fact Documents
// ============================================================================

/// One normalized schedule row, ready for indexing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactDocument {
    pub id: String,
    pub doc_type: String,
    pub schedule_type: ScheduleType,
    pub key: IdentityKey,
    pub attributes: AttributeBag,
    pub labels: Vec<String>,
    pub content: String,
    #[serde(flatten)]
    pub sheet: SheetMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poles: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amps: Option<String>,
    /// Integral values render without a decimal part; unparseable text is kept as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kva: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_type_serializes_snake_case() {
        let json = serde_json::to_string(&ScheduleType::LightingFixture).unwrap();
        assert_eq!(json, "\"lighting_fixture\"");
        for st in ScheduleType::ALL {
            let json = serde_json::to_string(&st).unwrap();
            assert_eq!(json, format!("\"{}\"", st.as_str()));
        }
    }

    #[test]
    fn identity_key_keeps_insertion_order_but_sorts_on_request() {
        let key = IdentityKey::new().with("panel", "L1").with("circuit", "5");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"{"panel":"L1","circuit":"5"}"#);
        assert_eq!(key.sorted(), vec![("circuit", "5"), ("panel", "L1")]);
    }

    #[test]
    fn identity_key_insert_replaces() {
        let mut key = IdentityKey::new().with("tag", "RTU-1");
        key.insert("tag", "RTU-2");
        assert_eq!(key.len(), 1);
        assert_eq!(key.get("tag"), Some("RTU-2"));
    }

    #[test]
    fn attribute_bag_prunes_blank_text() {
        let mut bag = AttributeBag::new();
        bag.set_text("wire", "   ");
        bag.set_number("hp", f64::NAN);
        assert!(bag.is_empty());

        bag.set_text("wire", " #12 ");
        bag.set_number("hp", 5.0);
        assert_eq!(bag.text("wire"), Some("#12"));
        assert_eq!(bag.number("hp"), Some(5.0));
    }

    #[test]
    fn sheet_metadata_accepts_job_alias() {
        let sheet: SheetMetadata =
            serde_json::from_value(serde_json::json!({"job": "J-100", "sheet_number": "E-101"}))
                .unwrap();
        assert_eq!(sheet.project.as_deref(), Some("J-100"));
        assert_eq!(sheet.sheet_number.as_deref(), Some("E-101"));
    }
}
