//! Electrical collector: panel circuits, lighting fixtures, equipment.
//!
//! Panels show up as `panels[]`, `panel_schedules[]`, `PANEL_SCHEDULES{name: panel}`
//! or a single `panel` mapping. Circuits sit under `circuits`,
//! `circuit_details` or `circuit_schedule`, optionally split into `left` and
//! `right` halves. A single circuit entry may describe a paired breaker,
//! either through a nested `right_side` object or through `_b`-suffixed
//! sibling fields; both forms go through [`expand_circuit_entry`].

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::domain::facts::ScheduleType;
use crate::normalize::fields::{
    CIRCUIT_ALIASES, DESCRIPTION_ALIASES, ELEC_TAG_ALIASES, LIGHTING_TAG_ALIASES, PAIRED_OBJECT,
    PAIRED_SUFFIX, PANEL_ALIASES, PANEL_HEADER_ALIASES, PHASE_LOADS, PHASE_ORDER, VOLTAGE_ALIASES,
};
use crate::normalize::outcome::Discipline;
use crate::normalize::tree::{is_present, scalar_text, set_if_absent, Row, RowExt};

use super::{Collection, ShapeCatalog};

const PANEL_CONTAINERS: &[&str] = &["panels", "panel_schedules", "panel_schedule", "panel"];
const CIRCUIT_CONTAINERS: &[&str] = &["circuits", "circuit_details", "circuit_schedule"];
const HALF_KEYS: &[&str] = &["left", "right"];

const LIGHTING_FIXTURES: ShapeCatalog = ShapeCatalog {
    schedule_type: ScheduleType::LightingFixture,
    containers: &[
        "lighting_fixtures",
        "light_fixtures",
        "fixtures",
        "lighting_fixture_schedule",
    ],
    schedule_suffix: false,
    identity_field: "tag",
    identity_aliases: LIGHTING_TAG_ALIASES,
    group_field: None,
};

const EQUIPMENT: ShapeCatalog = ShapeCatalog {
    schedule_type: ScheduleType::ElecEquipment,
    containers: &["equipment", "electrical_equipment", "equipment_schedule"],
    schedule_suffix: false,
    identity_field: "tag",
    identity_aliases: ELEC_TAG_ALIASES,
    group_field: Some("category"),
};

/// Phase-load values that are measurements rather than load names:
/// bare numbers, numbers with a VA/A/W unit, `--`, or nothing.
static MEASUREMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:--?|-?[\d,]*\.?\d+\s*(?:k?va|a|k?w)?)?$").unwrap()
});

pub(super) fn collect(subtree: &Row, out: &mut Collection) {
    collect_panels(subtree, out);
    LIGHTING_FIXTURES.collect(subtree, Discipline::Electrical, out);
    EQUIPMENT.collect(subtree, Discipline::Electrical, out);
}

// ============================================================================
// Panels
// ============================================================================

/// Panel-level values stamped onto every circuit row.
#[derive(Debug, Clone, Default)]
pub(crate) struct PanelContext {
    pub panel_name: Option<String>,
    pub voltage: Option<String>,
}

impl PanelContext {
    pub fn from_header(header: &Row, fallback_name: Option<&str>) -> Self {
        Self {
            panel_name: header
                .first_text(PANEL_HEADER_ALIASES)
                .or_else(|| fallback_name.map(str::to_string)),
            voltage: header.first_text(VOLTAGE_ALIASES),
        }
    }
}

fn collect_panels(subtree: &Row, out: &mut Collection) {
    for (key, value) in subtree {
        if !PANEL_CONTAINERS.iter().any(|c| key.eq_ignore_ascii_case(c)) {
            continue;
        }
        let path = format!("{}.{key}", Discipline::Electrical);
        match value {
            Value::Array(panels) => {
                for (i, panel) in panels.iter().enumerate() {
                    let panel_path = format!("{path}[{i}]");
                    match panel {
                        Value::Object(panel) => collect_panel(panel, None, &panel_path, out),
                        Value::Null => {}
                        _ => out.issue(Some(Discipline::Electrical), panel_path, "mapping"),
                    }
                }
            }
            Value::Object(map) if looks_like_panel(map) => collect_panel(map, None, &path, out),
            Value::Object(by_name) => {
                for (name, panel) in by_name {
                    let panel_path = format!("{path}.{name}");
                    match panel {
                        Value::Object(panel) => collect_panel(panel, Some(name), &panel_path, out),
                        Value::Null => {}
                        _ => out.issue(Some(Discipline::Electrical), panel_path, "mapping"),
                    }
                }
            }
            Value::Null => {}
            _ => out.issue(Some(Discipline::Electrical), path, "list or mapping"),
        }
    }
}

fn looks_like_panel(map: &Row) -> bool {
    CIRCUIT_CONTAINERS
        .iter()
        .chain(HALF_KEYS)
        .any(|key| map.get_ci(key).is_some())
        || map.first_text(PANEL_HEADER_ALIASES).is_some()
}

fn collect_panel(panel: &Row, name: Option<&str>, path: &str, out: &mut Collection) {
    let ctx = PanelContext::from_header(panel, name);
    for (key, value) in panel {
        let is_container = CIRCUIT_CONTAINERS.iter().any(|c| key.eq_ignore_ascii_case(c));
        let is_half = HALF_KEYS.iter().any(|h| key.eq_ignore_ascii_case(h));
        if !is_container && !is_half {
            continue;
        }
        let container_path = format!("{path}.{key}");
        for (entry_path, entry, label) in circuit_entries(value, &container_path, out) {
            push_circuit(entry, label, &ctx, &entry_path, out);
        }
    }
}

/// Circuit entries inside a container: a list, `left`/`right` halves (each
/// itself a list or a numbered mapping), or a mapping keyed by circuit number.
fn circuit_entries<'a>(
    value: &'a Value,
    path: &str,
    out: &mut Collection,
) -> Vec<(String, &'a Row, Option<&'a str>)> {
    let mut entries = Vec::new();
    match value {
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::Object(entry) => entries.push((format!("{path}[{i}]"), entry, None)),
                    Value::Null => {}
                    _ => out.issue(Some(Discipline::Electrical), format!("{path}[{i}]"), "mapping"),
                }
            }
        }
        Value::Object(map) if HALF_KEYS.iter().any(|h| map.get_ci(h).is_some()) => {
            for (key, half) in map {
                if HALF_KEYS.iter().any(|h| key.eq_ignore_ascii_case(h)) {
                    entries.extend(circuit_entries(half, &format!("{path}.{key}"), out));
                }
            }
        }
        Value::Object(by_number) => {
            for (number, entry) in by_number {
                if let Value::Object(entry) = entry {
                    entries.push((format!("{path}.{number}"), entry, Some(number.as_str())));
                }
            }
        }
        Value::Null => {}
        _ => out.issue(Some(Discipline::Electrical), path.to_string(), "list or mapping"),
    }
    entries
}

fn push_circuit(entry: &Row, label: Option<&str>, ctx: &PanelContext, path: &str, out: &mut Collection) {
    for (i, mut row) in expand_circuit_entry(entry, ctx).into_iter().enumerate() {
        if i == 0 {
            if let Some(number) = label {
                set_if_absent(&mut row, "circuit", number);
            }
            out.push(ScheduleType::Panel, path.to_string(), row);
        } else {
            out.push(ScheduleType::Panel, format!("{path}.{PAIRED_OBJECT}"), row);
        }
    }
}

// ============================================================================
// Circuit normalization (shared with explicit panel blocks)
// ============================================================================

/// Expand one circuit entry into one row per described circuit.
///
/// The first row is always the primary circuit; a second row follows when the
/// entry carries a paired circuit. Rows are returned even without a circuit
/// number so the caller can report why they were dropped.
pub(crate) fn expand_circuit_entry(entry: &Row, ctx: &PanelContext) -> Vec<Row> {
    let (primary, paired) = split_paired(entry);
    std::iter::once(primary)
        .chain(paired)
        .map(|half| normalize_circuit(half, ctx))
        .collect()
}

fn split_paired(entry: &Row) -> (Row, Option<Row>) {
    let mut primary = Row::new();
    let mut paired = Row::new();
    let mut suffixed: Vec<(&String, &str, &Value)> = Vec::new();

    for (key, value) in entry {
        if key.eq_ignore_ascii_case(PAIRED_OBJECT) {
            if let Value::Object(side) = value {
                paired.extend(side.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            continue;
        }
        match strip_paired_suffix(key) {
            Some(base) => suffixed.push((key, base, value)),
            None => {
                primary.insert(key.clone(), value.clone());
            }
        }
    }

    // `_b` siblings describe a second circuit only when they number one;
    // otherwise they are ordinary fields of the primary circuit.
    let numbers_circuit = suffixed.iter().any(|(_, base, value)| {
        CIRCUIT_ALIASES.iter().any(|a| base.eq_ignore_ascii_case(a)) && is_present(value)
    });
    for (key, base, value) in suffixed {
        if numbers_circuit {
            if !paired.has_present(base) {
                paired.insert(base.to_string(), value.clone());
            }
        } else {
            primary.insert(key.clone(), value.clone());
        }
    }

    let paired = paired.values().any(is_present).then_some(paired).map(|mut paired| {
        inherit_shared_fields(&primary, &mut paired);
        paired
    });
    (primary, paired)
}

/// Both halves of a paired breaker sit on the same panel and bus.
fn inherit_shared_fields(primary: &Row, paired: &mut Row) {
    for (aliases, field) in [(PANEL_ALIASES, "panel_name"), (VOLTAGE_ALIASES, "voltage")] {
        if paired.first_text(aliases).is_some() {
            continue;
        }
        let shared = aliases
            .iter()
            .filter_map(|alias| primary.get_ci(alias))
            .find(|value| scalar_text(value).is_some());
        if let Some(value) = shared {
            paired.insert(field.to_string(), value.clone());
        }
    }
}

fn strip_paired_suffix(key: &str) -> Option<&str> {
    let split = key.len().checked_sub(PAIRED_SUFFIX.len())?;
    let (base, suffix) = (key.get(..split)?, key.get(split..)?);
    (!base.is_empty() && suffix.eq_ignore_ascii_case(PAIRED_SUFFIX)).then_some(base)
}

fn normalize_circuit(mut row: Row, ctx: &PanelContext) -> Row {
    if let Some(circuit) = row.first_text(CIRCUIT_ALIASES) {
        set_if_absent(&mut row, "circuit", circuit);
    }
    if row.first_text(PANEL_ALIASES).is_none() {
        if let Some(name) = &ctx.panel_name {
            row.insert("panel_name".to_string(), Value::String(name.clone()));
        }
    }
    if row.first_text(VOLTAGE_ALIASES).is_none() {
        if let Some(voltage) = &ctx.voltage {
            row.insert("voltage".to_string(), Value::String(voltage.clone()));
        }
    }
    if row.first_text(DESCRIPTION_ALIASES).is_none() {
        if let Some(description) = phase_load_description(&row) {
            row.insert("description".to_string(), Value::String(description));
        }
    }
    row
}

/// First phase value (A, B, C order) that names a load instead of measuring one.
pub(crate) fn phase_load_description(row: &Row) -> Option<String> {
    let loads = row.object_ci(PHASE_LOADS)?;
    PHASE_ORDER
        .iter()
        .filter_map(|phase| loads.get_ci(phase))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|text| !MEASUREMENT.is_match(text))
        .map(str::to_string)
}
