//! Attribute extraction: a fixed vocabulary spanning all disciplines, plus
//! labels derived from the row description.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::domain::facts::{AttributeBag, ScheduleType};

use super::fields::{DESCRIPTION_ALIASES, KVA_ALIASES, POLES_ALIASES, RATING_ALIASES, VOLTAGE_ALIASES};
use super::tree::{Row, RowExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Number,
    Text,
}

struct AttrSpec {
    name: &'static str,
    aliases: &'static [&'static str],
    kind: Kind,
}

const fn num(name: &'static str, aliases: &'static [&'static str]) -> AttrSpec {
    AttrSpec { name, aliases, kind: Kind::Number }
}

const fn text(name: &'static str, aliases: &'static [&'static str]) -> AttrSpec {
    AttrSpec { name, aliases, kind: Kind::Text }
}

const VOCABULARY: &[AttrSpec] = &[
    text("description", DESCRIPTION_ALIASES),
    text("category", &["category", "equipment_type"]),
    // electrical
    text("voltage", VOLTAGE_ALIASES),
    text("phase", &["phase", "phases", "ph"]),
    num("rating_a", RATING_ALIASES),
    num("poles", POLES_ALIASES),
    text("wire", &["wire", "wire_size", "conductors", "conductor"]),
    text("conduit", &["conduit", "conduit_size"]),
    num("kva", KVA_ALIASES),
    num("busbar_a", &["busbar_a", "bus_rating", "bus_amps", "busbar", "bus"]),
    text("disconnect", &["disconnect", "disconnect_type", "disc"]),
    // motors and equipment
    num("hp", &["hp", "horsepower", "motor_hp"]),
    num("kw", &["kw", "kilowatts"]),
    num("mca", &["mca", "min_circuit_amps"]),
    num("mop", &["mop", "mocp", "max_overcurrent"]),
    num("fla", &["fla", "full_load_amps"]),
    num("btu", &["btu", "btuh", "capacity_btu"]),
    num("gpm", &["gpm", "flow_gpm", "flow"]),
    num("head", &["head", "head_ft", "tdh"]),
    text("manufacturer", &["manufacturer", "mfr", "make"]),
    text("model", &["model", "model_number", "catalog_number"]),
    text("serves", &["serves", "area_served", "location"]),
    // lighting
    text("fixture_type", &["fixture_type", "fixture", "fixture_description"]),
    num("lumens", &["lumens", "lm", "lumen_output"]),
    text("lamp_type", &["lamp_type", "lamp", "source"]),
    text("cct", &["cct", "color_temp", "color_temperature"]),
    num("cri", &["cri"]),
    text("mounting", &["mounting", "mount", "mounting_type"]),
    text("dimming", &["dimming", "dimmable"]),
    // walls, ceilings, finishes, doors
    num("stc", &["stc", "stc_rating"]),
    text("fire_rating", &["fire_rating", "fire_rating_hr", "rating_hr", "ul_rating"]),
    text("stud_gauge", &["stud_gauge", "stud_ga", "gauge"]),
    num("layers", &["layers", "gwb_layers", "layer_count"]),
    num("ceiling_height_in", &["ceiling_height_in", "ceiling_height", "height_in"]),
    text("acoustic", &["acoustic", "acoustic_rating", "nrc"]),
    text("grid", &["grid", "grid_type", "suspension"]),
    text("finish_floor", &["finish_floor", "floor_finish"]),
    text("finish_wall", &["finish_wall", "wall_finish"]),
    text("finish_ceiling", &["finish_ceiling", "ceiling_finish"]),
    text("base", &["base", "base_finish"]),
    text("hardware_set", &["hardware_set", "hardware", "hw_set"]),
    text("size", &["size", "door_size", "dimensions"]),
    text("material_frame", &["material_frame", "frame_material", "frame"]),
    text("material", &["material", "door_material"]),
];

/// Bare column names only trusted on room finish rows.
const FINISH_VOCABULARY: &[AttrSpec] = &[
    text("finish_floor", &["floor"]),
    text("finish_wall", &["wall", "walls"]),
    text("finish_ceiling", &["ceiling"]),
];

struct LabelRule {
    label: &'static str,
    pattern: &'static str,
    flag: Option<&'static str>,
}

const LABEL_RULES: &[LabelRule] = &[
    LabelRule { label: "EM", pattern: r"\b(?:em|emergency)\b", flag: None },
    LabelRule { label: "GFCI", pattern: r"gfci", flag: None },
    LabelRule { label: "WP", pattern: r"\b(?:wp|weatherproof)\b", flag: None },
    LabelRule { label: "Spare", pattern: r"\bspare\b", flag: Some("is_spare") },
    LabelRule { label: "Space", pattern: r"\bspace\b", flag: Some("is_space") },
];

static LABEL_PATTERNS: LazyLock<Vec<(&'static LabelRule, Regex)>> = LazyLock::new(|| {
    LABEL_RULES
        .iter()
        .map(|rule| (rule, Regex::new(rule.pattern).unwrap()))
        .collect()
});

/// Attributes plus the labels lifted out of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    pub attributes: AttributeBag,
    pub labels: Vec<String>,
}

pub fn extract_attributes(schedule_type: ScheduleType, row: &Row) -> Extracted {
    let mut attributes = AttributeBag::new();

    let finish_extras: &[AttrSpec] = if schedule_type == ScheduleType::Finish {
        FINISH_VOCABULARY
    } else {
        &[]
    };
    for spec in VOCABULARY.iter().chain(finish_extras) {
        if attributes.contains(spec.name) {
            continue;
        }
        match spec.kind {
            Kind::Number => {
                if let Some(value) = row.first_present(spec.aliases).and_then(parse_float) {
                    attributes.set_number(spec.name, value);
                }
            }
            Kind::Text => {
                if let Some(value) = row.first_text(spec.aliases) {
                    attributes.set_text(spec.name, &value);
                }
            }
        }
    }

    let labels = derive_labels(attributes.text("description").unwrap_or_default());
    for rule in LABEL_RULES {
        if let Some(flag) = rule.flag {
            if labels.iter().any(|l| l == rule.label) {
                attributes.set_flag(flag, true);
            }
        }
    }

    Extracted { attributes, labels }
}

/// Marker labels found in a description, in fixed rule order.
pub fn derive_labels(description: &str) -> Vec<String> {
    let lowered = description.to_lowercase();
    LABEL_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(&lowered))
        .map(|(rule, _)| rule.label.to_string())
        .collect()
}

/// Numeric coercion for attribute values. Non-numeric text yields `None`.
pub fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_str(s),
        _ => None,
    }
}

/// Lower-case, drop commas, `in` and quote marks, then parse.
pub fn parse_float_str(raw: &str) -> Option<f64> {
    let cleaned = raw
        .to_lowercase()
        .replace(',', "")
        .replace("in", "")
        .replace(['"', '\''], "");
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::facts::AttrValue;
    use serde_json::json;

    fn attrs(st: ScheduleType, row: Value) -> Extracted {
        extract_attributes(st, row.as_object().unwrap())
    }

    #[test]
    fn parse_float_cleans_common_noise() {
        assert_eq!(parse_float_str("1,200"), Some(1200.0));
        assert_eq!(parse_float_str("108 in"), Some(108.0));
        assert_eq!(parse_float_str("96\""), Some(96.0));
        assert_eq!(parse_float_str(" 2.5 "), Some(2.5));
        assert_eq!(parse_float_str("20A"), None);
        assert_eq!(parse_float_str("N/A"), None);
        assert_eq!(parse_float_str(""), None);
        assert_eq!(parse_float_str("NaN"), None);
        assert_eq!(parse_float(&json!(7)), Some(7.0));
        assert_eq!(parse_float(&json!(null)), None);
    }

    #[test]
    fn panel_attributes() {
        let out = attrs(
            ScheduleType::Panel,
            json!({
                "load_name": "Receptacles", "trip": "20", "poles": 1,
                "wire": "#12", "conduit": "3/4\" EMT", "voltage": "120"
            }),
        );
        let a = &out.attributes;
        assert_eq!(a.text("description"), Some("Receptacles"));
        assert_eq!(a.number("rating_a"), Some(20.0));
        assert_eq!(a.number("poles"), Some(1.0));
        assert_eq!(a.text("wire"), Some("#12"));
        assert_eq!(a.text("conduit"), Some("3/4\" EMT"));
        assert_eq!(a.text("voltage"), Some("120"));
        assert!(out.labels.is_empty());
    }

    #[test]
    fn unparseable_numbers_are_omitted_not_zeroed() {
        let out = attrs(ScheduleType::MechEquipment, json!({"tag": "EF-1", "hp": "1/2", "mca": ""}));
        assert!(!out.attributes.contains("hp"));
        assert!(!out.attributes.contains("mca"));
    }

    #[test]
    fn empty_values_are_pruned() {
        let out = attrs(
            ScheduleType::Door,
            json!({"door_number": "101", "size": "  ", "hardware_set": null, "frame": [] }),
        );
        assert!(out.attributes.is_empty());
    }

    #[test]
    fn labels_from_description() {
        assert_eq!(derive_labels("EM Lights - Corridor"), vec!["EM"]);
        assert_eq!(derive_labels("Emergency egress"), vec!["EM"]);
        assert_eq!(derive_labels("GFCI Receptacle WP"), vec!["GFCI", "WP"]);
        assert_eq!(derive_labels("Weatherproof GFCI"), vec!["GFCI", "WP"]);
        assert_eq!(derive_labels("SPARE"), vec!["Spare"]);
        assert_eq!(derive_labels("Space"), vec!["Space"]);
        assert!(derive_labels("HVAC system item").is_empty());
    }

    #[test]
    fn spare_and_space_set_flags() {
        let out = attrs(ScheduleType::Panel, json!({"circuit": "9", "description": "SPARE"}));
        assert_eq!(out.labels, vec!["Spare"]);
        assert!(out.attributes.flag("is_spare"));
        assert!(!out.attributes.flag("is_space"));
        assert_eq!(out.attributes.get("is_spare"), Some(&AttrValue::Flag(true)));
    }

    #[test]
    fn finish_rows_accept_bare_column_names() {
        let row = json!({"room": "101", "floor": "CPT-1", "walls": "PT-2", "ceiling": "ACT-1"});
        let out = attrs(ScheduleType::Finish, row.clone());
        assert_eq!(out.attributes.text("finish_floor"), Some("CPT-1"));
        assert_eq!(out.attributes.text("finish_wall"), Some("PT-2"));
        assert_eq!(out.attributes.text("finish_ceiling"), Some("ACT-1"));

        let out = attrs(ScheduleType::Door, row);
        assert!(!out.attributes.contains("finish_floor"));
    }

    #[test]
    fn explicit_finish_columns_win() {
        let out = attrs(
            ScheduleType::Finish,
            json!({"room": "1", "finish_floor": "VCT", "floor": "CPT"}),
        );
        assert_eq!(out.attributes.text("finish_floor"), Some("VCT"));
    }

    #[test]
    fn architectural_numbers() {
        let out = attrs(
            ScheduleType::WallPartition,
            json!({"wall_type": "W1", "stc": "50", "layers": 2, "fire_rating": "1 HR", "stud_gauge": "20 GA"}),
        );
        assert_eq!(out.attributes.number("stc"), Some(50.0));
        assert_eq!(out.attributes.number("layers"), Some(2.0));
        assert_eq!(out.attributes.text("fire_rating"), Some("1 HR"));
        let out = attrs(ScheduleType::Ceiling, json!({"ceiling_type": "C1", "ceiling_height": "108 IN"}));
        assert_eq!(out.attributes.number("ceiling_height_in"), Some(108.0));
    }
}
