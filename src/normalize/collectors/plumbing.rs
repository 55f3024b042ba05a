//! Plumbing collector: fixtures, water heaters, pumps and `*_SCHEDULE` keys.

use crate::domain::facts::ScheduleType;
use crate::normalize::fields::PLUMB_TAG_ALIASES;
use crate::normalize::outcome::Discipline;
use crate::normalize::tree::Row;

use super::{Collection, ShapeCatalog};

const EQUIPMENT: ShapeCatalog = ShapeCatalog {
    schedule_type: ScheduleType::PlumbEquipment,
    containers: &[
        "fixtures",
        "plumbing_fixtures",
        "water_heaters",
        "pumps",
        "equipment",
    ],
    schedule_suffix: true,
    identity_field: "tag",
    identity_aliases: PLUMB_TAG_ALIASES,
    group_field: Some("category"),
};

pub(super) fn collect(subtree: &Row, out: &mut Collection) {
    EQUIPMENT.collect(subtree, Discipline::Plumbing, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn plumbing(subtree: Value) -> Collection {
        let mut out = Collection::default();
        collect(subtree.as_object().unwrap(), &mut out);
        out
    }

    #[test]
    fn tag_from_fixture_and_heater_ids() {
        let out = plumbing(json!({
            "fixtures": [{"fixture_id": "WC-1", "description": "Water closet"}],
            "water_heaters": [{"heater_id": "WH-1", "gpm": "4.5"}],
            "EJECTOR_SCHEDULE": {"items": [{"MARK": "EP-1"}]}
        }));
        let tags: Vec<_> = out.rows.iter().map(|r| r.row["tag"].clone()).collect();
        assert!(tags.contains(&json!("WC-1")));
        assert!(tags.contains(&json!("WH-1")));
        assert!(tags.contains(&json!("EP-1")));
        assert!(out.rows.iter().all(|r| r.schedule_type == ScheduleType::PlumbEquipment));
    }

    #[test]
    fn generic_id_is_last_resort() {
        let out = plumbing(json!({"pumps": [{"id": 7, "mark": "CP-1"}]}));
        assert_eq!(out.rows[0].row["tag"], json!("CP-1"));
    }
}
