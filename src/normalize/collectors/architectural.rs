//! Architectural collector: walls, doors, ceilings and room finishes.
//!
//! Each sub-collector tags its rows with its own schedule type.

use crate::domain::facts::ScheduleType;
use crate::normalize::fields::{CEILING_ALIASES, DOOR_ALIASES, ROOM_ALIASES, WALL_TYPE_ALIASES};
use crate::normalize::outcome::Discipline;
use crate::normalize::tree::Row;

use super::{Collection, ShapeCatalog};

const WALLS: ShapeCatalog = ShapeCatalog {
    schedule_type: ScheduleType::WallPartition,
    containers: &[
        "wall_types",
        "partition_types",
        "walls",
        "partitions",
        "wall_schedule",
        "partition_schedule",
    ],
    schedule_suffix: false,
    identity_field: "wall_type",
    identity_aliases: WALL_TYPE_ALIASES,
    group_field: None,
};

const DOORS: ShapeCatalog = ShapeCatalog {
    schedule_type: ScheduleType::Door,
    containers: &["doors", "door_schedule"],
    schedule_suffix: false,
    identity_field: "door_number",
    identity_aliases: DOOR_ALIASES,
    group_field: None,
};

const CEILINGS: ShapeCatalog = ShapeCatalog {
    schedule_type: ScheduleType::Ceiling,
    containers: &["ceilings", "ceiling_types", "ceiling_schedule", "rcp_ceilings"],
    schedule_suffix: false,
    identity_field: "ceiling_type",
    identity_aliases: CEILING_ALIASES,
    group_field: None,
};

const FINISHES: ShapeCatalog = ShapeCatalog {
    schedule_type: ScheduleType::Finish,
    containers: &[
        "finishes",
        "room_finishes",
        "finish_schedule",
        "room_finish_schedule",
    ],
    schedule_suffix: false,
    identity_field: "room",
    identity_aliases: ROOM_ALIASES,
    group_field: None,
};

const SUB_COLLECTORS: [&ShapeCatalog; 4] = [&WALLS, &DOORS, &CEILINGS, &FINISHES];

pub(super) fn collect(subtree: &Row, out: &mut Collection) {
    for catalog in SUB_COLLECTORS {
        catalog.collect(subtree, Discipline::Architectural, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn architectural(subtree: Value) -> Collection {
        let mut out = Collection::default();
        collect(subtree.as_object().unwrap(), &mut out);
        out
    }

    fn of_type(out: &Collection, st: ScheduleType) -> Vec<&Row> {
        out.rows
            .iter()
            .filter(|r| r.schedule_type == st)
            .map(|r| &r.row)
            .collect()
    }

    #[test]
    fn each_sub_collector_tags_its_rows() {
        let out = architectural(json!({
            "wall_types": [{"partition_type": "W1", "stc": 45}],
            "door_schedule": {"rows": [{"mark": "101A", "size": "3'-0\" x 7'-0\""}]},
            "ceilings": [{"type": "ACT-1", "room": "101"}],
            "room_finishes": {"101": {"floor": "CPT-1"}}
        }));
        assert_eq!(of_type(&out, ScheduleType::WallPartition)[0]["wall_type"], json!("W1"));
        assert_eq!(of_type(&out, ScheduleType::Door)[0]["door_number"], json!("101A"));
        assert_eq!(of_type(&out, ScheduleType::Ceiling)[0]["ceiling_type"], json!("ACT-1"));
        assert_eq!(of_type(&out, ScheduleType::Finish)[0]["room"], json!("101"));
        assert_eq!(out.rows.len(), 4);
    }

    #[test]
    fn wall_type_keyed_by_mapping_key() {
        let out = architectural(json!({"partitions": {"P3": {"fire_rating": "1 HR"}}}));
        assert_eq!(out.rows[0].row["wall_type"], json!("P3"));
    }
}
