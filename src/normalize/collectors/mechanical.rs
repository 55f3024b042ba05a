//! Mechanical collector: equipment lists, category groups and `*_SCHEDULE` keys.

use crate::domain::facts::ScheduleType;
use crate::normalize::fields::MECH_TAG_ALIASES;
use crate::normalize::outcome::Discipline;
use crate::normalize::tree::Row;

use super::{Collection, ShapeCatalog};

const EQUIPMENT: ShapeCatalog = ShapeCatalog {
    schedule_type: ScheduleType::MechEquipment,
    containers: &["equipment", "mechanical_equipment", "units"],
    schedule_suffix: true,
    identity_field: "tag",
    identity_aliases: MECH_TAG_ALIASES,
    group_field: Some("category"),
};

pub(super) fn collect(subtree: &Row, out: &mut Collection) {
    EQUIPMENT.collect(subtree, Discipline::Mechanical, out);
}
