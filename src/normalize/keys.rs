//! Identity-key extraction per schedule type.

use crate::domain::facts::{IdentityKey, ScheduleType};

use super::fields::{
    CEILING_ALIASES, CIRCUIT_ALIASES, DOOR_ALIASES, ELEC_TAG_ALIASES, LIGHTING_TAG_ALIASES,
    MECH_TAG_ALIASES, PANEL_ALIASES, PLUMB_TAG_ALIASES, ROOM_ALIASES, UNIT_ALIASES,
    WALL_TYPE_ALIASES,
};
use super::sanitize::sanitize_key_component;
use super::tree::{Row, RowExt};

/// Result of identity extraction for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Resolved(IdentityKey),
    /// The named identity field was missing, blank, or had no usable characters.
    Missing(&'static str),
}

#[cfg(test)]
impl KeyOutcome {
    pub fn into_key(self) -> Option<IdentityKey> {
        match self {
            KeyOutcome::Resolved(key) => Some(key),
            KeyOutcome::Missing(_) => None,
        }
    }
}

pub fn extract_key(schedule_type: ScheduleType, row: &Row) -> KeyOutcome {
    let resolved = match schedule_type {
        ScheduleType::Panel => panel_key(row),
        ScheduleType::UnitPlan => single(row, "unit", UNIT_ALIASES),
        ScheduleType::LightingFixture => single(row, "tag", LIGHTING_TAG_ALIASES),
        ScheduleType::ElecEquipment => single(row, "tag", ELEC_TAG_ALIASES),
        ScheduleType::MechEquipment => single(row, "tag", MECH_TAG_ALIASES),
        ScheduleType::PlumbEquipment => single(row, "tag", PLUMB_TAG_ALIASES),
        ScheduleType::WallPartition => single(row, "wall_type", WALL_TYPE_ALIASES),
        ScheduleType::Door => single(row, "door", DOOR_ALIASES),
        ScheduleType::Ceiling => ceiling_key(row),
        ScheduleType::Finish => single(row, "room", ROOM_ALIASES),
    };
    match resolved {
        Ok(key) => KeyOutcome::Resolved(key),
        Err(field) => KeyOutcome::Missing(field),
    }
}

/// Identity text for `field`, ignoring values that sanitize to nothing
/// (`"--"`, `"?"`, ...); those would collapse distinct rows onto one id.
fn identity(row: &Row, field: &'static str, aliases: &[&str]) -> Result<String, &'static str> {
    row.first_text(aliases)
        .filter(|value| !sanitize_key_component(value, "").is_empty())
        .ok_or(field)
}

fn single(row: &Row, field: &'static str, aliases: &[&str]) -> Result<IdentityKey, &'static str> {
    Ok(IdentityKey::new().with(field, identity(row, field, aliases)?))
}

fn panel_key(row: &Row) -> Result<IdentityKey, &'static str> {
    let circuit = identity(row, "circuit", CIRCUIT_ALIASES)?;
    let panel = identity(row, "panel", PANEL_ALIASES)?;
    Ok(IdentityKey::new().with("panel", panel).with("circuit", circuit))
}

fn ceiling_key(row: &Row) -> Result<IdentityKey, &'static str> {
    let ceiling_type = identity(row, "ceiling_type", CEILING_ALIASES)?;
    let mut key = IdentityKey::new().with("ceiling_type", ceiling_type);
    if let Ok(room) = identity(row, "room", ROOM_ALIASES) {
        key.insert("room", room);
    }
    Ok(key)
}
