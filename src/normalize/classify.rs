//! Schedule-block classification by keyword rules.

use crate::domain::facts::ScheduleType;

use super::tree::{Row, RowExt};

/// Every rule also requires this word somewhere in the block metadata.
const SCHEDULE_WORD: &str = "schedule";

struct Rule {
    schedule_type: ScheduleType,
    any_of: &'static [&'static str],
}

// First match wins.
const RULES: &[Rule] = &[
    Rule { schedule_type: ScheduleType::Panel, any_of: &["panel"] },
    Rule { schedule_type: ScheduleType::UnitPlan, any_of: &["unit"] },
    Rule { schedule_type: ScheduleType::LightingFixture, any_of: &["lighting"] },
    Rule {
        schedule_type: ScheduleType::ElecEquipment,
        any_of: &["electrical equipment", "single line"],
    },
    Rule {
        schedule_type: ScheduleType::MechEquipment,
        any_of: &["mechanical", "rtu", "ahu", "vfd"],
    },
    Rule {
        schedule_type: ScheduleType::PlumbEquipment,
        any_of: &["plumbing", "ejector", "water heater", "wh"],
    },
    Rule { schedule_type: ScheduleType::WallPartition, any_of: &["wall", "partition"] },
    Rule { schedule_type: ScheduleType::Door, any_of: &["door"] },
    Rule { schedule_type: ScheduleType::Ceiling, any_of: &["ceiling"] },
    Rule { schedule_type: ScheduleType::Finish, any_of: &["finish"] },
];

/// Classify block metadata. `None` means the block should be skipped.
pub fn classify(kind: Option<&str>, name: Option<&str>, subtype: Option<&str>) -> Option<ScheduleType> {
    let text = [kind, name, subtype]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if !text.contains(SCHEDULE_WORD) {
        return None;
    }

    RULES
        .iter()
        .find(|rule| rule.any_of.iter().any(|word| text.contains(word)))
        .map(|rule| rule.schedule_type)
}

/// Classify a block mapping from its `type`/`name`/`subtype` fields.
pub fn classify_block(block: &Row) -> Option<ScheduleType> {
    let kind = block.first_text(&["type"]);
    let name = block.first_text(&["name"]);
    let subtype = block.first_text(&["subtype"]);
    classify(kind.as_deref(), name.as_deref(), subtype.as_deref())
}
