//! One-line human readable summaries per schedule type.

use thiserror::Error;

use crate::domain::facts::{AttributeBag, IdentityKey, ScheduleType};

use super::tree::render_f64;

/// Summary used when nothing meaningful could be formatted.
pub const FALLBACK_SUMMARY: &str = "row";

const SEPARATOR: &str = " — ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummaryError {
    #[error("identity field `{0}` missing from key")]
    MissingKey(&'static str),

    #[error("summary rendered empty")]
    Empty,
}

/// Summary for one fact. Never fails; problems resolve to [`FALLBACK_SUMMARY`].
pub fn build_summary(schedule_type: ScheduleType, key: &IdentityKey, attrs: &AttributeBag) -> String {
    match try_build_summary(schedule_type, key, attrs) {
        Ok(summary) => summary,
        Err(e) => {
            tracing::debug!(%schedule_type, error = %e, "summary fell back to placeholder");
            FALLBACK_SUMMARY.to_string()
        }
    }
}

pub fn try_build_summary(
    schedule_type: ScheduleType,
    key: &IdentityKey,
    attrs: &AttributeBag,
) -> Result<String, SummaryError> {
    let id = |field: &'static str| key.get(field).ok_or(SummaryError::MissingKey(field));
    let text = |name: &str| attrs.text(name).map(str::to_string);
    let number = |name: &str, unit: &str| attrs.number(name).map(|n| format!("{}{unit}", render_f64(n)));

    let mut line = Line::default();
    match schedule_type {
        ScheduleType::Panel => {
            line.push(format!("Panel {}", id("panel")?));
            line.push(format!("Ckt {}", id("circuit")?));
            line.opt(text("description"));
            let rating = number("rating_a", "A");
            let conduit = text("conduit");
            line.opt(match (rating, conduit) {
                (Some(rating), Some(conduit)) => Some(format!("{rating}, {conduit}")),
                (rating, conduit) => rating.or(conduit),
            });
        }
        ScheduleType::UnitPlan => {
            line.push(format!("Unit {}", id("unit")?));
            line.opt(text("description"));
        }
        ScheduleType::LightingFixture => {
            line.push(format!("Fixture {}", id("tag")?));
            line.opt(text("fixture_type").or_else(|| text("description")));
            line.opt(number("lumens", " lm"));
            line.opt(text("cct"));
            line.opt(text("mounting"));
        }
        ScheduleType::ElecEquipment => {
            line.push(format!("Equipment {}", id("tag")?));
            line.opt(text("description"));
            line.opt(text("voltage"));
            line.opt(number("rating_a", "A"));
        }
        ScheduleType::MechEquipment => {
            line.push(format!("Mech {}", id("tag")?));
            line.opt(text("description").or_else(|| text("category")));
            line.opt(number("hp", " HP"));
            line.opt(number("btu", " BTU"));
            line.opt(text("voltage"));
        }
        ScheduleType::PlumbEquipment => {
            line.push(format!("Plumbing {}", id("tag")?));
            line.opt(text("description").or_else(|| text("category")));
            line.opt(number("gpm", " GPM"));
            line.opt(text("manufacturer"));
        }
        ScheduleType::WallPartition => {
            line.push(format!("Wall {}", id("wall_type")?));
            line.opt(text("fire_rating"));
            line.opt(number("stc", "").map(|stc| format!("STC {stc}")));
            line.opt(text("stud_gauge"));
            line.opt(number("layers", " layers"));
        }
        ScheduleType::Door => {
            line.push(format!("Door {}", id("door")?));
            line.opt(text("size"));
            line.opt(text("material_frame"));
            line.opt(text("fire_rating"));
            line.opt(text("hardware_set").map(|hw| format!("HW {hw}")));
        }
        ScheduleType::Ceiling => {
            line.push(format!("Ceiling {}", id("ceiling_type")?));
            line.opt(key.get("room").map(|room| format!("Room {room}")));
            line.opt(text("grid"));
            line.opt(number("ceiling_height_in", "in"));
            line.opt(text("acoustic"));
        }
        ScheduleType::Finish => {
            line.push(format!("Room {}", id("room")?));
            line.opt(text("finish_floor").map(|f| format!("Floor {f}")));
            line.opt(text("finish_wall").map(|f| format!("Wall {f}")));
            line.opt(text("finish_ceiling").map(|f| format!("Ceiling {f}")));
            line.opt(text("base").map(|f| format!("Base {f}")));
        }
    }
    line.finish()
}

#[derive(Default)]
struct Line {
    segments: Vec<String>,
}

impl Line {
    fn push(&mut self, segment: String) {
        let segment = segment.trim();
        if !segment.is_empty() {
            self.segments.push(segment.to_string());
        }
    }

    fn opt(&mut self, segment: Option<String>) {
        if let Some(segment) = segment {
            self.push(segment);
        }
    }

    fn finish(self) -> Result<String, SummaryError> {
        if self.segments.is_empty() {
            return Err(SummaryError::Empty);
        }
        Ok(self.segments.join(SEPARATOR))
    }
}
