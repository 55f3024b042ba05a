//! Field alias tables shared by collectors, key extraction and fact assembly.
//!
//! Order matters: the first present alias wins.

pub const PANEL_ALIASES: &[&str] = &["panel_name", "panel", "panel_id", "panel_designation"];
pub const PANEL_HEADER_ALIASES: &[&str] = &[
    "panel_name",
    "panel",
    "name",
    "panel_id",
    "designation",
];
pub const VOLTAGE_ALIASES: &[&str] = &["voltage", "volts", "system_voltage", "volt"];

pub const CIRCUIT_ALIASES: &[&str] = &[
    "circuit",
    "circuit_number",
    "circuit_no",
    "ckt",
    "ckt_no",
    "number",
];
pub const DESCRIPTION_ALIASES: &[&str] = &[
    "description",
    "load_name",
    "load_description",
    "load",
    "desc",
    "service",
];
pub const RATING_ALIASES: &[&str] = &[
    "rating_a",
    "amps",
    "amperage",
    "trip",
    "trip_a",
    "breaker",
    "breaker_size",
    "ocp",
];
pub const POLES_ALIASES: &[&str] = &["poles", "pole", "p"];
pub const KVA_ALIASES: &[&str] = &["kva", "load_kva", "connected_kva"];
pub const PHASE_LOADS: &str = "phase_loads";
pub const PHASE_ORDER: &[&str] = &["A", "B", "C"];

/// Nested object describing the second circuit of a paired breaker.
pub const PAIRED_OBJECT: &str = "right_side";
/// Suffix on flat sibling fields describing the second circuit.
pub const PAIRED_SUFFIX: &str = "_b";

pub const UNIT_ALIASES: &[&str] = &["unit", "unit_type", "unit_name", "unit_plan", "type", "name"];
pub const LIGHTING_TAG_ALIASES: &[&str] = &[
    "tag",
    "type_mark",
    "fixture_tag",
    "mark",
    "type",
    "fixture_id",
];
pub const ELEC_TAG_ALIASES: &[&str] = &["tag", "equipment_tag", "mark", "name", "designation", "id"];
pub const MECH_TAG_ALIASES: &[&str] = &["tag", "desig.", "desig", "name", "mark", "equipment_tag"];
pub const PLUMB_TAG_ALIASES: &[&str] = &["tag", "fixture_id", "heater_id", "mark", "id"];
pub const WALL_TYPE_ALIASES: &[&str] = &["wall_type", "partition_type", "type", "mark", "tag"];
pub const DOOR_ALIASES: &[&str] = &["door_number", "door_no", "door", "number", "mark", "tag"];
pub const CEILING_ALIASES: &[&str] = &["ceiling_type", "type", "mark", "tag"];
pub const ROOM_ALIASES: &[&str] = &["room", "room_number", "room_no", "room_name", "space"];

/// Keys under which a `*_SCHEDULE` mapping may hold its row list.
pub const NESTED_LIST_KEYS: &[&str] = &[
    "units",
    "fans",
    "devices",
    "equipment",
    "items",
    "rows",
    "louvers",
];
