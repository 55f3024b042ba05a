//! Stable keys and document ids.
//!
//! A fact's id depends only on tenant, project, sheet, schedule type and
//! identity key, so re-running extraction on unchanged input reproduces it.

use crate::domain::facts::{IdentityKey, ScheduleType, SheetMetadata};

use super::sanitize::{make_document_id, sanitize_key_component, FALLBACK_TOKEN};

/// Identity field whose numeric values are zero-padded inside stable keys.
const CIRCUIT_FIELD: &str = "circuit";

/// Left-pad an all-digit value to three digits (`"5"` -> `"005"`).
/// Anything else is returned unchanged.
pub fn pad_number(value: &str) -> String {
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        format!("{value:0>3}")
    } else {
        value.to_string()
    }
}

/// `type-name1-val1-name2-val2...` with names in lexicographic order.
pub fn stable_key(schedule_type: ScheduleType, key: &IdentityKey) -> String {
    let mut parts = vec![schedule_type.as_str().to_string()];
    for (name, value) in key.sorted() {
        let value = if name == CIRCUIT_FIELD {
            pad_number(value)
        } else {
            value.to_string()
        };
        parts.push(sanitize_key_component(name, FALLBACK_TOKEN));
        parts.push(sanitize_key_component(&value, FALLBACK_TOKEN));
    }
    parts.join("-")
}

/// Document id for a fact on `sheet`.
///
/// Tenant, project and sheet each keep their slot; a missing one is written
/// as the fallback token so the prefix stays positional.
pub fn fact_id(sheet: &SheetMetadata, stable_key: &str) -> String {
    let slot = |v: &Option<String>| {
        sanitize_key_component(v.as_deref().unwrap_or_default(), FALLBACK_TOKEN)
    };
    make_document_id(&[
        slot(&sheet.tenant_id),
        slot(&sheet.project),
        slot(&sheet.sheet_number),
        stable_key.to_string(),
    ])
}
