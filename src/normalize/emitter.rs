//! Fact emission: pick a source mode for the document, then turn every
//! (schedule type, row) pair into a fact or an explicit drop.
//!
//! Explicit `blocks` are authoritative. When a document carries any, the
//! discipline collectors are never consulted, so one schedule can't be
//! counted twice through two representations.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::facts::{FactDocument, ScheduleType, SheetMetadata, DOC_TYPE};

use super::attributes::{extract_attributes, parse_float, Extracted};
use super::classify::classify_block;
use super::collectors::electrical::{expand_circuit_entry, PanelContext};
use super::collectors::{collect_all, Collection, SourcedRow};
use super::fields::{
    CIRCUIT_ALIASES, KVA_ALIASES, PAIRED_OBJECT, PANEL_ALIASES, POLES_ALIASES, RATING_ALIASES,
};
use super::identity::{fact_id, stable_key};
use super::keys::{extract_key, KeyOutcome};
use super::outcome::{DropReason, DroppedRow, Extraction, SourceMode};
use super::summary::build_summary;
use super::tree::{render_f64, scalar_text, Row, RowExt};

const BLOCKS_KEY: &str = "blocks";
const BLOCK_ROWS_KEY: &str = "rows";

/// Emits facts for documents of one sheet.
#[derive(Debug, Clone)]
pub struct FactEmitter {
    sheet: SheetMetadata,
}

impl FactEmitter {
    pub fn new(sheet: SheetMetadata) -> Self {
        Self { sheet }
    }

    /// Extract every fact from one document, with drops and shape issues.
    pub fn extract(&self, document: &Value) -> Extraction {
        let (mode, collection) = self.source_rows(document);
        let mut extraction = Extraction::empty(mode);
        extraction.issues = collection.issues;

        for outcome in self.outcomes(collection.rows) {
            match outcome {
                Ok(fact) => extraction.facts.push(fact),
                Err(dropped) => {
                    debug!(
                        schedule_type = %dropped.schedule_type,
                        source = %dropped.source,
                        reason = %dropped.reason,
                        "row dropped"
                    );
                    extraction.dropped.push(dropped);
                }
            }
        }

        debug!(
            mode = ?extraction.mode,
            emitted = extraction.facts.len(),
            dropped = extraction.dropped.len(),
            issues = extraction.issues.len(),
            "document extracted"
        );
        extraction
    }

    fn source_rows(&self, document: &Value) -> (SourceMode, Collection) {
        let Some(root) = document.as_object() else {
            return (SourceMode::Fallback, Collection::default());
        };
        match root.array_ci(BLOCKS_KEY).filter(|blocks| !blocks.is_empty()) {
            Some(blocks) => (SourceMode::Blocks, block_rows(blocks)),
            None => {
                let collection = collect_all(root);
                for issue in &collection.issues {
                    warn!(discipline = ?issue.discipline, path = %issue.path, "malformed container skipped: {issue}");
                }
                (SourceMode::Fallback, collection)
            }
        }
    }

    /// Lazily resolve rows into facts, dropping repeats of an id already emitted.
    fn outcomes(
        &self,
        rows: Vec<SourcedRow>,
    ) -> impl Iterator<Item = Result<FactDocument, DroppedRow>> + '_ {
        let mut seen = HashSet::new();
        rows.into_iter().map(move |sourced| -> Result<FactDocument, DroppedRow> {
            let fact = self.emit_row(&sourced)?;
            if !seen.insert(fact.id.clone()) {
                return Err(DroppedRow {
                    schedule_type: sourced.schedule_type,
                    source: sourced.source,
                    reason: DropReason::Duplicate { id: fact.id },
                });
            }
            Ok(fact)
        })
    }

    fn emit_row(&self, sourced: &SourcedRow) -> Result<FactDocument, DroppedRow> {
        let schedule_type = sourced.schedule_type;
        let row = &sourced.row;

        let key = match extract_key(schedule_type, row) {
            KeyOutcome::Resolved(key) => key,
            KeyOutcome::Missing(field) => {
                return Err(DroppedRow {
                    schedule_type,
                    source: sourced.source.clone(),
                    reason: DropReason::NoIdentity { field },
                })
            }
        };

        let Extracted { attributes, labels } = extract_attributes(schedule_type, row);
        let content = build_summary(schedule_type, &key, &attributes);
        let id = fact_id(&self.sheet, &stable_key(schedule_type, &key));

        let circuit_number = match schedule_type {
            ScheduleType::Panel => key.get("circuit").map(str::to_string),
            _ => row.first_text(CIRCUIT_ALIASES),
        };

        Ok(FactDocument {
            id,
            doc_type: DOC_TYPE.to_string(),
            schedule_type,
            panel_name: row.first_text(PANEL_ALIASES),
            circuit_number,
            poles: row.first_text(POLES_ALIASES),
            amps: row.first_text(RATING_ALIASES),
            kva: row.first_present(KVA_ALIASES).and_then(kva_value),
            description: attributes.text("description").map(str::to_string),
            key,
            attributes,
            labels,
            content,
            sheet: self.sheet.clone(),
            embedding: None,
        })
    }
}

/// Rows of every classified block. Unclassified blocks are skipped whole.
fn block_rows(blocks: &[Value]) -> Collection {
    let mut out = Collection::default();
    for (b, block) in blocks.iter().enumerate() {
        let block_path = format!("{BLOCKS_KEY}[{b}]");
        let Value::Object(block) = block else {
            out.issue(None, block_path, "mapping");
            continue;
        };
        let Some(schedule_type) = classify_block(block) else {
            debug!(block = %block_path, "unclassified block skipped");
            continue;
        };
        let Some(rows) = block.get_ci(BLOCK_ROWS_KEY) else {
            continue;
        };
        let Value::Array(rows) = rows else {
            out.issue(None, format!("{block_path}.{BLOCK_ROWS_KEY}"), "list");
            continue;
        };

        let ctx = PanelContext::from_header(block, None);
        for (i, row) in rows.iter().enumerate() {
            let row_path = format!("{block_path}.{BLOCK_ROWS_KEY}[{i}]");
            match row {
                Value::Object(row) => push_block_row(schedule_type, row, &ctx, row_path, &mut out),
                Value::Null => {}
                _ => out.issue(None, row_path, "mapping"),
            }
        }
    }
    out
}

fn push_block_row(
    schedule_type: ScheduleType,
    row: &Row,
    ctx: &PanelContext,
    path: String,
    out: &mut Collection,
) {
    if schedule_type != ScheduleType::Panel {
        out.push(schedule_type, path, row.clone());
        return;
    }
    for (i, circuit) in expand_circuit_entry(row, ctx).into_iter().enumerate() {
        let source = if i == 0 {
            path.clone()
        } else {
            format!("{path}.{PAIRED_OBJECT}")
        };
        out.push(schedule_type, source, circuit);
    }
}

/// Numbers render without a decimal part when integral; text that doesn't
/// parse is kept as text.
fn kva_value(value: &Value) -> Option<Value> {
    match parse_float(value) {
        Some(kva) if kva.fract() == 0.0 && kva.abs() < 1e15 => Some(Value::from(kva as i64)),
        Some(kva) => serde_json::Number::from_f64(kva)
            .map(Value::Number)
            .or_else(|| Some(Value::String(render_f64(kva)))),
        None => scalar_text(value).map(Value::String),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sheet() -> SheetMetadata {
        SheetMetadata {
            tenant_id: Some("t1".into()),
            project: Some("p1".into()),
            sheet_number: Some("E-101".into()),
            ..Default::default()
        }
    }

    fn extract(document: Value) -> Extraction {
        FactEmitter::new(sheet()).extract(&document)
    }

    fn panel_doc() -> Value {
        json!({
            "electrical": {
                "panels": [{
                    "panel_name": "L1",
                    "voltage": "208Y/120",
                    "circuits": [
                        {"circuit": "15", "load_name": "Receptacles", "trip": 20, "poles": 1,
                         "right_side": {"circuit": "16", "load_name": "Lights", "trip": 15, "poles": 1}},
                        {"circuit": "17", "load_name": "GFCI Receptacle WP", "trip": "20", "kva": 1.5}
                    ]
                }]
            }
        })
    }

    #[test]
    fn explicit_blocks_take_precedence_over_discipline_trees() {
        let out = extract(json!({
            "blocks": [{
                "type": "Panel Schedule",
                "name": "L1",
                "rows": [{"circuit": "1", "description": "Lobby lights", "trip": 20}]
            }],
            "electrical": {
                "panels": [{"panel_name": "L1", "circuits": [
                    {"circuit": "1", "description": "Fallback copy"},
                    {"circuit": "2", "description": "Fallback only"}
                ]}]
            }
        }));
        assert_eq!(out.mode, SourceMode::Blocks);
        assert_eq!(out.facts.len(), 1);
        let fact = &out.facts[0];
        assert_eq!(fact.description.as_deref(), Some("Lobby lights"));
        assert_eq!(fact.panel_name.as_deref(), Some("L1"));
        assert!(out.facts.iter().all(|f| f.description.as_deref() != Some("Fallback only")));
    }

    #[test]
    fn unclassified_blocks_are_skipped() {
        let out = extract(json!({
            "blocks": [
                {"type": "General Notes", "rows": [{"tag": "N1"}]},
                {"type": "Door Schedule", "rows": [{"door_number": "101"}, "garbage"]}
            ],
            "architectural": {"doors": [{"door_number": "999"}]}
        }));
        assert_eq!(out.mode, SourceMode::Blocks);
        assert_eq!(out.facts.len(), 1);
        assert_eq!(out.facts[0].key.get("door"), Some("101"));
        assert_eq!(out.issues.len(), 1);
        assert_eq!(out.issues[0].path, "blocks[1].rows[1]");
    }

    #[test]
    fn empty_blocks_list_uses_fallback() {
        let out = extract(json!({
            "blocks": [],
            "architectural": {"doors": [{"door_number": "101"}]}
        }));
        assert_eq!(out.mode, SourceMode::Fallback);
        assert_eq!(out.facts.len(), 1);
    }

    #[test]
    fn ids_are_stable_across_runs() {
        let doc = panel_doc();
        let first: Vec<_> = extract(doc.clone()).facts.into_iter().map(|f| f.id).collect();
        let second: Vec<_> = extract(doc).facts.into_iter().map(|f| f.id).collect();
        assert_eq!(first, second);
        assert!(first.contains(&"t1-p1-E-101-panel-circuit-015-panel-L1".to_string()));
    }

    #[test]
    fn right_side_expands_to_two_facts_on_same_panel() {
        let out = extract(panel_doc());
        assert_eq!(out.facts.len(), 3);
        let fifteen = out.facts.iter().find(|f| f.circuit_number.as_deref() == Some("15")).unwrap();
        let sixteen = out.facts.iter().find(|f| f.circuit_number.as_deref() == Some("16")).unwrap();
        assert_eq!(fifteen.panel_name.as_deref(), Some("L1"));
        assert_eq!(sixteen.panel_name.as_deref(), Some("L1"));
        assert_eq!(sixteen.description.as_deref(), Some("Lights"));
        assert_eq!(sixteen.amps.as_deref(), Some("15"));
        assert_eq!(sixteen.attributes.text("voltage"), Some("208Y/120"));
        assert_ne!(fifteen.id, sixteen.id);
    }

    #[test]
    fn suffixed_siblings_expand_like_right_side() {
        let out = extract(json!({
            "electrical": {"panels": [{"panel_name": "L1", "circuits": [
                {"ckt": "15", "load_name": "Receptacles", "ckt_b": "16", "load_name_b": "Lights"}
            ]}]}
        }));
        let mut circuits: Vec<_> = out.facts.iter().filter_map(|f| f.circuit_number.clone()).collect();
        circuits.sort();
        assert_eq!(circuits, vec!["15", "16"]);
        assert!(out.facts.iter().all(|f| f.panel_name.as_deref() == Some("L1")));
    }

    #[test]
    fn blank_primary_still_emits_numbered_half() {
        let out = extract(json!({
            "electrical": {"panels": [{"panel_name": "L1", "circuits": [
                {"circuit": "", "load_name": "Spare", "right_side": {"circuit": "16", "load_name": "Lights"}}
            ]}]}
        }));
        assert_eq!(out.facts.len(), 1);
        assert_eq!(out.facts[0].circuit_number.as_deref(), Some("16"));
        assert_eq!(out.dropped.len(), 1);
        assert_eq!(out.dropped[0].reason, DropReason::NoIdentity { field: "circuit" });
    }

    #[test]
    fn phase_load_text_becomes_description() {
        let out = extract(json!({
            "electrical": {"panels": [{"panel_name": "MDP", "circuits": [
                {"circuit": "3", "phase_loads": {"A": "11473 VA", "B": "MV-400 (Surge Protector)", "C": null}}
            ]}]}
        }));
        assert_eq!(out.facts.len(), 1);
        let description = out.facts[0].description.clone().unwrap();
        assert!(description.to_lowercase().contains("surge protector"));
        assert!(out.facts[0].content.contains("Surge Protector"));
    }

    #[test]
    fn empty_or_unrelated_input_yields_nothing() {
        for doc in [
            json!({}),
            json!({"title_block": {"sheet": "E-101"}, "notes": ["see spec"]}),
            json!(null),
            json!([1, 2, 3]),
            json!("text"),
        ] {
            let out = extract(doc);
            assert!(out.facts.is_empty());
            assert!(out.dropped.is_empty());
        }
    }

    #[test]
    fn malformed_subtrees_are_reported_not_fatal() {
        let out = extract(json!({
            "electrical": "oops",
            "mechanical": {"equipment": [{"tag": "AHU-1"}]}
        }));
        assert_eq!(out.facts.len(), 1);
        assert_eq!(out.issues.len(), 1);
    }

    #[test]
    fn disciplines_are_independent() {
        let electrical = json!({"panels": [{"panel_name": "L1", "circuits": [{"circuit": "1", "load_name": "Lights"}]}]});
        let mechanical = json!({"equipment": [{"DESIG.": "RTU-1"}]});
        let plumbing = json!({"fixtures": [{"fixture_id": "WC-1"}]});
        let architectural = json!({"doors": [{"door_number": "101"}]});

        let mut forward = Row::new();
        forward.insert("ELECTRICAL".into(), electrical.clone());
        forward.insert("Mechanical".into(), mechanical.clone());
        forward.insert("plumbing".into(), plumbing.clone());
        forward.insert("architectural".into(), architectural.clone());
        let mut reverse = Row::new();
        reverse.insert("architectural".into(), architectural);
        reverse.insert("plumbing".into(), plumbing);
        reverse.insert("Mechanical".into(), mechanical);
        reverse.insert("ELECTRICAL".into(), electrical);

        for doc in [forward, reverse] {
            let out = extract(Value::Object(doc));
            assert_eq!(out.facts.len(), 4);
            let types: HashSet<_> = out.facts.iter().map(|f| f.schedule_type).collect();
            assert_eq!(
                types,
                HashSet::from([
                    ScheduleType::Panel,
                    ScheduleType::MechEquipment,
                    ScheduleType::PlumbEquipment,
                    ScheduleType::Door,
                ])
            );
        }
    }

    #[test]
    fn duplicate_rows_emit_once() {
        let out = extract(json!({
            "electrical": {"panels": [{"panel_name": "L1",
                "circuits": [{"circuit": "1", "load_name": "Lights"}],
                "circuit_details": [{"circuit": 1, "load_name": "Lights"}]
            }]}
        }));
        assert_eq!(out.facts.len(), 1);
        assert_eq!(out.dropped.len(), 1);
        assert!(matches!(out.dropped[0].reason, DropReason::Duplicate { .. }));
    }

    #[test]
    fn derived_scalars_render_as_strings() {
        let out = extract(panel_doc());
        let fact = out.facts.iter().find(|f| f.circuit_number.as_deref() == Some("17")).unwrap();
        assert_eq!(fact.amps.as_deref(), Some("20"));
        assert_eq!(fact.kva, Some(json!(1.5)));
        assert_eq!(fact.labels, vec!["GFCI", "WP"]);
        assert_eq!(fact.doc_type, "schedule_row");
        assert_eq!(fact.sheet.sheet_number.as_deref(), Some("E-101"));

        let fifteen = out.facts.iter().find(|f| f.circuit_number.as_deref() == Some("15")).unwrap();
        assert_eq!(fifteen.poles.as_deref(), Some("1"));
        assert_eq!(fifteen.content, "Panel L1 — Ckt 15 — Receptacles — 20A");
    }

    #[test]
    fn kva_rendering() {
        assert_eq!(kva_value(&json!(3.0)), Some(json!(3)));
        assert_eq!(kva_value(&json!("2")), Some(json!(2)));
        assert_eq!(kva_value(&json!("1.25")), Some(json!(1.25)));
        assert_eq!(kva_value(&json!("N/A")), Some(json!("N/A")));
    }

    #[test]
    fn door_rating_is_not_read_as_amperage() {
        let out = extract(json!({"architectural": {"doors": [{"door_number": "1", "rating": "90 MIN"}]}}));
        let fact = &out.facts[0];
        assert_eq!(fact.amps, None);
        assert_eq!(fact.attributes.number("rating_a"), None);
    }

    #[test]
    fn paired_block_rows_keep_row_level_panel() {
        let out = extract(json!({"blocks": [{
            "type": "Panel Schedule",
            "name": "Lighting Panel Schedule",
            "rows": [{"panel": "L1", "voltage": "208", "circuit": "15", "right_side": {"circuit": "16"}}]
        }]}));
        assert_eq!(out.mode, SourceMode::Blocks);
        assert_eq!(out.facts.len(), 2);
        for fact in &out.facts {
            assert_eq!(fact.panel_name.as_deref(), Some("L1"));
            assert_eq!(fact.attributes.text("voltage"), Some("208"));
        }
        assert_eq!(out.facts[1].circuit_number.as_deref(), Some("16"));
        assert_eq!(out.facts[1].id, "t1-p1-E-101-panel-circuit-016-panel-L1");
    }

    #[test]
    fn suffixed_block_rows_keep_row_level_panel() {
        let out = extract(json!({"blocks": [{
            "type": "Panel Schedule",
            "rows": [{"panel_name": "L1", "voltage": 480, "ckt": "1", "load_name": "AHU-1",
                      "ckt_b": "2", "load_name_b": "AHU-2"}]
        }]}));
        assert!(out.dropped.is_empty(), "{:?}", out.dropped);
        let circuits: Vec<_> = out.facts.iter().map(|f| f.circuit_number.as_deref()).collect();
        assert_eq!(circuits, vec![Some("1"), Some("2")]);
        for fact in &out.facts {
            assert_eq!(fact.panel_name.as_deref(), Some("L1"));
            assert_eq!(fact.attributes.text("voltage"), Some("480"));
        }
    }

    #[test]
    fn fact_serializes_with_sheet_metadata_inline() {
        let out = extract(json!({"architectural": {"doors": [{"door_number": "101", "size": "3'-0\" x 7'-0\""}]}}));
        let json = serde_json::to_value(&out.facts[0]).unwrap();
        assert_eq!(json["tenant_id"], json!("t1"));
        assert_eq!(json["schedule_type"], json!("door"));
        assert_eq!(json["key"], json!({"door": "101"}));
        assert!(json.get("embedding").is_none());
    }
}
