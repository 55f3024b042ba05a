//! Discipline fallback collectors.
//!
//! Each collector walks one discipline subtree through the container shapes
//! seen across extraction runs and yields rows in a common vocabulary. They
//! only run for documents without explicit schedule blocks.
//!
//! Shape knowledge is declarative: a [`ShapeCatalog`] names the container
//! keys, the identity field to synthesize and its aliases. The walk itself is
//! shared.

pub mod architectural;
pub mod electrical;
pub mod mechanical;
pub mod plumbing;

use serde_json::Value;

use crate::domain::facts::ScheduleType;

use super::fields::NESTED_LIST_KEYS;
use super::outcome::{Discipline, ShapeIssue};
use super::tree::{set_if_absent, Row, RowExt};

/// A normalized row and where it came from.
#[derive(Debug, Clone)]
pub struct SourcedRow {
    pub schedule_type: ScheduleType,
    pub source: String,
    pub row: Row,
}

/// Rows and shape problems found in one walk.
#[derive(Debug, Default)]
pub struct Collection {
    pub rows: Vec<SourcedRow>,
    pub issues: Vec<ShapeIssue>,
}

impl Collection {
    pub fn push(&mut self, schedule_type: ScheduleType, source: String, row: Row) {
        self.rows.push(SourcedRow {
            schedule_type,
            source,
            row,
        });
    }

    pub fn issue(&mut self, discipline: Option<Discipline>, path: String, expected: &'static str) {
        self.issues.push(ShapeIssue {
            discipline,
            path,
            expected,
        });
    }

    pub fn extend(&mut self, other: Collection) {
        self.rows.extend(other.rows);
        self.issues.extend(other.issues);
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.issues.is_empty()
    }
}

/// Run every discipline collector. Disciplines are independent; each one
/// contributes whatever it could normalize.
pub fn collect_all(root: &Row) -> Collection {
    let mut all = Collection::default();
    for discipline in Discipline::ALL {
        all.extend(collect(root, discipline));
    }
    all
}

pub fn collect(root: &Row, discipline: Discipline) -> Collection {
    let mut out = Collection::default();
    let Some(subtree) = discipline_root(root, discipline, &mut out) else {
        return out;
    };
    match discipline {
        Discipline::Electrical => electrical::collect(subtree, &mut out),
        Discipline::Mechanical => mechanical::collect(subtree, &mut out),
        Discipline::Plumbing => plumbing::collect(subtree, &mut out),
        Discipline::Architectural => architectural::collect(subtree, &mut out),
    }
    out
}

fn discipline_root<'a>(root: &'a Row, discipline: Discipline, out: &mut Collection) -> Option<&'a Row> {
    match root.get_ci(discipline.root_key())? {
        Value::Object(subtree) => Some(subtree),
        Value::Null => None,
        _ => {
            out.issue(Some(discipline), discipline.root_key().to_string(), "mapping");
            None
        }
    }
}

// ============================================================================
// Container enumeration
// ============================================================================

/// How a row was reached inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin<'a> {
    /// Element of a plain list.
    Listed,
    /// Element of a list stored under a category key.
    Grouped(&'a str),
    /// Value of a mapping keyed by the row's own identifier.
    Keyed(&'a str),
}

#[derive(Debug)]
pub(crate) struct Entry<'a> {
    pub origin: Origin<'a>,
    pub path: String,
    pub row: &'a Row,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContainerKind {
    /// A named container: list, dict-of-lists, or dict keyed by id.
    Plain,
    /// A `*_SCHEDULE` key: list, or mapping holding a known nested list.
    Schedule,
}

/// Enumerate the row objects held by `value`.
pub(crate) fn container_rows<'a>(
    value: &'a Value,
    kind: ContainerKind,
    path: &str,
    discipline: Discipline,
    out: &mut Collection,
) -> Vec<Entry<'a>> {
    match value {
        Value::Array(items) => list_rows(items, Origin::Listed, path, discipline, out),
        Value::Object(map) => mapping_rows(map, kind, path, discipline, out),
        Value::Null => Vec::new(),
        _ => {
            out.issue(Some(discipline), path.to_string(), "list or mapping");
            Vec::new()
        }
    }
}

fn list_rows<'a>(
    items: &'a [Value],
    origin: Origin<'a>,
    path: &str,
    discipline: Discipline,
    out: &mut Collection,
) -> Vec<Entry<'a>> {
    let mut entries = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let item_path = format!("{path}[{i}]");
        match item {
            Value::Object(row) => entries.push(Entry {
                origin,
                path: item_path,
                row,
            }),
            Value::Null => {}
            _ => out.issue(Some(discipline), item_path, "mapping"),
        }
    }
    entries
}

fn mapping_rows<'a>(
    map: &'a Row,
    kind: ContainerKind,
    path: &str,
    discipline: Discipline,
    out: &mut Collection,
) -> Vec<Entry<'a>> {
    let lists: Vec<(&'a str, &'a [Value])> = map
        .iter()
        .filter_map(|(k, v)| v.as_array().map(|items| (k.as_str(), items.as_slice())))
        .collect();
    let nested: Vec<(&'a str, &'a [Value])> = lists
        .iter()
        .copied()
        .filter(|(k, _)| NESTED_LIST_KEYS.iter().any(|n| k.eq_ignore_ascii_case(n)))
        .collect();

    // A schedule mapping reads its known nested lists; a plain container
    // only does so when nothing else in it is a list.
    let use_nested = !nested.is_empty()
        && (kind == ContainerKind::Schedule || nested.len() == lists.len());
    if use_nested {
        return nested
            .into_iter()
            .flat_map(|(k, items)| {
                list_rows(items, Origin::Listed, &format!("{path}.{k}"), discipline, out)
            })
            .collect();
    }

    if !lists.is_empty() {
        return lists
            .into_iter()
            .flat_map(|(k, items)| {
                list_rows(
                    items,
                    Origin::Grouped(k),
                    &format!("{path}.{k}"),
                    discipline,
                    out,
                )
            })
            .collect();
    }

    map.iter()
        .filter_map(|(k, v)| {
            v.as_object().map(|row| Entry {
                origin: Origin::Keyed(k.as_str()),
                path: format!("{path}.{k}"),
                row,
            })
        })
        .collect()
}

// ============================================================================
// Declarative catalogs
// ============================================================================

/// Shape knowledge for one family of equipment-like rows.
pub(crate) struct ShapeCatalog {
    pub schedule_type: ScheduleType,
    /// Container keys, matched case-insensitively.
    pub containers: &'static [&'static str],
    /// Also read any key ending in `_schedule`.
    pub schedule_suffix: bool,
    /// Canonical identity field set on every row.
    pub identity_field: &'static str,
    pub identity_aliases: &'static [&'static str],
    /// Field receiving the category of dict-of-lists containers.
    pub group_field: Option<&'static str>,
}

const SCHEDULE_SUFFIX: &str = "_schedule";

impl ShapeCatalog {
    fn kind_of(&self, key: &str) -> Option<ContainerKind> {
        if self.containers.iter().any(|c| key.eq_ignore_ascii_case(c)) {
            Some(ContainerKind::Plain)
        } else if self.schedule_suffix && key.to_ascii_lowercase().ends_with(SCHEDULE_SUFFIX) {
            Some(ContainerKind::Schedule)
        } else {
            None
        }
    }

    /// Walk every matching container under `subtree`.
    pub fn collect(&self, subtree: &Row, discipline: Discipline, out: &mut Collection) {
        for (key, value) in subtree {
            let Some(kind) = self.kind_of(key) else {
                continue;
            };
            let path = format!("{discipline}.{key}");
            for entry in container_rows(value, kind, &path, discipline, out) {
                let row = self.normalize(&entry);
                out.push(self.schedule_type, entry.path, row);
            }
        }
    }

    /// Copy the row and synthesize the canonical identity field.
    fn normalize(&self, entry: &Entry<'_>) -> Row {
        let mut row = entry.row.clone();
        if !row.has_present(self.identity_field) {
            let identity = row.first_text(self.identity_aliases).or_else(|| match entry.origin {
                Origin::Keyed(id) => Some(id.to_string()),
                _ => None,
            });
            if let Some(identity) = identity {
                row.insert(self.identity_field.to_string(), Value::String(identity));
            }
        }
        if let (Some(field), Origin::Grouped(category)) = (self.group_field, entry.origin) {
            set_if_absent(&mut row, field, category);
        }
        row
    }
}
