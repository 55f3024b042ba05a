//! Case-insensitive access to untyped extraction trees.
//!
//! Every "does this row have field X" question in the engine goes through
//! [`is_present`] and [`RowExt`]; collectors never index maps directly.

use serde_json::{Map, Number, Value};

/// One untyped schedule row.
pub type Row = Map<String, Value>;

/// `null`, blank strings, empty lists and empty mappings count as absent.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Render a scalar as trimmed text. Lists and mappings have no text form.
pub fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => render_number(n),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Integral numbers render without a decimal suffix (`20.0` -> `"20"`).
pub fn render_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) => render_f64(f),
        None => n.to_string(),
    }
}

pub fn render_f64(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Alias-tolerant, case-insensitive reads over a row.
pub trait RowExt {
    /// Value of the first key equal to `field` ignoring ASCII case.
    /// An exact match wins over a case-folded one.
    fn get_ci(&self, field: &str) -> Option<&Value>;

    /// First present value among `aliases`, in alias order.
    fn first_present(&self, aliases: &[&str]) -> Option<&Value> {
        aliases
            .iter()
            .filter_map(|alias| self.get_ci(alias))
            .find(|value| is_present(value))
    }

    /// First alias whose value renders to non-blank scalar text.
    fn first_text(&self, aliases: &[&str]) -> Option<String> {
        aliases
            .iter()
            .filter_map(|alias| self.get_ci(alias))
            .find_map(scalar_text)
    }

    fn has_present(&self, field: &str) -> bool {
        self.get_ci(field).is_some_and(is_present)
    }

    fn object_ci(&self, field: &str) -> Option<&Row> {
        self.get_ci(field).and_then(Value::as_object)
    }

    fn array_ci(&self, field: &str) -> Option<&Vec<Value>> {
        self.get_ci(field).and_then(Value::as_array)
    }
}

impl RowExt for Row {
    fn get_ci(&self, field: &str) -> Option<&Value> {
        self.get(field).or_else(|| {
            self.iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(field))
                .map(|(_, value)| value)
        })
    }
}

/// Insert `value` under `field` unless a present value already exists under
/// any casing of that name.
pub fn set_if_absent(row: &mut Row, field: &str, value: impl Into<Value>) {
    if !row.has_present(field) {
        row.insert(field.to_string(), value.into());
    }
}
