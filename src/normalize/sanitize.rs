//! Identifier-safe tokens for document ids.

use std::sync::LazyLock;

use regex::Regex;

/// Token used when a component sanitizes to nothing.
pub const FALLBACK_TOKEN: &str = "none";

/// Id returned when no usable parts are supplied.
pub const EMPTY_DOCUMENT_ID: &str = "doc";

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\-=]+").unwrap());
static DASH_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

/// Reduce `value` to `[A-Za-z0-9_\-=]` with single dashes between runs.
/// Returns `fallback` when nothing survives.
pub fn sanitize_key_component(value: &str, fallback: &str) -> String {
    let replaced = DISALLOWED.replace_all(value.trim(), "-");
    let collapsed = DASH_RUN.replace_all(&replaced, "-");
    let token = collapsed.trim_matches('-');
    if token.is_empty() {
        fallback.to_string()
    } else {
        token.to_string()
    }
}

/// Join the sanitized, non-empty parts with `-`.
pub fn make_document_id<S: AsRef<str>>(parts: &[S]) -> String {
    let tokens: Vec<String> = parts
        .iter()
        .map(|part| sanitize_key_component(part.as_ref(), ""))
        .filter(|token| !token.is_empty())
        .collect();

    if tokens.is_empty() {
        EMPTY_DOCUMENT_ID.to_string()
    } else {
        tokens.join("-")
    }
}
