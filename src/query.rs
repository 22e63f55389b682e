//! The restricted query language: field allowlist, keyword denylist, and
//! assembly of the backend query string.
//!
//! Condition expressions are never parsed into an AST. The backend owns the
//! grammar; this side only scans for forbidden substrings and joins the
//! validated parts into one fixed template.

use thiserror::Error;

/// Fields a query may select or filter on.
pub const ALLOWED_FIELDS: &[&str] = &[
    "req",
    "req.content_type",
    "req.body",
    "host",
    "url",
    "method",
    "resp",
    "resp.content_type",
    "resp.body",
    "status_code",
];

/// Operators the backend accepts in condition expressions. Conditions are
/// opaque text here, so these are not enforced; they are advertised to
/// callers through the tool schema.
pub const ALLOWED_OPERATORS: &[&str] = &["=", ">", "<", "!=", "like"];

/// Keywords rejected anywhere in field names or condition text. The
/// assembled query supplies these itself; caller input must not.
pub const DENIED_KEYWORDS: &[&str] = &["SELECT", "FROM", "WHERE", "LIMIT"];

/// Table name in the assembled query, fixed by the backend schema.
const TABLE: &str = "proxy";

/// A rejected query input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(i64),
}

/// Validate a query request. Short-circuits on the first failing rule.
///
/// The keyword scan runs over the raw strings; it rejects legitimate values
/// that merely contain a keyword (`url like 'whereami'`). That is the
/// documented behavior of this guardrail, not a parsing bug.
pub fn validate(fields: &[String], conditions: &str, limit: i64) -> Result<(), ValidationError> {
    for keyword in DENIED_KEYWORDS {
        for field in fields {
            if field.trim().to_uppercase().contains(keyword) {
                return Err(ValidationError::InvalidField(field.clone()));
            }
        }
        if conditions.trim().to_uppercase().contains(keyword) {
            return Err(ValidationError::InvalidCondition(conditions.to_string()));
        }
    }

    for field in fields {
        if !ALLOWED_FIELDS.contains(&normalize_field(field).as_str()) {
            return Err(ValidationError::InvalidField(field.clone()));
        }
    }

    if limit < 0 {
        return Err(ValidationError::InvalidLimit(limit));
    }

    Ok(())
}

/// Canonical spelling of a field: trimmed and lowercased, matching the
/// backend's extractor registry.
fn normalize_field(field: &str) -> String {
    field.trim().to_lowercase()
}

/// Assemble the backend query string from validated inputs.
///
/// The condition expression is inserted verbatim; the keyword scan in
/// [`validate`] is the only guard on it.
pub fn assemble(fields: &[String], conditions: &str, limit: i64) -> String {
    let fields = fields
        .iter()
        .map(|f| normalize_field(f))
        .collect::<Vec<_>>()
        .join(",");
    format!("SELECT {fields} FROM {TABLE} WHERE {conditions} LIMIT {limit}")
}
