//! Keyword-based post-processing of extraction results.
//!
//! This is plain case-insensitive substring matching over string values, not
//! semantic moderation. It produces false positives ("password reset policy"
//! is redacted) and misses anything not spelled with a listed term. PII the
//! model copies out of the source document in some other form (a bare
//! `123-45-6789`, say) passes through untouched.

use serde_json::{Map, Value};
use tracing::{debug, warn};

pub const CONTENT_REMOVED: &str = "[CONTENT_REMOVED]";
pub const REDACTED: &str = "[REDACTED]";

pub const DISALLOWED_TERMS: &[&str] = &["offensive", "explicit", "harmful", "inappropriate"];
pub const PII_TERMS: &[&str] = &["ssn", "social security", "credit card", "password"];

pub struct ContentFilter;

impl ContentFilter {
    /// Parses `normalized` and filters its values. Text that is not valid JSON is
    /// returned verbatim.
    pub fn apply(normalized: &str) -> String {
        let parsed: Value = match serde_json::from_str(normalized) {
            Ok(value) => value,
            Err(e) => {
                warn!("Model output is not valid JSON, skipping content filter: {}", e);
                return normalized.to_string();
            }
        };

        let filtered = match parsed {
            Value::Object(entities) => Value::Object(Self::filter_entities(entities)),
            other => other,
        };

        // Serializing a Value cannot fail.
        serde_json::to_string(&filtered).unwrap_or_else(|_| normalized.to_string())
    }

    pub fn filter_entities(entities: Map<String, Value>) -> Map<String, Value> {
        entities
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => Value::String(Self::filter_value(&key, s)),
                    other => other,
                };
                (key, value)
            })
            .collect()
    }

    /// PII redaction takes precedence when a value matches both vocabularies.
    fn filter_value(key: &str, value: String) -> String {
        let lowered = value.to_lowercase();

        if contains_any(&lowered, PII_TERMS) {
            debug!("Redacting PII in entity '{}'", key);
            return REDACTED.to_string();
        }

        if contains_any(&lowered, DISALLOWED_TERMS) {
            debug!("Removing disallowed content in entity '{}'", key);
            return CONTENT_REMOVED.to_string();
        }

        value
    }
}

fn contains_any(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| haystack.contains(term))
}
