//! Cleanup of raw model output before it reaches the caller.
//!
//! Models regularly wrap the requested JSON in prose or code fences. The
//! extraction path recovers the outermost `{...}` span; it does not validate
//! JSON, and text without a brace pair is returned as-is (trimmed).

use tracing::debug;

pub struct ResponseNormalizer;

impl ResponseNormalizer {
    pub fn normalize_extraction(raw: &str) -> String {
        let cleaned = raw.trim();

        if cleaned.starts_with('{') {
            return cleaned.to_string();
        }

        debug!("Response does not start with a JSON object, searching for one");

        match (cleaned.find('{'), cleaned.rfind('}')) {
            (Some(start), Some(end)) if end > start => {
                let extracted = &cleaned[start..=end];
                debug!("Extracted JSON: {}", extracted);
                extracted.to_string()
            }
            _ => cleaned.to_string(),
        }
    }

    pub fn normalize_summary(raw: &str) -> String {
        raw.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_json_span_from_prose() {
        let raw = "prefix noise { \"A\": 1 } suffix";
        assert_eq!(ResponseNormalizer::normalize_extraction(raw), "{ \"A\": 1 }");
    }

    #[test]
    fn test_strips_code_fence() {
        let raw = "```json\n{\"Name\": \"John Doe\"}\n```";
        assert_eq!(
            ResponseNormalizer::normalize_extraction(raw),
            "{\"Name\": \"John Doe\"}"
        );
    }

    #[test]
    fn test_object_input_only_trimmed() {
        let raw = "  \n{\"A\": 1} trailing }\n";
        assert_eq!(
            ResponseNormalizer::normalize_extraction(raw),
            "{\"A\": 1} trailing }"
        );
    }

    #[test]
    fn test_no_braces_left_unchanged() {
        assert_eq!(ResponseNormalizer::normalize_extraction("  not json "), "not json");
        assert_eq!(ResponseNormalizer::normalize_extraction("} backwards {"), "} backwards {");
        assert_eq!(ResponseNormalizer::normalize_extraction(""), "");
    }

    #[test]
    fn test_summary_is_trim_only() {
        assert_eq!(
            ResponseNormalizer::normalize_summary("\n  A {short} summary.  \n"),
            "A {short} summary."
        );
    }
}
