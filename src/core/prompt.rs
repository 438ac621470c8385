use crate::core::content_filter::{CONTENT_REMOVED, REDACTED};

pub struct PromptBuilder;

impl PromptBuilder {
    /// Entity names are joined with ", " in the order given; the document text is
    /// embedded verbatim.
    pub fn build_extraction_prompt(document_text: &str, entity_types: &[String]) -> String {
        let entities_str = entity_types.join(", ");

        format!(
            r#"You are a JSON generator. Your task is to extract specific entities from a PDF document and format them as JSON.

Extract these entities: {entities_str}

Rules:
1. Output must be ONLY a valid JSON object
2. Keys must be exactly as specified
3. Values should be the extracted entities or null if not found
4. Do not include any explanations or additional text
5. If a value looks like personally identifiable information (social security numbers, credit card numbers, passwords), use "{REDACTED}" as the value
6. If a value contains offensive, explicit, harmful or inappropriate content, use "{CONTENT_REMOVED}" as the value
7. If no entities are requested, return an empty JSON object: {{}}

Document:
{document_text}

Remember: Return ONLY the JSON object, nothing else."#
        )
    }

    pub fn build_summary_prompt(document_text: &str, max_length_words: Option<u32>) -> String {
        let mut rules = vec![
            "Capture the main points and key information".to_string(),
            "Maintain factual accuracy".to_string(),
            "Use clear, concise language".to_string(),
            "Preserve the original meaning and context".to_string(),
        ];

        if let Some(max_length) = max_length_words.filter(|n| *n > 0) {
            rules.push(format!("The summary should be no longer than {} words.", max_length));
        }

        let rules_str = rules
            .iter()
            .enumerate()
            .map(|(i, rule)| format!("{}. {}", i + 1, rule))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"You are a skilled summarizer. Your task is to create a concise summary of the provided text.

Rules:
{rules_str}

Document:
{document_text}

Provide a summary of the PDF document, without any introductory phrases like "Here's a summary" or "Summary:"."#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extraction_prompt_lists_entities_in_order() {
        let entity_types = names(&["Name", "Date", "Phone Number"]);
        let prompt = PromptBuilder::build_extraction_prompt("John Doe, 555-1234", &entity_types);

        assert!(prompt.contains("Extract these entities: Name, Date, Phone Number\n"));
        for name in &entity_types {
            assert_eq!(prompt.matches(name.as_str()).count(), 1, "{} should appear once", name);
        }
        assert!(prompt.contains("John Doe, 555-1234"));
        assert!(prompt.contains("[REDACTED]"));
        assert!(prompt.contains("[CONTENT_REMOVED]"));
        assert!(prompt.contains("ONLY a valid JSON object"));
    }

    #[test]
    fn test_extraction_prompt_with_no_entities() {
        let prompt = PromptBuilder::build_extraction_prompt("Some text", &[]);

        assert!(prompt.to_lowercase().contains("entities:"));
        assert!(prompt.contains("JSON object"));
        assert!(prompt.contains("{}"));
    }

    #[test]
    fn test_summary_prompt_with_length_limit() {
        let prompt = PromptBuilder::build_summary_prompt("Long report", Some(100));

        assert!(prompt.contains("no longer than 100 words"));
        assert!(prompt.contains("5. The summary should be no longer than 100 words."));
        assert!(prompt.contains("Long report"));
    }

    #[test]
    fn test_summary_prompt_without_limit_omits_clause() {
        for limit in [None, Some(0)] {
            let prompt = PromptBuilder::build_summary_prompt("Long report", limit);

            assert!(!prompt.contains("no longer than"));
            assert!(!prompt.contains("5."));
            assert!(prompt.contains("4. Preserve the original meaning and context\n"));
        }
    }
}
