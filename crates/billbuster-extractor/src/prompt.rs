//! Prompt construction for the point extraction service

use crate::error::ExtractorError;
use billbuster_domain::Point;

/// System instructions for point extraction
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You are an expert legislative analyst tasked with extracting key points from bills and legislative documents.
Your job is to identify specific actions, changes, or provisions in the legislation.

For each chunk of text, identify the key legislative points with the following focus:
1. Funding allocations or appropriations
2. Changes to existing laws or regulations
3. New classifications, definitions, or legal categories
4. Requirements imposed on entities (people, businesses, agencies)
5. Permissions granted or restrictions imposed
6. Deadlines, timelines, or effective dates
7. Penalties or enforcement mechanisms

Each point should be specific, concrete, and directly supported by the text. Do not make interpretations beyond what is explicitly stated.
Always note section numbers or references when mentioned.

Format each point as a JSON object with the following fields:
- "point_type": One of ["funding", "change", "classification", "requirement", "permission", "timeline", "penalty", "other"]
- "description": A clear, concise description of the point
- "entities": List of entities affected by this point
- "reference": Section number or other reference if available
- "citation": The exact text from the document that supports this point (direct quote)
- "page_number": The page number where this point appears, if available
- "confidence": Your confidence in this extraction (high, medium, low)

Return a list of these points in JSON format."#;

/// System instructions for summarizing a batch of points
pub const SUMMARY_SYSTEM_PROMPT: &str =
    "You are an expert legislative analyst providing concise summaries.";

/// System instructions for merging batch summaries into a document summary
pub const MERGE_SYSTEM_PROMPT: &str =
    "You are an expert legislative analyst providing comprehensive document summaries.";

/// System instructions for tag generation
pub const TAGS_SYSTEM_PROMPT: &str =
    "You are an expert legislative analyst identifying key topics and themes.";

/// Builds the user prompt for extracting points from one chunk
pub struct PromptBuilder<'a> {
    chunk_text: &'a str,
    context: Option<&'a str>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a prompt for `chunk_text` with no prior context
    pub fn new(chunk_text: &'a str) -> Self {
        Self {
            chunk_text,
            context: None,
        }
    }

    /// Include context carried over from earlier sections
    ///
    /// Empty context is treated as absent.
    pub fn with_context(mut self, context: Option<&'a str>) -> Self {
        self.context = context.filter(|c| !c.trim().is_empty());
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        match self.context {
            Some(context) => format!(
                "CONTEXT FROM PREVIOUS SECTIONS:\n{}\n\n\
                 CURRENT SECTION TO ANALYZE:\n{}\n\n\
                 Based on both the context and the current section, extract the key legislative points as described in your instructions.\n\
                 Only extract new points from the current section, but use the context to better understand them.\n\
                 {}",
                context, self.chunk_text, OUTPUT_FORMAT_REMINDER
            ),
            None => format!(
                "SECTION TO ANALYZE:\n{}\n\n\
                 Extract the key legislative points as described in your instructions.\n\
                 {}",
                self.chunk_text, OUTPUT_FORMAT_REMINDER
            ),
        }
    }
}

const OUTPUT_FORMAT_REMINDER: &str = "Return the points as a JSON list.";

/// Prompt asking for a short summary of `points`
pub fn summary_prompt(points: &[Point]) -> Result<String, ExtractorError> {
    let points_text = serde_json::to_string_pretty(points)?;
    Ok(format!(
        "Here is a list of legislative points extracted from a document:\n{}\n\n\
         Please provide a brief summary of these points, focusing on the most important aspects.\n\
         Keep the summary concise (3-5 sentences).",
        points_text
    ))
}

/// Prompt combining batch summaries into one document summary
pub fn merge_prompt(summaries: &[String]) -> String {
    format!(
        "Here are summaries of different sections of a legislative document:\n{}\n\n\
         Please provide a comprehensive but concise summary of the entire document based on these section summaries.\n\
         The summary should be 3-5 paragraphs and cover the main provisions and purpose of the legislation.\n\
         Format your response as a single cohesive summary with multiple paragraphs.",
        summaries.join("\n")
    )
}

/// Prompt asking for topic tags over `points`
pub fn tags_prompt(points: &[Point]) -> Result<String, ExtractorError> {
    let points_text = serde_json::to_string_pretty(points)?;
    Ok(format!(
        "Here is a list of legislative points extracted from a document:\n{}\n\n\
         Please generate 5-10 relevant tags or keywords that best represent the subject matter and content of this legislation.\n\
         Focus on specific topics, policy areas, affected sectors, and key themes.\n\n\
         Return the tags as a JSON array of strings. Each tag should be a single word or short phrase (1-3 words).",
        points_text
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use billbuster_domain::{Confidence, PointType};

    #[test]
    fn test_prompt_without_context() {
        let prompt = PromptBuilder::new("SEC. 2. The Secretary shall...").build();
        assert!(prompt.starts_with("SECTION TO ANALYZE:\nSEC. 2. The Secretary shall..."));
        assert!(!prompt.contains("CONTEXT FROM PREVIOUS SECTIONS"));
        assert!(prompt.ends_with("Return the points as a JSON list."));
    }

    #[test]
    fn test_prompt_with_context() {
        let prompt = PromptBuilder::new("SEC. 3. Penalties.")
            .with_context(Some("DOCUMENT SUMMARY SO FAR:\nCreates a fund."))
            .build();

        let context_at = prompt.find("CONTEXT FROM PREVIOUS SECTIONS:").unwrap();
        let section_at = prompt.find("CURRENT SECTION TO ANALYZE:\nSEC. 3. Penalties.").unwrap();
        assert!(context_at < section_at);
        assert!(prompt.contains("Only extract new points from the current section"));
    }

    #[test]
    fn test_blank_context_is_ignored() {
        let prompt = PromptBuilder::new("text").with_context(Some("  \n")).build();
        assert!(prompt.starts_with("SECTION TO ANALYZE:"));
    }

    #[test]
    fn test_system_prompt_lists_point_types() {
        for point_type in PointType::EXTRACTABLE {
            assert!(EXTRACTION_SYSTEM_PROMPT.contains(&format!("\"{}\"", point_type.as_str())));
        }
    }

    #[test]
    fn test_summary_prompt_embeds_points() {
        let points = vec![Point::new(PointType::Funding, "Appropriates $10M", Confidence::High)];
        let prompt = summary_prompt(&points).unwrap();
        assert!(prompt.contains("\"description\": \"Appropriates $10M\""));
        assert!(prompt.contains("3-5 sentences"));
    }

    #[test]
    fn test_merge_prompt_joins_summaries() {
        let prompt = merge_prompt(&["First.".to_string(), "Second.".to_string()]);
        assert!(prompt.contains("First.\nSecond."));
        assert!(prompt.contains("3-5 paragraphs"));
    }

    #[test]
    fn test_tags_prompt() {
        let prompt = tags_prompt(&[]).unwrap();
        assert!(prompt.contains("JSON array of strings"));
    }
}
