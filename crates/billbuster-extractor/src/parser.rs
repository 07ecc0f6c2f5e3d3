//! Parse extraction service replies into points and tags

use crate::error::ExtractorError;
use billbuster_domain::{Confidence, Point, PointType};
use serde_json::{Map, Value};
use tracing::warn;

/// Description of the synthetic point produced for an unparseable reply
pub const PARSE_FAILURE_DESCRIPTION: &str = "failed to parse extraction response";

/// Parse an extraction reply into points
///
/// Accepts a JSON array of point objects, or an object carrying such an
/// array under `points`, either bare or inside a fenced code block. Items
/// that are not objects or lack a description are skipped.
pub fn parse_points(response: &str) -> Result<Vec<Point>, ExtractorError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| ExtractorError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let items = match &json {
        Value::Array(items) => items,
        Value::Object(obj) => obj
            .get("points")
            .and_then(Value::as_array)
            .ok_or_else(|| ExtractorError::InvalidFormat("Expected JSON array of points".to_string()))?,
        _ => {
            return Err(ExtractorError::InvalidFormat(
                "Expected JSON array of points".to_string(),
            ))
        }
    };

    let mut points = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match parse_point_json(item) {
            Ok(point) => points.push(point),
            Err(e) => warn!("Skipping point {}: {}", idx, e),
        }
    }

    Ok(points)
}

/// Parse a tag reply into a list of tags
///
/// Never fails: a reply that is not a JSON array of strings is split on
/// commas after stripping brackets and quotes.
pub fn parse_tags(response: &str) -> Vec<String> {
    let text = extract_json(response).unwrap_or_else(|_| response.trim().to_string());

    if text.starts_with('[') && text.ends_with(']') {
        if let Ok(tags) = serde_json::from_str::<Vec<String>>(&text) {
            return tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
        }
    }

    let inner = match (text.find('['), text.rfind(']')) {
        (Some(open), Some(close)) if open < close => text[open + 1..close].to_string(),
        _ => text.replace(['[', ']'], ""),
    };

    inner
        .split(',')
        .map(|item| item.trim().trim_matches(|c: char| c == '"' || c == '\'').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Locate the JSON payload in a reply, handling markdown code fences
///
/// The first fenced block anywhere in the reply wins; its optional language
/// tag is skipped. Replies without a fence are returned trimmed.
fn extract_json(response: &str) -> Result<String, ExtractorError> {
    let Some(open) = response.find("```") else {
        return Ok(response.trim().to_string());
    };

    let body = skip_language_tag(&response[open + 3..]);

    let content = match body.find("```") {
        Some(close) => &body[..close],
        None => body,
    };

    let content = content.trim();
    if content.is_empty() {
        return Err(ExtractorError::InvalidFormat("Empty code block".to_string()));
    }
    Ok(content.to_string())
}

/// Drop a language tag such as `json` after an opening fence
///
/// A tag is a word followed by whitespace or the start of the payload.
fn skip_language_tag(after_fence: &str) -> &str {
    let text = after_fence.trim_start_matches([' ', '\t']);
    let tag_len = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(text.len());
    match text[tag_len..].chars().next() {
        Some(c) if tag_len > 0 && (c.is_whitespace() || c == '[' || c == '{') => &text[tag_len..],
        _ => after_fence,
    }
}

/// Parse a single point from JSON
fn parse_point_json(json: &Value) -> Result<Point, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Point is not a JSON object".to_string())?;

    let description = obj
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| "Missing or invalid 'description'".to_string())?;

    let point_type = obj
        .get("point_type")
        .and_then(Value::as_str)
        .and_then(PointType::parse)
        .filter(|t| !t.is_error())
        .unwrap_or(PointType::Other);

    let confidence = obj
        .get("confidence")
        .and_then(Value::as_str)
        .and_then(Confidence::parse)
        .unwrap_or(Confidence::Low);

    Ok(Point::new(point_type, description, confidence)
        .with_entities(entities(obj))
        .with_reference(text_field(obj, "reference"))
        .with_citation(text_field(obj, "citation"))
        .with_page_number(page_number(obj)))
}

fn entities(obj: &Map<String, Value>) -> Vec<String> {
    match obj.get("entities") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn text_field(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn page_number(obj: &Map<String, Value>) -> Option<u32> {
    match obj.get("page_number")? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARE: &str = r#"[
        {
            "point_type": "funding",
            "description": "Appropriates $5,000,000 for rural broadband grants",
            "entities": ["Department of Commerce", "rural counties"],
            "reference": "Section 3(a)",
            "citation": "There is appropriated $5,000,000...",
            "page_number": 2,
            "confidence": "high"
        },
        {
            "point_type": "timeline",
            "description": "Takes effect January 1, 2026",
            "entities": [],
            "reference": "Section 7",
            "citation": "This Act takes effect January 1, 2026.",
            "page_number": null,
            "confidence": "medium"
        }
    ]"#;

    #[test]
    fn test_parse_valid_json() {
        let points = parse_points(BARE).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].point_type, PointType::Funding);
        assert_eq!(points[0].entities.len(), 2);
        assert_eq!(points[0].reference, "Section 3(a)");
        assert_eq!(points[0].page_number, Some(2));
        assert_eq!(points[0].confidence, Confidence::High);
        assert_eq!(points[1].page_number, None);
    }

    #[test]
    fn test_fenced_and_bare_parse_the_same() {
        let fenced = format!("Here are the points:\n```json\n{}\n```\nLet me know!", BARE);
        let untagged = format!("```\n{}\n```", BARE);

        let expected = parse_points(BARE).unwrap();
        assert_eq!(parse_points(&fenced).unwrap(), expected);
        assert_eq!(parse_points(&untagged).unwrap(), expected);
    }

    #[test]
    fn test_object_with_points_array() {
        let response = r#"{"points": [{"point_type": "penalty", "description": "Fine of $500"}]}"#;
        let points = parse_points(response).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].point_type, PointType::Penalty);
        assert_eq!(points[0].confidence, Confidence::Low);
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_points("I could not find any points."),
            Err(ExtractorError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_json_not_array() {
        assert!(parse_points(r#"{"description": "lonely"}"#).is_err());
        assert!(parse_points("42").is_err());
    }

    #[test]
    fn test_empty_code_block() {
        assert!(parse_points("```json\n```").is_err());
    }

    #[test]
    fn test_items_without_description_are_skipped() {
        let response = r#"[
            {"point_type": "change", "description": "Amends 42 U.S.C. 1983"},
            {"point_type": "change"},
            "not an object",
            {"point_type": "other", "description": "   "}
        ]"#;
        let points = parse_points(response).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].description, "Amends 42 U.S.C. 1983");
    }

    #[test]
    fn test_lenient_field_shapes() {
        let response = r#"[{
            "point_type": "Requirement",
            "description": "Agencies must report annually",
            "entities": "federal agencies",
            "reference": 12,
            "page_number": "4",
            "confidence": "HIGH"
        }]"#;
        let point = &parse_points(response).unwrap()[0];
        assert_eq!(point.point_type, PointType::Requirement);
        assert_eq!(point.entities, vec!["federal agencies"]);
        assert_eq!(point.reference, "12");
        assert_eq!(point.citation, "");
        assert_eq!(point.page_number, Some(4));
        assert_eq!(point.confidence, Confidence::High);
    }

    #[test]
    fn test_unknown_or_error_type_becomes_other() {
        let response = r#"[
            {"point_type": "appropriation", "description": "a"},
            {"point_type": "error", "description": "b"}
        ]"#;
        let points = parse_points(response).unwrap();
        assert!(points.iter().all(|p| p.point_type == PointType::Other));
    }

    #[test]
    fn test_parse_tags_json() {
        assert_eq!(
            parse_tags(r#"["healthcare", "Medicaid", " rural hospitals "]"#),
            vec!["healthcare", "Medicaid", "rural hospitals"]
        );
    }

    #[test]
    fn test_parse_tags_fenced() {
        let tags = parse_tags("```json\n[\"education\", \"grants\"]\n```");
        assert_eq!(tags, vec!["education", "grants"]);
    }

    #[test]
    fn test_parse_tags_embedded_array() {
        let tags = parse_tags("Tags: ['water rights', 'agriculture'] hope this helps");
        assert_eq!(tags, vec!["water rights", "agriculture"]);
    }

    #[test]
    fn test_parse_tags_plain_list() {
        let tags = parse_tags("taxation, \"small business\", , credits");
        assert_eq!(tags, vec!["taxation", "small business", "credits"]);
    }

    #[test]
    fn test_parse_tags_empty_reply() {
        assert!(parse_tags("").is_empty());
        assert!(parse_tags("[]").is_empty());
    }

    #[test]
    fn test_extract_json_from_plain_json() {
        let json = r#"{"key": "value"}"#;
        assert_eq!(extract_json(json).unwrap(), json);
    }

    #[test]
    fn test_extract_json_fence_on_one_line() {
        let response = r#"```[{"key": "value"}]```"#;
        assert_eq!(extract_json(response).unwrap(), r#"[{"key": "value"}]"#);
    }

    #[test]
    fn test_extract_json_tagged_fence_on_one_line() {
        let response = r#"```json [{"key": "value"}]```"#;
        assert_eq!(extract_json(response).unwrap(), r#"[{"key": "value"}]"#);

        let points = parse_points(r#"```json [{"description": "a"}]```"#).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].description, "a");

        let points = parse_points(r#"```json{"points": [{"description": "b"}]}```"#).unwrap();
        assert_eq!(points[0].description, "b");
    }

    #[test]
    fn test_tags_in_tagged_fence_on_one_line() {
        assert_eq!(parse_tags(r#"```json ["water", "permits"]```"#), vec!["water", "permits"]);
    }
}
