//! Parsing of structured-generation output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{LlmError, LlmResult};

/// Raw drug details as returned by the generator.
///
/// Every field is optional; filling gaps is the caller's job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDrug {
    #[serde(default)]
    pub drug_name: Option<String>,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub nafdac_number: Option<String>,
    #[serde(default)]
    pub manufacturing_date: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub uses: Option<GeneratedList>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub side_effects: Option<GeneratedList>,
    #[serde(default)]
    pub storage: Option<String>,
}

/// A list field the generator may collapse into a single string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratedList {
    Many(Vec<String>),
    One(String),
}

/// One educational article summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedArticle {
    pub title: String,
    pub summary: String,
}

/// Parse generator output into drug details.
///
/// Returns `Ok(None)` for blank output or the `{}` "no answer" sentinel.
pub fn parse_drug_response(text: &str) -> LlmResult<Option<GeneratedDrug>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    // The generator occasionally wraps the object in prose or code fences
    let json_start = text.find('{').ok_or_else(|| {
        LlmError::InvalidFormat("No JSON object found in response".into())
    })?;
    let json_end = text.rfind('}').ok_or_else(|| {
        LlmError::InvalidFormat("No closing brace found in response".into())
    })?;
    if json_end < json_start {
        return Err(LlmError::InvalidFormat("Braces out of order in response".into()));
    }

    let value: Value = serde_json::from_str(&text[json_start..=json_end])?;
    let is_empty = match &value {
        Value::Object(map) => map.is_empty(),
        _ => return Err(LlmError::InvalidFormat("Expected a JSON object".into())),
    };
    if is_empty {
        return Ok(None);
    }

    Ok(Some(serde_json::from_value(value)?))
}

/// Parse generator output into a list of article summaries.
pub fn parse_articles_response(text: &str) -> LlmResult<Vec<GeneratedArticle>> {
    let text = text.trim();
    let json_start = text.find('[').ok_or_else(|| {
        LlmError::InvalidFormat("No JSON array found in response".into())
    })?;
    let json_end = text.rfind(']').ok_or_else(|| {
        LlmError::InvalidFormat("No closing bracket found in response".into())
    })?;
    if json_end < json_start {
        return Err(LlmError::InvalidFormat("Brackets out of order in response".into()));
    }

    Ok(serde_json::from_str(&text[json_start..=json_end])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_full_response() {
        let json = r#"{"drugName":"Alabukun","genericName":"Aspirin + Caffeine","manufacturer":"Alabukun Products","nafdacNumber":"04-0489","manufacturingDate":"2024-01","expiryDate":"2027-01","uses":["Headache","Body pain"],"dosage":"1 sachet","sideEffects":["Stomach upset"],"storage":"Cool dry place"}"#;

        let drug = parse_drug_response(json).unwrap().unwrap();
        assert_eq!(drug.drug_name.as_deref(), Some("Alabukun"));
        assert_eq!(drug.nafdac_number.as_deref(), Some("04-0489"));
        assert_eq!(
            drug.uses,
            Some(GeneratedList::Many(vec!["Headache".into(), "Body pain".into()]))
        );
    }

    #[test]
    fn test_parse_empty_object_sentinel() {
        assert_eq!(parse_drug_response("{}").unwrap(), None);
        assert_eq!(parse_drug_response("  { }  ").unwrap(), None);
        assert_eq!(parse_drug_response("").unwrap(), None);
    }

    #[test]
    fn test_parse_with_surrounding_prose() {
        let text = "Here is the result:\n```json\n{\"drugName\":\"Coartem\"}\n```";
        let drug = parse_drug_response(text).unwrap().unwrap();
        assert_eq!(drug.drug_name.as_deref(), Some("Coartem"));
        assert!(drug.nafdac_number.is_none());
    }

    #[test]
    fn test_parse_single_string_list() {
        let json = r#"{"drugName":"X","sideEffects":"Drowsiness"}"#;
        let drug = parse_drug_response(json).unwrap().unwrap();
        assert_eq!(drug.side_effects, Some(GeneratedList::One("Drowsiness".into())));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            parse_drug_response("I don't know that drug."),
            Err(LlmError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_drug_response("{not json}"),
            Err(LlmError::JsonParse(_))
        ));
    }

    #[test]
    fn test_parse_articles() {
        let text = r#"[{"title":"A","summary":"a"},{"title":"B","summary":"b"}]"#;
        let articles = parse_articles_response(text).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[1].title, "B");
    }

    proptest! {
        #[test]
        fn parse_never_panics(text in ".*") {
            let _ = parse_drug_response(&text);
            let _ = parse_articles_response(&text);
        }
    }
}
