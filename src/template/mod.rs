//! The persisted template artifact.
//!
//! A template is a JSON object carrying the document text, its fields, and
//! the author's metadata:
//!
//! ```json
//! { "name": "Invoice", "description": "", "text": "Dear NAME",
//!   "highlights": [ { "id": 1, "start": 5, "end": 9, "text": "NAME", "isEditable": false } ],
//!   "createdAt": "2024-05-01T12:00:00.000Z" }
//! ```

use chrono::{SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Document, FieldSeed};

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Errors raised while reading or writing a template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Invalid JSON file")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Invalid template file format: {0}")]
    InvalidFormat(String),
    #[error("Failed to encode template")]
    Encode(#[source] serde_json::Error),
}

/// Persisted field id: numeric when written by this crate, but other
/// writers may use strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(u64),
    Text(String),
}

/// One persisted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    pub id: RecordId,
    pub start: usize,
    pub end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub is_editable: bool,
}

/// The template artifact exchanged between authors and fillers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub text: String,
    pub highlights: Vec<FieldRecord>,
    #[serde(default)]
    pub created_at: String,
}

impl Template {
    /// Snapshot a document as a template with every field non-editable.
    pub fn capture(document: &Document, name: &str, description: &str) -> Self {
        let highlights = document
            .highlights()
            .iter()
            .map(|h| FieldRecord {
                id: RecordId::Number(h.id.get()),
                start: h.start,
                end: h.end,
                text: Some(h.source_text.clone()),
                is_editable: false,
            })
            .collect();
        Self {
            name: name.to_string(),
            description: description.to_string(),
            text: document.text(),
            highlights,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Parse and shape-check a template.
    ///
    /// `name` must be a non-empty string, `text` a string, and
    /// `highlights` an array of well-typed records.
    ///
    /// # Errors
    ///
    /// [`TemplateError::InvalidJson`] when `raw` is not JSON at all,
    /// [`TemplateError::InvalidFormat`] when the shape is wrong.
    pub fn from_json(raw: &str) -> Result<Self, TemplateError> {
        let value: Value = serde_json::from_str(raw).map_err(TemplateError::InvalidJson)?;
        let Some(object) = value.as_object() else {
            return Err(TemplateError::InvalidFormat("expected an object".to_string()));
        };
        match object.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => {}
            _ => return Err(TemplateError::InvalidFormat("missing name".to_string())),
        }
        if !object.get("text").is_some_and(Value::is_string) {
            return Err(TemplateError::InvalidFormat("missing text".to_string()));
        }
        if !object.get("highlights").is_some_and(Value::is_array) {
            return Err(TemplateError::InvalidFormat("missing highlights".to_string()));
        }
        serde_json::from_value(value).map_err(|err| TemplateError::InvalidFormat(err.to_string()))
    }

    /// Encode as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Encode`] if serialization fails.
    pub fn to_json(&self) -> Result<String, TemplateError> {
        serde_json::to_string_pretty(self).map_err(TemplateError::Encode)
    }

    /// Field seeds for installing this template into a [`Document`].
    pub fn field_seeds(&self) -> Vec<FieldSeed> {
        self.highlights
            .iter()
            .map(|record| FieldSeed {
                start: record.start,
                end: record.end,
                source_text: record.text.clone(),
                editable: record.is_editable,
            })
            .collect()
    }

    /// Suggested file name when saving this template.
    pub fn file_name(&self) -> String {
        file_name_for(&self.name)
    }
}

/// `template-<name>.json`, with whitespace runs turned into hyphens and the
/// name lowercased.
pub fn file_name_for(name: &str) -> String {
    let slug = WHITESPACE_RUN.replace_all(name, "-").to_lowercase();
    format!("template-{slug}.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "name": "Greeting",
        "description": "Say hi",
        "text": "Hello world",
        "highlights": [
            { "id": 1714564800000, "start": 0, "end": 5, "text": "Hello", "isEditable": false }
        ],
        "createdAt": "2024-05-01T12:00:00.000Z"
    }"#;

    #[test]
    fn test_from_json_accepts_valid_template() {
        let template = Template::from_json(VALID).unwrap();
        assert_eq!(template.name, "Greeting");
        assert_eq!(template.text, "Hello world");
        assert_eq!(template.highlights.len(), 1);
        assert_eq!(template.highlights[0].id, RecordId::Number(1_714_564_800_000));
        assert_eq!(template.highlights[0].text.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_from_json_accepts_string_ids_and_missing_optionals() {
        let raw = r#"{"name":"T","text":"abc","highlights":[{"id":"f-1","start":0,"end":1}]}"#;
        let template = Template::from_json(raw).unwrap();
        assert_eq!(template.description, "");
        assert_eq!(template.highlights[0].id, RecordId::Text("f-1".to_string()));
        assert!(!template.highlights[0].is_editable);
        assert!(template.highlights[0].text.is_none());
    }

    #[test]
    fn test_from_json_rejects_non_json() {
        assert!(matches!(
            Template::from_json("not json {"),
            Err(TemplateError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_from_json_requires_name_text_highlights() {
        for raw in [
            r#"{"text":"abc","highlights":[]}"#,
            r#"{"name":"","text":"abc","highlights":[]}"#,
            r#"{"name":"T","highlights":[]}"#,
            r#"{"name":"T","text":7,"highlights":[]}"#,
            r#"{"name":"T","text":"abc"}"#,
            r#"{"name":"T","text":"abc","highlights":{}}"#,
            r#"["name"]"#,
        ] {
            assert!(
                matches!(Template::from_json(raw), Err(TemplateError::InvalidFormat(_))),
                "should reject {raw}"
            );
        }
    }

    #[test]
    fn test_from_json_rejects_malformed_records() {
        let raw = r#"{"name":"T","text":"abc","highlights":[{"id":1,"start":"zero","end":1}]}"#;
        assert!(matches!(
            Template::from_json(raw),
            Err(TemplateError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_capture_resets_editable_flags() {
        let mut doc = Document::new("Hello world");
        let id = doc.select_range(0, 5).unwrap().id;
        doc.set_editable(id, true).unwrap();

        let template = Template::capture(&doc, "Greeting", "");
        assert!(template.highlights.iter().all(|r| !r.is_editable));
        assert_eq!(template.highlights[0].id, RecordId::Number(id.get()));
        assert!(template.created_at.ends_with('Z'));
    }

    #[test]
    fn test_to_json_uses_camel_case_keys() {
        let mut doc = Document::new("Hello world");
        doc.select_range(6, 11).unwrap();
        let json = Template::capture(&doc, "Greeting", "desc").to_json().unwrap();
        assert!(json.contains("\"isEditable\": false"));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"highlights\""));

        let parsed = Template::from_json(&json).unwrap();
        assert_eq!(parsed.highlights[0].start, 6);
        assert_eq!(parsed.highlights[0].end, 11);
    }

    #[test]
    fn test_file_name_slugs_whitespace_and_case() {
        assert_eq!(file_name_for("Job Offer"), "template-job-offer.json");
        assert_eq!(file_name_for("Rent  \t Notice"), "template-rent-notice.json");
        assert_eq!(file_name_for(" Padded "), "template--padded-.json");
    }

    #[test]
    fn test_field_seeds_carry_snapshot_text() {
        let template = Template::from_json(VALID).unwrap();
        let seeds = template.field_seeds();
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].source_text.as_deref(), Some("Hello"));
        assert!(!seeds[0].editable);
    }
}
