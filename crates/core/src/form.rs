//! Form schema and form answers.
//!
//! A visa type carries a form-questions document: ordered sections, each an
//! ordered list of fields, where a field may declare dependent sub-fields
//! that only appear when the parent's answer triggers them. Answers are a
//! flat map from field id to a scalar value, stored on the applicant
//! independently of the schema so schema edits never require migrating
//! answers.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Version written into the stored answers envelope.
pub const ANSWERS_FORMAT_VERSION: u32 = 1;

/// Text answers treated as "yes" for boolean parents.
pub const AFFIRMATIVE_TEXT: &[&str] = &["true", "yes", "sim"];

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Input widget type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Email,
    Phone,
    Date,
    Number,
    Select,
    Radio,
    Boolean,
    /// Any type this version does not know about. Accepts any scalar.
    #[serde(other)]
    Other,
}

impl FieldType {
    fn is_textual(self) -> bool {
        matches!(
            self,
            Self::Text | Self::Textarea | Self::Email | Self::Phone | Self::Date
        )
    }
}

/// A single question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// Allowed values for `select` / `radio` fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Sub-fields shown only when this field's answer triggers them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependent_fields: Vec<FormField>,
    /// The designated affirmative option that reveals `dependent_fields`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_dependents_when: Option<AnswerValue>,
}

/// An ordered group of fields rendered as one step of the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSection {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FormField>,
}

impl FormSection {
    /// Identifying label: the title, or the id when the title is blank.
    pub fn label(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.id
        } else {
            &self.title
        }
    }
}

/// The complete form-questions document of a visa type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FormQuestions {
    pub sections: Vec<FormSection>,
}

impl FormQuestions {
    /// Parse a stored document. Fails when `sections` is missing or any
    /// element is malformed.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, CoreError> {
        serde_json::from_value(value.clone())
            .map_err(|e| CoreError::Validation(format!("Invalid form questions document: {e}")))
    }

    /// Find a field anywhere in the tree (top-level or dependent) by id.
    pub fn find_field(&self, id: &str) -> Option<&FormField> {
        fn walk<'a>(fields: &'a [FormField], id: &str) -> Option<&'a FormField> {
            for field in fields {
                if field.id == id {
                    return Some(field);
                }
                if let Some(found) = walk(&field.dependent_fields, id) {
                    return Some(found);
                }
            }
            None
        }
        self.sections.iter().find_map(|s| walk(&s.fields, id))
    }

    /// Total number of top-level fields across all sections.
    pub fn total_fields(&self) -> usize {
        self.sections.iter().map(|s| s.fields.len()).sum()
    }
}

/// Check structural rules an admin-supplied document must satisfy:
/// every field has a non-empty id and ids are unique across the tree.
pub fn validate_schema(schema: &FormQuestions) -> Result<(), CoreError> {
    fn walk<'a>(
        fields: &'a [FormField],
        seen: &mut HashSet<&'a str>,
    ) -> Result<(), CoreError> {
        for field in fields {
            if field.id.trim().is_empty() {
                return Err(CoreError::Validation(
                    "Every form field must have a non-empty id".into(),
                ));
            }
            if !seen.insert(field.id.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Duplicate form field id '{}'",
                    field.id
                )));
            }
            if matches!(field.field_type, FieldType::Select | FieldType::Radio)
                && field.options.is_empty()
            {
                return Err(CoreError::Validation(format!(
                    "Field '{}' must declare at least one option",
                    field.id
                )));
            }
            walk(&field.dependent_fields, seen)?;
        }
        Ok(())
    }

    let mut seen = HashSet::new();
    for section in &schema.sections {
        walk(&section.fields, &mut seen)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Answers
// ---------------------------------------------------------------------------

/// A scalar answer value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Null,
}

impl AnswerValue {
    /// Whether this value counts as an answer.
    ///
    /// Booleans are always answered once set; text must be non-blank;
    /// numbers must not be NaN.
    pub fn is_answered(&self) -> bool {
        match self {
            Self::Bool(_) => true,
            Self::Number(n) => !n.is_nan(),
            Self::Text(s) => !s.trim().is_empty(),
            Self::Null => false,
        }
    }

    /// Truthiness used for boolean parents without an explicit trigger.
    pub fn is_affirmative(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(s) => {
                let normalized = s.trim().to_lowercase();
                AFFIRMATIVE_TEXT.contains(&normalized.as_str())
            }
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Null => false,
        }
    }

    /// Equality used for `show_dependents_when` triggers. Text compares
    /// case-insensitively.
    pub fn matches_trigger(&self, trigger: &AnswerValue) -> bool {
        match (self, trigger) {
            (Self::Text(a), Self::Text(b)) => a.trim().eq_ignore_ascii_case(b.trim()),
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            // A boolean answer triggers a textual affirmative option and vice versa.
            (Self::Bool(a), Self::Text(_)) => *a == trigger.is_affirmative(),
            (Self::Text(_), Self::Bool(b)) => self.is_affirmative() == *b,
            _ => false,
        }
    }
}

/// Field id to answer. Ordered so serialization is deterministic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormAnswers(pub BTreeMap<String, AnswerValue>);

impl FormAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field_id: &str) -> Option<&AnswerValue> {
        self.0.get(field_id)
    }

    pub fn insert(&mut self, field_id: impl Into<String>, value: AnswerValue) {
        self.0.insert(field_id.into(), value);
    }

    /// Whether at least one entry counts as answered.
    pub fn has_any_answer(&self) -> bool {
        self.0.values().any(AnswerValue::is_answered)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// The versioned envelope written to `applicants.form_answers`.
#[derive(Debug, Serialize, Deserialize)]
struct StoredAnswers {
    version: u32,
    answers: FormAnswers,
}

/// Parse answers submitted by a client. Only a flat map of scalars is accepted.
pub fn parse_answers(value: &serde_json::Value) -> Result<FormAnswers, CoreError> {
    serde_json::from_value(value.clone()).map_err(|e| {
        CoreError::Validation(format!(
            "Form answers must be an object mapping field ids to scalar values: {e}"
        ))
    })
}

/// Decode answers read back from the database.
///
/// Accepts the versioned envelope or a bare legacy map. `NULL` decodes to
/// an empty answer set.
pub fn decode_stored_answers(value: &serde_json::Value) -> Result<FormAnswers, CoreError> {
    match value {
        serde_json::Value::Null => Ok(FormAnswers::new()),
        serde_json::Value::Object(map)
            if map.contains_key("version") && map.contains_key("answers") =>
        {
            let stored: StoredAnswers = serde_json::from_value(value.clone()).map_err(|e| {
                CoreError::Validation(format!("Stored form answers are malformed: {e}"))
            })?;
            if stored.version != ANSWERS_FORMAT_VERSION {
                return Err(CoreError::Validation(format!(
                    "Unsupported form answers version {}",
                    stored.version
                )));
            }
            Ok(stored.answers)
        }
        serde_json::Value::Object(_) => parse_answers(value),
        _ => Err(CoreError::Validation(
            "Stored form answers must be a JSON object".into(),
        )),
    }
}

/// Encode answers into the versioned envelope for persistence.
pub fn encode_stored_answers(answers: &FormAnswers) -> serde_json::Value {
    serde_json::json!({
        "version": ANSWERS_FORMAT_VERSION,
        "answers": answers,
    })
}

/// Check submitted answers against the schema: every key must name a field
/// and each value must fit the field's type. `Null` clears any field.
pub fn validate_answers_against(
    schema: &FormQuestions,
    answers: &FormAnswers,
) -> Result<(), CoreError> {
    for (field_id, value) in &answers.0 {
        let field = schema.find_field(field_id).ok_or_else(|| {
            CoreError::Validation(format!("Unknown form field '{field_id}'"))
        })?;

        if matches!(value, AnswerValue::Null) {
            continue;
        }

        let fits = match field.field_type {
            FieldType::Boolean => matches!(value, AnswerValue::Bool(_)),
            FieldType::Number => matches!(value, AnswerValue::Number(n) if !n.is_nan()),
            FieldType::Select | FieldType::Radio => match value {
                AnswerValue::Text(s) => {
                    field.options.is_empty() || field.options.iter().any(|o| o == s)
                }
                _ => false,
            },
            t if t.is_textual() => matches!(value, AnswerValue::Text(_)),
            _ => true,
        };

        if !fits {
            return Err(CoreError::Validation(format!(
                "Invalid value for field '{field_id}'"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn sample_schema() -> FormQuestions {
        FormQuestions::from_value(&json!({
            "sections": [{
                "id": "personal",
                "title": "Personal data",
                "fields": [
                    { "id": "full_name", "label": "Full name", "type": "text", "required": true },
                    { "id": "age", "label": "Age", "type": "number" },
                    {
                        "id": "traveled_before", "label": "Traveled before?", "type": "boolean",
                        "required": true,
                        "dependent_fields": [
                            { "id": "last_trip", "label": "Last trip", "type": "date", "required": true }
                        ]
                    },
                    { "id": "marital", "type": "select", "options": ["single", "married"] }
                ]
            }]
        }))
        .expect("sample schema parses")
    }

    #[test]
    fn schema_parses_with_defaults() {
        let schema = sample_schema();
        let field = schema.find_field("age").unwrap();
        assert_eq!(field.field_type, FieldType::Number);
        assert!(!field.required);
        assert!(field.dependent_fields.is_empty());
    }

    #[test]
    fn find_field_reaches_dependents() {
        let schema = sample_schema();
        assert_eq!(schema.find_field("last_trip").unwrap().field_type, FieldType::Date);
        assert!(schema.find_field("missing").is_none());
    }

    #[test]
    fn unknown_field_type_is_tolerated() {
        let schema = FormQuestions::from_value(&json!({
            "sections": [{ "id": "s", "fields": [{ "id": "sig", "type": "signature" }] }]
        }))
        .unwrap();
        assert_eq!(schema.sections[0].fields[0].field_type, FieldType::Other);
    }

    #[test]
    fn missing_sections_is_rejected() {
        assert_matches!(
            FormQuestions::from_value(&json!({ "title": "x" })),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn validate_schema_rejects_duplicate_ids() {
        let schema = FormQuestions::from_value(&json!({
            "sections": [
                { "id": "a", "fields": [{ "id": "dup" }] },
                { "id": "b", "fields": [{ "id": "x", "dependent_fields": [{ "id": "dup" }] }] }
            ]
        }))
        .unwrap();
        assert_matches!(validate_schema(&schema), Err(CoreError::Validation(msg)) if msg.contains("dup"));
    }

    #[test]
    fn validate_schema_requires_options_for_select() {
        let schema = FormQuestions::from_value(&json!({
            "sections": [{ "id": "a", "fields": [{ "id": "pick", "type": "radio" }] }]
        }))
        .unwrap();
        assert_matches!(validate_schema(&schema), Err(CoreError::Validation(_)));
        assert!(validate_schema(&sample_schema()).is_ok());
    }

    #[test]
    fn answer_values_parse_from_scalars() {
        let answers = parse_answers(&json!({
            "a": "text", "b": 3, "c": true, "d": null
        }))
        .unwrap();
        assert_eq!(answers.get("a"), Some(&AnswerValue::Text("text".into())));
        assert_eq!(answers.get("b"), Some(&AnswerValue::Number(3.0)));
        assert_eq!(answers.get("c"), Some(&AnswerValue::Bool(true)));
        assert_eq!(answers.get("d"), Some(&AnswerValue::Null));
    }

    #[test]
    fn nested_values_are_rejected() {
        assert_matches!(
            parse_answers(&json!({ "a": { "nested": 1 } })),
            Err(CoreError::Validation(_))
        );
        assert_matches!(parse_answers(&json!({ "a": [1, 2] })), Err(CoreError::Validation(_)));
        assert_matches!(parse_answers(&json!(["a"])), Err(CoreError::Validation(_)));
    }

    #[test]
    fn answered_rules() {
        assert!(AnswerValue::Bool(false).is_answered());
        assert!(AnswerValue::Number(0.0).is_answered());
        assert!(!AnswerValue::Number(f64::NAN).is_answered());
        assert!(!AnswerValue::Text("   ".into()).is_answered());
        assert!(!AnswerValue::Text(String::new()).is_answered());
        assert!(AnswerValue::Text("x".into()).is_answered());
        assert!(!AnswerValue::Null.is_answered());
    }

    #[test]
    fn affirmative_text_is_case_insensitive() {
        assert!(AnswerValue::Text("Sim".into()).is_affirmative());
        assert!(AnswerValue::Text("YES".into()).is_affirmative());
        assert!(!AnswerValue::Text("no".into()).is_affirmative());
    }

    #[test]
    fn trigger_matching() {
        let trigger = AnswerValue::Text("Yes".into());
        assert!(AnswerValue::Text("yes".into()).matches_trigger(&trigger));
        assert!(AnswerValue::Bool(true).matches_trigger(&trigger));
        assert!(!AnswerValue::Bool(false).matches_trigger(&trigger));
        assert!(!AnswerValue::Text("No".into()).matches_trigger(&trigger));
    }

    #[test]
    fn stored_envelope_round_trip_and_legacy_map() {
        let mut answers = FormAnswers::new();
        answers.insert("full_name", AnswerValue::Text("Ana".into()));
        let stored = encode_stored_answers(&answers);
        assert_eq!(stored["version"], 1);
        assert_eq!(decode_stored_answers(&stored).unwrap(), answers);

        let legacy = json!({ "full_name": "Ana" });
        assert_eq!(decode_stored_answers(&legacy).unwrap(), answers);

        assert!(decode_stored_answers(&serde_json::Value::Null).unwrap().is_empty());
    }

    #[test]
    fn stored_unknown_version_is_rejected() {
        let stored = json!({ "version": 9, "answers": {} });
        assert_matches!(decode_stored_answers(&stored), Err(CoreError::Validation(_)));
        assert_matches!(decode_stored_answers(&json!("x")), Err(CoreError::Validation(_)));
    }

    #[test]
    fn answers_validated_against_schema() {
        let schema = sample_schema();
        let ok = parse_answers(&json!({
            "full_name": "Ana", "age": 30, "traveled_before": true,
            "last_trip": "2024-01-01", "marital": "single"
        }))
        .unwrap();
        assert!(validate_answers_against(&schema, &ok).is_ok());

        let unknown = parse_answers(&json!({ "nope": "x" })).unwrap();
        assert_matches!(
            validate_answers_against(&schema, &unknown),
            Err(CoreError::Validation(msg)) if msg.contains("nope")
        );

        let wrong_type = parse_answers(&json!({ "traveled_before": "maybe" })).unwrap();
        assert!(validate_answers_against(&schema, &wrong_type).is_err());

        let bad_option = parse_answers(&json!({ "marital": "divorced" })).unwrap();
        assert!(validate_answers_against(&schema, &bad_option).is_err());

        let cleared = parse_answers(&json!({ "age": null })).unwrap();
        assert!(validate_answers_against(&schema, &cleared).is_ok());
    }
}
