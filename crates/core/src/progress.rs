//! Form progress evaluation.
//!
//! Computes per-field, per-section and overall completion of an
//! applicant's form from the form-questions schema and the stored answers.
//! Progress is a read-time projection: it is never persisted and is
//! recomputed on every read and every write, so evaluation is a pure,
//! deterministic function of its two inputs.

use serde::Serialize;

use crate::form::{AnswerValue, FieldType, FormAnswers, FormField, FormQuestions};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Completion of a single top-level field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldProgress {
    pub id: String,
    pub label: String,
    pub completed: bool,
    /// The field itself has an answer. A field can have a value and still be
    /// incomplete when a visible dependent is missing.
    pub has_value: bool,
}

/// Completion of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionProgress {
    pub index: usize,
    pub id: String,
    pub title: String,
    pub total_fields: usize,
    pub completed_fields: usize,
    pub percentage: u32,
    pub completed: bool,
    pub fields: Vec<FieldProgress>,
}

/// Overall completion report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FormProgress {
    pub total_sections: usize,
    pub total_fields: usize,
    pub completed_fields: usize,
    pub percentage: u32,
    pub sections: Vec<SectionProgress>,
}

impl FormProgress {
    /// Whether every field of a non-empty form is complete.
    pub fn is_complete(&self) -> bool {
        self.total_fields > 0 && self.completed_fields == self.total_fields
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// `round(100 * part / whole)` with halves rounded up, and an empty whole
/// defined as 0. Integer arithmetic, so 23/40 is exactly 57.5 and becomes 58.
fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((200 * part + whole) / (2 * whole)) as u32
}

fn is_answered(value: Option<&AnswerValue>) -> bool {
    value.is_some_and(AnswerValue::is_answered)
}

/// Whether the parent's answer reveals its dependent fields.
fn dependents_visible(field: &FormField, value: Option<&AnswerValue>) -> bool {
    let Some(value) = value.filter(|v| v.is_answered()) else {
        return false;
    };
    match &field.show_dependents_when {
        Some(trigger) => value.matches_trigger(trigger),
        None if field.field_type == FieldType::Boolean => value.is_affirmative(),
        None => true,
    }
}

/// Recursive completeness rule.
///
/// A field is complete when it is optional or answered, and, if its
/// dependents are visible, every dependent is itself complete.
pub fn is_field_complete(field: &FormField, answers: &FormAnswers) -> bool {
    let value = answers.get(&field.id);

    if field.required && !is_answered(value) {
        return false;
    }

    if field.dependent_fields.is_empty() || !dependents_visible(field, value) {
        return true;
    }

    field
        .dependent_fields
        .iter()
        .all(|dep| is_field_complete(dep, answers))
}

/// Evaluate progress for a parsed schema.
pub fn evaluate(schema: &FormQuestions, answers: &FormAnswers) -> FormProgress {
    let sections: Vec<SectionProgress> = schema
        .sections
        .iter()
        .enumerate()
        .map(|(index, section)| {
            let fields: Vec<FieldProgress> = section
                .fields
                .iter()
                .map(|field| FieldProgress {
                    id: field.id.clone(),
                    label: field.label.clone(),
                    completed: is_field_complete(field, answers),
                    has_value: is_answered(answers.get(&field.id)),
                })
                .collect();

            let total_fields = fields.len();
            let completed_fields = fields.iter().filter(|f| f.completed).count();
            let pct = percentage(completed_fields, total_fields);

            SectionProgress {
                index,
                id: section.id.clone(),
                title: section.label().to_string(),
                total_fields,
                completed_fields,
                percentage: pct,
                completed: pct == 100,
                fields,
            }
        })
        .collect();

    let total_fields: usize = sections.iter().map(|s| s.total_fields).sum();
    let completed_fields: usize = sections.iter().map(|s| s.completed_fields).sum();

    FormProgress {
        total_sections: sections.len(),
        total_fields,
        completed_fields,
        percentage: percentage(completed_fields, total_fields),
        sections,
    }
}

/// Evaluate progress for a raw stored document.
///
/// A document without a parseable `sections` array yields the all-zero
/// report instead of an error.
pub fn evaluate_document(document: &serde_json::Value, answers: &FormAnswers) -> FormProgress {
    match FormQuestions::from_value(document) {
        Ok(schema) => evaluate(&schema, answers),
        Err(_) => FormProgress::default(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
