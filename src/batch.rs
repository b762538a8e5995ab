//! Batch conversion of notes exports.
//!
//! A notes export is `{"notes": [{"document_json": "<stringified doc>", ...}]}`.
//! Every record is converted on its own: a record that fails to parse or
//! serialize is reported and skipped, never aborting the batch.

use std::io::Read;

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::detect::{detect_input, InputKind};
use crate::error::{Error, Result};
use crate::model::Document;
use crate::render::MarkdownSerializer;
use crate::schema::Schema;

/// One record of a notes export.
#[derive(Debug, Clone, Deserialize)]
pub struct NoteRecord {
    /// The document, as a JSON string
    #[serde(default)]
    pub document_json: Option<String>,

    /// Record identifier, string or number
    #[serde(default)]
    pub id: Option<Value>,
}

impl NoteRecord {
    /// Identifier rendered as text.
    pub fn id_string(&self) -> Option<String> {
        match &self.id {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// A notes export envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct NotesExport {
    /// Records in export order
    pub notes: Vec<NoteRecord>,
}

impl NotesExport {
    /// Read an export from a parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        match detect_input(&value)? {
            InputKind::NotesExport { .. } => Ok(serde_json::from_value(value)?),
            InputKind::Document => Err(Error::UnknownFormat),
        }
    }

    /// Read an export from JSON text.
    pub fn from_str(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Read an export from a JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_value(serde_json::from_reader(reader)?)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Whether the export has no records.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Options for batch conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Convert at most this many records (from the start)
    pub limit: Option<usize>,

    /// Convert records in parallel
    pub parallel: bool,

    /// Outputs with fewer trimmed characters are reported as blank
    pub min_content_chars: usize,
}

impl BatchOptions {
    /// Create new batch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of records converted.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the minimum content length.
    pub fn with_min_content_chars(mut self, chars: usize) -> Self {
        self.min_content_chars = chars;
        self
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            limit: None,
            parallel: true,
            min_content_chars: 2,
        }
    }
}

/// Result of converting one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    /// Markdown was produced
    Converted {
        /// Position in the export
        index: usize,
        /// Record identifier
        id: Option<String>,
        /// Rendered Markdown
        #[serde(skip)]
        markdown: String,
    },
    /// The record rendered to (nearly) nothing
    Blank {
        /// Position in the export
        index: usize,
        /// Record identifier
        id: Option<String>,
    },
    /// The record could not be converted
    Failed {
        /// Position in the export
        index: usize,
        /// Record identifier
        id: Option<String>,
        /// Error message
        error: String,
    },
}

impl BatchOutcome {
    /// Position of the record in the export.
    pub fn index(&self) -> usize {
        match self {
            BatchOutcome::Converted { index, .. }
            | BatchOutcome::Blank { index, .. }
            | BatchOutcome::Failed { index, .. } => *index,
        }
    }

    /// Record identifier.
    pub fn id(&self) -> Option<&str> {
        match self {
            BatchOutcome::Converted { id, .. }
            | BatchOutcome::Blank { id, .. }
            | BatchOutcome::Failed { id, .. } => id.as_deref(),
        }
    }

    /// Markdown of a converted record.
    pub fn markdown(&self) -> Option<&str> {
        match self {
            BatchOutcome::Converted { markdown, .. } => Some(markdown),
            _ => None,
        }
    }

    /// Whether the record failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, BatchOutcome::Failed { .. })
    }
}

/// Summary of a batch conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    /// Records considered (after the limit)
    pub total: usize,
    /// Records converted
    pub converted: usize,
    /// Records with blank output
    pub blank: usize,
    /// Records that failed
    pub failed: usize,
    /// Per-record outcomes in export order
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchReport {
    fn from_outcomes(outcomes: Vec<BatchOutcome>) -> Self {
        let mut report = Self {
            total: outcomes.len(),
            converted: 0,
            blank: 0,
            failed: 0,
            outcomes: Vec::new(),
        };
        for outcome in &outcomes {
            match outcome {
                BatchOutcome::Converted { .. } => report.converted += 1,
                BatchOutcome::Blank { .. } => report.blank += 1,
                BatchOutcome::Failed { .. } => report.failed += 1,
            }
        }
        report.outcomes = outcomes;
        report
    }

    /// Converted records as `(index, markdown)` pairs.
    pub fn converted_notes(&self) -> impl Iterator<Item = (usize, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.markdown().map(|md| (o.index(), md)))
    }

    /// Failed records.
    pub fn failures(&self) -> impl Iterator<Item = &BatchOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }
}

/// Convert one record.
pub fn convert_record(
    record: &NoteRecord,
    index: usize,
    schema: &Schema,
    serializer: &MarkdownSerializer,
    options: &BatchOptions,
) -> BatchOutcome {
    let id = record.id_string();
    let result = record
        .document_json
        .as_deref()
        .ok_or_else(|| Error::MalformedInput("record without document_json".to_string()))
        .and_then(|json| Document::from_str(schema, json))
        .and_then(|doc| serializer.serialize(&doc));

    match result {
        Ok(markdown) if markdown.trim().chars().count() < options.min_content_chars => {
            BatchOutcome::Blank { index, id }
        }
        Ok(markdown) => BatchOutcome::Converted {
            index,
            id,
            markdown,
        },
        Err(e) => {
            warn!("skipping note {}: {}", index, e);
            BatchOutcome::Failed {
                index,
                id,
                error: e.to_string(),
            }
        }
    }
}

/// Convert every record of an export.
pub fn convert_notes(
    export: &NotesExport,
    schema: &Schema,
    serializer: &MarkdownSerializer,
    options: &BatchOptions,
) -> BatchReport {
    convert_notes_with(export, schema, serializer, options, |_| {})
}

/// Convert every record of an export, calling `on_record` after each one.
///
/// With parallel conversion `on_record` runs on worker threads in no
/// particular order; the report itself is always in export order.
pub fn convert_notes_with<F>(
    export: &NotesExport,
    schema: &Schema,
    serializer: &MarkdownSerializer,
    options: &BatchOptions,
    on_record: F,
) -> BatchReport
where
    F: Fn(&BatchOutcome) + Sync,
{
    let count = options
        .limit
        .map_or(export.len(), |limit| limit.min(export.len()));
    let records = &export.notes[..count];
    debug!(
        "converting {} of {} notes (parallel: {})",
        count,
        export.len(),
        options.parallel
    );

    let convert = |(index, record): (usize, &NoteRecord)| {
        let outcome = convert_record(record, index, schema, serializer, options);
        on_record(&outcome);
        outcome
    };

    let outcomes: Vec<BatchOutcome> = if options.parallel {
        records.par_iter().enumerate().map(convert).collect()
    } else {
        records.iter().enumerate().map(convert).collect()
    };

    let report = BatchReport::from_outcomes(outcomes);
    debug!(
        "batch done: {} converted, {} blank, {} failed",
        report.converted, report.blank, report.failed
    );
    report
}

/// Parse a notes export from JSON text and convert it.
pub fn convert_notes_str(
    json: &str,
    schema: &Schema,
    serializer: &MarkdownSerializer,
    options: &BatchOptions,
) -> Result<BatchReport> {
    let export = NotesExport::from_str(json)?;
    Ok(convert_notes(&export, schema, serializer, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(doc: Value) -> Value {
        json!({"document_json": doc.to_string()})
    }

    #[test]
    fn test_id_string() {
        let r: NoteRecord = serde_json::from_value(json!({"document_json": "{}", "id": 42})).unwrap();
        assert_eq!(r.id_string().as_deref(), Some("42"));
        let r: NoteRecord = serde_json::from_value(json!({"id": "n-1"})).unwrap();
        assert_eq!(r.id_string().as_deref(), Some("n-1"));
        assert!(r.document_json.is_none());
    }

    #[test]
    fn test_document_is_not_an_export() {
        let result = NotesExport::from_value(json!({"type": "doc"}));
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_blank_threshold() {
        let schema = Schema::notes();
        let serializer = MarkdownSerializer::notes();
        let export: NotesExport = serde_json::from_value(json!({
            "notes": [
                record(json!({"type": "doc", "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "x"}]}
                ]})),
                record(json!({"type": "doc", "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "ok"}]}
                ]})),
            ]
        }))
        .unwrap();

        let report = convert_notes(&export, &schema, &serializer, &BatchOptions::new().sequential());
        assert_eq!(report.blank, 1);
        assert_eq!(report.converted, 1);
        assert_eq!(report.converted_notes().collect::<Vec<_>>(), vec![(1, "ok")]);
    }

    #[test]
    fn test_missing_document_json_fails_record() {
        let schema = Schema::notes();
        let serializer = MarkdownSerializer::notes();
        let export: NotesExport = serde_json::from_value(json!({"notes": [{"id": 7}]})).unwrap();
        let report = convert_notes(&export, &schema, &serializer, &BatchOptions::default());
        assert_eq!(report.failed, 1);
        assert_eq!(report.outcomes[0].id(), Some("7"));
    }

    #[test]
    fn test_report_serializes_without_markdown() {
        let report = BatchReport::from_outcomes(vec![BatchOutcome::Converted {
            index: 0,
            id: None,
            markdown: "body".to_string(),
        }]);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["converted"], json!(1));
        assert_eq!(value["outcomes"][0]["status"], json!("converted"));
        assert!(value["outcomes"][0].get("markdown").is_none());
    }
}
