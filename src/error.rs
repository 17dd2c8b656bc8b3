//! Error types for the form designer.
//!
//! Parsing errors come from the document loader, designer errors from the
//! field model and property editor, and authoring errors from the writer
//! backend. Export validation failures carry a [`ValidationReport`] with the
//! same content a blocking modal would show.

use std::fmt;

/// Result type alias for form designer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Contents of a blocking validation failure raised before synthesis.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ValidationReport {
    /// Short heading, e.g. "Duplicate Field Names"
    pub title: String,
    /// Human-readable explanation
    pub message: String,
    /// Offending field names, if the failure is about names
    pub names: Vec<String>,
}

impl ValidationReport {
    /// Create a report without a name list.
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            names: Vec::new(),
        }
    }

    /// Attach the offending names.
    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = names;
        self
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)?;
        if !self.names.is_empty() {
            let quoted: Vec<String> = self.names.iter().map(|n| format!("\"{}\"", n)).collect();
            write!(f, " ({})", quoted.join(", "))?;
        }
        Ok(())
    }
}

/// Error types that can occur while designing or exporting a form.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    /// Invalid PDF header (expected '%PDF-')
    #[error("Invalid PDF header: expected '%PDF-', found '{0}'")]
    InvalidHeader(String),

    /// Parse error at specific byte offset
    #[error("Failed to parse object at byte {offset}: {reason}")]
    ParseError {
        /// Byte offset where error occurred
        offset: usize,
        /// Reason for parse failure
        reason: String,
    },

    /// Invalid cross-reference table
    #[error("Invalid cross-reference table")]
    InvalidXref,

    /// Referenced object not found in cross-reference table
    #[error("Object not found: {0} {1} R")]
    ObjectNotFound(u32, u16),

    /// Object has wrong type
    #[error("Invalid object type: expected {expected}, found {found}")]
    InvalidObjectType {
        /// Expected object type
        expected: String,
        /// Actual object type found
        found: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding of a visual tree, panel or config failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unsupported feature
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Invalid PDF structure (generic)
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// Stream decoding error
    #[error("Stream decoding error: {0}")]
    Decode(String),

    /// Unsupported stream filter
    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    /// Circular reference detected in object graph
    #[error("Circular reference detected: object {0}")]
    CircularReference(crate::object::ObjectRef),

    /// A field name was rejected by the name validator
    #[error("{0}")]
    InvalidName(String),

    /// Export was blocked before synthesis
    #[error("Export blocked: {0}")]
    Validation(ValidationReport),

    /// No field with the given id exists in the session
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// Page index outside the session's page list
    #[error("Page index {index} out of range (document has {count} pages)")]
    PageOutOfRange {
        /// Requested page index
        index: usize,
        /// Number of pages in the session
        count: usize,
    },

    /// A viewer geometry reading could not be turned into a calibration
    #[error("Calibration failed: {0}")]
    Calibration(String),

    /// Export attempted before the page was ever calibrated
    #[error("Page {0} has not been calibrated against the viewer")]
    NotCalibrated(usize),

    /// The authoring backend already holds a field with this name
    #[error("A field already exists with the specified name: \"{name}\"")]
    FieldNameExists {
        /// The colliding fully qualified field name
        name: String,
    },
}

impl Error {
    /// Name carried by a save-time name collision, if this is one.
    pub fn conflicting_name(&self) -> Option<&str> {
        match self {
            Error::FieldNameExists { name } => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_header_error() {
        let err = Error::InvalidHeader("NotAPDF".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid PDF header"));
        assert!(msg.contains("NotAPDF"));
    }

    #[test]
    fn test_parse_error() {
        let err = Error::ParseError {
            offset: 1234,
            reason: "invalid token".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("1234"));
        assert!(msg.contains("invalid token"));
    }

    #[test]
    fn test_field_name_exists_carries_name() {
        let err = Error::FieldNameExists {
            name: "Group1".to_string(),
        };
        assert_eq!(err.conflicting_name(), Some("Group1"));
        assert_eq!(
            err.to_string(),
            "A field already exists with the specified name: \"Group1\""
        );
        assert_eq!(Error::InvalidXref.conflicting_name(), None);
    }

    #[test]
    fn test_validation_report_display_lists_names() {
        let report = ValidationReport::new("Duplicate Field Names", "Names must be unique")
            .with_names(vec!["Field_1".to_string()]);
        let err = Error::Validation(report);
        let msg = err.to_string();
        assert!(msg.contains("Duplicate Field Names"));
        assert!(msg.contains("\"Field_1\""));
    }

    #[test]
    fn test_page_out_of_range_message() {
        let err = Error::PageOutOfRange { index: 3, count: 2 };
        assert_eq!(err.to_string(), "Page index 3 out of range (document has 2 pages)");
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
