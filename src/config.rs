//! Designer configuration.

use crate::geometry::{Point, Size};
use serde::{Deserialize, Serialize};

/// How export treats a page that was never calibrated against the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationPolicy {
    /// Refuse to export until every page holding fields has been calibrated.
    Block,
    /// Use the last known calibration (or the default one), logging a warning.
    UseLastKnown,
}

/// Form designer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
    /// Logical canvas frame in pixels; fields are clamped into it.
    pub canvas: Size,

    /// Offset subtracted from a click or drop point so the new field is
    /// centred under the pointer.
    pub placement_offset: Point,

    /// Minimum width and height reachable by resizing.
    pub min_resize: Size,

    /// Touch movement (pixels) before a toolbar touch becomes a drag.
    pub touch_drag_threshold: f32,

    /// Scale used until the first successful calibration.
    pub default_scale: f32,

    /// Behaviour when exporting uncalibrated pages.
    pub calibration_policy: CalibrationPolicy,

    /// Filename offered for the exported document.
    pub output_filename: String,

    /// Document title written to the Info dictionary.
    pub title: String,

    /// Document author written to the Info dictionary.
    pub author: String,

    /// Catalog `/Lang` entry.
    pub language: String,

    /// Producer application name.
    pub producer: String,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DesignerConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            canvas: Size::new(816.0, 1056.0),
            placement_offset: Point::new(75.0, 15.0),
            min_resize: Size::new(50.0, 20.0),
            touch_drag_threshold: 10.0,
            default_scale: 1.333,
            calibration_policy: CalibrationPolicy::Block,
            output_filename: "fillable-form.pdf".to_string(),
            title: "Fillable Form".to_string(),
            author: "pdfup".to_string(),
            language: "en-US".to_string(),
            producer: "pdf_form_designer".to_string(),
        }
    }

    /// Set the calibration policy.
    pub fn with_calibration_policy(mut self, policy: CalibrationPolicy) -> Self {
        self.calibration_policy = policy;
        self
    }

    /// Set the output filename.
    pub fn with_output_filename(mut self, name: impl Into<String>) -> Self {
        self.output_filename = name.into();
        self
    }

    /// Set document title and author.
    pub fn with_metadata(mut self, title: impl Into<String>, author: impl Into<String>) -> Self {
        self.title = title.into();
        self.author = author.into();
        self
    }

    /// Set the default scale used before calibration.
    pub fn with_default_scale(mut self, scale: f32) -> Self {
        self.default_scale = scale;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DesignerConfig::default();
        assert_eq!(config.canvas, Size::new(816.0, 1056.0));
        assert_eq!(config.output_filename, "fillable-form.pdf");
        assert_eq!(config.calibration_policy, CalibrationPolicy::Block);
        assert!((config.default_scale - 1.333).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_json_overrides() {
        let config: DesignerConfig =
            serde_json::from_str(r#"{"output_filename":"custom.pdf","touch_drag_threshold":4}"#).unwrap();
        assert_eq!(config.output_filename, "custom.pdf");
        assert_eq!(config.touch_drag_threshold, 4.0);
        assert_eq!(config.title, "Fillable Form");
    }
}
