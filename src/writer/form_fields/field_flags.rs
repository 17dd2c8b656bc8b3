//! Field flags and variable-text settings for form fields.
//!
//! Bit positions follow ISO 32000-1 Tables 221, 226, 228 and 230. The
//! common bits (read-only, required) are repeated in each per-type set so a
//! single value can be written straight into `/Ff`.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Text field flags (field type Tx).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TextFieldFlags: u32 {
        /// Bit 1: user cannot change the value
        const READ_ONLY = 1 << 0;
        /// Bit 2: must have a value before submit
        const REQUIRED = 1 << 1;
        /// Bit 13: text may span multiple lines
        const MULTILINE = 1 << 12;
        /// Bit 24: text does not scroll beyond the box
        const DO_NOT_SCROLL = 1 << 23;
        /// Bit 25: equally spaced character cells; needs `/MaxLen`
        const COMB = 1 << 24;
    }
}

bitflags! {
    /// Button field flags (field type Btn).
    ///
    /// Neither RADIO nor PUSHBUTTON set means a checkbox.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ButtonFieldFlags: u32 {
        /// Bit 1: user cannot change the value
        const READ_ONLY = 1 << 0;
        /// Bit 2: must have a value before submit
        const REQUIRED = 1 << 1;
        /// Bit 15: clicking the selected radio does not turn it off
        const NO_TOGGLE_TO_OFF = 1 << 14;
        /// Bit 16: radio button group
        const RADIO = 1 << 15;
        /// Bit 17: push button, keeps no value
        const PUSHBUTTON = 1 << 16;
        /// Bit 26: radios with the same export value toggle together
        const RADIOS_IN_UNISON = 1 << 25;
    }
}

bitflags! {
    /// Choice field flags (field type Ch).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ChoiceFieldFlags: u32 {
        /// Bit 1: user cannot change the value
        const READ_ONLY = 1 << 0;
        /// Bit 2: must have a value before submit
        const REQUIRED = 1 << 1;
        /// Bit 18: combo box (dropdown); list box when clear
        const COMBO = 1 << 17;
        /// Bit 19: combo box accepts typed text
        const EDIT = 1 << 18;
        /// Bit 27: commit on selection change
        const COMMIT_ON_SEL_CHANGE = 1 << 26;
    }
}

bitflags! {
    /// Document-level `/SigFlags` (Table 219).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SignatureFlags: u32 {
        /// Bit 1: the document contains signature fields
        const SIGNATURES_EXIST = 1 << 0;
        /// Bit 2: save only with incremental updates
        const APPEND_ONLY = 1 << 1;
    }
}

/// Horizontal text alignment, written as the `/Q` quadding value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    /// Q = 0
    #[default]
    Left,
    /// Q = 1
    Center,
    /// Q = 2
    Right,
}

impl TextAlignment {
    /// The `/Q` value.
    pub fn q_value(&self) -> i64 {
        match self {
            Self::Left => 0,
            Self::Center => 1,
            Self::Right => 2,
        }
    }

    /// CSS `text-align` keyword.
    pub fn css(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Font size, colour and alignment of a variable-text field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableText {
    /// Font size in points; 0 means auto-size
    pub font_size: f32,
    /// DeviceRGB text colour
    pub color: [f32; 3],
    /// Quadding
    pub alignment: TextAlignment,
}

impl Default for VariableText {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            color: [0.0, 0.0, 0.0],
            alignment: TextAlignment::Left,
        }
    }
}

impl VariableText {
    /// Default appearance string, e.g. `/Helv 12 Tf 0 0 0 rg`.
    pub fn default_appearance(&self) -> String {
        let [r, g, b] = self.color;
        format!(
            "/Helv {} Tf {} {} {} rg",
            trim_number(self.font_size),
            trim_number(r),
            trim_number(g),
            trim_number(b)
        )
    }
}

/// Shortest decimal form with at most three places.
fn trim_number(value: f32) -> String {
    let formatted = format!("{:.3}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        t => t.to_string(),
    }
}
