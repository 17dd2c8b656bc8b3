//! Text field builder (ISO 32000-1 §12.7.4.3).
//!
//! Also used for date fields, which are text fields carrying field-level
//! format and keystroke scripts in `/AA`.

use super::{field_base, FormFieldWidget, TextAlignment, TextFieldFlags, VariableText, WidgetStyle};
use crate::geometry::Rect;
use crate::object::{Dict, Object, ObjectRef};
use crate::writer::object_serializer::ObjectSerializer;

/// A text field widget.
#[derive(Debug, Clone)]
pub struct TextFieldWidget {
    name: String,
    rect: Rect,
    value: String,
    max_length: Option<u32>,
    flags: TextFieldFlags,
    text: VariableText,
    style: WidgetStyle,
    format_script: Option<String>,
    keystroke_script: Option<String>,
}

impl TextFieldWidget {
    /// Create a single-line text field.
    pub fn new(name: impl Into<String>, rect: Rect) -> Self {
        Self {
            name: name.into(),
            rect,
            value: String::new(),
            max_length: None,
            flags: TextFieldFlags::empty(),
            text: VariableText::default(),
            style: WidgetStyle::default(),
            format_script: None,
            keystroke_script: None,
        }
    }

    /// Set the initial value (written to both `/V` and `/DV`).
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Limit the number of characters.
    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Allow multiple lines. Ignored on comb fields.
    pub fn multiline(mut self) -> Self {
        if !self.flags.contains(TextFieldFlags::COMB) {
            self.flags |= TextFieldFlags::MULTILINE;
        }
        self
    }

    /// Split the box into `cells` character cells; forces `/MaxLen` and
    /// clears multiline, which a comb field may not have.
    pub fn comb(mut self, cells: u32) -> Self {
        self.flags |= TextFieldFlags::COMB;
        self.flags -= TextFieldFlags::MULTILINE;
        self.max_length = Some(cells);
        self
    }

    /// Make the field read-only.
    pub fn read_only(mut self) -> Self {
        self.flags |= TextFieldFlags::READ_ONLY;
        self
    }

    /// Make the field required.
    pub fn required(mut self) -> Self {
        self.flags |= TextFieldFlags::REQUIRED;
        self
    }

    /// Set font size, colour and alignment.
    pub fn with_text(mut self, text: VariableText) -> Self {
        self.text = text;
        self
    }

    /// Set alignment only.
    pub fn with_alignment(mut self, alignment: TextAlignment) -> Self {
        self.text.alignment = alignment;
        self
    }

    /// Set border, background and tooltip.
    pub fn with_style(mut self, style: WidgetStyle) -> Self {
        self.style = style;
        self
    }

    /// Attach field-level format (`/F`) and keystroke (`/K`) scripts.
    pub fn with_format_scripts(mut self, format: impl Into<String>, keystroke: impl Into<String>) -> Self {
        self.format_script = Some(format.into());
        self.keystroke_script = Some(keystroke.into());
        self
    }

    /// Current flags.
    pub fn flags(&self) -> TextFieldFlags {
        self.flags
    }

    fn additional_actions(&self) -> Option<Object> {
        let mut aa = Dict::new();
        if let Some(js) = &self.format_script {
            aa.insert("F".to_string(), javascript_action(js));
        }
        if let Some(js) = &self.keystroke_script {
            aa.insert("K".to_string(), javascript_action(js));
        }
        (!aa.is_empty()).then_some(Object::Dictionary(aa))
    }
}

/// A `/S /JavaScript` action dictionary.
pub(crate) fn javascript_action(script: &str) -> Object {
    ObjectSerializer::dict(vec![
        ("Type", ObjectSerializer::name("Action")),
        ("S", ObjectSerializer::name("JavaScript")),
        ("JS", ObjectSerializer::text(script)),
    ])
}

impl FormFieldWidget for TextFieldWidget {
    fn field_name(&self) -> &str {
        &self.name
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn field_type(&self) -> &'static str {
        "Tx"
    }

    fn field_flags(&self) -> u32 {
        self.flags.bits()
    }

    fn build_field_dict(&self) -> Dict {
        let mut dict = field_base("Tx", &self.name, self.field_flags());
        dict.insert("DA".to_string(), ObjectSerializer::string(&self.text.default_appearance()));
        dict.insert("Q".to_string(), ObjectSerializer::integer(self.text.alignment.q_value()));

        if !self.value.is_empty() {
            dict.insert("V".to_string(), ObjectSerializer::text(&self.value));
            dict.insert("DV".to_string(), ObjectSerializer::text(&self.value));
        }
        if let Some(max) = self.max_length.filter(|&m| m > 0) {
            dict.insert("MaxLen".to_string(), ObjectSerializer::integer(max as i64));
        }
        if let Some(aa) = self.additional_actions() {
            dict.insert("AA".to_string(), aa);
        }
        dict
    }

    fn build_widget_dict(&self, page_ref: ObjectRef) -> Dict {
        let (mut dict, mk) = self.style.widget_base(&self.rect, page_ref);
        if !mk.is_empty() {
            dict.insert("MK".to_string(), Object::Dictionary(mk));
        }
        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> TextFieldWidget {
        TextFieldWidget::new("Text_1", Rect::new(75.0, 694.5, 112.5, 22.5))
    }

    #[test]
    fn test_plain_text_field_dict() {
        let dict = field().build_field_dict();
        assert_eq!(dict.get("FT").and_then(Object::as_name), Some("Tx"));
        assert_eq!(dict.get("T").and_then(Object::as_text).as_deref(), Some("Text_1"));
        assert_eq!(dict.get("Q").and_then(Object::as_integer), Some(0));
        assert!(!dict.contains_key("Ff"));
        assert!(!dict.contains_key("V"));
        assert!(!dict.contains_key("MaxLen"));
    }

    #[test]
    fn test_comb_forces_max_length() {
        let f = field().with_max_length(20).comb(6);
        let dict = f.build_field_dict();
        assert_eq!(dict.get("MaxLen").and_then(Object::as_integer), Some(6));
        assert!(f.flags().contains(TextFieldFlags::COMB));
    }

    #[test]
    fn test_comb_excludes_multiline() {
        for f in [field().multiline().comb(4), field().comb(4).multiline()] {
            assert!(f.flags().contains(TextFieldFlags::COMB));
            assert!(!f.flags().contains(TextFieldFlags::MULTILINE));
        }
    }

    #[test]
    fn test_flags_combine() {
        let f = field().multiline().required().read_only();
        assert_eq!(f.field_flags(), 1 | 2 | 4096);
    }

    #[test]
    fn test_date_scripts_are_field_level() {
        let f = field().with_format_scripts(
            "AFDate_FormatEx(\"mm/dd/yyyy\");",
            "AFDate_KeystrokeEx(\"mm/dd/yyyy\");",
        );
        let field_dict = f.build_field_dict();
        let aa = field_dict.get("AA").and_then(Object::as_dict).unwrap();
        let format = aa.get("F").and_then(Object::as_dict).unwrap();
        assert_eq!(format.get("S").and_then(Object::as_name), Some("JavaScript"));
        assert_eq!(
            format.get("JS").and_then(Object::as_text).as_deref(),
            Some("AFDate_FormatEx(\"mm/dd/yyyy\");")
        );
        assert!(aa.contains_key("K"));
        assert!(!f.build_widget_dict(ObjectRef::new(3, 0)).contains_key("AA"));
    }

    #[test]
    fn test_merged_dict_has_field_and_widget_entries() {
        let merged = field().with_value("hello").build_merged(ObjectRef::new(3, 0));
        assert_eq!(merged.get("Subtype").and_then(Object::as_name), Some("Widget"));
        assert_eq!(merged.get("V").and_then(Object::as_text).as_deref(), Some("hello"));
        assert!(merged.contains_key("DA"));
    }
}
