//! Choice fields: combo boxes and list boxes (ISO 32000-1 §12.7.4.4).

use super::{field_base, ChoiceFieldFlags, FormFieldWidget, VariableText, WidgetStyle};
use crate::geometry::Rect;
use crate::object::{Dict, Object, ObjectRef};
use crate::writer::object_serializer::ObjectSerializer;

/// Presentation of a choice field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceKind {
    /// Dropdown (`COMBO` flag set)
    Combo,
    /// Scrollable list
    List,
}

/// A combo box or list box widget.
#[derive(Debug, Clone)]
pub struct ChoiceFieldWidget {
    name: String,
    rect: Rect,
    kind: ChoiceKind,
    options: Vec<String>,
    value: Option<String>,
    flags: ChoiceFieldFlags,
    text: VariableText,
    style: WidgetStyle,
}

impl ChoiceFieldWidget {
    /// Create a dropdown.
    pub fn combo(name: impl Into<String>, rect: Rect) -> Self {
        Self::new(name, rect, ChoiceKind::Combo)
    }

    /// Create a list box.
    pub fn list(name: impl Into<String>, rect: Rect) -> Self {
        Self::new(name, rect, ChoiceKind::List)
    }

    fn new(name: impl Into<String>, rect: Rect, kind: ChoiceKind) -> Self {
        let flags = match kind {
            ChoiceKind::Combo => ChoiceFieldFlags::COMBO,
            ChoiceKind::List => ChoiceFieldFlags::empty(),
        };
        Self {
            name: name.into(),
            rect,
            kind,
            options: Vec::new(),
            value: None,
            flags,
            text: VariableText::default(),
            style: WidgetStyle::default(),
        }
    }

    /// Set the options, written to `/Opt` in order.
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    /// Select a value. Values not among the options fall back to the first
    /// option when the field is built.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Make the field read-only.
    pub fn read_only(mut self) -> Self {
        self.flags |= ChoiceFieldFlags::READ_ONLY;
        self
    }

    /// Make the field required.
    pub fn required(mut self) -> Self {
        self.flags |= ChoiceFieldFlags::REQUIRED;
        self
    }

    /// Set font size, colour and alignment.
    pub fn with_text(mut self, text: VariableText) -> Self {
        self.text = text;
        self
    }

    /// Set border, background and tooltip.
    pub fn with_style(mut self, style: WidgetStyle) -> Self {
        self.style = style;
        self
    }

    /// Presentation kind.
    pub fn kind(&self) -> ChoiceKind {
        self.kind
    }

    /// The value that will be selected: the requested one if it is an
    /// option, else the first option.
    pub fn effective_value(&self) -> Option<&str> {
        self.value
            .as_deref()
            .filter(|v| self.options.iter().any(|o| o == v))
            .or_else(|| self.options.first().map(String::as_str))
    }
}

impl FormFieldWidget for ChoiceFieldWidget {
    fn field_name(&self) -> &str {
        &self.name
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn field_type(&self) -> &'static str {
        "Ch"
    }

    fn field_flags(&self) -> u32 {
        self.flags.bits()
    }

    fn build_field_dict(&self) -> Dict {
        let mut dict = field_base("Ch", &self.name, self.field_flags());
        dict.insert(
            "Opt".to_string(),
            ObjectSerializer::array(self.options.iter().map(|o| ObjectSerializer::text(o)).collect()),
        );
        dict.insert("DA".to_string(), ObjectSerializer::string(&self.text.default_appearance()));
        dict.insert("Q".to_string(), ObjectSerializer::integer(self.text.alignment.q_value()));

        if let Some(value) = self.effective_value() {
            dict.insert("V".to_string(), ObjectSerializer::text(value));
            dict.insert("DV".to_string(), ObjectSerializer::text(value));
            if self.kind == ChoiceKind::List {
                if let Some(index) = self.options.iter().position(|o| o == value) {
                    dict.insert(
                        "I".to_string(),
                        ObjectSerializer::array(vec![ObjectSerializer::integer(index as i64)]),
                    );
                }
            }
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

    fn options() -> Vec<String> {
        vec!["Option 1".into(), "Option 2".into(), "Option 3".into()]
    }

    #[test]
    fn test_combo_sets_combo_flag_and_opt() {
        let field = ChoiceFieldWidget::combo("Dropdown_1", Rect::default()).with_options(options());
        let dict = field.build_field_dict();
        assert_eq!(dict.get("Ff").and_then(Object::as_integer), Some(1 << 17));
        assert_eq!(dict.get("Opt").and_then(Object::as_array).map(Vec::len), Some(3));
    }

    #[test]
    fn test_value_defaults_to_first_option() {
        let field = ChoiceFieldWidget::list("Optionlist_1", Rect::default())
            .with_options(options())
            .with_value("Missing");
        let dict = field.build_field_dict();
        assert_eq!(dict.get("V").and_then(Object::as_text).as_deref(), Some("Option 1"));
        assert!(!dict.contains_key("Ff"));
    }

    #[test]
    fn test_listed_value_is_kept_with_index() {
        let field = ChoiceFieldWidget::list("l", Rect::default())
            .with_options(options())
            .with_value("Option 3");
        let dict = field.build_field_dict();
        assert_eq!(dict.get("V").and_then(Object::as_text).as_deref(), Some("Option 3"));
        assert_eq!(dict.get("I"), Some(&Object::Array(vec![Object::Integer(2)])));
    }

    #[test]
    fn test_no_options_means_no_value() {
        let field = ChoiceFieldWidget::combo("empty", Rect::default());
        assert_eq!(field.effective_value(), None);
        assert!(!field.build_field_dict().contains_key("V"));
    }
}
