//! Checkbox builder (ISO 32000-1 §12.7.4.2.3).

use super::{field_base, ButtonFieldFlags, FormFieldWidget, ToggleAppearances, ToggleShape, WidgetStyle};
use crate::geometry::Rect;
use crate::object::{Dict, Object, ObjectRef};
use crate::writer::object_serializer::ObjectSerializer;

/// ZapfDingbats check mark, drawn by viewers that regenerate appearances.
pub(crate) const CHECK_GLYPH: &str = "4";

/// A checkbox field widget.
#[derive(Debug, Clone)]
pub struct CheckboxWidget {
    name: String,
    rect: Rect,
    checked: bool,
    export_value: String,
    flags: ButtonFieldFlags,
    style: WidgetStyle,
}

impl CheckboxWidget {
    /// Create an unchecked checkbox exporting `Yes`.
    pub fn new(name: impl Into<String>, rect: Rect) -> Self {
        Self {
            name: name.into(),
            rect,
            checked: false,
            export_value: "Yes".to_string(),
            flags: ButtonFieldFlags::empty(),
            style: WidgetStyle::default(),
        }
    }

    /// Set the initial checked state.
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Set the export value (the "on" state name).
    ///
    /// An empty value keeps `Yes`.
    pub fn with_export_value(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.export_value = value;
        }
        self
    }

    /// Make the field read-only.
    pub fn read_only(mut self) -> Self {
        self.flags |= ButtonFieldFlags::READ_ONLY;
        self
    }

    /// Make the field required.
    pub fn required(mut self) -> Self {
        self.flags |= ButtonFieldFlags::REQUIRED;
        self
    }

    /// Set border, background and tooltip.
    pub fn with_style(mut self, style: WidgetStyle) -> Self {
        self.style = style;
        self
    }

    fn state(&self) -> &str {
        if self.checked {
            &self.export_value
        } else {
            "Off"
        }
    }
}

impl FormFieldWidget for CheckboxWidget {
    fn field_name(&self) -> &str {
        &self.name
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn field_type(&self) -> &'static str {
        "Btn"
    }

    fn field_flags(&self) -> u32 {
        self.flags.bits()
    }

    fn build_field_dict(&self) -> Dict {
        let mut dict = field_base("Btn", &self.name, self.field_flags());
        dict.insert("V".to_string(), ObjectSerializer::name(self.state()));
        dict.insert("DV".to_string(), ObjectSerializer::name(self.state()));
        dict.insert("DA".to_string(), ObjectSerializer::string("/ZaDb 0 Tf 0 g"));
        dict
    }

    fn build_widget_dict(&self, page_ref: ObjectRef) -> Dict {
        let (mut dict, mut mk) = self.style.widget_base(&self.rect, page_ref);
        dict.insert("AS".to_string(), ObjectSerializer::name(self.state()));
        mk.insert("CA".to_string(), ObjectSerializer::string(CHECK_GLYPH));
        dict.insert("MK".to_string(), Object::Dictionary(mk));
        dict
    }

    fn toggle_appearances(&self) -> Option<ToggleAppearances> {
        Some(ToggleAppearances::new(
            ToggleShape::Check,
            &self.export_value,
            &self.rect,
            &self.style,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchecked_state_is_off() {
        let cb = CheckboxWidget::new("Checkbox_1", Rect::new(0.0, 0.0, 22.5, 22.5));
        let dict = cb.build_merged(ObjectRef::new(2, 0));
        assert_eq!(dict.get("V").and_then(Object::as_name), Some("Off"));
        assert_eq!(dict.get("AS").and_then(Object::as_name), Some("Off"));
    }

    #[test]
    fn test_checked_state_uses_export_value() {
        let cb = CheckboxWidget::new("agree", Rect::new(0.0, 0.0, 22.5, 22.5))
            .with_export_value("Agreed")
            .with_checked(true)
            .required();
        let dict = cb.build_merged(ObjectRef::new(2, 0));
        assert_eq!(dict.get("V").and_then(Object::as_name), Some("Agreed"));
        assert_eq!(dict.get("AS").and_then(Object::as_name), Some("Agreed"));
        assert_eq!(dict.get("Ff").and_then(Object::as_integer), Some(2));
    }

    #[test]
    fn test_unchecked_box_still_names_its_on_state() {
        let cb = CheckboxWidget::new("agree", Rect::new(0.0, 0.0, 22.5, 22.5)).with_export_value("Agreed");
        let appearances = cb.toggle_appearances().unwrap();
        assert_eq!(appearances.on_state(), "Agreed");
    }

    #[test]
    fn test_empty_export_value_keeps_yes() {
        let cb = CheckboxWidget::new("c", Rect::default()).with_export_value("").with_checked(true);
        assert_eq!(cb.build_field_dict().get("V").and_then(Object::as_name), Some("Yes"));
    }
}
