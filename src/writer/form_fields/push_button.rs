//! Push buttons (ISO 32000-1 §12.7.4.2.2) and their actions.

use super::text_field::javascript_action;
use super::{field_base, ButtonFieldFlags, FormFieldWidget, VariableText, WidgetStyle};
use crate::geometry::Rect;
use crate::object::{Dict, Object, ObjectRef};
use crate::writer::object_serializer::ObjectSerializer;

/// Action run when a push button is activated (widget `/A`).
#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    /// Reset every field to its default value.
    ResetForm,
    /// Run a script.
    JavaScript(String),
    /// Open a URI.
    Uri(String),
}

impl FormAction {
    /// Build the action dictionary.
    pub fn to_object(&self) -> Object {
        match self {
            FormAction::ResetForm => ObjectSerializer::dict(vec![
                ("Type", ObjectSerializer::name("Action")),
                ("S", ObjectSerializer::name("ResetForm")),
            ]),
            FormAction::JavaScript(script) => javascript_action(script),
            FormAction::Uri(uri) => ObjectSerializer::dict(vec![
                ("Type", ObjectSerializer::name("Action")),
                ("S", ObjectSerializer::name("URI")),
                ("URI", ObjectSerializer::string(uri)),
            ]),
        }
    }
}

/// Icon placement for buttons whose face is a user-supplied image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconPlacement;

impl IconPlacement {
    /// `/IF`: always scale, anamorphic, fit to bounds.
    fn icon_fit() -> Object {
        ObjectSerializer::dict(vec![
            ("SW", ObjectSerializer::name("A")),
            ("S", ObjectSerializer::name("A")),
            ("FB", ObjectSerializer::boolean(true)),
        ])
    }
}

/// A push button widget.
#[derive(Debug, Clone)]
pub struct PushButtonWidget {
    name: String,
    rect: Rect,
    caption: String,
    action: Option<FormAction>,
    flags: ButtonFieldFlags,
    text: VariableText,
    style: WidgetStyle,
    icon: Option<IconPlacement>,
}

impl PushButtonWidget {
    /// Create a push button with a light grey face.
    pub fn new(name: impl Into<String>, rect: Rect) -> Self {
        Self {
            name: name.into(),
            rect,
            caption: String::new(),
            action: None,
            flags: ButtonFieldFlags::PUSHBUTTON,
            text: VariableText::default(),
            style: WidgetStyle {
                background_color: Some([0.8, 0.8, 0.8]),
                ..WidgetStyle::default()
            },
            icon: None,
        }
    }

    /// Set the caption (`/MK /CA`).
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    /// Set the activation action.
    pub fn with_action(mut self, action: FormAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Make the button show an imported icon instead of its caption.
    pub fn with_icon(mut self, icon: IconPlacement) -> Self {
        self.icon = Some(icon);
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

    /// Set font size, colour and alignment of the caption.
    pub fn with_text(mut self, text: VariableText) -> Self {
        self.text = text;
        self
    }

    /// Set border, background and tooltip.
    pub fn with_style(mut self, style: WidgetStyle) -> Self {
        self.style = style;
        self
    }

    /// The configured action.
    pub fn action(&self) -> Option<&FormAction> {
        self.action.as_ref()
    }
}

impl FormFieldWidget for PushButtonWidget {
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
        dict.insert("DA".to_string(), ObjectSerializer::string(&self.text.default_appearance()));
        dict.insert("Q".to_string(), ObjectSerializer::integer(self.text.alignment.q_value()));
        dict
    }

    fn build_widget_dict(&self, page_ref: ObjectRef) -> Dict {
        let (mut dict, mut mk) = self.style.widget_base(&self.rect, page_ref);

        if let Some(action) = &self.action {
            dict.insert("A".to_string(), action.to_object());
        }
        if !self.caption.is_empty() {
            mk.insert("CA".to_string(), ObjectSerializer::text(&self.caption));
        }
        if self.icon.is_some() {
            // Icon only, no caption.
            mk.insert("TP".to_string(), ObjectSerializer::integer(1));
            mk.insert("IF".to_string(), IconPlacement::icon_fit());
        }
        dict.insert("MK".to_string(), Object::Dictionary(mk));
        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pushbutton_flag_and_grey_face() {
        let button = PushButtonWidget::new("Button_1", Rect::default()).with_caption("Go");
        assert_eq!(button.field_flags(), 1 << 16);
        let widget = button.build_widget_dict(ObjectRef::new(3, 0));
        let mk = widget.get("MK").and_then(Object::as_dict).unwrap();
        assert_eq!(mk.get("BG"), Some(&ObjectSerializer::rgb([0.8, 0.8, 0.8])));
        assert_eq!(mk.get("CA").and_then(Object::as_text).as_deref(), Some("Go"));
        assert!(!widget.contains_key("A"));
    }

    #[test]
    fn test_reset_action() {
        let widget = PushButtonWidget::new("b", Rect::default())
            .with_action(FormAction::ResetForm)
            .build_widget_dict(ObjectRef::new(3, 0));
        let action = widget.get("A").and_then(Object::as_dict).unwrap();
        assert_eq!(action.get("S").and_then(Object::as_name), Some("ResetForm"));
    }

    #[test]
    fn test_uri_action() {
        let action = FormAction::Uri("https://example.com/a%20b".to_string()).to_object();
        let dict = action.as_dict().unwrap();
        assert_eq!(dict.get("S").and_then(Object::as_name), Some("URI"));
        assert_eq!(
            dict.get("URI").and_then(Object::as_string),
            Some(b"https://example.com/a%20b".as_slice())
        );
    }

    #[test]
    fn test_icon_button_characteristics() {
        let style = WidgetStyle {
            background_color: Some([0.9, 0.9, 0.9]),
            ..WidgetStyle::default()
        };
        let widget = PushButtonWidget::new("Image_1", Rect::default())
            .with_style(style)
            .with_icon(IconPlacement)
            .with_action(FormAction::JavaScript("event.target.buttonImportIcon();".to_string()))
            .build_widget_dict(ObjectRef::new(3, 0));
        let mk = widget.get("MK").and_then(Object::as_dict).unwrap();
        assert_eq!(mk.get("TP").and_then(Object::as_integer), Some(1));
        let fit = mk.get("IF").and_then(Object::as_dict).unwrap();
        assert_eq!(fit.get("SW").and_then(Object::as_name), Some("A"));
        assert_eq!(fit.get("FB"), Some(&Object::Boolean(true)));
        assert_eq!(mk.get("BC"), Some(&ObjectSerializer::rgb([0.0, 0.0, 0.0])));
    }
}
