//! Radio button groups (ISO 32000-1 §12.7.4.2.4).
//!
//! A group is one parent field carrying the name, flags and value, with one
//! widget kid per option. Options may sit on different pages.

use super::{field_base, ButtonFieldFlags, ToggleAppearances, ToggleShape, WidgetStyle};
use crate::geometry::Rect;
use crate::object::{Dict, Object, ObjectRef};
use crate::writer::object_serializer::ObjectSerializer;

/// ZapfDingbats filled circle.
const DOT_GLYPH: &str = "l";

/// A radio button group.
#[derive(Debug, Clone)]
pub struct RadioButtonGroup {
    name: String,
    flags: ButtonFieldFlags,
    selected: Option<String>,
    options: Vec<RadioOption>,
}

/// One option (widget) of a radio group.
#[derive(Debug, Clone)]
pub struct RadioOption {
    /// Value the group takes when this option is on
    pub export_value: String,
    /// Widget rectangle in document space
    pub rect: Rect,
    /// Index of the page holding the widget
    pub page: usize,
    /// Border, background and tooltip
    pub style: WidgetStyle,
}

impl RadioOption {
    /// Create an option; an empty export value becomes `Yes`.
    pub fn new(export_value: impl Into<String>, rect: Rect, page: usize) -> Self {
        let export_value = export_value.into();
        Self {
            export_value: if export_value.is_empty() {
                "Yes".to_string()
            } else {
                export_value
            },
            rect,
            page,
            style: WidgetStyle::default(),
        }
    }

    /// Set border, background and tooltip.
    pub fn with_style(mut self, style: WidgetStyle) -> Self {
        self.style = style;
        self
    }

    /// On/Off appearances keyed by this option's export value.
    pub fn appearances(&self) -> ToggleAppearances {
        ToggleAppearances::new(ToggleShape::Dot, &self.export_value, &self.rect, &self.style)
    }

    /// Build the widget annotation for this option.
    pub fn build_widget_dict(&self, page_ref: ObjectRef, parent: ObjectRef, selected: bool) -> Dict {
        let (mut dict, mut mk) = self.style.widget_base(&self.rect, page_ref);
        dict.insert("Parent".to_string(), ObjectSerializer::reference(parent));
        let state = if selected { self.export_value.as_str() } else { "Off" };
        dict.insert("AS".to_string(), ObjectSerializer::name(state));
        mk.insert("CA".to_string(), ObjectSerializer::string(DOT_GLYPH));
        dict.insert("MK".to_string(), Object::Dictionary(mk));
        dict
    }
}

impl RadioButtonGroup {
    /// Create an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: ButtonFieldFlags::RADIO | ButtonFieldFlags::NO_TOGGLE_TO_OFF,
            selected: None,
            options: Vec::new(),
        }
    }

    /// Append an option.
    pub fn add_option(&mut self, option: RadioOption) {
        self.options.push(option);
    }

    /// Select the option with this export value. Later calls win.
    pub fn select(&mut self, export_value: impl Into<String>) {
        self.selected = Some(export_value.into());
    }

    /// Make the group read-only.
    pub fn set_read_only(&mut self) {
        self.flags |= ButtonFieldFlags::READ_ONLY;
    }

    /// Make the group required.
    pub fn set_required(&mut self) {
        self.flags |= ButtonFieldFlags::REQUIRED;
    }

    /// Group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Options in insertion order.
    pub fn options(&self) -> &[RadioOption] {
        &self.options
    }

    /// Selected export value.
    pub fn selected_value(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Field flags.
    pub fn flags(&self) -> ButtonFieldFlags {
        self.flags
    }

    /// Whether `option` is the selected one.
    pub fn is_selected(&self, option: &RadioOption) -> bool {
        self.selected.as_deref() == Some(option.export_value.as_str())
    }

    /// Build the parent field dictionary with the given kids.
    pub fn build_parent_dict(&self, kids: &[ObjectRef]) -> Dict {
        let mut dict = field_base("Btn", &self.name, self.flags.bits());
        let value = self.selected.as_deref().unwrap_or("Off");
        dict.insert("V".to_string(), ObjectSerializer::name(value));
        dict.insert("DV".to_string(), ObjectSerializer::name(value));
        dict.insert("DA".to_string(), ObjectSerializer::string("/ZaDb 0 Tf 0 g"));
        dict.insert(
            "Kids".to_string(),
            ObjectSerializer::array(kids.iter().copied().map(ObjectSerializer::reference).collect()),
        );
        dict
    }
}
