//! Interactive form field builders.
//!
//! Each builder produces the field dictionary and the widget annotation
//! dictionary for one field kind (ISO 32000-1 §12.7). Single-widget fields
//! are written as one merged object; radio groups keep a parent field with
//! one widget kid per option.
//!
//! # Example
//!
//! ```
//! use pdf_form_designer::geometry::Rect;
//! use pdf_form_designer::writer::form_fields::{FormFieldWidget, TextFieldWidget};
//!
//! let field = TextFieldWidget::new("name", Rect::new(72.0, 700.0, 200.0, 20.0))
//!     .with_value("John Doe")
//!     .required();
//! assert_eq!(field.field_type(), "Tx");
//! ```

mod checkbox;
mod choice_fields;
mod field_flags;
mod form_appearance;
mod push_button;
mod radio_button;
mod text_field;

pub use checkbox::CheckboxWidget;
pub use choice_fields::{ChoiceFieldWidget, ChoiceKind};
pub use field_flags::{
    ButtonFieldFlags, ChoiceFieldFlags, SignatureFlags, TextAlignment, TextFieldFlags, VariableText,
};
pub use form_appearance::{FormAppearanceGenerator, ToggleAppearances, ToggleShape};
pub use push_button::{FormAction, IconPlacement, PushButtonWidget};
pub use radio_button::{RadioButtonGroup, RadioOption};
pub use text_field::TextFieldWidget;

use super::object_serializer::ObjectSerializer;
use crate::geometry::Rect;
use crate::object::{Dict, Object, ObjectRef};

/// Common interface of single-widget field builders.
pub trait FormFieldWidget {
    /// Partial field name (`/T`).
    fn field_name(&self) -> &str;

    /// Widget rectangle in document space.
    fn rect(&self) -> Rect;

    /// Field type name (Tx, Btn, Ch).
    fn field_type(&self) -> &'static str;

    /// Value written to `/Ff`.
    fn field_flags(&self) -> u32;

    /// Entries of the field dictionary.
    fn build_field_dict(&self) -> Dict;

    /// Entries of the widget annotation dictionary.
    fn build_widget_dict(&self, page_ref: ObjectRef) -> Dict;

    /// On/Off appearance streams, for widgets with appearance states.
    fn toggle_appearances(&self) -> Option<ToggleAppearances> {
        None
    }

    /// Field and widget merged into one dictionary.
    fn build_merged(&self, page_ref: ObjectRef) -> Dict {
        let mut dict = self.build_field_dict();
        dict.extend(self.build_widget_dict(page_ref));
        dict
    }
}

/// Border, background and tooltip shared by every widget.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetStyle {
    /// Border colour; `None` hides the border
    pub border_color: Option<[f32; 3]>,
    /// Border width in points
    pub border_width: f32,
    /// Background colour
    pub background_color: Option<[f32; 3]>,
    /// Tooltip (`/TU`)
    pub tooltip: Option<String>,
}

impl Default for WidgetStyle {
    fn default() -> Self {
        Self {
            border_color: Some([0.0, 0.0, 0.0]),
            border_width: 1.0,
            background_color: Some([1.0, 1.0, 1.0]),
            tooltip: None,
        }
    }
}

impl WidgetStyle {
    /// Hide the border: width 0, no `/BC`.
    pub fn without_border(mut self) -> Self {
        self.border_color = None;
        self.border_width = 0.0;
        self
    }

    /// Annotation entries common to every widget.
    ///
    /// Returns the dictionary plus the `/MK` map so callers can add
    /// kind-specific appearance characteristics before inserting it.
    pub(crate) fn widget_base(&self, rect: &Rect, page_ref: ObjectRef) -> (Dict, Dict) {
        let mut dict = ObjectSerializer::dict_map(vec![
            ("Type", ObjectSerializer::name("Annot")),
            ("Subtype", ObjectSerializer::name("Widget")),
            ("Rect", ObjectSerializer::rect(rect)),
            ("P", ObjectSerializer::reference(page_ref)),
            // Print
            ("F", ObjectSerializer::integer(4)),
            (
                "BS",
                ObjectSerializer::dict(vec![
                    ("W", ObjectSerializer::real(self.border_width as f64)),
                    ("S", ObjectSerializer::name("S")),
                ]),
            ),
        ]);

        if let Some(tip) = &self.tooltip {
            dict.insert("TU".to_string(), ObjectSerializer::text(tip));
        }

        let mut mk = Dict::new();
        if let Some(color) = self.border_color {
            mk.insert("BC".to_string(), ObjectSerializer::rgb(color));
        }
        if let Some(color) = self.background_color {
            mk.insert("BG".to_string(), ObjectSerializer::rgb(color));
        }
        (dict, mk)
    }
}

/// Field dictionary entries shared by every kind.
pub(crate) fn field_base(field_type: &str, name: &str, flags: u32) -> Dict {
    let mut dict = ObjectSerializer::dict_map(vec![
        ("FT", ObjectSerializer::name(field_type)),
        ("T", ObjectSerializer::text(name)),
    ]);
    if flags != 0 {
        dict.insert("Ff".to_string(), Object::Integer(flags as i64));
    }
    dict
}
