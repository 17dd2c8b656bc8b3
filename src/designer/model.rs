//! The designer's field model.
//!
//! [`FieldModel`] owns every placed [`FormField`], the selection, the name
//! counter, and the registries of names that already exist in an uploaded
//! document. Mutations never render; callers act on the returned values.

use super::kinds::FieldKind;
use crate::error::{Error, Result};
use crate::geometry::{clamp_span, Rect, Size};
use crate::writer::form_fields::TextAlignment;
use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

lazy_static! {
    /// Names shaped like the auto-generated ones (`Text_12`).
    static ref GENERATED_NAME: Regex = Regex::new(r"([A-Za-z]+)_(\d+)").unwrap();
}

/// Opaque field identifier, displayed as `field_N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub u32);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field_{}", self.0)
    }
}

/// Font size, colour and alignment of variable text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in points
    pub font_size: f32,
    /// Hex colour, `#rrggbb`
    pub text_color: String,
    /// Horizontal alignment
    pub alignment: TextAlignment,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            text_color: "#000000".to_string(),
            alignment: TextAlignment::Left,
        }
    }
}

/// Text field attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextAttributes {
    /// Initial value
    pub default_value: String,
    /// Font and alignment
    pub style: TextStyle,
    /// Allow line breaks
    pub multiline: bool,
    /// Maximum characters, 0 for unlimited
    pub max_length: u32,
    /// Comb cells, 0 to disable
    pub comb_cells: u32,
}

/// Checkbox attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckAttributes {
    /// Initial state
    pub checked: bool,
    /// Value when on
    pub export_value: String,
}

impl Default for CheckAttributes {
    fn default() -> Self {
        Self {
            checked: false,
            export_value: "Yes".to_string(),
        }
    }
}

/// Radio option attributes. The group is the field's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioAttributes {
    /// Initial state
    pub checked: bool,
    /// Value of the group when this option is on
    pub export_value: String,
    /// Free-form group label shown in the property panel
    pub group_name: String,
}

impl Default for RadioAttributes {
    fn default() -> Self {
        Self {
            checked: false,
            export_value: "Yes".to_string(),
            group_name: "RadioGroup1".to_string(),
        }
    }
}

/// Dropdown and option list attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceAttributes {
    /// Options in display order
    pub options: Vec<String>,
    /// Selected option, empty for none
    pub default_value: String,
    /// Font and alignment
    pub style: TextStyle,
}

impl Default for ChoiceAttributes {
    fn default() -> Self {
        Self {
            options: vec!["Option 1".into(), "Option 2".into(), "Option 3".into()],
            default_value: String::new(),
            style: TextStyle::default(),
        }
    }
}

/// What a button does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ButtonAction {
    /// Nothing
    None,
    /// Reset the form
    Reset,
    /// Print the document
    Print,
    /// Open `action_url`
    Url,
    /// Run `js_script`
    Js,
    /// Change the visibility of `target_field_name`
    ShowHide,
}

/// Visibility change applied by a show/hide button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityAction {
    /// Make visible
    Show,
    /// Hide
    Hide,
    /// Flip
    Toggle,
}

/// Push button attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonAttributes {
    /// Caption
    pub label: String,
    /// Action kind
    pub action: ButtonAction,
    /// Target of [`ButtonAction::Url`]
    pub action_url: String,
    /// Script of [`ButtonAction::Js`]
    pub js_script: String,
    /// Target of [`ButtonAction::ShowHide`]
    pub target_field_name: String,
    /// Mode of [`ButtonAction::ShowHide`]
    pub visibility_action: VisibilityAction,
    /// Caption font and alignment
    pub style: TextStyle,
}

/// Date field attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateAttributes {
    /// Acrobat date pattern, e.g. `mm/dd/yyyy`
    pub date_format: String,
    /// Font and alignment
    pub style: TextStyle,
}

/// Image field attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAttributes {
    /// Prompt shown on the empty button
    pub label: String,
}

/// Type-specific attributes, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldAttributes {
    /// Text input
    Text(TextAttributes),
    /// Checkbox
    Checkbox(CheckAttributes),
    /// Radio option
    Radio(RadioAttributes),
    /// Combo box
    Dropdown(ChoiceAttributes),
    /// List box
    Optionlist(ChoiceAttributes),
    /// Push button
    Button(ButtonAttributes),
    /// Signature placeholder
    Signature,
    /// Date input
    Date(DateAttributes),
    /// Image button
    Image(ImageAttributes),
}

impl FieldAttributes {
    /// The kind these attributes belong to.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldAttributes::Text(_) => FieldKind::Text,
            FieldAttributes::Checkbox(_) => FieldKind::Checkbox,
            FieldAttributes::Radio(_) => FieldKind::Radio,
            FieldAttributes::Dropdown(_) => FieldKind::Dropdown,
            FieldAttributes::Optionlist(_) => FieldKind::Optionlist,
            FieldAttributes::Button(_) => FieldKind::Button,
            FieldAttributes::Signature => FieldKind::Signature,
            FieldAttributes::Date(_) => FieldKind::Date,
            FieldAttributes::Image(_) => FieldKind::Image,
        }
    }

    /// Text style, for kinds that carry one.
    pub fn text_style(&self) -> Option<&TextStyle> {
        match self {
            FieldAttributes::Text(t) => Some(&t.style),
            FieldAttributes::Dropdown(c) | FieldAttributes::Optionlist(c) => Some(&c.style),
            FieldAttributes::Button(b) => Some(&b.style),
            FieldAttributes::Date(d) => Some(&d.style),
            _ => None,
        }
    }

    /// Mutable text style, for kinds that carry one.
    pub fn text_style_mut(&mut self) -> Option<&mut TextStyle> {
        match self {
            FieldAttributes::Text(t) => Some(&mut t.style),
            FieldAttributes::Dropdown(c) | FieldAttributes::Optionlist(c) => Some(&mut c.style),
            FieldAttributes::Button(b) => Some(&mut b.style),
            FieldAttributes::Date(d) => Some(&mut d.style),
            _ => None,
        }
    }
}

/// One placed field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    /// Identifier
    pub id: FieldId,
    /// Interactive form field name; shared by the options of a radio group
    pub name: String,
    /// Page the field sits on
    pub page_index: usize,
    /// Position and size in canvas pixels
    pub rect: Rect,
    /// Value must be supplied
    pub required: bool,
    /// Value cannot be changed
    pub read_only: bool,
    /// Help text, empty for none
    pub tooltip: String,
    /// Hex border colour
    pub border_color: String,
    /// Draw no border
    pub hide_border: bool,
    /// Kind-specific attributes
    pub attributes: FieldAttributes,
}

impl FormField {
    /// The field's kind.
    pub fn kind(&self) -> FieldKind {
        self.attributes.kind()
    }

    /// Whether the field is a radio option.
    pub fn is_radio(&self) -> bool {
        self.kind() == FieldKind::Radio
    }
}

/// Parse `#rrggbb` (or `rrggbb`) into RGB components in `[0, 1]`.
///
/// Malformed input yields black.
pub fn hex_to_rgb(hex: &str) -> [f32; 3] {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return [0.0, 0.0, 0.0];
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map(|v| v as f32 / 255.0)
            .unwrap_or(0.0)
    };
    [channel(0), channel(2), channel(4)]
}

/// The authoritative list of fields of one session.
#[derive(Debug, Clone)]
pub struct FieldModel {
    fields: Vec<FormField>,
    selected: Option<FieldId>,
    counter: u32,
    canvas: Size,
    existing_names: HashSet<String>,
    existing_radio_groups: IndexSet<String>,
}

impl FieldModel {
    /// Create an empty model for a canvas of the given size.
    pub fn new(canvas: Size) -> Self {
        Self {
            fields: Vec::new(),
            selected: None,
            counter: 0,
            canvas,
            existing_names: HashSet::new(),
            existing_radio_groups: IndexSet::new(),
        }
    }

    /// Place a new field of `kind` with its top-left corner at `(x, y)`,
    /// clamped so the default-sized box stays on the canvas.
    pub fn create(&mut self, kind: FieldKind, x: f32, y: f32, page_index: usize) -> FieldId {
        self.counter += 1;
        let id = FieldId(self.counter);
        let size = kind.default_size();
        let rect = Rect::new(
            clamp_span(x, size.width, self.canvas.width),
            clamp_span(y, size.height, self.canvas.height),
            size.width,
            size.height,
        );

        self.fields.push(FormField {
            id,
            name: kind.generated_name(self.counter),
            page_index,
            rect,
            required: false,
            read_only: false,
            tooltip: String::new(),
            border_color: "#000000".to_string(),
            hide_border: false,
            attributes: kind.default_attributes(),
        });
        log::debug!("created {} {} at ({}, {}) on page {}", kind, id, rect.x, rect.y, page_index);
        id
    }

    /// Remove a field. Clears the selection if it pointed at the field.
    pub fn delete(&mut self, id: FieldId) -> Result<FormField> {
        let index = self
            .fields
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| Error::FieldNotFound(id.to_string()))?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Ok(self.fields.remove(index))
    }

    /// Check a candidate name for the field `id`.
    ///
    /// Returns the trimmed name when acceptable. Radio options share names
    /// on purpose, so only emptiness is checked for them.
    pub fn validate_name(&self, candidate: &str, id: FieldId) -> Result<String> {
        let name = candidate.trim();
        if name.is_empty() {
            return Err(Error::InvalidName("Field name cannot be empty".to_string()));
        }

        let field = self.get(id)?;
        if field.is_radio() {
            return Ok(name.to_string());
        }

        let in_pdf = self.existing_names.contains(name);
        let in_form = self.fields.iter().any(|f| f.id != id && f.name == name);
        if in_pdf || in_form {
            return Err(Error::InvalidName(format!(
                "Field name \"{}\" already exists in this {}. Please try using a unique name.",
                name,
                if in_pdf { "PDF" } else { "form" }
            )));
        }
        Ok(name.to_string())
    }

    /// Select a field, replacing any previous selection.
    pub fn select(&mut self, id: FieldId) -> Result<()> {
        self.get(id)?;
        self.selected = Some(id);
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// The selected field's id.
    pub fn selected_id(&self) -> Option<FieldId> {
        self.selected
    }

    /// The selected field.
    pub fn selected(&self) -> Option<&FormField> {
        self.selected.and_then(|id| self.get(id).ok())
    }

    /// Look up a field.
    pub fn get(&self, id: FieldId) -> Result<&FormField> {
        self.fields
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| Error::FieldNotFound(id.to_string()))
    }

    /// Look up a field for mutation.
    pub fn get_mut(&mut self, id: FieldId) -> Result<&mut FormField> {
        self.fields
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| Error::FieldNotFound(id.to_string()))
    }

    /// All fields in creation order.
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Fields placed on one page.
    pub fn fields_on_page(&self, page_index: usize) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(move |f| f.page_index == page_index)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Drop every field and the selection. The counter keeps its value.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.selected = None;
    }

    /// Forget the names of a discarded uploaded document. The counter keeps
    /// its value.
    pub fn clear_registries(&mut self) {
        self.existing_names.clear();
        self.existing_radio_groups.clear();
    }

    /// Last counter value handed out.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Canvas size fields are clamped to.
    pub fn canvas(&self) -> Size {
        self.canvas
    }

    /// Record the field names of an uploaded document.
    ///
    /// The counter is raised to the highest numeric suffix among names
    /// shaped like `Word_N`, so generated names never collide with them.
    pub fn seed_from_existing<I, J>(&mut self, names: I, radio_groups: J)
    where
        I: IntoIterator<Item = String>,
        J: IntoIterator<Item = String>,
    {
        self.existing_names.clear();
        self.existing_radio_groups.clear();

        for name in names {
            if let Some(n) = GENERATED_NAME
                .captures(&name)
                .and_then(|c| c.get(2))
                .and_then(|m| m.as_str().parse::<u32>().ok())
            {
                if n > self.counter {
                    self.counter = n;
                    log::debug!("field counter raised to {} by '{}'", n, name);
                }
            }
            self.existing_names.insert(name);
        }
        self.existing_radio_groups.extend(radio_groups);
    }

    /// Whether an uploaded document already has a field with this name.
    pub fn is_existing_name(&self, name: &str) -> bool {
        self.existing_names.contains(name)
    }

    /// Whether an uploaded document already has a radio group with this name.
    pub fn is_existing_radio_group(&self, name: &str) -> bool {
        self.existing_radio_groups.contains(name)
    }

    /// Groups a radio option can join: existing document groups first, then
    /// names of the session's other radio options.
    pub fn radio_group_names(&self, exclude: FieldId) -> Vec<String> {
        let mut names: IndexSet<String> = self.existing_radio_groups.clone();
        names.extend(
            self.fields
                .iter()
                .filter(|f| f.is_radio() && f.id != exclude)
                .map(|f| f.name.clone()),
        );
        names.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> FieldModel {
        FieldModel::new(Size::new(816.0, 1056.0))
    }

    #[test]
    fn test_create_applies_defaults() {
        let mut m = model();
        let id = m.create(FieldKind::Checkbox, 100.0, 100.0, 0);
        let field = m.get(id).unwrap();
        assert_eq!(id.to_string(), "field_1");
        assert_eq!(field.name, "Checkbox_1");
        assert_eq!(field.rect, Rect::new(100.0, 100.0, 30.0, 30.0));
        assert_eq!(field.border_color, "#000000");
        match &field.attributes {
            FieldAttributes::Checkbox(c) => assert_eq!(c.export_value, "Yes"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_create_clamps_to_canvas() {
        let mut m = model();
        let id = m.create(FieldKind::Text, 900.0, -20.0, 0);
        let rect = m.get(id).unwrap().rect;
        assert_eq!(rect.x, 816.0 - 150.0);
        assert_eq!(rect.y, 0.0);
    }

    #[test]
    fn test_counter_is_shared_across_kinds() {
        let mut m = model();
        m.create(FieldKind::Text, 0.0, 0.0, 0);
        let id = m.create(FieldKind::Dropdown, 0.0, 0.0, 0);
        assert_eq!(m.get(id).unwrap().name, "Dropdown_2");
    }

    #[test]
    fn test_delete_clears_selection() {
        let mut m = model();
        let id = m.create(FieldKind::Text, 0.0, 0.0, 0);
        m.select(id).unwrap();
        m.delete(id).unwrap();
        assert!(m.selected().is_none());
        assert!(matches!(m.delete(id), Err(Error::FieldNotFound(_))));
    }

    #[test]
    fn test_validate_name_rules() {
        let mut m = model();
        let a = m.create(FieldKind::Text, 0.0, 0.0, 0);
        let b = m.create(FieldKind::Text, 0.0, 0.0, 0);
        let r = m.create(FieldKind::Radio, 0.0, 0.0, 0);

        assert_eq!(m.validate_name("  Email ", a).unwrap(), "Email");
        assert!(m.validate_name("   ", a).is_err());
        assert!(m.validate_name("Text_2", a).is_err());
        assert_eq!(m.validate_name("Text_1", a).unwrap(), "Text_1");
        assert_eq!(m.validate_name("Text_2", r).unwrap(), "Text_2");
        assert!(m.validate_name("", r).is_err());

        m.seed_from_existing(vec!["Existing".to_string()], Vec::new());
        let err = m.validate_name("Existing", b).unwrap_err();
        assert!(err.to_string().contains("already exists in this PDF"));
    }

    #[test]
    fn test_seed_raises_counter() {
        let mut m = model();
        m.seed_from_existing(
            vec!["Text_7".to_string(), "Signature".to_string(), "Choice_3".to_string()],
            vec!["Choice_3".to_string()],
        );
        assert_eq!(m.counter(), 7);
        let id = m.create(FieldKind::Text, 0.0, 0.0, 0);
        assert_eq!(m.get(id).unwrap().name, "Text_8");
        assert!(m.is_existing_radio_group("Choice_3"));
    }

    #[test]
    fn test_clear_registries_keeps_counter() {
        let mut m = model();
        m.seed_from_existing(vec!["Text_7".to_string()], vec!["Choice".to_string()]);
        m.clear();
        m.clear_registries();
        assert!(!m.is_existing_name("Text_7"));
        assert!(!m.is_existing_radio_group("Choice"));
        let id = m.create(FieldKind::Text, 0.0, 0.0, 0);
        assert_eq!(m.validate_name("Text_7", id).unwrap(), "Text_7");
        assert_eq!(m.get(id).unwrap().name, "Text_8");
    }

    #[test]
    fn test_radio_group_names_lists_existing_first() {
        let mut m = model();
        m.seed_from_existing(vec!["Old".to_string()], vec!["Old".to_string()]);
        let a = m.create(FieldKind::Radio, 0.0, 0.0, 0);
        let b = m.create(FieldKind::Radio, 0.0, 0.0, 0);
        m.get_mut(b).unwrap().name = "Old".to_string();
        assert_eq!(m.radio_group_names(b), vec!["Old".to_string(), "Radio_1".to_string()]);
        assert_eq!(m.radio_group_names(a), vec!["Old".to_string()]);
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#ff0000"), [1.0, 0.0, 0.0]);
        assert_eq!(hex_to_rgb("000000"), [0.0, 0.0, 0.0]);
        assert_eq!(hex_to_rgb("#zz"), [0.0, 0.0, 0.0]);
    }
}
