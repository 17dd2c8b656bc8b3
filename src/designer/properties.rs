//! Property panel model and attribute edits.
//!
//! [`panel`] describes the controls for the selected field; [`apply`]
//! commits one edit to the model immediately and tells the caller how much
//! of the field's visual needs refreshing.

use super::kinds::FieldKind;
use super::model::{ButtonAction, FieldAttributes, FieldId, FieldModel, FormField, VisibilityAction};
use crate::error::{Error, Result};
use crate::writer::form_fields::TextAlignment;
use serde::Serialize;

/// Date patterns offered for date fields.
pub const DATE_FORMATS: [&str; 8] = [
    "mm/dd/yyyy",
    "dd/mm/yyyy",
    "mm/yy",
    "dd/mm/yy",
    "yyyy/mm/dd",
    "mmm d, yyyy",
    "d-mmm-yy",
    "yy-mm-dd",
];

/// One attribute change.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyEdit {
    /// Rename; validated
    Name(String),
    /// Move a radio option into a named group, bypassing validation
    JoinGroup(String),
    /// Help text
    Tooltip(String),
    /// Required flag
    Required(bool),
    /// Read-only flag
    ReadOnly(bool),
    /// Hex border colour
    BorderColor(String),
    /// Hide the border
    HideBorder(bool),
    /// Text value
    Value(String),
    /// Maximum length, 0 for unlimited
    MaxLength(u32),
    /// Comb cells, 0 to disable
    CombCells(u32),
    /// Font size
    FontSize(f32),
    /// Hex text colour
    TextColor(String),
    /// Alignment
    Alignment(TextAlignment),
    /// Allow line breaks
    Multiline(bool),
    /// Checked state of a checkbox or radio option
    Checked(bool),
    /// Export value of a checkbox or radio option
    ExportValue(String),
    /// Free-form group label of a radio option
    GroupName(String),
    /// Options as typed: separated by newlines or commas
    Options(String),
    /// Selected option, empty for none
    SelectedOption(String),
    /// Button caption or image prompt
    Label(String),
    /// Button action
    Action(ButtonAction),
    /// URL of a URL button
    ActionUrl(String),
    /// Script of a script button
    Script(String),
    /// Target of a show/hide button
    TargetField(String),
    /// Mode of a show/hide button
    Visibility(VisibilityAction),
    /// Date pattern
    DateFormat(String),
}

impl PropertyEdit {
    fn label(&self) -> &'static str {
        match self {
            PropertyEdit::Name(_) => "name",
            PropertyEdit::JoinGroup(_) => "group",
            PropertyEdit::Tooltip(_) => "tooltip",
            PropertyEdit::Required(_) => "required",
            PropertyEdit::ReadOnly(_) => "read-only",
            PropertyEdit::BorderColor(_) => "border color",
            PropertyEdit::HideBorder(_) => "hide border",
            PropertyEdit::Value(_) => "value",
            PropertyEdit::MaxLength(_) => "max length",
            PropertyEdit::CombCells(_) => "comb cells",
            PropertyEdit::FontSize(_) => "font size",
            PropertyEdit::TextColor(_) => "text color",
            PropertyEdit::Alignment(_) => "alignment",
            PropertyEdit::Multiline(_) => "multi-line",
            PropertyEdit::Checked(_) => "checked",
            PropertyEdit::ExportValue(_) => "export value",
            PropertyEdit::GroupName(_) => "group name",
            PropertyEdit::Options(_) => "options",
            PropertyEdit::SelectedOption(_) => "selected option",
            PropertyEdit::Label(_) => "label",
            PropertyEdit::Action(_) => "action",
            PropertyEdit::ActionUrl(_) => "URL",
            PropertyEdit::Script(_) => "script",
            PropertyEdit::TargetField(_) => "target field",
            PropertyEdit::Visibility(_) => "visibility",
            PropertyEdit::DateFormat(_) => "date format",
        }
    }
}

/// How much of the field's visual an edit invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Refresh {
    /// Model-only change
    None,
    /// Update the existing visual in place
    Visual,
    /// Rebuild the field's visual
    Full,
}

/// Split typed options on newlines and commas, dropping blanks.
pub fn parse_options(text: &str) -> Vec<String> {
    text.split(['\n', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn truncate_chars(value: &mut String, max: u32) {
    if let Some((cut, _)) = value.char_indices().nth(max as usize) {
        value.truncate(cut);
    }
}

fn unsupported(edit: &PropertyEdit, kind: FieldKind) -> Error {
    Error::Unsupported(format!("{} cannot be edited on {} fields", edit.label(), kind))
}

/// Commit one edit to field `id`.
///
/// Invalid names are rejected with [`Error::InvalidName`] and leave the
/// field unchanged. Edits that do not apply to the field's kind fail with
/// [`Error::Unsupported`].
pub fn apply(model: &mut FieldModel, id: FieldId, edit: PropertyEdit) -> Result<Refresh> {
    if let PropertyEdit::Name(candidate) = &edit {
        let name = model.validate_name(candidate, id)?;
        model.get_mut(id)?.name = name;
        return Ok(Refresh::Visual);
    }

    let field = model.get_mut(id)?;
    let kind = field.kind();

    let refresh = match (edit, &mut field.attributes) {
        (PropertyEdit::JoinGroup(group), FieldAttributes::Radio(_)) => {
            field.name = group;
            Refresh::Visual
        },
        (PropertyEdit::Tooltip(tip), _) => {
            field.tooltip = tip;
            Refresh::None
        },
        (PropertyEdit::Required(on), _) => {
            field.required = on;
            Refresh::None
        },
        (PropertyEdit::ReadOnly(on), _) => {
            field.read_only = on;
            Refresh::None
        },
        (PropertyEdit::BorderColor(color), _) => {
            field.border_color = color;
            Refresh::Visual
        },
        (PropertyEdit::HideBorder(on), _) => {
            field.hide_border = on;
            Refresh::Visual
        },

        (PropertyEdit::Value(mut value), FieldAttributes::Text(text)) => {
            let limit = if text.comb_cells > 0 { text.comb_cells } else { text.max_length };
            if limit > 0 {
                truncate_chars(&mut value, limit);
            }
            text.default_value = value;
            Refresh::Visual
        },
        (PropertyEdit::MaxLength(max), FieldAttributes::Text(text)) if text.comb_cells > 0 => {
            // Locked to the cell count while combing.
            log::debug!("ignoring max length {} on comb field {}", max, id);
            Refresh::None
        },
        (PropertyEdit::MaxLength(max), FieldAttributes::Text(text)) => {
            text.max_length = max;
            if max > 0 {
                truncate_chars(&mut text.default_value, max);
            }
            Refresh::Visual
        },
        (PropertyEdit::CombCells(cells), FieldAttributes::Text(text)) => {
            text.comb_cells = cells;
            if cells > 0 {
                text.max_length = cells;
                truncate_chars(&mut text.default_value, cells);
            }
            Refresh::Visual
        },
        (PropertyEdit::Multiline(on), FieldAttributes::Text(text)) => {
            text.multiline = on;
            Refresh::Visual
        },

        (PropertyEdit::FontSize(size), attrs) if attrs.text_style().is_some() => {
            if let Some(style) = attrs.text_style_mut() {
                style.font_size = size;
            }
            Refresh::Visual
        },
        (PropertyEdit::TextColor(color), attrs) if attrs.text_style().is_some() => {
            if let Some(style) = attrs.text_style_mut() {
                style.text_color = color;
            }
            Refresh::Visual
        },
        (PropertyEdit::Alignment(alignment), attrs) if attrs.text_style().is_some() => {
            if let Some(style) = attrs.text_style_mut() {
                style.alignment = alignment;
            }
            Refresh::Visual
        },

        (PropertyEdit::Checked(on), FieldAttributes::Checkbox(check)) => {
            check.checked = on;
            Refresh::Visual
        },
        (PropertyEdit::Checked(on), FieldAttributes::Radio(radio)) => {
            radio.checked = on;
            Refresh::Visual
        },
        (PropertyEdit::ExportValue(value), FieldAttributes::Checkbox(check)) => {
            check.export_value = value;
            Refresh::None
        },
        (PropertyEdit::ExportValue(value), FieldAttributes::Radio(radio)) => {
            radio.export_value = value;
            Refresh::None
        },
        (PropertyEdit::GroupName(group), FieldAttributes::Radio(radio)) => {
            radio.group_name = group;
            Refresh::None
        },

        (PropertyEdit::Options(text), FieldAttributes::Dropdown(choice) | FieldAttributes::Optionlist(choice)) => {
            choice.options = parse_options(&text);
            if !choice.default_value.is_empty() && !choice.options.contains(&choice.default_value) {
                choice.default_value.clear();
            }
            Refresh::Full
        },
        (
            PropertyEdit::SelectedOption(value),
            FieldAttributes::Dropdown(choice) | FieldAttributes::Optionlist(choice),
        ) => {
            choice.default_value = value;
            Refresh::Full
        },

        (PropertyEdit::Label(label), FieldAttributes::Button(button)) => {
            button.label = label;
            Refresh::Full
        },
        (PropertyEdit::Label(label), FieldAttributes::Image(image)) => {
            image.label = label;
            Refresh::Full
        },
        (PropertyEdit::Action(action), FieldAttributes::Button(button)) => {
            button.action = action;
            Refresh::None
        },
        (PropertyEdit::ActionUrl(url), FieldAttributes::Button(button)) => {
            button.action_url = url;
            Refresh::None
        },
        (PropertyEdit::Script(script), FieldAttributes::Button(button)) => {
            button.js_script = script;
            Refresh::None
        },
        (PropertyEdit::TargetField(target), FieldAttributes::Button(button)) => {
            button.target_field_name = target;
            Refresh::None
        },
        (PropertyEdit::Visibility(mode), FieldAttributes::Button(button)) => {
            button.visibility_action = mode;
            Refresh::None
        },

        (PropertyEdit::DateFormat(format), FieldAttributes::Date(date)) => {
            date.date_format = format;
            Refresh::Full
        },

        (edit, _) => return Err(unsupported(&edit, kind)),
    };
    Ok(refresh)
}

/// One choice of a select control.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    /// Submitted value
    pub value: String,
    /// Displayed text
    pub label: String,
}

impl Choice {
    fn same(value: &str) -> Self {
        Self {
            value: value.to_string(),
            label: value.to_string(),
        }
    }
}

/// Input widget of a control.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "input", rename_all = "lowercase")]
pub enum Input {
    /// Single-line text
    Text {
        /// Current value
        value: String,
        /// Character limit
        max_length: Option<u32>,
    },
    /// Multi-line text
    TextArea {
        /// Current value
        value: String,
    },
    /// Number
    Number {
        /// Current value
        value: f32,
        /// Lower bound
        min: f32,
        /// Upper bound
        max: Option<f32>,
    },
    /// Colour picker
    Color {
        /// Hex colour
        value: String,
    },
    /// On/off switch
    Toggle {
        /// Current state
        on: bool,
    },
    /// Dropdown
    Select {
        /// Selected value
        value: String,
        /// Choices in order
        choices: Vec<Choice>,
    },
}

/// One labelled control of the panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Control {
    /// Stable control identifier
    pub id: &'static str,
    /// Label text
    pub label: &'static str,
    /// Widget and value
    pub input: Input,
    /// Whether the control is shown
    pub visible: bool,
    /// Whether the control accepts input
    pub enabled: bool,
}

impl Control {
    fn new(id: &'static str, label: &'static str, input: Input) -> Self {
        Self {
            id,
            label,
            input,
            visible: true,
            enabled: true,
        }
    }

    fn shown_if(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    fn enabled_if(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Description of the property panel for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyPanel {
    /// Field being edited
    pub field_id: String,
    /// Its kind
    pub kind: FieldKind,
    /// Label of the name control
    pub name_label: &'static str,
    /// Current name
    pub name: String,
    /// Groups a radio option can join; empty hides the selector
    pub join_groups: Vec<String>,
    /// Kind-specific controls, then the shared ones
    pub controls: Vec<Control>,
    /// Explanatory note for the kind
    pub note: Option<&'static str>,
}

fn text_input(value: &str) -> Input {
    Input::Text {
        value: value.to_string(),
        max_length: None,
    }
}

fn alignment_select(alignment: TextAlignment) -> Input {
    Input::Select {
        value: alignment.css().to_string(),
        choices: vec![
            Choice {
                value: "left".into(),
                label: "Left".into(),
            },
            Choice {
                value: "center".into(),
                label: "Center".into(),
            },
            Choice {
                value: "right".into(),
                label: "Right".into(),
            },
        ],
    }
}

fn action_value(action: ButtonAction) -> &'static str {
    match action {
        ButtonAction::None => "none",
        ButtonAction::Reset => "reset",
        ButtonAction::Print => "print",
        ButtonAction::Url => "url",
        ButtonAction::Js => "js",
        ButtonAction::ShowHide => "showHide",
    }
}

fn visibility_value(mode: VisibilityAction) -> &'static str {
    match mode {
        VisibilityAction::Show => "show",
        VisibilityAction::Hide => "hide",
        VisibilityAction::Toggle => "toggle",
    }
}

fn specific_controls(field: &FormField, model: &FieldModel) -> (Vec<Control>, Option<&'static str>) {
    match &field.attributes {
        FieldAttributes::Text(text) => {
            let limit = if text.comb_cells > 0 {
                Some(text.comb_cells)
            } else {
                (text.max_length > 0).then_some(text.max_length)
            };
            let controls = vec![
                Control::new(
                    "value",
                    "Value",
                    Input::Text {
                        value: text.default_value.clone(),
                        max_length: limit,
                    },
                ),
                Control::new(
                    "maxLength",
                    "Max Length (0 for unlimited)",
                    Input::Number {
                        value: text.max_length as f32,
                        min: 0.0,
                        max: None,
                    },
                )
                .enabled_if(text.comb_cells == 0),
                Control::new(
                    "comb",
                    "Divide into boxes (0 to disable)",
                    Input::Number {
                        value: text.comb_cells as f32,
                        min: 0.0,
                        max: None,
                    },
                ),
                Control::new(
                    "fontSize",
                    "Font Size",
                    Input::Number {
                        value: text.style.font_size,
                        min: 8.0,
                        max: Some(72.0),
                    },
                ),
                Control::new(
                    "textColor",
                    "Text Color",
                    Input::Color {
                        value: text.style.text_color.clone(),
                    },
                ),
                Control::new("alignment", "Alignment", alignment_select(text.style.alignment)),
                Control::new("multiline", "Multi-line", Input::Toggle { on: text.multiline }),
            ];
            (controls, None)
        },
        FieldAttributes::Checkbox(check) => (
            vec![Control::new("checked", "Checked State", Input::Toggle { on: check.checked })],
            None,
        ),
        FieldAttributes::Radio(radio) => (
            vec![
                Control::new("groupName", "Group Name (Must be same for group)", text_input(&radio.group_name)),
                Control::new("exportValue", "Export Value", text_input(&radio.export_value)),
                Control::new("checked", "Checked State", Input::Toggle { on: radio.checked }),
            ],
            None,
        ),
        FieldAttributes::Dropdown(choice) | FieldAttributes::Optionlist(choice) => {
            let mut choices = vec![Choice {
                value: String::new(),
                label: "None".to_string(),
            }];
            choices.extend(choice.options.iter().map(|o| Choice::same(o)));
            (
                vec![
                    Control::new(
                        "options",
                        "Options (One per line or comma separated)",
                        Input::TextArea {
                            value: choice.options.join("\n"),
                        },
                    ),
                    Control::new(
                        "selectedOption",
                        "Selected Option",
                        Input::Select {
                            value: choice.default_value.clone(),
                            choices,
                        },
                    ),
                ],
                Some("To actually fill or change the options, use a form filler."),
            )
        },
        FieldAttributes::Button(button) => {
            let actions = [
                (ButtonAction::None, "None"),
                (ButtonAction::Reset, "Reset Form"),
                (ButtonAction::Print, "Print Form"),
                (ButtonAction::Url, "Open URL"),
                (ButtonAction::Js, "Run Javascript"),
                (ButtonAction::ShowHide, "Show/Hide Field"),
            ];
            let mut targets = vec![Choice {
                value: String::new(),
                label: "Select a field...".to_string(),
            }];
            targets.extend(model.fields().iter().filter(|f| f.id != field.id).map(|f| Choice {
                value: f.name.clone(),
                label: format!("{} ({})", f.name, f.kind()),
            }));
            (
                vec![
                    Control::new("label", "Label", text_input(&button.label)),
                    Control::new(
                        "action",
                        "Action",
                        Input::Select {
                            value: action_value(button.action).to_string(),
                            choices: actions
                                .iter()
                                .map(|(a, label)| Choice {
                                    value: action_value(*a).to_string(),
                                    label: label.to_string(),
                                })
                                .collect(),
                        },
                    ),
                    Control::new("actionUrl", "URL", text_input(&button.action_url))
                        .shown_if(button.action == ButtonAction::Url),
                    Control::new(
                        "jsScript",
                        "Javascript Code",
                        Input::TextArea {
                            value: button.js_script.clone(),
                        },
                    )
                    .shown_if(button.action == ButtonAction::Js),
                    Control::new(
                        "targetField",
                        "Target Field",
                        Input::Select {
                            value: button.target_field_name.clone(),
                            choices: targets,
                        },
                    )
                    .shown_if(button.action == ButtonAction::ShowHide),
                    Control::new(
                        "visibility",
                        "Visibility",
                        Input::Select {
                            value: visibility_value(button.visibility_action).to_string(),
                            choices: vec![
                                Choice {
                                    value: "show".into(),
                                    label: "Show".into(),
                                },
                                Choice {
                                    value: "hide".into(),
                                    label: "Hide".into(),
                                },
                                Choice {
                                    value: "toggle".into(),
                                    label: "Toggle".into(),
                                },
                            ],
                        },
                    )
                    .shown_if(button.action == ButtonAction::ShowHide),
                ],
                None,
            )
        },
        FieldAttributes::Signature => (
            Vec::new(),
            Some("Signature fields are AcroForm signature fields and are only visible in an advanced PDF viewer."),
        ),
        FieldAttributes::Date(date) => (
            vec![Control::new(
                "dateFormat",
                "Date Format",
                Input::Select {
                    value: date.date_format.clone(),
                    choices: DATE_FORMATS.iter().map(|f| Choice::same(f)).collect(),
                },
            )],
            Some("The selected format will be enforced when the user types or picks a date."),
        ),
        FieldAttributes::Image(image) => (
            vec![Control::new("label", "Label / Prompt", text_input(&image.label))],
            Some("Clicking this field in the PDF opens a file picker to upload an image."),
        ),
    }
}

/// Describe the panel for field `id`.
pub fn panel(model: &FieldModel, id: FieldId) -> Result<PropertyPanel> {
    let field = model.get(id)?;
    let (mut controls, note) = specific_controls(field, model);

    controls.push(Control::new("tooltip", "Tooltip / Help Text", text_input(&field.tooltip)));
    controls.push(Control::new("required", "Required", Input::Toggle { on: field.required }));
    controls.push(Control::new("readOnly", "Read Only", Input::Toggle { on: field.read_only }));
    controls.push(Control::new(
        "borderColor",
        "Border Color",
        Input::Color {
            value: field.border_color.clone(),
        },
    ));
    controls.push(Control::new("hideBorder", "Hide Border", Input::Toggle { on: field.hide_border }));

    Ok(PropertyPanel {
        field_id: field.id.to_string(),
        kind: field.kind(),
        name_label: if field.is_radio() {
            "Field Name (Group Name)"
        } else {
            "Field Name"
        },
        name: field.name.clone(),
        join_groups: if field.is_radio() {
            model.radio_group_names(id)
        } else {
            Vec::new()
        },
        controls,
        note,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    fn model() -> FieldModel {
        FieldModel::new(Size::new(816.0, 1056.0))
    }

    fn text(model: &FieldModel, id: FieldId) -> super::super::model::TextAttributes {
        match &model.get(id).unwrap().attributes {
            FieldAttributes::Text(t) => t.clone(),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rename_validates() {
        let mut m = model();
        let a = m.create(FieldKind::Text, 0.0, 0.0, 0);
        let b = m.create(FieldKind::Text, 0.0, 0.0, 0);
        assert_eq!(apply(&mut m, a, PropertyEdit::Name(" Email ".into())).unwrap(), Refresh::Visual);
        assert_eq!(m.get(a).unwrap().name, "Email");

        let err = apply(&mut m, b, PropertyEdit::Name("Email".into())).unwrap_err();
        assert!(matches!(err, Error::InvalidName(_)));
        assert_eq!(m.get(b).unwrap().name, "Text_2");
    }

    #[test]
    fn test_join_group_bypasses_validation() {
        let mut m = model();
        m.create(FieldKind::Text, 0.0, 0.0, 0);
        let r = m.create(FieldKind::Radio, 0.0, 0.0, 0);
        apply(&mut m, r, PropertyEdit::JoinGroup("Text_1".into())).unwrap();
        assert_eq!(m.get(r).unwrap().name, "Text_1");
    }

    #[test]
    fn test_max_length_truncates_value() {
        let mut m = model();
        let id = m.create(FieldKind::Text, 0.0, 0.0, 0);
        apply(&mut m, id, PropertyEdit::Value("abcdefgh".into())).unwrap();
        apply(&mut m, id, PropertyEdit::MaxLength(5)).unwrap();
        assert_eq!(text(&m, id).default_value, "abcde");

        apply(&mut m, id, PropertyEdit::Value("123456789".into())).unwrap();
        assert_eq!(text(&m, id).default_value, "12345");

        apply(&mut m, id, PropertyEdit::MaxLength(0)).unwrap();
        apply(&mut m, id, PropertyEdit::Value("123456789".into())).unwrap();
        assert_eq!(text(&m, id).default_value, "123456789");
    }

    #[test]
    fn test_comb_forces_max_length() {
        let mut m = model();
        let id = m.create(FieldKind::Text, 0.0, 0.0, 0);
        apply(&mut m, id, PropertyEdit::Value("ABCDEFG".into())).unwrap();
        apply(&mut m, id, PropertyEdit::CombCells(4)).unwrap();
        let t = text(&m, id);
        assert_eq!((t.comb_cells, t.max_length, t.default_value.as_str()), (4, 4, "ABCD"));

        apply(&mut m, id, PropertyEdit::MaxLength(10)).unwrap();
        assert_eq!(text(&m, id).max_length, 4);

        apply(&mut m, id, PropertyEdit::CombCells(0)).unwrap();
        apply(&mut m, id, PropertyEdit::MaxLength(10)).unwrap();
        assert_eq!(text(&m, id).max_length, 10);
    }

    #[test]
    fn test_options_parsing_clears_missing_default() {
        assert_eq!(parse_options("Red, Green\n\n Blue ,"), vec!["Red", "Green", "Blue"]);

        let mut m = model();
        let id = m.create(FieldKind::Dropdown, 0.0, 0.0, 0);
        apply(&mut m, id, PropertyEdit::SelectedOption("Option 2".into())).unwrap();
        assert_eq!(apply(&mut m, id, PropertyEdit::Options("A\nB".into())).unwrap(), Refresh::Full);
        match &m.get(id).unwrap().attributes {
            FieldAttributes::Dropdown(c) => {
                assert_eq!(c.options, vec!["A", "B"]);
                assert!(c.default_value.is_empty());
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let mut m = model();
        let id = m.create(FieldKind::Signature, 0.0, 0.0, 0);
        assert!(matches!(
            apply(&mut m, id, PropertyEdit::Value("x".into())),
            Err(Error::Unsupported(_))
        ));
        assert!(apply(&mut m, id, PropertyEdit::FontSize(14.0)).is_err());
        assert_eq!(apply(&mut m, id, PropertyEdit::Required(true)).unwrap(), Refresh::None);
        assert!(m.get(id).unwrap().required);
    }

    #[test]
    fn test_button_panel_visibility() {
        let mut m = model();
        let other = m.create(FieldKind::Text, 0.0, 0.0, 0);
        let id = m.create(FieldKind::Button, 0.0, 0.0, 0);
        apply(&mut m, id, PropertyEdit::Action(ButtonAction::ShowHide)).unwrap();

        let p = panel(&m, id).unwrap();
        let target = p.controls.iter().find(|c| c.id == "targetField").unwrap();
        assert!(target.visible);
        match &target.input {
            Input::Select { choices, .. } => {
                assert_eq!(choices.len(), 2);
                assert_eq!(choices[1].value, m.get(other).unwrap().name);
            },
            other => panic!("unexpected {:?}", other),
        }
        assert!(!p.controls.iter().find(|c| c.id == "actionUrl").unwrap().visible);
    }

    #[test]
    fn test_comb_disables_max_length_control() {
        let mut m = model();
        let id = m.create(FieldKind::Text, 0.0, 0.0, 0);
        apply(&mut m, id, PropertyEdit::CombCells(6)).unwrap();
        let p = panel(&m, id).unwrap();
        let max = p.controls.iter().find(|c| c.id == "maxLength").unwrap();
        assert!(!max.enabled);
        assert!(p.join_groups.is_empty());
    }

    #[test]
    fn test_radio_panel_lists_groups() {
        let mut m = model();
        m.seed_from_existing(vec!["Existing".to_string()], vec!["Existing".to_string()]);
        let id = m.create(FieldKind::Radio, 0.0, 0.0, 0);
        let p = panel(&m, id).unwrap();
        assert_eq!(p.join_groups, vec!["Existing".to_string()]);
        assert_eq!(p.name_label, "Field Name (Group Name)");
    }
}
