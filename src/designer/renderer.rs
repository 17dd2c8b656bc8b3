//! Projection of fields into a serializable visual tree.
//!
//! [`render`] is pure: the node depends only on the field record and
//! whether it is selected. Hosts turn nodes into DOM elements (or whatever
//! their toolkit uses) and key them by [`VisualNode::field_id`].

use super::interaction::Handle;
use super::model::{FieldAttributes, FieldModel, FormField};
use crate::writer::form_fields::TextAlignment;
use serde::Serialize;

/// Caption of signature placeholders.
const SIGNATURE_CAPTION: &str = "Sign Here";
/// Dropdown text when there is nothing to show.
const DROPDOWN_PLACEHOLDER: &str = "Select...";
/// Row shown by an option list without options.
const EMPTY_LIST_ROW: &str = "Item 1";

/// Box of a field on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStyle {
    /// CSS `left` in px
    pub left: f32,
    /// CSS `top` in px
    pub top: f32,
    /// CSS `width` in px
    pub width: f32,
    /// CSS `height` in px
    pub height: f32,
    /// CSS `border` shorthand
    pub border: String,
    /// CSS `background-color`
    pub background: String,
    /// Drawn as a circle
    pub round: bool,
}

/// Comb layout of a text field: monospace glyphs spread over equal cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombLayout {
    /// Number of cells
    pub cells: u32,
    /// CSS `letter-spacing`
    pub letter_spacing: String,
    /// CSS `padding-left`
    pub padding_left: String,
}

impl CombLayout {
    fn new(width: f32, cells: u32) -> Self {
        let cell = width / cells as f32;
        Self {
            cells,
            letter_spacing: format!("calc({}px - 1ch)", cell),
            padding_left: format!("calc(({}px - 1ch) / 2)", cell),
        }
    }
}

/// One row of an option list preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionRow {
    /// Row text
    pub text: String,
    /// Drawn as the selected row
    pub highlighted: bool,
}

/// Kind-specific content of a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeContent {
    /// Current value of a text field
    Text {
        /// Text shown
        value: String,
        /// Font size in px
        font_size: f32,
        /// CSS colour
        color: String,
        /// Horizontal alignment; comb fields are always left-aligned
        align: TextAlignment,
        /// Whether lines wrap
        wrap: bool,
        /// Comb layout, when cells are configured
        comb: Option<CombLayout>,
    },
    /// Checkbox, with a check mark when on
    Checkbox {
        /// Check mark drawn
        checked: bool,
    },
    /// Radio option, with a dot when on
    Radio {
        /// Dot drawn
        checked: bool,
    },
    /// Closed dropdown
    Dropdown {
        /// Text shown in the box
        display: String,
    },
    /// List box rows
    Optionlist {
        /// Rows in order
        rows: Vec<OptionRow>,
        /// Rows are a placeholder
        placeholder: bool,
    },
    /// Push button face
    Button {
        /// Caption
        label: String,
        /// CSS colour of the caption
        color: String,
    },
    /// Signature placeholder
    Signature {
        /// Caption
        caption: String,
    },
    /// Date placeholder showing the pattern
    Date {
        /// Date pattern
        format: String,
    },
    /// Image placeholder
    Image {
        /// Prompt
        label: String,
    },
}

/// Renderable description of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualNode {
    /// Value of the element's `data-field-id`
    #[serde(rename = "data-field-id")]
    pub field_id: String,
    /// Name shown above the field
    pub label: String,
    /// Geometry and decoration
    pub style: NodeStyle,
    /// Whether the field is selected
    pub selected: bool,
    /// Resize handles, present only when selected
    pub handles: Vec<Handle>,
    /// Kind-specific content
    pub content: NodeContent,
}

/// Project one field.
pub fn render(field: &FormField, selected: bool) -> VisualNode {
    let rect = field.rect;
    let border = if field.hide_border {
        "1px dashed #c7d2fe".to_string()
    } else {
        format!("1px solid {}", field.border_color)
    };

    VisualNode {
        field_id: field.id.to_string(),
        label: field.name.clone(),
        style: NodeStyle {
            left: rect.x,
            top: rect.y,
            width: rect.width,
            height: rect.height,
            border,
            background: field.kind().spec().tint.to_string(),
            round: field.is_radio(),
        },
        selected,
        handles: if selected { Handle::ALL.to_vec() } else { Vec::new() },
        content: content(field),
    }
}

/// Project every field on `page`, in creation order.
pub fn render_page(model: &FieldModel, page: usize) -> Vec<VisualNode> {
    let selected = model.selected_id();
    model
        .fields_on_page(page)
        .map(|f| render(f, selected == Some(f.id)))
        .collect()
}

fn content(field: &FormField) -> NodeContent {
    match &field.attributes {
        FieldAttributes::Text(text) => {
            let comb = (text.comb_cells > 0).then(|| CombLayout::new(field.rect.width, text.comb_cells));
            NodeContent::Text {
                value: text.default_value.clone(),
                font_size: text.style.font_size,
                color: text.style.text_color.clone(),
                align: if comb.is_some() {
                    TextAlignment::Left
                } else {
                    text.style.alignment
                },
                wrap: text.multiline,
                comb,
            }
        },
        FieldAttributes::Checkbox(check) => NodeContent::Checkbox { checked: check.checked },
        FieldAttributes::Radio(radio) => NodeContent::Radio { checked: radio.checked },
        FieldAttributes::Dropdown(choice) => {
            let display = if !choice.default_value.is_empty() && choice.options.contains(&choice.default_value) {
                choice.default_value.clone()
            } else {
                choice
                    .options
                    .first()
                    .cloned()
                    .unwrap_or_else(|| DROPDOWN_PLACEHOLDER.to_string())
            };
            NodeContent::Dropdown { display }
        },
        FieldAttributes::Optionlist(choice) => {
            if choice.options.is_empty() {
                return NodeContent::Optionlist {
                    rows: vec![OptionRow {
                        text: EMPTY_LIST_ROW.to_string(),
                        highlighted: false,
                    }],
                    placeholder: true,
                };
            }
            let rows = choice
                .options
                .iter()
                .enumerate()
                .map(|(i, option)| OptionRow {
                    text: option.clone(),
                    highlighted: if choice.default_value.is_empty() {
                        i == 0
                    } else {
                        *option == choice.default_value
                    },
                })
                .collect();
            NodeContent::Optionlist {
                rows,
                placeholder: false,
            }
        },
        FieldAttributes::Button(button) => NodeContent::Button {
            label: if button.label.is_empty() {
                "Button".to_string()
            } else {
                button.label.clone()
            },
            color: button.style.text_color.clone(),
        },
        FieldAttributes::Signature => NodeContent::Signature {
            caption: SIGNATURE_CAPTION.to_string(),
        },
        FieldAttributes::Date(date) => NodeContent::Date {
            format: date.date_format.clone(),
        },
        FieldAttributes::Image(image) => NodeContent::Image {
            label: image.label.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::designer::kinds::FieldKind;
    use crate::geometry::Size;

    fn model_with(kind: FieldKind) -> (FieldModel, super::super::model::FieldId) {
        let mut model = FieldModel::new(Size::new(816.0, 1056.0));
        let id = model.create(kind, 100.0, 100.0, 0);
        (model, id)
    }

    #[test]
    fn test_node_geometry_and_id() {
        let (model, id) = model_with(FieldKind::Text);
        let node = render(model.get(id).unwrap(), false);
        assert_eq!(node.field_id, "field_1");
        assert_eq!(node.label, "Text_1");
        assert_eq!((node.style.left, node.style.top, node.style.width), (100.0, 100.0, 150.0));
        assert!(node.handles.is_empty());
    }

    #[test]
    fn test_selected_node_has_eight_handles() {
        let (mut model, id) = model_with(FieldKind::Radio);
        model.select(id).unwrap();
        let nodes = render_page(&model, 0);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].handles.len(), 8);
        assert!(nodes[0].style.round);
        assert!(render_page(&model, 1).is_empty());
    }

    #[test]
    fn test_comb_layout() {
        let (mut model, id) = model_with(FieldKind::Text);
        if let FieldAttributes::Text(text) = &mut model.get_mut(id).unwrap().attributes {
            text.comb_cells = 5;
            text.style.alignment = TextAlignment::Right;
        }
        match render(model.get(id).unwrap(), false).content {
            NodeContent::Text { comb: Some(comb), align, .. } => {
                assert_eq!(comb.letter_spacing, "calc(30px - 1ch)");
                assert_eq!(comb.padding_left, "calc((30px - 1ch) / 2)");
                assert_eq!(align, TextAlignment::Left);
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_dropdown_display() {
        let (mut model, id) = model_with(FieldKind::Dropdown);
        let shown = |model: &FieldModel| match render(model.get(id).unwrap(), false).content {
            NodeContent::Dropdown { display } => display,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(shown(&model), "Option 1");

        if let FieldAttributes::Dropdown(choice) = &mut model.get_mut(id).unwrap().attributes {
            choice.default_value = "Option 2".to_string();
        }
        assert_eq!(shown(&model), "Option 2");

        if let FieldAttributes::Dropdown(choice) = &mut model.get_mut(id).unwrap().attributes {
            choice.options.clear();
        }
        assert_eq!(shown(&model), "Select...");
    }

    #[test]
    fn test_empty_option_list_placeholder() {
        let (mut model, id) = model_with(FieldKind::Optionlist);
        if let FieldAttributes::Optionlist(choice) = &mut model.get_mut(id).unwrap().attributes {
            choice.options.clear();
        }
        match render(model.get(id).unwrap(), false).content {
            NodeContent::Optionlist { rows, placeholder } => {
                assert!(placeholder);
                assert_eq!(rows[0].text, "Item 1");
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_serializes_with_data_attribute() {
        let (model, id) = model_with(FieldKind::Signature);
        let json = serde_json::to_value(render(model.get(id).unwrap(), false)).unwrap();
        assert_eq!(json["data-field-id"], "field_1");
        assert_eq!(json["content"]["kind"], "signature");
        assert_eq!(json["content"]["caption"], "Sign Here");
    }
}
