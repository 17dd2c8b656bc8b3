//! AcroForm synthesis.
//!
//! Turns the designer's field records into interactive form fields on an
//! authoring backend. Export runs in three steps:
//!
//! 1. [`preflight`] rejects name conflicts, empty forms and page-less
//!    sessions before anything is written,
//! 2. [`check_calibration`] applies the calibration policy,
//! 3. [`synthesize`] maps every field into document space and emits it.
//!
//! Canvas boxes are converted with the calibration of the field's page:
//!
//! ```text
//! x = (canvas.x - offset.x) / scale
//! y = page_height - (canvas.y - offset.y) / scale - canvas.height / scale
//! ```

use crate::config::CalibrationPolicy;
use crate::designer::calibration::Calibrator;
use crate::designer::model::{
    hex_to_rgb, ButtonAction, ButtonAttributes, FieldAttributes, FieldModel, FormField, TextStyle,
    VisibilityAction,
};
use crate::error::{Error, Result, ValidationReport};
use crate::geometry::Rect;
use crate::object::{Object, ObjectRef};
use crate::writer::{
    CheckboxWidget, ChoiceFieldWidget, FormAction, FormAuthoring, IconPlacement, ObjectSerializer,
    PushButtonWidget, RadioButtonGroup, RadioOption, SignatureFlags, TextFieldWidget, VariableText,
    WidgetStyle,
};
use indexmap::IndexMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::collections::HashSet;

/// Characters `encodeURI` escapes on top of non-ASCII and controls.
const URI_ESCAPED: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Script run by image buttons to let the user pick a picture.
const IMPORT_ICON_SCRIPT: &str = "event.target.buttonImportIcon();";

/// Outcome of a successful synthesis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesisReport {
    /// Top-level fields written, radio groups counted once
    pub fields_written: usize,
    /// Fields skipped because their page does not exist
    pub skipped: Vec<String>,
    /// Radio groups of the uploaded document that received new options
    pub merged_groups: Vec<String>,
}

/// Blocking checks run before any authoring call.
///
/// In order: names clashing with the uploaded document, names used by more
/// than one session field (unless every holder is a radio option), an
/// empty form, a session without pages.
pub fn preflight(model: &FieldModel, page_count: usize) -> Result<()> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    let mut conflicts: Vec<String> = Vec::new();

    for field in model.fields() {
        *counts.entry(field.name.as_str()).or_insert(0) += 1;
        if model.is_existing_name(&field.name)
            && !(field.is_radio() && model.is_existing_radio_group(&field.name))
            && !conflicts.contains(&field.name)
        {
            conflicts.push(field.name.clone());
        }
    }

    if !conflicts.is_empty() {
        return Err(Error::Validation(
            ValidationReport::new(
                "Field Name Conflict",
                format!(
                    "The following field names already exist in the uploaded PDF: {}. Please rename these fields before downloading.",
                    quoted(&conflicts)
                ),
            )
            .with_names(conflicts),
        ));
    }

    let duplicates: Vec<String> = counts
        .into_iter()
        .filter(|&(name, count)| count > 1 && !model.fields().iter().filter(|f| f.name == name).all(FormField::is_radio))
        .map(|(name, _)| name.to_string())
        .collect();
    if !duplicates.is_empty() {
        return Err(Error::Validation(
            ValidationReport::new(
                "Duplicate Field Names",
                format!(
                    "The following field names are used more than once: {}. Please rename these fields to use unique names before downloading.",
                    quoted(&duplicates)
                ),
            )
            .with_names(duplicates),
        ));
    }

    if model.is_empty() {
        return Err(Error::Validation(ValidationReport::new(
            "No Fields",
            "Please add at least one field before downloading.",
        )));
    }

    if page_count == 0 {
        return Err(Error::Validation(ValidationReport::new(
            "No Pages",
            "No pages found. Please create a blank PDF or upload one.",
        )));
    }

    Ok(())
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("\"{}\"", n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Apply the calibration policy to every page that holds fields.
pub fn check_calibration(model: &FieldModel, calibrator: &Calibrator, policy: CalibrationPolicy) -> Result<()> {
    let mut seen = HashSet::new();
    for page in model.fields().iter().map(|f| f.page_index) {
        if !seen.insert(page) || calibrator.is_calibrated(page) {
            continue;
        }
        match policy {
            CalibrationPolicy::Block => return Err(Error::NotCalibrated(page)),
            CalibrationPolicy::UseLastKnown => {
                let c = calibrator.for_page(page);
                log::warn!(
                    "page {} was never calibrated, using offset ({}, {}) scale {}",
                    page,
                    c.offset.x,
                    c.offset.y,
                    c.scale
                );
            },
        }
    }
    Ok(())
}

/// Emit every field of `model` onto `doc`.
///
/// Fields on pages the document does not have are skipped. A save-time
/// name collision aborts with a validation report, except when a radio
/// option targets a radio group of the uploaded document.
pub fn synthesize<D>(doc: &mut D, model: &FieldModel, calibrator: &Calibrator) -> Result<SynthesisReport>
where
    D: FormAuthoring + ?Sized,
{
    let mut report = SynthesisReport::default();
    let mut groups: IndexMap<String, RadioButtonGroup> = IndexMap::new();
    let page_count = doc.page_count();

    for field in model.fields() {
        if field.page_index >= page_count {
            log::warn!(
                "skipping '{}': page {} does not exist ({} pages)",
                field.name,
                field.page_index,
                page_count
            );
            report.skipped.push(field.name.clone());
            continue;
        }

        let page_height = doc.page_size(field.page_index)?.height;
        let rect = calibrator
            .for_page(field.page_index)
            .to_document(&field.rect, page_height);
        log::debug!(
            "'{}' canvas ({}, {}, {}x{}) -> document ({:.2}, {:.2}, {:.2}x{:.2})",
            field.name,
            field.rect.x,
            field.rect.y,
            field.rect.width,
            field.rect.height,
            rect.x,
            rect.y,
            rect.width,
            rect.height
        );

        if let FieldAttributes::Radio(radio) = &field.attributes {
            let group = groups
                .entry(field.name.clone())
                .or_insert_with(|| RadioButtonGroup::new(field.name.clone()));
            group.add_option(RadioOption::new(radio.export_value.clone(), rect, field.page_index).with_style(style_of(field)));
            if radio.checked {
                group.select(if radio.export_value.is_empty() {
                    "Yes"
                } else {
                    radio.export_value.as_str()
                });
            }
            if field.required {
                group.set_required();
            }
            if field.read_only {
                group.set_read_only();
            }
            continue;
        }

        emit(doc, field, rect).map_err(save_error)?;
        report.fields_written += 1;
    }

    for (name, group) in groups {
        match doc.add_radio_group(group) {
            Ok(_) => {
                if model.is_existing_radio_group(&name) {
                    log::info!("added options to existing radio group '{}'", name);
                    report.merged_groups.push(name);
                } else {
                    report.fields_written += 1;
                }
            },
            Err(Error::FieldNameExists { name: taken }) if model.is_existing_radio_group(&taken) => {
                log::warn!("radio group '{}' already exists in the document, options not added", taken);
            },
            Err(e) => return Err(save_error(e)),
        }
    }

    log::info!(
        "synthesized {} fields ({} skipped, {} groups merged)",
        report.fields_written,
        report.skipped.len(),
        report.merged_groups.len()
    );
    Ok(report)
}

fn save_error(e: Error) -> Error {
    match e {
        Error::FieldNameExists { name } => Error::Validation(
            ValidationReport::new(
                "Duplicate Field Name",
                format!(
                    "A field named \"{}\" already exists. Please rename this field to use a unique name before downloading.",
                    name
                ),
            )
            .with_names(vec![name]),
        ),
        other => other,
    }
}

/// Border and tooltip of a field; white background.
fn style_of(field: &FormField) -> WidgetStyle {
    let style = WidgetStyle {
        border_color: Some(hex_to_rgb(&field.border_color)),
        tooltip: (!field.tooltip.is_empty()).then(|| field.tooltip.clone()),
        ..WidgetStyle::default()
    };
    if field.hide_border {
        style.without_border()
    } else {
        style
    }
}

fn variable_text(style: &TextStyle) -> VariableText {
    VariableText {
        font_size: style.font_size,
        color: hex_to_rgb(&style.text_color),
        alignment: style.alignment,
    }
}

fn emit<D>(doc: &mut D, field: &FormField, rect: Rect) -> Result<ObjectRef>
where
    D: FormAuthoring + ?Sized,
{
    let page = field.page_index;
    let name = field.name.as_str();

    match &field.attributes {
        FieldAttributes::Text(text) => {
            let mut widget = TextFieldWidget::new(name, rect)
                .with_value(text.default_value.clone())
                .with_text(variable_text(&text.style))
                .with_style(style_of(field));
            if text.comb_cells > 0 {
                widget = widget.comb(text.comb_cells);
            } else if text.max_length > 0 {
                widget = widget.with_max_length(text.max_length);
            }
            if text.multiline && text.comb_cells == 0 {
                widget = widget.multiline();
            }
            if field.required {
                widget = widget.required();
            }
            if field.read_only {
                widget = widget.read_only();
            }
            doc.add_text_field(page, widget)
        },
        FieldAttributes::Checkbox(check) => {
            let mut widget = CheckboxWidget::new(name, rect)
                .with_export_value(check.export_value.clone())
                .with_checked(check.checked)
                .with_style(style_of(field));
            if field.required {
                widget = widget.required();
            }
            if field.read_only {
                widget = widget.read_only();
            }
            doc.add_checkbox(page, widget)
        },
        FieldAttributes::Dropdown(choice) | FieldAttributes::Optionlist(choice) => {
            let widget = if matches!(field.attributes, FieldAttributes::Dropdown(_)) {
                ChoiceFieldWidget::combo(name, rect)
            } else {
                ChoiceFieldWidget::list(name, rect)
            };
            let mut widget = widget
                .with_options(choice.options.clone())
                .with_text(variable_text(&choice.style))
                .with_style(style_of(field));
            if !choice.default_value.is_empty() {
                widget = widget.with_value(choice.default_value.clone());
            }
            if field.required {
                widget = widget.required();
            }
            if field.read_only {
                widget = widget.read_only();
            }
            doc.add_choice_field(page, widget)
        },
        FieldAttributes::Button(button) => {
            let label = if button.label.is_empty() { "Button" } else { button.label.as_str() };
            let mut widget = PushButtonWidget::new(name, rect)
                .with_caption(label)
                .with_text(variable_text(&button.style))
                .with_style(WidgetStyle {
                    background_color: Some([0.8, 0.8, 0.8]),
                    ..style_of(field)
                });
            if let Some(action) = button_action(button) {
                widget = widget.with_action(action);
            }
            if field.required {
                widget = widget.required();
            }
            if field.read_only {
                widget = widget.read_only();
            }
            doc.add_push_button(page, widget)
        },
        FieldAttributes::Date(date) => {
            let format = if date.date_format.is_empty() {
                "mm/dd/yyyy"
            } else {
                date.date_format.as_str()
            };
            let mut widget = TextFieldWidget::new(name, rect)
                .with_text(variable_text(&date.style))
                .with_style(WidgetStyle {
                    border_color: Some([0.0, 0.0, 0.0]),
                    border_width: 1.0,
                    ..style_of(field)
                })
                .with_format_scripts(
                    format!("AFDate_FormatEx(\"{}\");", format),
                    format!("AFDate_KeystrokeEx(\"{}\");", format),
                );
            if field.required {
                widget = widget.required();
            }
            if field.read_only {
                widget = widget.read_only();
            }
            doc.add_text_field(page, widget)
        },
        FieldAttributes::Image(image) => {
            let label = if image.label.is_empty() {
                "Click to Upload Image"
            } else {
                image.label.as_str()
            };
            let widget = PushButtonWidget::new(name, rect)
                .with_caption(label)
                .with_action(FormAction::JavaScript(IMPORT_ICON_SCRIPT.to_string()))
                .with_icon(IconPlacement)
                .with_style(WidgetStyle {
                    border_color: Some([0.0, 0.0, 0.0]),
                    border_width: 1.0,
                    background_color: Some([0.9, 0.9, 0.9]),
                    tooltip: style_of(field).tooltip,
                });
            doc.add_push_button(page, widget)
        },
        FieldAttributes::Signature => add_signature(doc, field, rect),
        FieldAttributes::Radio(_) => Err(Error::InvalidPdf(format!(
            "radio option '{}' must be added through its group",
            name
        ))),
    }
}

/// Action for a push button, `None` when the configuration is incomplete.
pub fn button_action(button: &ButtonAttributes) -> Option<FormAction> {
    match button.action {
        ButtonAction::None => None,
        ButtonAction::Reset => Some(FormAction::ResetForm),
        ButtonAction::Print => Some(FormAction::JavaScript("print();".to_string())),
        ButtonAction::Url => {
            let url = button.action_url.trim();
            if url.is_empty() {
                return None;
            }
            Some(FormAction::Uri(normalize_url(url)))
        },
        ButtonAction::Js => {
            (!button.js_script.is_empty()).then(|| FormAction::JavaScript(button.js_script.clone()))
        },
        ButtonAction::ShowHide => {
            if button.target_field_name.is_empty() {
                return None;
            }
            Some(FormAction::JavaScript(visibility_script(
                &button.target_field_name,
                button.visibility_action,
            )))
        },
    }
}

/// Prefix `https://` when no http(s) scheme is present, then escape the
/// way `encodeURI` does.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let with_scheme = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    };
    utf8_percent_encode(&with_scheme, URI_ESCAPED).to_string()
}

/// Script changing the visibility of field `target`.
pub fn visibility_script(target: &str, mode: VisibilityAction) -> String {
    let assignment = match mode {
        VisibilityAction::Show => "display.visible",
        VisibilityAction::Hide => "display.hidden",
        VisibilityAction::Toggle => "(f.display === display.visible) ? display.hidden : display.visible",
    };
    format!("var f = this.getField(\"{}\"); if(f) f.display = {};", target, assignment)
}

fn add_signature<D>(doc: &mut D, field: &FormField, rect: Rect) -> Result<ObjectRef>
where
    D: FormAuthoring + ?Sized,
{
    let page_ref = doc.page_ref(field.page_index)?;
    let field_ref = doc.allocate();
    let widget_ref = doc.allocate();
    doc.register_field(&field.name, field_ref)?;

    let mut widget = ObjectSerializer::dict_map(vec![
        ("Type", ObjectSerializer::name("Annot")),
        ("Subtype", ObjectSerializer::name("Widget")),
        ("Rect", ObjectSerializer::rect(&rect)),
        ("F", ObjectSerializer::integer(4)),
        ("P", ObjectSerializer::reference(page_ref)),
        ("Parent", ObjectSerializer::reference(field_ref)),
        (
            "BS",
            ObjectSerializer::dict(vec![
                ("W", ObjectSerializer::integer(1)),
                ("S", ObjectSerializer::name("S")),
            ]),
        ),
        (
            "MK",
            ObjectSerializer::dict(vec![
                ("BC", ObjectSerializer::rgb([0.0, 0.0, 0.0])),
                ("BG", ObjectSerializer::rgb([0.95, 0.95, 0.95])),
            ]),
        ),
    ]);
    if !field.tooltip.is_empty() {
        widget.insert("TU".to_string(), ObjectSerializer::text(&field.tooltip));
    }

    let sig_field = ObjectSerializer::dict(vec![
        ("FT", ObjectSerializer::name("Sig")),
        ("T", ObjectSerializer::text(&field.name)),
        ("Kids", ObjectSerializer::array(vec![ObjectSerializer::reference(widget_ref)])),
    ]);

    doc.register_object(field_ref, sig_field);
    doc.register_object(widget_ref, Object::Dictionary(widget));
    doc.attach_annotation(field.page_index, widget_ref)?;
    doc.set_signature_flags(SignatureFlags::SIGNATURES_EXIST | SignatureFlags::APPEND_ONLY);
    Ok(field_ref)
}
