//! Designer session: the context object tying pages, fields, interaction,
//! calibration and export together.
//!
//! A session starts from a blank document of a preset size or from an
//! uploaded PDF. Hosts forward pointer, touch and keyboard events, hand over
//! viewer readings after each page render, and finally call
//! [`DesignerSession::export`].

use super::calibration::{Calibration, CalibrationStatus, Calibrator, ViewerProbe};
use super::interaction::{Effect, InteractionMachine, Key, PointerTarget};
use super::kinds::FieldKind;
use super::model::{FieldId, FieldModel};
use super::properties::{self, PropertyEdit, PropertyPanel, Refresh};
use super::renderer::{self, VisualNode};
use crate::config::DesignerConfig;
use crate::document::SourceDocument;
use crate::error::{Error, Result};
use crate::geometry::{Point, Size};
use crate::object::ObjectRef;
use crate::synth::{self, SynthesisReport};
use crate::writer::{FormAuthoring, FormDocument, PdfWriterConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Page size presets, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// 8.5 × 11 in
    Letter,
    /// ISO A4
    A4,
    /// ISO A5
    A5,
    /// 8.5 × 14 in
    Legal,
    /// 11 × 17 in
    Tabloid,
    /// ISO A3
    A3,
    /// Any size
    Custom(Size),
}

impl PageSize {
    /// Width and height in points.
    pub fn dimensions(&self) -> Size {
        match self {
            PageSize::Letter => Size::new(612.0, 792.0),
            PageSize::A4 => Size::new(595.28, 841.89),
            PageSize::A5 => Size::new(419.53, 595.28),
            PageSize::Legal => Size::new(612.0, 1008.0),
            PageSize::Tabloid => Size::new(792.0, 1224.0),
            PageSize::A3 => Size::new(841.89, 1190.55),
            PageSize::Custom(size) => *size,
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::Letter => write!(f, "letter"),
            PageSize::A4 => write!(f, "a4"),
            PageSize::A5 => write!(f, "a5"),
            PageSize::Legal => write!(f, "legal"),
            PageSize::Tabloid => write!(f, "tabloid"),
            PageSize::A3 => write!(f, "a3"),
            PageSize::Custom(size) => write!(f, "{}x{}", size.width, size.height),
        }
    }
}

/// Parses a preset name (`letter`, `a4`, ...) or a custom `WIDTHxHEIGHT`.
impl FromStr for PageSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "letter" => Ok(PageSize::Letter),
            "a4" => Ok(PageSize::A4),
            "a5" => Ok(PageSize::A5),
            "legal" => Ok(PageSize::Legal),
            "tabloid" => Ok(PageSize::Tabloid),
            "a3" => Ok(PageSize::A3),
            other => {
                let parsed = other
                    .split_once('x')
                    .and_then(|(w, h)| Some((w.trim().parse::<f32>().ok()?, h.trim().parse::<f32>().ok()?)));
                match parsed {
                    Some((w, h)) if w > 0.0 && h > 0.0 => Ok(PageSize::Custom(Size::new(w, h))),
                    _ => Err(Error::Unsupported(format!("page size '{}'", s))),
                }
            },
        }
    }
}

/// One page of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Zero-based index
    pub index: usize,
    /// Size in points
    pub size: Size,
    /// Page object of the uploaded document, if the page came from one
    pub source: Option<ObjectRef>,
}

/// A finished interactive document.
#[derive(Debug, Clone)]
pub struct ExportedForm {
    /// Document bytes
    pub bytes: Vec<u8>,
    /// Suggested filename
    pub filename: String,
    /// What synthesis did
    pub report: SynthesisReport,
}

impl ExportedForm {
    /// Write the document into `dir` under its suggested filename and
    /// return the full path.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<std::path::PathBuf> {
        let path = dir.as_ref().join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        log::info!("wrote {} bytes to {}", self.bytes.len(), path.display());
        Ok(path)
    }
}

/// One designer session.
#[derive(Debug)]
pub struct DesignerSession {
    config: DesignerConfig,
    model: FieldModel,
    machine: InteractionMachine,
    calibrator: Calibrator,
    pages: Vec<Page>,
    current_page: usize,
    source: Option<SourceDocument>,
}

impl DesignerSession {
    fn empty(config: DesignerConfig) -> Self {
        Self {
            model: FieldModel::new(config.canvas),
            machine: InteractionMachine::new(&config),
            calibrator: Calibrator::new(config.default_scale),
            pages: Vec::new(),
            current_page: 0,
            source: None,
            config,
        }
    }

    /// Start from a blank one-page document.
    pub fn blank(config: DesignerConfig, size: PageSize) -> Self {
        let mut session = Self::empty(config);
        session.pages.push(Page {
            index: 0,
            size: size.dimensions(),
            source: None,
        });
        log::info!("new blank session ({})", size);
        session
    }

    /// Start from an uploaded document.
    ///
    /// Its pages become the session's pages and its field names seed the
    /// name validator and the name counter.
    pub fn load(config: DesignerConfig, bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let source = SourceDocument::load(bytes)?;
        let mut session = Self::empty(config);
        session.pages = source
            .pages()
            .iter()
            .enumerate()
            .map(|(index, p)| Page {
                index,
                size: Size::new(p.width, p.height),
                source: Some(p.reference),
            })
            .collect();
        session
            .model
            .seed_from_existing(source.field_names(), source.radio_group_names());

        log::info!(
            "loaded document: {} pages, {} existing fields, next generated number {}",
            session.pages.len(),
            source.fields().len(),
            session.model.counter() + 1
        );
        session.source = Some(source);
        Ok(session)
    }

    /// Configuration in use.
    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    /// The field model.
    pub fn model(&self) -> &FieldModel {
        &self.model
    }

    /// Pages in order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Index of the page being designed.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Whether the session edits an uploaded document.
    pub fn is_uploaded(&self) -> bool {
        self.source.is_some()
    }

    /// Current interaction state machine.
    pub fn interaction(&self) -> &InteractionMachine {
        &self.machine
    }

    /// Append a blank page. Uploaded documents keep their own pages.
    pub fn add_page(&mut self, size: PageSize) -> Result<usize> {
        if self.is_uploaded() {
            return Err(Error::Unsupported(
                "adding pages to an uploaded document".to_string(),
            ));
        }
        let index = self.pages.len();
        self.pages.push(Page {
            index,
            size: size.dimensions(),
            source: None,
        });
        log::debug!("added page {} ({})", index, size);
        Ok(index)
    }

    /// Make `index` the page being designed. Clears the selection and any
    /// gesture in progress.
    pub fn switch_page(&mut self, index: usize) -> Result<Vec<Effect>> {
        if index >= self.pages.len() {
            return Err(Error::PageOutOfRange {
                index,
                count: self.pages.len(),
            });
        }
        self.current_page = index;
        self.machine.reset();
        self.calibrator.page_changed(index);

        let mut effects = Vec::new();
        if self.model.selected_id().is_some() {
            self.model.deselect();
            effects.push(Effect::SelectionChanged(None));
        }
        Ok(effects)
    }

    /// Move to the next page; no-op on the last one.
    pub fn next_page(&mut self) -> Result<Vec<Effect>> {
        if self.current_page + 1 >= self.pages.len() {
            return Ok(Vec::new());
        }
        self.switch_page(self.current_page + 1)
    }

    /// Move to the previous page; no-op on the first one.
    pub fn prev_page(&mut self) -> Result<Vec<Effect>> {
        if self.current_page == 0 {
            return Ok(Vec::new());
        }
        self.switch_page(self.current_page - 1)
    }

    /// Drop every field, page and the uploaded document. Generated names
    /// keep counting from where they were.
    pub fn reset(&mut self) {
        self.model.clear();
        self.model.clear_registries();
        self.pages.clear();
        self.current_page = 0;
        self.source = None;
        self.machine.reset();
        self.calibrator = Calibrator::new(self.config.default_scale);
        log::info!("session reset");
    }

    /// Toolbar click.
    pub fn click_tool(&mut self, kind: FieldKind) -> Vec<Effect> {
        self.machine.click_tool(kind)
    }

    /// Click on empty canvas.
    pub fn click_canvas(&mut self, at: Point) -> Vec<Effect> {
        self.machine.click_canvas(&mut self.model, at, self.current_page)
    }

    /// Toolbar item dropped on the canvas.
    pub fn drop_tool(&mut self, kind: FieldKind, at: Point) -> Vec<Effect> {
        self.machine.drop_tool(&mut self.model, kind, at, self.current_page)
    }

    /// Touch started on a toolbar item.
    pub fn touch_tool_start(&mut self, kind: FieldKind, at: Point) {
        self.machine.touch_tool_start(kind, at);
    }

    /// Touch on a toolbar item moved.
    pub fn touch_tool_move(&mut self, at: Point) {
        self.machine.touch_tool_move(at);
    }

    /// Touch on a toolbar item ended.
    pub fn touch_tool_end(&mut self, at: Point) -> Vec<Effect> {
        self.machine.touch_tool_end(&mut self.model, at, self.current_page)
    }

    /// Pointer pressed.
    pub fn pointer_down(&mut self, target: PointerTarget, at: Point) -> Result<Vec<Effect>> {
        self.machine.pointer_down(&mut self.model, target, at)
    }

    /// Pointer moved.
    pub fn pointer_move(&mut self, at: Point) -> Vec<Effect> {
        self.machine.pointer_move(&mut self.model, at)
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) -> Vec<Effect> {
        self.machine.pointer_up()
    }

    /// Key pressed.
    pub fn key_down(&mut self, key: Key) -> Vec<Effect> {
        self.machine.key_down(&mut self.model, key)
    }

    /// Delete a field, e.g. from a panel button.
    pub fn delete_field(&mut self, id: FieldId) -> Result<Vec<Effect>> {
        let was_selected = self.model.selected_id() == Some(id);
        self.model.delete(id)?;
        let mut effects = vec![Effect::Remove(id)];
        if was_selected {
            effects.push(Effect::SelectionChanged(None));
        }
        Ok(effects)
    }

    /// Visual nodes of the current page's fields.
    pub fn render_current_page(&self) -> Vec<VisualNode> {
        renderer::render_page(&self.model, self.current_page)
    }

    /// The current page's visual tree as JSON, for hosts that render in a
    /// separate process.
    pub fn render_current_page_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.render_current_page())?)
    }

    /// Visual node of one field.
    pub fn render_field(&self, id: FieldId) -> Result<VisualNode> {
        let field = self.model.get(id)?;
        Ok(renderer::render(field, self.model.selected_id() == Some(id)))
    }

    /// Property panel of the selected field, if any.
    pub fn panel(&self) -> Result<Option<PropertyPanel>> {
        self.model
            .selected_id()
            .map(|id| properties::panel(&self.model, id))
            .transpose()
    }

    /// Apply a property edit.
    pub fn edit(&mut self, id: FieldId, edit: PropertyEdit) -> Result<Refresh> {
        properties::apply(&mut self.model, id, edit)
    }

    fn current_width(&self) -> Result<f32> {
        self.pages
            .get(self.current_page)
            .map(|p| p.size.width)
            .ok_or(Error::PageOutOfRange {
                index: self.current_page,
                count: self.pages.len(),
            })
    }

    /// The viewer finished rendering the current page.
    pub fn on_render_complete(&mut self, probe: &mut dyn ViewerProbe) -> Result<Calibration> {
        let width = self.current_width()?;
        self.calibrator.on_render_complete(probe, self.current_page, width)
    }

    /// The viewer's layout settled after rendering the current page.
    pub fn on_settled(&mut self, probe: &mut dyn ViewerProbe) -> Result<Calibration> {
        let width = self.current_width()?;
        self.calibrator.on_settled(probe, self.current_page, width)
    }

    /// Take both readings at once.
    pub fn calibrate_now(&mut self, probe: &mut dyn ViewerProbe) -> Result<Calibration> {
        let width = self.current_width()?;
        self.calibrator.calibrate_now(probe, self.current_page, width)
    }

    /// Calibration status of the current page.
    pub fn calibration_status(&self) -> CalibrationStatus {
        self.calibrator.status()
    }

    /// Calibration in use.
    pub fn calibration(&self) -> Calibration {
        self.calibrator.calibration()
    }

    /// Build the interactive document.
    ///
    /// Validation failures leave the session untouched. A blank session is
    /// written as a new document, an uploaded one as an incremental update
    /// of the original bytes.
    pub fn export(&self) -> Result<ExportedForm> {
        synth::preflight(&self.model, self.pages.len())?;
        synth::check_calibration(&self.model, &self.calibrator, self.config.calibration_policy)?;

        let writer_config = PdfWriterConfig::from_designer(&self.config);
        let mut doc = match &self.source {
            Some(source) => FormDocument::incremental(writer_config, SourceDocument::load(source.bytes().to_vec())?),
            None => {
                let sizes: Vec<Size> = self.pages.iter().map(|p| p.size).collect();
                FormDocument::blank(writer_config, &sizes)
            },
        };

        let report = synth::synthesize(&mut doc, &self.model, &self.calibrator)?;
        let bytes = doc.save()?;
        log::info!(
            "exported {} ({} bytes, {} fields)",
            self.config.output_filename,
            bytes.len(),
            report.fields_written
        );
        Ok(ExportedForm {
            bytes,
            filename: self.config.output_filename.clone(),
            report,
        })
    }
}
