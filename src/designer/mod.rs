//! Interactive form designer.
//!
//! The designer keeps one authoritative list of field records per session
//! and derives everything else from it:
//!
//! ```text
//!   pointer / touch / key events         viewer render callbacks
//!              │                                   │
//!              ▼                                   ▼
//!   ┌────────────────────┐              ┌────────────────────┐
//!   │ InteractionMachine │              │     Calibrator     │
//!   └─────────┬──────────┘              └─────────┬──────────┘
//!             │ create / move / resize            │ offset, scale
//!             ▼                                   │
//!   ┌────────────────────┐   edits   ┌──────────┐ │
//!   │     FieldModel     │◀──────────│properties│ │
//!   └─────────┬──────────┘           └──────────┘ │
//!             │ read only                         │
//!       ┌─────┴───────┐                           │
//!       ▼             ▼                           ▼
//!   renderer     synth (export) ◀─────────────────┘
//! ```
//!
//! [`DesignerSession`] owns all of these and is the entry point for hosts.
//!
//! # Example
//!
//! ```
//! use pdf_form_designer::designer::{DesignerSession, ElementGeometry, FieldKind, PageSize};
//! use pdf_form_designer::geometry::Point;
//! use pdf_form_designer::DesignerConfig;
//!
//! let mut session = DesignerSession::blank(DesignerConfig::default(), PageSize::Letter);
//! session.click_tool(FieldKind::Text);
//! session.click_canvas(Point::new(175.0, 115.0));
//!
//! let mut reading = ElementGeometry {
//!     width: 612.0 * 1.333,
//!     height: 792.0 * 1.333,
//!     ..ElementGeometry::default()
//! };
//! session.calibrate_now(&mut reading).unwrap();
//!
//! let form = session.export().unwrap();
//! assert_eq!(form.filename, "fillable-form.pdf");
//! ```

pub mod calibration;
pub mod interaction;
pub mod kinds;
pub mod model;
pub mod properties;
pub mod renderer;
pub mod session;

pub use calibration::{Calibration, CalibrationStatus, Calibrator, ElementGeometry, ViewerProbe};
pub use interaction::{Effect, Handle, InteractionMachine, InteractionState, Key, PointerTarget};
pub use kinds::FieldKind;
pub use model::{FieldAttributes, FieldId, FieldModel, FormField};
pub use properties::{PropertyEdit, PropertyPanel, Refresh};
pub use renderer::{NodeContent, VisualNode};
pub use session::{DesignerSession, ExportedForm, Page, PageSize};
