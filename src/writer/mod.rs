//! PDF writing module for interactive forms.
//!
//! ## Architecture
//!
//! ```text
//! field builders (form_fields)
//!     ↓
//! [FormDocument] (pages, field registry, AcroForm)
//!     ↓
//! [PdfFileWriter] (offsets, xref section, trailer)
//!     ↓
//! [ObjectSerializer] (serializes PDF objects)
//!     ↓
//! PDF bytes
//! ```
//!
//! Blank documents are written in full. Uploaded documents are never
//! rewritten: new and changed objects go into an incremental update
//! appended to the original bytes.
//!
//! ## Example
//!
//! ```
//! use pdf_form_designer::geometry::{Rect, Size};
//! use pdf_form_designer::writer::{FormAuthoring, FormDocument, PdfWriterConfig, TextFieldWidget};
//!
//! let mut doc = FormDocument::blank(PdfWriterConfig::default(), &[Size::new(612.0, 792.0)]);
//! doc.add_text_field(0, TextFieldWidget::new("name", Rect::new(72.0, 700.0, 200.0, 20.0)))
//!     .unwrap();
//! let bytes = doc.save().unwrap();
//! assert!(bytes.starts_with(b"%PDF-1.7"));
//! ```

mod acroform;
pub mod form_document;
pub mod form_fields;
mod object_serializer;
mod pdf_writer;

pub use acroform::{AcroFormBuilder, FormFonts};
pub use form_document::{FormAuthoring, FormDocument};
pub use form_fields::{
    ButtonFieldFlags, CheckboxWidget, ChoiceFieldFlags, ChoiceFieldWidget, ChoiceKind,
    FormAction, FormAppearanceGenerator, FormFieldWidget, IconPlacement, PushButtonWidget,
    RadioButtonGroup, RadioOption, SignatureFlags, TextAlignment, TextFieldFlags,
    TextFieldWidget, ToggleAppearances, ToggleShape, VariableText, WidgetStyle,
};
pub use object_serializer::ObjectSerializer;
pub use pdf_writer::{pdf_date, PdfFileWriter, PdfWriterConfig};
