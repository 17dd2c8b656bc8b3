//! Form authoring backend.
//!
//! [`FormAuthoring`] is the narrow interface the synthesizer compiles
//! against: page lookup, one constructor per field kind, and a low-level
//! escape hatch for object graphs no constructor covers. [`FormDocument`]
//! implements it for blank documents, written in full, and for uploaded
//! documents, written as an incremental update after the original bytes.

use super::acroform::{AcroFormBuilder, FormFonts};
use super::form_fields::{
    CheckboxWidget, ChoiceFieldWidget, FormFieldWidget, PushButtonWidget, RadioButtonGroup,
    SignatureFlags, TextFieldWidget, ToggleAppearances,
};
use super::object_serializer::ObjectSerializer;
use super::pdf_writer::{PdfFileWriter, PdfWriterConfig};
use crate::document::{AcroFormLocation, SourceDocument};
use crate::error::{Error, Result};
use crate::geometry::Size;
use crate::object::{Dict, Object, ObjectRef};
use std::collections::{BTreeMap, HashSet};

/// Document operations needed to synthesize an interactive form.
pub trait FormAuthoring {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Page size in points.
    fn page_size(&self, page: usize) -> Result<Size>;

    /// Reference of the page object.
    fn page_ref(&self, page: usize) -> Result<ObjectRef>;

    /// Add a text field on `page`.
    fn add_text_field(&mut self, page: usize, field: TextFieldWidget) -> Result<ObjectRef>;

    /// Add a checkbox on `page`.
    fn add_checkbox(&mut self, page: usize, field: CheckboxWidget) -> Result<ObjectRef>;

    /// Add a combo box or list box on `page`.
    fn add_choice_field(&mut self, page: usize, field: ChoiceFieldWidget) -> Result<ObjectRef>;

    /// Add a push button on `page`.
    fn add_push_button(&mut self, page: usize, field: PushButtonWidget) -> Result<ObjectRef>;

    /// Add a radio group whose options may span pages.
    ///
    /// A group named like an existing radio group of an uploaded document
    /// extends that group.
    fn add_radio_group(&mut self, group: RadioButtonGroup) -> Result<ObjectRef>;

    /// Reserve an object number.
    fn allocate(&mut self) -> ObjectRef;

    /// Store an object under a reserved number.
    fn register_object(&mut self, reference: ObjectRef, object: Object);

    /// Append an annotation to a page's `/Annots`.
    fn attach_annotation(&mut self, page: usize, annotation: ObjectRef) -> Result<()>;

    /// Add a top-level field to the form's `/Fields`.
    fn register_field(&mut self, name: &str, field: ObjectRef) -> Result<()>;

    /// Add document-level signature flags.
    fn set_signature_flags(&mut self, flags: SignatureFlags);

    /// Serialize the document.
    fn save(&self) -> Result<Vec<u8>>;
}

#[derive(Debug)]
struct PageSlot {
    reference: ObjectRef,
    size: Size,
    annots: Vec<ObjectRef>,
}

#[derive(Debug)]
enum Base {
    Fresh { pages_root: ObjectRef },
    Incremental(SourceDocument),
}

/// A document being given an interactive form.
#[derive(Debug)]
pub struct FormDocument {
    config: PdfWriterConfig,
    base: Base,
    catalog_ref: ObjectRef,
    acroform_ref: ObjectRef,
    info_ref: ObjectRef,
    fonts: FormFonts,
    pages: Vec<PageSlot>,
    objects: BTreeMap<ObjectRef, Object>,
    next_id: u32,
    acroform: AcroFormBuilder,
    names: HashSet<String>,
}

impl FormDocument {
    /// A blank document with one page per entry of `page_sizes`.
    pub fn blank(config: PdfWriterConfig, page_sizes: &[Size]) -> Self {
        let mut next_id = 1;
        let mut alloc = || {
            let r = ObjectRef::new(next_id, 0);
            next_id += 1;
            r
        };

        let catalog_ref = alloc();
        let pages_root = alloc();
        let fonts = FormFonts {
            helvetica: alloc(),
            zapf_dingbats: alloc(),
        };
        let pages = page_sizes
            .iter()
            .map(|&size| PageSlot {
                reference: alloc(),
                size,
                annots: Vec::new(),
            })
            .collect();
        let acroform_ref = alloc();
        let info_ref = alloc();

        Self {
            config,
            base: Base::Fresh { pages_root },
            catalog_ref,
            acroform_ref,
            info_ref,
            fonts,
            pages,
            objects: BTreeMap::new(),
            next_id,
            acroform: AcroFormBuilder::new(),
            names: HashSet::new(),
        }
    }

    /// An uploaded document; new objects are numbered after its highest one.
    pub fn incremental(config: PdfWriterConfig, source: SourceDocument) -> Self {
        let mut next_id = source.max_object_number() + 1;
        let mut alloc = || {
            let r = ObjectRef::new(next_id, 0);
            next_id += 1;
            r
        };

        let (catalog_ref, _) = source.catalog();
        let acroform_ref = match source.acroform() {
            AcroFormLocation::Indirect(r, _) => *r,
            _ => alloc(),
        };
        let info_ref = alloc();
        let fonts = FormFonts {
            helvetica: alloc(),
            zapf_dingbats: alloc(),
        };
        let pages = source
            .pages()
            .iter()
            .map(|p| PageSlot {
                reference: p.reference,
                size: Size::new(p.width, p.height),
                annots: Vec::new(),
            })
            .collect();
        let names = source.field_names().into_iter().collect();

        Self {
            config,
            base: Base::Incremental(source),
            catalog_ref,
            acroform_ref,
            info_ref,
            fonts,
            pages,
            objects: BTreeMap::new(),
            next_id,
            acroform: AcroFormBuilder::new(),
            names,
        }
    }

    /// Whether saving appends an incremental update.
    pub fn is_incremental(&self) -> bool {
        matches!(self.base, Base::Incremental(_))
    }

    fn slot(&self, page: usize) -> Result<&PageSlot> {
        self.pages.get(page).ok_or(Error::PageOutOfRange {
            index: page,
            count: self.pages.len(),
        })
    }

    fn claim_name(&mut self, name: &str) -> Result<()> {
        if !self.names.insert(name.to_string()) {
            return Err(Error::FieldNameExists { name: name.to_string() });
        }
        Ok(())
    }

    /// Merged field/widget object for a single-widget field.
    fn add_widget_field(&mut self, page: usize, widget: &dyn FormFieldWidget) -> Result<ObjectRef> {
        let page_ref = self.slot(page)?.reference;
        self.claim_name(widget.field_name())?;

        let reference = self.allocate();
        let mut dict = widget.build_merged(page_ref);
        if let Some(appearances) = widget.toggle_appearances() {
            dict.insert("AP".to_string(), self.install_appearances(&appearances));
        }
        self.objects.insert(reference, Object::Dictionary(dict));
        self.pages[page].annots.push(reference);
        self.acroform.add_field(reference);

        log::debug!(
            "added {} field '{}' as {} on page {}",
            widget.field_type(),
            widget.field_name(),
            reference,
            page
        );
        Ok(reference)
    }

    /// Add option widgets to a radio group that already exists in the
    /// uploaded document. Returns `None` when there is no such group.
    fn extend_existing_group(&mut self, group: &RadioButtonGroup) -> Result<Option<ObjectRef>> {
        let Base::Incremental(source) = &self.base else {
            return Ok(None);
        };
        let Some(existing) = source.field(group.name()).filter(|f| f.is_radio_group()) else {
            return Ok(None);
        };
        let Some(parent) = existing.reference else {
            return Ok(None);
        };

        let mut parent_dict = match self.objects.get(&parent) {
            Some(obj) => obj.as_dict().cloned().unwrap_or_default(),
            None => source.resolve_dict(&Object::Reference(parent))?,
        };
        let mut kids = match parent_dict.get("Kids") {
            Some(k) => source.resolve(k)?.as_array().cloned().unwrap_or_default(),
            None => Vec::new(),
        };

        for kid in self.add_group_widgets(group, parent)? {
            kids.push(Object::Reference(kid));
        }
        parent_dict.insert("Kids".to_string(), Object::Array(kids));
        if let Some(value) = group.selected_value() {
            parent_dict.insert("V".to_string(), ObjectSerializer::name(value));
        }
        self.objects.insert(parent, Object::Dictionary(parent_dict));

        log::info!("extended existing radio group '{}' ({})", group.name(), parent);
        Ok(Some(parent))
    }

    fn add_group_widgets(&mut self, group: &RadioButtonGroup, parent: ObjectRef) -> Result<Vec<ObjectRef>> {
        let mut kids = Vec::with_capacity(group.options().len());
        for option in group.options() {
            let page_ref = self.slot(option.page)?.reference;
            let kid = self.allocate();
            let mut widget = option.build_widget_dict(page_ref, parent, group.is_selected(option));
            widget.insert("AP".to_string(), self.install_appearances(&option.appearances()));
            self.objects.insert(kid, Object::Dictionary(widget));
            self.pages[option.page].annots.push(kid);
            kids.push(kid);
        }
        Ok(kids)
    }

    /// Store the state streams and return the `/AP` dictionary naming them.
    fn install_appearances(&mut self, appearances: &ToggleAppearances) -> Object {
        let mut ap = Dict::new();
        for (kind, on, off) in appearances.streams() {
            let on_ref = self.allocate();
            let off_ref = self.allocate();
            self.objects.insert(on_ref, on);
            self.objects.insert(off_ref, off);
            ap.insert(
                kind.to_string(),
                ObjectSerializer::dict(vec![
                    (appearances.on_state(), ObjectSerializer::reference(on_ref)),
                    ("Off", ObjectSerializer::reference(off_ref)),
                ]),
            );
        }
        Object::Dictionary(ap)
    }

    fn info_object(&self) -> Result<Object> {
        let mut info = match &self.base {
            Base::Incremental(source) => match source.trailer().get("Info") {
                Some(obj) => source.resolve_dict(obj).unwrap_or_default(),
                None => Dict::new(),
            },
            Base::Fresh { .. } => Dict::new(),
        };
        if let Object::Dictionary(ours) = self.config.info_dict() {
            if info.contains_key("CreationDate") {
                info.extend(ours.into_iter().filter(|(k, _)| k != "CreationDate"));
            } else {
                info.extend(ours);
            }
        }
        Ok(Object::Dictionary(info))
    }

    fn write_common(&self, writer: &mut PdfFileWriter) -> Result<()> {
        writer.write_object(self.fonts.helvetica, &FormFonts::font_object("Helvetica"))?;
        writer.write_object(self.fonts.zapf_dingbats, &FormFonts::font_object("ZapfDingbats"))?;
        for (reference, obj) in &self.objects {
            writer.write_object(*reference, obj)?;
        }
        writer.write_object(self.info_ref, &self.info_object()?)?;
        Ok(())
    }

    fn save_fresh(&self, pages_root: ObjectRef) -> Result<Vec<u8>> {
        let mut writer = PdfFileWriter::fresh(&self.config.version)?;

        let mut catalog = ObjectSerializer::dict_map(vec![
            ("Type", ObjectSerializer::name("Catalog")),
            ("Pages", ObjectSerializer::reference(pages_root)),
            ("AcroForm", ObjectSerializer::reference(self.acroform_ref)),
        ]);
        if let Some(lang) = &self.config.language {
            catalog.insert("Lang".to_string(), ObjectSerializer::text(lang));
        }
        writer.write_object(self.catalog_ref, &Object::Dictionary(catalog))?;

        let pages_dict = ObjectSerializer::dict(vec![
            ("Type", ObjectSerializer::name("Pages")),
            (
                "Kids",
                ObjectSerializer::array(self.pages.iter().map(|p| ObjectSerializer::reference(p.reference)).collect()),
            ),
            ("Count", ObjectSerializer::integer(self.pages.len() as i64)),
        ]);
        writer.write_object(pages_root, &pages_dict)?;

        let resources = ObjectSerializer::dict(vec![(
            "Font",
            ObjectSerializer::dict(vec![("Helv", ObjectSerializer::reference(self.fonts.helvetica))]),
        )]);
        for slot in &self.pages {
            let mut page = ObjectSerializer::dict_map(vec![
                ("Type", ObjectSerializer::name("Page")),
                ("Parent", ObjectSerializer::reference(pages_root)),
                (
                    "MediaBox",
                    ObjectSerializer::rect(&crate::geometry::Rect::new(0.0, 0.0, slot.size.width, slot.size.height)),
                ),
                ("Resources", resources.clone()),
            ]);
            if !slot.annots.is_empty() {
                page.insert(
                    "Annots".to_string(),
                    ObjectSerializer::array(slot.annots.iter().copied().map(ObjectSerializer::reference).collect()),
                );
            }
            writer.write_object(slot.reference, &Object::Dictionary(page))?;
        }

        writer.write_object(self.acroform_ref, &Object::Dictionary(self.acroform.build(&self.fonts)))?;
        self.write_common(&mut writer)?;

        let digest = Object::String(writer.update_digest());
        let trailer = ObjectSerializer::dict_map(vec![
            ("Size", ObjectSerializer::integer(self.next_id as i64)),
            ("Root", ObjectSerializer::reference(self.catalog_ref)),
            ("Info", ObjectSerializer::reference(self.info_ref)),
            ("ID", ObjectSerializer::array(vec![digest.clone(), digest])),
        ]);
        writer.finish(trailer, true)
    }

    fn save_incremental(&self, source: &SourceDocument) -> Result<Vec<u8>> {
        let mut writer = PdfFileWriter::appending(source.bytes());

        for slot in self.pages.iter().filter(|s| !s.annots.is_empty()) {
            let mut page = source.resolve_dict(&Object::Reference(slot.reference))?;
            let mut annots = match page.get("Annots") {
                Some(a) => source.resolve(a)?.as_array().cloned().unwrap_or_default(),
                None => Vec::new(),
            };
            annots.extend(slot.annots.iter().copied().map(Object::Reference));
            page.insert("Annots".to_string(), Object::Array(annots));
            writer.write_object(slot.reference, &Object::Dictionary(page))?;
        }

        let (_, catalog) = source.catalog();
        let mut catalog = catalog.clone();
        catalog.insert("AcroForm".to_string(), Object::Reference(self.acroform_ref));
        if let Some(lang) = &self.config.language {
            catalog.insert("Lang".to_string(), ObjectSerializer::text(lang));
        }
        writer.write_object(self.catalog_ref, &Object::Dictionary(catalog))?;

        let existing = match source.acroform() {
            AcroFormLocation::Absent => Dict::new(),
            AcroFormLocation::Inline(d) | AcroFormLocation::Indirect(_, d) => directify_form(source, d.clone())?,
        };
        writer.write_object(
            self.acroform_ref,
            &Object::Dictionary(self.acroform.merge_into(existing, &self.fonts)),
        )?;
        self.write_common(&mut writer)?;

        let digest = Object::String(writer.update_digest());
        let original_id = source
            .trailer()
            .get("ID")
            .and_then(Object::as_array)
            .and_then(|ids| ids.first().cloned())
            .unwrap_or_else(|| digest.clone());
        let size = self.next_id.max(source.max_object_number() + 1);
        let mut trailer = ObjectSerializer::dict_map(vec![
            ("Size", ObjectSerializer::integer(size as i64)),
            ("Root", ObjectSerializer::reference(self.catalog_ref)),
            ("Info", ObjectSerializer::reference(self.info_ref)),
            ("ID", ObjectSerializer::array(vec![original_id, digest])),
        ]);

        let full_table = source.was_reconstructed();
        if full_table {
            log::warn!("original cross-reference data was rebuilt, writing a complete table");
            writer.adopt_existing(source.direct_objects());
        } else {
            trailer.insert("Prev".to_string(), ObjectSerializer::integer(source.startxref() as i64));
        }
        writer.finish(trailer, full_table)
    }
}

/// Resolve the parts of an AcroForm dictionary the merge rewrites.
fn directify_form(source: &SourceDocument, mut form: Dict) -> Result<Dict> {
    if let Some(fields) = form.get("Fields") {
        let resolved = source.resolve(fields)?;
        form.insert("Fields".to_string(), resolved);
    }
    if let Some(dr) = form.get("DR") {
        let mut dr = source.resolve_dict(dr)?;
        if let Some(font) = dr.get("Font") {
            let font = source.resolve_dict(font)?;
            dr.insert("Font".to_string(), Object::Dictionary(font));
        }
        form.insert("DR".to_string(), Object::Dictionary(dr));
    }
    Ok(form)
}

impl FormAuthoring for FormDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, page: usize) -> Result<Size> {
        Ok(self.slot(page)?.size)
    }

    fn page_ref(&self, page: usize) -> Result<ObjectRef> {
        Ok(self.slot(page)?.reference)
    }

    fn add_text_field(&mut self, page: usize, field: TextFieldWidget) -> Result<ObjectRef> {
        self.add_widget_field(page, &field)
    }

    fn add_checkbox(&mut self, page: usize, field: CheckboxWidget) -> Result<ObjectRef> {
        self.add_widget_field(page, &field)
    }

    fn add_choice_field(&mut self, page: usize, field: ChoiceFieldWidget) -> Result<ObjectRef> {
        self.add_widget_field(page, &field)
    }

    fn add_push_button(&mut self, page: usize, field: PushButtonWidget) -> Result<ObjectRef> {
        self.add_widget_field(page, &field)
    }

    fn add_radio_group(&mut self, group: RadioButtonGroup) -> Result<ObjectRef> {
        if group.options().is_empty() {
            return Err(Error::InvalidPdf(format!("radio group '{}' has no options", group.name())));
        }
        for option in group.options() {
            self.slot(option.page)?;
        }

        if self.names.contains(group.name()) {
            return match self.extend_existing_group(&group)? {
                Some(parent) => Ok(parent),
                None => Err(Error::FieldNameExists {
                    name: group.name().to_string(),
                }),
            };
        }

        self.claim_name(group.name())?;
        let parent = self.allocate();
        let kids = self.add_group_widgets(&group, parent)?;
        self.objects
            .insert(parent, Object::Dictionary(group.build_parent_dict(&kids)));
        self.acroform.add_field(parent);

        log::debug!("added radio group '{}' with {} options", group.name(), kids.len());
        Ok(parent)
    }

    fn allocate(&mut self) -> ObjectRef {
        let r = ObjectRef::new(self.next_id, 0);
        self.next_id += 1;
        r
    }

    fn register_object(&mut self, reference: ObjectRef, object: Object) {
        self.objects.insert(reference, object);
    }

    fn attach_annotation(&mut self, page: usize, annotation: ObjectRef) -> Result<()> {
        self.slot(page)?;
        self.pages[page].annots.push(annotation);
        Ok(())
    }

    fn register_field(&mut self, name: &str, field: ObjectRef) -> Result<()> {
        self.claim_name(name)?;
        self.acroform.add_field(field);
        Ok(())
    }

    fn set_signature_flags(&mut self, flags: SignatureFlags) {
        self.acroform.add_sig_flags(flags);
    }

    fn save(&self) -> Result<Vec<u8>> {
        let bytes = match &self.base {
            Base::Fresh { pages_root } => self.save_fresh(*pages_root)?,
            Base::Incremental(source) => self.save_incremental(source)?,
        };
        log::info!(
            "saved form with {} fields ({} bytes, {})",
            self.acroform.fields().len(),
            bytes.len(),
            if self.is_incremental() { "incremental update" } else { "full write" }
        );
        Ok(bytes)
    }
}
