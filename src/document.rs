//! Uploaded document loading.
//!
//! [`SourceDocument`] reads just enough of an uploaded PDF for the designer:
//! page sizes, the interactive form's existing field names and radio groups,
//! and the structural references the incremental writer needs to append an
//! update after the original bytes.

use crate::error::{Error, Result};
use crate::object::{Dict, Object, ObjectRef};
use crate::parser::{parse_indirect_at, parse_object};
use crate::writer::form_fields::ButtonFieldFlags;
use crate::xref::{self, CrossRefTable, XRefEntry};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Maximum reference chain followed by [`SourceDocument::resolve`].
const MAX_RESOLVE_DEPTH: usize = 32;

/// US Letter, used when a page has no usable MediaBox.
const FALLBACK_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// One page of an uploaded document.
#[derive(Debug, Clone)]
pub struct SourcePage {
    /// Page object reference
    pub reference: ObjectRef,
    /// Width in points (MediaBox, inherited if needed)
    pub width: f32,
    /// Height in points
    pub height: f32,
}

/// Field type of an existing terminal field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingFieldType {
    /// `/FT /Tx`
    Text,
    /// `/FT /Btn`
    Button,
    /// `/FT /Ch`
    Choice,
    /// `/FT /Sig`
    Signature,
    /// No `/FT` anywhere in the ancestry
    Unknown,
}

/// A terminal field found in the uploaded document's AcroForm.
#[derive(Debug, Clone)]
pub struct ExistingField {
    /// Fully qualified name (`parent.child`)
    pub name: String,
    /// Field type, inherited from ancestors when absent
    pub field_type: ExistingFieldType,
    /// Field flags, inherited from ancestors when absent
    pub flags: u32,
    /// Reference to the field dictionary, when it is an indirect object
    pub reference: Option<ObjectRef>,
}

impl ExistingField {
    /// Whether this field is a radio button group.
    pub fn is_radio_group(&self) -> bool {
        self.field_type == ExistingFieldType::Button
            && ButtonFieldFlags::from_bits_truncate(self.flags).contains(ButtonFieldFlags::RADIO)
    }
}

/// Where the document keeps its AcroForm dictionary.
#[derive(Debug, Clone)]
pub enum AcroFormLocation {
    /// No interactive form yet
    Absent,
    /// Inline in the catalog
    Inline(Dict),
    /// Separate indirect object
    Indirect(ObjectRef, Dict),
}

/// A parsed uploaded PDF.
#[derive(Debug)]
pub struct SourceDocument {
    data: Vec<u8>,
    version: String,
    xref: CrossRefTable,
    startxref: usize,
    catalog_ref: ObjectRef,
    catalog: Dict,
    pages: Vec<SourcePage>,
    acroform: AcroFormLocation,
    fields: Vec<ExistingField>,
    object_streams: RefCell<HashMap<u32, Vec<Object>>>,
}

impl SourceDocument {
    /// Parse an uploaded document.
    ///
    /// Fails on a missing header, an unreadable structure or encryption.
    /// A broken cross-reference table is rebuilt by scanning the file.
    pub fn load(data: impl Into<Vec<u8>>) -> Result<Self> {
        let data = data.into();
        let version = read_header(&data)?;

        let (xref, startxref) = match xref::load(&data) {
            Ok(table) => {
                let start = xref::find_startxref(&data)?;
                (table, start)
            },
            Err(e) => {
                log::warn!("cross-reference data unreadable ({}), scanning objects", e);
                (xref::reconstruct(&data)?, 0)
            },
        };

        if xref.trailer().contains_key("Encrypt") {
            return Err(Error::Unsupported("encrypted documents cannot be edited".to_string()));
        }

        let catalog_ref = xref
            .trailer()
            .get("Root")
            .and_then(Object::as_reference)
            .ok_or_else(|| Error::InvalidPdf("trailer has no /Root".to_string()))?;

        let mut doc = Self {
            data,
            version,
            xref,
            startxref,
            catalog_ref,
            catalog: Dict::new(),
            pages: Vec::new(),
            acroform: AcroFormLocation::Absent,
            fields: Vec::new(),
            object_streams: RefCell::new(HashMap::new()),
        };

        doc.catalog = doc
            .get(catalog_ref)?
            .as_dict()
            .cloned()
            .ok_or_else(|| Error::InvalidPdf("catalog is not a dictionary".to_string()))?;
        doc.pages = doc.collect_pages()?;
        if doc.pages.is_empty() {
            return Err(Error::InvalidPdf("document has no pages".to_string()));
        }
        doc.acroform = doc.locate_acroform()?;
        doc.fields = doc.collect_fields()?;

        log::info!(
            "loaded PDF {} with {} pages and {} existing fields",
            doc.version,
            doc.pages.len(),
            doc.fields.len()
        );
        Ok(doc)
    }

    /// Original bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Header version, e.g. "1.7".
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Offset of the newest cross-reference section, or 0 when rebuilt.
    pub fn startxref(&self) -> usize {
        self.startxref
    }

    /// Whether the cross-reference data had to be rebuilt by scanning.
    pub fn was_reconstructed(&self) -> bool {
        self.startxref == 0
    }

    /// Every object stored directly in the file, as `(ref, offset)`.
    ///
    /// Used to write a complete cross-reference section when the original
    /// one had to be rebuilt.
    pub fn direct_objects(&self) -> Vec<(ObjectRef, usize)> {
        let mut out: Vec<(ObjectRef, usize)> = (0..=self.xref.max_object_number())
            .filter_map(|id| match self.xref.get(id) {
                Some(XRefEntry::Uncompressed { offset, gen }) => Some((ObjectRef::new(id, gen), offset)),
                _ => None,
            })
            .collect();
        out.sort();
        out
    }

    /// Newest trailer dictionary.
    pub fn trailer(&self) -> &Dict {
        self.xref.trailer()
    }

    /// Catalog reference and dictionary.
    pub fn catalog(&self) -> (ObjectRef, &Dict) {
        (self.catalog_ref, &self.catalog)
    }

    /// Highest object number in use.
    pub fn max_object_number(&self) -> u32 {
        self.xref.max_object_number()
    }

    /// Pages in document order.
    pub fn pages(&self) -> &[SourcePage] {
        &self.pages
    }

    /// AcroForm placement.
    pub fn acroform(&self) -> &AcroFormLocation {
        &self.acroform
    }

    /// Terminal fields of the existing interactive form.
    pub fn fields(&self) -> &[ExistingField] {
        &self.fields
    }

    /// Names of every existing terminal field.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Names of existing radio groups.
    pub fn radio_group_names(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.is_radio_group())
            .map(|f| f.name.clone())
            .collect()
    }

    /// Existing field by fully qualified name.
    pub fn field(&self, name: &str) -> Option<&ExistingField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Load an indirect object.
    pub fn get(&self, r: ObjectRef) -> Result<Object> {
        match self.xref.get(r.id) {
            Some(XRefEntry::Uncompressed { offset, .. }) => {
                let (found, obj) = parse_indirect_at(&self.data, offset)?;
                if found.id != r.id {
                    return Err(Error::ParseError {
                        offset,
                        reason: format!("expected object {} but found {}", r, found),
                    });
                }
                Ok(obj)
            },
            Some(XRefEntry::Compressed { stream, index }) => self.get_compressed(r, stream, index),
            Some(XRefEntry::Free) | None => Err(Error::ObjectNotFound(r.id, r.gen)),
        }
    }

    fn get_compressed(&self, r: ObjectRef, stream: u32, index: usize) -> Result<Object> {
        if let Some(objects) = self.object_streams.borrow().get(&stream) {
            return objects.get(index).cloned().ok_or(Error::ObjectNotFound(r.id, r.gen));
        }

        let container = self.get(ObjectRef::new(stream, 0))?;
        let objects = parse_object_stream(&container)?;
        let found = objects.get(index).cloned();
        self.object_streams.borrow_mut().insert(stream, objects);
        found.ok_or(Error::ObjectNotFound(r.id, r.gen))
    }

    /// Follow references until a direct object is reached.
    pub fn resolve(&self, obj: &Object) -> Result<Object> {
        let mut current = obj.clone();
        for _ in 0..MAX_RESOLVE_DEPTH {
            match current {
                Object::Reference(r) => current = self.get(r)?,
                direct => return Ok(direct),
            }
        }
        Err(Error::InvalidPdf("reference chain too deep".to_string()))
    }

    /// Resolve `obj` and require a dictionary (streams yield their dictionary).
    pub fn resolve_dict(&self, obj: &Object) -> Result<Dict> {
        let resolved = self.resolve(obj)?;
        resolved.as_dict().cloned().ok_or_else(|| Error::InvalidObjectType {
            expected: "Dictionary".to_string(),
            found: resolved.type_name().to_string(),
        })
    }

    fn collect_pages(&self) -> Result<Vec<SourcePage>> {
        let root = self
            .catalog
            .get("Pages")
            .and_then(Object::as_reference)
            .ok_or_else(|| Error::InvalidPdf("catalog has no /Pages reference".to_string()))?;

        let mut pages = Vec::new();
        let mut visited = HashSet::new();
        self.walk_pages(root, None, &mut visited, &mut pages)?;
        Ok(pages)
    }

    fn walk_pages(
        &self,
        node_ref: ObjectRef,
        inherited_box: Option<(f32, f32)>,
        visited: &mut HashSet<ObjectRef>,
        pages: &mut Vec<SourcePage>,
    ) -> Result<()> {
        if !visited.insert(node_ref) {
            return Err(Error::CircularReference(node_ref));
        }

        let node = self.resolve_dict(&Object::Reference(node_ref))?;
        let media_box = match node.get("MediaBox") {
            Some(b) => self.media_box_size(b).or(inherited_box),
            None => inherited_box,
        };

        let node_type = node.get("Type").and_then(Object::as_name);
        let is_tree_node = node_type == Some("Pages") || (node_type.is_none() && node.contains_key("Kids"));

        match is_tree_node {
            true => {
                let kids = node.get("Kids").map(|k| self.resolve(k)).transpose()?;
                for kid in kids.as_ref().and_then(Object::as_array).into_iter().flatten() {
                    if let Some(kid_ref) = kid.as_reference() {
                        self.walk_pages(kid_ref, media_box, visited, pages)?;
                    }
                }
            },
            false => {
                let (width, height) = media_box.unwrap_or_else(|| {
                    log::warn!("page {} has no MediaBox, assuming US Letter", node_ref);
                    FALLBACK_PAGE_SIZE
                });
                pages.push(SourcePage {
                    reference: node_ref,
                    width,
                    height,
                });
            },
        }
        Ok(())
    }

    fn media_box_size(&self, obj: &Object) -> Option<(f32, f32)> {
        let resolved = self.resolve(obj).ok()?;
        let values: Vec<f64> = resolved.as_array()?.iter().filter_map(Object::as_number).collect();
        if values.len() != 4 {
            return None;
        }
        let width = (values[2] - values[0]).abs() as f32;
        let height = (values[3] - values[1]).abs() as f32;
        (width > 0.0 && height > 0.0).then_some((width, height))
    }

    fn locate_acroform(&self) -> Result<AcroFormLocation> {
        Ok(match self.catalog.get("AcroForm") {
            None => AcroFormLocation::Absent,
            Some(Object::Reference(r)) => AcroFormLocation::Indirect(*r, self.resolve_dict(&Object::Reference(*r))?),
            Some(Object::Dictionary(d)) => AcroFormLocation::Inline(d.clone()),
            Some(other) => {
                log::warn!("ignoring malformed /AcroForm entry of type {}", other.type_name());
                AcroFormLocation::Absent
            },
        })
    }

    fn collect_fields(&self) -> Result<Vec<ExistingField>> {
        let form = match &self.acroform {
            AcroFormLocation::Absent => return Ok(Vec::new()),
            AcroFormLocation::Inline(d) | AcroFormLocation::Indirect(_, d) => d,
        };

        let roots = form.get("Fields").map(|f| self.resolve(f)).transpose()?;
        let mut fields = Vec::new();
        let mut visited = HashSet::new();
        for root in roots.as_ref().and_then(Object::as_array).into_iter().flatten() {
            self.walk_field(root, None, None, 0, &mut visited, &mut fields)?;
        }
        Ok(fields)
    }

    fn walk_field(
        &self,
        node: &Object,
        parent_name: Option<&str>,
        inherited: Option<(ExistingFieldType, u32)>,
        depth: usize,
        visited: &mut HashSet<ObjectRef>,
        out: &mut Vec<ExistingField>,
    ) -> Result<()> {
        if depth > MAX_RESOLVE_DEPTH {
            return Err(Error::InvalidPdf("field hierarchy too deep".to_string()));
        }
        let reference = node.as_reference();
        if let Some(r) = reference {
            if !visited.insert(r) {
                return Ok(());
            }
        }

        let dict = self.resolve_dict(node)?;
        let partial = dict.get("T").and_then(Object::as_text);

        let field_type = match dict.get("FT").and_then(Object::as_name) {
            Some("Tx") => ExistingFieldType::Text,
            Some("Btn") => ExistingFieldType::Button,
            Some("Ch") => ExistingFieldType::Choice,
            Some("Sig") => ExistingFieldType::Signature,
            _ => inherited.map(|(t, _)| t).unwrap_or(ExistingFieldType::Unknown),
        };
        let flags = dict
            .get("Ff")
            .and_then(Object::as_integer)
            .map(|f| f as u32)
            .or(inherited.map(|(_, f)| f))
            .unwrap_or(0);

        // A kid without /T is a widget annotation of its parent, not a field.
        let Some(partial) = partial else {
            return Ok(());
        };
        let name = match parent_name {
            Some(parent) => format!("{}.{}", parent, partial),
            None => partial,
        };

        let kids = dict.get("Kids").map(|k| self.resolve(k)).transpose()?;
        let kids: Vec<Object> = kids.and_then(|k| k.as_array().cloned()).unwrap_or_default();
        let mut has_field_kids = false;
        for kid in &kids {
            let kid_dict = self.resolve_dict(kid)?;
            if kid_dict.contains_key("T") {
                has_field_kids = true;
                self.walk_field(kid, Some(&name), Some((field_type, flags)), depth + 1, visited, out)?;
            }
        }

        if !has_field_kids {
            out.push(ExistingField {
                name,
                field_type,
                flags,
                reference,
            });
        }
        Ok(())
    }
}

fn read_header(data: &[u8]) -> Result<String> {
    // Some producers put junk before the header; PDF readers accept up to 1 KiB.
    let window = &data[..data.len().min(1024)];
    let pos = window
        .windows(5)
        .position(|w| w == b"%PDF-")
        .ok_or_else(|| Error::InvalidHeader(String::from_utf8_lossy(&data[..data.len().min(8)]).to_string()))?;
    let version: String = window[pos + 5..]
        .iter()
        .take_while(|b| b.is_ascii_digit() || **b == b'.')
        .map(|&b| b as char)
        .collect();
    Ok(version)
}

/// Parse an object stream (`/Type /ObjStm`) into its objects, in index order.
fn parse_object_stream(stream: &Object) -> Result<Vec<Object>> {
    let dict = stream
        .as_dict()
        .ok_or_else(|| Error::InvalidPdf("object stream is not a stream".to_string()))?;
    let n = dict
        .get("N")
        .and_then(Object::as_integer)
        .ok_or_else(|| Error::InvalidPdf("object stream missing /N".to_string()))? as usize;
    let first = dict
        .get("First")
        .and_then(Object::as_integer)
        .ok_or_else(|| Error::InvalidPdf("object stream missing /First".to_string()))? as usize;

    let data = stream.decode_stream_data()?;
    let header = data
        .get(..first)
        .ok_or_else(|| Error::InvalidPdf("object stream shorter than /First".to_string()))?;

    let numbers: Vec<usize> = String::from_utf8_lossy(header)
        .split_ascii_whitespace()
        .filter_map(|s| s.parse().ok())
        .collect();

    let mut objects = Vec::with_capacity(n);
    for pair in numbers.chunks_exact(2).take(n) {
        let offset = first + pair[1];
        let obj = data
            .get(offset..)
            .and_then(|slice| parse_object(slice).ok())
            .map(|(_, obj)| obj)
            .unwrap_or_else(|| {
                log::warn!("object {} in object stream is unreadable", pair[0]);
                Object::Null
            });
        objects.push(obj);
    }
    Ok(objects)
}
