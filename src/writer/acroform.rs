//! The document-level AcroForm dictionary (ISO 32000-1 §12.7.2).
//!
//! Fresh documents get a new dictionary from [`AcroFormBuilder::build`];
//! uploaded documents keep theirs and have the new fields merged in with
//! [`AcroFormBuilder::merge_into`].

use super::form_fields::SignatureFlags;
use super::object_serializer::ObjectSerializer;
use crate::object::{Dict, Object, ObjectRef};

/// Default appearance for fields without their own `/DA`.
const DEFAULT_APPEARANCE: &str = "/Helv 0 Tf 0 g";

/// Font objects referenced from the form's default resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormFonts {
    /// Helvetica, resource name `Helv`
    pub helvetica: ObjectRef,
    /// ZapfDingbats, resource name `ZaDb`
    pub zapf_dingbats: ObjectRef,
}

impl FormFonts {
    /// A standard 14 font dictionary.
    pub fn font_object(base_font: &str) -> Object {
        let mut entries = vec![
            ("Type", ObjectSerializer::name("Font")),
            ("Subtype", ObjectSerializer::name("Type1")),
            ("BaseFont", ObjectSerializer::name(base_font)),
        ];
        if base_font != "ZapfDingbats" {
            entries.push(("Encoding", ObjectSerializer::name("WinAnsiEncoding")));
        }
        ObjectSerializer::dict(entries)
    }

    fn entries(&self) -> [(&'static str, ObjectRef); 2] {
        [("Helv", self.helvetica), ("ZaDb", self.zapf_dingbats)]
    }
}

/// Builder for the AcroForm dictionary.
#[derive(Debug, Clone)]
pub struct AcroFormBuilder {
    fields: Vec<ObjectRef>,
    need_appearances: bool,
    sig_flags: SignatureFlags,
    default_appearance: String,
}

impl Default for AcroFormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AcroFormBuilder {
    /// Create a builder. Viewers are asked to regenerate appearances since
    /// no appearance streams are written.
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            need_appearances: true,
            sig_flags: SignatureFlags::empty(),
            default_appearance: DEFAULT_APPEARANCE.to_string(),
        }
    }

    /// Register a top-level field.
    pub fn add_field(&mut self, field_ref: ObjectRef) {
        if !self.fields.contains(&field_ref) {
            self.fields.push(field_ref);
        }
    }

    /// Add signature flags.
    pub fn add_sig_flags(&mut self, flags: SignatureFlags) {
        self.sig_flags |= flags;
    }

    /// Registered fields.
    pub fn fields(&self) -> &[ObjectRef] {
        &self.fields
    }

    /// Current signature flags.
    pub fn sig_flags(&self) -> SignatureFlags {
        self.sig_flags
    }

    /// Build a new AcroForm dictionary.
    pub fn build(&self, fonts: &FormFonts) -> Dict {
        let mut dict = Dict::new();
        dict.insert(
            "Fields".to_string(),
            ObjectSerializer::array(self.fields.iter().copied().map(ObjectSerializer::reference).collect()),
        );
        dict.insert("DA".to_string(), ObjectSerializer::string(&self.default_appearance));

        let font_dict: Dict = fonts
            .entries()
            .iter()
            .map(|(name, r)| (name.to_string(), Object::Reference(*r)))
            .collect();
        dict.insert(
            "DR".to_string(),
            ObjectSerializer::dict(vec![("Font", Object::Dictionary(font_dict))]),
        );

        self.apply_flags(&mut dict);
        dict
    }

    /// Merge into an existing AcroForm dictionary.
    ///
    /// `Fields` and `DR /Font` must already be direct in `existing`; new
    /// fields are appended after the old ones, fonts are added only when
    /// their resource name is free, and signature flags are OR-ed.
    pub fn merge_into(&self, mut existing: Dict, fonts: &FormFonts) -> Dict {
        let mut fields = existing
            .remove("Fields")
            .and_then(|f| match f {
                Object::Array(items) => Some(items),
                _ => None,
            })
            .unwrap_or_default();
        for r in &self.fields {
            let reference = Object::Reference(*r);
            if !fields.contains(&reference) {
                fields.push(reference);
            }
        }
        existing.insert("Fields".to_string(), Object::Array(fields));

        let mut dr = match existing.remove("DR") {
            Some(Object::Dictionary(d)) => d,
            _ => Dict::new(),
        };
        let mut font_dict = match dr.remove("Font") {
            Some(Object::Dictionary(d)) => d,
            _ => Dict::new(),
        };
        for (name, r) in fonts.entries() {
            font_dict.entry(name.to_string()).or_insert(Object::Reference(r));
        }
        dr.insert("Font".to_string(), Object::Dictionary(font_dict));
        existing.insert("DR".to_string(), Object::Dictionary(dr));

        existing
            .entry("DA".to_string())
            .or_insert_with(|| ObjectSerializer::string(&self.default_appearance));

        let old_flags = existing
            .get("SigFlags")
            .and_then(Object::as_integer)
            .map(|f| SignatureFlags::from_bits_truncate(f as u32))
            .unwrap_or_default();
        let mut merged = self.clone();
        merged.sig_flags |= old_flags;
        merged.apply_flags(&mut existing);
        existing
    }

    fn apply_flags(&self, dict: &mut Dict) {
        if self.need_appearances {
            dict.insert("NeedAppearances".to_string(), Object::Boolean(true));
        }
        if !self.sig_flags.is_empty() {
            dict.insert("SigFlags".to_string(), ObjectSerializer::integer(self.sig_flags.bits() as i64));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fonts() -> FormFonts {
        FormFonts {
            helvetica: ObjectRef::new(3, 0),
            zapf_dingbats: ObjectRef::new(4, 0),
        }
    }

    #[test]
    fn test_build_fresh_dictionary() {
        let mut acroform = AcroFormBuilder::new();
        acroform.add_field(ObjectRef::new(10, 0));
        acroform.add_field(ObjectRef::new(10, 0));

        let dict = acroform.build(&fonts());
        assert_eq!(dict.get("Fields").and_then(Object::as_array).map(Vec::len), Some(1));
        assert_eq!(dict.get("NeedAppearances"), Some(&Object::Boolean(true)));
        assert!(!dict.contains_key("SigFlags"));

        let dr = dict.get("DR").and_then(Object::as_dict).unwrap();
        let font = dr.get("Font").and_then(Object::as_dict).unwrap();
        assert_eq!(font.get("ZaDb"), Some(&Object::Reference(ObjectRef::new(4, 0))));
    }

    #[test]
    fn test_signature_flags() {
        let mut acroform = AcroFormBuilder::new();
        acroform.add_sig_flags(SignatureFlags::SIGNATURES_EXIST);
        acroform.add_sig_flags(SignatureFlags::APPEND_ONLY);
        let dict = acroform.build(&fonts());
        assert_eq!(dict.get("SigFlags").and_then(Object::as_integer), Some(3));
    }

    #[test]
    fn test_merge_keeps_existing_fields_and_fonts() {
        let mut existing = Dict::new();
        existing.insert("Fields".to_string(), Object::Array(vec![Object::Reference(ObjectRef::new(20, 0))]));
        let mut font = Dict::new();
        font.insert("Helv".to_string(), Object::Reference(ObjectRef::new(21, 0)));
        existing.insert("DR".to_string(), ObjectSerializer::dict(vec![("Font", Object::Dictionary(font))]));
        existing.insert("SigFlags".to_string(), Object::Integer(2));

        let mut acroform = AcroFormBuilder::new();
        acroform.add_field(ObjectRef::new(30, 0));
        acroform.add_sig_flags(SignatureFlags::SIGNATURES_EXIST);
        let merged = acroform.merge_into(existing, &fonts());

        let fields = merged.get("Fields").and_then(Object::as_array).unwrap();
        assert_eq!(
            fields,
            &vec![Object::Reference(ObjectRef::new(20, 0)), Object::Reference(ObjectRef::new(30, 0))]
        );
        let font = merged
            .get("DR")
            .and_then(Object::as_dict)
            .and_then(|dr| dr.get("Font"))
            .and_then(Object::as_dict)
            .unwrap();
        assert_eq!(font.get("Helv"), Some(&Object::Reference(ObjectRef::new(21, 0))));
        assert_eq!(font.get("ZaDb"), Some(&Object::Reference(ObjectRef::new(4, 0))));
        assert_eq!(merged.get("SigFlags").and_then(Object::as_integer), Some(3));
    }

    #[test]
    fn test_zapf_dingbats_has_no_encoding() {
        let font = FormFonts::font_object("ZapfDingbats");
        assert!(!font.as_dict().unwrap().contains_key("Encoding"));
        let helv = FormFonts::font_object("Helvetica");
        assert!(helv.as_dict().unwrap().contains_key("Encoding"));
    }
}
