//! PDF object serialization.
//!
//! Turns [`Object`] values back into PDF syntax. Dictionary keys are written
//! in sorted order so identical documents serialize to identical bytes,
//! which the trailer `/ID` digest relies on.

use crate::geometry::Rect;
use crate::object::{encode_text_string, Dict, Object, ObjectRef};
use std::io::Write;

/// Serializer for PDF objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectSerializer {
    /// Whether to use compact formatting (minimal whitespace)
    compact: bool,
}

impl ObjectSerializer {
    /// Create a serializer that puts each dictionary entry on its own line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compact serializer (minimal whitespace).
    pub fn compact() -> Self {
        Self { compact: true }
    }

    /// Serialize an object to bytes.
    pub fn serialize(&self, obj: &Object) -> Vec<u8> {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_object(&mut buf, obj);
        buf
    }

    /// Serialize an object to a string (for debugging and tests).
    pub fn serialize_to_string(&self, obj: &Object) -> String {
        String::from_utf8_lossy(&self.serialize(obj)).into_owned()
    }

    /// Serialize an indirect object definition.
    ///
    /// Format: `{id} {gen} obj\n{object}\nendobj\n`
    pub fn serialize_indirect(&self, reference: ObjectRef, obj: &Object) -> Vec<u8> {
        let mut buf = Vec::new();
        let _ = self.write_indirect(&mut buf, reference, obj);
        buf
    }

    /// Write an indirect object definition to `w`.
    pub fn write_indirect<W: Write>(
        &self,
        w: &mut W,
        reference: ObjectRef,
        obj: &Object,
    ) -> std::io::Result<()> {
        writeln!(w, "{} {} obj", reference.id, reference.gen)?;
        self.write_object(w, obj)?;
        write!(w, "\nendobj\n")
    }

    /// Write a direct object to `w`.
    pub fn write_object<W: Write>(&self, w: &mut W, obj: &Object) -> std::io::Result<()> {
        match obj {
            Object::Null => write!(w, "null"),
            Object::Boolean(b) => write!(w, "{}", b),
            Object::Integer(i) => write!(w, "{}", i),
            Object::Real(r) => write_real(w, *r),
            Object::String(s) => write_string(w, s),
            Object::Name(n) => write_name(w, n),
            Object::Array(arr) => {
                write!(w, "[")?;
                for (i, item) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(w, " ")?;
                    }
                    self.write_object(w, item)?;
                }
                write!(w, "]")
            },
            Object::Dictionary(dict) => self.write_dictionary(w, dict),
            Object::Stream { dict, data } => {
                let mut dict = dict.clone();
                dict.insert("Length".to_string(), Object::Integer(data.len() as i64));
                self.write_dictionary(w, &dict)?;
                write!(w, "\nstream\n")?;
                w.write_all(data)?;
                write!(w, "\nendstream")
            },
            Object::Reference(r) => write!(w, "{} {} R", r.id, r.gen),
        }
    }

    fn write_dictionary<W: Write>(&self, w: &mut W, dict: &Dict) -> std::io::Result<()> {
        write!(w, "<<")?;

        let mut entries: Vec<_> = dict.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        for (key, value) in entries {
            if self.compact {
                write!(w, " ")?;
            } else {
                write!(w, "\n  ")?;
            }
            write_name(w, key)?;
            write!(w, " ")?;
            self.write_object(w, value)?;
        }

        if self.compact {
            write!(w, " >>")
        } else {
            if !dict.is_empty() {
                writeln!(w)?;
            }
            write!(w, ">>")
        }
    }
}

fn write_real<W: Write>(w: &mut W, value: f64) -> std::io::Result<()> {
    write!(w, "{}", format_real(value))
}

/// Reals keep at most five decimals with trailing zeros trimmed.
pub(crate) fn format_real(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    if value.fract() == 0.0 {
        return (value as i64).to_string();
    }
    let formatted = format!("{:.5}", value);
    match formatted.trim_end_matches('0').trim_end_matches('.') {
        "-0" | "" => "0".to_string(),
        t => t.to_string(),
    }
}

/// Literal syntax for printable ASCII, hex syntax otherwise.
fn write_string<W: Write>(w: &mut W, data: &[u8]) -> std::io::Result<()> {
    let printable = data
        .iter()
        .all(|&b| matches!(b, b'\n' | b'\r' | b'\t' | 0x20..=0x7E));

    if !printable {
        write!(w, "<")?;
        for byte in data {
            write!(w, "{:02X}", byte)?;
        }
        return write!(w, ">");
    }

    write!(w, "(")?;
    for &byte in data {
        match byte {
            b'(' => write!(w, "\\(")?,
            b')' => write!(w, "\\)")?,
            b'\\' => write!(w, "\\\\")?,
            b'\n' => write!(w, "\\n")?,
            b'\r' => write!(w, "\\r")?,
            b'\t' => write!(w, "\\t")?,
            _ => w.write_all(&[byte])?,
        }
    }
    write!(w, ")")
}

/// Regular characters pass through; delimiters, whitespace and non-ASCII
/// bytes become `#xx`.
fn write_name<W: Write>(w: &mut W, name: &str) -> std::io::Result<()> {
    write!(w, "/")?;
    for byte in name.bytes() {
        let regular = (0x21..=0x7E).contains(&byte)
            && !matches!(byte, b'#' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%');
        if regular {
            w.write_all(&[byte])?;
        } else {
            write!(w, "#{:02X}", byte)?;
        }
    }
    Ok(())
}

/// Helper functions for building PDF objects.
impl ObjectSerializer {
    /// Create a Name object.
    pub fn name(s: &str) -> Object {
        Object::Name(s.to_string())
    }

    /// Create a byte String object from a Rust string.
    pub fn string(s: &str) -> Object {
        Object::String(s.as_bytes().to_vec())
    }

    /// Create a text string, UTF-16BE encoded when it is not plain ASCII.
    pub fn text(s: &str) -> Object {
        Object::String(encode_text_string(s))
    }

    /// Create an Integer object.
    pub fn integer(i: i64) -> Object {
        Object::Integer(i)
    }

    /// Create a Real object.
    pub fn real(r: f64) -> Object {
        Object::Real(r)
    }

    /// Create a Boolean object.
    pub fn boolean(b: bool) -> Object {
        Object::Boolean(b)
    }

    /// Create an Array object.
    pub fn array(items: Vec<Object>) -> Object {
        Object::Array(items)
    }

    /// Create a Dictionary object.
    pub fn dict(entries: Vec<(&str, Object)>) -> Object {
        Object::Dictionary(Self::dict_map(entries))
    }

    /// Create a bare dictionary map.
    pub fn dict_map(entries: Vec<(&str, Object)>) -> Dict {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    /// Create a Reference object.
    pub fn reference(r: ObjectRef) -> Object {
        Object::Reference(r)
    }

    /// Create a `/Rect` array `[llx lly urx ury]` from a document-space rectangle.
    pub fn rect(rect: &Rect) -> Object {
        Object::Array(rect.corners().iter().map(|&c| Object::Real(c as f64)).collect())
    }

    /// Create a DeviceRGB color array from components in `0.0..=1.0`.
    pub fn rgb(color: [f32; 3]) -> Object {
        Object::Array(color.iter().map(|&c| Object::Real(c as f64)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(obj: &Object) -> String {
        ObjectSerializer::compact().serialize_to_string(obj)
    }

    #[test]
    fn test_serialize_scalars() {
        assert_eq!(compact(&Object::Null), "null");
        assert_eq!(compact(&Object::Boolean(true)), "true");
        assert_eq!(compact(&Object::Integer(-123)), "-123");
    }

    #[test]
    fn test_serialize_real() {
        assert_eq!(compact(&Object::Real(3.14258)), "3.14258");
        assert_eq!(compact(&Object::Real(1.0)), "1");
        assert_eq!(compact(&Object::Real(0.5)), "0.5");
        assert_eq!(compact(&Object::Real(-0.000001)), "0");
        assert_eq!(compact(&Object::Real(f64::NAN)), "0");
    }

    #[test]
    fn test_serialize_string() {
        assert_eq!(compact(&Object::String(b"Hello".to_vec())), "(Hello)");
        assert_eq!(compact(&Object::String(b"Test (parens)".to_vec())), "(Test \\(parens\\))");
        assert_eq!(compact(&Object::String(vec![0x00, 0xFF, 0x80])), "<00FF80>");
    }

    #[test]
    fn test_text_helper_uses_utf16_for_non_ascii() {
        assert_eq!(compact(&ObjectSerializer::text("Name")), "(Name)");
        assert_eq!(compact(&ObjectSerializer::text("é")), "<FEFF00E9>");
    }

    #[test]
    fn test_serialize_name_with_special_chars() {
        assert_eq!(compact(&ObjectSerializer::name("Type")), "/Type");
        assert_eq!(compact(&ObjectSerializer::name("Name With Space")), "/Name#20With#20Space");
        assert_eq!(compact(&ObjectSerializer::name("A/B#")), "/A#2FB#23");
    }

    #[test]
    fn test_serialize_dictionary_sorted() {
        let dict = ObjectSerializer::dict(vec![
            ("Type", ObjectSerializer::name("Annot")),
            ("F", ObjectSerializer::integer(4)),
            ("Rect", ObjectSerializer::rect(&Rect::new(0.0, 0.0, 612.0, 792.0))),
        ]);
        assert_eq!(compact(&dict), "<< /F 4 /Rect [0 0 612 792] /Type /Annot >>");
    }

    #[test]
    fn test_serialize_indirect() {
        let bytes = ObjectSerializer::new().serialize_indirect(ObjectRef::new(7, 0), &Object::Integer(42));
        assert_eq!(String::from_utf8_lossy(&bytes), "7 0 obj\n42\nendobj\n");
    }

    #[test]
    fn test_serialize_stream_sets_length() {
        let mut dict = Dict::new();
        dict.insert("Length".to_string(), Object::Integer(999));
        let stream = Object::Stream {
            dict,
            data: bytes::Bytes::from_static(b"stream data"),
        };
        let result = compact(&stream);
        assert!(result.contains("/Length 11"));
        assert!(result.contains("\nstream\nstream data\nendstream"));
    }

    #[test]
    fn test_serialized_dictionary_parses_back() {
        let dict = ObjectSerializer::dict(vec![
            ("T", ObjectSerializer::text("Größe")),
            ("Kids", ObjectSerializer::array(vec![ObjectSerializer::reference(ObjectRef::new(3, 0))])),
        ]);
        let bytes = ObjectSerializer::new().serialize(&dict);
        let (_, parsed) = crate::parser::parse_object(&bytes).unwrap();
        assert_eq!(parsed, dict);
    }
}
