//! Cross-reference table parsing.
//!
//! Handles classic `xref` tables, cross-reference streams (PDF 1.5+),
//! hybrid files with `/XRefStm`, and `/Prev` chains left behind by earlier
//! incremental updates. When none of that can be read, [`reconstruct`]
//! rebuilds the table by scanning for object headers.

use crate::error::{Error, Result};
use crate::lexer::{skip_ws, token, Token};
use crate::object::{Dict, Object};
use crate::parser::{parse_indirect_object, parse_object};
use std::collections::{HashMap, HashSet};

/// Location of one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XRefEntry {
    /// Object is free (deleted)
    Free,
    /// Object stored directly in the file at `offset`
    Uncompressed {
        /// Byte offset of the `N G obj` header
        offset: usize,
        /// Generation number
        gen: u16,
    },
    /// Object stored inside an object stream
    Compressed {
        /// Object number of the containing object stream
        stream: u32,
        /// Index of the object within the stream
        index: usize,
    },
}

/// Merged cross-reference data for a whole document.
#[derive(Debug, Clone, Default)]
pub struct CrossRefTable {
    entries: HashMap<u32, XRefEntry>,
    trailer: Dict,
}

impl CrossRefTable {
    /// Look up an object's location.
    pub fn get(&self, id: u32) -> Option<XRefEntry> {
        self.entries.get(&id).copied()
    }

    /// The newest trailer dictionary.
    pub fn trailer(&self) -> &Dict {
        &self.trailer
    }

    /// Highest object number mentioned by any section.
    pub fn max_object_number(&self) -> u32 {
        let listed = self.entries.keys().copied().max().unwrap_or(0);
        let declared = self
            .trailer
            .get("Size")
            .and_then(Object::as_integer)
            .map(|s| (s.max(1) - 1) as u32)
            .unwrap_or(0);
        listed.max(declared)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries were found.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge an older section: its entries only fill gaps.
    fn absorb_older(&mut self, older: HashMap<u32, XRefEntry>) {
        for (id, entry) in older {
            self.entries.entry(id).or_insert(entry);
        }
    }
}

/// Find the byte offset recorded after the last `startxref` keyword.
pub fn find_startxref(data: &[u8]) -> Result<usize> {
    let window_start = data.len().saturating_sub(2048);
    let tail = &data[window_start..];
    let pos = tail
        .windows(b"startxref".len())
        .rposition(|w| w == b"startxref")
        .ok_or(Error::InvalidXref)?;

    match token(&tail[pos + b"startxref".len()..]) {
        Ok((_, Token::Integer(offset))) if offset >= 0 && (offset as usize) < data.len() => Ok(offset as usize),
        _ => Err(Error::InvalidXref),
    }
}

/// Load the full cross-reference chain starting at `startxref`.
pub fn load(data: &[u8]) -> Result<CrossRefTable> {
    let start = find_startxref(data)?;
    let mut table = CrossRefTable::default();
    let mut visited = HashSet::new();
    let mut next = Some(start);
    let mut newest = true;

    while let Some(offset) = next.take() {
        if !visited.insert(offset) {
            log::warn!("xref /Prev chain loops back to offset {}", offset);
            break;
        }

        let (entries, trailer) = read_section(data, offset)?;
        table.absorb_older(entries);

        if let Some(stm) = trailer.get("XRefStm").and_then(Object::as_integer) {
            if visited.insert(stm as usize) {
                match read_section(data, stm as usize) {
                    Ok((hybrid, _)) => table.absorb_older(hybrid),
                    Err(e) => log::warn!("ignoring unreadable /XRefStm at {}: {}", stm, e),
                }
            }
        }

        next = trailer
            .get("Prev")
            .and_then(Object::as_integer)
            .filter(|&p| p >= 0)
            .map(|p| p as usize);

        if newest {
            table.trailer = trailer;
            newest = false;
        }
    }

    log::debug!("loaded {} xref entries", table.len());
    Ok(table)
}

fn read_section(data: &[u8], offset: usize) -> Result<(HashMap<u32, XRefEntry>, Dict)> {
    let slice = data.get(offset..).ok_or(Error::InvalidXref)?;
    let (slice, _) = skip_ws(slice).map_err(|_| Error::InvalidXref)?;
    if slice.starts_with(b"xref") {
        read_classic(&slice[4..], offset)
    } else {
        read_stream(slice, offset)
    }
}

fn read_classic(mut input: &[u8], offset: usize) -> Result<(HashMap<u32, XRefEntry>, Dict)> {
    let bad = |reason: &str| Error::ParseError {
        offset,
        reason: reason.to_string(),
    };
    let mut entries = HashMap::new();

    loop {
        let (after_ws, _) = skip_ws(input).map_err(|_| bad("truncated xref table"))?;
        if let Some(body) = after_ws.strip_prefix(b"trailer".as_slice()) {
            let (_, trailer) = parse_object(body).map_err(|_| bad("unreadable trailer dictionary"))?;
            let trailer = trailer
                .as_dict()
                .cloned()
                .ok_or_else(|| bad("trailer is not a dictionary"))?;
            return Ok((entries, trailer));
        }

        let (rest, first) = match token(after_ws) {
            Ok((rest, Token::Integer(n))) if n >= 0 => (rest, n as u32),
            _ => return Err(bad("expected 'trailer' after xref subsections")),
        };
        let (rest, count) = match token(rest) {
            Ok((rest, Token::Integer(c))) if c >= 0 => (rest, c as u32),
            _ => return Err(bad("malformed xref subsection header")),
        };

        input = rest;
        for i in 0..count {
            let (rest, field_a) = token(input).map_err(|_| bad("truncated xref entry"))?;
            let (rest, field_b) = token(rest).map_err(|_| bad("truncated xref entry"))?;
            let (rest, _) = skip_ws(rest).map_err(|_| bad("truncated xref entry"))?;
            let kind = *rest.first().ok_or_else(|| bad("truncated xref entry"))?;

            let (Token::Integer(pos), Token::Integer(gen)) = (field_a, field_b) else {
                return Err(bad("non-numeric xref entry"));
            };
            let entry = match kind {
                b'n' => XRefEntry::Uncompressed {
                    offset: pos as usize,
                    gen: gen as u16,
                },
                b'f' => XRefEntry::Free,
                _ => return Err(bad("xref entry type must be 'n' or 'f'")),
            };
            entries.insert(first + i, entry);
            input = &rest[1..];
        }
    }
}

fn read_stream(input: &[u8], offset: usize) -> Result<(HashMap<u32, XRefEntry>, Dict)> {
    let (_, (_, stream)) = parse_indirect_object(input).map_err(|_| Error::InvalidXref)?;
    let dict = stream.as_dict().cloned().ok_or(Error::InvalidXref)?;
    if dict.get("Type").and_then(Object::as_name) != Some("XRef") {
        return Err(Error::ParseError {
            offset,
            reason: "startxref does not point at an xref table or stream".to_string(),
        });
    }

    let widths: Vec<usize> = dict
        .get("W")
        .and_then(Object::as_array)
        .map(|w| w.iter().filter_map(Object::as_integer).map(|n| n as usize).collect())
        .unwrap_or_default();
    if widths.len() != 3 {
        return Err(Error::InvalidXref);
    }

    let size = dict.get("Size").and_then(Object::as_integer).unwrap_or(0) as u32;
    let ranges: Vec<(u32, u32)> = match dict.get("Index").and_then(Object::as_array) {
        Some(index) => index
            .chunks(2)
            .filter_map(|p| Some((p.first()?.as_integer()? as u32, p.get(1)?.as_integer()? as u32)))
            .collect(),
        None => vec![(0, size)],
    };

    let data = stream.decode_stream_data()?;
    let row_len: usize = widths.iter().sum();
    let mut rows = data.chunks_exact(row_len.max(1));
    let mut entries = HashMap::new();

    for (first, count) in ranges {
        for id in first..first + count {
            let Some(row) = rows.next() else {
                return Ok((entries, dict));
            };
            let (a, rest) = row.split_at(widths[0]);
            let (b, c) = rest.split_at(widths[1]);
            // A zero-width type field defaults to 1 (uncompressed).
            let kind = if widths[0] == 0 { 1 } else { read_be(a) };
            let entry = match kind {
                0 => XRefEntry::Free,
                1 => XRefEntry::Uncompressed {
                    offset: read_be(b) as usize,
                    gen: read_be(c) as u16,
                },
                2 => XRefEntry::Compressed {
                    stream: read_be(b) as u32,
                    index: read_be(c) as usize,
                },
                _ => continue,
            };
            entries.insert(id, entry);
        }
    }

    Ok((entries, dict))
}

fn read_be(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

/// Rebuild a table by scanning the whole file for `N G obj` headers.
///
/// Later definitions of the same object win, matching incremental-update
/// semantics. The trailer is taken from the last `trailer` keyword, or
/// synthesized from the first catalog found.
pub fn reconstruct(data: &[u8]) -> Result<CrossRefTable> {
    let mut table = CrossRefTable::default();
    let mut catalog = None;
    let mut pos = 0;

    while pos < data.len() {
        let line_start = pos == 0 || matches!(data[pos - 1], b'\n' | b'\r');
        if line_start && data[pos].is_ascii_digit() {
            if let Ok((rest, (r, obj))) = parse_indirect_object(&data[pos..]) {
                table.entries.insert(
                    r.id,
                    XRefEntry::Uncompressed {
                        offset: pos,
                        gen: r.gen,
                    },
                );
                if obj.as_dict().and_then(|d| d.get("Type")).and_then(Object::as_name) == Some("Catalog") {
                    catalog = Some(r);
                }
                pos = data.len() - rest.len();
                continue;
            }
        }
        pos += 1;
    }

    if let Some(at) = data.windows(b"trailer".len()).rposition(|w| w == b"trailer") {
        if let Ok((_, Object::Dictionary(trailer))) = parse_object(&data[at + b"trailer".len()..]) {
            table.trailer = trailer;
        }
    }
    if !table.trailer.contains_key("Root") {
        let root = catalog.ok_or_else(|| Error::InvalidPdf("no document catalog found".to_string()))?;
        table.trailer.insert("Root".to_string(), Object::Reference(root));
    }

    log::info!("reconstructed xref with {} objects", table.len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSIC: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n\
2 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\n\
xref\n0 3\n0000000000 65535 f \n0000000009 00000 n \n0000000058 00000 n \n\
trailer\n<< /Size 3 /Root 1 0 R >>\nstartxref\n110\n%%EOF\n";

    #[test]
    fn test_find_startxref() {
        assert_eq!(find_startxref(CLASSIC).unwrap(), 110);
        assert!(matches!(find_startxref(b"%PDF-1.4\nno xref"), Err(Error::InvalidXref)));
    }

    #[test]
    fn test_load_classic_table() {
        let table = load(CLASSIC).unwrap();
        assert_eq!(table.get(0), Some(XRefEntry::Free));
        assert_eq!(table.get(1), Some(XRefEntry::Uncompressed { offset: 9, gen: 0 }));
        assert_eq!(table.get(2), Some(XRefEntry::Uncompressed { offset: 58, gen: 0 }));
        assert!(table.trailer().contains_key("Root"));
        assert_eq!(table.max_object_number(), 2);
    }

    #[test]
    fn test_xref_stream_rows() {
        // W [1 2 1]: one free entry, one uncompressed at 0x0010, one compressed in stream 5.
        let rows: Vec<u8> = vec![0, 0, 0, 0, 1, 0, 0x10, 0, 2, 0, 5, 3];
        let mut body = b"7 0 obj\n<< /Type /XRef /W [1 2 1] /Size 3 /Root 1 0 R /Length 12 >>\nstream\n".to_vec();
        body.extend_from_slice(&rows);
        body.extend_from_slice(b"\nendstream\nendobj\n");

        let (entries, trailer) = read_stream(&body, 0).unwrap();
        assert_eq!(entries.get(&0), Some(&XRefEntry::Free));
        assert_eq!(entries.get(&1), Some(&XRefEntry::Uncompressed { offset: 16, gen: 0 }));
        assert_eq!(entries.get(&2), Some(&XRefEntry::Compressed { stream: 5, index: 3 }));
        assert!(trailer.contains_key("Root"));
    }

    #[test]
    fn test_reconstruct_finds_objects_and_root() {
        let broken = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n\
2 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\n%%EOF\n";
        let table = reconstruct(broken).unwrap();
        assert_eq!(table.get(1), Some(XRefEntry::Uncompressed { offset: 9, gen: 0 }));
        assert!(matches!(table.get(2), Some(XRefEntry::Uncompressed { .. })));
        assert_eq!(
            table.trailer().get("Root"),
            Some(&Object::Reference(crate::object::ObjectRef::new(1, 0)))
        );
    }
}
