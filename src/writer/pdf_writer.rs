//! Low-level PDF file assembly.
//!
//! [`PdfFileWriter`] appends indirect objects to an output buffer while
//! recording their offsets, then closes the file with a cross-reference
//! section, trailer and `startxref`. It starts either from a fresh header or
//! from the bytes of an uploaded document, in which case the result is an
//! incremental update.

use super::object_serializer::ObjectSerializer;
use crate::config::DesignerConfig;
use crate::error::Result;
use crate::object::{Dict, Object, ObjectRef};
use md5::{Digest, Md5};
use std::io::Write;

/// Output settings shared by fresh and incremental writes.
#[derive(Debug, Clone)]
pub struct PdfWriterConfig {
    /// PDF version written in the header of fresh documents
    pub version: String,
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Catalog `/Lang`
    pub language: Option<String>,
    /// Producer application
    pub producer: Option<String>,
}

impl Default for PdfWriterConfig {
    fn default() -> Self {
        Self {
            version: "1.7".to_string(),
            title: None,
            author: None,
            language: None,
            producer: Some("pdf_form_designer".to_string()),
        }
    }
}

impl PdfWriterConfig {
    /// Take metadata from the designer configuration.
    pub fn from_designer(config: &DesignerConfig) -> Self {
        Self::default()
            .with_title(&config.title)
            .with_author(&config.author)
            .with_language(&config.language)
            .with_producer(&config.producer)
    }

    /// Set document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set document author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the document language tag.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the producer.
    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = Some(producer.into());
        self
    }

    /// Build an Info dictionary from the configured metadata.
    pub fn info_dict(&self) -> Object {
        let date = pdf_date(chrono::Local::now());
        let mut entries = vec![
            ("CreationDate", ObjectSerializer::string(&date)),
            ("ModDate", ObjectSerializer::string(&date)),
        ];
        if let Some(title) = &self.title {
            entries.push(("Title", ObjectSerializer::text(title)));
        }
        if let Some(author) = &self.author {
            entries.push(("Author", ObjectSerializer::text(author)));
        }
        if let Some(producer) = &self.producer {
            entries.push(("Producer", ObjectSerializer::text(producer)));
            entries.push(("Creator", ObjectSerializer::text(producer)));
        }
        ObjectSerializer::dict(entries)
    }
}

/// Format a timestamp as a PDF date string, e.g. `D:20240131120000+01'00'`.
pub fn pdf_date<Tz: chrono::TimeZone>(time: chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let stamp = time.format("D:%Y%m%d%H%M%S").to_string();
    let offset = time.format("%:z").to_string();
    match offset.as_str() {
        "+00:00" => format!("{}Z", stamp),
        _ => format!("{}{}'", stamp, offset.replacen(':', "'", 1)),
    }
}

/// Writes indirect objects and closes the file with an xref section.
pub struct PdfFileWriter {
    output: Vec<u8>,
    update_start: usize,
    offsets: Vec<(ObjectRef, usize)>,
    serializer: ObjectSerializer,
}

impl PdfFileWriter {
    /// Start a new document with the header and binary marker.
    pub fn fresh(version: &str) -> Result<Self> {
        let mut output = Vec::new();
        writeln!(output, "%PDF-{}", version)?;
        output.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");
        Ok(Self {
            output,
            update_start: 0,
            offsets: Vec::new(),
            serializer: ObjectSerializer::new(),
        })
    }

    /// Start an incremental update after `original`.
    pub fn appending(original: &[u8]) -> Self {
        let mut output = original.to_vec();
        if !output.ends_with(b"\n") && !output.ends_with(b"\r") {
            output.push(b'\n');
        }
        let update_start = output.len();
        Self {
            output,
            update_start,
            offsets: Vec::new(),
            serializer: ObjectSerializer::new(),
        }
    }

    /// Write one indirect object.
    pub fn write_object(&mut self, reference: ObjectRef, obj: &Object) -> Result<()> {
        self.offsets.push((reference, self.output.len()));
        self.serializer.write_indirect(&mut self.output, reference, obj)?;
        Ok(())
    }

    /// Record objects that already exist in the output at known offsets.
    ///
    /// Used when the original cross-reference data was unusable and the
    /// update has to carry a complete table.
    pub fn adopt_existing(&mut self, objects: impl IntoIterator<Item = (ObjectRef, usize)>) {
        let written: std::collections::HashSet<u32> = self.offsets.iter().map(|(r, _)| r.id).collect();
        self.offsets
            .extend(objects.into_iter().filter(|(r, _)| !written.contains(&r.id)));
    }

    /// Digest of the bytes written since the writer was created.
    pub fn update_digest(&self) -> Vec<u8> {
        Md5::digest(&self.output[self.update_start..]).to_vec()
    }

    /// Write the xref section, trailer and `startxref`, returning the file.
    ///
    /// With `full_table` the section starts at object 0 and must describe
    /// every live object; otherwise only the objects written here are listed.
    pub fn finish(mut self, trailer: Dict, full_table: bool) -> Result<Vec<u8>> {
        let xref_start = self.output.len();

        let mut rows: Vec<(u32, String)> = self
            .offsets
            .iter()
            .map(|(r, offset)| (r.id, format!("{:010} {:05} n ", offset, r.gen)))
            .collect();
        if full_table {
            rows.push((0, "0000000000 65535 f ".to_string()));
        }
        rows.sort_by_key(|(id, _)| *id);
        rows.dedup_by_key(|(id, _)| *id);

        writeln!(self.output, "xref")?;
        let mut start = 0;
        while start < rows.len() {
            let mut end = start + 1;
            while end < rows.len() && rows[end].0 == rows[end - 1].0 + 1 {
                end += 1;
            }
            writeln!(self.output, "{} {}", rows[start].0, end - start)?;
            for (_, line) in &rows[start..end] {
                // Entries are exactly 20 bytes: 18 characters plus "\r\n" or " \n".
                self.output.extend_from_slice(line.as_bytes());
                self.output.push(b'\n');
            }
            start = end;
        }

        writeln!(self.output, "trailer")?;
        self.serializer
            .write_object(&mut self.output, &Object::Dictionary(trailer))?;
        write!(self.output, "\nstartxref\n{}\n%%EOF\n", xref_start)?;

        log::debug!(
            "wrote {} objects and xref at {} ({} bytes total)",
            self.offsets.len(),
            xref_start,
            self.output.len()
        );
        Ok(self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_file_layout() {
        let mut writer = PdfFileWriter::fresh("1.7").unwrap();
        writer
            .write_object(ObjectRef::new(1, 0), &ObjectSerializer::dict(vec![("Type", ObjectSerializer::name("Catalog"))]))
            .unwrap();
        let mut trailer = Dict::new();
        trailer.insert("Size".to_string(), Object::Integer(2));
        trailer.insert("Root".to_string(), Object::Reference(ObjectRef::new(1, 0)));
        let bytes = writer.finish(trailer, true).unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.starts_with("%PDF-1.7\n"));
        assert!(text.contains("xref\n0 2\n0000000000 65535 f \n"));
        assert!(text.contains("1 0 obj"));
        assert!(text.ends_with("%%EOF\n"));

        let table = crate::xref::load(&bytes).unwrap();
        assert_eq!(table.max_object_number(), 1);
    }

    #[test]
    fn test_incremental_subsections_split_on_gaps() {
        let mut writer = PdfFileWriter::appending(b"%PDF-1.4\n%%EOF");
        writer.write_object(ObjectRef::new(3, 0), &Object::Integer(1)).unwrap();
        writer.write_object(ObjectRef::new(9, 0), &Object::Integer(2)).unwrap();
        writer.write_object(ObjectRef::new(10, 0), &Object::Integer(3)).unwrap();
        let bytes = writer.finish(Dict::new(), false).unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.starts_with("%PDF-1.4\n%%EOF\n3 0 obj"));
        assert!(text.contains("xref\n3 1\n"));
        assert!(text.contains("9 2\n"));
        assert!(!text.contains("65535 f"));
    }

    #[test]
    fn test_pdf_date_format() {
        use chrono::TimeZone;
        let utc = chrono::Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
        assert_eq!(pdf_date(utc), "D:20240131120000Z");

        let cet = chrono::FixedOffset::east_opt(3600).unwrap();
        let local = cet.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
        assert_eq!(pdf_date(local), "D:20240131120000+01'00'");
    }
}
