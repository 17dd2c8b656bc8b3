//! Stream filters.
//!
//! Uploaded documents routinely keep their cross-reference data and object
//! streams Flate-compressed with a PNG "Up" predictor, so those are the
//! filters the loader understands.

use crate::error::{Error, Result};
use flate2::read::{DeflateDecoder, ZlibDecoder};
use std::io::Read;

/// Predictor parameters from a `DecodeParms` dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeParams {
    /// Predictor algorithm (1 = none, 2 = TIFF, 10-15 = PNG)
    pub predictor: i64,
    /// Number of color components per sample
    pub colors: usize,
    /// Bits per component
    pub bits_per_component: usize,
    /// Samples per row
    pub columns: usize,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            predictor: 1,
            colors: 1,
            bits_per_component: 8,
            columns: 1,
        }
    }
}

impl DecodeParams {
    fn row_bytes(&self) -> usize {
        (self.columns * self.colors * self.bits_per_component).div_ceil(8)
    }

    fn pixel_bytes(&self) -> usize {
        (self.colors * self.bits_per_component).div_ceil(8).max(1)
    }
}

/// Run `data` through the named filter pipeline.
pub fn decode_stream(data: &[u8], filters: &[String], params: Option<&DecodeParams>) -> Result<Vec<u8>> {
    let mut current = data.to_vec();
    for filter in filters {
        current = match filter.as_str() {
            "FlateDecode" | "Fl" => {
                let inflated = flate_decode(&current)?;
                match params {
                    Some(p) if p.predictor > 1 => apply_predictor(&inflated, p)?,
                    _ => inflated,
                }
            },
            other => return Err(Error::UnsupportedFilter(other.to_string())),
        };
    }
    Ok(current)
}

/// Inflate zlib data, falling back to raw deflate for streams with a
/// damaged header. Partial output is kept when the tail is corrupt.
pub fn flate_decode(input: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    match ZlibDecoder::new(input).read_to_end(&mut output) {
        Ok(_) => return Ok(output),
        Err(e) if !output.is_empty() => {
            log::warn!("FlateDecode kept {} bytes before corruption: {}", output.len(), e);
            return Ok(output);
        },
        Err(e) => log::debug!("zlib inflate failed ({}), retrying as raw deflate", e),
    }

    output.clear();
    let body = if input.len() > 2 { &input[2..] } else { input };
    match DeflateDecoder::new(body).read_to_end(&mut output) {
        Ok(_) => Ok(output),
        Err(_) if !output.is_empty() => Ok(output),
        Err(e) => Err(Error::Decode(format!("FlateDecode failed: {}", e))),
    }
}

fn apply_predictor(data: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
    match params.predictor {
        2 => Ok(undo_tiff(data, params)),
        10..=15 => undo_png(data, params),
        other => Err(Error::Decode(format!("Unsupported predictor: {}", other))),
    }
}

fn undo_tiff(data: &[u8], params: &DecodeParams) -> Vec<u8> {
    let row_len = params.row_bytes().max(1);
    let bpp = params.pixel_bytes();
    let mut out = data.to_vec();
    for row in out.chunks_mut(row_len) {
        for i in bpp..row.len() {
            row[i] = row[i].wrapping_add(row[i - bpp]);
        }
    }
    out
}

fn undo_png(data: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
    let row_len = params.row_bytes();
    let bpp = params.pixel_bytes();
    let stride = row_len + 1;
    if row_len == 0 {
        return Err(Error::Decode("PNG predictor with zero-width rows".to_string()));
    }

    let mut out: Vec<u8> = Vec::with_capacity(data.len() / stride * row_len);
    let mut prev = vec![0u8; row_len];

    for encoded in data.chunks(stride) {
        if encoded.len() < 2 {
            break;
        }
        let tag = encoded[0];
        let src = &encoded[1..];
        let mut row = vec![0u8; src.len()];

        for i in 0..src.len() {
            let left = if i >= bpp { row[i - bpp] } else { 0 };
            let up = prev[i];
            let up_left = if i >= bpp { prev[i - bpp] } else { 0 };
            let predicted = match tag {
                0 => 0,
                1 => left,
                2 => up,
                3 => ((left as u16 + up as u16) / 2) as u8,
                4 => paeth(left, up, up_left),
                other => return Err(Error::Decode(format!("Invalid PNG predictor tag: {}", other))),
            };
            row[i] = src[i].wrapping_add(predicted);
        }

        out.extend_from_slice(&row);
        prev[..row.len()].copy_from_slice(&row);
    }

    Ok(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn flate_encode(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_flate_encode_then_decode() {
        let data = b"1 0 obj << /Type /Catalog >> endobj".repeat(4);
        let packed = flate_encode(&data);
        assert_ne!(packed, data);
        assert_eq!(flate_decode(&packed).unwrap(), data);
    }

    #[test]
    fn test_png_up_predictor() {
        // Two rows of three bytes, second row encoded as delta from first.
        let encoded = [2u8, 1, 2, 3, 2, 1, 1, 1];
        let params = DecodeParams {
            predictor: 12,
            columns: 3,
            ..Default::default()
        };
        assert_eq!(undo_png(&encoded, &params).unwrap(), vec![1, 2, 3, 2, 3, 4]);
    }

    #[test]
    fn test_png_sub_predictor() {
        let encoded = [1u8, 5, 1, 1];
        let params = DecodeParams {
            predictor: 11,
            columns: 3,
            ..Default::default()
        };
        assert_eq!(undo_png(&encoded, &params).unwrap(), vec![5, 6, 7]);
    }

    #[test]
    fn test_unknown_filter_is_rejected() {
        let err = decode_stream(b"abc", &["JBIG2Decode".to_string()], None).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFilter(name) if name == "JBIG2Decode"));
    }

    #[test]
    fn test_paeth_prefers_left_on_tie() {
        assert_eq!(paeth(10, 10, 10), 10);
        assert_eq!(paeth(0, 20, 0), 20);
    }
}
