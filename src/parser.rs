//! PDF object parser.
//!
//! Recursive descent over lexer tokens: arrays, dictionaries, streams,
//! indirect references and `N G obj ... endobj` definitions.

use crate::error::{Error, Result};
use crate::lexer::{skip_ws, token, Token};
use crate::object::{Dict, Object, ObjectRef};
use nom::IResult;

fn fail(input: &[u8]) -> nom::Err<nom::error::Error<&[u8]>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag))
}

/// Decode escape sequences in a literal string body (ISO 32000-1 §7.3.4.2).
pub fn decode_literal_string_escapes(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        let b = raw[i];
        if b != b'\\' || i + 1 >= raw.len() {
            out.push(b);
            i += 1;
            continue;
        }

        let next = raw[i + 1];
        i += 2;
        match next {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'0'..=b'7' => {
                let mut code = (next - b'0') as u32;
                let mut digits = 1;
                while digits < 3 && i < raw.len() && (b'0'..=b'7').contains(&raw[i]) {
                    code = code * 8 + (raw[i] - b'0') as u32;
                    i += 1;
                    digits += 1;
                }
                out.push((code & 0xFF) as u8);
            },
            // Line continuation: backslash + EOL is dropped.
            b'\r' => {
                if i < raw.len() && raw[i] == b'\n' {
                    i += 1;
                }
            },
            b'\n' => {},
            other => out.push(other),
        }
    }

    out
}

/// Decode a hex string body. Whitespace is ignored and an odd trailing digit
/// is padded with 0.
pub fn decode_hex(hex_bytes: &[u8]) -> Result<Vec<u8>> {
    let digits: Vec<u8> = hex_bytes
        .iter()
        .copied()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    digits
        .chunks(2)
        .map(|pair| {
            let hi = hex_value(pair[0])?;
            let lo = pair.get(1).map(|&c| hex_value(c)).transpose()?.unwrap_or(0);
            Ok(hi << 4 | lo)
        })
        .collect()
}

fn hex_value(c: u8) -> Result<u8> {
    (c as char)
        .to_digit(16)
        .map(|d| d as u8)
        .ok_or_else(|| Error::Decode(format!("invalid hex digit '{}'", c as char)))
}

/// Parse one direct object, including `N G R` references and streams.
pub fn parse_object(input: &[u8]) -> IResult<&[u8], Object> {
    let (rest, tok) = token(input)?;

    match tok {
        Token::Null => Ok((rest, Object::Null)),
        Token::True => Ok((rest, Object::Boolean(true))),
        Token::False => Ok((rest, Object::Boolean(false))),
        Token::Real(r) => Ok((rest, Object::Real(r))),
        Token::Name(n) => Ok((rest, Object::Name(n))),
        Token::LiteralString(raw) => Ok((rest, Object::String(decode_literal_string_escapes(raw)))),
        Token::HexString(raw) => decode_hex(raw)
            .map(|bytes| (rest, Object::String(bytes)))
            .map_err(|_| fail(input)),
        Token::Integer(i) => {
            if let Ok((after_gen, Token::Integer(gen))) = token(rest) {
                if let Ok((after_r, Token::R)) = token(after_gen) {
                    if i >= 0 && (0..=u16::MAX as i64).contains(&gen) {
                        return Ok((after_r, Object::Reference(ObjectRef::new(i as u32, gen as u16))));
                    }
                }
            }
            Ok((rest, Object::Integer(i)))
        },
        Token::ArrayStart => parse_array(rest),
        Token::DictStart => {
            let (rest, dict) = parse_dictionary(rest)?;
            match token(rest) {
                Ok((body, Token::StreamStart)) => {
                    let (rest, data) = parse_stream_data(body, &dict)?;
                    Ok((
                        rest,
                        Object::Stream {
                            dict,
                            data: bytes::Bytes::from(data),
                        },
                    ))
                },
                _ => Ok((rest, Object::Dictionary(dict))),
            }
        },
        _ => Err(fail(input)),
    }
}

fn parse_array(mut input: &[u8]) -> IResult<&[u8], Object> {
    let mut items = Vec::new();
    loop {
        if let Ok((rest, Token::ArrayEnd)) = token(input) {
            return Ok((rest, Object::Array(items)));
        }
        let (rest, item) = parse_object(input)?;
        items.push(item);
        input = rest;
    }
}

fn parse_dictionary(mut input: &[u8]) -> IResult<&[u8], Dict> {
    let mut dict = Dict::new();
    loop {
        match token(input)? {
            (rest, Token::DictEnd) => return Ok((rest, dict)),
            (rest, Token::Name(key)) => {
                let (rest, value) = parse_object(rest)?;
                // A null value is equivalent to an absent key.
                if !value.is_null() {
                    dict.insert(key, value);
                }
                input = rest;
            },
            _ => return Err(fail(input)),
        }
    }
}

/// Read stream bytes following the `stream` keyword.
///
/// A direct `/Length` is trusted when `endstream` follows it; otherwise the
/// body is located by scanning for `endstream`, which also covers indirect
/// lengths.
fn parse_stream_data<'a>(input: &'a [u8], dict: &Dict) -> IResult<&'a [u8], Vec<u8>> {
    let body = if input.starts_with(b"\r\n") {
        &input[2..]
    } else if input.starts_with(b"\n") || input.starts_with(b"\r") {
        &input[1..]
    } else {
        input
    };

    if let Some(len) = dict.get("Length").and_then(Object::as_integer) {
        let len = len.max(0) as usize;
        if len <= body.len() {
            if let Ok((rest, Token::StreamEnd)) = token(&body[len..]) {
                return Ok((rest, body[..len].to_vec()));
            }
        }
        log::debug!("stream /Length {} does not land on endstream, scanning", len);
    }

    let pos = body
        .windows(b"endstream".len())
        .position(|w| w == b"endstream")
        .ok_or_else(|| nom::Err::Error(nom::error::Error::new(body, nom::error::ErrorKind::Eof)))?;

    let mut end = pos;
    if end > 0 && body[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && body[end - 1] == b'\r' {
        end -= 1;
    }

    Ok((&body[pos + b"endstream".len()..], body[..end].to_vec()))
}

/// Parse an indirect object definition `N G obj <object> endobj`.
pub fn parse_indirect_object(input: &[u8]) -> IResult<&[u8], (ObjectRef, Object)> {
    let (rest, id) = match token(input)? {
        (rest, Token::Integer(id)) if id >= 0 => (rest, id as u32),
        _ => return Err(fail(input)),
    };
    let (rest, gen) = match token(rest)? {
        (rest, Token::Integer(gen)) if (0..=u16::MAX as i64).contains(&gen) => (rest, gen as u16),
        _ => return Err(fail(input)),
    };
    let (rest, _) = match token(rest)? {
        (rest, Token::ObjStart) => (rest, ()),
        _ => return Err(fail(input)),
    };
    let (rest, object) = parse_object(rest)?;

    // Tolerate a missing endobj; the next object header follows anyway.
    let rest = match token(rest) {
        Ok((after, Token::ObjEnd)) => after,
        _ => skip_ws(rest).map(|(r, _)| r).unwrap_or(rest),
    };

    Ok((rest, (ObjectRef::new(id, gen), object)))
}

/// Parse an indirect object located at `offset`, converting nom failures
/// into crate errors.
pub fn parse_indirect_at(data: &[u8], offset: usize) -> Result<(ObjectRef, Object)> {
    let slice = data.get(offset..).ok_or(Error::ParseError {
        offset,
        reason: "offset beyond end of file".to_string(),
    })?;
    parse_indirect_object(slice)
        .map(|(_, parsed)| parsed)
        .map_err(|e| Error::ParseError {
            offset,
            reason: format!("{:?}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &[u8]) -> Object {
        parse_object(input).unwrap().1
    }

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse(b"null"), Object::Null);
        assert_eq!(parse(b"true"), Object::Boolean(true));
        assert_eq!(parse(b"12"), Object::Integer(12));
        assert_eq!(parse(b"/Tx"), Object::Name("Tx".to_string()));
    }

    #[test]
    fn test_parse_reference_vs_integers() {
        assert_eq!(parse(b"10 0 R"), Object::Reference(ObjectRef::new(10, 0)));
        let arr = parse(b"[0 0 612 792]");
        assert_eq!(arr.as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_literal_string_escapes() {
        assert_eq!(decode_literal_string_escapes(b"a\\(b\\)"), b"a(b)");
        assert_eq!(decode_literal_string_escapes(b"\\247"), vec![0xA7]);
        assert_eq!(decode_literal_string_escapes(b"line\\\ncont"), b"linecont");
        assert_eq!(decode_literal_string_escapes(b"tab\\there"), b"tab\there");
    }

    #[test]
    fn test_hex_string() {
        assert_eq!(decode_hex(b"48 65 6C").unwrap(), b"Hel");
        assert_eq!(decode_hex(b"7").unwrap(), vec![0x70]);
        assert!(decode_hex(b"ZZ").is_err());
        assert_eq!(parse(b"<FEFF0041>"), Object::String(vec![0xFE, 0xFF, 0x00, 0x41]));
    }

    #[test]
    fn test_parse_field_dictionary() {
        let obj = parse(b"<< /FT /Btn /Ff 49152 /T (Group1) /Kids [5 0 R 6 0 R] /V null >>");
        let dict = obj.as_dict().unwrap();
        assert_eq!(dict.get("FT").and_then(Object::as_name), Some("Btn"));
        assert_eq!(dict.get("Ff").and_then(Object::as_integer), Some(49152));
        assert_eq!(dict.get("T").and_then(Object::as_text).as_deref(), Some("Group1"));
        assert_eq!(dict.get("Kids").and_then(Object::as_array).map(Vec::len), Some(2));
        assert!(!dict.contains_key("V"));
    }

    #[test]
    fn test_parse_stream_with_length() {
        let obj = parse(b"<< /Length 5 >>\nstream\nhello\nendstream");
        match obj {
            Object::Stream { data, .. } => assert_eq!(&data[..], b"hello"),
            other => panic!("expected stream, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_stream_with_indirect_length() {
        let obj = parse(b"<< /Length 9 0 R >>\r\nstream\r\nabc\r\nendstream");
        match obj {
            Object::Stream { data, .. } => assert_eq!(&data[..], b"abc"),
            other => panic!("expected stream, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_indirect_object() {
        let (rest, (r, obj)) = parse_indirect_object(b"3 0 obj\n<< /Type /Page >>\nendobj\n4 0 obj").unwrap();
        assert_eq!(r, ObjectRef::new(3, 0));
        assert_eq!(obj.as_dict().unwrap().get("Type").and_then(Object::as_name), Some("Page"));
        assert!(rest.starts_with(b"4 0 obj"));
    }

    #[test]
    fn test_parse_indirect_at_bad_offset() {
        let err = parse_indirect_at(b"%PDF-1.7", 100).unwrap_err();
        assert!(matches!(err, Error::ParseError { offset: 100, .. }));
    }
}
