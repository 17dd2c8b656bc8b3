//! PDF lexer (tokenizer).
//!
//! Low-level tokenization of uploaded PDF bytes: numbers, literal and hex
//! strings, names, keywords and delimiters. Whitespace (space, \t, \r, \n,
//! \0, \f) and comments (`%` to end of line) are skipped before each token.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_while, take_while1},
    character::complete::{char, digit0, digit1, one_of},
    combinator::{map, opt, recognize, value},
    multi::many0_count,
    sequence::{pair, preceded, tuple},
    IResult,
};

/// Tokens recognized by the lexer.
#[derive(Debug, PartialEq, Clone)]
pub enum Token<'a> {
    /// Integer number (e.g., 42, -123)
    Integer(i64),
    /// Real number (e.g., 3.14, -.5)
    Real(f64),
    /// Literal string body, escapes still encoded
    LiteralString(&'a [u8]),
    /// Hex string body, whitespace still present
    HexString(&'a [u8]),
    /// Name with `#XX` escapes decoded
    Name(String),
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// `[`
    ArrayStart,
    /// `]`
    ArrayEnd,
    /// `<<`
    DictStart,
    /// `>>`
    DictEnd,
    /// `obj`
    ObjStart,
    /// `endobj`
    ObjEnd,
    /// `stream`
    StreamStart,
    /// `endstream`
    StreamEnd,
    /// `R`
    R,
}

/// Whether `c` is PDF whitespace (ISO 32000-1 Table 1).
pub fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n' | 0x00 | 0x0C)
}

/// Whether `c` is a PDF delimiter (ISO 32000-1 Table 2).
pub fn is_delimiter(c: u8) -> bool {
    matches!(c, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

fn comment(input: &[u8]) -> IResult<&[u8], ()> {
    value((), preceded(char('%'), take_till(|c| c == b'\r' || c == b'\n')))(input)
}

/// Skip any run of whitespace and comments. Never fails.
pub fn skip_ws(input: &[u8]) -> IResult<&[u8], ()> {
    value((), many0_count(alt((value((), take_while1(is_whitespace)), comment))))(input)
}

fn number(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (rest, text) = recognize(tuple((
        opt(one_of("+-")),
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
    )))(input)?;

    let text = std::str::from_utf8(text).unwrap_or("0");
    let fail = || nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit));

    if text.contains('.') {
        // "5." is legal PDF but not a legal Rust float literal.
        let normalized = if text.ends_with('.') {
            format!("{}0", text)
        } else {
            text.to_string()
        };
        normalized.parse().map(|n| (rest, Token::Real(n))).map_err(|_| fail())
    } else {
        text.parse().map(|n| (rest, Token::Integer(n))).map_err(|_| fail())
    }
}

/// Literal strings may nest balanced parentheses; escaped parentheses do not count.
fn literal_string(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (body, _) = char('(')(input)?;
    let mut depth = 1usize;
    let mut pos = 0usize;

    while pos < body.len() {
        match body[pos] {
            b'\\' => pos += 2,
            b'(' => {
                depth += 1;
                pos += 1;
            },
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&body[pos + 1..], Token::LiteralString(&body[..pos])));
                }
                pos += 1;
            },
            _ => pos += 1,
        }
    }

    Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag)))
}

fn hex_string(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    if input.starts_with(b"<<") {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag)));
    }
    let (rest, body) = preceded(
        char('<'),
        take_while(|c: u8| c.is_ascii_hexdigit() || is_whitespace(c)),
    )(input)?;
    let (rest, _) = char('>')(rest)?;
    Ok((rest, Token::HexString(body)))
}

/// Decode `#XX` escape sequences in a raw name.
///
/// Invalid sequences are kept literally.
pub fn decode_name_escapes(raw: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'#' && i + 2 < raw.len() {
            let hex = std::str::from_utf8(&raw[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                bytes.push(byte);
                i += 3;
                continue;
            }
        }
        bytes.push(raw[i]);
        i += 1;
    }
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

fn name(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    map(
        preceded(char('/'), take_while(|c| !is_whitespace(c) && !is_delimiter(c))),
        |raw: &[u8]| Token::Name(decode_name_escapes(raw)),
    )(input)
}

fn keyword(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    alt((
        value(Token::DictStart, tag(b"<<")),
        value(Token::DictEnd, tag(b">>")),
        value(Token::ArrayStart, tag(b"[")),
        value(Token::ArrayEnd, tag(b"]")),
        value(Token::False, tag(b"false")),
        value(Token::True, tag(b"true")),
        value(Token::Null, tag(b"null")),
        value(Token::ObjEnd, tag(b"endobj")),
        value(Token::StreamEnd, tag(b"endstream")),
        value(Token::StreamStart, tag(b"stream")),
        value(Token::ObjStart, tag(b"obj")),
        value(Token::R, tag(b"R")),
    ))(input)
}

/// Parse a single token after skipping whitespace and comments.
pub fn token(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (input, _) = skip_ws(input)?;
    alt((keyword, name, number, literal_string, hex_string))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(input: &[u8]) -> Token<'_> {
        token(input).unwrap().1
    }

    #[test]
    fn test_numbers() {
        assert_eq!(tok(b"42"), Token::Integer(42));
        assert_eq!(tok(b"-17"), Token::Integer(-17));
        assert_eq!(tok(b"+3"), Token::Integer(3));
        assert_eq!(tok(b"595.28"), Token::Real(595.28));
        assert_eq!(tok(b"-.5"), Token::Real(-0.5));
        assert_eq!(tok(b"5."), Token::Real(5.0));
    }

    #[test]
    fn test_skips_comments_and_whitespace() {
        assert_eq!(tok(b"  % a comment\r\n  /Type"), Token::Name("Type".to_string()));
    }

    #[test]
    fn test_name_escapes() {
        assert_eq!(tok(b"/A#20B"), Token::Name("A B".to_string()));
        assert_eq!(decode_name_escapes(b"A#"), "A#");
        assert_eq!(decode_name_escapes(b"Off"), "Off");
    }

    #[test]
    fn test_name_stops_at_delimiter() {
        let (rest, t) = token(b"/Kids[1 0 R]").unwrap();
        assert_eq!(t, Token::Name("Kids".to_string()));
        assert_eq!(rest, b"[1 0 R]");
    }

    #[test]
    fn test_literal_string_nesting() {
        assert_eq!(tok(b"(a (b) c)"), Token::LiteralString(b"a (b) c"));
        assert_eq!(tok(b"(esc \\) paren)"), Token::LiteralString(b"esc \\) paren"));
    }

    #[test]
    fn test_unterminated_literal_string_fails() {
        assert!(token(b"(never closed").is_err());
    }

    #[test]
    fn test_hex_string_vs_dict_start() {
        assert_eq!(tok(b"<48 65>"), Token::HexString(b"48 65"));
        assert_eq!(tok(b"<<"), Token::DictStart);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(tok(b"endstream"), Token::StreamEnd);
        assert_eq!(tok(b"stream"), Token::StreamStart);
        assert_eq!(tok(b"endobj"), Token::ObjEnd);
        assert_eq!(tok(b"R"), Token::R);
        assert_eq!(tok(b"true"), Token::True);
    }
}
