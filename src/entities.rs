/*
** This file is a part of Markup (incremental XML subset parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Markup is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::fmt::Display;
use std::fmt::Write;

use crate::ErrorKind;
use crate::Location;
use crate::MarkupError;
use crate::parser::is_name_char;
use crate::parser::is_name_start_char;

pub mod predefined {
    pub const LT: &str = "&lt;";
    pub const GT: &str = "&gt;";
    pub const AMP: &str = "&amp;";
    pub const APOS: &str = "&apos;";
    pub const QUOT: &str = "&quot;";
}

fn lookup(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}

pub(crate) fn is_valid_xml_char(c: u32) -> bool {
    matches!(c, 0x09 | 0x0a | 0x0d | 0x20..=0xd7ff | 0xe000..=0xfffd | 0x10000..=0x10ffff)
}

/// Returns the size of the text after [escape_text()].
pub fn escaped_size(s: &str) -> usize {
    let mut size = 0;
    for c in s.chars() {
        match c {
            '<' => size += predefined::LT.len(),
            '>' => size += predefined::GT.len(),
            '&' => size += predefined::AMP.len(),
            '\'' => size += predefined::APOS.len(),
            '"' => size += predefined::QUOT.len(),
            _ => size += c.len_utf8(),
        }
    }

    size
}

/// Writes the text with the five markup characters replaced by entities.
pub fn escape(s: &str, out: &mut impl Write) -> std::fmt::Result {
    let mut back = 0;
    for (pos, c) in s.char_indices() {
        let entity = match c {
            '<' => predefined::LT,
            '>' => predefined::GT,
            '&' => predefined::AMP,
            '\'' => predefined::APOS,
            '"' => predefined::QUOT,
            _ => continue,
        };
        out.write_str(&s[back..pos])?;
        out.write_str(entity)?;
        back = pos + 1;
    }
    out.write_str(&s[back..])
}

/// Escapes text so that the parser reads it back verbatim.
///
/// `& < > ' "` are replaced with the predefined entities. Note that line
/// endings and whitespace in attribute values are still normalized by the
/// parser when the result is read back.
///
/// ```
/// assert_eq!(markup::escape_text("a < b & 'c'"), "a &lt; b &amp; &apos;c&apos;");
/// ```
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(escaped_size(s));
    // writing into a String cannot fail
    let _ = escape(s, &mut result);
    result
}

/// Display wrapper which escapes the wrapped text while formatting.
///
/// ```
/// use markup::Escaped;
/// let title = "Tom & Jerry";
/// assert_eq!(format!("<t>{}</t>", Escaped(title)), "<t>Tom &amp; Jerry</t>");
/// ```
pub struct Escaped<'a>(pub &'a str);

impl Display for Escaped<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        escape(self.0, f)
    }
}

/// Formats like `format!` but escapes every positional argument.
///
/// The format string itself is used as is, so markup can be written
/// there while the substituted values are protected.
///
/// ```
/// let name = "<evil>";
/// let count = 3;
/// let s = markup::format_escaped!("<item name='{}' count='{}'/>", name, count);
/// assert_eq!(s, "<item name='&lt;evil&gt;' count='3'/>");
/// ```
#[macro_export]
macro_rules! format_escaped {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        format!($fmt $(, $crate::Escaped(&::std::string::ToString::to_string(&$arg)))*)
    };
}

pub(crate) struct UnescapeError {
    pub kind: ErrorKind,
    pub message: String,
    /// Byte offset of the '&' starting the bad reference.
    pub offset: usize,
}

impl UnescapeError {
    fn new(kind: ErrorKind, offset: usize, message: String) -> Self {
        UnescapeError {
            kind,
            message,
            offset,
        }
    }
}

enum UnescapeState {
    InsideText,
    AfterAmpersand,
    InsideEntityName,
    AfterCharrefHash,
}

/// Checks if the raw text would come out of [unescape()] unchanged.
pub(crate) fn is_plain(text: &str, is_attribute_value: bool) -> bool {
    if is_attribute_value {
        !text.contains(['&', '\r', '\n', '\t'])
    } else {
        !text.contains(['&', '\r'])
    }
}

pub(crate) fn unescape(text: &str, is_attribute_value: bool) -> Result<String, UnescapeError> {
    let mut result = String::with_capacity(text.len());
    let mut state = UnescapeState::InsideText;
    let mut ampersand = 0;
    let mut name_start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match state {
            UnescapeState::InsideText => match c {
                '&' => {
                    ampersand = pos;
                    state = UnescapeState::AfterAmpersand;
                }
                '\t' | '\n' if is_attribute_value => result.push(' '),
                '\r' => {
                    result.push(if is_attribute_value { ' ' } else { '\n' });
                    if let Some((_, '\n')) = chars.peek() {
                        chars.next();
                    }
                }
                _ => result.push(c),
            },

            UnescapeState::AfterAmpersand => {
                if c == '#' {
                    name_start = pos + 1;
                    state = UnescapeState::AfterCharrefHash;
                } else if is_name_start_char(c) {
                    name_start = pos;
                    state = UnescapeState::InsideEntityName;
                } else if c == ';' {
                    return Err(UnescapeError::new(
                        ErrorKind::ParseError,
                        ampersand,
                        "Empty entity '&;' seen; valid entities are: &amp; &quot; &lt; &gt; &apos;"
                            .to_string(),
                    ));
                } else {
                    return Err(UnescapeError::new(
                        ErrorKind::ParseError,
                        ampersand,
                        format!(
                            "Character '{}' is not valid at the start of an entity name; \
                             the & character begins an entity; if this ampersand isn't \
                             supposed to be an entity, escape it as &amp;",
                            c
                        ),
                    ));
                }
            }

            UnescapeState::InsideEntityName => {
                if c == ';' {
                    let name = &text[name_start..pos];
                    match lookup(name) {
                        Some(entity) => result.push(entity),
                        None => {
                            return Err(UnescapeError::new(
                                ErrorKind::UnknownEntity,
                                ampersand,
                                format!("Entity name '{}' is not known", name),
                            ));
                        }
                    }
                    state = UnescapeState::InsideText;
                } else if !is_name_char(c) {
                    return Err(UnescapeError::new(
                        ErrorKind::ParseError,
                        ampersand,
                        format!("Character '{}' is not valid inside an entity name", c),
                    ));
                }
            }

            UnescapeState::AfterCharrefHash => {
                if c == ';' {
                    result.push(char_reference(&text[name_start..pos], ampersand)?);
                    state = UnescapeState::InsideText;
                }
            }
        }
    }

    match state {
        UnescapeState::InsideText => Ok(result),
        UnescapeState::AfterAmpersand | UnescapeState::InsideEntityName => {
            Err(UnescapeError::new(
                ErrorKind::UnterminatedReference,
                ampersand,
                "Entity did not end with a semicolon; most likely you used an ampersand \
                 character without intending to start an entity - escape ampersand as &amp;"
                    .to_string(),
            ))
        }
        UnescapeState::AfterCharrefHash => Err(UnescapeError::new(
            ErrorKind::UnterminatedReference,
            ampersand,
            "Character reference did not end with a semicolon; most likely you used an \
             ampersand character without intending to start an entity - escape ampersand \
             as &amp;"
                .to_string(),
        )),
    }
}

fn char_reference(body: &str, ampersand: usize) -> Result<char, UnescapeError> {
    let (digits, radix) = match body.strip_prefix('x') {
        Some(hex) => (hex, 16),
        None => (body, 10),
    };
    if digits.is_empty() {
        return Err(UnescapeError::new(
            ErrorKind::ParseError,
            ampersand,
            "Empty character reference; should include a digit such as &#454;".to_string(),
        ));
    }

    let not_a_number = || {
        UnescapeError::new(
            ErrorKind::ParseError,
            ampersand,
            format!(
                "Failed to parse '{}', which should have been a digit inside a character \
                 reference (&#234; for example) - perhaps the digit is too large",
                digits
            ),
        )
    };
    // from_str_radix would accept a sign too
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(not_a_number());
    }
    let value = u32::from_str_radix(digits, radix).map_err(|_| not_a_number())?;

    match char::from_u32(value) {
        Some(c) if is_valid_xml_char(value) => Ok(c),
        _ => Err(UnescapeError::new(
            ErrorKind::InvalidCharacterReference,
            ampersand,
            format!(
                "Character reference '{}' does not encode a permitted character",
                digits
            ),
        )),
    }
}

/// Replaces entity and character references in markup text.
///
/// With `is_attribute_value` set, the attribute value normalization is
/// applied too: tabs, newlines and carriage returns become spaces. Outside
/// attribute values a carriage return, or a carriage return and newline
/// pair, becomes a single newline.
///
/// Error positions are relative to the beginning of the text, counting
/// from line 1 column 1, and point at the `&` of the bad reference.
///
/// ```
/// assert_eq!(markup::decode("&lt;b&gt; &#65;&#x42;", false).unwrap(), "<b> AB");
/// ```
pub fn decode(text: &str, is_attribute_value: bool) -> Result<String, MarkupError> {
    unescape(text, is_attribute_value).map_err(|err| {
        let mut location = Location::new();
        location.advance_str(&text[..err.offset]);
        MarkupError::at(err.kind, err.message, location.line, location.column)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_size() {
        const NOESCAPE: &str = "abc$#@!%^*(){}[]=-+/.,;:FDSF3443";
        assert_eq!(escaped_size(NOESCAPE), NOESCAPE.len());
        assert_eq!(escaped_size("abc&def"), "abc&amp;def".len());
        assert_eq!(escaped_size("<>&'\""), "&lt;&gt;&amp;&apos;&quot;".len());
        assert_eq!(escaped_size("ç<"), "ç&lt;".len());
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_text(""), "");
        assert_eq!(escape_text("plain"), "plain");
        assert_eq!(escape_text("<>&'\""), "&lt;&gt;&amp;&apos;&quot;");
        assert_eq!(escape_text("Чингис & хан"), "Чингис &amp; хан");
        assert_eq!(format!("{}", Escaped("1<2")), "1&lt;2");
        assert_eq!(
            crate::format_escaped!("<a b=\"{}\">{}</a>", "\"q\"", 5),
            "<a b=\"&quot;q&quot;\">5</a>"
        );
    }

    #[test]
    fn predefined_entities() {
        assert_eq!(decode("&lt;&gt;&amp;&quot;&apos;", false).unwrap(), "<>&\"'");
        assert_eq!(decode("&#65;", false).unwrap(), "A");
        assert_eq!(decode("&#x41;", false).unwrap(), "A");
        assert_eq!(decode("&#x3B;&#x3b;", false).unwrap(), ";;");
        assert_eq!(
            decode(" &#x90; &#x900; &#x10abc; ", false).unwrap(),
            " \u{90} \u{900} \u{10abc} "
        );
        assert_eq!(
            decode("&#xD7FF;&#xFFFD;&#x10FFFF;", false).unwrap(),
            "\u{d7ff}\u{fffd}\u{10ffff}"
        );
    }

    #[test]
    fn round_trip() {
        for s in [
            "",
            "abc",
            "<tag attr='1'>&amp;</tag>",
            "\"'\"",
            "Чингис хан & ёж",
            "a\nb\tc",
        ] {
            assert_eq!(decode(&escape_text(s), false).unwrap(), s);
        }
    }

    #[test]
    fn line_endings() {
        assert_eq!(decode("a\r\nb\rc\n", false).unwrap(), "a\nb\nc\n");
        assert_eq!(decode("a\r\nb\rc\nd\te", true).unwrap(), "a b c d e");
        assert_eq!(decode("&#13;&#10;", false).unwrap(), "\r\n");
        assert_eq!(decode("&#9;", true).unwrap(), "\t");
    }

    #[test]
    fn plain_check() {
        assert!(is_plain("abc def", false));
        assert!(is_plain("abc\ndef", false));
        assert!(!is_plain("abc\ndef", true));
        assert!(!is_plain("a&amp;", false));
        assert!(!is_plain("a\r", false));
    }

    #[test]
    fn bad_references() {
        let err = decode("x &unknown; y", false).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownEntity);
        assert_eq!((err.line, err.column), (1, 3));

        let err = decode("&lala", false).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedReference);
        assert_eq!((err.line, err.column), (1, 1));

        let err = decode("ab\ncd &#123", false).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedReference);
        assert_eq!((err.line, err.column), (2, 4));

        let err = decode("tail &", false).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedReference);
        assert_eq!((err.line, err.column), (1, 6));

        assert_eq!(decode("&;", false).unwrap_err().kind, ErrorKind::ParseError);
        assert_eq!(decode("& b", false).unwrap_err().kind, ErrorKind::ParseError);
        assert_eq!(decode("&lala lala;", false).unwrap_err().kind, ErrorKind::ParseError);
        assert_eq!(decode("&#;", false).unwrap_err().kind, ErrorKind::ParseError);
        assert_eq!(decode("&#x;", false).unwrap_err().kind, ErrorKind::ParseError);
        assert_eq!(decode("&#1a;", false).unwrap_err().kind, ErrorKind::ParseError);
        assert_eq!(decode("&#Xaa;", false).unwrap_err().kind, ErrorKind::ParseError);
        assert_eq!(decode("&#xa5g;", false).unwrap_err().kind, ErrorKind::ParseError);
        assert_eq!(decode("&#+65;", false).unwrap_err().kind, ErrorKind::ParseError);
        assert_eq!(decode("&#99999999999;", false).unwrap_err().kind, ErrorKind::ParseError);
    }

    #[test]
    fn forbidden_characters() {
        for reference in [
            "&#0;", "&#8;", "&#11;", "&#15;", "&#xD800;", "&#xDfFf;", "&#xfFfE;", "&#xFFff;",
            "&#x110000;",
        ] {
            let err = decode(reference, false).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidCharacterReference, "{}", reference);
            assert_eq!((err.line, err.column), (1, 1));
        }
    }
}
