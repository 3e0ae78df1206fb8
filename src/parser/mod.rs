/*
** This file is a part of Markup (incremental XML subset parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Markup is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod error;
mod handler;
mod location;

pub use error::ErrorKind;
pub use error::MarkupError;
pub use handler::MarkupHandler;
pub use handler::NullHandler;
pub use location::Location;

use crate::entities;
use crate::utf8;

/// Incremental markup parser.
///
/// The parser is fed with arbitrarily sized byte chunks and invokes the
/// [MarkupHandler] callbacks as soon as each construct is complete. How the
/// input is split does not matter: characters, names, attribute values and
/// references may be cut anywhere and the callbacks are still the same as
/// when the whole document is fed at once.
///
/// # Examples
///
/// ```
/// use markup::{MarkupError, MarkupHandler, MarkupParser};
///
/// // Example handler which just prints element names
/// struct Handler { }
/// impl MarkupHandler for Handler {
///     fn start_element(
///         &mut self,
///         name: &str,
///         _attribute_names: &[String],
///         _attribute_values: &[String],
///     ) -> Result<(), MarkupError> {
///         println!("Element: {}", name);
///         Ok(())
///     }
/// }
/// let mut handler = Handler {};
///
/// let mut parser = MarkupParser::new("example.xml");
/// match parser.feed_finish(&mut handler, b"<doc>example</doc>") {
///     Ok(()) => (),
///     Err(err) => {
///         println!("{}:{}:{}: {}", parser.source_name(), err.line, err.column, err.message);
///         return;
///     }
/// }
/// ```
///
/// Alternatively you can pass the input in multiple blocks:
/// ```
/// # use markup::{MarkupError, MarkupParser, NullHandler};
/// # fn main() -> Result<(), MarkupError> {
/// # let mut handler = NullHandler;
/// # let mut parser = MarkupParser::new("stream");
/// # use std::io::Read;
/// # let binding = vec!(b'<', b'a', b'/', b'>');
/// # let mut xml_file = binding.as_slice();
/// let mut buffer = [0u8; 1024];
/// loop {
///     let len = xml_file.read(&mut buffer).expect("io error");
///     if len == 0 {
///         break;
///     }
///     parser.feed(&mut handler, &buffer[0..len])?
/// }
/// // This is to check if there is any incomplete construct at the end
/// parser.end_of_input(&mut handler)?;
/// # Ok(())
/// # }
/// ```
pub struct MarkupParser {
    source_name: String,
    state: State,
    location: Location,
    token_start: Location,
    partial_chunk: String,
    tag_stack: Vec<String>,
    attr_names: Vec<String>,
    attr_values: Vec<String>,
    leftover_char_portion: Vec<u8>,
    balance: i32,
    document_empty: bool,
    parsing: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Start,
    AfterOpenAngle,
    AfterCloseAngle,
    AfterElisionSlash,
    InsideOpenTagName,
    InsideAttributeName,
    AfterAttributeName,
    BetweenAttributes,
    AfterAttributeEqualsSign,
    InsideAttributeValueSq,
    InsideAttributeValueDq,
    InsideText,
    AfterCloseTagSlash,
    InsideCloseTagName,
    AfterCloseTagName,
    InsidePassthrough,
    Error,
}

const INITIAL_BUFFER_CAPACITY: usize = 128;

const LOG_TARGET: &str = "markup.parser";

macro_rules! whitespace {
    () => {
        ' ' | '\t' | '\r' | '\n'
    };
}

pub(crate) fn is_name_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == ':' || (!c.is_ascii() && c.is_alphabetic())
}

pub(crate) fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '.' | '-' | '_' | ':')
        || (!c.is_ascii() && c.is_alphanumeric())
}

impl MarkupParser {
    /// Creates a new parser for one document.
    ///
    /// The source name is only used for reporting, typically it is the
    /// file name of the document.
    pub fn new(source_name: impl Into<String>) -> MarkupParser {
        MarkupParser {
            source_name: source_name.into(),
            state: State::Start,
            location: Location::new(),
            token_start: Location::new(),
            partial_chunk: String::with_capacity(INITIAL_BUFFER_CAPACITY),
            tag_stack: Vec::new(),
            attr_names: Vec::new(),
            attr_values: Vec::new(),
            leftover_char_portion: Vec::with_capacity(utf8::MAX_SEQUENCE_LEN),
            balance: 0,
            document_empty: true,
            parsing: false,
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Name of the innermost open element, if any.
    pub fn current_element(&self) -> Option<&str> {
        self.tag_stack.last().map(String::as_str)
    }

    /// Number of open elements.
    pub fn depth(&self) -> usize {
        self.tag_stack.len()
    }

    /// Position of the next character to parse.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Line, column, and source name of the next character to parse.
    pub fn position(&self) -> (u32, u32, &str) {
        (self.location.line, self.location.column, &self.source_name)
    }

    fn top(&self) -> &str {
        self.current_element().unwrap_or("")
    }

    fn last_attribute(&self) -> &str {
        self.attr_names.last().map(String::as_str).unwrap_or("")
    }

    fn misuse(&self, message: &str) -> MarkupError {
        MarkupError::at(
            ErrorKind::ParserMisuse,
            message,
            self.location.line,
            self.location.column,
        )
    }

    fn check_ready(&self) -> Result<(), MarkupError> {
        if self.state == State::Error {
            return Err(self.misuse("parser already failed, it cannot be used any more"));
        }
        if self.parsing {
            return Err(self.misuse("parser is already running"));
        }
        Ok(())
    }

    fn fail(&mut self, handler: &mut impl MarkupHandler, error: MarkupError) -> MarkupError {
        self.state = State::Error;
        log::debug!(target: LOG_TARGET, "{}: {}", self.source_name, error);
        handler.error(&error);
        error
    }

    fn error_here(
        &mut self,
        handler: &mut impl MarkupHandler,
        kind: ErrorKind,
        message: String,
    ) -> MarkupError {
        let error = MarkupError::at(kind, message, self.location.line, self.location.column);
        self.fail(handler, error)
    }

    fn syntax_error(&mut self, handler: &mut impl MarkupHandler, message: String) -> MarkupError {
        self.error_here(handler, ErrorKind::ParseError, message)
    }

    fn check_callback(
        &mut self,
        handler: &mut impl MarkupHandler,
        result: Result<(), MarkupError>,
    ) -> Result<(), MarkupError> {
        match result {
            Ok(()) => Ok(()),
            Err(mut error) => {
                error.line = self.location.line;
                error.column = self.location.column;
                Err(self.fail(handler, error))
            }
        }
    }

    /// Takes the collected raw text and replaces its references.
    fn unescape_partial(
        &mut self,
        handler: &mut impl MarkupHandler,
        is_attribute_value: bool,
    ) -> Result<String, MarkupError> {
        let raw = std::mem::take(&mut self.partial_chunk);
        if entities::is_plain(&raw, is_attribute_value) {
            return Ok(raw);
        }
        match entities::unescape(&raw, is_attribute_value) {
            Ok(text) => {
                self.partial_chunk = raw;
                self.partial_chunk.clear();
                Ok(text)
            }
            Err(err) => {
                let mut at = self.token_start;
                at.advance_str(&raw[..err.offset]);
                let error = MarkupError::at(err.kind, err.message, at.line, at.column);
                Err(self.fail(handler, error))
            }
        }
    }

    fn passthrough_complete(&self) -> bool {
        let text = &self.partial_chunk;
        (text.starts_with("<?") && text.ends_with('?'))
            || (text.starts_with("<!--") && text.ends_with("--"))
            || (text.starts_with("<![CDATA[") && text.ends_with("]]"))
            || (text.starts_with("<!DOCTYPE") && self.balance == 0)
    }

    /// Checks if the document is complete.
    ///
    /// A completed document has at least one element and no unfinished
    /// constructs, such as open elements, comments or attribute values.
    pub fn end_of_input(&mut self, handler: &mut impl MarkupHandler) -> Result<(), MarkupError> {
        self.check_ready()?;

        if !self.leftover_char_portion.is_empty() {
            return Err(self.error_here(
                handler,
                ErrorKind::BadUtf8,
                "Document ended in the middle of a UTF-8 encoded character".to_string(),
            ));
        }
        if self.document_empty {
            return Err(self.error_here(
                handler,
                ErrorKind::EmptyDocument,
                "Document was empty or contained only whitespace".to_string(),
            ));
        }

        let message = match self.state {
            State::Start => return Ok(()),
            State::AfterCloseAngle | State::InsideText => {
                if self.tag_stack.is_empty() {
                    return Ok(());
                }
                format!(
                    "Document ended unexpectedly with elements still open - \
                     '{}' was the last element opened",
                    self.top()
                )
            }
            State::AfterOpenAngle => {
                "Document ended unexpectedly just after an open angle bracket '<'".to_string()
            }
            State::AfterElisionSlash => format!(
                "Document ended unexpectedly, expected to see a close angle \
                 bracket ending the tag <{}/>",
                self.top()
            ),
            State::InsideOpenTagName => {
                "Document ended unexpectedly inside an element name".to_string()
            }
            State::InsideAttributeName | State::AfterAttributeName => {
                "Document ended unexpectedly inside an attribute name".to_string()
            }
            State::BetweenAttributes => {
                "Document ended unexpectedly inside an element-opening tag.".to_string()
            }
            State::AfterAttributeEqualsSign => "Document ended unexpectedly after the equals \
                                                sign following an attribute name; no \
                                                attribute value"
                .to_string(),
            State::InsideAttributeValueSq | State::InsideAttributeValueDq => {
                "Document ended unexpectedly while inside an attribute value".to_string()
            }
            State::AfterCloseTagSlash | State::InsideCloseTagName | State::AfterCloseTagName => {
                format!(
                    "Document ended unexpectedly inside the close tag for element '{}'",
                    self.top()
                )
            }
            State::InsidePassthrough => "Document ended unexpectedly inside a comment or \
                                         processing instruction"
                .to_string(),
            State::Error => unreachable!("checked by check_ready"),
        };
        Err(self.syntax_error(handler, message))
    }

    /// Parses the given bytes and checks if the document is complete.
    ///
    /// This is a convenience function which calls [feed()](MarkupParser::feed)
    /// and [end_of_input()](MarkupParser::end_of_input) methods for you.
    pub fn feed_finish(
        &mut self,
        handler: &mut impl MarkupHandler,
        bytes: &[u8],
    ) -> Result<(), MarkupError> {
        self.feed(handler, bytes)?;
        self.end_of_input(handler)
    }

    /// Parses the next chunk of the document.
    ///
    /// A chunk can end anywhere, even in the middle of a multi byte
    /// character. Once an error is returned the parser stays failed and
    /// every later call returns a [ParserMisuse](ErrorKind::ParserMisuse)
    /// error.
    pub fn feed(
        &mut self,
        handler: &mut impl MarkupHandler,
        bytes: &[u8],
    ) -> Result<(), MarkupError> {
        self.check_ready()?;
        if bytes.is_empty() {
            return Ok(());
        }

        self.parsing = true;
        let result = self.feed_bytes(handler, bytes);
        self.parsing = false;
        result
    }

    fn feed_bytes(
        &mut self,
        handler: &mut impl MarkupHandler,
        bytes: &[u8],
    ) -> Result<(), MarkupError> {
        let mut rest = bytes;

        // Complete the character cut at the end of the previous chunk first
        if let Some(&lead) = self.leftover_char_portion.first() {
            let needed = utf8::sequence_len(lead).unwrap_or(0);
            let missing = needed.saturating_sub(self.leftover_char_portion.len());
            let take = missing.min(rest.len());
            self.leftover_char_portion.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
            // A carried lead byte followed by anything but continuation
            // bytes is bad right away, as it would be in a single chunk
            if needed == 0
                || !self.leftover_char_portion[1..]
                    .iter()
                    .all(|&byte| utf8::is_continuation(byte))
            {
                return Err(self.error_here(
                    handler,
                    ErrorKind::BadUtf8,
                    "Invalid UTF-8 encoded text".to_string(),
                ));
            }
            if self.leftover_char_portion.len() < needed {
                log::trace!(
                    target: LOG_TARGET,
                    "{} of {} bytes of a character carried over",
                    self.leftover_char_portion.len(),
                    needed
                );
                return Ok(());
            }
            let portion = std::mem::take(&mut self.leftover_char_portion);
            self.feed_chunk(handler, &portion)?;
            self.leftover_char_portion = portion;
            self.leftover_char_portion.clear();
        }

        if rest.is_empty() {
            return Ok(());
        }
        self.feed_chunk(handler, rest)
    }

    fn feed_chunk(
        &mut self,
        handler: &mut impl MarkupHandler,
        bytes: &[u8],
    ) -> Result<(), MarkupError> {
        let end = utf8::complete_prefix_len(bytes);
        if end < bytes.len() {
            log::trace!(
                target: LOG_TARGET,
                "chunk ends with {} bytes of an incomplete character",
                bytes.len() - end
            );
            self.leftover_char_portion.extend_from_slice(&bytes[end..]);
        }

        match utf8::validate(&bytes[..end]) {
            Ok(text) => self.parse_text(handler, text),
            Err(valid) => {
                // Constructs before the bad byte are reported as usual
                self.parse_text(handler, valid)?;
                Err(self.error_here(
                    handler,
                    ErrorKind::BadUtf8,
                    "Invalid UTF-8 encoded text".to_string(),
                ))
            }
        }
    }

    fn parse_text(
        &mut self,
        handler: &mut impl MarkupHandler,
        text: &str,
    ) -> Result<(), MarkupError> {
        let mut pos: usize = 0;
        let mut back: usize = 0;

        while let Some(c) = text[pos..].chars().next() {
            let next = pos + c.len_utf8();
            let mut redo: bool = false;

            match self.state {
                State::Start => match c {
                    whitespace!() => (),
                    '<' => {
                        self.document_empty = false;
                        self.state = State::AfterOpenAngle;
                    }
                    _ => {
                        return Err(self.syntax_error(
                            handler,
                            "Document must begin with an element (e.g. <book>)".to_string(),
                        ));
                    }
                },

                State::AfterOpenAngle => match c {
                    '?' | '!' => {
                        self.partial_chunk.push('<');
                        back = pos;
                        self.balance = 1;
                        self.state = State::InsidePassthrough;
                    }
                    '/' => self.state = State::AfterCloseTagSlash,
                    _ if is_name_start_char(c) => {
                        back = pos;
                        self.state = State::InsideOpenTagName;
                    }
                    _ => {
                        return Err(self.syntax_error(
                            handler,
                            format!(
                                "'{}' is not a valid character following a '<' character; \
                                 it may not begin an element name",
                                c
                            ),
                        ));
                    }
                },

                State::AfterCloseAngle => {
                    if self.tag_stack.is_empty() {
                        self.state = State::Start;
                    } else {
                        self.token_start = self.location;
                        back = pos;
                        self.state = State::InsideText;
                    }
                    redo = true;
                }

                State::AfterElisionSlash => {
                    if c != '>' {
                        return Err(self.syntax_error(
                            handler,
                            format!(
                                "Odd character '{}', expected a '>' character to end the \
                                 start tag of element '{}'",
                                c,
                                self.top()
                            ),
                        ));
                    }
                    let name = match self.tag_stack.pop() {
                        Some(name) => name,
                        None => unreachable!("empty element tag without an open element"),
                    };
                    self.state = State::AfterCloseAngle;
                    let result = handler.end_element(&name);
                    self.check_callback(handler, result)?;
                }

                State::InsideOpenTagName => {
                    if !is_name_char(c) {
                        self.partial_chunk.push_str(&text[back..pos]);
                        let name = std::mem::take(&mut self.partial_chunk);
                        self.tag_stack.push(name);
                        self.state = State::BetweenAttributes;
                        redo = true;
                    }
                }

                State::BetweenAttributes => match c {
                    whitespace!() => (),
                    '/' | '>' => {
                        self.state = if c == '/' {
                            State::AfterElisionSlash
                        } else {
                            State::AfterCloseAngle
                        };
                        let result =
                            handler.start_element(self.top(), &self.attr_names, &self.attr_values);
                        self.attr_names.clear();
                        self.attr_values.clear();
                        self.check_callback(handler, result)?;
                    }
                    _ if is_name_start_char(c) => {
                        back = pos;
                        self.state = State::InsideAttributeName;
                    }
                    _ => {
                        return Err(self.syntax_error(
                            handler,
                            format!(
                                "Odd character '{}', expected a '>' or '/' character to end \
                                 the start tag of element '{}', or optionally an attribute; \
                                 perhaps you used an invalid character in an attribute name",
                                c,
                                self.top()
                            ),
                        ));
                    }
                },

                State::InsideAttributeName => {
                    if !is_name_char(c) {
                        self.partial_chunk.push_str(&text[back..pos]);
                        self.state = State::AfterAttributeName;
                        redo = true;
                    }
                }

                State::AfterAttributeName => match c {
                    whitespace!() => (),
                    _ => {
                        let name = std::mem::take(&mut self.partial_chunk);
                        self.attr_names.push(name);
                        self.attr_values.push(String::new());
                        if c != '=' {
                            return Err(self.syntax_error(
                                handler,
                                format!(
                                    "Odd character '{}', expected a '=' after attribute name \
                                     '{}' of element '{}'",
                                    c,
                                    self.last_attribute(),
                                    self.top()
                                ),
                            ));
                        }
                        self.state = State::AfterAttributeEqualsSign;
                    }
                },

                State::AfterAttributeEqualsSign => match c {
                    whitespace!() => (),
                    '"' | '\'' => {
                        back = next;
                        self.token_start = self.location;
                        self.token_start.advance(c);
                        self.state = if c == '"' {
                            State::InsideAttributeValueDq
                        } else {
                            State::InsideAttributeValueSq
                        };
                    }
                    _ => {
                        return Err(self.syntax_error(
                            handler,
                            format!(
                                "Odd character '{}', expected an open quote mark after the \
                                 equals sign when giving value for attribute '{}' of \
                                 element '{}'",
                                c,
                                self.last_attribute(),
                                self.top()
                            ),
                        ));
                    }
                },

                State::InsideAttributeValueSq | State::InsideAttributeValueDq => {
                    let delim = if self.state == State::InsideAttributeValueSq {
                        '\''
                    } else {
                        '"'
                    };
                    if c == delim {
                        self.partial_chunk.push_str(&text[back..pos]);
                        let value = self.unescape_partial(handler, true)?;
                        if let Some(last) = self.attr_values.last_mut() {
                            *last = value;
                        }
                        self.state = State::BetweenAttributes;
                    }
                }

                State::InsideText => {
                    if c == '<' {
                        self.partial_chunk.push_str(&text[back..pos]);
                        let content = self.unescape_partial(handler, false)?;
                        self.state = State::AfterOpenAngle;
                        if !content.is_empty() {
                            let result = handler.text(&content);
                            self.check_callback(handler, result)?;
                        }
                    }
                }

                State::AfterCloseTagSlash => {
                    if !is_name_start_char(c) {
                        return Err(self.syntax_error(
                            handler,
                            format!(
                                "'{}' is not a valid character following the characters \
                                 '</'; '{}' may not begin an element name",
                                c, c
                            ),
                        ));
                    }
                    back = pos;
                    self.state = State::InsideCloseTagName;
                }

                State::InsideCloseTagName => {
                    if !is_name_char(c) {
                        self.partial_chunk.push_str(&text[back..pos]);
                        self.state = State::AfterCloseTagName;
                        redo = true;
                    }
                }

                State::AfterCloseTagName => match c {
                    whitespace!() => (),
                    _ => {
                        let close_name = std::mem::take(&mut self.partial_chunk);
                        if c != '>' {
                            return Err(self.syntax_error(
                                handler,
                                format!(
                                    "'{}' is not a valid character following the close \
                                     element name '{}'; the allowed character is '>'",
                                    c, close_name
                                ),
                            ));
                        }
                        let message = match self.tag_stack.last() {
                            None => Some(format!(
                                "Element '{}' was closed, no element is currently open",
                                close_name
                            )),
                            Some(open) if *open != close_name => Some(format!(
                                "Element '{}' was closed, but the currently open element is '{}'",
                                close_name, open
                            )),
                            Some(_) => None,
                        };
                        if let Some(message) = message {
                            return Err(self.syntax_error(handler, message));
                        }
                        self.tag_stack.pop();
                        self.state = State::AfterCloseAngle;
                        let result = handler.end_element(&close_name);
                        self.check_callback(handler, result)?;
                    }
                },

                State::InsidePassthrough => match c {
                    '<' => self.balance += 1,
                    '>' => {
                        self.balance -= 1;
                        self.partial_chunk.push_str(&text[back..pos]);
                        back = pos;
                        if self.passthrough_complete() {
                            self.partial_chunk.push('>');
                            back = next;
                            self.state = State::AfterCloseAngle;
                            let result = handler.pass_through(&self.partial_chunk);
                            self.partial_chunk.clear();
                            self.check_callback(handler, result)?;
                        }
                    }
                    _ => (),
                },

                State::Error => unreachable!("parsing continued after an error"),
            }

            if !redo {
                self.location.advance(c);
                pos = next;
            }
        }

        if back < pos {
            match self.state {
                State::InsideOpenTagName
                | State::InsideAttributeName
                | State::InsideCloseTagName
                | State::InsideAttributeValueSq
                | State::InsideAttributeValueDq
                | State::InsideText
                | State::InsidePassthrough => self.partial_chunk.push_str(&text[back..pos]),
                _ => (),
            }
        }

        Ok(())
    }
}

mod nocompile;
