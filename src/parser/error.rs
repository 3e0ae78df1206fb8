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

/// Type of the error which stopped the markup parsing.
///
/// The first group is raised by the parser itself. The client group is
/// never raised by the parser, it is there for
/// [MarkupHandler](crate::MarkupHandler) implementations which reject
/// well-formed but unexpected content.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Input is not valid UTF-8.
    BadUtf8,

    /// A syntax error. The message of the error describes the problem.
    ParseError,

    /// Document was empty or contained only whitespace.
    EmptyDocument,

    /// An entity reference other than the five predefined ones.
    UnknownEntity,

    /// An entity or character reference without the closing semicolon.
    UnterminatedReference,

    /// A character reference to a character which XML does not permit.
    InvalidCharacterReference,

    /// The parser was used against its contract.
    ///
    /// This happens when feeding a parser which already failed, or
    /// feeding while another call on the same parser is in progress.
    /// It does not describe the document and it does not change the
    /// parser state.
    ParserMisuse,

    InvalidElement,
    InvalidAttribute,
    InvalidContent,
    MissingElement,
    MissingAttribute,
    MissingContent,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ErrorKind::BadUtf8 => "invalid utf-8 encoding",
            ErrorKind::ParseError => "invalid markup syntax",
            ErrorKind::EmptyDocument => "empty document",
            ErrorKind::UnknownEntity => "unknown entity",
            ErrorKind::UnterminatedReference => "unterminated reference",
            ErrorKind::InvalidCharacterReference => "invalid character reference",
            ErrorKind::ParserMisuse => "parser misuse",
            ErrorKind::InvalidElement => "invalid element",
            ErrorKind::InvalidAttribute => "invalid attribute",
            ErrorKind::InvalidContent => "invalid content",
            ErrorKind::MissingElement => "missing element",
            ErrorKind::MissingAttribute => "missing attribute",
            ErrorKind::MissingContent => "missing content",
        };
        write!(f, "{}", text)
    }
}

/// Error returned from the parser, or from a handler callback.
///
/// Handlers create errors with [MarkupError::new()]; the parser fills in the
/// line and column of the input position where the callback was made.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarkupError {
    pub kind: ErrorKind,
    pub message: String,
    /// Line of the offending input, starting from one. Zero if unknown.
    pub line: u32,
    /// Column of the offending input, starting from one. Zero if unknown.
    pub column: u32,
}

impl MarkupError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        MarkupError {
            kind,
            message: message.into(),
            line: 0,
            column: 0,
        }
    }

    pub(crate) fn at(kind: ErrorKind, message: impl Into<String>, line: u32, column: u32) -> Self {
        MarkupError {
            kind,
            message: message.into(),
            line,
            column,
        }
    }
}

impl Display for MarkupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line > 0 {
            write!(f, "{}:{}: {}", self.line, self.column, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for MarkupError {}
