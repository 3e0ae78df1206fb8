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

/// A position in the parser input stream.
///
/// This struct is returned from the
/// [location()](crate::MarkupParser::location) method and names the
/// next character the parser is going to consume. Errors carry the
/// line and column of the location where they were detected.
///
/// Lines and columns start from one and columns count characters, not
/// bytes. A newline character belongs to the line it ends.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Location {
    /// Byte position in the input stream.
    pub bytes: usize,
    /// Line number, starting from one.
    pub line: u32,
    /// Character position in the line, starting from one.
    pub column: u32,
}

impl Location {
    /// Creates a new location at the beginning of the input stream.
    ///
    /// This constructor is made public in case if you store the
    /// location in somewhere and need a default.
    pub fn new() -> Self {
        Location {
            bytes: 0,
            line: 1,
            column: 1,
        }
    }

    pub(crate) fn advance(&mut self, c: char) {
        self.bytes += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    pub(crate) fn advance_str(&mut self, s: &str) {
        for c in s.chars() {
            self.advance(c);
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::new()
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "byte: {}, line: {}, column: {}",
            self.bytes, self.line, self.column
        )
    }
}
