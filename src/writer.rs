/*
** This file is a part of Markup (incremental XML subset parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Markup is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use crate::entities::escape;
use crate::entities::escaped_size;
use crate::MarkupError;
use crate::MarkupHandler;

/// A handler which writes the events back as markup.
///
/// Elements without content are written as empty element tags, attribute
/// values are double quoted, and text and attribute values are escaped so
/// that parsing the output gives the same events again. Comments,
/// processing instructions, CDATA sections and document type declarations
/// are copied verbatim.
///
/// ```
/// use markup::{MarkupParser, MarkupWriter};
///
/// let mut writer = MarkupWriter::new();
/// let mut parser = MarkupParser::new("doc");
/// parser.feed_finish(&mut writer, b"<a x='1'>&lt;b&gt;<c></c></a>").unwrap();
/// assert_eq!(writer.as_str(), "<a x=\"1\">&lt;b&gt;<c/></a>");
/// ```
#[derive(Debug, Default)]
pub struct MarkupWriter {
    buf: String,
    start_tag_open: bool,
    depth: usize,
}

impl MarkupWriter {
    pub fn new() -> MarkupWriter {
        MarkupWriter::default()
    }

    /// Creates a writer appending to an existing buffer.
    pub fn with_buffer(buf: String) -> MarkupWriter {
        MarkupWriter {
            buf,
            start_tag_open: false,
            depth: 0,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }

    /// Number of elements started but not ended yet.
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn close_start_tag(&mut self) {
        if self.start_tag_open {
            self.buf.push('>');
            self.start_tag_open = false;
        }
    }

    // Whitespace which the parser would normalize is kept as references
    fn push_escaped(&mut self, s: &str, is_attribute_value: bool) {
        self.buf.reserve(escaped_size(s));
        let mut back = 0;
        for (pos, c) in s.char_indices() {
            let reference = match c {
                '\r' => "&#13;",
                '\t' if is_attribute_value => "&#9;",
                '\n' if is_attribute_value => "&#10;",
                _ => continue,
            };
            // writing into a String cannot fail
            let _ = escape(&s[back..pos], &mut self.buf);
            self.buf.push_str(reference);
            back = pos + 1;
        }
        let _ = escape(&s[back..], &mut self.buf);
    }
}

impl MarkupHandler for MarkupWriter {
    fn start_element(
        &mut self,
        name: &str,
        attribute_names: &[String],
        attribute_values: &[String],
    ) -> Result<(), MarkupError> {
        self.close_start_tag();
        self.buf.push('<');
        self.buf.push_str(name);
        for (name, value) in attribute_names.iter().zip(attribute_values) {
            self.buf.push(' ');
            self.buf.push_str(name);
            self.buf.push_str("=\"");
            self.push_escaped(value, true);
            self.buf.push('"');
        }
        self.start_tag_open = true;
        self.depth += 1;
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<(), MarkupError> {
        if self.start_tag_open {
            self.buf.push_str("/>");
            self.start_tag_open = false;
        } else {
            self.buf.push_str("</");
            self.buf.push_str(name);
            self.buf.push('>');
        }
        self.depth = self.depth.saturating_sub(1);
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), MarkupError> {
        self.close_start_tag();
        self.push_escaped(text, false);
        Ok(())
    }

    fn pass_through(&mut self, text: &str) -> Result<(), MarkupError> {
        self.close_start_tag();
        self.buf.push_str(text);
        Ok(())
    }
}
