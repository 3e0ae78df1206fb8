/*
** This file is a part of Markup (incremental XML subset parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Markup is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use super::MarkupError;

/// Receiver of the markup events.
///
/// Every method has a default implementation which does nothing, so a
/// handler only implements what it consumes. Returning an error from any
/// content callback aborts the parsing: the parser stamps the current input
/// position on the error, passes it to [error()](MarkupHandler::error) and
/// returns it from the running [feed()](crate::MarkupParser::feed) call.
pub trait MarkupHandler {
    /// Called for start tags and empty element tags.
    ///
    /// Attribute values have their references replaced and whitespace
    /// normalized. The two slices always have the same length.
    fn start_element(
        &mut self,
        _name: &str,
        _attribute_names: &[String],
        _attribute_values: &[String],
    ) -> Result<(), MarkupError> {
        Ok(())
    }

    /// Called for end tags, and right after start_element for empty element tags.
    fn end_element(&mut self, _name: &str) -> Result<(), MarkupError> {
        Ok(())
    }

    /// Called with the decoded character data between two tags.
    ///
    /// A continuous run of text is always delivered in a single call,
    /// regardless of how the input was split into feed calls.
    fn text(&mut self, _text: &str) -> Result<(), MarkupError> {
        Ok(())
    }

    /// Called with comments, processing instructions, CDATA sections and
    /// document type declarations.
    ///
    /// The text is passed verbatim including the delimiters, so it can be
    /// written back to the same position unchanged.
    fn pass_through(&mut self, _text: &str) -> Result<(), MarkupError> {
        Ok(())
    }

    /// Called once when the parsing fails, including failures raised by
    /// the other callbacks.
    fn error(&mut self, _error: &MarkupError) {}
}

/// A handler which ignores every event.
///
/// Useful for checking well-formedness only.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullHandler;

impl MarkupHandler for NullHandler {}
