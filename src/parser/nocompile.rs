/*
** This file is a part of Markup (incremental XML subset parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Markup is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

/// # Must not compile tests
///
/// Current element name cannot be held across a feed:
/// ```compile_fail
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use markup::{MarkupParser, NullHandler};
/// let mut parser = MarkupParser::new("doc");
/// parser.feed(&mut NullHandler, b"<a>")?;
/// let name = parser.current_element();
/// parser.feed(&mut NullHandler, b"</a>")?;
/// println!("{:?}", name);
/// # Ok(())
/// # }
/// ```
///
/// Handler cannot be the parser's own state:
/// ```compile_fail
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use markup::{MarkupHandler, MarkupParser};
/// struct Nested<'a> {
///     parser: &'a mut MarkupParser,
/// }
/// impl<'a> MarkupHandler for Nested<'a> {
///     fn text(&mut self, text: &str) -> Result<(), markup::MarkupError> {
///         self.parser.feed(&mut markup::NullHandler, text.as_bytes())
///     }
/// }
/// let mut parser = MarkupParser::new("doc");
/// let mut nested = Nested { parser: &mut parser };
/// parser.feed(&mut nested, b"<a>x</a>")?;
/// # Ok(())
/// # }
/// ```
///
#[cfg(doctest)]
struct MustNotCompileTests;
