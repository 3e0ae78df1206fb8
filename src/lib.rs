/*
** This file is a part of Markup (incremental XML subset parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Markup is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod entities;
mod parser;
mod utf8;
mod writer;

pub use parser::ErrorKind;
pub use parser::Location;
pub use parser::MarkupError;
pub use parser::MarkupHandler;
pub use parser::MarkupParser;
pub use parser::NullHandler;

pub use entities::decode;
pub use entities::escape;
pub use entities::escape_text;
pub use entities::escaped_size;
pub use entities::predefined;
pub use entities::Escaped;

pub use writer::MarkupWriter;
