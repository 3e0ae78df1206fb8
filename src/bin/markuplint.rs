/*
** This file is a part of Markup (incremental XML subset parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Markup is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::collections::HashMap;
use std::collections::HashSet;
use std::env;
use std::fs::File;
use std::io::Read;
use std::io::stdin;
use std::process::ExitCode;

use markup::ErrorKind;
use markup::MarkupError;
use markup::MarkupHandler;
use markup::MarkupParser;
use markup::MarkupWriter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

fn print_version() {
    println!("markuplint (markup) v{}", VERSION);
}

fn print_usage() {
    println!(
        concat!(
            "Usage: markuplint [OPTIONS] [FILE.xml...]\n",
            "This tool checks the well-formedness of markup documents.\n",
            "Options:\n",
            "  -s, --stat           Overall statistics\n",
            "  -c, --count          Tag counts\n",
            "  -e, --echo           Print the parsed document\n",
            "  -b, --buffer <SIZE>  File read buffer size in bytes (default: {})\n",
            "  -h, --help           Display this help message and exit\n",
            "  -v, --version        Display the version and exit\n",
            "Set RUST_LOG=markup=trace to see the parser internals."
        ),
        DEFAULT_BUFFER_SIZE
    );
}

struct Handler {
    do_stats: bool,
    do_tag_count: bool,
    echo: Option<MarkupWriter>,
    level: usize,
    max_depth: usize,
    nr_tags: usize,
    nr_empty_tags: usize,
    nr_text_size: usize,
    nr_pass_through: usize,
    last_was_start: bool,
    tag_map: HashMap<String, usize>,
    attribute_set: HashSet<String>,
}

impl Handler {
    fn new(do_stats: bool, do_tag_count: bool, do_echo: bool) -> Self {
        Handler {
            do_stats,
            do_tag_count,
            echo: if do_echo { Some(MarkupWriter::new()) } else { None },
            level: 0,
            max_depth: 0,
            nr_tags: 0,
            nr_empty_tags: 0,
            nr_text_size: 0,
            nr_pass_through: 0,
            last_was_start: false,
            tag_map: HashMap::new(),
            attribute_set: HashSet::new(),
        }
    }

    fn report(&mut self) {
        if let Some(writer) = self.echo.as_ref() {
            println!("{}", writer.as_str());
        }
        if self.do_stats {
            println!(
                "Elements: {}, empty elements: {}, max depth: {}",
                self.nr_tags, self.nr_empty_tags, self.max_depth
            );
            println!(
                "Total size of character data: {} bytes, pass through sections: {}.",
                self.nr_text_size, self.nr_pass_through
            );
        }
        if self.do_tag_count {
            println!("Tag counts:");
            let mut tags: Vec<_> = self.tag_map.iter().collect();
            tags.sort();
            for (tag, count) in tags {
                println!("  {}: {}", tag, count);
            }
        }
        self.reset();
    }

    fn reset(&mut self) {
        if let Some(writer) = self.echo.as_mut() {
            *writer = MarkupWriter::new();
        }
        self.level = 0;
        self.max_depth = 0;
        self.nr_tags = 0;
        self.nr_empty_tags = 0;
        self.nr_text_size = 0;
        self.nr_pass_through = 0;
        self.last_was_start = false;
        self.tag_map.clear();
        self.attribute_set.clear();
    }
}

impl MarkupHandler for Handler {
    fn start_element(
        &mut self,
        name: &str,
        attribute_names: &[String],
        attribute_values: &[String],
    ) -> Result<(), MarkupError> {
        self.attribute_set.clear();
        for attribute in attribute_names {
            if !self.attribute_set.insert(attribute.clone()) {
                return Err(MarkupError::new(
                    ErrorKind::InvalidAttribute,
                    format!("duplicate attribute '{}' in element '{}'", attribute, name),
                ));
            }
        }
        self.nr_tags += 1;
        self.level += 1;
        self.max_depth = self.max_depth.max(self.level);
        self.last_was_start = true;
        if self.do_tag_count {
            *self.tag_map.entry(name.to_string()).or_insert(0) += 1;
        }
        if let Some(writer) = self.echo.as_mut() {
            writer.start_element(name, attribute_names, attribute_values)?;
        }
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<(), MarkupError> {
        if self.last_was_start {
            self.nr_empty_tags += 1;
        }
        self.last_was_start = false;
        self.level -= 1;
        if let Some(writer) = self.echo.as_mut() {
            writer.end_element(name)?;
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), MarkupError> {
        self.last_was_start = false;
        self.nr_text_size += text.len();
        if let Some(writer) = self.echo.as_mut() {
            writer.text(text)?;
        }
        Ok(())
    }

    fn pass_through(&mut self, text: &str) -> Result<(), MarkupError> {
        self.last_was_start = false;
        self.nr_pass_through += 1;
        if let Some(writer) = self.echo.as_mut() {
            writer.pass_through(text)?;
        }
        Ok(())
    }
}

enum LinterError {
    IoError(std::io::Error),
    MarkupError(MarkupError),
}

impl From<std::io::Error> for LinterError {
    fn from(err: std::io::Error) -> Self {
        LinterError::IoError(err)
    }
}

impl From<MarkupError> for LinterError {
    fn from(err: MarkupError) -> Self {
        LinterError::MarkupError(err)
    }
}

struct Linter {
    handler: Handler,
    buffer_size: usize,
}

impl Linter {
    fn new(handler: Handler, buffer_size: usize) -> Self {
        Linter {
            handler,
            buffer_size,
        }
    }

    fn parse_file(
        &mut self,
        parser: &mut MarkupParser,
        is_stream: bool,
    ) -> Result<(), LinterError> {
        let mut f: Box<dyn Read> = if is_stream {
            Box::new(stdin())
        } else {
            Box::new(File::open(parser.source_name())?)
        };
        let mut buffer = vec![0u8; self.buffer_size];
        loop {
            let bytes_read = f.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            parser.feed(&mut self.handler, &buffer[..bytes_read])?;
        }
        Ok(parser.end_of_input(&mut self.handler)?)
    }

    fn lint_file(&mut self, file: &str, is_stream: bool) -> bool {
        log::debug!(target: "markuplint", "checking {}", file);
        let mut parser = MarkupParser::new(file);
        match self.parse_file(&mut parser, is_stream) {
            Ok(()) => {
                self.handler.report();
                true
            }
            Err(LinterError::IoError(e)) => {
                eprintln!("Error reading file '{}': {}", file, e);
                self.handler.reset();
                false
            }
            Err(LinterError::MarkupError(e)) => {
                eprintln!("{}:{}:{}: {}: {}", file, e.line, e.column, e.kind, e.message);
                self.handler.reset();
                false
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = env::args();

    let mut files = Vec::new();
    let mut do_stats = false;
    let mut do_tag_count = false;
    let mut do_echo = false;
    let mut buffer_size = DEFAULT_BUFFER_SIZE;

    // Skip the first argument (program name)
    args.next();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-s" | "--stat" => {
                do_stats = true;
            }
            "-c" | "--count" => {
                do_tag_count = true;
            }
            "-cs" | "-sc" => {
                do_stats = true;
                do_tag_count = true;
            }
            "-e" | "--echo" => {
                do_echo = true;
            }
            "-b" | "--buffer" => {
                if let Some(size) = args.next() {
                    match size.parse::<usize>() {
                        Ok(size) if size > 0 => buffer_size = size,
                        _ => {
                            eprintln!("Invalid buffer size");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    eprintln!("Missing buffer size");
                    return ExitCode::FAILURE;
                }
            }
            "-h" | "--help" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            "-v" | "--version" => {
                print_version();
                return ExitCode::SUCCESS;
            }
            _ => {
                files.push(arg);
            }
        }
    }

    let handler = Handler::new(do_stats, do_tag_count, do_echo);
    let mut linter = Linter::new(handler, buffer_size);
    if files.is_empty() {
        if !linter.lint_file("stdin", true) {
            return ExitCode::FAILURE;
        }
    } else {
        for file in files {
            if !linter.lint_file(&file, false) {
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
