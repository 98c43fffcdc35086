// Copyright (c) The schemoose authors.
// Licensed under the MIT License.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)] // test harness asserts and unwraps to validate extractor behavior


use crate::ast::Program;
use crate::parser::{Language, Parser, Source};

/// Parse a JavaScript snippet into a program body.
pub fn parse(contents: &str) -> Program {
    parse_lang(contents, Language::JavaScript)
}

pub fn parse_lang(contents: &str, language: Language) -> Program {
    let source = Source::new("<test>".to_string(), contents.to_string());
    let mut parser = Parser::new(&source, language).unwrap();
    parser.parse().unwrap()
}
