// Copyright (c) The schemoose authors.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod ast;
mod classifier;
mod engine;
mod materializer;
mod number;
mod parser;
mod resolver;
mod value;

pub use engine::{Engine, ModelEntry};
pub use number::Number;
pub use parser::{Language, ParseError, Source};
pub use value::Value;

/// Items in `unstable` are likely to change.
pub mod unstable {
    pub use crate::ast::*;
    pub use crate::classifier::{registrations, Registration};
    pub use crate::parser::Parser;
}

#[cfg(test)]
mod tests;
