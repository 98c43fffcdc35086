// Copyright (c) The schemoose authors.
// Licensed under the MIT License.

use crate::ast::Program;
use crate::classifier;
use crate::materializer;
use crate::parser::{Language, Parser, Source};
use crate::resolver;
use crate::value::Value;

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Environment variable naming a path the lowered program is dumped to
/// before extraction. Diagnostic only; write failures are ignored.
const DUMP_AST_VAR: &str = "SCHEMOOSE_DUMP_AST";

/// One extracted model registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelEntry {
    /// The registered model name (first registration argument).
    pub model: String,
    /// The schema variable name the registration referenced.
    pub js_schema_name: String,
    /// The materialized schema, or [`Value::Unresolved`] when the variable
    /// had no qualifying binding.
    pub schema: Value,
    /// 0-based index of the top-level statement containing the
    /// registration.
    pub node_id: usize,
}

/// The schema extraction engine.
///
/// An engine is a pure function of its configuration: extracting twice from
/// identical input yields identical output, and independent engines can run
/// concurrently without coordination.
#[derive(Debug, Clone)]
pub struct Engine {
    language: Language,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            language: Language::JavaScript,
        }
    }

    /// Set the default grammar used by [`extract`](Self::extract).
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Extract every recognized model registration from one source string,
    /// in source order. Returns an error only when the source cannot be
    /// parsed; everything else degrades per the best-effort policy.
    pub fn extract(&self, contents: &str) -> Result<Vec<ModelEntry>> {
        let source = Source::new("<source>".to_string(), contents.to_string());
        self.extract_source(&source, self.language)
    }

    /// Extract from a file, picking the grammar from the file extension and
    /// falling back to the configured default.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<ModelEntry>> {
        let path = path.as_ref();
        let language = Language::from_path(path).unwrap_or(self.language);
        let source = Source::from_file(path)?;
        self.extract_source(&source, language)
    }

    pub fn extract_source(&self, source: &Source, language: Language) -> Result<Vec<ModelEntry>> {
        let mut parser = Parser::new(source, language)?;
        let program = parser.parse()?;
        dump_program(&program);

        let mut models = vec![];
        for registration in classifier::registrations(&program) {
            let schema =
                match resolver::resolve_before(&program, &registration.schema_name, registration.node_id)
                {
                    Some(binding) => {
                        materializer::materialize_binding(&program, binding, registration.node_id)
                    }
                    None => Value::Unresolved,
                };
            models.push(ModelEntry {
                model: registration.model.to_string(),
                js_schema_name: registration.schema_name.to_string(),
                schema,
                node_id: registration.node_id,
            });
        }
        Ok(models)
    }
}

fn dump_program(program: &Program) {
    if let Ok(path) = std::env::var(DUMP_AST_VAR) {
        let _ = std::fs::write(path, format!("{program:#?}\n"));
    }
}
