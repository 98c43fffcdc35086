// Copyright (c) The schemoose authors.
// Licensed under the MIT License.

use crate::ast::{Declarator, Expr, Program, Stmt};
use crate::number::Number;

use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

use tree_sitter::Node;

/// The grammar used for structural parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    JavaScript,
    TypeScript,
}

impl Language {
    /// Pick a language from a file extension. Unknown extensions yield None
    /// so that callers can apply their own default.
    pub fn from_path(path: &Path) -> Option<Language> {
        match path.extension()?.to_str()? {
            "js" | "mjs" | "cjs" | "jsx" => Some(Language::JavaScript),
            "ts" | "mts" | "cts" => Some(Language::TypeScript),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
        }
    }

    fn grammar(self) -> tree_sitter::Language {
        match self {
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        }
    }
}

/// One source unit.
#[derive(Debug, Clone)]
pub struct Source {
    pub file: String,
    pub contents: String,
}

impl Source {
    pub fn new(file: String, contents: String) -> Source {
        Source { file, contents }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Source> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(Source::new(path.display().to_string(), contents)),
            Err(e) => anyhow::bail!("failed to read {}: {e}", path.display()),
        }
    }
}

/// Errors at the structural-parsing boundary. A syntactically invalid source
/// is fatal for the invocation; the extractor never recovers from
/// unparsable input.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to load the {0} grammar")]
    Grammar(&'static str),

    #[error("{file}: parser produced no tree")]
    NoTree { file: String },

    #[error("{file}:{line}:{col}: syntax error")]
    Syntax {
        file: String,
        line: usize,
        col: usize,
    },
}

/// Lowers a concrete syntax tree into the flat [`Program`] the extractor
/// operates on. Only the top-level statement sequence is modeled; statement
/// kinds with no bearing on extraction lower to [`Stmt::Other`] but still
/// occupy a position.
pub struct Parser<'s> {
    source: &'s Source,
    language: Language,
    inner: tree_sitter::Parser,
}

impl<'s> Parser<'s> {
    pub fn new(source: &'s Source, language: Language) -> Result<Parser<'s>, ParseError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&language.grammar())
            .map_err(|_| ParseError::Grammar(language.name()))?;
        Ok(Parser {
            source,
            language,
            inner,
        })
    }

    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let tree = self
            .inner
            .parse(&self.source.contents, None)
            .ok_or_else(|| ParseError::NoTree {
                file: self.source.file.clone(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(self.syntax_error(root));
        }

        let mut statements = vec![];
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            self.lower_statement(node, &mut statements);
        }
        Ok(Program { statements })
    }

    fn syntax_error(&self, root: Node) -> ParseError {
        let node = first_error_node(root).unwrap_or(root);
        let pos = node.start_position();
        ParseError::Syntax {
            file: self.source.file.clone(),
            line: pos.row + 1,
            col: pos.column + 1,
        }
    }

    fn text(&self, node: Node) -> &str {
        node.utf8_text(self.source.contents.as_bytes())
            .unwrap_or_default()
    }

    /// Lower one top-level node, appending zero or more statements.
    ///
    /// The TypeScript arm reproduces the statement arithmetic of stripping
    /// type annotations before parsing: interfaces, type aliases and
    /// type-only imports vanish entirely, while an `enum` strips to a
    /// variable declaration plus an initializer block and therefore takes
    /// two positions.
    fn lower_statement(&self, node: Node, out: &mut Vec<Stmt>) {
        match node.kind() {
            "comment" | "hash_bang_line" => {}

            "lexical_declaration" | "variable_declaration" => {
                let mut declarators = vec![];
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    if child.kind() != "variable_declarator" {
                        continue;
                    }
                    let Some(name) = child.child_by_field_name("name") else {
                        continue;
                    };
                    // Destructuring patterns introduce no resolvable name.
                    if name.kind() != "identifier" {
                        continue;
                    }
                    let init = child
                        .child_by_field_name("value")
                        .map(|value| self.lower_expr(value));
                    declarators.push(Declarator {
                        name: self.text(name).into(),
                        init,
                    });
                }
                out.push(Stmt::VarDecl(declarators));
            }

            "expression_statement" => match node.named_child(0) {
                Some(expr) if expr.kind() == "assignment_expression" => {
                    let target = expr
                        .child_by_field_name("left")
                        .map(|n| self.lower_expr(n))
                        .unwrap_or(Expr::Unsupported);
                    let value = expr
                        .child_by_field_name("right")
                        .map(|n| self.lower_expr(n))
                        .unwrap_or(Expr::Unsupported);
                    out.push(Stmt::Assign { target, value });
                }
                Some(expr) => out.push(Stmt::Expr(self.lower_expr(expr))),
                None => out.push(Stmt::Other),
            },

            "export_statement" => {
                if let Some(value) = node.child_by_field_name("value") {
                    out.push(Stmt::ExportDefault(self.lower_expr(value)));
                } else if let Some(decl) = node.child_by_field_name("declaration") {
                    match decl.kind() {
                        "interface_declaration" | "type_alias_declaration" => {}
                        "enum_declaration" => {
                            out.push(Stmt::Other);
                            out.push(Stmt::Other);
                        }
                        // `export default function ...` and exported value
                        // declarations bind nothing the resolver can see.
                        _ => out.push(Stmt::Other),
                    }
                } else {
                    out.push(Stmt::Other);
                }
            }

            "interface_declaration" | "type_alias_declaration" | "ambient_declaration" => {}

            "enum_declaration" => {
                out.push(Stmt::Other);
                out.push(Stmt::Other);
            }

            "import_statement" if self.language == Language::TypeScript => {
                if !self.text(node).starts_with("import type") {
                    out.push(Stmt::Other);
                }
            }

            _ => out.push(Stmt::Other),
        }
    }

    fn lower_expr(&self, node: Node) -> Expr {
        match node.kind() {
            "parenthesized_expression" | "non_null_expression" => node
                .named_child(0)
                .map(|n| self.lower_expr(n))
                .unwrap_or(Expr::Unsupported),

            // `expr as T` / `expr satisfies T`: the type side is ignored.
            "as_expression" | "satisfies_expression" => node
                .named_child(0)
                .map(|n| self.lower_expr(n))
                .unwrap_or(Expr::Unsupported),

            "null" => Expr::Null,
            "true" => Expr::Bool(true),
            "false" => Expr::Bool(false),

            "number" => Number::from_str(self.text(node))
                .map(Expr::Number)
                .unwrap_or(Expr::Unsupported),

            "string" => Expr::String(self.string_value(node)),

            // `undefined` behaves like any other identifier: it resolves to
            // nothing and materializes as unresolved.
            "identifier" | "undefined" => Expr::Ident(self.text(node).into()),

            "member_expression" => self.lower_member(node),

            "object" => {
                let mut fields = vec![];
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    match child.kind() {
                        "pair" => {
                            let Some(key) = child.child_by_field_name("key") else {
                                continue;
                            };
                            let key: Rc<str> = match key.kind() {
                                "property_identifier" | "number" => self.text(key).into(),
                                "string" => self.string_value(key),
                                // Computed keys cannot be matched statically.
                                _ => continue,
                            };
                            let value = child
                                .child_by_field_name("value")
                                .map(|v| self.lower_expr(v))
                                .unwrap_or(Expr::Unsupported);
                            fields.push((key, value));
                        }
                        "shorthand_property_identifier" => {
                            let name: Rc<str> = self.text(child).into();
                            fields.push((name.clone(), Expr::Ident(name)));
                        }
                        // Spreads, methods, getters: dropped silently.
                        _ => {}
                    }
                }
                Expr::Object(fields)
            }

            "array" => {
                let mut items = vec![];
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    if child.kind() == "comment" {
                        continue;
                    }
                    items.push(self.lower_expr(child));
                }
                Expr::Array(items)
            }

            "call_expression" => {
                let callee = node
                    .child_by_field_name("function")
                    .map(|n| self.lower_expr(n))
                    .unwrap_or(Expr::Unsupported);
                Expr::Call {
                    callee: Box::new(callee),
                    args: self.lower_arguments(node),
                }
            }

            "new_expression" => {
                let callee = node
                    .child_by_field_name("constructor")
                    .map(|n| self.lower_expr(n))
                    .unwrap_or(Expr::Unsupported);
                Expr::New {
                    callee: Box::new(callee),
                    args: self.lower_arguments(node),
                }
            }

            "binary_expression" => {
                let op = node.child_by_field_name("operator").map(|n| n.kind());
                if op != Some("||") {
                    return Expr::Unsupported;
                }
                match (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("right"),
                ) {
                    (Some(left), Some(right)) => Expr::Or {
                        left: Box::new(self.lower_expr(left)),
                        right: Box::new(self.lower_expr(right)),
                    },
                    _ => Expr::Unsupported,
                }
            }

            _ => Expr::Unsupported,
        }
    }

    /// Lower a property-access chain. The chain must be rooted at a bare
    /// identifier; anything else (calls, subscripts) is unsupported.
    fn lower_member(&self, node: Node) -> Expr {
        let (object, property) = match (
            node.child_by_field_name("object"),
            node.child_by_field_name("property"),
        ) {
            (Some(o), Some(p)) => (o, p),
            _ => return Expr::Unsupported,
        };
        if property.kind() != "property_identifier" {
            return Expr::Unsupported;
        }

        let mut path = match object.kind() {
            "identifier" => vec![Rc::from(self.text(object))],
            "member_expression" => match self.lower_member(object) {
                Expr::Member(path) => path,
                _ => return Expr::Unsupported,
            },
            _ => return Expr::Unsupported,
        };
        path.push(self.text(property).into());
        Expr::Member(path)
    }

    fn lower_arguments(&self, node: Node) -> Vec<Expr> {
        let mut args = vec![];
        if let Some(list) = node.child_by_field_name("arguments") {
            if list.kind() != "arguments" {
                // Template-literal call form.
                return args;
            }
            let mut cursor = list.walk();
            for child in list.named_children(&mut cursor) {
                if child.kind() == "comment" {
                    continue;
                }
                args.push(self.lower_expr(child));
            }
        }
        args
    }

    /// Decode a string literal: concatenate fragments, expanding escape
    /// sequences.
    fn string_value(&self, node: Node) -> Rc<str> {
        let mut value = String::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "string_fragment" => value.push_str(self.text(child)),
                "escape_sequence" => value.push_str(&unescape(self.text(child))),
                _ => {}
            }
        }
        value.into()
    }
}

fn first_error_node(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error_node(child) {
            return Some(found);
        }
    }
    None
}

fn unescape(seq: &str) -> String {
    let mut chars = seq.chars();
    if chars.next() != Some('\\') {
        return seq.to_string();
    }
    match chars.next() {
        Some('n') => "\n".to_string(),
        Some('r') => "\r".to_string(),
        Some('t') => "\t".to_string(),
        Some('b') => "\u{8}".to_string(),
        Some('f') => "\u{c}".to_string(),
        Some('v') => "\u{b}".to_string(),
        Some('0') => "\0".to_string(),
        Some('u') => {
            let hex: String = chars.filter(|c| c.is_ascii_hexdigit()).collect();
            u32::from_str_radix(&hex, 16)
                .ok()
                .and_then(char::from_u32)
                .map(|c| c.to_string())
                .unwrap_or_default()
        }
        Some('x') => {
            let hex: String = chars.collect();
            u32::from_str_radix(&hex, 16)
                .ok()
                .and_then(char::from_u32)
                .map(|c| c.to_string())
                .unwrap_or_default()
        }
        Some(c) => c.to_string(),
        None => String::new(),
    }
}
