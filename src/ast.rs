// Copyright (c) The schemoose authors.
// Licensed under the MIT License.

use crate::number::Number;

use std::rc::Rc;

/// A top-level program: the ordered sequence of statements of one source
/// unit. A statement's index in `statements` is its position, and position
/// is the only ordering signal the extractor uses — no lexical scoping is
/// modeled.
#[derive(Debug)]
#[cfg_attr(feature = "ast", derive(serde::Serialize))]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// One declarator of a variable declaration. `let x;` has no initializer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ast", derive(serde::Serialize))]
pub struct Declarator {
    pub name: Rc<str>,
    pub init: Option<Expr>,
}

/// A top-level statement. Statement kinds the extractor never inspects
/// lower to `Other`; they still occupy a position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ast", derive(serde::Serialize))]
pub enum Stmt {
    VarDecl(Vec<Declarator>),

    /// A plain `target = value` expression statement. The target may be any
    /// expression (`module.exports`, a bare identifier, ...).
    Assign { target: Expr, value: Expr },

    /// `export default <expr>`.
    ExportDefault(Expr),

    /// Any other expression statement (plugin calls, index registrations).
    Expr(Expr),

    Other,
}

/// An expression, lowered into the closed set of shapes the extractor
/// understands. Everything else becomes `Unsupported` — a variant, not an
/// error, so that unsupported constructs degrade per the silent-skip policy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ast", derive(serde::Serialize))]
pub enum Expr {
    Null,
    Bool(bool),
    Number(Number),
    String(Rc<str>),
    Ident(Rc<str>),

    /// Object literal: ordered (key, value) pairs in source order. Shorthand
    /// properties are expanded at lowering time into (name, Ident(name)).
    Object(Vec<(Rc<str>, Expr)>),

    /// Array literal, order preserved.
    Array(Vec<Expr>),

    /// A property-access chain rooted at an identifier, e.g.
    /// `Schema.Types.ObjectId` lowers to `["Schema", "Types", "ObjectId"]`.
    Member(Vec<Rc<str>>),

    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    /// A logical-OR expression. Only the right operand is ever inspected.
    Or {
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Unsupported,
}

impl Expr {
    /// Dotted textual form of a member chain.
    pub fn member_path(&self) -> Option<String> {
        match self {
            Expr::Member(path) => {
                let parts: Vec<&str> = path.iter().map(|p| p.as_ref()).collect();
                Some(parts.join("."))
            }
            _ => None,
        }
    }
}
