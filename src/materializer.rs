// Copyright (c) The schemoose authors.
// Licensed under the MIT License.

use crate::ast::{Expr, Program};
use crate::resolver;
use crate::value::Value;

use indexmap::IndexMap;

/// The built-in Mongoose field-type markers. These are opaque tokens: they
/// materialize as their own name and are never resolved as variables.
const TYPE_TOKENS: [&str; 8] = [
    "String", "Number", "Date", "Buffer", "Boolean", "Mixed", "ObjectId", "Array",
];

/// Cap on identifier-resolution recursion. Self-referential bindings
/// (`let a = { b: a };`) would otherwise loop forever; past the cap a value
/// materializes as unresolved.
const MAX_DEPTH: usize = 64;

/// Materialize a resolved schema binding into plain data.
///
/// The binding is expected to be a schema-constructor call
/// `new Schema({...})`; its first-argument object literal is what gets
/// expanded. Any other binding expression is materialized directly, and a
/// shape the materializer cannot use yields [`Value::Unresolved`].
pub fn materialize_binding(program: &Program, expr: &Expr, position: usize) -> Value {
    let target = schema_argument(expr).unwrap_or(expr);
    materialize(program, target, position, 0).unwrap_or(Value::Unresolved)
}

/// The object literal passed to a schema constructor, if `expr` is one.
/// The constructor name is not inspected; extraction is shape-driven.
fn schema_argument(expr: &Expr) -> Option<&Expr> {
    if let Expr::New { args, .. } = expr {
        if let Some(object @ Expr::Object(_)) = args.first() {
            return Some(object);
        }
    }
    None
}

/// Recursively flatten an expression into a plain value, in source order.
/// `None` means the expression has no supported materialization and the
/// surrounding key or element is dropped silently — a behavioral contract,
/// not an error.
fn materialize(program: &Program, expr: &Expr, position: usize, depth: usize) -> Option<Value> {
    if depth > MAX_DEPTH {
        return Some(Value::Unresolved);
    }

    match expr {
        Expr::Null => Some(Value::Null),
        Expr::Bool(b) => Some(Value::Bool(*b)),
        Expr::Number(n) => Some(Value::Number(*n)),
        Expr::String(s) => Some(Value::String(s.clone())),

        Expr::Ident(name) => {
            if TYPE_TOKENS.contains(&name.as_ref()) {
                return Some(Value::String(name.clone()));
            }
            match resolver::resolve_at_or_before(program, name, position) {
                Some(bound) => {
                    // A referenced binding may itself be a schema
                    // constructor (sub-schema composition); unwrap it the
                    // same way the top-level binding is unwrapped.
                    let target = schema_argument(bound).unwrap_or(bound);
                    materialize(program, target, position, depth + 1)
                }
                None => Some(Value::Unresolved),
            }
        }

        Expr::Object(fields) => {
            let mut object = IndexMap::new();
            for (key, value) in fields {
                if let Some(value) = materialize(program, value, position, depth + 1) {
                    object.insert(key.to_string(), value);
                }
            }
            Some(Value::from(object))
        }

        Expr::Array(items) => {
            let mut array = vec![];
            for item in items {
                if let Some(value) = materialize(program, item, position, depth + 1) {
                    array.push(value);
                }
            }
            Some(Value::from(array))
        }

        // Member chains are never resolved; they serialize verbatim as
        // their dotted textual form (`Schema.Types.ObjectId`, `Date.now`).
        Expr::Member(_) => expr.member_path().map(Value::from),

        // Calls, constructors, logical-OR and anything the parser could
        // not lower have no materialization.
        Expr::Call { .. } | Expr::New { .. } | Expr::Or { .. } | Expr::Unsupported => None,
    }
}
