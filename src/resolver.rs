// Copyright (c) The schemoose authors.
// Licensed under the MIT License.

use crate::ast::{Expr, Program, Stmt};

/// Find the binding of `name` nearest before `position` (strictly earlier
/// statements only). Used to locate the schema binding referenced by a
/// registration.
pub fn resolve_before<'a>(program: &'a Program, name: &str, position: usize) -> Option<&'a Expr> {
    resolve(program, name, position)
}

/// Find the binding of `name` at or before `position`. Used while expanding
/// identifiers that appear inside a schema literal, where the anchor is the
/// registration's own statement.
pub fn resolve_at_or_before<'a>(
    program: &'a Program,
    name: &str,
    position: usize,
) -> Option<&'a Expr> {
    let limit = position
        .saturating_add(1)
        .min(program.statements.len());
    resolve(program, name, limit)
}

/// Backward linear scan over statement positions; no symbol table, no
/// scope or control-flow analysis. The nearest write wins: the first
/// matching statement walking backwards shadows every earlier one,
/// and anything at or past the scan limit is ignored entirely.
fn resolve<'a>(program: &'a Program, name: &str, limit: usize) -> Option<&'a Expr> {
    let limit = limit.min(program.statements.len());
    for stmt in program.statements[..limit].iter().rev() {
        match stmt {
            // Reassignment: `schemaVar = <expr>;`
            Stmt::Assign {
                target: Expr::Ident(target),
                value,
            } if target.as_ref() == name => return Some(value),

            Stmt::VarDecl(declarators) => {
                for decl in declarators {
                    if decl.name.as_ref() == name {
                        // `let x;` shadows like any declaration but binds
                        // no expression.
                        return decl.init.as_ref();
                    }
                }
            }

            _ => {}
        }
    }
    None
}
