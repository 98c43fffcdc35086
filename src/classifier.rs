// Copyright (c) The schemoose authors.
// Licensed under the MIT License.

use crate::ast::{Expr, Program, Stmt};

use std::rc::Rc;

/// The namespace object a registration call is looked up on.
const REGISTRATION_NAMESPACE: &str = "mongoose";
/// The registration method / aliased-import callee name.
const REGISTRATION_CALLEE: &str = "model";

/// One recognized model registration: `mongoose.model("Name", schemaVar)`
/// (or an accepted variant) at top-level statement `node_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub model: Rc<str>,
    pub schema_name: Rc<str>,
    pub node_id: usize,
}

/// Scan the program body once, top to bottom, and collect every recognized
/// registration. Candidates whose call or argument shape does not match are
/// skipped silently; no record, no error.
pub fn registrations(program: &Program) -> Vec<Registration> {
    let mut found = vec![];
    for (node_id, stmt) in program.statements.iter().enumerate() {
        match stmt {
            // const User = mongoose.model("User", userSchema);
            // const User = model("User", userSchema);
            Stmt::VarDecl(declarators) => {
                for decl in declarators {
                    if let Some(init) = &decl.init {
                        if let Some((model, schema_name)) = match_registration_call(init) {
                            found.push(Registration {
                                model,
                                schema_name,
                                node_id,
                            });
                        }
                    }
                }
            }

            Stmt::Assign { value, .. } => match value {
                // module.exports = mongoose.model("User", userSchema);
                // Only the namespaced form is accepted on plain assignment.
                Expr::Call { .. } => {
                    if let Some((model, schema_name)) = match_namespaced_call(value) {
                        found.push(Registration {
                            model,
                            schema_name,
                            node_id,
                        });
                    }
                }

                // module.exports = mongoose.models.X || mongoose.model(...);
                // The left operand (the lookup of an already-registered
                // model) is never evaluated.
                Expr::Or { right, .. } => {
                    if let Some((model, schema_name)) = match_registration_call(right) {
                        found.push(Registration {
                            model,
                            schema_name,
                            node_id,
                        });
                    }
                }

                _ => {}
            },

            // export default model("User", userSchema);
            // export default mongoose.model("User", userSchema);
            Stmt::ExportDefault(value) => {
                if let Some((model, schema_name)) = match_registration_call(value) {
                    found.push(Registration {
                        model,
                        schema_name,
                        node_id,
                    });
                }
            }

            Stmt::Expr(_) | Stmt::Other => {}
        }
    }
    found
}

/// Match either registration callee form: `mongoose.model(...)` or a bare
/// identifier literally named `model` (aliased import).
fn match_registration_call(expr: &Expr) -> Option<(Rc<str>, Rc<str>)> {
    let Expr::Call { callee, args } = expr else {
        return None;
    };
    match callee.as_ref() {
        Expr::Ident(name) if name.as_ref() == REGISTRATION_CALLEE => {}
        _ if is_namespaced_callee(callee) => {}
        _ => return None,
    }
    match_arguments(args)
}

/// Match only the namespaced form `mongoose.model(...)`.
fn match_namespaced_call(expr: &Expr) -> Option<(Rc<str>, Rc<str>)> {
    let Expr::Call { callee, args } = expr else {
        return None;
    };
    if !is_namespaced_callee(callee) {
        return None;
    }
    match_arguments(args)
}

fn is_namespaced_callee(callee: &Expr) -> bool {
    match callee {
        Expr::Member(path) => {
            path.len() == 2
                && path[0].as_ref() == REGISTRATION_NAMESPACE
                && path[1].as_ref() == REGISTRATION_CALLEE
        }
        _ => false,
    }
}

/// arg[0] must be a string literal (the model name) and arg[1] a bare
/// identifier (the schema binding name). Any other shape rejects the
/// candidate.
fn match_arguments(args: &[Expr]) -> Option<(Rc<str>, Rc<str>)> {
    match (args.first(), args.get(1)) {
        (Some(Expr::String(model)), Some(Expr::Ident(schema_name))) => {
            Some((model.clone(), schema_name.clone()))
        }
        _ => None,
    }
}
