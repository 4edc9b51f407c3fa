//! Property-based tests for the compiler driver.
//!
//! Generates random programs with nested `def>` scopes and checks that:
//! 1. Compilation is deterministic
//! 2. Renaming is injective within every function scope: distinct bindings
//!    never share a host name, and no host keyword survives as an identifier
//! 3. The error ceiling bounds the number of reported diagnostics

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use proptest::prelude::*;
use tempy_ir::syntax::build::{assign, block, call_named, integer, name};
use tempy_ir::host::HostTarget;
use tempy_ir::{FunctionDef, HostExpr, HostStmt, SyntaxNode};
use tempy_lower::is_host_keyword;
use tempyc::{compile, CompileError, Config};

// -- Strategies --

/// Source names chosen to collide: keywords, a builtin, a would-be suffix.
fn source_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "class", "print", "a_1", "a_l1", "_t"]).prop_map(String::from)
}

#[derive(Clone, Debug)]
enum Line {
    /// `name = value`
    Assign(String, u32),
    /// `let(name=value): print(name)`
    Let(String, u32),
    /// `def> name(): lines...`
    Def(String, Vec<Line>),
}

/// Function names; `a` collides with an assignable name.
fn def_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["f", "g", "class", "a"]).prop_map(String::from)
}

fn line_strategy() -> impl Strategy<Value = Line> {
    let leaf = prop_oneof![
        3 => (source_name(), 0u32..100).prop_map(|(name, value)| Line::Assign(name, value)),
        1 => (source_name(), 0u32..100).prop_map(|(name, value)| Line::Let(name, value)),
    ];
    leaf.prop_recursive(2, 32, 6, |inner| {
        prop_oneof![
            4 => inner.clone(),
            1 => (def_name(), prop::collection::vec(inner, 0..6))
                .prop_map(|(name, body)| Line::Def(name, body)),
        ]
    })
}

fn to_syntax(line: &Line) -> SyntaxNode {
    match line {
        Line::Assign(target, value) => assign(target.clone(), integer(value.to_string())),
        Line::Let(key, value) => call_named("let")
            .kwarg(key.clone(), integer(value.to_string()))
            .line(call_named("print").arg(name(key.clone())))
            .build(),
        Line::Def(function, body) => body
            .iter()
            .fold(call_named(function.clone()).label("def"), |def, line| def.line(to_syntax(line)))
            .build(),
    }
}

fn config() -> Config {
    Config::new().with_line_info(false)
}

/// Host names of the exported bindings, from the trailing `return {...}`.
fn export_host_names(body: &[HostStmt]) -> Vec<String> {
    let Some(HostStmt::Return(Some(HostExpr::Dict(entries)))) = body.last() else {
        panic!("module must end with the exports dict");
    };
    entries
        .iter()
        .map(|(_, value)| match value {
            HostExpr::Ident(ident) => ident.name().expect("renamed").to_string(),
            other => panic!("export must be an identifier, got {other:?}"),
        })
        .collect()
}

/// Host names of the `let` variables: the argument of each `print(...)`.
fn let_host_names(body: &[HostStmt]) -> Vec<String> {
    body.iter()
        .filter_map(|stmt| match stmt {
            HostStmt::Expr(HostExpr::Call(call)) => match call.args.first() {
                Some(HostExpr::Ident(ident)) => ident.name().map(ToString::to_string),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

/// Number of distinct bindings a block of lines creates in its own scope:
/// one per assigned or defined name, one per `let`.
fn scope_bindings(lines: &[Line]) -> usize {
    let mut names: Vec<&str> = Vec::new();
    let mut lets = 0;
    for line in lines {
        match line {
            Line::Assign(name, _) | Line::Def(name, _) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Line::Let(..) => lets += 1,
        }
    }
    names.len() + lets
}

/// Distinct host names bound directly in `function`'s body, temporaries excluded.
fn bound_host_names(function: &FunctionDef) -> Vec<&str> {
    let mut names: Vec<&str> = function
        .body
        .iter()
        .filter_map(|stmt| match stmt {
            HostStmt::Assign {
                target: HostTarget::Name(ident),
                ..
            } => ident.name(),
            HostStmt::Def(def) => def.name.name(),
            _ => None,
        })
        .filter(|name| !name.starts_with("_imd_"))
        .collect();
    names.sort_unstable();
    names.dedup();
    names
}

/// Check injectivity in `function` and every nested function, pairing
/// host definitions with source `def>` lines in order.
fn check_scope(function: &FunctionDef, lines: &[Line]) -> Result<(), TestCaseError> {
    let names = bound_host_names(function);
    prop_assert_eq!(names.len(), scope_bindings(lines));
    prop_assert!(names.iter().all(|name| !is_host_keyword(name)));

    let nested: Vec<&FunctionDef> = function
        .body
        .iter()
        .filter_map(|stmt| match stmt {
            HostStmt::Def(def) => Some(def),
            _ => None,
        })
        .collect();
    let sources: Vec<&[Line]> = lines
        .iter()
        .filter_map(|line| match line {
            Line::Def(_, body) => Some(body.as_slice()),
            _ => None,
        })
        .collect();
    prop_assert_eq!(nested.len(), sources.len());
    for (def, body) in nested.into_iter().zip(sources) {
        check_scope(def, body)?;
    }
    Ok(())
}

fn all_distinct(names: &[String]) -> bool {
    let mut seen = std::collections::HashSet::new();
    names.iter().all(|name| seen.insert(name))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn compilation_is_deterministic(lines in prop::collection::vec(line_strategy(), 0..12)) {
        let program = block(lines.iter().map(to_syntax));
        prop_assert_eq!(compile(&program, &config()), compile(&program, &config()));
    }

    #[test]
    fn renaming_is_injective(lines in prop::collection::vec(line_strategy(), 0..12)) {
        let program = block(lines.iter().map(to_syntax));
        let module = compile(&program, &config()).unwrap();

        let exported = export_host_names(&module.main.body);
        let scoped = let_host_names(&module.main.body);
        prop_assert!(all_distinct(&exported));
        prop_assert!(all_distinct(&scoped));
        prop_assert!(scoped.iter().all(|name| !exported.contains(name)));
        prop_assert!(exported.iter().chain(&scoped).all(|name| !is_host_keyword(name)));
        check_scope(&module.main, &lines)?;
    }

    #[test]
    fn exports_follow_first_binding_order(lines in prop::collection::vec(line_strategy(), 0..12)) {
        let program = block(lines.iter().map(to_syntax));
        let module = compile(&program, &config()).unwrap();

        // `def>` names are bound before the block runs, assignments as they occur.
        let defined = lines.iter().filter_map(|line| match line {
            Line::Def(name, _) => Some(name),
            _ => None,
        });
        let assigned = lines.iter().filter_map(|line| match line {
            Line::Assign(name, _) => Some(name),
            _ => None,
        });
        let mut expected: Vec<String> = Vec::new();
        for target in defined.chain(assigned) {
            if !target.starts_with('_') && !expected.contains(target) {
                expected.push(target.clone());
            }
        }
        prop_assert_eq!(module.exports, expected);
    }

    #[test]
    fn error_ceiling_bounds_diagnostics(unbound in 1usize..10, limit in 1usize..6) {
        let lines = (0..unbound).map(|i| assign("x", name(format!("missing{i}"))));
        let err = compile(&block(lines), &config().with_max_errors(limit)).unwrap_err();
        let CompileError::Failed { diagnostics, flooded } = err else {
            panic!("expected a lowering failure");
        };
        prop_assert_eq!(diagnostics.len(), unbound.min(limit));
        prop_assert_eq!(flooded, unbound >= limit);
    }
}
