//! Continuation-passing matcher.
//!
//! Positional matching threads a [`Cont`], an immutable linked list of
//! "what must still match after this step", through every combinator.
//! List nodes live on the native stack and link to their parents by shared
//! reference, so extending the list never disturbs a sibling attempt.
//!
//! Capture scopes are a stack passed by value. A group pushes a scope and
//! a [`Cont::Close`] node pops it into the parent once the group's members
//! have matched. `Optional` clones the stack before trying its operand so
//! the fallback path starts from clean state.
//!
//! Alternation and the quantifiers are atomic: each attempt of their
//! operand runs against [`Cont::Accept`] (accept any remainder), and the
//! outcome is committed before the outer continuation runs. If the outer
//! continuation then fails, no other branch or repetition count is tried.

use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};
use tempy_ir::stack::ensure_sufficient_stack;
use tempy_ir::syntax::{Keyword, SpecialSlot, SuiteEntry};
use tempy_ir::{NodeKind, SyntaxNode};

use crate::pattern::{dedup_in_order, KwPattern, Leaf, NodePattern, PosPattern, XExprPattern};
use crate::{Bindings, Capture};

/// One element of a positional input list.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Item<'n> {
    Plain(&'n SyntaxNode),
    Labelled(&'n str, &'n SyntaxNode),
}

impl<'n> Item<'n> {
    pub(crate) fn from_entry(entry: &'n SuiteEntry) -> Self {
        match &entry.label {
            Some(label) => Item::Labelled(label, &entry.value),
            None => Item::Plain(&entry.value),
        }
    }

    fn from_keyword(keyword: &'n Keyword) -> Self {
        Item::Labelled(&keyword.name, &keyword.value)
    }
}

/// Pending work after the current step.
enum Cont<'a> {
    /// The input must be exhausted.
    End,
    /// Any remainder is accepted; used for atomic local attempts.
    Accept,
    /// Match these patterns in order, then continue with `next`.
    Seq {
        pats: &'a [PosPattern],
        next: &'a Cont<'a>,
    },
    /// Pop the innermost scope into its parent, then continue.
    Close {
        name: Option<&'a str>,
        next: &'a Cont<'a>,
    },
}

type Scopes<'n> = SmallVec<[Bindings<'n>; 4]>;

/// A successful positional run: the scope stack at the end and how many
/// input elements were left unconsumed (always 0 under [`Cont::End`]).
struct Outcome<'n> {
    scopes: Scopes<'n>,
    rest: usize,
}

impl<'n> Outcome<'n> {
    fn into_bindings(mut self) -> Bindings<'n> {
        self.scopes.pop().unwrap_or_default()
    }
}

/// Match `pattern` against the whole of `input`.
pub(crate) fn match_positional<'n>(pattern: &PosPattern, input: &[Item<'n>]) -> Option<Bindings<'n>> {
    run(pattern, input, &Cont::End, smallvec![Bindings::new()]).map(Outcome::into_bindings)
}

/// Match `pattern` against a prefix of `input`, committing to the first
/// local success. Returns the captures and the number of elements consumed.
fn run_local<'n>(pattern: &PosPattern, input: &[Item<'n>]) -> Option<(Bindings<'n>, usize)> {
    let outcome = run(pattern, input, &Cont::Accept, smallvec![Bindings::new()])?;
    let consumed = input.len() - outcome.rest;
    Some((outcome.into_bindings(), consumed))
}

fn follow<'n>(input: &[Item<'n>], cont: &Cont<'_>, mut scopes: Scopes<'n>) -> Option<Outcome<'n>> {
    match cont {
        Cont::End => input.is_empty().then_some(Outcome { scopes, rest: 0 }),
        Cont::Accept => Some(Outcome {
            scopes,
            rest: input.len(),
        }),
        Cont::Seq { pats, next } => match pats.split_first() {
            None => follow(input, next, scopes),
            Some((first, rest)) => {
                let tail = Cont::Seq { pats: rest, next };
                run(first, input, &tail, scopes)
            }
        },
        Cont::Close { name, next } => {
            let inner = scopes.pop()?;
            deliver_group(scopes.last_mut()?, *name, inner);
            follow(input, next, scopes)
        }
    }
}

fn run<'n>(
    pattern: &PosPattern,
    input: &[Item<'n>],
    cont: &Cont<'_>,
    mut scopes: Scopes<'n>,
) -> Option<Outcome<'n>> {
    ensure_sufficient_stack(|| match pattern {
        PosPattern::Single { node, label } => {
            let (first, rest) = input.split_first()?;
            let mut captured = Bindings::new();
            let target = match (*first, label) {
                (Item::Labelled(text, target), Some(matcher)) => {
                    match_leaf_str(matcher, text, &mut captured)?;
                    target
                }
                (Item::Plain(target), None) => target,
                _ => return None,
            };
            captured.merge(match_node(node, target)?);
            scopes.last_mut()?.merge(captured);
            follow(rest, cont, scopes)
        }

        PosPattern::Group { members, name } => {
            scopes.push(Bindings::new());
            let close = Cont::Close {
                name: name.as_deref(),
                next: cont,
            };
            let seq = Cont::Seq {
                pats: members,
                next: &close,
            };
            follow(input, &seq, scopes)
        }

        PosPattern::Optional { inner, name } => {
            if !input.is_empty() {
                let mut trial = scopes.clone();
                trial.push(Bindings::new());
                let close = Cont::Close {
                    name: name.as_deref(),
                    next: cont,
                };
                if let Some(outcome) = run(inner, input, &close, trial) {
                    return Some(outcome);
                }
            }
            mark_absent(scopes.last_mut()?, name.as_deref(), inner);
            follow(input, cont, scopes)
        }

        PosPattern::Alternation { branches, name } => {
            for branch in branches {
                let Some((captured, consumed)) = run_local(branch, input) else {
                    continue;
                };
                let parent = scopes.last_mut()?;
                match name {
                    Some(name) => parent.insert(name.as_str(), Capture::Group(captured)),
                    None => {
                        mark_absent(parent, None, pattern);
                        parent.merge(captured);
                    }
                }
                return follow(&input[consumed..], cont, scopes);
            }
            None
        }

        PosPattern::ZeroOrMore { inner, name } => repeat(inner, name.as_deref(), 0, input, cont, scopes),
        PosPattern::OneOrMore { inner, name } => repeat(inner, name.as_deref(), 1, input, cont, scopes),

        PosPattern::Empty => follow(input, cont, scopes),
    })
}

/// Possessive repetition: take as many passes as match locally, never
/// giving any back.
fn repeat<'n>(
    inner: &PosPattern,
    name: Option<&str>,
    min: usize,
    input: &[Item<'n>],
    cont: &Cont<'_>,
    mut scopes: Scopes<'n>,
) -> Option<Outcome<'n>> {
    let mut passes: Vec<Bindings<'n>> = Vec::new();
    let mut pos = 0;
    while let Some((captured, consumed)) = run_local(inner, &input[pos..]) {
        // A zero-width pass ends the loop; it only counts when it is needed
        // to reach the minimum.
        if consumed == 0 {
            if passes.len() < min {
                passes.push(captured);
            }
            break;
        }
        passes.push(captured);
        pos += consumed;
    }
    if passes.len() < min {
        return None;
    }
    tracing::trace!(passes = passes.len(), consumed = pos, "repetition settled");

    let parent = scopes.last_mut()?;
    match name {
        Some(name) => {
            let items = passes.into_iter().map(Capture::Group).collect();
            parent.insert(name, Capture::Seq(items));
        }
        None => {
            for capture in inner.capture_names() {
                let items = passes
                    .iter_mut()
                    .map(|pass| pass.remove(capture).unwrap_or(Capture::Absent))
                    .collect();
                parent.insert(capture, Capture::Seq(items));
            }
        }
    }
    follow(&input[pos..], cont, scopes)
}

fn deliver_group<'n>(parent: &mut Bindings<'n>, name: Option<&str>, inner: Bindings<'n>) {
    match name {
        Some(name) => parent.insert(name, Capture::Group(inner)),
        None => parent.merge(inner),
    }
}

/// Bind `name`, or every name `pattern` declares, to [`Capture::Absent`].
fn mark_absent(parent: &mut Bindings<'_>, name: Option<&str>, pattern: &PosPattern) {
    match name {
        Some(name) => parent.insert(name, Capture::Absent),
        None => {
            let mut names = Vec::new();
            pattern.collect_names(&mut names);
            dedup_in_order(&mut names);
            for name in names {
                parent.insert(name, Capture::Absent);
            }
        }
    }
}

fn match_leaf_str<'n>(leaf: &Leaf, text: &'n str, into: &mut Bindings<'n>) -> Option<()> {
    match leaf {
        Leaf::ExactName(expected) => (expected == text).then_some(()),
        Leaf::CapturedName(capture) | Leaf::Wildcard(capture) => {
            into.insert(capture.as_str(), Capture::Str(text));
            Some(())
        }
    }
}

/// Match a single node.
pub(crate) fn match_node<'n>(pattern: &NodePattern, node: &'n SyntaxNode) -> Option<Bindings<'n>> {
    let mut captured = Bindings::new();
    match (pattern, &node.kind) {
        (NodePattern::Leaf(Leaf::Wildcard(capture)), _) => {
            captured.insert(capture.as_str(), Capture::Node(node));
        }
        (NodePattern::Leaf(Leaf::ExactName(expected)), NodeKind::Name(text)) if expected == text => {}
        (NodePattern::Leaf(Leaf::CapturedName(capture)), NodeKind::Name(text)) => {
            captured.insert(capture.as_str(), Capture::Str(text));
        }
        (NodePattern::XExpr(pattern), NodeKind::XExpr(_)) => return match_xexpr(pattern, node),
        _ => return None,
    }
    Some(captured)
}

/// Check every part of an `XExpr` in order, failing fast. Captures are
/// gathered locally and handed back only when every check has passed.
fn match_xexpr<'n>(pattern: &XExprPattern, node: &'n SyntaxNode) -> Option<Bindings<'n>> {
    let xexpr = node.as_xexpr()?;
    let mut captured = Bindings::new();

    match (&pattern.head_label, &xexpr.head_label) {
        (Some(matcher), Some(label)) => match_leaf_str(matcher, label, &mut captured)?,
        (None, None) => {}
        _ => return None,
    }

    captured.merge(match_node(&pattern.head, &xexpr.head)?);

    let positional: Vec<Item<'n>> = xexpr.args.positional.iter().map(Item::Plain).collect();
    captured.merge(match_positional(&pattern.positional, &positional)?);

    match &pattern.keywords {
        Some(keywords) => captured.merge(match_keywords(keywords, &xexpr.args.keywords)?),
        None if !xexpr.args.keywords.is_empty() => return None,
        None => {}
    }

    for slot in SpecialSlot::ALL {
        match (pattern.slot(slot), xexpr.args.slot(slot)) {
            (Some(matcher), actual) => {
                let items: Vec<Item<'n>> = actual.map(Item::Plain).into_iter().collect();
                captured.merge(match_positional(matcher, &items)?);
            }
            (None, Some(_)) => return None,
            (None, None) => {}
        }
    }

    let vert: Vec<Item<'n>> = xexpr.vert_entries().iter().map(Item::from_entry).collect();
    match &pattern.vert {
        Some(matcher) => captured.merge(match_positional(matcher, &vert)?),
        None if !vert.is_empty() => return None,
        None => {}
    }

    Some(captured)
}

fn match_keywords<'n>(pattern: &KwPattern, keywords: &'n [Keyword]) -> Option<Bindings<'n>> {
    let (captured, name) = match pattern {
        KwPattern::DictStyle { entries, name } => (match_dict(entries, name.is_none(), keywords)?, name),
        KwPattern::SeqStyle { inner, name } => {
            let items: Vec<Item<'n>> = keywords.iter().map(Item::from_keyword).collect();
            (match_positional(inner, &items)?, name)
        }
    };
    Some(match name {
        Some(name) => {
            let mut grouped = Bindings::new();
            grouped.insert(name.as_str(), Capture::Group(captured));
            grouped
        }
        None => captured,
    })
}

fn match_dict<'n>(
    entries: &[(String, NodePattern)],
    exact: bool,
    keywords: &'n [Keyword],
) -> Option<Bindings<'n>> {
    let mut actual: FxHashMap<&'n str, &'n SyntaxNode> = FxHashMap::default();
    for keyword in keywords {
        if actual.insert(keyword.name.as_str(), &keyword.value).is_some() {
            return None;
        }
    }
    if exact && actual.len() != entries.len() {
        return None;
    }

    let mut captured = Bindings::new();
    for (key, pattern) in entries {
        let value = *actual.get(key.as_str())?;
        captured.merge(match_node(pattern, value)?);
    }

    if !exact {
        let rest = keywords
            .iter()
            .filter(|keyword| !entries.iter().any(|(key, _)| *key == keyword.name))
            .map(|keyword| (keyword.name.as_str(), &keyword.value))
            .collect();
        captured.insert(KwPattern::REST, Capture::Rest(rest));
    }
    Some(captured)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
