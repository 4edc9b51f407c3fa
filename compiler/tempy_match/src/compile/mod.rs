//! Pattern compilation.
//!
//! A pattern spec is itself a syntax node. Names become leaf matchers
//! (`foo`, `NAME$x`, `$x`); an `XExpr` becomes an [`XExprPattern`], unless
//! its head is one of the reserved combinator names, in which case it
//! becomes the corresponding positional combinator whose operands come from
//! its vertical block.
//!
//! ```text
//! def> NAME$funname(__kleene_star__(params): NAME$param):
//!     __kleene_plus__(body): $stmt
//! ```

use tempy_ir::syntax::{SpecialSlot, SuiteEntry, XExpr};
use tempy_ir::{NodeKind, NodeTag, SyntaxError, SyntaxNode};

use crate::pattern::{Combinator, KwPattern, Leaf, NodePattern, PosPattern, XExprPattern};
use crate::{Pattern, SequencePattern};

/// Why a pattern spec could not be compiled.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("{0} nodes cannot appear in a pattern")]
    UnsupportedNode(NodeTag),

    #[error("empty capture name in `{0}`")]
    EmptyCapture(String),

    #[error("combinator `{0}` cannot be labelled")]
    LabelledCombinator(Combinator),

    #[error("`{0}` takes at most one group name and no other arguments")]
    CombinatorArguments(String),

    #[error("group name of `{0}` must be a bare name")]
    GroupNameNotName(String),

    #[error("combinator `{0}` needs at least one member")]
    EmptyCombinator(Combinator),

    #[error("keyword matcher must be a single `keyword=` argument")]
    KeywordArgument,

    #[error("keyword matcher must be `dict(...)` or `seq(...)`")]
    KeywordForm,

    #[error("duplicate key `{0}` in dict-style keyword matcher")]
    DuplicateKey(String),

    #[error("dict-style keyword matcher lines must be `name -> pattern`")]
    DictEntry,

    #[error("pattern source must hold exactly one expression, found {0}")]
    StatementCount(usize),

    #[error("pattern source must not be an arrow line")]
    ArrowStatement,

    #[error("pattern source did not parse to a block")]
    NotABlock,

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

/// Compile a pattern spec into a reusable [`Pattern`].
#[tracing::instrument(level = "trace", skip_all, fields(tag = %spec.tag()))]
pub fn compile(spec: &SyntaxNode) -> Result<Pattern, PatternError> {
    compile_node(spec).map(Pattern::new)
}

/// Compile block lines into a reusable [`SequencePattern`], as if they
/// were the vertical block of an `XExpr` pattern.
pub fn compile_sequence(specs: &[SuiteEntry]) -> Result<SequencePattern, PatternError> {
    compile_block(specs).map(SequencePattern::new)
}

fn compile_block(entries: &[SuiteEntry]) -> Result<PosPattern, PatternError> {
    let items: Vec<SpecItem<'_>> = entries.iter().map(SpecItem::from_entry).collect();
    compile_positional(&items)
}

/// A positional spec element: an optional arrow label and its node.
#[derive(Copy, Clone)]
struct SpecItem<'s> {
    label: Option<&'s str>,
    spec: &'s SyntaxNode,
}

impl<'s> SpecItem<'s> {
    fn plain(spec: &'s SyntaxNode) -> Self {
        SpecItem { label: None, spec }
    }

    fn from_entry(entry: &'s SuiteEntry) -> Self {
        SpecItem {
            label: entry.label.as_deref(),
            spec: &entry.value,
        }
    }
}

pub(crate) fn parse_leaf(text: &str) -> Result<Leaf, PatternError> {
    let leaf = if let Some(capture) = text.strip_prefix(Leaf::NAME_SIGIL) {
        Leaf::CapturedName(capture.to_string())
    } else if let Some(capture) = text.strip_prefix(Leaf::CAPTURE_SIGIL) {
        Leaf::Wildcard(capture.to_string())
    } else {
        return Ok(Leaf::ExactName(text.to_string()));
    };
    if leaf.capture().is_some_and(str::is_empty) {
        return Err(PatternError::EmptyCapture(text.to_string()));
    }
    Ok(leaf)
}

fn compile_node(spec: &SyntaxNode) -> Result<NodePattern, PatternError> {
    match &spec.kind {
        NodeKind::Name(text) => parse_leaf(text).map(NodePattern::Leaf),
        NodeKind::XExpr(xexpr) => compile_xexpr(xexpr).map(|p| NodePattern::XExpr(Box::new(p))),
        _ => Err(PatternError::UnsupportedNode(spec.tag())),
    }
}

fn compile_xexpr(xexpr: &XExpr) -> Result<XExprPattern, PatternError> {
    let head_label = xexpr.head_label.as_deref().map(parse_leaf).transpose()?;
    let head = compile_node(&xexpr.head)?;

    let positional: Vec<SpecItem<'_>> = xexpr.args.positional.iter().map(SpecItem::plain).collect();
    let positional = compile_positional(&positional)?;
    let keywords = compile_keywords(xexpr)?;

    let slot = |slot: SpecialSlot| {
        xexpr
            .args
            .slot(slot)
            .map(|spec| compile_positional(&[SpecItem::plain(spec)]))
            .transpose()
    };

    let vert = match &xexpr.vert {
        Some(suite) => Some(compile_block(&suite.entries)?),
        None => None,
    };

    Ok(XExprPattern {
        head_label,
        head,
        positional,
        keywords,
        star: slot(SpecialSlot::Star)?,
        dstar: slot(SpecialSlot::DoubleStar)?,
        amp: slot(SpecialSlot::Amp)?,
        damp: slot(SpecialSlot::DoubleAmp)?,
        vert,
    })
}

/// Compile a list of positional specs. A lone member is returned as is;
/// otherwise the members form an unnamed group.
fn compile_positional(items: &[SpecItem<'_>]) -> Result<PosPattern, PatternError> {
    let mut members = items
        .iter()
        .map(|item| compile_item(*item))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(match members.len() {
        0 => PosPattern::Empty,
        1 => members.swap_remove(0),
        _ => PosPattern::Group {
            members,
            name: None,
        },
    })
}

fn compile_item(item: SpecItem<'_>) -> Result<PosPattern, PatternError> {
    let Some((combinator, xexpr)) = as_combinator(item.spec) else {
        return Ok(PosPattern::Single {
            node: compile_node(item.spec)?,
            label: item.label.map(parse_leaf).transpose()?,
        });
    };
    if item.label.is_some() {
        return Err(PatternError::LabelledCombinator(combinator));
    }

    let name = group_name(xexpr, combinator.as_str())?;
    let operands: Vec<SpecItem<'_>> = xexpr.vert_entries().iter().map(SpecItem::from_entry).collect();
    let inner = || compile_positional(&operands).map(Box::new);

    Ok(match combinator {
        Combinator::Optional => PosPattern::Optional { inner: inner()?, name },
        Combinator::ZeroOrMore => PosPattern::ZeroOrMore { inner: inner()?, name },
        Combinator::OneOrMore => PosPattern::OneOrMore { inner: inner()?, name },
        Combinator::Alternation | Combinator::Group => {
            if operands.is_empty() {
                return Err(PatternError::EmptyCombinator(combinator));
            }
            let members = operands
                .iter()
                .map(|operand| member(*operand))
                .collect::<Result<Vec<_>, _>>()?;
            if combinator == Combinator::Group {
                PosPattern::Group { members, name }
            } else {
                PosPattern::Alternation {
                    branches: members,
                    name,
                }
            }
        }
    })
}

/// One line of an alternation or group block. An arrow line is a labelled
/// single; any other line compiles on its own and splices its captures.
fn member(operand: SpecItem<'_>) -> Result<PosPattern, PatternError> {
    if operand.label.is_some() {
        compile_item(operand)
    } else {
        compile_positional(&[operand])
    }
}

fn as_combinator(spec: &SyntaxNode) -> Option<(Combinator, &XExpr)> {
    let xexpr = spec.as_xexpr()?;
    if xexpr.head_label.is_some() {
        return None;
    }
    Combinator::from_head(xexpr.head_name()?).map(|c| (c, xexpr))
}

/// The optional group name: a single bare-name positional argument.
fn group_name(xexpr: &XExpr, head: &str) -> Result<Option<String>, PatternError> {
    let args = &xexpr.args;
    let only_positional = args.keywords.is_empty()
        && SpecialSlot::ALL.iter().all(|&slot| args.slot(slot).is_none());
    match args.positional.as_slice() {
        _ if !only_positional => Err(PatternError::CombinatorArguments(head.to_string())),
        [] => Ok(None),
        [name] => name
            .as_name()
            .map(|n| Some(n.to_string()))
            .ok_or_else(|| PatternError::GroupNameNotName(head.to_string())),
        _ => Err(PatternError::CombinatorArguments(head.to_string())),
    }
}

fn compile_keywords(xexpr: &XExpr) -> Result<Option<KwPattern>, PatternError> {
    let spec = match xexpr.args.keywords.as_slice() {
        [] => return Ok(None),
        [keyword] if keyword.name == "keyword" => &keyword.value,
        _ => return Err(PatternError::KeywordArgument),
    };
    let form = spec
        .as_xexpr()
        .filter(|x| x.head_label.is_none())
        .ok_or(PatternError::KeywordForm)?;
    let head = form.head_name().ok_or(PatternError::KeywordForm)?;
    let name = group_name(form, head)?;

    match head {
        "dict" => {
            let mut entries: Vec<(String, NodePattern)> = Vec::new();
            for entry in form.vert_entries() {
                let key = entry.label.as_deref().ok_or(PatternError::DictEntry)?;
                if entries.iter().any(|(k, _)| k == key) {
                    return Err(PatternError::DuplicateKey(key.to_string()));
                }
                entries.push((key.to_string(), compile_node(&entry.value)?));
            }
            Ok(Some(KwPattern::DictStyle { entries, name }))
        }
        "seq" => match &form.vert {
            Some(suite) => Ok(Some(KwPattern::SeqStyle {
                inner: compile_block(&suite.entries)?,
                name,
            })),
            None => Ok(None),
        },
        _ => Err(PatternError::KeywordForm),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
