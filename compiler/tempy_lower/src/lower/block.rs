//! Blocks: statement sequencing, `if` chain grouping and function bodies.

use std::ops::Range;

use tempy_diagnostic::{ErrorCode, ErrorFlood, ErrorGuaranteed};
use tempy_ir::syntax::SuiteEntry;
use tempy_ir::{HostExpr, HostStmt, SyntaxNode, VarId};

use crate::env::HintSource;
use crate::{Conclusion, Premise, TranslateResult, Translator};

type Parts = (Vec<HostStmt>, Option<HostExpr>);

/// Unpack two conclusions, keeping the first error.
pub(crate) fn join(first: Conclusion, second: Conclusion) -> Result<(Parts, Parts), ErrorGuaranteed> {
    match (first.into_parts(), second.into_parts()) {
        (Ok(first), Ok(second)) => Ok((first, second)),
        (Err(guarantee), _) | (_, Err(guarantee)) => Err(guarantee),
    }
}

impl Translator {
    /// Default visitor for a block used as an expression.
    pub(crate) fn lower_suite_expr(&mut self, node: &SyntaxNode, premise: Premise) -> TranslateResult {
        match node.as_suite() {
            Some(suite) => self.lower_suite(&suite.entries, premise),
            None => self.error_at(ErrorCode::E9001, node.span, "expected a block"),
        }
    }

    pub(crate) fn lower_suite(&mut self, entries: &[SuiteEntry], premise: Premise) -> TranslateResult {
        let (lines, poisoned) = self.plain_lines(entries)?;
        let block = self.lower_block(&lines, premise)?;
        Ok(match poisoned {
            Some(guarantee) => Conclusion::Error(guarantee),
            None => block,
        })
    }

    /// The plain lines of a block. Arrow lines are reported.
    pub(crate) fn plain_lines<'e>(
        &mut self,
        entries: &'e [SuiteEntry],
    ) -> Result<(Vec<&'e SyntaxNode>, Option<ErrorGuaranteed>), ErrorFlood> {
        let mut lines = Vec::with_capacity(entries.len());
        let mut poisoned = None;
        for entry in entries {
            match &entry.label {
                None => lines.push(&entry.value),
                Some(label) => {
                    let error = self.error_at(
                        ErrorCode::E1001,
                        entry.value.span,
                        format!("unexpected arrow line `{label} -> ...` in a block"),
                    )?;
                    if let Conclusion::Error(guarantee) = error {
                        poisoned.get_or_insert(guarantee);
                    }
                }
            }
        }
        Ok((lines, poisoned))
    }

    /// Lower a sequence of statements.
    ///
    /// Functions defined anywhere in the block are bound before the first
    /// statement runs, so they can refer to each other. Only the last
    /// statement is asked for a value. Every statement is translated even
    /// after an error, so that all of the block's errors get reported.
    pub(crate) fn lower_block(&mut self, lines: &[&SyntaxNode], premise: Premise) -> TranslateResult {
        let prebound: Vec<Option<VarId>> = lines.iter().map(|line| self.prebind(line)).collect();
        let units = self.group_units(lines);

        let mut stmts = Vec::new();
        let mut result = None;
        let mut poisoned = None;
        let count = units.len();
        for (position, unit) in units.into_iter().enumerate() {
            let head = lines[unit.start];
            let wants_value = premise.wants_value && position + 1 == count;
            let unit_premise = Premise {
                wants_value,
                prebound: prebound[unit.start],
            };
            let conclusion = if unit.len() > 1 {
                self.lower_if_chain(&lines[unit], unit_premise)?
            } else {
                self.translate(head, unit_premise)?
            };

            if self.config.emit_line_info && !head.span.is_dummy() {
                stmts.push(self.line_info(head.span));
            }
            match conclusion.into_parts() {
                Ok((unit_stmts, value)) => {
                    stmts.extend(unit_stmts);
                    if wants_value {
                        result = Some(value.unwrap_or_else(HostExpr::none));
                    } else if let Some(value) = value.filter(HostExpr::may_have_effect) {
                        stmts.push(HostStmt::Expr(value));
                    }
                }
                Err(guarantee) => {
                    poisoned.get_or_insert(guarantee);
                }
            }
        }

        if let Some(guarantee) = poisoned {
            return Ok(Conclusion::Error(guarantee));
        }
        if premise.wants_value && result.is_none() {
            result = Some(HostExpr::none());
        }
        Ok(Conclusion::with_result(stmts, result))
    }

    /// Bind the name of a `def>` line in the current frame.
    fn prebind(&mut self, line: &SyntaxNode) -> Option<VarId> {
        let xexpr = line.as_xexpr()?;
        if xexpr.head_label.as_deref() != Some("def") {
            return None;
        }
        let name = xexpr.head_name()?;
        Some(self.env.ensure_local(name, HintSource::Function))
    }

    /// Split the block into translation units: single lines, or an `if`
    /// with the `elif`/`else` lines that follow it.
    fn group_units(&self, lines: &[&SyntaxNode]) -> Vec<Range<usize>> {
        let ids = self.builtin_ids;
        let mut units = Vec::with_capacity(lines.len());
        let mut next = 0;
        while next < lines.len() {
            let start = next;
            next += 1;
            if self.branch_form(lines[start]) == Some(ids.if_form) {
                while next < lines.len() && self.branch_form(lines[next]) == Some(ids.elif_form) {
                    next += 1;
                }
                if next < lines.len() && self.branch_form(lines[next]) == Some(ids.else_form) {
                    next += 1;
                }
            }
            units.push(start..next);
        }
        units
    }

    /// Lower a nested body to statements. With `target`, the body's value
    /// is assigned to it. An empty body becomes `pass`.
    pub(crate) fn lower_body(&mut self, lines: &[&SyntaxNode], target: Option<VarId>) -> TranslateResult {
        let premise = Premise::STATEMENT.with_value(target.is_some());
        let (mut stmts, value) = match self.lower_block(lines, premise)?.into_parts() {
            Ok(parts) => parts,
            Err(guarantee) => return Ok(Conclusion::Error(guarantee)),
        };
        if let Some(id) = target {
            stmts.push(HostStmt::assign_var(id, value.unwrap_or_else(HostExpr::none)));
        }
        if stmts.is_empty() {
            stmts.push(HostStmt::Pass);
        }
        Ok(Conclusion::stmts(stmts))
    }

    /// Lower the body of a host function: the last statement's value is
    /// returned. The caller owns the frame.
    pub(crate) fn lower_function_body(&mut self, lines: &[&SyntaxNode]) -> TranslateResult {
        if lines.is_empty() {
            return Ok(Conclusion::stmts(vec![HostStmt::Pass]));
        }
        Ok(match self.lower_block(lines, Premise::VALUE)?.into_parts() {
            Ok((mut stmts, value)) => {
                stmts.push(HostStmt::Return(Some(value.unwrap_or_else(HostExpr::none))));
                Conclusion::stmts(stmts)
            }
            Err(guarantee) => Conclusion::Error(guarantee),
        })
    }
}
