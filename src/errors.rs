#![deny(warnings)]

use crate::grammar::{Grammar, Symbol};
use crate::items::{Chart, Item};
use std::fmt;

/// Why a parse was rejected. Both kinds carry the same diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The scan stalled before reaching the end of the input.
    NoMatch,
    /// The whole input was consumed but no start derivation covers it.
    PartialMatch,
}

/// A terminal the recognizer expected at the failure offset, plus the
/// chain of parent items that predicted it ("expected X, inside Y,
/// inside Z").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prediction<T> {
    pub terminal: T,
    pub path: Vec<Item>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError<T> {
    pub kind: ParseErrorKind,
    /// Rightmost input offset the recognizer reached.
    pub position: usize,
    pub predictions: Vec<Prediction<T>>,
}

impl<T: fmt::Debug> fmt::Display for ParseError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "parse failed at offset {}", self.position)?;
        if !self.predictions.is_empty() {
            write!(f, ", expected one of:")?;
            for prediction in &self.predictions {
                write!(f, " {:?}", prediction.terminal)?;
            }
        }
        Ok(())
    }
}

impl<T: fmt::Debug> std::error::Error for ParseError<T> {}

/// Collect diagnostics from a chart that did not achieve acceptance: the
/// terminals expected at the last reached offset, each with a back-chain
/// of the items that predicted it.
pub fn extract_error<N, T>(grammar: &Grammar<N, T>, chart: &Chart) -> ParseError<T>
where
    N: PartialEq,
    T: Clone,
{
    let kind = if chart.complete_match {
        ParseErrorKind::PartialMatch
    } else {
        ParseErrorKind::NoMatch
    };
    let mut error = ParseError {
        kind,
        position: 0,
        predictions: Vec::new(),
    };
    if chart.sets.is_empty() {
        return error;
    }
    error.position = chart.sets.len() - 1;

    let last = &chart.sets[error.position];
    for item in last.iter() {
        let rule = grammar.rule(item.rule);
        if item.is_complete(rule) {
            continue;
        }
        if let Some(Symbol::Terminal(terminal)) = item.next_symbol(rule) {
            let mut path = vec![*item];
            build_path(grammar, chart, &mut path);
            error.predictions.push(Prediction {
                terminal: terminal.clone(),
                path,
            });
        }
    }
    error
}

// Chain upward: find an item in the origin set sitting at the product of
// the path's tip, stopping at a start-symbol item anchored at offset 0 or
// when no parent exists. Items already on the path are never revisited,
// which keeps mutually-recursive predictions from looping.
fn build_path<N, T>(grammar: &Grammar<N, T>, chart: &Chart, path: &mut Vec<Item>)
where
    N: PartialEq,
{
    loop {
        let tip = *path.last().expect("BUG: prediction path starts non-empty");
        let rule = grammar.rule(tip.rule);
        if tip.start == 0 && rule.product == grammar.start {
            return;
        }
        let parent = chart.sets[tip.start as usize]
            .iter()
            .copied()
            .find(|item| {
                !path.contains(item) && item.is_at_symbol(grammar.rule(item.rule), &rule.product)
            });
        match parent {
            Some(parent) => path.push(parent),
            None => return,
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
