#![deny(warnings)]

use crate::errors::{extract_error, ParseError};
use crate::grammar::{Grammar, Symbol};
use crate::items::{Chart, Item, StateSet};
use crate::semantics::{apply_semantics, Semantics, SemanticValue};
use crate::source::Source;
use crate::trees::build_tree;
use std::hash::Hash;

/// Build the Earley chart for `src`. One state set per offset; each set is
/// processed to a fixed point (FIFO over items added during processing)
/// before moving right. Scans go through the matcher, which returns the
/// consumed length or a negative value; variable-length matches land the
/// advanced item that many offsets ahead.
pub fn parse_chart<N, T, S, M>(grammar: &Grammar<N, T>, matcher: &M, src: &S) -> Chart
where
    N: Clone + Eq + Hash,
    S: Source + ?Sized,
    M: Fn(&S, usize, &T) -> isize,
{
    let len = src.len();
    let mut sets: Vec<StateSet> = (0..=len).map(|_| StateSet::new()).collect();

    for &rule in grammar.rules_for(&grammar.start) {
        sets[0].push(Item::predict(rule, 0));
    }

    for idx in 0..=len {
        let mut item_idx = 0;
        while item_idx < sets[idx].len() {
            let item = sets[idx][item_idx];
            item_idx += 1;
            let rule = grammar.rule(item.rule);

            if item.is_complete(rule) {
                // Completion: advance items of the origin set sitting at this
                // product. Indexed scan on purpose: when the origin is the
                // current set the walk must observe items added meanwhile.
                let origin = item.start as usize;
                let mut potential_idx = 0;
                while potential_idx < sets[origin].len() {
                    let potential = sets[origin][potential_idx];
                    potential_idx += 1;
                    if potential.is_at_symbol(grammar.rule(potential.rule), &rule.product) {
                        sets[idx].push(potential.advanced());
                    }
                }
                continue;
            }

            match item.next_symbol(rule).expect("BUG: incomplete item has a next symbol") {
                Symbol::NonTerm(nt) => {
                    // The dot hops over non-terminals deriving epsilon, so a
                    // nullable sub-derivation never stalls waiting for a
                    // completion that was predicted in this very set.
                    if grammar.is_nullable(nt) {
                        sets[idx].push(item.advanced());
                    }
                    for &predicted in grammar.rules_for(nt) {
                        sets[idx].push(Item::predict(predicted, idx));
                    }
                }
                Symbol::Terminal(terminal) => {
                    let matched = matcher(src, idx, terminal);
                    if matched > 0 {
                        let target = idx + matched as usize;
                        if target < sets.len() {
                            sets[target].push(item.advanced());
                        }
                    }
                }
            }
        }
    }

    if cfg!(feature = "debug") {
        for (idx, set) in sets.iter().enumerate() {
            eprintln!("=== {} ===", idx);
            for item in set.iter() {
                eprintln!("{:?}", item);
            }
        }
    }

    // Keep sets up to the rightmost offset the scan reached
    let reached = sets.iter().rposition(|set| !set.is_empty()).unwrap_or(0);
    sets.truncate(reached + 1);

    let complete_match = sets.len() == len + 1;
    let match_count = sets[sets.len() - 1]
        .iter()
        .filter(|item| {
            let rule = grammar.rule(item.rule);
            item.start == 0 && item.is_complete(rule) && rule.product == grammar.start
        })
        .count();

    Chart {
        sets,
        complete_match,
        match_count,
    }
}

/// Bundles a grammar, a matcher and a semantics table into a reusable
/// parser. The pipeline pieces (`parse_chart`, `build_tree`,
/// `apply_semantics`, `extract_error`) stay available as free functions
/// when charts or trees need to be inspected directly.
pub struct EarleyParser<N, T, S: ?Sized, C, M> {
    grammar: Grammar<N, T>,
    matcher: M,
    semantics: Semantics<S, C>,
}

impl<N, T, S, C, M> EarleyParser<N, T, S, C, M>
where
    N: Clone + Eq + Hash,
    T: Clone,
    S: Source + ?Sized,
    M: Fn(&S, usize, &T) -> isize,
{
    pub fn new(grammar: Grammar<N, T>, matcher: M, semantics: Semantics<S, C>) -> Self {
        EarleyParser {
            grammar,
            matcher,
            semantics,
        }
    }

    pub fn grammar(&self) -> &Grammar<N, T> {
        &self.grammar
    }

    /// Full parse: the whole input must be covered by a start derivation.
    pub fn parse_with(&self, src: &S, ctx: &mut C) -> Result<SemanticValue, ParseError<T>> {
        self.run(src, ctx, false)
    }

    /// Accepts the best partial parse: a complete start derivation that
    /// covers a prefix of the input.
    pub fn parse_partial_with(&self, src: &S, ctx: &mut C) -> Result<SemanticValue, ParseError<T>> {
        self.run(src, ctx, true)
    }

    fn run(&self, src: &S, ctx: &mut C, accept_partial: bool) -> Result<SemanticValue, ParseError<T>> {
        let chart = parse_chart(&self.grammar, &self.matcher, src);
        if chart.match_count == 0 || (!accept_partial && !chart.complete_match) {
            return Err(extract_error(&self.grammar, &chart));
        }
        let tree = build_tree(&self.grammar, &self.matcher, &chart, src);
        Ok(apply_semantics(&self.semantics, &self.grammar, &tree, src, ctx))
    }
}

impl<N, T, S, M> EarleyParser<N, T, S, (), M>
where
    N: Clone + Eq + Hash,
    T: Clone,
    S: Source + ?Sized,
    M: Fn(&S, usize, &T) -> isize,
{
    pub fn parse(&self, src: &S) -> Result<SemanticValue, ParseError<T>> {
        self.parse_with(src, &mut ())
    }

    pub fn parse_partial(&self, src: &S) -> Result<SemanticValue, ParseError<T>> {
        self.parse_partial_with(src, &mut ())
    }
}

///////////////////////////////////////////////////////////////////////////////
