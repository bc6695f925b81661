#![deny(warnings)]

//! Human-readable rendering of grammars, charts, trees and parse errors.
//! Diagnostic output only; nothing here is on the parse path.

use crate::errors::ParseError;
use crate::grammar::{Grammar, Rule, Symbol};
use crate::items::{Chart, Item};
use crate::trees::ParseTree;
use std::fmt::Debug;

fn symbol_to_string<N: Debug, T: Debug>(symbol: &Symbol<N, T>) -> String {
    match symbol {
        Symbol::NonTerm(nt) => format!("{:?}", nt),
        Symbol::Terminal(t) => format!("{:?}", t),
    }
}

pub fn rule_to_string<N: Debug, T: Debug>(rule: &Rule<N, T>) -> String {
    let mut out = format!("{:?} ->", rule.product);
    for symbol in &rule.symbols {
        out.push(' ');
        out.push_str(&symbol_to_string(symbol));
    }
    out
}

/// Dotted-rule form: `Sum -> Sum \u{00b7} "+" Product (0)`.
pub fn item_to_string<N: Debug, T: Debug>(grammar: &Grammar<N, T>, item: &Item) -> String {
    let rule = grammar.rule(item.rule);
    let mut out = format!("{:?} ->", rule.product);
    for (idx, symbol) in rule.symbols.iter().enumerate() {
        if idx == item.dot as usize {
            out.push_str(" \u{00b7}");
        }
        out.push(' ');
        out.push_str(&symbol_to_string(symbol));
    }
    if item.dot as usize == rule.symbols.len() {
        out.push_str(" \u{00b7}");
    }
    out.push_str(&format!(" ({})", item.start));
    out
}

pub fn grammar_to_string<N, T>(grammar: &Grammar<N, T>) -> String
where
    N: Debug,
    T: Debug,
{
    let mut out = format!("Start: {:?}\n", grammar.start);
    for rule in &grammar.rules {
        out.push_str(&rule_to_string(rule));
        out.push('\n');
    }
    out
}

pub fn chart_to_string<N, T>(grammar: &Grammar<N, T>, chart: &Chart) -> String
where
    N: Debug,
    T: Debug,
{
    let mut out = String::new();
    for (offset, set) in chart.sets.iter().enumerate() {
        out.push_str(&format!("=== {} ===\n", offset));
        for item in set.iter() {
            out.push_str(&item_to_string(grammar, item));
            out.push('\n');
        }
    }
    out
}

/// Indented tree dump; leaves show the matched text.
pub fn tree_to_string<N, T>(grammar: &Grammar<N, T>, tree: &ParseTree, src: &str) -> String
where
    N: Debug,
    T: Debug,
{
    let mut out = String::new();
    let mut cursor = 0;
    tree_lines(grammar, tree, src, &mut cursor, 0, &mut out);
    out
}

fn tree_lines<N, T>(
    grammar: &Grammar<N, T>,
    tree: &ParseTree,
    src: &str,
    cursor: &mut usize,
    depth: usize,
    out: &mut String,
) where
    N: Debug,
    T: Debug,
{
    let Some(edge) = tree.get(*cursor) else { return };
    *cursor += 1;
    for _ in 0..depth {
        out.push_str("  ");
    }
    match edge.rule {
        Some(rule) => {
            let rule = grammar.rule(rule);
            out.push_str(&format!(
                "{:?} ({}, {})\n",
                rule.product, edge.start, edge.end
            ));
            for _ in 0..rule.symbols.len() {
                tree_lines(grammar, tree, src, cursor, depth + 1, out);
            }
        }
        None => {
            out.push_str(&format!(
                "{:?} ({}, {})\n",
                &src[edge.start..edge.end],
                edge.start,
                edge.end
            ));
        }
    }
}

/// Error report: offending position with line/column, then each expected
/// terminal with the chain of rules that predicted it.
pub fn error_to_string<N, T>(grammar: &Grammar<N, T>, error: &ParseError<T>, src: &str) -> String
where
    N: Debug,
    T: Debug,
{
    let mut out = String::new();
    if error.position >= src.len() {
        out.push_str("Unexpected end of input\n");
    } else {
        // the offset is byte-based and may not sit on a char boundary
        match src.get(error.position..).and_then(|rest| rest.chars().next()) {
            Some(glyph) => out.push_str(&format!("Unexpected character {:?}\n", glyph)),
            None => out.push_str(&format!(
                "Unexpected byte 0x{:02x}\n",
                src.as_bytes()[error.position]
            )),
        }
    }

    let mut line = 0;
    let mut line_start = 0;
    for (idx, byte) in src.bytes().enumerate().take(error.position) {
        if byte == b'\n' {
            line += 1;
            line_start = idx + 1;
        }
    }
    out.push_str(&format!(
        "Line {} column {}\n",
        line,
        error.position - line_start
    ));

    out.push_str("Expected one of the following:\n");
    for prediction in &error.predictions {
        out.push_str(&format!("{:?} from:\n", prediction.terminal));
        for item in &prediction.path {
            out.push_str("    ");
            out.push_str(&item_to_string(grammar, item));
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

///////////////////////////////////////////////////////////////////////////////
