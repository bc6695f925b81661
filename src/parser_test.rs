#![deny(warnings)]

use crate::errors::{extract_error, ParseErrorKind};
use crate::grammar::{Grammar, Rule, Symbol};
use crate::parser::{parse_chart, EarleyParser};
use crate::semantics::{SemanticValue, Semantics};
use crate::text::{match_text, TextTerminal};
use crate::trees::build_tree;

fn char_matcher(src: &str, at: usize, t: &char) -> isize {
    match src.as_bytes().get(at) {
        Some(&b) if b == *t as u8 => 1,
        _ => -1,
    }
}

fn lit(text: &str) -> Symbol<&'static str, TextTerminal> {
    Symbol::Terminal(TextTerminal::Literal(text.to_string()))
}

///////////////////////////////////////////////////////////////////////////////

#[test]
fn dangling_else_short_if_first() {
    // Block -> '{}' | If ;  If -> 'if' Block | 'if' Block 'else' Block
    let g = Grammar::new(
        "Block",
        vec![
            Rule::new("Block", vec![lit("{}")]),
            Rule::new("Block", vec![Symbol::NonTerm("If")]),
            Rule::new("If", vec![lit("if"), Symbol::NonTerm("Block")]),
            Rule::new(
                "If",
                vec![
                    lit("if"),
                    Symbol::NonTerm("Block"),
                    lit("else"),
                    Symbol::NonTerm("Block"),
                ],
            ),
        ],
    )
    .unwrap();
    let src = "ifif{}else{}";
    let chart = parse_chart(&g, &match_text, src);
    assert!(chart.complete_match);
    assert!(chart.match_count >= 1);
    let tree = build_tree(&g, &match_text, &chart, src);
    // the outer If uses the short rule, so the inner if absorbs the else
    assert_eq!(tree[0].rule, Some(1)); // Block -> If over the whole input
    assert_eq!(tree[1].rule, Some(2)); // If -> 'if' Block
    assert_eq!((tree[1].start, tree[1].end), (0, 12));
}

#[test]
fn dangling_else_long_if_first() {
    // same grammar, long If rule declared first
    let g = Grammar::new(
        "Block",
        vec![
            Rule::new("Block", vec![lit("{}")]),
            Rule::new("Block", vec![Symbol::NonTerm("If")]),
            Rule::new(
                "If",
                vec![
                    lit("if"),
                    Symbol::NonTerm("Block"),
                    lit("else"),
                    Symbol::NonTerm("Block"),
                ],
            ),
            Rule::new("If", vec![lit("if"), Symbol::NonTerm("Block")]),
        ],
    )
    .unwrap();
    let src = "ifif{}else{}";
    let chart = parse_chart(&g, &match_text, src);
    assert!(chart.complete_match);
    let tree = build_tree(&g, &match_text, &chart, src);
    // now the outer If absorbs the else
    assert_eq!(tree[0].rule, Some(1));
    assert_eq!(tree[1].rule, Some(2)); // If -> 'if' Block 'else' Block
    assert_eq!((tree[1].start, tree[1].end), (0, 12));
    // its Block child covers exactly the inner "if{}"
    let inner = tree
        .iter()
        .find(|edge| edge.rule == Some(1) && edge.start == 2)
        .unwrap();
    assert_eq!(inner.end, 6);
}

#[test]
fn nullable_chain_parses() {
    // T -> eps | T A S B ;  A -> eps ;  B -> A ;  S -> 'S'
    let g = Grammar::new(
        "T",
        vec![
            Rule::new("T", vec![]),
            Rule::new(
                "T",
                vec![
                    Symbol::NonTerm("T"),
                    Symbol::NonTerm("A"),
                    Symbol::NonTerm("S"),
                    Symbol::NonTerm("B"),
                ],
            ),
            Rule::new("A", vec![]),
            Rule::new("B", vec![Symbol::NonTerm("A")]),
            Rule::new("S", vec![Symbol::Terminal('S')]),
        ],
    )
    .unwrap();
    let chart = parse_chart(&g, &char_matcher, "S");
    assert!(chart.complete_match);
    assert!(chart.match_count >= 1);
    let tree = build_tree(&g, &char_matcher, &chart, "S");
    assert!(!tree.is_empty());
    // the single terminal is in there exactly once
    let leaves: Vec<_> = tree.iter().filter(|e| e.is_leaf()).collect();
    assert_eq!(leaves.len(), 1);
    assert_eq!((leaves[0].start, leaves[0].end), (0, 1));
    // "SS" needs two wraps of the recursive rule
    let chart = parse_chart(&g, &char_matcher, "SS");
    assert!(chart.complete_match);
    assert!(chart.match_count >= 1);
}

#[test]
fn left_recursion_scales() {
    // A -> A 'x' | 'x'
    let g = Grammar::new(
        "A",
        vec![
            Rule::new("A", vec![Symbol::NonTerm("A"), Symbol::Terminal('x')]),
            Rule::new("A", vec![Symbol::Terminal('x')]),
        ],
    )
    .unwrap();
    let mut sem: Semantics<str> = Semantics::new();
    sem.set_action(0, |_, vals, _| SemanticValue::of(vals[0].get::<usize>() + 1));
    sem.set_action(1, |_, _, _| SemanticValue::of(1usize));
    let src = "x".repeat(500);
    let parser = EarleyParser::new(g, char_matcher, sem);
    let out = parser.parse(&src).unwrap();
    assert_eq!(out.take::<usize>(), 500);
}

#[test]
fn right_recursion_scales() {
    // A -> 'x' A | 'x'
    let g = Grammar::new(
        "A",
        vec![
            Rule::new("A", vec![Symbol::Terminal('x'), Symbol::NonTerm("A")]),
            Rule::new("A", vec![Symbol::Terminal('x')]),
        ],
    )
    .unwrap();
    let mut sem: Semantics<str> = Semantics::new();
    sem.set_action(0, |_, vals, _| SemanticValue::of(vals[1].get::<usize>() + 1));
    sem.set_action(1, |_, _, _| SemanticValue::of(1usize));
    let src = "x".repeat(500);
    let parser = EarleyParser::new(g, char_matcher, sem);
    let out = parser.parse(&src).unwrap();
    assert_eq!(out.take::<usize>(), 500);
}

#[test]
fn empty_input_nullable_start() {
    // A -> eps | A 'x'
    let g = Grammar::new(
        "A",
        vec![
            Rule::new("A", vec![]),
            Rule::new("A", vec![Symbol::NonTerm("A"), Symbol::Terminal('x')]),
        ],
    )
    .unwrap();
    let parser = EarleyParser::new(g, char_matcher, Semantics::<str>::new());
    let out = parser.parse("").unwrap();
    assert!(!out.has_value());
    assert_eq!((out.start, out.end), (0, 0));
}

#[test]
fn empty_input_non_nullable_start_rejected() {
    let g = Grammar::new("A", vec![Rule::new("A", vec![Symbol::Terminal('x')])]).unwrap();
    let parser = EarleyParser::new(g, char_matcher, Semantics::<str>::new());
    let err = parser.parse("").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::PartialMatch);
    assert_eq!(err.position, 0);
}

#[test]
fn partial_parse_accepts_prefix() {
    // Start -> '+' '+'
    let g = Grammar::new(
        "Start",
        vec![Rule::new(
            "Start",
            vec![Symbol::Terminal('+'), Symbol::Terminal('+')],
        )],
    )
    .unwrap();
    let parser = EarleyParser::new(g, char_matcher, Semantics::<str>::new());
    let err = parser.parse("+++").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::NoMatch);
    assert_eq!(err.position, 2);
    let out = parser.parse_partial("+++").unwrap();
    assert_eq!((out.start, out.end), (0, 2));
}

#[test]
fn partial_parse_needs_a_complete_start_item() {
    let g = Grammar::new(
        "Start",
        vec![Rule::new(
            "Start",
            vec![Symbol::Terminal('+'), Symbol::Terminal('+')],
        )],
    )
    .unwrap();
    let parser = EarleyParser::new(g, char_matcher, Semantics::<str>::new());
    assert!(parser.parse_partial("+x").is_err());
    assert!(parser.parse_partial("x").is_err());
}

#[test]
fn parse_over_token_slices() {
    // the engine is alphabet-agnostic: tokens are i32s, the matcher
    // compares values, spans index the token slice
    const PLUS: i32 = -1;
    let g = Grammar::new(
        "E",
        vec![
            Rule::new(
                "E",
                vec![Symbol::NonTerm("E"), Symbol::Terminal(PLUS), Symbol::NonTerm("N")],
            ),
            Rule::new("E", vec![Symbol::NonTerm("N")]),
            Rule::new("N", vec![Symbol::Terminal(7)]),
        ],
    )
    .unwrap();
    let token_matcher = |src: &[i32], at: usize, t: &i32| -> isize {
        match src.get(at) {
            Some(token) if token == t => 1,
            _ => -1,
        }
    };
    let mut sem: Semantics<[i32]> = Semantics::new();
    sem.set_action(0, |_, vals, _| {
        SemanticValue::of(vals[0].get::<i64>() + vals[2].get::<i64>())
    });
    sem.set_action(2, |src, vals, _| {
        SemanticValue::of(vals[0].slice_of(src)[0] as i64)
    });
    let tokens = vec![7, PLUS, 7, PLUS, 7];
    let parser = EarleyParser::new(g, token_matcher, sem);
    let out = parser.parse(&tokens[..]).unwrap();
    assert_eq!(out.take::<i64>(), 21);
}

#[test]
fn pipeline_is_deterministic() {
    let g = Grammar::new(
        "S",
        vec![
            Rule::new("S", vec![Symbol::NonTerm("S"), Symbol::NonTerm("S")]),
            Rule::new("S", vec![Symbol::Terminal('b')]),
        ],
    )
    .unwrap();
    let src = "bbbb";
    let chart_a = parse_chart(&g, &char_matcher, src);
    let chart_b = parse_chart(&g, &char_matcher, src);
    assert_eq!(chart_a, chart_b);
    let tree_a = build_tree(&g, &char_matcher, &chart_a, src);
    let tree_b = build_tree(&g, &char_matcher, &chart_b, src);
    assert_eq!(tree_a, tree_b);
}

#[test]
fn ambiguous_grammar_yields_single_parse() {
    // S -> S S | 'b' over "bbb" is ambiguous; one derivation comes back
    let g = Grammar::new(
        "S",
        vec![
            Rule::new("S", vec![Symbol::NonTerm("S"), Symbol::NonTerm("S")]),
            Rule::new("S", vec![Symbol::Terminal('b')]),
        ],
    )
    .unwrap();
    let src = "bbb";
    let chart = parse_chart(&g, &char_matcher, src);
    assert!(chart.complete_match);
    let tree = build_tree(&g, &char_matcher, &chart, src);
    let yielded: usize = tree.iter().filter(|e| e.is_leaf()).map(|e| e.end - e.start).sum();
    assert_eq!(yielded, 3);
}

#[test]
fn error_extraction_roundtrip() {
    let g = Grammar::new(
        "S",
        vec![
            Rule::new("S", vec![Symbol::NonTerm("S"), Symbol::Terminal('+'), Symbol::NonTerm("N")]),
            Rule::new("S", vec![Symbol::NonTerm("N")]),
            Rule::new("N", vec![Symbol::Terminal('d')]),
        ],
    )
    .unwrap();
    let chart = parse_chart(&g, &char_matcher, "d+d+");
    // "d+d" derives S at offset 3, but no start item covers the last set
    assert_eq!(chart.match_count, 0);
    let error = extract_error(&g, &chart);
    assert_eq!(error.position, 4);
    assert_eq!(error.kind, ParseErrorKind::PartialMatch);
    let expected: Vec<char> = error.predictions.iter().map(|p| p.terminal).collect();
    assert_eq!(expected, vec!['d']);
}

#[test]
fn semantics_default_passthrough_end_to_end() {
    // untagged rules bubble the first non-discarded child up
    let g = Grammar::new(
        "S",
        vec![
            Rule::new("S", vec![Symbol::NonTerm("N")]),
            Rule::new("N", vec![Symbol::Terminal('d')]),
        ],
    )
    .unwrap();
    let mut sem: Semantics<str> = Semantics::new();
    sem.set_action(1, |src, vals, _| {
        SemanticValue::of(vals[0].slice_of(src).to_string())
    });
    let parser = EarleyParser::new(g, char_matcher, sem);
    let out = parser.parse("d").unwrap();
    assert_eq!(out.take::<String>(), "d");
}

#[test]
fn chart_and_tree_agree_on_spans() {
    let g = Grammar::new(
        "S",
        vec![
            Rule::new("S", vec![Symbol::NonTerm("S"), Symbol::Terminal('+'), Symbol::NonTerm("N")]),
            Rule::new("S", vec![Symbol::NonTerm("N")]),
            Rule::new("N", vec![Symbol::Terminal('d')]),
        ],
    )
    .unwrap();
    let src = "d+d+d";
    let chart = parse_chart(&g, &char_matcher, src);
    let tree = build_tree(&g, &char_matcher, &chart, src);
    // every internal edge's children tile it exactly
    let mut cursor = 0usize;
    check_tiling(&g, &tree, &mut cursor);
    assert_eq!(cursor, tree.len());
}

fn check_tiling(g: &Grammar<&'static str, char>, tree: &[crate::trees::Edge], cursor: &mut usize) {
    let edge = tree[*cursor];
    *cursor += 1;
    let Some(rule) = edge.rule else { return };
    let arity = g.rule(rule).symbols.len();
    let mut at = edge.start;
    for _ in 0..arity {
        let child = tree[*cursor];
        assert_eq!(child.start, at);
        check_tiling(g, tree, cursor);
        at = child.end;
    }
    assert_eq!(at, edge.end);
}
