#![deny(warnings)]

mod source;
pub use crate::source::Source;

mod grammar;
pub use crate::grammar::{Grammar, GrammarError, Rule, Symbol};

mod items;
pub use crate::items::{Chart, Item, StateSet};

mod parser;
pub use crate::parser::{parse_chart, EarleyParser};

mod trees;
pub use crate::trees::{build_tree, Edge, ParseTree};

mod semantics;
pub use crate::semantics::{apply_semantics, SemanticAction, Semantics, SemanticValue};

mod errors;
pub use crate::errors::{extract_error, ParseError, ParseErrorKind, Prediction};

pub mod text;

mod builder;
pub use crate::builder::{TextGrammarBuilder, TextMatcher, TextParser};

pub mod pretty;

#[cfg(test)]
mod parser_test;
