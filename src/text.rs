#![deny(warnings)]

//! Terminal family and bundled matcher for string grammars. Matching is
//! byte-offset based so spans never split multi-byte characters.

use crate::grammar::Symbol;
use regex::bytes::Regex;
use std::fmt;

/// Compiled regex that remembers the pattern it was declared with. The
/// compiled form is anchored so matches start exactly at the probe offset.
#[derive(Clone)]
pub struct SavedRegex {
    regex: Regex,
    pattern: String,
}

impl SavedRegex {
    /// Panics on an invalid pattern; bad patterns are grammar-declaration
    /// bugs, not parse-time conditions.
    pub fn new(pattern: &str) -> SavedRegex {
        let anchored = format!(r"\A(?:{})", pattern);
        let regex = match Regex::new(&anchored) {
            Ok(regex) => regex,
            Err(err) => panic!("invalid terminal regex /{}/: {}", pattern, err),
        };
        SavedRegex {
            regex,
            pattern: pattern.to_string(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl PartialEq for SavedRegex {
    fn eq(&self, other: &SavedRegex) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for SavedRegex {}

impl fmt::Debug for SavedRegex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "/{}/", self.pattern)
    }
}

/// String-grammar terminals.
#[derive(Clone, PartialEq, Eq)]
pub enum TextTerminal {
    /// Exact byte sequence.
    Literal(String),
    /// Alternatives tried in order; the first that matches wins.
    Choice(Vec<String>),
    /// A single byte between the bounds, inclusive.
    Range(u8, u8),
    /// Longest regex match anchored at the probe offset.
    Regex(SavedRegex),
}

impl fmt::Debug for TextTerminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TextTerminal::Literal(text) => write!(f, "{:?}", text),
            TextTerminal::Choice(options) => {
                write!(f, "(")?;
                for (idx, option) in options.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{:?}", option)?;
                }
                write!(f, ")")
            }
            TextTerminal::Range(lo, hi) => write!(f, "[{}-{}]", *lo as char, *hi as char),
            TextTerminal::Regex(saved) => write!(f, "{:?}", saved),
        }
    }
}

/// The bundled matcher: length consumed by `terminal` at byte offset `at`,
/// or -1. Pure; safe to probe at any offset including past the end.
pub fn match_text(src: &str, at: usize, terminal: &TextTerminal) -> isize {
    let data = src.as_bytes();
    match terminal {
        TextTerminal::Literal(text) => {
            if at + text.len() > data.len() {
                return -1;
            }
            if &data[at..at + text.len()] == text.as_bytes() {
                text.len() as isize
            } else {
                -1
            }
        }
        TextTerminal::Choice(options) => {
            for option in options {
                if at + option.len() > data.len() {
                    continue;
                }
                if &data[at..at + option.len()] == option.as_bytes() {
                    return option.len() as isize;
                }
            }
            -1
        }
        TextTerminal::Range(lo, hi) => match data.get(at) {
            Some(byte) if lo <= byte && byte <= hi => 1,
            _ => -1,
        },
        TextTerminal::Regex(saved) => {
            if at > data.len() {
                return -1;
            }
            match saved.regex.find(&data[at..]) {
                // a zero-length match consumes nothing and scans nowhere
                Some(found) if found.end() > 0 => found.end() as isize,
                _ => -1,
            }
        }
    }
}

/// Symbols over the string-terminal alphabet.
pub type TextSymbol<N> = Symbol<N, TextTerminal>;

pub fn nt<N>(name: N) -> TextSymbol<N> {
    Symbol::NonTerm(name)
}

pub fn lit<N>(text: &str) -> TextSymbol<N> {
    Symbol::Terminal(TextTerminal::Literal(text.to_string()))
}

pub fn choice<N>(options: &[&str]) -> TextSymbol<N> {
    Symbol::Terminal(TextTerminal::Choice(
        options.iter().map(|option| option.to_string()).collect(),
    ))
}

pub fn range<N>(lo: char, hi: char) -> TextSymbol<N> {
    debug_assert!(lo.is_ascii() && hi.is_ascii(), "byte ranges are ascii");
    Symbol::Terminal(TextTerminal::Range(lo as u8, hi as u8))
}

pub fn re<N>(pattern: &str) -> TextSymbol<N> {
    Symbol::Terminal(TextTerminal::Regex(SavedRegex::new(pattern)))
}

///////////////////////////////////////////////////////////////////////////////
