#![deny(warnings)]

use crate::grammar::{Grammar, GrammarError, Rule, Symbol};
use crate::parser::EarleyParser;
use crate::semantics::{Semantics, SemanticValue};
use crate::text::{match_text, TextSymbol, TextTerminal};
use std::hash::Hash;

/// The bundled string matcher as a plain function pointer.
pub type TextMatcher = fn(&str, usize, &TextTerminal) -> isize;

/// A parser over string input wired to the bundled matcher.
pub type TextParser<N, C = ()> = EarleyParser<N, TextTerminal, str, C, TextMatcher>;

/// Fluent grammar construction for string inputs. Rules are recorded in
/// declaration order (each rule's id is its index); `action` attaches to
/// the rule declared last.
///
/// With a whitespace symbol configured, every terminal inserted into a
/// rule is flanked by references to it, marked discarded so actions never
/// see the whitespace values. Consecutive injections collapse into one,
/// and rules producing the whitespace symbol itself are left untouched.
pub struct TextGrammarBuilder<N, C = ()> {
    start: N,
    whitespace: Option<N>,
    rules: Vec<Rule<N, TextTerminal>>,
    semantics: Semantics<str, C>,
}

impl<N, C> TextGrammarBuilder<N, C>
where
    N: Clone + Eq + Hash,
{
    pub fn new(start: N) -> Self {
        TextGrammarBuilder {
            start,
            whitespace: None,
            rules: Vec::new(),
            semantics: Semantics::new(),
        }
    }

    /// Configure the implicit whitespace non-terminal. Its rules still
    /// have to be declared like any other (typically epsilon plus a
    /// whitespace pattern).
    pub fn whitespace(mut self, symbol: N) -> Self {
        self.whitespace = Some(symbol);
        self
    }

    pub fn rule(mut self, product: N, spec: &[TextSymbol<N>]) -> Self {
        let mut rule = Rule::new(product, Vec::new());
        for symbol in spec {
            match symbol {
                Symbol::NonTerm(_) => rule.add(symbol.clone(), false),
                Symbol::Terminal(_) => {
                    self.inject_whitespace(&mut rule, true);
                    rule.add(symbol.clone(), false);
                    self.inject_whitespace(&mut rule, false);
                }
            }
        }
        self.rules.push(rule);
        self
    }

    /// Attach a semantic action to the most recently declared rule.
    pub fn action(
        mut self,
        action: impl Fn(&str, Vec<SemanticValue>, &mut C) -> SemanticValue + 'static,
    ) -> Self {
        let id = match self.rules.len() {
            0 => panic!("action must follow a rule"),
            len => (len - 1) as u32,
        };
        self.semantics.set_action(id, action);
        self
    }

    fn inject_whitespace(&self, rule: &mut Rule<N, TextTerminal>, check_duplicate: bool) {
        let Some(whitespace) = &self.whitespace else { return };
        if rule.product == *whitespace {
            return;
        }
        if check_duplicate {
            if let Some(Symbol::NonTerm(last)) = rule.symbols.last() {
                if last == whitespace {
                    return;
                }
            }
        }
        rule.add(Symbol::NonTerm(whitespace.clone()), true);
    }

    /// Finish into a parser wired to the bundled text matcher.
    pub fn into_parser(self) -> Result<TextParser<N, C>, GrammarError<N>> {
        let (grammar, semantics) = self.into_grammar()?;
        Ok(EarleyParser::new(grammar, match_text as TextMatcher, semantics))
    }

    /// Finish into the raw parts, for callers that drive the pipeline
    /// functions themselves or want to inspect the grammar.
    pub fn into_grammar(
        self,
    ) -> Result<(Grammar<N, TextTerminal>, Semantics<str, C>), GrammarError<N>> {
        let grammar = Grammar::new(self.start, self.rules)?;
        Ok((grammar, self.semantics))
    }
}

///////////////////////////////////////////////////////////////////////////////
