#![deny(warnings)]

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Symbol<N, T> {
    NonTerm(N),
    // A terminal is opaque to the engine; only the matcher interprets it
    Terminal(T),
}

impl<N, T> Symbol<N, T> {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn nonterm(&self) -> Option<&N> {
        match self {
            Symbol::NonTerm(nt) => Some(nt),
            Symbol::Terminal(_) => None,
        }
    }
}

/// A production `product -> symbols`. `discarded` is a bitmask over RHS
/// positions whose semantic values are dropped before actions run; rules
/// are limited to 64 symbols because of it.
#[derive(Clone, Debug)]
pub struct Rule<N, T> {
    pub product: N,
    pub symbols: Vec<Symbol<N, T>>,
    pub id: u32,
    discarded: u64,
}

impl<N, T> Rule<N, T> {
    pub fn new(product: N, symbols: Vec<Symbol<N, T>>) -> Self {
        assert!(symbols.len() <= 64, "rules are limited to 64 symbols");
        Rule {
            product,
            symbols,
            id: 0,
            discarded: 0,
        }
    }

    /// An empty rule derives epsilon.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbol_at(&self, idx: usize) -> Option<&Symbol<N, T>> {
        self.symbols.get(idx)
    }

    pub fn add(&mut self, symbol: Symbol<N, T>, discarded: bool) {
        if discarded {
            self.set_discarded(self.symbols.len(), true);
        }
        self.symbols.push(symbol);
    }

    pub fn set_discarded(&mut self, idx: usize, discarded: bool) {
        assert!(idx < 64, "rules are limited to 64 symbols");
        if discarded {
            self.discarded |= 1 << idx;
        } else {
            self.discarded &= !(1 << idx);
        }
    }

    pub fn is_discarded(&self, idx: usize) -> bool {
        idx < 64 && (self.discarded >> idx) & 1 == 1
    }
}

impl<N: fmt::Debug, T: fmt::Debug> fmt::Display for Rule<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} ->", self.product)?;
        for symbol in &self.symbols {
            match symbol {
                Symbol::NonTerm(nt) => write!(f, " {:?}", nt)?,
                Symbol::Terminal(t) => write!(f, " {:?}", t)?,
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GrammarError<N> {
    /// A nullable non-terminal reaches itself through all-nullable
    /// right-hand sides; such grammars have no finite epsilon derivation.
    RecursiveNullable(N),
}

impl<N: fmt::Debug> fmt::Display for GrammarError<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GrammarError::RecursiveNullable(nt) => {
                write!(f, "recursive nullable non-terminal: {:?}", nt)
            }
        }
    }
}

impl<N: fmt::Debug> std::error::Error for GrammarError<N> {}

/// An immutable grammar: start symbol, rules in declaration order (each
/// rule's `id` equals its index) and the precomputed nullable set.
#[derive(Clone)]
pub struct Grammar<N, T> {
    pub start: N,
    pub rules: Vec<Rule<N, T>>,
    nullables: HashSet<N>,
    by_product: HashMap<N, Vec<u32>>,
}

impl<N, T> Grammar<N, T> {
    pub fn rule(&self, id: u32) -> &Rule<N, T> {
        &self.rules[id as usize]
    }
}

impl<N, T> Grammar<N, T>
where
    N: Clone + Eq + Hash,
{
    pub fn new(start: N, mut rules: Vec<Rule<N, T>>) -> Result<Self, GrammarError<N>> {
        for (idx, rule) in rules.iter_mut().enumerate() {
            rule.id = idx as u32;
        }
        let mut by_product: HashMap<N, Vec<u32>> = HashMap::new();
        for rule in &rules {
            by_product.entry(rule.product.clone()).or_default().push(rule.id);
        }
        let nullables = nullable_set(&rules);
        let grammar = Grammar {
            start,
            rules,
            nullables,
            by_product,
        };
        grammar.check_nullable_cycles()?;
        Ok(grammar)
    }

    /// Ids of the rules producing `product`, in declaration order.
    pub fn rules_for(&self, product: &N) -> &[u32] {
        self.by_product.get(product).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_nullable(&self, nt: &N) -> bool {
        self.nullables.contains(nt)
    }

    // every RHS symbol derives epsilon (trivially true for empty rules)
    fn rule_nullable(&self, rule: &Rule<N, T>) -> bool {
        rule.symbols.iter().all(|symbol| match symbol {
            Symbol::NonTerm(nt) => self.nullables.contains(nt),
            Symbol::Terminal(_) => false,
        })
    }

    fn check_nullable_cycles(&self) -> Result<(), GrammarError<N>> {
        let mut path = Vec::new();
        for nt in &self.nullables {
            path.clear();
            path.push(nt.clone());
            self.walk_nullable(&mut path)?;
        }
        Ok(())
    }

    // Depth-first through the nullable rules producing the non-terminal at
    // the tip of `path`; a repeat on the path is a nullability cycle.
    fn walk_nullable(&self, path: &mut Vec<N>) -> Result<(), GrammarError<N>> {
        let nt = path.last().expect("BUG: empty nullable path").clone();
        for rule in &self.rules {
            if rule.product != nt || !self.rule_nullable(rule) {
                continue;
            }
            for symbol in &rule.symbols {
                // nullable rules hold non-terminals only
                let Symbol::NonTerm(next) = symbol else { continue };
                if path.contains(next) {
                    return Err(GrammarError::RecursiveNullable(next.clone()));
                }
                path.push(next.clone());
                self.walk_nullable(path)?;
                path.pop();
            }
        }
        Ok(())
    }
}

impl<N: fmt::Debug, T: fmt::Debug> fmt::Debug for Grammar<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Start: {:?}", self.start)?;
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

// Least fixed point by worklist: seed with products of empty rules, then
// mark products whose rules became all-nullable until nothing changes.
fn nullable_set<N, T>(rules: &[Rule<N, T>]) -> HashSet<N>
where
    N: Clone + Eq + Hash,
{
    let mut nullables = HashSet::new();
    let mut work = Vec::new();
    for rule in rules {
        if rule.is_empty() && nullables.insert(rule.product.clone()) {
            work.push(rule.product.clone());
        }
    }

    let mut rhs_to_rules: HashMap<&N, Vec<&Rule<N, T>>> = HashMap::new();
    for rule in rules {
        for symbol in &rule.symbols {
            if let Symbol::NonTerm(nt) = symbol {
                rhs_to_rules.entry(nt).or_default().push(rule);
            }
        }
    }

    while let Some(symbol) = work.pop() {
        for rule in rhs_to_rules.get(&symbol).into_iter().flatten() {
            if nullables.contains(&rule.product) {
                continue;
            }
            let all_null = rule.symbols.iter().all(|symbol| match symbol {
                Symbol::NonTerm(nt) => nullables.contains(nt),
                Symbol::Terminal(_) => false,
            });
            if all_null {
                nullables.insert(rule.product.clone());
                work.push(rule.product.clone());
            }
        }
    }
    nullables
}

///////////////////////////////////////////////////////////////////////////////
