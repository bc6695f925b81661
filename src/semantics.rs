#![deny(warnings)]

use crate::grammar::Grammar;
use crate::source::Source;
use crate::trees::ParseTree;
use std::any::{type_name, Any};
use std::fmt;

/// Dynamically typed result of evaluating one tree edge. Carries the
/// source span `[start, end)` of the edge that produced it; the payload
/// is whatever the action returned, or nothing for defaults.
pub struct SemanticValue {
    payload: Option<Box<dyn Any>>,
    pub start: usize,
    pub end: usize,
}

impl SemanticValue {
    pub fn of<V: Any>(value: V) -> SemanticValue {
        SemanticValue {
            payload: Some(Box::new(value)),
            start: 0,
            end: 0,
        }
    }

    /// A value with no payload; `start`/`end` still get stamped by the
    /// evaluator.
    pub fn empty() -> SemanticValue {
        SemanticValue {
            payload: None,
            start: 0,
            end: 0,
        }
    }

    pub fn has_value(&self) -> bool {
        self.payload.is_some()
    }

    /// Move the payload out as a `V`. Panics on an empty value or a type
    /// mismatch; wrong downcasts are programming errors, not parse errors.
    pub fn take<V: Any>(self) -> V {
        match self.payload {
            None => panic!("taking {} from an empty semantic value", type_name::<V>()),
            Some(payload) => match payload.downcast::<V>() {
                Ok(value) => *value,
                Err(_) => panic!("semantic value does not hold a {}", type_name::<V>()),
            },
        }
    }

    /// Borrow the payload as a `V`. Panics like [`SemanticValue::take`].
    pub fn get<V: Any>(&self) -> &V {
        match &self.payload {
            None => panic!("reading {} from an empty semantic value", type_name::<V>()),
            Some(payload) => match payload.downcast_ref::<V>() {
                Some(value) => value,
                None => panic!("semantic value does not hold a {}", type_name::<V>()),
            },
        }
    }

    /// The slice of the input this value was produced from.
    pub fn slice_of<'s, S: Source + ?Sized>(&self, src: &'s S) -> &'s S {
        src.slice(self.start, self.end)
    }
}

impl fmt::Debug for SemanticValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.payload {
            Some(_) => write!(f, "SemanticValue({}..{})", self.start, self.end),
            None => write!(f, "SemanticValue({}..{}, empty)", self.start, self.end),
        }
    }
}

/// An action receives the source, the values of the rule's non-discarded
/// children in order, and the evaluation context; its return becomes the
/// edge's value. Values carry spans; `SemanticValue::slice_of` resolves
/// the matched text.
pub type SemanticAction<S, C> = Box<dyn Fn(&S, Vec<SemanticValue>, &mut C) -> SemanticValue>;

/// Per-rule semantic actions, indexed by rule id. Rules without an action
/// pass their first non-discarded child value through.
pub struct Semantics<S: ?Sized, C = ()> {
    actions: Vec<Option<SemanticAction<S, C>>>,
}

impl<S: ?Sized, C> Semantics<S, C> {
    pub fn new() -> Self {
        Semantics { actions: Vec::new() }
    }

    pub fn set_action(
        &mut self,
        id: u32,
        action: impl Fn(&S, Vec<SemanticValue>, &mut C) -> SemanticValue + 'static,
    ) {
        let id = id as usize;
        if self.actions.len() <= id {
            self.actions.resize_with(id + 1, || None);
        }
        self.actions[id] = Some(Box::new(action));
    }

    pub fn action(&self, id: u32) -> Option<&SemanticAction<S, C>> {
        self.actions.get(id as usize).and_then(Option::as_ref)
    }
}

impl<S: ?Sized, C> Default for Semantics<S, C> {
    fn default() -> Self {
        Semantics::new()
    }
}

// An internal edge whose children are still being collected.
struct Frame {
    rule: u32,
    start: usize,
    end: usize,
    values: Vec<SemanticValue>,
    next_child: usize,
}

/// Evaluate a parse tree bottom-up in the builder's pre-order: children
/// left to right, each rule's action firing once its children are done.
/// Discarded positions are evaluated (context side effects happen in
/// order) and then dropped. Runs on an explicit frame stack so derivation
/// depth does not consume call stack.
pub fn apply_semantics<N, T, S, C>(
    semantics: &Semantics<S, C>,
    grammar: &Grammar<N, T>,
    tree: &ParseTree,
    src: &S,
    ctx: &mut C,
) -> SemanticValue
where
    S: Source + ?Sized,
{
    if tree.is_empty() {
        return SemanticValue::empty();
    }

    let mut stack: Vec<Frame> = Vec::new();
    let mut edges = tree.iter();
    loop {
        let edge = *edges.next().expect("BUG: truncated parse tree");

        let mut value = match edge.rule {
            None => {
                let mut leaf = SemanticValue::empty();
                leaf.start = edge.start;
                leaf.end = edge.end;
                leaf
            }
            Some(rule) => {
                if !grammar.rule(rule).symbols.is_empty() {
                    stack.push(Frame {
                        rule,
                        start: edge.start,
                        end: edge.end,
                        values: Vec::new(),
                        next_child: 0,
                    });
                    continue;
                }
                // epsilon edge, no children to wait for
                finish(semantics, src, ctx, rule, edge.start, edge.end, Vec::new())
            }
        };

        // Bubble the finished value into enclosing frames
        loop {
            match stack.last_mut() {
                None => return value,
                Some(frame) => {
                    let rule = grammar.rule(frame.rule);
                    if !rule.is_discarded(frame.next_child) {
                        frame.values.push(value);
                    }
                    frame.next_child += 1;
                    if frame.next_child < rule.symbols.len() {
                        break; // the next edge in the stream is this frame's
                    }
                }
            }
            let frame = stack.pop().expect("BUG: frame vanished mid-bubble");
            value = finish(semantics, src, ctx, frame.rule, frame.start, frame.end, frame.values);
        }
    }
}

fn finish<S, C>(
    semantics: &Semantics<S, C>,
    src: &S,
    ctx: &mut C,
    rule: u32,
    start: usize,
    end: usize,
    values: Vec<SemanticValue>,
) -> SemanticValue
where
    S: ?Sized,
{
    if cfg!(feature = "debug") {
        eprintln!("Reduction: rule {} over {}..{}", rule, start, end);
    }
    let mut value = match semantics.action(rule) {
        Some(action) => action(src, values, ctx),
        None => {
            let mut values = values;
            if values.is_empty() {
                SemanticValue::empty()
            } else {
                values.swap_remove(0)
            }
        }
    };
    value.start = start;
    value.end = end;
    value
}

///////////////////////////////////////////////////////////////////////////////
