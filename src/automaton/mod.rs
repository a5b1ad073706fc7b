//! Finite-state automaton capability used to link levels of representation.
//!
//! Levels and forms never manipulate automata directly; they go through the
//! [`Automaton`] trait, so the backend can be swapped without touching the
//! converter-graph or rendering logic. The crate ships one backend,
//! [`Fst`], an unweighted character-labelled transducer.
//!
//! # Value Semantics
//!
//! Every operation takes `&self` and returns a new automaton. No operation
//! can mutate its arguments, so a converter shared between two levels can
//! never be changed behind either level's back.
//!
//! # Example
//!
//! ```rust
//! use strata::automaton::{Automaton, Fst, Tape};
//!
//! let lexicon = Fst::words(["foo", "bar"]);
//! let capitalise = Fst::pairs([("foo", "Foo"), ("bar", "Bar")]);
//!
//! let surface = lexicon.compose(&capitalise).project(Tape::Output);
//! let forms: Vec<String> = surface.paths(10).into_iter().collect();
//! assert_eq!(forms, vec!["Bar".to_string(), "Foo".to_string()]);
//! ```

mod compose;
pub mod fst;
mod paths;

pub use fst::{Fst, Label, StateId, Transition};
pub use paths::PathIterator;

use std::collections::BTreeSet;
use std::fmt;

/// One side of a transducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tape {
    /// The upper (underlying) side, read by apply-down.
    Input,
    /// The lower (surface) side, produced by apply-down.
    Output,
}

/// Operations a finite-state backend must provide.
///
/// All operations are pure. Acceptors are transducers whose input and
/// output tapes carry the same labels.
pub trait Automaton: Clone + fmt::Debug {
    /// Automaton accepting no strings at all.
    fn empty() -> Self;

    /// Acceptor for exactly `text`.
    fn literal(text: &str) -> Self;

    /// Transducer mapping exactly `input` to exactly `output`.
    fn cross(input: &str, output: &str) -> Self;

    /// Transducer composition: `self` then `other`.
    fn compose(&self, other: &Self) -> Self;

    /// Swap the input and output tapes.
    fn invert(&self) -> Self;

    /// Keep one tape, turning the transducer into an acceptor.
    fn project(&self, tape: Tape) -> Self;

    /// Relation union.
    fn union(&self, other: &Self) -> Self;

    /// Relation concatenation.
    fn concat(&self, other: &Self) -> Self;

    /// Kleene closure (zero or more repetitions).
    fn closure(&self) -> Self;

    /// Up to `limit` distinct strings accepted on the input tape. When the
    /// limit cuts the set, the shortest strings are kept.
    ///
    /// Must be deterministic for a given automaton and limit.
    fn paths(&self, limit: usize) -> BTreeSet<String>;

    /// Every symbol appearing on either tape.
    fn symbols(&self) -> BTreeSet<char>;

    /// Union of every automaton in `items`; [`Automaton::empty`] if there are none.
    fn union_all<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut iter = items.into_iter();
        match iter.next() {
            Some(first) => iter.fold(first, |acc, next| acc.union(&next)),
            None => Self::empty(),
        }
    }

    /// Acceptor for a finite word list.
    fn words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::union_all(words.into_iter().map(|w| Self::literal(w.as_ref())))
    }

    /// Transducer for a finite list of `(input, output)` string pairs.
    fn pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self::union_all(
            pairs
                .into_iter()
                .map(|(i, o)| Self::cross(i.as_ref(), o.as_ref())),
        )
    }

    /// Zero or one occurrence of `self`.
    fn optional(&self) -> Self {
        self.union(&Self::literal(""))
    }
}
