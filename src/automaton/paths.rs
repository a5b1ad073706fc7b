//! Lazy enumeration of the strings accepted by an [`Fst`].

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use super::fst::{Fst, StateId};

/// Lazy breadth-first iterator over the distinct strings an [`Fst`]
/// accepts on its input tape.
///
/// Strings are produced in order of length, so bounding the iterator keeps
/// the shortest strings. Transitions that read nothing cost nothing: they
/// are explored before any longer prefix (a 0-1 breadth-first search).
/// Each string is yielded once, however many paths accept it.
///
/// The automaton should be trimmed (see [`Fst::connect`]) so that every
/// explored prefix can still be completed; [`Fst::iter_paths`] does this.
/// On a trimmed automaton the iterator terminates for finite languages and
/// is unbounded for infinite ones.
pub struct PathIterator {
    fst: Fst,
    pending: VecDeque<(StateId, String)>,
    visited: FxHashSet<(StateId, String)>,
    emitted: FxHashSet<String>,
}

impl PathIterator {
    /// Create an iterator starting from the start state of `fst`.
    pub fn new(fst: Fst) -> Self {
        let mut pending = VecDeque::new();
        let mut visited = FxHashSet::default();
        if fst.is_final(0) || !fst.transitions(0).is_empty() {
            pending.push_back((0, String::new()));
            visited.insert((0, String::new()));
        }
        Self {
            fst,
            pending,
            visited,
            emitted: FxHashSet::default(),
        }
    }

    /// Queue every unexplored successor of `(state, prefix)`: epsilon
    /// successors at the front, longer prefixes at the back.
    fn queue_successors(&mut self, state: StateId, prefix: &str) {
        for t in self.fst.transitions(state) {
            match t.input {
                None => {
                    if self.visited.insert((t.target, prefix.to_string())) {
                        self.pending.push_front((t.target, prefix.to_string()));
                    }
                }
                Some(symbol) => {
                    let mut next = prefix.to_string();
                    next.push(symbol);
                    if self.visited.insert((t.target, next.clone())) {
                        self.pending.push_back((t.target, next));
                    }
                }
            }
        }
    }
}

impl Iterator for PathIterator {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((state, prefix)) = self.pending.pop_front() {
            self.queue_successors(state, &prefix);
            if self.fst.is_final(state) && self.emitted.insert(prefix.clone()) {
                return Some(prefix);
            }
        }
        None
    }
}
