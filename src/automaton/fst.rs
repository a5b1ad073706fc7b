//! Unweighted, epsilon-aware finite-state transducer.
//!
//! States are stored in a flat array; state `0` is always the start state.
//! The array sits behind an `Arc` and is never modified after construction,
//! so cloning an [`Fst`] is cheap and every operation builds a fresh one.
//!
//! Union, concatenation, closure, projection and composition return
//! normalized transducers: no `ε:ε` transitions, no useless states, and
//! bisimilar states merged. Without this, repeated composition grows state
//! counts geometrically with the depth of a level tree.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::compose::compose;
use super::paths::PathIterator;
use super::{Automaton, Tape};

/// A transition label; `None` is epsilon (consumes or emits nothing).
pub type Label = Option<char>;

/// Index of a state within an [`Fst`].
pub type StateId = usize;

/// A labelled transition to another state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Transition {
    /// Symbol read on the input tape
    pub input: Label,
    /// Symbol written on the output tape
    pub output: Label,
    /// Destination state
    pub target: StateId,
}

impl Transition {
    /// True if the transition neither reads nor writes a symbol.
    pub fn is_epsilon(&self) -> bool {
        self.input.is_none() && self.output.is_none()
    }
}

/// A state: its outgoing transitions and whether it accepts.
///
/// Most states in lexicons and rewrite rules have a handful of
/// transitions, which fit inline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FstState {
    pub(crate) transitions: SmallVec<[Transition; 4]>,
    pub(crate) is_final: bool,
}

/// A finite-state transducer over `char` labels.
///
/// # Performance
///
/// - **Clone**: O(1), states are shared
/// - **Union/concat/closure**: O(n) copies of the operands, then normalization
/// - **Compose**: O(product of reachable state pairs), then normalization
/// - **Normalization**: epsilon removal is O(n * closure size); state
///   merging repeats an O(transitions) refinement pass until no class splits
#[derive(Clone)]
pub struct Fst {
    states: Arc<Vec<FstState>>,
}

impl Fst {
    /// Number of states.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Total number of transitions.
    pub fn num_transitions(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    /// The start state (always `0`).
    pub fn start(&self) -> StateId {
        0
    }

    /// True if `state` accepts. Out-of-range states are not final.
    pub fn is_final(&self, state: StateId) -> bool {
        self.states.get(state).map_or(false, |s| s.is_final)
    }

    /// Outgoing transitions of `state`. Out-of-range states have none.
    pub fn transitions(&self, state: StateId) -> &[Transition] {
        match self.states.get(state) {
            Some(s) => s.transitions.as_slice(),
            None => &[],
        }
    }

    /// True if the transducer accepts no string pair at all.
    pub fn is_empty(&self) -> bool {
        let trimmed = self.connect();
        !trimmed.is_final(0) && trimmed.transitions(0).is_empty()
    }

    /// True if `text` is accepted on the input tape.
    pub fn accepts(&self, text: &str) -> bool {
        !Fst::literal(text).compose(self).is_empty()
    }

    /// Remove states that are unreachable from the start state or cannot
    /// reach a final state.
    ///
    /// State numbering is preserved in relative order, so the start state
    /// stays `0`. If the start state itself is useless the result is
    /// [`Fst::empty`].
    pub fn connect(&self) -> Fst {
        let n = self.states.len();

        let mut accessible = vec![false; n];
        let mut queue = VecDeque::new();
        if n > 0 {
            accessible[0] = true;
            queue.push_back(0);
        }
        while let Some(state) = queue.pop_front() {
            for t in self.transitions(state) {
                if !accessible[t.target] {
                    accessible[t.target] = true;
                    queue.push_back(t.target);
                }
            }
        }

        let mut incoming: Vec<Vec<StateId>> = vec![Vec::new(); n];
        for (source, state) in self.states.iter().enumerate() {
            for t in &state.transitions {
                incoming[t.target].push(source);
            }
        }
        let mut coaccessible = vec![false; n];
        for (state, s) in self.states.iter().enumerate() {
            if s.is_final {
                coaccessible[state] = true;
                queue.push_back(state);
            }
        }
        while let Some(state) = queue.pop_front() {
            for &source in &incoming[state] {
                if !coaccessible[source] {
                    coaccessible[source] = true;
                    queue.push_back(source);
                }
            }
        }

        if n == 0 || !(accessible[0] && coaccessible[0]) {
            return Fst::empty();
        }

        let mut renumber = vec![None; n];
        let mut next = 0;
        for state in 0..n {
            if accessible[state] && coaccessible[state] {
                renumber[state] = Some(next);
                next += 1;
            }
        }

        let states = self
            .states
            .iter()
            .enumerate()
            .filter(|(state, _)| renumber[*state].is_some())
            .map(|(_, s)| FstState {
                transitions: s
                    .transitions
                    .iter()
                    .filter_map(|t| {
                        renumber[t.target].map(|target| Transition { target, ..*t })
                    })
                    .collect(),
                is_final: s.is_final,
            })
            .collect();

        Fst {
            states: Arc::new(states),
        }
    }

    /// Remove every `ε:ε` transition, then trim.
    ///
    /// Each state takes over the non-epsilon transitions and the finality of
    /// every state in its epsilon closure. Transitions that read or write a
    /// symbol on one tape only are kept.
    pub fn rm_epsilon(&self) -> Fst {
        let n = self.states.len();
        let mut builder = FstBuilder::new();
        for _ in 0..n {
            builder.add_state(false);
        }

        // mark[q] == state means q is already in the closure of `state`
        let mut mark = vec![usize::MAX; n];
        let mut closure = Vec::new();
        for state in 0..n {
            closure.clear();
            closure.push(state);
            mark[state] = state;
            let mut next = 0;
            while next < closure.len() {
                let q = closure[next];
                next += 1;
                for t in self.transitions(q) {
                    if t.is_epsilon() && mark[t.target] != state {
                        mark[t.target] = state;
                        closure.push(t.target);
                    }
                }
            }

            let mut arcs: Vec<Transition> = closure
                .iter()
                .flat_map(|&q| self.transitions(q))
                .filter(|t| !t.is_epsilon())
                .copied()
                .collect();
            arcs.sort_unstable();
            arcs.dedup();

            builder.set_final(state, closure.iter().any(|&q| self.is_final(q)));
            for t in arcs {
                builder.add_transition(state, t.input, t.output, t.target);
            }
        }

        builder.build().connect()
    }

    /// Merge bisimilar states: states with the same finality whose
    /// transitions carry the same labels into merged states.
    ///
    /// The result accepts the same relation. For acceptors built from word
    /// lists this shares common suffixes; rewrite rules over an alphabet
    /// typically collapse to a single looping state.
    pub fn reduce(&self) -> Fst {
        let n = self.states.len();
        if n == 0 {
            return self.clone();
        }

        let mut class: Vec<usize> = self.states.iter().map(|s| usize::from(s.is_final)).collect();
        let mut count = usize::from(class.contains(&0)) + usize::from(class.contains(&1));
        loop {
            let mut ids: FxHashMap<(usize, Vec<(Label, Label, usize)>), usize> =
                FxHashMap::default();
            let refined: Vec<usize> = (0..n)
                .map(|q| {
                    let mut signature: Vec<(Label, Label, usize)> = self
                        .transitions(q)
                        .iter()
                        .map(|t| (t.input, t.output, class[t.target]))
                        .collect();
                    signature.sort_unstable();
                    signature.dedup();
                    let fresh = ids.len();
                    *ids.entry((class[q], signature)).or_insert(fresh)
                })
                .collect();
            class = refined;
            if ids.len() == count {
                break;
            }
            count = ids.len();
        }

        // number classes in order of first appearance so the start stays 0
        let mut renumber = vec![None; count];
        let mut builder = FstBuilder::new();
        for q in 0..n {
            if renumber[class[q]].is_none() {
                renumber[class[q]] = Some(builder.add_state(self.is_final(q)));
            }
        }
        let mut done = vec![false; count];
        for q in 0..n {
            if std::mem::replace(&mut done[class[q]], true) {
                continue;
            }
            let source = renumber[class[q]].unwrap_or_default();
            let mut arcs: Vec<Transition> = self
                .transitions(q)
                .iter()
                .map(|t| Transition {
                    target: renumber[class[t.target]].unwrap_or_default(),
                    ..*t
                })
                .collect();
            arcs.sort_unstable();
            arcs.dedup();
            for t in arcs {
                builder.add_transition(source, t.input, t.output, t.target);
            }
        }
        builder.build()
    }

    /// Epsilon removal, trimming and state merging.
    fn normalize(&self) -> Fst {
        self.rm_epsilon().reduce()
    }

    /// Lazy iterator over the distinct strings accepted on the input tape,
    /// shortest first.
    ///
    /// The iterator never ends for an infinite language; bound it with
    /// [`Iterator::take`] or use [`Automaton::paths`].
    pub fn iter_paths(&self) -> PathIterator {
        PathIterator::new(self.connect())
    }

    fn map_labels(&self, f: impl Fn(&Transition) -> (Label, Label)) -> Fst {
        let states = self
            .states
            .iter()
            .map(|s| FstState {
                transitions: s
                    .transitions
                    .iter()
                    .map(|t| {
                        let (input, output) = f(t);
                        Transition {
                            input,
                            output,
                            target: t.target,
                        }
                    })
                    .collect(),
                is_final: s.is_final,
            })
            .collect();
        Fst {
            states: Arc::new(states),
        }
    }
}

impl Automaton for Fst {
    fn empty() -> Self {
        let mut builder = FstBuilder::new();
        builder.add_state(false);
        builder.build()
    }

    fn literal(text: &str) -> Self {
        Fst::cross(text, text)
    }

    fn cross(input: &str, output: &str) -> Self {
        let input: Vec<char> = input.chars().collect();
        let output: Vec<char> = output.chars().collect();
        let len = input.len().max(output.len());

        let mut builder = FstBuilder::new();
        let mut current = builder.add_state(len == 0);
        for i in 0..len {
            let next = builder.add_state(i + 1 == len);
            builder.add_transition(current, input.get(i).copied(), output.get(i).copied(), next);
            current = next;
        }
        builder.build()
    }

    fn compose(&self, other: &Self) -> Self {
        compose(self, other).normalize()
    }

    fn invert(&self) -> Self {
        self.map_labels(|t| (t.output, t.input))
    }

    fn project(&self, tape: Tape) -> Self {
        let projected = match tape {
            Tape::Input => self.map_labels(|t| (t.input, t.input)),
            Tape::Output => self.map_labels(|t| (t.output, t.output)),
        };
        projected.normalize()
    }

    fn union(&self, other: &Self) -> Self {
        let mut builder = FstBuilder::new();
        let start = builder.add_state(false);
        let left = builder.append(self);
        let right = builder.append(other);
        builder.add_transition(start, None, None, left);
        builder.add_transition(start, None, None, right);
        builder.build().normalize()
    }

    fn concat(&self, other: &Self) -> Self {
        let mut builder = FstBuilder::new();
        let left = builder.append(self);
        let right = builder.append(other);
        for state in 0..self.num_states() {
            if self.is_final(state) {
                builder.set_final(left + state, false);
                builder.add_transition(left + state, None, None, right);
            }
        }
        builder.build().normalize()
    }

    fn closure(&self) -> Self {
        let mut builder = FstBuilder::new();
        let start = builder.add_state(true);
        let inner = builder.append(self);
        builder.add_transition(start, None, None, inner);
        for state in 0..self.num_states() {
            if self.is_final(state) {
                builder.add_transition(inner + state, None, None, start);
            }
        }
        builder.build().normalize()
    }

    fn paths(&self, limit: usize) -> BTreeSet<String> {
        self.iter_paths().take(limit).collect()
    }

    fn symbols(&self) -> BTreeSet<char> {
        self.states
            .iter()
            .flat_map(|s| s.transitions.iter())
            .flat_map(|t| [t.input, t.output])
            .flatten()
            .collect()
    }
}

impl fmt::Debug for Fst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fst")
            .field("states", &self.num_states())
            .field("transitions", &self.num_transitions())
            .finish()
    }
}

/// Incremental construction of an [`Fst`].
///
/// The first state added is the start state.
pub(crate) struct FstBuilder {
    states: Vec<FstState>,
}

impl FstBuilder {
    pub(crate) fn new() -> Self {
        FstBuilder { states: Vec::new() }
    }

    pub(crate) fn add_state(&mut self, is_final: bool) -> StateId {
        self.states.push(FstState {
            transitions: SmallVec::new(),
            is_final,
        });
        self.states.len() - 1
    }

    pub(crate) fn add_transition(
        &mut self,
        source: StateId,
        input: Label,
        output: Label,
        target: StateId,
    ) {
        self.states[source].transitions.push(Transition {
            input,
            output,
            target,
        });
    }

    pub(crate) fn set_final(&mut self, state: StateId, is_final: bool) {
        self.states[state].is_final = is_final;
    }

    /// Copy every state of `fst` into this builder and return the offset of
    /// its start state.
    pub(crate) fn append(&mut self, fst: &Fst) -> StateId {
        let offset = self.states.len();
        self.states.extend(fst.states.iter().map(|s| FstState {
            transitions: s
                .transitions
                .iter()
                .map(|t| Transition {
                    target: t.target + offset,
                    ..*t
                })
                .collect(),
            is_final: s.is_final,
        }));
        offset
    }

    pub(crate) fn build(mut self) -> Fst {
        if self.states.is_empty() {
            self.add_state(false);
        }
        Fst {
            states: Arc::new(self.states),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(fst: &Fst) -> Vec<String> {
        fst.paths(100).into_iter().collect()
    }

    #[test]
    fn test_empty_accepts_nothing() {
        let fst = Fst::empty();
        assert!(fst.is_empty());
        assert!(strings(&fst).is_empty());
    }

    #[test]
    fn test_literal() {
        let fst = Fst::literal("foo");
        assert_eq!(fst.num_states(), 4);
        assert_eq!(strings(&fst), vec!["foo"]);
        assert!(fst.accepts("foo"));
        assert!(!fst.accepts("fo"));
    }

    #[test]
    fn test_empty_literal_accepts_empty_string() {
        let fst = Fst::literal("");
        assert!(!fst.is_empty());
        assert_eq!(strings(&fst), vec![""]);
    }

    #[test]
    fn test_cross_pads_with_epsilon() {
        let fst = Fst::cross("ab", "xyz");
        assert_eq!(fst.num_transitions(), 3);
        assert_eq!(fst.transitions(2)[0].input, None);
        assert_eq!(fst.transitions(2)[0].output, Some('z'));
        assert_eq!(strings(&fst.project(Tape::Output)), vec!["xyz"]);
        assert_eq!(strings(&fst), vec!["ab"]);
    }

    #[test]
    fn test_union() {
        let fst = Fst::literal("a").union(&Fst::literal("b"));
        assert_eq!(strings(&fst), vec!["a", "b"]);
    }

    #[test]
    fn test_concat() {
        let fst = Fst::words(["a", "b"]).concat(&Fst::literal("c"));
        assert_eq!(strings(&fst), vec!["ac", "bc"]);
    }

    #[test]
    fn test_closure_is_infinite_but_bounded() {
        let fst = Fst::literal("ab").closure();
        let found = fst.paths(4);
        assert_eq!(found.len(), 4);
        assert!(found.contains(""));
        assert!(found.contains("ab"));
        assert!(found.contains("abab"));
        assert!(found.contains("ababab"));
    }

    #[test]
    fn test_invert_swaps_tapes() {
        let fst = Fst::cross("Foo", "Bar").invert();
        assert_eq!(strings(&fst), vec!["Bar"]);
        assert_eq!(strings(&fst.project(Tape::Output)), vec!["Foo"]);
    }

    #[test]
    fn test_operations_leave_operands_untouched() {
        let base = Fst::literal("a");
        let states = base.num_states();
        let _ = base.closure();
        let _ = base.union(&base);
        let _ = base.concat(&base);
        let _ = base.compose(&base);
        assert_eq!(base.num_states(), states);
        assert_eq!(strings(&base), vec!["a"]);
    }

    #[test]
    fn test_connect_drops_dead_states() {
        let mut builder = FstBuilder::new();
        let start = builder.add_state(false);
        let live = builder.add_state(true);
        let dead = builder.add_state(false);
        builder.add_transition(start, Some('a'), Some('a'), live);
        builder.add_transition(start, Some('b'), Some('b'), dead);
        let fst = builder.build();

        let trimmed = fst.connect();
        assert_eq!(trimmed.num_states(), 2);
        assert_eq!(trimmed.num_transitions(), 1);
    }

    #[test]
    fn test_connect_useless_start_is_empty() {
        let mut builder = FstBuilder::new();
        let start = builder.add_state(false);
        let next = builder.add_state(false);
        builder.add_transition(start, Some('a'), Some('a'), next);
        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_symbols() {
        let fst = Fst::cross("ab", "c");
        let symbols: Vec<char> = fst.symbols().into_iter().collect();
        assert_eq!(symbols, vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_union_all_of_nothing_is_empty() {
        let fst = Fst::union_all(Vec::new());
        assert!(fst.is_empty());
    }

    #[test]
    fn test_rm_epsilon_keeps_one_sided_moves() {
        let mut builder = FstBuilder::new();
        let start = builder.add_state(false);
        let middle = builder.add_state(false);
        let end = builder.add_state(true);
        builder.add_transition(start, None, None, middle);
        builder.add_transition(middle, Some('a'), None, end);
        let fst = builder.build().rm_epsilon();

        assert_eq!(fst.num_states(), 2);
        assert_eq!(fst.num_transitions(), 1);
        assert_eq!(fst.transitions(0)[0].input, Some('a'));
        assert_eq!(fst.transitions(0)[0].output, None);
        assert_eq!(strings(&fst), vec!["a"]);
    }

    #[test]
    fn test_combinators_leave_no_epsilon_moves() {
        let fst = Fst::words(["ab", "c"]).closure().concat(&Fst::literal("d").optional());
        for state in 0..fst.num_states() {
            assert!(fst.transitions(state).iter().all(|t| !t.is_epsilon()));
        }
    }

    #[test]
    fn test_reduce_shares_suffixes() {
        let fst = Fst::words(["ab", "cb"]);
        assert_eq!(fst.num_states(), 3);
        assert_eq!(strings(&fst), vec!["ab", "cb"]);
    }

    #[test]
    fn test_sigma_star_is_one_state() {
        let sigma_star: Fst = crate::rewrite::Alphabet::new("abc".chars()).sigma_star();
        assert_eq!(sigma_star.num_states(), 1);
        assert_eq!(sigma_star.num_transitions(), 3);
    }

    #[test]
    fn test_limit_keeps_shortest_strings() {
        let mut padded = Fst::literal("");
        for _ in 0..10 {
            padded = padded.concat(&Fst::literal(""));
        }
        let fst = padded.concat(&Fst::literal("a")).union(&Fst::literal("bbb"));
        assert_eq!(fst.paths(1).into_iter().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(strings(&fst), vec!["a", "bbb"]);
    }

    #[test]
    fn test_optional() {
        let fst = Fst::literal("x").optional();
        assert_eq!(strings(&fst), vec!["", "x"]);
    }
}
