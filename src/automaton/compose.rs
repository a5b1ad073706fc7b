//! Transducer composition.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::fst::{Fst, FstBuilder, Label, StateId};

/// Which one-sided epsilon moves a composed state may still take.
///
/// Between two matched moves, every left-only move must come before every
/// right-only move. Each relation path then has exactly one interleaving
/// in the result, instead of one per ordering of the epsilon moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Filter {
    /// No right-only move taken since the last match.
    Any,
    /// A right-only move was taken; left-only moves are blocked.
    RightOnly,
}

/// Compose `left` with `right`: the result maps `x` to `z` whenever `left`
/// maps `x` to some `y` and `right` maps `y` to `z`.
///
/// States of the result are operand state pairs plus an epsilon filter,
/// built on demand from the pair of start states. An epsilon on `left`'s
/// output tape advances `left` alone; an epsilon on `right`'s input tape
/// advances `right` alone. The result is not trimmed.
pub(crate) fn compose(left: &Fst, right: &Fst) -> Fst {
    let mut builder = FstBuilder::new();
    let mut index: FxHashMap<(StateId, StateId, Filter), StateId> = FxHashMap::default();
    let mut pending = VecDeque::new();

    let start = builder.add_state(left.is_final(0) && right.is_final(0));
    index.insert((0, 0, Filter::Any), start);
    pending.push_back((0, 0, Filter::Any, start));

    while let Some((l, r, filter, source)) = pending.pop_front() {
        let mut moves: SmallVec<[(Label, Label, StateId, StateId, Filter); 8]> = SmallVec::new();

        for lt in left.transitions(l) {
            match lt.output {
                None => {
                    if filter == Filter::Any {
                        moves.push((lt.input, None, lt.target, r, Filter::Any));
                    }
                }
                Some(symbol) => {
                    for rt in right.transitions(r) {
                        if rt.input == Some(symbol) {
                            moves.push((lt.input, rt.output, lt.target, rt.target, Filter::Any));
                        }
                    }
                }
            }
        }
        for rt in right.transitions(r) {
            if rt.input.is_none() {
                moves.push((None, rt.output, l, rt.target, Filter::RightOnly));
            }
        }

        for (input, output, next_l, next_r, next_filter) in moves {
            let key = (next_l, next_r, next_filter);
            let target = match index.get(&key) {
                Some(&existing) => existing,
                None => {
                    let created =
                        builder.add_state(left.is_final(next_l) && right.is_final(next_r));
                    index.insert(key, created);
                    pending.push_back((next_l, next_r, next_filter, created));
                    created
                }
            };
            builder.add_transition(source, input, output, target);
        }
    }

    builder.build()
}
