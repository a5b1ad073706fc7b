//! Running a transducer against a single string, in either direction.
//!
//! These mirror the `apply up` / `apply down` commands of xfst and foma:
//!
//! - [`apply_down`]: underlying string in, every surface string out
//! - [`apply_up`]: surface string in, every underlying string out
//!
//! Both return a deduplicated set of at most [`DEFAULT_PATH_LIMIT`] strings
//! (or the limit passed to the `_with_limit` variants). Context-dependent
//! rules make ambiguity common, so the bound keeps an ambiguous query from
//! enumerating an unbounded number of readings.

use std::collections::BTreeSet;

use crate::automaton::{Automaton, Tape};

/// Maximum number of distinct strings collected by a single application.
pub const DEFAULT_PATH_LIMIT: usize = 100;

/// Every input-side string that `transducer` maps to `text`.
///
/// # Example
///
/// ```rust
/// use strata::automaton::{Automaton, Fst};
/// use strata::apply::apply_up;
///
/// let roots = apply_up(&Fst::cross("Foo", "Bar"), "Bar");
/// assert_eq!(roots.into_iter().collect::<Vec<_>>(), vec!["Foo"]);
/// ```
pub fn apply_up<A: Automaton>(transducer: &A, text: &str) -> BTreeSet<String> {
    apply_up_with_limit(transducer, text, DEFAULT_PATH_LIMIT)
}

/// Every output-side string that `transducer` maps `text` to.
///
/// # Example
///
/// ```rust
/// use strata::automaton::{Automaton, Fst};
/// use strata::apply::apply_down;
///
/// let surface = apply_down(&Fst::cross("Foo", "Bar"), "Foo");
/// assert_eq!(surface.into_iter().collect::<Vec<_>>(), vec!["Bar"]);
/// ```
pub fn apply_down<A: Automaton>(transducer: &A, text: &str) -> BTreeSet<String> {
    apply_down_with_limit(transducer, text, DEFAULT_PATH_LIMIT)
}

/// [`apply_up`] collecting at most `limit` strings.
pub fn apply_up_with_limit<A: Automaton>(
    transducer: &A,
    text: &str,
    limit: usize,
) -> BTreeSet<String> {
    let found = transducer
        .compose(&A::literal(text))
        .project(Tape::Input)
        .paths(limit);
    tracing::trace!(text, readings = found.len(), "apply up");
    found
}

/// [`apply_down`] collecting at most `limit` strings.
pub fn apply_down_with_limit<A: Automaton>(
    transducer: &A,
    text: &str,
    limit: usize,
) -> BTreeSet<String> {
    let found = A::literal(text)
        .compose(transducer)
        .project(Tape::Output)
        .paths(limit);
    tracing::trace!(text, renderings = found.len(), "apply down");
    found
}
