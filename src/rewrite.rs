//! Rewrite rules compiled into transducers over a language's alphabet.
//!
//! A derivation between two levels is often easiest to state as a rewrite
//! rule: "every `b` is pronounced `a`" or "an `o` may surface as `a`". This
//! module turns such rules into transducers over the closure of an
//! [`Alphabet`], ready to hand to
//! [`Language::add_child`](crate::language::Language::add_child).
//!
//! # Example
//!
//! ```rust
//! use strata::automaton::{Automaton, Fst};
//! use strata::apply::apply_up;
//! use strata::rewrite::{Alphabet, RewriteRule};
//!
//! let sigma = Alphabet::new("abc".chars());
//! let rule: Fst = RewriteRule::optional("b", "a").compile(&sigma).unwrap();
//!
//! // each surface `a` may or may not have been a `b`
//! assert_eq!(apply_up(&rule, "aa").len(), 4);
//! ```

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::automaton::Automaton;

/// Errors raised while compiling a [`RewriteRule`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RewriteError {
    /// The rule would rewrite the empty string.
    #[error("rewrite pattern is empty")]
    EmptyPattern,

    /// Obligatory rules rewrite a single symbol.
    #[error("obligatory rewrite pattern {0:?} must be a single symbol")]
    ObligatoryPattern(String),

    /// The pattern uses symbols outside the alphabet.
    #[error("rewrite pattern {pattern:?} uses {symbol:?}, which is not in the alphabet")]
    SymbolNotInAlphabet {
        /// The offending pattern
        pattern: String,
        /// First symbol not in the alphabet
        symbol: char,
    },
}

/// The set of symbols a level's strings are drawn from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Alphabet {
    symbols: BTreeSet<char>,
}

impl Alphabet {
    /// Create an alphabet from any collection of symbols.
    pub fn new<I: IntoIterator<Item = char>>(symbols: I) -> Self {
        Self {
            symbols: symbols.into_iter().collect(),
        }
    }

    /// Every symbol used by `automaton`.
    pub fn of<A: Automaton>(automaton: &A) -> Self {
        Self {
            symbols: automaton.symbols(),
        }
    }

    /// True if `symbol` belongs to the alphabet.
    pub fn contains(&self, symbol: char) -> bool {
        self.symbols.contains(&symbol)
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True if there are no symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().copied()
    }

    /// Acceptor for any single symbol of the alphabet.
    pub fn sigma<A: Automaton>(&self) -> A {
        self.sigma_except(None)
    }

    /// Acceptor for any string over the alphabet, including the empty one.
    pub fn sigma_star<A: Automaton>(&self) -> A {
        self.sigma::<A>().closure()
    }

    fn sigma_except<A: Automaton>(&self, excluded: Option<char>) -> A {
        A::union_all(
            self.symbols
                .iter()
                .filter(|&&c| Some(c) != excluded)
                .map(|c| A::literal(c.encode_utf8(&mut [0; 4]))),
        )
    }
}

impl FromIterator<char> for Alphabet {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, c) in self.symbols.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, "}}")
    }
}

/// Whether a rule must apply wherever it can.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewriteMode {
    /// Each occurrence of the pattern may or may not be rewritten.
    Optional,
    /// Every occurrence of the pattern is rewritten.
    Obligatory,
}

/// A context-free rewrite rule `pattern -> replacement`.
///
/// # Fields
///
/// - `pattern` - string to rewrite; must be non-empty
/// - `replacement` - string written in its place; may be empty (deletion)
/// - `mode` - optional or obligatory application
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RewriteRule {
    /// String to rewrite
    pub pattern: String,
    /// String written in its place
    pub replacement: String,
    /// Application mode
    pub mode: RewriteMode,
}

impl RewriteRule {
    /// A rule that may rewrite any occurrence of `pattern`.
    pub fn optional(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            mode: RewriteMode::Optional,
        }
    }

    /// A rule that rewrites every occurrence of the single symbol `pattern`.
    pub fn obligatory(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            mode: RewriteMode::Obligatory,
        }
    }

    /// Compile the rule into a transducer over strings of `alphabet`.
    ///
    /// - Optional: `(Σ ∪ pattern:replacement)*`
    /// - Obligatory: `((Σ − {pattern}) ∪ pattern:replacement)*`
    ///
    /// # Errors
    ///
    /// - [`RewriteError::EmptyPattern`] if the pattern is empty
    /// - [`RewriteError::SymbolNotInAlphabet`] if the pattern uses a symbol
    ///   outside `alphabet`
    /// - [`RewriteError::ObligatoryPattern`] for an obligatory rule whose
    ///   pattern is longer than one symbol
    pub fn compile<A: Automaton>(&self, alphabet: &Alphabet) -> Result<A, RewriteError> {
        let mut symbols = self.pattern.chars();
        let first = symbols.next().ok_or(RewriteError::EmptyPattern)?;

        if let Some(symbol) = self.pattern.chars().find(|&c| !alphabet.contains(c)) {
            return Err(RewriteError::SymbolNotInAlphabet {
                pattern: self.pattern.clone(),
                symbol,
            });
        }

        let rewrite = A::cross(&self.pattern, &self.replacement);
        let keep: A = match self.mode {
            RewriteMode::Optional => alphabet.sigma(),
            RewriteMode::Obligatory => {
                if symbols.next().is_some() {
                    return Err(RewriteError::ObligatoryPattern(self.pattern.clone()));
                }
                alphabet.sigma_except(Some(first))
            }
        };

        Ok(keep.union(&rewrite).closure())
    }
}

impl fmt::Display for RewriteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = match self.mode {
            RewriteMode::Optional => "(->)",
            RewriteMode::Obligatory => "->",
        };
        write!(f, "{} {} {}", self.pattern, arrow, self.replacement)
    }
}
