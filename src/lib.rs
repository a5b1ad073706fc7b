//! # strata
//!
//! Multi-level linguistic representations linked by finite-state
//! transducers.
//!
//! A [`Language`](language::Language) is a tree of levels of
//! representation. The root level holds underlying forms, given by a
//! lexicon; every other level is derived from its parent by a transducer.
//! A string read at any level yields a [`Form`](form::Form): the set of
//! root values consistent with it. Forms can be intersected across levels
//! and rendered at any level, with ambiguity reported as a warning.
//!
//! ## Example
//!
//! ```rust
//! use strata::prelude::*;
//!
//! let mut language: Language = Language::new(Fst::words(["foo", "bar", "baz"]));
//! let caps = language
//!     .add_child(
//!         LevelId::ROOT,
//!         Fst::pairs([("foo", "Foo"), ("bar", "Bar"), ("baz", "Baz")]),
//!     )
//!     .unwrap();
//! let hidden = language
//!     .add_child(
//!         LevelId::ROOT,
//!         Fst::pairs([("foo", "xxx"), ("bar", "xxx"), ("baz", "zzz")]),
//!     )
//!     .unwrap();
//!
//! let caps = language.level(caps).unwrap();
//! let hidden = language.level(hidden).unwrap();
//!
//! let xxx = hidden.form("xxx").unwrap();
//! assert!(xxx.is_ambiguous());
//!
//! // combine evidence from two levels
//! let bar = &xxx & &caps.form("Bar").unwrap();
//! assert_eq!(bar.convert_to(language.root()).to_string(), "bar");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod apply;
pub mod automaton;
pub mod error;
pub mod form;
pub mod language;
pub mod level;
pub mod rewrite;

/// Common imports for convenient usage
pub mod prelude {
    pub use crate::apply::{apply_down, apply_up, DEFAULT_PATH_LIMIT};
    pub use crate::automaton::{Automaton, Fst, Tape};
    pub use crate::error::{AmbiguityWarning, BuilderError, Error, Result};
    pub use crate::form::{Form, RenderedTuple, Rendering};
    pub use crate::language::{Language, LanguageBuilder, LanguageConfig};
    pub use crate::level::{Level, LevelId};
    pub use crate::rewrite::{Alphabet, RewriteMode, RewriteRule};
}
