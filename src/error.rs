//! Error types for language construction, queries and rendering.

use thiserror::Error;

use crate::level::LevelId;
use crate::rewrite::RewriteError;

/// Errors that can occur while building a language or querying it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// No root-level value is consistent with the given text.
    ///
    /// Raised when a level is asked to read a string that none of the
    /// lexicon's entries can derive. This is fatal to the query that
    /// produced it.
    #[error("inconsistent form: {text:?} has no reading at level {level}")]
    InconsistentForm {
        /// Level the text was read at
        level: LevelId,
        /// The text that could not be read
        text: String,
    },

    /// The level does not belong to this language.
    #[error("level {0} does not exist in this language")]
    UnknownLevel(LevelId),

    /// A level with this name is already registered.
    #[error("level name {0:?} is already in use")]
    NameInUse(String),

    /// The name is reserved and cannot be given to a new level.
    #[error("level name {0:?} is reserved")]
    ReservedName(String),

    /// A level with this sigil is already registered.
    #[error("sigil {0:?} is already in use")]
    SigilInUse(String),

    /// Level names must be non-empty.
    #[error("level name is empty")]
    EmptyName,

    /// Sigils must be non-empty.
    #[error("sigil is empty")]
    EmptySigil,

    /// Two linked levels have no converter between them.
    ///
    /// Every pair of levels in one language is connected when the later of
    /// the two is added, so this indicates a broken converter graph.
    #[error("no converter from level {from} to level {to}")]
    MissingConverter {
        /// Source level
        from: LevelId,
        /// Target level
        to: LevelId,
    },

    /// A rewrite rule could not be compiled.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

/// Advisory conditions raised while rendering a [`Form`](crate::form::Form).
///
/// Rendering never fails because of these; they are reported alongside the
/// rendered result so the caller can decide whether to log, annotate or
/// reject the rendering.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum AmbiguityWarning {
    /// The form renders in more than one way at the requested levels.
    #[error("form is ambiguous at the requested levels")]
    Surface,

    /// Several root values render identically at the requested levels.
    #[error("form is ambiguous at the root level but not at the requested levels")]
    Underlying,
}

/// Error type for [`LanguageBuilder`](crate::language::LanguageBuilder) validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// No lexicon was provided
    #[error("Lexicon is required. Use .lexicon() to set it.")]
    MissingLexicon,
    /// The path limit must allow at least one result
    #[error("Path limit must be at least 1.")]
    ZeroPathLimit,
    /// The root level needs a name
    #[error("Root name must not be empty.")]
    EmptyRootName,
    /// The root level needs a sigil
    #[error("Root sigil must not be empty.")]
    EmptyRootSigil,
}

/// A specialized `Result` type for language operations.
pub type Result<T> = std::result::Result<T, Error>;
