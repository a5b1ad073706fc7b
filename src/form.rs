//! Forms: sets of root-level values and the levels to render them at.
//!
//! A [`Form`] records everything a query learned about an underlying
//! value: the set of root-level strings consistent with the evidence, and
//! the levels the caller wants it shown at. Forms are immutable; every
//! combinator returns a new one.
//!
//! # Ambiguity
//!
//! Rendering a form can go wrong in two recoverable ways, reported as
//! [`AmbiguityWarning`]s on the [`Rendering`] rather than as errors:
//!
//! - [`AmbiguityWarning::Surface`]: the form renders in more than one way at
//!   the requested levels
//! - [`AmbiguityWarning::Underlying`]: several root values collapse into a
//!   single rendering, so the rendering hides a real ambiguity
//!
//! # Example
//!
//! ```rust
//! use strata::prelude::*;
//!
//! let mut language: Language = Language::new(Fst::words(["A", "B"]));
//! let lower = language
//!     .add_child(LevelId::ROOT, Fst::pairs([("A", "a"), ("B", "b")]))
//!     .unwrap();
//! let merged = language
//!     .add_child(lower, Fst::pairs([("a", "a"), ("b", "a")]))
//!     .unwrap();
//!
//! let lower = language.level(lower).unwrap();
//! let form = language.level(merged).unwrap().form("a").unwrap();
//! assert!(form.is_ambiguous());
//!
//! let rendering = form.render().unwrap();
//! assert_eq!(rendering.warning(), Some(AmbiguityWarning::Underlying));
//!
//! let rendering = (!&form).extend_display(lower).render().unwrap();
//! assert_eq!(rendering.warning(), Some(AmbiguityWarning::Surface));
//! assert_eq!(rendering.to_string(), "a, b");
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::ops::{BitAnd, Not};

use crate::automaton::{Automaton, Fst};
use crate::error::{AmbiguityWarning, Result};
use crate::level::Level;

/// Renderings of one value at several levels, one string per level.
pub type RenderedTuple = Vec<String>;

/// A linguistic form.
///
/// Equality compares root values only: two forms read at different levels
/// are equal if they have the same set of possible root values.
pub struct Form<'a, A: Automaton = Fst> {
    values: BTreeSet<String>,
    levels_to_show: Vec<Level<'a, A>>,
}

impl<'a, A: Automaton> Form<'a, A> {
    /// Create a form from root values and the levels to display it at.
    pub fn new<I, S>(values: I, levels_to_show: Vec<Level<'a, A>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            levels_to_show,
        }
    }

    /// The root-level values consistent with this form.
    pub fn values(&self) -> &BTreeSet<String> {
        &self.values
    }

    /// Levels the form is displayed at, in order.
    pub fn levels_to_show(&self) -> &[Level<'a, A>] {
        &self.levels_to_show
    }

    /// True if more than one root value is consistent with this form.
    pub fn is_ambiguous(&self) -> bool {
        self.values.len() > 1
    }

    /// The same values, displayed at no level.
    pub fn invert(&self) -> Self {
        Self {
            values: self.values.clone(),
            levels_to_show: Vec::new(),
        }
    }

    /// Values consistent with both forms, displayed at the levels of both
    /// (this form's first).
    pub fn intersect(&self, other: &Self) -> Self {
        let mut levels_to_show = self.levels_to_show.clone();
        levels_to_show.extend_from_slice(&other.levels_to_show);
        Self {
            values: self.values.intersection(&other.values).cloned().collect(),
            levels_to_show,
        }
    }

    /// The same values, additionally displayed at `level`.
    pub fn extend_display(&self, level: Level<'a, A>) -> Self {
        let mut levels_to_show = self.levels_to_show.clone();
        levels_to_show.push(level);
        Self {
            values: self.values.clone(),
            levels_to_show,
        }
    }

    /// The same values, displayed only at `level`.
    pub fn convert_to(&self, level: Level<'a, A>) -> Self {
        Self {
            values: self.values.clone(),
            levels_to_show: vec![level],
        }
    }

    /// Every rendering of this form at `level`.
    pub fn at_level(&self, level: Level<'a, A>) -> Result<BTreeSet<RenderedTuple>> {
        self.at_levels(&[level])
    }

    /// Every rendering of this form at `levels`, one tuple entry per level.
    ///
    /// A value that renders in several ways at one level contributes one
    /// tuple per combination. A value with no rendering at some level
    /// contributes nothing.
    ///
    /// # Errors
    ///
    /// [`Error::MissingConverter`](crate::error::Error::MissingConverter) if
    /// a level's converter graph is broken.
    pub fn at_levels(&self, levels: &[Level<'a, A>]) -> Result<BTreeSet<RenderedTuple>> {
        let mut tuples = BTreeSet::new();
        for value in &self.values {
            let mut partial: Vec<RenderedTuple> = vec![Vec::new()];
            for level in levels {
                let renderings = level.render_value(value)?;
                if renderings.is_empty() {
                    tracing::warn!(value = %value, level = %level, "value has no rendering at level");
                }
                partial = partial
                    .into_iter()
                    .flat_map(|prefix| {
                        renderings.iter().map(move |rendering| {
                            let mut tuple = prefix.clone();
                            tuple.push(rendering.clone());
                            tuple
                        })
                    })
                    .collect();
            }
            tuples.extend(partial);
        }
        Ok(tuples)
    }

    /// Render this form at its display levels and check it for ambiguity.
    ///
    /// # Errors
    ///
    /// [`Error::MissingConverter`](crate::error::Error::MissingConverter) if
    /// a level's converter graph is broken. Ambiguity is never an error.
    pub fn render(&self) -> Result<Rendering> {
        let tuples = self.at_levels(&self.levels_to_show)?;
        let warning = if tuples.len() > 1 {
            Some(AmbiguityWarning::Surface)
        } else if tuples.len() == 1 && self.values.len() > 1 {
            Some(AmbiguityWarning::Underlying)
        } else {
            None
        };
        if let Some(warning) = warning {
            tracing::debug!(
                values = self.values.len(),
                renderings = tuples.len(),
                %warning,
                "ambiguous rendering"
            );
        }
        Ok(Rendering { tuples, warning })
    }
}

impl<A: Automaton> Clone for Form<'_, A> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            levels_to_show: self.levels_to_show.clone(),
        }
    }
}

impl<A: Automaton> PartialEq for Form<'_, A> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<A: Automaton> Eq for Form<'_, A> {}

impl<A: Automaton> fmt::Debug for Form<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("values", &self.values)
            .field("levels_to_show", &self.levels_to_show)
            .finish()
    }
}

/// Renders the form at its display levels: renderings are separated by
/// `", "`, the levels of one rendering by spaces.
///
/// Lossy: the ambiguity warning is dropped, and a rendering error is
/// logged at `warn` level and written as `<error>`. Use [`Form::render`]
/// to get either.
impl<A: Automaton> fmt::Display for Form<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(rendering) => fmt::Display::fmt(&rendering, f),
            Err(err) => {
                tracing::warn!(error = %err, "form could not be rendered");
                write!(f, "<{}>", err)
            }
        }
    }
}

impl<'a, A: Automaton> Not for Form<'a, A> {
    type Output = Form<'a, A>;

    fn not(self) -> Self::Output {
        Form {
            values: self.values,
            levels_to_show: Vec::new(),
        }
    }
}

impl<'a, A: Automaton> Not for &Form<'a, A> {
    type Output = Form<'a, A>;

    fn not(self) -> Self::Output {
        self.invert()
    }
}

impl<'a, A: Automaton> BitAnd for &Form<'a, A> {
    type Output = Form<'a, A>;

    fn bitand(self, other: Self) -> Self::Output {
        self.intersect(other)
    }
}

/// The result of rendering a [`Form`]: every distinct rendering, plus an
/// ambiguity warning if there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Rendering {
    tuples: BTreeSet<RenderedTuple>,
    warning: Option<AmbiguityWarning>,
}

impl Rendering {
    /// Every distinct rendering, in ascending order.
    pub fn tuples(&self) -> &BTreeSet<RenderedTuple> {
        &self.tuples
    }

    /// The ambiguity detected while rendering, if any.
    pub fn warning(&self) -> Option<AmbiguityWarning> {
        self.warning
    }

    /// True if rendering raised an ambiguity warning.
    pub fn is_ambiguous(&self) -> bool {
        self.warning.is_some()
    }

    /// Number of distinct renderings.
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// True if no value could be rendered.
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// A stable choice among the renderings: the least one.
    pub fn representative(&self) -> Option<&RenderedTuple> {
        self.tuples.iter().next()
    }

    /// The single rendering, treating any ambiguity as an error.
    ///
    /// A rendering with no tuples yields an empty tuple.
    pub fn into_unambiguous(self) -> std::result::Result<RenderedTuple, AmbiguityWarning> {
        if let Some(warning) = self.warning {
            return Err(warning);
        }
        Ok(self.tuples.into_iter().next().unwrap_or_default())
    }
}

impl fmt::Display for Rendering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tuple) in self.tuples.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", tuple.join(" "))?;
        }
        Ok(())
    }
}
