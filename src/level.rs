//! Levels of representation and traversal of a language's level tree.
//!
//! Levels are stored in their [`Language`]'s arena and addressed by
//! [`LevelId`]. A [`Level`] is a cheap, copyable handle pairing a language
//! with an id; it is what queries and [`Form`]s work with.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::apply::{apply_down_with_limit, apply_up_with_limit};
use crate::automaton::{Automaton, Fst};
use crate::error::{Error, Result};
use crate::form::Form;
use crate::language::{Language, LevelNode};

/// Unique identifier for a level within its language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelId(pub(crate) usize);

impl LevelId {
    /// The root level of every language.
    pub const ROOT: LevelId = LevelId(0);

    /// Position of the level in its language's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A level of representation within a [`Language`].
///
/// Obtained from [`Language::root`], [`Language::level`] or the name/sigil
/// lookups. Holding a `Level` borrows the language, so the level tree
/// cannot be extended while any handle (or any [`Form`] displaying at a
/// level) is alive.
///
/// # Example
///
/// ```rust
/// use strata::prelude::*;
///
/// let mut language: Language = Language::new(Fst::words(["foo", "bar"]));
/// let caps = language
///     .add_child(LevelId::ROOT, Fst::pairs([("foo", "Foo"), ("bar", "Bar")]))
///     .unwrap();
///
/// let level = language.level(caps).unwrap();
/// let form = level.form("Foo").unwrap();
/// assert_eq!(form, language.root().form("foo").unwrap());
/// ```
pub struct Level<'a, A: Automaton = Fst> {
    language: &'a Language<A>,
    id: LevelId,
}

impl<'a, A: Automaton> Level<'a, A> {
    /// Callers guarantee `id` indexes `language`'s arena.
    pub(crate) fn new(language: &'a Language<A>, id: LevelId) -> Self {
        Self { language, id }
    }

    fn node(&self) -> &'a LevelNode<A> {
        &self.language.nodes[self.id.0]
    }

    /// This level's id.
    pub fn id(&self) -> LevelId {
        self.id
    }

    /// The language this level belongs to.
    pub fn language(&self) -> &'a Language<A> {
        self.language
    }

    /// The registered name, if any.
    pub fn name(&self) -> Option<&'a str> {
        self.node().name.as_deref()
    }

    /// The registered sigil, if any.
    pub fn sigil(&self) -> Option<&'a str> {
        self.node().sigil.as_deref()
    }

    /// True if this is the language's root level.
    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }

    /// The level this one is derived from; `None` for the root.
    pub fn parent(&self) -> Option<Level<'a, A>> {
        self.node().parent.map(|id| Level::new(self.language, id))
    }

    /// Levels derived directly from this one, in the order they were added.
    pub fn children(&self) -> impl Iterator<Item = Level<'a, A>> + 'a {
        let language = self.language;
        self.node()
            .children
            .iter()
            .map(move |&id| Level::new(language, id))
    }

    /// The transducer from the parent level to this one. For the root,
    /// the lexicon acceptor.
    pub fn derivation(&self) -> &'a A {
        &self.node().derivation
    }

    /// Transducer from this level's representation to `other`'s.
    ///
    /// `None` if `other` belongs to a different language.
    pub fn converter_to(&self, other: Level<'_, A>) -> Option<&'a A> {
        if !std::ptr::eq(self.language, other.language) {
            return None;
        }
        self.node().converters.get(&other.id)
    }

    /// Transducer from the root level to this one.
    fn from_root(&self) -> Result<&'a A> {
        self.language.nodes[LevelId::ROOT.0]
            .converters
            .get(&self.id)
            .ok_or(Error::MissingConverter {
                from: LevelId::ROOT,
                to: self.id,
            })
    }

    /// Every root-level value that derives `text` at this level.
    ///
    /// # Errors
    ///
    /// [`Error::MissingConverter`] if the converter graph is broken.
    pub fn possible_roots(&self, text: &str) -> Result<BTreeSet<String>> {
        let converter = self.from_root()?;
        Ok(apply_up_with_limit(
            converter,
            text,
            self.language.config().path_limit,
        ))
    }

    /// Read `text` at this level.
    ///
    /// The resulting form holds every consistent root value and displays at
    /// this level.
    ///
    /// # Errors
    ///
    /// [`Error::InconsistentForm`] if no root value derives `text`.
    pub fn form(&self, text: &str) -> Result<Form<'a, A>> {
        let values = self.possible_roots(text)?;
        if values.is_empty() {
            return Err(Error::InconsistentForm {
                level: self.id,
                text: text.to_string(),
            });
        }
        Ok(Form::new(values, vec![*self]))
    }

    /// Every rendering of the root value `value` at this level, passed
    /// through the level's formatter.
    pub fn render_value(&self, value: &str) -> Result<BTreeSet<String>> {
        let converter = self.from_root()?;
        let rendered =
            apply_down_with_limit(converter, value, self.language.config().path_limit);
        Ok(match self.node().formatter {
            Some(format) => rendered.iter().map(|s| format(s)).collect(),
            None => rendered,
        })
    }

    /// Breadth-first traversal of this level and its descendants.
    ///
    /// Each call starts a fresh, independent traversal.
    pub fn walk(&self) -> impl Iterator<Item = Level<'a, A>> + 'a {
        self.walk_with_depth().map(|(level, _)| level)
    }

    /// Breadth-first traversal paired with the depth below this level
    /// (`0` for this level itself).
    pub fn walk_with_depth(&self) -> Walk<'a, A> {
        Walk::new(self.language, self.id)
    }
}

impl<A: Automaton> Clone for Level<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: Automaton> Copy for Level<'_, A> {}

impl<A: Automaton> PartialEq for Level<'_, A> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.language, other.language) && self.id == other.id
    }
}

impl<A: Automaton> Eq for Level<'_, A> {}

impl<A: Automaton> Hash for Level<'_, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<A: Automaton> fmt::Debug for Level<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Level")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}

impl<A: Automaton> fmt::Display for Level<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name)?,
            None => write!(f, "{}", self.id)?,
        }
        if let Some(sigil) = self.sigil() {
            write!(f, " (sigil {})", sigil)?;
        }
        Ok(())
    }
}

/// Breadth-first iterator over a subtree of levels, with depths.
///
/// Created by [`Level::walk_with_depth`] and [`Language::walk_with_depth`].
pub struct Walk<'a, A: Automaton = Fst> {
    language: &'a Language<A>,
    pending: VecDeque<(LevelId, usize)>,
}

impl<'a, A: Automaton> Walk<'a, A> {
    pub(crate) fn new(language: &'a Language<A>, start: LevelId) -> Self {
        let mut pending = VecDeque::new();
        pending.push_back((start, 0));
        Self { language, pending }
    }
}

impl<'a, A: Automaton> Iterator for Walk<'a, A> {
    type Item = (Level<'a, A>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.pending.pop_front()?;
        let node = self.language.nodes.get(id.0)?;
        self.pending
            .extend(node.children.iter().map(|&child| (child, depth + 1)));
        Some((Level::new(self.language, id), depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (Language, [LevelId; 4]) {
        let mut language: Language = Language::new(Fst::words(["ab", "ba"]));
        let upper = language
            .add_named_child(LevelId::ROOT, "upper", "^", Fst::pairs([("ab", "AB"), ("ba", "BA")]))
            .unwrap();
        let reversed = language
            .add_child(LevelId::ROOT, Fst::pairs([("ab", "ba"), ("ba", "ab")]))
            .unwrap();
        let lower = language
            .add_child(upper, Fst::pairs([("AB", "ab"), ("BA", "ba")]))
            .unwrap();
        (language, [LevelId::ROOT, upper, reversed, lower])
    }

    #[test]
    fn test_walk_is_breadth_first() {
        let (language, [root, upper, reversed, lower]) = tree();
        let order: Vec<LevelId> = language.root().walk().map(|l| l.id()).collect();
        assert_eq!(order, vec![root, upper, reversed, lower]);
    }

    #[test]
    fn test_walk_with_depth() {
        let (language, [_, upper, _, lower]) = tree();
        let depths: Vec<(LevelId, usize)> = language
            .root()
            .walk_with_depth()
            .map(|(l, d)| (l.id(), d))
            .collect();
        assert_eq!(depths[3], (lower, 2));

        let subtree: Vec<(LevelId, usize)> = language
            .level(upper)
            .unwrap()
            .walk_with_depth()
            .map(|(l, d)| (l.id(), d))
            .collect();
        assert_eq!(subtree, vec![(upper, 0), (lower, 1)]);
    }

    #[test]
    fn test_walk_is_restartable() {
        let (language, _) = tree();
        let root = language.root();
        let first: Vec<LevelId> = root.walk().map(|l| l.id()).collect();
        let second: Vec<LevelId> = root.walk().map(|l| l.id()).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_parent_and_children() {
        let (language, [root, upper, reversed, lower]) = tree();
        let root_level = language.root();
        assert!(root_level.is_root());
        assert_eq!(root_level.parent(), None);

        let children: Vec<LevelId> = root_level.children().map(|l| l.id()).collect();
        assert_eq!(children, vec![upper, reversed]);

        let lower_level = language.level(lower).unwrap();
        assert!(!lower_level.is_root());
        assert_eq!(lower_level.parent().map(|l| l.id()), Some(upper));
        assert_eq!(lower_level.parent().and_then(|l| l.parent()).map(|l| l.id()), Some(root));
    }

    #[test]
    fn test_display() {
        let (language, [_, upper, reversed, _]) = tree();
        assert_eq!(language.level(upper).unwrap().to_string(), "upper (sigil ^)");
        assert_eq!(language.level(reversed).unwrap().to_string(), "#2");
    }

    #[test]
    fn test_possible_roots_through_sibling_tree() {
        let (language, [_, _, reversed, lower]) = tree();
        let roots = language.level(reversed).unwrap().possible_roots("ab").unwrap();
        assert_eq!(roots.into_iter().collect::<Vec<_>>(), vec!["ba"]);

        let roots = language.level(lower).unwrap().possible_roots("ab").unwrap();
        assert_eq!(roots.into_iter().collect::<Vec<_>>(), vec!["ab"]);
    }

    #[test]
    fn test_converter_between_siblings() {
        let (language, [_, upper, reversed, _]) = tree();
        let upper_level = language.level(upper).unwrap();
        let reversed_level = language.level(reversed).unwrap();
        let converter = upper_level.converter_to(reversed_level).unwrap();
        let converted = crate::apply::apply_down(converter, "AB");
        assert_eq!(converted.into_iter().collect::<Vec<_>>(), vec!["ba"]);
    }

    #[test]
    fn test_converter_to_foreign_level_is_none() {
        let (language, _) = tree();
        let (other, _) = tree();
        assert!(language.root().converter_to(other.root()).is_none());
        assert_ne!(language.root(), other.root());
    }

    #[test]
    fn test_form_at_unknown_text_is_inconsistent() {
        let (language, [_, upper, _, _]) = tree();
        let err = language.level(upper).unwrap().form("XY").unwrap_err();
        assert_eq!(
            err,
            Error::InconsistentForm {
                level: upper,
                text: "XY".to_string()
            }
        );
    }
}
