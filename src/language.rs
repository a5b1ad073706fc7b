//! Languages: trees of levels of representation linked by transducers.
//!
//! A [`Language`] owns every level in its tree. The root level's
//! derivation is the lexicon, an acceptor for every root-level value; each
//! other level's derivation is a transducer from its parent's
//! representation to its own.
//!
//! # Converter Graph
//!
//! Every level keeps a converter to every other level of the same tree.
//! When a child is added, each level already reachable from the parent
//! gains one converter to the child and the child gains one converter back,
//! each built by a single composition. Queries therefore never search the
//! tree: reading a string at a level is one apply-up through the root's
//! converter to that level.
//!
//! # Example
//!
//! ```rust
//! use strata::prelude::*;
//!
//! let mut language: Language = Language::new(Fst::words(["foo", "bar", "baz"]));
//! let caps = language
//!     .add_named_child(
//!         LevelId::ROOT,
//!         "caps",
//!         "^",
//!         Fst::pairs([("foo", "Foo"), ("bar", "Bar"), ("baz", "Baz")]),
//!     )
//!     .unwrap();
//!
//! let form = language.level_by_name("caps").unwrap().form("Foo").unwrap();
//! assert_eq!(form.values().iter().collect::<Vec<_>>(), vec!["foo"]);
//! assert_eq!(form.to_string(), "Foo");
//! # let _ = caps;
//! ```

use std::fmt;

use rustc_hash::FxHashMap;

use crate::apply::DEFAULT_PATH_LIMIT;
use crate::automaton::{Automaton, Fst, Tape};
use crate::error::{BuilderError, Error, Result};
use crate::level::{Level, LevelId, Walk};
use crate::rewrite::{Alphabet, RewriteRule};

/// Name that always refers to the root level and cannot be registered.
pub const ROOT_ALIAS: &str = "root";

/// Sigil given to the root level unless configured otherwise.
pub const DEFAULT_ROOT_SIGIL: &str = "|";

/// Settings fixed when a language is built.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct LanguageConfig {
    /// Maximum number of strings collected by one apply-up or apply-down
    pub path_limit: usize,
    /// Name registered for the root level
    pub root_name: String,
    /// Sigil registered for the root level
    pub root_sigil: String,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            path_limit: DEFAULT_PATH_LIMIT,
            root_name: ROOT_ALIAS.to_string(),
            root_sigil: DEFAULT_ROOT_SIGIL.to_string(),
        }
    }
}

/// Storage for one level in the language's arena.
pub(crate) struct LevelNode<A> {
    pub(crate) derivation: A,
    pub(crate) parent: Option<LevelId>,
    pub(crate) children: Vec<LevelId>,
    /// `converters[target]` maps this level's representation to `target`'s.
    pub(crate) converters: FxHashMap<LevelId, A>,
    pub(crate) name: Option<String>,
    pub(crate) sigil: Option<String>,
    pub(crate) formatter: Option<fn(&str) -> String>,
}

/// A language: a rooted tree of levels of representation.
///
/// Levels are added with [`add_child`](Language::add_child) or
/// [`add_named_child`](Language::add_named_child), which take `&mut self`.
/// Queries go through [`Level`] handles, which borrow the language, so a
/// language is built first and only then queried; the compiler rejects any
/// attempt to extend a tree while it is being read.
///
/// Forms that are identical at the root level are identical for every
/// other purpose.
pub struct Language<A: Automaton = Fst> {
    pub(crate) nodes: Vec<LevelNode<A>>,
    names: FxHashMap<String, LevelId>,
    sigils: FxHashMap<String, LevelId>,
    alphabet: Option<Alphabet>,
    sigma_star: A,
    config: LanguageConfig,
}

impl<A: Automaton> Language<A> {
    /// Create a language whose root level accepts the strings of `lexicon`.
    pub fn new(lexicon: A) -> Self {
        Self::from_parts(lexicon, None, LanguageConfig::default())
    }

    /// Create a language whose lexicon is the single word `word`.
    pub fn from_word(word: &str) -> Self {
        Self::new(A::literal(word))
    }

    /// Start building a language with non-default settings.
    pub fn builder() -> LanguageBuilder<A> {
        LanguageBuilder::new()
    }

    fn from_parts(lexicon: A, alphabet: Option<Alphabet>, config: LanguageConfig) -> Self {
        let sigma_star = match &alphabet {
            Some(alphabet) => alphabet.sigma_star(),
            None => lexicon.closure(),
        };

        let mut converters = FxHashMap::default();
        converters.insert(LevelId::ROOT, lexicon.project(Tape::Output));

        let mut names = FxHashMap::default();
        names.insert(config.root_name.clone(), LevelId::ROOT);
        let mut sigils = FxHashMap::default();
        sigils.insert(config.root_sigil.clone(), LevelId::ROOT);

        let root = LevelNode {
            derivation: lexicon,
            parent: None,
            children: Vec::new(),
            converters,
            name: Some(config.root_name.clone()),
            sigil: Some(config.root_sigil.clone()),
            formatter: None,
        };

        Self {
            nodes: vec![root],
            names,
            sigils,
            alphabet,
            sigma_star,
            config,
        }
    }

    /// Add an unnamed level derived from `parent` by `derivation`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownLevel`] if `parent` is not a level of this language.
    pub fn add_child(&mut self, parent: LevelId, derivation: A) -> Result<LevelId> {
        self.link(parent, derivation, None, None)
    }

    /// Add a level with a unique name and sigil.
    ///
    /// Registration is checked before anything is linked, so a rejected
    /// level leaves the language unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyName`] / [`Error::EmptySigil`]
    /// - [`Error::ReservedName`] for [`ROOT_ALIAS`]
    /// - [`Error::NameInUse`] / [`Error::SigilInUse`] if another level
    ///   already has the name or sigil
    /// - [`Error::UnknownLevel`] if `parent` is not a level of this language
    pub fn add_named_child(
        &mut self,
        parent: LevelId,
        name: &str,
        sigil: &str,
        derivation: A,
    ) -> Result<LevelId> {
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        if sigil.is_empty() {
            return Err(Error::EmptySigil);
        }
        if name == ROOT_ALIAS {
            return Err(Error::ReservedName(name.to_string()));
        }
        if self.names.contains_key(name) {
            return Err(Error::NameInUse(name.to_string()));
        }
        if self.sigils.contains_key(sigil) {
            return Err(Error::SigilInUse(sigil.to_string()));
        }
        self.link(parent, derivation, Some(name.to_string()), Some(sigil.to_string()))
    }

    /// Add a level derived from `parent` by compiling `rule` over this
    /// language's alphabet.
    ///
    /// # Errors
    ///
    /// [`Error::Rewrite`] if the rule does not compile, otherwise as
    /// [`add_child`](Language::add_child).
    pub fn add_rule_child(&mut self, parent: LevelId, rule: &RewriteRule) -> Result<LevelId> {
        let derivation = rule.compile(&self.alphabet())?;
        self.add_child(parent, derivation)
    }

    /// Create the child node and connect it to every level reachable from
    /// `parent`.
    fn link(
        &mut self,
        parent: LevelId,
        derivation: A,
        name: Option<String>,
        sigil: Option<String>,
    ) -> Result<LevelId> {
        let parent_node = self.nodes.get(parent.0).ok_or(Error::UnknownLevel(parent))?;
        let child = LevelId(self.nodes.len());
        let inverse = derivation.invert();

        // Snapshot the parent's converters before any map is touched.
        let mut targets: Vec<(LevelId, &A)> = parent_node
            .converters
            .iter()
            .map(|(&target, converter)| (target, converter))
            .collect();
        targets.sort_by_key(|&(target, _)| target);

        let mut child_converters = FxHashMap::default();
        child_converters.insert(child, derivation.project(Tape::Output));
        let mut to_child = Vec::with_capacity(targets.len());

        for (target, parent_to_target) in targets {
            let target_to_parent = self
                .nodes
                .get(target.0)
                .and_then(|node| node.converters.get(&parent))
                .ok_or(Error::MissingConverter {
                    from: target,
                    to: parent,
                })?;
            to_child.push((target, target_to_parent.compose(&derivation)));
            child_converters.insert(target, inverse.compose(parent_to_target));
        }

        for (target, converter) in to_child {
            self.nodes[target.0].converters.insert(child, converter);
        }
        self.nodes[parent.0].children.push(child);

        if let Some(name) = &name {
            self.names.insert(name.clone(), child);
        }
        if let Some(sigil) = &sigil {
            self.sigils.insert(sigil.clone(), child);
        }

        tracing::debug!(
            level = %child,
            parent = %parent,
            converters = child_converters.len(),
            name = name.as_deref().unwrap_or(""),
            "linked level"
        );

        self.nodes.push(LevelNode {
            derivation,
            parent: Some(parent),
            children: Vec::new(),
            converters: child_converters,
            name,
            sigil,
            formatter: None,
        });

        Ok(child)
    }

    /// Apply `formatter` to every string rendered at `level`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownLevel`] if `level` is not a level of this language.
    pub fn set_formatter(&mut self, level: LevelId, formatter: fn(&str) -> String) -> Result<()> {
        let node = self
            .nodes
            .get_mut(level.0)
            .ok_or(Error::UnknownLevel(level))?;
        node.formatter = Some(formatter);
        Ok(())
    }

    /// The root level.
    pub fn root(&self) -> Level<'_, A> {
        Level::new(self, LevelId::ROOT)
    }

    /// The level with id `id`, if it belongs to this language.
    pub fn level(&self, id: LevelId) -> Option<Level<'_, A>> {
        (id.0 < self.nodes.len()).then(|| Level::new(self, id))
    }

    /// The level registered under `name`. [`ROOT_ALIAS`] always finds the root.
    pub fn level_by_name(&self, name: &str) -> Option<Level<'_, A>> {
        if name == ROOT_ALIAS {
            return Some(self.root());
        }
        self.names.get(name).map(|&id| Level::new(self, id))
    }

    /// The level registered with `sigil`.
    pub fn level_by_sigil(&self, sigil: &str) -> Option<Level<'_, A>> {
        self.sigils.get(sigil).map(|&id| Level::new(self, id))
    }

    /// True if `name` is registered or reserved.
    pub fn has_name(&self, name: &str) -> bool {
        name == ROOT_ALIAS || self.names.contains_key(name)
    }

    /// True if `sigil` is registered.
    pub fn has_sigil(&self, sigil: &str) -> bool {
        self.sigils.contains_key(sigil)
    }

    /// Number of levels, including the root.
    pub fn num_levels(&self) -> usize {
        self.nodes.len()
    }

    /// Breadth-first traversal of every level, starting at the root.
    pub fn walk(&self) -> impl Iterator<Item = Level<'_, A>> + '_ {
        self.root().walk()
    }

    /// Breadth-first traversal of every level with its depth.
    pub fn walk_with_depth(&self) -> Walk<'_, A> {
        Walk::new(self, LevelId::ROOT)
    }

    /// The declared alphabet, or the symbols used by the lexicon if none
    /// was declared.
    pub fn alphabet(&self) -> Alphabet {
        match &self.alphabet {
            Some(alphabet) => alphabet.clone(),
            None => Alphabet::of(&self.nodes[LevelId::ROOT.0].derivation),
        }
    }

    /// Closure over the alphabet (or, without one, over the lexicon), for
    /// building derivations.
    pub fn sigma_star(&self) -> &A {
        &self.sigma_star
    }

    /// Settings this language was built with.
    pub fn config(&self) -> &LanguageConfig {
        &self.config
    }
}

impl<A: Automaton> fmt::Display for Language<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Language with these levels:")?;
        for (level, depth) in self.walk_with_depth() {
            write!(f, "\n{}{}", " ".repeat(depth), level)?;
        }
        Ok(())
    }
}

impl<A: Automaton> fmt::Debug for Language<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("levels", &self.nodes.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for constructing a [`Language`] with a fluent API.
///
/// # Example
///
/// ```rust
/// use strata::prelude::*;
///
/// let language: Language = Language::builder()
///     .lexicon(Fst::words(["cab", "bad"]))
///     .alphabet(Alphabet::new("abcd".chars()))
///     .root_name("lexicon")
///     .path_limit(10)
///     .build()
///     .unwrap();
///
/// assert_eq!(language.root().name(), Some("lexicon"));
/// ```
pub struct LanguageBuilder<A: Automaton = Fst> {
    lexicon: Option<A>,
    alphabet: Option<Alphabet>,
    config: LanguageConfig,
}

impl<A: Automaton> LanguageBuilder<A> {
    /// Create a new builder with default settings and no lexicon.
    pub fn new() -> Self {
        Self {
            lexicon: None,
            alphabet: None,
            config: LanguageConfig::default(),
        }
    }

    /// Set the root lexicon.
    pub fn lexicon(mut self, lexicon: A) -> Self {
        self.lexicon = Some(lexicon);
        self
    }

    /// Use the single word `word` as the root lexicon.
    pub fn word(self, word: &str) -> Self {
        self.lexicon(A::literal(word))
    }

    /// Declare the alphabet used for `sigma_star` and rewrite rules.
    pub fn alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = Some(alphabet);
        self
    }

    /// Name the root level (default [`ROOT_ALIAS`]).
    pub fn root_name(mut self, name: impl Into<String>) -> Self {
        self.config.root_name = name.into();
        self
    }

    /// Give the root level a sigil (default [`DEFAULT_ROOT_SIGIL`]).
    pub fn root_sigil(mut self, sigil: impl Into<String>) -> Self {
        self.config.root_sigil = sigil.into();
        self
    }

    /// Bound the number of strings a single apply-up or apply-down collects.
    pub fn path_limit(mut self, limit: usize) -> Self {
        self.config.path_limit = limit;
        self
    }

    /// Replace every setting at once.
    pub fn config(mut self, config: LanguageConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the `Language`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No lexicon was set (use `.lexicon()` or `.word()`)
    /// - The path limit is zero
    /// - The root name or sigil is empty
    pub fn build(self) -> std::result::Result<Language<A>, BuilderError> {
        let lexicon = self.lexicon.ok_or(BuilderError::MissingLexicon)?;
        if self.config.path_limit == 0 {
            return Err(BuilderError::ZeroPathLimit);
        }
        if self.config.root_name.is_empty() {
            return Err(BuilderError::EmptyRootName);
        }
        if self.config.root_sigil.is_empty() {
            return Err(BuilderError::EmptyRootSigil);
        }
        Ok(Language::from_parts(lexicon, self.alphabet, self.config))
    }
}

impl<A: Automaton> Default for LanguageBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}
