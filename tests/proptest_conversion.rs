//! Property-based tests for level conversion using proptest
//!
//! Lexicons are small random word lists; derivations are random rewrites of
//! them, so every generated language is finite and fully enumerable.

use std::collections::BTreeSet;

use proptest::prelude::*;
use strata::prelude::*;

fn word_strategy() -> impl Strategy<Value = String> {
    "[a-d]{1,5}"
}

fn lexicon_strategy() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(word_strategy(), 1..=8)
}

/// A lexicon and a surface rendering for each of its words. Renderings may
/// collide, which makes some surface strings ambiguous.
fn mapping_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    lexicon_strategy().prop_flat_map(|words| {
        let words: Vec<String> = words.into_iter().collect();
        let n = words.len();
        (Just(words), prop::collection::vec("[x-z]{0,3}", n))
            .prop_map(|(words, surfaces)| words.into_iter().zip(surfaces).collect::<Vec<_>>())
    })
}

fn language_for(mapping: &[(String, String)]) -> (Language, LevelId) {
    let mut language: Language = Language::new(Fst::words(mapping.iter().map(|(w, _)| w)));
    let child = language
        .add_child(
            LevelId::ROOT,
            Fst::pairs(mapping.iter().map(|(w, s)| (w.as_str(), s.as_str()))),
        )
        .unwrap();
    (language, child)
}

proptest! {
    #[test]
    fn prop_apply_up_singleton_round_trips(mapping in mapping_strategy()) {
        let transducer = Fst::pairs(mapping.iter().map(|(w, s)| (w.as_str(), s.as_str())));
        for (_, surface) in &mapping {
            let readings = apply_up(&transducer, surface);
            prop_assert!(!readings.is_empty());
            if readings.len() == 1 {
                let reading = readings.iter().next().unwrap();
                prop_assert!(apply_down(&transducer, reading).contains(surface));
            }
        }
    }

    #[test]
    fn prop_every_root_value_is_consistent(mapping in mapping_strategy()) {
        let (language, child) = language_for(&mapping);
        let child = language.level(child).unwrap();
        for (word, surface) in &mapping {
            let form = child.form(surface).unwrap();
            prop_assert!(form.values().contains(word));
        }
    }

    #[test]
    fn prop_root_round_trip_is_identity(mapping in mapping_strategy()) {
        let (language, child) = language_for(&mapping);
        let root = language.root();
        let child = language.level(child).unwrap();
        let there = root.converter_to(child).unwrap();
        let back = child.converter_to(root).unwrap();
        let round_trip = there.compose(back);

        for (word, _) in &mapping {
            prop_assert!(apply_down(&round_trip, word).contains(word));
        }
    }

    #[test]
    fn prop_rendering_warning_matches_counts(mapping in mapping_strategy()) {
        let (language, child) = language_for(&mapping);
        let child = language.level(child).unwrap();
        for (_, surface) in &mapping {
            let form = child.form(surface).unwrap();
            let rendering = form.extend_display(language.root()).render().unwrap();
            match rendering.warning() {
                Some(AmbiguityWarning::Surface) => prop_assert!(rendering.len() > 1),
                Some(AmbiguityWarning::Underlying) => {
                    prop_assert_eq!(rendering.len(), 1);
                    prop_assert!(form.is_ambiguous());
                }
                None => prop_assert!(rendering.len() <= 1),
            }
            // the root display separates every value
            prop_assert_eq!(rendering.len(), form.values().len());
        }
    }

    #[test]
    fn prop_intersection_is_subset(mapping in mapping_strategy()) {
        let (language, child) = language_for(&mapping);
        let child = language.level(child).unwrap();
        let (first_word, first_surface) = &mapping[0];
        let at_child = child.form(first_surface).unwrap();
        let at_root = language.root().form(first_word).unwrap();
        let both = &at_child & &at_root;
        prop_assert_eq!(both.values(), at_root.values());
        prop_assert!(both.values().is_subset(at_child.values()));
    }
}
