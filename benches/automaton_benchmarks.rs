//! Criterion benchmarks for the bundled transducer backend.
//!
//! Measures the operations every level link and every query is built from:
//! - Lexicon construction
//! - Composition with a rewrite rule
//! - Path enumeration

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use strata::automaton::{Automaton, Fst, Tape};
use strata::rewrite::{Alphabet, RewriteRule};

fn lexicon_words(n: usize) -> Vec<String> {
    // base-4 numerals over "abcd", all distinct
    (0..n)
        .map(|i| {
            let mut word = String::new();
            let mut k = i + n;
            while k > 0 {
                word.push(b"abcd"[k % 4] as char);
                k /= 4;
            }
            word
        })
        .collect()
}

fn bench_lexicon(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexicon");
    for size in [10, 100, 500] {
        let words = lexicon_words(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &words, |b, words| {
            b.iter(|| Fst::words(black_box(words)))
        });
    }
    group.finish();
}

fn bench_compose(c: &mut Criterion) {
    let alphabet = Alphabet::new("abcd".chars());
    let rule: Fst = RewriteRule::optional("a", "b").compile(&alphabet).unwrap();

    let mut group = c.benchmark_group("compose");
    for size in [10, 100, 500] {
        let lexicon = Fst::words(lexicon_words(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &lexicon, |b, lexicon| {
            b.iter(|| black_box(lexicon).compose(&rule))
        });
    }
    group.finish();
}

fn bench_paths(c: &mut Criterion) {
    let alphabet = Alphabet::new("abcd".chars());
    let rule: Fst = RewriteRule::optional("a", "b").compile(&alphabet).unwrap();
    let surface = Fst::words(lexicon_words(500))
        .compose(&rule)
        .project(Tape::Output);

    let mut group = c.benchmark_group("paths");
    for limit in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(limit), &limit, |b, &limit| {
            b.iter(|| surface.paths(black_box(limit)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lexicon, bench_compose, bench_paths);
criterion_main!(benches);
