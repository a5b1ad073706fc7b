//! Criterion benchmarks for building level trees and querying them.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use strata::prelude::*;

const WORDS: [&str; 8] = ["bad", "cab", "dab", "abba", "bacab", "dad", "cad", "abc"];

fn chain(depth: usize) -> (Language, LevelId) {
    let mut language: Language = Language::builder()
        .lexicon(Fst::words(WORDS))
        .alphabet(Alphabet::new("abcd".chars()))
        .build()
        .unwrap();
    let rules = [
        RewriteRule::obligatory("d", "b"),
        RewriteRule::optional("c", "a"),
        RewriteRule::obligatory("b", "a"),
    ];
    let mut level = LevelId::ROOT;
    for i in 0..depth {
        level = language.add_rule_child(level, &rules[i % rules.len()]).unwrap();
    }
    (language, level)
}

fn bench_add_child(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_child");
    for depth in [1, 3, 6] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| chain(black_box(depth)))
        });
    }
    group.finish();
}

fn bench_form(c: &mut Criterion) {
    let (language, deepest) = chain(3);
    let level = language.level(deepest).unwrap();
    let surfaces = level.render_value("bacab").unwrap();
    let surface = surfaces.iter().next().cloned().unwrap_or_default();

    c.bench_function("form_at_deepest_level", |b| {
        b.iter(|| level.form(black_box(&surface)))
    });
}

fn bench_render(c: &mut Criterion) {
    let (language, deepest) = chain(3);
    let level = language.level(deepest).unwrap();
    let form = level.form("aaa").unwrap();
    let everywhere: Vec<Level> = language.walk().collect();

    c.bench_function("render_at_every_level", |b| {
        b.iter(|| form.at_levels(black_box(&everywhere)))
    });
}

criterion_group!(benches, bench_add_child, bench_form, bench_render);
criterion_main!(benches);
