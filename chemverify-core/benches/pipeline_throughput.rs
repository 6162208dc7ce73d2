//! Benchmarks the full `verify_text` pipeline (canonicalization through
//! report composition) across synthetic procedures of increasing length.
//!
//! Mirrors the scaling-characteristics benchmark shape used elsewhere in
//! this codebase: one step size sweep, plus a realistic fixed-size
//! end-to-end run for absolute-latency tracking.

use chemverify_core::verify_text;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

const STEP_TEMPLATES: &[&str] = &[
    "Benzaldehyde (1.06 g, 10 mmol) was dissolved in 10 mL of MeOH at 0 \u{00B0}C.",
    "NaBH4 (0.38 g, 10 mmol) was added portionwise over 10 min.",
    "The mixture was stirred for 2 h at room temperature, then quenched with water.",
    "The organic layer was extracted with EtOAc (3 x 20 mL) and dried over Na2SO4.",
    "The product was isolated in 82% yield after column chromatography (SiO2, 20% EtOAc/hexanes).",
    "See DOI: 10.1038/s41586-020-1234-5 for the original procedure.",
];

fn synthetic_procedure(step_count: usize) -> String {
    (0..step_count)
        .map(|i| STEP_TEMPLATES[i % STEP_TEMPLATES.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

fn bench_step_count_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify_text_step_scaling");

    for step_count in [10, 100, 1_000].iter() {
        let text = synthetic_procedure(*step_count);
        group.bench_with_input(BenchmarkId::from_parameter(step_count), &text, |b, text| {
            b.iter(|| verify_text(text, None));
        });
    }

    group.finish();
}

fn bench_typical_procedure(c: &mut Criterion) {
    let text = synthetic_procedure(12);
    c.bench_function("verify_text_typical_procedure", |b| {
        b.iter(|| verify_text(&text, None));
    });
}

criterion_group!(benches, bench_step_count_scaling, bench_typical_procedure);
criterion_main!(benches);
