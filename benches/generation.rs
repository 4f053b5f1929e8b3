use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use iped::generate::generate_pool;
use iped::{analyze_balance, DesignBuilder, DesignParams, GenerationOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("CandidatePool");

    // Loose, typical and narrow bounds for E=16
    for (lo, hi) in [(1, 15), (3, 4), (8, 8)] {
        let params = DesignParams::new(16, 24, 200, lo, hi)
            .validate_with(GenerationOptions::default())
            .unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{lo}..={hi}")),
            &params,
            |b, params| {
                b.iter(|| {
                    let mut rng = StdRng::seed_from_u64(0);
                    generate_pool(params, &mut rng).unwrap()
                });
            },
        );
    }
    group.finish();
}

fn bench_builder(c: &mut Criterion) {
    let mut group = c.benchmark_group("Builder");
    group.sample_size(20);

    for respondents in [50, 200, 1000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(respondents),
            &respondents,
            |b, &respondents| {
                b.iter(|| {
                    DesignBuilder::new()
                        .elements(16)
                        .tasks_per_respondent(24)
                        .respondents(respondents)
                        .active_range(3, 4)
                        .seed(7)
                        .build()
                        .unwrap()
                });
            },
        );
    }
    group.finish();
}

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("BalanceAnalysis");

    for elements in [8, 16, 32] {
        let design = DesignBuilder::new()
            .elements(elements)
            .tasks_per_respondent(24)
            .respondents(200)
            .active_range(2, 4)
            .seed(11)
            .build()
            .unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(elements),
            design.matrix(),
            |b, matrix| b.iter(|| analyze_balance(matrix)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_pool, bench_builder, bench_analysis);
criterion_main!(benches);
