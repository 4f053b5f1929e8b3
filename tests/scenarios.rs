//! End-to-end generation scenarios.

use std::collections::HashSet;

use iped::generate::{generate_pool, select_tasks};
use iped::policy::recommend_parameters;
use iped::{
    generate_design, verify_design, ActivePattern, DesignBuilder, DesignMatrix, DesignParams,
    Error, GenerationOptions, RebalanceConfig, Task,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn small_design_is_partitioned_into_sequences() {
    init_tracing();
    let design = DesignBuilder::new()
        .elements(4)
        .tasks_per_respondent(2)
        .respondents(3)
        .active_range(1, 2)
        .seed(3)
        .build()
        .unwrap();
    let matrix = design.matrix();

    assert_eq!(matrix.num_tasks(), 6);
    assert_eq!(matrix.num_respondents(), 3);
    for (r, seq) in matrix.sequences().iter().enumerate() {
        assert_eq!(seq.respondent_index(), r);
        assert_eq!(seq.len(), 2);
        for (t, task) in seq.tasks().iter().enumerate() {
            assert_eq!(task.task_index(), t);
            assert_eq!(task.pattern().len(), 4);
            assert!((1..=2).contains(&task.active_count()));
        }
    }
    assert!(verify_design(matrix, design.params()).is_valid);
}

#[test]
fn large_design_exposes_elements_evenly() {
    init_tracing();
    let design = DesignBuilder::new()
        .elements(16)
        .tasks_per_respondent(24)
        .respondents(200)
        .active_range(3, 4)
        .seed(42)
        .build()
        .unwrap();
    let report = design.report();

    assert_eq!(report.num_tasks, 4800);
    let (lo, hi) = report.active_count_range;
    assert!(lo >= 3 && hi <= 4);

    let total_active: usize = design.matrix().tasks().map(|t| t.active_count()).sum();
    let avg_active = total_active as f64 / 4800.0;
    let expected = 4800.0 * avg_active / 16.0;
    assert!((report.expected_element_count - expected).abs() < 1e-9);

    for &count in &report.element_counts {
        let deviation = (count as f64 - expected).abs() / expected;
        assert!(deviation <= 0.15, "count {count} vs expected {expected:.1}");
    }
    assert!(report.elements_within(0.15));

    // 120 pairs, every one co-occurs at least once in 4800 tasks
    assert_eq!(report.pair_counts.len(), 120);
    assert!(report.pair_stats.min > 0);
}

#[test]
fn inverted_bounds_fail_before_generation() {
    let params = DesignParams::new(8, 4, 10, 5, 3);
    assert_eq!(
        params.validate().unwrap_err().parameter(),
        Some("min_active_elements")
    );

    let err = generate_design(&params, &GenerationOptions::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidParameters { .. }));
}

#[test]
fn narrow_bounds_exhaust_the_attempt_budget() {
    init_tracing();
    let err = DesignBuilder::new()
        .elements(60)
        .tasks_per_respondent(10)
        .respondents(10)
        .active_range(1, 1)
        .max_attempts(20_000)
        .seed(1)
        .build()
        .unwrap_err();

    match err {
        Error::PoolExhausted {
            required,
            accepted,
            attempts,
        } => {
            assert_eq!(required, 100);
            assert!(accepted < required);
            assert_eq!(attempts, 20_000);
        }
        other => panic!("expected PoolExhausted, got {other:?}"),
    }
}

#[test]
fn degenerate_bounds_need_no_sampling() {
    let design = DesignBuilder::new()
        .elements(64)
        .tasks_per_respondent(5)
        .respondents(4)
        .active_range(64, 64)
        .max_attempts(1)
        .seed(0)
        .build()
        .unwrap();
    assert!(design.matrix().tasks().all(|t| t.active_count() == 64));
    assert_eq!(design.report().element_stats.std_dev, 0.0);

    let design = DesignBuilder::new()
        .elements(10)
        .tasks_per_respondent(3)
        .respondents(2)
        .active_range(0, 0)
        .max_attempts(1)
        .build()
        .unwrap();
    assert!(design.matrix().tasks().all(|t| t.active_count() == 0));
    assert!(design.report().pair_counts.iter().all(|p| p.count == 0));
}

#[test]
fn pool_can_be_reused_for_several_selections() {
    let params = DesignParams::new(10, 6, 5, 2, 5).validate().unwrap();
    let mut rng = StdRng::seed_from_u64(8);
    let pool = generate_pool(&params, &mut rng).unwrap();
    assert_eq!(pool.len(), params.pool_target());

    let first = select_tasks(&pool, params.total_tasks(), &mut rng).unwrap();
    let second = select_tasks(&pool, params.total_tasks(), &mut rng).unwrap();
    assert_eq!(first.len(), 30);
    assert_eq!(second.len(), 30);
    assert_ne!(first, second);
}

#[test]
fn policy_recommendation_generates() {
    let rec = recommend_parameters(6, 40, 24).unwrap();
    assert_eq!(rec.params.tasks_per_respondent, 15);

    let design = generate_design(
        &rec.params,
        &GenerationOptions {
            seed: Some(9),
            ..rec.options()
        },
    )
    .unwrap();
    assert_eq!(design.matrix().num_tasks(), 600);
    assert!(design.matrix().tasks().all(|t| t.active_count() == 2));
    // T = C(6, 2): every respondent sees each pair exactly once
    assert_eq!(respondents_with_repeats(design.matrix()), 0);
}

fn respondents_with_repeats(matrix: &DesignMatrix) -> usize {
    matrix
        .sequences()
        .iter()
        .filter(|seq| {
            let distinct: HashSet<&ActivePattern> = seq.tasks().iter().map(Task::pattern).collect();
            distinct.len() < seq.len()
        })
        .count()
}

#[test]
fn recommended_design_never_repeats_within_a_respondent() {
    let rec = recommend_parameters(12, 50, 24).unwrap();
    assert_eq!(rec.capacity, 220);

    let options = GenerationOptions {
        seed: Some(1),
        ..rec.options()
    };
    let design = generate_design(&rec.params, &options).unwrap();
    assert_eq!(respondents_with_repeats(design.matrix()), 0);
    assert!(verify_design(design.matrix(), design.params()).is_valid);

    // Slot selection alone gives no such guarantee; this seed does repeat
    let plain = generate_design(
        &rec.params,
        &GenerationOptions {
            seed: Some(1),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(respondents_with_repeats(plain.matrix()) > 0);
}

#[test]
fn rebalancing_tightens_exposure() {
    let builder = DesignBuilder::new()
        .elements(12)
        .tasks_per_respondent(12)
        .respondents(40)
        .active_range(2, 5)
        .seed(17);

    let plain = builder.clone().build().unwrap();
    let balanced = builder.rebalance(RebalanceConfig::default()).build().unwrap();

    assert!(verify_design(balanced.matrix(), balanced.params()).is_valid);
    assert!(
        balanced.report().element_stats.std_dev <= plain.report().element_stats.std_dev
    );
}

#[cfg(feature = "serde")]
#[test]
fn design_serializes_to_json() {
    let design = DesignBuilder::new()
        .elements(5)
        .tasks_per_respondent(2)
        .respondents(2)
        .active_range(1, 3)
        .seed(4)
        .build()
        .unwrap();

    let json = serde_json::to_string(design.matrix()).unwrap();
    let back: iped::DesignMatrix = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, design.matrix());

    let report = serde_json::to_value(design.report()).unwrap();
    assert_eq!(report["num_tasks"], 4);
}
