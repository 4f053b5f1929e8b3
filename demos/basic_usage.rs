//! Basic usage example for the iped library.
//!
//! Generates a 16-element grid design for 200 respondents, prints the
//! balance report, then runs the optional rebalancing pass for comparison.
//!
//! Run with `RUST_LOG=iped=debug` to see the pipeline logs.

use iped::policy::recommend_parameters;
use iped::{verify_design, DesignBuilder, RebalanceConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "iped=info".into()))
        .init();

    println!("IPED Library - Basic Usage Example\n");

    let rec = recommend_parameters(16, 200, 24).expect("policy failed");
    for note in &rec.notes {
        println!("Policy: {note}");
    }
    println!("Parameters: {}\n", rec.params);

    let design = DesignBuilder::from_params(&rec.params)
        .options(rec.options())
        .seed(2024)
        .build()
        .expect("Failed to generate design");

    println!(
        "Pool: {} candidates from {} draws",
        design.pool_size(),
        design.pool_attempts()
    );
    println!("{}", design.report());

    let result = verify_design(design.matrix(), design.params());
    if result.is_valid {
        println!("✓ Design satisfies all structural invariants");
    } else {
        println!("✗ Design failed verification");
        for issue in &result.issues {
            println!("  Issue: {issue:?}");
        }
    }

    // First respondent's sequence
    if let Some(seq) = design.matrix().sequence(0) {
        println!("\nSequence {}:", seq.label());
        for task in seq.tasks() {
            println!("  {}  {}", task.id(), task.pattern());
        }
    }

    println!("\nWith rebalancing (variable active count 2..=4):");
    let balanced = DesignBuilder::new()
        .elements(16)
        .tasks_per_respondent(24)
        .respondents(200)
        .active_range(2, 4)
        .seed(2024)
        .rebalance(RebalanceConfig::default())
        .build()
        .expect("Failed to generate design");
    let stats = balanced.report().element_stats;
    println!(
        "  element counts {}..={}, std {:.2}, cv {:.4}",
        stats.min,
        stats.max,
        stats.std_dev,
        stats.coefficient_of_variation()
    );
}
