//! End-to-end tests for rejection-sampling estimates.
//!
//! Each test goes: tables → BayesNet → query → Estimate, with seeded
//! random sources so tolerances are stable.

use bayesnet::{
    BayesNet, ConditionalTable, CptCollection, EstimatorConfig, NetworkStructure,
    Observations, Query,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ============================================================================
// Helpers
// ============================================================================

/// A ∈ {0, 1} uniform, B = A deterministically.
fn copy_net() -> BayesNet {
    let structure = NetworkStructure::from_pairs([("A", vec![]), ("B", vec!["A"])]).unwrap();
    let cpts = CptCollection::new()
        .with_table("A", ConditionalTable::root([(0, 0.5), (1, 0.5)]))
        .with_table("B", ConditionalTable::conditional([
            (vec![0], 0, 1.0),
            (vec![1], 1, 1.0),
        ]));
    BayesNet::new(structure, cpts).unwrap()
}

/// P(A) = {0: 0.3, 1: 0.7}; P(B | A) mixes 'x' and 'y'.
fn scenario_net() -> BayesNet {
    let structure = NetworkStructure::from_pairs([("A", vec![]), ("B", vec!["A"])]).unwrap();
    let cpts = CptCollection::new()
        .with_table("A", ConditionalTable::root([(0, 0.3), (1, 0.7)]))
        .with_table("B", ConditionalTable::conditional([
            (vec![0], "x", 0.9),
            (vec![0], "y", 0.1),
            (vec![1], "x", 0.2),
            (vec![1], "y", 0.8),
        ]));
    BayesNet::new(structure, cpts).unwrap()
}

// ============================================================================
// 1. Marginal and conditional on the copy network
// ============================================================================

#[test]
fn test_copy_network_marginal() {
    let net = copy_net();
    let config = EstimatorConfig::default().with_samples(40_000).with_seed(1);
    let e = net.query(&Observations::new(), &Query::new("B", 1), &config).unwrap();
    assert_eq!(e.accepted, 40_000);
    assert!((e.probability - 0.5).abs() < 0.02, "p = {}", e.probability);
}

#[test]
fn test_copy_network_conditioned() {
    let net = copy_net();
    let config = EstimatorConfig::default().with_samples(10_000).with_seed(2);
    let e = net
        .query(&Observations::new().with("A", 1), &Query::new("B", 1), &config)
        .unwrap();
    assert_eq!(e.probability, 1.0);
    assert!((e.acceptance_rate() - 0.5).abs() < 0.03);
}

// ============================================================================
// 2. Worked scenario: P(B = x) = 0.3·0.9 + 0.7·0.2 = 0.41
// ============================================================================

#[test]
fn test_scenario_marginal() {
    let net = scenario_net();
    let config = EstimatorConfig::default().with_samples(50_000).with_seed(50_000);
    let e = net.query(&Observations::new(), &Query::new("B", "x"), &config).unwrap();
    assert!((e.probability - 0.41).abs() < 0.02, "p = {}", e.probability);
}

#[test]
fn test_scenario_posterior_of_parent() {
    // P(A = 0 | B = x) = 0.27 / 0.41
    let net = scenario_net();
    let mut rng = StdRng::seed_from_u64(9);
    let e = net
        .estimate(&Observations::new().with("B", "x"), &Query::new("A", 0), 80_000, &mut rng)
        .unwrap();
    assert!((e.probability - 0.27 / 0.41).abs() < 0.02, "p = {}", e.probability);
}

// ============================================================================
// 3. Zero acceptance is reported, not hidden
// ============================================================================

#[test]
fn test_impossible_evidence_reports_zero_acceptance() {
    let net = copy_net();
    let config = EstimatorConfig::default().with_samples(5_000).with_seed(3);
    let e = net
        .query(&Observations::new().with("A", 0).with("B", 1), &Query::new("B", 1), &config)
        .unwrap();
    assert_eq!(e.probability, 0.0);
    assert_eq!(e.accepted, 0);
    assert_eq!(e.matched, 0);
    assert_eq!(e.samples, 5_000);
    assert_eq!(e.conditional(), None);
}

#[test]
fn test_estimated_zero_differs_from_no_data() {
    let net = copy_net();
    let config = EstimatorConfig::default().with_samples(5_000).with_seed(4);
    let e = net
        .query(&Observations::new().with("A", 0), &Query::new("B", 1), &config)
        .unwrap();
    assert_eq!(e.probability, 0.0);
    assert!(e.accepted > 0);
    assert_eq!(e.conditional(), Some(0.0));
}

#[test]
fn test_evidence_on_undefined_variable_is_rejected() {
    // A has no data, so B is undefined in every draw and B = 1 never holds.
    let structure = NetworkStructure::from_pairs([("A", vec![]), ("B", vec!["A"])]).unwrap();
    let cpts = CptCollection::new()
        .with_table("A", ConditionalTable::new())
        .with_table("B", ConditionalTable::conditional([(vec![1], 1, 1.0)]));
    let net = BayesNet::new(structure, cpts).unwrap();
    let config = EstimatorConfig::default().with_samples(100).with_seed(6);
    let e = net
        .query(&Observations::new().with("B", 1), &Query::new("B", 1), &config)
        .unwrap();
    assert_eq!(e.samples, 100);
    assert_eq!(e.accepted, 0);
    assert_eq!(e.matched, 0);
    assert_eq!(e.probability, 0.0);
}

// ============================================================================
// 4. Configuration errors surface before sampling
// ============================================================================

#[test]
fn test_invalid_config_rejected() {
    let net = copy_net();
    let config = EstimatorConfig::default().with_samples(0);
    assert!(net.query(&Observations::new(), &Query::new("B", 1), &config).is_err());
}

#[test]
fn test_same_seed_same_estimate() {
    let net = scenario_net();
    let config = EstimatorConfig::default().with_samples(3_000).with_seed(123);
    let obs = Observations::new().with("A", 1);
    let a = net.query(&obs, &Query::new("B", "y"), &config).unwrap();
    let b = net.query(&obs, &Query::new("B", "y"), &config).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_workers_config_still_answers() {
    // Falls back to sequential sampling when built without `parallel`.
    let net = scenario_net();
    let config = EstimatorConfig::default().with_samples(20_000).with_seed(5).with_workers(3);
    let e = net.query(&Observations::new(), &Query::new("B", "x"), &config).unwrap();
    assert_eq!(e.samples, 20_000);
    assert!((e.probability - 0.41).abs() < 0.025, "p = {}", e.probability);
}
