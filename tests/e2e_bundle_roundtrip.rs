//! Data → CPTs → bundle → reload → query.
//!
//! Exercises the table builder and the persistence format together, the
//! way a pipeline that counts once and queries later would use them.

use bayesnet::{
    read_bundle, write_bundle, BayesNet, Dataset, EstimatorConfig, NetworkStructure,
    Observations, Query, Value,
};
use bayesnet::builder::Cell;
use pretty_assertions::assert_eq;

fn v<T: Into<Value>>(x: T) -> Cell { Some(x.into()) }

/// 10 records over `court`, `issue` and `outcome = f(court, issue)`.
fn records() -> Dataset {
    let mut rows = Vec::new();
    for i in 0..10 {
        let court = if i < 6 { v("north") } else { v("south") };
        let issue = if i % 2 == 0 { v(1) } else { None };
        let outcome = match (i < 6, i % 2 == 0) {
            (true, true) => v("affirmed"),
            (true, false) => v("reversed"),
            (false, _) => v("affirmed"),
        };
        rows.push(vec![court, issue, outcome]);
    }
    Dataset::from_rows(["court", "issue", "outcome"], rows).unwrap()
}

fn structure() -> NetworkStructure {
    NetworkStructure::from_pairs([
        ("court", vec![]),
        ("issue", vec![]),
        ("outcome", vec!["court", "issue"]),
    ])
    .unwrap()
}

#[test]
fn test_built_tables_fill_missing_with_sentinel() {
    let net = BayesNet::from_dataset(&records(), structure()).unwrap();
    let issue = net.cpts().get("issue").unwrap();
    assert_eq!(issue.probability(&[], &Value::Int(1)), Some(0.5));
    assert_eq!(issue.probability(&[], &Value::Int(-1)), Some(0.5));

    let outcome = net.cpts().get("outcome").unwrap();
    assert_eq!(
        outcome.probability(&[Value::from("north"), Value::Int(-1)], &Value::from("reversed")),
        Some(1.0)
    );
}

#[test]
fn test_bundle_roundtrip_preserves_answers() {
    let net = BayesNet::from_dataset(&records(), structure()).unwrap();

    let mut buf = Vec::new();
    write_bundle(&net.to_bundle().unwrap(), &mut buf).unwrap();
    let reloaded = BayesNet::from_bundle(read_bundle(&mut buf.as_slice()).unwrap()).unwrap();

    assert_eq!(reloaded.structure(), net.structure());
    assert_eq!(reloaded.cpts(), net.cpts());

    let config = EstimatorConfig::default().with_samples(5_000).with_seed(10);
    let obs = Observations::new().with("court", "north").with("issue", -1);
    let query = Query::new("outcome", "reversed");
    let before = net.query(&obs, &query, &config).unwrap();
    let after = reloaded.query(&obs, &query, &config).unwrap();
    assert_eq!(before, after);
    assert_eq!(before.probability, 1.0);
}

#[test]
fn test_dump_is_json_with_both_parts() {
    let net = BayesNet::from_dataset(&records(), structure()).unwrap();
    let mut buf = Vec::new();
    write_bundle(&net.to_bundle().unwrap(), &mut buf).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(json["format_version"], 1);
    assert_eq!(json["structure"].as_array().unwrap().len(), 3);
    assert!(json["cpts"]["outcome"].is_array());
}
