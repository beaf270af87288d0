//! Conditional probability tables.
//!
//! A table is a flat list of rows keyed by `(parent values..., value)`.
//! Root variables use an empty parent key. Tables built from data are
//! usually incomplete; lookups that miss are resolved by the sampler,
//! never here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{NetworkStructure, Value};
use crate::{Error, Result};

/// Ordered parent values forming the prefix of a composite key.
pub type ParentKey = SmallVec<[Value; 4]>;

/// One `(parent values, value) -> probability` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CptRow {
    #[serde(default)]
    pub parents: ParentKey,
    pub value: Value,
    pub probability: f64,
}

/// CPT for a single variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionalTable {
    rows: Vec<CptRow>,
}

impl ConditionalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditional table: `value -> mass`.
    pub fn root<I, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (V, f64)>,
        V: Into<Value>,
    {
        let mut table = Self::new();
        for (value, probability) in entries {
            table.insert(ParentKey::new(), value, probability);
        }
        table
    }

    /// Conditional table: `(parent values, value) -> mass`.
    pub fn conditional<I, P, PV, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, V, f64)>,
        P: IntoIterator<Item = PV>,
        PV: Into<Value>,
        V: Into<Value>,
    {
        let mut table = Self::new();
        for (parents, value, probability) in entries {
            let key: ParentKey = parents.into_iter().map(Into::into).collect();
            table.insert(key, value, probability);
        }
        table
    }

    /// Append a row. A later row with the same composite key shadows an
    /// earlier one when the table is indexed for sampling.
    pub fn insert<V: Into<Value>>(&mut self, parents: ParentKey, value: V, probability: f64) {
        self.rows.push(CptRow { parents, value: value.into(), probability });
    }

    pub fn rows(&self) -> &[CptRow] { &self.rows }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Distinct own-values appearing anywhere in the table, first-seen order.
    pub fn child_values(&self) -> Vec<Value> {
        let mut seen = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.value) {
                seen.push(row.value.clone());
            }
        }
        seen
    }

    /// Look up a single composite key. Last row wins on duplicates.
    pub fn probability(&self, parents: &[Value], value: &Value) -> Option<f64> {
        self.rows
            .iter()
            .rev()
            .find(|row| row.parents.as_slice() == parents && row.value == *value)
            .map(|row| row.probability)
    }

    /// Check key shape and probability ranges against the variable's parent count.
    pub fn validate(&self, variable: &str, parent_count: usize) -> Result<()> {
        for row in &self.rows {
            if row.parents.len() != parent_count {
                return Err(Error::InvalidTable {
                    variable: variable.to_string(),
                    message: format!(
                        "row for value {} has {} parent values, expected {}",
                        row.value,
                        row.parents.len(),
                        parent_count
                    ),
                });
            }
            if !row.probability.is_finite() || row.probability < 0.0 {
                return Err(Error::InvalidTable {
                    variable: variable.to_string(),
                    message: format!(
                        "row for value {} has invalid probability {}",
                        row.value, row.probability
                    ),
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<CptRow> for ConditionalTable {
    fn from_iter<I: IntoIterator<Item = CptRow>>(iter: I) -> Self {
        Self { rows: iter.into_iter().collect() }
    }
}

/// One table per variable, keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CptCollection {
    tables: BTreeMap<String, ConditionalTable>,
}

impl CptCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_table<N: Into<String>>(mut self, variable: N, table: ConditionalTable) -> Self {
        self.insert(variable, table);
        self
    }

    pub fn insert<N: Into<String>>(&mut self, variable: N, table: ConditionalTable) -> Option<ConditionalTable> {
        self.tables.insert(variable.into(), table)
    }

    pub fn get(&self, variable: &str) -> Option<&ConditionalTable> {
        self.tables.get(variable)
    }

    pub fn len(&self) -> usize { self.tables.len() }
    pub fn is_empty(&self) -> bool { self.tables.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConditionalTable)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every structure variable must have a well-formed table.
    pub fn validate_against(&self, structure: &NetworkStructure) -> Result<()> {
        for spec in structure {
            let table = self
                .get(&spec.name)
                .ok_or_else(|| Error::MissingTable(spec.name.clone()))?;
            table.validate(&spec.name, spec.parents.len())?;
        }
        Ok(())
    }
}

impl<N: Into<String>> FromIterator<(N, ConditionalTable)> for CptCollection {
    fn from_iter<I: IntoIterator<Item = (N, ConditionalTable)>>(iter: I) -> Self {
        Self { tables: iter.into_iter().map(|(k, v)| (k.into(), v)).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn weather() -> ConditionalTable {
        ConditionalTable::conditional([
            (vec!["rain"], "wet", 0.9),
            (vec!["rain"], "dry", 0.1),
            (vec!["sun"], "dry", 1.0),
        ])
    }

    #[test]
    fn test_child_values_distinct_in_order() {
        assert_eq!(weather().child_values(), vec![Value::from("wet"), Value::from("dry")]);
    }

    #[test]
    fn test_probability_last_row_wins() {
        let mut table = ConditionalTable::root([("a", 0.2)]);
        table.insert(ParentKey::new(), "a", 0.6);
        assert_eq!(table.probability(&[], &Value::from("a")), Some(0.6));
        assert_eq!(table.probability(&[], &Value::from("b")), None);
    }

    #[test]
    fn test_validate_key_shape() {
        let err = weather().validate("Ground", 2).unwrap_err();
        assert!(matches!(err, Error::InvalidTable { ref variable, .. } if variable == "Ground"));
        assert!(weather().validate("Ground", 1).is_ok());
    }

    #[test]
    fn test_validate_probability_range() {
        let mut table = ConditionalTable::new();
        table.insert(smallvec![], 1, -0.5);
        assert!(table.validate("X", 0).is_err());

        let mut table = ConditionalTable::new();
        table.insert(smallvec![], 1, f64::NAN);
        assert!(table.validate("X", 0).is_err());
    }

    #[test]
    fn test_collection_requires_every_table() {
        let structure = NetworkStructure::from_pairs([("Sky", vec![]), ("Ground", vec!["Sky"])]).unwrap();
        let cpts = CptCollection::new()
            .with_table("Sky", ConditionalTable::root([("rain", 0.5), ("sun", 0.5)]));
        assert!(matches!(
            cpts.validate_against(&structure),
            Err(Error::MissingTable(ref v)) if v == "Ground"
        ));

        let cpts = cpts.with_table("Ground", weather());
        assert!(cpts.validate_against(&structure).is_ok());
    }
}
