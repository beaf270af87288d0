//! CPT construction from tabular records.
//!
//! Probabilities are plain frequency ratios:
//!
//! ```text
//! root:   P(X = x)          = count(x) / records
//! child:  P(X = x | Pa = p) = count(p, x) / count(p)
//! ```
//!
//! Missing cells are filled before counting, so "missing" becomes an
//! ordinary category: `Int(-1)` for integer columns, `"MISSING"` otherwise.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::model::*;
use crate::{Error, Result};

/// A cell; `None` is a missing entry.
pub type Cell = Option<Value>;

/// Column-named records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    pub fn new<I, N>(columns: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build from columns and rows in one go.
    pub fn from_rows<I, N>(columns: I, rows: Vec<Vec<Cell>>) -> Result<Self>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let mut dataset = Self::new(columns);
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::InvalidDataset(format!(
                "row {} has {} cells, expected {}",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] { &self.columns }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// A column with missing cells replaced by the column's sentinel.
    pub fn filled_column(&self, name: &str) -> Result<Vec<Value>> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))?;

        let numeric = self
            .rows
            .iter()
            .filter_map(|row| row[idx].as_ref())
            .all(Value::is_int);
        let sentinel = if numeric {
            Value::Int(MISSING_CODE)
        } else {
            Value::String(MISSING_LABEL.to_string())
        };

        Ok(self
            .rows
            .iter()
            .map(|row| row[idx].clone().unwrap_or_else(|| sentinel.clone()))
            .collect())
    }
}

/// Count frequencies in `dataset` and emit one table per structure variable.
///
/// Rows come out sorted by composite key, so the same data always yields
/// the same tables.
pub fn build_cpts(dataset: &Dataset, structure: &NetworkStructure) -> Result<CptCollection> {
    let mut filled: BTreeMap<&str, Vec<Value>> = BTreeMap::new();
    for spec in structure {
        filled.insert(spec.name.as_str(), dataset.filled_column(&spec.name)?);
    }

    let total = dataset.len();
    let mut cpts = CptCollection::new();

    for spec in structure {
        let column = &filled[spec.name.as_str()];
        let table: ConditionalTable = if spec.is_root() {
            let mut counts: BTreeMap<&Value, u64> = BTreeMap::new();
            for value in column {
                *counts.entry(value).or_default() += 1;
            }
            ConditionalTable::root(
                counts
                    .into_iter()
                    .map(|(value, count)| (value.clone(), count as f64 / total as f64)),
            )
        } else {
            let parents: Vec<&Vec<Value>> = spec
                .parents
                .iter()
                .map(|p| &filled[p.as_str()])
                .collect();

            let mut parent_counts: BTreeMap<ParentKey, u64> = BTreeMap::new();
            let mut joint_counts: BTreeMap<(ParentKey, &Value), u64> = BTreeMap::new();
            for (row, value) in column.iter().enumerate() {
                let key: ParentKey = parents.iter().map(|col| col[row].clone()).collect();
                *parent_counts.entry(key.clone()).or_default() += 1;
                *joint_counts.entry((key, value)).or_default() += 1;
            }

            joint_counts
                .into_iter()
                .map(|((key, value), count)| {
                    let parent_total = parent_counts.get(&key).copied().unwrap_or(0);
                    let probability = if parent_total > 0 {
                        count as f64 / parent_total as f64
                    } else {
                        0.0
                    };
                    CptRow { parents: key, value: value.clone(), probability }
                })
                .collect()
        };

        trace!(variable = %spec.name, rows = table.len(), "built conditional table");
        cpts.insert(spec.name.clone(), table);
    }

    debug!(variables = structure.len(), records = total, "CPT construction complete");
    Ok(cpts)
}
