//! Ancestral (forward) sampling.
//!
//! `SampleGenerator::new` validates the network once and indexes every
//! conditional table by parent key, so a draw is one hash lookup per
//! variable instead of a table scan.
//!
//! Missing information never fails a draw:
//!
//! | Situation | Resolution |
//! |-----------|------------|
//! | empty root table | undefined |
//! | zero total mass | uniform over the listed values |
//! | undefined parent | undefined, propagated to descendants |
//! | unseen parent combination | uniform over every value the table mentions |

use hashbrown::HashMap;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use smallvec::SmallVec;
use tracing::debug;

use crate::model::*;
use crate::Result;

// ============================================================================
// Choice: a ready-to-draw distribution over candidate values
// ============================================================================

#[derive(Debug, Clone)]
enum Choice {
    /// Nothing to draw from.
    Empty,
    Uniform(Vec<Value>),
    Weighted { values: Vec<Value>, index: WeightedIndex<f64> },
}

impl Choice {
    fn uniform(values: Vec<Value>) -> Self {
        if values.is_empty() { Choice::Empty } else { Choice::Uniform(values) }
    }

    fn weighted(values: Vec<Value>, weights: &[f64]) -> Self {
        if values.is_empty() {
            return Choice::Empty;
        }
        let total: f64 = weights.iter().sum();
        if total == 0.0 {
            return Choice::Uniform(values);
        }
        // Finite weights can still overflow when summed; rescale by the
        // largest weight first so the normalized masses stay finite.
        let scale = if total.is_finite() {
            total
        } else {
            weights.iter().copied().fold(0.0, f64::max)
        };
        let normalized: Vec<f64> = weights.iter().map(|w| w / scale).collect();
        match WeightedIndex::new(&normalized) {
            Ok(index) => Choice::Weighted { values, index },
            // Unreachable for validated tables: masses are non-negative,
            // finite and not all zero after normalization.
            Err(_) => Choice::Uniform(values),
        }
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> SampleValue {
        match self {
            Choice::Empty => None,
            Choice::Uniform(values) => Some(values[rng.gen_range(0..values.len())].clone()),
            Choice::Weighted { values, index } => Some(values[index.sample(rng)].clone()),
        }
    }
}

/// Collect `(value, weight)` pairs, letting a repeated value overwrite its
/// earlier weight while keeping first-seen order.
#[derive(Default)]
struct Candidates {
    values: Vec<Value>,
    weights: Vec<f64>,
}

impl Candidates {
    fn push(&mut self, value: &Value, weight: f64) {
        match self.values.iter().position(|v| v == value) {
            Some(i) => self.weights[i] = weight,
            None => {
                self.values.push(value.clone());
                self.weights.push(weight);
            }
        }
    }

    fn into_choice(self) -> Choice {
        Choice::weighted(self.values, &self.weights)
    }
}

// ============================================================================
// Per-variable samplers
// ============================================================================

#[derive(Debug, Clone)]
enum NodeSampler {
    Root(Choice),
    Child {
        /// Slot indices of the parents, in key order.
        parents: SmallVec<[usize; 4]>,
        groups: HashMap<ParentKey, Choice>,
        /// Backoff for parent keys the table never saw.
        unseen: Choice,
    },
}

impl NodeSampler {
    fn root(table: &ConditionalTable) -> Self {
        let mut candidates = Candidates::default();
        for row in table.rows() {
            candidates.push(&row.value, row.probability);
        }
        NodeSampler::Root(candidates.into_choice())
    }

    fn child(table: &ConditionalTable, parents: SmallVec<[usize; 4]>) -> Self {
        let mut grouped: HashMap<ParentKey, Candidates> = HashMap::new();
        for row in table.rows() {
            grouped
                .entry_ref(row.parents.as_slice())
                .or_insert_with(Candidates::default)
                .push(&row.value, row.probability);
        }
        let groups = grouped
            .into_iter()
            .map(|(key, candidates)| (key, candidates.into_choice()))
            .collect();
        NodeSampler::Child {
            parents,
            groups,
            unseen: Choice::uniform(table.child_values()),
        }
    }
}

// ============================================================================
// SampleGenerator
// ============================================================================

/// Draws complete assignments from a validated, indexed network.
///
/// Read-only after construction; share it by reference across threads and
/// give each thread its own random source.
#[derive(Debug, Clone)]
pub struct SampleGenerator {
    names: Vec<String>,
    slots: HashMap<String, usize>,
    nodes: Vec<NodeSampler>,
}

impl SampleGenerator {
    /// Validate `cpts` against `structure` and index every table.
    ///
    /// Fails only on configuration mistakes: a variable without a table, or
    /// a table whose keys do not fit the variable's parent list.
    pub fn new(structure: &NetworkStructure, cpts: &CptCollection) -> Result<Self> {
        cpts.validate_against(structure)?;

        let mut names = Vec::with_capacity(structure.len());
        let mut slots = HashMap::with_capacity(structure.len());
        let mut nodes = Vec::with_capacity(structure.len());

        for (slot, spec) in structure.iter().enumerate() {
            let table = cpts
                .get(&spec.name)
                .ok_or_else(|| crate::Error::MissingTable(spec.name.clone()))?;

            let node = if spec.is_root() {
                NodeSampler::root(table)
            } else {
                // Structure construction guarantees every parent has an
                // earlier slot.
                let parents = spec
                    .parents
                    .iter()
                    .map(|p| {
                        slots.get(p.as_str()).copied().ok_or_else(|| crate::Error::NotTopological {
                            variable: spec.name.clone(),
                            parent: p.clone(),
                        })
                    })
                    .collect::<Result<SmallVec<[usize; 4]>>>()?;
                NodeSampler::child(table, parents)
            };

            names.push(spec.name.clone());
            slots.insert(spec.name.clone(), slot);
            nodes.push(node);
        }

        debug!(variables = names.len(), rows = cpts.iter().map(|(_, t)| t.len()).sum::<usize>(),
            "sample generator ready");

        Ok(Self { names, slots, nodes })
    }

    /// Variable names in sampling order.
    pub fn variables(&self) -> &[String] { &self.names }

    /// Sampling position of a variable.
    pub fn slot(&self, variable: &str) -> Option<usize> {
        self.slots.get(variable).copied()
    }

    /// Draw one complete assignment.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Sample {
        let mut values = Vec::with_capacity(self.nodes.len());
        self.draw_into(rng, &mut values);

        let mut sample = Sample::with_capacity(self.names.len());
        for (name, value) in self.names.iter().zip(values) {
            sample.insert(name.clone(), value);
        }
        sample
    }

    /// Draw into a reusable buffer indexed by slot.
    pub fn draw_into<R: Rng + ?Sized>(&self, rng: &mut R, values: &mut Vec<SampleValue>) {
        values.clear();
        let mut key = ParentKey::new();

        for node in &self.nodes {
            let drawn = match node {
                NodeSampler::Root(choice) => choice.draw(rng),
                NodeSampler::Child { parents, groups, unseen } => {
                    key.clear();
                    let complete = parents.iter().all(|&p| match &values[p] {
                        Some(v) => {
                            key.push(v.clone());
                            true
                        }
                        None => false,
                    });
                    if !complete {
                        None
                    } else {
                        match groups.get(key.as_slice()) {
                            Some(choice) => choice.draw(rng),
                            None => unseen.draw(rng),
                        }
                    }
                }
            };
            values.push(drawn);
        }
    }
}

/// One-shot forward sample: validate, index, draw.
///
/// Prefer building a [`SampleGenerator`] once when drawing repeatedly.
pub fn draw_sample<R: Rng + ?Sized>(
    cpts: &CptCollection,
    structure: &NetworkStructure,
    rng: &mut R,
) -> Result<Sample> {
    Ok(SampleGenerator::new(structure, cpts)?.draw(rng))
}
