//! Network structure: variables with their ordered parent lists.
//!
//! The entry order IS the sampling order. Construction validates it is a
//! topological order, so every consumer can rely on parents having been
//! visited before their children.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One `(variable_name, parent_names)` entry.
///
/// Parent order is significant: it fixes the shape of the composite key
/// used to look up conditional rows for this variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub name: String,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl VariableSpec {
    pub fn new<N, I, P>(name: N, parents: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            name: name.into(),
            parents: parents.into_iter().map(Into::into).collect(),
        }
    }

    /// Shorthand for a variable without parents.
    pub fn root<N: Into<String>>(name: N) -> Self {
        Self { name: name.into(), parents: Vec::new() }
    }

    pub fn is_root(&self) -> bool { self.parents.is_empty() }
}

/// Topologically ordered, immutable list of variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<VariableSpec>", into = "Vec<VariableSpec>")]
pub struct NetworkStructure {
    variables: Vec<VariableSpec>,
    positions: HashMap<String, usize>,
}

impl NetworkStructure {
    /// Build a structure from entries that are already in topological order.
    ///
    /// Fails on duplicate names, self-parents, repeated parents, and any
    /// parent that is not defined by a strictly earlier entry.
    pub fn new<I>(variables: I) -> Result<Self>
    where
        I: IntoIterator<Item = VariableSpec>,
    {
        let variables: Vec<VariableSpec> = variables.into_iter().collect();
        let mut positions = HashMap::with_capacity(variables.len());

        for (idx, spec) in variables.iter().enumerate() {
            if positions.contains_key(&spec.name) {
                return Err(Error::InvalidStructure(format!(
                    "variable '{}' is declared more than once",
                    spec.name
                )));
            }
            for (i, parent) in spec.parents.iter().enumerate() {
                if *parent == spec.name {
                    return Err(Error::InvalidStructure(format!(
                        "variable '{}' lists itself as a parent",
                        spec.name
                    )));
                }
                if spec.parents[..i].contains(parent) {
                    return Err(Error::InvalidStructure(format!(
                        "variable '{}' lists parent '{}' twice",
                        spec.name, parent
                    )));
                }
                if !positions.contains_key(parent) {
                    return Err(Error::NotTopological {
                        variable: spec.name.clone(),
                        parent: parent.clone(),
                    });
                }
            }
            positions.insert(spec.name.clone(), idx);
        }

        Ok(Self { variables, positions })
    }

    /// Build from `(name, parents)` pairs already in topological order.
    pub fn from_pairs<I, N, P, Q>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: IntoIterator<Item = Q>,
        Q: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(name, parents)| VariableSpec::new(name, parents)))
    }

    /// Order arbitrary entries so every parent precedes its children.
    ///
    /// Depth-first over parents; ties keep the input order, so an input that
    /// is already topological comes back unchanged.
    pub fn sort_topologically<I>(variables: I) -> Result<Self>
    where
        I: IntoIterator<Item = VariableSpec>,
    {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark { Unvisited, Active, Done }

        fn visit(
            idx: usize,
            specs: &[VariableSpec],
            index: &HashMap<&str, usize>,
            marks: &mut [Mark],
            ordered: &mut Vec<usize>,
        ) -> Result<()> {
            match marks[idx] {
                Mark::Done => return Ok(()),
                Mark::Active => {
                    return Err(Error::InvalidStructure(format!(
                        "cycle detected through variable '{}'",
                        specs[idx].name
                    )));
                }
                Mark::Unvisited => {}
            }
            marks[idx] = Mark::Active;
            for parent in &specs[idx].parents {
                let &p = index.get(parent.as_str()).ok_or_else(|| {
                    Error::InvalidStructure(format!(
                        "variable '{}' has undeclared parent '{}'",
                        specs[idx].name, parent
                    ))
                })?;
                visit(p, specs, index, marks, ordered)?;
            }
            marks[idx] = Mark::Done;
            ordered.push(idx);
            Ok(())
        }

        let specs: Vec<VariableSpec> = variables.into_iter().collect();
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            if index.insert(spec.name.as_str(), i).is_some() {
                return Err(Error::InvalidStructure(format!(
                    "variable '{}' is declared more than once",
                    spec.name
                )));
            }
        }

        let mut marks = vec![Mark::Unvisited; specs.len()];
        let mut ordered = Vec::with_capacity(specs.len());
        for i in 0..specs.len() {
            visit(i, &specs, &index, &mut marks, &mut ordered)?;
        }
        drop(index);

        let mut slots: Vec<Option<VariableSpec>> = specs.into_iter().map(Some).collect();
        Self::new(ordered.into_iter().filter_map(|i| slots[i].take()))
    }

    pub fn len(&self) -> usize { self.variables.len() }
    pub fn is_empty(&self) -> bool { self.variables.is_empty() }

    /// Entries in sampling order.
    pub fn variables(&self) -> &[VariableSpec] { &self.variables }

    pub fn iter(&self) -> std::slice::Iter<'_, VariableSpec> { self.variables.iter() }

    /// Topological position of a variable.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool { self.positions.contains_key(name) }

    pub fn get(&self, name: &str) -> Option<&VariableSpec> {
        self.position(name).map(|i| &self.variables[i])
    }

    pub fn parents_of(&self, name: &str) -> Option<&[String]> {
        self.get(name).map(|spec| spec.parents.as_slice())
    }

    /// Variable names in sampling order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|spec| spec.name.as_str())
    }
}

impl TryFrom<Vec<VariableSpec>> for NetworkStructure {
    type Error = Error;

    fn try_from(variables: Vec<VariableSpec>) -> Result<Self> {
        Self::new(variables)
    }
}

impl From<NetworkStructure> for Vec<VariableSpec> {
    fn from(structure: NetworkStructure) -> Self {
        structure.variables
    }
}

impl<'a> IntoIterator for &'a NetworkStructure {
    type Item = &'a VariableSpec;
    type IntoIter = std::slice::Iter<'a, VariableSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.iter()
    }
}
