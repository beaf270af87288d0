//! Samples, observations and queries.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::Value;

/// A drawn value; `None` means undefined (no data to draw from).
pub type SampleValue = Option<Value>;

/// One complete joint assignment produced by forward sampling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    values: HashMap<String, SampleValue>,
}

impl Sample {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { values: HashMap::with_capacity(capacity) }
    }

    pub fn insert<N: Into<String>>(&mut self, variable: N, value: SampleValue) {
        self.values.insert(variable.into(), value);
    }

    /// `None` if the variable is not part of the sample at all,
    /// `Some(None)` if it is present but undefined.
    pub fn get(&self, variable: &str) -> Option<&SampleValue> {
        self.values.get(variable)
    }

    /// The drawn value, flattening "absent" and "undefined".
    pub fn value(&self, variable: &str) -> Option<&Value> {
        self.values.get(variable).and_then(Option::as_ref)
    }

    pub fn is_defined(&self, variable: &str) -> bool {
        self.value(variable).is_some()
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.values.contains_key(variable)
    }

    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SampleValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Evidence: variables fixed to required values for one estimation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Observations {
    required: BTreeMap<String, Value>,
}

impl Observations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with<N: Into<String>, V: Into<Value>>(mut self, variable: N, value: V) -> Self {
        self.required.insert(variable.into(), value.into());
        self
    }

    pub fn insert<N: Into<String>, V: Into<Value>>(&mut self, variable: N, value: V) {
        self.required.insert(variable.into(), value.into());
    }

    pub fn get(&self, variable: &str) -> Option<&Value> {
        self.required.get(variable)
    }

    pub fn len(&self) -> usize { self.required.len() }
    pub fn is_empty(&self) -> bool { self.required.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.required.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for Observations {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            required: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// The event `target = value` whose conditional probability is estimated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub target: String,
    pub value: Value,
}

impl Query {
    pub fn new<N: Into<String>, V: Into<Value>>(target: N, value: V) -> Self {
        Self { target: target.into(), value: value.into() }
    }
}
