//! Discrete value type carried by every variable in the network.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A categorical value a variable can take.
///
/// Only discrete kinds are modelled:
/// - `Bool` for binary indicators
/// - `Int` for coded categories (the tabular builder fills missing
///   numeric cells with `Int(-1)`)
/// - `String` for labels (missing categorical cells become `"MISSING"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Bool(bool),
    Int(i64),
    String(String),
}

/// Sentinel for a missing categorical cell.
pub const MISSING_LABEL: &str = "MISSING";

/// Sentinel for a missing numeric cell.
pub const MISSING_CODE: i64 = -1;

// ============================================================================
// Type checking
// ============================================================================

impl Value {
    pub fn is_int(&self) -> bool { matches!(self, Value::Int(_)) }

    /// Attempt to extract as &str
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<i32> for Value { fn from(v: i32) -> Self { Value::Int(v as i64) } }
impl From<i64> for Value { fn from(v: i64) -> Self { Value::Int(v) } }
impl From<u32> for Value { fn from(v: u32) -> Self { Value::Int(v as i64) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::String(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::String(v.to_owned()) } }

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::String(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
        }
    }
}
