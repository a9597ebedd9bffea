//! Custom scan parameters as a typed tree.
//!
//! Scanner-specific options are free-form nested JSON. They are built from
//! dotted assignments such as `rules.exclude.paths=vendor/`, each of which
//! creates the intermediate maps it needs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{KdtError, Result};

/// A leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Interpret a command-line value: booleans and integers are typed, the
    /// rest is kept as text.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => raw
                .parse::<i64>()
                .map(Self::Int)
                .unwrap_or_else(|_| Self::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A node of the parameter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Scalar(Scalar),
    List(Vec<ParamValue>),
    Map(BTreeMap<String, ParamValue>),
}

impl Default for ParamValue {
    fn default() -> Self {
        Self::Map(BTreeMap::new())
    }
}

impl From<Scalar> for ParamValue {
    fn from(s: Scalar) -> Self {
        Self::Scalar(s)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::Text(s.to_string()))
    }
}

impl ParamValue {
    /// An empty map.
    pub fn map() -> Self {
        Self::default()
    }

    /// Build a tree from `key.path=value` assignments, applied in order.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::map();
        for assignment in assignments {
            let (path, value) = parse_assignment(assignment.as_ref())?;
            tree.set_path(&path, value)?;
        }
        Ok(tree)
    }

    /// Whether this is an empty map.
    pub fn is_empty_map(&self) -> bool {
        matches!(self, Self::Map(m) if m.is_empty())
    }

    /// Assign `value` at a dot-delimited path, creating intermediate maps.
    ///
    /// An existing value at the final segment is replaced. Walking through a
    /// scalar or list is rejected instead of overwriting it.
    ///
    /// # Errors
    ///
    /// Returns [`KdtError::InvalidArgument`] for empty path segments, when the
    /// receiver is not a map, or when an intermediate segment holds a
    /// non-map value.
    pub fn set_path(&mut self, path: &str, value: ParamValue) -> Result<()> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(KdtError::InvalidArgument(format!(
                "invalid parameter path '{path}'"
            )));
        }

        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| KdtError::InvalidArgument("empty parameter path".to_string()))?;

        let mut node = self;
        for (depth, segment) in parents.iter().enumerate() {
            let Self::Map(map) = node else {
                return Err(not_a_map(&segments[..depth]));
            };
            node = map.entry((*segment).to_string()).or_insert_with(Self::map);
        }

        match node {
            Self::Map(map) => {
                map.insert((*last).to_string(), value);
                Ok(())
            }
            _ => Err(not_a_map(parents)),
        }
    }

    /// Look up the value at a dot-delimited path.
    pub fn get_path(&self, path: &str) -> Option<&ParamValue> {
        path.split('.').try_fold(self, |node, segment| match node {
            Self::Map(map) => map.get(segment),
            _ => None,
        })
    }
}

fn not_a_map(segments: &[&str]) -> KdtError {
    let at = if segments.is_empty() {
        "<root>".to_string()
    } else {
        segments.join(".")
    };
    KdtError::InvalidArgument(format!("parameter '{at}' is not a map"))
}

/// Split `key.path=value` into its path and parsed value.
pub fn parse_assignment(raw: &str) -> Result<(String, ParamValue)> {
    let (path, value) = raw.split_once('=').ok_or_else(|| {
        KdtError::InvalidArgument(format!("expected key=value, got '{raw}'"))
    })?;
    let path = path.trim();
    if path.is_empty() {
        return Err(KdtError::InvalidArgument(format!(
            "missing key in '{raw}'"
        )));
    }
    Ok((path.to_string(), ParamValue::Scalar(Scalar::parse(value))))
}
