//! Backend-agnostic equality filters.
//!
//! # Responsibility
//! - Hold an insertion-ordered list of `(key, value)` equality constraints.
//! - Stay free of any storage vocabulary; adapters translate the list.
//!
//! # Invariants
//! - Constraints combine with logical AND; there is no OR, range or negation.
//! - Key names are not validated. Unknown keys simply match nothing.

use std::fmt::{Display, Formatter};

/// Scalar value a field can be compared against.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Text(String),
    Bool(bool),
    Integer(i64),
    Float(f64),
}

impl Display for QueryValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// One equality constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParam {
    pub key: String,
    pub value: QueryValue,
}

impl QueryParam {
    pub fn new(key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered equality constraints, ANDed when used as a filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    params: Vec<QueryParam>,
}

impl QueryParams {
    /// Creates an empty list, which matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a constraint and returns the list for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.push(QueryParam::new(key, value));
        self
    }

    /// Appends a constraint in place.
    pub fn push(&mut self, param: QueryParam) {
        self.params.push(param);
    }

    pub fn params(&self) -> &[QueryParam] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Comma-separated key list, used for log lines.
    pub fn keys_summary(&self) -> String {
        self.params
            .iter()
            .map(|param| param.key.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromIterator<QueryParam> for QueryParams {
    fn from_iter<I: IntoIterator<Item = QueryParam>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{QueryParam, QueryParams, QueryValue};

    #[test]
    fn with_preserves_insertion_order() {
        let params = QueryParams::new()
            .with("characterID", "c-1")
            .with("targetID", "npc-7")
            .with("isOnline", true);

        let keys: Vec<_> = params.params().iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["characterID", "targetID", "isOnline"]);
        assert_eq!(params.params()[2].value, QueryValue::Bool(true));
        assert_eq!(params.keys_summary(), "characterID,targetID,isOnline");
    }

    #[test]
    fn duplicate_keys_are_kept() {
        let params = QueryParams::new().with("name", "a").with("name", "b");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn collects_from_iterator() {
        let params: QueryParams = vec![QueryParam::new("level", 3), QueryParam::new("slot", "head")]
            .into_iter()
            .collect();
        assert_eq!(params.params()[0].value, QueryValue::Integer(3));
        assert!(!params.is_empty());
    }
}
