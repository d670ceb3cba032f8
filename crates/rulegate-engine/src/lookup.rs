//! Nested multi-level lookup for parameterized rule thresholds.
//!
//! A recursive, key-indexed value tree with the call style
//! `lookup.at("Default").at("FTB").at("MinLoan").as_i64()`. Navigating to a
//! missing key creates and stores an empty child instead of signaling
//! absence, so navigation is always safe to write even for unconfigured
//! paths — at the cost of the tree growing with every distinct key ever
//! queried. That trade makes the structure unsuitable for untrusted or
//! unbounded key spaces.
//!
//! [`NestedLookup::is_defined`] is the true presence check: it never
//! triggers the lazy-creation side effect.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::LookupError;

/// Value stored at a lookup node.
///
/// A small closed set of kinds, so a bad coercion is a typed
/// [`LookupError::Coercion`] rather than a best-effort runtime cast.
#[derive(Clone, Debug, PartialEq)]
pub enum LookupValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl LookupValue {
    fn kind(&self) -> &'static str {
        match self {
            LookupValue::Int(_) => "int",
            LookupValue::Float(_) => "float",
            LookupValue::Bool(_) => "bool",
            LookupValue::Str(_) => "string",
        }
    }
}

impl From<i64> for LookupValue {
    fn from(v: i64) -> Self {
        LookupValue::Int(v)
    }
}

impl From<i32> for LookupValue {
    fn from(v: i32) -> Self {
        LookupValue::Int(v.into())
    }
}

impl From<f64> for LookupValue {
    fn from(v: f64) -> Self {
        LookupValue::Float(v)
    }
}

impl From<bool> for LookupValue {
    fn from(v: bool) -> Self {
        LookupValue::Bool(v)
    }
}

impl From<&str> for LookupValue {
    fn from(v: &str) -> Self {
        LookupValue::Str(v.to_string())
    }
}

impl From<String> for LookupValue {
    fn from(v: String) -> Self {
        LookupValue::Str(v)
    }
}

/// One node of the lookup tree: an optional stored value plus child nodes.
///
/// Nodes use interior mutability so that lazy-create navigation works
/// through shared references — rule predicates hold the table behind an
/// `Arc` — and stays safe across concurrent policy executions.
pub struct NestedLookup<K> {
    value: RwLock<Option<LookupValue>>,
    children: RwLock<HashMap<K, Arc<NestedLookup<K>>>>,
}

impl<K: Eq + Hash> Default for NestedLookup<K> {
    fn default() -> Self {
        Self {
            value: RwLock::new(None),
            children: RwLock::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash> NestedLookup<K> {
    /// Builds a tree by inserting every item's path/value pair in sequence
    /// order. Fails with [`LookupError::EmptyKeyPath`] if any path is empty.
    pub fn new<Items, Path, Key, Value>(items: Items) -> Result<Self, LookupError>
    where
        Items: IntoIterator<Item = (Path, Value)>,
        Path: IntoIterator<Item = Key>,
        Key: Into<K>,
        Value: Into<LookupValue>,
    {
        let root = Self::default();
        for (path, value) in items {
            root.insert(path, value)?;
        }
        Ok(root)
    }

    /// Stores `value` at `path`, overwriting any value already at that leaf.
    pub fn insert<Path, Key, Value>(&self, path: Path, value: Value) -> Result<(), LookupError>
    where
        Path: IntoIterator<Item = Key>,
        Key: Into<K>,
        Value: Into<LookupValue>,
    {
        let mut keys = path.into_iter();
        let first = keys.next().ok_or(LookupError::EmptyKeyPath)?;

        let mut node = self.at(first);
        for key in keys {
            let next = node.at(key);
            node = next;
        }
        *node.value.write() = Some(value.into());
        Ok(())
    }

    /// Returns the child subtree for `key`, creating and storing an empty
    /// subtree first if none exists. Repeated misses against the same key
    /// return the same node.
    pub fn at(&self, key: impl Into<K>) -> Arc<NestedLookup<K>> {
        let key = key.into();
        if let Some(child) = self.children.read().get(&key) {
            return Arc::clone(child);
        }
        Arc::clone(
            self.children
                .write()
                .entry(key)
                .or_insert_with(|| Arc::new(Self::default())),
        )
    }

    /// True iff a child for `key` already exists as a stored node. Never
    /// mutates.
    pub fn is_defined(&self, key: impl Into<K>) -> bool {
        self.children.read().contains_key(&key.into())
    }

    /// The stored value as an integer; `0` if the node holds no value.
    pub fn as_i64(&self) -> Result<i64, LookupError> {
        match &*self.value.read() {
            None => Ok(0),
            Some(LookupValue::Int(v)) => Ok(*v),
            Some(other) => Err(LookupError::Coercion {
                from: other.kind(),
                to: "i64",
            }),
        }
    }

    /// The stored value as a float; `0.0` if the node holds no value.
    /// Integers widen losslessly.
    pub fn as_f64(&self) -> Result<f64, LookupError> {
        match &*self.value.read() {
            None => Ok(0.0),
            Some(LookupValue::Float(v)) => Ok(*v),
            Some(LookupValue::Int(v)) => Ok(*v as f64),
            Some(other) => Err(LookupError::Coercion {
                from: other.kind(),
                to: "f64",
            }),
        }
    }

    /// The stored value as a boolean; `false` if the node holds no value.
    pub fn as_bool(&self) -> Result<bool, LookupError> {
        match &*self.value.read() {
            None => Ok(false),
            Some(LookupValue::Bool(v)) => Ok(*v),
            Some(other) => Err(LookupError::Coercion {
                from: other.kind(),
                to: "bool",
            }),
        }
    }

    /// The stored value, only if it is a string. No stringification of
    /// other kinds.
    pub fn as_str(&self) -> Option<String> {
        match &*self.value.read() {
            Some(LookupValue::Str(v)) => Some(v.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mortgage_table() -> NestedLookup<String> {
        NestedLookup::new([
            (["Default", "FTB", "MinLoan"], LookupValue::from(100_000)),
            (["Default", "FTB", "MaxLoan"], LookupValue::from(420_000)),
            (["Default", "FTB", "MinApplicantAge"], LookupValue::from(25)),
            (["Default", "FTB", "MinLTV"], LookupValue::from(95.0)),
            (["Default", "BTL", "MinLoan"], LookupValue::from(200_000)),
            (["Default", "BTL", "String"], LookupValue::from("test")),
        ])
        .unwrap()
    }

    #[test]
    fn single_key_values_resolve() {
        let lookup = NestedLookup::<String>::new([
            (["Key1"], LookupValue::from(123)),
            (["Key2"], LookupValue::from(456)),
        ])
        .unwrap();

        assert_eq!(lookup.at("Key1").as_i64(), Ok(123));
        assert_eq!(lookup.at("Key2").as_i64(), Ok(456));
    }

    #[test]
    fn multi_key_values_resolve() {
        let lookup = NestedLookup::<String>::new([
            (vec!["Key11", "Key12"], LookupValue::from(123)),
            (vec!["Key21", "Key22", "Key23"], LookupValue::from(456)),
        ])
        .unwrap();

        assert_eq!(lookup.at("Key11").at("Key12").as_i64(), Ok(123));
        assert_eq!(lookup.at("Key21").at("Key22").at("Key23").as_i64(), Ok(456));
    }

    #[test]
    fn unset_nodes_coerce_to_zero_values() {
        let lookup = mortgage_table();
        let missing = lookup.at("Default").at("FTB").at("MinLoanxxx");
        assert_eq!(missing.as_i64(), Ok(0));
        assert_eq!(missing.as_f64(), Ok(0.0));
        assert_eq!(missing.as_bool(), Ok(false));
        assert_eq!(missing.as_str(), None);
    }

    #[test]
    fn string_values_only_resolve_as_strings() {
        let lookup = mortgage_table();
        assert_eq!(
            lookup.at("Default").at("BTL").at("String").as_str(),
            Some("test".to_string())
        );
        // No stringification of non-string values.
        assert_eq!(lookup.at("Default").at("FTB").at("MinLoan").as_str(), None);
    }

    #[test]
    fn wrong_kind_coercion_is_a_typed_error() {
        let lookup = mortgage_table();
        assert_eq!(
            lookup.at("Default").at("FTB").at("MinLTV").as_i64(),
            Err(LookupError::Coercion {
                from: "float",
                to: "i64"
            })
        );
        // Int widens to f64.
        assert_eq!(lookup.at("Default").at("FTB").at("MinLoan").as_f64(), Ok(100_000.0));
    }

    #[test]
    fn is_defined_checks_presence_without_creating() {
        let lookup = mortgage_table();
        let node = lookup.at("Default");

        assert!(!node.is_defined("XXX"));
        // The miss above must not have created the node.
        assert!(!node.is_defined("XXX"));
        assert!(node.is_defined("BTL"));

        // Navigation creates; presence check then sees the node.
        node.at("XXX");
        assert!(node.is_defined("XXX"));
    }

    #[test]
    fn repeated_misses_return_the_same_node() {
        let lookup = NestedLookup::<String>::default();
        lookup.at("X").insert(["Y"], 7).unwrap();
        assert_eq!(lookup.at("X").at("Y").as_i64(), Ok(7));
    }

    #[test]
    fn inserting_the_same_path_twice_overwrites_the_leaf() {
        let lookup = NestedLookup::<String>::new([
            (["A", "B"], LookupValue::from(1)),
            (["A", "B"], LookupValue::from(2)),
        ])
        .unwrap();
        assert_eq!(lookup.at("A").at("B").as_i64(), Ok(2));
    }

    #[test]
    fn empty_key_path_is_rejected() {
        let lookup = NestedLookup::<String>::default();
        let empty: [&str; 0] = [];
        assert_eq!(lookup.insert(empty, 1), Err(LookupError::EmptyKeyPath));
    }

    mod properties {
        use std::collections::HashMap;

        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn last_insert_per_path_wins(
                items in prop::collection::vec(
                    (prop::collection::vec("[a-z]{1,4}", 1..4), any::<i64>()),
                    1..16,
                )
            ) {
                let lookup = NestedLookup::<String>::new(items.clone()).unwrap();

                let mut expected: HashMap<Vec<String>, i64> = HashMap::new();
                for (path, value) in items {
                    expected.insert(path, value);
                }

                for (path, value) in expected {
                    let mut node = lookup.at(path[0].clone());
                    for key in &path[1..] {
                        let next = node.at(key.clone());
                        node = next;
                    }
                    prop_assert_eq!(node.as_i64(), Ok(value));
                }
            }

            #[test]
            fn presence_checks_never_mutate(keys in prop::collection::vec("[a-z]{1,4}", 1..8)) {
                let lookup = NestedLookup::<String>::default();
                for key in &keys {
                    prop_assert!(!lookup.is_defined(key.clone()));
                }
                for key in &keys {
                    prop_assert!(!lookup.is_defined(key.clone()));
                }
            }
        }
    }
}
