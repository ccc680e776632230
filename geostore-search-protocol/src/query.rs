//! Query fragments and composition.
//!
//! A [`QueryFragment`] models one node of the backend's JSON query language:
//! a boolean container with `must` and `must_not` clause arrays, plus any
//! other top-level keys carried through verbatim (for example a `terms`
//! directive attached alongside the boolean node). Leaf predicates are typed
//! [`Clause`] variants rather than raw JSON, so filter translation and test
//! backends can inspect them structurally.
//!
//! # Composition semantics
//!
//! [`QueryFragment::compose`] merges two fragments:
//!
//! - `must` arrays are concatenated, base clauses first
//! - `must_not` arrays are concatenated, base clauses first
//! - other top-level keys are copied from both sides; on an exact key
//!   collision the addition wins
//!
//! Composition is associative and order-preserving, so filtering a collection
//! repeatedly is equivalent to applying all filters at once in order. No
//! deduplication is performed; the backend treats repeated predicates as
//! redundant but correct.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::BTreeMap;

/// A leaf or nested predicate inside a boolean query node.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Exact match on a single field value.
    Term { field: String, value: JsonValue },
    /// Match any of the listed field values.
    Terms { field: String, values: Vec<JsonValue> },
    /// The field must be present on the document.
    Exists { field: String },
    /// Bounded comparison on a field value.
    Range {
        field: String,
        gte: Option<JsonValue>,
        lte: Option<JsonValue>,
    },
    /// A nested boolean group.
    Bool(QueryFragment),
}

impl Clause {
    /// Exact-match predicate.
    pub fn term(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Clause::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Match-any predicate over a list of values.
    pub fn terms(field: impl Into<String>, values: Vec<JsonValue>) -> Self {
        Clause::Terms {
            field: field.into(),
            values,
        }
    }

    /// Field-presence predicate.
    pub fn exists(field: impl Into<String>) -> Self {
        Clause::Exists {
            field: field.into(),
        }
    }

    /// Range predicate with optional lower and upper bounds.
    pub fn range(
        field: impl Into<String>,
        gte: Option<JsonValue>,
        lte: Option<JsonValue>,
    ) -> Self {
        Clause::Range {
            field: field.into(),
            gte,
            lte,
        }
    }

    /// Render this clause as backend query JSON.
    pub fn to_value(&self) -> JsonValue {
        fn keyed(kind: &str, field: &str, body: JsonValue) -> JsonValue {
            let mut inner = Map::new();
            inner.insert(field.to_string(), body);
            let mut outer = Map::new();
            outer.insert(kind.to_string(), JsonValue::Object(inner));
            JsonValue::Object(outer)
        }

        match self {
            Clause::Term { field, value } => keyed("term", field, value.clone()),
            Clause::Terms { field, values } => {
                keyed("terms", field, JsonValue::Array(values.clone()))
            }
            Clause::Exists { field } => json!({ "exists": { "field": field } }),
            Clause::Range { field, gte, lte } => {
                let mut bounds = Map::new();
                if let Some(gte) = gte {
                    bounds.insert("gte".to_string(), gte.clone());
                }
                if let Some(lte) = lte {
                    bounds.insert("lte".to_string(), lte.clone());
                }
                keyed("range", field, JsonValue::Object(bounds))
            }
            Clause::Bool(fragment) => fragment.to_value(),
        }
    }
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// One boolean node of the query language, plus passthrough top-level keys.
///
/// The empty fragment (`QueryFragment::new()`) matches all documents and
/// composes as a neutral element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFragment {
    /// Clauses every matching document must satisfy.
    pub must: Vec<Clause>,
    /// Clauses no matching document may satisfy.
    pub must_not: Vec<Clause>,
    /// Top-level keys carried alongside the boolean node, verbatim.
    pub extra: BTreeMap<String, JsonValue>,
}

impl QueryFragment {
    /// The empty (match-all) fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragment with a single `must` clause.
    pub fn must(clause: Clause) -> Self {
        Self {
            must: vec![clause],
            ..Self::default()
        }
    }

    /// Fragment with a single `must_not` clause.
    pub fn must_not(clause: Clause) -> Self {
        Self {
            must_not: vec![clause],
            ..Self::default()
        }
    }

    /// Append a `must` clause.
    pub fn with_must(mut self, clause: Clause) -> Self {
        self.must.push(clause);
        self
    }

    /// Append a `must_not` clause.
    pub fn with_must_not(mut self, clause: Clause) -> Self {
        self.must_not.push(clause);
        self
    }

    /// Attach a passthrough top-level key.
    pub fn with_extra(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// True when the fragment carries no clauses and no passthrough keys.
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.must_not.is_empty() && self.extra.is_empty()
    }

    /// Merge `addition` into this fragment, returning the combined fragment.
    ///
    /// The boolean nodes merge by concatenation: no clause from either side
    /// is lost. Passthrough keys from `addition` override base keys on an
    /// exact key collision.
    pub fn compose(&self, addition: &QueryFragment) -> QueryFragment {
        let mut merged = self.clone();
        merged.must.extend(addition.must.iter().cloned());
        merged
            .must_not
            .extend(addition.must_not.iter().cloned());
        for (key, value) in &addition.extra {
            merged.extra.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Render this fragment as backend query JSON.
    ///
    /// Empty `must`/`must_not` arrays are omitted. The `bool` key itself is
    /// omitted only when passthrough keys are present and both clause arrays
    /// are empty; a fully empty fragment renders as the match-all `{"bool": {}}`.
    pub fn to_value(&self) -> JsonValue {
        let mut root = Map::new();
        let mut node = Map::new();
        if !self.must.is_empty() {
            node.insert(
                "must".to_string(),
                JsonValue::Array(self.must.iter().map(Clause::to_value).collect()),
            );
        }
        if !self.must_not.is_empty() {
            node.insert(
                "must_not".to_string(),
                JsonValue::Array(self.must_not.iter().map(Clause::to_value).collect()),
            );
        }
        if !node.is_empty() || self.extra.is_empty() {
            root.insert("bool".to_string(), JsonValue::Object(node));
        }
        for (key, value) in &self.extra {
            root.insert(key.clone(), value.clone());
        }
        JsonValue::Object(root)
    }
}

impl Serialize for QueryFragment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
