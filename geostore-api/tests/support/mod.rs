//! In-memory backend for collection tests.
//!
//! Holds a fixture document set and evaluates incoming queries structurally
//! (term/terms/exists/range/bool over dotted paths), so the tests exercise
//! the real query composition and pagination logic end to end. Call
//! counters expose how many backend round trips an operation cost.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use geostore_client::{ClientError, SearchBackend};
use geostore_search_protocol::{
    AggregateRequest, Bucket, BucketList, Clause, Hit, HitsEnvelope, Pit, QueryFragment,
    SearchRequest, SearchResponse, TermsAgg, TotalHits,
};
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const CASE_UUID: &str = "2c2f47cf-c7ab-4112-87f9-b4797ec51cb6";
pub const OTHER_CASE_UUID: &str = "9f1a2b3c-0d4e-45f6-a789-0b1c2d3e4f50";

/// One fixture document. `seq` is the backend's internal sequence number;
/// pages are served in descending `seq` order.
pub struct MockDoc {
    pub id: String,
    pub seq: i64,
    pub source: JsonValue,
}

pub struct MockBackend {
    docs: Vec<MockDoc>,
    /// When set, reported instead of the true match count (drift testing).
    pub total_override: Option<u64>,
    pub blobs: HashMap<String, Bytes>,
    pub auth_uris: HashMap<String, String>,
    pub search_calls: AtomicUsize,
    pub aggregate_calls: AtomicUsize,
    pub auth_uri_calls: AtomicUsize,
    /// Pit id attached to each search request, in call order.
    pub pits_seen: Mutex<Vec<Option<String>>>,
    /// The most recent aggregate request.
    pub last_aggregate: Mutex<Option<AggregateRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            docs: Vec::new(),
            total_override: None,
            blobs: HashMap::new(),
            auth_uris: HashMap::new(),
            search_calls: AtomicUsize::new(0),
            aggregate_calls: AtomicUsize::new(0),
            auth_uri_calls: AtomicUsize::new(0),
            pits_seen: Mutex::new(Vec::new()),
            last_aggregate: Mutex::new(None),
        }
    }

    pub fn add_doc(&mut self, source: JsonValue) -> String {
        let id = format!("doc-{:05}", self.docs.len());
        self.add_doc_with_id(id.clone(), source);
        id
    }

    pub fn add_doc_with_id(&mut self, id: String, source: JsonValue) {
        let seq = self.docs.len() as i64;
        self.docs.push(MockDoc { id, seq, source });
    }

    pub fn searches(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn aggregates(&self) -> usize {
        self.aggregate_calls.load(Ordering::SeqCst)
    }

    fn matching(&self, query: &QueryFragment) -> Vec<&MockDoc> {
        let mut matched: Vec<&MockDoc> = self
            .docs
            .iter()
            .filter(|doc| eval_fragment(query, doc))
            .collect();
        matched.sort_by(|a, b| b.seq.cmp(&a.seq));
        matched
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    async fn search(&self, request: &SearchRequest) -> geostore_client::Result<SearchResponse> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.pits_seen
            .lock()
            .unwrap()
            .push(request.pit.as_ref().map(|pit| pit.id.clone()));

        let matched = self.matching(&request.query);

        let total = if request.track_total_hits == Some(true) {
            Some(TotalHits {
                value: self.total_override.unwrap_or(matched.len() as u64),
            })
        } else {
            None
        };

        let mut aggregations = BTreeMap::new();
        for (name, agg) in &request.aggs {
            aggregations.insert(name.clone(), bucketize(&matched, agg));
        }

        let after = request
            .search_after
            .as_ref()
            .and_then(|cursor| cursor.first())
            .and_then(JsonValue::as_i64);

        let hits = matched
            .iter()
            .filter(|doc| after.map_or(true, |after| doc.seq < after))
            .take(request.size)
            .map(|doc| Hit {
                id: doc.id.clone(),
                source: doc.source.clone(),
                sort: vec![json!(doc.seq)],
            })
            .collect();

        Ok(SearchResponse {
            hits: HitsEnvelope { total, hits },
            aggregations,
        })
    }

    async fn aggregate(&self, request: &AggregateRequest) -> geostore_client::Result<Bytes> {
        self.aggregate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_aggregate.lock().unwrap() = Some(request.clone());
        let operation = request.operation.first().cloned().unwrap_or_default();
        Ok(Bytes::from(format!(
            "{}:{}",
            operation,
            request.object_ids.len()
        )))
    }

    async fn fetch_blob(&self, object_id: &str) -> geostore_client::Result<Bytes> {
        self.blobs.get(object_id).cloned().ok_or(ClientError::Status {
            status: 404,
            body: format!("no blob for {object_id}"),
        })
    }

    async fn blob_auth_uri(&self, object_id: &str) -> geostore_client::Result<String> {
        self.auth_uri_calls.fetch_add(1, Ordering::SeqCst);
        self.auth_uris
            .get(object_id)
            .cloned()
            .ok_or(ClientError::Status {
                status: 404,
                body: format!("no auth uri for {object_id}"),
            })
    }

    async fn open_pit(&self, keep_alive: &str) -> geostore_client::Result<Pit> {
        Ok(Pit::new("pit-0001", keep_alive))
    }
}

// ---------------------------------------------------------------------------
// Query evaluation
// ---------------------------------------------------------------------------

fn eval_fragment(fragment: &QueryFragment, doc: &MockDoc) -> bool {
    fragment.must.iter().all(|clause| eval_clause(clause, doc))
        && fragment
            .must_not
            .iter()
            .all(|clause| !eval_clause(clause, doc))
}

fn eval_clause(clause: &Clause, doc: &MockDoc) -> bool {
    match clause {
        Clause::Term { field, value } => {
            lookup(doc, field).is_some_and(|found| value_matches(&found, value))
        }
        Clause::Terms { field, values } => lookup(doc, field)
            .is_some_and(|found| values.iter().any(|value| value_matches(&found, value))),
        Clause::Exists { field } => lookup(doc, field).is_some(),
        Clause::Range { field, gte, lte } => lookup(doc, field).is_some_and(|found| {
            let lower_ok = gte
                .as_ref()
                .map_or(true, |bound| compare(&found, bound) >= std::cmp::Ordering::Equal);
            let upper_ok = lte
                .as_ref()
                .map_or(true, |bound| compare(&found, bound) <= std::cmp::Ordering::Equal);
            lower_ok && upper_ok
        }),
        Clause::Bool(fragment) => eval_fragment(fragment, doc),
    }
}

/// Resolve a dotted metadata path, ignoring `.keyword` subfields. `_id`
/// resolves to the document id.
fn lookup(doc: &MockDoc, path: &str) -> Option<JsonValue> {
    let path = path.strip_suffix(".keyword").unwrap_or(path);
    if path == "_id" {
        return Some(JsonValue::String(doc.id.clone()));
    }

    let mut current = &doc.source;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current.clone())
    }
}

fn value_matches(found: &JsonValue, target: &JsonValue) -> bool {
    match found {
        JsonValue::Array(items) => items.contains(target),
        other => other == target,
    }
}

fn compare(a: &JsonValue, b: &JsonValue) -> std::cmp::Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal),
        _ => key_string(a).cmp(&key_string(b)),
    }
}

fn key_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Group `docs` into terms buckets: count descending, key ascending on
/// ties, string keys echoed as `key_as_string`.
fn bucketize(docs: &[&MockDoc], agg: &TermsAgg) -> BucketList {
    let mut groups: Vec<(JsonValue, Vec<&MockDoc>)> = Vec::new();

    for doc in docs {
        let Some(found) = lookup(doc, &agg.terms.field) else {
            continue;
        };
        let values = match found {
            JsonValue::Array(items) => items,
            other => vec![other],
        };
        for value in values {
            match groups.iter_mut().find(|(key, _)| *key == value) {
                Some((_, group)) => group.push(doc),
                None => groups.push((value, vec![doc])),
            }
        }
    }

    groups.sort_by(|(key_a, group_a), (key_b, group_b)| {
        group_b
            .len()
            .cmp(&group_a.len())
            .then_with(|| key_string(key_a).cmp(&key_string(key_b)))
    });
    groups.truncate(agg.terms.size);

    let buckets = groups
        .into_iter()
        .map(|(key, group)| {
            let mut bucket = Bucket::new(key.clone(), group.len() as u64);
            if let JsonValue::String(s) = &key {
                bucket = bucket.with_key_as_string(s.clone());
            }
            if let Some(subs) = &agg.aggs {
                for (name, sub) in subs {
                    bucket.sub.insert(name.clone(), bucketize(&group, sub));
                }
            }
            bucket
        })
        .collect();

    BucketList { buckets }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn case_doc(name: &str, user: &str, status: &str, field: &str) -> JsonValue {
    json!({
        "class": "case",
        "sim": { "case": { "name": name, "user": { "id": user } } },
        "_store": { "status": status },
        "access": { "asset": { "name": field } },
        "masterdata": { "field": { "identifier": field } }
    })
}

pub struct SurfaceSpec<'a> {
    pub case_uuid: &'a str,
    pub name: &'a str,
    pub tagname: &'a str,
    pub iteration: &'a str,
    pub stage: &'a str,
    pub realization: Option<i64>,
    pub aggregation: Option<&'a str>,
    pub t0: Option<&'a str>,
    pub t1: Option<&'a str>,
}

pub fn surface_doc(spec: &SurfaceSpec<'_>) -> JsonValue {
    let mut sim = json!({
        "case": { "name": "drogon_design_small-2023-01-18", "user": { "id": "peesv" } },
        "iteration": { "name": spec.iteration },
        "context": { "stage": spec.stage }
    });
    if let Some(realization) = spec.realization {
        sim["realization"] = json!({ "id": realization });
    }
    if let Some(operation) = spec.aggregation {
        sim["aggregation"] = json!({ "operation": operation });
    }

    let mut time = json!({});
    if let Some(t0) = spec.t0 {
        time["t0"] = json!({ "value": t0 });
    }
    if let Some(t1) = spec.t1 {
        time["t1"] = json!({ "value": t1 });
    }

    json!({
        "class": "surface",
        "data": {
            "name": spec.name,
            "tagname": spec.tagname,
            "format": "irap_binary",
            "stratigraphic": true,
            "vertical_domain": "depth",
            "time": time,
        },
        "sim": sim,
        "_store": { "parent_object": spec.case_uuid, "status": "keep" },
        "file": { "relative_path": format!(
            "share/results/maps/{}--{}.gri",
            spec.name.to_lowercase().replace(' ', "_"),
            spec.tagname.to_lowercase()
        ) }
    })
}

fn add_realization_surfaces(
    backend: &mut MockBackend,
    name: &str,
    tagname: &str,
    count: i64,
    time: impl Fn(i64) -> (Option<&'static str>, Option<&'static str>),
) {
    for realization in 0..count {
        let (t0, t1) = time(realization);
        backend.add_doc(surface_doc(&SurfaceSpec {
            case_uuid: CASE_UUID,
            name,
            tagname,
            iteration: "iter-0",
            stage: "realization",
            realization: Some(realization),
            aggregation: None,
            t0,
            t1,
        }));
    }
}

/// The reference fixture: one small design case with 219 surfaces
/// (212 realizations + 7 aggregations), a cube, two polygon sets, plus a
/// second case to prove scoping.
pub fn drogon() -> MockBackend {
    let mut backend = MockBackend::new();

    backend.add_doc_with_id(
        CASE_UUID.to_string(),
        case_doc("drogon_design_small-2023-01-18", "peesv", "keep", "DROGON"),
    );
    backend.add_doc_with_id(
        OTHER_CASE_UUID.to_string(),
        case_doc("drogon_ahm-2023-02-10", "dbs", "offline", "DROGON"),
    );
    backend.add_doc_with_id(
        "11c3f1a0-aaaa-bbbb-cccc-0123456789ab".to_string(),
        case_doc("sverdrup_baseline-2022-11-30", "dbs", "keep", "JOHAN SVERDRUP"),
    );

    // 212 realization surfaces for the small design case
    add_realization_surfaces(&mut backend, "Valysar Fm.", "FACIES_Fraction_Channel", 4, |_| {
        (None, None)
    });
    add_realization_surfaces(&mut backend, "Valysar Fm.", "DS_extract", 52, |realization| {
        match realization {
            0..=4 => (Some("2019-10-01T00:00:00"), None),
            5..=9 => (Some("2020-02-06T00:00:00"), None),
            _ => (None, None),
        }
    });
    add_realization_surfaces(&mut backend, "Therys Fm.", "DS_extract", 78, |realization| {
        match realization {
            0..=9 => (Some("2020-02-06T00:00:00"), Some("2020-07-30T00:00:00")),
            10..=14 => (Some("2019-10-01T00:00:00"), Some("2020-02-06T00:00:00")),
            _ => (None, None),
        }
    });
    add_realization_surfaces(&mut backend, "Volon Fm.", "DS_extract", 78, |_| (None, None));

    // 7 aggregation surfaces
    for operation in ["mean", "min", "max", "std", "p10", "p50", "p90"] {
        backend.add_doc(surface_doc(&SurfaceSpec {
            case_uuid: CASE_UUID,
            name: "Valysar Fm.",
            tagname: "FACIES_Fraction_Channel",
            iteration: "iter-0",
            stage: "iteration",
            realization: None,
            aggregation: Some(operation),
            t0: None,
            t1: None,
        }));
    }

    // a cube with a signed URL
    let cube_id = backend.add_doc(json!({
        "class": "cube",
        "data": { "name": "seismic_amplitude", "tagname": "depth", "format": "segy" },
        "sim": {
            "case": { "name": "drogon_design_small-2023-01-18", "user": { "id": "peesv" } },
            "iteration": { "name": "iter-0" },
            "realization": { "id": 0 },
            "context": { "stage": "realization" }
        },
        "_store": { "parent_object": CASE_UUID, "status": "keep" }
    }));
    backend.auth_uris.insert(
        cube_id,
        "https://blob.store.example.com/vol-1?sig=abc123&exp=20260805".to_string(),
    );

    // polygon sets: one tabular, one not
    let poly_csv = backend.add_doc(json!({
        "class": "polygons",
        "data": { "name": "Valysar Fm.", "tagname": "field_outline", "format": "csv" },
        "sim": {
            "case": { "name": "drogon_design_small-2023-01-18", "user": { "id": "peesv" } },
            "iteration": { "name": "iter-0" },
            "realization": { "id": 0 },
            "context": { "stage": "realization" }
        },
        "_store": { "parent_object": CASE_UUID, "status": "keep" }
    }));
    backend.blobs.insert(
        poly_csv,
        Bytes::from("X,Y,Z,POLY_ID\n4.6e5,5.93e6,1620.5,0\n4.7e5,5.94e6,1640.0,0\n"),
    );
    backend.add_doc(json!({
        "class": "polygons",
        "data": { "name": "Therys Fm.", "tagname": "field_outline", "format": "irap_binary" },
        "sim": {
            "case": { "name": "drogon_design_small-2023-01-18", "user": { "id": "peesv" } },
            "iteration": { "name": "iter-0" },
            "realization": { "id": 0 },
            "context": { "stage": "realization" }
        },
        "_store": { "parent_object": CASE_UUID, "status": "keep" }
    }));

    // three surfaces under the other case; scoping must keep these out
    for realization in 0..3 {
        backend.add_doc(surface_doc(&SurfaceSpec {
            case_uuid: OTHER_CASE_UUID,
            name: "Valysar Fm.",
            tagname: "DS_extract",
            iteration: "iter-0",
            stage: "realization",
            realization: Some(realization),
            aggregation: None,
            t0: None,
            t1: None,
        }));
    }

    backend
}

/// A case with `count` minimal surfaces, for multi-page pagination tests.
pub fn big_case(count: usize) -> MockBackend {
    let mut backend = MockBackend::new();
    backend.add_doc_with_id(
        CASE_UUID.to_string(),
        case_doc("big_case", "peesv", "keep", "DROGON"),
    );
    for index in 0..count {
        backend.add_doc(surface_doc(&SurfaceSpec {
            case_uuid: CASE_UUID,
            name: "Valysar Fm.",
            tagname: "DS_extract",
            iteration: "iter-0",
            stage: "realization",
            realization: Some(index as i64),
            aggregation: None,
            t0: None,
            t1: None,
        }));
    }
    backend
}

pub fn arc(backend: MockBackend) -> Arc<MockBackend> {
    Arc::new(backend)
}
