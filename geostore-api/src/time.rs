//! Time-range filtering.
//!
//! Unlike the property filters, a [`TimeFilter`] is not a single predicate:
//! it expands into its own query fragment (presence constraints plus range
//! or exact-match clauses) which the collection composes in directly.

use geostore_search_protocol::{Clause, QueryFragment};
use serde_json::json;

use crate::metadata::paths;

/// Which time shape the filter selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeKind {
    /// Documents with no time data at all.
    None,
    /// Single-timestamp documents (t0 present, t1 absent).
    Timestamp,
    /// Interval documents (t0 and t1 both present).
    Interval,
    /// Any time shape; only the window constraints apply.
    All,
}

/// Time-range filter over the `data.time` endpoints.
///
/// The optional window `[start, end]` defaults to containment semantics:
/// the document's time values must fall inside the window. The `overlap`
/// flag relaxes this to intersection semantics, and `exact` switches to
/// exact matches on the endpoint values.
///
/// # Example
///
/// ```rust
/// use geostore_api::{TimeFilter, TimeKind};
///
/// // intervals overlapping the 2020 survey window
/// let filter = TimeFilter::new(TimeKind::Interval)
///     .with_start("2020-01-01T00:00:00")
///     .with_end("2020-12-31T00:00:00")
///     .with_overlap(true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFilter {
    kind: TimeKind,
    start: Option<String>,
    end: Option<String>,
    overlap: bool,
    exact: bool,
}

impl TimeFilter {
    /// Filter selecting the given time shape, with no window.
    pub fn new(kind: TimeKind) -> Self {
        Self {
            kind,
            start: None,
            end: None,
            overlap: false,
            exact: false,
        }
    }

    /// Set the window start.
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Set the window end.
    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Use intersection semantics for the window instead of containment.
    pub fn with_overlap(mut self, overlap: bool) -> Self {
        self.overlap = overlap;
        self
    }

    /// Match the window endpoints exactly instead of as a range.
    pub fn with_exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    /// Expand into a query fragment.
    pub(crate) fn to_query(&self) -> QueryFragment {
        let mut fragment = QueryFragment::new();

        match self.kind {
            TimeKind::None => {
                // no time data; a window is meaningless here
                return fragment.with_must_not(Clause::exists(paths::TIME_T0));
            }
            TimeKind::Timestamp => {
                fragment = fragment
                    .with_must(Clause::exists(paths::TIME_T0))
                    .with_must_not(Clause::exists(paths::TIME_T1));
            }
            TimeKind::Interval => {
                fragment = fragment
                    .with_must(Clause::exists(paths::TIME_T0))
                    .with_must(Clause::exists(paths::TIME_T1));
            }
            TimeKind::All => {}
        }

        if self.exact {
            if let Some(start) = &self.start {
                fragment = fragment.with_must(Clause::term(paths::TIME_T0, start.as_str()));
            }
            if let Some(end) = &self.end {
                fragment = fragment.with_must(Clause::term(paths::TIME_T1, end.as_str()));
            }
        } else if self.overlap {
            // the document's range intersects the window
            if let Some(start) = &self.start {
                let lower_field = match self.kind {
                    TimeKind::Interval => paths::TIME_T1,
                    _ => paths::TIME_T0,
                };
                fragment =
                    fragment.with_must(Clause::range(lower_field, Some(json!(start)), None));
            }
            if let Some(end) = &self.end {
                fragment =
                    fragment.with_must(Clause::range(paths::TIME_T0, None, Some(json!(end))));
            }
        } else {
            // containment: the document's time values lie inside the window
            if let Some(start) = &self.start {
                fragment =
                    fragment.with_must(Clause::range(paths::TIME_T0, Some(json!(start)), None));
            }
            if let Some(end) = &self.end {
                fragment =
                    fragment.with_must(Clause::range(paths::TIME_T0, None, Some(json!(end))));
                if self.kind == TimeKind::Interval {
                    fragment =
                        fragment.with_must(Clause::range(paths::TIME_T1, None, Some(json!(end))));
                }
            }
        }

        fragment
    }
}
