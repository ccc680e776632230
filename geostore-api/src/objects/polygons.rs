//! Polygons objects.

use geostore_client::SearchBackend;
use geostore_search_protocol::Hit;
use std::ops::Deref;
use std::sync::Arc;

use crate::child::{ChildCollection, ChildObject};
use crate::error::{ExplorerError, Result};
use crate::objects::child::Child;

/// A polygon set stored in a case.
#[derive(Debug, Clone)]
pub struct Polygons {
    child: Child,
}

impl ChildObject for Polygons {
    const DOC_TYPE: &'static str = "polygons";

    fn from_hit(backend: Arc<dyn SearchBackend>, hit: Hit) -> Result<Self> {
        Ok(Self {
            child: Child::from_hit(backend, hit)?,
        })
    }
}

impl Deref for Polygons {
    type Target = Child;

    fn deref(&self) -> &Child {
        &self.child
    }
}

impl Polygons {
    /// Fetch and decode the payload into a column table.
    ///
    /// Only the `csv` storage format is tabular; any other format fails
    /// with [`ExplorerError::UnsupportedFormat`] naming the offending
    /// format.
    pub async fn to_table(&self) -> Result<Table> {
        match self.child.format() {
            Some("csv") => {}
            other => {
                return Err(ExplorerError::UnsupportedFormat(
                    other.unwrap_or("unknown").to_string(),
                ))
            }
        }

        let payload = self.child.blob().await?;
        let text = std::str::from_utf8(&payload).map_err(|e| {
            ExplorerError::InvalidDocument(format!("polygons payload is not UTF-8: {e}"))
        })?;

        Table::parse_csv(text)
    }
}

/// A decoded polygons table: a header row plus string-valued cells.
///
/// Polygon payloads are plain numeric CSV without quoting or embedded
/// separators, so the decode is a straight line/comma split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn parse_csv(text: &str) -> Result<Self> {
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());
        let header = lines.next().ok_or_else(|| {
            ExplorerError::InvalidDocument("polygons payload is empty".to_string())
        })?;

        let columns: Vec<String> = header.split(',').map(|cell| cell.trim().to_string()).collect();
        let mut rows = Vec::new();

        for (number, line) in lines.enumerate() {
            let row: Vec<String> = line.split(',').map(|cell| cell.trim().to_string()).collect();
            if row.len() != columns.len() {
                return Err(ExplorerError::InvalidDocument(format!(
                    "row {} has {} cells, expected {}",
                    number + 2,
                    row.len(),
                    columns.len()
                )));
            }
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    /// Column names, in payload order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of data rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// The data rows, in payload order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// All cells of the named column, or `None` for an unknown column.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.columns.iter().position(|column| column == name)?;
        Some(self.rows.iter().map(|row| row[index].as_str()).collect())
    }
}

/// The polygon sets of one case.
pub type PolygonsCollection = ChildCollection<Polygons>;
