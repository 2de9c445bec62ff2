//! Tabular product data.
//!
//! A `Dataset` is an ordered set of columns and rows, where every row is a
//! `Meta` keyed by column name. It is what the recommender trains on and what
//! `predict`/`score` look products up in.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{Meta, COMBINED_TEXT, PID};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Meta>,
}

impl Dataset {
    pub fn from_rows(columns: Vec<String>, rows: Vec<Meta>) -> Self {
        Self { columns, rows }
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let dataset = Self::from_reader(file)?;
        tracing::info!(path = %path.display(), rows = dataset.len(), "loaded dataset");
        Ok(dataset)
    }

    /// Read a headered CSV. Every header becomes a column.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let row: Meta = columns.iter().cloned().zip(record.iter().map(str::to_string)).collect();
            rows.push(row);
        }
        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn columns(&self) -> &[String] { &self.columns }

    pub fn rows(&self) -> &[Meta] { &self.rows }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// First row whose `pid` equals `pid`.
    pub fn find_by_pid(&self, pid: &str) -> Option<&Meta> {
        self.rows.iter().find(|row| row.get(PID).is_some_and(|p| p == pid))
    }

    /// The whole column, one entry per row. A row without the cell yields `""`.
    pub fn texts(&self, column: &str) -> Result<Vec<String>> {
        if !self.has_column(column) {
            return Err(Error::MissingColumn(column.to_string()));
        }
        Ok(self.rows.iter().map(|row| row.get(column).cloned().unwrap_or_default()).collect())
    }

    /// Project every row onto `columns`. Absent cells are left out.
    pub fn metadatas(&self, columns: &[String]) -> Vec<Meta> {
        self.rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                    .collect()
            })
            .collect()
    }

    /// Copy of the dataset whose `combined_text` joins the `sources` columns.
    pub fn with_combined_text(&self, sources: &[String], separator: &str) -> Result<Self> {
        if let Some(missing) = sources.iter().find(|s| !self.has_column(s)) {
            return Err(Error::MissingColumn(missing.clone()));
        }
        let mut out = self.clone();
        for row in &mut out.rows {
            let parts: Vec<&str> = sources
                .iter()
                .filter_map(|s| row.get(s).map(String::as_str))
                .filter(|v| !v.is_empty())
                .collect();
            let combined = parts.join(separator);
            row.insert(COMBINED_TEXT.to_string(), combined);
        }
        if !out.has_column(COMBINED_TEXT) {
            out.columns.push(COMBINED_TEXT.to_string());
        }
        Ok(out)
    }

    /// Require the key columns and unique product ids.
    pub fn validate(&self) -> Result<()> {
        for required in [PID, COMBINED_TEXT] {
            if !self.has_column(required) {
                return Err(Error::MissingColumn(required.to_string()));
            }
        }
        let mut seen = HashSet::new();
        for row in &self.rows {
            let pid = row.get(PID).map(String::as_str).unwrap_or_default();
            if !seen.insert(pid) {
                return Err(Error::InvalidData(format!("duplicate pid '{pid}'")));
            }
        }
        Ok(())
    }
}
