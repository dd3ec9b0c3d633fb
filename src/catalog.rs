use std::path::Path;

use anyhow::anyhow;
use indexmap::IndexSet;
use serde::Deserialize;
use strum_macros::{Display, EnumString};

/// What the warehouse metadata reports a table to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TableKind {
    Table,
    View,
    External,
    MaterializedView,
    /// A kind this tool does not know about, kept so newer snapshots load.
    #[serde(other)]
    Other,
}

/// One table or view as listed in the project's metadata snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct TableRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TableKind,
}

/// The metadata snapshot for one project: every table the warehouse listed,
/// in listing order.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub tables: Vec<TableRecord>,
}

impl Catalog {
    /// Load a catalog snapshot from the JSON file written by the metadata
    /// downloader.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|_| anyhow!("Failed to read catalog file: {}", path.display()))?;
        serde_json::from_str(&raw).map_err(|err| {
            anyhow!(
                "Failed to parse JSON catalog in file {} due to error: {}",
                path.display(),
                err
            )
        })
    }

    /// Names of every listed table, in listing order.
    pub fn table_names(&self) -> IndexSet<String> {
        self.tables.iter().map(|t| t.name.clone()).collect()
    }

    /// Names the warehouse reports as ordinary stored tables.
    pub fn stored_table_names(&self) -> IndexSet<String> {
        self.tables
            .iter()
            .filter(|t| t.kind == TableKind::Table)
            .map(|t| t.name.clone())
            .collect()
    }
}
