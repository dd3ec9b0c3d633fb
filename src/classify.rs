use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Provenance of a table: how its contents come to exist.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TableCategory {
    /// Referenced somewhere but not confirmed to exist as a stored table,
    /// view or scheduled destination in the current metadata snapshot.
    External,
    /// An ordinary stored table.
    BaseTable,
    /// Defined by a stored query evaluated on read.
    View,
    /// Populated by a periodically executed stored query.
    Scheduled,
}

impl TableCategory {
    /// Whether tables of this category carry a defining query.
    pub fn has_defining_query(&self) -> bool {
        matches!(self, TableCategory::View | TableCategory::Scheduled)
    }
}

/// Partition `all_tables` into the four provenance categories.
///
/// View and scheduled destinations win over everything else (views first on
/// a collision); what remains is a base table when the warehouse reports it
/// as stored, and external otherwise. Every table lands in exactly one
/// category, so the returned map is a partition of `all_tables`.
pub fn classify(
    all_tables: &IndexSet<String>,
    view_names: &IndexSet<String>,
    scheduled_destinations: &IndexSet<String>,
    stored_table_names: &IndexSet<String>,
) -> IndexMap<String, TableCategory> {
    let mut categories = IndexMap::with_capacity(all_tables.len());
    for table in all_tables {
        let category = if view_names.contains(table) {
            TableCategory::View
        } else if scheduled_destinations.contains(table) {
            TableCategory::Scheduled
        } else if stored_table_names.contains(table) {
            TableCategory::BaseTable
        } else {
            TableCategory::External
        };
        categories.insert(table.clone(), category);
    }
    categories
}
