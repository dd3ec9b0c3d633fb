use std::path::Path;

use anyhow::anyhow;
use indexmap::{IndexMap, IndexSet};
use log::{info, warn};

use crate::catalog::Catalog;
use crate::classify::{TableCategory, classify};
use crate::config::{Config, StyleConfig};
use crate::deps::resolve_dependencies;
use crate::error::Error;
use crate::graph::FlowchartBuilder;
use crate::sanitize::strip_comments;
use crate::store;

/// Everything known about one project after metadata loading: the sanitized
/// defining query (if any) and the provenance category of every table.
#[derive(Debug, Clone)]
pub struct ProjectData {
    /// Sanitized defining query per table; `Some` iff the category carries
    /// a defining query.
    pub queries: IndexMap<String, Option<String>>,
    pub categories: IndexMap<String, TableCategory>,
}

impl ProjectData {
    pub fn table_names(&self) -> IndexSet<String> {
        self.categories.keys().cloned().collect()
    }
}

/// Combine a catalog snapshot with the raw stored query bodies into the
/// project model: sanitize every query, classify every table.
///
/// The table universe is the union of the catalog listing, the stored view
/// names and the scheduled destinations.
pub fn build_project_data(
    catalog: &Catalog,
    views: &IndexMap<String, String>,
    scheduled: &IndexMap<String, String>,
) -> ProjectData {
    let view_names: IndexSet<String> = views.keys().cloned().collect();
    let scheduled_destinations: IndexSet<String> = scheduled.keys().cloned().collect();

    let mut all_tables = catalog.table_names();
    all_tables.extend(view_names.iter().cloned());
    all_tables.extend(scheduled_destinations.iter().cloned());

    let categories = classify(
        &all_tables,
        &view_names,
        &scheduled_destinations,
        &catalog.stored_table_names(),
    );

    let mut queries = IndexMap::with_capacity(categories.len());
    for (table, category) in &categories {
        let query = match category {
            TableCategory::View => views.get(table).map(|sql| strip_comments(sql)),
            TableCategory::Scheduled => scheduled.get(table).map(|sql| strip_comments(sql)),
            _ => None,
        };
        queries.insert(table.clone(), query);
    }

    ProjectData { queries, categories }
}

/// Load the catalog snapshot and the stored view and scheduled-query bodies
/// named by `config`, then assemble the project model.
///
/// Malformed scheduled-query files are reported as warnings and skipped;
/// everything else loads normally.
pub fn assemble_project_data(config: &Config) -> anyhow::Result<ProjectData> {
    let catalog_path = config.catalog.as_ref().ok_or_else(|| {
        anyhow!("No catalog snapshot configured; pass --catalog or set `catalog` in the config file")
    })?;
    let catalog = Catalog::from_file(catalog_path)?;
    let views = store::load_views(&config.views_path)?;
    let (scheduled, failures) = store::load_scheduled(&config.scheduled_path)?;
    for failure in &failures {
        warn!("{}", failure);
    }

    let data = build_project_data(&catalog, &views, &scheduled);
    if config.printout {
        for (table, category) in &data.categories {
            println!("{:40} ({})", table, category);
        }
    }
    info!(
        "Assembled {} tables ({} views, {} scheduled, {} skipped definitions)",
        data.categories.len(),
        views.len(),
        scheduled.len(),
        failures.len()
    );
    Ok(data)
}

/// Fail if any defining query participates in a reference cycle.
pub fn validate_acyclic(data: &ProjectData) -> Result<(), Error> {
    for (table, query) in &data.queries {
        if query.is_some() {
            resolve_dependencies(&data.queries, table)?;
        }
    }
    Ok(())
}

/// Restrict rendering to `focus` and everything it transitively needs.
pub fn focus_tables(data: &ProjectData, focus: &str) -> Result<IndexSet<String>, Error> {
    if !data.categories.contains_key(focus) {
        return Err(Error::UnknownTable(focus.to_owned()));
    }
    let mut tables = resolve_dependencies(&data.queries, focus)?;
    // the closure of a table without a defining query is empty; the focused
    // table itself is still drawn
    tables.insert(focus.to_owned());
    Ok(tables)
}

/// Build the flowchart graph over `tables`: styled nodes grouped by
/// category, then one colored edge fan per scheduled destination and per
/// view, in that order.
pub fn build_flowchart<'a>(
    data: &ProjectData,
    tables: &IndexSet<String>,
    style: &'a StyleConfig,
) -> Result<FlowchartBuilder<'a>, Error> {
    validate_acyclic(data)?;

    let mut builder = FlowchartBuilder::new(style);
    for group in [
        TableCategory::External,
        TableCategory::BaseTable,
        TableCategory::View,
        TableCategory::Scheduled,
    ] {
        for table in tables {
            let category = data
                .categories
                .get(table)
                .ok_or_else(|| Error::UnknownTable(table.clone()))?;
            if *category == group {
                builder.add_table(table, *category);
            }
        }
    }

    for group in [TableCategory::Scheduled, TableCategory::View] {
        for table in tables {
            if data.categories[table] != group {
                continue;
            }
            if let Some(Some(query)) = data.queries.get(table) {
                builder.link_destination(table, query)?;
            }
        }
    }

    Ok(builder)
}

/// Build the flowchart over `tables` and render it to `output`.
pub fn create_flowchart(
    data: &ProjectData,
    tables: &IndexSet<String>,
    style: &StyleConfig,
    output: &Path,
) -> anyhow::Result<()> {
    let builder = build_flowchart(data, tables, style)?;
    builder.render(output)?;
    info!(
        "Flowchart with {} tables and {} links written to {}",
        builder.node_count(),
        builder.edge_count(),
        output.display()
    );
    Ok(())
}
