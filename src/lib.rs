//! # bqflow
//!
//! A library for discovering table-level lineage across a BigQuery project
//! and rendering it as a Graphviz flowchart.
//!
//! # Features
//!
//! - Strip comments from stored SQL so commented-out table mentions never
//!   count as references.
//! - Detect which known tables a query references.
//! - Classify every table as EXTERNAL, BASE_TABLE, VIEW or SCHEDULED.
//! - Resolve the transitive dependency closure of any table, with cycle
//!   detection.
//! - Build a styled, colored dependency graph and render it through the
//!   external `dot` layout engine.
//!
//! # Example
//!
//! ```rust,no_run
//! use bqflow::config::Config;
//! use bqflow::flowchart::{assemble_project_data, create_flowchart};
//!
//! fn main() -> anyhow::Result<()> {
//!     env_logger::init();
//!
//!     let config = Config {
//!         catalog: Some("bigquery_tables.json".into()),
//!         ..Config::default()
//!     };
//!     config.validate()?;
//!
//!     let data = assemble_project_data(&config)?;
//!     let tables = data.table_names();
//!     create_flowchart(&data, &tables, &config.style, &config.flowchart_file)?;
//!     Ok(())
//! }
//! ```
pub mod catalog;
pub mod classify;
pub mod config;
pub mod deps;
pub mod error;
pub mod flowchart;
pub mod graph;
pub mod refs;
pub mod sanitize;
pub mod store;
