use thiserror::Error;

/// Failures with a structural meaning for the lineage pipeline.
///
/// Everything else (I/O, JSON parsing, rendering) travels as a plain
/// [`anyhow::Error`] with context attached at the call site.
#[derive(Debug, Error)]
pub enum Error {
    /// Two or more defining queries reference each other, directly or
    /// transitively. The cycle lists the tables in reference order, with the
    /// re-entered table repeated at the end.
    #[error("Found cyclic dependency between defining queries: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    /// A stored scheduled-query file that cannot be split into a destination
    /// header and a SQL body.
    #[error("Malformed query definition in {file}: {reason}")]
    MalformedQueryDefinition { file: String, reason: String },

    /// A table was requested as a graph node or closure root but is not part
    /// of the current table universe.
    #[error("Table `{0}` is not part of the table universe")]
    UnknownTable(String),
}
