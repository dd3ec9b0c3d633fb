use indexmap::{IndexMap, IndexSet};

use crate::error::Error;
use crate::refs::referenced_tables;

/// Compute the full set of tables `table` needs, itself included when it is
/// built by a query.
///
/// Walks defining queries depth first, unioning direct references with the
/// closures of each referenced table. Tables with no defining query resolve
/// to the empty set. Re-entering a table whose definition is still being
/// expanded means the definitions reference each other; that terminates with
/// [`Error::CyclicDependency`] instead of recursing forever.
pub fn resolve_dependencies(
    queries: &IndexMap<String, Option<String>>,
    table: &str,
) -> Result<IndexSet<String>, Error> {
    let mut resolved = IndexSet::new();
    let mut expanded = IndexSet::new();
    let mut path = vec![];
    walk(queries, table, &mut path, &mut resolved, &mut expanded)?;
    Ok(resolved)
}

fn walk(
    queries: &IndexMap<String, Option<String>>,
    table: &str,
    path: &mut Vec<String>,
    resolved: &mut IndexSet<String>,
    expanded: &mut IndexSet<String>,
) -> Result<(), Error> {
    let Some(Some(query)) = queries.get(table) else {
        return Ok(());
    };
    if let Some(pos) = path.iter().position(|t| t == table) {
        let mut cycle: Vec<String> = path[pos..].to_vec();
        cycle.push(table.to_owned());
        return Err(Error::CyclicDependency { cycle });
    }
    // A table expanded earlier in the walk contributes nothing new.
    if expanded.contains(table) {
        return Ok(());
    }

    path.push(table.to_owned());
    resolved.insert(table.to_owned());
    let direct = referenced_tables(queries.keys().map(String::as_str), query);
    for reference in &direct {
        resolved.insert(reference.clone());
    }
    for reference in &direct {
        walk(queries, reference, path, resolved, expanded)?;
    }
    path.pop();
    expanded.insert(table.to_owned());

    Ok(())
}
