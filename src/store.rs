use std::path::{Path, PathBuf};

use anyhow::anyhow;
use indexmap::IndexMap;
use log::debug;

use crate::error::Error;

/// A scheduled-query definition: the table it populates plus the SQL body.
#[derive(Debug, Clone)]
pub struct ScheduledQuery {
    pub destination: String,
    pub sql: String,
}

/// Split a stored scheduled-query file into its destination header and SQL
/// body.
///
/// The downloader writes these files as a `# destination_table: <name>`
/// header line, a blank line, then the query text.
pub fn parse_scheduled_query(file: &str, raw: &str) -> Result<ScheduledQuery, Error> {
    let (header, body) = raw.split_once('\n').unwrap_or((raw, ""));
    let destination = header
        .split_once(": ")
        .map(|(_, destination)| destination.trim())
        .ok_or_else(|| Error::MalformedQueryDefinition {
            file: file.to_owned(),
            reason: "first line does not name a destination table".to_owned(),
        })?;
    if destination.is_empty() {
        return Err(Error::MalformedQueryDefinition {
            file: file.to_owned(),
            reason: "destination table name is empty".to_owned(),
        });
    }
    Ok(ScheduledQuery {
        destination: destination.to_owned(),
        sql: body.to_owned(),
    })
}

/// Load every stored view body, keyed by the view's qualified name (the file
/// stem of `<dataset.table>.sql`).
pub fn load_views(dir: &Path) -> anyhow::Result<IndexMap<String, String>> {
    let mut views = IndexMap::new();
    for path in sql_files(dir)? {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let sql = std::fs::read_to_string(&path)
            .map_err(|_| anyhow!("Failed to read view file {}", path.display()))?;
        views.insert(stem.to_owned(), sql);
    }
    Ok(views)
}

/// Load every stored scheduled query, keyed by destination table.
///
/// A malformed file is collected as an [`Error::MalformedQueryDefinition`]
/// and skipped; the remaining files still load.
pub fn load_scheduled(dir: &Path) -> anyhow::Result<(IndexMap<String, String>, Vec<Error>)> {
    let mut queries = IndexMap::new();
    let mut failures = vec![];
    for path in sql_files(dir)? {
        let raw = std::fs::read_to_string(&path)
            .map_err(|_| anyhow!("Failed to read scheduled query file {}", path.display()))?;
        match parse_scheduled_query(&path.display().to_string(), &raw) {
            Ok(query) => {
                queries.insert(query.destination, query.sql);
            }
            Err(err) => failures.push(err),
        }
    }
    Ok((queries, failures))
}

fn sql_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.exists() {
        debug!("Query store {} does not exist, treating as empty", dir.display());
        return Ok(vec![]);
    }
    let entries = std::fs::read_dir(dir)
        .map_err(|_| anyhow!("Failed to list query store directory {}", dir.display()))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|res| res.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    // read_dir yields entries in filesystem order
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_destination_header_and_body() {
        let raw = "# destination_table: ds.daily\n\nSELECT * FROM `ds.raw`\n";
        let query = parse_scheduled_query("daily.sql", raw).unwrap();
        assert_eq!(query.destination, "ds.daily");
        assert_eq!(query.sql, "\nSELECT * FROM `ds.raw`\n");
    }

    #[test]
    fn missing_header_is_malformed() {
        let raw = "SELECT * FROM `ds.raw`\n";
        let err = parse_scheduled_query("broken.sql", raw).unwrap_err();
        match err {
            Error::MalformedQueryDefinition { file, .. } => assert_eq!(file, "broken.sql"),
            other => panic!("Expected a malformed query definition, got {:?}", other),
        }
    }

    #[test]
    fn empty_destination_is_malformed() {
        let raw = "# destination_table: \nSELECT 1\n";
        assert!(parse_scheduled_query("empty.sql", raw).is_err());
    }

    #[test]
    fn header_only_file_parses_with_empty_body() {
        let query = parse_scheduled_query("bare.sql", "# destination_table: ds.t").unwrap();
        assert_eq!(query.destination, "ds.t");
        assert_eq!(query.sql, "");
    }

    #[test]
    fn missing_store_directory_is_empty() {
        let views = load_views(Path::new("does/not/exist")).unwrap();
        assert!(views.is_empty());
    }
}
