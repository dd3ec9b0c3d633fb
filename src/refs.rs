use indexmap::IndexSet;
use regex::Regex;

/// Return the subset of `universe` that `query` textually references.
///
/// A table counts as referenced when its name appears at a word boundary and
/// is immediately followed by a closing backtick, the way fully-qualified
/// identifiers are quoted in BigQuery SQL. This is containment matching, not
/// parsing: a name whose dotted tail coincides with the tail of a longer
/// quoted identifier (`ds.raw` inside `` `proj.ds.raw` ``) still matches.
/// Only names already in `universe` can ever be detected.
pub fn referenced_tables<'a>(
    universe: impl IntoIterator<Item = &'a str>,
    query: &str,
) -> IndexSet<String> {
    let mut referenced = IndexSet::new();
    for name in universe {
        let pattern = format!(r"\b{}`", regex::escape(name));
        if let Ok(re) = Regex::new(&pattern) {
            if re.is_match(query) {
                referenced.insert(name.to_owned());
            }
        }
    }
    referenced
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    #[test]
    fn finds_backtick_quoted_reference() {
        let tables = universe(&["ds.raw", "ds.other"]);
        let found = referenced_tables(
            tables.iter().map(String::as_str),
            "SELECT * FROM `ds.raw`",
        );
        assert_eq!(found, IndexSet::from(["ds.raw".to_owned()]));
    }

    #[test]
    fn empty_universe_yields_empty_result() {
        let found = referenced_tables(std::iter::empty::<&str>(), "SELECT * FROM `ds.raw`");
        assert!(found.is_empty());
    }

    #[test]
    fn dots_are_matched_literally() {
        let tables = universe(&["ds.raw"]);
        let found = referenced_tables(tables.iter().map(String::as_str), "SELECT * FROM `dsxraw`");
        assert!(found.is_empty());
    }

    #[test]
    fn requires_the_closing_backtick() {
        let tables = universe(&["ds.raw"]);
        let found = referenced_tables(tables.iter().map(String::as_str), "SELECT * FROM ds.raw");
        assert!(found.is_empty());
    }

    #[test]
    fn name_inside_a_longer_word_does_not_match() {
        let tables = universe(&["ds.raw"]);
        let found = referenced_tables(
            tables.iter().map(String::as_str),
            "SELECT * FROM `other_ds.raw`",
        );
        assert!(found.is_empty());
    }

    #[test]
    fn preserves_universe_order() {
        let tables = universe(&["ds.b", "ds.a"]);
        let found = referenced_tables(
            tables.iter().map(String::as_str),
            "SELECT * FROM `ds.a` JOIN `ds.b` USING (id)",
        );
        assert_eq!(
            found.into_iter().collect::<Vec<_>>(),
            vec!["ds.b".to_owned(), "ds.a".to_owned()]
        );
    }
}
