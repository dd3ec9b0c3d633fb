use std::collections::HashSet;
use std::str::FromStr;

use bqflow::catalog::{Catalog, TableRecord};
use bqflow::classify::TableCategory;
use bqflow::config::StyleConfig;
use bqflow::deps::resolve_dependencies;
use bqflow::error::Error;
use bqflow::flowchart::{build_flowchart, build_project_data, focus_tables};
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
struct ExpectedEdge {
    source: String,
    destination: String,
}

#[derive(Deserialize, Debug)]
struct Focus {
    table: String,
    tables: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct FlowchartTest {
    name: String,
    catalog: Vec<TableRecord>,
    #[serde(default)]
    views: IndexMap<String, String>,
    #[serde(default)]
    scheduled: IndexMap<String, String>,
    #[serde(default)]
    categories: IndexMap<String, String>,
    #[serde(default)]
    edges: Vec<ExpectedEdge>,
    #[serde(default)]
    expect_cycle: bool,
    focus: Option<Focus>,
}

#[derive(Deserialize, Debug)]
struct FlowchartTestData {
    tests: Vec<FlowchartTest>,
}

const FLOWCHART_TESTS_FILE: &str = "tests/flowchart_tests.toml";

#[test]
fn test_flowchart() {
    let raw =
        std::fs::read_to_string(FLOWCHART_TESTS_FILE).expect("Cannot open flowchart test cases");
    let test_data: FlowchartTestData =
        toml::from_str(&raw).expect("Cannot parse test cases defined in toml");

    for test in test_data.tests {
        println!("Testing flowchart scenario: {}", test.name);
        let catalog = Catalog {
            tables: test.catalog.clone(),
        };
        let data = build_project_data(&catalog, &test.views, &test.scheduled);

        // The four categories partition the discovered table universe.
        let mut universe: IndexSet<String> =
            test.catalog.iter().map(|t| t.name.clone()).collect();
        universe.extend(test.views.keys().cloned());
        universe.extend(test.scheduled.keys().cloned());
        assert_eq!(
            data.categories.keys().cloned().collect::<IndexSet<_>>(),
            universe,
            "universe mismatch in scenario `{}`",
            test.name
        );

        for (table, expected) in &test.categories {
            let expected = TableCategory::from_str(expected)
                .unwrap_or_else(|_| panic!("Unknown expected category for {}", table));
            assert_eq!(
                data.categories[table], expected,
                "category of {} in scenario `{}`",
                table, test.name
            );
        }

        let style = StyleConfig::default();
        let built = build_flowchart(&data, &data.table_names(), &style);

        if test.expect_cycle {
            assert!(
                matches!(built, Err(Error::CyclicDependency { .. })),
                "scenario `{}` should report a cycle",
                test.name
            );
            continue;
        }

        let builder = built
            .unwrap_or_else(|err| panic!("Could not build flowchart for `{}`: {}", test.name, err));
        assert_eq!(builder.node_count(), universe.len());

        let edges: HashSet<(String, String)> = builder
            .edges()
            .into_iter()
            .map(|(source, destination, _)| (source, destination))
            .collect();
        let expected_edges: HashSet<(String, String)> = test
            .edges
            .iter()
            .map(|e| (e.source.clone(), e.destination.clone()))
            .collect();
        assert_eq!(edges, expected_edges, "edges in scenario `{}`", test.name);

        // Every closure is a fixed point of resolution.
        for (table, query) in &data.queries {
            if query.is_none() {
                continue;
            }
            let closure = resolve_dependencies(&data.queries, table).unwrap();
            for member in &closure {
                let member_closure = resolve_dependencies(&data.queries, member).unwrap();
                assert!(
                    member_closure.is_subset(&closure),
                    "closure of {} is not closed in scenario `{}`",
                    table,
                    test.name
                );
            }
        }

        if let Some(focus) = &test.focus {
            let tables = focus_tables(&data, &focus.table).unwrap();
            let expected: IndexSet<String> = focus.tables.iter().cloned().collect();
            assert_eq!(
                tables, expected,
                "focus closure of {} in scenario `{}`",
                focus.table, test.name
            );
        }
    }
}

#[test]
fn focusing_an_unknown_table_fails() {
    let catalog = Catalog { tables: vec![] };
    let data = build_project_data(&catalog, &IndexMap::new(), &IndexMap::new());
    assert!(matches!(
        focus_tables(&data, "ds.gone"),
        Err(Error::UnknownTable(_))
    ));
}
