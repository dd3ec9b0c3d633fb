use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{anyhow, bail};
use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::classify::TableCategory;
use crate::config::StyleConfig;
use crate::error::Error;
use crate::refs::referenced_tables;

/// Edge colors, reused cyclically across destination tables so neighboring
/// query fans stay visually distinguishable. The color carries no meaning
/// beyond grouping the edges of one defining query.
pub const EDGE_PALETTE: [&str; 13] = [
    "black", "gray", "red", "red4", "skyblue", "blue", "green", "darkgreen", "yellow", "brown",
    "purple", "pink", "orange",
];

#[derive(Debug, Clone)]
struct TableNode {
    name: String,
    category: TableCategory,
}

/// Builds the lineage flowchart: one styled node per table, one colored edge
/// per (source, destination) pair derived from a defining query.
///
/// The palette counter is owned by the builder, so independent builders
/// assign colors independently.
pub struct FlowchartBuilder<'a> {
    graph: DiGraph<TableNode, &'static str>,
    node_index: IndexMap<String, NodeIndex>,
    style: &'a StyleConfig,
    color_counter: usize,
}

impl<'a> FlowchartBuilder<'a> {
    pub fn new(style: &'a StyleConfig) -> Self {
        Self {
            graph: DiGraph::new(),
            node_index: IndexMap::new(),
            style,
            color_counter: 0,
        }
    }

    /// Add a table node, styled by its category. Adding the same name twice
    /// keeps the first node.
    pub fn add_table(&mut self, name: &str, category: TableCategory) {
        if self.node_index.contains_key(name) {
            return;
        }
        let idx = self.graph.add_node(TableNode {
            name: name.to_owned(),
            category,
        });
        self.node_index.insert(name.to_owned(), idx);
    }

    /// Connect every table `query` references to its destination table.
    ///
    /// All edges of one destination share a single palette color; the
    /// palette position advances once per destination, wrapping around when
    /// the palette is exhausted. Only tables already added as nodes can be
    /// matched as sources.
    pub fn link_destination(&mut self, destination: &str, query: &str) -> Result<(), Error> {
        let color = EDGE_PALETTE[self.color_counter % EDGE_PALETTE.len()];
        self.color_counter += 1;

        let &destination_idx = self
            .node_index
            .get(destination)
            .ok_or_else(|| Error::UnknownTable(destination.to_owned()))?;
        let sources = referenced_tables(self.node_index.keys().map(String::as_str), query);
        for source in &sources {
            let &source_idx = self
                .node_index
                .get(source.as_str())
                .ok_or_else(|| Error::UnknownTable(source.clone()))?;
            self.graph.add_edge(source_idx, destination_idx, color);
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_index.contains_key(name)
    }

    /// Every edge as (source, destination, color), in insertion order.
    pub fn edges(&self) -> Vec<(String, String, &'static str)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].name.clone(),
                    self.graph[edge.target()].name.clone(),
                    *edge.weight(),
                )
            })
            .collect()
    }

    /// Emit the graph in DOT form for the external layout engine.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph lineage {\n");
        out.push_str("  ranksep=2;\n");
        out.push_str("  node [fontsize=20, style=filled];\n");
        for idx in self.node_index.values() {
            let node = &self.graph[*idx];
            let style = self.style.for_category(node.category);
            out.push_str(&format!(
                "  \"{}\" [shape={}, color={}, fillcolor={}];\n",
                node.name, style.shape, style.color, style.fillcolor
            ));
        }
        for edge in self.graph.edge_references() {
            out.push_str(&format!(
                "  \"{}\" -> \"{}\" [color={}];\n",
                self.graph[edge.source()].name,
                self.graph[edge.target()].name,
                edge.weight()
            ));
        }
        out.push_str("}\n");
        out
    }

    /// Lay out the graph with the external `dot` engine and write the result
    /// to `output`; the extension selects the format. A `.dot` or `.gv`
    /// target receives the DOT text directly.
    pub fn render(&self, output: &Path) -> anyhow::Result<()> {
        let dot_source = self.to_dot();
        let format = output
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                anyhow!(
                    "Output file {} has no extension to infer a format from",
                    output.display()
                )
            })?;

        if format == "dot" || format == "gv" {
            std::fs::write(output, dot_source)
                .map_err(|err| anyhow!("Failed to write {}: {}", output.display(), err))?;
            return Ok(());
        }

        let mut child = Command::new("dot")
            .arg(format!("-T{}", format))
            .arg("-o")
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| anyhow!("Failed to start the dot layout engine: {}", err))?;
        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| anyhow!("Failed to open stdin of the dot process"))?;
            stdin.write_all(dot_source.as_bytes())?;
        }
        let result = child.wait_with_output()?;
        if !result.status.success() {
            bail!(
                "dot failed to render {}: {}",
                output.display(),
                String::from_utf8_lossy(&result.stderr).trim()
            );
        }
        Ok(())
    }
}
