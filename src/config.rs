use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail};
use serde::Deserialize;

use crate::classify::TableCategory;

/// Run parameters, read from a TOML file and overridable per flag on the
/// command line. Missing fields fall back to the documented defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to the metadata snapshot JSON listing every table in the project.
    pub catalog: Option<PathBuf>,
    /// Directory holding one `<dataset.table>.sql` file per view.
    #[serde(default = "default_views_path")]
    pub views_path: PathBuf,
    /// Directory holding the stored scheduled-query definitions.
    #[serde(default = "default_scheduled_path")]
    pub scheduled_path: PathBuf,
    /// Where the rendered flowchart goes; the extension selects the format.
    #[serde(default = "default_flowchart_file")]
    pub flowchart_file: PathBuf,
    /// Echo the table listing while assembling the project data.
    #[serde(default)]
    pub printout: bool,
    /// Node styling per table category.
    #[serde(default)]
    pub style: StyleConfig,
}

fn default_views_path() -> PathBuf {
    PathBuf::from("views")
}

fn default_scheduled_path() -> PathBuf {
    PathBuf::from("scheduled_queries")
}

fn default_flowchart_file() -> PathBuf {
    PathBuf::from("flowchart.pdf")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: None,
            views_path: default_views_path(),
            scheduled_path: default_scheduled_path(),
            flowchart_file: default_flowchart_file(),
            printout: false,
            style: StyleConfig::default(),
        }
    }
}

impl Config {
    /// Read a configuration file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|_| anyhow!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&raw).map_err(|err| {
            anyhow!(
                "Failed to parse TOML config in file {} due to error: {}",
                path.display(),
                err
            )
        })
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Check the configuration once at startup, before any component runs.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(catalog) = &self.catalog {
            if !catalog.is_file() {
                bail!("Catalog snapshot {} does not exist", catalog.display());
            }
        }
        for dir in [&self.views_path, &self.scheduled_path] {
            if dir.exists() && !dir.is_dir() {
                bail!("Query store path {} is not a directory", dir.display());
            }
        }
        if self.flowchart_file.extension().is_none() {
            bail!(
                "Flowchart file {} needs an extension to choose an output format",
                self.flowchart_file.display()
            );
        }
        Ok(())
    }
}

/// How nodes of one category are drawn.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeStyle {
    pub shape: String,
    pub color: String,
    pub fillcolor: String,
}

impl NodeStyle {
    fn new(shape: &str, color: &str, fillcolor: &str) -> Self {
        Self {
            shape: shape.to_owned(),
            color: color.to_owned(),
            fillcolor: fillcolor.to_owned(),
        }
    }
}

/// The stable category -> style mapping used when drawing nodes.
///
/// Defaults: external tables are palegreen cylinders, base tables snow
/// houses, views khaki cds, scheduled tables skyblue ellipses.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub external: NodeStyle,
    pub base_table: NodeStyle,
    pub view: NodeStyle,
    pub scheduled: NodeStyle,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            external: NodeStyle::new("cylinder", "palegreen3", "palegreen"),
            base_table: NodeStyle::new("house", "snow3", "snow"),
            view: NodeStyle::new("cds", "khaki3", "khaki"),
            scheduled: NodeStyle::new("ellipse", "skyblue3", "skyblue"),
        }
    }
}

impl StyleConfig {
    pub fn for_category(&self, category: TableCategory) -> &NodeStyle {
        match category {
            TableCategory::External => &self.external,
            TableCategory::BaseTable => &self.base_table,
            TableCategory::View => &self.view,
            TableCategory::Scheduled => &self.scheduled,
        }
    }
}
