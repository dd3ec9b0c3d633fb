use std::path::PathBuf;
use std::time::Instant;

use bqflow::config::Config;
use bqflow::deps::resolve_dependencies;
use bqflow::error::Error;
use bqflow::flowchart::{assemble_project_data, create_flowchart, focus_tables};
use clap::Parser as ClapParser;
use clap::Subcommand;
use serde::Serialize;

#[derive(clap::Parser)]
#[command(name = "bqflow")]
#[command(about = "BigQuery table lineage flowchart generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the lineage flowchart for a project.
    Flowchart(FlowchartCommand),
    /// Print the transitive dependency closure of one table.
    Resolve(ResolveCommand),
    /// Print every table with its provenance category.
    Classify(ClassifyCommand),
}

#[derive(clap::Args)]
struct ProjectArgs {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Path to the metadata snapshot JSON (overrides the config file).
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Directory containing the stored view definitions.
    #[arg(long)]
    views_path: Option<PathBuf>,
    /// Directory containing the stored scheduled-query definitions.
    #[arg(long)]
    scheduled_path: Option<PathBuf>,
}

impl ProjectArgs {
    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if let Some(catalog) = self.catalog {
            config.catalog = Some(catalog);
        }
        if let Some(views_path) = self.views_path {
            config.views_path = views_path;
        }
        if let Some(scheduled_path) = self.scheduled_path {
            config.scheduled_path = scheduled_path;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(clap::Args)]
struct FlowchartCommand {
    #[command(flatten)]
    project: ProjectArgs,
    /// Output file; the extension selects the format (overrides the config
    /// file).
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Render only this table and the tables it transitively depends on.
    #[arg(long)]
    focus: Option<String>,
}

#[derive(clap::Args)]
struct ResolveCommand {
    #[command(flatten)]
    project: ProjectArgs,
    /// Fully qualified table name (dataset.table).
    table: String,
    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(clap::Args)]
struct ClassifyCommand {
    #[command(flatten)]
    project: ProjectArgs,
    /// Emit JSON instead of the aligned text listing.
    #[arg(long)]
    json: bool,
    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct ResolvedClosure<'a> {
    table: &'a str,
    closure: Vec<String>,
}

fn run_flowchart(cmd: FlowchartCommand) -> anyhow::Result<()> {
    let config = cmd.project.into_config()?;
    let data = assemble_project_data(&config)?;
    let tables = match &cmd.focus {
        Some(focus) => focus_tables(&data, focus)?,
        None => data.table_names(),
    };
    let output = cmd.output.unwrap_or_else(|| config.flowchart_file.clone());
    create_flowchart(&data, &tables, &config.style, &output)
}

fn run_resolve(cmd: ResolveCommand) -> anyhow::Result<()> {
    let config = cmd.project.into_config()?;
    let data = assemble_project_data(&config)?;
    if !data.categories.contains_key(&cmd.table) {
        return Err(Error::UnknownTable(cmd.table).into());
    }
    let closure = resolve_dependencies(&data.queries, &cmd.table)?;
    let out = ResolvedClosure {
        table: &cmd.table,
        closure: closure.into_iter().collect(),
    };
    let out_str = if cmd.pretty {
        serde_json::to_string_pretty(&out)?
    } else {
        serde_json::to_string(&out)?
    };
    println!("{}", out_str);
    Ok(())
}

fn run_classify(cmd: ClassifyCommand) -> anyhow::Result<()> {
    let config = cmd.project.into_config()?;
    let data = assemble_project_data(&config)?;
    if cmd.json {
        let out_str = if cmd.pretty {
            serde_json::to_string_pretty(&data.categories)?
        } else {
            serde_json::to_string(&data.categories)?
        };
        println!("{}", out_str);
    } else {
        for (table, category) in &data.categories {
            println!("{:40} ({})", table, category);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let now = Instant::now();

    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Flowchart(cmd) => run_flowchart(cmd)?,
        Commands::Resolve(cmd) => run_resolve(cmd)?,
        Commands::Classify(cmd) => run_classify(cmd)?,
    }

    let elapsed = now.elapsed();
    log::info!("Elapsed: {:.2?}", elapsed);

    Ok(())
}
