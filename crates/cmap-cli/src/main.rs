mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cmap_core::{
    BuildPolicy, Dataset, Diagnostic, Graph, NormalizedEntities, build_with, export_layout,
    import_dataset, layout,
};

use config::{FileConfig, Overrides, StrategyName};

#[derive(Parser)]
#[command(name = "cmap", about = "Build and lay out a conference connection map")]
struct Cli {
    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Position the graph and write it as JSON
    Layout {
        /// Dataset JSON file
        input: PathBuf,

        /// Layout strategy, overriding the config file
        #[arg(long, value_enum)]
        strategy: Option<StrategyName>,

        /// TOML layout configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Force layout seed
        #[arg(long)]
        seed: Option<u64>,

        /// Force layout iteration count
        #[arg(long)]
        iterations: Option<usize>,

        /// Restrict to one author's personal map
        #[arg(long)]
        author: Option<String>,

        /// Output file (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show graph statistics
    Stats {
        /// Dataset JSON file
        input: PathBuf,

        /// TOML configuration; only the [build] table applies
        #[arg(long)]
        config: Option<PathBuf>,

        /// Restrict to one author's personal map
        #[arg(long)]
        author: Option<String>,
    },

    /// List every skipped row without laying anything out
    Check {
        /// Dataset JSON file
        input: PathBuf,

        /// TOML configuration; only the [build] table applies
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Layout {
            input,
            strategy,
            config,
            seed,
            iterations,
            author,
            output,
        } => {
            let overrides = Overrides {
                strategy: *strategy,
                seed: *seed,
                iterations: *iterations,
            };
            cmd_layout(
                input,
                config.as_deref(),
                &overrides,
                author.as_deref(),
                output.as_deref(),
            )
        }
        Commands::Stats {
            input,
            config,
            author,
        } => cmd_stats(input, config.as_deref(), author.as_deref()),
        Commands::Check { input, config } => cmd_check(input, config.as_deref()),
    }
}

fn load_dataset(path: &Path, author: Option<&str>) -> Result<Dataset> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let dataset =
        import_dataset(&json).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(match author {
        Some(author) => dataset.authored_by(author),
        None => dataset,
    })
}

fn build_graph(dataset: &Dataset, policy: BuildPolicy) -> Graph {
    build_with(&NormalizedEntities::from_dataset(dataset), policy)
}

fn warn_all(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        tracing::warn!("{diagnostic}");
    }
}

fn cmd_layout(
    input: &Path,
    config: Option<&Path>,
    overrides: &Overrides,
    author: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let config = FileConfig::load(config)?;
    let dataset = load_dataset(input, author)?;
    let graph = build_graph(&dataset, config.build_policy());

    let positioned = layout(&graph, &config.strategy(overrides));
    warn_all(&positioned.diagnostics);

    let json = export_layout(&positioned, &graph.edges).context("failed to serialize layout")?;
    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "wrote {} nodes, {} edges to {}",
                positioned.nodes.len(),
                graph.edges.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_stats(input: &Path, config: Option<&Path>, author: Option<&str>) -> Result<()> {
    let config = FileConfig::load(config)?;
    let dataset = load_dataset(input, author)?;
    let graph = build_graph(&dataset, config.build_policy());
    warn_all(&graph.skipped);

    let stats = graph.stats();
    println!("people:       {}", stats.people);
    println!("speakers:     {}", stats.speakers);
    println!(
        "talks:        {} ({} placeholder)",
        stats.talks, stats.placeholder_talks
    );
    println!(
        "speaker of:   {} primary, {} secondary",
        stats.primary_speaker_edges, stats.secondary_speaker_edges
    );
    println!(
        "connections:  {} to talks, {} to people",
        stats.talk_connections, stats.person_connections
    );
    println!("diagnostics:  {}", stats.diagnostics);
    Ok(())
}

fn cmd_check(input: &Path, config: Option<&Path>) -> Result<()> {
    let config = FileConfig::load(config)?;
    let dataset = load_dataset(input, None)?;
    let graph = build_graph(&dataset, config.build_policy());

    if graph.skipped.is_empty() {
        println!("ok");
    } else {
        for diagnostic in &graph.skipped {
            println!("{diagnostic}");
        }
    }
    Ok(())
}
