mod render;
mod schema;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "model-erd")]
#[command(version)]
#[command(about = "Draw entity-relationship diagrams from ORM model metadata", long_about = None)]
pub struct Cli {
    /// Verbose logging to stderr (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by the diagram commands
#[derive(Args, Debug, Clone)]
pub struct DiagramArgs {
    /// Schema document (YAML or JSON). Optional when --config names a source
    pub source: Option<PathBuf>,

    /// YAML config file; command-line flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only draw these entities (comma-separated names or glob patterns)
    #[arg(short, long)]
    pub include: Option<String>,

    /// Leave out these entities (comma-separated, applied after --include)
    #[arg(short, long)]
    pub exclude: Option<String>,

    /// Only draw relationships touching these entities (comma-separated)
    #[arg(short, long)]
    pub associations: Option<String>,

    /// Draw entity names only, without attribute rows
    #[arg(long)]
    pub no_columns: bool,

    /// Arrow shapes for a kind: KIND=SOURCE,TARGET (e.g. HasOne=none,tee). Repeatable
    #[arg(long = "arrow-shape", value_name = "KIND=SOURCE,TARGET")]
    pub arrow_shapes: Vec<String>,

    /// Arrow size
    #[arg(long)]
    pub arrow_size: Option<f64>,

    /// Edge color
    #[arg(long)]
    pub color: Option<String>,

    /// Edge line width
    #[arg(long)]
    pub line_width: Option<f64>,

    /// Layout direction: lr, rl, tb, bt
    #[arg(long)]
    pub direction: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the diagram through Graphviz
    Render {
        #[command(flatten)]
        diagram: DiagramArgs,

        /// Output format: svg, png, pdf, jpg, gif, json, dot (default: from --output extension, else svg)
        #[arg(short, long)]
        format: Option<String>,

        /// Graphviz layout engine: dot, neato, fdp, sfdp, circo, twopi, osage, patchwork
        #[arg(long)]
        engine: Option<String>,

        /// Graphviz binary to run
        #[arg(long, default_value = "dot")]
        graphviz: PathBuf,
    },

    /// Print the Graphviz description without rendering it
    Dot {
        #[command(flatten)]
        diagram: DiagramArgs,
    },

    /// Print JSON Schemas for the schema document and config file
    Schema {
        /// Only print this schema (schema, config)
        #[arg(short, long)]
        name: Option<String>,

        /// Write each schema to <DIR>/<name>.schema.json instead of stdout
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Render {
            diagram,
            format,
            engine,
            graphviz,
        } => render::run(diagram, format, engine, graphviz),
        Commands::Dot { diagram } => render::run_dot(diagram),
        Commands::Schema { name, output_dir } => schema::run(name, output_dir),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "model-erd", &mut io::stdout());
            Ok(())
        }
    }
}
