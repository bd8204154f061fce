//! Render and dot command implementations.

use super::DiagramArgs;
use anyhow::{Context, Result};
use model_erd::config::{ErdConfig, ErdConfigBuilder};
use model_erd::erd::ErdDocument;
use model_erd::render::{GraphvizRenderer, RenderFormat};
use model_erd::{generate, generate_dot};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Run the render command
pub fn run(
    args: DiagramArgs,
    format: Option<String>,
    engine: Option<String>,
    graphviz: PathBuf,
) -> Result<()> {
    // Infer format from the output extension when not given
    let format = format.or_else(|| {
        args.output
            .as_ref()
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .and_then(RenderFormat::from_extension)
            .map(|f| f.to_string())
    });

    let output = args.output.clone();
    let config = builder_from_args(args)
        .format(format)
        .engine(engine)
        .build()?;

    let renderer = GraphvizRenderer::with_program(graphviz);
    let diagram = generate(&config, &renderer)?;

    write_output(output.as_deref(), &diagram.artifact)?;
    if let Some(path) = &output {
        eprintln!("ERD rendered to: {} [{}]", path.display(), config.format);
    }
    print_summary(&diagram.document);
    Ok(())
}

/// Run the dot command
pub fn run_dot(args: DiagramArgs) -> Result<()> {
    let output = args.output.clone();
    let config = builder_from_args(args).build()?;

    let document = generate_dot(&config)?;

    write_output(output.as_deref(), document.source.as_bytes())?;
    if let Some(path) = &output {
        eprintln!("ERD written to: {}", path.display());
    }
    print_summary(&document);
    Ok(())
}

fn builder_from_args(args: DiagramArgs) -> ErdConfigBuilder {
    ErdConfig::builder()
        .source(args.source)
        .config_file(args.config)
        .include(args.include.as_deref())
        .exclude(args.exclude.as_deref())
        .associations(args.associations.as_deref())
        .columns(args.no_columns.then_some(false))
        .arrow_shapes(args.arrow_shapes)
        .arrow_size(args.arrow_size)
        .color(args.color)
        .line_width(args.line_width)
        .direction(args.direction)
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            file.write_all(bytes)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn print_summary(document: &ErdDocument) {
    for warning in &document.warnings {
        eprintln!("  ⚠ {}", warning);
    }
    eprintln!(
        "\nERD: {} entities, {} relationships, {} skipped",
        document.node_count,
        document.edge_count,
        document.warnings.len()
    );
}
