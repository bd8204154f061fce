//! Hand-off to the external Graphviz layout engine.

use crate::error::ErdError;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::str::FromStr;
use tracing::info;

/// Output format requested from the layout engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    #[default]
    Svg,
    Png,
    Pdf,
    Jpg,
    Gif,
    Json,
    /// Laid-out DOT with positions
    Dot,
}

impl FromStr for RenderFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "svg" => Ok(RenderFormat::Svg),
            "png" => Ok(RenderFormat::Png),
            "pdf" => Ok(RenderFormat::Pdf),
            "jpg" | "jpeg" => Ok(RenderFormat::Jpg),
            "gif" => Ok(RenderFormat::Gif),
            "json" => Ok(RenderFormat::Json),
            "dot" | "gv" => Ok(RenderFormat::Dot),
            _ => Err(format!(
                "Unknown format: {}. Valid options: svg, png, pdf, jpg, gif, json, dot",
                s
            )),
        }
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl RenderFormat {
    /// Value passed to `-T`, also used as file extension
    pub fn extension(&self) -> &'static str {
        match self {
            RenderFormat::Svg => "svg",
            RenderFormat::Png => "png",
            RenderFormat::Pdf => "pdf",
            RenderFormat::Jpg => "jpg",
            RenderFormat::Gif => "gif",
            RenderFormat::Json => "json",
            RenderFormat::Dot => "dot",
        }
    }

    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        ext.parse().ok()
    }
}

/// Graphviz layout algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutEngine {
    Dot,
    Neato,
    Fdp,
    Sfdp,
    #[default]
    Circo,
    Twopi,
    Osage,
    Patchwork,
}

impl FromStr for LayoutEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot" => Ok(LayoutEngine::Dot),
            "neato" => Ok(LayoutEngine::Neato),
            "fdp" => Ok(LayoutEngine::Fdp),
            "sfdp" => Ok(LayoutEngine::Sfdp),
            "circo" => Ok(LayoutEngine::Circo),
            "twopi" => Ok(LayoutEngine::Twopi),
            "osage" => Ok(LayoutEngine::Osage),
            "patchwork" => Ok(LayoutEngine::Patchwork),
            _ => Err(format!(
                "Unknown engine: {}. Valid options: dot, neato, fdp, sfdp, circo, twopi, osage, patchwork",
                s
            )),
        }
    }
}

impl fmt::Display for LayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayoutEngine::Dot => "dot",
            LayoutEngine::Neato => "neato",
            LayoutEngine::Fdp => "fdp",
            LayoutEngine::Sfdp => "sfdp",
            LayoutEngine::Circo => "circo",
            LayoutEngine::Twopi => "twopi",
            LayoutEngine::Osage => "osage",
            LayoutEngine::Patchwork => "patchwork",
        };
        write!(f, "{}", name)
    }
}

/// Turns a diagram document into a rendered artifact
pub trait Renderer {
    fn render(
        &self,
        source: &str,
        format: RenderFormat,
        engine: LayoutEngine,
    ) -> Result<Vec<u8>, ErdError>;
}

/// Renders by piping the document through the Graphviz `dot` binary
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    program: PathBuf,
}

impl Default for GraphvizRenderer {
    fn default() -> Self {
        Self {
            program: PathBuf::from("dot"),
        }
    }
}

impl GraphvizRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific Graphviz binary
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Renderer for GraphvizRenderer {
    fn render(
        &self,
        source: &str,
        format: RenderFormat,
        engine: LayoutEngine,
    ) -> Result<Vec<u8>, ErdError> {
        info!(
            program = %self.program.display(),
            %format,
            %engine,
            "rendering with graphviz"
        );

        let mut child = Command::new(&self.program)
            .arg(format!("-K{}", engine))
            .arg(format!("-T{}", format.extension()))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ErdError::render(format!(
                        "Graphviz '{}' command not found. Install Graphviz or use the `dot` subcommand to emit the description only.",
                        self.program.display()
                    ))
                } else {
                    ErdError::render(format!("failed to run {}: {}", self.program.display(), e))
                }
            })?;

        // stdin is dropped after the write so dot sees EOF. A failed write
        // usually means dot exited early, so its stderr is collected first.
        let write_error = child
            .stdin
            .take()
            .and_then(|mut stdin| stdin.write_all(source.as_bytes()).err());

        let output = child
            .wait_with_output()
            .map_err(|e| ErdError::render(format!("failed to read graphviz output: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ErdError::render(format!(
                "graphviz exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        if let Some(e) = write_error {
            return Err(ErdError::render(format!("failed to write to graphviz: {}", e)));
        }

        Ok(output.stdout)
    }
}
