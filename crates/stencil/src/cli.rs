//! Command-line parsing and the render run.
//!
//! Each template is given as `SRC[:DEST]` with `--template` (repeatable) or
//! as a positional `SRC [DEST]` pair. A missing destination means standard
//! output. Sources that are directories are rendered as trees.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use stencil_render::{Delimiters, FileRenderer, RenderConfig};

#[derive(Parser, Debug)]
#[command(name = "stencil")]
#[command(version, about = "Render configuration files from templates and environment variables", long_about = None)]
pub struct Cli {
    /// Template to render, as SRC or SRC:DEST (repeatable)
    #[arg(short = 't', long = "template", value_name = "SRC[:DEST]", value_parser = parse_template_target)]
    pub templates: Vec<TemplateTarget>,

    /// Template file or directory
    pub source: Option<PathBuf>,

    /// Destination file or directory (standard output when omitted)
    #[arg(requires = "source")]
    pub dest: Option<PathBuf>,

    /// Skip destinations that already exist
    #[arg(long)]
    pub no_overwrite: bool,

    /// Variable delimiters, e.g. '<<:>>' (empty for the defaults)
    #[arg(long, value_name = "LEFT:RIGHT", value_parser = parse_delims)]
    pub delims: Option<Delimiters>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// One template source and where its output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateTarget {
    pub source: PathBuf,
    pub dest: Option<PathBuf>,
}

impl TemplateTarget {
    pub fn new(source: impl Into<PathBuf>, dest: Option<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest,
        }
    }
}

/// Parses `SRC[:DEST]`. An empty `DEST` means standard output.
pub fn parse_template_target(s: &str) -> Result<TemplateTarget, String> {
    let (source, dest) = match s.split_once(':') {
        Some((source, dest)) => (source, Some(dest).filter(|d| !d.is_empty())),
        None => (s, None),
    };
    if source.is_empty() {
        return Err(format!("missing template source in {s:?}"));
    }
    Ok(TemplateTarget::new(source, dest.map(PathBuf::from)))
}

/// Parses `LEFT:RIGHT`. The empty string selects the default delimiters.
pub fn parse_delims(s: &str) -> Result<Delimiters, String> {
    if s.is_empty() {
        return Ok(Delimiters::new("", ""));
    }
    match s.split_once(':') {
        Some((left, right)) if !left.is_empty() && !right.is_empty() && !right.contains(':') => {
            Ok(Delimiters::new(left, right))
        }
        _ => Err(format!("expected LEFT:RIGHT, got {s:?}")),
    }
}

impl Cli {
    pub fn render_config(&self) -> RenderConfig {
        let mut config = RenderConfig::new().no_overwrite(self.no_overwrite);
        if let Some(delims) = &self.delims {
            config = config.delimiters(delims.clone());
        }
        config
    }

    /// All targets in command-line order, `--template` entries first.
    pub fn targets(&self) -> Vec<TemplateTarget> {
        let mut targets = self.templates.clone();
        if let Some(source) = &self.source {
            targets.push(TemplateTarget::new(source.clone(), self.dest.clone()));
        }
        targets
    }
}

/// Counts from a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rendered: usize,
    pub skipped: usize,
}

/// Renders everything named on the command line with the process
/// environment.
pub fn run(cli: &Cli) -> Result<RunSummary> {
    let targets = cli.targets();
    if targets.is_empty() {
        bail!("no templates given, pass SRC [DEST] or --template SRC[:DEST]");
    }
    let mut renderer = FileRenderer::new(cli.render_config());
    run_targets(&mut renderer, &targets)
}

/// Renders `targets` in order with a prepared renderer. Stops at the first
/// failure.
pub fn run_targets(renderer: &mut FileRenderer, targets: &[TemplateTarget]) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for target in targets {
        let source = &target.source;
        let dest = target.dest.as_deref();
        let meta = fs::metadata(source)
            .with_context(|| format!("unable to stat template {}", source.display()))?;

        let rendered = if meta.is_dir() {
            renderer
                .render_tree(source, dest)
                .with_context(|| format!("unable to render directory {}", source.display()))?
        } else {
            renderer
                .render_file(source, dest)
                .with_context(|| format!("unable to render {}", source.display()))?
        };

        if rendered {
            summary.rendered += 1;
        } else {
            summary.skipped += 1;
        }
    }

    info!(
        "rendered {} template(s), skipped {}",
        summary.rendered, summary.skipped
    );
    Ok(summary)
}
