//! Template rendering for single files and directory trees.
//!
//! ## Which entry point?
//!
//! | Function | Use When |
//! |----------|----------|
//! | [`render_file`] | One template, process environment, real stdout |
//! | [`render_tree`] | A template directory, process environment, real stdout |
//! | [`FileRenderer`] | Several renders sharing one environment snapshot, or tests that inject environment, metadata copier, or stdout |
//!
//! ## Delimiters
//!
//! Templates use Jinja syntax (`{{ }}`, `{% %}`, `{# #}`). When a
//! [`crate::Delimiters`] pair such as `<<`/`>>` is configured, expressions
//! become `<< value >>`, blocks `<<% if x %>>`, and comments `<<# note #>>`,
//! which leaves literal `{{` in the template untouched.

mod engine;
mod renderer;
mod walker;

use std::path::Path;

pub use engine::{MiniJinjaEngine, TemplateEngine};
pub use renderer::FileRenderer;
pub use walker::{read_entries, FileEntry};

use crate::config::RenderConfig;
use crate::error::Result;

/// Renders one template file with the process environment.
///
/// `dest = None` writes to standard output. Returns `Ok(false)` when the
/// render was skipped because the destination exists and `config` forbids
/// overwriting.
pub fn render_file(config: &RenderConfig, template_path: &Path, dest: Option<&Path>) -> Result<bool> {
    FileRenderer::new(config.clone()).render_file(template_path, dest)
}

/// Mirrors a template directory onto `dest_dir` with the process
/// environment, or concatenates it to standard output when `dest_dir` is
/// `None`.
pub fn render_tree(config: &RenderConfig, template_dir: &Path, dest_dir: Option<&Path>) -> Result<bool> {
    FileRenderer::new(config.clone()).render_tree(template_dir, dest_dir)
}
