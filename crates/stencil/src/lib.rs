//! # Stencil - render configuration files at container start
//!
//! The `stencil` binary renders templates with the values of environment
//! variables, either to standard output or to destination files that keep
//! the template's permission bits and ownership. The rendering itself lives
//! in [`stencil_render`]; this crate holds the command-line surface.
//!
//! ```text
//! stencil --template nginx.conf.tmpl:/etc/nginx/nginx.conf
//! stencil --delims '<<:>>' chart/ /srv/chart
//! stencil app.conf.tmpl            # to standard output
//! ```

pub mod cli;

pub use cli::{run, run_targets, Cli, RunSummary, TemplateTarget};
