//! # Stencil Render - configuration files from templates
//!
//! `stencil-render` renders configuration files and whole directory trees
//! from Jinja templates, filling in values from the environment and from a
//! small set of helper functions. Rendered files get the permission bits and
//! ownership of the template they came from.
//!
//! ## Core Concepts
//!
//! - [`RenderConfig`]: no-overwrite flag and optional custom [`Delimiters`]
//! - [`FileRenderer`]: renders one file ([`FileRenderer::render_file`]) or a
//!   tree ([`FileRenderer::render_tree`])
//! - [`FunctionRegistry`]: functions callable from templates
//! - [`EnvSnapshot`]: the environment, captured once, exposed as `Env`
//! - [`MetadataCopier`]: how permissions and ownership are copied
//!
//! ## Template Functions
//!
//! On top of the MiniJinja built-ins and `minijinja-contrib`:
//!
//! | Function | Result |
//! |----------|--------|
//! | `exists(path)` | whether the path exists |
//! | `parseUrl(url)` | URL parts: `scheme`, `host`, `hostname`, `port`, `path`, `query`, ... |
//! | `isTrue(s)` | `true` for `1`/`t`/`true`/`y`/`yes`/`on`, any case |
//! | `jsonQuery(json, query)` | value at `query` (`.a.b`, `.items[0]`, or JSONPath) |
//! | `Env` | mapping of environment variables |
//!
//! ## Quick Start
//!
//! ```rust
//! use stencil_render::{CapturedOutput, EnvSnapshot, FileRenderer, RenderConfig};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let template = dir.path().join("nginx.conf");
//! std::fs::write(
//!     &template,
//!     "{% set up = parseUrl(Env.UPSTREAM) %}proxy_pass http://{{ up.host }};\n",
//! ).unwrap();
//!
//! let stdout = CapturedOutput::new();
//! let mut renderer = FileRenderer::new(RenderConfig::new())
//!     .with_env(EnvSnapshot::from_entries(["UPSTREAM=http://api:9000/v1"]))
//!     .with_stdout(stdout.clone());
//! renderer.render_file(&template, None).unwrap();
//!
//! assert_eq!(stdout.contents_string(), "proxy_pass http://api:9000;\n");
//! ```

pub mod config;
pub mod context;
pub mod env;
mod error;
pub mod functions;
pub mod metadata;
pub mod output;
pub mod template;

pub use config::{Delimiters, RenderConfig};
pub use context::RenderContext;
pub use env::{EnvReader, EnvSnapshot, MockEnv, RealEnv};
pub use error::{RenderError, Result};
pub use functions::{FunctionRegistry, MalformedUrlError, ParsedUrl};
pub use metadata::{MetadataCall, MetadataCopier, MetadataOp, RecordingMetadata, SystemMetadata};
pub use output::{CapturedOutput, OutputDestination};
pub use template::{render_file, render_tree, FileEntry, FileRenderer, MiniJinjaEngine, TemplateEngine};
