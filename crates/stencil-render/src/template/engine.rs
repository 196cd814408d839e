//! Template engine abstraction.
//!
//! [`TemplateEngine`] sits between the file renderer and the template
//! backend. The only implementation is [`MiniJinjaEngine`].

use std::io::Write;

use minijinja::syntax::SyntaxConfig;
use minijinja::{AutoEscape, Environment, Value};

use crate::config::Delimiters;
use crate::functions::FunctionRegistry;

/// A template engine that compiles named templates and streams their output.
pub trait TemplateEngine {
    /// Compiles `source` and registers it under `name`.
    ///
    /// Syntax errors are reported here, before anything is written.
    fn add_template(&mut self, name: &str, source: String) -> Result<(), minijinja::Error>;

    /// Evaluates a registered template against `context`, writing to `out`.
    fn render_to(
        &self,
        name: &str,
        context: &Value,
        out: &mut dyn Write,
    ) -> Result<(), minijinja::Error>;
}

/// MiniJinja-based template engine.
///
/// Output is written verbatim: auto-escaping is off regardless of the
/// template's file extension, and a trailing newline in the template is kept.
///
/// # Example
///
/// ```rust
/// use stencil_render::functions::FunctionRegistry;
/// use stencil_render::template::{MiniJinjaEngine, TemplateEngine};
/// use minijinja::Value;
///
/// let mut engine = MiniJinjaEngine::new(&FunctionRegistry::new(), None).unwrap();
/// engine.add_template("greeting", "Hello, {{ name }}!\n".to_string()).unwrap();
///
/// let mut out = Vec::new();
/// let ctx = Value::from_serialize(&serde_json::json!({"name": "World"}));
/// engine.render_to("greeting", &ctx, &mut out).unwrap();
/// assert_eq!(out, b"Hello, World!\n");
/// ```
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    /// Creates an engine with `registry` installed and, if given, custom
    /// delimiters applied.
    pub fn new(
        registry: &FunctionRegistry,
        delimiters: Option<&Delimiters>,
    ) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_name| AutoEscape::None);
        if let Some(delimiters) = delimiters {
            env.set_syntax(syntax_for(delimiters)?);
        }
        registry.install(&mut env);
        Ok(Self { env })
    }

    /// Returns a reference to the underlying MiniJinja environment.
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn add_template(&mut self, name: &str, source: String) -> Result<(), minijinja::Error> {
        self.env.add_template_owned(name.to_string(), source)
    }

    fn render_to(
        &self,
        name: &str,
        context: &Value,
        out: &mut dyn Write,
    ) -> Result<(), minijinja::Error> {
        let tmpl = self.env.get_template(name)?;
        tmpl.render_to_write(context, out)?;
        Ok(())
    }
}

/// Builds the parser syntax for a custom delimiter pair.
fn syntax_for(delimiters: &Delimiters) -> Result<SyntaxConfig, minijinja::Error> {
    let (block_start, block_end) = delimiters.block();
    let (comment_start, comment_end) = delimiters.comment();
    SyntaxConfig::builder()
        .variable_delimiters(delimiters.left.clone(), delimiters.right.clone())
        .block_delimiters(block_start, block_end)
        .comment_delimiters(comment_start, comment_end)
        .build()
}
