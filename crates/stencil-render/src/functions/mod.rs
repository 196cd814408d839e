//! Functions callable from templates.
//!
//! The callable surface is built in two layers:
//!
//! 1. General-purpose: the MiniJinja built-ins plus `minijinja-contrib`
//!    (string, math, collection and date helpers, Python-style methods such
//!    as `"a,b".split(",")`), and anything added with
//!    [`FunctionRegistry::register_general`].
//! 2. System: `exists`, `parseUrl`, `isTrue` and `jsonQuery`.
//!
//! When both layers define the same name the system layer wins. The
//! [`FunctionRegistry`] enforces this both in [`FunctionRegistry::get`] and
//! when installing into an engine, where the system layer is applied last.
//!
//! Environment access is not a function: templates read the `Env` mapping of
//! the render context (see [`crate::env`]).

mod json;
mod urls;

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io;
use std::path::Path;

use minijinja::value::ValueKind;
use minijinja::{escape_formatter, Environment, Error, ErrorKind, Output, State, Value};

pub use self::json::{json_query, query_json};
pub use self::urls::{parse_url, MalformedUrlError, ParsedUrl};

/// Names of the system functions, in registration order.
pub const SYSTEM_FUNCTIONS: &[&str] = &["exists", "parseUrl", "isTrue", "jsonQuery"];

/// `exists(path)`: whether a filesystem entry is present.
///
/// Errors other than "not found" (e.g. permission denied on a parent
/// directory) are returned to the template as evaluation errors.
pub fn exists(path: &str) -> Result<bool, Error> {
    match std::fs::metadata(Path::new(path)) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("unable to stat {path}"),
        )
        .with_source(e)),
    }
}

/// Parses common boolean spellings, ignoring case.
///
/// `1`, `t`, `true`, `y`, `yes` and `on` are true. Everything else, including
/// unparsable input, is false.
pub fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "1" | "t" | "true" | "y" | "yes" | "on"
    )
}

/// `isTrue(value)`. Never fails; undefined and none are false.
pub fn is_true(value: Option<Value>) -> bool {
    match value {
        Some(v) if !v.is_undefined() && !v.is_none() => match v.as_str() {
            Some(s) => parse_bool(s),
            None => parse_bool(&v.to_string()),
        },
        _ => false,
    }
}

/// Output formatter: lowercase booleans, everything else as MiniJinja
/// prints it.
pub fn format_value(out: &mut Output, state: &State, value: &Value) -> Result<(), Error> {
    if value.kind() == ValueKind::Bool {
        let text = if value.is_true() { "true" } else { "false" };
        return out.write_str(text).map_err(Error::from);
    }
    escape_formatter(out, state, value)
}

/// Named callables available to templates, in two layers.
///
/// # Example
///
/// ```rust
/// use stencil_render::functions::FunctionRegistry;
/// use minijinja::Value;
///
/// let mut registry = FunctionRegistry::new();
/// registry.register_general("exists", Value::from_function(|_p: String| "general"));
///
/// // The system layer shadows the general one.
/// let mut env = minijinja::Environment::new();
/// registry.install(&mut env);
/// let out = env.render_str("{{ exists('/definitely/not/here') }}", ()).unwrap();
/// assert_eq!(out, "false");
/// ```
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    general: BTreeMap<String, Value>,
    system: BTreeMap<String, Value>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Creates a registry with the system functions registered.
    pub fn new() -> Self {
        let mut system = BTreeMap::new();
        system.insert("exists".to_string(), Value::from_function(exists));
        system.insert("parseUrl".to_string(), Value::from_function(parse_url));
        system.insert("isTrue".to_string(), Value::from_function(is_true));
        system.insert("jsonQuery".to_string(), Value::from_function(json_query));
        Self {
            general: BTreeMap::new(),
            system,
        }
    }

    /// Adds a function to the general-purpose layer.
    ///
    /// A later registration under the same name replaces the earlier one.
    pub fn register_general(&mut self, name: impl Into<String>, function: Value) {
        self.general.insert(name.into(), function);
    }

    /// Looks up a function, system layer first.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.system.get(name).or_else(|| self.general.get(name))
    }

    /// Returns true if `name` resolves to a system function.
    pub fn is_system(&self, name: &str) -> bool {
        self.system.contains_key(name)
    }

    /// All registered names, deduplicated and sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .general
            .keys()
            .chain(self.system.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Installs both layers into a MiniJinja environment.
    ///
    /// The external library goes in first, then the general layer, then the
    /// system layer, so system functions replace anything of the same name.
    /// Booleans are printed as `true`/`false`, which is what config files
    /// expect from `isTrue` and `exists`.
    pub fn install(&self, env: &mut Environment<'static>) {
        minijinja_contrib::add_to_environment(env);
        env.set_unknown_method_callback(minijinja_contrib::pycompat::unknown_method_callback);
        env.set_formatter(format_value);

        for (name, function) in &self.general {
            env.add_global(name.clone(), function.clone());
        }
        for (name, function) in &self.system {
            env.add_global(name.clone(), function.clone());
        }
    }
}
