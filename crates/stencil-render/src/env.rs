//! Environment access for templates.
//!
//! Templates read environment variables through the `Env` mapping of the
//! render context. The mapping is captured once, at the start of a run, from
//! an [`EnvReader`]. Rendering never reads the process environment directly,
//! which keeps renders reproducible and lets tests supply a synthetic
//! environment through [`MockEnv`].

use std::collections::BTreeMap;

use serde::Serialize;

/// Abstraction over the source of environment variables.
pub trait EnvReader: Send + Sync {
    /// Returns every `(name, value)` pair visible to the reader.
    fn vars(&self) -> Vec<(String, String)>;
}

/// Reads the environment of the current process.
///
/// Names and values that are not valid UTF-8 are converted lossily.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealEnv;

impl EnvReader for RealEnv {
    fn vars(&self) -> Vec<(String, String)> {
        std::env::vars_os()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.to_string_lossy().into_owned(),
                )
            })
            .collect()
    }
}

/// Mock environment reader for testing.
#[derive(Debug, Clone, Default)]
pub struct MockEnv {
    vars: BTreeMap<String, String>,
}

impl MockEnv {
    /// Create an empty mock environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an environment variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvReader for MockEnv {
    fn vars(&self) -> Vec<(String, String)> {
        self.vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// A point-in-time copy of the environment, keyed by variable name.
///
/// Serializes as a plain mapping so templates can write `Env.HOME` or
/// iterate with `Env | items`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Captures the variables currently visible to `reader`.
    pub fn capture(reader: &dyn EnvReader) -> Self {
        Self {
            vars: reader.vars().into_iter().collect(),
        }
    }

    /// Builds a snapshot from raw `NAME=VALUE` entries.
    ///
    /// Each entry is split at its first `=`, so values may themselves contain
    /// `=`. Entries without any `=` are skipped.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let vars = entries
            .into_iter()
            .filter_map(|entry| {
                entry
                    .as_ref()
                    .split_once('=')
                    .map(|(name, value)| (name.to_string(), value.to_string()))
            })
            .collect();
        Self { vars }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
