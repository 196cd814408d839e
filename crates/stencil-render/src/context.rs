//! The value templates are evaluated against.
//!
//! A [`RenderContext`] is created once per run and shared by every template
//! rendered in it. It carries no mutable state: only the environment
//! snapshot, exposed to templates as `Env`.
//!
//! ```jinja
//! listen {{ Env.PORT | default("8080") }};
//! {% for name, value in Env | items %}{{ name }}={{ value }}
//! {% endfor %}
//! ```

use minijinja::Value;
use serde::Serialize;

use crate::env::{EnvReader, EnvSnapshot};

#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderContext {
    #[serde(rename = "Env")]
    env: EnvSnapshot,
}

impl RenderContext {
    pub fn new(env: EnvSnapshot) -> Self {
        Self { env }
    }

    /// Captures the environment visible to `reader`.
    pub fn capture(reader: &dyn EnvReader) -> Self {
        Self::new(EnvSnapshot::capture(reader))
    }

    pub fn env(&self) -> &EnvSnapshot {
        &self.env
    }

    /// Converts to the engine's value type.
    pub fn to_value(&self) -> Value {
        Value::from_serialize(self)
    }
}
