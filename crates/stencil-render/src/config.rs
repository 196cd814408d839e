//! Render configuration.
//!
//! [`RenderConfig`] is resolved once by the caller and passed by reference
//! through the tree walker into every single-file render.

/// A pair of custom template delimiters, e.g. `<<` and `>>`.
///
/// The pair replaces the variable markers (`{{`/`}}`). Block and comment
/// markers are derived from it: `<<%`/`%>>` for blocks and `<<#`/`#>>` for
/// comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub left: String,
    pub right: String,
}

impl Delimiters {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// An empty pair means "use the engine defaults".
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn block(&self) -> (String, String) {
        (format!("{}%", self.left), format!("%{}", self.right))
    }

    pub fn comment(&self) -> (String, String) {
        (format!("{}#", self.left), format!("#{}", self.right))
    }
}

/// Configuration for a render run.
///
/// # Example
///
/// ```rust
/// use stencil_render::{Delimiters, RenderConfig};
///
/// let config = RenderConfig::new()
///     .no_overwrite(true)
///     .delimiters(Delimiters::new("<<", ">>"));
/// assert!(config.is_no_overwrite());
/// assert_eq!(config.custom_delimiters().unwrap().left, "<<");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderConfig {
    no_overwrite: bool,
    delimiters: Option<Delimiters>,
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip destinations that already exist.
    pub fn no_overwrite(mut self, yes: bool) -> Self {
        self.no_overwrite = yes;
        self
    }

    /// Use a custom delimiter pair. An empty pair resets to the defaults.
    pub fn delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = if delimiters.is_empty() {
            None
        } else {
            Some(delimiters)
        };
        self
    }

    pub fn is_no_overwrite(&self) -> bool {
        self.no_overwrite
    }

    pub fn custom_delimiters(&self) -> Option<&Delimiters> {
        self.delimiters.as_ref()
    }
}
