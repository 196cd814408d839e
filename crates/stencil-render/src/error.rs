//! Error types for template rendering.
//!
//! This module provides [`RenderError`], the error type for every rendering
//! operation. Each variant names the path and the operation that failed so the
//! caller can report it without extra context.
//!
//! Nothing in this crate terminates the process. Errors travel up through the
//! file renderer and the tree walker, and the caller decides whether to abort.

use std::io;
use std::path::PathBuf;

use crate::functions::MalformedUrlError;

/// Error type for template rendering operations.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The template file could not be read.
    #[error("unable to read template {}: {source}", path.display())]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The template contains a syntax error.
    #[error("unable to parse template {}: {source}", path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },

    /// The configured delimiters cannot be used by the template parser.
    #[error("invalid delimiters {left:?} and {right:?}: {source}")]
    Delimiters {
        left: String,
        right: String,
        #[source]
        source: minijinja::Error,
    },

    /// Evaluating the template failed (missing function, function error,
    /// type mismatch).
    #[error("template error in {}: {source}", path.display())]
    Evaluation {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },

    /// A `parseUrl` call received a string that is not a valid URL.
    ///
    /// Kept apart from [`RenderError::Evaluation`] because a malformed URL
    /// literal is an authoring error rather than a data-dependent failure.
    #[error("unable to parse url in {}: {source}", path.display())]
    MalformedUrl {
        path: PathBuf,
        #[source]
        source: MalformedUrlError,
    },

    /// The destination file could not be created or truncated.
    #[error("unable to create {}: {source}", path.display())]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Rendered output could not be written to its sink.
    #[error("unable to write {target}: {source}")]
    Write {
        target: String,
        #[source]
        source: io::Error,
    },

    /// Permission bits could not be copied onto the destination.
    #[error("unable to chmod {}: {source}", path.display())]
    Chmod {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Ownership could not be copied onto the destination.
    #[error("unable to chown {}: {source}", path.display())]
    Chown {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Metadata of a path could not be read.
    #[error("unable to stat {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A template directory could not be listed.
    #[error("bad directory {}: {source}", path.display())]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A destination subdirectory could not be created. This includes the
    /// case where it already exists.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The template is a directory but the destination is not.
    #[error("if template is a directory, dest must also be a directory (or stdout): {}", path.display())]
    NotADirectory { path: PathBuf },
}

impl RenderError {
    /// Builds the error for a failed template evaluation.
    ///
    /// Failures raised by `parseUrl` are pulled out of the engine error chain
    /// and reported as [`RenderError::MalformedUrl`].
    pub(crate) fn evaluation(path: impl Into<PathBuf>, err: minijinja::Error) -> Self {
        let path = path.into();
        match find_malformed_url(&err) {
            Some(source) => RenderError::MalformedUrl { path, source },
            None => RenderError::Evaluation { path, source: err },
        }
    }

    /// Returns true for errors raised while evaluating a template, as opposed
    /// to filesystem or parse failures.
    pub fn is_evaluation(&self) -> bool {
        matches!(
            self,
            RenderError::Evaluation { .. } | RenderError::MalformedUrl { .. }
        )
    }
}

fn find_malformed_url(err: &minijinja::Error) -> Option<MalformedUrlError> {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(found) = e.downcast_ref::<MalformedUrlError>() {
            return Some(found.clone());
        }
        current = e.source();
    }
    None
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
