//! Output sinks for rendered templates.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Destination for rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    /// Write to the renderer's standard output
    Stdout,
    /// Write to a specific file, created or truncated
    File(PathBuf),
}

impl OutputDestination {
    /// `None` selects standard output.
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(path) => OutputDestination::File(path.to_path_buf()),
            None => OutputDestination::Stdout,
        }
    }
}

impl fmt::Display for OutputDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputDestination::Stdout => f.write_str("<stdout>"),
            OutputDestination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// In-memory stand-in for standard output.
///
/// Clones share one buffer, so a test can hand one clone to the renderer and
/// read what was written through another.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.buffer
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default()
    }

    /// Everything written so far, as (lossy) UTF-8.
    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .buffer
            .lock()
            .map_err(|_| io::Error::other("captured output lock poisoned"))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
