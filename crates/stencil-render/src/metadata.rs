//! Copying file metadata from a template onto its rendered output.
//!
//! Permission bits are portable. Ownership (uid/gid) only exists on Unix, so
//! it sits behind [`MetadataCopier`] with a platform implementation
//! ([`SystemMetadata`]) and a recording fake for tests ([`RecordingMetadata`]).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Copies metadata from a source path onto a destination path.
pub trait MetadataCopier: Send + Sync {
    /// Copy the permission bits of `source` onto `dest`.
    fn copy_permissions(&self, source: &Path, dest: &Path) -> io::Result<()>;

    /// Copy the owning user and group of `source` onto `dest`.
    fn copy_ownership(&self, source: &Path, dest: &Path) -> io::Result<()>;
}

/// Copies metadata using the host filesystem.
///
/// Ownership copying is a no-op on platforms without uid/gid.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemMetadata;

impl MetadataCopier for SystemMetadata {
    fn copy_permissions(&self, source: &Path, dest: &Path) -> io::Result<()> {
        let permissions = fs::metadata(source)?.permissions();
        fs::set_permissions(dest, permissions)
    }

    fn copy_ownership(&self, source: &Path, dest: &Path) -> io::Result<()> {
        copy_ownership_impl(source, dest)
    }
}

#[cfg(unix)]
fn copy_ownership_impl(source: &Path, dest: &Path) -> io::Result<()> {
    use std::os::unix::fs::MetadataExt;

    let meta = fs::metadata(source)?;
    std::os::unix::fs::chown(dest, Some(meta.uid()), Some(meta.gid()))
}

#[cfg(not(unix))]
fn copy_ownership_impl(_source: &Path, _dest: &Path) -> io::Result<()> {
    Ok(())
}

/// Which metadata operation was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataOp {
    Permissions,
    Ownership,
}

/// A recorded metadata copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataCall {
    pub op: MetadataOp,
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// Fake copier for tests.
///
/// Records every call instead of touching the filesystem. Clones share the
/// same record, so a test can keep one handle and give the other to the
/// renderer. Set a failing operation with [`RecordingMetadata::fail_on`].
#[derive(Debug, Clone, Default)]
pub struct RecordingMetadata {
    calls: Arc<Mutex<Vec<MetadataCall>>>,
    fail_on: Option<MetadataOp>,
}

impl RecordingMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of `op` fail with `PermissionDenied`.
    pub fn fail_on(mut self, op: MetadataOp) -> Self {
        self.fail_on = Some(op);
        self
    }

    /// Returns the calls recorded so far.
    pub fn calls(&self) -> Vec<MetadataCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, op: MetadataOp, source: &Path, dest: &Path) -> io::Result<()> {
        if self.fail_on == Some(op) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{op:?} refused by test double"),
            ));
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MetadataCall {
                op,
                source: source.to_path_buf(),
                dest: dest.to_path_buf(),
            });
        }
        Ok(())
    }
}

impl MetadataCopier for RecordingMetadata {
    fn copy_permissions(&self, source: &Path, dest: &Path) -> io::Result<()> {
        self.record(MetadataOp::Permissions, source, dest)
    }

    fn copy_ownership(&self, source: &Path, dest: &Path) -> io::Result<()> {
        self.record(MetadataOp::Ownership, source, dest)
    }
}
