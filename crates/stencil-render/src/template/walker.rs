//! Directory tree rendering.
//!
//! Mirrors a template directory onto a destination directory. Subdirectories
//! are created fresh (an existing one is an error), every other entry is
//! handed to [`FileRenderer::render_file`]. Without a destination, files are
//! rendered one after another to standard output and nothing is created.
//!
//! Entries are visited depth-first in file-name order so that output and
//! creation order do not depend on the filesystem.

use std::ffi::OsString;
use std::fs;
use std::path::Path;

use log::debug;

use super::renderer::FileRenderer;
use crate::error::{RenderError, Result};

/// A directory entry found while scanning a template directory.
///
/// `permissions` are the entry's own mode bits as seen during the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: OsString,
    pub is_dir: bool,
    pub permissions: fs::Permissions,
}

/// Lists `dir`, sorted by file name.
///
/// Symbolic links are not followed when classifying entries, so a link to a
/// directory is treated as a file and reports the link's own permissions.
pub fn read_entries(dir: &Path) -> Result<Vec<FileEntry>> {
    let read_error = |source| RenderError::ReadDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let meta = entry.metadata().map_err(|source| RenderError::Stat {
            path: entry.path(),
            source,
        })?;
        entries.push(FileEntry {
            name: entry.file_name(),
            is_dir: meta.file_type().is_dir(),
            permissions: meta.permissions(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn ensure_directory(path: &Path) -> Result<()> {
    let meta = fs::metadata(path).map_err(|source| RenderError::Stat {
        path: path.to_path_buf(),
        source,
    })?;
    if meta.is_dir() {
        Ok(())
    } else {
        Err(RenderError::NotADirectory {
            path: path.to_path_buf(),
        })
    }
}

impl FileRenderer {
    /// Renders every file under `template_dir` into `dest_dir`, recreating
    /// the directory structure, or to standard output when `dest_dir` is
    /// `None`.
    ///
    /// `dest_dir` must already exist. Subdirectories get the permission bits
    /// and ownership of their template counterparts once their contents have
    /// been rendered. The first error stops the walk; whatever was created up
    /// to that point is left in place.
    pub fn render_tree(&mut self, template_dir: &Path, dest_dir: Option<&Path>) -> Result<bool> {
        if let Some(dest_dir) = dest_dir {
            ensure_directory(dest_dir)?;
        }

        for entry in read_entries(template_dir)? {
            let source = template_dir.join(&entry.name);
            match (entry.is_dir, dest_dir) {
                (true, Some(dest_dir)) => {
                    let target = dest_dir.join(&entry.name);
                    fs::create_dir(&target).map_err(|source| RenderError::CreateDirectory {
                        path: target.clone(),
                        source,
                    })?;
                    debug!("created directory {}", target.display());
                    self.render_tree(&source, Some(&target))?;
                    self.copy_metadata(&source, &target)?;
                }
                (true, None) => {
                    self.render_tree(&source, None)?;
                }
                (false, dest_dir) => {
                    let target = dest_dir.map(|dir| dir.join(&entry.name));
                    self.render_file(&source, target.as_deref())?;
                }
            }
        }

        Ok(true)
    }
}
