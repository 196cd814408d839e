//! Single-file rendering.
//!
//! [`FileRenderer`] renders one template file to a destination file or to
//! standard output:
//!
//! 1. build an engine (function registry attached, delimiters applied),
//! 2. read and parse the template, registered under its base name,
//! 3. skip if the destination exists and overwriting is disabled,
//! 4. stream the evaluated template into the sink,
//! 5. copy permission bits and ownership from the template onto the new file.
//!
//! Every failure is returned as a [`RenderError`]. Nothing is cleaned up on
//! failure: a destination that was already truncated stays truncated.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::{debug, warn};
use minijinja::Value;

use super::engine::{MiniJinjaEngine, TemplateEngine};
use crate::config::RenderConfig;
use crate::context::RenderContext;
use crate::env::{EnvReader, EnvSnapshot, RealEnv};
use crate::error::{RenderError, Result};
use crate::functions::FunctionRegistry;
use crate::metadata::{MetadataCopier, SystemMetadata};
use crate::output::OutputDestination;

/// Renders template files according to a [`RenderConfig`].
///
/// The environment is captured when the renderer is built and reused for
/// every file it renders.
///
/// # Example
///
/// ```rust
/// use stencil_render::{CapturedOutput, EnvSnapshot, FileRenderer, RenderConfig};
///
/// let dir = tempfile::tempdir().unwrap();
/// let template = dir.path().join("app.conf");
/// std::fs::write(&template, "port={{ Env.PORT }}\n").unwrap();
///
/// let stdout = CapturedOutput::new();
/// let mut renderer = FileRenderer::new(RenderConfig::new())
///     .with_env(EnvSnapshot::from_entries(["PORT=8080"]))
///     .with_stdout(stdout.clone());
///
/// assert!(renderer.render_file(&template, None).unwrap());
/// assert_eq!(stdout.contents_string(), "port=8080\n");
/// ```
pub struct FileRenderer {
    config: RenderConfig,
    registry: FunctionRegistry,
    context: RenderContext,
    metadata: Box<dyn MetadataCopier>,
    stdout: Box<dyn Write + Send>,
}

impl FileRenderer {
    /// Creates a renderer over the process environment, the host filesystem
    /// metadata, and the real standard output.
    pub fn new(config: RenderConfig) -> Self {
        Self::with_env_reader(config, &RealEnv)
    }

    /// Creates a renderer whose environment is captured from `reader`.
    pub fn with_env_reader(config: RenderConfig, reader: &dyn EnvReader) -> Self {
        Self {
            config,
            registry: FunctionRegistry::new(),
            context: RenderContext::capture(reader),
            metadata: Box::new(SystemMetadata),
            stdout: Box::new(io::stdout()),
        }
    }

    /// Replaces the environment snapshot exposed as `Env`.
    pub fn with_env(mut self, env: EnvSnapshot) -> Self {
        self.context = RenderContext::new(env);
        self
    }

    /// Replaces the function registry.
    pub fn with_registry(mut self, registry: FunctionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replaces the metadata copier.
    pub fn with_metadata(mut self, metadata: impl MetadataCopier + 'static) -> Self {
        self.metadata = Box::new(metadata);
        self
    }

    /// Replaces the standard output sink.
    pub fn with_stdout(mut self, stdout: impl Write + Send + 'static) -> Self {
        self.stdout = Box::new(stdout);
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Renders `template_path` to `dest`, or to standard output when `dest`
    /// is `None`.
    ///
    /// Returns `Ok(false)` only when the destination already exists and the
    /// configuration forbids overwriting; in that case the template is not
    /// evaluated and the destination is left untouched.
    pub fn render_file(&mut self, template_path: &Path, dest: Option<&Path>) -> Result<bool> {
        let name = template_name(template_path);
        let mut engine = self.engine()?;

        let source =
            fs::read_to_string(template_path).map_err(|source| RenderError::ReadTemplate {
                path: template_path.to_path_buf(),
                source,
            })?;
        engine
            .add_template(&name, source)
            .map_err(|source| RenderError::Syntax {
                path: template_path.to_path_buf(),
                source,
            })?;

        if let Some(dest) = dest {
            if self.config.is_no_overwrite() && dest.exists() {
                warn!(
                    "skipping {}: {} already exists",
                    template_path.display(),
                    dest.display()
                );
                return Ok(false);
            }
        }

        let destination = OutputDestination::from_path(dest);
        debug!("rendering {} -> {}", template_path.display(), destination);

        let context = self.context.to_value();
        match &destination {
            OutputDestination::Stdout => {
                self.write_stdout(&engine, &name, &context, template_path)?;
            }
            OutputDestination::File(dest) => {
                write_file(&engine, &name, &context, template_path, dest)?;
                self.copy_metadata(template_path, dest)?;
            }
        }

        Ok(true)
    }

    fn engine(&self) -> Result<MiniJinjaEngine> {
        let delimiters = self.config.custom_delimiters();
        MiniJinjaEngine::new(&self.registry, delimiters).map_err(|source| {
            let (left, right) = delimiters
                .map(|d| (d.left.clone(), d.right.clone()))
                .unwrap_or_default();
            RenderError::Delimiters {
                left,
                right,
                source,
            }
        })
    }

    fn write_stdout(
        &mut self,
        engine: &MiniJinjaEngine,
        name: &str,
        context: &Value,
        template_path: &Path,
    ) -> Result<()> {
        engine
            .render_to(name, context, &mut self.stdout)
            .map_err(|err| RenderError::evaluation(template_path, err))?;
        self.stdout.flush().map_err(|source| RenderError::Write {
            target: OutputDestination::Stdout.to_string(),
            source,
        })
    }

    /// Copies metadata from a source artifact onto its rendered counterpart.
    pub(crate) fn copy_metadata(&self, source: &Path, dest: &Path) -> Result<()> {
        self.metadata
            .copy_permissions(source, dest)
            .map_err(|err| RenderError::Chmod {
                path: dest.to_path_buf(),
                source: err,
            })?;
        self.metadata
            .copy_ownership(source, dest)
            .map_err(|err| RenderError::Chown {
                path: dest.to_path_buf(),
                source: err,
            })
    }
}

fn write_file(
    engine: &MiniJinjaEngine,
    name: &str,
    context: &Value,
    template_path: &Path,
    dest: &Path,
) -> Result<()> {
    let file = File::create(dest).map_err(|source| RenderError::CreateDestination {
        path: dest.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    engine
        .render_to(name, context, &mut writer)
        .map_err(|err| RenderError::evaluation(template_path, err))?;
    writer.flush().map_err(|source| RenderError::Write {
        target: dest.display().to_string(),
        source,
    })
}

/// The name a template is registered under: its file name.
pub(crate) fn template_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{MetadataOp, RecordingMetadata};
    use crate::output::CapturedOutput;

    fn renderer(config: RenderConfig) -> (FileRenderer, CapturedOutput, RecordingMetadata) {
        let stdout = CapturedOutput::new();
        let metadata = RecordingMetadata::new();
        let renderer = FileRenderer::new(config)
            .with_env(EnvSnapshot::from_entries(["NAME=stencil"]))
            .with_stdout(stdout.clone())
            .with_metadata(metadata.clone());
        (renderer, stdout, metadata)
    }

    #[test]
    fn test_template_name_is_base_name() {
        assert_eq!(template_name(Path::new("/etc/tmpl/app.conf")), "app.conf");
        assert_eq!(template_name(Path::new("app.conf")), "app.conf");
    }

    #[test]
    fn test_render_to_stdout_skips_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("t.txt");
        fs::write(&template, "hi {{ Env.NAME }}").unwrap();

        let (mut renderer, stdout, metadata) = renderer(RenderConfig::new());
        assert!(renderer.render_file(&template, None).unwrap());
        assert_eq!(stdout.contents_string(), "hi stencil");
        assert!(metadata.calls().is_empty());
    }

    #[test]
    fn test_render_to_file_copies_metadata_from_template() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("t.txt");
        let dest = dir.path().join("out.txt");
        fs::write(&template, "x").unwrap();

        let (mut renderer, _stdout, metadata) = renderer(RenderConfig::new());
        assert!(renderer.render_file(&template, Some(&dest)).unwrap());

        let calls = metadata.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].op, MetadataOp::Permissions);
        assert_eq!(calls[0].source, template);
        assert_eq!(calls[0].dest, dest);
        assert_eq!(calls[1].op, MetadataOp::Ownership);
    }

    #[test]
    fn test_chown_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("t.txt");
        let dest = dir.path().join("out.txt");
        fs::write(&template, "x").unwrap();

        let mut renderer = FileRenderer::new(RenderConfig::new())
            .with_stdout(CapturedOutput::new())
            .with_metadata(RecordingMetadata::new().fail_on(MetadataOp::Ownership));
        let err = renderer.render_file(&template, Some(&dest)).unwrap_err();
        assert!(matches!(err, RenderError::Chown { .. }));
    }

    #[test]
    fn test_missing_template_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let (mut renderer, _, _) = renderer(RenderConfig::new());
        let err = renderer
            .render_file(&dir.path().join("missing"), None)
            .unwrap_err();
        assert!(matches!(err, RenderError::ReadTemplate { .. }));
    }
}
