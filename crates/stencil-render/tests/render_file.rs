//! Integration tests for single-file rendering.

use std::fs;
use std::path::{Path, PathBuf};

use stencil_render::{
    CapturedOutput, Delimiters, EnvSnapshot, FileRenderer, MetadataOp, RecordingMetadata,
    RenderConfig, RenderError,
};
use tempfile::TempDir;

fn write_template(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn renderer(config: RenderConfig, stdout: &CapturedOutput) -> FileRenderer {
    FileRenderer::new(config)
        .with_env(EnvSnapshot::from_entries([
            "APP_NAME=billing",
            "APP_PORT=8080",
            "DEBUG=Yes",
            "DATABASE_URL=postgres://svc:pw@db:5432/billing?sslmode=disable",
            r#"FEATURES={"cache":{"ttl":30},"regions":["eu","us"]}"#,
        ]))
        .with_stdout(stdout.clone())
}

fn entries_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ============================================================================
// Standard output
// ============================================================================

#[test]
fn stdout_receives_exact_output_and_nothing_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(&dir, "app.conf", "name = {{ Env.APP_NAME }}\nport = {{ Env.APP_PORT }}\n");
    let before = entries_in(dir.path());

    let stdout = CapturedOutput::new();
    let rendered = renderer(RenderConfig::new(), &stdout)
        .render_file(&template, None)
        .unwrap();

    assert!(rendered);
    assert_eq!(stdout.contents(), b"name = billing\nport = 8080\n");
    assert_eq!(entries_in(dir.path()), before);
}

#[test]
fn all_system_functions_are_callable() {
    let dir = tempfile::tempdir().unwrap();
    let present = write_template(&dir, "present.txt", "");
    let template = write_template(
        &dir,
        "full.conf",
        &format!(
            concat!(
                "{{% set db = parseUrl(Env.DATABASE_URL) %}}",
                "host={{{{ db.hostname }}}} port={{{{ db.port }}}} user={{{{ db.username }}}}\n",
                "debug={{{{ isTrue(Env.DEBUG) }}}}\n",
                "ttl={{{{ jsonQuery(Env.FEATURES, '.cache.ttl') }}}}\n",
                "regions={{{{ jsonQuery(Env.FEATURES, '.regions') | join(',') }}}}\n",
                "present={{{{ exists('{}') }}}} absent={{{{ exists('{}') }}}}\n",
            ),
            present.display(),
            dir.path().join("absent.txt").display()
        ),
    );

    let stdout = CapturedOutput::new();
    renderer(RenderConfig::new(), &stdout)
        .render_file(&template, None)
        .unwrap();

    assert_eq!(
        stdout.contents_string(),
        "host=db port=5432 user=svc\ndebug=true\nttl=30\nregions=eu,us\npresent=true absent=false\n"
    );
}

// ============================================================================
// Destination files
// ============================================================================

#[test]
fn fresh_destination_gets_rendered_contents() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(&dir, "app.conf.tmpl", "listen {{ Env.APP_PORT }};\n");
    let dest = dir.path().join("app.conf");

    let stdout = CapturedOutput::new();
    let rendered = renderer(RenderConfig::new(), &stdout)
        .render_file(&template, Some(&dest))
        .unwrap();

    assert!(rendered);
    assert_eq!(fs::read_to_string(&dest).unwrap(), "listen 8080;\n");
    assert!(stdout.contents().is_empty());
}

#[cfg(unix)]
#[test]
fn fresh_destination_gets_template_mode_and_owner() {
    use std::os::unix::fs::{MetadataExt, PermissionsExt};

    let dir = tempfile::tempdir().unwrap();
    let template = write_template(&dir, "run.sh", "#!/bin/sh\necho {{ Env.APP_NAME }}\n");
    fs::set_permissions(&template, fs::Permissions::from_mode(0o751)).unwrap();
    let dest = dir.path().join("run-rendered.sh");

    let stdout = CapturedOutput::new();
    renderer(RenderConfig::new(), &stdout)
        .render_file(&template, Some(&dest))
        .unwrap();

    let source_meta = fs::metadata(&template).unwrap();
    let dest_meta = fs::metadata(&dest).unwrap();
    assert_eq!(dest_meta.permissions().mode() & 0o7777, 0o751);
    assert_eq!(dest_meta.uid(), source_meta.uid());
    assert_eq!(dest_meta.gid(), source_meta.gid());
}

#[test]
fn existing_destination_is_truncated_when_overwrite_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(&dir, "t", "new");
    let dest = write_template(&dir, "out", "old content that is longer");

    let stdout = CapturedOutput::new();
    assert!(renderer(RenderConfig::new(), &stdout)
        .render_file(&template, Some(&dest))
        .unwrap());
    assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
}

#[test]
fn no_overwrite_skips_existing_destination_without_evaluating() {
    let dir = tempfile::tempdir().unwrap();
    // Evaluating this template would fail, so a skip proves it never ran.
    let template = write_template(&dir, "t", "{{ jsonQuery('not json', '.a') }}");
    let dest = write_template(&dir, "out", "keep me");
    let before = fs::metadata(&dest).unwrap();

    let stdout = CapturedOutput::new();
    let metadata = RecordingMetadata::new();
    let rendered = renderer(RenderConfig::new().no_overwrite(true), &stdout)
        .with_metadata(metadata.clone())
        .render_file(&template, Some(&dest))
        .unwrap();

    assert!(!rendered);
    assert_eq!(fs::read_to_string(&dest).unwrap(), "keep me");
    assert_eq!(fs::metadata(&dest).unwrap().permissions(), before.permissions());
    assert!(metadata.calls().is_empty());
}

#[test]
fn no_overwrite_still_renders_missing_destination() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(&dir, "t", "{{ Env.APP_NAME }}");
    let dest = dir.path().join("out");

    let stdout = CapturedOutput::new();
    let metadata = RecordingMetadata::new();
    let rendered = renderer(RenderConfig::new().no_overwrite(true), &stdout)
        .with_metadata(metadata.clone())
        .render_file(&template, Some(&dest))
        .unwrap();

    assert!(rendered);
    assert_eq!(fs::read_to_string(&dest).unwrap(), "billing");
    let ops: Vec<MetadataOp> = metadata.calls().into_iter().map(|c| c.op).collect();
    assert_eq!(ops, vec![MetadataOp::Permissions, MetadataOp::Ownership]);
}

#[test]
fn no_overwrite_is_ignored_for_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(&dir, "t", "ok");

    let stdout = CapturedOutput::new();
    assert!(renderer(RenderConfig::new().no_overwrite(true), &stdout)
        .render_file(&template, None)
        .unwrap());
    assert_eq!(stdout.contents_string(), "ok");
}

// ============================================================================
// Delimiters
// ============================================================================

#[test]
fn custom_delimiters_leave_default_markers_literal() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(
        &dir,
        "chart.yaml",
        "image: {{ .Values.image }}\nname: << Env.APP_NAME >>\n<<% if isTrue(Env.DEBUG) %>>debug: true\n<<% endif %>>",
    );

    let stdout = CapturedOutput::new();
    renderer(
        RenderConfig::new().delimiters(Delimiters::new("<<", ">>")),
        &stdout,
    )
    .render_file(&template, None)
    .unwrap();

    assert_eq!(
        stdout.contents_string(),
        "image: {{ .Values.image }}\nname: billing\ndebug: true\n"
    );
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn syntax_error_is_reported_before_destination_is_touched() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(&dir, "t", "{% if %}");
    let dest = dir.path().join("out");

    let stdout = CapturedOutput::new();
    let err = renderer(RenderConfig::new(), &stdout)
        .render_file(&template, Some(&dest))
        .unwrap_err();

    assert!(matches!(err, RenderError::Syntax { .. }));
    assert!(!dest.exists());
}

#[test]
fn json_query_failure_is_an_evaluation_error() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(&dir, "t", "{{ jsonQuery('not json', '.a') }}");

    let stdout = CapturedOutput::new();
    let err = renderer(RenderConfig::new(), &stdout)
        .render_file(&template, None)
        .unwrap_err();

    assert!(matches!(err, RenderError::Evaluation { .. }));
    assert!(err.is_evaluation());
}

#[test]
fn malformed_url_is_reported_separately() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(&dir, "t", "{{ parseUrl('http://[::1').host }}");

    let stdout = CapturedOutput::new();
    let err = renderer(RenderConfig::new(), &stdout)
        .render_file(&template, None)
        .unwrap_err();

    match err {
        RenderError::MalformedUrl { path, source } => {
            assert_eq!(path, template);
            assert_eq!(source.url(), "http://[::1");
        }
        other => panic!("expected MalformedUrl, got {other:?}"),
    }
}

#[test]
fn relative_url_renders_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(
        &dir,
        "t",
        "{% set s = parseUrl('/var/run/docker.sock') %}[{{ s.scheme }}][{{ s.host }}]{{ s.path }}\n\
         {{ parseUrl('').path }}|{{ parseUrl('conf/app.ini?x=1').query }}",
    );

    let stdout = CapturedOutput::new();
    renderer(RenderConfig::new(), &stdout)
        .render_file(&template, None)
        .unwrap();

    assert_eq!(
        stdout.contents_string(),
        "[][]/var/run/docker.sock\n|x=1"
    );
}

#[cfg(unix)]
#[test]
fn exists_failure_other_than_not_found_is_an_evaluation_error() {
    let dir = tempfile::tempdir().unwrap();
    let plain = write_template(&dir, "plain", "x");
    let template = write_template(
        &dir,
        "t",
        &format!("{{{{ exists('{}') }}}}", plain.join("child").display()),
    );

    let stdout = CapturedOutput::new();
    let err = renderer(RenderConfig::new(), &stdout)
        .render_file(&template, None)
        .unwrap_err();

    assert!(matches!(err, RenderError::Evaluation { .. }));
    assert!(stdout.contents().is_empty());
}

#[test]
fn unknown_function_is_an_evaluation_error() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(&dir, "t", "{{ nope() }}");

    let stdout = CapturedOutput::new();
    let err = renderer(RenderConfig::new(), &stdout)
        .render_file(&template, None)
        .unwrap_err();
    assert!(matches!(err, RenderError::Evaluation { .. }));
}

#[test]
fn missing_parent_directory_fails_to_create() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(&dir, "t", "x");
    let dest = dir.path().join("missing").join("out");

    let stdout = CapturedOutput::new();
    let err = renderer(RenderConfig::new(), &stdout)
        .render_file(&template, Some(&dest))
        .unwrap_err();
    assert!(matches!(err, RenderError::CreateDestination { .. }));
}

#[test]
fn chmod_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(&dir, "t", "x");
    let dest = dir.path().join("out");

    let stdout = CapturedOutput::new();
    let err = renderer(RenderConfig::new(), &stdout)
        .with_metadata(RecordingMetadata::new().fail_on(MetadataOp::Permissions))
        .render_file(&template, Some(&dest))
        .unwrap_err();

    assert!(matches!(err, RenderError::Chmod { .. }));
    // The rendered content stays behind.
    assert_eq!(fs::read_to_string(&dest).unwrap(), "x");
}
