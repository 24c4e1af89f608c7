#![allow(clippy::disallowed_methods)]

use std::{
    fs,
    path::Path,
    process::{Command, Output},
};

use tempfile::TempDir;

fn create_test_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Run the binary inside `workdir` with the user configuration directory
/// pointed into it, so the host's settings never leak in.
fn run_plait(workdir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_plait"))
        .args(args)
        .current_dir(workdir)
        .env("HOME", workdir)
        .env("XDG_CONFIG_HOME", workdir.join(".config"))
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run plait")
}

#[test]
fn test_writes_bundle_to_stdout() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(&temp_dir.path().join("main.py"), "import helpers\n");
    create_test_file(&temp_dir.path().join("helpers.py"), "VALUE = 1\n");

    let output = run_plait(temp_dir.path(), &["main.py"]);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("#!/usr/bin/env python3\n"));
    assert!(stdout.contains("    _plait_register_module(\"helpers\", \""));
    assert!(stdout.ends_with("finally:\n    del _plait_register_module\n"));
}

#[test]
fn test_writes_executable_output_file() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(
        &temp_dir.path().join("src/tool.py"),
        "#!/opt/python/bin/python3\nprint('tool')\n",
    );

    let output = run_plait(
        temp_dir.path(),
        &["src/tool.py", "--copy-shebang", "-o", "dist/tool"],
    );

    assert!(output.status.success(), "{output:?}");
    assert!(output.stdout.is_empty());
    let bundle_path = temp_dir.path().join("dist/tool");
    let bundle = fs::read_to_string(&bundle_path).unwrap();
    assert!(bundle.starts_with("#!/opt/python/bin/python3\n"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&bundle_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}

#[test]
fn test_missing_entry_fails_with_message() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_plait(temp_dir.path(), &["missing.py"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("entry script not found"), "{stderr}");
}

#[test]
fn test_strict_flag_reports_unresolved_import() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(&temp_dir.path().join("main.py"), "import not_here\n");

    let lenient = run_plait(temp_dir.path(), &["main.py"]);
    assert!(lenient.status.success(), "{lenient:?}");

    let strict = run_plait(temp_dir.path(), &["main.py", "--strict"]);
    assert_eq!(strict.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&strict.stderr);
    assert!(stderr.contains("unresolved import 'not_here'"), "{stderr}");
}

#[test]
fn test_project_config_file_is_applied() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(&temp_dir.path().join("app/main.py"), "import shared\n");
    create_test_file(&temp_dir.path().join("libs/shared.py"), "");
    create_test_file(&temp_dir.path().join("libs/plugin.py"), "");
    create_test_file(
        &temp_dir.path().join("plait.toml"),
        "src = [\"libs\"]\nextra-modules = [\"plugin\"]\ndefault-shebang = \"#!/usr/bin/python3 -u\"\n",
    );

    let output = run_plait(temp_dir.path(), &["app/main.py"]);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("#!/usr/bin/python3 -u\n"));
    assert!(stdout.contains("_plait_register_module(\"shared\""));
    assert!(stdout.contains("_plait_register_module(\"plugin\""));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(&temp_dir.path().join("main.py"), "");
    create_test_file(&temp_dir.path().join("custom.toml"), "resolution = 3\n");

    let output = run_plait(temp_dir.path(), &["main.py", "--config", "custom.toml"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("custom.toml"), "{stderr}");
}
