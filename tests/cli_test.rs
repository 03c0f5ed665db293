use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_command(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mdpress"))
        .current_dir(cwd)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_cli_sync_with_feed_and_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    fs::create_dir_all(root.join("content/posts")).expect("Failed to create dirs");
    fs::write(root.join("content/index.md"), "# Home\n").expect("Failed to write");
    fs::write(root.join("content/posts/2022-03-22-who-am-i.md"), "# Me\n").expect("Failed to write");
    fs::write(
        root.join("mdpress.yml"),
        "source_dir: content\nstyle:\n  color: \"#333\"\n",
    )
    .expect("Failed to write config");

    let output = run_command(root, &["--output", "www/", "--feed"]);
    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    assert!(root.join("www/index.html").is_file());
    assert!(root.join("www/posts/2022-03-22-who-am-i.html").is_file());
    let feed = fs::read_to_string(root.join("www/feed.html")).expect("Feed missing");
    assert!(feed.contains("/posts/2022-03-22-who-am-i.html"));
    let source = fs::read_to_string(root.join("content/index.md")).expect("Source missing");
    assert!(source.ends_with("<style>body { color: #333; }</style>\n"));
}

#[test]
fn test_cli_fails_on_bad_post_name() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    fs::create_dir_all(root.join("site/posts")).expect("Failed to create dirs");
    fs::write(root.join("site/posts/2022-bad.md"), "oops\n").expect("Failed to write");

    let output = run_command(root, &["--feed"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("2022-bad"));
}

#[test]
fn test_cli_missing_explicit_config_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_command(temp_dir.path(), &["--config", "missing.yml"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_rejects_tool_dir_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::create_dir(temp_dir.path().join("site")).expect("Failed to create dir");
    let output = run_command(temp_dir.path(), &["--tool-dir", "tools/mdpress"]);
    assert!(!output.status.success());
    assert!(!temp_dir.path().join("public").exists());
}
