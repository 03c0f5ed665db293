use mdpress::{sync_site, ComrakRenderer, Config, SiteOptions, StyleInjector};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn count_files_with_pattern(dir: &Path, pattern: &str) -> usize {
    let glob_pattern = format!("{}/{}", dir.to_string_lossy(), pattern);
    glob::glob(&glob_pattern)
        .expect("Failed to read glob pattern")
        .filter_map(Result::ok)
        .count()
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent");
    }
    fs::write(path, content).expect("Failed to write file");
}

#[test]
fn test_deep_tree_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let source = temp_dir.path().join("site");
    let output = temp_dir.path().join("public");

    write(&source.join("index.md"), "# Home\n");
    write(&source.join("guide/intro.md"), "# Intro\n");
    write(&source.join("guide/advanced/macros.markdown"), "# Macros\n");
    write(&source.join("guide/advanced/embed.html"), "<b>raw</b>\n");
    write(&source.join("guide/.secret.md"), "hidden\n");
    write(&source.join(".cache/junk.md"), "junk\n");
    write(&source.join("assets.v2/logo.md"), "dotted dir\n");

    let renderer = ComrakRenderer::new();
    let options = SiteOptions::new(&source, &output);
    let report = sync_site(&options, &renderer).expect("First sync failed");

    assert_eq!(report.applied.writes(), 4);
    assert_eq!(count_files_with_pattern(&output, "**/*.html"), 4);
    assert!(output.join("guide/advanced/macros.html").is_file());
    assert!(!output.join(".cache").exists());
    assert!(!output.join("assets.v2").exists());
    assert!(!output.join("guide/.secret.html").exists());

    // Every page now matches its rendered source byte for byte
    let again = sync_site(&options, &renderer).expect("Second sync failed");
    assert!(again.diff.is_empty());
}

#[test]
fn test_moving_a_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let source = temp_dir.path().join("site");
    let output = temp_dir.path().join("public");
    write(&source.join("old/page.md"), "# Page\n");

    let renderer = ComrakRenderer::new();
    let options = SiteOptions::new(&source, &output);
    sync_site(&options, &renderer).expect("First sync failed");

    fs::rename(source.join("old"), source.join("new")).expect("Failed to rename");
    let report = sync_site(&options, &renderer).expect("Second sync failed");

    assert_eq!(report.diff.create_dirs, vec![output.join("new")]);
    assert_eq!(report.diff.delete_dirs, vec![output.join("old")]);
    assert!(output.join("new/page.html").is_file());
    assert!(!output.join("old").exists());
}

#[test]
fn test_tool_directory_is_ignored() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let source = temp_dir.path().join("site");
    let output = temp_dir.path().join("public");
    write(&source.join("index.md"), "# Home\n");
    write(&source.join("mdpress/README.md"), "tooling\n");
    write(&output.join("mdpress/keep.html"), "tool output\n");

    let options = SiteOptions {
        tool_dir: Some("mdpress".to_string()),
        ..SiteOptions::new(&source, &output)
    };
    let report = sync_site(&options, &ComrakRenderer::new()).expect("Sync failed");

    assert_eq!(report.applied.writes(), 1);
    assert!(!output.join("mdpress/README.html").exists());
    assert!(output.join("mdpress/keep.html").is_file());
}

#[test]
fn test_style_injection_converges_on_disk() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file = temp_dir.path().join("page.md");
    write(&file, "# Page\n\nBody text.\n");

    let config = Config::from_yaml("style:\n  font-family: Georgia\n  background-color: \"#fff\"\n  shadow: none\n")
        .expect("Failed to parse config");
    let injector = StyleInjector::new(&config.style);

    let changed = injector.apply(&[file.clone()]).expect("First injection failed");
    assert_eq!(changed.len(), 1);
    let after_first = fs::read(&file).expect("Failed to read file");

    let changed = injector.apply(&[file.clone()]).expect("Second injection failed");
    assert!(changed.is_empty());
    assert_eq!(fs::read(&file).expect("Failed to read file"), after_first);

    let text = String::from_utf8(after_first).expect("Not UTF-8");
    assert!(text.ends_with("<style>body { font-family: Georgia; background-color: #fff; }</style>\n"));
    assert!(!text.contains("shadow"));
}
