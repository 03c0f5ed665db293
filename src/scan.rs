// ABOUTME: Tree scanning for the mdpress application
// ABOUTME: Walks a root directory into a flat, deterministic list of content entries

use crate::classify::{is_eligible_file, Classifier};
use crate::errors::Result;
use crate::utils;
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// How a content file is turned into a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Rendered from Markdown to HTML
    Markdown,
    /// Copied through byte for byte
    Html,
}

impl FileKind {
    /// Kind for a file name, by its extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase()) {
            Some(ext) if ext == "md" || ext == "markdown" => FileKind::Markdown,
            _ => FileKind::Html,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Directory,
    File(FileKind),
}

/// A directory or file taking part in the tree comparison
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentEntry {
    /// Path relative to the tree root; this is the entry's identity
    pub rel_path: PathBuf,
    pub kind: EntryKind,
}

impl ContentEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Identity used to pair source and output files: the relative path minus its extension
    pub fn logical_path(&self) -> PathBuf {
        match self.kind {
            EntryKind::Directory => self.rel_path.clone(),
            EntryKind::File(_) => utils::strip_extension(&self.rel_path),
        }
    }
}

/// Flattened view of one root directory
#[derive(Debug, Clone)]
pub struct ContentTree {
    pub root: PathBuf,
    pub entries: Vec<ContentEntry>,
}

impl ContentTree {
    pub fn dirs(&self) -> impl Iterator<Item = &ContentEntry> {
        self.entries.iter().filter(|e| e.is_dir())
    }

    pub fn files(&self) -> impl Iterator<Item = &ContentEntry> {
        self.entries.iter().filter(|e| !e.is_dir())
    }

    /// Absolute (root-joined) path of an entry
    pub fn full_path(&self, entry: &ContentEntry) -> PathBuf {
        self.root.join(&entry.rel_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Walk `root` and collect eligible directories and files.
///
/// Entries come out sorted by file name within each directory, parents
/// before their children. With `max_depth` set, nothing deeper than that
/// many levels below `root` is returned (1 = immediate children only).
pub fn scan(root: &Path, classifier: &Classifier, max_depth: Option<usize>) -> Result<ContentTree> {
    utils::validate_directory_exists(root)?;

    let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    let mut entries = Vec::new();
    let iter = walker.into_iter().filter_entry(|entry| {
        if !entry.file_type().is_dir() {
            return true;
        }
        match entry.path().strip_prefix(root) {
            Ok(rel) => classifier.is_eligible_dir(rel),
            Err(_) => false,
        }
    });

    for entry in iter {
        let entry = entry?;
        let rel_path = match entry.path().strip_prefix(root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => continue,
        };

        if entry.file_type().is_dir() {
            entries.push(ContentEntry {
                rel_path,
                kind: EntryKind::Directory,
            });
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !is_eligible_file(&name) {
            debug!("Skipping non-content file {:?}", entry.path());
            continue;
        }
        let kind = EntryKind::File(FileKind::from_path(&rel_path));
        entries.push(ContentEntry { rel_path, kind });
    }

    debug!("Scanned {:?}: {} entries", root, entries.len());
    Ok(ContentTree {
        root: root.to_path_buf(),
        entries,
    })
}

/// Every non-directory child of `dir`, dotfiles excepted, sorted by name.
///
/// Unlike [`scan`], no extension filter applies: callers get the raw listing.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    utils::validate_directory_exists(dir)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_dir() || entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        files.push(entry.path().to_path_buf());
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path();
        fs::create_dir_all(root.join("posts/drafts")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("v1.0")).unwrap();
        fs::write(root.join("index.md"), "# Home").unwrap();
        fs::write(root.join("about.html"), "<p>About</p>").unwrap();
        fs::write(root.join("notes.txt"), "skip").unwrap();
        fs::write(root.join(".hidden.md"), "skip").unwrap();
        fs::write(root.join("posts/2022-01-01-a.md"), "a").unwrap();
        fs::write(root.join("posts/drafts/wip.md"), "wip").unwrap();
        fs::write(root.join(".git/HEAD.md"), "skip").unwrap();
        dir
    }

    fn paths(tree: &ContentTree) -> Vec<String> {
        tree.entries
            .iter()
            .map(|e| e.rel_path.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_scan_filters_and_orders_entries() {
        let dir = fixture();
        let tree = scan(dir.path(), &Classifier::new("site"), None).unwrap();

        assert_eq!(
            paths(&tree),
            vec![
                "about.html",
                "index.md",
                "posts",
                "posts/2022-01-01-a.md",
                "posts/drafts",
                "posts/drafts/wip.md",
            ]
        );
        assert_eq!(tree.entries[0].kind, EntryKind::File(FileKind::Html));
        assert_eq!(tree.entries[1].kind, EntryKind::File(FileKind::Markdown));
        assert!(tree.entries[2].is_dir());
    }

    #[test]
    fn test_scan_respects_depth_bound() {
        let dir = fixture();
        let tree = scan(dir.path(), &Classifier::new("site"), Some(1)).unwrap();
        assert_eq!(paths(&tree), vec!["about.html", "index.md", "posts"]);
    }

    #[test]
    fn test_list_files_keeps_every_plain_file() {
        let dir = fixture();
        let files: Vec<String> = list_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files, vec!["about.html", "index.md", "notes.txt"]);
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        let result = scan(&dir.path().join("nope"), &Classifier::new("site"), None);
        assert!(matches!(result, Err(crate::PublishError::PathNotFound(_))));
    }

    #[test]
    fn test_logical_path_strips_extension() {
        let entry = ContentEntry {
            rel_path: PathBuf::from("posts/hello.md"),
            kind: EntryKind::File(FileKind::Markdown),
        };
        assert_eq!(entry.logical_path(), PathBuf::from("posts/hello"));
    }
}
