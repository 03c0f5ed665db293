// ABOUTME: Diff engine for the mdpress application
// ABOUTME: Compares a source tree with a generated tree using content hashes

use crate::errors::{PublishError, Result};
use crate::html::{self, Renderer};
use crate::scan::{ContentTree, EntryKind, FileKind};
use crate::utils;
use log::{debug, warn};
use md5::{Digest, Md5};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A page to (re)generate: where it comes from and where it goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWrite {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub kind: FileKind,
}

/// The filesystem operations that bring the output tree in sync.
///
/// All paths are full paths under the respective roots. Directories to
/// create are ordered parents first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    pub create_dirs: Vec<PathBuf>,
    pub delete_dirs: Vec<PathBuf>,
    pub write_files: Vec<PageWrite>,
    pub delete_files: Vec<PathBuf>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.operation_count() == 0
    }

    pub fn operation_count(&self) -> usize {
        self.create_dirs.len() + self.delete_dirs.len() + self.write_files.len() + self.delete_files.len()
    }
}

/// 128-bit content digest
pub type ContentHash = [u8; 16];

pub fn content_hash(bytes: &[u8]) -> ContentHash {
    let digest = Md5::digest(bytes);
    let mut hash = [0u8; 16];
    hash.copy_from_slice(&digest);
    hash
}

/// Hash of the bytes currently on disk, or `None` if there is no such file
fn existing_hash(path: &Path) -> Result<Option<ContentHash>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(content_hash(&bytes))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PublishError::io(path, e)),
    }
}

/// Compute the operations needed to mirror `source` into `output`.
///
/// Pages are compared by rendering the source and hashing the result
/// against the bytes of the existing page; timestamps play no part.
/// Paths in `preserve` (relative to the output root) are never scheduled
/// for writing or deletion.
pub fn diff(
    source: &ContentTree,
    output: &ContentTree,
    preserve: &HashSet<PathBuf>,
    renderer: &dyn Renderer,
) -> Result<DiffResult> {
    let mut result = DiffResult::default();

    let output_dirs: HashSet<&Path> = output.dirs().map(|e| e.rel_path.as_path()).collect();
    let output_pages: HashSet<&Path> = output
        .files()
        .filter(|e| e.kind == EntryKind::File(FileKind::Html))
        .map(|e| e.rel_path.as_path())
        .collect();

    // Directories: source walk order already puts parents first
    for entry in source.dirs() {
        if !output_dirs.contains(entry.rel_path.as_path()) {
            debug!("Directory missing from output: {:?}", entry.rel_path);
            result.create_dirs.push(output.root.join(&entry.rel_path));
        }
    }

    // Pages: new or stale by content hash
    let mut claimed: HashSet<PathBuf> = HashSet::new();
    for entry in source.files() {
        let EntryKind::File(kind) = entry.kind else {
            continue;
        };
        let page = utils::page_path(&entry.rel_path);
        if preserve.contains(&page) {
            debug!("Leaving preserved page {:?} alone", page);
            continue;
        }
        if !claimed.insert(page.clone()) {
            warn!(
                "Skipping {:?}: another source file already produces {:?}",
                entry.rel_path, page
            );
            continue;
        }

        let source_path = source.full_path(entry);
        let dest = output.root.join(&page);
        let stale = if output_pages.contains(page.as_path()) {
            let rendered = html::render_page(renderer, &source_path, kind)?;
            existing_hash(&dest)? != Some(content_hash(&rendered))
        } else {
            true
        };

        if stale {
            debug!("Page out of date: {:?}", page);
            result.write_files.push(PageWrite {
                source: source_path,
                dest,
                kind,
            });
        }
    }

    // Orphans: output entries with no source counterpart
    let source_dirs: HashSet<&Path> = source.dirs().map(|e| e.rel_path.as_path()).collect();
    let source_pages: HashSet<PathBuf> = source.files().map(|e| e.logical_path()).collect();

    for entry in output.entries.iter() {
        match entry.kind {
            EntryKind::Directory => {
                if !source_dirs.contains(entry.rel_path.as_path()) {
                    debug!("Directory has no source: {:?}", entry.rel_path);
                    result.delete_dirs.push(output.full_path(entry));
                }
            }
            EntryKind::File(FileKind::Html) => {
                if preserve.contains(&entry.rel_path) {
                    continue;
                }
                if !source_pages.contains(&entry.logical_path()) {
                    debug!("Page has no source: {:?}", entry.rel_path);
                    result.delete_files.push(output.full_path(entry));
                }
            }
            // Markdown sitting in the output tree is not ours to manage
            EntryKind::File(FileKind::Markdown) => {}
        }
    }

    prune_nested(&mut result.delete_dirs);
    let deleted_dirs = result.delete_dirs.clone();
    result
        .delete_files
        .retain(|f| !deleted_dirs.iter().any(|d| f.starts_with(d)));

    Ok(result)
}

/// Drop directories whose ancestor is already being removed
fn prune_nested(dirs: &mut Vec<PathBuf>) {
    let all = dirs.clone();
    dirs.retain(|d| !all.iter().any(|other| other != d && d.starts_with(other)));
}
