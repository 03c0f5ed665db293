// ABOUTME: Materializer for the mdpress application
// ABOUTME: Applies a computed diff to the output tree, one operation at a time

use crate::diff::{DiffResult, PageWrite};
use crate::errors::{PublishError, Result};
use crate::html::{self, Renderer};
use log::{error, info};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One filesystem operation from a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CreateDir(PathBuf),
    DeleteDir(PathBuf),
    WriteFile(PageWrite),
    DeleteFile(PathBuf),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CreateDir(p) => write!(f, "create dir {}", p.display()),
            Operation::DeleteDir(p) => write!(f, "delete dir {}", p.display()),
            Operation::WriteFile(w) => write!(f, "write {}", w.dest.display()),
            Operation::DeleteFile(p) => write!(f, "delete {}", p.display()),
        }
    }
}

/// Operations that completed, in the order they ran
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyLog {
    pub completed: Vec<Operation>,
}

impl ApplyLog {
    pub fn writes(&self) -> usize {
        self.count(|op| matches!(op, Operation::WriteFile(_)))
    }

    pub fn deletions(&self) -> usize {
        self.count(|op| matches!(op, Operation::DeleteFile(_) | Operation::DeleteDir(_)))
    }

    fn count(&self, pred: impl Fn(&Operation) -> bool) -> usize {
        self.completed.iter().filter(|op| pred(op)).count()
    }
}

/// Apply a diff: create dirs, delete dirs, write pages, delete pages.
///
/// There is no rollback. If an operation fails, everything before it stays
/// applied; the completed and failed operations are logged and the error
/// is returned.
pub fn apply(diff: &DiffResult, renderer: &dyn Renderer) -> Result<ApplyLog> {
    let mut log = ApplyLog::default();

    let steps = diff
        .create_dirs
        .iter()
        .map(|p| Operation::CreateDir(p.clone()))
        .chain(diff.delete_dirs.iter().map(|p| Operation::DeleteDir(p.clone())))
        .chain(diff.write_files.iter().map(|w| Operation::WriteFile(w.clone())))
        .chain(diff.delete_files.iter().map(|p| Operation::DeleteFile(p.clone())));

    for op in steps {
        let outcome = match &op {
            Operation::CreateDir(path) => create_dir(path),
            Operation::DeleteDir(path) => delete_dir(path),
            Operation::WriteFile(page) => write_page(page, renderer),
            Operation::DeleteFile(path) => delete_file(path),
        };

        match outcome {
            Ok(()) => {
                info!("{}", op);
                log.completed.push(op);
            }
            Err(e) => {
                error!("Sync stopped at '{}': {}", op, e);
                error!(
                    "{} operation(s) had already been applied and were kept:",
                    log.completed.len()
                );
                for done in &log.completed {
                    error!("  {}", done);
                }
                return Err(e);
            }
        }
    }

    Ok(log)
}

/// Create a single directory; its parent must already exist
fn create_dir(path: &Path) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(PublishError::DirectoryCreate {
            path: path.to_path_buf(),
            source: e,
        }),
        Err(e) => Err(PublishError::io(path, e)),
    }
}

fn delete_dir(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PublishError::io(path, e)),
    }
}

fn write_page(page: &PageWrite, renderer: &dyn Renderer) -> Result<()> {
    let content = html::render_page(renderer, &page.source, page.kind)?;
    html::write_page(&content, &page.dest)
}

fn delete_file(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PublishError::io(path, e)),
    }
}
