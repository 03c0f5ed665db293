// ABOUTME: Style injection for the mdpress application
// ABOUTME: Keeps a single trailing style block at the end of every content file

use crate::config::StyleConfig;
use crate::errors::{PublishError, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the site style line into source files before they are compared
#[derive(Debug, Clone)]
pub struct StyleInjector {
    style_line: Option<String>,
}

impl StyleInjector {
    pub fn new(style: &StyleConfig) -> Self {
        Self {
            style_line: style.style_line(),
        }
    }

    /// Inject the style into each file; returns the files that were rewritten
    pub fn apply(&self, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let Some(style) = &self.style_line else {
            debug!("No style configured, leaving sources untouched");
            return Ok(Vec::new());
        };

        let mut changed = Vec::new();
        for file in files {
            if inject_file(file, style)? {
                changed.push(file.clone());
            }
        }
        if !changed.is_empty() {
            info!("Injected style into {} file(s)", changed.len());
        }
        Ok(changed)
    }
}

/// Whether a line is a style block we may replace
fn is_style_block(line: &str) -> bool {
    let line = line.trim();
    line.starts_with("<style>") && line.ends_with("</style>")
}

/// New content with `style` as its last line, or `None` if it is already there
pub fn inject(content: &str, style: &str) -> Option<String> {
    let body = content.trim_end_matches(['\n', '\r']);
    let (head, last) = match body.rfind('\n') {
        Some(idx) => (&body[..=idx], &body[idx + 1..]),
        None => ("", body),
    };

    if last.trim_end() == style {
        return None;
    }

    let mut updated = String::with_capacity(content.len() + style.len() + 2);
    if is_style_block(last) {
        updated.push_str(head);
    } else if !body.is_empty() {
        updated.push_str(body);
        updated.push('\n');
    }
    updated.push_str(style);
    updated.push('\n');
    Some(updated)
}

fn inject_file(path: &Path, style: &str) -> Result<bool> {
    let content = fs::read_to_string(path).map_err(|e| PublishError::io(path, e))?;
    match inject(&content, style) {
        Some(updated) => {
            fs::write(path, updated).map_err(|e| PublishError::Write {
                path: path.to_path_buf(),
                source: e,
            })?;
            debug!("Style updated in {:?}", path);
            Ok(true)
        }
        None => Ok(false),
    }
}
