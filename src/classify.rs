// ABOUTME: Path classification for the mdpress application
// ABOUTME: Decides which directories and files take part in the site tree comparison

use std::path::{Component, Path};

/// Extensions (compared case-insensitively) that mark a file as site content
pub const CONTENT_EXTENSIONS: [&str; 3] = ["html", "md", "markdown"];

/// Names a tree walk must never descend into.
///
/// All context is passed in explicitly; nothing here reads the working
/// directory or process state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classifier {
    /// Base name of the source root, excluded as a top-level segment
    pub root_name: String,
    /// Base name of the output root when it lives inside the source tree
    pub output_name: Option<String>,
    /// Directory holding the tool itself
    pub tool_dir: Option<String>,
    /// Base name of the current working directory
    pub cwd_name: Option<String>,
}

impl Classifier {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root_name: root_name.into(),
            ..Self::default()
        }
    }

    pub fn with_output_name(mut self, name: Option<String>) -> Self {
        self.output_name = name;
        self
    }

    pub fn with_tool_dir(mut self, name: Option<String>) -> Self {
        self.tool_dir = name;
        self
    }

    pub fn with_cwd_name(mut self, name: Option<String>) -> Self {
        self.cwd_name = name;
        self
    }

    /// Whether a directory, given relative to the root being walked, is part of the tree
    pub fn is_eligible_dir(&self, rel: &Path) -> bool {
        is_eligible_dir(
            rel,
            &self.root_name,
            self.output_name.as_deref(),
            self.tool_dir.as_deref(),
            self.cwd_name.as_deref(),
        )
    }
}

/// Directory predicate with all of its context as parameters.
///
/// `rel` is the directory path relative to the walked root. Only the
/// top-level segment is compared against the root reflections; the last
/// segment is checked for dots and the tool/cwd names.
pub fn is_eligible_dir(
    rel: &Path,
    root_name: &str,
    output_name: Option<&str>,
    tool_dir: Option<&str>,
    cwd_name: Option<&str>,
) -> bool {
    let mut segments = rel.components().filter_map(|c| match c {
        Component::Normal(name) => Some(name.to_string_lossy()),
        _ => None,
    });

    let Some(top) = segments.next() else {
        return false;
    };
    if top == root_name || Some(top.as_ref()) == output_name {
        return false;
    }

    let name = segments.last().unwrap_or(top);
    if name.contains('.') {
        return false;
    }
    if Some(name.as_ref()) == cwd_name || Some(name.as_ref()) == tool_dir {
        return false;
    }
    true
}

/// File predicate: not a dotfile, and carries a recognized content extension
pub fn is_eligible_file(name: &str) -> bool {
    if name.is_empty() || name.starts_with('.') {
        return false;
    }
    Path::new(name)
        .extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            CONTENT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
