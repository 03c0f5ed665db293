// ABOUTME: HTML generation module for the mdpress application
// ABOUTME: Converts markdown sources to HTML pages and passes raw HTML through

use crate::errors::{PublishError, Result};
use crate::scan::FileKind;
use comrak::{markdown_to_html, ComrakOptions};
use log::debug;
use std::fs;
use std::path::Path;

/// Markdown-to-HTML conversion, treated as an opaque collaborator
pub trait Renderer {
    fn render_markdown(&self, markdown: &str) -> String;
}

/// Default renderer backed by comrak
pub struct ComrakRenderer {
    options: ComrakOptions,
}

impl Default for ComrakRenderer {
    fn default() -> Self {
        let mut options = ComrakOptions::default();
        options.render.unsafe_ = true; // Allow raw HTML such as injected style blocks
        options.extension.table = true;
        options.extension.strikethrough = true;
        options.extension.autolink = true;
        Self { options }
    }
}

impl ComrakRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for ComrakRenderer {
    fn render_markdown(&self, markdown: &str) -> String {
        markdown_to_html(markdown, &self.options)
    }
}

/// Produce the page bytes for a source file.
///
/// Markdown is rendered; HTML is passed through verbatim. Any failure to
/// read the source is reported as a write failure of the page.
pub fn render_page(renderer: &dyn Renderer, source: &Path, kind: FileKind) -> Result<Vec<u8>> {
    debug!("Rendering {:?} as {:?}", source, kind);
    match kind {
        FileKind::Html => fs::read(source).map_err(|e| PublishError::Write {
            path: source.to_path_buf(),
            source: e,
        }),
        FileKind::Markdown => {
            let markdown = fs::read_to_string(source).map_err(|e| PublishError::Write {
                path: source.to_path_buf(),
                source: e,
            })?;
            Ok(renderer.render_markdown(&markdown).into_bytes())
        }
    }
}

/// Utility function to write a rendered page to a file, replacing any previous content
pub fn write_page(content: &[u8], output_path: &Path) -> Result<()> {
    debug!("Writing page: {:?}", output_path);
    fs::write(output_path, content).map_err(|e| PublishError::Write {
        path: output_path.to_path_buf(),
        source: e,
    })
}
