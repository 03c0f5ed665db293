// ABOUTME: Configuration module for the mdpress application
// ABOUTME: Loads the YAML site configuration and its style section

use crate::errors::{PublishError, Result};
use crate::site::{FeedOptions, SiteOptions};
use log::{info, warn};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file looked up when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "mdpress.yml";

/// Source root used when neither the CLI nor the config names one
pub const DEFAULT_SOURCE_DIR: &str = "site";

/// Output root used when neither the CLI nor the config names one
pub const DEFAULT_OUTPUT_DIR: &str = "public";

/// Feed file name inside the output root
pub const DEFAULT_FEED_FILE: &str = "feed.html";

/// Style keys understood by the style injector, in output order
pub const STYLE_KEYS: [&str; 6] = [
    "font-family",
    "font-size",
    "color",
    "background-color",
    "line-height",
    "max-width",
];

/// Recognized style declarations, kept in [`STYLE_KEYS`] order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleConfig {
    declarations: Vec<(String, String)>,
}

impl StyleConfig {
    /// Keep the recognized keys of a raw style mapping, warning about the rest
    pub fn from_raw(raw: &BTreeMap<String, Value>) -> Result<Self> {
        for key in raw.keys() {
            if !STYLE_KEYS.contains(&key.as_str()) {
                warn!("Unsupported style key {:?} ignored", key);
            }
        }

        let mut declarations = Vec::new();
        for key in STYLE_KEYS {
            let Some(value) = raw.get(key) else {
                continue;
            };
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => continue,
                other => {
                    return Err(PublishError::Config(format!(
                        "style key {:?} must be a scalar, got {:?}",
                        key, other
                    )))
                }
            };
            declarations.push((key.to_string(), value));
        }
        Ok(Self { declarations })
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn declarations(&self) -> &[(String, String)] {
        &self.declarations
    }

    /// The single-line style block appended to content files, if any keys are set
    pub fn style_line(&self) -> Option<String> {
        if self.declarations.is_empty() {
            return None;
        }
        let body = self
            .declarations
            .iter()
            .map(|(k, v)| format!("{}: {};", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        Some(format!("<style>body {{ {} }}</style>", body))
    }
}

/// On-disk shape of the configuration document
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    style: Option<BTreeMap<String, Value>>,
    source_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    posts_dir: Option<PathBuf>,
    feed_file: Option<PathBuf>,
    link_prefix: Option<String>,
    tool_dir: Option<String>,
}

/// Site configuration, loaded once per run and then read-only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub style: StyleConfig,
    pub source_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub posts_dir: Option<PathBuf>,
    pub feed_file: Option<PathBuf>,
    pub link_prefix: Option<String>,
    pub tool_dir: Option<String>,
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document; an empty document yields defaults
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawConfig = serde_yaml::from_str(content)?;
        let tool_dir = raw
            .tool_dir
            .as_deref()
            .map(crate::utils::parse_name_flag)
            .transpose()
            .map_err(|e| PublishError::Config(format!("tool_dir: {}", e)))?;
        Ok(Self {
            style: StyleConfig::from_raw(&raw.style.unwrap_or_default())?,
            source_dir: raw.source_dir,
            output_dir: raw.output_dir,
            posts_dir: raw.posts_dir,
            feed_file: raw.feed_file,
            link_prefix: raw.link_prefix,
            tool_dir,
        })
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| PublishError::Config(format!("cannot read {:?}: {}", path, e)))?;
        info!("Loaded configuration from {:?}", path);
        Self::from_yaml(&content)
    }

    /// Load an explicitly requested file, or the default file if it exists
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load(default)
                } else {
                    info!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Link prefix for posts: their directory relative to the source root, as an absolute URL path
fn default_link_prefix(source_dir: &Path, posts_dir: &Path) -> String {
    match posts_dir.strip_prefix(source_dir) {
        Ok(rel) if !rel.as_os_str().is_empty() => {
            let segments: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            format!("/{}/", segments.join("/"))
        }
        _ => "/".to_string(),
    }
}

impl Config {
    /// Get site options, preferring explicit values over this config over built-in defaults
    pub fn get_site_options(
        &self,
        source_dir: Option<PathBuf>,
        output_dir: Option<PathBuf>,
        posts_dir: Option<PathBuf>,
        feed_file: Option<PathBuf>,
        link_prefix: Option<String>,
        tool_dir: Option<String>,
        feed: bool,
    ) -> SiteOptions {
        let source_dir = source_dir
            .or_else(|| self.source_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_DIR));
        let output_dir = output_dir
            .or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let feed = feed.then(|| {
            let posts_dir = posts_dir
                .or_else(|| self.posts_dir.clone())
                .unwrap_or_else(|| source_dir.join("posts"));
            let feed_file = feed_file
                .or_else(|| self.feed_file.clone())
                .unwrap_or_else(|| output_dir.join(DEFAULT_FEED_FILE));
            let link_prefix = link_prefix
                .or_else(|| self.link_prefix.clone())
                .unwrap_or_else(|| default_link_prefix(&source_dir, &posts_dir));
            FeedOptions {
                posts_dir,
                feed_file,
                link_prefix,
            }
        });

        SiteOptions {
            tool_dir: tool_dir.or_else(|| self.tool_dir.clone()),
            style: self.style.clone(),
            feed,
            ..SiteOptions::new(source_dir, output_dir)
        }
    }
}
