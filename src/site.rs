// ABOUTME: Site synchronization pipeline for the mdpress application
// ABOUTME: Runs style injection, scanning, diffing, materializing and the feed in order

use crate::classify::Classifier;
use crate::diff::{self, DiffResult};
use crate::errors::Result;
use crate::feed;
use crate::html::Renderer;
use crate::materialize::{self, ApplyLog};
use crate::scan::{self, ContentTree};
use crate::style::StyleInjector;
use crate::utils;
use crate::StyleConfig;
use log::info;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Where the post feed comes from and where it goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedOptions {
    pub posts_dir: PathBuf,
    pub feed_file: PathBuf,
    pub link_prefix: String,
}

/// Everything one sync pass needs, passed explicitly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteOptions {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub tool_dir: Option<String>,
    /// Base name of the working directory, excluded from both trees
    pub cwd_name: Option<String>,
    pub style: StyleConfig,
    pub feed: Option<FeedOptions>,
    /// Compute and log the diff without touching the filesystem
    pub dry_run: bool,
}

impl SiteOptions {
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            tool_dir: None,
            cwd_name: None,
            style: StyleConfig::default(),
            feed: None,
            dry_run: false,
        }
    }
}

/// Outcome of one sync pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub diff: DiffResult,
    pub applied: ApplyLog,
    /// Source files that received a new style line
    pub styled: usize,
    /// Number of posts in the feed, when one was written
    pub feed_entries: Option<usize>,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.diff.is_empty() && self.styled == 0
    }
}

/// Build the classifier for a source/output pair, using absolute paths to find reflections
fn classifier_for(options: &SiteOptions) -> Result<Classifier> {
    let source_abs = utils::get_absolute_path(&options.source_dir)?;
    let output_abs = if options.output_dir.exists() {
        Some(utils::get_absolute_path(&options.output_dir)?)
    } else {
        None
    };

    let root_name = output_abs
        .as_deref()
        .and_then(|out| utils::reflection_name(&source_abs, out))
        .or_else(|| source_abs.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default();
    let output_name = output_abs
        .as_deref()
        .and_then(|out| utils::reflection_name(out, &source_abs));

    Ok(Classifier::new(root_name)
        .with_output_name(output_name)
        .with_tool_dir(options.tool_dir.clone())
        .with_cwd_name(options.cwd_name.clone()))
}

/// Feed file path relative to the output root, if it lands inside it
fn preserved_feed(options: &SiteOptions) -> Result<HashSet<PathBuf>> {
    let mut preserve = HashSet::new();
    let Some(feed) = &options.feed else {
        return Ok(preserve);
    };
    if let Ok(rel) = feed.feed_file.strip_prefix(&options.output_dir) {
        preserve.insert(rel.to_path_buf());
        return Ok(preserve);
    }

    // Fall back to comparing absolute locations
    let parent = match feed.feed_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if parent.exists() && options.output_dir.exists() {
        let output_abs = utils::get_absolute_path(&options.output_dir)?;
        let parent_abs = utils::get_absolute_path(parent)?;
        if let (Ok(rel), Some(name)) = (parent_abs.strip_prefix(&output_abs), feed.feed_file.file_name()) {
            preserve.insert(rel.join(name));
        }
    }
    Ok(preserve)
}

/// Run one full pass: inject styles, scan both trees, diff, apply, then write the feed.
///
/// The pass is not atomic. An error leaves the output tree as the last
/// successful operation left it.
pub fn sync_site(options: &SiteOptions, renderer: &dyn Renderer) -> Result<SyncReport> {
    utils::validate_directory_exists(&options.source_dir)?;
    if !options.dry_run {
        utils::ensure_directory_exists(&options.output_dir)?;
    }

    let classifier = classifier_for(options)?;
    info!(
        "Syncing {:?} -> {:?}",
        options.source_dir, options.output_dir
    );

    let mut report = SyncReport::default();

    let mut source = scan::scan(&options.source_dir, &classifier, None)?;
    if !options.dry_run {
        let files: Vec<PathBuf> = source.files().map(|e| source.full_path(e)).collect();
        report.styled = StyleInjector::new(&options.style).apply(&files)?.len();
        if report.styled > 0 {
            // Injection only edits file bodies, but rescan so the tree reflects disk
            source = scan::scan(&options.source_dir, &classifier, None)?;
        }
    }

    let output = if options.output_dir.exists() {
        scan::scan(&options.output_dir, &classifier, None)?
    } else {
        ContentTree {
            root: options.output_dir.clone(),
            entries: Vec::new(),
        }
    };

    let preserve = preserved_feed(options)?;
    report.diff = diff::diff(&source, &output, &preserve, renderer)?;
    info!(
        "{} dir(s) to create, {} to delete, {} page(s) to write, {} to delete",
        report.diff.create_dirs.len(),
        report.diff.delete_dirs.len(),
        report.diff.write_files.len(),
        report.diff.delete_files.len()
    );

    if options.dry_run {
        log_plan(&report.diff);
        return Ok(report);
    }

    report.applied = materialize::apply(&report.diff, renderer)?;

    if let Some(feed) = &options.feed {
        report.feed_entries = Some(feed::write_feed(
            &feed.posts_dir,
            &feed.feed_file,
            &feed.link_prefix,
            renderer,
        )?);
    }

    Ok(report)
}

fn log_plan(diff: &DiffResult) {
    for dir in &diff.create_dirs {
        info!("would create dir {:?}", dir);
    }
    for dir in &diff.delete_dirs {
        info!("would delete dir {:?}", dir);
    }
    for page in &diff.write_files {
        info!("would write {:?} from {:?}", page.dest, page.source);
    }
    for file in &diff.delete_files {
        info!("would delete {:?}", file);
    }
}
