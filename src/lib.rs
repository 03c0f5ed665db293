// ABOUTME: Library module for the mdpress program.
// ABOUTME: Contains the tree synchronization engine, feed builder and style injector.

// Reexport modules
pub mod classify;
pub mod config;
pub mod diff;
pub mod errors;
pub mod feed;
pub mod html;
pub mod materialize;
pub mod scan;
pub mod serve;
pub mod site;
pub mod style;
pub mod utils;
pub mod watch;

// Reexport common types and functions
pub use classify::{is_eligible_dir, is_eligible_file, Classifier};
pub use config::{Config, StyleConfig};
pub use diff::{diff, DiffResult, PageWrite};
pub use errors::{PublishError, Result};
pub use feed::{build_feed, write_feed, PostRecord};
pub use html::{ComrakRenderer, Renderer};
pub use materialize::{apply, ApplyLog, Operation};
pub use scan::{scan, ContentEntry, ContentTree, EntryKind, FileKind};
pub use serve::{serve, FileServer};
pub use site::{sync_site, FeedOptions, SiteOptions, SyncReport};
pub use style::StyleInjector;
pub use watch::watch_site;
