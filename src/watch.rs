// ABOUTME: Watch module for monitoring source changes and re-running the sync pass
// ABOUTME: Provides debounced file watching that keeps the output tree up to date

use log::{debug, error, info};
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use notify::{RecursiveMode, Watcher};
use notify_debouncer_full::new_debouncer;

use crate::classify::is_eligible_file;
use crate::errors::{PublishError, Result};
use crate::html::Renderer;
use crate::serve::ShutdownFlag;
use crate::site::{self, SiteOptions, SyncReport};
use crate::utils;

/// Debounce window for filesystem events
pub const DEBOUNCE_MS: u64 = 500;

/// How often the event loop checks the shutdown flag
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Re-run the sync pass whenever content under the source root changes.
///
/// Returns once `shutdown` is set. Errors from individual passes are logged
/// and watching continues.
pub fn watch_site(
    options: &SiteOptions,
    renderer: &dyn Renderer,
    shutdown: ShutdownFlag,
) -> Result<()> {
    utils::validate_directory_exists(&options.source_dir)?;
    let watch_path = utils::get_absolute_path(&options.source_dir)?;

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(DEBOUNCE_MS), None, tx)
        .map_err(|e| PublishError::Watch(format!("Failed to create file watcher: {}", e)))?;

    debouncer
        .watcher()
        .watch(&watch_path, RecursiveMode::Recursive)
        .map_err(|e| {
            PublishError::Watch(format!(
                "Failed to start watching directory {:?}: {}",
                watch_path, e
            ))
        })?;

    info!("Watching for changes in {:?}", watch_path);
    println!(
        "Watching for changes in {:?} (Press Ctrl+C to stop)",
        options.source_dir
    );

    while !shutdown.load(Ordering::SeqCst) {
        let events = match rx.recv_timeout(POLL_INTERVAL) {
            Ok(Ok(events)) => events,
            Ok(Err(errors)) => {
                for e in errors {
                    error!("Watch error: {:?}", e);
                }
                continue;
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let relevant = events.iter().any(|event| {
            event.paths.iter().any(|path| {
                let hit = is_relevant_path(path);
                if hit {
                    debug!("Detected relevant change in {:?}", path);
                }
                hit
            })
        });
        if !relevant {
            continue;
        }

        match site::sync_site(options, renderer) {
            Ok(report) => log_report(&report),
            Err(e) => error!("Sync failed: {}", e),
        }
    }

    info!("Stopped watching {:?}", watch_path);
    Ok(())
}

/// Content files and directories (created, renamed or removed) trigger a re-sync
fn is_relevant_path(path: &Path) -> bool {
    match path.file_name() {
        Some(name) => {
            let name = name.to_string_lossy();
            is_eligible_file(&name) || (!name.starts_with('.') && path.extension().is_none())
        }
        None => false,
    }
}

fn log_report(report: &SyncReport) {
    if report.is_noop() {
        debug!("Output already up to date");
    } else {
        info!(
            "Re-synced: {} write(s), {} deletion(s)",
            report.applied.writes(),
            report.applied.deletions()
        );
    }
}
