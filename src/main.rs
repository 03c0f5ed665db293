// ABOUTME: Main entry point for the mdpress program.
// ABOUTME: Provides the CLI interface and runs the sync, feed, watch and serve steps.

use anyhow::Context;
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::thread;

use mdpress::{serve, utils, ComrakRenderer, Config, FileServer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name of the tool's own directory, never treated as content
    #[arg(long, value_parser = utils::parse_name_flag)]
    tool_dir: Option<String>,

    /// Source directory holding the Markdown tree
    #[arg(short, long, value_parser = utils::parse_dir_flag)]
    source: Option<PathBuf>,

    /// Output directory receiving the HTML tree
    #[arg(short, long, value_parser = utils::parse_dir_flag)]
    output: Option<PathBuf>,

    /// Directory of dated posts used for the feed
    #[arg(short, long, value_parser = utils::parse_dir_flag)]
    posts: Option<PathBuf>,

    /// Generate the post feed after syncing
    #[arg(long)]
    feed: bool,

    /// Where to write the feed document
    #[arg(long)]
    feed_file: Option<PathBuf>,

    /// URL prefix for post links in the feed
    #[arg(long)]
    link_prefix: Option<String>,

    /// Serve the output directory over HTTP after syncing
    #[arg(long)]
    serve: bool,

    /// Keep running and re-sync when sources change
    #[arg(long)]
    watch: bool,

    /// Show what would change without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::discover(cli.config.as_deref()).context("Failed to load configuration")?;

    let mut options = config.get_site_options(
        cli.source,
        cli.output,
        cli.posts,
        cli.feed_file,
        cli.link_prefix,
        cli.tool_dir,
        cli.feed,
    );
    options.dry_run = cli.dry_run;
    options.cwd_name = std::env::current_dir()
        .ok()
        .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()));

    let renderer = ComrakRenderer::new();
    let report = mdpress::sync_site(&options, &renderer).context("Sync failed")?;
    println!(
        "Synced {:?} -> {:?}: {} page(s) written, {} removed{}",
        options.source_dir,
        options.output_dir,
        report.applied.writes(),
        report.applied.deletions(),
        report
            .feed_entries
            .map(|n| format!(", feed with {} post(s)", n))
            .unwrap_or_default()
    );

    if cli.dry_run {
        return Ok(());
    }

    match (cli.watch, cli.serve) {
        (true, true) => {
            let server = FileServer::bind(&options.output_dir, serve::DEFAULT_PORT)?;
            println!("Serving on http://localhost:{}", server.port());
            let stop = server.stopper();
            let shutdown = serve::install_shutdown_handler(stop)?;
            let handle = thread::spawn(move || server.run());
            mdpress::watch_site(&options, &renderer, shutdown)?;
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("HTTP server thread panicked"))?;
        }
        (true, false) => {
            let shutdown = serve::install_shutdown_handler(|| {})?;
            mdpress::watch_site(&options, &renderer, shutdown)?;
        }
        (false, true) => serve::serve(&options.output_dir)?,
        (false, false) => {}
    }

    info!("Done");
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
