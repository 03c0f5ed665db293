// ABOUTME: Local HTTP file server for the mdpress application
// ABOUTME: Serves the generated output tree and shuts down cleanly on SIGINT/SIGTERM

use crate::errors::{PublishError, Result};
use crate::utils;
use log::{debug, error, info};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Port the file server binds to
pub const DEFAULT_PORT: u16 = 8000;

/// Set once an interrupt has been received
pub type ShutdownFlag = Arc<AtomicBool>;

/// A bound HTTP server over one directory
pub struct FileServer {
    server: Arc<Server>,
    root: PathBuf,
    port: u16,
}

impl FileServer {
    /// Bind to `0.0.0.0:port`; port 0 picks a free port
    pub fn bind(root: &Path, port: u16) -> Result<Self> {
        utils::validate_directory_exists(root)?;
        let server = Server::http(format!("0.0.0.0:{}", port))
            .map_err(|e| PublishError::Server(format!("Failed to start HTTP server: {}", e)))?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .unwrap_or(port);
        Ok(Self {
            server: Arc::new(server),
            root: root.to_path_buf(),
            port,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Handle that stops the server from another thread; `run` returns after the current request
    pub fn stopper(&self) -> impl Fn() + Send + 'static {
        let server = Arc::clone(&self.server);
        move || server.unblock()
    }

    /// Serve requests until unblocked
    pub fn run(&self) {
        info!("HTTP server listening on http://localhost:{}", self.port);
        for request in self.server.incoming_requests() {
            handle_request(request, &self.root);
        }
        info!("HTTP server stopped");
    }
}

/// Route SIGINT/SIGTERM to `on_signal`, setting the returned flag first
pub fn install_shutdown_handler<F>(on_signal: F) -> Result<ShutdownFlag>
where
    F: Fn() + Send + 'static,
{
    let flag: ShutdownFlag = Arc::new(AtomicBool::new(false));
    let mut signals = Signals::new([SIGINT, SIGTERM])
        .map_err(|e| PublishError::Server(format!("Failed to install signal handler: {}", e)))?;
    let thread_flag = Arc::clone(&flag);
    thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
            info!("Received signal {}, shutting down", signal);
            thread_flag.store(true, Ordering::SeqCst);
            on_signal();
        }
    });
    Ok(flag)
}

/// Serve `root` on the fixed port until interrupted
pub fn serve(root: &Path) -> Result<()> {
    let server = FileServer::bind(root, DEFAULT_PORT)?;
    println!(
        "Serving {:?} on http://localhost:{} (Press Ctrl+C to stop)",
        root,
        server.port()
    );
    install_shutdown_handler(server.stopper())?;
    server.run();
    Ok(())
}

/// Map a request URL onto a file under `root`
pub fn resolve_path(root: &Path, url: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or("");
    let rel = Path::new(path.trim_start_matches('/'));
    if utils::escapes_root(rel) {
        return None;
    }

    let candidate = root.join(rel);
    if candidate.is_dir() {
        let index = candidate.join("index.html");
        return index.is_file().then_some(index);
    }
    if candidate.is_file() {
        return Some(candidate);
    }
    if rel.extension().is_none() && !rel.as_os_str().is_empty() {
        let page = utils::page_path(rel);
        let page = root.join(page);
        return page.is_file().then_some(page);
    }
    None
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" => "application/javascript",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "xml" => "application/xml",
        "txt" | "md" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

fn handle_request(request: Request, root: &Path) {
    let url = request.url().to_string();
    let Some(file_path) = resolve_path(root, &url) else {
        debug!("404 for {:?}", url);
        let response = Response::from_string("404 Not Found").with_status_code(StatusCode(404));
        let _ = request.respond(response);
        return;
    };

    debug!("Request for {:?} -> {:?}", url, file_path);
    match fs::read(&file_path) {
        Ok(content) => {
            let mut response = Response::from_data(content);
            if let Ok(header) = Header::from_bytes("Content-Type", content_type(&file_path)) {
                response = response.with_header(header);
            }
            if let Err(e) = request.respond(response) {
                error!("Failed to send response: {}", e);
            }
        }
        Err(e) => {
            error!("Failed to read file {:?}: {}", file_path, e);
            let response = Response::from_string(format!("Failed to read file: {}", e))
                .with_status_code(StatusCode(500));
            let _ = request.respond(response);
        }
    }
}
