use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use seatingd::ipc;
use seatingd::watch;
use seatingd::workspace::Workspace;

#[derive(Parser, Debug)]
#[command(name = "seatingd", version, about = "Exam seating administration sidecar")]
struct Cli {
    /// Workspace folder to open before reading requests.
    #[arg(long, env = "SEATINGD_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print file changes under a folder until interrupted.
    Watch {
        folder: PathBuf,
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

fn serve(workspace: Option<PathBuf>) {
    let mut state = ipc::AppState {
        workspace: workspace.map(Workspace::open),
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req),
            Err(e) => {
                // No id to answer with.
                tracing::warn!(error = %e, "unparseable request line");
                serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                })
            }
        };
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    tracing::info!("request loop finished");
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "seatingd starting");

    match cli.command {
        Some(Command::Watch {
            folder,
            interval_ms,
        }) => {
            let stop = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&stop);
            if let Err(e) = ctrlc::set_handler(move || {
                tracing::info!("received interrupt, finishing current scan");
                flag.store(true, Ordering::Relaxed);
            }) {
                tracing::warn!(error = %e, "could not install Ctrl-C handler");
            }
            watch::monitor(&folder, Duration::from_millis(interval_ms), &stop, |event| {
                tracing::info!("{}", event);
            });
        }
        None => serve(cli.workspace),
    }
}
