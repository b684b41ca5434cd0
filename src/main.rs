//! webdsl-ls: language server for webdsl documents.
//!
//! `webdsl-ls [serve]` speaks LSP on stdio. `webdsl-ls launch [DIR]` is the
//! editor-side entry: it starts the configured server for workspace `DIR`
//! and relays stdio to it.
use std::env;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use webdsl_config::{default_config_dir, load_config, resolve_command, Config};
use webdsl_core::logging::{
    level_directive, open_log_file, resolve_log_path, DEFAULT_MAX_LOG_FILES, DEFAULT_MAX_LOG_SIZE,
};
use webdsl_lsp::{report_launch_failure, serve, Analyzer, LspError, ServerProcess};

#[derive(Debug, PartialEq)]
enum Mode {
    Serve,
    Launch(Option<PathBuf>),
    Version,
}

fn parse_args(args: &[String]) -> Result<Mode> {
    match args.first().map(String::as_str) {
        None | Some("serve") | Some("--stdio") => Ok(Mode::Serve),
        Some("launch") => Ok(Mode::Launch(args.get(1).map(PathBuf::from))),
        Some("--version") | Some("-V") => Ok(Mode::Version),
        Some(other) => bail!("unknown argument '{}' (expected serve or launch [DIR])", other),
    }
}

fn load_settings() -> (Config, Option<webdsl_config::ConfigError>) {
    let Some(config_dir) = default_config_dir() else {
        return (Config::default(), None);
    };
    let project_dir = env::current_dir().ok();
    match load_config(&config_dir, project_dir.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    }
}

/// stdout carries the protocol: logs go to a file, or stderr if the file
/// cannot be opened.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(config.log.level.as_str())));
    let path = resolve_log_path(config.log.file.as_deref());

    match open_log_file(&path, DEFAULT_MAX_LOG_SIZE, DEFAULT_MAX_LOG_FILES) {
        Ok(file) => tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(filter)
            .init(),
        Err(e) => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
            error!("cannot open log file {}: {}", path.display(), e);
        }
    }
}

async fn run_server(config: &Config) -> Result<i32> {
    let analyzer = Analyzer::reference(&config.diagnostics);
    let code = serve(tokio::io::stdin(), tokio::io::stdout(), analyzer)
        .await
        .context("language server failed")?;
    Ok(code)
}

async fn run_launcher(config: &Config, dir: Option<PathBuf>) -> Result<i32> {
    let root = match dir {
        Some(dir) => dir,
        None => env::current_dir().context("cannot determine workspace folder")?,
    };

    let started = resolve_command(config.server.command.as_deref(), &root)
        .map_err(|e| LspError::SpawnFailed(e.to_string()))
        .and_then(|command| ServerProcess::spawn(&command, &config.server.args, &root));

    match started {
        Ok(process) => {
            info!(command = %process.command().display(), root = %root.display(), "relaying");
            let code = process
                .relay(tokio::io::stdin(), tokio::io::stdout())
                .await
                .context("relay failed")?;
            Ok(code)
        }
        Err(e) => {
            error!("launch failed: {}", e);
            eprintln!("webdsl-ls: {}", e);
            let mut stdout = tokio::io::stdout();
            report_launch_failure(&mut stdout, &e)
                .await
                .context("cannot report launch failure")?;
            info!("serving in-process after launch failure");
            run_server(config).await
        }
    }
}

async fn run() -> Result<i32> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mode = parse_args(&args)?;
    if mode == Mode::Version {
        println!("webdsl-ls {}", env!("CARGO_PKG_VERSION"));
        return Ok(0);
    }

    let (config, load_error) = load_settings();
    init_logging(&config);
    if let Some(e) = load_error {
        error!("config load failed, using defaults: {}", e);
    }
    info!(version = env!("CARGO_PKG_VERSION"), ?mode, "webdsl-ls starting");

    let code = match mode {
        Mode::Launch(dir) => run_launcher(&config, dir).await?,
        _ => run_server(&config).await?,
    };
    info!(code, "webdsl-ls exiting");
    Ok(code)
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("webdsl-ls: {:#}", e);
            std::process::exit(1);
        }
    }
}
