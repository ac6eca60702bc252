//! oxline entrypoint: a small REPL driving the line editor.
use anyhow::{Context, Result};
use clap::Parser;
use core_config::{Config, EditorOptions};
use core_session::EditorContext;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

mod demo;
mod repl;

const LOG_FILE: &str = "oxline.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "oxline", version, about = "Interactive line editing demo")]
struct Args {
    /// Configuration file (overrides discovery of `oxline.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// History file (overrides `[history] file`).
    #[arg(long = "history")]
    pub history: Option<PathBuf>,
    /// Print the parsed event for every key instead of editing. Ctrl-C or `q` quits.
    #[arg(long)]
    pub keycodes: bool,
    /// Use the blocking `read_line` loop instead of readiness notifications.
    #[arg(long)]
    pub blocking: bool,
    #[arg(long)]
    pub multiline: bool,
    #[arg(long)]
    pub mask: bool,
    #[arg(long)]
    pub mouse: bool,
    /// Print a line above the prompt every SECS seconds while editing.
    #[arg(long, value_name = "SECS")]
    pub tick: Option<u64>,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    /// stdout belongs to the line editor, so logs go to a file.
    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join(LOG_FILE);
        if log_path.exists() {
            std::fs::remove_file(&log_path)
                .with_context(|| format!("removing stale {}", log_path.display()))?;
        }

        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_ansi(false)
            .with_writer(nb_writer)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                core_terminal::emergency_restore();
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

/// Config file values with command-line switches layered on top.
fn effective_options(config: &Config, args: &Args) -> EditorOptions {
    let mut options = config.editor_options();
    options.multiline |= args.multiline;
    options.mouse |= args.mouse;
    if args.mask {
        options.set_mask(true);
    }
    options
}

fn load_history(ctx: &mut EditorContext, path: &Path) {
    match ctx.history.load(path) {
        Ok(lines) => debug!(target: "runtime", lines, "history_loaded"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(target: "runtime", "history_file_absent")
        }
        Err(e) => {
            warn!(target: "runtime", error = %e, path = %path.display(), "history_load_failed")
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();
    info!(target: "runtime", "startup");

    let config = core_config::load_from(args.config.clone()).context("loading configuration")?;
    if args.keycodes {
        return repl::keycodes(&config.editor_options());
    }

    let mut ctx = EditorContext::new(effective_options(&config, &args));
    demo::install(&mut ctx);
    let history_path = args.history.clone().or_else(|| config.history_path());
    if let Some(path) = &history_path {
        load_history(&mut ctx, path);
    }

    let result = if args.blocking {
        repl::run_blocking(&mut ctx, history_path.as_deref())
    } else {
        repl::run_async(&mut ctx, history_path.as_deref(), args.tick.map(Duration::from_secs)).await
    };
    info!(target: "runtime", ok = result.is_ok(), "shutdown");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_switches_override_config() {
        let config = Config::default();
        let args = Args::parse_from(["oxline", "--mask", "--multiline"]);
        let options = effective_options(&config, &args);
        assert!(options.multiline);
        assert_eq!(options.mask, Some('*'));
        assert!(!options.mouse);
    }

    #[test]
    fn missing_history_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = EditorContext::default();
        load_history(&mut ctx, &dir.path().join("none"));
        assert!(ctx.history.is_empty());
    }
}
