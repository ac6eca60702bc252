//! Host loops: blocking, readiness-driven, and the key-code inspector.

use std::path::Path;
#[cfg(unix)]
use std::time::Duration;

use anyhow::{Context, Result};
use core_config::EditorOptions;
use core_events::{KeyEvent, ctrl};
use core_input::{KeyParser, KeyRead, StdinSource};
use core_session::{EditSession, EditorContext, FeedOutcome};
use core_terminal::{CrosstermBackend, TerminalBackend, enter_guard};
use tracing::{debug, info, warn};

const PROMPT: &str = "oxline> ";

/// React to an accepted line. Returns the text to print.
pub(crate) fn handle_line(ctx: &mut EditorContext, line: &str) -> String {
    let mut words = line.split_whitespace();
    match words.next() {
        Some("/historylen") => match words.next().and_then(|n| n.parse::<usize>().ok()) {
            Some(len) if ctx.set_history_max_len(len) => format!("history length set to {len}"),
            _ => "usage: /historylen <n> (n > 0)".to_string(),
        },
        Some("/mask") => {
            ctx.set_mask(true);
            "input masking on".to_string()
        }
        Some("/unmask") => {
            ctx.set_mask(false);
            "input masking off".to_string()
        }
        Some("/multiline") => {
            ctx.set_multiline(true);
            "multi-line mode".to_string()
        }
        Some("/singleline") => {
            ctx.set_multiline(false);
            "single-line mode".to_string()
        }
        Some(cmd) if cmd.starts_with('/') => format!("unrecognized command: {cmd}"),
        _ => format!("echo: '{line}'"),
    }
}

fn after_line(ctx: &mut EditorContext, line: &str, history: Option<&Path>) {
    let reply = handle_line(ctx, line);
    println!("{reply}");
    if let Some(path) = history
        && let Err(e) = ctx.history.save(path)
    {
        warn!(target: "runtime", error = %e, "history_save_failed");
    }
}

pub(crate) fn run_blocking(ctx: &mut EditorContext, history: Option<&Path>) -> Result<()> {
    let mut session = EditSession::new(ctx, CrosstermBackend::new(), StdinSource::new(), PROMPT);
    loop {
        match session.read_line().context("reading line")? {
            FeedOutcome::Line(line) => after_line(session.context_mut(), &line, history),
            FeedOutcome::Cancelled | FeedOutcome::Continue => {}
            FeedOutcome::Eof => break,
        }
    }
    info!(target: "runtime", "input_closed");
    Ok(())
}

/// Feed every key already buffered on stdin. `None` means the line is still
/// being edited and stdin has no more input.
#[cfg(unix)]
fn drain<T: TerminalBackend>(
    session: &mut EditSession<'_, T, StdinSource>,
) -> Result<Option<FeedOutcome>> {
    loop {
        if !session.has_buffered_input()
            && !session.source_mut().has_pending().context("polling stdin")?
        {
            return Ok(None);
        }
        match session.feed().context("handling key")? {
            FeedOutcome::Continue => {}
            outcome => return Ok(Some(outcome)),
        }
    }
}

#[cfg(unix)]
async fn next_tick(ticker: &mut Option<tokio::time::Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Readiness-driven loop: the session is fed only when stdin is readable, so
/// other work (here a periodic message printed above the prompt) can run in
/// between keystrokes.
#[cfg(unix)]
pub(crate) async fn run_async(
    ctx: &mut EditorContext,
    history: Option<&Path>,
    tick: Option<Duration>,
) -> Result<()> {
    use tokio::io::unix::AsyncFd;

    let stdin = match AsyncFd::new(std::io::stdin()) {
        Ok(fd) => fd,
        Err(e) => {
            warn!(target: "runtime", error = %e, "stdin_not_pollable_using_blocking_loop");
            return run_blocking(ctx, history);
        }
    };
    let mut ticker = tick.map(|period| {
        tokio::time::interval_at(tokio::time::Instant::now() + period, period)
    });
    let mut ticks = 0u64;
    let mut session = EditSession::new(ctx, CrosstermBackend::new(), StdinSource::new(), PROMPT);

    loop {
        session.start().context("starting edit session")?;
        let outcome = loop {
            tokio::select! {
                ready = stdin.readable() => {
                    let mut guard = ready.context("waiting for stdin")?;
                    match drain(&mut session)? {
                        Some(outcome) => break outcome,
                        None => guard.clear_ready(),
                    }
                }
                _ = next_tick(&mut ticker) => {
                    ticks += 1;
                    session.hide()?;
                    session
                        .terminal_mut()
                        .write_frame(format!("tick {ticks}\r\n").as_bytes())?;
                    session.show()?;
                }
            }
        };
        session.stop().context("stopping edit session")?;
        debug!(target: "runtime", ?ticks, "line_finished");
        match outcome {
            FeedOutcome::Line(line) => after_line(session.context_mut(), &line, history),
            FeedOutcome::Cancelled | FeedOutcome::Continue => {}
            FeedOutcome::Eof => break,
        }
    }
    info!(target: "runtime", "input_closed");
    Ok(())
}

#[cfg(not(unix))]
pub(crate) async fn run_async(
    ctx: &mut EditorContext,
    history: Option<&Path>,
    _tick: Option<std::time::Duration>,
) -> Result<()> {
    run_blocking(ctx, history)
}

/// Print each parsed key event until Ctrl-C, `q` or end of input.
pub(crate) fn keycodes(options: &EditorOptions) -> Result<()> {
    let mut backend = CrosstermBackend::new();
    let mut guard = enter_guard(&mut backend).context("entering raw mode")?;
    guard
        .backend()
        .write_frame(b"Press keys to see their events. Ctrl-C or q quits.\r\n")?;
    let mut parser = KeyParser::new(options.escape_timeout, options.max_sequence_len);
    let mut src = StdinSource::new();
    let quit = KeyEvent::char_from_bytes(b"q");
    loop {
        let key = match parser.read_key(&mut src, None).context("reading key")? {
            KeyRead::Key(key) => key,
            KeyRead::Timeout => continue,
            KeyRead::Eof => break,
        };
        guard.backend().write_frame(format!("{key}\r\n").as_bytes())?;
        if key == quit || key == KeyEvent::Control(ctrl(b'c')) {
            break;
        }
    }
    Ok(())
}
