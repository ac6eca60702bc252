//! Configuration loading and parsing.
//!
//! Parses `oxline.toml` (or an override path provided by the binary) into
//! typed sections. Every field has a default, unknown fields are ignored, and
//! a file that fails to parse falls back to the defaults with a warning so a
//! typo never prevents the prompt from appearing.
//!
//! Values are clamped into workable ranges by [`Config::editor_options`]; the
//! raw parsed values stay available in [`Config::file`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const CONFIG_FILE_NAME: &str = "oxline.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EditorConfig {
    pub multiline: bool,
    pub mask: bool,
    pub mask_char: char,
    pub mouse: bool,
    pub bell: bool,
    pub auto_history: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            multiline: false,
            mask: false,
            mask_char: '*',
            mouse: false,
            bell: true,
            auto_history: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct InputConfig {
    #[serde(default = "InputConfig::default_escape_timeout_ms")]
    pub escape_timeout_ms: u64,
    #[serde(default = "InputConfig::default_max_sequence_len")]
    pub max_sequence_len: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            escape_timeout_ms: Self::default_escape_timeout_ms(),
            max_sequence_len: Self::default_max_sequence_len(),
        }
    }
}

impl InputConfig {
    const fn default_escape_timeout_ms() -> u64 {
        100
    }
    const fn default_max_sequence_len() -> usize {
        16
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    #[serde(default = "HistoryConfig::default_max_len")]
    pub max_len: usize,
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_len: Self::default_max_len(),
            file: None,
        }
    }
}

impl HistoryConfig {
    const fn default_max_len() -> usize {
        100
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CompletionConfig {
    #[serde(default = "CompletionConfig::default_max_candidates")]
    pub max_candidates: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            max_candidates: Self::default_max_candidates(),
        }
    }
}

impl CompletionConfig {
    const fn default_max_candidates() -> usize {
        100
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct UndoConfig {
    #[serde(default = "UndoConfig::default_max_depth")]
    pub max_depth: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::default_max_depth(),
        }
    }
}

impl UndoConfig {
    const fn default_max_depth() -> usize {
        100
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub undo: UndoConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub path: Option<PathBuf>,
}

/// Typed engine options derived from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    pub multiline: bool,
    /// Glyph shown for every cluster while masking is on.
    pub mask: Option<char>,
    pub mask_char: char,
    pub mouse: bool,
    pub bell: bool,
    pub auto_history: bool,
    pub escape_timeout: Duration,
    pub max_sequence_len: usize,
    pub history_max_len: usize,
    pub max_candidates: usize,
    pub undo_max_depth: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Config::default().editor_options()
    }
}

impl EditorOptions {
    pub fn set_mask(&mut self, on: bool) {
        self.mask = on.then_some(self.mask_char);
    }
}

const ESCAPE_TIMEOUT_MS: (u64, u64) = (1, 5_000);
const SEQUENCE_LEN: (usize, usize) = (4, 256);

/// Best-effort config path: `./oxline.toml`, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("oxline").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        debug!(target: "config", path = %path.display(), "config_file_absent");
        return Ok(Config::default());
    };
    match parse(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                file,
                path: Some(path),
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

/// Parse config text without the default fallback.
pub fn parse(content: &str) -> Result<ConfigFile> {
    toml::from_str::<ConfigFile>(content).context("invalid oxline.toml")
}

fn clamp_logged<T>(name: &'static str, raw: T, (lo, hi): (T, T)) -> T
where
    T: Copy + Ord + std::fmt::Display,
{
    let clamped = raw.clamp(lo, hi);
    if clamped != raw {
        info!(target: "config", field = name, %raw, %clamped, "value_clamped");
    }
    clamped
}

impl Config {
    /// Resolve the configured values into engine options.
    pub fn editor_options(&self) -> EditorOptions {
        let f = &self.file;
        let escape_ms = clamp_logged(
            "input.escape_timeout_ms",
            f.input.escape_timeout_ms,
            ESCAPE_TIMEOUT_MS,
        );
        EditorOptions {
            multiline: f.editor.multiline,
            mask: f.editor.mask.then_some(f.editor.mask_char),
            mask_char: f.editor.mask_char,
            mouse: f.editor.mouse,
            bell: f.editor.bell,
            auto_history: f.editor.auto_history,
            escape_timeout: Duration::from_millis(escape_ms),
            max_sequence_len: clamp_logged(
                "input.max_sequence_len",
                f.input.max_sequence_len,
                SEQUENCE_LEN,
            ),
            history_max_len: clamp_logged("history.max_len", f.history.max_len, (1, usize::MAX)),
            max_candidates: clamp_logged(
                "completion.max_candidates",
                f.completion.max_candidates,
                (1, usize::MAX),
            ),
            undo_max_depth: clamp_logged("undo.max_depth", f.undo.max_depth, (1, usize::MAX)),
        }
    }

    /// History file path with a leading `~/` expanded to the home directory.
    pub fn history_path(&self) -> Option<PathBuf> {
        let raw = self.file.history.file.as_deref()?;
        Some(expand_home(raw))
    }
}

fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    Path::new(raw).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn capture_logs(f: impl FnOnce()) -> String {
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();
        with_default(subscriber, f);
        String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg.file, ConfigFile::default());
        let opts = cfg.editor_options();
        assert_eq!(opts.escape_timeout, Duration::from_millis(100));
        assert_eq!(opts.max_sequence_len, 16);
        assert_eq!(opts.history_max_len, 100);
        assert_eq!(opts.max_candidates, 100);
        assert_eq!(opts.undo_max_depth, 100);
        assert!(opts.bell && opts.auto_history);
        assert_eq!(opts.mask, None);
    }

    #[test]
    fn parses_all_sections() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[editor]\nmultiline = true\nmask = true\nmask_char = \"•\"\nmouse = true\n\
             [input]\nescape_timeout_ms = 40\n\
             [history]\nmax_len = 7\nfile = \"/tmp/h\"\n\
             [completion]\nmax_candidates = 5\n\
             [undo]\nmax_depth = 9\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let opts = cfg.editor_options();
        assert!(opts.multiline && opts.mouse);
        assert_eq!(opts.mask, Some('•'));
        assert_eq!(opts.escape_timeout, Duration::from_millis(40));
        assert_eq!(opts.history_max_len, 7);
        assert_eq!(opts.max_candidates, 5);
        assert_eq!(opts.undo_max_depth, 9);
        assert_eq!(cfg.history_path(), Some(PathBuf::from("/tmp/h")));
        assert_eq!(cfg.path.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let file = parse("[editor]\nfancy = 1\n[extra]\nx = 2\n").unwrap();
        assert_eq!(file, ConfigFile::default());
    }

    #[test]
    fn parse_error_falls_back_with_warning() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[input\nescape_timeout_ms = \n").unwrap();
        let mut cfg = None;
        let logs = capture_logs(|| {
            cfg = Some(load_from(Some(tmp.path().to_path_buf())).unwrap());
        });
        assert_eq!(cfg.unwrap().file, ConfigFile::default());
        assert!(logs.contains("WARN config:"));
        assert!(logs.contains("config_parse_failed_using_defaults"));
    }

    #[test]
    fn out_of_range_values_are_clamped_and_logged() {
        let cfg = Config {
            file: parse(
                "[input]\nescape_timeout_ms = 0\nmax_sequence_len = 1\n[undo]\nmax_depth = 0\n",
            )
            .unwrap(),
            ..Config::default()
        };
        let mut opts = None;
        let logs = capture_logs(|| opts = Some(cfg.editor_options()));
        let opts = opts.unwrap();
        assert_eq!(opts.escape_timeout, Duration::from_millis(1));
        assert_eq!(opts.max_sequence_len, 4);
        assert_eq!(opts.undo_max_depth, 1);
        assert!(logs.contains("INFO config:"));
        assert!(logs.contains("value_clamped"));
    }

    #[test]
    fn home_prefix_expands() {
        let cfg = Config {
            file: parse("[history]\nfile = \"~/.oxline_history\"\n").unwrap(),
            ..Config::default()
        };
        let path = cfg.history_path().unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join(".oxline_history"));
        }
    }

    #[test]
    fn mask_toggle_uses_configured_glyph() {
        let mut opts = EditorOptions::default();
        opts.set_mask(true);
        assert_eq!(opts.mask, Some('*'));
        opts.set_mask(false);
        assert_eq!(opts.mask, None);
    }
}
