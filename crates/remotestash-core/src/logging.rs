//! Tracing setup for the CLI: an append-only log file in the XDG state dir,
//! or stderr for `--verbose` and when the file can't be opened.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::APP_PREFIX;

const DEFAULT_FILTER: &str = "info,remotestash=debug,remotestash_core=debug";
const VERBOSE_FILTER: &str = "debug,mdns_sd=info,rustls=info";
const LOG_FILE: &str = "remotestash.log";

/// Where log output ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    File(PathBuf),
    Stderr,
}

/// One handle per event; falls back to stderr if the file handle can't be cloned.
struct SharedLogFile(File);

enum LogWriter {
    File(File),
    Stderr(io::Stderr),
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogWriter::File(f) => f.write(buf),
            LogWriter::Stderr(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogWriter::File(f) => f.flush(),
            LogWriter::Stderr(e) => e.flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for SharedLogFile {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        match self.0.try_clone() {
            Ok(f) => LogWriter::File(f),
            Err(_) => LogWriter::Stderr(io::stderr()),
        }
    }
}

/// `RUST_LOG` if set, else the built-in default for the mode.
fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new(VERBOSE_FILTER);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `~/.local/state/remotestash/remotestash.log`, creating the directory.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_PREFIX)?;
    let dir = xdg_dirs.get_state_home();
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir.join(LOG_FILE))
}

/// Log to the state-dir file. Errors leave no subscriber installed, so the
/// caller can fall back to [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(false))
        .with_writer(BoxMakeWriter::new(SharedLogFile(file)))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("logging already initialized: {}", e))?;

    tracing::info!("remotestash {} logging to {}", env!("CARGO_PKG_VERSION"), path.display());
    Ok(())
}

/// Log to stderr; `verbose` turns on debug output for this crate and the CLI.
pub fn init_logging_stderr(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}

/// Stderr when `verbose`, else the log file with stderr as fallback.
pub fn init(verbose: bool) -> LogDestination {
    if verbose {
        init_logging_stderr(true);
        return LogDestination::Stderr;
    }
    match init_logging() {
        Ok(()) => match log_file_path() {
            Ok(path) => LogDestination::File(path),
            Err(_) => LogDestination::Stderr,
        },
        Err(e) => {
            init_logging_stderr(false);
            tracing::warn!("file logging unavailable, using stderr: {:#}", e);
            LogDestination::Stderr
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn verbose_filter_ignores_env() {
        let filter = env_filter(true).to_string();
        assert!(filter.contains("debug"));
        assert!(filter.contains("mdns_sd=info"));
    }

    #[test]
    fn shared_file_writer_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE);
        let file = OpenOptions::new().create(true).append(true).open(&path).unwrap();
        let shared = SharedLogFile(file);
        shared.make_writer().write_all(b"one\n").unwrap();
        shared.make_writer().write_all(b"two\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }
}
