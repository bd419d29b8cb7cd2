//! Shared logging setup for Draftmill binaries.
//!
//! Logs go to stderr and to a size-capped log file under
//! `~/.draftmill/logs`, so scheduled runs leave a trail even when
//! nobody watched the terminal.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "draftmill=info,draftmill_queue=info,draftmill_gate=info";
const KEPT_LOG_FILES: usize = 5;
const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Logging configuration for a Draftmill binary.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
}

/// Initialize tracing with a capped file writer and stderr output.
///
/// `RUST_LOG` overrides the default filter for both sinks; `verbose`
/// additionally raises the stderr filter to debug.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let log_dir = ensure_logs_dir().context("Failed to ensure log directory")?;
    let file_writer = CappedLogWriter::open(log_dir, config.app_name)
        .context("Failed to open log file")?;

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console_filter = if config.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .init();

    Ok(())
}

/// The Draftmill home directory: `~/.draftmill`, overridable via
/// `DRAFTMILL_HOME`.
pub fn draftmill_home() -> Result<PathBuf> {
    if let Ok(override_path) = std::env::var("DRAFTMILL_HOME") {
        return Ok(PathBuf::from(override_path));
    }
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".draftmill"))
}

/// The logs directory: `~/.draftmill/logs`.
pub fn logs_dir() -> Result<PathBuf> {
    Ok(draftmill_home()?.join("logs"))
}

/// Create the logs directory if missing and return it.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir()?;
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

/// Append-only log file capped at [`MAX_LOG_FILE_SIZE`]. When the cap
/// is hit the file shifts to `<name>.log.1`, pushing older generations
/// up to `<name>.log.{KEPT_LOG_FILES - 1}` before the oldest is dropped.
///
/// Cloneable and lock-guarded so tracing's per-event writers share one
/// underlying file.
#[derive(Clone)]
pub struct CappedLogWriter {
    state: Arc<Mutex<WriterState>>,
}

struct WriterState {
    dir: PathBuf,
    base_name: String,
    file: File,
    written: u64,
}

impl CappedLogWriter {
    pub fn open(dir: PathBuf, app_name: &str) -> Result<Self> {
        let base_name = sanitize_name(app_name);
        let (file, written) = open_log_file(&dir, &base_name)
            .with_context(|| format!("Failed to open log file for {app_name}"))?;
        Ok(Self {
            state: Arc::new(Mutex::new(WriterState {
                dir,
                base_name,
                file,
                written,
            })),
        })
    }
}

impl WriterState {
    fn log_path(&self, generation: usize) -> PathBuf {
        if generation == 0 {
            self.dir.join(format!("{}.log", self.base_name))
        } else {
            self.dir.join(format!("{}.log.{generation}", self.base_name))
        }
    }

    fn rotate(&mut self) -> io::Result<()> {
        let _ = self.file.flush();

        let oldest = self.log_path(KEPT_LOG_FILES - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for generation in (0..KEPT_LOG_FILES - 1).rev() {
            let src = self.log_path(generation);
            if src.exists() {
                fs::rename(&src, self.log_path(generation + 1))?;
            }
        }

        let (file, written) = open_log_file(&self.dir, &self.base_name)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;
        self.file = file;
        self.written = written;
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written + buf.len() as u64 > MAX_LOG_FILE_SIZE {
            self.rotate()?;
        }
        let bytes = self.file.write(buf)?;
        self.written += bytes as u64;
        Ok(bytes)
    }
}

fn open_log_file(dir: &Path, base_name: &str) -> Result<(File, u64)> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{base_name}.log"));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let written = file.metadata()?.len();
    Ok((file, written))
}

pub struct CappedLogWriterGuard {
    state: Arc<Mutex<WriterState>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CappedLogWriter {
    type Writer = CappedLogWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        CappedLogWriterGuard {
            state: Arc::clone(&self.state),
        }
    }
}

impl Write for CappedLogWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        state.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        state.file.flush()
    }
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("draftmill"), "draftmill");
        assert_eq!(sanitize_name("draft mill/cli"), "draft_mill_cli");
    }

    #[test]
    fn test_writer_appends() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CappedLogWriter::open(dir.path().to_path_buf(), "draftmill").unwrap();

        writer.make_writer().write_all(b"first\n").unwrap();
        writer.make_writer().write_all(b"second\n").unwrap();

        let content = fs::read_to_string(dir.path().join("draftmill.log")).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_home_override() {
        std::env::set_var("DRAFTMILL_HOME", "/tmp/draftmill-test-home");
        assert_eq!(
            draftmill_home().unwrap(),
            PathBuf::from("/tmp/draftmill-test-home")
        );
        std::env::remove_var("DRAFTMILL_HOME");
    }
}
