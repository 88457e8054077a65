//! Observability utilities.
//!
//! The host owns a single tracing subscriber, built once from the command line
//! flags. The same subscriber is handed to every component through a
//! [`LogSink`], so component output lands in the same place as host output.

use std::fs::{File, OpenOptions};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tracing::instrument::{WithDispatch, WithSubscriber};
use tracing::level_filters::LevelFilter;
use tracing::Dispatch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static LOG_SINK: OnceLock<LogSink> = OnceLock::new();

/// Where log records go and how verbose they are.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Write records to standard output.
    pub stdout: bool,
    /// Append records to this file.
    pub file: Option<PathBuf>,
    /// Verbosity: 0 = error, 1 = warn, 2 = info, 3 = debug, 4+ = trace.
    pub level: u8,
}

/// Map the numeric verbosity flag onto a tracing level.
pub fn level_filter(level: u8) -> LevelFilter {
    match level {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        3 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Handle to the configured log subscriber, passed to components as their
/// logging option.
#[derive(Debug, Clone)]
pub struct LogSink {
    dispatch: Dispatch,
}

impl LogSink {
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// A sink that drops every record.
    pub fn discard() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    /// A sink writing to whatever subscriber is the default for this thread.
    pub fn current() -> Self {
        Self {
            dispatch: tracing::dispatcher::get_default(|d| d.clone()),
        }
    }

    /// Run `f` with this sink as the default subscriber.
    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Instrument `future` so every poll logs through this sink.
    pub fn attach<F: Future>(&self, future: F) -> WithDispatch<F> {
        future.with_subscriber(self.dispatch.clone())
    }
}

/// Initialize the process-wide subscriber once and return its sink.
///
/// The filter defaults to the level given by `options.level` and can be
/// overridden with `RUST_LOG`. With neither stdout nor a file selected, records
/// are discarded. Repeated calls return the sink built by the first call.
pub fn init_logging(options: &LogOptions) -> std::io::Result<LogSink> {
    if let Some(sink) = LOG_SINK.get() {
        return Ok(sink.clone());
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level_filter(options.level).into()));

    let stdout_layer = options
        .stdout
        .then(|| fmt::layer().compact().with_writer(std::io::stdout));

    let file_layer = match &options.file {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };

    let dispatch = Dispatch::new(
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stdout_layer)
            .with(file_layer),
    );

    if let Err(err) = tracing::dispatcher::set_global_default(dispatch.clone()) {
        eprintln!("tracing init skipped: {err}");
    }

    Ok(LOG_SINK.get_or_init(|| LogSink::new(dispatch)).clone())
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
