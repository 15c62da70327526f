//! Diagnostics client.
//!
//! Every record is emitted as a `tracing` event and, depending on the
//! resolved target, appended to a local file as a JSON line or posted to a
//! remote log sink.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;

/// Severity of a diagnostics record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// A single diagnostics record, as written to the file or posted remotely.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub origin_service: String,
    pub log_level: LogLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
    /// Milliseconds since the Unix epoch.
    pub created: u64,
}

enum Sink {
    Console,
    File(RollingFileAppender),
    Remote { url: String, http: reqwest::Client },
}

struct Inner {
    service_name: String,
    target: String,
    sink: Sink,
}

/// Handle used by every component to report diagnostics.
///
/// Cloning is cheap and all clones share one sink, so the handle can be
/// used from many requests at once.
#[derive(Clone)]
pub struct DiagnosticsClient {
    inner: Arc<Inner>,
}

impl DiagnosticsClient {
    /// Build the client for a resolved target.
    ///
    /// With `remote` set, `target` is the sink URL; otherwise it is a file
    /// path. A file that cannot be opened degrades to console output.
    pub fn new(service_name: impl Into<String>, remote: bool, target: impl Into<String>) -> Self {
        let service_name = service_name.into();
        let target = target.into();

        let sink = if remote {
            Sink::Remote {
                url: target.clone(),
                http: reqwest::Client::new(),
            }
        } else if target.is_empty() {
            Sink::Console
        } else {
            match open_appender(Path::new(&target)) {
                Ok(appender) => Sink::File(appender),
                Err(e) => {
                    tracing::warn!(target_file = %target, error = %e, "Cannot open diagnostics file, logging to console only");
                    Sink::Console
                }
            }
        };

        Self {
            inner: Arc::new(Inner {
                service_name,
                target,
                sink,
            }),
        }
    }

    /// Minimal client for failures that happen before the configured target
    /// is known: service name only, console output only.
    pub fn fallback(service_name: impl Into<String>) -> Self {
        Self::new(service_name, false, "")
    }

    pub fn service_name(&self) -> &str {
        &self.inner.service_name
    }

    /// The resolved target; empty for the fallback client.
    pub fn target(&self) -> &str {
        &self.inner.target
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.inner.sink, Sink::Remote { .. })
    }

    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message, None);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message, None);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message, None);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message, None);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message, None);
    }

    /// Report a record with optional structured detail.
    pub fn log(&self, level: LogLevel, message: impl Into<String>, detail: Option<serde_json::Value>) {
        let entry = LogEntry {
            origin_service: self.inner.service_name.clone(),
            log_level: level,
            message: message.into(),
            detail,
            created: now_millis(),
        };

        emit_event(&entry);

        match &self.inner.sink {
            Sink::Console => {}
            Sink::File(appender) => self.append(appender, &entry),
            Sink::Remote { url, http } => self.post(url, http, entry),
        }
    }

    fn append(&self, appender: &RollingFileAppender, entry: &LogEntry) {
        let mut line = match serde_json::to_vec(entry) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot encode diagnostics record");
                return;
            }
        };
        line.push(b'\n');

        if let Err(e) = appender.make_writer().write_all(&line) {
            tracing::warn!(target_file = %self.inner.target, error = %e, "Cannot write diagnostics record");
        }
    }

    fn post(&self, url: &str, http: &reqwest::Client, entry: LogEntry) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(url = %url, "No runtime available, diagnostics record not sent");
            return;
        };

        let request = http.post(url).json(&entry);
        let url = url.to_string();
        runtime.spawn(async move {
            match request.send().await {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!(url = %url, status = %response.status(), "Remote log sink rejected record");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Cannot reach remote log sink");
                }
            }
        });
    }
}

fn open_appender(path: &Path) -> Result<RollingFileAppender, tracing_appender::rolling::InitError> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
}

fn emit_event(entry: &LogEntry) {
    let service = entry.origin_service.as_str();
    let message = entry.message.as_str();
    let detail = entry.detail.as_ref().map(ToString::to_string).unwrap_or_default();

    match entry.log_level {
        LogLevel::Trace => tracing::trace!(service = %service, detail = %detail, "{}", message),
        LogLevel::Debug => tracing::debug!(service = %service, detail = %detail, "{}", message),
        LogLevel::Info => tracing::info!(service = %service, detail = %detail, "{}", message),
        LogLevel::Warn => tracing::warn!(service = %service, detail = %detail, "{}", message),
        LogLevel::Error => tracing::error!(service = %service, detail = %detail, "{}", message),
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
