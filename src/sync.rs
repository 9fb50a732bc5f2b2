//! Best-effort sync to the Google Sheets collaborator.
//!
//! The spreadsheet is an audit mirror, never the source of truth. Callers
//! enqueue records and move on; a single background worker owns the HTTP
//! client and delivers them. Delivery failures of any kind are swallowed
//! (logged at debug), and a full queue drops the record rather than blocking
//! a request. At-most-once is the contract.

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

const QUEUE_DEPTH: usize = 256;
const DELIVER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

/// A system-log line destined for the SystemLogs sheet.
#[derive(Clone, Debug, Serialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub user: String,
    pub page: String,
}

#[derive(Debug)]
pub enum SyncJob {
    Log(LogRecord),
    Record { action: String, table: String, data: serde_json::Value },
    Flush(oneshot::Sender<()>),
}

/// Cheap cloneable sender half handed to services and handlers.
#[derive(Clone)]
pub struct SyncHandle {
    tx: mpsc::Sender<SyncJob>,
}

impl SyncHandle {
    /// Handle wired to a bare channel with no worker behind it. Tests read
    /// the receiver to see what would have been delivered.
    pub fn channel() -> (SyncHandle, mpsc::Receiver<SyncJob>) {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        (SyncHandle { tx }, rx)
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>, user: impl Into<String>, page: impl Into<String>) {
        self.send(SyncJob::Log(LogRecord {
            level,
            message: message.into(),
            user: user.into(),
            page: page.into(),
        }));
    }

    /// Enqueues a table record, e.g. `createOrder` into the Orders sheet.
    pub fn record(&self, action: impl Into<String>, table: impl Into<String>, data: serde_json::Value) {
        self.send(SyncJob::Record { action: action.into(), table: table.into(), data });
    }

    fn send(&self, job: SyncJob) {
        if let Err(e) = self.tx.try_send(job) {
            tracing::debug!("sheet sync queue full, dropping record: {e}");
        }
    }

    /// Waits until everything enqueued before the call has been attempted.
    /// Used on shutdown and in tests; normal callers never wait.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(SyncJob::Flush(ack)).await.is_ok() {
            let _ = done.await;
        }
    }
}

/// HTTP side of the sync worker. A `None` URL puts the client in disabled
/// mode where every delivery is a no-op.
pub struct SheetClient {
    http: reqwest::Client,
    url: Option<String>,
    app_name: String,
    version: String,
}

impl SheetClient {
    pub fn new(url: Option<String>, app_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            app_name: app_name.into(),
            version: version.into(),
        }
    }

    pub fn disabled(app_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(None, app_name, version)
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    async fn deliver(&self, job: SyncJob) {
        let Some(url) = &self.url else { return };
        let (target, payload) = match job {
            SyncJob::Log(rec) => (
                format!("{url}?action=log"),
                json!({
                    "action": "log",
                    "timestamp": Utc::now().to_rfc3339(),
                    "level": rec.level,
                    "message": rec.message,
                    "user": rec.user,
                    "page": rec.page,
                    "app": self.app_name,
                    "version": self.version,
                }),
            ),
            SyncJob::Record { action, table, data } => (
                url.clone(),
                json!({ "action": action, "table": table, "data": data }),
            ),
            SyncJob::Flush(_) => return,
        };
        // The endpoint answers opaquely (Apps Script web apps), so only
        // transport errors are even visible. All of them are swallowed.
        match self.http.post(&target).timeout(DELIVER_TIMEOUT).json(&payload).send().await {
            Ok(resp) => tracing::debug!(status = %resp.status(), "sheet sync delivered"),
            Err(e) => tracing::debug!("sheet sync dropped: {e}"),
        }
    }
}

/// Spawns the delivery worker and returns the handle callers enqueue on.
pub fn spawn(client: SheetClient) -> SyncHandle {
    let (tx, mut rx) = mpsc::channel(QUEUE_DEPTH);
    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            match job {
                SyncJob::Flush(ack) => {
                    let _ = ack.send(());
                }
                job => client.deliver(job).await,
            }
        }
    });
    SyncHandle { tx }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_client_swallows_everything() {
        let sync = spawn(SheetClient::disabled("Global Marketplace", "1.0.0"));
        sync.log(LogLevel::Info, "hello", "anonymous", "/");
        sync.record("createOrder", "Orders", json!({"id": "x"}));
        sync.flush().await; // must not hang or panic
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_not_an_error() {
        // Nothing listens here; delivery fails and is dropped silently.
        let sync = spawn(SheetClient::new(
            Some("http://127.0.0.1:9".into()),
            "Global Marketplace",
            "1.0.0",
        ));
        sync.log(LogLevel::Warning, "will be dropped", "anonymous", "/cart");
        sync.flush().await;
        // handle stays usable afterwards
        sync.log(LogLevel::Info, "still alive", "anonymous", "/");
        sync.flush().await;
    }
}
