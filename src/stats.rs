use crate::errors::AppError;
use crate::models::{VisitLog, VisitSummary};
use crate::storage::{ensure_file, write_replace};
use axum::http::HeaderMap;
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::Mutex};
use tracing::warn;

/// Page-view counter persisted as pretty JSON.
pub struct VisitCounter {
    path: PathBuf,
    lock: Mutex<()>,
}

impl VisitCounter {
    pub async fn open(path: PathBuf) -> Result<Self, AppError> {
        let initial = serde_json::to_vec_pretty(&VisitLog::default())?;
        ensure_file(&path, &initial).await?;
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Counts one landing-page view. Failures are logged and swallowed so
    /// the page is still served.
    pub async fn record_visit(&self, visitor: &str) {
        if let Err(err) = self.try_record_visit(visitor).await {
            warn!("visit from {visitor} not counted: {}", err.message);
        }
    }

    async fn try_record_visit(&self, visitor: &str) -> Result<VisitLog, AppError> {
        let _guard = self.lock.lock().await;
        let mut log = read_log(&self.path).await?;
        apply_visit(&mut log, visitor);
        write_replace(&self.path, &serde_json::to_vec_pretty(&log)?).await?;
        Ok(log)
    }

    pub async fn read_summary(&self) -> Result<VisitSummary, AppError> {
        let log = read_log(&self.path).await?;
        Ok(summarize(&log))
    }
}

async fn read_log(path: &Path) -> Result<VisitLog, AppError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(VisitLog::default()),
        Err(err) => Err(AppError::internal(err)),
    }
}

pub fn apply_visit(log: &mut VisitLog, visitor: &str) {
    log.total_views = log.total_views.saturating_add(1);
    if !log.unique_visitors.iter().any(|seen| seen == visitor) {
        log.unique_visitors.push(visitor.to_string());
    }
}

pub fn summarize(log: &VisitLog) -> VisitSummary {
    VisitSummary {
        total_views: log.total_views,
        unique_count: log.unique_visitors.len(),
    }
}

/// First hop of `X-Forwarded-For` when present, else the socket peer.
pub fn visitor_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty());

    match (forwarded, peer) {
        (Some(first), _) => first.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}
