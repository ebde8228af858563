use crate::config::Config;
use crate::errors::AppError;
use crate::records::RecordStore;
use crate::stats::VisitCounter;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub records: Arc<RecordStore>,
    pub visits: Arc<VisitCounter>,
}

impl AppState {
    pub fn new(records: RecordStore, visits: VisitCounter) -> Self {
        Self {
            records: Arc::new(records),
            visits: Arc::new(visits),
        }
    }

    /// Opens both stores, creating their files on first run.
    pub async fn open(config: &Config) -> Result<Self, AppError> {
        let records = RecordStore::open(config.requests_path.clone()).await?;
        let visits = VisitCounter::open(config.stats_path.clone()).await?;
        Ok(Self::new(records, visits))
    }
}
