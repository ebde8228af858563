use crate::errors::AppError;
use crate::models::{ListQuery, Priority, Record, Status};
use crate::records::RecordStore;
use chrono::Local;
use std::cmp::Reverse;
use tracing::info;

const ALL: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub search: Option<String>,
}

impl RequestFilter {
    /// Builds a filter from query parameters. Blank values and `all` pass
    /// everything through.
    pub fn from_query(query: &ListQuery) -> Result<Self, AppError> {
        let status = selected(query.statut.as_deref())
            .map(|raw| {
                raw.parse::<Status>()
                    .map_err(|err| AppError::bad_request(format!("Statut inconnu : {}", err.0)))
            })
            .transpose()?;
        let priority = selected(query.priorite.as_deref())
            .map(|raw| {
                raw.parse::<Priority>()
                    .map_err(|err| AppError::bad_request(format!("Priorité inconnue : {}", err.0)))
            })
            .transpose()?;
        let search = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase);

        Ok(Self {
            status,
            priority,
            search,
        })
    }

    pub fn matches(&self, record: &Record) -> bool {
        if self.status.is_some_and(|status| status != record.status) {
            return false;
        }
        if self.priority.is_some_and(|priority| priority != record.priority) {
            return false;
        }
        match &self.search {
            Some(needle) => [
                &record.name,
                &record.email,
                &record.subject,
                &record.service,
                &record.message,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(needle.as_str())),
            None => true,
        }
    }
}

fn selected(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case(ALL))
}

/// Highest priority first, newest first within a priority.
pub fn sort_for_display(records: &mut [Record]) {
    records.sort_by_key(|record| (Reverse(record.priority.rank()), Reverse(record.id)));
}

pub fn list(mut records: Vec<Record>, filter: &RequestFilter) -> Vec<Record> {
    sort_for_display(&mut records);
    records.retain(|record| filter.matches(record));
    records
}

fn not_found() -> AppError {
    AppError::not_found("Demande non trouvée")
}

fn find_mut(records: &mut [Record], id: u64) -> Result<&mut Record, AppError> {
    records
        .iter_mut()
        .find(|record| record.id == id)
        .ok_or_else(not_found)
}

/// Any status is accepted; the dashboard only offers the forward step.
pub fn apply_status(
    records: &mut [Record],
    id: u64,
    status: Status,
    today: &str,
) -> Result<(), AppError> {
    let record = find_mut(records, id)?;
    record.status = status;
    match status {
        Status::Processed => record.processed_date = today.to_string(),
        Status::New => record.processed_date.clear(),
        Status::Archived => {}
    }
    Ok(())
}

pub fn apply_priority(records: &mut [Record], id: u64, priority: Priority) -> Result<(), AppError> {
    find_mut(records, id)?.priority = priority;
    Ok(())
}

pub fn remove(records: &mut Vec<Record>, id: u64) -> Result<usize, AppError> {
    let before = records.len();
    records.retain(|record| record.id != id);
    match before - records.len() {
        0 => Err(not_found()),
        removed => Ok(removed),
    }
}

pub fn today() -> String {
    Local::now().format("%d/%m/%Y").to_string()
}

pub async fn set_status(store: &RecordStore, id: u64, status: Status) -> Result<(), AppError> {
    let today = today();
    store
        .mutate(|records| apply_status(records, id, status, &today))
        .await?;
    info!("request {id} moved to {status}");
    Ok(())
}

pub async fn set_priority(store: &RecordStore, id: u64, priority: Priority) -> Result<(), AppError> {
    store
        .mutate(|records| apply_priority(records, id, priority))
        .await?;
    info!("request {id} priority set to {priority}");
    Ok(())
}

pub async fn delete(store: &RecordStore, id: u64) -> Result<(), AppError> {
    store.mutate(|records| remove(records, id)).await?;
    info!("request {id} deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewRequest;
    use crate::stats::VisitCounter;
    use crate::storage::scratch_path;
    use std::sync::Arc;

    fn record(id: u64, priority: Priority) -> Record {
        let mut record = NewRequest {
            name: format!("Demandeur {id}"),
            email: format!("user{id}@example.fr"),
            phone: String::new(),
            subject: "Carte grise".into(),
            service: "ANTS".into(),
            message: "Merci".into(),
        }
        .into_record(id, "01/03/2026 08:00:00".into());
        record.priority = priority;
        record
    }

    fn ids(records: &[Record]) -> Vec<u64> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn sort_orders_priority_then_newest() {
        let mut records = vec![
            record(1, Priority::Low),
            record(2, Priority::High),
            record(3, Priority::Medium),
            record(4, Priority::High),
        ];
        sort_for_display(&mut records);
        assert_eq!(ids(&records), vec![4, 2, 3, 1]);
    }

    #[test]
    fn filters_compose_with_and() {
        let mut records = vec![
            record(1, Priority::High),
            record(2, Priority::High),
            record(3, Priority::Low),
        ];
        records[1].status = Status::Processed;
        records[2].message = "Dossier URGENT".into();

        let filter = RequestFilter {
            status: Some(Status::New),
            priority: Some(Priority::High),
            search: None,
        };
        assert_eq!(ids(&list(records.clone(), &filter)), vec![1]);

        let filter = RequestFilter {
            search: Some("urgent".into()),
            ..Default::default()
        };
        assert_eq!(ids(&list(records.clone(), &filter)), vec![3]);

        let filter = RequestFilter {
            search: Some("user2@".into()),
            status: Some(Status::New),
            ..Default::default()
        };
        assert!(list(records.clone(), &filter).is_empty());

        let filter = RequestFilter {
            search: Some("introuvable".into()),
            ..Default::default()
        };
        assert!(list(records.clone(), &filter).is_empty());

        let everything = list(records.clone(), &RequestFilter::default());
        assert_eq!(everything.len(), records.len());
    }

    #[test]
    fn query_sentinels_pass_through() {
        let query = ListQuery {
            statut: Some("all".into()),
            priorite: Some(" ".into()),
            q: Some("  ANTS ".into()),
        };
        let filter = RequestFilter::from_query(&query).unwrap();
        assert_eq!(filter.status, None);
        assert_eq!(filter.priority, None);
        assert_eq!(filter.search.as_deref(), Some("ants"));

        let bad = ListQuery {
            statut: Some("Perdu".into()),
            ..Default::default()
        };
        assert_eq!(
            RequestFilter::from_query(&bad).unwrap_err().status,
            axum::http::StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn status_changes_track_processed_date() {
        let mut records = vec![record(1, Priority::Medium)];

        apply_status(&mut records, 1, Status::Processed, "05/03/2026").unwrap();
        assert_eq!(records[0].processed_date, "05/03/2026");

        apply_status(&mut records, 1, Status::Archived, "06/03/2026").unwrap();
        assert_eq!(records[0].status, Status::Archived);
        assert_eq!(records[0].processed_date, "05/03/2026");

        apply_status(&mut records, 1, Status::New, "07/03/2026").unwrap();
        assert_eq!(records[0].processed_date, "");

        assert!(apply_status(&mut records, 9, Status::New, "x").unwrap_err().is_not_found());
    }

    #[test]
    fn remove_reports_missing_ids() {
        let mut records = vec![record(1, Priority::Low), record(2, Priority::Low)];
        assert!(remove(&mut records, 3).unwrap_err().is_not_found());
        assert_eq!(records.len(), 2);
        assert_eq!(remove(&mut records, 1).unwrap(), 1);
        assert_eq!(ids(&records), vec![2]);
    }

    #[tokio::test]
    async fn persisted_mutations_round_trip() {
        let store = RecordStore::open(scratch_path("requests.csv")).await.unwrap();
        let created = store
            .insert(NewRequest {
                name: "Martin".into(),
                email: "m@x.fr".into(),
                phone: String::new(),
                subject: "CAF".into(),
                service: "Social".into(),
                message: "Question".into(),
            })
            .await
            .unwrap();

        set_status(&store, created.id, Status::Processed).await.unwrap();
        set_priority(&store, created.id, Priority::High).await.unwrap();
        let stored = store.load().await.unwrap();
        assert_eq!(stored[0].status, Status::Processed);
        assert_eq!(stored[0].priority, Priority::High);
        assert_eq!(stored[0].processed_date, today());

        assert!(delete(&store, created.id + 1).await.unwrap_err().is_not_found());
        assert_eq!(store.load().await.unwrap().len(), 1);
        delete(&store, created.id).await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    async fn seeded_store(path: std::path::PathBuf, count: u64) -> (Arc<RecordStore>, Vec<u64>) {
        let store = Arc::new(RecordStore::open(path).await.unwrap());
        let mut ids = Vec::new();
        for n in 0..count {
            let request = record(n, Priority::Low);
            let created = store
                .insert(NewRequest {
                    name: request.name,
                    email: request.email,
                    phone: request.phone,
                    subject: request.subject,
                    service: request.service,
                    message: request.message,
                })
                .await
                .unwrap();
            ids.push(created.id);
        }
        (store, ids)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_all_persist() {
        let (store, ids) = seeded_store(scratch_path("requests.csv"), 20).await;

        let tasks: Vec<_> = ids
            .iter()
            .map(|&id| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { set_priority(&store, id, Priority::High).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stored = store.load().await.unwrap();
        assert_eq!(stored.len(), ids.len());
        assert!(stored.iter().all(|record| record.priority == Priority::High));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn stores_sharing_a_stem_do_not_interfere() {
        let requests_path = scratch_path("desk.csv");
        let stats_path = requests_path.with_file_name("desk.json");
        let (store, ids) = seeded_store(requests_path, 1).await;
        let counter = Arc::new(VisitCounter::open(stats_path).await.unwrap());
        let id = ids[0];

        let rounds = 100;
        let updates = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                for round in 0..rounds {
                    let priority = if round % 2 == 0 { Priority::High } else { Priority::Low };
                    set_priority(&store, id, priority).await.unwrap();
                }
            })
        };
        let visits = {
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                for _ in 0..rounds {
                    counter.record_visit("10.0.0.1").await;
                }
            })
        };
        updates.await.unwrap();
        visits.await.unwrap();

        let stored = store.load().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].priority, Priority::Low);
        assert_eq!(counter.read_summary().await.unwrap().total_views, rounds);
    }
}
