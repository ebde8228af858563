//! CSV-backed record store.
//!
//! Every field is written double-quoted with inner quotes doubled; newlines
//! are flattened to spaces so one record is always one line. The file always
//! starts with [`CSV_HEADER`].

use crate::errors::AppError;
use crate::models::{NewRequest, Priority, Record, Status};
use crate::storage::{ensure_file, write_replace};
use chrono::{Local, Utc};
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, error, info};

pub const CSV_HEADER: &str =
    "ID,Date,Nom,Email,Telephone,Sujet,Message,Statut,Priorite,Service,Date_Traitement";

/// Rows with fewer fields are dropped on read. The trailing processed date
/// is optional.
const MIN_FIELDS: usize = 10;

const UNKNOWN_SERVICE: &str = "Inconnu";

pub fn encode_field(text: &str) -> String {
    let flat = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
    format!("\"{}\"", flat.replace('"', "\"\""))
}

pub fn encode_record(record: &Record) -> String {
    let id = record.id.to_string();
    let fields: [&str; 11] = [
        &id,
        &record.date,
        &record.name,
        &record.email,
        &record.phone,
        &record.subject,
        &record.message,
        record.status.label(),
        record.priority.label(),
        &record.service,
        &record.processed_date,
    ];
    fields
        .iter()
        .map(|field| encode_field(field))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn encode_file(records: &[Record]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + records.len() * 128);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for record in records {
        out.push_str(&encode_record(record));
        out.push('\n');
    }
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum FieldState {
    Start,
    Bare,
    Quoted,
    AfterQuote,
}

/// Splits one line into fields. Quoted fields lose their outer quotes and
/// have `""` collapsed; bare fields are trimmed.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut state = FieldState::Start;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (state, c) {
            (FieldState::Quoted, '"') => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    state = FieldState::AfterQuote;
                }
            }
            (FieldState::Quoted, _) => current.push(c),
            (_, ',') => {
                let field = std::mem::take(&mut current);
                fields.push(if state == FieldState::Bare {
                    field.trim().to_string()
                } else {
                    field
                });
                state = FieldState::Start;
            }
            (FieldState::Start, '"') => state = FieldState::Quoted,
            (FieldState::Start, c) if c.is_whitespace() => {}
            (FieldState::Start | FieldState::Bare, _) => {
                current.push(c);
                state = FieldState::Bare;
            }
            (FieldState::AfterQuote, _) => {}
        }
    }

    fields.push(if state == FieldState::Bare {
        current.trim().to_string()
    } else {
        current
    });
    fields
}

pub fn decode_line(line: &str) -> Option<Record> {
    if line.trim().is_empty() {
        return None;
    }
    let mut fields = split_line(line).into_iter();
    let count = fields.len();
    if count < MIN_FIELDS {
        debug!("skipping row with {count} fields");
        return None;
    }

    let id = match fields.next()?.parse::<u64>() {
        Ok(id) => id,
        Err(_) => {
            debug!("skipping row with non-numeric id");
            return None;
        }
    };
    let mut next = || fields.next().unwrap_or_default();

    let date = next();
    let name = next();
    let email = next();
    let phone = next();
    let subject = next();
    let message = next();
    let status = next().parse::<Status>().unwrap_or_default();
    let priority = next().parse::<Priority>().unwrap_or_default();
    let service = match next() {
        service if service.trim().is_empty() => UNKNOWN_SERVICE.to_string(),
        service => service,
    };
    let processed_date = next();

    Some(Record {
        id,
        date,
        name,
        email,
        phone,
        subject,
        message,
        status,
        priority,
        service,
        processed_date,
    })
}

/// Parses a whole file, header included.
pub fn decode_file(contents: &str) -> Vec<Record> {
    contents
        .lines()
        .skip(1)
        .filter_map(decode_line)
        .collect()
}

/// Reads every record. A missing file reads as empty.
pub async fn try_load_all(path: &Path) -> Result<Vec<Record>, AppError> {
    match fs::read_to_string(path).await {
        Ok(contents) => Ok(decode_file(&contents)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(AppError::internal(err)),
    }
}

/// Lenient variant of [`try_load_all`]: read failures are logged and yield
/// an empty list.
pub async fn load_all(path: &Path) -> Vec<Record> {
    match fs::read_to_string(path).await {
        Ok(contents) => decode_file(&contents),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(err) => {
            error!("failed to read {}: {err}", path.display());
            Vec::new()
        }
    }
}

pub async fn append(path: &Path, record: &Record) -> Result<(), AppError> {
    ensure_file(path, header_line().as_bytes()).await?;
    let mut line = encode_record(record);
    line.push('\n');

    let mut file = fs::OpenOptions::new().append(true).open(path).await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

pub async fn rewrite_all(path: &Path, records: &[Record]) -> Result<(), AppError> {
    write_replace(path, encode_file(records).as_bytes()).await?;
    Ok(())
}

fn header_line() -> String {
    format!("{CSV_HEADER}\n")
}

/// Next identifier: the current epoch milliseconds, bumped past the last
/// issued id when the clock has not moved. `None` once the id space is spent.
pub fn next_id(last_issued: u64, now_millis: u64) -> Option<u64> {
    last_issued
        .checked_add(1)
        .map(|bumped| bumped.max(now_millis))
}

fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}

fn creation_stamp() -> String {
    Local::now().format("%d/%m/%Y %H:%M:%S").to_string()
}

/// Owns the request file. The mutex serializes every write path
/// (insert and load-mutate-rewrite) and holds the last issued id.
pub struct RecordStore {
    path: PathBuf,
    last_id: Mutex<u64>,
}

impl RecordStore {
    pub async fn open(path: PathBuf) -> Result<Self, AppError> {
        ensure_file(&path, header_line().as_bytes()).await?;
        let records = load_all(&path).await;
        let last_id = records.iter().map(|record| record.id).max().unwrap_or(0);
        info!("loaded {} requests from {}", records.len(), path.display());

        Ok(Self {
            path,
            last_id: Mutex::new(last_id),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Vec<Record>, AppError> {
        try_load_all(&self.path).await
    }

    pub async fn insert(&self, request: NewRequest) -> Result<Record, AppError> {
        let mut last_id = self.last_id.lock().await;
        let id = next_id(*last_id, now_millis()).ok_or_else(|| {
            AppError::internal(std::io::Error::other("request id space exhausted"))
        })?;
        let record = request.into_record(id, creation_stamp());

        append(&self.path, &record).await?;
        *last_id = id;
        Ok(record)
    }

    /// Loads every record, applies `operation`, and rewrites the file, all
    /// under the store lock. Nothing is written when `operation` fails.
    pub async fn mutate<T, F>(&self, operation: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Vec<Record>) -> Result<T, AppError>,
    {
        let _guard = self.last_id.lock().await;
        let mut records = try_load_all(&self.path).await?;
        let result = operation(&mut records)?;
        rewrite_all(&self.path, &records).await?;
        Ok(result)
    }

    /// Raw file contents for download.
    pub async fn export(&self) -> Result<Vec<u8>, AppError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(header_line().into_bytes())
            }
            Err(err) => Err(AppError::internal(err)),
        }
    }
}
