use serde::{Deserialize, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Lifecycle of a request as shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    New,
    Processed,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel(pub String);

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

impl std::error::Error for UnknownLabel {}

impl Status {
    pub const ALL: [Status; 3] = [Status::New, Status::Processed, Status::Archived];

    pub fn label(self) -> &'static str {
        match self {
            Status::New => "Nouveau",
            Status::Processed => "Traitée",
            Status::Archived => "Archivée",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Status::New => "new",
            Status::Processed => "processed",
            Status::Archived => "archived",
        }
    }
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "Haute",
            Priority::Medium => "Moyenne",
            Priority::Low => "Basse",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Sort weight, highest first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

impl FromStr for Status {
    type Err = UnknownLabel;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        Status::ALL
            .into_iter()
            .find(|s| s.label().to_lowercase() == raw.to_lowercase() || s.name().eq_ignore_ascii_case(raw))
            .ok_or_else(|| UnknownLabel(raw.to_string()))
    }
}

impl FromStr for Priority {
    type Err = UnknownLabel;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        Priority::ALL
            .into_iter()
            .find(|p| p.label().to_lowercase() == raw.to_lowercase() || p.name().eq_ignore_ascii_case(raw))
            .ok_or_else(|| UnknownLabel(raw.to_string()))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One row of the request file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    #[serde(serialize_with = "id_as_string")]
    pub id: u64,
    pub date: String,
    #[serde(rename = "nom")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telephone")]
    pub phone: String,
    #[serde(rename = "sujet")]
    pub subject: String,
    pub message: String,
    #[serde(rename = "statut")]
    pub status: Status,
    #[serde(rename = "priorite")]
    pub priority: Priority,
    pub service: String,
    #[serde(rename = "date_traitement")]
    pub processed_date: String,
}

fn id_as_string<S: Serializer>(id: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(id)
}

/// Validated submission, ready to be stamped with an id and date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub service: String,
    pub message: String,
}

impl NewRequest {
    pub fn into_record(self, id: u64, date: String) -> Record {
        Record {
            id,
            date,
            name: self.name,
            email: self.email,
            phone: self.phone,
            subject: self.subject,
            message: self.message,
            status: Status::default(),
            priority: Priority::default(),
            service: self.service,
            processed_date: String::new(),
        }
    }
}

/// Persisted page-view counter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VisitLog {
    #[serde(rename = "totalViews", default)]
    pub total_views: u64,
    #[serde(rename = "uniqueIps", default)]
    pub unique_visitors: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct VisitSummary {
    #[serde(rename = "totalViews")]
    pub total_views: u64,
    #[serde(rename = "uniqueIps")]
    pub unique_count: usize,
}

/// Record identifier as sent by clients: the dashboard echoes it back as a
/// string, scripted callers may send a bare number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdInput {
    Number(u64),
    Text(String),
}

impl IdInput {
    pub fn is_blank(&self) -> bool {
        matches!(self, IdInput::Text(text) if text.trim().is_empty())
    }

    pub fn as_id(&self) -> Option<u64> {
        match self {
            IdInput::Number(id) => Some(*id),
            IdInput::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    pub nom: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub sujet: Option<String>,
    pub service: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub id: Option<IdInput>,
    pub statut: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PriorityUpdateRequest {
    pub id: Option<IdInput>,
    pub priorite: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub id: Option<IdInput>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub statut: Option<String>,
    pub priorite: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}
