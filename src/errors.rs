use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    Json,
};
use serde_json::json;
use tracing::error;

/// Body layout of an error response. Mutation endpoints answer
/// `{success:false, error}`, pure reads answer `{error}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorShape {
    Mutation,
    Read,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub shape: ErrorShape,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            shape: ErrorShape::Mutation,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
            shape: ErrorShape::Mutation,
        }
    }

    /// Storage failure. The cause stays in the server log.
    pub fn internal(err: impl std::error::Error) -> Self {
        error!("storage failure: {err}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Erreur serveur interne".to_string(),
            shape: ErrorShape::Mutation,
        }
    }

    pub fn for_read(mut self) -> Self {
        if self.status == StatusCode::INTERNAL_SERVER_ERROR {
            self.message = "Erreur lecture".to_string();
        }
        self.shape = ErrorShape::Read;
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Requête invalide : {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(format!("Paramètres invalides : {}", rejection.body_text()))
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = match self.shape {
            ErrorShape::Mutation => json!({ "success": false, "error": self.message }),
            ErrorShape::Read => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}
