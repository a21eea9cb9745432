use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use serde_json::json;

use crate::store::{StoreError, StoreErrorKind};

#[derive(Debug, Display)]
pub enum AppError {
    /// Malformed or missing submission fields.
    #[display(fmt = "{}", _0)]
    InvalidInput(String),

    /// The records store could not be reached, refused access, or answered
    /// with something unreadable.
    #[display(fmt = "{}: {}", context, source)]
    StoreUnavailable {
        context: &'static str,
        source: StoreError,
    },

    /// The target sheet or table does not exist.
    #[display(fmt = "{}: {}", context, source)]
    NotFound {
        context: &'static str,
        source: StoreError,
    },

    #[display(fmt = "failed to render page: {}", _0)]
    Render(String),
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }

    /// `context` is the user-facing summary, e.g. "Failed to save attendance".
    pub fn from_store(context: &'static str, source: StoreError) -> Self {
        match source.kind {
            StoreErrorKind::NotFound => AppError::NotFound { context, source },
            _ => AppError::StoreUnavailable { context, source },
        }
    }

    pub fn render(err: impl std::fmt::Display) -> Self {
        AppError::Render(err.to_string())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, AppError::InvalidInput(_))
    }

    pub fn is_store_unavailable(&self) -> bool {
        matches!(
            self,
            AppError::StoreUnavailable { .. } | AppError::NotFound { .. }
        )
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            // the service does not tell a missing sheet apart from an outage
            AppError::StoreUnavailable { .. } | AppError::NotFound { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::InvalidInput(message) => json!({ "error": message }),
            AppError::StoreUnavailable { context, source }
            | AppError::NotFound { context, source } => match &source.code {
                Some(code) => json!({
                    "error": context,
                    "message": source.to_string(),
                    "code": code,
                }),
                None => json!({
                    "error": context,
                    "message": source.to_string(),
                }),
            },
            AppError::Render(_) => json!({ "error": "Failed to render page" }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}
