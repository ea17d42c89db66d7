//! errors.rs
//! Errores de la API y su traducción a respuestas HTTP.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    /// Falló una llamada saliente (p.ej. el webhook de n8n).
    #[error("{message}")]
    Upstream {
        message: String,
        post_job_id: Option<String>,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::Internal(e) => {
                log::error!("(error_response) Error interno: {:?}", e);
                format!("{:#}", e)
            }
            other => other.to_string(),
        };

        let mut body = json!({
            "success": false,
            "error": message
        });
        if let ApiError::Upstream {
            post_job_id: Some(id),
            ..
        } = self
        {
            body["post_job_id"] = json!(id);
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}
