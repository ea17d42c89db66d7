//! handlers/webhook_handler.rs
use actix_web::{web, HttpResponse};

use crate::{errors::ApiError, services::webhook_service::WebhookService};

/// POST /api/webhooks/n8n/status
///
/// Se recibe el body crudo porque la firma depende del JSON exacto.
pub async fn n8n_status_endpoint(
    webhook_service: web::Data<WebhookService>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let ack = webhook_service.handle_n8n_status(&body).await?;
    Ok(HttpResponse::Ok().json(ack))
}
