//! services/webhook_service.rs
//! Callbacks de estado que n8n envía por cada canal.

use serde_json::Value;
use uuid::Uuid;

use crate::{
    errors::ApiError,
    models::channel_event_model::{N8nStatusRequest, NewChannelEvent, WebhookAck},
    services::{
        channel_event_service::ChannelEventService, post_job_service::PostJobService,
        signature::SignatureVerifier,
    },
};

#[derive(Clone, Debug)]
pub struct WebhookService {
    post_job_service: PostJobService,
    event_service: ChannelEventService,
    verifier: SignatureVerifier,
}

impl WebhookService {
    pub fn new(
        post_job_service: PostJobService,
        event_service: ChannelEventService,
        verifier: SignatureVerifier,
    ) -> Self {
        WebhookService {
            post_job_service,
            event_service,
            verifier,
        }
    }

    /// Recibe el body crudo: la firma se calcula sobre el JSON tal como llegó
    /// (mismo orden de claves) sin el campo `signature`.
    pub async fn handle_n8n_status(&self, raw_body: &[u8]) -> Result<WebhookAck, ApiError> {
        let mut body: Value = serde_json::from_slice(raw_body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?;

        let req: N8nStatusRequest = serde_json::from_value(body.clone())
            .map_err(|e| ApiError::BadRequest(format!("Invalid status payload: {}", e)))?;
        validate(&req)?;

        match req.signature.as_deref() {
            Some(signature) => {
                if let Value::Object(map) = &mut body {
                    map.shift_remove("signature");
                }
                if !self.verifier.verify(&body, signature)? {
                    log::warn!(
                        "(handle_n8n_status) Firma inválida para post_job={}",
                        req.post_job_id
                    );
                    return Err(ApiError::Unauthorized("Invalid signature".to_string()));
                }
            }
            None if self.verifier.is_enabled() => {
                log::warn!(
                    "(handle_n8n_status) Callback sin firma aceptado para post_job={}",
                    req.post_job_id
                );
            }
            None => {}
        }

        // 404 antes de tocar el historial
        self.post_job_service.get_job(&req.post_job_id).await?;

        self.event_service
            .append(NewChannelEvent {
                post_job_id: req.post_job_id.clone(),
                channel: req.channel,
                stage: req.stage,
                outcome: req.status,
                detail: req.detail,
            })
            .await?;

        let status = self
            .post_job_service
            .recompute_status(&req.post_job_id)
            .await?;

        Ok(WebhookAck {
            success: true,
            status,
        })
    }
}

fn validate(req: &N8nStatusRequest) -> Result<(), ApiError> {
    Uuid::parse_str(&req.post_job_id)
        .map_err(|_| ApiError::BadRequest("postJobId must be a UUID".to_string()))?;

    match &req.detail {
        None | Some(Value::Object(_)) => Ok(()),
        Some(_) => Err(ApiError::BadRequest("detail must be an object".to_string())),
    }
}
