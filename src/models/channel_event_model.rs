use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{parse_json, parse_ts};

db_enum! {
    /// Canal que reporta el evento. `system` lo usa el propio backend (trigger de n8n).
    Channel {
        Instagram => "instagram",
        Pinterest => "pinterest",
        Whatsapp => "whatsapp",
        System => "system",
    }
}

db_enum! {
    Stage {
        Start => "start",
        CaptionReady => "caption_ready",
        ImageReady => "image_ready",
        Posted => "posted",
        Error => "error",
    }
}

db_enum! {
    /// En el webhook llega como `status`.
    Outcome {
        Running => "running",
        Success => "success",
        Error => "error",
    }
}

/// Evento inmutable de un job en un canal. `seq` define el orden de lectura.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelEvent {
    pub id: String,
    pub seq: i64,
    pub post_job_id: String,
    pub channel: Channel,
    pub stage: Stage,
    pub outcome: Outcome,
    pub detail: Option<Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ChannelEventRow {
    pub seq: i64,
    pub id: String,
    pub post_job_id: String,
    pub channel: String,
    pub stage: String,
    pub outcome: String,
    pub detail: Option<String>,
    pub created_at: String,
}

impl TryFrom<ChannelEventRow> for ChannelEvent {
    type Error = anyhow::Error;

    fn try_from(row: ChannelEventRow) -> Result<Self> {
        Ok(ChannelEvent {
            id: row.id,
            seq: row.seq,
            post_job_id: row.post_job_id,
            channel: row.channel.parse()?,
            stage: row.stage.parse()?,
            outcome: row.outcome.parse()?,
            detail: row.detail.as_deref().map(parse_json).transpose()?,
            created_at: parse_ts(&row.created_at)?,
        })
    }
}

/// Evento a insertar (aún sin id/seq).
#[derive(Debug, Clone)]
pub struct NewChannelEvent {
    pub post_job_id: String,
    pub channel: Channel,
    pub stage: Stage,
    pub outcome: Outcome,
    pub detail: Option<Value>,
}

/// Body de POST /api/webhooks/n8n/status
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct N8nStatusRequest {
    pub post_job_id: String,
    pub channel: Channel,
    pub stage: Stage,
    pub status: Outcome,
    pub detail: Option<Value>,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub success: bool,
    pub status: super::post_job_model::PostJobStatus,
}
