use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::models::channel_event_model::{ChannelEvent, ChannelEventRow, NewChannelEvent};

/// Historial append-only de eventos por job. No hay UPDATE ni DELETE.
#[derive(Clone, Debug)]
pub struct ChannelEventService {
    db_pool: Pool<Sqlite>,
}

impl ChannelEventService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        ChannelEventService { db_pool }
    }

    pub async fn append(&self, event: NewChannelEvent) -> Result<ChannelEvent> {
        let ev_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let detail = event
            .detail
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("detail no serializable")?;

        let result = sqlx::query(
            r#"
            INSERT INTO channel_events (
                id, post_job_id, channel, stage, outcome, detail, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&ev_id)
        .bind(&event.post_job_id)
        .bind(event.channel.as_str())
        .bind(event.stage.as_str())
        .bind(event.outcome.as_str())
        .bind(detail)
        .bind(now.to_rfc3339())
        .execute(&self.db_pool)
        .await
        .context("Error insertando channel_event")?;

        log::info!(
            "(append) Evento job={} canal={} stage={} outcome={}",
            event.post_job_id,
            event.channel,
            event.stage,
            event.outcome
        );

        Ok(ChannelEvent {
            id: ev_id,
            seq: result.last_insert_rowid(),
            post_job_id: event.post_job_id,
            channel: event.channel,
            stage: event.stage,
            outcome: event.outcome,
            detail: event.detail,
            created_at: now,
        })
    }

    /// Historial completo en orden de inserción.
    pub async fn list_for_job(&self, post_job_id: &str) -> Result<Vec<ChannelEvent>> {
        let rows = sqlx::query_as::<_, ChannelEventRow>(
            r#"
            SELECT seq, id, post_job_id, channel, stage, outcome, detail, created_at
            FROM channel_events
            WHERE post_job_id = ?1
            ORDER BY seq ASC
            "#,
        )
        .bind(post_job_id)
        .fetch_all(&self.db_pool)
        .await
        .context("Error listando channel_events")?;

        rows.into_iter().map(ChannelEvent::try_from).collect()
    }

    /// Los `limit` eventos más recientes, del más nuevo al más viejo.
    pub async fn latest_for_job(&self, post_job_id: &str, limit: i64) -> Result<Vec<ChannelEvent>> {
        let rows = sqlx::query_as::<_, ChannelEventRow>(
            r#"
            SELECT seq, id, post_job_id, channel, stage, outcome, detail, created_at
            FROM channel_events
            WHERE post_job_id = ?1
            ORDER BY seq DESC
            LIMIT ?2
            "#,
        )
        .bind(post_job_id)
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await
        .context("Error listando últimos channel_events")?;

        rows.into_iter().map(ChannelEvent::try_from).collect()
    }
}
