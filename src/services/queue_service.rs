//! services/queue_service.rs
//! Puerto de encolado. Los jobs quedan en `queued_jobs` con su política de
//! reintentos; el scraper externo los consume.

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::json;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::models::queue_model::{EnqueueJob, RetryPolicy};

pub const SCRAPE_QUEUE: &str = "scrape";

#[derive(Clone, Debug)]
pub struct QueueService {
    db_pool: Pool<Sqlite>,
}

impl QueueService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        QueueService { db_pool }
    }

    pub async fn enqueue(&self, job: EnqueueJob) -> Result<String> {
        let job_id = Uuid::new_v4().to_string();
        let payload = serde_json::to_string(&job.payload).context("Payload no serializable")?;

        sqlx::query(
            r#"
            INSERT INTO queued_jobs (
                id, queue, name, payload, max_attempts,
                backoff_type, backoff_delay_ms, status, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'waiting', ?8)
            "#,
        )
        .bind(&job_id)
        .bind(job.queue)
        .bind(job.name)
        .bind(payload)
        .bind(i64::from(job.policy.attempts))
        .bind(job.policy.backoff.as_str())
        .bind(job.policy.delay_ms as i64)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db_pool)
        .await
        .with_context(|| format!("Fallo al encolar job en '{}'", job.queue))?;

        log::info!(
            "(enqueue) Job {} encolado en '{}' ({}), intentos={}",
            job_id,
            job.queue,
            job.name,
            job.policy.attempts
        );
        Ok(job_id)
    }

    pub async fn enqueue_scrape(&self, affiliate_link_id: &str) -> Result<String> {
        self.enqueue(EnqueueJob {
            queue: SCRAPE_QUEUE,
            name: "scrape-product",
            payload: json!({ "affiliateLinkId": affiliate_link_id }),
            policy: RetryPolicy::SCRAPE,
        })
        .await
    }
}
