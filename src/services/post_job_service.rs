use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::{
    errors::ApiError,
    models::{
        channel_event_model::{Channel, ChannelEvent, NewChannelEvent, Outcome, Stage},
        post_job_model::{
            CreatePostRequest, ListPostsQuery, PostJobDetail, PostJobListItem, PostJobRecord,
            PostJobRow, PostJobStatus, WorkflowPayload, WorkflowProduct,
        },
        product_model::ProductSummary,
    },
    services::{
        channel_event_service::ChannelEventService, product_service::ProductService,
        status_aggregator::compute_status, workflow_trigger::WorkflowTrigger,
    },
};

const JOB_COLUMNS: &str = r#"
    id, product_id, channels, context, status, status_version, created_at, updated_at
"#;

const LIST_LIMIT: i64 = 50;
const LIST_EVENTS: i64 = 5;

#[derive(Clone, Debug)]
pub struct PostJobService {
    db_pool: Pool<Sqlite>,
    product_service: ProductService,
    event_service: ChannelEventService,
    trigger: WorkflowTrigger,
    backend_base_url: String,
}

impl PostJobService {
    pub fn new(
        db_pool: Pool<Sqlite>,
        product_service: ProductService,
        event_service: ChannelEventService,
        trigger: WorkflowTrigger,
        backend_base_url: String,
    ) -> Self {
        PostJobService {
            db_pool,
            product_service,
            event_service,
            trigger,
            backend_base_url,
        }
    }

    /// Crea el job en "queued" y dispara el workflow de n8n.
    ///
    /// El resultado del disparo se registra como evento `system`, así el estado
    /// del job solo cambia por recomputación.
    pub async fn create_post(&self, req: CreatePostRequest) -> Result<PostJobRecord, ApiError> {
        let product = self.product_service.get_product(&req.product_id).await?;

        if req.channels.selected().is_empty() {
            return Err(ApiError::BadRequest(
                "At least one channel must be selected".to_string(),
            ));
        }
        let context = match req.context {
            Some(ctx @ Value::Object(_)) => ctx,
            Some(_) => {
                return Err(ApiError::BadRequest("context must be an object".to_string()));
            }
            None => json!({}),
        };

        let job_id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO post_jobs (
                id, product_id, channels, context, status, status_version,
                created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)
            "#,
        )
        .bind(&job_id)
        .bind(&product.id)
        .bind(serde_json::to_string(&req.channels).context("channels no serializable")?)
        .bind(serde_json::to_string(&context).context("context no serializable")?)
        .bind(PostJobStatus::Queued.as_str())
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar post_job")?;

        log::info!(
            "(create_post) Post job {} creado para producto {} canales={:?}",
            job_id,
            product.id,
            req.channels.selected()
        );

        let payload = WorkflowPayload {
            post_job_id: job_id.clone(),
            backend_base_url: self.backend_base_url.clone(),
            channels: req.channels.clone(),
            product: WorkflowProduct::from(&product),
            context,
        };

        match self.trigger.fire(&payload).await {
            Ok(http_status) => {
                self.event_service
                    .append(NewChannelEvent {
                        post_job_id: job_id.clone(),
                        channel: Channel::System,
                        stage: Stage::Start,
                        outcome: Outcome::Running,
                        detail: Some(json!({ "trigger": "n8n", "httpStatus": http_status })),
                    })
                    .await?;
                self.recompute_status(&job_id).await?;
                self.get_job(&job_id).await
            }
            Err(e) => {
                log::error!("(create_post) Fallo el disparo de n8n para {}: {:#}", job_id, e);
                self.event_service
                    .append(NewChannelEvent {
                        post_job_id: job_id.clone(),
                        channel: Channel::System,
                        stage: Stage::Error,
                        outcome: Outcome::Error,
                        detail: Some(json!({ "trigger": "n8n", "error": format!("{:#}", e) })),
                    })
                    .await?;
                self.recompute_status(&job_id).await?;
                Err(ApiError::Upstream {
                    message: format!("{:#}", e),
                    post_job_id: Some(job_id),
                })
            }
        }
    }

    pub async fn find_job(&self, job_id: &str) -> Result<Option<PostJobRecord>> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM post_jobs WHERE id = ?1");
        let row = sqlx::query_as::<_, PostJobRow>(&sql)
            .bind(job_id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Error buscando post_job")?;

        row.map(PostJobRecord::try_from).transpose()
    }

    pub async fn get_job(&self, job_id: &str) -> Result<PostJobRecord, ApiError> {
        self.find_job(job_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Post job with ID {} not found", job_id)))
    }

    /// Job con su producto y todos sus eventos (orden ascendente).
    pub async fn get_job_detail(&self, job_id: &str) -> Result<PostJobDetail, ApiError> {
        let job = self.get_job(job_id).await?;
        let product = self.product_service.get_product(&job.product_id).await?;
        let events = self.event_service.list_for_job(job_id).await?;

        Ok(PostJobDetail {
            job,
            product,
            events,
        })
    }

    pub async fn get_events(&self, job_id: &str) -> Result<Vec<ChannelEvent>, ApiError> {
        let job = self.get_job(job_id).await?;
        Ok(self.event_service.list_for_job(&job.id).await?)
    }

    /// Lista jobs (máx. 50) filtrando por estado y/o canal seleccionado.
    pub async fn list_posts(&self, query: &ListPostsQuery) -> Result<Vec<PostJobListItem>> {
        let channel_path = query.channel.map(|c| format!("$.{}", c.as_str()));
        let sql = format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM post_jobs
            WHERE (?1 IS NULL OR status = ?1)
              AND (?2 IS NULL OR json_extract(channels, ?2) = 1)
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?3
            "#
        );

        let rows = sqlx::query_as::<_, PostJobRow>(&sql)
            .bind(query.status.map(|s| s.as_str()))
            .bind(channel_path)
            .bind(LIST_LIMIT)
            .fetch_all(&self.db_pool)
            .await
            .context("Error listando post_jobs")?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let job = PostJobRecord::try_from(row)?;
            let product = self
                .product_service
                .find_product(&job.product_id)
                .await?
                .as_ref()
                .map(ProductSummary::from);
            let events = self
                .event_service
                .latest_for_job(&job.id, LIST_EVENTS)
                .await?;
            items.push(PostJobListItem {
                job,
                product,
                events,
            });
        }
        Ok(items)
    }

    /// Relee el historial completo, recalcula y escribe con compare-and-set.
    ///
    /// La versión es la cantidad de eventos leídos; una escritura basada en un
    /// snapshot más viejo (o igual) que el guardado se descarta. Devuelve el
    /// estado que quedó persistido.
    pub async fn recompute_status(&self, job_id: &str) -> Result<PostJobStatus, ApiError> {
        let job = self.get_job(job_id).await?;
        let events = self.event_service.list_for_job(job_id).await?;

        let version = events.len() as i64;
        let status = compute_status(&job.channels.selected(), &events);

        if self.write_status_if_newer(job_id, status, version).await? {
            log::info!(
                "(recompute_status) Job {} -> {} (version {})",
                job_id,
                status,
                version
            );
            Ok(status)
        } else {
            // Otro recálculo con más eventos ya escribió; su estado es el vigente.
            let current = self.get_job(job_id).await?;
            log::info!(
                "(recompute_status) Escritura obsoleta descartada para job {} (version {} <= {}), queda {}",
                job_id,
                version,
                current.status_version,
                current.status
            );
            Ok(current.status)
        }
    }

    /// `UPDATE ... WHERE status_version < version`. `false` si se descartó.
    pub async fn write_status_if_newer(
        &self,
        job_id: &str,
        status: PostJobStatus,
        version: i64,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE post_jobs
            SET status = ?2,
                status_version = ?3,
                updated_at = ?4
            WHERE id = ?1 AND status_version < ?3
            "#,
        )
        .bind(job_id)
        .bind(status.as_str())
        .bind(version)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db_pool)
        .await
        .context("Fallo al actualizar estado del post_job")?;

        Ok(result.rows_affected() == 1)
    }
}
