use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::{
    errors::ApiError,
    models::{
        link_model::{ScrapeRunRecord, ScrapeRunRow, ScrapeRunStatus},
        product_model::{ProductData, ProductRecord},
    },
    services::product_service::ProductService,
};

/// Ciclo de vida de una corrida: queued -> running -> success | error.
#[derive(Clone, Debug)]
pub struct ScrapeRunService {
    db_pool: Pool<Sqlite>,
    product_service: ProductService,
}

impl ScrapeRunService {
    pub fn new(db_pool: Pool<Sqlite>, product_service: ProductService) -> Self {
        ScrapeRunService {
            db_pool,
            product_service,
        }
    }

    pub async fn create_queued(&self, affiliate_link_id: &str) -> Result<String> {
        let run_id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO scrape_runs (id, affiliate_link_id, status, error, created_at)
            VALUES (?1, ?2, ?3, NULL, ?4)
            "#,
        )
        .bind(&run_id)
        .bind(affiliate_link_id)
        .bind(ScrapeRunStatus::Queued.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db_pool)
        .await
        .context("Error creando scrape_run")?;

        Ok(run_id)
    }

    pub async fn get_run(&self, run_id: &str) -> Result<ScrapeRunRecord, ApiError> {
        let row = sqlx::query_as::<_, ScrapeRunRow>(
            r#"
            SELECT id, affiliate_link_id, status, error, created_at, started_at, finished_at
            FROM scrape_runs
            WHERE id = ?1
            "#,
        )
        .bind(run_id)
        .fetch_optional(&self.db_pool)
        .await
        .context("Error buscando scrape_run")?
        .ok_or_else(|| ApiError::NotFound(format!("Scrape run with ID {} not found", run_id)))?;

        Ok(ScrapeRunRecord::try_from(row)?)
    }

    /// Corridas de un link, la más reciente primero.
    pub async fn list_for_link(&self, affiliate_link_id: &str) -> Result<Vec<ScrapeRunRecord>> {
        let rows = sqlx::query_as::<_, ScrapeRunRow>(
            r#"
            SELECT id, affiliate_link_id, status, error, created_at, started_at, finished_at
            FROM scrape_runs
            WHERE affiliate_link_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(affiliate_link_id)
        .fetch_all(&self.db_pool)
        .await
        .context("Error listando scrape_runs")?;

        rows.into_iter().map(ScrapeRunRecord::try_from).collect()
    }

    /// queued -> running. La condición de estado va en el propio UPDATE.
    pub async fn mark_running(&self, run_id: &str) -> Result<ScrapeRunRecord, ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE scrape_runs
            SET status = ?2, started_at = ?3
            WHERE id = ?1 AND status = 'queued'
            "#,
        )
        .bind(run_id)
        .bind(ScrapeRunStatus::Running.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db_pool)
        .await
        .context("Error marcando scrape_run running")?;

        if result.rows_affected() == 0 {
            return Err(self.transition_rejected(run_id).await);
        }

        log::info!("(mark_running) Scrape run {} en running", run_id);
        self.get_run(run_id).await
    }

    /// Guarda el producto scrapeado y cierra la corrida, todo en una transacción.
    ///
    /// La corrida se cierra primero (UPDATE condicionado al estado abierto); si
    /// otro callback ya la cerró no se toca el producto.
    pub async fn complete(
        &self,
        run_id: &str,
        data: &ProductData,
    ) -> Result<ProductRecord, ApiError> {
        let run = self.get_run(run_id).await?;

        let mut tx = self
            .db_pool
            .begin()
            .await
            .context("No se pudo abrir transacción")?;

        let now = Utc::now().to_rfc3339();
        let closed = sqlx::query(
            r#"
            UPDATE scrape_runs
            SET status = ?2,
                started_at = COALESCE(started_at, ?3),
                finished_at = ?3
            WHERE id = ?1 AND status IN ('queued', 'running')
            "#,
        )
        .bind(run_id)
        .bind(ScrapeRunStatus::Success.as_str())
        .bind(&now)
        .execute(&mut *tx)
        .await
        .context("Error cerrando scrape_run")?;

        if closed.rows_affected() == 0 {
            tx.rollback().await.context("Fallo rollback de scrape")?;
            return Err(self.transition_rejected(run_id).await);
        }

        let product_id = ProductService::upsert_product(&mut *tx, data).await?;

        sqlx::query("UPDATE affiliate_links SET product_id = ?2 WHERE id = ?1")
            .bind(&run.affiliate_link_id)
            .bind(&product_id)
            .execute(&mut *tx)
            .await
            .context("Error vinculando link con producto")?;

        tx.commit().await.context("Fallo commit de scrape")?;

        log::info!(
            "(complete) Scrape run {} OK, producto {} (link {})",
            run_id,
            product_id,
            run.affiliate_link_id
        );
        self.product_service.get_product(&product_id).await
    }

    pub async fn fail(&self, run_id: &str, error: &str) -> Result<ScrapeRunRecord, ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE scrape_runs
            SET status = ?2, error = ?3, finished_at = ?4
            WHERE id = ?1 AND status IN ('queued', 'running')
            "#,
        )
        .bind(run_id)
        .bind(ScrapeRunStatus::Error.as_str())
        .bind(error)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db_pool)
        .await
        .context("Error marcando scrape_run con error")?;

        if result.rows_affected() == 0 {
            return Err(self.transition_rejected(run_id).await);
        }

        log::error!("(fail) Scrape run {} falló: {}", run_id, error);
        self.get_run(run_id).await
    }

    /// Error para un UPDATE que no afectó filas: 404 si la corrida no existe,
    /// 409 con su estado actual si ya no admitía la transición.
    async fn transition_rejected(&self, run_id: &str) -> ApiError {
        match self.get_run(run_id).await {
            Ok(run) => {
                log::warn!(
                    "(transition_rejected) Scrape run {} ya está en {}",
                    run_id,
                    run.status
                );
                ApiError::Conflict(format!(
                    "Scrape run {} is already {}",
                    run_id, run.status
                ))
            }
            Err(e) => e,
        }
    }
}
