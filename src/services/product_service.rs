use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::{
    errors::ApiError,
    models::{
        link_model::{AffiliateLinkRecord, AffiliateLinkRow},
        post_job_model::{PostJobRecord, PostJobRow, PostJobWithEvents},
        product_model::{
            ListProductsQuery, ProductData, ProductDetail, ProductRecord, ProductRow,
            ProductVersionRecord, ProductVersionRow,
        },
    },
    services::channel_event_service::ChannelEventService,
};

const PRODUCT_COLUMNS: &str = r#"
    id, marketplace, canonical_product_id, title, price_cents, currency,
    rating, review_count, seller_name, category, main_image_url, images,
    url_affiliate, url_canonical, created_at, updated_at
"#;

const LIST_LIMIT: i64 = 50;

#[derive(Clone, Debug)]
pub struct ProductService {
    db_pool: Pool<Sqlite>,
    event_service: ChannelEventService,
}

impl ProductService {
    pub fn new(db_pool: Pool<Sqlite>, event_service: ChannelEventService) -> Self {
        ProductService {
            db_pool,
            event_service,
        }
    }

    /// Lista productos (máx. 50), búsqueda por título sin distinguir mayúsculas.
    pub async fn list_products(&self, query: &ListProductsQuery) -> Result<Vec<ProductRecord>> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.to_lowercase()));

        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE (?1 IS NULL OR lower(title) LIKE ?1)
              AND (?2 IS NULL OR marketplace = ?2)
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?3
            "#
        );

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(search)
            .bind(query.marketplace.map(|m| m.as_str()))
            .bind(LIST_LIMIT)
            .fetch_all(&self.db_pool)
            .await
            .context("Error listando productos")?;

        rows.into_iter().map(ProductRecord::try_from).collect()
    }

    pub async fn find_product(&self, product_id: &str) -> Result<Option<ProductRecord>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(product_id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Error buscando producto")?;

        row.map(ProductRecord::try_from).transpose()
    }

    pub async fn get_product(&self, product_id: &str) -> Result<ProductRecord, ApiError> {
        self.find_product(product_id).await?.ok_or_else(|| {
            ApiError::NotFound(format!("Product with ID {} not found", product_id))
        })
    }

    /// Producto con versiones, links activos y jobs de publicación (con eventos).
    pub async fn get_product_detail(&self, product_id: &str) -> Result<ProductDetail, ApiError> {
        let product = self.get_product(product_id).await?;

        let versions = sqlx::query_as::<_, ProductVersionRow>(
            r#"
            SELECT id, product_id, snapshot, scraped_at
            FROM product_versions
            WHERE product_id = ?1
            ORDER BY scraped_at DESC, rowid DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db_pool)
        .await
        .context("Error listando versiones")?
        .into_iter()
        .map(ProductVersionRecord::try_from)
        .collect::<Result<Vec<_>>>()?;

        let affiliate_links = sqlx::query_as::<_, AffiliateLinkRow>(
            r#"
            SELECT id, raw_url, normalized_url, marketplace, is_active, product_id, created_at
            FROM affiliate_links
            WHERE product_id = ?1 AND is_active = 1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db_pool)
        .await
        .context("Error listando links del producto")?
        .into_iter()
        .map(AffiliateLinkRecord::try_from)
        .collect::<Result<Vec<_>>>()?;

        let job_rows = sqlx::query_as::<_, PostJobRow>(
            r#"
            SELECT id, product_id, channels, context, status, status_version,
                   created_at, updated_at
            FROM post_jobs
            WHERE product_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db_pool)
        .await
        .context("Error listando post jobs del producto")?;

        let mut post_jobs = Vec::with_capacity(job_rows.len());
        for row in job_rows {
            let job = PostJobRecord::try_from(row)?;
            let events = self.event_service.list_for_job(&job.id).await?;
            post_jobs.push(PostJobWithEvents { job, events });
        }

        Ok(ProductDetail {
            product,
            versions,
            affiliate_links,
            post_jobs,
        })
    }

    /// Crea o actualiza el producto por (marketplace, canonical_product_id) y
    /// guarda un snapshot. Corre dentro de la transacción del caller.
    pub async fn upsert_product(
        conn: &mut SqliteConnection,
        data: &ProductData,
    ) -> Result<String> {
        let now = Utc::now().to_rfc3339();
        let images = serde_json::to_string(&data.images)?;

        // Sin canonical_product_id no hay forma de deduplicar: siempre se crea.
        let existing: Option<(String,)> = match data.canonical_product_id.as_deref() {
            Some(canonical) => sqlx::query_as(
                "SELECT id FROM products WHERE marketplace = ?1 AND canonical_product_id = ?2",
            )
            .bind(data.marketplace.as_str())
            .bind(canonical)
            .fetch_optional(&mut *conn)
            .await
            .context("Error buscando producto existente")?,
            None => None,
        };

        let product_id = match existing {
            Some((id,)) => {
                sqlx::query(
                    r#"
                    UPDATE products
                    SET title = ?2, price_cents = ?3, currency = ?4, rating = ?5,
                        review_count = ?6, seller_name = ?7, category = ?8,
                        main_image_url = ?9, images = ?10, url_affiliate = ?11,
                        url_canonical = ?12, updated_at = ?13
                    WHERE id = ?1
                    "#,
                )
                .bind(&id)
                .bind(&data.title)
                .bind(data.price_cents)
                .bind(&data.currency)
                .bind(data.rating)
                .bind(data.review_count)
                .bind(&data.seller_name)
                .bind(&data.category)
                .bind(&data.main_image_url)
                .bind(&images)
                .bind(&data.url_affiliate)
                .bind(&data.url_canonical)
                .bind(&now)
                .execute(&mut *conn)
                .await
                .context("Fallo al actualizar producto")?;

                log::info!("(upsert_product) Producto {} actualizado", id);
                id
            }
            None => {
                let id = Uuid::new_v4().to_string();
                sqlx::query(
                    r#"
                    INSERT INTO products (
                        id, marketplace, canonical_product_id, title, price_cents, currency,
                        rating, review_count, seller_name, category, main_image_url, images,
                        url_affiliate, url_canonical, created_at, updated_at
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?15)
                    "#,
                )
                .bind(&id)
                .bind(data.marketplace.as_str())
                .bind(&data.canonical_product_id)
                .bind(&data.title)
                .bind(data.price_cents)
                .bind(&data.currency)
                .bind(data.rating)
                .bind(data.review_count)
                .bind(&data.seller_name)
                .bind(&data.category)
                .bind(&data.main_image_url)
                .bind(&images)
                .bind(&data.url_affiliate)
                .bind(&data.url_canonical)
                .bind(&now)
                .execute(&mut *conn)
                .await
                .context("Fallo al insertar producto")?;

                log::info!("(upsert_product) Producto {} creado", id);
                id
            }
        };

        sqlx::query(
            r#"
            INSERT INTO product_versions (id, product_id, snapshot, scraped_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&product_id)
        .bind(serde_json::to_string(data)?)
        .bind(&now)
        .execute(&mut *conn)
        .await
        .context("Fallo al guardar snapshot del producto")?;

        Ok(product_id)
    }
}
