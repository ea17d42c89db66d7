use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Url;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::{
    errors::ApiError,
    models::{
        link_model::{
            AffiliateLinkRecord, AffiliateLinkRow, CreateLinkRequest, CreateLinkResponse,
            LinkDetail, LinkListItem, ListLinksQuery, Marketplace, ScrapeRunStatus,
            TriggerScrapeResponse,
        },
        product_model::ProductSummary,
    },
    services::{
        product_service::ProductService, queue_service::QueueService,
        scrape_run_service::ScrapeRunService,
    },
};

#[derive(Clone, Debug)]
pub struct LinkService {
    db_pool: Pool<Sqlite>,
    queue_service: QueueService,
    scrape_run_service: ScrapeRunService,
    product_service: ProductService,
}

impl LinkService {
    pub fn new(
        db_pool: Pool<Sqlite>,
        queue_service: QueueService,
        scrape_run_service: ScrapeRunService,
        product_service: ProductService,
    ) -> Self {
        LinkService {
            db_pool,
            queue_service,
            scrape_run_service,
            product_service,
        }
    }

    /// Registra el link, crea la corrida de scraping y la encola.
    pub async fn create_link(&self, req: CreateLinkRequest) -> Result<CreateLinkResponse, ApiError> {
        let url = parse_http_url(&req.url)?;
        let marketplace = detect_marketplace(&url)?;
        let normalized_url = normalize_url(&url);

        let link_id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO affiliate_links (
                id, raw_url, normalized_url, marketplace, is_active, product_id, created_at
            )
            VALUES (?1, ?2, ?3, ?4, 1, NULL, ?5)
            "#,
        )
        .bind(&link_id)
        .bind(req.url.trim())
        .bind(&normalized_url)
        .bind(marketplace.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar affiliate_link")?;

        let scrape_run_id = self.scrape_run_service.create_queued(&link_id).await?;
        self.queue_service.enqueue_scrape(&link_id).await?;

        log::info!(
            "(create_link) Link {} ({}) registrado, scrape run {}",
            link_id,
            marketplace,
            scrape_run_id
        );

        Ok(CreateLinkResponse {
            affiliate_link_id: link_id,
            scrape_run_id,
            normalized_url,
            marketplace,
        })
    }

    pub async fn list_links(&self, query: &ListLinksQuery) -> Result<Vec<LinkListItem>> {
        let rows = sqlx::query_as::<_, AffiliateLinkRow>(
            r#"
            SELECT id, raw_url, normalized_url, marketplace, is_active, product_id, created_at
            FROM affiliate_links
            WHERE (?1 IS NULL OR marketplace = ?1)
              AND (?2 IS NULL OR is_active = ?2)
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(query.marketplace.map(|m| m.as_str()))
        .bind(query.is_active.map(i64::from))
        .fetch_all(&self.db_pool)
        .await
        .context("Error listando affiliate_links")?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let link = AffiliateLinkRecord::try_from(row)?;
            let product = match link.product_id.as_deref() {
                Some(product_id) => self
                    .product_service
                    .find_product(product_id)
                    .await?
                    .as_ref()
                    .map(ProductSummary::from),
                None => None,
            };
            let latest_scrape_run = self
                .scrape_run_service
                .list_for_link(&link.id)
                .await?
                .into_iter()
                .next();
            items.push(LinkListItem {
                link,
                product,
                latest_scrape_run,
            });
        }
        Ok(items)
    }

    pub async fn get_link(&self, link_id: &str) -> Result<AffiliateLinkRecord, ApiError> {
        let row = sqlx::query_as::<_, AffiliateLinkRow>(
            r#"
            SELECT id, raw_url, normalized_url, marketplace, is_active, product_id, created_at
            FROM affiliate_links
            WHERE id = ?1
            "#,
        )
        .bind(link_id)
        .fetch_optional(&self.db_pool)
        .await
        .context("Error buscando affiliate_link")?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Affiliate link with ID {} not found", link_id))
        })?;

        Ok(AffiliateLinkRecord::try_from(row)?)
    }

    pub async fn get_link_detail(&self, link_id: &str) -> Result<LinkDetail, ApiError> {
        let link = self.get_link(link_id).await?;
        let product = match link.product_id.as_deref() {
            Some(product_id) => self.product_service.find_product(product_id).await?,
            None => None,
        };
        let scrape_runs = self.scrape_run_service.list_for_link(link_id).await?;

        Ok(LinkDetail {
            link,
            product,
            scrape_runs,
        })
    }

    /// Nueva corrida de scraping para un link existente.
    pub async fn trigger_scrape(&self, link_id: &str) -> Result<TriggerScrapeResponse, ApiError> {
        let link = self.get_link(link_id).await?;

        let scrape_run_id = self.scrape_run_service.create_queued(&link.id).await?;
        self.queue_service.enqueue_scrape(&link.id).await?;

        log::info!(
            "(trigger_scrape) Re-scrape de link {} encolado (run {})",
            link.id,
            scrape_run_id
        );
        Ok(TriggerScrapeResponse {
            scrape_run_id,
            status: ScrapeRunStatus::Queued,
        })
    }
}

fn parse_http_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ApiError::BadRequest(format!("url must be a URL address: {}", e)))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(ApiError::BadRequest(
            "url must be an http(s) URL address".to_string(),
        )),
    }
}

/// Mismo criterio que el scraper: se mira solo el host.
pub fn detect_marketplace(url: &Url) -> Result<Marketplace, ApiError> {
    let host = url.host_str().unwrap_or_default().to_lowercase();

    if host.contains("mercadolivre") || host.contains("mercadolibre") {
        Ok(Marketplace::MercadoLivre)
    } else if host.contains("magazineluiza") || host.contains("magalu") {
        Ok(Marketplace::Magalu)
    } else if host.contains("shopee") {
        Ok(Marketplace::Shopee)
    } else {
        Err(ApiError::BadRequest(
            "Marketplace not supported. Only Mercado Livre, Magalu, and Shopee are supported."
                .to_string(),
        ))
    }
}

fn normalize_url(url: &Url) -> String {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized.to_string()
}
