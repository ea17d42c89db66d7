use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    parse_opt_ts, parse_ts,
    product_model::{ProductData, ProductRecord, ProductSummary},
};

db_enum! {
    Marketplace {
        MercadoLivre => "mercado_livre",
        Magalu => "magalu",
        Shopee => "shopee",
    }
}

db_enum! {
    ScrapeRunStatus {
        Queued => "queued",
        Running => "running",
        Success => "success",
        Error => "error",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AffiliateLinkRecord {
    pub id: String,
    pub raw_url: String,
    pub normalized_url: String,
    pub marketplace: Marketplace,
    pub is_active: bool,
    pub product_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct AffiliateLinkRow {
    pub id: String,
    pub raw_url: String,
    pub normalized_url: String,
    pub marketplace: String,
    pub is_active: i64,
    pub product_id: Option<String>,
    pub created_at: String,
}

impl TryFrom<AffiliateLinkRow> for AffiliateLinkRecord {
    type Error = anyhow::Error;

    fn try_from(row: AffiliateLinkRow) -> Result<Self> {
        Ok(AffiliateLinkRecord {
            marketplace: row.marketplace.parse()?,
            created_at: parse_ts(&row.created_at)?,
            id: row.id,
            raw_url: row.raw_url,
            normalized_url: row.normalized_url,
            is_active: row.is_active != 0,
            product_id: row.product_id,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapeRunRecord {
    pub id: String,
    pub affiliate_link_id: String,
    pub status: ScrapeRunStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ScrapeRunRow {
    pub id: String,
    pub affiliate_link_id: String,
    pub status: String,
    pub error: Option<String>,
    pub created_at: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
}

impl TryFrom<ScrapeRunRow> for ScrapeRunRecord {
    type Error = anyhow::Error;

    fn try_from(row: ScrapeRunRow) -> Result<Self> {
        Ok(ScrapeRunRecord {
            status: row.status.parse()?,
            created_at: parse_ts(&row.created_at)?,
            started_at: parse_opt_ts(row.started_at)?,
            finished_at: parse_opt_ts(row.finished_at)?,
            id: row.id,
            affiliate_link_id: row.affiliate_link_id,
            error: row.error,
        })
    }
}

/// POST /api/links
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLinkRequest {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateLinkResponse {
    pub affiliate_link_id: String,
    pub scrape_run_id: String,
    pub normalized_url: String,
    pub marketplace: Marketplace,
}

#[derive(Debug, Clone, Serialize)]
pub struct TriggerScrapeResponse {
    pub scrape_run_id: String,
    pub status: ScrapeRunStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListLinksQuery {
    pub marketplace: Option<Marketplace>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkListItem {
    #[serde(flatten)]
    pub link: AffiliateLinkRecord,
    /// Resumen del producto si el link ya fue scrapeado.
    pub product: Option<ProductSummary>,
    pub latest_scrape_run: Option<ScrapeRunRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkDetail {
    #[serde(flatten)]
    pub link: AffiliateLinkRecord,
    pub product: Option<ProductRecord>,
    pub scrape_runs: Vec<ScrapeRunRecord>,
}

/// Callbacks del scraper externo
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteScrapeRequest {
    pub product: ProductData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FailScrapeRequest {
    pub error: String,
}
