use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    link_model::{AffiliateLinkRecord, Marketplace},
    parse_json, parse_ts,
    post_job_model::PostJobWithEvents,
};

fn default_currency() -> String {
    "BRL".to_string()
}

/// Datos de producto tal como los entrega el scraper externo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductData {
    pub marketplace: Marketplace,
    pub canonical_product_id: Option<String>,
    pub title: String,
    pub price_cents: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub rating: Option<f64>,
    pub review_count: Option<i64>,
    pub seller_name: Option<String>,
    pub category: Option<String>,
    pub main_image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub url_affiliate: String,
    pub url_canonical: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductRecord {
    pub id: String,
    pub marketplace: Marketplace,
    pub canonical_product_id: Option<String>,
    pub title: String,
    pub price_cents: i64,
    pub currency: String,
    pub rating: Option<f64>,
    pub review_count: Option<i64>,
    pub seller_name: Option<String>,
    pub category: Option<String>,
    pub main_image_url: Option<String>,
    pub images: Vec<String>,
    pub url_affiliate: String,
    pub url_canonical: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ProductRow {
    pub id: String,
    pub marketplace: String,
    pub canonical_product_id: Option<String>,
    pub title: String,
    pub price_cents: i64,
    pub currency: String,
    pub rating: Option<f64>,
    pub review_count: Option<i64>,
    pub seller_name: Option<String>,
    pub category: Option<String>,
    pub main_image_url: Option<String>,
    pub images: String,
    pub url_affiliate: String,
    pub url_canonical: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<ProductRow> for ProductRecord {
    type Error = anyhow::Error;

    fn try_from(row: ProductRow) -> Result<Self> {
        Ok(ProductRecord {
            marketplace: row.marketplace.parse()?,
            images: serde_json::from_str(&row.images).context("Lista de imágenes inválida")?,
            created_at: parse_ts(&row.created_at)?,
            updated_at: parse_ts(&row.updated_at)?,
            id: row.id,
            canonical_product_id: row.canonical_product_id,
            title: row.title,
            price_cents: row.price_cents,
            currency: row.currency,
            rating: row.rating,
            review_count: row.review_count,
            seller_name: row.seller_name,
            category: row.category,
            main_image_url: row.main_image_url,
            url_affiliate: row.url_affiliate,
            url_canonical: row.url_canonical,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub id: String,
    pub title: String,
    pub marketplace: Marketplace,
    pub price_cents: i64,
    pub main_image_url: Option<String>,
}

impl From<&ProductRecord> for ProductSummary {
    fn from(p: &ProductRecord) -> Self {
        ProductSummary {
            id: p.id.clone(),
            title: p.title.clone(),
            marketplace: p.marketplace,
            price_cents: p.price_cents,
            main_image_url: p.main_image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductVersionRecord {
    pub id: String,
    pub product_id: String,
    pub snapshot: Value,
    pub scraped_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ProductVersionRow {
    pub id: String,
    pub product_id: String,
    pub snapshot: String,
    pub scraped_at: String,
}

impl TryFrom<ProductVersionRow> for ProductVersionRecord {
    type Error = anyhow::Error;

    fn try_from(row: ProductVersionRow) -> Result<Self> {
        Ok(ProductVersionRecord {
            snapshot: parse_json(&row.snapshot)?,
            scraped_at: parse_ts(&row.scraped_at)?,
            id: row.id,
            product_id: row.product_id,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductRecord,
    pub versions: Vec<ProductVersionRecord>,
    pub affiliate_links: Vec<AffiliateLinkRecord>,
    pub post_jobs: Vec<PostJobWithEvents>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListProductsQuery {
    pub search: Option<String>,
    pub marketplace: Option<Marketplace>,
}
