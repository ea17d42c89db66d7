use std::collections::BTreeSet;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    channel_event_model::{Channel, ChannelEvent},
    parse_json, parse_ts,
    product_model::{ProductRecord, ProductSummary},
};

db_enum! {
    /// Estado agregado del job. `queued` solo existe antes del primer evento.
    PostJobStatus {
        Queued => "queued",
        Running => "running",
        Partial => "partial",
        Success => "success",
        Error => "error",
    }
}

/// Canales elegidos al crear el job; no cambian después.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSelection {
    #[serde(default)]
    pub instagram: bool,
    #[serde(default)]
    pub pinterest: bool,
    #[serde(default)]
    pub whatsapp: bool,
}

impl ChannelSelection {
    pub fn selected(&self) -> BTreeSet<Channel> {
        [
            (Channel::Instagram, self.instagram),
            (Channel::Pinterest, self.pinterest),
            (Channel::Whatsapp, self.whatsapp),
        ]
        .into_iter()
        .filter_map(|(channel, on)| on.then_some(channel))
        .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostJobRecord {
    pub id: String,
    pub product_id: String,
    pub channels: ChannelSelection,
    pub context: Value,
    pub status: PostJobStatus,
    pub status_version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct PostJobRow {
    pub id: String,
    pub product_id: String,
    pub channels: String,
    pub context: String,
    pub status: String,
    pub status_version: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<PostJobRow> for PostJobRecord {
    type Error = anyhow::Error;

    fn try_from(row: PostJobRow) -> Result<Self> {
        Ok(PostJobRecord {
            channels: serde_json::from_str(&row.channels)
                .context("Selección de canales inválida en DB")?,
            context: parse_json(&row.context)?,
            status: row.status.parse()?,
            status_version: row.status_version,
            created_at: parse_ts(&row.created_at)?,
            updated_at: parse_ts(&row.updated_at)?,
            id: row.id,
            product_id: row.product_id,
        })
    }
}

/// Request para crear un job de publicación
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    pub product_id: String,
    pub channels: ChannelSelection,
    pub context: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListPostsQuery {
    pub status: Option<PostJobStatus>,
    pub channel: Option<Channel>,
}

/// Item del listado: resumen del producto y los últimos eventos.
#[derive(Debug, Clone, Serialize)]
pub struct PostJobListItem {
    #[serde(flatten)]
    pub job: PostJobRecord,
    pub product: Option<ProductSummary>,
    pub events: Vec<ChannelEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostJobDetail {
    #[serde(flatten)]
    pub job: PostJobRecord,
    pub product: ProductRecord,
    pub events: Vec<ChannelEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostJobWithEvents {
    #[serde(flatten)]
    pub job: PostJobRecord,
    pub events: Vec<ChannelEvent>,
}

/// Payload que se envía al workflow de n8n (camelCase en el cable).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowPayload {
    pub post_job_id: String,
    pub backend_base_url: String,
    pub channels: ChannelSelection,
    pub product: WorkflowProduct,
    pub context: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowProduct {
    pub id: String,
    pub marketplace: String,
    pub title: String,
    pub price_cents: i64,
    pub currency: String,
    pub rating: Option<String>,
    pub review_count: Option<i64>,
    pub seller_name: Option<String>,
    pub category: Option<String>,
    pub images: Vec<String>,
    pub url_affiliate: String,
}

impl From<&ProductRecord> for WorkflowProduct {
    fn from(p: &ProductRecord) -> Self {
        WorkflowProduct {
            id: p.id.clone(),
            marketplace: p.marketplace.to_string(),
            title: p.title.clone(),
            price_cents: p.price_cents,
            currency: p.currency.clone(),
            rating: p.rating.map(|r| r.to_string()),
            review_count: p.review_count,
            seller_name: p.seller_name.clone(),
            category: p.category.clone(),
            images: p.images.clone(),
            url_affiliate: p.url_affiliate.clone(),
        }
    }
}
