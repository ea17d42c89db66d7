//! tests/mod.rs
//! Helpers compartidos por las pruebas: DB en memoria y datos de ejemplo.

/// App de actix con los servicios y rutas reales, lista para `test::call_service`.
macro_rules! test_app {
    ($services:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .configure(|cfg| $services.register(cfg))
                .configure($crate::app::init_app),
        )
        .await
    };
}

mod api_tests;
mod signature_tests;

use chrono::Utc;
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use uuid::Uuid;

use crate::{
    app::AppServices,
    config::app_config::AppConfig,
    db,
    models::{
        channel_event_model::{Channel, ChannelEvent, Outcome, Stage},
        link_model::{CreateLinkRequest, Marketplace},
        post_job_model::ChannelSelection,
        product_model::{ProductData, ProductRecord},
    },
};

/// SQLite en memoria: una sola conexión que no se recicla, si no se pierde la DB.
pub async fn test_pool() -> Pool<Sqlite> {
    crate::logger::init_test_logger();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("No se pudo abrir SQLite en memoria");
    db::run_migrations(&pool)
        .await
        .expect("Fallo en migraciones de test");
    pool
}

pub fn test_config(n8n_base_url: Option<String>, secret: Option<&str>) -> AppConfig {
    AppConfig {
        n8n_base_url,
        n8n_webhook_path: Some("/webhook/post-product".to_string()),
        n8n_callback_secret: secret.map(str::to_string),
        ..AppConfig::default()
    }
}

pub async fn test_services(config: &AppConfig) -> (Pool<Sqlite>, AppServices) {
    let pool = test_pool().await;
    let services = AppServices::new(pool.clone(), config).expect("Servicios de test");
    (pool, services)
}

pub fn product_data(canonical: &str, title: &str) -> ProductData {
    ProductData {
        marketplace: Marketplace::MercadoLivre,
        canonical_product_id: Some(canonical.to_string()),
        title: title.to_string(),
        price_cents: 12990,
        currency: "BRL".to_string(),
        rating: Some(4.7),
        review_count: Some(321),
        seller_name: Some("Loja Oficial".to_string()),
        category: Some("Eletrônicos".to_string()),
        main_image_url: Some("https://http2.mlstatic.com/img-1.jpg".to_string()),
        images: vec!["https://http2.mlstatic.com/img-1.jpg".to_string()],
        url_affiliate: format!("https://mercadolivre.com/sec/{}", canonical),
        url_canonical: Some(format!("https://produto.mercadolivre.com.br/{}", canonical)),
    }
}

/// Producto creado por el camino real: link -> scrape run -> complete.
pub async fn seed_product(services: &AppServices, canonical: &str, title: &str) -> ProductRecord {
    let link = services
        .link_service
        .create_link(CreateLinkRequest {
            url: format!("https://produto.mercadolivre.com.br/{}-fone", canonical),
        })
        .await
        .expect("create_link");
    services
        .scrape_run_service
        .complete(&link.scrape_run_id, &product_data(canonical, title))
        .await
        .expect("complete scrape")
}

/// Inserta un job directo en DB (sin pasar por n8n).
pub async fn seed_job(pool: &Pool<Sqlite>, product_id: &str, channels: &ChannelSelection) -> String {
    let job_id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        r#"
        INSERT INTO post_jobs (id, product_id, channels, context, status, status_version, created_at, updated_at)
        VALUES (?1, ?2, ?3, '{}', 'queued', 0, ?4, ?4)
        "#,
    )
    .bind(&job_id)
    .bind(product_id)
    .bind(serde_json::to_string(channels).unwrap())
    .bind(now)
    .execute(pool)
    .await
    .expect("insert post_job");
    job_id
}

pub fn selection(instagram: bool, pinterest: bool, whatsapp: bool) -> ChannelSelection {
    ChannelSelection {
        instagram,
        pinterest,
        whatsapp,
    }
}

pub fn event(channel: Channel, stage: Stage, outcome: Outcome) -> ChannelEvent {
    ChannelEvent {
        id: Uuid::new_v4().to_string(),
        seq: 0,
        post_job_id: "job".to_string(),
        channel,
        stage,
        outcome,
        detail: None::<Value>,
        created_at: Utc::now(),
    }
}
