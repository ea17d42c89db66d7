//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod channel_event_service;
pub mod link_service;
pub mod post_job_service;
pub mod product_service;
pub mod queue_service;
pub mod scrape_run_service;
pub mod signature;
pub mod status_aggregator;
pub mod webhook_service;
pub mod workflow_trigger;
