//! handlers/mod.rs
//! Módulo que agrupa los handlers HTTP (links, productos, posts, webhooks...).
pub mod link_handler;
pub mod post_handler;
pub mod product_handler;
pub mod scrape_run_handler;
pub mod webhook_handler;
