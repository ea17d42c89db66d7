//! app.rs
use actix_web::web;
use anyhow::Result;
use sqlx::{Pool, Sqlite};

use crate::{
    config::app_config::AppConfig,
    errors::ApiError,
    handlers::{
        link_handler, post_handler, product_handler, scrape_run_handler, webhook_handler,
    },
    services::{
        channel_event_service::ChannelEventService, link_service::LinkService,
        post_job_service::PostJobService, product_service::ProductService,
        queue_service::QueueService, scrape_run_service::ScrapeRunService,
        signature::SignatureVerifier, webhook_service::WebhookService,
        workflow_trigger::WorkflowTrigger,
    },
};

/// Servicios compartidos por todos los workers de actix.
#[derive(Clone)]
pub struct AppServices {
    pub link_service: LinkService,
    pub scrape_run_service: ScrapeRunService,
    pub product_service: ProductService,
    pub post_job_service: PostJobService,
    pub webhook_service: WebhookService,
}

impl AppServices {
    pub fn new(db_pool: Pool<Sqlite>, config: &AppConfig) -> Result<Self> {
        let event_service = ChannelEventService::new(db_pool.clone());
        let queue_service = QueueService::new(db_pool.clone());
        let product_service = ProductService::new(db_pool.clone(), event_service.clone());
        let scrape_run_service = ScrapeRunService::new(db_pool.clone(), product_service.clone());
        let link_service = LinkService::new(
            db_pool.clone(),
            queue_service,
            scrape_run_service.clone(),
            product_service.clone(),
        );
        let post_job_service = PostJobService::new(
            db_pool,
            product_service.clone(),
            event_service.clone(),
            WorkflowTrigger::new(config)?,
            config.backend_base_url.clone(),
        );
        let webhook_service = WebhookService::new(
            post_job_service.clone(),
            event_service,
            SignatureVerifier::new(config.n8n_callback_secret.clone()),
        );

        Ok(AppServices {
            link_service,
            scrape_run_service,
            product_service,
            post_job_service,
            webhook_service,
        })
    }

    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.link_service.clone()))
            .app_data(web::Data::new(self.scrape_run_service.clone()))
            .app_data(web::Data::new(self.product_service.clone()))
            .app_data(web::Data::new(self.post_job_service.clone()))
            .app_data(web::Data::new(self.webhook_service.clone()));
    }
}

pub fn init_app(cfg: &mut web::ServiceConfig) {
    // Errores de extractores con el mismo formato JSON que el resto de la API
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    );

    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/links")
                    .route("", web::post().to(link_handler::create_link_endpoint))
                    .route("", web::get().to(link_handler::list_links_endpoint))
                    .route("/{id}", web::get().to(link_handler::get_link_endpoint))
                    .route(
                        "/{id}/scrape",
                        web::post().to(link_handler::trigger_scrape_endpoint),
                    ),
            )
            .service(
                web::scope("/scrape-runs")
                    .route(
                        "/{id}/start",
                        web::post().to(scrape_run_handler::start_scrape_run_endpoint),
                    )
                    .route(
                        "/{id}/complete",
                        web::post().to(scrape_run_handler::complete_scrape_run_endpoint),
                    )
                    .route(
                        "/{id}/fail",
                        web::post().to(scrape_run_handler::fail_scrape_run_endpoint),
                    ),
            )
            .service(
                web::scope("/products")
                    .route("", web::get().to(product_handler::list_products_endpoint))
                    .route("/{id}", web::get().to(product_handler::get_product_endpoint)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::post().to(post_handler::create_post_endpoint))
                    .route("", web::get().to(post_handler::list_posts_endpoint))
                    .route("/{id}", web::get().to(post_handler::get_post_endpoint))
                    .route(
                        "/{id}/events",
                        web::get().to(post_handler::get_post_events_endpoint),
                    ),
            )
            .service(
                web::scope("/webhooks").route(
                    "/n8n/status",
                    web::post().to(webhook_handler::n8n_status_endpoint),
                ),
            ),
    );
}
