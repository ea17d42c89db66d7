//! handlers/scrape_run_handler.rs
//! Callbacks del scraper externo.
use actix_web::{web, HttpResponse};

use crate::{
    errors::ApiError,
    models::link_model::{CompleteScrapeRequest, FailScrapeRequest},
    services::scrape_run_service::ScrapeRunService,
};

/// POST /api/scrape-runs/{id}/start
pub async fn start_scrape_run_endpoint(
    scrape_run_service: web::Data<ScrapeRunService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let run = scrape_run_service.mark_running(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(run))
}

/// POST /api/scrape-runs/{id}/complete
pub async fn complete_scrape_run_endpoint(
    scrape_run_service: web::Data<ScrapeRunService>,
    path: web::Path<String>,
    body: web::Json<CompleteScrapeRequest>,
) -> Result<HttpResponse, ApiError> {
    let product = scrape_run_service
        .complete(&path.into_inner(), &body.product)
        .await?;
    Ok(HttpResponse::Ok().json(product))
}

/// POST /api/scrape-runs/{id}/fail
pub async fn fail_scrape_run_endpoint(
    scrape_run_service: web::Data<ScrapeRunService>,
    path: web::Path<String>,
    body: web::Json<FailScrapeRequest>,
) -> Result<HttpResponse, ApiError> {
    let run = scrape_run_service
        .fail(&path.into_inner(), &body.error)
        .await?;
    Ok(HttpResponse::Ok().json(run))
}
