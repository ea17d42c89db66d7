//! handlers/link_handler.rs
use actix_web::{web, HttpResponse};

use crate::{
    errors::ApiError,
    models::link_model::{CreateLinkRequest, ListLinksQuery},
    services::link_service::LinkService,
};

/// POST /api/links
pub async fn create_link_endpoint(
    link_service: web::Data<LinkService>,
    body: web::Json<CreateLinkRequest>,
) -> Result<HttpResponse, ApiError> {
    let resp = link_service.create_link(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(resp))
}

/// GET /api/links?marketplace=&is_active=
pub async fn list_links_endpoint(
    link_service: web::Data<LinkService>,
    query: web::Query<ListLinksQuery>,
) -> Result<HttpResponse, ApiError> {
    let links = link_service.list_links(&query).await?;
    Ok(HttpResponse::Ok().json(links))
}

/// GET /api/links/{id}
pub async fn get_link_endpoint(
    link_service: web::Data<LinkService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let detail = link_service.get_link_detail(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// POST /api/links/{id}/scrape
pub async fn trigger_scrape_endpoint(
    link_service: web::Data<LinkService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let resp = link_service.trigger_scrape(&path.into_inner()).await?;
    Ok(HttpResponse::Created().json(resp))
}
