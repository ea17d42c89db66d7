//! handlers/post_handler.rs
use actix_web::{web, HttpResponse};

use crate::{
    errors::ApiError,
    models::post_job_model::{CreatePostRequest, ListPostsQuery},
    services::post_job_service::PostJobService,
};

/// POST /api/posts
pub async fn create_post_endpoint(
    post_service: web::Data<PostJobService>,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, ApiError> {
    let job = post_service.create_post(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(job))
}

/// GET /api/posts?status=&channel=
pub async fn list_posts_endpoint(
    post_service: web::Data<PostJobService>,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse, ApiError> {
    let jobs = post_service.list_posts(&query).await?;
    Ok(HttpResponse::Ok().json(jobs))
}

/// GET /api/posts/{id}
pub async fn get_post_endpoint(
    post_service: web::Data<PostJobService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let detail = post_service.get_job_detail(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// GET /api/posts/{id}/events
pub async fn get_post_events_endpoint(
    post_service: web::Data<PostJobService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let events = post_service.get_events(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(events))
}
