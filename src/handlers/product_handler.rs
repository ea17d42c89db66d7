//! handlers/product_handler.rs
use actix_web::{web, HttpResponse};

use crate::{
    errors::ApiError, models::product_model::ListProductsQuery,
    services::product_service::ProductService,
};

/// GET /api/products?search=&marketplace=
pub async fn list_products_endpoint(
    product_service: web::Data<ProductService>,
    query: web::Query<ListProductsQuery>,
) -> Result<HttpResponse, ApiError> {
    let products = product_service.list_products(&query).await?;
    Ok(HttpResponse::Ok().json(products))
}

/// GET /api/products/{id}
pub async fn get_product_endpoint(
    product_service: web::Data<ProductService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let detail = product_service
        .get_product_detail(&path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(detail))
}
