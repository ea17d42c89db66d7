use actix_web::{middleware::Logger, App, HttpServer};
use dotenv::dotenv;

use crate::app::AppServices;
use crate::config::app_config::AppConfig;
use crate::logger::init_logger;

mod app;
mod config;
mod db;
mod errors;
mod handlers;
mod logger;
mod models;
mod services;
#[cfg(test)]
mod tests;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = AppConfig::from_env().expect("Configuración inválida");

    // Conectarnos a la DB y migrar
    let db_pool = db::setup_database(&config.database_url)
        .await
        .expect("No se pudo conectar a la base de datos SQLite.");
    if let Err(e) = db::run_migrations(&db_pool).await {
        panic!("Fallo en migraciones: {:?}", e);
    }

    let services = AppServices::new(db_pool, &config).expect("No se pudieron crear los servicios");

    // Levantar servidor
    log::info!("Levantando servidor en {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| services.register(cfg))
            .configure(app::init_app)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
