//! config/app_config.rs
//! Configuración global del servicio, leída de variables de entorno (.env).

use std::{env, time::Duration};

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// p.ej. "sqlite:./data/affiliate.db"
    pub database_url: String,
    pub n8n_base_url: Option<String>,
    pub n8n_webhook_path: Option<String>,
    /// URL pública del backend, se la pasamos a n8n para los callbacks.
    pub backend_base_url: String,
    /// Sin secreto no se verifican firmas (solo para desarrollo).
    pub n8n_callback_secret: Option<String>,
    pub n8n_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "sqlite:./data/affiliate.db".to_string(),
            n8n_base_url: None,
            n8n_webhook_path: None,
            backend_base_url: "http://localhost:8080".to_string(),
            n8n_callback_secret: None,
            n8n_timeout: Duration::from_secs(30),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = AppConfig::default();

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PORT inválido: '{}'", raw))?,
            None => defaults.port,
        };
        let n8n_timeout = match non_empty("N8N_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .with_context(|| format!("N8N_TIMEOUT_SECS inválido: '{}'", raw))?,
            ),
            None => defaults.n8n_timeout,
        };

        Ok(AppConfig {
            host: non_empty("HOST").unwrap_or(defaults.host),
            port,
            database_url: non_empty("DATABASE_URL").unwrap_or(defaults.database_url),
            n8n_base_url: non_empty("N8N_BASE_URL"),
            n8n_webhook_path: non_empty("N8N_WEBHOOK_PATH"),
            backend_base_url: non_empty("BACKEND_BASE_URL").unwrap_or(defaults.backend_base_url),
            n8n_callback_secret: non_empty("N8N_CALLBACK_SECRET"),
            n8n_timeout,
        })
    }

    /// URL completa del webhook de n8n, si está configurado.
    pub fn n8n_webhook_url(&self) -> Option<String> {
        let base = self.n8n_base_url.as_deref()?;
        let path = self.n8n_webhook_path.as_deref().unwrap_or("");
        Some(format!("{}{}", base.trim_end_matches('/'), path))
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
