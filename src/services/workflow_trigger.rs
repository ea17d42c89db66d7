//! services/workflow_trigger.rs
//! Disparo del workflow de publicación en n8n (POST JSON, sin reintentos).

use anyhow::{anyhow, Context, Result};
use reqwest::Client;

use crate::{config::app_config::AppConfig, models::post_job_model::WorkflowPayload};

#[derive(Clone, Debug)]
pub struct WorkflowTrigger {
    http_client: Client,
    webhook_url: Option<String>,
}

impl WorkflowTrigger {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.n8n_timeout)
            .build()
            .context("No se pudo construir el cliente HTTP")?;

        let webhook_url = config.n8n_webhook_url();
        match &webhook_url {
            Some(url) => log::info!("(WorkflowTrigger) Webhook de n8n: {}", url),
            None => log::warn!("(WorkflowTrigger) N8N_BASE_URL no definido, los posts fallarán"),
        }

        Ok(WorkflowTrigger {
            http_client,
            webhook_url,
        })
    }

    /// Devuelve el status HTTP si n8n respondió 2xx.
    pub async fn fire(&self, payload: &WorkflowPayload) -> Result<u16> {
        let url = self
            .webhook_url
            .as_deref()
            .ok_or_else(|| anyhow!("n8n not configured (N8N_BASE_URL)"))?;

        log::info!(
            "(fire) Disparando workflow para post_job={} en {}",
            payload.post_job_id,
            url
        );

        let resp = self
            .http_client
            .post(url)
            .json(payload)
            .send()
            .await
            .context("n8n webhook request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body_txt = resp.text().await.unwrap_or_default();
            log::error!(
                "(fire) n8n respondió {} para post_job={}: '{}'",
                status,
                payload.post_job_id,
                body_txt
            );
            return Err(anyhow!(
                "n8n webhook failed: {}",
                status.canonical_reason().unwrap_or(status.as_str())
            ));
        }

        Ok(status.as_u16())
    }
}
