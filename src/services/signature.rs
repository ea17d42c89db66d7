//! services/signature.rs
//! Firma HMAC-SHA256 de los callbacks de n8n.

use anyhow::{Context, Result};
use openssl::{hash::MessageDigest, memcmp, pkey::PKey, sign::Signer};
use serde_json::Value;

#[derive(Clone, Debug)]
pub struct SignatureVerifier {
    secret: Option<String>,
}

impl SignatureVerifier {
    pub fn new(secret: Option<String>) -> Self {
        if secret.is_none() {
            log::warn!(
                "(SignatureVerifier) N8N_CALLBACK_SECRET no definido: las firmas de webhooks NO se verifican"
            );
        }
        SignatureVerifier { secret }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Verifica `signature` contra el payload (ya sin el campo `signature`).
    /// Sin secreto configurado siempre devuelve `true`.
    pub fn verify(&self, payload: &Value, signature: &str) -> Result<bool> {
        let Some(secret) = self.secret.as_deref() else {
            return Ok(true);
        };

        let expected = sign_payload(secret, payload)?;
        if expected.len() != signature.len() {
            return Ok(false);
        }
        Ok(memcmp::eq(expected.as_bytes(), signature.as_bytes()))
    }
}

/// Hex (minúsculas) de HMAC-SHA256 sobre el JSON compacto del payload.
pub fn sign_payload(secret: &str, payload: &Value) -> Result<String> {
    let canonical = serde_json::to_string(payload).context("No se pudo serializar el payload")?;

    let key = PKey::hmac(secret.as_bytes()).context("Clave HMAC inválida")?;
    let mut signer = Signer::new(MessageDigest::sha256(), &key)?;
    signer.update(canonical.as_bytes())?;
    let mac = signer.sign_to_vec()?;

    Ok(hex::encode(mac))
}
