use serde::Serialize;
use serde_json::Value;

db_enum! {
    BackoffType {
        Fixed => "fixed",
        Exponential => "exponential",
    }
}

/// Política de reintentos que acompaña al job encolado; la aplica el consumidor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: BackoffType,
    pub delay_ms: u64,
}

impl RetryPolicy {
    /// 3 intentos, backoff exponencial desde 2s.
    pub const SCRAPE: RetryPolicy = RetryPolicy {
        attempts: 3,
        backoff: BackoffType::Exponential,
        delay_ms: 2000,
    };
}

#[derive(Debug, Clone, Serialize)]
pub struct EnqueueJob {
    pub queue: &'static str,
    pub name: &'static str,
    pub payload: Value,
    pub policy: RetryPolicy,
}
