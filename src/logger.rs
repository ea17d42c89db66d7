//! logger.rs
//! Logger global (env_logger). RUST_LOG manda; si no está, info y sqlx en warn.

const DEFAULT_FILTER: &str = "info,sqlx=warn";

fn builder() -> env_logger::Builder {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_FILTER));
    builder.format_timestamp_secs();
    builder
}

pub fn init_logger() {
    builder().init();
}

/// Para tests: puede llamarse varias veces, la salida la captura el harness.
#[cfg(test)]
pub fn init_test_logger() {
    let _ = builder().is_test(true).try_init();
}
