//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

/// Enum cerrado que viaja como texto: en JSON (serde) y en columnas TEXT de SQLite.
macro_rules! db_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(anyhow::anyhow!(
                        "Valor desconocido para {}: '{}'",
                        stringify!($name),
                        other
                    )),
                }
            }
        }
    };
}

pub mod channel_event_model;
pub mod link_model;
pub mod post_job_model;
pub mod product_model;
pub mod queue_model;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// Las fechas se guardan como RFC3339 en SQLite.
pub(crate) fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .with_context(|| format!("Fecha inválida en DB: '{}'", raw))
}

pub(crate) fn parse_opt_ts(raw: Option<String>) -> Result<Option<DateTime<Utc>>> {
    raw.as_deref().map(parse_ts).transpose()
}

/// Columnas JSON opcionales (detail, context, snapshot...).
pub(crate) fn parse_json(raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw).context("JSON inválido almacenado en DB")
}
