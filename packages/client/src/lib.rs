#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Typed REST client for the Metrovía incidents API.
//!
//! [`ApiClient`] wraps a single `reqwest::Client` pointed at a fixed base
//! URL and exposes one operation per remote capability. The operations are
//! also available through the [`IncidenciasApi`] trait so dashboard pages
//! can be driven by any implementation, including in-memory fakes in
//! tests.

pub mod client;
pub mod config;
pub mod upload;

use async_trait::async_trait;
use chrono::NaiveDate;
use metrovia_incidencia_models::{
    EstadisticasDiarias, FiltrosConsulta, IncidenciasResponse, TendenciaMensual, TopIncidencias,
    UploadResponse,
};

pub use client::ApiClient;
pub use config::{Config, ConfigError};
pub use upload::SelectedFile;

/// Default number of entries requested from the top-incidents endpoint.
pub const DEFAULT_TOP_LIMIT: u32 = 10;

/// Errors returned by API operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (reading the file to upload).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Server answered with a non-success status.
    #[error("API returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api {
        /// HTTP status code.
        status: u16,
        /// The `detail` field of the error body, if any.
        detail: Option<String>,
    },
}

impl ClientError {
    /// Returns the server-reported detail message, if the server sent one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Remote capabilities consumed by the dashboard.
#[async_trait]
pub trait IncidenciasApi: Send + Sync {
    /// `POST /upload/` with the file as multipart field `file`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the server rejects
    /// the file.
    async fn upload_file(&self, file: &SelectedFile) -> Result<UploadResponse, ClientError>;

    /// `GET /queries/incidencias` with the truthy filters as query pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or decoding fails.
    async fn get_incidencias(
        &self,
        filtros: &FiltrosConsulta,
    ) -> Result<IncidenciasResponse, ClientError>;

    /// `GET /reports/diario?fecha=...`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or decoding fails.
    async fn get_reporte_diario(&self, fecha: NaiveDate)
    -> Result<EstadisticasDiarias, ClientError>;

    /// `GET /reports/tendencia/semanal[?fecha_fin=...]`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or decoding fails.
    async fn get_tendencia_semanal(
        &self,
        fecha_fin: Option<NaiveDate>,
    ) -> Result<serde_json::Value, ClientError>;

    /// `GET /queries/tendencias/mensuales?año=...`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or decoding fails.
    async fn get_tendencias_mensuales(&self, anio: i32) -> Result<TendenciaMensual, ClientError>;

    /// `GET /reports/top-incidencias?limite=...`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or decoding fails.
    async fn get_top_incidencias(&self, limite: u32) -> Result<TopIncidencias, ClientError>;

    /// `GET /reports/comparativo?fecha1=...&fecha2=...`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or decoding fails.
    async fn get_comparativo(
        &self,
        fecha1: NaiveDate,
        fecha2: NaiveDate,
    ) -> Result<serde_json::Value, ClientError>;
}

/// Formats a date the way every endpoint expects it (`YYYY-MM-DD`).
#[must_use]
pub fn format_fecha(fecha: NaiveDate) -> String {
    fecha.format("%Y-%m-%d").to_string()
}
