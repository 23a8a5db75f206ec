//! `reqwest`-backed implementation of [`IncidenciasApi`].
//!
//! Every operation is split into a `*_request` builder and the async call
//! that sends it, so the exact request shape can be inspected without a
//! server.

use async_trait::async_trait;
use chrono::NaiveDate;
use metrovia_incidencia_models::{
    EstadisticasDiarias, FiltrosConsulta, IncidenciasResponse, TendenciaMensual, TopIncidencias,
    UploadResponse,
};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, multipart};
use serde::de::DeserializeOwned;

use crate::{ClientError, Config, IncidenciasApi, SelectedFile, format_fecha};

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 300;

/// HTTP client bound to one API base URL.
///
/// The inner `reqwest::Client` is read-only after construction and cheap
/// to share.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Builds a client for `config.base_url` with a default
    /// `Content-Type: application/json` header.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The base URL every path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Builds the multipart upload request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the file's MIME type is not a
    /// valid media type.
    pub fn upload_request(&self, file: &SelectedFile) -> Result<RequestBuilder, ClientError> {
        let mut part = multipart::Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        if let Some(mime) = &file.mime {
            part = part.mime_str(mime)?;
        }
        let form = multipart::Form::new().part("file", part);

        Ok(self.client.post(self.url("/upload/")).multipart(form))
    }

    /// Builds the filtered incident query. Falsy filters are dropped.
    #[must_use]
    pub fn incidencias_request(&self, filtros: &FiltrosConsulta) -> RequestBuilder {
        self.client
            .get(self.url("/queries/incidencias"))
            .query(&filtros.query_pairs())
    }

    /// Builds the daily report request.
    #[must_use]
    pub fn reporte_diario_request(&self, fecha: NaiveDate) -> RequestBuilder {
        self.client
            .get(self.url("/reports/diario"))
            .query(&[("fecha", format_fecha(fecha))])
    }

    /// Builds the weekly trend request.
    #[must_use]
    pub fn tendencia_semanal_request(&self, fecha_fin: Option<NaiveDate>) -> RequestBuilder {
        let builder = self.client.get(self.url("/reports/tendencia/semanal"));
        match fecha_fin {
            Some(fecha) => builder.query(&[("fecha_fin", format_fecha(fecha))]),
            None => builder,
        }
    }

    /// Builds the monthly trends request.
    #[must_use]
    pub fn tendencias_mensuales_request(&self, anio: i32) -> RequestBuilder {
        self.client
            .get(self.url("/queries/tendencias/mensuales"))
            .query(&[("año", anio)])
    }

    /// Builds the top incidents request.
    #[must_use]
    pub fn top_incidencias_request(&self, limite: u32) -> RequestBuilder {
        self.client
            .get(self.url("/reports/top-incidencias"))
            .query(&[("limite", limite)])
    }

    /// Builds the comparative report request.
    #[must_use]
    pub fn comparativo_request(&self, fecha1: NaiveDate, fecha2: NaiveDate) -> RequestBuilder {
        self.client.get(self.url("/reports/comparativo")).query(&[
            ("fecha1", format_fecha(fecha1)),
            ("fecha2", format_fecha(fecha2)),
        ])
    }
}

/// Sends `builder` and decodes a successful JSON body into `T`.
///
/// Non-success statuses become [`ClientError::Api`] carrying the server's
/// `detail` field.
async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
    let response = builder.send().await?;
    let url = response.url().to_string();
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        log::warn!("{url} returned {status}: {}", preview(&text));
        return Err(ClientError::Api {
            status: status.as_u16(),
            detail: parse_detail(&text),
        });
    }

    serde_json::from_str(&text).map_err(|e| {
        log::error!(
            "Failed to decode response from {url}: {e}\n  body preview: {}",
            preview(&text)
        );
        ClientError::Json(e)
    })
}

fn preview(text: &str) -> &str {
    if text.len() <= BODY_PREVIEW_LEN {
        return text;
    }
    let mut end = BODY_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Extracts the `detail` field from an error body.
///
/// String details are returned as-is; structured details (validation
/// errors) are returned as compact JSON.
fn parse_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl IncidenciasApi for ApiClient {
    async fn upload_file(&self, file: &SelectedFile) -> Result<UploadResponse, ClientError> {
        log::info!("Uploading {} ({} bytes)", file.name, file.bytes.len());
        send_json(self.upload_request(file)?).await
    }

    async fn get_incidencias(
        &self,
        filtros: &FiltrosConsulta,
    ) -> Result<IncidenciasResponse, ClientError> {
        log::debug!("Querying incidents with {:?}", filtros.query_pairs());
        send_json(self.incidencias_request(filtros)).await
    }

    async fn get_reporte_diario(
        &self,
        fecha: NaiveDate,
    ) -> Result<EstadisticasDiarias, ClientError> {
        log::debug!("Fetching daily report for {fecha}");
        send_json(self.reporte_diario_request(fecha)).await
    }

    async fn get_tendencia_semanal(
        &self,
        fecha_fin: Option<NaiveDate>,
    ) -> Result<serde_json::Value, ClientError> {
        send_json(self.tendencia_semanal_request(fecha_fin)).await
    }

    async fn get_tendencias_mensuales(&self, anio: i32) -> Result<TendenciaMensual, ClientError> {
        log::debug!("Fetching monthly trends for {anio}");
        send_json(self.tendencias_mensuales_request(anio)).await
    }

    async fn get_top_incidencias(&self, limite: u32) -> Result<TopIncidencias, ClientError> {
        send_json(self.top_incidencias_request(limite)).await
    }

    async fn get_comparativo(
        &self,
        fecha1: NaiveDate,
        fecha2: NaiveDate,
    ) -> Result<serde_json::Value, ClientError> {
        send_json(self.comparativo_request(fecha1, fecha2)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrovia_incidencia_models::CampoFiltro;

    fn client() -> ApiClient {
        ApiClient::new(&Config::default()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_filters_send_no_query_string() {
        let mut filtros = FiltrosConsulta::default();
        filtros.set(CampoFiltro::Troncal, "");
        let request = client().incidencias_request(&filtros).build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8000/api/v1/queries/incidencias"
        );
        assert_eq!(request.url().query(), None);
    }

    #[test]
    fn truthy_filters_are_sent_once_in_order() {
        let mut filtros = FiltrosConsulta::default();
        filtros.set(CampoFiltro::Troncal, "2");
        filtros.set(CampoFiltro::Empresa, "STG");
        filtros.set(CampoFiltro::FechaFin, "");
        let request = client().incidencias_request(&filtros).build().unwrap();
        assert_eq!(request.url().path(), "/api/v1/queries/incidencias");
        assert_eq!(request.url().query(), Some("troncal=2&empresa=STG"));
    }

    #[test]
    fn report_requests_carry_formatted_dates() {
        let c = client();
        let diario = c.reporte_diario_request(date(2025, 1, 15)).build().unwrap();
        assert_eq!(diario.url().query(), Some("fecha=2025-01-15"));

        let comparativo = c
            .comparativo_request(date(2025, 1, 1), date(2025, 2, 1))
            .build()
            .unwrap();
        assert_eq!(
            comparativo.url().query(),
            Some("fecha1=2025-01-01&fecha2=2025-02-01")
        );

        let semanal = c.tendencia_semanal_request(None).build().unwrap();
        assert_eq!(semanal.url().query(), None);
    }

    #[test]
    fn monthly_trend_encodes_year_key() {
        let request = client().tendencias_mensuales_request(2024).build().unwrap();
        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs, vec![("año".to_string(), "2024".to_string())]);
    }

    #[test]
    fn upload_is_multipart_post() {
        let file = SelectedFile::new("data.xlsx", None, b"PK\x03\x04".to_vec());
        let request = client().upload_request(&file).unwrap().build().unwrap();
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().path(), "/api/v1/upload/");
        let content_type = request.headers()[CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data"));
    }

    #[test]
    fn trailing_slash_in_base_url_is_ignored() {
        let config = Config {
            base_url: "http://api.example:9000/v2/".to_string(),
            ..Config::default()
        };
        let c = ApiClient::new(&config).unwrap();
        let request = c.top_incidencias_request(20).build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://api.example:9000/v2/reports/top-incidencias?limite=20"
        );
    }

    #[test]
    fn error_detail_is_extracted() {
        assert_eq!(
            parse_detail(r#"{"detail": "Solo se permiten archivos Excel"}"#).as_deref(),
            Some("Solo se permiten archivos Excel")
        );
        assert_eq!(
            parse_detail(r#"{"detail": [{"loc": ["query", "fecha"]}]}"#).as_deref(),
            Some(r#"[{"loc":["query","fecha"]}]"#)
        );
        assert_eq!(parse_detail("Internal Server Error"), None);
        assert_eq!(parse_detail(r#"{"error": "x"}"#), None);
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let text = "ñ".repeat(BODY_PREVIEW_LEN);
        let p = preview(&text);
        assert!(p.len() <= BODY_PREVIEW_LEN);
        assert!(p.chars().all(|c| c == 'ñ'));
    }
}
