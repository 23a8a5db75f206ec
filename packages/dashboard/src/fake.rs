//! In-memory [`IncidenciasApi`] used by the page tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use metrovia_client::{ClientError, IncidenciasApi, SelectedFile};
use metrovia_incidencia_models::{
    EstadisticasDiarias, FiltrosConsulta, IncidenciasResponse, TendenciaMensual, TopIncidencias,
    UploadResponse,
};

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Upload(String),
    Incidencias(Vec<(String, String)>),
    Diario(NaiveDate),
    Semanal(Option<NaiveDate>),
    Mensuales(i32),
    Top(u32),
    Comparativo(NaiveDate, NaiveDate),
}

/// Canned responses; `None` makes the call fail with a 500.
#[derive(Default)]
pub struct FakeApi {
    pub calls: Mutex<Vec<Call>>,
    pub upload: Option<UploadResponse>,
    pub upload_detail: Option<String>,
    pub incidencias: Option<IncidenciasResponse>,
    pub diario: Option<EstadisticasDiarias>,
    pub mensuales: Option<TendenciaMensual>,
    pub top: Option<TopIncidencias>,
}

impl FakeApi {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn reply<T: Clone>(value: Option<&T>, detail: Option<&String>) -> Result<T, ClientError> {
        value.cloned().ok_or_else(|| ClientError::Api {
            status: 500,
            detail: detail.cloned(),
        })
    }
}

#[async_trait]
impl IncidenciasApi for FakeApi {
    async fn upload_file(&self, file: &SelectedFile) -> Result<UploadResponse, ClientError> {
        self.record(Call::Upload(file.name.clone()));
        Self::reply(self.upload.as_ref(), self.upload_detail.as_ref())
    }

    async fn get_incidencias(
        &self,
        filtros: &FiltrosConsulta,
    ) -> Result<IncidenciasResponse, ClientError> {
        self.record(Call::Incidencias(
            filtros
                .query_pairs()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));
        Self::reply(self.incidencias.as_ref(), None)
    }

    async fn get_reporte_diario(
        &self,
        fecha: NaiveDate,
    ) -> Result<EstadisticasDiarias, ClientError> {
        self.record(Call::Diario(fecha));
        Self::reply(self.diario.as_ref(), None)
    }

    async fn get_tendencia_semanal(
        &self,
        fecha_fin: Option<NaiveDate>,
    ) -> Result<serde_json::Value, ClientError> {
        self.record(Call::Semanal(fecha_fin));
        Ok(serde_json::json!({ "periodo": "semanal" }))
    }

    async fn get_tendencias_mensuales(&self, anio: i32) -> Result<TendenciaMensual, ClientError> {
        self.record(Call::Mensuales(anio));
        Self::reply(self.mensuales.as_ref(), None)
    }

    async fn get_top_incidencias(&self, limite: u32) -> Result<TopIncidencias, ClientError> {
        self.record(Call::Top(limite));
        Self::reply(self.top.as_ref(), None)
    }

    async fn get_comparativo(
        &self,
        fecha1: NaiveDate,
        fecha2: NaiveDate,
    ) -> Result<serde_json::Value, ClientError> {
        self.record(Call::Comparativo(fecha1, fecha2));
        Ok(serde_json::json!({}))
    }
}
