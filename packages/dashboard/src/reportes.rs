//! Reports page: daily aggregate and yearly monthly trend.
//!
//! The two fetches are independent. Each one takes a [`RequestToken`]
//! from its own [`RequestFence`] when dispatched, and its response is
//! applied only while that token is still the latest for the slot.

use chrono::{Datelike as _, NaiveDate};
use metrovia_client::{ClientError, IncidenciasApi};
use metrovia_incidencia_models::{EstadisticasDiarias, TendenciaMensual, Turno};

use crate::charts::{self, BarChart, LineChart};
use crate::fence::{RequestFence, RequestToken};

/// One summary counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contador {
    pub label: String,
    pub value: u64,
}

/// State of the reports page.
#[derive(Debug)]
pub struct ReportesPage {
    fecha: NaiveDate,
    anio: i32,
    years: Vec<i32>,
    estadisticas: Option<EstadisticasDiarias>,
    tendencias: Option<TendenciaMensual>,
    diario: RequestFence,
    mensual: RequestFence,
    loading: bool,
}

impl ReportesPage {
    /// Creates a page for `today` and its year. The year selector offers
    /// `years` plus the current year, ascending.
    #[must_use]
    pub fn new(today: NaiveDate, years: &[i32]) -> Self {
        let mut years = years.to_vec();
        years.push(today.year());
        years.sort_unstable();
        years.dedup();

        Self {
            fecha: today,
            anio: today.year(),
            years,
            estadisticas: None,
            tendencias: None,
            diario: RequestFence::default(),
            mensual: RequestFence::default(),
            loading: false,
        }
    }

    /// Starts on `fecha` and `anio` instead of today. `anio` is added to
    /// the year options if missing.
    #[must_use]
    pub fn with_seleccion(mut self, fecha: NaiveDate, anio: i32) -> Self {
        self.fecha = fecha;
        self.anio = anio;
        if !self.years.contains(&anio) {
            self.years.push(anio);
            self.years.sort_unstable();
        }
        self
    }

    #[must_use]
    pub const fn fecha(&self) -> NaiveDate {
        self.fecha
    }

    #[must_use]
    pub const fn anio(&self) -> i32 {
        self.anio
    }

    /// Years offered by the year selector.
    #[must_use]
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    #[must_use]
    pub const fn estadisticas(&self) -> Option<&EstadisticasDiarias> {
        self.estadisticas.as_ref()
    }

    #[must_use]
    pub const fn tendencias(&self) -> Option<&TendenciaMensual> {
        self.tendencias.as_ref()
    }

    /// `true` while the latest daily fetch is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Selects a report date and returns the token its fetch must carry.
    pub const fn set_fecha(&mut self, fecha: NaiveDate) -> RequestToken {
        self.fecha = fecha;
        self.loading = true;
        self.diario.issue()
    }

    /// Selects a trend year and returns the token its fetch must carry.
    pub const fn set_anio(&mut self, anio: i32) -> RequestToken {
        self.anio = anio;
        self.mensual.issue()
    }

    /// Applies a daily report response. Returns `false` if `token` is
    /// stale and the response was dropped.
    pub fn finish_diario(
        &mut self,
        token: RequestToken,
        result: Result<EstadisticasDiarias, ClientError>,
    ) -> bool {
        if !self.diario.is_current(token) {
            log::debug!("Discarding stale daily report {token:?}");
            return false;
        }

        self.loading = false;
        match result {
            Ok(stats) => self.estadisticas = Some(stats),
            Err(e) => log::error!("Failed to load daily report for {}: {e}", self.fecha),
        }
        true
    }

    /// Applies a monthly trend response. Returns `false` if `token` is
    /// stale and the response was dropped.
    pub fn finish_mensual(
        &mut self,
        token: RequestToken,
        result: Result<TendenciaMensual, ClientError>,
    ) -> bool {
        if !self.mensual.is_current(token) {
            log::debug!("Discarding stale monthly trend {token:?}");
            return false;
        }

        match result {
            Ok(trend) => self.tendencias = Some(trend),
            Err(e) => log::error!("Failed to load monthly trend for {}: {e}", self.anio),
        }
        true
    }

    /// Fetches both reports for the current date and year concurrently.
    pub async fn load(&mut self, api: &dyn IncidenciasApi) {
        let diario = self.set_fecha(self.fecha);
        let mensual = self.set_anio(self.anio);

        let (stats, trend) = futures::future::join(
            api.get_reporte_diario(self.fecha),
            api.get_tendencias_mensuales(self.anio),
        )
        .await;

        self.finish_diario(diario, stats);
        self.finish_mensual(mensual, trend);
    }

    /// Selects `fecha` and fetches its daily report.
    pub async fn change_fecha(&mut self, api: &dyn IncidenciasApi, fecha: NaiveDate) {
        let token = self.set_fecha(fecha);
        let result = api.get_reporte_diario(fecha).await;
        self.finish_diario(token, result);
    }

    /// Selects `anio` and fetches its monthly trend.
    pub async fn change_anio(&mut self, api: &dyn IncidenciasApi, anio: i32) {
        let token = self.set_anio(anio);
        let result = api.get_tendencias_mensuales(anio).await;
        self.finish_mensual(token, result);
    }

    /// Total incidents of the loaded day, 0 when nothing is loaded.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.estadisticas
            .as_ref()
            .map_or(0, |s| s.total_incidencias)
    }

    /// Incidents in `turno` on the loaded day, 0 when the shift is absent.
    #[must_use]
    pub fn total_turno(&self, turno: Turno) -> u64 {
        self.estadisticas
            .as_ref()
            .map_or(0, |s| s.total_turno(turno))
    }

    /// `Total Incidencias` followed by one `Turno {x}` counter per shift.
    #[must_use]
    pub fn contadores(&self) -> Vec<Contador> {
        std::iter::once(Contador {
            label: "Total Incidencias".to_string(),
            value: self.total(),
        })
        .chain(Turno::all().iter().map(|t| Contador {
            label: format!("Turno {t}"),
            value: self.total_turno(*t),
        }))
        .collect()
    }

    /// Line, shift and company charts of the loaded day.
    #[must_use]
    pub fn bar_charts(&self) -> Vec<BarChart> {
        self.estadisticas.as_ref().map_or_else(Vec::new, |s| {
            vec![
                charts::por_troncal(s),
                charts::por_turno(s),
                charts::por_empresa(s),
            ]
        })
    }

    /// Monthly trend chart of the loaded year.
    #[must_use]
    pub fn line_chart(&self) -> Option<LineChart> {
        self.tendencias.as_ref().map(charts::tendencia_mensual)
    }
}
