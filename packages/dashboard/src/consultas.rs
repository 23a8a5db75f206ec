//! Advanced query page: filters, search, capped result table and export.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use metrovia_client::{ClientError, IncidenciasApi};
use metrovia_incidencia_models::{
    CampoFiltro, FiltrosConsulta, Incidencia, IncidenciasResponse, TopIncidencias,
};

use crate::export::{self, ExportError, Quoting};
use crate::fecha::{SIN_FECHA, formatear_fecha};

/// Rows shown in the result table.
pub const MAX_FILAS: usize = 50;

/// Number of incident types offered in the type selector.
pub const TIPOS_LIMITE: u32 = 20;

/// Longest incident-type label shown before truncation.
pub const TIPO_LABEL_MAX: usize = 30;

/// Alert raised when a search fails.
pub const ALERTA_BUSQUEDA: &str = "Error al buscar incidencias";

/// Shown instead of the table when there are no rows.
pub const SIN_RESULTADOS: &str = "No hay resultados";

/// One entry of the incident-type selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipoOption {
    /// Value sent as the `tipo_incidencia` filter.
    pub value: String,
    /// Display label, truncated to [`TIPO_LABEL_MAX`] characters.
    pub label: String,
}

impl TipoOption {
    fn new(tipo: &str) -> Self {
        let label = if tipo.chars().count() > TIPO_LABEL_MAX {
            format!("{}...", tipo.chars().take(TIPO_LABEL_MAX).collect::<String>())
        } else {
            tipo.to_string()
        };
        Self {
            value: tipo.to_string(),
            label,
        }
    }
}

/// Display-ready cells of one table row, in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilaTabla {
    pub fecha: String,
    pub troncal: String,
    pub ruta: String,
    pub bus: String,
    pub incidencia: String,
    pub turno: String,
    pub empresa: String,
}

impl FilaTabla {
    /// Column headings of the result table.
    pub const HEADERS: [&'static str; 7] = [
        "Fecha",
        "Troncal",
        "Ruta",
        "Bus",
        "Incidencia",
        "Turno",
        "Empresa",
    ];

    fn from_incidencia(inc: &Incidencia) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            fecha: inc
                .fecha
                .as_deref()
                .map_or_else(|| SIN_FECHA.to_string(), formatear_fecha),
            troncal: text(&inc.troncal),
            ruta: text(&inc.ruta),
            bus: text(&inc.bus),
            incidencia: text(&inc.incidencia_primaria),
            turno: text(&inc.turno),
            empresa: text(&inc.empresa),
        }
    }

    /// Cells in [`HEADERS`](Self::HEADERS) order.
    #[must_use]
    pub fn cells(&self) -> [&str; 7] {
        [
            self.fecha.as_str(),
            self.troncal.as_str(),
            self.ruta.as_str(),
            self.bus.as_str(),
            self.incidencia.as_str(),
            self.turno.as_str(),
            self.empresa.as_str(),
        ]
    }
}

/// State of the query page.
#[derive(Debug, Default)]
pub struct ConsultasPage {
    filtros: FiltrosConsulta,
    incidencias: Vec<Incidencia>,
    total: u64,
    loading: bool,
    tipos_incidencia: Vec<String>,
    alert: Option<String>,
}

impl ConsultasPage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one filter. An empty value disables it.
    pub fn set_filtro(&mut self, campo: CampoFiltro, value: impl Into<String>) {
        self.filtros.set(campo, value);
    }

    #[must_use]
    pub const fn filtros(&self) -> &FiltrosConsulta {
        &self.filtros
    }

    /// Every row loaded by the last successful search.
    #[must_use]
    pub fn incidencias(&self) -> &[Incidencia] {
        &self.incidencias
    }

    /// Matching count reported by the server.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Takes the pending user alert, if any.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    /// Stores the incident types offered by the type selector.
    pub fn set_tipos_incidencia(&mut self, top: &TopIncidencias) {
        self.tipos_incidencia = top.tipos();
    }

    /// Loads the top [`TIPOS_LIMITE`] incident types. Failures are only
    /// logged; the selector keeps its previous options.
    pub async fn load_tipos_incidencia(&mut self, api: &dyn IncidenciasApi) {
        match api.get_top_incidencias(TIPOS_LIMITE).await {
            Ok(top) => self.set_tipos_incidencia(&top),
            Err(e) => log::error!("Failed to load incident types: {e}"),
        }
    }

    /// Options for the incident-type selector, most frequent first.
    #[must_use]
    pub fn tipo_options(&self) -> Vec<TipoOption> {
        self.tipos_incidencia
            .iter()
            .map(|t| TipoOption::new(t))
            .collect()
    }

    /// Marks a search as started and returns the filter snapshot to send.
    pub fn begin_search(&mut self) -> FiltrosConsulta {
        self.loading = true;
        self.filtros.clone()
    }

    /// Applies a search result. On failure the previous rows stay and an
    /// alert is raised.
    pub fn finish_search(&mut self, result: Result<IncidenciasResponse, ClientError>) {
        self.loading = false;
        match result {
            Ok(response) => {
                log::info!(
                    "Search returned {} rows (total {})",
                    response.incidencias.len(),
                    response.total
                );
                self.incidencias = response.incidencias;
                self.total = response.total;
            }
            Err(e) => {
                log::error!("Search failed: {e}");
                self.alert = Some(ALERTA_BUSQUEDA.to_string());
            }
        }
    }

    /// Runs one query with the current filters.
    pub async fn search(&mut self, api: &dyn IncidenciasApi) {
        let filtros = self.begin_search();
        let result = api.get_incidencias(&filtros).await;
        self.finish_search(result);
    }

    /// Resets filters and results without contacting the server.
    pub fn clear(&mut self) {
        self.filtros = FiltrosConsulta::default();
        self.incidencias.clear();
        self.total = 0;
    }

    /// The first [`MAX_FILAS`] loaded rows.
    #[must_use]
    pub fn visible_rows(&self) -> &[Incidencia] {
        &self.incidencias[..self.incidencias.len().min(MAX_FILAS)]
    }

    /// [`visible_rows`](Self::visible_rows) formatted for display.
    #[must_use]
    pub fn table_rows(&self) -> Vec<FilaTabla> {
        self.visible_rows()
            .iter()
            .map(FilaTabla::from_incidencia)
            .collect()
    }

    /// `Resultados: N incidencias encontradas`
    #[must_use]
    pub fn heading(&self) -> String {
        format!("Resultados: {} incidencias encontradas", self.total)
    }

    /// `Mostrando 50 de N incidencias` when the total exceeds the table cap.
    #[must_use]
    pub fn footer(&self) -> Option<String> {
        (self.total > MAX_FILAS as u64)
            .then(|| format!("Mostrando {MAX_FILAS} de {} incidencias", self.total))
    }

    /// Returns `true` when the empty-state message should replace the
    /// table.
    #[must_use]
    pub fn show_empty_state(&self) -> bool {
        !self.loading && self.incidencias.is_empty() && self.total == 0
    }

    /// `Label: value` for each truthy filter, in field order.
    #[must_use]
    pub fn active_chips(&self) -> Vec<String> {
        CampoFiltro::all()
            .iter()
            .filter_map(|campo| {
                self.filtros
                    .get(*campo)
                    .map(|v| format!("{}: {v}", campo.chip_label()))
            })
            .collect()
    }

    #[must_use]
    pub fn can_export(&self) -> bool {
        !self.incidencias.is_empty()
    }

    /// CSV of every loaded row, not only the visible ones.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if serialization fails.
    pub fn export_csv(&self, quoting: Quoting) -> Result<String, ExportError> {
        export::to_csv_string(&self.incidencias, quoting)
    }

    /// Writes [`export_csv`](Self::export_csv) to `dir` as
    /// `incidencias-<fecha>.csv`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the file cannot be written.
    pub fn export_to_dir(
        &self,
        dir: &Path,
        fecha: NaiveDate,
        quoting: Quoting,
    ) -> Result<PathBuf, ExportError> {
        export::write_to_dir(&self.incidencias, dir, fecha, quoting)
    }
}
