#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident record, filter and report types for the Metrovía dashboard.
//!
//! These are transient view-models: every value is rebuilt from an API
//! response and never persisted. Field names follow the remote API so the
//! types can be deserialized straight from its JSON bodies.

pub mod auth;
pub mod de;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One operational incident as returned by `GET /queries/incidencias`.
///
/// The server emits imported spreadsheet columns with their original
/// capitalised names (`Fecha`, `Troncal`, ...) and derived columns in
/// lowercase (`turno`, `empresa`). Both spellings are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incidencia {
    /// Server-assigned identifier.
    #[serde(default)]
    pub id: i64,
    /// Date and time of the incident, as sent by the server.
    #[serde(rename = "Fecha", alias = "fecha", default, deserialize_with = "de::opt_text")]
    pub fecha: Option<String>,
    /// Trunk line ("Troncal").
    #[serde(rename = "Troncal", alias = "troncal", default, deserialize_with = "de::opt_text")]
    pub troncal: Option<String>,
    /// Route code.
    #[serde(
        rename = "Codigo_de_Ruta",
        alias = "codigo_ruta",
        default,
        deserialize_with = "de::opt_text"
    )]
    pub codigo_ruta: Option<String>,
    /// Route name.
    #[serde(rename = "Ruta", alias = "ruta", default, deserialize_with = "de::opt_text")]
    pub ruta: Option<String>,
    /// Bus number.
    #[serde(rename = "Bus", alias = "bus", default, deserialize_with = "de::opt_text")]
    pub bus: Option<String>,
    /// Replacement bus, if one was dispatched.
    #[serde(
        rename = "Bus_de_cambio",
        alias = "bus_cambio",
        default,
        deserialize_with = "de::opt_text"
    )]
    pub bus_cambio: Option<String>,
    /// Scheduled departure time.
    #[serde(
        rename = "Hora_programada",
        alias = "hora_programada",
        default,
        deserialize_with = "de::opt_text"
    )]
    pub hora_programada: Option<String>,
    /// Actual departure time.
    #[serde(
        rename = "Hora_real",
        alias = "hora_real",
        default,
        deserialize_with = "de::opt_text"
    )]
    pub hora_real: Option<String>,
    /// Service cycle.
    #[serde(rename = "Ciclo", alias = "ciclo", default, deserialize_with = "de::opt_text")]
    pub ciclo: Option<String>,
    /// Time at which the incident was recorded.
    #[serde(
        rename = "Hora_de_incidencia",
        alias = "hora_incidencia",
        default,
        deserialize_with = "de::opt_text"
    )]
    pub hora_incidencia: Option<String>,
    /// Stop where the incident happened.
    #[serde(rename = "Parada", alias = "parada", default, deserialize_with = "de::opt_text")]
    pub parada: Option<String>,
    /// Primary incident description.
    #[serde(
        rename = "Incidencia_primaria",
        alias = "incidencia_primaria",
        default,
        deserialize_with = "de::opt_text"
    )]
    pub incidencia_primaria: Option<String>,
    /// Secondary incident description.
    #[serde(
        rename = "Incidencia_secundaria",
        alias = "incidencia_secundaria",
        default,
        deserialize_with = "de::opt_text"
    )]
    pub incidencia_secundaria: Option<String>,
    /// Driver code.
    #[serde(
        rename = "Codigo_de_conductor",
        alias = "codigo_conductor",
        default,
        deserialize_with = "de::opt_text"
    )]
    pub codigo_conductor: Option<String>,
    /// Driver name.
    #[serde(
        rename = "Conductor",
        alias = "conductor",
        default,
        deserialize_with = "de::opt_text"
    )]
    pub conductor: Option<String>,
    /// Operator who logged the incident.
    #[serde(
        rename = "Operador",
        alias = "operador",
        default,
        deserialize_with = "de::opt_text"
    )]
    pub operador: Option<String>,
    /// Free-text notes.
    #[serde(
        rename = "Observaciones",
        alias = "observaciones",
        default,
        deserialize_with = "de::opt_text"
    )]
    pub observaciones: Option<String>,
    /// Day type (working day, weekend, holiday).
    #[serde(default, deserialize_with = "de::opt_text")]
    pub tipo_dia: Option<String>,
    /// Shift the incident falls in.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub turno: Option<String>,
    /// Operating company.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub empresa: Option<String>,
}

/// Known operating shifts used by the daily report counters.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Turno {
    /// Morning shift.
    #[serde(rename = "Mañana")]
    #[strum(serialize = "Mañana")]
    Manana,
    /// Afternoon shift.
    Tarde,
    /// Night shift.
    Noche,
}

impl Turno {
    /// Returns all variants in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Manana, Self::Tarde, Self::Noche]
    }
}

/// One field of [`FiltrosConsulta`].
///
/// The string form of each variant is the query-string key the API
/// expects.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CampoFiltro {
    /// Start of the date range (`YYYY-MM-DD`).
    FechaInicio,
    /// End of the date range (`YYYY-MM-DD`).
    FechaFin,
    /// Trunk line.
    Troncal,
    /// Operating company.
    Empresa,
    /// Substring of the primary incident description.
    TipoIncidencia,
    /// Shift.
    Turno,
}

impl CampoFiltro {
    /// Returns all fields in query-string order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::FechaInicio,
            Self::FechaFin,
            Self::Troncal,
            Self::Empresa,
            Self::TipoIncidencia,
            Self::Turno,
        ]
    }

    /// Label shown on the active-filter chip for this field.
    #[must_use]
    pub const fn chip_label(self) -> &'static str {
        match self {
            Self::FechaInicio => "Desde",
            Self::FechaFin => "Hasta",
            Self::Troncal => "Troncal",
            Self::Empresa => "Empresa",
            Self::TipoIncidencia => "Incidencia",
            Self::Turno => "Turno",
        }
    }
}

/// Sparse set of optional filters for the incident query.
///
/// A field is *truthy* when it is present and non-empty. Only truthy
/// fields are sent to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiltrosConsulta {
    /// Start of the date range (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_inicio: Option<String>,
    /// End of the date range (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_fin: Option<String>,
    /// Trunk line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub troncal: Option<String>,
    /// Operating company.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empresa: Option<String>,
    /// Substring of the primary incident description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_incidencia: Option<String>,
    /// Shift.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turno: Option<String>,
}

impl FiltrosConsulta {
    const fn slot(&self, campo: CampoFiltro) -> &Option<String> {
        match campo {
            CampoFiltro::FechaInicio => &self.fecha_inicio,
            CampoFiltro::FechaFin => &self.fecha_fin,
            CampoFiltro::Troncal => &self.troncal,
            CampoFiltro::Empresa => &self.empresa,
            CampoFiltro::TipoIncidencia => &self.tipo_incidencia,
            CampoFiltro::Turno => &self.turno,
        }
    }

    const fn slot_mut(&mut self, campo: CampoFiltro) -> &mut Option<String> {
        match campo {
            CampoFiltro::FechaInicio => &mut self.fecha_inicio,
            CampoFiltro::FechaFin => &mut self.fecha_fin,
            CampoFiltro::Troncal => &mut self.troncal,
            CampoFiltro::Empresa => &mut self.empresa,
            CampoFiltro::TipoIncidencia => &mut self.tipo_incidencia,
            CampoFiltro::Turno => &mut self.turno,
        }
    }

    /// Stores `value` for `campo`. An empty string is kept but is falsy.
    pub fn set(&mut self, campo: CampoFiltro, value: impl Into<String>) {
        *self.slot_mut(campo) = Some(value.into());
    }

    /// Returns the value of `campo` if it is truthy.
    #[must_use]
    pub fn get(&self, campo: CampoFiltro) -> Option<&str> {
        self.slot(campo).as_deref().filter(|v| !v.is_empty())
    }

    /// Returns the truthy fields as `(key, value)` pairs in query-string
    /// order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        CampoFiltro::all()
            .iter()
            .filter_map(|campo| self.get(*campo).map(|v| (campo.as_ref(), v)))
            .collect()
    }

    /// Returns `true` if no field is truthy.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

/// Response body of `GET /queries/incidencias`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidenciasResponse {
    /// Every incident matching the filters.
    #[serde(default)]
    pub incidencias: Vec<Incidencia>,
    /// Number of matching incidents.
    pub total: u64,
}

/// Response body of `POST /upload/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Human-readable summary from the server.
    pub message: String,
    /// Number of rows imported from the spreadsheet.
    pub incidencias_importadas: u64,
}

/// A `(category, total)` pair from one of the report breakdowns.
pub trait CategoryTotal {
    /// The category value, `None` when the server grouped null rows.
    fn category(&self) -> Option<&str>;

    /// Number of incidents in the category.
    fn total(&self) -> u64;
}

macro_rules! category_count {
    ($(#[$meta:meta])* $name:ident, $field:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            #[allow(missing_docs)]
            #[serde(default, deserialize_with = "de::opt_text")]
            pub $field: Option<String>,
            /// Number of incidents.
            #[serde(default)]
            pub total: u64,
        }

        impl CategoryTotal for $name {
            fn category(&self) -> Option<&str> {
                self.$field.as_deref()
            }

            fn total(&self) -> u64 {
                self.total
            }
        }
    };
}

category_count!(
    /// Incident count for one shift.
    TurnoCount,
    turno
);
category_count!(
    /// Incident count for one trunk line.
    TroncalCount,
    troncal
);
category_count!(
    /// Incident count for one company.
    EmpresaCount,
    empresa
);
category_count!(
    /// Incident count for one primary incident type.
    TipoCount,
    tipo
);

/// Daily aggregate returned by `GET /reports/diario`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstadisticasDiarias {
    /// Report date (`YYYY-MM-DD`).
    pub fecha: String,
    /// Total incidents on that date.
    pub total_incidencias: u64,
    /// Breakdown by shift.
    #[serde(default)]
    pub por_turno: Vec<TurnoCount>,
    /// Breakdown by trunk line.
    #[serde(default)]
    pub por_troncal: Vec<TroncalCount>,
    /// Breakdown by company.
    #[serde(default)]
    pub por_empresa: Vec<EmpresaCount>,
    /// Breakdown by primary incident type, when the server includes it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub por_tipo_incidencia: Vec<TipoCount>,
}

impl EstadisticasDiarias {
    /// Returns the count for `turno`, or 0 when the shift is absent.
    #[must_use]
    pub fn total_turno(&self, turno: Turno) -> u64 {
        self.por_turno
            .iter()
            .find(|t| t.turno.as_deref() == Some(turno.as_ref()))
            .map_or(0, |t| t.total)
    }
}

/// Incident count for one month of a [`TendenciaMensual`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MesCount {
    /// Month number, 1-12.
    pub mes: u32,
    /// Number of incidents.
    pub total: u64,
}

/// Yearly aggregate returned by `GET /queries/tendencias/mensuales`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TendenciaMensual {
    /// Year the trend covers.
    #[serde(rename = "año")]
    pub anio: i32,
    /// Months with at least one incident, in ascending order.
    #[serde(default)]
    pub tendencias: Vec<MesCount>,
}

/// Response body of `GET /reports/top-incidencias`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopIncidencias {
    /// Most frequent primary incident types, most frequent first.
    #[serde(default)]
    pub top_incidencias: Vec<TipoCount>,
}

impl TopIncidencias {
    /// Returns the non-null incident types in ranking order.
    #[must_use]
    pub fn tipos(&self) -> Vec<String> {
        self.top_incidencias
            .iter()
            .filter_map(|t| t.tipo.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falsy_filters_produce_no_pairs() {
        let mut filtros = FiltrosConsulta::default();
        assert!(filtros.query_pairs().is_empty());

        filtros.set(CampoFiltro::Troncal, "");
        filtros.set(CampoFiltro::Empresa, "");
        assert!(filtros.is_empty());
        assert_eq!(filtros.get(CampoFiltro::Troncal), None);
    }

    #[test]
    fn truthy_filters_appear_once_in_field_order() {
        let mut filtros = FiltrosConsulta::default();
        filtros.set(CampoFiltro::Empresa, "STG");
        filtros.set(CampoFiltro::Troncal, "2");
        filtros.set(CampoFiltro::Turno, "");

        assert_eq!(
            filtros.query_pairs(),
            vec![("troncal", "2"), ("empresa", "STG")]
        );
    }

    #[test]
    fn every_field_uses_its_snake_case_key() {
        let mut filtros = FiltrosConsulta::default();
        for campo in CampoFiltro::all() {
            filtros.set(*campo, "x");
            assert_eq!(campo.as_ref().parse::<CampoFiltro>().unwrap(), *campo);
        }

        let keys: Vec<&str> = filtros.query_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "fecha_inicio",
                "fecha_fin",
                "troncal",
                "empresa",
                "tipo_incidencia",
                "turno"
            ]
        );
    }

    #[test]
    fn incidencia_accepts_server_column_names() {
        let json = serde_json::json!({
            "id": 7,
            "Fecha": "2025-01-15 08:30:00",
            "Troncal": "2",
            "Ruta": "Guasmo - Río Daule",
            "Bus": 1042,
            "Incidencia_primaria": "Retraso",
            "turno": "Mañana",
            "empresa": "STG",
            "Observaciones": null
        });
        let inc: Incidencia = serde_json::from_value(json).unwrap();
        assert_eq!(inc.id, 7);
        assert_eq!(inc.fecha.as_deref(), Some("2025-01-15 08:30:00"));
        assert_eq!(inc.bus.as_deref(), Some("1042"));
        assert_eq!(inc.incidencia_primaria.as_deref(), Some("Retraso"));
        assert_eq!(inc.observaciones, None);
    }

    #[test]
    fn incidencia_accepts_schema_field_names() {
        let json = serde_json::json!({
            "id": 1,
            "fecha": "2025-01-15T08:30:00",
            "troncal": "1",
            "incidencia_primaria": "Choque"
        });
        let inc: Incidencia = serde_json::from_value(json).unwrap();
        assert_eq!(inc.troncal.as_deref(), Some("1"));
        assert_eq!(inc.incidencia_primaria.as_deref(), Some("Choque"));
    }

    #[test]
    fn missing_shift_counts_as_zero() {
        let json = serde_json::json!({
            "fecha": "2025-01-15",
            "total_incidencias": 42,
            "por_turno": [{"turno": "Mañana", "total": 20}, {"turno": null, "total": 2}],
            "por_troncal": [],
            "por_empresa": []
        });
        let stats: EstadisticasDiarias = serde_json::from_value(json).unwrap();
        assert_eq!(stats.total_turno(Turno::Manana), 20);
        assert_eq!(stats.total_turno(Turno::Noche), 0);
    }

    #[test]
    fn monthly_trend_reads_year_key() {
        let json = serde_json::json!({
            "año": 2024,
            "tendencias": [{"mes": 1, "total": 5}, {"mes": 3, "total": 9}]
        });
        let trend: TendenciaMensual = serde_json::from_value(json).unwrap();
        assert_eq!(trend.anio, 2024);
        assert_eq!(trend.tendencias[1], MesCount { mes: 3, total: 9 });
    }

    #[test]
    fn turno_display_matches_server_values() {
        assert_eq!(Turno::Manana.to_string(), "Mañana");
        assert_eq!("Noche".parse::<Turno>().unwrap(), Turno::Noche);
    }
}
