//! CSV export of loaded incidents.
//!
//! By default fields are joined with literal commas and never quoted, so
//! a comma or newline inside a free-text field shifts the columns of that
//! row. [`Quoting::Necessary`] opts into standard CSV quoting.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use metrovia_incidencia_models::Incidencia;

use crate::fecha::formatear_fecha;

/// Header row of the exported file, in column order.
pub const CSV_HEADERS: [&str; 7] = [
    "Fecha",
    "Troncal",
    "Ruta",
    "Bus",
    "Incidencia Primaria",
    "Turno",
    "Empresa",
];

/// Errors writing an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output was not valid UTF-8.
    #[error("Invalid UTF-8 in export: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// How fields are quoted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Quoting {
    /// Literal comma join, no quoting or escaping.
    #[default]
    Never,
    /// Quote fields containing delimiters, quotes or newlines.
    Necessary,
}

impl Quoting {
    const fn style(self) -> QuoteStyle {
        match self {
            Self::Never => QuoteStyle::Never,
            Self::Necessary => QuoteStyle::Necessary,
        }
    }
}

fn row(inc: &Incidencia) -> [String; 7] {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    [
        inc.fecha
            .as_deref()
            .filter(|f| !f.is_empty())
            .map(formatear_fecha)
            .unwrap_or_default(),
        text(&inc.troncal),
        text(&inc.ruta),
        text(&inc.bus),
        text(&inc.incidencia_primaria),
        text(&inc.turno),
        text(&inc.empresa),
    ]
}

/// Header plus one line per incident, with no newline after the last
/// line.
fn render(incidencias: &[Incidencia], quoting: Quoting) -> Result<Vec<u8>, ExportError> {
    let mut wtr = WriterBuilder::new()
        .quote_style(quoting.style())
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(CSV_HEADERS)?;
    for inc in incidencias {
        wtr.write_record(row(inc))?;
    }
    let mut buf = wtr.into_inner().map_err(csv::IntoInnerError::into_error)?;
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    Ok(buf)
}

/// Writes the header and one row per incident to `writer`.
///
/// # Errors
///
/// Returns [`ExportError`] if writing fails.
pub fn write_csv<W: Write>(
    incidencias: &[Incidencia],
    mut writer: W,
    quoting: Quoting,
) -> Result<(), ExportError> {
    writer.write_all(&render(incidencias, quoting)?)?;
    writer.flush()?;
    Ok(())
}

/// Renders the export in memory.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization fails.
pub fn to_csv_string(incidencias: &[Incidencia], quoting: Quoting) -> Result<String, ExportError> {
    Ok(String::from_utf8(render(incidencias, quoting)?)?)
}

/// `incidencias-<YYYY-MM-DD>.csv`
#[must_use]
pub fn file_name(fecha: NaiveDate) -> String {
    format!("incidencias-{}.csv", fecha.format("%Y-%m-%d"))
}

/// Writes the export to `dir`, named after `fecha`, and returns its path.
///
/// # Errors
///
/// Returns [`ExportError`] if the directory or file cannot be written.
pub fn write_to_dir(
    incidencias: &[Incidencia],
    dir: &Path,
    fecha: NaiveDate,
    quoting: Quoting,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name(fecha));
    let file = std::fs::File::create(&path)?;
    write_csv(incidencias, std::io::BufWriter::new(file), quoting)?;
    log::info!("Exported {} incidents to {}", incidencias.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incidencia(n: usize) -> Incidencia {
        Incidencia {
            id: i64::try_from(n).unwrap(),
            fecha: Some("2025-01-15 08:30:00".to_string()),
            troncal: Some("2".to_string()),
            ruta: Some(format!("Ruta {n}")),
            bus: Some(format!("{}", 1000 + n)),
            incidencia_primaria: Some("Retraso".to_string()),
            turno: Some("Mañana".to_string()),
            empresa: Some("STG".to_string()),
            ..Incidencia::default()
        }
    }

    #[test]
    fn header_plus_one_line_per_row() {
        let rows: Vec<Incidencia> = (0..3).map(incidencia).collect();
        let csv = to_csv_string(&rows, Quoting::Never).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Fecha,Troncal,Ruta,Bus,Incidencia Primaria,Turno,Empresa");
        assert_eq!(lines[1], "15/1/2025,2,Ruta 0,1000,Retraso,Mañana,STG");
        assert!(lines.iter().all(|l| l.matches(',').count() == 6));
    }

    #[test]
    fn empty_result_set_exports_only_header() {
        let csv = to_csv_string(&[], Quoting::Never).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn missing_fields_become_empty_columns() {
        let csv = to_csv_string(&[Incidencia::default()], Quoting::Never).unwrap();
        assert_eq!(csv.lines().nth(1), Some(",,,,,,"));
    }

    #[test]
    fn embedded_commas_are_not_escaped_by_default() {
        let mut inc = incidencia(0);
        inc.ruta = Some("Guasmo, Centro".to_string());
        let csv = to_csv_string(&[inc.clone()], Quoting::Never).unwrap();
        assert_eq!(csv.lines().nth(1).unwrap().matches(',').count(), 7);

        let quoted = to_csv_string(&[inc], Quoting::Necessary).unwrap();
        assert!(quoted.contains("\"Guasmo, Centro\""));
    }

    #[test]
    fn last_row_has_no_trailing_newline() {
        let inc = Incidencia {
            ruta: Some("a\"b".to_string()),
            ..Incidencia::default()
        };
        let csv = to_csv_string(&[inc], Quoting::Never).unwrap();
        assert_eq!(
            csv,
            "Fecha,Troncal,Ruta,Bus,Incidencia Primaria,Turno,Empresa\n,,a\"b,,,,"
        );

        let header_only = to_csv_string(&[], Quoting::Never).unwrap();
        assert!(!header_only.ends_with('\n'));
    }

    #[test]
    fn file_name_uses_iso_date() {
        let fecha = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(file_name(fecha), "incidencias-2025-03-09.csv");
    }

    #[test]
    fn writes_file_into_directory() {
        let dir = std::env::temp_dir().join("metrovia_export_test");
        let _ = std::fs::remove_dir_all(&dir);

        let fecha = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let path = write_to_dir(&[incidencia(1)], &dir, fecha, Quoting::Never).unwrap();
        assert_eq!(path, dir.join("incidencias-2025-01-15.csv"));
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
