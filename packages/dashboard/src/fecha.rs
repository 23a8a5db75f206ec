//! Lenient date display.

use chrono::{DateTime, Datelike as _, NaiveDateTime};

/// Shown when an incident has no date.
pub const SIN_FECHA: &str = "No definida";

const FORMATOS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

fn parse_fecha_hora(s: &str) -> Option<NaiveDateTime> {
    FORMATOS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Formats a server date-time as `d/m/yyyy` (es-ES short date).
///
/// Only strings containing both `-` and `:` are parsed; anything that is
/// not a recognised date-time is returned unchanged. An empty string
/// becomes [`SIN_FECHA`]. Never fails.
#[must_use]
pub fn formatear_fecha(fecha: &str) -> String {
    if fecha.is_empty() {
        return SIN_FECHA.to_string();
    }

    if fecha.contains('-') && fecha.contains(':') {
        if let Some(dt) = parse_fecha_hora(fecha) {
            return format!("{}/{}/{}", dt.day(), dt.month(), dt.year());
        }
    }

    fecha.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_server_timestamp() {
        assert_eq!(formatear_fecha("2025-01-15 08:30:00"), "15/1/2025");
        assert_eq!(formatear_fecha("2024-11-03T22:05:10.250"), "3/11/2024");
        assert_eq!(formatear_fecha("2024-11-03T22:05:10-05:00"), "3/11/2024");
    }

    #[test]
    fn date_without_time_is_kept() {
        assert_eq!(formatear_fecha("2025-01-15"), "2025-01-15");
    }

    #[test]
    fn unparsable_values_are_returned_unchanged() {
        for raw in ["ayer", "2025-13-45 99:99:99", "15/01/2025 08:00", "-:", "  "] {
            assert_eq!(formatear_fecha(raw), raw);
        }
    }

    #[test]
    fn empty_value_is_undefined() {
        assert_eq!(formatear_fecha(""), SIN_FECHA);
    }
}
