//! Chart values and their text rendering.
//!
//! Charts are plain data: a title, an accent colour and a list of
//! `(name, value)` points. [`BarChart::render`] and [`LineChart::render`]
//! draw them as fixed-width text for the terminal.

use std::fmt::Write as _;

use metrovia_incidencia_models::{CategoryTotal, EstadisticasDiarias, TendenciaMensual};

/// Accent colour of the per-line chart.
pub const COLOR_TRONCAL: &str = "#3b82f6";
/// Accent colour of the per-shift chart.
pub const COLOR_TURNO: &str = "#10b981";
/// Accent colour of the per-company chart.
pub const COLOR_EMPRESA: &str = "#8b5cf6";
/// Accent colour of the monthly trend chart.
pub const COLOR_TENDENCIA: &str = "#f59e0b";

/// Short month names, January first.
pub const MESES: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

/// Label used for categories the server grouped as `null`.
pub const SIN_DATO: &str = "Sin dato";

/// One labelled value of a chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPoint {
    /// Category or x-axis label.
    pub name: String,
    /// Plotted value.
    pub value: u64,
}

impl ChartPoint {
    /// Creates a point.
    #[must_use]
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A bar chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarChart {
    /// Chart heading.
    pub title: String,
    /// Bar colour as a CSS hex string.
    pub color: &'static str,
    /// Bars in display order.
    pub data: Vec<ChartPoint>,
}

/// A line chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChart {
    /// Chart heading.
    pub title: String,
    /// Line colour as a CSS hex string.
    pub color: &'static str,
    /// Points in x-axis order.
    pub data: Vec<ChartPoint>,
}

fn label_width(data: &[ChartPoint]) -> usize {
    data.iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
}

/// Scales `value` to `0..=width` relative to `max`.
#[allow(clippy::cast_possible_truncation)]
fn scale(value: u64, max: u64, width: usize) -> usize {
    if max == 0 {
        return 0;
    }
    ((u128::from(value) * width as u128) / u128::from(max)) as usize
}

impl BarChart {
    /// Creates a bar chart.
    #[must_use]
    pub fn new(title: impl Into<String>, color: &'static str, data: Vec<ChartPoint>) -> Self {
        Self {
            title: title.into(),
            color,
            data,
        }
    }

    /// Draws one row per bar, the longest bar spanning `width` cells.
    #[must_use]
    pub fn render(&self, width: usize) -> String {
        let mut out = format!("{}\n", self.title);
        if self.data.is_empty() {
            out.push_str("  (sin datos)\n");
            return out;
        }

        let max = self.data.iter().map(|p| p.value).max().unwrap_or(0);
        let pad = label_width(&self.data);
        for point in &self.data {
            let bar = "█".repeat(scale(point.value, max, width));
            writeln!(out, "  {:<pad$} │{bar} {}", point.name, point.value).unwrap();
        }
        out
    }
}

impl LineChart {
    /// Creates a line chart.
    #[must_use]
    pub fn new(title: impl Into<String>, color: &'static str, data: Vec<ChartPoint>) -> Self {
        Self {
            title: title.into(),
            color,
            data,
        }
    }

    /// Draws one row per point with a marker at the scaled position.
    #[must_use]
    pub fn render(&self, width: usize) -> String {
        let mut out = format!("{}\n", self.title);
        if self.data.is_empty() {
            out.push_str("  (sin datos)\n");
            return out;
        }

        let max = self.data.iter().map(|p| p.value).max().unwrap_or(0);
        let pad = label_width(&self.data);
        for point in &self.data {
            let offset = " ".repeat(scale(point.value, max, width));
            writeln!(out, "  {:<pad$} │{offset}● {}", point.name, point.value).unwrap();
        }
        out
    }
}

fn category_name(item: &impl CategoryTotal) -> String {
    item.category().unwrap_or(SIN_DATO).to_string()
}

/// Returns the month name for `mes` (1-12), or the number itself when out
/// of range.
#[must_use]
pub fn nombre_mes(mes: u32) -> String {
    usize::try_from(mes)
        .ok()
        .and_then(|m| m.checked_sub(1))
        .and_then(|i| MESES.get(i))
        .map_or_else(|| mes.to_string(), |m| (*m).to_string())
}

/// "Incidencias por Troncal": one bar per line, labelled `Troncal {x}`.
#[must_use]
pub fn por_troncal(stats: &EstadisticasDiarias) -> BarChart {
    BarChart::new(
        "Incidencias por Troncal",
        COLOR_TRONCAL,
        stats
            .por_troncal
            .iter()
            .map(|t| ChartPoint::new(format!("Troncal {}", category_name(t)), t.total()))
            .collect(),
    )
}

/// "Incidencias por Turno": one bar per shift.
#[must_use]
pub fn por_turno(stats: &EstadisticasDiarias) -> BarChart {
    BarChart::new(
        "Incidencias por Turno",
        COLOR_TURNO,
        stats
            .por_turno
            .iter()
            .map(|t| ChartPoint::new(category_name(t), t.total()))
            .collect(),
    )
}

/// "Incidencias por Empresa": one bar per company.
#[must_use]
pub fn por_empresa(stats: &EstadisticasDiarias) -> BarChart {
    BarChart::new(
        "Incidencias por Empresa",
        COLOR_EMPRESA,
        stats
            .por_empresa
            .iter()
            .map(|e| ChartPoint::new(category_name(e), e.total()))
            .collect(),
    )
}

/// "Evolución de Incidencias por Mes": one point per reported month.
#[must_use]
pub fn tendencia_mensual(tendencia: &TendenciaMensual) -> LineChart {
    LineChart::new(
        "Evolución de Incidencias por Mes",
        COLOR_TENDENCIA,
        tendencia
            .tendencias
            .iter()
            .map(|t| ChartPoint::new(nombre_mes(t.mes), t.total))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrovia_incidencia_models::{MesCount, TroncalCount, TurnoCount};

    #[test]
    fn month_names_cover_the_year() {
        assert_eq!(nombre_mes(1), "Ene");
        assert_eq!(nombre_mes(12), "Dic");
        assert_eq!(nombre_mes(0), "0");
        assert_eq!(nombre_mes(13), "13");
    }

    #[test]
    fn line_series_are_prefixed() {
        let stats = EstadisticasDiarias {
            fecha: "2025-01-15".to_string(),
            total_incidencias: 5,
            por_troncal: vec![
                TroncalCount {
                    troncal: Some("1".to_string()),
                    total: 3,
                },
                TroncalCount {
                    troncal: None,
                    total: 2,
                },
            ],
            ..EstadisticasDiarias::default()
        };
        let chart = por_troncal(&stats);
        assert_eq!(
            chart.data,
            vec![
                ChartPoint::new("Troncal 1", 3),
                ChartPoint::new(format!("Troncal {SIN_DATO}"), 2),
            ]
        );
        assert_eq!(chart.color, COLOR_TRONCAL);
    }

    #[test]
    fn shift_series_keep_server_order() {
        let stats = EstadisticasDiarias {
            por_turno: vec![
                TurnoCount {
                    turno: Some("Tarde".to_string()),
                    total: 4,
                },
                TurnoCount {
                    turno: Some("Mañana".to_string()),
                    total: 9,
                },
            ],
            ..EstadisticasDiarias::default()
        };
        let names: Vec<String> = por_turno(&stats).data.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Tarde", "Mañana"]);
    }

    #[test]
    fn monthly_trend_uses_month_names() {
        let trend = TendenciaMensual {
            anio: 2024,
            tendencias: vec![MesCount { mes: 2, total: 7 }, MesCount { mes: 5, total: 1 }],
        };
        let chart = tendencia_mensual(&trend);
        assert_eq!(
            chart.data,
            vec![ChartPoint::new("Feb", 7), ChartPoint::new("May", 1)]
        );
    }

    #[test]
    fn bars_scale_to_width() {
        let chart = BarChart::new(
            "t",
            COLOR_TURNO,
            vec![ChartPoint::new("a", 10), ChartPoint::new("bb", 5)],
        );
        let rendered = chart.render(20);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "t");
        assert_eq!(lines[1].matches('█').count(), 20);
        assert_eq!(lines[2].matches('█').count(), 10);
        assert!(lines[1].ends_with(" 10"));
    }

    #[test]
    fn empty_and_zero_charts_render() {
        let empty = BarChart::new("vacío", COLOR_EMPRESA, Vec::new());
        assert!(empty.render(10).contains("(sin datos)"));

        let zeros = LineChart::new("ceros", COLOR_TENDENCIA, vec![ChartPoint::new("Ene", 0)]);
        assert!(zeros.render(10).contains("Ene │● 0"));
    }
}
