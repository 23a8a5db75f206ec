//! Terminal rendering of page state.

use std::fmt::Write as _;

use console::{Color, style};
use metrovia_dashboard::charts::{
    BarChart, COLOR_EMPRESA, COLOR_TENDENCIA, COLOR_TRONCAL, COLOR_TURNO, LineChart,
};
use metrovia_dashboard::consultas::{ConsultasPage, FilaTabla, SIN_RESULTADOS};
use metrovia_dashboard::reportes::ReportesPage;
use metrovia_dashboard::upload::UploadOutcome;
use metrovia_incidencia_models::TopIncidencias;

/// Width of the longest chart bar, in cells.
const CHART_WIDTH: usize = 40;

/// Widest table column before cells are cut.
const MAX_CELL: usize = 28;

fn accent(hex: &str) -> Color {
    match hex {
        COLOR_TRONCAL => Color::Blue,
        COLOR_TURNO => Color::Green,
        COLOR_EMPRESA => Color::Magenta,
        COLOR_TENDENCIA => Color::Yellow,
        _ => Color::White,
    }
}

fn cut(cell: &str) -> String {
    if cell.chars().count() > MAX_CELL {
        format!("{}…", cell.chars().take(MAX_CELL - 1).collect::<String>())
    } else {
        cell.to_string()
    }
}

pub fn upload_outcome(outcome: &UploadOutcome) -> String {
    if outcome.success {
        style(&outcome.message).green().to_string()
    } else {
        style(&outcome.message).red().to_string()
    }
}

/// Pads every column to its widest cell.
pub fn table(rows: &[FilaTabla]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.cells().iter().map(|c| cut(c)).collect())
        .collect();

    let mut widths: Vec<usize> = FilaTabla::HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |values: &[String]| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!("{v:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let headers: Vec<String> = FilaTabla::HEADERS.iter().map(ToString::to_string).collect();
    let mut out = format!("{}\n", style(line(&headers)).bold());
    out.push_str(&"-".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1)));
    out.push('\n');
    for row in &cells {
        out.push_str(line(row).trim_end());
        out.push('\n');
    }
    out
}

pub fn consultas(page: &ConsultasPage) -> String {
    let mut out = String::new();

    let chips = page.active_chips();
    if !chips.is_empty() {
        writeln!(out, "{} {}", style("Filtros activos:").bold(), chips.join(" | ")).unwrap();
        out.push('\n');
    }

    if page.show_empty_state() {
        writeln!(out, "{}", style(SIN_RESULTADOS).dim()).unwrap();
        return out;
    }

    writeln!(out, "{}", style(page.heading()).bold()).unwrap();
    out.push('\n');
    out.push_str(&table(&page.table_rows()));

    if let Some(footer) = page.footer() {
        writeln!(out, "\n{}", style(footer).dim()).unwrap();
    }
    out
}

fn bar_chart(chart: &BarChart) -> String {
    let rendered = chart.render(CHART_WIDTH);
    let mut lines = rendered.lines();
    let title = lines.next().unwrap_or_default();
    let mut out = format!("{}\n", style(title).bold().fg(accent(chart.color)));
    for line in lines {
        writeln!(out, "{}", style(line).fg(accent(chart.color))).unwrap();
    }
    out
}

pub fn line_chart(chart: &LineChart) -> String {
    let rendered = chart.render(CHART_WIDTH);
    let mut lines = rendered.lines();
    let title = lines.next().unwrap_or_default();
    let mut out = format!("{}\n", style(title).bold().fg(accent(chart.color)));
    for line in lines {
        writeln!(out, "{}", style(line).fg(accent(chart.color))).unwrap();
    }
    out
}

/// Counters and daily charts, followed by the monthly trend.
pub fn reportes(page: &ReportesPage) -> String {
    let mut out = String::new();

    if page.estadisticas().is_some() {
        writeln!(out, "{}", style(format!("Reporte del {}", page.fecha())).bold()).unwrap();
        for contador in page.contadores() {
            writeln!(out, "  {:<18} {}", contador.label, style(contador.value).cyan().bold())
                .unwrap();
        }
        for chart in page.bar_charts() {
            out.push('\n');
            out.push_str(&bar_chart(&chart));
        }
    } else {
        writeln!(out, "{}", style(format!("Sin reporte para {}", page.fecha())).dim()).unwrap();
    }

    if let Some(chart) = page.line_chart() {
        out.push('\n');
        writeln!(out, "{}", style(format!("Tendencias {}", page.anio())).bold()).unwrap();
        out.push_str(&line_chart(&chart));
    }
    out
}

pub fn top(top: &TopIncidencias) -> String {
    if top.top_incidencias.is_empty() {
        return format!("{}\n", style(SIN_RESULTADOS).dim());
    }

    let mut out = String::new();
    for (i, item) in top.top_incidencias.iter().enumerate() {
        writeln!(
            out,
            "{:>3}. {} ({})",
            i + 1,
            item.tipo.as_deref().unwrap_or("Sin dato"),
            item.total
        )
        .unwrap();
    }
    out
}
