//! Non-interactive subcommands.
//!
//! Each handler returns `Ok(false)` when the page reported a failure the
//! user should see as a non-zero exit status.

use std::path::Path;

use chrono::{Datelike as _, NaiveDate, Utc};
use console::style;
use metrovia_cli_utils::{Spinner, with_spinner};
use metrovia_client::{IncidenciasApi as _, SelectedFile};
use metrovia_dashboard::consultas::ConsultasPage;
use metrovia_dashboard::export::Quoting;
use metrovia_dashboard::reportes::ReportesPage;
use metrovia_dashboard::upload::{UploadPage, comprobar_ruta};
use metrovia_incidencia_models::CampoFiltro;

use crate::{App, render};

type CommandResult = Result<bool, Box<dyn std::error::Error>>;

/// Today's date in UTC.
pub fn hoy() -> NaiveDate {
    Utc::now().date_naive()
}

/// Uploads the page's file. The outcome replaces the spinner line.
///
/// Returns `None` when nothing was sent.
pub async fn send_upload(app: &App, page: &mut UploadPage) -> Option<bool> {
    let spinner = Spinner::start(&app.multi, "Subiendo archivo...");
    let outcome = page.upload(&app.api).await?;
    spinner.finish(render::upload_outcome(outcome));
    Some(outcome.success)
}

/// Checks, selects and uploads `path`.
pub async fn upload_file(app: &App, page: &mut UploadPage, path: &Path) -> CommandResult {
    if let Err(rejected) = comprobar_ruta(path) {
        eprintln!("{}", style(rejected).red().bold());
        return Ok(false);
    }

    let file = SelectedFile::from_path(path)?;
    if let Err(rejected) = page.select_file(file) {
        eprintln!("{}", style(rejected).red().bold());
        return Ok(false);
    }

    Ok(send_upload(app, page).await.unwrap_or(false))
}

pub async fn upload(app: &App, path: &Path) -> CommandResult {
    let mut page = UploadPage::new();
    upload_file(app, &mut page, path).await
}

pub async fn consultar(
    app: &App,
    filtros: Vec<(CampoFiltro, String)>,
    export: Option<&Path>,
    quoting: Quoting,
) -> CommandResult {
    let mut page = ConsultasPage::new();
    for (campo, value) in filtros {
        page.set_filtro(campo, value);
    }

    with_spinner(&app.multi, "Buscando incidencias...", page.search(&app.api)).await;

    if let Some(alert) = page.take_alert() {
        eprintln!("{}", style(alert).red().bold());
        return Ok(false);
    }

    print!("{}", render::consultas(&page));

    if let Some(dir) = export {
        export_page(&page, dir, quoting)?;
    }
    Ok(true)
}

/// Writes the page's rows to `dir`, or explains why there is nothing to
/// write.
pub fn export_page(
    page: &ConsultasPage,
    dir: &Path,
    quoting: Quoting,
) -> Result<(), Box<dyn std::error::Error>> {
    if !page.can_export() {
        println!("{}", style("No hay incidencias para exportar").dim());
        return Ok(());
    }

    let path = page.export_to_dir(dir, hoy(), quoting)?;
    println!(
        "{} {} ({} filas)",
        style("CSV exportado:").green(),
        path.display(),
        page.incidencias().len()
    );
    Ok(())
}

pub async fn reporte(app: &App, fecha: Option<NaiveDate>, anio: Option<i32>) -> CommandResult {
    let today = hoy();
    let mut page = ReportesPage::new(today, &app.config.report_years)
        .with_seleccion(fecha.unwrap_or(today), anio.unwrap_or_else(|| today.year()));

    with_spinner(&app.multi, "Cargando reportes...", page.load(&app.api)).await;

    print!("{}", render::reportes(&page));
    Ok(true)
}

pub async fn top(app: &App, limite: u32) -> CommandResult {
    let top = with_spinner(
        &app.multi,
        "Cargando incidencias frecuentes...",
        app.api.get_top_incidencias(limite),
    )
    .await?;

    print!("{}", render::top(&top));
    Ok(true)
}

pub async fn semanal(app: &App, fecha_fin: Option<NaiveDate>) -> CommandResult {
    let value = with_spinner(
        &app.multi,
        "Cargando tendencia semanal...",
        app.api.get_tendencia_semanal(fecha_fin),
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(true)
}

pub async fn comparativo(app: &App, fecha1: NaiveDate, fecha2: NaiveDate) -> CommandResult {
    let value = with_spinner(
        &app.multi,
        "Cargando comparativo...",
        app.api.get_comparativo(fecha1, fecha2),
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(true)
}
