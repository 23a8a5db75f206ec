//! Interactive menu.
//!
//! The home menu offers the dashboard sections. Each section keeps its
//! page state until the user goes back to the menu.

use std::path::PathBuf;

use chrono::NaiveDate;
use console::style;
use dialoguer::{Confirm, Input, Select};
use metrovia_cli_utils::with_spinner;
use metrovia_client::{DEFAULT_TOP_LIMIT, IncidenciasApi as _};
use metrovia_dashboard::consultas::ConsultasPage;
use metrovia_dashboard::export::Quoting;
use metrovia_dashboard::reportes::ReportesPage;
use metrovia_dashboard::upload::{UploadPage, UploadPhase};
use metrovia_incidencia_models::{CampoFiltro, Turno};

use crate::commands::{export_page, hoy, send_upload, upload_file};
use crate::{App, render};

type MenuResult = Result<(), Box<dyn std::error::Error>>;

/// Label of the "no filter" entry in choice prompts.
const CUALQUIERA: &str = "(cualquiera)";

/// Sections of the home menu.
enum Section {
    CargarDatos,
    Consultas,
    Reportes,
    Tendencias,
    Salir,
}

impl Section {
    const ALL: &[Self] = &[
        Self::CargarDatos,
        Self::Consultas,
        Self::Reportes,
        Self::Tendencias,
        Self::Salir,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::CargarDatos => "Cargar Datos: subir archivos Excel con incidencias",
            Self::Consultas => "Consultas Avanzadas: filtrar y buscar incidencias",
            Self::Reportes => "Reportes: estadísticas diarias y gráficos",
            Self::Tendencias => "Tendencias: evolución mensual e incidencias frecuentes",
            Self::Salir => "Salir",
        }
    }
}

/// Actions of the query section.
enum ConsultaAction {
    EditarFiltro,
    Buscar,
    Limpiar,
    Exportar,
    Volver,
}

impl ConsultaAction {
    const ALL: &[Self] = &[
        Self::EditarFiltro,
        Self::Buscar,
        Self::Limpiar,
        Self::Exportar,
        Self::Volver,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::EditarFiltro => "Editar filtro",
            Self::Buscar => "Buscar",
            Self::Limpiar => "Limpiar",
            Self::Exportar => "Exportar CSV",
            Self::Volver => "Volver",
        }
    }
}

/// Actions of the reports section.
enum ReporteAction {
    CambiarFecha,
    CambiarAnio,
    Volver,
}

impl ReporteAction {
    const ALL: &[Self] = &[Self::CambiarFecha, Self::CambiarAnio, Self::Volver];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::CambiarFecha => "Cambiar fecha",
            Self::CambiarAnio => "Cambiar año",
            Self::Volver => "Volver",
        }
    }
}

/// Runs the home menu until the user exits.
///
/// # Errors
///
/// Returns an error if a prompt fails or a file cannot be read.
pub async fn run(app: &App) -> MenuResult {
    println!("{}", style("Metrovía - Incidencias Operativas").bold());
    println!("API: {}", app.api.base_url());
    println!();

    loop {
        let labels: Vec<&str> = Section::ALL.iter().map(Section::label).collect();
        let idx = Select::new()
            .with_prompt("¿Qué deseas hacer?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Section::ALL[idx] {
            Section::CargarDatos => cargar_datos(app).await?,
            Section::Consultas => consultas(app).await?,
            Section::Reportes => reportes(app).await?,
            Section::Tendencias => tendencias(app).await?,
            Section::Salir => return Ok(()),
        }
        println!();
    }
}

async fn cargar_datos(app: &App) -> MenuResult {
    let path: String = Input::new()
        .with_prompt("Archivo Excel (.xlsx o .xls)")
        .interact_text()?;
    let path = PathBuf::from(path.trim());

    let mut page = UploadPage::new();
    if let Err(e) = upload_file(app, &mut page, &path).await {
        eprintln!("{}", style(format!("No se pudo leer {}: {e}", path.display())).red());
        return Ok(());
    }

    while page.phase() == UploadPhase::Failed {
        let retry = Confirm::new()
            .with_prompt("¿Reintentar la carga?")
            .default(true)
            .interact()?;
        if !retry {
            page.clear_selection();
            break;
        }
        send_upload(app, &mut page).await;
    }
    Ok(())
}

async fn consultas(app: &App) -> MenuResult {
    let mut page = ConsultasPage::new();
    with_spinner(
        &app.multi,
        "Cargando tipos de incidencia...",
        page.load_tipos_incidencia(&app.api),
    )
    .await;

    loop {
        let chips = page.active_chips();
        if !chips.is_empty() {
            println!("{} {}", style("Filtros activos:").bold(), chips.join(" | "));
        }

        let labels: Vec<&str> = ConsultaAction::ALL
            .iter()
            .map(ConsultaAction::label)
            .collect();
        let idx = Select::new()
            .with_prompt("Consultas Avanzadas")
            .items(&labels)
            .default(0)
            .interact()?;

        match ConsultaAction::ALL[idx] {
            ConsultaAction::EditarFiltro => editar_filtro(&mut page)?,
            ConsultaAction::Buscar => {
                with_spinner(&app.multi, "Buscando incidencias...", page.search(&app.api)).await;
                if let Some(alert) = page.take_alert() {
                    eprintln!("{}", style(alert).red().bold());
                } else {
                    print!("{}", render::consultas(&page));
                }
            }
            ConsultaAction::Limpiar => {
                page.clear();
                print!("{}", render::consultas(&page));
            }
            ConsultaAction::Exportar => {
                let dir: String = Input::new()
                    .with_prompt("Directorio de destino")
                    .default(".".to_string())
                    .interact_text()?;
                export_page(&page, &PathBuf::from(dir), Quoting::Never)?;
            }
            ConsultaAction::Volver => return Ok(()),
        }
    }
}

fn editar_filtro(page: &mut ConsultasPage) -> MenuResult {
    let labels: Vec<&str> = CampoFiltro::all()
        .iter()
        .map(|c| c.chip_label())
        .collect();
    let idx = Select::new()
        .with_prompt("Filtro")
        .items(&labels)
        .default(0)
        .interact()?;
    let campo = CampoFiltro::all()[idx];

    let value = match campo {
        CampoFiltro::TipoIncidencia if !page.tipo_options().is_empty() => {
            let options = page.tipo_options();
            let mut items = vec![CUALQUIERA.to_string()];
            items.extend(options.iter().map(|o| o.label.clone()));
            let idx = Select::new()
                .with_prompt("Tipo de incidencia")
                .items(&items)
                .default(0)
                .interact()?;
            idx.checked_sub(1)
                .map_or_else(String::new, |i| options[i].value.clone())
        }
        CampoFiltro::Turno => {
            let mut items = vec![CUALQUIERA.to_string()];
            items.extend(Turno::all().iter().map(ToString::to_string));
            let idx = Select::new()
                .with_prompt("Turno")
                .items(&items)
                .default(0)
                .interact()?;
            if idx == 0 {
                String::new()
            } else {
                items.swap_remove(idx)
            }
        }
        _ => Input::<String>::new()
            .with_prompt(format!("{} (vacío para quitar)", campo.chip_label()))
            .allow_empty(true)
            .interact_text()?
            .trim()
            .to_string(),
    };

    page.set_filtro(campo, value);
    Ok(())
}

fn prompt_fecha(actual: NaiveDate) -> Result<Option<NaiveDate>, Box<dyn std::error::Error>> {
    let raw: String = Input::new()
        .with_prompt("Fecha del reporte (AAAA-MM-DD)")
        .default(actual.to_string())
        .interact_text()?;

    match raw.trim().parse::<NaiveDate>() {
        Ok(fecha) => Ok(Some(fecha)),
        Err(e) => {
            eprintln!("{}", style(format!("Fecha inválida: {e}")).red());
            Ok(None)
        }
    }
}

fn prompt_anio(page: &ReportesPage) -> Result<i32, Box<dyn std::error::Error>> {
    let years = page.years();
    let default = years.iter().position(|y| *y == page.anio()).unwrap_or(0);
    let idx = Select::new()
        .with_prompt("Año para tendencias")
        .items(years)
        .default(default)
        .interact()?;
    Ok(years[idx])
}

async fn reportes(app: &App) -> MenuResult {
    let mut page = ReportesPage::new(hoy(), &app.config.report_years);
    with_spinner(&app.multi, "Cargando reportes...", page.load(&app.api)).await;
    print!("{}", render::reportes(&page));

    loop {
        let labels: Vec<&str> = ReporteAction::ALL
            .iter()
            .map(ReporteAction::label)
            .collect();
        let idx = Select::new()
            .with_prompt("Reportes y Análisis")
            .items(&labels)
            .default(0)
            .interact()?;

        match ReporteAction::ALL[idx] {
            ReporteAction::CambiarFecha => {
                let Some(fecha) = prompt_fecha(page.fecha())? else {
                    continue;
                };
                with_spinner(
                    &app.multi,
                    "Cargando estadísticas...",
                    page.change_fecha(&app.api, fecha),
                )
                .await;
            }
            ReporteAction::CambiarAnio => {
                let anio = prompt_anio(&page)?;
                with_spinner(
                    &app.multi,
                    "Cargando tendencias...",
                    page.change_anio(&app.api, anio),
                )
                .await;
            }
            ReporteAction::Volver => return Ok(()),
        }
        print!("{}", render::reportes(&page));
    }
}

async fn tendencias(app: &App) -> MenuResult {
    let mut page = ReportesPage::new(hoy(), &app.config.report_years);
    let anio = prompt_anio(&page)?;
    with_spinner(
        &app.multi,
        "Cargando tendencias...",
        page.change_anio(&app.api, anio),
    )
    .await;

    match page.line_chart() {
        Some(chart) => print!("{}", render::line_chart(&chart)),
        None => println!("{}", style(format!("Sin tendencias para {anio}")).dim()),
    }

    match with_spinner(
        &app.multi,
        "Cargando incidencias frecuentes...",
        app.api.get_top_incidencias(DEFAULT_TOP_LIMIT),
    )
    .await
    {
        Ok(top) => {
            println!();
            println!("{}", style("Incidencias más frecuentes").bold());
            print!("{}", render::top(&top));
        }
        Err(e) => log::error!("Failed to load top incidents: {e}"),
    }
    Ok(())
}
