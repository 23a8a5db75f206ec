#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal dashboard for Metrovía operational incidents.
//!
//! ```text
//! metrovia upload incidencias.xlsx
//! metrovia consultar --troncal 2 --empresa STG [--export [DIR]]
//! metrovia reporte [--fecha 2025-01-15] [--anio 2025]
//! metrovia top [--limite 10]
//! metrovia semanal [--fecha-fin 2025-01-15]
//! metrovia comparativo 2025-01-01 2025-02-01
//! ```
//!
//! Running `metrovia` with no subcommand opens the interactive menu.
//!
//! Uses `indicatif-log-bridge` (via [`metrovia_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and spinners never fight for the terminal.

mod commands;
mod interactive;
mod render;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use metrovia_cli_utils::MultiProgress;
use metrovia_client::{ApiClient, Config, DEFAULT_TOP_LIMIT};
use metrovia_dashboard::export::Quoting;
use metrovia_incidencia_models::CampoFiltro;

#[derive(Parser)]
#[command(
    name = "metrovia",
    about = "Dashboard de incidencias operativas de Metrovía"
)]
struct Cli {
    /// API base URL (overrides the config file and `METROVIA_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// TOML config file (defaults to `metrovia.toml` when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an Excel spreadsheet of incidents
    Upload {
        /// Path to a `.xlsx` or `.xls` file
        file: PathBuf,
    },
    /// Search incidents with optional filters
    Consultar {
        #[command(flatten)]
        filtros: FiltrosArgs,

        /// Write the loaded rows as CSV into DIR (default: current directory)
        #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = ".")]
        export: Option<PathBuf>,

        /// Quote CSV fields that contain commas, quotes or newlines
        #[arg(long, requires = "export")]
        quoted: bool,
    },
    /// Daily report and monthly trend
    Reporte {
        /// Report date (YYYY-MM-DD, default: today)
        #[arg(long)]
        fecha: Option<NaiveDate>,

        /// Trend year (default: current year)
        #[arg(long)]
        anio: Option<i32>,
    },
    /// Most frequent incident types
    Top {
        /// Number of entries
        #[arg(long, default_value_t = DEFAULT_TOP_LIMIT)]
        limite: u32,
    },
    /// Weekly trend (raw JSON)
    Semanal {
        /// Last day of the week (YYYY-MM-DD)
        #[arg(long)]
        fecha_fin: Option<NaiveDate>,
    },
    /// Compare two days (raw JSON)
    Comparativo {
        /// First date (YYYY-MM-DD)
        fecha1: NaiveDate,
        /// Second date (YYYY-MM-DD)
        fecha2: NaiveDate,
    },
}

#[derive(Args)]
struct FiltrosArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    fecha_inicio: Option<String>,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    fecha_fin: Option<String>,
    /// Trunk line
    #[arg(long)]
    troncal: Option<String>,
    /// Operating company
    #[arg(long)]
    empresa: Option<String>,
    /// Primary incident type (substring)
    #[arg(long)]
    tipo_incidencia: Option<String>,
    /// Shift (Mañana, Tarde, Noche)
    #[arg(long)]
    turno: Option<String>,
}

impl FiltrosArgs {
    fn into_pairs(self) -> Vec<(CampoFiltro, String)> {
        [
            (CampoFiltro::FechaInicio, self.fecha_inicio),
            (CampoFiltro::FechaFin, self.fecha_fin),
            (CampoFiltro::Troncal, self.troncal),
            (CampoFiltro::Empresa, self.empresa),
            (CampoFiltro::TipoIncidencia, self.tipo_incidencia),
            (CampoFiltro::Turno, self.turno),
        ]
        .into_iter()
        .filter_map(|(campo, value)| value.map(|v| (campo, v)))
        .collect()
    }
}

/// Shared state of one CLI session.
pub struct App {
    pub api: ApiClient,
    pub config: Config,
    pub multi: MultiProgress,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = metrovia_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?.with_base_url(cli.api_url);
    log::debug!("Using API at {}", config.base_url);

    let app = App {
        api: ApiClient::new(&config)?,
        config,
        multi,
    };

    let Some(command) = cli.command else {
        return interactive::run(&app).await;
    };

    let ok = match command {
        Commands::Upload { file } => commands::upload(&app, &file).await?,
        Commands::Consultar {
            filtros,
            export,
            quoted,
        } => {
            let quoting = if quoted {
                Quoting::Necessary
            } else {
                Quoting::Never
            };
            commands::consultar(&app, filtros.into_pairs(), export.as_deref(), quoting).await?
        }
        Commands::Reporte { fecha, anio } => commands::reporte(&app, fecha, anio).await?,
        Commands::Top { limite } => commands::top(&app, limite).await?,
        Commands::Semanal { fecha_fin } => commands::semanal(&app, fecha_fin).await?,
        Commands::Comparativo { fecha1, fecha2 } => {
            commands::comparativo(&app, fecha1, fecha2).await?
        }
    };

    if !ok {
        std::process::exit(1);
    }

    Ok(())
}
