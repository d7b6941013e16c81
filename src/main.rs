use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eframe::egui;
use superstore_dash::app::DashboardApp;
use superstore_dash::{data, report};

#[derive(Parser)]
#[command(name = "superstore-dash", version, about = "Superstore sales dashboard")]
struct Cli {
    /// Transactions file to load at startup (.csv, .json or .parquet)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive dashboard (default)
    Dashboard,
    /// Write text summaries of the dataset
    Report {
        /// Output directory
        #[arg(long, default_value = "results")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Dashboard) {
        Commands::Dashboard => run_dashboard(cli.data),
        Commands::Report { out } => {
            let path = cli.data.context("report needs --data <FILE>")?;
            let dataset = data::loader::load_file(&path)
                .with_context(|| format!("loading {}", path.display()))?;
            for written in report::write_reports(&dataset, &out)? {
                println!("Wrote {}", written.display());
            }
            Ok(())
        }
    }
}

fn run_dashboard(data_path: Option<PathBuf>) -> Result<()> {
    // A bad --data file is fatal before any window opens.
    let app = match data_path {
        Some(path) => {
            let dataset = data::loader::load_file(&path)
                .with_context(|| format!("loading {}", path.display()))?;
            DashboardApp::with_dataset(dataset)
        }
        None => DashboardApp::default(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Superstore Sales Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard: {e}"))
}
