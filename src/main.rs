use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use eframe::egui;
use log::info;
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

use grid_clicker::AppState;

mod app;

#[derive(Parser, Debug)]
#[command(version, about = "Clicks a grid of screen positions on a fixed cadence")]
struct Args {
    /// Settings file, created on first save
    #[arg(long, default_value = "grid_clicker_state.json")]
    state: PathBuf,

    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,

    /// Also write the log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Seconds between pressing Start and the first click
    #[arg(long, default_value_t = 3)]
    countdown: u64,
}

fn init_logging(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        args.log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = &args.log_file {
        loggers.push(WriteLogger::new(args.log_level, Config::default(), File::create(path)?));
    }
    CombinedLogger::init(loggers)?;
    Ok(())
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    if let Err(e) = init_logging(&args) {
        eprintln!("logging disabled: {e}");
    }

    let state = AppState::load_or_default(&args.state);
    info!("settings from {}", args.state.display());

    let mut opts = eframe::NativeOptions::default();
    opts.viewport.inner_size = Some(egui::vec2(780.0, 580.0));
    opts.viewport.min_inner_size = Some(egui::vec2(560.0, 420.0));
    opts.viewport.resizable = Some(true);
    opts.follow_system_theme = false;

    let Args { state: state_path, countdown, .. } = args;
    eframe::run_native(
        "Grid Auto-Clicker",
        opts,
        Box::new(move |cc| Box::new(app::ClickerApp::new(cc, state, state_path, countdown))),
    )
}
