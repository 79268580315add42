use clap::{Parser, Subcommand};
use log::{LevelFilter, info};
use std::path::PathBuf;
use tui_logger::{
    TuiLoggerFile, TuiLoggerLevelOutput, init_logger, set_default_level, set_log_file,
};

use crate::app::App;

pub mod app;
pub mod config;
pub mod event;
pub mod resample;
pub mod ui;
pub mod usage;

#[derive(Parser, Debug)]
#[command(about)]
struct Cli {
    #[arg(short, long, value_name = "FILE", default_value = config::DEFAULT_FILE)]
    config: PathBuf,
    /// Process to track, defaults to this one
    #[arg(short, long)]
    pid: Option<u32>,
    #[arg(long, value_name = "FILE", default_value = "utiltrack.log")]
    log_file: PathBuf,
    #[arg(long, value_name = "LEVEL", default_value_t = LevelFilter::Debug)]
    log_level: LevelFilter,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Track utilization and show the dashboard
    Run,
    /// Validate the configuration file and print the effective settings
    Validate,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    match &cli.command {
        Some(Commands::Validate) => {
            let config = config::load_from_file(cli.config)?;
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Some(Commands::Run) | None => {
            init_logger(cli.log_level)?;
            set_default_level(cli.log_level);
            set_log_file(
                TuiLoggerFile::new(&cli.log_file.to_string_lossy())
                    .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
                    .output_file(false)
                    .output_separator(':'),
            );
            info!(target: "App", "Logging to {:?} at {}", cli.log_file, cli.log_level);
            let mut app = App::new(cli.config, cli.pid)?;
            let terminal = ratatui::init();
            let result = app.run(terminal).await;
            ratatui::restore();
            result
        }
    }
}
