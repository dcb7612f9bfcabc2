mod app;
mod components;
mod config;
mod logging;
mod storage;
mod ui;

use clap::Parser;
use color_eyre::Result;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};

fn main() -> Result<()> {
    color_eyre::install()?;
    let config = config::Config::from_cli(config::Cli::parse())?;
    let log_path = logging::init(&config.data_dir)?;
    log::info!("ethfolio starting, logging to {}", log_path.display());

    let app = app::App::new(config)?;
    let terminal = ratatui::init();
    crossterm::execute!(std::io::stdout(), EnableBracketedPaste)?;
    let result = app.run(terminal);
    let _ = crossterm::execute!(std::io::stdout(), DisableBracketedPaste);
    ratatui::restore();
    result
}
