use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

mod app;
mod client;
mod config;
mod handler;
mod logging;
mod tui;
mod ui;

#[cfg(test)]
mod testing;

use app::App;
use client::ScenarioClient;
use config::Config;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "scenario")]
#[command(about = "Turn a free-text idea into a generated scenario", version)]
struct Cli {
    /// Generation endpoint [default: http://localhost:8080/generate]
    #[arg(short, long)]
    endpoint: Option<String>,
    /// Log file [default: <cache dir>/scenario-tui/scenario.log]
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Log filter, e.g. "debug" or "info,reqwest=debug"
    #[arg(long)]
    log_level: Option<String>,
    /// Skip the backend health check at startup
    #[arg(long)]
    no_ping: bool,
    /// Write the effective settings to the config file and exit
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?.with_overrides(cli.endpoint, cli.log_file, cli.log_level, cli.no_ping);

    if cli.write_config {
        config.save()?;
        println!("Wrote {}", Config::config_path()?.display());
        return Ok(());
    }

    logging::init(&config.log_file()?, config.log_level())?;
    info!(endpoint = config.endpoint(), "starting");

    let client = ScenarioClient::new(config.endpoint())?;
    let mut app = App::new(client);
    if config.ping_on_start() {
        app.check_backend().await;
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, &mut app).await;

    tui::restore()?;
    info!("exiting");
    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }

        if app.generation_finished() {
            app.collect_generation().await;
        }
    }

    Ok(())
}
