use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

mod app;
mod composer;
mod config;
mod conversation;
mod dispatcher;
mod handler;
mod logging;
mod preferences;
mod recommend;
mod tui;
mod ui;

#[cfg(test)]
mod test_support;

use app::App;
use config::Config;
use preferences::Servings;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "recipe-advisor")]
#[command(about = "Chat with a recipe recommendation service from the terminal")]
struct Cli {
    /// Recommendation endpoint URL
    #[arg(short, long)]
    endpoint: Option<String>,
    /// Initial number of servings (1-10)
    #[arg(short, long)]
    servings: Option<String>,
    /// Where to write the log file
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved configuration
    Config,
    /// Write a config file with the current settings
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?.with_env(|key| std::env::var(key).ok());
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(servings) = cli.servings.as_deref() {
        config.default_servings = Servings::parse(servings);
    }

    match cli.command {
        Some(Commands::Config) => {
            println!("config file: {}", Config::config_path()?.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Some(Commands::InitConfig) => {
            let path = config.save()?;
            println!("wrote {}", path.display());
            Ok(())
        }
        None => {
            let log_path = cli.log_file.unwrap_or_else(Config::default_log_path);
            logging::init(&log_path, config.log_level.as_deref().unwrap_or("info"))?;
            run(config).await
        }
    }
}

async fn run(config: Config) -> Result<()> {
    info!(endpoint = %config.endpoint, "starting recipe advisor");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(&config, events.sender());
    app.shift_enter_newline = tui::keyboard_enhanced();

    let result = event_loop(&mut terminal, &mut app, &mut events).await;

    app.shutdown();
    tui::restore()?;
    info!("recipe advisor closed");
    result
}

async fn event_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
        app.sync_scroll();
    }
    Ok(())
}
