use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use votewarden::cli::{Cli, Command, ConfigCommand};
use votewarden::config::{self, Config};
use votewarden::moderation::{DynModerationGateway, DynNotifier, DynPermissionOracle};
use votewarden::polls::PollLifecycleManager;
use votewarden::runtime::UpdateDispatcher;
use votewarden::logging;
use votewarden::telegram::{BotApi, TelegramBridge};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command.unwrap_or(Command::Start) {
        Command::Version => {
            println!(
                "votewarden {} ({}, built {})",
                env!("CARGO_PKG_VERSION"),
                env!("VOTEWARDEN_GIT_HASH"),
                env!("VOTEWARDEN_BUILD_DATE"),
            );
            ExitCode::SUCCESS
        }
        Command::Config(ConfigCommand::Path) => {
            let path = config_path
                .map(Path::to_path_buf)
                .unwrap_or_else(config::default_path);
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Command::Config(ConfigCommand::Show) => show_config(config_path),
        Command::Start => start(config_path),
    }
}

fn show_config(config_path: Option<&Path>) -> ExitCode {
    let config = match config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let mut shown = config;
    if !shown.telegram.bot_token.is_empty() {
        shown.telegram.bot_token = "***".to_string();
    }
    match serde_json::to_string_pretty(&shown) {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("failed to render configuration: {e}");
            ExitCode::FAILURE
        }
    }
}

fn start(config_path: Option<&Path>) -> ExitCode {
    let config = match config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };
    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("config error: {error}");
        }
        return ExitCode::from(2);
    }
    if let Err(e) = logging::init(&config.logging) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    run_bot(config)
}

#[tokio::main]
async fn run_bot(config: Config) -> ExitCode {
    info!(version = env!("CARGO_PKG_VERSION"), "votewarden starting");

    let api = Arc::new(BotApi::new(config.telegram.clone()));
    let bridge = Arc::new(TelegramBridge::new(Arc::clone(&api)));
    let manager = PollLifecycleManager::new(
        config.polls.clone(),
        Arc::clone(&bridge) as DynPermissionOracle,
        Arc::clone(&bridge) as DynModerationGateway,
        bridge as DynNotifier,
    );
    let dispatcher = UpdateDispatcher::new(api, manager);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal_token.cancel();
        }
    });

    dispatcher.run(shutdown).await;
    info!("votewarden stopped");
    ExitCode::SUCCESS
}
