mod canvas;
mod config;
mod food;
mod game_mode;
mod led_output;
mod pointer;
mod present;
mod snake;
mod steering;
mod types;
mod world;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use simplelog::WriteLogger;
use std::fs::File;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use config::{Args, GameConfig};
use types::ModeExitReason;

fn init_logging(config: &GameConfig) -> Result<()> {
    let level = LevelFilter::from_str(&config.log_level).unwrap_or(LevelFilter::Info);
    let file = File::create(&config.log_file)
        .with_context(|| format!("Failed to create log file {}", config.log_file))?;
    WriteLogger::init(level, simplelog::Config::default(), file).context("Failed to initialize logger")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set global config path immediately (before any config loads)
    GameConfig::set_config_path(args.cfg.clone());

    let cfg_arg = args.cfg.as_deref();
    let config_path = GameConfig::config_path(cfg_arg)?;
    let config_file_exists = config_path.exists();

    // Load existing config or create default, then merge with command line args
    let mut config = if config_file_exists {
        match GameConfig::load_with_path(cfg_arg) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config file: {:#}", e);
                eprintln!("Please fix the config file or delete it to regenerate with defaults.");
                return Err(e);
            }
        }
    } else {
        GameConfig {
            config_path: Some(config_path.clone()),
            ..GameConfig::default()
        }
    };

    let args_provided = config.merge_with_args(&args);

    // Save config ONLY if:
    // - Config file doesn't exist (first run - need to create it)
    // - Command-line args were provided (need to persist user's CLI choices)
    if !config_file_exists || args_provided {
        config.save()?;
    }

    init_logging(&config)?;
    info!("Using config file: {}", config_path.display());

    // Signal handler only flags the loop; the loop restores the terminal itself
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || shutdown_flag.store(true, Ordering::SeqCst))
        .context("Failed to install signal handler")?;

    let reason = game_mode::run_game_mode(&config, shutdown)?;
    match reason {
        ModeExitReason::UserQuit => info!("Exiting: user quit"),
        ModeExitReason::Shutdown => info!("Exiting: shutdown signal"),
    }

    Ok(())
}
