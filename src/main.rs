mod config;
mod dump;
mod gesture;
mod input;
mod orientation;
mod output;

use clap::Parser;
use std::thread;
use std::time::Duration;

use config::{Cli, Command, Config};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load(&cli);
    if let Err(e) = config.validate() {
        log::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    if let Some(Command::Dump { device }) = &cli.command {
        return dump::run_dump(device, config.event_size);
    }

    log::info!(
        "mtpad starting (device={}, event_size={}, orientation={}, natural_scrolling={}, dry_run={})",
        config.device,
        config.event_size,
        config.orientation,
        config.gesture.natural_scrolling,
        config.dry_run
    );

    loop {
        match input::run(&config) {
            Ok(()) => {
                log::info!("Input ended, exiting");
                return Ok(());
            }
            Err(e) => log::error!("{}", e),
        }
        log::warn!("Device lost, retrying in 2s…");
        thread::sleep(Duration::from_secs(2));
    }
}
