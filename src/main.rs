use std::error::Error;
use std::process;

use clap::Parser;
use log::{error, info};

use midi_led_grid::config::{Cli, Settings};
use midi_led_grid::dispatch::drive;
#[cfg(feature = "hardware")]
use midi_led_grid::matrix::led::LedPanel;
use midi_led_grid::matrix::terminal::TerminalMatrix;
use midi_led_grid::shutdown;

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("{}", e);
        process::exit(1);
    }
    info!("Exiting");
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let settings = Settings::load(cli)?;

    info!("MIDI LED GRID v{}", env!("CARGO_PKG_VERSION"));
    info!("  Device: {}", settings.device);
    info!("  Panel: {}x{} ({}, {}%)", settings.cols, settings.rows, settings.hardware_mapping, settings.brightness);
    info!("  Mode: {}", if settings.diagnostic { "DIAGNOSTIC" } else { "LIVE" });
    info!("Press Ctrl+C to stop");

    let shutdown = shutdown::on_interrupt()?;

    #[cfg(feature = "hardware")]
    if !cli.terminal {
        let panel = LedPanel::new(settings.rows, settings.cols, &settings.hardware_mapping, settings.brightness)?;
        let renderer = settings.renderer(panel)?;
        return drive(&settings, &renderer, &shutdown);
    }
    let terminal = TerminalMatrix::new(settings.rows, settings.cols, settings.brightness);
    let renderer = settings.renderer(terminal)?;
    drive(&settings, &renderer, &shutdown)
}
