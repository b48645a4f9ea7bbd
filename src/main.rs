pub mod config;
pub mod controller;
pub mod render;
pub mod ui;

use crate::config::Config;
use crate::controller::gilrs_backend::GilrsBackend;
use crate::controller::poller::{Poller, Polling};
use crate::ui::VisualizerUI;
use color_eyre::{eyre::eyre, Result};
use eframe::egui;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    setup()?;

    let config = Config::load_or_default();
    info!("Starting with configuration: {:?}", config);

    let poller = setup_poller(&config);

    info!("Starting UI");
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Gamepad Visualizer")
            .with_inner_size([config.window.width, config.window.height])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "Gamepad Visualizer",
        native_options,
        Box::new(move |cc| Ok(Box::new(VisualizerUI::new(cc, poller, &config)))),
    )
    .map_err(|e| eyre!("UI terminated with error: {}", e))?;

    info!("Window closed, exiting");
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

// A missing input service only costs us the overlay, never the window
fn setup_poller(config: &Config) -> Option<Poller<Polling>> {
    match GilrsBackend::new() {
        Ok(backend) => {
            let poller = Poller::create(Box::new(backend), Some(config.poller_settings()));
            Some(poller.initialize())
        }
        Err(e) => {
            warn!("{}, running in UI-only mode", e);
            None
        }
    }
}
