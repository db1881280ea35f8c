// main.rs - Window host for the live Game of Life canvas
//
// Right click toggles editor mode, left click/drag paints while paused,
// middle click stamps the selected pattern.

use anyhow::Context;
use eframe::egui;
use env_logger::Env;
use life_canvas::CanvasConfig;

mod ui;

use ui::{CanvasApp, MENU_HEIGHT};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = CanvasConfig::from_env();
    log::info!("canvas {}x{}", config.width, config.height);

    let app = CanvasApp::new(&config).context("starting the simulation")?;
    let repaint = app.repaint_target();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.width as f32, config.height as f32 + MENU_HEIGHT])
            .with_resizable(false),
        ..Default::default()
    };

    eframe::run_native(
        "Conway's Game of Life",
        options,
        Box::new(move |cc| {
            if repaint.set(cc.egui_ctx.clone()).is_err() {
                log::warn!("repaint context was already set, keeping the first one");
            }
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow::anyhow!("window closed with an error: {e}"))
}
