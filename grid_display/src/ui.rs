// ui.rs - eframe app: uploads published frames and forwards pointer input

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

use eframe::egui;
use egui::{Color32, ColorImage, Pos2, Rect, Sense, TextureHandle, TextureOptions, Vec2};
use life_canvas::{
    frame_channel, patterns, CanvasConfig, CanvasError, EngineState, FrameBuffer, FrameReceiver,
    FrameSurface, InputBridge, InputOutcome, PointerEvent, SimulationLoop,
};

pub const MENU_HEIGHT: f32 = 24.0;

pub struct CanvasApp {
    // Dropped first so the simulation thread is joined before the receiver goes.
    sim: SimulationLoop,
    input: InputBridge,
    display: FrameReceiver,
    texture: Option<TextureHandle>,
    tick_rate: Arc<AtomicU32>,
    repaint: Arc<OnceLock<egui::Context>>,
    selected_pattern: usize,
    size: Vec2,
}

impl CanvasApp {
    pub fn new(config: &CanvasConfig) -> Result<Self, CanvasError> {
        let grid = config.build_grid()?;
        let repaint: Arc<OnceLock<egui::Context>> = Arc::new(OnceLock::new());

        let (sink, display) = frame_channel(config.width, config.height);
        let wake = Arc::clone(&repaint);
        let sink = sink.with_wake(move || {
            if let Some(ctx) = wake.get() {
                ctx.request_repaint();
            }
        });
        let frames = Arc::new(FrameBuffer::with_sink(config.width, config.height, Arc::new(sink)));

        let tick_rate = Arc::new(AtomicU32::new(0));
        let rate = Arc::clone(&tick_rate);
        let sim = SimulationLoop::spawn(grid, frames, move |ticks| {
            rate.store(ticks, Ordering::Relaxed);
        })?;
        let input = InputBridge::new(sim.handle());

        Ok(Self {
            sim,
            input,
            display,
            texture: None,
            tick_rate,
            repaint,
            selected_pattern: 0,
            size: Vec2::new(config.width as f32, config.height as f32),
        })
    }

    /// Filled with the egui context once the window exists.
    pub fn repaint_target(&self) -> Arc<OnceLock<egui::Context>> {
        Arc::clone(&self.repaint)
    }

    fn upload(&mut self, ctx: &egui::Context, frame: &FrameSurface) {
        let image = ColorImage {
            size: [frame.width(), frame.height()],
            pixels: frame
                .pixels()
                .iter()
                .map(|px| {
                    let [r, g, b, a] = px.to_le_bytes();
                    Color32::from_rgba_unmultiplied(r, g, b, a)
                })
                .collect(),
        };
        if let Some(texture) = &mut self.texture {
            texture.set(image, TextureOptions::NEAREST);
        } else {
            self.texture = Some(ctx.load_texture("canvas", image, TextureOptions::NEAREST));
        }
    }

    fn pointer_cell(rect: Rect, pos: Pos2) -> (i32, i32) {
        let local = pos - rect.min;
        (local.x.floor() as i32, local.y.floor() as i32)
    }
}

impl eframe::App for CanvasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(frame) = self.display.latest() {
            self.upload(ctx, &frame);
        } else if self.texture.is_none() {
            let frame = self.display.current();
            self.upload(ctx, &frame);
        }

        egui::TopBottomPanel::top("menu")
            .exact_height(MENU_HEIGHT)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    match self.input.state() {
                        EngineState::Running => {
                            ui.label(format!("FPS: {}", self.tick_rate.load(Ordering::Relaxed)));
                        }
                        EngineState::Paused => {
                            let live = self.sim.handle().inspect(|grid| grid.population());
                            ui.label(format!("Editor mode, {live} live"));
                        }
                    }

                    ui.separator();

                    ui.label("Pattern:");
                    egui::ComboBox::from_id_source("pattern_selector")
                        .selected_text(patterns::PATTERNS[self.selected_pattern].name)
                        .show_ui(ui, |ui| {
                            for (i, pattern) in patterns::PATTERNS.iter().enumerate() {
                                ui.selectable_value(&mut self.selected_pattern, i, pattern.name);
                            }
                        });
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let (response, painter) = ui.allocate_painter(self.size, Sense::click_and_drag());
                let rect = response.rect;

                if let Some(texture) = &self.texture {
                    let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
                    painter.image(texture.id(), rect, uv, Color32::WHITE);
                }

                let pointer = response.interact_pointer_pos().or(response.hover_pos());

                if response.secondary_clicked() {
                    let (x, y) = pointer.map_or((0, 0), |pos| Self::pointer_cell(rect, pos));
                    match self.input.handle(PointerEvent::secondary(x, y)) {
                        InputOutcome::Paused => log::debug!("entered editor mode"),
                        InputOutcome::Resumed => log::debug!("left editor mode"),
                        _ => {}
                    }
                }

                let primary_held = ui.input(|i| i.pointer.primary_down());
                if primary_held && response.is_pointer_button_down_on() {
                    if let Some(pos) = pointer {
                        let (x, y) = Self::pointer_cell(rect, pos);
                        self.input.handle(PointerEvent::primary(x, y));
                    }
                }

                if response.middle_clicked() {
                    if let Some(pos) = pointer {
                        let (x, y) = Self::pointer_cell(rect, pos);
                        let pattern = &patterns::PATTERNS[self.selected_pattern];
                        let (w, h) = pattern.extent();
                        self.input.stamp(pattern, x - w / 2, y - h / 2);
                    }
                }
            });
    }
}
