use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use eframe::egui::{self, Align2, Color32, FontId, RichText};
use wbw_lang::{Color, DrawCommand, Engine, EngineConfig, FrameOutcome, InputEvent, TextAlign};

const DEFAULT_SCRIPT: &str = include_str!("../../../demos/platformer.wbw");

#[derive(Parser, Debug)]
#[command(name = "wbw", about = "Edit and play WBW game scripts")]
struct Args {
    /// Script to open; a demo platformer is loaded when omitted
    script: Option<PathBuf>,

    /// JSON engine config (fps, physics, viewport, touch mode, seed)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start the script immediately
    #[arg(long)]
    run: bool,

    /// Debug-level engine logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => EngineConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let source = match &args.script {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading script {}", path.display()))?,
        None => DEFAULT_SCRIPT.to_string(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1500.0, 820.0]),
        ..Default::default()
    };
    let autorun = args.run;
    eframe::run_native("WBW", options, Box::new(move |_cc| Ok(Box::new(App::new(config, source, autorun)))))
        .map_err(|e| anyhow::anyhow!("window closed with error: {e}"))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info,wbw_lang=debug,wbw_app=debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

// ─── App state ────────────────────────────────────────────────────────────────

#[derive(PartialEq)]
enum Tab { Canvas, Errors, Program, Variables }

struct App {
    source: String,
    engine: Engine,
    errors: Vec<String>,
    program_dump: String,
    commands: Vec<DrawCommand>,
    tab: Tab,
    muted: bool,
    canvas_rect: Option<egui::Rect>,
    touches: BTreeMap<u64, (f64, f64)>,
}

impl App {
    fn new(config: EngineConfig, source: String, autorun: bool) -> Self {
        let mut app = Self {
            source,
            engine: Engine::new(config),
            errors: Vec::new(),
            program_dump: String::new(),
            commands: Vec::new(),
            tab: Tab::Canvas,
            muted: false,
            canvas_rect: None,
            touches: BTreeMap::new(),
        };
        app.reload();
        if autorun {
            app.run();
        }
        app
    }

    /// Re-parse and validate the editor text. Stops a running game.
    fn reload(&mut self) {
        self.engine.load(&self.source);
        self.program_dump = self.engine.program().map(|p| format!("{p:#?}")).unwrap_or_default();
        self.commands.clear();
        self.touches.clear();
        self.refresh_errors();
    }

    fn run(&mut self) {
        self.reload();
        self.engine.start();
        if self.engine.is_running() {
            self.tab = Tab::Canvas;
        } else {
            self.tab = Tab::Errors;
        }
    }

    fn refresh_errors(&mut self) {
        self.errors = self.engine.errors().iter().map(|e| e.to_string()).collect();
    }

    fn forward_input(&mut self, ctx: &egui::Context) {
        let Some(sink) = self.engine.input_sink() else { return };
        let origin = self.canvas_rect.map(|r| r.min).unwrap_or(egui::Pos2::ZERO);
        let local = |p: egui::Pos2| ((p.x - origin.x) as f64, (p.y - origin.y) as f64);
        let keyboard = !ctx.wants_keyboard_input();

        for event in ctx.input(|i| i.events.clone()) {
            match event {
                egui::Event::Key { key, pressed, .. } if keyboard => {
                    let name = key.name().to_string();
                    sink.send(if pressed { InputEvent::KeyDown(name) } else { InputEvent::KeyUp(name) });
                }
                egui::Event::PointerMoved(pos) => {
                    let (x, y) = local(pos);
                    sink.send(InputEvent::PointerMove { x, y });
                }
                egui::Event::PointerButton { pos, button: egui::PointerButton::Primary, pressed, .. } => {
                    let (x, y) = local(pos);
                    sink.send(if pressed { InputEvent::PointerDown { x, y } } else { InputEvent::PointerUp { x, y } });
                }
                egui::Event::Touch { id, phase, pos, .. } => {
                    match phase {
                        egui::TouchPhase::Start | egui::TouchPhase::Move => {
                            self.touches.insert(id.0, local(pos));
                        }
                        egui::TouchPhase::End | egui::TouchPhase::Cancel => {
                            self.touches.remove(&id.0);
                        }
                    }
                    sink.send(InputEvent::Touches(self.touches.values().copied().collect()));
                }
                egui::Event::WindowFocused(false) => {
                    self.touches.clear();
                    sink.send(InputEvent::Blur);
                }
                _ => {}
            }
        }
    }

    fn drive_engine(&mut self) {
        match self.engine.frame(Instant::now()) {
            FrameOutcome::Rendered(commands) => self.commands = commands,
            FrameOutcome::Throttled | FrameOutcome::Stopped => {}
        }
        for cue in self.engine.take_sounds() {
            tracing::info!(sound = %cue.name, volume = cue.volume, "play sound");
        }
        if self.engine.errors().len() != self.errors.len() {
            self.refresh_errors();
        }
    }
}

// ─── UI ───────────────────────────────────────────────────────────────────────

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.engine.is_running() {
            self.forward_input(ctx);
            self.drive_engine();
            ctx.request_repaint();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |cols| {
                // ── Left: editor ──────────────────────────────────────────────
                cols[0].vertical(|ui| {
                    ui.label("Script");
                    let response = ui.add(
                        egui::TextEdit::multiline(&mut self.source)
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY)
                            .desired_rows(46),
                    );
                    if response.changed() {
                        self.reload();
                    }
                });

                // ── Right: game + diagnostics ────────────────────────────────
                cols[1].vertical(|ui| {
                    ui.horizontal(|ui| {
                        if self.errors.is_empty() {
                            ui.label(RichText::new("✓  no errors").color(Color32::from_rgb(80, 200, 80)));
                        } else {
                            ui.label(
                                RichText::new(format!("✗  {} error(s)", self.errors.len()))
                                    .color(Color32::from_rgb(220, 80, 80)),
                            );
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.checkbox(&mut self.muted, "mute").changed() {
                                self.engine.set_muted(self.muted);
                            }
                            if self.engine.is_running() {
                                if ui.button("stop").clicked() {
                                    self.engine.stop();
                                }
                            } else if ui.button("run").clicked() {
                                self.run();
                            }
                        });
                    });

                    ui.separator();

                    ui.horizontal(|ui| {
                        let err_label = if self.errors.is_empty() {
                            "Errors".into()
                        } else {
                            format!("Errors ({})", self.errors.len())
                        };
                        ui.selectable_value(&mut self.tab, Tab::Canvas, "Canvas");
                        ui.selectable_value(&mut self.tab, Tab::Errors, err_label);
                        ui.selectable_value(&mut self.tab, Tab::Program, "Program");
                        ui.selectable_value(&mut self.tab, Tab::Variables, "Variables");
                    });

                    ui.separator();

                    egui::ScrollArea::both().show(ui, |ui| match self.tab {
                        Tab::Canvas => self.show_canvas(ui),
                        Tab::Errors => self.show_errors(ui),
                        Tab::Program => self.show_program(ui),
                        Tab::Variables => self.show_variables(ui),
                    });
                });
            });
        });
    }
}

impl App {
    fn show_canvas(&mut self, ui: &mut egui::Ui) {
        let cfg = self.engine.config();
        let aspect = (cfg.height / cfg.width.max(1.0)) as f32;
        let width = ui.available_width().max(1.0);
        let size = egui::vec2(width, (width * aspect).min(ui.available_height().max(1.0)));
        let (rect, _response) = ui.allocate_exact_size(size, egui::Sense::click());
        if self.canvas_rect.map(|r| r.size()) != Some(rect.size()) {
            self.engine.resize(rect.width() as f64, rect.height() as f64);
        }
        self.canvas_rect = Some(rect);
        let painter = ui.painter_at(rect);

        if self.commands.is_empty() {
            painter.rect_filled(rect, 0.0, Color32::from_rgb(17, 24, 39));
            let hint = if self.errors.is_empty() { "Press run to play." } else { "Fix errors to run." };
            painter.text(rect.center(), Align2::CENTER_CENTER, hint, FontId::proportional(18.0), Color32::GRAY);
            return;
        }

        let at = |x: f64, y: f64| egui::pos2(rect.min.x + x as f32, rect.min.y + y as f32);
        for cmd in &self.commands {
            match cmd {
                DrawCommand::Clear(c) => {
                    painter.rect_filled(rect, 0.0, color32(*c));
                }
                DrawCommand::Rect { x, y, w, h, color } => {
                    let r = egui::Rect::from_min_size(at(*x, *y), egui::vec2(*w as f32, *h as f32));
                    painter.rect_filled(r, 0.0, color32(*color));
                }
                DrawCommand::Circle { x, y, r, color } => {
                    painter.circle_filled(at(*x, *y), *r as f32, color32(*color));
                }
                DrawCommand::Line { x1, y1, x2, y2, width, color } => {
                    painter.line_segment([at(*x1, *y1), at(*x2, *y2)], egui::Stroke::new(*width as f32, color32(*color)));
                }
                DrawCommand::Triangle { points, color } => {
                    let pts = points.iter().map(|&(x, y)| at(x, y)).collect();
                    painter.add(egui::Shape::convex_polygon(pts, color32(*color), egui::Stroke::NONE));
                }
                DrawCommand::Text { x, y, text, size, color, align } => {
                    let anchor = match align {
                        TextAlign::Left => Align2::LEFT_TOP,
                        TextAlign::Center => Align2::CENTER_TOP,
                    };
                    painter.text(at(*x, *y), anchor, text, FontId::proportional(*size as f32), color32(*color));
                }
            }
        }
    }

    fn show_errors(&self, ui: &mut egui::Ui) {
        if self.errors.is_empty() {
            ui.label(RichText::new("No errors.").color(Color32::GRAY));
            return;
        }
        for msg in &self.errors {
            ui.label(RichText::new(msg).monospace().color(Color32::from_rgb(220, 80, 80)));
        }
    }

    fn show_program(&self, ui: &mut egui::Ui) {
        if self.program_dump.is_empty() {
            ui.label(RichText::new("Nothing loaded.").color(Color32::GRAY));
            return;
        }
        ui.add(
            egui::TextEdit::multiline(&mut self.program_dump.clone())
                .font(egui::TextStyle::Monospace)
                .desired_width(f32::INFINITY)
                .interactive(false),
        );
    }

    fn show_variables(&self, ui: &mut egui::Ui) {
        let Some(state) = self.engine.state() else {
            ui.label(RichText::new("Not running.").color(Color32::GRAY));
            return;
        };
        let vars: BTreeMap<&String, String> = state.vars.iter().map(|(k, v)| (k, v.to_text())).collect();

        egui::Grid::new("vars_grid")
            .striped(true)
            .min_col_width(120.0)
            .show(ui, |ui| {
                ui.label(RichText::new("name").strong());
                ui.label(RichText::new("value").strong());
                ui.end_row();

                for (name, value) in vars {
                    ui.label(RichText::new(name.as_str()).monospace());
                    ui.label(RichText::new(value).monospace().color(Color32::from_rgb(180, 255, 180)));
                    ui.end_row();
                }
            });
    }
}

fn color32(c: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}
