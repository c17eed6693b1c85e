//! The host-facing engine: load, start/stop, and the per-frame pipeline.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::analysis;
use crate::commands::CommandRegistry;
use crate::config::EngineConfig;
use crate::error::Error;
use crate::render::Renderer;
use crate::runtime::camera::Follow;
use crate::runtime::input::{BindingKind, InputSink, InputSnapshot, InputSubscription, touch_zone};
use crate::runtime::interpreter::Interpreter;
use crate::runtime::physics;
use crate::runtime::state::{EntityKind, GameState, SoundCue};
use crate::runtime::ui;
use crate::runtime::value::Value;
use crate::syntax::{self, ast::{CommandLine, Program}};
use crate::types::draw::DrawCommand;

pub const TICK_LABEL: &str = "tick";
pub const BULLET_HIT_LABEL: &str = "bullethit";

/// Diagnostics from `load()`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult {
    pub errors: Vec<Error>,
}

impl LoadResult {
    pub fn is_ok(&self) -> bool { self.errors.is_empty() }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// No session is running; the host can stop scheduling frames.
    Stopped,
    /// Called again before one frame interval elapsed. Nothing changed.
    Throttled,
    Rendered(Vec<DrawCommand>),
}

// ─── Session ──────────────────────────────────────────────────────────────────

/// Fixed-rate gate: lets a frame through once a full interval has elapsed,
/// carrying the remainder so the cadence does not drift.
#[derive(Debug)]
struct FrameClock {
    interval: Duration,
    last: Option<Instant>,
}

impl FrameClock {
    fn new(fps_seconds: f64) -> Self {
        let interval = Duration::from_secs_f64(fps_seconds).max(Duration::from_millis(1));
        Self { interval, last: None }
    }

    fn tick(&mut self, now: Instant) -> bool {
        let Some(last) = self.last else {
            self.last = Some(now);
            return true;
        };
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.interval {
            return false;
        }
        let carry = Duration::from_nanos((elapsed.as_nanos() % self.interval.as_nanos()) as u64);
        self.last = Some(now - carry);
        true
    }
}

/// Everything that exists only while running. Dropping it detaches input
/// and ends frame scheduling.
struct Session {
    state: GameState,
    input: InputSubscription,
    clock: FrameClock,
    renderer: Renderer,
}

// ─── Engine ───────────────────────────────────────────────────────────────────

pub struct Engine {
    config: EngineConfig,
    registry: CommandRegistry,
    program: Option<Program>,
    load_errors: Vec<Error>,
    runtime_errors: Vec<Error>,
    session: Option<Session>,
    viewport: (f64, f64),
    muted: bool,
}

impl Default for Engine {
    fn default() -> Self { Self::new(EngineConfig::default()) }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let viewport = (config.width, config.height);
        Self {
            config,
            registry: CommandRegistry::standard(),
            program: None,
            load_errors: Vec::new(),
            runtime_errors: Vec::new(),
            session: None,
            viewport,
            muted: false,
        }
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    pub fn program(&self) -> Option<&Program> { self.program.as_ref() }

    /// Parse and validate. Stops a running session first. The returned
    /// diagnostics depend only on `source`.
    pub fn load(&mut self, source: &str) -> LoadResult {
        self.stop();
        let (program, mut errors) = syntax::parse(source);
        errors.extend(analysis::validate(&program, &self.registry));
        tracing::debug!(
            init = program.init.len(),
            labels = program.labels.len(),
            errors = errors.len(),
            "loaded script"
        );
        self.program = Some(program);
        self.load_errors = errors.clone();
        self.runtime_errors.clear();
        LoadResult { errors }
    }

    /// Build fresh state, attach input and run the init sequence. A no-op
    /// when there is no program or `load()` reported errors.
    pub fn start(&mut self) {
        self.stop();
        if !self.load_errors.is_empty() {
            tracing::debug!(errors = self.load_errors.len(), "start refused: script has errors");
            return;
        }
        let Some(program) = self.program.as_ref() else {
            tracing::debug!("start refused: nothing loaded");
            return;
        };

        let mut state = GameState::new(&self.config, self.viewport);
        state.muted = self.muted;
        self.runtime_errors.clear();

        state.emitting_persistent = true;
        Interpreter::new(program, &self.registry, &mut state, &mut self.runtime_errors).run_init();
        state.emitting_persistent = false;

        state.camera.snap_next = true;
        update_camera(&mut state);
        state.sync_reserved();

        self.session = Some(Session {
            state,
            input: InputSubscription::attach(),
            clock: FrameClock::new(self.config.frame_seconds()),
            renderer: Renderer::new(self.config.seed),
        });
        tracing::info!("engine started");
    }

    pub fn stop(&mut self) {
        if self.session.take().is_some() {
            tracing::info!("engine stopped");
        }
    }

    /// Stop and drop the program.
    pub fn destroy(&mut self) {
        self.stop();
        self.program = None;
        tracing::info!("engine destroyed");
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.viewport = (width, height);
        if let Some(s) = self.session.as_mut() {
            s.state.view_w = width;
            s.state.view_h = height;
        }
    }

    /// Load diagnostics followed by runtime diagnostics.
    pub fn errors(&self) -> Vec<Error> {
        self.load_errors.iter().chain(&self.runtime_errors).cloned().collect()
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if let Some(s) = self.session.as_mut() {
            s.state.muted = muted;
            if muted {
                s.state.sounds.clear();
            }
        }
    }

    pub fn is_muted(&self) -> bool { self.muted }

    pub fn is_running(&self) -> bool { self.session.is_some() }

    /// A handle the host feeds input through. Dead once the session stops.
    pub fn input_sink(&self) -> Option<InputSink> {
        self.session.as_ref().map(|s| s.input.sink())
    }

    /// Host per-frame callback: throttled to `fps`, then update + render.
    pub fn frame(&mut self, now: Instant) -> FrameOutcome {
        let Some(session) = self.session.as_mut() else {
            return FrameOutcome::Stopped;
        };
        if !session.clock.tick(now) {
            return FrameOutcome::Throttled;
        }
        self.update();
        FrameOutcome::Rendered(self.render())
    }

    /// Advance the simulation one fixed step regardless of wall-clock time.
    pub fn update(&mut self) {
        let (Some(session), Some(program)) = (self.session.as_mut(), self.program.as_ref()) else {
            return;
        };
        step(program, &self.registry, &mut session.state, &mut session.input, &mut self.runtime_errors);
    }

    pub fn render(&mut self) -> Vec<DrawCommand> {
        match self.session.as_mut() {
            Some(s) => s.renderer.render(&s.state),
            None => Vec::new(),
        }
    }

    /// Drain queued sound cues.
    pub fn take_sounds(&mut self) -> Vec<SoundCue> {
        self.session.as_mut().map(|s| std::mem::take(&mut s.state.sounds)).unwrap_or_default()
    }

    pub fn state(&self) -> Option<&GameState> {
        self.session.as_ref().map(|s| &s.state)
    }

    pub fn var(&self, name: &str) -> Option<Value> {
        self.state().and_then(|s| s.var(name).cloned())
    }
}

// ─── Frame pipeline ───────────────────────────────────────────────────────────

fn step(
    program: &Program,
    registry: &CommandRegistry,
    state: &mut GameState,
    input: &mut InputSubscription,
    diagnostics: &mut Vec<Error>,
) {
    let dt = state.config.frame_seconds();
    state.delta = dt;
    state.clear_frame_layer();
    state.emitting_persistent = false;

    let snap = take_input(state, input);
    let actions = input_actions(state, &snap);
    state.sync_reserved();

    let mut interp = Interpreter::new(program, registry, state, diagnostics);

    for action in &actions {
        interp.run_action(action);
    }

    let due = interp.state().timers.advance(dt);
    for label in &due {
        interp.invoke_label(label);
    }

    physics::step_player(interp.state());
    physics::step_entities(interp.state());

    interp.state().sync_reserved();
    if program.has_label(TICK_LABEL) {
        interp.invoke_label(TICK_LABEL);
    }

    update_camera(interp.state());
    interp.state().sync_reserved();

    run_collisions(program, &mut interp);

    let state = interp.state();
    state.messages.retain_mut(|m| {
        m.remaining -= dt;
        m.remaining > 0.0
    });
    if state.shake.remaining > 0.0 {
        state.shake.remaining -= dt;
        if state.shake.remaining <= 0.0 {
            state.shake.magnitude = 0.0;
        }
    }
    state.frame += 1;
    state.time += dt;
    state.sync_reserved();
    tracing::trace!(frame = state.frame, entities = state.entities.len(), "frame");
}

/// Snapshot input, excluding touches that land on a UI button from the
/// virtual-key zones, and update pointer / hover / click state.
fn take_input(state: &mut GameState, input: &mut InputSubscription) -> InputSnapshot {
    let snap = {
        let ui = &state.ui;
        let (vw, vh) = (state.view_w, state.view_h);
        input.snapshot(state.touch_mode, |points: &[(f64, f64)]| -> HashSet<String> {
            points
                .iter()
                .filter(|&&(x, y)| ui::hit_test(ui, x, y).is_none())
                .map(|&(x, y)| touch_zone(x, y, vw, vh).to_string())
                .collect()
        })
    };

    state.touch_active = snap.touch_active;
    state.pointer.x = snap.pointer.0;
    state.pointer.y = snap.pointer.1;
    state.pointer.down = snap.pointer_down;
    snap
}

/// Binding actions due this frame, in dispatch order: held, pressed,
/// released, UI hover-enter, UI click.
fn input_actions(state: &mut GameState, snap: &InputSnapshot) -> Vec<CommandLine> {
    let b = &state.bindings;
    let mut out = Vec::new();

    for key in b.keys(BindingKind::Held) {
        if snap.held.contains(&key) {
            out.extend(b.actions(BindingKind::Held, &key));
        }
    }
    for key in &snap.pressed {
        out.extend(b.actions(BindingKind::Press, key));
    }
    for key in &snap.released {
        out.extend(b.actions(BindingKind::Release, key));
    }

    let hovered = if snap.pointer_seen {
        ui::hit_test(&state.ui, state.pointer.x, state.pointer.y).map(|btn| btn.id.clone())
    } else {
        None
    };
    if let Some(id) = &hovered {
        if state.pointer.hovered.as_ref() != Some(id) {
            out.extend(b.actions(BindingKind::UiHover, id));
        }
    }
    let clicked = if snap.pointer_pressed { hovered.clone() } else { None };
    if let Some(id) = &clicked {
        out.extend(b.actions(BindingKind::UiClick, id));
    }

    state.pointer.hovered = hovered;
    state.pointer.clicked = clicked;
    out
}

fn update_camera(state: &mut GameState) {
    let target = match &state.camera.follow {
        Follow::Player => state.player.as_ref().map(|p| p.center()),
        Follow::Entity(id) => state.entity(id).map(|e| e.center()),
        Follow::None => None,
    };
    let view = (state.view_w, state.view_h);
    let world = (state.world_w, state.world_h);
    state.camera.update(target, view, world);
}

/// Player vs. entity (`collide_<id>`, else `collide_<type>`) and bullet vs.
/// enemy (`bullethit`). Handlers may remove entities; each pair is re-checked
/// against the live state before its label runs.
fn run_collisions(program: &Program, interp: &mut Interpreter<'_>) {
    let player_hits: Vec<(String, String)> = {
        let state = interp.state();
        match &state.player {
            Some(p) => state
                .entities
                .iter()
                .filter(|e| e.kind != EntityKind::Bullet && e.aabb().overlaps(&p.aabb()))
                .map(|e| (e.id.clone(), e.kind.name().to_string()))
                .collect(),
            None => Vec::new(),
        }
    };
    for (id, kind) in player_hits {
        let state = interp.state();
        if state.entity(&id).is_none() {
            continue;
        }
        state.set_var("other", id.as_str());
        state.set_var("othertype", kind.as_str());
        let by_id = format!("collide_{id}");
        let label = if program.has_label(&by_id) { by_id } else { format!("collide_{kind}") };
        interp.invoke_label(&label);
    }

    let bullets: Vec<String> = interp
        .state()
        .entities
        .iter()
        .filter(|e| e.kind == EntityKind::Bullet)
        .map(|e| e.id.clone())
        .collect();
    for bullet_id in bullets {
        let state = interp.state();
        let Some(bullet) = state.entity(&bullet_id).map(|b| b.aabb()) else { continue };
        let Some(enemy_id) = state
            .entities
            .iter()
            .find(|e| e.kind == EntityKind::Enemy && e.aabb().overlaps(&bullet))
            .map(|e| e.id.clone())
        else {
            continue;
        };
        state.remove_entity(&bullet_id);
        state.set_var("other", enemy_id.as_str());
        state.set_var("bullet", bullet_id.as_str());
        if program.has_label(BULLET_HIT_LABEL) {
            interp.invoke_label(BULLET_HIT_LABEL);
        } else {
            interp.state().remove_entity(&enemy_id);
        }
    }
}
