//! All mutable simulation state. Created fresh by `start()`, dropped by `stop()`.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;

use crate::config::{EngineConfig, TouchMode};
use crate::runtime::camera::Camera;
use crate::runtime::input::{BindingTable, PointerState};
use crate::runtime::timers::TimerRegistry;
use crate::runtime::ui::UiElement;
use crate::runtime::value::{Value, parse_number};
use crate::syntax::lexer::{is_quoted, unquote};
use crate::types::draw::Color;

pub const PLAYER_ID: &str = "player";

/// Variables the engine rewrites every frame. User writes to these survive
/// only until the next sync.
pub const RESERVED_VARS: &[&str] = &[
    "px", "py", "pvx", "pvy", "grounded",
    "time", "frame", "delta",
    "worldw", "worldh", "screenw", "screenh",
    "camx", "camy",
    "mousex", "mousey", "mousedown", "hoverui", "clickui",
    "touch",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_VARS.contains(&name)
}

// ─── Geometry ────────────────────────────────────────────────────────────────

/// Axis-aligned box, top-left anchored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Aabb {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self { Self { x, y, w, h } }

    /// Strict overlap: boxes that merely touch do not overlap.
    pub fn overlaps(&self, o: &Aabb) -> bool {
        self.x < o.x + o.w && self.x + self.w > o.x && self.y < o.y + o.h && self.y + self.h > o.y
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }
}

// ─── Entities ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Player,
    Enemy,
    Item,
    Bullet,
    Custom(String),
}

impl EntityKind {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "player" => Self::Player,
            "enemy"  => Self::Enemy,
            "item"   => Self::Item,
            "bullet" => Self::Bullet,
            other    => Self::Custom(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Player => "player",
            Self::Enemy  => "enemy",
            Self::Item   => "item",
            Self::Bullet => "bullet",
            Self::Custom(s) => s,
        }
    }

    pub fn default_color(&self) -> Color {
        match self {
            Self::Player => Color::rgb(74, 222, 128),
            Self::Enemy  => Color::rgb(239, 68, 68),
            Self::Item   => Color::rgb(250, 204, 21),
            Self::Bullet => Color::rgb(255, 255, 255),
            Self::Custom(_) => Color::rgb(147, 197, 253),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: String,
    pub kind: EntityKind,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub vx: f64,
    pub vy: f64,
    pub color: Color,
}

impl Entity {
    pub fn new(id: impl Into<String>, kind: EntityKind, x: f64, y: f64, w: f64, h: f64) -> Self {
        let color = kind.default_color();
        Self { id: id.into(), kind, x, y, w, h, vx: 0.0, vy: 0.0, color }
    }

    pub fn aabb(&self) -> Aabb { Aabb::new(self.x, self.y, self.w, self.h) }

    pub fn center(&self) -> (f64, f64) { (self.x + self.w / 2.0, self.y + self.h / 2.0) }

    fn property(&self, prop: &str) -> Option<f64> {
        Some(match prop {
            "x" => self.x,
            "y" => self.y,
            "w" => self.w,
            "h" => self.h,
            "vx" => self.vx,
            "vy" => self.vy,
            "cx" => self.center().0,
            "cy" => self.center().1,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Patrol {
    pub id: String,
    pub min_x: f64,
    pub max_x: f64,
    pub speed: f64,
}

// ─── Drawables ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Rect { x: f64, y: f64, w: f64, h: f64, solid: bool },
    Circle { x: f64, y: f64, r: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64, width: f64 },
    Triangle { points: [(f64, f64); 3] },
}

/// World-space static shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub color: Color,
}

impl Shape {
    pub fn solid_box(&self) -> Option<Aabb> {
        match self.kind {
            ShapeKind::Rect { x, y, w, h, solid: true } => Some(Aabb::new(x, y, w, h)),
            _ => None,
        }
    }
}

/// Text whose tokens are resolved against the variable store at render time.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub x: f64,
    pub y: f64,
    pub tokens: Vec<String>,
    pub color: Color,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub text: String,
    pub remaining: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Shake {
    pub magnitude: f64,
    pub remaining: f64,
}

/// A sound request queued for the host.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundCue {
    pub name: String,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsParams {
    pub gravity: f64,
    pub friction: f64,
    pub jump_power: f64,
    pub max_fall_speed: f64,
}

// ─── State ───────────────────────────────────────────────────────────────────

pub struct GameState {
    pub vars: HashMap<String, Value>,
    pub player: Option<Entity>,
    pub grounded: bool,
    pub entities: Vec<Entity>,
    pub patrols: Vec<Patrol>,

    /// Shapes/texts emitted by init persist; those emitted during a frame
    /// live in the `frame_*` lists, cleared at the start of every update.
    pub shapes: Vec<Shape>,
    pub texts: Vec<TextItem>,
    pub hud: Vec<TextItem>,
    pub frame_shapes: Vec<Shape>,
    pub frame_texts: Vec<TextItem>,
    pub frame_hud: Vec<TextItem>,
    pub emitting_persistent: bool,
    /// Solid frame shapes from the previous frame. Platforms drawn in `tick`
    /// run after physics, so the next step collides with these.
    pub carried_solids: Vec<Aabb>,

    pub ui: Vec<UiElement>,
    pub timers: TimerRegistry,
    pub bindings: BindingTable,
    pub messages: Vec<Message>,
    pub camera: Camera,
    pub pointer: PointerState,
    pub physics: PhysicsParams,

    pub background: Color,
    pub draw_color: Color,
    pub world_w: f64,
    pub world_h: f64,
    pub view_w: f64,
    pub view_h: f64,
    pub checkpoint: (f64, f64),
    pub shake: Shake,
    pub sounds: Vec<SoundCue>,
    pub muted: bool,
    pub touch_mode: TouchMode,
    pub touch_active: bool,

    pub frame: u64,
    pub time: f64,
    pub delta: f64,
    pub bullet_seq: u64,
    pub rng: StdRng,
    pub config: EngineConfig,
}

impl GameState {
    pub fn new(config: &EngineConfig, viewport: (f64, f64)) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            vars: HashMap::new(),
            player: None,
            grounded: false,
            entities: Vec::new(),
            patrols: Vec::new(),
            shapes: Vec::new(),
            texts: Vec::new(),
            hud: Vec::new(),
            frame_shapes: Vec::new(),
            frame_texts: Vec::new(),
            frame_hud: Vec::new(),
            emitting_persistent: true,
            carried_solids: Vec::new(),
            ui: Vec::new(),
            timers: TimerRegistry::default(),
            bindings: BindingTable::default(),
            messages: Vec::new(),
            camera: Camera::new(config.camera_lerp),
            pointer: PointerState::default(),
            physics: PhysicsParams {
                gravity: config.gravity,
                friction: config.friction,
                jump_power: config.jump_power,
                max_fall_speed: config.max_fall_speed,
            },
            background: Color::rgb(17, 24, 39),
            draw_color: Color::rgb(148, 163, 184),
            world_w: viewport.0,
            world_h: viewport.1,
            view_w: viewport.0,
            view_h: viewport.1,
            checkpoint: (0.0, 0.0),
            shake: Shake::default(),
            sounds: Vec::new(),
            muted: false,
            touch_mode: config.touch,
            touch_active: config.touch == TouchMode::On,
            frame: 0,
            time: 0.0,
            delta: config.frame_seconds(),
            bullet_seq: 0,
            rng,
            config: config.clone(),
        }
    }

    // ─── Variables ────────────────────────────────────────────────────────────

    pub fn var(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn set_var(&mut self, name: &str, value: impl Into<Value>) {
        self.vars.insert(name.to_string(), value.into());
    }

    /// Resolve a token to a value: quoted literal, number, variable, entity
    /// property (`id.x`), or the bare word itself as text.
    pub fn resolve(&self, token: &str) -> Value {
        if is_quoted(token) || token.starts_with('"') {
            return Value::Str(self.interpolate(unquote(token)));
        }
        if let Some(n) = parse_number(token) {
            return Value::Num(n);
        }
        if let Some(v) = self.vars.get(token) {
            return v.clone();
        }
        if let Some((id, prop)) = token.split_once('.') {
            let id = self.entity_ref(id);
            if let Some(n) = self.entity(&id).and_then(|e| e.property(prop)) {
                return Value::Num(n);
            }
        }
        match token.to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" => Value::Num(1.0),
            "false" | "off" | "no" => Value::Num(0.0),
            _ => Value::Str(token.to_string()),
        }
    }

    pub fn num(&self, token: &str) -> f64 {
        if token.is_empty() { return 0.0; }
        self.resolve(token).as_num()
    }

    /// Like `num` but with a default for a missing token.
    pub fn num_or(&self, token: &str, default: f64) -> f64 {
        if token.is_empty() { default } else { self.num(token) }
    }

    pub fn text(&self, token: &str) -> String {
        self.resolve(token).to_text()
    }

    /// Entity / UI id named by a token: a string variable holding an id is
    /// followed once, anything else is taken literally.
    pub fn entity_ref(&self, token: &str) -> String {
        if is_quoted(token) {
            return unquote(token).to_string();
        }
        match self.vars.get(token) {
            Some(Value::Str(s)) => s.clone(),
            _ => token.to_string(),
        }
    }

    pub fn color(&self, token: &str) -> Option<Color> {
        if token.is_empty() { return None; }
        Color::parse(unquote(token)).or_else(|| Color::parse(&self.text(token)))
    }

    /// `{name}` inside quoted text is replaced by the variable's value.
    pub fn interpolate(&self, s: &str) -> String {
        if !s.contains('{') { return s.to_string(); }
        let mut out = String::with_capacity(s.len());
        let mut rest = s;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let name = after[..close].trim();
                    match self.vars.get(name) {
                        Some(v) => out.push_str(&v.to_text()),
                        None => {
                            out.push('{');
                            out.push_str(&after[..=close]);
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Join display tokens: quoted text is interpolated, variables and entity
    /// properties show their value, anything else prints as written.
    pub fn render_tokens(&self, tokens: &[String]) -> String {
        tokens
            .iter()
            .map(|t| {
                if t.starts_with('"') {
                    return self.interpolate(unquote(t));
                }
                if self.vars.contains_key(t.as_str()) || t.contains('.') {
                    return self.text(t);
                }
                t.clone()
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    // ─── Entities ─────────────────────────────────────────────────────────────

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        if id == PLAYER_ID {
            return self.player.as_ref();
        }
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: &str) -> Option<&mut Entity> {
        if id == PLAYER_ID {
            return self.player.as_mut();
        }
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Insert or replace by id, keeping the original position in the list.
    pub fn upsert_entity(&mut self, entity: Entity) {
        if entity.kind == EntityKind::Player || entity.id == PLAYER_ID {
            self.player = Some(Entity { id: PLAYER_ID.into(), kind: EntityKind::Player, ..entity });
            return;
        }
        match self.entities.iter_mut().find(|e| e.id == entity.id) {
            Some(slot) => *slot = entity,
            None => self.entities.push(entity),
        }
    }

    pub fn remove_entity(&mut self, id: &str) -> bool {
        if id == PLAYER_ID {
            return self.player.take().is_some();
        }
        let before = self.entities.len();
        self.entities.retain(|e| e.id != id);
        self.entities.len() != before
    }

    pub fn next_bullet_id(&mut self) -> String {
        self.bullet_seq += 1;
        format!("bullet{}", self.bullet_seq)
    }

    // ─── Emission ─────────────────────────────────────────────────────────────

    pub fn emit_shape(&mut self, shape: Shape) {
        if self.emitting_persistent { self.shapes.push(shape) } else { self.frame_shapes.push(shape) }
    }

    pub fn emit_text(&mut self, text: TextItem) {
        if self.emitting_persistent { self.texts.push(text) } else { self.frame_texts.push(text) }
    }

    pub fn emit_hud(&mut self, text: TextItem) {
        if self.emitting_persistent { self.hud.push(text) } else { self.frame_hud.push(text) }
    }

    pub fn clear_frame_layer(&mut self) {
        self.carried_solids = self.frame_shapes.iter().filter_map(Shape::solid_box).collect();
        self.frame_shapes.clear();
        self.frame_texts.clear();
        self.frame_hud.clear();
    }

    /// Persistent solids, this frame's solids and last frame's carried ones.
    pub fn solids(&self) -> Vec<Aabb> {
        let mut out: Vec<Aabb> = self.shapes.iter().chain(&self.frame_shapes).filter_map(Shape::solid_box).collect();
        out.extend_from_slice(&self.carried_solids);
        out
    }

    pub fn push_message(&mut self, text: String, seconds: f64) {
        self.messages.push(Message { text, remaining: seconds });
    }

    pub fn play_sound(&mut self, name: String, volume: f64) {
        if !self.muted {
            self.sounds.push(SoundCue { name, volume });
        }
    }

    // ─── Reserved variables ───────────────────────────────────────────────────

    pub fn sync_reserved(&mut self) {
        let (px, py, pvx, pvy) = self
            .player
            .as_ref()
            .map(|p| (p.x, p.y, p.vx, p.vy))
            .unwrap_or_default();
        let hover = self.pointer.hovered.clone().unwrap_or_default();
        let click = self.pointer.clicked.clone().unwrap_or_default();

        let nums = [
            ("px", px),
            ("py", py),
            ("pvx", pvx),
            ("pvy", pvy),
            ("grounded", if self.grounded { 1.0 } else { 0.0 }),
            ("time", self.time),
            ("frame", self.frame as f64),
            ("delta", self.delta),
            ("worldw", self.world_w),
            ("worldh", self.world_h),
            ("screenw", self.view_w),
            ("screenh", self.view_h),
            ("camx", self.camera.x),
            ("camy", self.camera.y),
            ("mousex", self.pointer.x),
            ("mousey", self.pointer.y),
            ("mousedown", if self.pointer.down { 1.0 } else { 0.0 }),
            ("touch", if self.touch_active { 1.0 } else { 0.0 }),
        ];
        for (k, v) in nums {
            self.vars.insert(k.to_string(), Value::Num(v));
        }
        self.vars.insert("hoverui".into(), Value::Str(hover));
        self.vars.insert("clickui".into(), Value::Str(click));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(&EngineConfig { seed: Some(1), ..EngineConfig::default() }, (800.0, 450.0))
    }

    #[test]
    fn resolve_order() {
        let mut s = state();
        s.set_var("hp", 3.0);
        s.set_var("who", "coin1");
        s.upsert_entity(Entity::new("coin1", EntityKind::Item, 5.0, 6.0, 10.0, 10.0));

        assert_eq!(s.resolve("4.5"), Value::Num(4.5));
        assert_eq!(s.resolve("hp"), Value::Num(3.0));
        assert_eq!(s.resolve("\"hp\""), Value::Str("hp".into()));
        assert_eq!(s.resolve("coin1.x"), Value::Num(5.0));
        assert_eq!(s.resolve("who.cx"), Value::Num(10.0));
        assert_eq!(s.resolve("nothing"), Value::Str("nothing".into()));
        assert_eq!(s.num("nothing"), 0.0);
        assert_eq!(s.resolve("on"), Value::Num(1.0));
    }

    #[test]
    fn entity_ref_follows_string_vars() {
        let mut s = state();
        s.set_var("other", "enemy3");
        assert_eq!(s.entity_ref("other"), "enemy3");
        assert_eq!(s.entity_ref("enemy4"), "enemy4");
    }

    #[test]
    fn interpolation() {
        let mut s = state();
        s.set_var("score", 12.0);
        assert_eq!(s.interpolate("Score: {score}!"), "Score: 12!");
        assert_eq!(s.interpolate("{missing}"), "{missing}");
        assert_eq!(s.interpolate("open {brace"), "open {brace");
    }

    #[test]
    fn render_tokens_mixes_literals_and_vars() {
        let mut s = state();
        s.set_var("hp", 2.0);
        let toks: Vec<String> = vec!["\"HP:\"".into(), "hp".into(), "left".into()];
        assert_eq!(s.render_tokens(&toks), "HP: 2 left");
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut s = state();
        s.upsert_entity(Entity::new("a", EntityKind::Enemy, 0.0, 0.0, 1.0, 1.0));
        s.upsert_entity(Entity::new("b", EntityKind::Enemy, 0.0, 0.0, 1.0, 1.0));
        s.upsert_entity(Entity::new("a", EntityKind::Item, 9.0, 0.0, 1.0, 1.0));
        assert_eq!(s.entities.len(), 2);
        assert_eq!(s.entities[0].kind, EntityKind::Item);
        assert!(s.remove_entity("a"));
        assert!(!s.remove_entity("a"));
    }

    #[test]
    fn transient_layer() {
        let mut s = state();
        let r = Shape { kind: ShapeKind::Rect { x: 0.0, y: 0.0, w: 1.0, h: 1.0, solid: true }, color: Color::WHITE };
        s.emit_shape(r.clone());
        s.emitting_persistent = false;
        s.emit_shape(r);
        assert_eq!(s.solids().len(), 2);
        s.clear_frame_layer();
        assert_eq!(s.solids().len(), 1);
    }

    #[test]
    fn reserved_sync_overwrites_user_values() {
        let mut s = state();
        s.set_var("px", 999.0);
        s.upsert_entity(Entity::new(PLAYER_ID, EntityKind::Player, 10.0, 20.0, 32.0, 32.0));
        s.sync_reserved();
        assert_eq!(s.var("px"), Some(&Value::Num(10.0)));
        assert_eq!(s.var("worldw"), Some(&Value::Num(800.0)));
        assert!(is_reserved("camx"));
    }
}
