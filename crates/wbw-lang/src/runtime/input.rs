//! Keyboard, pointer and touch input.
//!
//! The host never touches engine state directly. `start()` creates an
//! `InputSubscription` that owns the shared input fields; hosts get cloneable
//! `InputSink`s holding only a weak reference. Dropping the subscription on
//! `stop()` (or on any early exit) detaches every sink at once.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use crate::config::TouchMode;
use crate::syntax::ast::CommandLine;

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    PointerMove { x: f64, y: f64 },
    PointerDown { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    /// Every active touch point in screen pixels; empty when the last finger lifts.
    Touches(Vec<(f64, f64)>),
    /// Focus lost: release everything.
    Blur,
}

/// Map host key names onto the names bindings use.
pub fn normalize_key(key: &str) -> String {
    if key == " " {
        return "space".into();
    }
    let k = key.trim().to_ascii_lowercase();
    let k = k.strip_prefix("arrow").unwrap_or(&k).to_string();
    match k.as_str() {
        "spacebar" => "space".into(),
        "esc" => "escape".into(),
        "return" => "enter".into(),
        "del" => "delete".into(),
        "control" => "ctrl".into(),
        _ => k,
    }
}

/// Raw fields written by host callbacks. Last write before an update wins.
#[derive(Debug, Default)]
pub struct InputState {
    keys: HashSet<String>,
    pointer: (f64, f64),
    /// No hit-testing happens until the host has reported a position.
    pointer_seen: bool,
    pointer_down: bool,
    /// Latched until the next snapshot so a press+release inside one frame still counts.
    pointer_pressed: bool,
    touches: Vec<(f64, f64)>,
    touch_seen: bool,
}

impl InputState {
    pub fn apply(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::KeyDown(k) => { self.keys.insert(normalize_key(&k)); }
            InputEvent::KeyUp(k) => { self.keys.remove(&normalize_key(&k)); }
            InputEvent::PointerMove { x, y } => {
                self.pointer = (x, y);
                self.pointer_seen = true;
            }
            InputEvent::PointerDown { x, y } => {
                self.pointer = (x, y);
                self.pointer_seen = true;
                self.pointer_down = true;
                self.pointer_pressed = true;
            }
            InputEvent::PointerUp { x, y } => {
                self.pointer = (x, y);
                self.pointer_seen = true;
                self.pointer_down = false;
            }
            InputEvent::Touches(points) => {
                self.touch_seen = true;
                if let Some(&first) = points.first() {
                    self.pointer = first;
                    self.pointer_seen = true;
                    if !self.pointer_down { self.pointer_pressed = true; }
                    self.pointer_down = true;
                } else {
                    self.pointer_down = false;
                }
                self.touches = points;
            }
            InputEvent::Blur => {
                self.keys.clear();
                self.touches.clear();
                self.pointer_down = false;
            }
        }
    }
}

// ─── Subscription / sink ─────────────────────────────────────────────────────

/// Engine-side owner of the input fields. Exactly one exists per running session.
#[derive(Debug)]
pub struct InputSubscription {
    shared: Rc<RefCell<InputState>>,
    prev_keys: HashSet<String>,
}

/// Host-side handle. Sends are silently dropped once the session has stopped.
#[derive(Debug, Clone)]
pub struct InputSink {
    shared: Weak<RefCell<InputState>>,
}

impl InputSink {
    /// Returns `false` if the engine is no longer listening.
    pub fn send(&self, ev: InputEvent) -> bool {
        match self.shared.upgrade() {
            Some(state) => {
                state.borrow_mut().apply(ev);
                true
            }
            None => false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.shared.strong_count() > 0
    }
}

/// One frame's view of the input, with edges already computed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    pub held: HashSet<String>,
    pub pressed: Vec<String>,
    pub released: Vec<String>,
    pub pointer: (f64, f64),
    pub pointer_seen: bool,
    pub pointer_down: bool,
    pub pointer_pressed: bool,
    pub touches: Vec<(f64, f64)>,
    pub touch_active: bool,
}

impl InputSubscription {
    pub fn attach() -> Self {
        tracing::debug!("input listeners attached");
        Self { shared: Rc::new(RefCell::new(InputState::default())), prev_keys: HashSet::new() }
    }

    pub fn sink(&self) -> InputSink {
        InputSink { shared: Rc::downgrade(&self.shared) }
    }

    /// Take this frame's snapshot. `touch_keys` maps touch points to virtual
    /// keys (already filtered by the caller) and is merged with keyboard state.
    pub fn snapshot(&mut self, mode: TouchMode, touch_keys: impl Fn(&[(f64, f64)]) -> HashSet<String>) -> InputSnapshot {
        let mut raw = self.shared.borrow_mut();
        let touch_active = match mode {
            TouchMode::On => true,
            TouchMode::Off => false,
            TouchMode::Auto => raw.touch_seen,
        };

        let mut held = raw.keys.clone();
        if touch_active {
            held.extend(touch_keys(&raw.touches));
        }

        let mut pressed: Vec<String> = held.difference(&self.prev_keys).cloned().collect();
        let mut released: Vec<String> = self.prev_keys.difference(&held).cloned().collect();
        pressed.sort();
        released.sort();

        let snap = InputSnapshot {
            held: held.clone(),
            pressed,
            released,
            pointer: raw.pointer,
            pointer_seen: raw.pointer_seen,
            pointer_down: raw.pointer_down,
            pointer_pressed: raw.pointer_pressed,
            touches: raw.touches.clone(),
            touch_active,
        };
        raw.pointer_pressed = false;
        drop(raw);

        self.prev_keys = held;
        snap
    }
}

impl Drop for InputSubscription {
    fn drop(&mut self) {
        tracing::debug!("input listeners detached");
    }
}

// ─── Touch zones ─────────────────────────────────────────────────────────────

/// Screen zones: left third → `left`, right third → `right`, middle top half
/// → `up`, middle bottom half → `space`.
pub fn touch_zone(x: f64, y: f64, view_w: f64, view_h: f64) -> &'static str {
    if x < view_w / 3.0 {
        "left"
    } else if x > view_w * 2.0 / 3.0 {
        "right"
    } else if y < view_h / 2.0 {
        "up"
    } else {
        "space"
    }
}

// ─── Pointer / UI state ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerState {
    pub x: f64,
    pub y: f64,
    pub down: bool,
    /// UI button under the pointer.
    pub hovered: Option<String>,
    /// UI button pressed this frame.
    pub clicked: Option<String>,
}

// ─── Bindings ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// `on`: every frame the key is held.
    Held,
    /// `onpress`: the frame the key goes down.
    Press,
    /// `onrelease`: the frame the key goes up.
    Release,
    /// `onui`: pointer pressed on the button.
    UiClick,
    /// `onhoverui`: pointer entered the button.
    UiHover,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub kind: BindingKind,
    pub key: String,
    pub action: CommandLine,
}

#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    bindings: Vec<Binding>,
}

impl BindingTable {
    /// Identical bindings (same kind, key and action tokens) are kept once.
    pub fn add(&mut self, kind: BindingKind, key: &str, action: CommandLine) {
        let key = match kind {
            BindingKind::UiClick | BindingKind::UiHover => key.to_string(),
            _ => normalize_key(key),
        };
        let dup = self.bindings.iter().any(|b| b.kind == kind && b.key == key && b.action.tokens == action.tokens);
        if !dup {
            self.bindings.push(Binding { kind, key, action });
        }
    }

    pub fn actions(&self, kind: BindingKind, key: &str) -> Vec<CommandLine> {
        self.bindings
            .iter()
            .filter(|b| b.kind == kind && b.key == key)
            .map(|b| b.action.clone())
            .collect()
    }

    /// Keys that have at least one binding of this kind, in declaration order.
    pub fn keys(&self, kind: BindingKind) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for b in self.bindings.iter().filter(|b| b.kind == kind) {
            if !out.contains(&b.key) { out.push(b.key.clone()); }
        }
        out
    }

    pub fn len(&self) -> usize { self.bindings.len() }

    pub fn is_empty(&self) -> bool { self.bindings.is_empty() }
}
