//! Screen-space UI: buttons and decorative shapes. Not affected by the camera.

use crate::runtime::state::Aabb;
use crate::types::draw::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct UiButton {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Label tokens, resolved against the variable store when drawn.
    pub tokens: Vec<String>,
    pub bg: Color,
    pub fg: Color,
    pub visible: bool,
    pub enabled: bool,
}

impl UiButton {
    pub fn bounds(&self) -> Aabb { Aabb::new(self.x, self.y, self.w, self.h) }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiShapeKind {
    Rect { x: f64, y: f64, w: f64, h: f64 },
    Circle { x: f64, y: f64, r: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiShape {
    pub id: String,
    pub kind: UiShapeKind,
    pub color: Color,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiElement {
    Button(UiButton),
    Shape(UiShape),
}

impl UiElement {
    pub fn id(&self) -> &str {
        match self {
            UiElement::Button(b) => &b.id,
            UiElement::Shape(s) => &s.id,
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        match self {
            UiElement::Button(b) => b.visible = visible,
            UiElement::Shape(s) => s.visible = visible,
        }
    }
}

/// Insert or replace by id, keeping draw order stable.
pub fn upsert(ui: &mut Vec<UiElement>, el: UiElement) {
    match ui.iter_mut().find(|e| e.id() == el.id()) {
        Some(slot) => *slot = el,
        None => ui.push(el),
    }
}

pub fn find_mut<'a>(ui: &'a mut [UiElement], id: &str) -> Option<&'a mut UiElement> {
    ui.iter_mut().find(|e| e.id() == id)
}

/// Topmost visible, enabled button under the point. Later elements win.
pub fn hit_test(ui: &[UiElement], x: f64, y: f64) -> Option<&UiButton> {
    ui.iter().rev().find_map(|e| match e {
        UiElement::Button(b) if b.visible && b.enabled && b.bounds().contains(x, y) => Some(b),
        _ => None,
    })
}
