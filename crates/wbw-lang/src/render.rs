//! Turns the final frame state into draw commands. Read-only with respect to
//! the simulation: the only mutable state is the renderer's own jitter RNG.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::runtime::state::{Entity, GameState, Shape, ShapeKind, TextItem};
use crate::runtime::ui::{UiElement, UiShapeKind};
use crate::types::draw::{Color, DrawCommand, TextAlign};

const MESSAGE_SIZE: f64 = 20.0;
const MESSAGE_TOP: f64 = 40.0;
const MESSAGE_SPACING: f64 = 28.0;
const UI_LINE_WIDTH: f64 = 2.0;
const BUTTON_TEXT_SIZE: f64 = 16.0;

pub struct Renderer {
    rng: StdRng,
}

impl Renderer {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s ^ 0x5eed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn render(&mut self, state: &GameState) -> Vec<DrawCommand> {
        let mut out = vec![DrawCommand::Clear(state.background)];

        let (jx, jy) = self.jitter(state);
        let off = (-state.camera.x + jx, -state.camera.y + jy);

        // ── World space ──────────────────────────────────────────────────────
        for shape in state.shapes.iter().chain(&state.frame_shapes) {
            out.push(shape_command(shape, off));
        }
        for e in &state.entities {
            out.push(entity_command(e, off));
        }
        if let Some(p) = &state.player {
            out.push(entity_command(p, off));
        }
        for t in state.texts.iter().chain(&state.frame_texts) {
            out.push(text_command(state, t, off));
        }

        // ── Screen space ─────────────────────────────────────────────────────
        for t in state.hud.iter().chain(&state.frame_hud) {
            out.push(text_command(state, t, (0.0, 0.0)));
        }
        for el in &state.ui {
            ui_commands(state, el, &mut out);
        }
        for (i, m) in state.messages.iter().enumerate() {
            out.push(DrawCommand::Text {
                x: state.view_w / 2.0,
                y: MESSAGE_TOP + i as f64 * MESSAGE_SPACING,
                text: m.text.clone(),
                size: MESSAGE_SIZE,
                color: Color::WHITE,
                align: TextAlign::Center,
            });
        }
        out
    }

    fn jitter(&mut self, state: &GameState) -> (f64, f64) {
        let m = state.shake.magnitude;
        if state.shake.remaining <= 0.0 || m <= 0.0 {
            return (0.0, 0.0);
        }
        let mut sample = || (self.rng.r#gen::<f64>() * 2.0 - 1.0) * m;
        (sample(), sample())
    }
}

fn shape_command(shape: &Shape, (ox, oy): (f64, f64)) -> DrawCommand {
    let color = shape.color;
    match shape.kind {
        ShapeKind::Rect { x, y, w, h, .. } => DrawCommand::Rect { x: x + ox, y: y + oy, w, h, color },
        ShapeKind::Circle { x, y, r } => DrawCommand::Circle { x: x + ox, y: y + oy, r, color },
        ShapeKind::Line { x1, y1, x2, y2, width } => DrawCommand::Line {
            x1: x1 + ox,
            y1: y1 + oy,
            x2: x2 + ox,
            y2: y2 + oy,
            width,
            color,
        },
        ShapeKind::Triangle { points } => DrawCommand::Triangle {
            points: points.map(|(x, y)| (x + ox, y + oy)),
            color,
        },
    }
}

fn entity_command(e: &Entity, (ox, oy): (f64, f64)) -> DrawCommand {
    DrawCommand::Rect { x: e.x + ox, y: e.y + oy, w: e.w, h: e.h, color: e.color }
}

fn text_command(state: &GameState, t: &TextItem, (ox, oy): (f64, f64)) -> DrawCommand {
    DrawCommand::Text {
        x: t.x + ox,
        y: t.y + oy,
        text: state.render_tokens(&t.tokens),
        size: t.size,
        color: t.color,
        align: TextAlign::Left,
    }
}

fn ui_commands(state: &GameState, el: &UiElement, out: &mut Vec<DrawCommand>) {
    match el {
        UiElement::Shape(s) if s.visible => out.push(match s.kind {
            UiShapeKind::Rect { x, y, w, h } => DrawCommand::Rect { x, y, w, h, color: s.color },
            UiShapeKind::Circle { x, y, r } => DrawCommand::Circle { x, y, r, color: s.color },
            UiShapeKind::Line { x1, y1, x2, y2 } => DrawCommand::Line {
                x1,
                y1,
                x2,
                y2,
                width: UI_LINE_WIDTH,
                color: s.color,
            },
        }),
        UiElement::Button(b) if b.visible => {
            let hovered = state.pointer.hovered.as_deref() == Some(b.id.as_str());
            let (bg, fg) = if !b.enabled {
                (b.bg.with_alpha(110), b.fg.with_alpha(110))
            } else if hovered {
                (b.bg.lighten(0.2), b.fg)
            } else {
                (b.bg, b.fg)
            };
            out.push(DrawCommand::Rect { x: b.x, y: b.y, w: b.w, h: b.h, color: bg });
            out.push(DrawCommand::Text {
                x: b.x + b.w / 2.0,
                y: b.y + (b.h - BUTTON_TEXT_SIZE) / 2.0,
                text: state.render_tokens(&b.tokens),
                size: BUTTON_TEXT_SIZE,
                color: fg,
                align: TextAlign::Center,
            });
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::runtime::state::{EntityKind, PLAYER_ID, Shake};
    use crate::runtime::ui::UiButton;

    fn state() -> GameState {
        let mut s = GameState::new(&EngineConfig { seed: Some(2), ..EngineConfig::default() }, (800.0, 450.0));
        s.upsert_entity(Entity::new(PLAYER_ID, EntityKind::Player, 500.0, 100.0, 32.0, 32.0));
        s.hud.push(TextItem { x: 10.0, y: 10.0, tokens: vec!["hp".into()], color: Color::WHITE, size: 16.0 });
        s.set_var("hp", 3.0);
        s
    }

    #[test]
    fn camera_offsets_world_but_not_hud() {
        let mut s = state();
        s.camera.x = 200.0;
        let cmds = Renderer::new(Some(1)).render(&s);
        assert_eq!(cmds[0], DrawCommand::Clear(s.background));
        assert!(cmds.iter().any(|c| matches!(c, DrawCommand::Rect { x, .. } if *x == 300.0)));
        assert!(cmds.iter().any(|c| matches!(c, DrawCommand::Text { x, text, .. } if *x == 10.0 && text == "3")));
    }

    #[test]
    fn rendering_leaves_state_untouched() {
        let s = state();
        let vars_before = s.vars.clone();
        let mut r = Renderer::new(Some(1));
        let a = r.render(&s);
        let b = r.render(&s);
        assert_eq!(a, b);
        assert_eq!(s.vars, vars_before);
        assert_eq!(s.player.as_ref().unwrap().x, 500.0);
    }

    #[test]
    fn shake_jitter_is_bounded() {
        let mut s = state();
        s.shake = Shake { magnitude: 4.0, remaining: 1.0 };
        let mut r = Renderer::new(Some(9));
        for _ in 0..50 {
            let cmds = r.render(&s);
            let Some(DrawCommand::Rect { x, .. }) = cmds.iter().find(|c| matches!(c, DrawCommand::Rect { .. })) else {
                panic!("player not drawn");
            };
            assert!((*x - 500.0).abs() <= 4.0);
        }
    }

    #[test]
    fn huge_shake_stays_finite() {
        let mut s = state();
        s.shake = Shake { magnitude: 1e308, remaining: 1.0 };
        let cmds = Renderer::new(Some(3)).render(&s);
        let Some(DrawCommand::Rect { x, y, .. }) = cmds.iter().find(|c| matches!(c, DrawCommand::Rect { .. })) else {
            panic!("player not drawn");
        };
        assert!(x.is_finite() && y.is_finite());
    }

    #[test]
    fn hidden_buttons_are_skipped_and_hover_lightens() {
        let mut s = state();
        let bg = Color::rgb(10, 10, 10);
        for (id, visible) in [("a", true), ("b", false)] {
            s.ui.push(UiElement::Button(UiButton {
                id: id.into(),
                x: 0.0,
                y: 0.0,
                w: 10.0,
                h: 10.0,
                tokens: vec!["\"go\"".into()],
                bg,
                fg: Color::WHITE,
                visible,
                enabled: true,
            }));
        }
        s.pointer.hovered = Some("a".into());
        let cmds = Renderer::new(Some(1)).render(&s);
        let buttons: Vec<_> = cmds
            .iter()
            .filter(|c| matches!(c, DrawCommand::Text { text, .. } if text == "go"))
            .collect();
        assert_eq!(buttons.len(), 1);
        assert!(cmds.iter().any(|c| matches!(c, DrawCommand::Rect { color, .. } if *color == bg.lighten(0.2))));
    }
}
