use crate::runtime::state::GameState;
use crate::runtime::ui::{self, UiButton, UiElement, UiShape, UiShapeKind};
use crate::syntax::ast::CommandLine;
use crate::types::draw::Color;
use super::{CommandInfo, CommandProvider, CommandSpec, arg, flag, id_arg, rest};

const BUTTON_BG: Color = Color::rgb(55, 65, 81);

pub struct UiCommands;

impl CommandInfo for UiCommands {
    fn group(&self) -> &'static str { "ui" }

    fn commands(&self) -> Vec<CommandSpec> {
        ["uirect", "uicircle", "uiline", "button", "uivisible", "uienable", "uicolor", "removeui", "clearui"]
            .into_iter()
            .map(CommandSpec::loose)
            .collect()
    }
}

impl CommandProvider for UiCommands {
    fn exec(&self, name: &str, line: &CommandLine, state: &mut GameState) -> bool {
        let id = id_arg(state, arg(line, 0));
        let n = |i: usize| state.num(arg(line, i));
        match name {
            "uirect" | "uicircle" | "uiline" => {
                let (kind, color_at) = match name {
                    "uirect" => (UiShapeKind::Rect { x: n(1), y: n(2), w: n(3), h: n(4) }, 5),
                    "uicircle" => (UiShapeKind::Circle { x: n(1), y: n(2), r: n(3).abs() }, 4),
                    _ => (UiShapeKind::Line { x1: n(1), y1: n(2), x2: n(3), y2: n(4) }, 5),
                };
                let color = state.color(arg(line, color_at)).unwrap_or(Color::WHITE);
                ui::upsert(&mut state.ui, UiElement::Shape(UiShape { id, kind, color, visible: true }));
            }
            "button" => {
                let button = UiButton {
                    id,
                    x: n(1),
                    y: n(2),
                    w: n(3),
                    h: n(4),
                    tokens: rest(line, 5).to_vec(),
                    bg: BUTTON_BG,
                    fg: Color::WHITE,
                    visible: true,
                    enabled: true,
                };
                ui::upsert(&mut state.ui, UiElement::Button(button));
            }
            "uivisible" => {
                let on = flag(state, arg(line, 1));
                if let Some(el) = ui::find_mut(&mut state.ui, &id) { el.set_visible(on); }
            }
            "uienable" => {
                let on = flag(state, arg(line, 1));
                if let Some(UiElement::Button(b)) = ui::find_mut(&mut state.ui, &id) { b.enabled = on; }
            }
            "uicolor" => {
                let bg = state.color(arg(line, 1));
                let fg = state.color(arg(line, 2));
                match ui::find_mut(&mut state.ui, &id) {
                    Some(UiElement::Button(b)) => {
                        if let Some(c) = bg { b.bg = c; }
                        if let Some(c) = fg { b.fg = c; }
                    }
                    Some(UiElement::Shape(s)) => {
                        if let Some(c) = bg { s.color = c; }
                    }
                    None => {}
                }
            }
            "removeui" => state.ui.retain(|e| e.id() != id),
            "clearui" => state.ui.clear(),
            _ => return false,
        }
        true
    }
}
