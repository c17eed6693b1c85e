use crate::runtime::state::{GameState, Shape, ShapeKind, TextItem};
use crate::syntax::ast::CommandLine;
use crate::types::draw::Color;
use super::{CommandInfo, CommandProvider, CommandSpec, arg, is_color_token, rest};

pub const TEXT_SIZE: f64 = 16.0;

pub struct ShapeCommands;

impl CommandInfo for ShapeCommands {
    fn group(&self) -> &'static str { "shapes" }

    fn commands(&self) -> Vec<CommandSpec> {
        ["rect", "platform", "circle", "line", "tri", "bg", "color", "text", "hud"]
            .into_iter()
            .map(CommandSpec::loose)
            .collect()
    }
}

impl CommandProvider for ShapeCommands {
    fn exec(&self, name: &str, line: &CommandLine, state: &mut GameState) -> bool {
        let n = |i: usize| state.num(arg(line, i));
        match name {
            "rect" | "platform" => {
                let (x, y, w, h) = (n(0), n(1), n(2), n(3));
                let mut solid = name == "platform";
                let mut color = state.draw_color;
                for tok in rest(line, 4) {
                    if tok.eq_ignore_ascii_case("solid") {
                        solid = true;
                    } else if let Some(c) = color_of(state, tok) {
                        color = c;
                    }
                }
                state.emit_shape(Shape { kind: ShapeKind::Rect { x, y, w, h, solid }, color });
            }
            "circle" => {
                let kind = ShapeKind::Circle { x: n(0), y: n(1), r: n(2).abs() };
                let color = color_of(state, arg(line, 3)).unwrap_or(state.draw_color);
                state.emit_shape(Shape { kind, color });
            }
            "line" => {
                let color = color_of(state, arg(line, 4)).unwrap_or(state.draw_color);
                let width = state.num_or(arg(line, 5), 2.0);
                let kind = ShapeKind::Line { x1: n(0), y1: n(1), x2: n(2), y2: n(3), width };
                state.emit_shape(Shape { kind, color });
            }
            "tri" => {
                let points = [(n(0), n(1)), (n(2), n(3)), (n(4), n(5))];
                let color = color_of(state, arg(line, 6)).unwrap_or(state.draw_color);
                state.emit_shape(Shape { kind: ShapeKind::Triangle { points }, color });
            }
            "bg" => {
                if let Some(c) = state.color(arg(line, 0)) { state.background = c; }
            }
            "color" => {
                if let Some(c) = state.color(arg(line, 0)) { state.draw_color = c; }
            }
            "text" | "hud" => {
                let item = TextItem {
                    x: n(0),
                    y: n(1),
                    tokens: rest(line, 2).to_vec(),
                    color: Color::WHITE,
                    size: TEXT_SIZE,
                };
                if name == "text" { state.emit_text(item) } else { state.emit_hud(item) }
            }
            _ => return false,
        }
        true
    }
}

fn color_of(state: &GameState, token: &str) -> Option<Color> {
    if is_color_token(state, token) { state.color(token) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn run(state: &mut GameState, raw: &str) {
        let (tokens, _) = crate::syntax::lexer::split_tokens(raw);
        let line = CommandLine::new(tokens, 1, raw);
        assert!(ShapeCommands.exec(line.name(), &line, state));
    }

    #[test]
    fn platforms_are_solid() {
        let mut s = GameState::new(&EngineConfig::default(), (800.0, 450.0));
        run(&mut s, "platform 0 400 800 50 brown");
        run(&mut s, "rect 10 10 5 5 red");
        run(&mut s, "rect 10 10 5 5 solid");
        assert_eq!(s.solids().len(), 2);
        assert_eq!(s.shapes[1].color, Color::parse("red").unwrap());
    }

    #[test]
    fn hud_keeps_tokens_for_render_time() {
        let mut s = GameState::new(&EngineConfig::default(), (800.0, 450.0));
        run(&mut s, "hud 10 10 \"Score:\" score");
        assert_eq!(s.hud[0].tokens, vec!["\"Score:\"".to_string(), "score".to_string()]);
    }

    #[test]
    fn color_sets_default() {
        let mut s = GameState::new(&EngineConfig::default(), (800.0, 450.0));
        run(&mut s, "color #ff0000");
        run(&mut s, "circle 5 5 3");
        assert_eq!(s.shapes[0].color, Color::rgb(255, 0, 0));
    }
}
