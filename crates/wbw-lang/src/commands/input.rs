use crate::config::TouchMode;
use crate::error::ErrorCode;
use crate::runtime::input::BindingKind;
use crate::runtime::state::GameState;
use crate::syntax::ast::CommandLine;
use crate::syntax::lexer::unquote;
use super::{Arity, CommandInfo, CommandProvider, CommandSpec, arg, id_arg, rest};

pub const BINDING_COMMANDS: &[&str] = &["on", "onpress", "onrelease", "onui", "onhoverui"];

pub fn binding_kind(name: &str) -> Option<BindingKind> {
    Some(match name {
        "on" => BindingKind::Held,
        "onpress" => BindingKind::Press,
        "onrelease" => BindingKind::Release,
        "onui" => BindingKind::UiClick,
        "onhoverui" => BindingKind::UiHover,
        _ => return None,
    })
}

pub struct InputCommands;

impl CommandInfo for InputCommands {
    fn group(&self) -> &'static str { "input" }

    fn commands(&self) -> Vec<CommandSpec> {
        let mut v: Vec<CommandSpec> = BINDING_COMMANDS
            .iter()
            .map(|&n| CommandSpec::checked(n, Arity::AtLeast(2), ErrorCode::V004))
            .collect();
        v.push(CommandSpec::loose("touch"));
        v
    }
}

impl CommandProvider for InputCommands {
    fn exec(&self, name: &str, line: &CommandLine, state: &mut GameState) -> bool {
        if name == "touch" {
            if let Some(mode) = TouchMode::parse(&state.text(arg(line, 0))) {
                state.touch_mode = mode;
                if mode != TouchMode::Auto {
                    state.touch_active = mode == TouchMode::On;
                }
            }
            return true;
        }
        let Some(kind) = binding_kind(name) else { return false };
        let action = rest(line, 1);
        if action.is_empty() {
            return true;
        }
        let key = match kind {
            BindingKind::UiClick | BindingKind::UiHover => id_arg(state, arg(line, 0)),
            _ => unquote(arg(line, 0)).to_string(),
        };
        state.bindings.add(kind, &key, line.sub_line(action));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn run(state: &mut GameState, raw: &str) {
        let (tokens, _) = crate::syntax::lexer::split_tokens(raw);
        let line = CommandLine::new(tokens, 4, raw);
        assert!(InputCommands.exec(line.name(), &line, state));
    }

    #[test]
    fn bindings_are_recorded_once() {
        let mut s = GameState::new(&EngineConfig::default(), (800.0, 450.0));
        run(&mut s, "on Right velx player 4");
        run(&mut s, "on right velx player 4");
        run(&mut s, "onui start goto begin");
        assert_eq!(s.bindings.len(), 2);
        let held = s.bindings.actions(BindingKind::Held, "right");
        assert_eq!(held[0].tokens, vec!["velx", "player", "4"]);
        assert_eq!(held[0].line, 4);
    }

    #[test]
    fn touch_mode_switch() {
        let mut s = GameState::new(&EngineConfig::default(), (800.0, 450.0));
        run(&mut s, "touch on");
        assert_eq!(s.touch_mode, TouchMode::On);
        assert!(s.touch_active);
        run(&mut s, "touch off");
        assert!(!s.touch_active);
    }
}
