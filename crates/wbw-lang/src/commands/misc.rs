use crate::runtime::state::{GameState, Shake};
use crate::runtime::value::parse_number;
use crate::syntax::ast::CommandLine;
use crate::syntax::lexer::unquote;
use super::{CommandInfo, CommandProvider, CommandSpec, arg};

const SHAKE_SECONDS: f64 = 0.3;

pub struct MiscCommands;

impl CommandInfo for MiscCommands {
    fn group(&self) -> &'static str { "misc" }

    fn commands(&self) -> Vec<CommandSpec> {
        ["msg", "shake", "sound"].into_iter().map(CommandSpec::loose).collect()
    }
}

impl CommandProvider for MiscCommands {
    fn exec(&self, name: &str, line: &CommandLine, state: &mut GameState) -> bool {
        match name {
            "msg" => {
                let args = line.args();
                // a trailing numeric literal is the duration
                let (tokens, seconds) = match args.split_last() {
                    Some((last, init)) if !init.is_empty() && parse_number(last).is_some() => {
                        (init, state.num(last))
                    }
                    _ => (args, state.config.message_seconds),
                };
                let text = state.render_tokens(tokens);
                state.push_message(text, seconds);
            }
            "shake" => {
                let magnitude = state.num(arg(line, 0)).abs().min(state.view_w.max(state.view_h));
                let seconds = state.num_or(arg(line, 1), SHAKE_SECONDS);
                // a weaker shake never cuts a stronger one short
                if magnitude >= state.shake.magnitude || state.shake.remaining <= 0.0 {
                    state.shake = Shake { magnitude, remaining: seconds };
                }
            }
            "sound" => {
                let sound = unquote(arg(line, 0)).to_string();
                let volume = state.num_or(arg(line, 1), 1.0).clamp(0.0, 1.0);
                if !sound.is_empty() {
                    state.play_sound(sound, volume);
                }
            }
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn run(state: &mut GameState, raw: &str) {
        let (tokens, _) = crate::syntax::lexer::split_tokens(raw);
        let line = CommandLine::new(tokens, 1, raw);
        assert!(MiscCommands.exec(line.name(), &line, state));
    }

    #[test]
    fn message_duration() {
        let mut s = GameState::new(&EngineConfig::default(), (800.0, 450.0));
        s.set_var("score", 5.0);
        run(&mut s, "msg \"Score:\" score 3");
        run(&mut s, "msg hello");
        assert_eq!(s.messages[0].text, "Score: 5");
        assert_eq!(s.messages[0].remaining, 3.0);
        assert_eq!(s.messages[1].remaining, 2.0);
    }

    #[test]
    fn muted_sounds_are_dropped() {
        let mut s = GameState::new(&EngineConfig::default(), (800.0, 450.0));
        run(&mut s, "sound coin 0.5");
        s.muted = true;
        run(&mut s, "sound coin");
        assert_eq!(s.sounds.len(), 1);
        assert_eq!(s.sounds[0].volume, 0.5);
    }
}
