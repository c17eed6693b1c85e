use crate::error::ErrorCode;
use crate::runtime::state::GameState;
use crate::runtime::timers::Timer;
use crate::runtime::value::parse_number;
use crate::syntax::ast::CommandLine;
use crate::syntax::lexer::unquote;
use super::{Arity, CommandInfo, CommandProvider, CommandSpec, arg, id_arg};

/// `after|every <duration> [goto] <label> [id]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerArgs<'a> {
    pub duration: &'a str,
    pub label: &'a str,
    pub id: Option<&'a str>,
}

pub fn parse_timer_args(line: &CommandLine) -> Option<TimerArgs<'_>> {
    let args = line.args();
    let duration = args.first()?.as_str();
    let tail = match args.get(1) {
        Some(g) if g.eq_ignore_ascii_case("goto") => &args[2..],
        _ => &args[1..],
    };
    match tail {
        [label] => Some(TimerArgs { duration, label: label.as_str(), id: None }),
        [label, id] => Some(TimerArgs { duration, label: label.as_str(), id: Some(id.as_str()) }),
        _ => None,
    }
}

/// Seconds; a `ms` suffix on a literal means milliseconds.
pub fn duration_seconds(state: &GameState, token: &str) -> f64 {
    if let Some(ms) = token.strip_suffix("ms").and_then(parse_number) {
        return ms / 1000.0;
    }
    if let Some(s) = token.strip_suffix('s').and_then(parse_number) {
        return s;
    }
    state.num(token)
}

pub struct TimerCommands;

impl CommandInfo for TimerCommands {
    fn group(&self) -> &'static str { "timers" }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::checked("after", Arity::Range(2, 4), ErrorCode::V005),
            CommandSpec::checked("every", Arity::Range(2, 4), ErrorCode::V005),
            CommandSpec::loose("canceltimer"),
            CommandSpec::loose("cleartimers"),
        ]
    }
}

impl CommandProvider for TimerCommands {
    fn exec(&self, name: &str, line: &CommandLine, state: &mut GameState) -> bool {
        match name {
            "after" | "every" => {
                let Some(args) = parse_timer_args(line) else { return true };
                let repeat = name == "every";
                let seconds = duration_seconds(state, args.duration);
                let label = unquote(args.label).to_string();
                let id = match args.id {
                    Some(tok) => id_arg(state, tok),
                    None => Timer::derived_id(repeat, seconds, &label),
                };
                let interval = if seconds > 0.0 { seconds } else { state.config.frame_seconds() };
                let remaining = if repeat { interval } else { seconds.max(0.0) };
                state.timers.install(Timer { id, label, remaining, interval, repeat });
            }
            "canceltimer" => {
                let key = id_arg(state, arg(line, 0));
                state.timers.cancel(&key);
            }
            "cleartimers" => state.timers.clear(),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn line(raw: &str) -> CommandLine {
        let (tokens, _) = crate::syntax::lexer::split_tokens(raw);
        CommandLine::new(tokens, 1, raw)
    }

    #[test]
    fn argument_shapes() {
        let la = line("every 1 goto spawn");
        let a = parse_timer_args(&la).unwrap();
        assert_eq!((a.duration, a.label, a.id), ("1", "spawn", None));
        let lb = line("after 0.5 boom t1");
        let b = parse_timer_args(&lb).unwrap();
        assert_eq!((b.label, b.id), ("boom", Some("t1")));
        assert!(parse_timer_args(&line("after 2")).is_none());
        assert!(parse_timer_args(&line("after 2 goto")).is_none());
        assert!(parse_timer_args(&line("after 2 goto a b c")).is_none());
    }

    #[test]
    fn durations() {
        let s = GameState::new(&EngineConfig::default(), (800.0, 450.0));
        assert_eq!(duration_seconds(&s, "250ms"), 0.25);
        assert_eq!(duration_seconds(&s, "2s"), 2.0);
        assert_eq!(duration_seconds(&s, "1.5"), 1.5);
    }

    #[test]
    fn redeclared_every_replaces() {
        let mut s = GameState::new(&EngineConfig::default(), (800.0, 450.0));
        let l = line("every 1 goto spawn");
        TimerCommands.exec("every", &l, &mut s);
        TimerCommands.exec("every", &l, &mut s);
        assert_eq!(s.timers.len(), 1);
        assert!(s.timers.get("every:1:spawn").is_some());

        TimerCommands.exec("canceltimer", &line("canceltimer spawn"), &mut s);
        assert!(s.timers.is_empty());
    }
}
