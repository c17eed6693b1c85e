use std::collections::HashMap;

use crate::error::ErrorCode;
use crate::runtime::state::GameState;
use crate::runtime::value::parse_number;
use crate::syntax::ast::CommandLine;
use crate::syntax::lexer::{is_quoted, unquote};

pub mod aliases;
pub mod camera;
pub mod entities;
pub mod flow;
pub mod input;
pub mod misc;
pub mod shapes;
pub mod timers;
pub mod ui;
pub mod vars;

// ─── Command metadata ─────────────────────────────────────────────────────────

/// How many arguments (tokens after the name) a command takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Range(usize, usize),
    Any,
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match *self {
            Arity::Exact(k) => n == k,
            Arity::AtLeast(k) => n >= k,
            Arity::Range(lo, hi) => (lo..=hi).contains(&n),
            Arity::Any => true,
        }
    }

    pub fn describe(&self) -> String {
        match *self {
            Arity::Exact(k) => format!("{k}"),
            Arity::AtLeast(k) => format!("at least {k}"),
            Arity::Range(lo, hi) => format!("{lo} to {hi}"),
            Arity::Any => "any number of".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub arity: Arity,
    /// When set, the validator reports an arity mismatch with this code.
    /// Commands without it coerce missing numbers to 0 at runtime.
    pub enforce: Option<ErrorCode>,
}

impl CommandSpec {
    pub const fn loose(name: &'static str) -> Self {
        Self { name, arity: Arity::Any, enforce: None }
    }

    pub const fn checked(name: &'static str, arity: Arity, code: ErrorCode) -> Self {
        Self { name, arity, enforce: Some(code) }
    }
}

// ─── Compile-time interface ───────────────────────────────────────────────────

/// What the validator needs: names and arity rules only.
pub trait CommandInfo {
    fn group(&self) -> &'static str;
    fn commands(&self) -> Vec<CommandSpec>;
}

// ─── Runtime interface ────────────────────────────────────────────────────────

/// Executes the commands of one group. `name` is already alias-normalized.
/// Returns `false` if the name is not handled here.
pub trait CommandProvider: CommandInfo {
    fn exec(&self, name: &str, line: &CommandLine, state: &mut GameState) -> bool;
}

// ─── Registry ─────────────────────────────────────────────────────────────────

pub struct CommandRegistry {
    providers: Vec<Box<dyn CommandProvider>>,
    /// name → index into `providers`
    handlers: HashMap<&'static str, usize>,
    specs: HashMap<&'static str, CommandSpec>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self { providers: Vec::new(), handlers: HashMap::new(), specs: HashMap::new() }
    }

    pub fn register(&mut self, p: Box<dyn CommandProvider>) {
        let idx = self.providers.len();
        for spec in p.commands() {
            self.handlers.insert(spec.name, idx);
            self.specs.insert(spec.name, spec);
        }
        self.providers.push(p);
    }

    /// Names the registry knows about but the interpreter executes itself.
    pub fn register_info(&mut self, info: &dyn CommandInfo) {
        for spec in info.commands() {
            self.specs.insert(spec.name, spec);
        }
    }

    pub fn spec(&self, name: &str) -> Option<&CommandSpec> {
        self.specs.get(name)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    /// Dispatch through the handler table. `false` means no handler.
    pub fn exec(&self, name: &str, line: &CommandLine, state: &mut GameState) -> bool {
        match self.handlers.get(name) {
            Some(&idx) => self.providers[idx].exec(name, line, state),
            None => false,
        }
    }

    pub fn len(&self) -> usize { self.specs.len() }

    pub fn is_empty(&self) -> bool { self.specs.is_empty() }

    pub fn standard() -> Self {
        let mut r = Self::new();
        r.register(Box::new(entities::EntityCommands));
        r.register(Box::new(vars::VarCommands));
        r.register(Box::new(shapes::ShapeCommands));
        r.register(Box::new(ui::UiCommands));
        r.register(Box::new(camera::CameraCommands));
        r.register(Box::new(input::InputCommands));
        r.register(Box::new(timers::TimerCommands));
        r.register(Box::new(misc::MiscCommands));
        r.register_info(&flow::FlowCommands);
        r
    }
}

impl Default for CommandRegistry {
    fn default() -> Self { Self::standard() }
}

// ─── Shared helpers ───────────────────────────────────────────────────────────

/// Argument `i` (0 = first token after the name), or "" when absent.
pub(crate) fn arg(line: &CommandLine, i: usize) -> &str {
    line.args().get(i).map(String::as_str).unwrap_or("")
}

/// Arguments from `i` on.
pub(crate) fn rest(line: &CommandLine, i: usize) -> &[String] {
    line.args().get(i..).unwrap_or(&[])
}

/// Entity/UI id: quoted ids are interpolated (`"enemy{i}"`), bare words
/// follow a string variable once.
pub(crate) fn id_arg(state: &GameState, token: &str) -> String {
    if is_quoted(token) {
        state.interpolate(unquote(token))
    } else {
        state.entity_ref(token)
    }
}

/// True for a token that names a colour rather than a number.
pub(crate) fn is_color_token(state: &GameState, token: &str) -> bool {
    parse_number(token).is_none() && state.color(token).is_some()
}

/// Parse `0|1|on|off|true|false`, also through variables.
pub(crate) fn flag(state: &GameState, token: &str) -> bool {
    state.resolve(token).truthy()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_names_are_known_but_not_handled() {
        let r = CommandRegistry::standard();
        assert!(r.is_known("goto"));
        assert!(r.is_known("loop"));
        assert!(!r.handlers.contains_key("goto"));
        assert!(r.handlers.contains_key("platform"));
    }

    #[test]
    fn every_alias_target_is_a_command() {
        let r = CommandRegistry::standard();
        for (alias, target) in aliases::ALIASES {
            assert!(r.is_known(target), "alias {alias} -> {target} is not a command");
        }
    }

    #[test]
    fn arity_rules() {
        assert!(Arity::Exact(2).accepts(2));
        assert!(!Arity::Exact(2).accepts(3));
        assert!(Arity::AtLeast(2).accepts(5));
        assert!(Arity::Range(1, 2).accepts(1));
        assert!(!Arity::Range(1, 2).accepts(0));
    }
}
