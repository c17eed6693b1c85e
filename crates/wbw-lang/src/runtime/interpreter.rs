//! Command-list interpreter. Flow control (`if`, `goto`, `loop`, `stop`) is
//! handled here; every other command is dispatched through the
//! `CommandRegistry` handler table.

use crate::commands::CommandRegistry;
use crate::commands::aliases::normalize;
use crate::commands::flow::{Then, parse_if};
use crate::commands::timers::{duration_seconds, parse_timer_args};
use crate::error::{Error, ErrorCode};
use crate::runtime::state::GameState;
use crate::syntax::ast::{CommandLine, Program};
use crate::syntax::lexer::unquote;

/// Labels deeper than this are not entered.
pub const MAX_CALL_DEPTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Next,
    /// `stop`: abandon the rest of the current command list.
    Stop,
}

pub struct Interpreter<'a> {
    program: &'a Program,
    registry: &'a CommandRegistry,
    state: &'a mut GameState,
    diagnostics: &'a mut Vec<Error>,
    /// Labels currently executing, outermost first.
    call_stack: Vec<String>,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        program: &'a Program,
        registry: &'a CommandRegistry,
        state: &'a mut GameState,
        diagnostics: &'a mut Vec<Error>,
    ) -> Self {
        Self { program, registry, state, diagnostics, call_stack: Vec::new() }
    }

    pub fn state(&mut self) -> &mut GameState {
        self.state
    }

    pub fn run_init(&mut self) {
        let program = self.program;
        self.exec_lines(&program.init);
    }

    /// Run a label as a call. Returns `false` if it does not exist or the
    /// re-entry / depth guard refused it.
    pub fn invoke_label(&mut self, label: &str) -> bool {
        let program = self.program;
        let Some(lines) = program.label(label) else {
            tracing::debug!(label, "label not found");
            return false;
        };
        if self.call_stack.iter().any(|l| l == label) {
            tracing::debug!(label, stack = ?self.call_stack, "refused re-entrant label");
            return false;
        }
        if self.call_stack.len() >= MAX_CALL_DEPTH {
            tracing::debug!(label, depth = self.call_stack.len(), "refused label: call depth limit");
            return false;
        }
        self.call_stack.push(label.to_string());
        self.exec_lines(lines);
        self.call_stack.pop();
        true
    }

    /// Execute a single binding action.
    pub fn run_action(&mut self, line: &CommandLine) {
        self.exec_line(line);
    }

    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    // ─── Lists ────────────────────────────────────────────────────────────────

    pub fn exec_lines(&mut self, lines: &[CommandLine]) -> Flow {
        let mut i = 0;
        while i < lines.len() {
            let line = &lines[i];
            match normalize(line.name()).as_str() {
                "loop" => {
                    let end = find_loop_end(lines, i);
                    let body = &lines[i + 1..end];
                    let max = self.state.config.max_loop_iterations;
                    let n = self.state.num(line.args().first().map(String::as_str).unwrap_or(""));
                    let count = if n.is_finite() && n > 0.0 { (n.floor() as usize).min(max) } else { 0 };
                    for _ in 0..count {
                        if self.exec_lines(body) == Flow::Stop {
                            return Flow::Stop;
                        }
                    }
                    i = end + 1;
                    continue;
                }
                // stray `end` without a loop
                "end" => {}
                _ => {
                    if self.exec_line(line) == Flow::Stop {
                        return Flow::Stop;
                    }
                }
            }
            i += 1;
        }
        Flow::Next
    }

    // ─── Lines ────────────────────────────────────────────────────────────────

    fn exec_line(&mut self, line: &CommandLine) -> Flow {
        let name = normalize(line.name());
        match name.as_str() {
            "" => {}
            "stop" => return Flow::Stop,
            "goto" => {
                let label = unquote(line.args().first().map(String::as_str).unwrap_or("")).to_string();
                self.invoke_label(&label);
            }
            "if" | "ifnot" => {
                let form = match parse_if(line.args()) {
                    Ok(form) => form,
                    Err(reason) => {
                        tracing::debug!(line = line.line, %reason, "skipping malformed if");
                        return Flow::Next;
                    }
                };
                let hit = form.cond.eval(self.state) != (name == "ifnot");
                if hit {
                    match form.then {
                        Then::Goto(label) => {
                            self.invoke_label(unquote(label));
                        }
                        Then::Inline(tokens) => return self.exec_line(&line.sub_line(tokens)),
                    }
                }
            }
            // loop blocks only exist inside lists
            "loop" | "end" => {}
            "after" if self.fires_now(line) => {
                if let Some(args) = parse_timer_args(line) {
                    self.invoke_label(unquote(args.label));
                }
            }
            _ => {
                if !self.registry.exec(&name, line, self.state) {
                    self.report(line, ErrorCode::R001, format!("unknown command `{}`", line.name()));
                }
            }
        }
        Flow::Next
    }

    /// `after` with a non-positive duration runs its label immediately.
    fn fires_now(&self, line: &CommandLine) -> bool {
        parse_timer_args(line).is_some_and(|a| duration_seconds(&*self.state, a.duration) <= 0.0)
    }

    fn report(&mut self, line: &CommandLine, code: ErrorCode, message: String) {
        let err = Error::at_line(code, line.line, message);
        if !self.diagnostics.contains(&err) {
            tracing::warn!(%err, "runtime diagnostic");
            self.diagnostics.push(err);
        }
    }
}

/// Index of the `end` matching the `loop` at `start`, or `lines.len()` if the
/// block is unterminated.
pub fn find_loop_end(lines: &[CommandLine], start: usize) -> usize {
    let mut depth = 0usize;
    for (j, line) in lines.iter().enumerate().skip(start) {
        match normalize(line.name()).as_str() {
            "loop" => depth += 1,
            "end" => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return j;
                }
            }
            _ => {}
        }
    }
    lines.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::runtime::value::Value;
    use crate::syntax::parse;

    fn run(src: &str) -> (GameState, Vec<Error>) {
        let (program, errors) = parse(src);
        assert!(errors.is_empty(), "{errors:?}");
        let registry = CommandRegistry::standard();
        let mut state = GameState::new(&EngineConfig { seed: Some(1), ..EngineConfig::default() }, (800.0, 450.0));
        let mut diags = Vec::new();
        Interpreter::new(&program, &registry, &mut state, &mut diags).run_init();
        (state, diags)
    }

    fn num(state: &GameState, name: &str) -> f64 {
        state.var(name).map(Value::as_num).unwrap_or(f64::NAN)
    }

    #[test]
    fn nested_loops() {
        let (s, _) = run("set x 0\nloop 3\n  loop 2\n    inc x\n  end\n  add x 10\nend");
        assert_eq!(num(&s, "x"), 36.0);
    }

    #[test]
    fn loop_count_from_variable_and_cap() {
        let (s, _) = run("set n 4\nset x 0\nloop n\ninc x\nend\nloop 1e9\ninc y\nend");
        assert_eq!(num(&s, "x"), 4.0);
        assert_eq!(num(&s, "y"), 10_000.0);
    }

    #[test]
    fn goto_is_a_call() {
        let (s, _) = run("set x 1\ngoto double\nadd x 1\ndouble:\nmul x 2");
        assert_eq!(num(&s, "x"), 3.0);
    }

    #[test]
    fn stop_ends_the_list_and_enclosing_loop() {
        let (s, _) = run("set x 0\nloop 5\ninc x\nif x >= 2 stop\nend\nset after 1");
        assert_eq!(num(&s, "x"), 2.0);
        assert!(s.var("after").is_none());
    }

    #[test]
    fn stop_inside_label_returns_to_caller() {
        let (s, _) = run("goto l\nset back 1\nl:\nset a 1\nstop\nset b 1");
        assert_eq!(num(&s, "back"), 1.0);
        assert_eq!(num(&s, "a"), 1.0);
        assert!(s.var("b").is_none());
    }

    #[test]
    fn self_recursion_is_bounded() {
        let (s, _) = run("goto a\na:\ninc n\ngoto a");
        assert_eq!(num(&s, "n"), 1.0);
    }

    #[test]
    fn mutual_recursion_is_bounded() {
        let (s, _) = run("goto a\na:\ninc n\ngoto b\nb:\ninc m\ngoto a");
        assert_eq!(num(&s, "n"), 1.0);
        assert_eq!(num(&s, "m"), 1.0);
    }

    #[test]
    fn depth_limit() {
        let mut src = String::from("goto l0\n");
        for i in 0..15 {
            src.push_str(&format!("l{i}:\ninc hits\ngoto l{}\n", i + 1));
        }
        src.push_str("l15:\ninc hits\n");
        let (s, _) = run(&src);
        assert_eq!(num(&s, "hits"), MAX_CALL_DEPTH as f64);
    }

    #[test]
    fn if_forms() {
        let (s, _) = run(
            "set hp 0\nif hp <= 0 goto dead\nifnot hp goto alive\nif hp == 0 set inline 1\nif name == \"bob\" set wrong 1\n\
             dead:\nset d 1\nalive:\nset a 1",
        );
        assert_eq!(num(&s, "d"), 1.0);
        assert_eq!(num(&s, "a"), 1.0);
        assert_eq!(num(&s, "inline"), 1.0);
        assert!(s.var("wrong").is_none());
    }

    #[test]
    fn zero_delay_after_runs_now() {
        let (s, _) = run("after 0 goto boom\nset seen boomed\nboom:\nset boomed 1");
        assert_eq!(num(&s, "boomed"), 1.0);
        assert!(s.timers.is_empty());
    }

    #[test]
    fn unknown_command_reported_once() {
        let (program, _) = parse("loop 3\nfoo 1 2\nend");
        let registry = CommandRegistry::standard();
        let mut state = GameState::new(&EngineConfig::default(), (800.0, 450.0));
        let mut diags = Vec::new();
        Interpreter::new(&program, &registry, &mut state, &mut diags).run_init();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, ErrorCode::R001);
        assert!(diags[0].message.contains("foo"));
    }

    #[test]
    fn loop_end_matching() {
        let (program, _) = parse("loop 2\nloop 3\nend\nend\nset x 1");
        assert_eq!(find_loop_end(&program.init, 0), 3);
        assert_eq!(find_loop_end(&program.init, 1), 2);
    }
}
