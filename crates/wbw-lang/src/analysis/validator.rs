//! Static checks over a parsed program. Pure: reads the program and the
//! registry's command metadata, mutates nothing.
//!
//! - every command name (after alias normalization) is known
//! - `goto`, `if … goto`, `ifnot … goto` and timers name an existing label
//! - bindings, timers and variable commands have the right argument count
//! - `loop`/`end` balance within each command list
//! - labels are declared once

use std::collections::HashMap;

use crate::commands::aliases::normalize;
use crate::commands::flow::{Then, parse_if};
use crate::commands::input::BINDING_COMMANDS;
use crate::commands::timers::parse_timer_args;
use crate::commands::vars::SET_OPS;
use crate::commands::CommandRegistry;
use crate::error::{Error, ErrorCode};
use crate::syntax::ast::{CommandLine, Program};
use crate::syntax::lexer::unquote;

pub struct Validator<'a> {
    program: &'a Program,
    registry: &'a CommandRegistry,
    pub errors: Vec<Error>,
}

impl<'a> Validator<'a> {
    pub fn new(program: &'a Program, registry: &'a CommandRegistry) -> Self {
        Self { program, registry, errors: Vec::new() }
    }

    pub fn validate(mut self) -> Vec<Error> {
        self.check_duplicate_labels();

        let program = self.program;
        self.check_list(&program.init);
        for lines in program.labels.values() {
            self.check_list(lines);
        }

        self.errors.sort_by_key(|e| (e.line, e.column));
        self.errors
    }

    fn check_duplicate_labels(&mut self) {
        let program = self.program;
        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        for (name, line) in &program.label_decls {
            match first_seen.get(name.as_str()) {
                Some(&first) => self.errors.push(Error::at_line(
                    ErrorCode::V003,
                    *line,
                    format!("label `{name}` already declared on line {first}"),
                )),
                None => {
                    first_seen.insert(name, *line);
                }
            }
        }
    }

    fn check_list(&mut self, lines: &[CommandLine]) {
        let mut open_loops: Vec<usize> = Vec::new();
        for line in lines {
            match normalize(line.name()).as_str() {
                "loop" => {
                    if line.args().is_empty() {
                        self.err(line, ErrorCode::V007, "`loop` needs an iteration count");
                    }
                    open_loops.push(line.line);
                }
                "end" => {
                    if open_loops.pop().is_none() {
                        self.err(line, ErrorCode::V007, "`end` without a matching `loop`");
                    }
                }
                _ => self.check_line(line),
            }
        }
        for at in open_loops {
            self.errors.push(Error::at_line(ErrorCode::V007, at, "`loop` without a matching `end`"));
        }
    }

    fn check_line(&mut self, line: &CommandLine) {
        let raw_name = line.name();
        if raw_name.is_empty() {
            return;
        }
        let name = normalize(raw_name);
        let Some(spec) = self.registry.spec(&name).copied() else {
            self.err(line, ErrorCode::V001, format!("unknown command `{raw_name}`"));
            return;
        };
        let args = line.args();

        match name.as_str() {
            "goto" => match args {
                [label] => self.check_label(line, label),
                [] => self.err(line, ErrorCode::V002, "`goto` needs a label"),
                _ => self.err(line, ErrorCode::V002, "`goto` takes exactly one label"),
            },
            "if" | "ifnot" => match parse_if(args) {
                Ok(form) => match form.then {
                    Then::Goto(label) => self.check_label(line, label),
                    Then::Inline(tokens) => self.check_line(&line.sub_line(tokens)),
                },
                Err(reason) => self.err(line, ErrorCode::V008, format!("malformed `{name}`: {reason}")),
            },
            "after" | "every" => match parse_timer_args(line) {
                Some(t) => self.check_label(line, t.label),
                None => self.err(
                    line,
                    ErrorCode::V005,
                    format!("`{name}` expects a duration and a label: `{name} <seconds> [goto] <label> [id]`"),
                ),
            },
            "set" => self.check_set(line),
            n if BINDING_COMMANDS.contains(&n) => {
                if args.len() < 2 {
                    self.err(line, ErrorCode::V004, format!("`{n}` needs a key and an action"));
                } else {
                    self.check_line(&line.sub_line(&args[1..]));
                }
            }
            _ => {
                if let Some(code) = spec.enforce {
                    if !spec.arity.accepts(args.len()) {
                        self.err(
                            line,
                            code,
                            format!("`{name}` expects {} argument(s), got {}", spec.arity.describe(), args.len()),
                        );
                    }
                }
            }
        }
    }

    /// `set name value` or `set name a <op> b`; nothing longer.
    fn check_set(&mut self, line: &CommandLine) {
        let args = line.args();
        let ok = match args.len() {
            2 => true,
            4 => SET_OPS.contains(&args[2].as_str()),
            _ => false,
        };
        if ok {
            return;
        }
        let msg = if args.len() > 4 {
            "multi-operand expressions are not supported; use one operator per `set`".to_string()
        } else if args.len() == 4 {
            format!("unknown operator `{}` in `set`", args[2])
        } else {
            "`set` expects `set name value` or `set name a <op> b`".to_string()
        };
        self.err(line, ErrorCode::V006, msg);
    }

    fn check_label(&mut self, line: &CommandLine, label: &str) {
        let label = unquote(label);
        if !self.program.has_label(label) {
            self.err(line, ErrorCode::V002, format!("undefined label `{label}`"));
        }
    }

    fn err(&mut self, line: &CommandLine, code: ErrorCode, msg: impl Into<String>) {
        self.errors.push(Error::at_line(code, line.line, msg));
    }
}
