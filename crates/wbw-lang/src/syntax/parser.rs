use crate::error::{Error, ErrorCode};
use crate::syntax::ast::{CommandLine, Program};
use crate::syntax::lexer::{LexedLine, LineKind};

pub struct Parser {
    lines: Vec<LexedLine>,
}

impl Parser {
    pub fn new(lines: Vec<LexedLine>) -> Self {
        Self { lines }
    }

    /// Build a `Program`. Best effort: malformed labels are reported and
    /// parsing carries on in the scope that was open before them.
    pub fn parse(self) -> (Program, Vec<Error>) {
        let mut program = Program::default();
        let mut errors = Vec::new();
        let mut scope: Option<String> = None;

        for lexed in self.lines {
            match lexed.kind {
                LineKind::Blank => {}

                LineKind::Label { name, rest } => {
                    if !is_valid_label(&name) {
                        let shown = if name.is_empty() { ":".to_string() } else { format!("{name}:") };
                        errors.push(Error::at_line(ErrorCode::P001, lexed.line,
                            format!("malformed label declaration `{shown}`")));
                        // keep the trailing command in whatever scope is open
                        if !rest.is_empty() {
                            push_line(&mut program, scope.as_deref(), CommandLine::new(rest, lexed.line, lexed.raw));
                        }
                        continue;
                    }

                    program.label_decls.push((name.clone(), lexed.line));
                    program.labels.entry(name.clone()).or_default();
                    if !rest.is_empty() {
                        push_line(&mut program, Some(&name), CommandLine::new(rest, lexed.line, lexed.raw));
                    }
                    scope = Some(name);
                }

                LineKind::Command(tokens) => {
                    push_line(&mut program, scope.as_deref(), CommandLine::new(tokens, lexed.line, lexed.raw));
                }
            }
        }

        (program, errors)
    }
}

fn push_line(program: &mut Program, scope: Option<&str>, line: CommandLine) {
    match scope {
        Some(label) => program.labels.entry(label.to_string()).or_default().push(line),
        None => program.init.push(line),
    }
}

/// `[A-Za-z_][A-Za-z0-9_-]*`
pub fn is_valid_label(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

// ─── Tests ───────────────────────────────────────────────────────────────────
