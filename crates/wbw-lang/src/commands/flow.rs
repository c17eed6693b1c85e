//! Control flow. These names are known to the registry but executed by the
//! interpreter, which owns the call stack.

use crate::runtime::state::GameState;
use crate::runtime::value::Value;
use super::{CommandInfo, CommandSpec};

pub const FLOW_COMMANDS: &[&str] = &["if", "ifnot", "goto", "loop", "end", "stop"];

pub struct FlowCommands;

impl CommandInfo for FlowCommands {
    fn group(&self) -> &'static str { "flow" }

    fn commands(&self) -> Vec<CommandSpec> {
        FLOW_COMMANDS.iter().map(|&n| CommandSpec::loose(n)).collect()
    }
}

// ─── Conditions ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "==" | "=" => Self::Eq,
            "!=" => Self::Ne,
            "<" => Self::Lt,
            "<=" => Self::Le,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition<'a> {
    Compare { lhs: &'a str, op: CompareOp, rhs: &'a str },
    Truthy(&'a str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Then<'a> {
    Goto(&'a str),
    /// Inline command tokens, name first.
    Inline(&'a [String]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfForm<'a> {
    pub cond: Condition<'a>,
    pub then: Then<'a>,
}

/// Split the arguments of `if`/`ifnot`. The error is a human-readable reason.
pub fn parse_if(args: &[String]) -> Result<IfForm<'_>, String> {
    let Some(first) = args.first() else {
        return Err("missing condition".into());
    };
    let (cond, rest) = match args.get(1).and_then(|t| CompareOp::parse(t)) {
        Some(op) => match args.get(2) {
            Some(rhs) => (Condition::Compare { lhs: first.as_str(), op, rhs: rhs.as_str() }, &args[3..]),
            None => return Err(format!("missing right-hand side after `{}`", args[1])),
        },
        None => (Condition::Truthy(first.as_str()), &args[1..]),
    };
    let then = match rest {
        [] => return Err("missing `goto <label>` or command".into()),
        [g] if g.eq_ignore_ascii_case("goto") => return Err("`goto` without a label".into()),
        [g, label] if g.eq_ignore_ascii_case("goto") => Then::Goto(label.as_str()),
        [g, ..] if g.eq_ignore_ascii_case("goto") => return Err("unexpected tokens after goto label".into()),
        tokens => Then::Inline(tokens),
    };
    Ok(IfForm { cond, then })
}

impl Condition<'_> {
    pub fn eval(&self, state: &GameState) -> bool {
        match *self {
            Condition::Truthy(tok) => state.resolve(tok).truthy(),
            Condition::Compare { lhs, op, rhs } => compare(&state.resolve(lhs), op, &state.resolve(rhs)),
        }
    }
}

/// `==`/`!=` compare as text when either side is non-numeric text; every
/// other case compares numerically.
pub fn compare(l: &Value, op: CompareOp, r: &Value) -> bool {
    if matches!(op, CompareOp::Eq | CompareOp::Ne) && (l.is_text() || r.is_text()) {
        let eq = l.to_text() == r.to_text();
        return if op == CompareOp::Eq { eq } else { !eq };
    }
    let (a, b) = (l.as_num(), r.as_num());
    match op {
        CompareOp::Eq => a == b,
        CompareOp::Ne => a != b,
        CompareOp::Lt => a < b,
        CompareOp::Le => a <= b,
        CompareOp::Gt => a > b,
        CompareOp::Ge => a >= b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn goto_form() {
        let args = toks("hp <= 0 goto dead");
        let f = parse_if(&args).unwrap();
        assert_eq!(f.cond, Condition::Compare { lhs: "hp", op: CompareOp::Le, rhs: "0" });
        assert_eq!(f.then, Then::Goto("dead"));
    }

    #[test]
    fn truthy_and_inline_forms() {
        let args = toks("grounded jump 12");
        let f = parse_if(&args).unwrap();
        assert_eq!(f.cond, Condition::Truthy("grounded"));
        assert_eq!(f.then, Then::Inline(&args[1..]));
    }

    #[test]
    fn malformed() {
        assert!(parse_if(&[]).is_err());
        assert!(parse_if(&toks("x ==")).is_err());
        assert!(parse_if(&toks("x == 1")).is_err());
        assert!(parse_if(&toks("x == 1 goto")).is_err());
        assert!(parse_if(&toks("x == 1 goto a b")).is_err());
    }

    #[test]
    fn comparisons() {
        assert!(compare(&Value::from("bob"), CompareOp::Eq, &Value::from("bob")));
        assert!(compare(&Value::from("bob"), CompareOp::Ne, &Value::Num(0.0)));
        assert!(compare(&Value::from("2"), CompareOp::Eq, &Value::Num(2.0)));
        assert!(compare(&Value::Num(1.0), CompareOp::Lt, &Value::Num(2.0)));
        assert!(!compare(&Value::Num(3.0), CompareOp::Le, &Value::Num(2.0)));
    }
}
