use rand::Rng;

use crate::error::ErrorCode;
use crate::runtime::state::GameState;
use crate::runtime::value::Value;
use crate::syntax::ast::CommandLine;
use crate::syntax::lexer::unquote;
use super::{Arity, CommandInfo, CommandProvider, CommandSpec, arg};

/// Binary operators accepted by `set name a <op> b`.
pub const SET_OPS: &[&str] = &["+", "-", "*", "/", "%"];

const UNARY_MATH: &[&str] = &["sin", "cos", "tan", "sqrt", "abs", "log", "floor", "ceil", "round"];

pub struct VarCommands;

impl CommandInfo for VarCommands {
    fn group(&self) -> &'static str { "vars" }

    fn commands(&self) -> Vec<CommandSpec> {
        use Arity::*;
        let v = ErrorCode::V006;
        let mut specs = vec![
            CommandSpec::checked("set", Range(2, 4), v),
            CommandSpec::checked("add", Exact(2), v),
            CommandSpec::checked("sub", Exact(2), v),
            CommandSpec::checked("mul", Exact(2), v),
            CommandSpec::checked("div", Exact(2), v),
            CommandSpec::checked("mod", Exact(2), v),
            CommandSpec::checked("inc", Exact(1), v),
            CommandSpec::checked("dec", Exact(1), v),
            CommandSpec::checked("min", Exact(2), v),
            CommandSpec::checked("max", Exact(2), v),
            CommandSpec::checked("clamp", Exact(3), v),
            CommandSpec::checked("pow", Exact(3), v),
            CommandSpec::checked("atan2", Exact(3), v),
            CommandSpec::checked("rand", Range(1, 3), v),
            CommandSpec::checked("randint", Exact(3), v),
            CommandSpec::checked("randfloat", Exact(3), v),
            CommandSpec::checked("swap", Exact(2), v),
            CommandSpec::checked("copy", Exact(2), v),
            CommandSpec::checked("toggle", Exact(1), v),
            CommandSpec::checked("lerp", Exact(3), v),
        ];
        specs.extend(UNARY_MATH.iter().map(|&n| CommandSpec::checked(n, Range(1, 2), v)));
        specs
    }
}

impl CommandProvider for VarCommands {
    fn exec(&self, name: &str, line: &CommandLine, state: &mut GameState) -> bool {
        let target = unquote(arg(line, 0)).to_string();
        if target.is_empty() {
            return self.commands().iter().any(|s| s.name == name);
        }
        let cur = state.var(&target).cloned().unwrap_or_default();
        let a = |i: usize| state.num(arg(line, i));

        let result: Option<Value> = match name {
            "set" => set_value(state, line),
            "add" => {
                if cur.is_text() {
                    Some(Value::Str(cur.to_text() + &state.text(arg(line, 1))))
                } else {
                    Some((cur.as_num() + a(1)).into())
                }
            }
            "sub" => Some((cur.as_num() - a(1)).into()),
            "mul" => Some((cur.as_num() * a(1)).into()),
            "div" => checked_div(cur.as_num(), a(1), |x, y| x / y),
            "mod" => checked_div(cur.as_num(), a(1), |x, y| x % y),
            "inc" => Some((cur.as_num() + 1.0).into()),
            "dec" => Some((cur.as_num() - 1.0).into()),
            "min" => Some(cur.as_num().min(a(1)).into()),
            "max" => Some(cur.as_num().max(a(1)).into()),
            "clamp" => {
                let (lo, hi) = (a(1), a(2));
                Some(cur.as_num().max(lo).min(hi).into())
            }
            "pow" => finite(a(1).powf(a(2))),
            "atan2" => finite(a(1).atan2(a(2))),
            "lerp" => {
                let x = cur.as_num();
                Some((x + (a(1) - x) * a(2)).into())
            }
            "swap" => {
                let other = unquote(arg(line, 1)).to_string();
                let theirs = state.var(&other).cloned().unwrap_or_default();
                state.set_var(&other, cur);
                Some(theirs)
            }
            "copy" => Some(state.resolve(arg(line, 1))),
            "toggle" => Some(Value::from_bool(!cur.truthy())),
            "rand" => {
                let (lo, hi) = match line.args().len() {
                    1 => (0.0, 1.0),
                    2 => (0.0, a(1)),
                    _ => (a(1), a(2)),
                };
                Some(uniform(state, lo, hi).into())
            }
            "randfloat" => Some(uniform(state, a(1), a(2)).into()),
            "randint" => {
                let (lo, hi) = (a(1).ceil() as i64, a(2).floor() as i64);
                let n = if hi > lo && hi.checked_sub(lo).is_some() { state.rng.gen_range(lo..=hi) } else { lo };
                Some((n as f64).into())
            }
            m if UNARY_MATH.contains(&m) => {
                let x = if line.args().len() >= 2 { a(1) } else { cur.as_num() };
                finite(unary(m, x))
            }
            _ => return false,
        };

        // `None`: division by zero or a non-finite result; leave the variable alone
        if let Some(v) = result {
            state.set_var(&target, v);
        }
        true
    }
}

/// `set name value` or `set name a <op> b`.
fn set_value(state: &GameState, line: &CommandLine) -> Option<Value> {
    let args = line.args();
    if args.len() < 4 {
        return Some(state.resolve(arg(line, 1)));
    }
    let (lhs, op, rhs) = (state.resolve(&args[1]), args[2].as_str(), state.resolve(&args[3]));
    if op == "+" && (lhs.is_text() || rhs.is_text()) {
        return Some(Value::Str(lhs.to_text() + &rhs.to_text()));
    }
    let (x, y) = (lhs.as_num(), rhs.as_num());
    match op {
        "+" => Some((x + y).into()),
        "-" => Some((x - y).into()),
        "*" => Some((x * y).into()),
        "/" => checked_div(x, y, |x, y| x / y),
        "%" => checked_div(x, y, |x, y| x % y),
        _ => None,
    }
}

fn checked_div(x: f64, y: f64, f: impl Fn(f64, f64) -> f64) -> Option<Value> {
    if y == 0.0 { None } else { Some(f(x, y).into()) }
}

fn finite(x: f64) -> Option<Value> {
    x.is_finite().then_some(Value::Num(x))
}

fn unary(name: &str, x: f64) -> f64 {
    match name {
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tan" => x.tan(),
        "sqrt" => x.sqrt(),
        "abs" => x.abs(),
        "log" => x.ln(),
        "floor" => x.floor(),
        "ceil" => x.ceil(),
        "round" => x.round(),
        _ => x,
    }
}

/// Uniform float in `[lo, hi)`. An empty range, or one too wide to sample, yields `lo`.
fn uniform(state: &mut GameState, lo: f64, hi: f64) -> f64 {
    if hi > lo && (hi - lo).is_finite() { state.rng.gen_range(lo..hi) } else { lo }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn state() -> GameState {
        GameState::new(&EngineConfig { seed: Some(11), ..EngineConfig::default() }, (800.0, 450.0))
    }

    fn run(state: &mut GameState, src: &str) {
        for raw in src.lines() {
            let (tokens, _) = crate::syntax::lexer::split_tokens(raw);
            let line = CommandLine::new(tokens, 1, raw);
            assert!(VarCommands.exec(line.name(), &line, state), "unhandled: {raw}");
        }
    }

    fn num(state: &GameState, name: &str) -> f64 {
        state.var(name).map(Value::as_num).unwrap_or(f64::NAN)
    }

    #[test]
    fn arithmetic() {
        let mut s = state();
        run(&mut s, "set x 10\nadd x 5\nsub x 3\nmul x 2\ndiv x 4\nmod x 4\ninc x\ninc x\ndec x");
        assert_eq!(num(&s, "x"), 3.0);
    }

    #[test]
    fn division_by_zero_is_a_no_op() {
        let mut s = state();
        run(&mut s, "set x 7\ndiv x 0\nmod x 0\nset y x / 0");
        assert_eq!(num(&s, "x"), 7.0);
        assert!(s.var("y").is_none());
    }

    #[test]
    fn binary_set() {
        let mut s = state();
        run(&mut s, "set a 6\nset b a * 7\nset c b - a\nset name \"Bob\"\nset hi \"Hi \" + name");
        assert_eq!(num(&s, "b"), 42.0);
        assert_eq!(num(&s, "c"), 36.0);
        assert_eq!(s.var("hi"), Some(&Value::Str("Hi Bob".into())));
    }

    #[test]
    fn add_concatenates_text() {
        let mut s = state();
        run(&mut s, "set t \"ab\"\nadd t \"cd\"");
        assert_eq!(s.var("t"), Some(&Value::Str("abcd".into())));
    }

    #[test]
    fn clamp_min_max_lerp() {
        let mut s = state();
        run(&mut s, "set x 50\nclamp x 0 10\nset y 3\nmax y 8\nmin y 5\nset z 0\nlerp z 10 0.5");
        assert_eq!(num(&s, "x"), 10.0);
        assert_eq!(num(&s, "y"), 5.0);
        assert_eq!(num(&s, "z"), 5.0);
    }

    #[test]
    fn math_functions() {
        let mut s = state();
        run(&mut s, "set a -2.6\nabs a\nfloor b 2.7\nsqrt c 16\npow d 2 10\nlog e 0");
        assert_eq!(num(&s, "a"), 2.6);
        assert_eq!(num(&s, "b"), 2.0);
        assert_eq!(num(&s, "c"), 4.0);
        assert_eq!(num(&s, "d"), 1024.0);
        assert!(s.var("e").is_none());
    }

    #[test]
    fn swap_copy_toggle() {
        let mut s = state();
        run(&mut s, "set a 1\nset b 2\nswap a b\ncopy c a\ntoggle flag\ntoggle c");
        assert_eq!(num(&s, "a"), 2.0);
        assert_eq!(num(&s, "b"), 1.0);
        assert_eq!(num(&s, "flag"), 1.0);
        assert_eq!(num(&s, "c"), 0.0);
    }

    #[test]
    fn random_ranges() {
        let mut s = state();
        for _ in 0..50 {
            run(&mut s, "randint r 1 3\nrandfloat f 2 4\nrand u\nrandint same 5 5");
            assert!((1.0..=3.0).contains(&num(&s, "r")));
            assert_eq!(num(&s, "r").fract(), 0.0);
            assert!((2.0..4.0).contains(&num(&s, "f")));
            assert!((0.0..1.0).contains(&num(&s, "u")));
            assert_eq!(num(&s, "same"), 5.0);
        }
    }

    #[test]
    fn overflowing_ranges_fall_back_to_the_low_bound() {
        let mut s = state();
        run(&mut s, "randfloat f -1e308 1e308\nrand g -1e308 1e308\nrandint i -1e300 1e300");
        assert_eq!(num(&s, "f"), -1e308);
        assert_eq!(num(&s, "g"), -1e308);
        assert!(num(&s, "i").is_finite());
    }
}
