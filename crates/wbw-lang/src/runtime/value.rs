/// A script variable. The store is deliberately dynamic: numbers and text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Num(f64),
    Str(String),
}

impl Default for Value {
    fn default() -> Self { Value::Num(0.0) }
}

impl Value {
    /// Numeric coercion. Text that does not parse falls back to 0.
    pub fn as_num(&self) -> f64 {
        match self {
            Value::Num(n) => *n,
            Value::Str(s) => parse_number(s).unwrap_or(0.0),
        }
    }

    /// True for text that cannot be read as a number.
    pub fn is_text(&self) -> bool {
        matches!(self, Value::Str(s) if parse_number(s).is_none())
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::Num(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty() && s != "0" && !s.eq_ignore_ascii_case("false"),
        }
    }

    /// Display form used by text, HUD and buttons.
    pub fn to_text(&self) -> String {
        match self {
            Value::Num(n) => format_number(*n),
            Value::Str(s) => s.clone(),
        }
    }

    pub fn from_bool(b: bool) -> Self {
        Value::Num(if b { 1.0 } else { 0.0 })
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self { Value::Num(n) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::Str(s.to_string()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::Str(s) }
}

pub fn parse_number(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() { return None; }
    // `inf`/`nan` parse as f64 but are never meant as numbers in scripts
    if t.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') { return None; }
    t.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Integers print without a fraction; everything else with at most two decimals.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        let s = format!("{n:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
