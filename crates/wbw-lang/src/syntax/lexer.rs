use crate::error::{Error, ErrorCode};

/// What a single source line turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Blank,
    /// `name:` optionally followed by the label's first command.
    Label { name: String, rest: Vec<String> },
    Command(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexedLine {
    pub kind: LineKind,
    pub line: usize,
    pub raw: String,
}

pub struct Lexer<'a> {
    source: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Lex every line. Never fails: problems are returned alongside the
    /// best-effort result.
    pub fn lex(self) -> (Vec<LexedLine>, Vec<Error>) {
        let mut lines = Vec::new();
        let mut errors = Vec::new();

        for (i, raw) in self.source.lines().enumerate() {
            let (lexed, err) = lex_line(raw, i + 1);
            if let Some(e) = err { errors.push(e); }
            lines.push(lexed);
        }

        (lines, errors)
    }
}

/// Lex one line: strip comment, expand shorthand, split, classify.
pub fn lex_line(raw: &str, line: usize) -> (LexedLine, Option<Error>) {
    let code = strip_comment(raw).trim();
    let expanded = expand_shorthand(code);
    let text = expanded.as_deref().unwrap_or(code);

    let (tokens, unterminated) = split_tokens(text);
    let error = unterminated.map(|col| {
        Error::new(ErrorCode::L001, line, col, "unterminated string literal")
    });

    let kind = match tokens.first() {
        None => LineKind::Blank,
        Some(first) if first.ends_with(':') && !first.starts_with('"') => LineKind::Label {
            name: first[..first.len() - 1].to_string(),
            rest: tokens[1..].to_vec(),
        },
        Some(_) => LineKind::Command(tokens),
    };

    (LexedLine { kind, line, raw: raw.trim().to_string() }, error)
}

// ─── Comments ────────────────────────────────────────────────────────────────

/// Cut the line at the first `//` that is not inside a quoted string.
pub fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut in_quote = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => in_quote = !in_quote,
            b'/' if !in_quote && bytes.get(i + 1) == Some(&b'/') => return &line[..i],
            _ => {}
        }
        i += 1;
    }
    line
}

// ─── Assignment shorthand ────────────────────────────────────────────────────

/// Rewrite `x = v`, `x += v` (and `-= *= /= %=`), `x++`, `x--` into the
/// canonical command form. Returns `None` when the line is not shorthand.
pub fn expand_shorthand(line: &str) -> Option<String> {
    let ident_len = line
        .char_indices()
        .take_while(|(i, c)| {
            if *i == 0 { c.is_ascii_alphabetic() || *c == '_' }
            else { c.is_ascii_alphanumeric() || *c == '_' || *c == '.' }
        })
        .count();
    if ident_len == 0 { return None; }

    let name = &line[..ident_len];
    let rest = line[ident_len..].trim_start();

    match rest {
        "++" => return Some(format!("inc {name}")),
        "--" => return Some(format!("dec {name}")),
        _ => {}
    }

    const COMPOUND: [(&str, &str); 5] = [
        ("+=", "add"),
        ("-=", "sub"),
        ("*=", "mul"),
        ("/=", "div"),
        ("%=", "mod"),
    ];
    for (op, cmd) in COMPOUND {
        if let Some(value) = rest.strip_prefix(op) {
            return Some(format!("{cmd} {name} {}", value.trim()).trim_end().to_string());
        }
    }

    if rest.starts_with('=') && !rest.starts_with("==") {
        return Some(format!("set {name} {}", rest[1..].trim()).trim_end().to_string());
    }

    None
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// Split on whitespace outside quotes. Quoted tokens keep their quotes.
/// Returns the 1-based column of an unterminated quote, if any.
pub fn split_tokens(line: &str) -> (Vec<String>, Option<usize>) {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote_start: Option<usize> = None;

    for (col, ch) in line.chars().enumerate() {
        match ch {
            '"' if quote_start.is_some() => {
                current.push(ch);
                quote_start = None;
                tokens.push(std::mem::take(&mut current));
            }
            '"' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                current.push(ch);
                quote_start = Some(col + 1);
            }
            c if c.is_whitespace() && quote_start.is_none() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() { tokens.push(current); }
    (tokens, quote_start)
}

/// True when the token was written as a `"quoted"` literal.
pub fn is_quoted(token: &str) -> bool {
    token.len() >= 2 && token.starts_with('"') && token.ends_with('"')
}

/// Strip surrounding quotes (also tolerates an unterminated leading quote).
pub fn unquote(token: &str) -> &str {
    if is_quoted(token) {
        &token[1..token.len() - 1]
    } else {
        token.strip_prefix('"').unwrap_or(token)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<String> {
        match lex_line(src, 1).0.kind {
            LineKind::Command(t) => t,
            other => panic!("expected command, got {other:?}"),
        }
    }

    #[test]
    fn blank_and_comment_only() {
        assert_eq!(lex_line("", 1).0.kind, LineKind::Blank);
        assert_eq!(lex_line("   // nothing here", 1).0.kind, LineKind::Blank);
    }

    #[test]
    fn simple_command() {
        assert_eq!(tokens("player 10 20"), vec!["player", "10", "20"]);
    }

    #[test]
    fn quoted_token_is_single() {
        assert_eq!(tokens(r#"msg "hello world" 3"#), vec!["msg", "\"hello world\"", "3"]);
    }

    #[test]
    fn comment_inside_quotes_kept() {
        assert_eq!(tokens(r#"hud 10 10 "http://x" // trailing"#), vec!["hud", "10", "10", "\"http://x\""]);
    }

    #[test]
    fn comment_truncates_line() {
        assert_eq!(tokens("set x 1 // set it"), vec!["set", "x", "1"]);
    }

    #[test]
    fn label_line() {
        let (l, _) = lex_line("tick:", 4);
        assert_eq!(l.kind, LineKind::Label { name: "tick".into(), rest: vec![] });
        assert_eq!(l.line, 4);
    }

    #[test]
    fn label_with_inline_command() {
        let (l, _) = lex_line("boom: shake 5", 1);
        assert_eq!(l.kind, LineKind::Label { name: "boom".into(), rest: vec!["shake".into(), "5".into()] });
    }

    #[test]
    fn shorthand_set() {
        assert_eq!(tokens("x = 5"), vec!["set", "x", "5"]);
        assert_eq!(tokens("x=5"), vec!["set", "x", "5"]);
        assert_eq!(tokens("ARCDMG = SKILL"), vec!["set", "ARCDMG", "SKILL"]);
    }

    #[test]
    fn shorthand_binary_expression() {
        assert_eq!(tokens("x = a + 2"), vec!["set", "x", "a", "+", "2"]);
    }

    #[test]
    fn shorthand_compound() {
        assert_eq!(tokens("x += 1"), vec!["add", "x", "1"]);
        assert_eq!(tokens("x -= 2"), vec!["sub", "x", "2"]);
        assert_eq!(tokens("x *= 3"), vec!["mul", "x", "3"]);
        assert_eq!(tokens("x /= 4"), vec!["div", "x", "4"]);
        assert_eq!(tokens("x %= 5"), vec!["mod", "x", "5"]);
    }

    #[test]
    fn shorthand_increment() {
        assert_eq!(tokens("score++"), vec!["inc", "score"]);
        assert_eq!(tokens("lives --"), vec!["dec", "lives"]);
    }

    #[test]
    fn equality_is_not_shorthand() {
        assert_eq!(expand_shorthand("x == 1"), None);
        assert_eq!(expand_shorthand("if x == 1 goto a"), None);
        assert_eq!(expand_shorthand("set x 1"), None);
    }

    #[test]
    fn shorthand_keeps_quoted_value() {
        assert_eq!(tokens(r#"name = "Bob Smith""#), vec!["set", "name", "\"Bob Smith\""]);
    }

    #[test]
    fn unterminated_quote_reported() {
        let (l, err) = lex_line(r#"msg "oops"#, 7);
        let err = err.expect("expected L001");
        assert_eq!(err.code, ErrorCode::L001);
        assert_eq!(err.line, 7);
        assert_eq!(err.column, 5);
        assert_eq!(l.kind, LineKind::Command(vec!["msg".into(), "\"oops".into()]));
    }

    #[test]
    fn unquote_helpers() {
        assert!(is_quoted("\"a\""));
        assert!(!is_quoted("a"));
        assert_eq!(unquote("\"a b\""), "a b");
        assert_eq!(unquote("plain"), "plain");
        assert_eq!(unquote("\"open"), "open");
    }

    #[test]
    fn lexer_numbers_lines() {
        let (lines, errors) = Lexer::new("a\n\nb:").lex();
        assert!(errors.is_empty());
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].line, 3);
        assert!(matches!(lines[2].kind, LineKind::Label { .. }));
    }
}
