use thiserror::Error as ThisError;

/// Error codes prefixed by phase: L = lexer, P = parser, V = validator, R = runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Lexer
    L001, // unterminated string literal

    // Parser
    P001, // malformed label declaration

    // Validator
    V001, // unknown command
    V002, // undefined label
    V003, // label declared more than once
    V004, // binding arity
    V005, // timer arity
    V006, // arithmetic / variable arity
    V007, // unbalanced loop / end
    V008, // malformed if

    // Runtime
    R001, // unknown command reached the dispatcher
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L001 => "L001",
            Self::P001 => "P001",
            Self::V001 => "V001",
            Self::V002 => "V002",
            Self::V003 => "V003",
            Self::V004 => "V004",
            Self::V005 => "V005",
            Self::V006 => "V006",
            Self::V007 => "V007",
            Self::V008 => "V008",
            Self::R001 => "R001",
        }
    }

    /// Phase label used by hosts when listing diagnostics.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::L001 => "lex",
            Self::P001 => "parse",
            Self::R001 => "runtime",
            _ => "validate",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagnostic produced by any phase. Scripts never abort the host; every
/// failure ends up in a list of these.
#[derive(Debug, Clone, PartialEq, ThisError)]
#[error("[{code}] {line}:{column} - {message}")]
pub struct Error {
    pub code: ErrorCode,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Error {
    pub fn new(code: ErrorCode, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self { code, line, column, message: message.into() }
    }

    /// Whole-line diagnostic (column 1).
    pub fn at_line(code: ErrorCode, line: usize, message: impl Into<String>) -> Self {
        Self::new(code, line, 1, message)
    }
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
