use std::collections::BTreeMap;

/// One executable line: whitespace-separated tokens, quoted tokens keep their quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandLine {
    pub tokens: Vec<String>,
    /// 1-based source line.
    pub line: usize,
    pub raw: String,
}

impl CommandLine {
    pub fn new(tokens: Vec<String>, line: usize, raw: impl Into<String>) -> Self {
        Self { tokens, line, raw: raw.into() }
    }

    /// Command name as written (not yet alias-normalized).
    pub fn name(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or("")
    }

    /// Everything after the command name.
    pub fn args(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or(&[])
    }

    /// A derived line made of a sub-slice of this line's tokens (binding
    /// actions, inline `if` commands). Keeps line number and raw text.
    pub fn sub_line(&self, tokens: &[String]) -> CommandLine {
        CommandLine { tokens: tokens.to_vec(), line: self.line, raw: self.raw.clone() }
    }
}

/// Parsed script: the init sequence plus named label blocks.
/// Immutable once built; the interpreter replays these lists every frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub init: Vec<CommandLine>,
    pub labels: BTreeMap<String, Vec<CommandLine>>,
    /// Every label declaration in source order, duplicates included.
    pub label_decls: Vec<(String, usize)>,
}

impl Program {
    pub fn label(&self, name: &str) -> Option<&[CommandLine]> {
        self.labels.get(name).map(Vec::as_slice)
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    /// Every command line, init first, then labels in name order. The scope is
    /// `None` for init.
    pub fn all_lines(&self) -> impl Iterator<Item = (Option<&str>, &CommandLine)> {
        self.init.iter().map(|l| (None, l)).chain(
            self.labels
                .iter()
                .flat_map(|(name, lines)| lines.iter().map(move |l| (Some(name.as_str()), l))),
        )
    }

    pub fn command_count(&self) -> usize {
        self.init.len() + self.labels.values().map(Vec::len).sum::<usize>()
    }
}
