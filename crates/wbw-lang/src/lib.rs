pub mod analysis;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod render;
pub mod runtime;
pub mod syntax;
pub mod types;

pub use config::{EngineConfig, TouchMode};
pub use engine::{Engine, FrameOutcome, LoadResult};
pub use error::{ConfigError, Error, ErrorCode};
pub use runtime::input::{InputEvent, InputSink};
pub use runtime::state::SoundCue;
pub use runtime::value::Value;
pub use syntax::ast::Program;
pub use types::draw::{Color, DrawCommand, TextAlign};

use commands::CommandRegistry;

// ─── Public API ───────────────────────────────────────────────────────────────

/// Parse and validate source text without running it. Returns the program
/// when there are no diagnostics.
pub fn compile(source: &str) -> Result<Program, Vec<Error>> {
    let (program, mut errors) = syntax::parse(source);
    errors.extend(analysis::validate(&program, &CommandRegistry::standard()));
    if errors.is_empty() { Ok(program) } else { Err(errors) }
}
