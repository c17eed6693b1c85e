pub mod validator;


use crate::commands::CommandRegistry;
use crate::error::Error;
use crate::syntax::ast::Program;
pub use validator::Validator;

/// Validate a parsed program against the registry's command set. Never
/// mutates the program; the same input always yields the same diagnostics,
/// ordered by line.
pub fn validate(program: &Program, registry: &CommandRegistry) -> Vec<Error> {
    let errors = Validator::new(program, registry).validate();
    tracing::debug!(commands = program.command_count(), errors = errors.len(), "validated program");
    errors
}
