pub mod ast;
pub mod lexer;
pub mod parser;

use crate::error::Error;

/// Lex and parse a whole script. Lexer and parser diagnostics are returned
/// together; the program is always produced.
pub fn parse(source: &str) -> (ast::Program, Vec<Error>) {
    let (lines, mut errors) = lexer::Lexer::new(source).lex();
    let (program, parse_errors) = parser::Parser::new(lines).parse();
    errors.extend(parse_errors);
    (program, errors)
}
