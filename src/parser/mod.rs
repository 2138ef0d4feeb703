//! Parser for the Visual Format Language

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::parse_line;

use crate::error::ParseError;

/// Parse every line of a VFL source.
///
/// All lines are parsed even after a failure so that every error is
/// reported at once.
pub fn parse(source: &VflSource) -> Result<Vec<VflLine>, Vec<ParseError>> {
    let mut lines = Vec::new();
    let mut errors = Vec::new();

    for (index, text) in source.lines().into_iter().enumerate() {
        match parse_line(index, text) {
            Ok(line) => lines.push(line),
            Err(errs) => errors.extend(errs),
        }
    }

    if errors.is_empty() {
        Ok(lines)
    } else {
        Err(errors)
    }
}
