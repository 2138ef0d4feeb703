//! Error types for the layout adapter

use thiserror::Error;

use crate::error::{format_parse_errors, ParseError};
use crate::scene::NodeId;

use super::solver::SolverError;

/// Errors that can occur while building a layout
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The VFL source did not parse; no constraint was added
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// Constraint solver error
    #[error("constraint solver error: {0}")]
    Solver(#[from] SolverError),

    /// The parent container was removed from the scene
    #[error("parent container {0} is no longer in the scene")]
    StaleParent(NodeId),
}

impl From<Vec<ParseError>> for LayoutError {
    fn from(errors: Vec<ParseError>) -> Self {
        LayoutError::Parse(errors)
    }
}

impl LayoutError {
    /// Parse errors if this is a parse failure
    pub fn parse_errors(&self) -> Option<&[ParseError]> {
        match self {
            Self::Parse(errors) => Some(errors),
            _ => None,
        }
    }
}
