//! Error types for VFL parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::lexer::Token;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Errors raised while turning VFL text into constraints.
///
/// `line` is the index into [`VflSource::lines`](crate::VflSource::lines);
/// `span` is a byte range within that line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("line {}: parse error at {span:?}: {message}", .line + 1)]
    Syntax {
        line: usize,
        span: Span,
        message: String,
        expected: Vec<String>,
    },

    #[error("line {}: unknown metric '{name}'", .line + 1)]
    UnknownMetric { line: usize, span: Span, name: String },

    #[error("line {}: {feature} requires extended VFL syntax", .line + 1)]
    ExtendedSyntax {
        line: usize,
        span: Span,
        feature: String,
    },

    #[error("line {}: priority {value} is outside 1..=1000", .line + 1)]
    InvalidPriority { line: usize, span: Span, value: f64 },
}

impl ParseError {
    /// Index of the offending line
    pub fn line(&self) -> usize {
        match self {
            ParseError::Syntax { line, .. }
            | ParseError::UnknownMetric { line, .. }
            | ParseError::ExtendedSyntax { line, .. }
            | ParseError::InvalidPriority { line, .. } => *line,
        }
    }

    /// Byte range within the offending line
    pub fn span(&self) -> &Span {
        match self {
            ParseError::Syntax { span, .. }
            | ParseError::UnknownMetric { span, .. }
            | ParseError::ExtendedSyntax { span, .. }
            | ParseError::InvalidPriority { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne.
    ///
    /// `source` is the text of the offending line.
    pub fn format(&self, source: &str, filename: &str) -> String {
        let (message, label) = match self {
            ParseError::Syntax {
                message, expected, ..
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };
                (message.clone(), format!("{}{}", message, expected_str))
            }
            ParseError::UnknownMetric { name, .. } => (
                format!("Unknown metric '{}'", name),
                "not defined in the layout metrics".to_string(),
            ),
            ParseError::ExtendedSyntax { feature, .. } => (
                format!("{} requires extended VFL syntax", feature),
                "enable extended mode in the layout config".to_string(),
            ),
            ParseError::InvalidPriority { value, .. } => (
                format!("Priority {} is out of range", value),
                "priorities run from 1 to 1000".to_string(),
            ),
        };

        let span = self.span().clone();
        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span))
                    .with_message(label)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }

    /// Convert a chumsky error for the given line
    pub(crate) fn from_rich(err: chumsky::error::Rich<'_, Token>, line: usize) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of line".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of line".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        ParseError::Syntax {
            line,
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    tok.describe()
}

/// Join several parse errors into one line
pub fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
