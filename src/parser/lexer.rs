//! Lexer for Visual Format Language lines using logos

use logos::Logos;

use crate::error::ParseError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // Orientation prefixes
    #[token("H:")]
    Horizontal,
    #[token("V:")]
    Vertical,

    // Superview edge
    #[token("|")]
    Pipe,

    // Connections
    #[token("-")]
    Minus,
    #[token("~")]
    Tilde,

    // Delimiters
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(",")]
    Comma,
    #[token("@")]
    At,

    // Relations (longer first)
    #[token("==")]
    Equal,
    #[token(">=")]
    GreaterOrEqual,
    #[token("<=")]
    LessOrEqual,

    // Arithmetic for extended predicates
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("+")]
    Plus,

    // Literals
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,
}

impl Token {
    /// Human-readable form used in diagnostics
    pub fn describe(&self) -> String {
        match self {
            Token::Horizontal => "'H:'".to_string(),
            Token::Vertical => "'V:'".to_string(),
            Token::Pipe => "'|'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Tilde => "'~'".to_string(),
            Token::BracketOpen => "'['".to_string(),
            Token::BracketClose => "']'".to_string(),
            Token::ParenOpen => "'('".to_string(),
            Token::ParenClose => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::At => "'@'".to_string(),
            Token::Equal => "'=='".to_string(),
            Token::GreaterOrEqual => "'>='".to_string(),
            Token::LessOrEqual => "'<='".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Ident(s) => format!("name '{}'", s),
            Token::Number(n) => format!("number {}", n),
            Token::LineComment => "comment".to_string(),
        }
    }
}

/// Lex one VFL line into tokens with spans. An unrecognised character is an
/// error.
pub fn lex(line: usize, input: &str) -> Result<Vec<(Token, Span)>, ParseError> {
    let mut tokens = Vec::new();
    for (tok, span) in Token::lexer(input).spanned() {
        match tok {
            Ok(t) => tokens.push((t, span)),
            Err(()) => {
                return Err(ParseError::Syntax {
                    line,
                    message: format!("Unexpected character '{}'", &input[span.clone()]),
                    span,
                    expected: Vec::new(),
                })
            }
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        lex(0, input).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_orientation_and_edges() {
        assert_eq!(
            kinds("H:|-[a]-|"),
            vec![
                Token::Horizontal,
                Token::Pipe,
                Token::Minus,
                Token::BracketOpen,
                Token::Ident("a".to_string()),
                Token::BracketClose,
                Token::Minus,
                Token::Pipe,
            ]
        );
    }

    #[test]
    fn test_relations_longest_match() {
        assert_eq!(
            kinds(">= <= =="),
            vec![Token::GreaterOrEqual, Token::LessOrEqual, Token::Equal]
        );
    }

    #[test]
    fn test_view_named_like_orientation() {
        // Only "H:" is the orientation token; a bare H is a name
        assert_eq!(
            kinds("[H]"),
            vec![
                Token::BracketOpen,
                Token::Ident("H".to_string()),
                Token::BracketClose
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("-10.5-"),
            vec![Token::Minus, Token::Number(10.5), Token::Minus]
        );
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(kinds("[a] // trailing"), kinds("[a]"));
    }

    #[test]
    fn test_slash_is_not_comment() {
        assert_eq!(
            kinds("b/2"),
            vec![Token::Ident("b".to_string()), Token::Slash, Token::Number(2.0)]
        );
    }

    #[test]
    fn test_unknown_character_is_error() {
        let err = lex(3, "[a$]").unwrap_err();
        match err {
            ParseError::Syntax { line, span, .. } => {
                assert_eq!(line, 3);
                assert_eq!(span, 2..3);
            }
            other => panic!("Expected syntax error, got {:?}", other),
        }
    }
}
