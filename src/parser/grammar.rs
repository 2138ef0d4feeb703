//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::ParseError;
use crate::parser::ast::*;
use crate::parser::lexer::{self, Token};

/// Parse a single VFL line into an AST
pub fn parse_line(line: usize, input: &str) -> Result<VflLine, Vec<ParseError>> {
    let len = input.len();

    let tokens = lexer::lex(line, input).map_err(|e| vec![e])?;
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    line_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| {
            errs.into_iter()
                .map(|e| ParseError::from_rich(e, line))
                .collect()
        })
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn line_parser<'a, I>() -> impl Parser<'a, I, VflLine, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let identifier = select! {
        Token::Ident(s) => Identifier::new(s),
    }
    .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

    let number = select! {
        Token::Number(n) => n,
    };

    let orientation = choice((
        just(Token::Horizontal).to(Orientation::Horizontal),
        just(Token::Vertical).to(Orientation::Vertical),
    ));

    let relation = choice((
        just(Token::Equal).to(Relation::Equal),
        just(Token::GreaterOrEqual).to(Relation::GreaterOrEqual),
        just(Token::LessOrEqual).to(Relation::LessOrEqual),
    ));

    // Object of a predicate: a possibly negative number or a name
    let object = choice((
        just(Token::Minus)
            .or_not()
            .then(number.clone())
            .map(|(neg, n)| Operand::Constant(if neg.is_some() { -n } else { n })),
        identifier.clone().map(|id| Operand::Named(id.node)),
    ));

    // `*2` or `/2`, stored as a multiplier
    let scale = choice((
        just(Token::Star).ignore_then(number.clone()),
        just(Token::Slash)
            .ignore_then(number.clone())
            .try_map(|n, span: SimpleSpan| {
                if n == 0.0 {
                    Err(Rich::custom(span, "division by zero in predicate"))
                } else {
                    Ok(1.0 / n)
                }
            }),
    ));

    let offset = choice((
        just(Token::Plus).ignore_then(number.clone()),
        just(Token::Minus).ignore_then(number.clone()).map(|n| -n),
    ));

    let priority = just(Token::At).ignore_then(choice((
        number.clone().map(Priority::Value),
        identifier.clone().map(|id| Priority::Metric(id.node)),
    )));

    let predicate = relation
        .or_not()
        .then(object)
        .then(scale.or_not())
        .then(offset.or_not())
        .then(priority.or_not())
        .map_with(|((((relation, object), multiplier), constant), priority), e| {
            Spanned::new(
                Predicate {
                    relation: relation.unwrap_or_default(),
                    object,
                    multiplier,
                    constant,
                    priority,
                },
                span_range(&e.span()),
            )
        });

    let predicate_list = predicate
        .separated_by(just(Token::Comma))
        .at_least(1)
        .collect::<Vec<_>>()
        .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

    // `-10-` or `-gap-`: a bare number or metric between dashes
    let simple_predicate = choice((
        number.clone().map(Operand::Constant),
        identifier.clone().map(|id| Operand::Named(id.node)),
    ))
    .map_with(|object, e| vec![Spanned::new(Predicate::equal(object), span_range(&e.span()))]);

    let connection = choice((
        just(Token::Minus)
            .ignore_then(choice((predicate_list.clone(), simple_predicate)))
            .then_ignore(just(Token::Minus))
            .map(Connection::Predicates),
        just(Token::Minus).to(Connection::Standard),
        just(Token::Tilde).to(Connection::Equal),
    ))
    .or_not()
    .map_with(|connection, e| {
        Spanned::new(
            connection.unwrap_or(Connection::Flush),
            span_range(&e.span()),
        )
    });

    let view = identifier
        .then(predicate_list.or_not())
        .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
        .map(|(name, predicates)| Item::View {
            name,
            predicates: predicates.unwrap_or_default(),
        });

    let item = choice((view, just(Token::Pipe).to(Item::Superview)))
        .map_with(|item, e| Spanned::new(item, span_range(&e.span())));

    orientation
        .or_not()
        .then(item.clone())
        .then(connection.then(item).repeated().collect::<Vec<_>>())
        .then_ignore(end())
        .try_map(|((orientation, head), tail), span: SimpleSpan| {
            let line = VflLine {
                orientation: orientation.unwrap_or_default(),
                head,
                tail,
            };
            validate_line(&line).map_err(|msg| Rich::custom(span, msg))?;
            Ok(line)
        })
}

/// Structural checks the grammar alone does not express
fn validate_line(line: &VflLine) -> Result<(), &'static str> {
    let items: Vec<_> = line.items().collect();
    let last = items.len() - 1;

    for (index, item) in items.iter().enumerate() {
        if matches!(item.node, Item::Superview) && index != 0 && index != last {
            return Err("'|' may only appear at the start or end of a line");
        }
    }

    if line.view_names().is_empty() {
        return Err("a line must contain at least one view");
    }
    Ok(())
}
