use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::ast::{Arg, Call, Spanned, Verb};
use crate::lexer::Token;

type Span = SimpleSpan;

/// Parse error with source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Byte range of the offending token.
    pub span: std::ops::Range<usize>,
    /// Human-readable description.
    pub message: String,
}

fn spanned<T>(node: T, span: Span) -> Spanned<T> {
    Spanned {
        node,
        span: span.into_range(),
    }
}

/// `verb '(' arg (',' arg)* ','? ')'` followed by anything.
///
/// Tokens after the closing parenthesis belong to surrounding prose and are
/// consumed without inspection.
fn call_parser<'a, I>() -> impl Parser<'a, I, Spanned<Call>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = Span>,
{
    let verb = select! { Token::Word(w) => w }
        .try_map(|w, span| {
            Verb::from_keyword(&w).ok_or_else(|| Rich::custom(span, format!("unknown verb: {w}")))
        })
        .map_with(|v, e| spanned(v, e.span()))
        .labelled("verb");

    let arg = select! {
        Token::Str(s) => Arg { text: s, quoted: true },
        Token::Number(n) => Arg { text: n, quoted: false },
        Token::Word(w) => Arg { text: w, quoted: false },
    }
    .map_with(|a, e| spanned(a, e.span()))
    .labelled("argument");

    let args = arg
        .separated_by(just(Token::Comma))
        .allow_trailing()
        .at_least(1)
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LParen), just(Token::RParen));

    verb.then(args)
        .map_with(|(verb, args), e| spanned(Call { verb, args }, e.span()))
        .then_ignore(any().repeated())
}

/// Parse one call from a token stream that starts at its verb.
pub fn parse_call(tokens: &[(Token, std::ops::Range<usize>)]) -> Result<Spanned<Call>, Vec<ParseError>> {
    let token_iter = tokens
        .iter()
        .map(|(tok, span)| (tok.clone(), Span::from(span.clone())));

    let len = tokens.last().map_or(0, |(_, s)| s.end);
    let eoi: Span = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    let (output, errors) = call_parser().parse(stream).into_output_errors();

    if let Some(call) = output
        && errors.is_empty()
    {
        return Ok(call);
    }

    Err(errors
        .into_iter()
        .map(|e| ParseError {
            span: e.span().into_range(),
            message: e.to_string(),
        })
        .collect())
}
