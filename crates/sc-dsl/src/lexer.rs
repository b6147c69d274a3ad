use logos::Logos;
use std::fmt;

/// Token type for command calls.
///
/// Verbs, operators and paths are all `Token::Word` or `Token::Str`; their
/// meaning is decided by the parser and the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Left parenthesis `(`.
    LParen,
    /// Right parenthesis `)`.
    RParen,
    /// Comma separator `,`.
    Comma,
    /// Single- or double-quoted string literal, escapes resolved.
    Str(String),
    /// Numeric literal, kept as written.
    Number(String),
    /// Bare word such as `up_small`, `Alice.favor` or `{{user}}`.
    Word(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Str(s) => write!(f, "'{s}'"),
            Token::Number(n) => write!(f, "{n}"),
            Token::Word(w) => write!(f, "{w}"),
        }
    }
}

/// Internal logos token, converted to owned `Token` after lexing.
#[derive(Logos, Debug)]
#[logos(skip r"[ \t\r]+")]
enum RawToken {
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[regex(r"'([^'\\\n]|\\.)*'")]
    SingleQuoted,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    DoubleQuoted,

    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r"[\p{L}_{][\p{L}\p{N}_{}:.'\-]*")]
    Word,
}

/// A lexer error with source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Byte range of the erroneous input in the source.
    pub span: std::ops::Range<usize>,
    /// Human-readable description of the lexer error.
    pub message: String,
}

/// Lex one line of text into `(Token, Span)` pairs.
///
/// Spans are shifted by `offset` so they index into the enclosing block.
/// Lexing continues past errors; the caller decides whether an error
/// falls inside a call it cares about.
pub fn lex(source: &str, offset: usize) -> (Vec<(Token, std::ops::Range<usize>)>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let local = lexer.span();
        let span = local.start + offset..local.end + offset;
        match result {
            Ok(raw) => {
                let token = match raw {
                    RawToken::LParen => Token::LParen,
                    RawToken::RParen => Token::RParen,
                    RawToken::Comma => Token::Comma,
                    RawToken::SingleQuoted | RawToken::DoubleQuoted => {
                        let slice = lexer.slice();
                        Token::Str(unescape(&slice[1..slice.len() - 1]))
                    }
                    RawToken::Number => Token::Number(lexer.slice().to_string()),
                    RawToken::Word => Token::Word(lexer.slice().to_string()),
                };
                tokens.push((token, span));
            }
            Err(()) => {
                let text = &source[local];
                let message = if text.starts_with(['\'', '"']) {
                    "unterminated string literal".to_string()
                } else {
                    format!("unexpected character: {text:?}")
                };
                errors.push(LexError { span, message });
            }
        }
    }

    (tokens, errors)
}

/// Process escape sequences in a string literal.
///
/// Supports `\\`, `\n`, `\t`, `\'`, `\"`. Unknown sequences are kept as-is.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some('\'') => out.push('\''),
                Some('"') => out.push('"'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<String> {
        let (tokens, errors) = lex(source, 0);
        assert!(errors.is_empty(), "errors: {errors:?}");
        tokens.iter().map(|(t, _)| t.to_string()).collect()
    }

    #[test]
    fn lex_set_call() {
        assert_eq!(
            kinds("set('Alice.favor', 'up_small', 'a kind word')"),
            vec!["set", "(", "'Alice.favor'", ",", "'up_small'", ",", "'a kind word'", ")"]
        );
    }

    #[test]
    fn lex_bare_arguments() {
        assert_eq!(
            kinds("set(Alice.favor, -12.5)"),
            vec!["set", "(", "Alice.favor", ",", "-12.5", ")"]
        );
        assert_eq!(
            kinds("cast(enter, {{user}})"),
            vec!["cast", "(", "enter", ",", "{{user}}", ")"]
        );
    }

    #[test]
    fn lex_double_quoted_json_inside_single_quotes() {
        let (tokens, errors) = lex(r#"'{"name":"sword","qty":1}'"#, 0);
        assert!(errors.is_empty());
        assert_eq!(tokens[0].0, Token::Str(r#"{"name":"sword","qty":1}"#.into()));
    }

    #[test]
    fn lex_unicode_words() {
        let (tokens, errors) = lex("set(Élodie.humeur, suivant)", 0);
        assert!(errors.is_empty());
        assert_eq!(tokens[2].0, Token::Word("Élodie.humeur".into()));
    }

    #[test]
    fn lex_unterminated_string_is_an_error() {
        let (_, errors) = lex("set('Alice.favor, 'up_small')", 0);
        assert!(!errors.is_empty());
    }

    #[test]
    fn lex_spans_are_offset() {
        let (tokens, _) = lex("set(x)", 10);
        assert_eq!(tokens[0].1, 10..13);
        assert_eq!(tokens[1].1, 13..14);
    }

    #[test]
    fn unescape_sequences() {
        assert_eq!(unescape(r"it\'s"), "it's");
        assert_eq!(unescape(r#"say \"hi\""#), "say \"hi\"");
        assert_eq!(unescape(r"a\nb\tc\\d"), "a\nb\tc\\d");
        assert_eq!(unescape(r"\x"), "\\x");
        assert_eq!(unescape("trail\\"), "trail\\");
    }
}
