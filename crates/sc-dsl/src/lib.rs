//! The Statecraft command grammar.
//!
//! Model output is free text with call-like commands embedded in it:
//!
//! ```text
//! She laughs. set('Alice.favor.{{user}}', 'up_small', 'shared a joke')
//! cast('enter', 'Bob', 'presentSupporting') location('current', 'Library')
//! ```
//!
//! [`parse_block`] finds every call, lexes it with logos, parses it with
//! chumsky, and resolves it against a [`Schema`]. Calls that cannot be read
//! or fail schema checks are dropped one at a time and reported as
//! [`Diagnostic`]s; they never abort the rest of the block.
//!
//! Scene changes may also arrive as a tagged `<CE_UpdateScene>` block, read
//! by [`scene_block`] into the same commands.

/// Command AST: calls, arguments, and resolved commands.
pub mod ast;
/// Diagnostics for dropped calls, rendered with ariadne.
pub mod diagnostics;
/// Token definitions and the logos lexer.
pub mod lexer;
/// The chumsky call parser.
pub mod parser;
/// Schema checks and argument role assignment.
pub mod resolver;
/// Tagged `<CE_UpdateScene>` blocks.
pub mod scene_block;

use sc_core::Schema;

pub use ast::{
    CastCommand, Command, LocationCommand, MutationIntent, SceneCommand, Span, Spanned, Verb,
};
pub use diagnostics::{Diagnostic, DiagnosticCode, Severity, render_diagnostics};

/// Result of parsing one block of text.
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    /// Accepted commands, in the order they appear.
    pub commands: Vec<Spanned<Command>>,
    /// One entry per dropped call.
    pub diagnostics: Vec<Diagnostic>,
}

/// Where a candidate call starts inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CallSite {
    /// Start of the call including any `ce.` prefix.
    start: usize,
    /// Start of the verb.
    verb_start: usize,
    /// End of the line holding the call.
    line_end: usize,
}

impl CallSite {
    /// A bare call with no quoted text up to `end` reads as prose, e.g.
    /// `note(s)`. Failures on such calls are not reported.
    fn is_prose(&self, text: &str, end: usize) -> bool {
        self.start == self.verb_start && !text[self.verb_start..end].contains(['\'', '"'])
    }

    /// End of the argument list if it closes on this line.
    fn paren_end(&self, text: &str) -> usize {
        text[self.verb_start..self.line_end]
            .find(')')
            .map_or(self.line_end, |i| self.verb_start + i + 1)
    }
}

const PREFIX: &str = "ce.";

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Find every `verb(` or `ce.verb(` not glued to a preceding identifier.
///
/// The parenthesis must follow the verb directly, so prose such as
/// `the scene (at dusk)` is never a candidate.
fn find_call_sites(text: &str) -> Vec<CallSite> {
    let mut sites = Vec::new();
    let mut line_start = 0;

    for line in text.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);
        let line_end = line_start + body.len();

        for verb in Verb::ALL {
            for (pos, _) in body.match_indices(verb.keyword()) {
                if !body[pos + verb.keyword().len()..].starts_with('(') {
                    continue;
                }
                let before = &body[..pos];
                let start = match before.chars().next_back() {
                    None => pos,
                    Some('.') => {
                        let Some(head) = before.strip_suffix(PREFIX) else {
                            continue;
                        };
                        if head.chars().next_back().is_some_and(is_ident_char) {
                            continue;
                        }
                        pos - PREFIX.len()
                    }
                    Some(c) if is_ident_char(c) => continue,
                    Some(_) => pos,
                };
                sites.push(CallSite {
                    start: line_start + start,
                    verb_start: line_start + pos,
                    line_end,
                });
            }
        }

        line_start += line.len();
    }

    sites.sort_by_key(|s| s.verb_start);
    sites
}

/// Parse every command in `text` against `schema`.
///
/// Commands keep their textual order, whether they come from calls or from
/// scene blocks. A call nested inside the argument of an accepted call is not
/// treated as a separate command, and calls inside scene blocks are ignored.
pub fn parse_block(text: &str, schema: &Schema) -> ParseOutput {
    let mut output = ParseOutput::default();
    let mut consumed_until = 0;
    let blocks = scene_block::find_blocks(text);

    for site in find_call_sites(text) {
        if site.start < consumed_until || blocks.iter().any(|b| b.contains(&site.start)) {
            continue;
        }

        let (tokens, lex_errors) = lexer::lex(&text[site.verb_start..site.line_end], site.verb_start);
        match parser::parse_call(&tokens) {
            Ok(call) => {
                let prose = site.is_prose(text, call.span.end);
                if let Some(err) = lex_errors.iter().find(|e| e.span.start < call.span.end) {
                    if prose {
                        continue;
                    }
                    output.diagnostics.push(
                        Diagnostic::error(DiagnosticCode::Lex, err.span.clone(), &err.message)
                            .with_label(format!("{} call dropped", call.node.verb.node)),
                    );
                    continue;
                }
                consumed_until = call.span.end;
                match resolver::resolve(&call, schema) {
                    Ok(command) => output.commands.push(Spanned {
                        node: command,
                        span: site.start..call.span.end,
                    }),
                    Err(_) if prose => {}
                    Err(diag) => output.diagnostics.push(diag),
                }
            }
            Err(_) if site.is_prose(text, site.paren_end(text)) => {}
            Err(errors) => {
                let diag = match (lex_errors.first(), errors.first()) {
                    (Some(lex), _) => {
                        Diagnostic::error(DiagnosticCode::Lex, lex.span.clone(), &lex.message)
                    }
                    (None, Some(parse)) => {
                        Diagnostic::error(DiagnosticCode::Syntax, parse.span.clone(), &parse.message)
                    }
                    (None, None) => Diagnostic::error(
                        DiagnosticCode::Syntax,
                        site.start..site.line_end,
                        "malformed call",
                    ),
                };
                output.diagnostics.push(diag.with_label("malformed call dropped"));
            }
        }
    }

    for block in blocks {
        scene_block::parse_scene_block(text, block, schema, &mut output);
    }
    output.commands.sort_by_key(|c| c.span.start);
    output.diagnostics.sort_by_key(|d| d.span.start);

    output
}
