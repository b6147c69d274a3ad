//! Structured `<CE_UpdateScene>` blocks.
//!
//! Besides inline calls, model output may carry a tagged block describing
//! scene changes as bulleted lists:
//!
//! ```text
//! <CE_UpdateScene>
//!   <LocationCastIntent>
//!     <setCurrent>
//!       - 地点：Campus.Library
//!     </setCurrent>
//!   </LocationCastIntent>
//!   <CastIntent>
//!     <enter>
//!       - 角色：Bob（just arrived）
//!         preferredLayer: presentSupporting
//!     </enter>
//!   </CastIntent>
//!   <SceneMeta>
//!     - location_hint: "second floor"
//!     - scene_tags: ["quiet", "rain"]
//!   </SceneMeta>
//! </CE_UpdateScene>
//! ```
//!
//! Each list entry becomes the same [`Command`] an equivalent call would
//! produce, spanned over its lines. Entries naming undeclared characters or
//! locations are dropped with a warning.

use sc_core::{CastTier, Schema};

use crate::ParseOutput;
use crate::ast::{CastCommand, Command, LocationCommand, SceneCommand, Span, Spanned};
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::resolver::{action_key, unique_tags};

const OPEN: &str = "<CE_UpdateScene>";
const CLOSE: &str = "</CE_UpdateScene>";
const LAYER_KEY: &str = "preferredlayer";

/// Byte ranges of every scene block in `text`, tags included.
///
/// A block missing its closing tag runs to the end of the text.
pub fn find_blocks(text: &str) -> Vec<Span> {
    let mut blocks = Vec::new();
    let mut from = 0;
    while let Some(i) = text[from..].find(OPEN) {
        let start = from + i;
        let body = start + OPEN.len();
        let end = text[body..]
            .find(CLOSE)
            .map_or(text.len(), |j| body + j + CLOSE.len());
        blocks.push(start..end);
        from = end;
    }
    blocks
}

/// Read the scene block at `block` into `output`.
pub(crate) fn parse_scene_block(
    text: &str,
    block: Span,
    schema: &Schema,
    output: &mut ParseOutput,
) {
    let mut sink = Sink { schema, output };

    if let Some(locations) = section(text, &block, "LocationCastIntent") {
        let actions: [(&str, fn(String) -> LocationCommand); 3] = [
            ("setCurrent", LocationCommand::SetCurrent),
            ("addCandidate", LocationCommand::AddCandidate),
            ("removeCandidate", LocationCommand::RemoveCandidate),
        ];
        for (tag, build) in actions {
            if let Some(list) = section(text, &locations, tag) {
                for item in items(text, &list) {
                    sink.location(&item, build);
                }
            }
        }
    }

    if let Some(cast) = section(text, &block, "CastIntent") {
        if let Some(list) = section(text, &cast, "enter") {
            for item in items(text, &list) {
                sink.enter(&item);
            }
        }
        if let Some(list) = section(text, &cast, "leave") {
            for item in items(text, &list) {
                sink.leave(&item);
            }
        }
    }

    if let Some(meta) = section(text, &block, "SceneMeta") {
        for item in items(text, &meta) {
            sink.scene(&item);
        }
    }
}

/// One bulleted entry and its indented continuation lines.
#[derive(Debug)]
struct Item<'a> {
    span: Span,
    head: &'a str,
    rest: Vec<&'a str>,
}

impl Item<'_> {
    /// Value of a `key: value` continuation line, compared loosely.
    fn field(&self, key: &str) -> Option<&str> {
        self.rest
            .iter()
            .filter_map(|line| split_field(line))
            .find(|(k, _)| action_key(k) == key)
            .map(|(_, v)| v)
    }
}

/// Inner range of the first `<tag>...</tag>` inside `within`.
fn section(text: &str, within: &Span, tag: &str) -> Option<Span> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let region = &text[within.clone()];
    let start = region.find(&open)? + open.len();
    let end = region[start..]
        .find(&close)
        .map_or(region.len(), |j| start + j);
    Some(within.start + start..within.start + end)
}

fn items<'a>(text: &'a str, within: &Span) -> Vec<Item<'a>> {
    let mut items: Vec<Item<'a>> = Vec::new();
    let mut offset = within.start;
    for line in text[within.clone()].split_inclusive('\n') {
        let body = line.trim();
        let indent = line.len() - line.trim_start().len();
        let line_end = offset + line.trim_end().len();
        if let Some(head) = body.strip_prefix(['-', '*']) {
            items.push(Item {
                span: offset + indent..line_end,
                head: head.trim(),
                rest: Vec::new(),
            });
        } else if !body.is_empty()
            && let Some(item) = items.last_mut()
        {
            item.rest.push(body);
            item.span.end = line_end;
        }
        offset += line.len();
    }
    items
}

/// Split `key: value` at the first ASCII or full-width colon.
fn split_field(s: &str) -> Option<(&str, &str)> {
    let i = s.find([':', '：'])?;
    let sep = s[i..].chars().next()?.len_utf8();
    Some((s[..i].trim(), s[i + sep..].trim()))
}

/// The part after `label：`, or the whole entry when it has no label.
fn entry_value(head: &str) -> &str {
    split_field(head).map_or(head, |(_, value)| value)
}

fn strip_quotes(s: &str) -> &str {
    s.trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '“' | '”' | '「' | '」'))
        .trim()
}

/// Drop a trailing `（remark）` or `(remark)` and any quotes from a name.
fn clean_name(raw: &str) -> &str {
    let name = raw.find(['（', '(']).map_or(raw, |i| &raw[..i]);
    strip_quotes(name)
}

fn parse_tags(value: &str) -> Vec<String> {
    let tags = serde_json::from_str::<Vec<String>>(value).unwrap_or_else(|_| {
        value
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split([',', '，'])
            .map(strip_quotes)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    });
    unique_tags(tags)
}

struct Sink<'a> {
    schema: &'a Schema,
    output: &'a mut ParseOutput,
}

impl Sink<'_> {
    fn push(&mut self, item: &Item<'_>, command: Command) {
        self.output.commands.push(Spanned {
            node: command,
            span: item.span.clone(),
        });
    }

    fn reject(&mut self, item: &Item<'_>, code: DiagnosticCode, message: String) {
        self.output.diagnostics.push(
            Diagnostic::warning(code, item.span.clone(), message)
                .with_label("scene entry dropped"),
        );
    }

    fn character(&mut self, item: &Item<'_>, raw: &str) -> Option<String> {
        let name = clean_name(raw);
        if name.is_empty() {
            self.reject(item, DiagnosticCode::InvalidArgument, "missing character name".into());
            None
        } else if self.schema.is_character(name) {
            Some(name.to_string())
        } else {
            self.reject(
                item,
                DiagnosticCode::UnknownEntity,
                format!("\"{name}\" is not a declared character"),
            );
            None
        }
    }

    fn location(&mut self, item: &Item<'_>, build: fn(String) -> LocationCommand) {
        let name = clean_name(entry_value(item.head));
        match self.schema.resolve_location(name) {
            Some(path) => {
                let command = Command::Location(build(path.to_string()));
                self.push(item, command);
            }
            None => self.reject(
                item,
                DiagnosticCode::UnknownEntity,
                format!("\"{name}\" is not a declared location"),
            ),
        }
    }

    fn enter(&mut self, item: &Item<'_>) {
        // The tier may trail the name on the same line.
        let (head, inline_layer) = match item.head.to_ascii_lowercase().find(LAYER_KEY) {
            Some(i) => (&item.head[..i], split_field(&item.head[i..]).map(|(_, v)| v)),
            None => (item.head, None),
        };
        let tier = match inline_layer.or_else(|| item.field(LAYER_KEY)) {
            None => CastTier::Focus,
            Some(raw) => match CastTier::parse(strip_quotes(raw)) {
                Some(tier) => tier,
                None => {
                    self.reject(
                        item,
                        DiagnosticCode::InvalidArgument,
                        format!("unknown cast tier \"{raw}\""),
                    );
                    return;
                }
            },
        };
        if let Some(name) = self.character(item, entry_value(head)) {
            self.push(item, Command::Cast(CastCommand::Enter { name, tier }));
        }
    }

    fn leave(&mut self, item: &Item<'_>) {
        if let Some(name) = self.character(item, entry_value(item.head)) {
            self.push(item, Command::Cast(CastCommand::Leave { name }));
        }
    }

    fn scene(&mut self, item: &Item<'_>) {
        let Some((key, value)) = split_field(item.head) else {
            self.reject(
                item,
                DiagnosticCode::Syntax,
                format!("expected `field: value`, found \"{}\"", item.head),
            );
            return;
        };
        let command = match action_key(key).as_str() {
            "locationhint" => SceneCommand::LocationHint(strip_quotes(value).to_string()),
            "scenetags" | "tags" => SceneCommand::ReplaceTags(parse_tags(value)),
            _ => {
                self.reject(
                    item,
                    DiagnosticCode::InvalidArgument,
                    format!("unknown scene field \"{key}\""),
                );
                return;
            }
        };
        self.push(item, Command::Scene(command));
    }
}
