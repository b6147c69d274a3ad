use std::fmt;

use sc_core::{CastTier, Coordinate};

/// Source span as a byte range into the parsed block.
pub type Span = std::ops::Range<usize>;

/// A node with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    /// The wrapped node.
    pub node: T,
    /// The byte range of this node in the block.
    pub span: Span,
}

/// The command verbs recognised in model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `set(path, op_or_value, ...)`: variable mutation.
    Set,
    /// `cast(action, name, [tier])`: character tiers.
    Cast,
    /// `location(action, [name])`: location tiers.
    Location,
    /// `scene(field, value)`: scene metadata.
    Scene,
    /// `note(entity, text)`: runtime entity notes.
    Note,
}

impl Verb {
    /// Every verb, in the order the scanner looks for them.
    pub const ALL: [Verb; 5] = [
        Verb::Set,
        Verb::Cast,
        Verb::Location,
        Verb::Scene,
        Verb::Note,
    ];

    /// The verb's spelling in source text.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Cast => "cast",
            Self::Location => "location",
            Self::Scene => "scene",
            Self::Note => "note",
        }
    }

    /// Look up a verb by spelling.
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.keyword() == word)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// A single call argument as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    /// Argument text with quotes removed and escapes resolved.
    pub text: String,
    /// Whether the argument was a quoted string literal.
    pub quoted: bool,
}

/// A syntactically valid call, before schema resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// The verb.
    pub verb: Spanned<Verb>,
    /// Positional arguments.
    pub args: Vec<Spanned<Arg>>,
}

/// A variable mutation extracted from a `set(...)` call.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationIntent {
    /// The dotted path exactly as written.
    pub path: String,
    /// The operator, or the direct value for scalar parameters.
    pub operator: String,
    /// The value argument of array operators that carry one.
    pub value_literal: Option<String>,
    /// Free-text justification.
    pub note: Option<String>,
    /// Where the value lives, using the parameter's canonical name.
    pub coordinate: Coordinate,
}

/// A character tier edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastCommand {
    /// Put a character into a tier.
    Enter {
        /// Character name.
        name: String,
        /// Target tier.
        tier: CastTier,
    },
    /// Remove a character from whichever tier holds it.
    Leave {
        /// Character name.
        name: String,
    },
}

/// A location tier edit. Names are resolved to full location paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationCommand {
    /// Replace the current location.
    SetCurrent(String),
    /// Empty the current slot.
    ClearCurrent,
    /// Append a candidate location.
    AddCandidate(String),
    /// Remove a candidate location.
    RemoveCandidate(String),
}

/// A scene metadata edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneCommand {
    /// Replace the location hint.
    LocationHint(String),
    /// Replace the tag list.
    ReplaceTags(Vec<String>),
    /// Append a tag if absent.
    AddTag(String),
    /// Remove a tag.
    RemoveTag(String),
}

/// A fully resolved command, ready for the interpreter.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Variable mutation.
    Set(MutationIntent),
    /// Character tier edit.
    Cast(CastCommand),
    /// Location tier edit.
    Location(LocationCommand),
    /// Scene metadata edit.
    Scene(SceneCommand),
    /// Replace an entity's runtime note.
    Note {
        /// Entity name.
        entity: String,
        /// New note text.
        text: String,
    },
}

impl Command {
    /// The verb this command was written with.
    pub fn verb(&self) -> Verb {
        match self {
            Self::Set(_) => Verb::Set,
            Self::Cast(_) => Verb::Cast,
            Self::Location(_) => Verb::Location,
            Self::Scene(_) => Verb::Scene,
            Self::Note { .. } => Verb::Note,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set(intent) => {
                write!(f, "set {} {}", intent.path, intent.operator)?;
                if let Some(value) = &intent.value_literal {
                    write!(f, " {value}")?;
                }
                if let Some(note) = &intent.note {
                    write!(f, " ({note})")?;
                }
                Ok(())
            }
            Self::Cast(CastCommand::Enter { name, tier }) => write!(f, "cast enter {name} {tier}"),
            Self::Cast(CastCommand::Leave { name }) => write!(f, "cast leave {name}"),
            Self::Location(LocationCommand::SetCurrent(path)) => {
                write!(f, "location current {path}")
            }
            Self::Location(LocationCommand::ClearCurrent) => write!(f, "location clear_current"),
            Self::Location(LocationCommand::AddCandidate(path)) => {
                write!(f, "location add_candidate {path}")
            }
            Self::Location(LocationCommand::RemoveCandidate(path)) => {
                write!(f, "location remove_candidate {path}")
            }
            Self::Scene(SceneCommand::LocationHint(hint)) => {
                write!(f, "scene location_hint {hint}")
            }
            Self::Scene(SceneCommand::ReplaceTags(tags)) => {
                write!(f, "scene tags [{}]", tags.join(", "))
            }
            Self::Scene(SceneCommand::AddTag(tag)) => write!(f, "scene add_tag {tag}"),
            Self::Scene(SceneCommand::RemoveTag(tag)) => write!(f, "scene remove_tag {tag}"),
            Self::Note { entity, text } => write!(f, "note {entity} {text}"),
        }
    }
}
