use std::fmt;

use serde::{Deserialize, Serialize};

/// Who wrote a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human player.
    User,
    /// The language model.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Zero-based position in the history.
    #[serde(default)]
    pub index: usize,
    /// Author.
    pub role: Role,
    /// Message text, possibly holding commands.
    pub text: String,
}

impl Turn {
    /// Number a sequence of `(role, text)` pairs from zero.
    pub fn numbered<I, S>(turns: I) -> Vec<Turn>
    where
        I: IntoIterator<Item = (Role, S)>,
        S: Into<String>,
    {
        turns
            .into_iter()
            .enumerate()
            .map(|(index, (role, text))| Turn {
                index,
                role,
                text: text.into(),
            })
            .collect()
    }
}

/// Read access to an ordered conversation history.
///
/// The engine only reads turns; hosts that edit history must call
/// [`crate::ReplayEngine::invalidate_from`] afterwards.
pub trait HistoryProvider {
    /// Number of turns.
    fn len(&self) -> usize;

    /// The turn at `index`, if any.
    fn turn(&self, index: usize) -> Option<&Turn>;

    /// Whether the history has no turns.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistoryProvider for Vec<Turn> {
    fn len(&self) -> usize {
        <[Turn]>::len(self)
    }

    fn turn(&self, index: usize) -> Option<&Turn> {
        self.get(index)
    }
}
