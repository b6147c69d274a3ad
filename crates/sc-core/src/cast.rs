use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::CharacterCastLimits;

/// A character cast tier, ordered from most to least prominent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CastTier {
    /// Characters the scene is about right now.
    Focus,
    /// Characters present but not central.
    PresentSupporting,
    /// Characters absent but relevant.
    OffstageRelated,
}

impl CastTier {
    /// All tiers, most prominent first.
    pub const ALL: [CastTier; 3] = [
        CastTier::Focus,
        CastTier::PresentSupporting,
        CastTier::OffstageRelated,
    ];

    /// Parse a tier name. Case, `_`, `-` and spaces are ignored, and the
    /// short forms `present`, `supporting` and `offstage` are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "focus" => Some(Self::Focus),
            "presentsupporting" | "present" | "supporting" => Some(Self::PresentSupporting),
            "offstagerelated" | "offstage" | "related" => Some(Self::OffstageRelated),
            _ => None,
        }
    }

    /// The ceiling for this tier.
    pub fn limit(self, limits: &CharacterCastLimits) -> usize {
        match self {
            Self::Focus => limits.max_focus,
            Self::PresentSupporting => limits.max_present_supporting,
            Self::OffstageRelated => limits.max_offstage_related,
        }
    }
}

impl fmt::Display for CastTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Focus => write!(f, "focus"),
            Self::PresentSupporting => write!(f, "presentSupporting"),
            Self::OffstageRelated => write!(f, "offstageRelated"),
        }
    }
}

/// Outcome of a cast insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastChange {
    /// The member was not in any tier and was appended.
    Inserted {
        /// Members dropped from the front of the tier to respect its ceiling.
        evicted: Vec<String>,
    },
    /// The member moved from another tier.
    Moved {
        /// The tier it left.
        from: CastTier,
        /// Members dropped from the front of the tier to respect its ceiling.
        evicted: Vec<String>,
    },
    /// The member was already in the tier and moved to its back.
    Affirmed,
    /// The request had no effect.
    Ignored,
    /// The tier's ceiling is zero.
    Rejected,
}

/// The three ordered character tiers.
///
/// Tiers are pairwise disjoint; within a tier, older members come first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterCast {
    focus: Vec<String>,
    present_supporting: Vec<String>,
    offstage_related: Vec<String>,
}

impl CharacterCast {
    /// Create an empty cast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Members of a tier, oldest first.
    pub fn members(&self, tier: CastTier) -> &[String] {
        match tier {
            CastTier::Focus => &self.focus,
            CastTier::PresentSupporting => &self.present_supporting,
            CastTier::OffstageRelated => &self.offstage_related,
        }
    }

    fn members_mut(&mut self, tier: CastTier) -> &mut Vec<String> {
        match tier {
            CastTier::Focus => &mut self.focus,
            CastTier::PresentSupporting => &mut self.present_supporting,
            CastTier::OffstageRelated => &mut self.offstage_related,
        }
    }

    /// The tier `name` currently sits in.
    pub fn tier_of(&self, name: &str) -> Option<CastTier> {
        CastTier::ALL
            .into_iter()
            .find(|&tier| self.members(tier).iter().any(|m| m == name))
    }

    /// Whether every tier is empty.
    pub fn is_empty(&self) -> bool {
        CastTier::ALL
            .into_iter()
            .all(|tier| self.members(tier).is_empty())
    }

    /// Put `name` at the back of `tier`, removing it from any other tier.
    ///
    /// When the tier overflows its ceiling the front members are evicted.
    /// A ceiling of zero leaves the cast untouched.
    pub fn enter(&mut self, name: &str, tier: CastTier, limits: &CharacterCastLimits) -> CastChange {
        let limit = tier.limit(limits);
        if limit == 0 {
            return CastChange::Rejected;
        }

        let from = self.tier_of(name);
        if let Some(from) = from {
            self.members_mut(from).retain(|m| m != name);
        }

        let members = self.members_mut(tier);
        members.push(name.to_string());
        let overflow = members.len().saturating_sub(limit);
        let evicted: Vec<String> = members.drain(..overflow).collect();

        match from {
            Some(from) if from == tier => CastChange::Affirmed,
            Some(from) => CastChange::Moved { from, evicted },
            None => CastChange::Inserted { evicted },
        }
    }

    /// Remove `name` from whichever tier holds it.
    pub fn leave(&mut self, name: &str) -> Option<CastTier> {
        let tier = self.tier_of(name)?;
        self.members_mut(tier).retain(|m| m != name);
        Some(tier)
    }
}

/// The current location and the ordered candidate locations.
///
/// The current location never appears among the candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCast {
    current: Option<String>,
    candidate: Vec<String>,
}

impl LocationCast {
    /// Create an empty location cast.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current location's full path.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Candidate location paths, oldest first.
    pub fn candidates(&self) -> &[String] {
        &self.candidate
    }

    /// Make `path` the current location. The previous current location is
    /// dropped, not demoted to a candidate.
    pub fn set_current(&mut self, path: &str) -> CastChange {
        if self.current.as_deref() == Some(path) {
            return CastChange::Affirmed;
        }
        self.candidate.retain(|c| c != path);
        self.current = Some(path.to_string());
        CastChange::Inserted {
            evicted: Vec::new(),
        }
    }

    /// Forget the current location.
    pub fn clear_current(&mut self) -> Option<String> {
        self.current.take()
    }

    /// Append `path` to the candidates, evicting the oldest beyond `max`.
    pub fn add_candidate(&mut self, path: &str, max: usize) -> CastChange {
        if self.current.as_deref() == Some(path) {
            return CastChange::Ignored;
        }
        if max == 0 {
            return CastChange::Rejected;
        }
        let existed = self.candidate.iter().any(|c| c == path);
        self.candidate.retain(|c| c != path);
        self.candidate.push(path.to_string());
        let overflow = self.candidate.len().saturating_sub(max);
        let evicted: Vec<String> = self.candidate.drain(..overflow).collect();
        if existed {
            CastChange::Affirmed
        } else {
            CastChange::Inserted { evicted }
        }
    }

    /// Remove `path` from the candidates.
    pub fn remove_candidate(&mut self, path: &str) -> bool {
        let before = self.candidate.len();
        self.candidate.retain(|c| c != path);
        self.candidate.len() != before
    }
}
