use crate::error::{EngineError, EngineResult};
use crate::history::Role;

/// Magnitudes of the symbolic numeric deltas.
///
/// `down_*` is always the negation of the matching `up_*`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaLadder {
    small: f64,
    medium: f64,
    large: f64,
}

impl Default for DeltaLadder {
    fn default() -> Self {
        Self {
            small: 1.0,
            medium: 3.0,
            large: 5.0,
        }
    }
}

impl DeltaLadder {
    /// Build a ladder; requires `0 < small < medium < large`.
    pub fn new(small: f64, medium: f64, large: f64) -> EngineResult<Self> {
        if small > 0.0 && small < medium && medium < large && large.is_finite() {
            Ok(Self {
                small,
                medium,
                large,
            })
        } else {
            Err(EngineError::InvalidLadder {
                small,
                medium,
                large,
            })
        }
    }

    /// The `(small, medium, large)` magnitudes.
    pub fn steps(&self) -> (f64, f64, f64) {
        (self.small, self.medium, self.large)
    }

    /// Signed delta for a symbolic operator such as `up_small` or `down_large`.
    pub fn delta(&self, op: &str) -> Option<f64> {
        let (sign, size) = match op.split_once('_')? {
            ("up", size) => (1.0, size),
            ("down", size) => (-1.0, size),
            _ => return None,
        };
        let magnitude = match size {
            "small" => self.small,
            "medium" => self.medium,
            "large" => self.large,
            _ => return None,
        };
        Some(sign * magnitude)
    }
}

/// Configuration for block application and replay.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Numeric delta magnitudes.
    pub ladder: DeltaLadder,
    /// Roles whose turn text is scanned for commands.
    pub apply_roles: Vec<Role>,
    /// Whether `state_at` refreshes the checkpoint after a replay.
    pub checkpointing: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ladder: DeltaLadder::default(),
            apply_roles: vec![Role::User, Role::Assistant],
            checkpointing: true,
        }
    }
}

impl EngineConfig {
    /// Set the delta ladder.
    pub fn with_ladder(mut self, ladder: DeltaLadder) -> Self {
        self.ladder = ladder;
        self
    }

    /// Set which roles' turns carry commands.
    pub fn with_apply_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.apply_roles = roles.into_iter().collect();
        self
    }

    /// Enable or disable checkpoint refresh.
    pub fn with_checkpointing(mut self, enabled: bool) -> Self {
        self.checkpointing = enabled;
        self
    }

    /// Whether turns by `role` are scanned for commands.
    pub fn applies_to(&self, role: Role) -> bool {
        self.apply_roles.contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ladder_is_one_three_five() {
        let ladder = DeltaLadder::default();
        assert_eq!(ladder.delta("up_small"), Some(1.0));
        assert_eq!(ladder.delta("up_medium"), Some(3.0));
        assert_eq!(ladder.delta("down_large"), Some(-5.0));
        assert_eq!(ladder.delta("up_huge"), None);
        assert_eq!(ladder.delta("sideways_small"), None);
        assert_eq!(ladder.delta("5"), None);
    }

    #[test]
    fn ladder_must_increase() {
        assert!(DeltaLadder::new(2.0, 4.0, 8.0).is_ok());
        assert!(DeltaLadder::new(0.0, 1.0, 2.0).is_err());
        assert!(DeltaLadder::new(3.0, 3.0, 5.0).is_err());
        assert!(DeltaLadder::new(1.0, 5.0, 3.0).is_err());
        assert!(DeltaLadder::new(1.0, 2.0, f64::INFINITY).is_err());
    }

    #[test]
    fn builder_sets_fields() {
        let config = EngineConfig::default()
            .with_apply_roles([Role::Assistant])
            .with_checkpointing(false);
        assert!(config.applies_to(Role::Assistant));
        assert!(!config.applies_to(Role::User));
        assert!(!config.checkpointing);
    }
}
