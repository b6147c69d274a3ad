use sc_core::{ItemType, StoreError};

/// Alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Host-facing errors: bad configuration or API misuse.
///
/// Imperfect model output never produces one of these; dropped commands
/// are reported as [`crate::apply::Rejection`]s instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// `state_at` was asked for an index past the end of the history.
    #[error("history index {index} is out of range (history has {len} turns)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of turns in the history.
        len: usize,
    },

    /// A lookup named no declared parameter.
    #[error("unknown parameter: \"{0}\"")]
    UnknownParameter(String),

    /// A lookup had the wrong subject/target shape for the parameter's scope.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The delta ladder is not strictly increasing and positive.
    #[error("invalid delta ladder {small}/{medium}/{large}: need 0 < small < medium < large")]
    InvalidLadder {
        /// Requested small step.
        small: f64,
        /// Requested medium step.
        medium: f64,
        /// Requested large step.
        large: f64,
    },
}

/// Why a single `set` command could not be applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MutationError {
    /// The operator is not valid for the parameter's type.
    #[error("operator \"{op}\" is not valid for {kind} parameters")]
    UnknownOperator {
        /// The operator as written.
        op: String,
        /// The parameter's type label.
        kind: &'static str,
    },

    /// A number was expected.
    #[error("\"{0}\" is not a finite number")]
    NotANumber(String),

    /// An enum literal is not among the declared values.
    #[error("\"{0}\" is not a declared enum value")]
    NotInEnum(String),

    /// A boolean literal was neither `true` nor `false`.
    #[error("\"{0}\" is not a boolean")]
    NotABoolean(String),

    /// An array operator needs a value argument.
    #[error("operator \"{0}\" needs a value")]
    MissingValue(String),

    /// A structured value could not be decoded.
    #[error("cannot decode \"{literal}\": {reason}")]
    Decode {
        /// The literal as written.
        literal: String,
        /// Decoder message.
        reason: String,
    },

    /// A decoded item does not match the array's item type.
    #[error("item {0} does not match item type {1}")]
    ItemType(String, ItemType),

    /// `set` on an array did not decode to a list.
    #[error("array value must be a list")]
    NotAList,

    /// An index operator carried an unreadable index.
    #[error("invalid index in \"{0}\"")]
    BadIndex(String),

    /// A cast tier has a ceiling of zero.
    #[error("{0} tier has a ceiling of zero")]
    TierClosed(String),

    /// The command's parameter disappeared from the schema.
    #[error("unknown parameter: \"{0}\"")]
    UnknownParameter(String),

    /// The command's coordinate does not fit the store.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Alias for `Result<T, MutationError>`.
pub type MutationResult<T> = Result<T, MutationError>;
