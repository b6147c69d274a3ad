use crate::schema::Scope;

/// Alias for `Result<T, SchemaError>`.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while loading or validating a card configuration.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The card JSON could not be decoded.
    #[error("invalid card configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Two parameters share a name.
    #[error("duplicate parameter name: \"{0}\"")]
    DuplicateParameter(String),

    /// Two parameters share an id.
    #[error("duplicate parameter id: \"{0}\"")]
    DuplicateParameterId(String),

    /// Two entities share a name.
    #[error("duplicate entity name: \"{0}\"")]
    DuplicateEntity(String),

    /// A location names a parent that does not exist or is not a location.
    #[error("location \"{location}\" has unknown parent location \"{parent}\"")]
    UnknownParentLocation {
        /// The location declaring the parent.
        location: String,
        /// The unresolved parent name.
        parent: String,
    },

    /// Following `parentLocation` links returns to the starting location.
    #[error("location \"{0}\" is its own ancestor")]
    LocationCycle(String),

    /// A character entity declares a parent location.
    #[error("entity \"{0}\" is not a location but declares a parent location")]
    ParentOnNonLocation(String),

    /// An enum parameter declares no values.
    #[error("enum parameter \"{0}\" declares no values")]
    EmptyEnum(String),

    /// A number parameter declares `min > max`.
    #[error("number parameter \"{name}\" has min {min} greater than max {max}")]
    InvertedBounds {
        /// The parameter name.
        name: String,
        /// The declared lower bound.
        min: f64,
        /// The declared upper bound.
        max: f64,
    },

    /// A parameter default does not fit its declared type.
    #[error("default value of parameter \"{0}\" does not match its type")]
    InvalidDefault(String),
}

/// Usage errors raised by the variable store.
///
/// These indicate a host programming error, never imperfect model output.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// A character or relationship lookup was made without a subject.
    #[error("parameter \"{param}\" has {scope} scope and needs a subject")]
    MissingSubject {
        /// The scope of the lookup.
        scope: Scope,
        /// The parameter name.
        param: String,
    },

    /// A relationship lookup was made without a target.
    #[error("parameter \"{0}\" has relationship scope and needs a target")]
    MissingTarget(String),

    /// A subject was given for a global or scene parameter.
    #[error("parameter \"{param}\" has {scope} scope and takes no subject")]
    UnexpectedSubject {
        /// The scope of the lookup.
        scope: Scope,
        /// The parameter name.
        param: String,
    },

    /// A target was given for a non-relationship parameter.
    #[error("parameter \"{param}\" has {scope} scope and takes no target")]
    UnexpectedTarget {
        /// The scope of the lookup.
        scope: Scope,
        /// The parameter name.
        param: String,
    },
}
