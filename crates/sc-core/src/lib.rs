//! Core types for Statecraft: the parameter/entity schema, the scoped
//! variable store, cast tiers, and the engine state snapshot.
//!
//! This crate holds no parser and performs no I/O besides JSON
//! (de)serialization. The command grammar lives in `sc-dsl` and the
//! mutation/replay machinery in `sc-engine`.

/// Character and location cast tiers.
pub mod cast;
/// Error types used throughout the crate.
pub mod error;
/// Static parameter and entity definitions loaded from a card configuration.
pub mod schema;
/// The point-in-time engine state snapshot.
pub mod state;
/// The scoped variable store.
pub mod store;

/// Re-export cast types.
pub use cast::{CastChange, CastTier, CharacterCast, LocationCast};
/// Re-export error types.
pub use error::{SchemaError, SchemaResult, StoreError, StoreResult};
/// Re-export schema types.
pub use schema::{
    ArrayConfig, CardConfig, CastConfig, EntityDefinition, EntityKind, ItemType,
    ParameterDefinition, ParameterKind, PLAYER_ENTITY, Phase, Schema, Scope,
};
/// Re-export state types.
pub use state::{EngineState, EntityRuntime, SceneMeta};
/// Re-export store types.
pub use store::{Coordinate, VariableStore};

/// Dynamic values held by the store. Structured array items are plain JSON.
pub use serde_json::Value;
