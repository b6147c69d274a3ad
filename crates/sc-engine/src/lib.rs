//! Mutation and replay for Statecraft.
//!
//! [`apply_block`] turns one block of model output into the next
//! [`EngineState`](sc_core::EngineState). [`ReplayEngine`] folds a whole
//! conversation history through it, caching progress in a
//! [`CheckpointStore`] that is always safe to discard.

/// Block application and rejection reporting.
pub mod apply;
/// Checkpoint types and stores.
pub mod checkpoint;
/// Engine configuration and the numeric delta ladder.
pub mod config;
/// Error types for the engine crate.
pub mod error;
/// Conversation history types.
pub mod history;
/// Typed value transitions for `set` commands.
pub mod interpreter;
/// Read helpers over a resolved state.
pub mod query;
/// The checkpointed replay engine.
pub mod replay;

/// Re-exports of [`apply::apply_block`], [`apply::apply_block_report`] and report types.
pub use apply::{BlockReport, RejectReason, Rejection, apply_block, apply_block_report};
/// Re-exports of [`checkpoint::Checkpoint`], [`checkpoint::CheckpointStore`], and [`checkpoint::MemoryCheckpointStore`].
pub use checkpoint::{Checkpoint, CheckpointStore, MemoryCheckpointStore};
/// Re-exports of [`config::DeltaLadder`] and [`config::EngineConfig`].
pub use config::{DeltaLadder, EngineConfig};
/// Re-exports of the engine error types.
pub use error::{EngineError, EngineResult, MutationError};
/// Re-exports of [`history::HistoryProvider`], [`history::Role`], and [`history::Turn`].
pub use history::{HistoryProvider, Role, Turn};
/// Re-exports of the query helpers.
pub use query::{SceneInfo, current_phase, parameter_value, scene_info};
/// Re-export of [`replay::ReplayEngine`].
pub use replay::ReplayEngine;
