use tracing::{debug, trace};

use sc_core::{EngineState, Schema};

use crate::apply::apply_block;
use crate::checkpoint::{Checkpoint, CheckpointStore, MemoryCheckpointStore};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::history::HistoryProvider;

/// Deterministic replay of a conversation's command history.
///
/// The state at index `i` is the initial state with turns `0..=i` applied.
/// One engine serves one conversation; it is driven through `&mut self`, so
/// replays of the same conversation never overlap.
#[derive(Debug)]
pub struct ReplayEngine<H, C = MemoryCheckpointStore> {
    schema: Schema,
    config: EngineConfig,
    history: H,
    checkpoints: C,
    initial: EngineState,
}

impl<H: HistoryProvider> ReplayEngine<H, MemoryCheckpointStore> {
    /// Create an engine with an in-memory checkpoint store.
    pub fn new(schema: Schema, history: H, config: EngineConfig) -> Self {
        Self::with_checkpoint_store(schema, history, config, MemoryCheckpointStore::new())
    }
}

impl<H: HistoryProvider, C: CheckpointStore> ReplayEngine<H, C> {
    /// Create an engine with a caller-supplied checkpoint store.
    pub fn with_checkpoint_store(
        schema: Schema,
        history: H,
        config: EngineConfig,
        checkpoints: C,
    ) -> Self {
        let initial = EngineState::initial(&schema);
        Self {
            schema,
            config,
            history,
            checkpoints,
            initial,
        }
    }

    /// The schema every block is resolved against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read access to the history.
    pub fn history(&self) -> &H {
        &self.history
    }

    /// Mutable access to the history.
    ///
    /// After editing, call [`Self::invalidate_from`] with the first changed index.
    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    /// The state before any turn is applied.
    pub fn initial_state(&self) -> EngineState {
        self.initial.clone()
    }

    /// The state after applying turns `0..=index`.
    ///
    /// Starts from the nearest checkpoint at or before `index` when one
    /// exists, otherwise from the initial state.
    pub fn state_at(&mut self, index: usize) -> EngineResult<EngineState> {
        let len = self.history.len();
        if index >= len {
            return Err(EngineError::IndexOutOfRange { index, len });
        }

        let (mut state, start) = match self.checkpoints.nearest_at_or_before(index) {
            Some(cp) => {
                debug!(index, checkpoint = cp.index, "checkpoint_hit");
                (cp.state.clone(), cp.index + 1)
            }
            None => (self.initial.clone(), 0),
        };
        debug!(index, start, turns = index + 1 - start, "replay_start");

        for i in start..=index {
            let Some(turn) = self.history.turn(i) else {
                return Err(EngineError::IndexOutOfRange { index: i, len });
            };
            if !self.config.applies_to(turn.role) {
                trace!(index = i, role = %turn.role, "turn_skipped");
                continue;
            }
            state = apply_block(&turn.text, &state, &self.schema, &self.config);
        }

        if self.config.checkpointing
            && self
                .checkpoints
                .latest_index()
                .is_none_or(|latest| latest < index)
        {
            self.checkpoints.save(Checkpoint {
                index,
                state: state.clone(),
            });
            debug!(index, "checkpoint_refreshed");
        }

        Ok(state)
    }

    /// The state after the last turn, or the initial state for an empty history.
    pub fn latest_state(&mut self) -> EngineResult<EngineState> {
        match self.history.len() {
            0 => Ok(self.initial_state()),
            len => self.state_at(len - 1),
        }
    }

    /// Drop checkpoints at or after `index`, e.g. after the host edits turn `index`.
    pub fn invalidate_from(&mut self, index: usize) {
        self.checkpoints.invalidate_from(index);
        debug!(index, "checkpoints_invalidated");
    }

    /// Index of the most advanced checkpoint, if any.
    pub fn checkpoint_info(&self) -> Option<usize> {
        self.checkpoints.latest_index()
    }
}
