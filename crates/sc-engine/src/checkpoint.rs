use sc_core::EngineState;

/// A cached state after applying turns `0..=index`.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    /// Last history index folded into `state`.
    pub index: usize,
    /// The state at that index.
    pub state: EngineState,
}

/// Storage for checkpoints of one conversation.
///
/// Correctness never depends on a checkpoint being present: every method may
/// be implemented as a no-op.
pub trait CheckpointStore {
    /// The checkpoint with the greatest index not after `index`.
    fn nearest_at_or_before(&self, index: usize) -> Option<&Checkpoint>;

    /// Store a checkpoint, replacing whatever the store chooses to evict.
    fn save(&mut self, checkpoint: Checkpoint);

    /// Drop every checkpoint at or after `index`.
    fn invalidate_from(&mut self, index: usize);

    /// Index of the most advanced checkpoint held.
    fn latest_index(&self) -> Option<usize>;
}

/// In-memory store holding a single checkpoint.
#[derive(Debug, Clone, Default)]
pub struct MemoryCheckpointStore {
    slot: Option<Checkpoint>,
}

impl MemoryCheckpointStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn nearest_at_or_before(&self, index: usize) -> Option<&Checkpoint> {
        self.slot.as_ref().filter(|cp| cp.index <= index)
    }

    fn save(&mut self, checkpoint: Checkpoint) {
        self.slot = Some(checkpoint);
    }

    fn invalidate_from(&mut self, index: usize) {
        if self.slot.as_ref().is_some_and(|cp| cp.index >= index) {
            self.slot = None;
        }
    }

    fn latest_index(&self) -> Option<usize> {
        self.slot.as_ref().map(|cp| cp.index)
    }
}
