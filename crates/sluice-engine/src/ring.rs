//! Fixed-capacity ring buffer of published snapshots for realtime mode.
//!
//! [`SnapshotRing`] stores `Arc<WorldSnapshot>` slots with single-producer
//! push and multi-consumer read. The visualization layer polls
//! [`latest()`](SnapshotRing::latest) and never blocks the tick thread
//! for longer than one slot lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::snapshot::WorldSnapshot;

/// A tagged slot: the `u64` is the monotonic write position when this
/// snapshot was stored, enabling consumers to detect overwrites.
type Slot = Option<(u64, Arc<WorldSnapshot>)>;

/// A fixed-capacity ring buffer of `Arc<WorldSnapshot>`.
///
/// Single-producer: only the tick thread calls [`push`](SnapshotRing::push).
/// Multi-consumer: any thread can call [`latest`](SnapshotRing::latest).
///
/// The write position is monotonically increasing (never wraps). Slot
/// index is computed as `pos % capacity`. Each slot stores a position
/// tag alongside the snapshot so that consumers can verify they are
/// reading the slot they intended, even under concurrent producer pushes.
pub struct SnapshotRing {
    slots: Vec<Mutex<Slot>>,
    write_pos: AtomicU64,
    capacity: usize,
}

// Compile-time assertion: SnapshotRing must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<SnapshotRing>();
};

impl SnapshotRing {
    /// Create a new ring buffer with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity < 2`. A ring buffer needs at least 2 slots
    /// to be useful (one being written, one readable).
    /// [`EngineConfig::validate()`](crate::EngineConfig::validate)
    /// rejects smaller values before construction.
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity >= 2,
            "SnapshotRing capacity must be >= 2, got {capacity}"
        );
        let slots = (0..capacity).map(|_| Mutex::new(None)).collect();
        Self {
            slots,
            write_pos: AtomicU64::new(0),
            capacity,
        }
    }

    /// Push a new snapshot into the ring. Single-producer only.
    ///
    /// Returns the evicted snapshot (if any) that was displaced.
    pub fn push(&self, snapshot: WorldSnapshot) -> Option<Arc<WorldSnapshot>> {
        let pos = self.write_pos.load(Ordering::Relaxed);
        let slot_idx = (pos as usize) % self.capacity;

        let arc = Arc::new(snapshot);
        let evicted = {
            let mut slot = self.slots[slot_idx].lock().unwrap();
            let prev = slot.take().map(|(_tag, arc)| arc);
            *slot = Some((pos, Arc::clone(&arc)));
            prev
        };

        // Release-store ensures the snapshot data is visible before
        // consumers observe the new write_pos.
        self.write_pos.store(pos + 1, Ordering::Release);

        evicted
    }

    /// Get the latest (most recently pushed) snapshot.
    ///
    /// Returns `None` if no snapshots have been pushed yet, or if the
    /// producer overwrote the slot between the position read and the
    /// lock acquisition.
    pub fn latest(&self) -> Option<Arc<WorldSnapshot>> {
        let pos = self.write_pos.load(Ordering::Acquire);
        if pos == 0 {
            return None;
        }
        let target_pos = pos - 1;
        let slot_idx = (target_pos as usize) % self.capacity;
        let slot = self.slots[slot_idx].lock().unwrap();
        match slot.as_ref() {
            Some((tag, arc)) if *tag == target_pos => Some(Arc::clone(arc)),
            _ => None,
        }
    }

    /// Number of snapshots currently stored (up to `capacity`).
    pub fn len(&self) -> usize {
        let pos = self.write_pos.load(Ordering::Acquire) as usize;
        pos.min(self.capacity)
    }

    /// Whether the ring is empty.
    pub fn is_empty(&self) -> bool {
        self.write_pos.load(Ordering::Acquire) == 0
    }

    /// The ring buffer capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The current monotonic write position.
    pub fn write_pos(&self) -> u64 {
        self.write_pos.load(Ordering::Acquire)
    }
}
