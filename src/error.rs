//! Error types reported by the table and its diagnostics

use thiserror::Error;

/// Terminal failures of a table operation.
///
/// Neither kind leaves the table partially modified: the operation that reports it
/// has not touched any slot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A full circular pass found no empty slot for a new entry.
    ///
    /// Growth normally runs before the slot array fills up, so seeing this means the
    /// caller skipped the load-factor check or asked `grow_to` for fewer slots than
    /// there are entries.
    #[error("no free slot left in a table of capacity {capacity}")]
    NoFreeSpace {
        /// Capacity of the table that ran out of room
        capacity: usize,
    },
    /// The key to remove is not stored in the table
    #[error("key not found")]
    KeyNotFound,
}

/// The first broken structural invariant found by `RobinHoodTable::validate`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The slot array and the probe length array disagree in length
    #[error("slot array has {slots} entries but probe length array has {probe_lengths}")]
    ArrayLength {
        /// Length of the slot array
        slots: usize,
        /// Length of the probe length array
        probe_lengths: usize,
    },
    /// An occupied slot records a probe length that does not match its key's hash
    #[error("slot {slot} records probe length {recorded:?}, expected {expected}")]
    ProbeLength {
        /// Index of the offending slot
        slot: usize,
        /// Probe length stored for the slot
        recorded: Option<usize>,
        /// Distance from the key's ideal slot
        expected: usize,
    },
    /// An empty slot still carries a probe length
    #[error("empty slot {slot} still records probe length {recorded}")]
    StaleProbeLength {
        /// Index of the offending slot
        slot: usize,
        /// Probe length left behind
        recorded: usize,
    },
    /// A displaced entry directly follows an empty slot, so lookups would stop short
    #[error("slot {slot} is displaced by {recorded} but follows an empty slot")]
    Gap {
        /// Index of the displaced entry
        slot: usize,
        /// Its probe length
        recorded: usize,
    },
    /// An entry is more than one step poorer than its predecessor
    #[error("slot {slot} has probe length {recorded} after a predecessor with {previous}")]
    Displacement {
        /// Index of the offending slot
        slot: usize,
        /// Its probe length
        recorded: usize,
        /// Probe length of the slot before it
        previous: usize,
    },
    /// The stored element count disagrees with the occupied slots
    #[error("tally is {tally} but {occupied} slots are occupied")]
    Tally {
        /// Stored element count
        tally: usize,
        /// Counted occupied slots
        occupied: usize,
    },
}
