//! Deterministic hashing for tests that assert exact slot layouts

use std::hash::{BuildHasher, Hasher};

use crate::RobinHoodTable;

/// Hashes an integer key to itself, so its ideal slot is `key % capacity`
#[derive(Debug, Clone)]
pub(crate) struct IdentityHasher(u64);

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 = (self.0 << 8) | u64::from(byte);
        }
    }

    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }

    #[allow(clippy::cast_possible_truncation)]
    fn write_usize(&mut self, n: usize) {
        self.0 = n as u64;
    }
}

/// Builder for [`IdentityHasher`]
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct IdentityState;

impl BuildHasher for IdentityState {
    type Hasher = IdentityHasher;

    fn build_hasher(&self) -> IdentityHasher {
        IdentityHasher(0)
    }
}

/// Occupied slots as `(slot, key, probe length)`, in slot order
pub(crate) fn layout<K: Clone, V, S>(table: &RobinHoodTable<K, V, S>) -> Vec<(usize, K, usize)> {
    table
        .probe_lengths()
        .iter()
        .enumerate()
        .filter_map(|(index, recorded)| Some((index, table.key_at(index)?.clone(), (*recorded)?)))
        .collect()
}
