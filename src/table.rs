use std::{
    borrow::Borrow,
    collections::hash_map::RandomState,
    hash::{BuildHasher, Hash},
    iter, mem, slice, vec,
};

use crate::{
    error::{InvariantViolation, TableError},
    sizes::next_good_size,
};

/// A stored key-value pair
#[derive(Debug, Clone)]
struct Entry<K, V> {
    /// The key in the key-value pair
    key: K,
    /// The value associated with the key
    value: V,
}

/// Where an insertion scan landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// The key is already stored at this slot
    Match(usize),
    /// The key belongs at `index` with probe length `distance`.
    ///
    /// The slot is either empty or held by an entry with a shorter probe length, which
    /// gets displaced when the new entry is written.
    Claim {
        /// Slot the new entry is written to
        index: usize,
        /// Probe length of the new entry at that slot
        distance: usize,
    },
}

/// Builds an array of `capacity` empty slots
fn empty_slots<K, V>(capacity: usize) -> Vec<Option<Entry<K, V>>> {
    iter::repeat_with(|| None).take(capacity).collect()
}

/// An open-addressing hash table with Robin Hood displacement.
///
/// Entries live in a circular slot array. A parallel array records, for every occupied
/// slot, the probe sequence length (PSL): how many steps the entry sits past its ideal
/// slot `hash(key) % capacity`. On insertion an incoming entry takes the slot of any
/// occupant that is closer to home than the incoming entry is at that point, and the
/// occupant moves further along. Deletion shifts the following displaced entries one
/// slot back, so the table never needs tombstones.
///
/// The table never grows on its own. Callers decide when to call [`grow`](Self::grow);
/// [`RobinHoodMap`](crate::RobinHoodMap) does so based on its load factor.
///
/// Note: This implementation is not thread-safe.
#[derive(Debug, Clone)]
pub struct RobinHoodTable<K, V, S = RandomState> {
    /// The slot array
    slots: Vec<Option<Entry<K, V>>>,
    /// Probe sequence length of each slot, `None` exactly when the slot is empty
    probe_lengths: Vec<Option<usize>>,
    /// Number of occupied slots
    tally: usize,
    /// Builds the hasher used to place keys
    hash_builder: S,
}

impl<K, V> RobinHoodTable<K, V, RandomState> {
    /// Creates an empty table sized for `size_hint`, rounded up to a good capacity
    #[must_use]
    pub fn with_capacity(size_hint: usize) -> Self {
        Self::with_capacity_and_hasher(size_hint, RandomState::new())
    }
}

impl<K, V, S> RobinHoodTable<K, V, S> {
    /// Creates an empty table sized for `size_hint`, rounded up to a good capacity
    pub fn with_capacity_and_hasher(size_hint: usize, hash_builder: S) -> Self {
        Self::with_exact_capacity_and_hasher(next_good_size(size_hint), hash_builder)
    }

    /// Creates an empty table with exactly `capacity` slots (at least one).
    ///
    /// Skips the good-size rounding, which makes slot layouts predictable when paired
    /// with a deterministic hasher.
    pub fn with_exact_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: empty_slots(capacity),
            probe_lengths: vec![None; capacity],
            tally: 0,
            hash_builder,
        }
    }

    /// Returns the number of slots
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of stored entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.tally
    }

    /// Returns true if the table holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tally == 0
    }

    /// Returns the hasher builder
    #[must_use]
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Probe sequence length of every slot, `None` for empty slots
    #[must_use]
    pub fn probe_lengths(&self) -> &[Option<usize>] {
        &self.probe_lengths
    }

    /// Longest probe sequence among the stored entries
    #[must_use]
    pub fn max_probe_length(&self) -> Option<usize> {
        self.probe_lengths.iter().flatten().copied().max()
    }

    /// Returns the key stored at `index`, if that slot is occupied
    #[must_use]
    pub fn key_at(&self, index: usize) -> Option<&K> {
        self.slots.get(index)?.as_ref().map(|entry| &entry.key)
    }

    /// Removes every entry, keeping the capacity
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        for recorded in &mut self.probe_lengths {
            *recorded = None;
        }
        self.tally = 0;
    }

    /// Returns an iterator over the key-value pairs in slot order
    #[must_use]
    #[allow(clippy::iter_without_into_iter)]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { slots: self.slots.iter(), remaining: self.tally }
    }

    /// Returns an iterator over the key-value pairs with mutable values
    #[must_use]
    #[allow(clippy::iter_without_into_iter)]
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut { slots: self.slots.iter_mut(), remaining: self.tally }
    }

    /// Slot that follows `index`, wrapping around the end of the array
    fn next_slot(&self, index: usize) -> usize {
        let next = index.saturating_add(1);
        if next >= self.capacity() { 0 } else { next }
    }

    /// Error reported when no slot is left for a new entry
    fn no_free_space(&self) -> TableError {
        TableError::NoFreeSpace { capacity: self.capacity() }
    }

    /// Writes `entry` at `index` with probe length `distance`, displacing occupants.
    ///
    /// Whenever the visited slot holds an entry with a shorter probe length than the one
    /// being carried, the two swap places and the evicted entry is carried on. The chain
    /// ends at the first empty slot.
    fn place_entry(
        &mut self,
        index: usize,
        distance: usize,
        entry: Entry<K, V>,
    ) -> Result<(), TableError> {
        let mut index = index;
        let mut carried = entry;
        let mut carried_length = distance;

        for _ in 0..self.capacity() {
            let (Some(slot), Some(recorded)) =
                (self.slots.get_mut(index), self.probe_lengths.get_mut(index))
            else {
                break;
            };

            if slot.is_none() {
                *slot = Some(carried);
                *recorded = Some(carried_length);
                self.tally = self.tally.saturating_add(1);
                return Ok(());
            }

            if let Some(occupant) = slot.as_mut() {
                match *recorded {
                    Some(occupant_length) if occupant_length < carried_length => {
                        log::trace!(
                            "slot {index}: probe length {carried_length} steals from {occupant_length}"
                        );
                        mem::swap(occupant, &mut carried);
                        *recorded = Some(carried_length);
                        carried_length = occupant_length;
                    }
                    _ => {}
                }
            }

            carried_length = carried_length.saturating_add(1);
            index = self.next_slot(index);
        }

        Err(self.no_free_space())
    }

    /// Closes the hole left at `vacated` by shifting displaced successors back one slot.
    ///
    /// Stops at the first empty slot or the first entry already at its ideal slot.
    fn fix_collisions_from(&mut self, vacated: usize) {
        let mut hole = vacated;

        for _ in 1..self.capacity() {
            let next = self.next_slot(hole);
            let Some(&Some(length)) = self.probe_lengths.get(next) else {
                break;
            };
            if length == 0 {
                break;
            }

            self.slots.swap(hole, next);
            self.probe_lengths.swap(hole, next);
            if let Some(shifted) = self.probe_lengths.get_mut(hole) {
                *shifted = Some(length.saturating_sub(1));
            }
            hole = next;
        }
    }

    /// Removes the entry at `index` and restores the layout behind it
    fn take_at(&mut self, index: usize) -> Option<Entry<K, V>> {
        let entry = self.slots.get_mut(index)?.take()?;
        if let Some(recorded) = self.probe_lengths.get_mut(index) {
            *recorded = None;
        }
        self.tally = self.tally.saturating_sub(1);
        self.fix_collisions_from(index);
        Some(entry)
    }
}

impl<K, V, S> RobinHoodTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Slot a key would occupy with no collisions
    #[allow(clippy::cast_possible_truncation, clippy::arithmetic_side_effects)]
    fn ideal_slot<Q: Hash + ?Sized>(&self, key: &Q) -> usize {
        let hash = self.hash_builder.hash_one(key);
        // capacity is never zero and the remainder is below it
        (hash % self.capacity() as u64) as usize
    }

    /// Finds the slot holding `key`.
    ///
    /// The walk ends at an empty slot, or as soon as it has gone further than the
    /// visited occupant's probe length: an insertion would have claimed that slot, so
    /// the key cannot be stored beyond it.
    fn find_slot<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut index = self.ideal_slot(key);

        for distance in 0..self.capacity() {
            let entry = self.slots.get(index)?.as_ref()?;
            if entry.key.borrow() == key {
                return Some(index);
            }
            match self.probe_lengths.get(index) {
                Some(&Some(length)) if length >= distance => {}
                _ => return None,
            }
            index = self.next_slot(index);
        }

        None
    }

    /// Scans for the slot `key` should be written to, or the slot already holding it
    fn scan_for_insertion(&self, key: &K) -> Result<Probe, TableError> {
        let mut index = self.ideal_slot(key);

        for distance in 0..self.capacity() {
            let (Some(slot), Some(recorded)) = (self.slots.get(index), self.probe_lengths.get(index))
            else {
                break;
            };

            match (slot, recorded) {
                (None, _) => return Ok(Probe::Claim { index, distance }),
                (Some(entry), _) if entry.key == *key => return Ok(Probe::Match(index)),
                (Some(_), Some(length)) if *length < distance => {
                    return self.claim_occupied(index, distance);
                }
                _ => {}
            }

            index = self.next_slot(index);
        }

        Err(self.no_free_space())
    }

    /// Scans for the slot a key known to be absent should be written to
    fn scan_for_vacancy(&self, key: &K) -> Result<Probe, TableError> {
        let mut index = self.ideal_slot(key);

        for distance in 0..self.capacity() {
            match self.probe_lengths.get(index) {
                Some(None) => return Ok(Probe::Claim { index, distance }),
                Some(Some(length)) if *length < distance => {
                    return self.claim_occupied(index, distance);
                }
                Some(Some(_)) => {}
                None => break,
            }
            index = self.next_slot(index);
        }

        Err(self.no_free_space())
    }

    /// Claims an occupied slot, provided the evicted entry will find room elsewhere
    fn claim_occupied(&self, index: usize, distance: usize) -> Result<Probe, TableError> {
        if self.tally >= self.capacity() {
            return Err(self.no_free_space());
        }
        Ok(Probe::Claim { index, distance })
    }

    /// Probe length an entry for `key` has when stored at `index`
    #[allow(clippy::arithmetic_side_effects)]
    fn distance_from_ideal(&self, key: &K, index: usize) -> usize {
        let ideal = self.ideal_slot(key);
        // both indices are below capacity
        (index + self.capacity() - ideal) % self.capacity()
    }

    /// Retrieves the value stored for `key`
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Retrieves the stored key and value for `key`
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.find_slot(key)?;
        let entry = self.slots.get(index)?.as_ref()?;
        Some((&entry.key, &entry.value))
    }

    /// Retrieves a mutable reference to the value stored for `key`
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.find_slot(key)?;
        self.slots.get_mut(index)?.as_mut().map(|entry| &mut entry.value)
    }

    /// Returns true if `key` is stored in the table
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find_slot(key).is_some()
    }

    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// An existing entry keeps its slot and only has its value overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NoFreeSpace`] if the key is new and every slot is taken.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        self.add_or_overwrite((key, value))
    }

    /// Stores a prepared key-value pair, returning the value it replaced
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NoFreeSpace`] if the key is new and every slot is taken.
    pub fn add_or_overwrite(&mut self, (key, value): (K, V)) -> Result<Option<V>, TableError> {
        match self.scan_for_insertion(&key)? {
            Probe::Match(index) => Ok(self
                .slots
                .get_mut(index)
                .and_then(Option::as_mut)
                .map(|entry| mem::replace(&mut entry.value, value))),
            Probe::Claim { index, distance } => {
                self.place_entry(index, distance, Entry { key, value })?;
                Ok(None)
            }
        }
    }

    /// Updates the value stored for `key`, or inserts a fresh one.
    ///
    /// On a hit the value is replaced with `update(&current)`. On a miss `initial` is
    /// called once to produce the value to insert; it is never called on a hit.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NoFreeSpace`] if the key is new and every slot is taken.
    /// `initial` is not called in that case.
    pub fn update_or_insert<U, I>(
        &mut self,
        key: K,
        update: U,
        initial: I,
    ) -> Result<&mut V, TableError>
    where
        U: FnOnce(&V) -> V,
        I: FnOnce() -> V,
    {
        let index = match self.scan_for_insertion(&key)? {
            Probe::Match(index) => {
                if let Some(entry) = self.slots.get_mut(index).and_then(Option::as_mut) {
                    entry.value = update(&entry.value);
                }
                index
            }
            Probe::Claim { index, distance } => {
                let value = initial();
                self.place_entry(index, distance, Entry { key, value })?;
                index
            }
        };

        self.slots
            .get_mut(index)
            .and_then(Option::as_mut)
            .map(|entry| &mut entry.value)
            .ok_or(TableError::KeyNotFound)
    }

    /// Removes `key` and returns its value.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::KeyNotFound`] if the key is not stored.
    pub fn remove_key<Q>(&mut self, key: &Q) -> Result<V, TableError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.find_slot(key).ok_or(TableError::KeyNotFound)?;
        self.take_at(index).map(|entry| entry.value).ok_or(TableError::KeyNotFound)
    }

    /// Removes `key` and returns its value, or the result of `fallback` if it is absent.
    ///
    /// `fallback` runs at most once, and only on a miss.
    pub fn remove_key_or_else<Q, F>(&mut self, key: &Q, fallback: F) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce() -> V,
    {
        self.remove_key(key).unwrap_or_else(|_| fallback())
    }

    /// Doubles the table, rounded up to the next good capacity
    ///
    /// # Errors
    ///
    /// Propagates [`grow_to`](Self::grow_to) failures, which cannot occur for a larger
    /// capacity.
    pub fn grow(&mut self) -> Result<(), TableError> {
        let target = next_good_size(self.capacity().saturating_mul(2));
        log::debug!("growing table from {} to {target} slots ({} entries)", self.capacity(), self.tally);
        self.grow_to(target)
    }

    /// Rebuilds the table with exactly `capacity` slots (at least one).
    ///
    /// Every entry is reinserted in the old slot order and its probe length recomputed
    /// against the new capacity.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NoFreeSpace`] without touching the table if `capacity` is
    /// smaller than the number of stored entries.
    pub fn grow_to(&mut self, capacity: usize) -> Result<(), TableError> {
        let capacity = capacity.max(1);
        if capacity < self.tally {
            return Err(TableError::NoFreeSpace { capacity });
        }

        let old_slots = mem::replace(&mut self.slots, empty_slots(capacity));
        self.probe_lengths = vec![None; capacity];
        self.tally = 0;

        for entry in old_slots.into_iter().flatten() {
            if let Probe::Claim { index, distance } = self.scan_for_vacancy(&entry.key)? {
                self.place_entry(index, distance, entry)?;
            }
        }

        Ok(())
    }

    /// Rebuilds the table at its current capacity, recomputing every slot from the hash
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature follows [`grow_to`](Self::grow_to).
    pub fn rehash(&mut self) -> Result<(), TableError> {
        log::debug!("rehashing {} entries in place", self.tally);
        self.grow_to(self.capacity())
    }

    /// Checks the structural invariants of the table.
    ///
    /// Every occupied slot must record its distance from the key's ideal slot, empty
    /// slots must record nothing, no displaced entry may follow an empty slot, no entry
    /// may be more than one step poorer than its predecessor, and the tally must match
    /// the occupied slots.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, scanning in slot order.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if self.slots.len() != self.probe_lengths.len() {
            return Err(InvariantViolation::ArrayLength {
                slots: self.slots.len(),
                probe_lengths: self.probe_lengths.len(),
            });
        }

        let mut occupied: usize = 0;
        let mut previous = self.probe_lengths.last().copied().flatten();

        for (slot, (entry, &recorded)) in self.slots.iter().zip(&self.probe_lengths).enumerate() {
            match (entry, recorded) {
                (Some(entry), recorded) => {
                    occupied = occupied.saturating_add(1);
                    let expected = self.distance_from_ideal(&entry.key, slot);
                    if recorded != Some(expected) {
                        return Err(InvariantViolation::ProbeLength { slot, recorded, expected });
                    }
                    match previous {
                        None if expected > 0 => {
                            return Err(InvariantViolation::Gap { slot, recorded: expected });
                        }
                        Some(before) if expected > before.saturating_add(1) => {
                            return Err(InvariantViolation::Displacement {
                                slot,
                                recorded: expected,
                                previous: before,
                            });
                        }
                        _ => {}
                    }
                }
                (None, Some(recorded)) => {
                    return Err(InvariantViolation::StaleProbeLength { slot, recorded });
                }
                (None, None) => {}
            }
            previous = recorded;
        }

        if occupied != self.tally {
            return Err(InvariantViolation::Tally { tally: self.tally, occupied });
        }
        Ok(())
    }
}

/// Iterator over the key-value pairs of a table
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    /// Remaining slots
    slots: slice::Iter<'a, Option<Entry<K, V>>>,
    /// Entries not yet yielded
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.slots.find_map(Option::as_ref)?;
        self.remaining = self.remaining.saturating_sub(1);
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over the key-value pairs of a table with mutable values
#[derive(Debug)]
pub struct IterMut<'a, K, V> {
    /// Remaining slots
    slots: slice::IterMut<'a, Option<Entry<K, V>>>,
    /// Entries not yet yielded
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.slots.find_map(Option::as_mut)?;
        self.remaining = self.remaining.saturating_sub(1);
        Some((&entry.key, &mut entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// Owning iterator over the key-value pairs of a table
#[derive(Debug)]
pub struct IntoIter<K, V> {
    /// Remaining slots
    slots: vec::IntoIter<Option<Entry<K, V>>>,
    /// Entries not yet yielded
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.slots.by_ref().flatten().next()?;
        self.remaining = self.remaining.saturating_sub(1);
        Some((entry.key, entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V, S> IntoIterator for RobinHoodTable<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { slots: self.slots.into_iter(), remaining: self.tally }
    }
}
