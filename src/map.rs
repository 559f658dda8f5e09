use std::{
    borrow::Borrow,
    collections::hash_map::RandomState,
    fmt,
    hash::{BuildHasher, Hash},
};

use crate::{
    error::TableError,
    table::{IntoIter, Iter, IterMut, RobinHoodTable},
};

/// Size hint used by [`RobinHoodMap::new`]
pub const DEFAULT_SIZE_HINT: usize = 32;

/// Default load factor threshold, in percent
pub const DEFAULT_LOAD_FACTOR_THRESHOLD: usize = 75;

/// A hash map built on a [`RobinHoodTable`].
///
/// The map owns the growth policy: before an insertion that could push the load factor
/// past its threshold, the table is grown to the next good capacity of at least twice
/// its size. Lookups, updates and removals go straight to the table.
///
/// Note: This implementation is not thread-safe.
#[derive(Clone)]
pub struct RobinHoodMap<K, V, S = RandomState> {
    /// The slot table holding the entries
    table: RobinHoodTable<K, V, S>,
    /// Threshold for load factor before growing - stored as percentage (1-95)
    load_factor_threshold: usize,
}

impl<K, V> RobinHoodMap<K, V, RandomState> {
    /// Creates an empty map with the default size hint
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SIZE_HINT)
    }

    /// Creates an empty map whose table is sized for `size_hint` slots
    #[must_use]
    pub fn with_capacity(size_hint: usize) -> Self {
        Self::with_capacity_and_hasher(size_hint, RandomState::new())
    }
}

impl<K, V, S> RobinHoodMap<K, V, S> {
    /// Creates an empty map with the default size hint and the given hasher builder
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_SIZE_HINT, hash_builder)
    }

    /// Creates an empty map sized for `size_hint` slots with the given hasher builder
    pub fn with_capacity_and_hasher(size_hint: usize, hash_builder: S) -> Self {
        Self::from_table(RobinHoodTable::with_capacity_and_hasher(size_hint, hash_builder))
    }

    /// Wraps an existing table
    pub fn from_table(table: RobinHoodTable<K, V, S>) -> Self {
        Self { table, load_factor_threshold: DEFAULT_LOAD_FACTOR_THRESHOLD }
    }

    /// Read-only access to the underlying table, for probe length diagnostics
    #[must_use]
    pub fn table(&self) -> &RobinHoodTable<K, V, S> {
        &self.table
    }

    /// Returns the number of elements in the map
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if the map is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of slots in the table
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the current load factor of the map
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    /// Returns the load factor threshold, in percent
    #[must_use]
    pub fn load_factor_threshold(&self) -> usize {
        self.load_factor_threshold
    }

    /// Provide a way to configure the load factor threshold, in percent
    pub fn set_load_factor_threshold(&mut self, threshold: usize) {
        // capped below 100 so growth always leaves an empty slot behind
        self.load_factor_threshold = threshold.clamp(1, 95);
    }

    /// Clears the map, removing all key-value pairs
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns an iterator over the key-value pairs
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.table.iter()
    }

    /// Returns an iterator over the key-value pairs with mutable values
    #[must_use]
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.table.iter_mut()
    }

    /// Returns an iterator over the keys
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the values
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// Whether `additional` more entries would push the load factor past the threshold
    fn exceeds_threshold(&self, additional: usize) -> bool {
        let wanted = self.len().saturating_add(additional).saturating_mul(100);
        wanted > self.capacity().saturating_mul(self.load_factor_threshold)
    }
}

impl<K, V, S> RobinHoodMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Grows the table until one more entry fits under the load factor threshold.
    ///
    /// A key that is already stored only has its value replaced, so it needs no room.
    fn ensure_room_for(&mut self, key: &K) -> Result<(), TableError> {
        if self.table.contains_key(key) {
            return Ok(());
        }
        while self.exceeds_threshold(1) {
            self.table.grow()?;
        }
        Ok(())
    }

    /// Insert a key-value pair, returning the value previously stored under the key
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        // growth runs first, so the table always has a free slot here
        self.try_insert(key, value).unwrap_or_else(|err| {
            log::error!("insert failed after growth: {err}");
            None
        })
    }

    /// Insert a key-value pair, reporting a failed insertion instead of dropping it
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NoFreeSpace`] if the table could not make room.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        self.ensure_room_for(&key)?;
        self.table.put(key, value)
    }

    /// Updates the value stored for `key` with `update`, or inserts `initial()`.
    ///
    /// `initial` is only called when the key is missing.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NoFreeSpace`] if the table could not make room.
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
        self.ensure_room_for(&key)?;
        self.table.update_or_insert(key, update, initial)
    }

    /// Retrieve a value for a given key
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.get(key)
    }

    /// Retrieve the stored key and its value
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.get_key_value(key)
    }

    /// Get a mutable reference to a value for a given key
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.get_mut(key)
    }

    /// Returns true if the map contains the given key
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.contains_key(key)
    }

    /// Removes a key-value pair from the map
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.remove_key(key).ok()
    }

    /// Removes a key, returning its value or `fallback()` when it is absent
    pub fn remove_or_else<Q, F>(&mut self, key: &Q, fallback: F) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce() -> V,
    {
        self.table.remove_key_or_else(key, fallback)
    }

    /// Makes room for `additional` more entries without crossing the load factor threshold
    ///
    /// # Errors
    ///
    /// Propagates failures of the table rebuild, which cannot occur when growing.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn reserve(&mut self, additional: usize) -> Result<(), TableError> {
        if !self.exceeds_threshold(additional) {
            return Ok(());
        }
        let wanted = self.len().saturating_add(additional).saturating_mul(100);
        // threshold is at least 1, and rounding up keeps the result above the threshold
        let slots = wanted.div_ceil(self.load_factor_threshold).saturating_add(1);
        let target = crate::next_good_size(slots);
        log::debug!("reserving {additional} entries: {} -> {target} slots", self.capacity());
        self.table.grow_to(target)
    }

    /// Grows the table to the next good capacity of at least twice its size
    ///
    /// # Errors
    ///
    /// Propagates failures of the table rebuild, which cannot occur when growing.
    pub fn grow(&mut self) -> Result<(), TableError> {
        self.table.grow()
    }

    /// Rebuilds the table at its current capacity
    ///
    /// # Errors
    ///
    /// Propagates failures of the table rebuild, which cannot occur at equal capacity.
    pub fn rehash(&mut self) -> Result<(), TableError> {
        self.table.rehash()
    }
}

impl<K, V, S> Default for RobinHoodMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> fmt::Debug for RobinHoodMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> PartialEq for RobinHoodMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K, V, S> Eq for RobinHoodMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> Extend<(K, V)> for RobinHoodMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for RobinHoodMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, S> IntoIterator for RobinHoodMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

#[allow(single_use_lifetimes)]
impl<'a, K, V, S> IntoIterator for &'a RobinHoodMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[allow(single_use_lifetimes)]
impl<'a, K, V, S> IntoIterator for &'a mut RobinHoodMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
