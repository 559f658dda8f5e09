use std::{
    collections::HashMap,
    hash::{BuildHasher, Hasher},
};

use proptest::prelude::*;
use robinhood::{Mapping, RobinHoodMap, RobinHoodTable};

// Hashes integers to themselves so small key ranges collide heavily
struct IdentityHasher(u64);

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

#[derive(Debug, Clone, Copy)]
struct IdentityState;

impl BuildHasher for IdentityState {
    type Hasher = IdentityHasher;

    fn build_hasher(&self) -> IdentityHasher {
        IdentityHasher(0)
    }
}

#[derive(Debug, Clone)]
enum Op {
    Insert(u64, u32),
    Remove(u64),
    Bump(u64),
    Grow,
    Rehash,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0..64_u64, any::<u32>()).prop_map(|(key, value)| Op::Insert(key, value)),
        3 => (0..64_u64).prop_map(Op::Remove),
        2 => (0..64_u64).prop_map(Op::Bump),
        1 => Just(Op::Grow),
        1 => Just(Op::Rehash),
    ]
}

proptest! {
    #[test]
    fn map_behaves_like_std(ops in prop::collection::vec(op(), 1..300)) {
        let mut ours: RobinHoodMap<u64, u32, IdentityState> =
            RobinHoodMap::with_capacity_and_hasher(1, IdentityState);
        let mut model = HashMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    prop_assert_eq!(ours.insert(key, value), model.insert(key, value));
                }
                Op::Remove(key) => {
                    prop_assert_eq!(ours.remove(&key), model.remove(&key));
                }
                Op::Bump(key) => {
                    let bumped = *ours
                        .update_or_insert(key, |value| value.wrapping_add(1), || 0)
                        .unwrap();
                    let expected = model
                        .entry(key)
                        .and_modify(|value: &mut u32| *value = value.wrapping_add(1))
                        .or_insert(0);
                    prop_assert_eq!(bumped, *expected);
                }
                Op::Grow => {
                    if ours.capacity() < 1_000 {
                        ours.grow().unwrap();
                    }
                }
                Op::Rehash => ours.rehash().unwrap(),
            }

            prop_assert_eq!(ours.table().validate(), Ok(()));
            prop_assert_eq!(ours.len(), model.len());
        }

        for (key, value) in &model {
            prop_assert_eq!(ours.get(key), Some(value));
        }
        let mut ours_keys = Mapping::keys(&ours);
        let mut model_keys = Mapping::keys(&model);
        ours_keys.sort_unstable();
        model_keys.sort_unstable();
        prop_assert_eq!(ours_keys, model_keys);
    }

    #[test]
    fn distinct_keys_round_trip(keys in prop::collection::hash_set(any::<u64>(), 0..500)) {
        let mut map = RobinHoodMap::new();
        for &key in &keys {
            prop_assert_eq!(map.insert(key, key.wrapping_mul(3)), None);
        }

        prop_assert_eq!(map.len(), keys.len());
        for &key in &keys {
            prop_assert_eq!(map.get(&key), Some(&key.wrapping_mul(3)));
        }
        let longest = map.table().max_probe_length().unwrap_or(0);
        prop_assert!(longest < map.capacity());
        prop_assert_eq!(map.table().validate(), Ok(()));

        for &key in &keys {
            prop_assert_eq!(map.remove(&key), Some(key.wrapping_mul(3)));
            prop_assert_eq!(map.get(&key), None);
        }
        prop_assert!(map.is_empty());
        prop_assert_eq!(map.table().validate(), Ok(()));
    }

    #[test]
    fn delete_then_reinsert_stays_compact(
        keys in prop::collection::hash_set(0..64_u64, 1..12),
        pick in any::<prop::sample::Index>(),
        offset in 1..4_u64
    ) {
        let mut table = RobinHoodTable::with_exact_capacity_and_hasher(16, IdentityState);
        for &key in &keys {
            table.put(key, ()).unwrap();
        }
        let keys: Vec<u64> = keys.into_iter().collect();
        let removed = *pick.get(&keys);

        table.remove_key(&removed).unwrap();
        prop_assert_eq!(table.validate(), Ok(()));
        prop_assert!(!table.contains_key(&removed));

        // a different key with the same ideal slot takes the vacated place in the run
        let replacement = removed + 16 * offset;
        prop_assume!(!keys.contains(&replacement));
        table.put(replacement, ()).unwrap();
        prop_assert_eq!(table.validate(), Ok(()));
        prop_assert!(table.contains_key(&replacement));
        prop_assert!(!table.contains_key(&removed));
    }

    #[test]
    fn overwrite_keeps_one_entry(key in any::<u64>(), first in any::<u32>(), second in any::<u32>()) {
        let mut map: RobinHoodMap<u64, u32> = RobinHoodMap::new();
        map.insert(key, first);
        let len = map.len();

        prop_assert_eq!(map.insert(key, second), Some(first));
        prop_assert_eq!(map.len(), len);
        prop_assert_eq!(map.get(&key), Some(&second));
        prop_assert_eq!(map.iter().filter(|(stored, _)| **stored == key).count(), 1);
    }
}

#[test]
fn grow_recomputes_probe_lengths() {
    let mut table = RobinHoodTable::with_exact_capacity_and_hasher(8, IdentityState);
    for key in [2_u64, 10, 18, 3, 4] {
        table.put(key, key * 100).unwrap();
    }
    assert_eq!(table.max_probe_length(), Some(2));

    table.grow_to(16).unwrap();

    for key in [2_u64, 10, 18, 3, 4] {
        assert_eq!(table.get(&key), Some(&(key * 100)));
    }
    assert_eq!(table.probe_lengths()[10], Some(0));
    assert_eq!(table.key_at(10), Some(&10));
    assert_eq!(table.validate(), Ok(()));
}

#[test]
fn long_shift_chain_wraps_around() {
    let mut table = RobinHoodTable::with_exact_capacity_and_hasher(8, IdentityState);
    // seven keys all wanting slot 5 fill slots 5, 6, 7, 0, 1, 2, 3
    let keys: Vec<u64> = (0..7).map(|i| 5 + 8 * i).collect();
    for &key in &keys {
        table.put(key, ()).unwrap();
    }
    assert_eq!(table.probe_lengths()[3], Some(6));
    assert_eq!(table.key_at(4), None);

    table.remove_key(&5).unwrap();

    // every survivor moved back by one, across the end of the array
    for (offset, &key) in keys.iter().skip(1).enumerate() {
        let slot = (5 + offset) % 8;
        assert_eq!(table.key_at(slot), Some(&key));
        assert_eq!(table.probe_lengths()[slot], Some(offset));
    }
    assert_eq!(table.key_at(3), None);
    assert_eq!(table.validate(), Ok(()));
}
