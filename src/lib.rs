//! # Robin Hood Hash Map
//!
//! A Rust implementation of an open-addressing hash table with Robin Hood displacement.
//!
//! Every stored entry records its probe sequence length: how far it sits from the slot its
//! hash points at. An incoming entry takes over the slot of any occupant that is closer to
//! home than the newcomer is at that point, and the occupant moves further along. This
//! keeps displacements short and even, so the longest lookup stays close to the average
//! one. Removal shifts the displaced successors back one slot instead of leaving
//! tombstones behind.
//!
//! This crate provides:
//!
//! - `RobinHoodTable`: the slot table itself, with explicit growth and probe length
//!   introspection
//! - `RobinHoodMap`: a map on top of the table that grows it by load factor
//! - `Mapping`: the container operations both `RobinHoodMap` and `std::collections::HashMap`
//!   offer
//!
//! ## Basic Usage
//!
//! ```rust
//! use robinhood::RobinHoodMap;
//!
//! // Create a new hash map
//! let mut map = RobinHoodMap::new();
//!
//! // Insert values
//! map.insert("apple".to_string(), 1);
//! map.insert("banana".to_string(), 2);
//!
//! // Retrieve values
//! assert_eq!(map.get("apple"), Some(&1));
//!
//! // Update values
//! map.insert("apple".to_string(), 10);
//! assert_eq!(map.get("apple"), Some(&10));
//!
//! // Count occurrences without a separate lookup
//! for fruit in ["pear", "plum", "pear"] {
//!     map.update_or_insert(fruit.to_string(), |n| n + 1, || 1).unwrap();
//! }
//! assert_eq!(map.get("pear"), Some(&2));
//!
//! // Remove values
//! map.remove("apple");
//! assert_eq!(map.get("apple"), None);
//! ```
//!
//! ## Working With The Table
//!
//! ```rust
//! use robinhood::{RobinHoodTable, TableError};
//!
//! let mut table = RobinHoodTable::with_capacity(4);
//! assert_eq!(table.capacity(), 5);
//!
//! for i in 0..5 {
//!     table.put(i, i * i).unwrap();
//! }
//! // the table never grows by itself
//! assert_eq!(table.put(5, 25), Err(TableError::NoFreeSpace { capacity: 5 }));
//!
//! table.grow().unwrap();
//! table.put(5, 25).unwrap();
//! assert_eq!(table.capacity(), 11);
//! assert!(table.validate().is_ok());
//!
//! assert_eq!(table.remove_key(&3), Ok(9));
//! assert_eq!(table.remove_key(&3), Err(TableError::KeyNotFound));
//! ```

/// Error types for table operations and diagnostics
mod error;
/// Module implementing the load-factor driven map
mod map;
/// Capacity table for the slot array
mod sizes;
/// Module implementing the Robin Hood slot table
mod table;
/// Utility traits for the hash maps
mod utils;

#[cfg(test)]
mod test_support;

pub use error::{InvariantViolation, TableError};
pub use map::{DEFAULT_LOAD_FACTOR_THRESHOLD, DEFAULT_SIZE_HINT, RobinHoodMap};
pub use sizes::next_good_size;
pub use table::{IntoIter, Iter, IterMut, RobinHoodTable};
pub use utils::Mapping;
