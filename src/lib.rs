//! chained-hashmap: a single-owner hash map using separate chaining, prime
//! bucket counts and index-pair cursors.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a map whose behaviour is fully pinned down: which bucket a key
//!   lands in, when the table grows, what a cursor points at, so callers can
//!   reason about placement and traversal.
//! - Layers:
//!   - Chain: one bucket's entries as a doubly linked list threaded through
//!     a map-wide generational arena (`slotmap`).
//!   - BucketTable: `Vec<Option<Chain>>`; a slot exists only while its chain
//!     is non-empty.
//!   - growth: 28 primes from 53 to 4294967291 and the 0.5 load-factor rule.
//!   - Cursor: `(bucket, position)` pair resolved against the map on use.
//!   - ChainedHashMap<K, V, S, E>: find/insert/erase/clear over the above.
//!
//! Constraints
//! - Single-threaded, no internal synchronization. The map is `Send` when
//!   its contents are; debug builds are not `Sync`.
//! - O(1) expected lookup, insert and erase; erase through a cursor never
//!   rescans the chain.
//! - The bucket count never shrinks.
//!
//! Growth
//! - Checked after an insertion adds a key: if `len / buckets > 0.5` the table
//!   moves to the next prime. Overwriting an existing key does not check.
//! - At the last prime the table stops growing; chains lengthen instead.
//! - Rehashing builds the larger table first, then relinks every entry from a
//!   snapshot of arena positions using the hash stored at insertion. `Hash`
//!   is never called on a stored key again.
//!
//! Cursors
//! - A cursor is `Copy` and borrows nothing. It is stale after any structural
//!   change; checked operations (`erase`, `entry_at`) report stale and end
//!   cursors as `MapError` instead of misbehaving.
//! - End is a predicate (no position, or bucket past the table), not a cached
//!   sentinel, so it stays correct across growth.
//!
//! Reentrancy
//! - User code runs only while probing (`Hash`, `KeyEq`). A debug-only guard
//!   panics if that code re-enters the same map.

mod bucket_table;
mod chain;
pub mod chained_hash_map;
mod chained_hash_map_proptest;
pub mod cursor;
mod error;
pub mod growth;
mod key_eq;
mod reentrancy;

// Public surface
pub use chained_hash_map::ChainedHashMap;
pub use cursor::Cursor;
pub use error::MapError;
pub use key_eq::{EqualTo, KeyEq};
