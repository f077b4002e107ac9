//! ChainedHashMap: separate chaining over prime-sized bucket tables.
//!
//! Entries live in one generational arena; each occupied bucket holds a
//! chain linked through it. An insertion that adds a key and pushes the load
//! factor above one half moves the table to the next prime size and relinks
//! every entry using its stored hash.

use crate::bucket_table::BucketTable;
use crate::chain::{Chain, Node, NodeKey, Nodes};
use crate::cursor::{self, Cursor, IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use crate::error::MapError;
use crate::growth;
use crate::key_eq::{EqualTo, KeyEq};
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use core::ops::{Index, IndexMut};
use hashbrown::hash_map::DefaultHashBuilder;
use log::{debug, trace};

/// Hash map with separate chaining, prime bucket counts and index-pair
/// cursors.
///
/// `S` hashes keys and `E` compares them; equal keys must hash equal.
#[derive(Clone)]
pub struct ChainedHashMap<K, V, S = DefaultHashBuilder, E = EqualTo> {
    hasher: S,
    key_eq: E,
    table: BucketTable,
    nodes: Nodes<K, V>,
    reentrancy: DebugReentrancy,
}

// Result of hashing a key and searching its bucket.
struct Probe {
    hash: u64,
    slot: usize,
    found: Option<NodeKey>,
}

impl<K, V> ChainedHashMap<K, V> {
    pub fn new() -> Self {
        Self::with_hasher_and_eq(DefaultHashBuilder::default(), EqualTo)
    }
}

impl<K, V, S, E> Default for ChainedHashMap<K, V, S, E>
where
    S: Default,
    E: Default,
{
    fn default() -> Self {
        Self::with_hasher_and_eq(S::default(), E::default())
    }
}

impl<K, V, S> ChainedHashMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_hasher_and_eq(hasher, EqualTo)
    }
}

impl<K, V, S, E> ChainedHashMap<K, V, S, E> {
    pub fn with_hasher_and_eq(hasher: S, key_eq: E) -> Self {
        Self {
            hasher,
            key_eq,
            table: BucketTable::with_len(growth::INITIAL_BUCKETS),
            nodes: Nodes::with_key(),
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn key_eq(&self) -> &E {
        &self.key_eq
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current number of buckets. Never decreases.
    pub fn bucket_count(&self) -> usize {
        self.table.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.bucket_count() as f64
    }

    /// Number of entries chained in bucket `slot`; zero for vacant or
    /// out-of-range slots.
    pub fn bucket_len(&self, slot: usize) -> usize {
        self.table.get(slot).map_or(0, Chain::len)
    }

    /// Cursor at the first entry, or [`end`](Self::end) when empty.
    pub fn begin(&self) -> Cursor {
        cursor::first_from(&self.table, 0)
    }

    pub fn end(&self) -> Cursor {
        Cursor::end(self.table.len())
    }

    pub fn is_end(&self, c: Cursor) -> bool {
        c.pos.is_none() || c.bucket >= self.table.len()
    }

    /// Cursor following `c`. Advancing the end yields the end.
    pub fn advance(&self, c: Cursor) -> Cursor {
        cursor::step(&self.table, &self.nodes, c)
    }

    pub fn key_at(&self, c: Cursor) -> Option<&K> {
        let pos = self.resolve(c).ok()?;
        Some(&self.nodes[pos].key)
    }

    pub fn value_at(&self, c: Cursor) -> Option<&V> {
        let pos = self.resolve(c).ok()?;
        Some(&self.nodes[pos].value)
    }

    pub fn value_at_mut(&mut self, c: Cursor) -> Option<&mut V> {
        let pos = self.resolve(c).ok()?;
        Some(&mut self.nodes[pos].value)
    }

    /// Entry under `c`, reporting why when there is none.
    pub fn entry_at(&self, c: Cursor) -> Result<(&K, &V), MapError> {
        let pos = self.resolve(c)?;
        let node = &self.nodes[pos];
        Ok((&node.key, &node.value))
    }

    /// Remove the entry under `c` and return it. The cursor is consumed;
    /// every other cursor into this map should be considered stale.
    pub fn erase(&mut self, c: Cursor) -> Result<(K, V), MapError> {
        let pos = self.resolve(c)?;
        let node = self
            .table
            .erase(c.bucket, &mut self.nodes, pos)
            .ok_or(MapError::StaleCursor)?;
        Ok((node.key, node.value))
    }

    /// Drop every entry. The bucket count is kept.
    pub fn clear(&mut self) {
        let dropped = self.nodes.len();
        self.table.clear();
        self.nodes.clear();
        trace!(
            "chained-hashmap: cleared {} entries, keeping {} buckets",
            dropped,
            self.table.len()
        );
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.table, &self.nodes)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.nodes.iter_mut(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    // A cursor designates a live entry when its node is still in the arena
    // and its bucket is the one that node hashes to at the current size.
    fn resolve(&self, c: Cursor) -> Result<NodeKey, MapError> {
        let pos = c.pos.ok_or(MapError::EndCursor)?;
        if c.bucket >= self.table.len() {
            return Err(MapError::EndCursor);
        }
        let node = self.nodes.get(pos).ok_or(MapError::StaleCursor)?;
        if self.table.slot_for(node.hash) != c.bucket {
            return Err(MapError::StaleCursor);
        }
        Ok(pos)
    }

    /// Bucket count to grow to if the map held `new_len` entries, or `None`
    /// when no growth is due (or the table is already at the ceiling).
    fn growth_target(&self, new_len: usize) -> Option<usize> {
        let current = self.table.len();
        if !growth::exceeds_load(new_len, current) {
            return None;
        }
        let next = growth::next_size(current);
        if next == current {
            trace!(
                "chained-hashmap: load factor above limit with {} entries at the {} bucket ceiling",
                new_len,
                current
            );
            return None;
        }
        Some(next)
    }

    fn commit(&mut self, probe: Probe, key: K, value: V, grown: Option<BucketTable>) {
        let pos = self.nodes.insert(Node::new(key, value, probe.hash));
        self.table.push_front(probe.slot, &mut self.nodes, pos);
        if let Some(table) = grown {
            self.rehash_into(table);
        }
    }

    fn rehash_into(&mut self, mut table: BucketTable) {
        let from = self.table.len();
        // Snapshot the positions; links are rewritten while relinking.
        let snapshot: Vec<NodeKey> = self.nodes.keys().collect();
        for pos in snapshot {
            let slot = table.slot_for(self.nodes[pos].hash);
            table.push_front(slot, &mut self.nodes, pos);
        }
        self.table = table;
        debug!(
            "chained-hashmap: grew from {} to {} buckets ({} entries)",
            from,
            self.table.len(),
            self.nodes.len()
        );
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        assert_eq!(self.table.total_len(), self.nodes.len(), "count == sum of chains");
        for slot in 0..self.table.len() {
            if let Some(chain) = self.table.get(slot) {
                assert!(!chain.is_empty(), "occupied slot {slot} holds an empty chain");
                for pos in chain.iter(&self.nodes) {
                    assert_eq!(self.table.slot_for(self.nodes[pos].hash), slot);
                }
            }
        }
        if self.table.len() < growth::MAX_BUCKETS {
            assert!(!growth::exceeds_load(self.len(), self.table.len()));
        }
    }

    #[cfg(test)]
    pub(crate) fn occupied_buckets(&self) -> usize {
        self.table.occupied()
    }
}

impl<K, V, S, E> ChainedHashMap<K, V, S, E>
where
    S: BuildHasher,
{
    fn probe<Q>(&self, q: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        let _g = self.reentrancy.enter();
        let hash = self.hasher.hash_one(q);
        let slot = self.table.slot_for(hash);
        let found = self.table.get(slot).and_then(|chain| {
            chain.find(&self.nodes, |n| {
                n.hash == hash && self.key_eq.eq(Borrow::<Q>::borrow(&n.key), q)
            })
        });
        Probe { hash, slot, found }
    }

    /// Cursor at the entry for `q`, or [`end`](Self::end).
    pub fn find<Q>(&self, q: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        let probe = self.probe(q);
        match probe.found {
            Some(pos) => Cursor::at(probe.slot, pos),
            None => self.end(),
        }
    }

    /// Bucket `q` hashes to at the current size.
    pub fn bucket_index<Q>(&self, q: &Q) -> usize
    where
        Q: ?Sized + Hash,
    {
        self.table.slot_for(self.hasher.hash_one(q))
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        self.probe(q).found.is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        let pos = self.probe(q).found?;
        Some(&self.nodes[pos].value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        let pos = self.probe(q).found?;
        Some(&mut self.nodes[pos].value)
    }

    /// Like `get`, but a missing key is reported as [`MapError::KeyNotFound`].
    pub fn at<Q>(&self, q: &Q) -> Result<&V, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        self.get(q).ok_or(MapError::KeyNotFound)
    }

    pub fn at_mut<Q>(&mut self, q: &Q) -> Result<&mut V, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        self.get_mut(q).ok_or(MapError::KeyNotFound)
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        E: KeyEq<Q>,
    {
        let c = self.find(q);
        self.erase(c).ok()
    }
}

impl<K, V, S, E> ChainedHashMap<K, V, S, E>
where
    K: Hash,
    S: BuildHasher,
    E: KeyEq<K>,
{
    /// Insert or overwrite. Returns the previous value when `key` was
    /// present; in that case the entry keeps its position and no growth
    /// check runs.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let probe = self.probe(&key);
        if let Some(pos) = probe.found {
            return Some(mem::replace(&mut self.nodes[pos].value, value));
        }
        let grown = self
            .growth_target(self.len() + 1)
            .map(BucketTable::with_len);
        self.commit(probe, key, value, grown);
        None
    }

    /// Fallible [`insert`](Self::insert). The grown bucket table is allocated
    /// before anything is linked, so on error the map is unchanged.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>, MapError> {
        let probe = self.probe(&key);
        if let Some(pos) = probe.found {
            return Ok(Some(mem::replace(&mut self.nodes[pos].value, value)));
        }
        let grown = self
            .growth_target(self.len() + 1)
            .map(BucketTable::try_with_len)
            .transpose()?;
        self.commit(probe, key, value, grown);
        Ok(None)
    }
}

/// Panics with [`MapError::KeyNotFound`] when the key is absent.
impl<K, Q, V, S, E> Index<&Q> for ChainedHashMap<K, V, S, E>
where
    K: Borrow<Q>,
    Q: ?Sized + Hash,
    S: BuildHasher,
    E: KeyEq<Q>,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        match self.at(key) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<K, Q, V, S, E> IndexMut<&Q> for ChainedHashMap<K, V, S, E>
where
    K: Borrow<Q>,
    Q: ?Sized + Hash,
    S: BuildHasher,
    E: KeyEq<Q>,
{
    fn index_mut(&mut self, key: &Q) -> &mut V {
        match self.at_mut(key) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S, E> fmt::Debug for ChainedHashMap<K, V, S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S, E> Extend<(K, V)> for ChainedHashMap<K, V, S, E>
where
    K: Hash,
    S: BuildHasher,
    E: KeyEq<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S, E> FromIterator<(K, V)> for ChainedHashMap<K, V, S, E>
where
    K: Hash,
    S: BuildHasher + Default,
    E: KeyEq<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::default();
        m.extend(iter);
        m
    }
}

impl<'a, K, V, S, E> IntoIterator for &'a ChainedHashMap<K, V, S, E> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S, E> IntoIterator for &'a mut ChainedHashMap<K, V, S, E> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S, E> IntoIterator for ChainedHashMap<K, V, S, E> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(&self.table, self.nodes)
    }
}
