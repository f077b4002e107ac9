//! Cursors and iterators.
//!
//! A [`Cursor`] is a plain `(bucket, position)` pair. It borrows nothing and
//! is resolved against the map each time it is used, so it can be held across
//! mutations; after a structural change it is stale and checked operations
//! report it as such. "End" is not a stored sentinel: a cursor is at the end
//! when it has no position or its bucket is outside the current table.

use crate::bucket_table::BucketTable;
use crate::chain::{Chain, Node, NodeKey, Nodes};
use core::iter::FusedIterator;

/// Position of one entry in a [`ChainedHashMap`](crate::ChainedHashMap).
///
/// Two end cursors compare equal whatever bucket they were taken at; any
/// other pair is equal when both bucket and chain position match.
#[derive(Clone, Copy, Debug)]
pub struct Cursor {
    pub(crate) bucket: usize,
    pub(crate) pos: Option<NodeKey>,
}

impl Cursor {
    #[inline]
    pub(crate) fn at(bucket: usize, pos: NodeKey) -> Self {
        Self {
            bucket,
            pos: Some(pos),
        }
    }

    #[inline]
    pub(crate) fn end(buckets: usize) -> Self {
        Self {
            bucket: buckets,
            pos: None,
        }
    }

    /// Bucket index this cursor points into.
    #[inline]
    pub fn bucket(&self) -> usize {
        self.bucket
    }
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        match (self.pos, other.pos) {
            (None, None) => true,
            (a, b) => a == b && self.bucket == other.bucket,
        }
    }
}

impl Eq for Cursor {}

/// Head of the first occupied bucket at or after `from`, or the end.
pub(crate) fn first_from(table: &BucketTable, from: usize) -> Cursor {
    table
        .next_occupied(from)
        .and_then(|i| table.get(i).and_then(Chain::head).map(|h| Cursor::at(i, h)))
        .unwrap_or_else(|| Cursor::end(table.len()))
}

/// Next entry after `c`: the following node of the same chain, else the head
/// of the next occupied bucket, else the end. The end stays the end.
pub(crate) fn step<K, V>(table: &BucketTable, nodes: &Nodes<K, V>, c: Cursor) -> Cursor {
    let Some(pos) = c.pos else {
        return Cursor::end(table.len());
    };
    if c.bucket >= table.len() {
        return Cursor::end(table.len());
    }
    match nodes.get(pos).and_then(Node::next) {
        Some(next) => Cursor::at(c.bucket, next),
        None => first_from(table, c.bucket + 1),
    }
}

/// Borrowing iterator in bucket order, then chain order.
pub struct Iter<'a, K, V> {
    table: &'a BucketTable,
    nodes: &'a Nodes<K, V>,
    cursor: Cursor,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(table: &'a BucketTable, nodes: &'a Nodes<K, V>) -> Self {
        Self {
            table,
            nodes,
            cursor: first_from(table, 0),
            remaining: nodes.len(),
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.cursor.pos?)?;
        self.cursor = step(self.table, self.nodes, self.cursor);
        self.remaining = self.remaining.saturating_sub(1);
        Some((&node.key, &node.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Mutable iterator over entries. Visits every entry once, in arena order
/// rather than bucket order.
pub struct IterMut<'a, K, V> {
    pub(crate) it: slotmap::basic::IterMut<'a, NodeKey, Node<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, n)| (&n.key, &mut n.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

pub struct Keys<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

pub struct Values<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

pub struct ValuesMut<'a, K, V> {
    pub(crate) inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Owning iterator; yields entries in the same order as [`Iter`].
pub struct IntoIter<K, V> {
    order: std::vec::IntoIter<NodeKey>,
    nodes: Nodes<K, V>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(table: &BucketTable, nodes: Nodes<K, V>) -> Self {
        let mut order = Vec::with_capacity(nodes.len());
        let mut c = first_from(table, 0);
        while let Some(pos) = c.pos {
            order.push(pos);
            c = step(table, &nodes, c);
        }
        Self {
            order: order.into_iter(),
            nodes,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        let pos = self.order.next()?;
        self.nodes.remove(pos).map(|n| (n.key, n.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_cursors_compare_equal_across_buckets() {
        assert_eq!(Cursor::end(53), Cursor::end(97));
        assert_eq!(Cursor::end(53), Cursor::end(0));
    }

    #[test]
    fn positioned_cursor_never_equals_end() {
        let mut nodes: Nodes<u8, u8> = Nodes::with_key();
        let pos = nodes.insert(Node::new(1, 1, 0));
        assert_ne!(Cursor::at(0, pos), Cursor::end(53));
        assert_eq!(Cursor::at(0, pos), Cursor::at(0, pos));
        assert_ne!(Cursor::at(0, pos), Cursor::at(1, pos));
    }

    #[test]
    fn step_skips_vacant_buckets() {
        let mut nodes: Nodes<u32, u32> = Nodes::with_key();
        let mut table = BucketTable::with_len(11);
        for (slot, k) in [(2usize, 1u32), (2, 2), (7, 3)] {
            let pos = nodes.insert(Node::new(k, k, slot as u64));
            table.push_front(slot, &mut nodes, pos);
        }

        let c0 = first_from(&table, 0);
        assert_eq!(c0.bucket(), 2);
        let c1 = step(&table, &nodes, c0);
        assert_eq!(c1.bucket(), 2);
        let c2 = step(&table, &nodes, c1);
        assert_eq!(c2.bucket(), 7);
        let c3 = step(&table, &nodes, c2);
        assert_eq!(c3, Cursor::end(table.len()));
        assert_eq!(c3.bucket(), 11);
        assert_eq!(step(&table, &nodes, c3), c3);
    }

    #[test]
    fn iter_reports_exact_len() {
        let mut nodes: Nodes<u32, u32> = Nodes::with_key();
        let mut table = BucketTable::with_len(5);
        for k in 0..8u32 {
            let pos = nodes.insert(Node::new(k, k * 10, k as u64));
            table.push_front(table.slot_for(k as u64), &mut nodes, pos);
        }
        let it = Iter::new(&table, &nodes);
        assert_eq!(it.len(), 8);
        let mut seen: Vec<u32> = it.map(|(k, _)| *k).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn into_iter_follows_iter_order() {
        let mut nodes: Nodes<u32, u32> = Nodes::with_key();
        let mut table = BucketTable::with_len(3);
        for k in 0..6u32 {
            let pos = nodes.insert(Node::new(k, k, k as u64));
            table.push_front(table.slot_for(k as u64), &mut nodes, pos);
        }
        let borrowed: Vec<u32> = Iter::new(&table, &nodes).map(|(k, _)| *k).collect();
        let owned: Vec<u32> = IntoIter::new(&table, nodes).map(|(k, _)| k).collect();
        assert_eq!(borrowed, owned);
    }
}
