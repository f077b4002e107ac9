//! Chain: the entries of one bucket, kept as a doubly linked list threaded
//! through the map-wide node arena.
//!
//! Nodes keep their arena position for as long as they are live; a chain
//! only records its head and length. Positions are generational arena keys,
//! so a position that outlived its node resolves to nothing instead of
//! aliasing a newer one.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Generational position of an entry in the node arena.
    pub struct NodeKey;
}

/// Arena holding every entry of a map, across all chains.
pub(crate) type Nodes<K, V> = SlotMap<NodeKey, Node<K, V>>;

#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    // Computed once at insertion; rehashing reuses it.
    pub(crate) hash: u64,
    prev: Option<NodeKey>,
    next: Option<NodeKey>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V, hash: u64) -> Self {
        Self {
            key,
            value,
            hash,
            prev: None,
            next: None,
        }
    }

    /// Next position in the same chain, if any.
    #[inline]
    pub(crate) fn next(&self) -> Option<NodeKey> {
        self.next
    }
}

/// Head and length of one bucket's list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Chain {
    head: Option<NodeKey>,
    len: usize,
}

impl Chain {
    pub(crate) const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    #[inline]
    pub(crate) fn head(&self) -> Option<NodeKey> {
        self.head
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Link the arena node at `pos` in front of the current head. O(1), no
    /// duplicate check; any previous links of the node are overwritten.
    pub(crate) fn push_front<K, V>(&mut self, nodes: &mut Nodes<K, V>, pos: NodeKey) {
        let old_head = self.head;
        {
            let node = &mut nodes[pos];
            node.prev = None;
            node.next = old_head;
        }
        if let Some(h) = old_head {
            nodes[h].prev = Some(pos);
        }
        self.head = Some(pos);
        self.len += 1;
    }

    /// First position, in chain order, whose node satisfies `pred`.
    pub(crate) fn find<K, V, F>(&self, nodes: &Nodes<K, V>, mut pred: F) -> Option<NodeKey>
    where
        F: FnMut(&Node<K, V>) -> bool,
    {
        self.iter(nodes).find(|&pos| pred(&nodes[pos]))
    }

    /// Unlink `pos` from this chain and take it out of the arena. O(1).
    ///
    /// `pos` must belong to this chain; returns `None` if it is not live in
    /// the arena. The caller checks `is_empty` afterwards.
    pub(crate) fn erase<K, V>(&mut self, nodes: &mut Nodes<K, V>, pos: NodeKey) -> Option<Node<K, V>> {
        let node = nodes.remove(pos)?;
        match node.prev {
            Some(p) => nodes[p].next = node.next,
            None => self.head = node.next,
        }
        if let Some(n) = node.next {
            nodes[n].prev = node.prev;
        }
        self.len -= 1;
        Some(node)
    }

    /// Positions from head to tail (most recently pushed first).
    pub(crate) fn iter<'a, K, V>(&self, nodes: &'a Nodes<K, V>) -> ChainIter<'a, K, V> {
        ChainIter {
            nodes,
            at: self.head,
        }
    }
}

pub(crate) struct ChainIter<'a, K, V> {
    nodes: &'a Nodes<K, V>,
    at: Option<NodeKey>,
}

impl<'a, K, V> Iterator for ChainIter<'a, K, V> {
    type Item = NodeKey;

    #[inline]
    fn next(&mut self) -> Option<NodeKey> {
        let pos = self.at?;
        self.at = self.nodes.get(pos).and_then(Node::next);
        Some(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_of(nodes: &mut Nodes<&'static str, i32>, items: &[(&'static str, i32)]) -> Chain {
        let mut c = Chain::new();
        for &(k, v) in items {
            let pos = nodes.insert(Node::new(k, v, 0));
            c.push_front(nodes, pos);
        }
        c
    }

    fn keys(c: &Chain, nodes: &Nodes<&'static str, i32>) -> Vec<&'static str> {
        c.iter(nodes).map(|p| nodes[p].key).collect()
    }

    #[test]
    fn push_front_orders_newest_first() {
        let mut nodes = Nodes::with_key();
        let c = chain_of(&mut nodes, &[("a", 1), ("b", 2), ("c", 3)]);
        assert_eq!(keys(&c, &nodes), vec!["c", "b", "a"]);
        assert_eq!(c.len(), 3);
        assert!(!c.is_empty());
    }

    #[test]
    fn find_matches_predicate() {
        let mut nodes = Nodes::with_key();
        let c = chain_of(&mut nodes, &[("a", 1), ("b", 2)]);
        let pos = c.find(&nodes, |n| n.key == "a").expect("a present");
        assert_eq!(nodes[pos].value, 1);
        assert!(c.find(&nodes, |n| n.key == "z").is_none());
    }

    #[test]
    fn erase_head_middle_tail() {
        let mut nodes = Nodes::with_key();
        let mut c = chain_of(&mut nodes, &[("a", 1), ("b", 2), ("c", 3), ("d", 4)]);

        let mid = c.find(&nodes, |n| n.key == "b").unwrap();
        assert_eq!(c.erase(&mut nodes, mid).map(|n| n.value), Some(2));
        assert_eq!(keys(&c, &nodes), vec!["d", "c", "a"]);

        let head = c.head().unwrap();
        assert_eq!(c.erase(&mut nodes, head).map(|n| n.key), Some("d"));
        assert_eq!(keys(&c, &nodes), vec!["c", "a"]);

        let tail = c.find(&nodes, |n| n.key == "a").unwrap();
        c.erase(&mut nodes, tail).unwrap();
        assert_eq!(keys(&c, &nodes), vec!["c"]);
        assert_eq!(c.len(), 1);

        let last = c.head().unwrap();
        c.erase(&mut nodes, last).unwrap();
        assert!(c.is_empty());
        assert_eq!(c.len(), 0);
        assert!(nodes.is_empty());
    }

    #[test]
    fn erase_stale_position_is_none() {
        let mut nodes = Nodes::with_key();
        let mut c = chain_of(&mut nodes, &[("a", 1)]);
        let pos = c.head().unwrap();
        assert!(c.erase(&mut nodes, pos).is_some());
        assert!(c.erase(&mut nodes, pos).is_none());
        assert_eq!(c.len(), 0);
    }

    #[test]
    fn push_front_relinks_moved_node() {
        // A node taken from one chain's links can be pushed into another.
        let mut nodes = Nodes::with_key();
        let a = chain_of(&mut nodes, &[("a", 1), ("b", 2)]);
        let moved: Vec<NodeKey> = a.iter(&nodes).collect();
        let mut b = Chain::new();
        for pos in moved {
            b.push_front(&mut nodes, pos);
        }
        assert_eq!(keys(&b, &nodes), vec!["a", "b"]);
    }
}
