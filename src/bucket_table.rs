//! Bucket table: fixed-length slots, each holding at most one chain.

use crate::chain::{Chain, Node, NodeKey, Nodes};
use std::collections::TryReserveError;

#[derive(Clone, Debug)]
pub(crate) struct BucketTable {
    slots: Vec<Option<Chain>>,
}

impl BucketTable {
    /// Table of `len` empty slots.
    pub(crate) fn with_len(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    /// Like `with_len`, reporting allocation failure instead of aborting.
    pub(crate) fn try_with_len(len: usize) -> Result<Self, TryReserveError> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(len)?;
        slots.resize(len, None);
        Ok(Self { slots })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Slot a hash belongs to at the current length.
    #[inline]
    pub(crate) fn slot_for(&self, hash: u64) -> usize {
        (hash % self.slots.len() as u64) as usize
    }

    #[inline]
    pub(crate) fn get(&self, slot: usize) -> Option<&Chain> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Link `pos` at the front of `slot`, creating the chain if the slot is
    /// vacant.
    pub(crate) fn push_front<K, V>(&mut self, slot: usize, nodes: &mut Nodes<K, V>, pos: NodeKey) {
        self.slots[slot]
            .get_or_insert_with(Chain::new)
            .push_front(nodes, pos);
    }

    /// Remove `pos` from the chain in `slot`. The slot is released when its
    /// chain becomes empty.
    pub(crate) fn erase<K, V>(
        &mut self,
        slot: usize,
        nodes: &mut Nodes<K, V>,
        pos: NodeKey,
    ) -> Option<Node<K, V>> {
        let chain = self.slots.get_mut(slot)?.as_mut()?;
        let node = chain.erase(nodes, pos)?;
        if chain.is_empty() {
            self.slots[slot] = None;
        }
        Some(node)
    }

    /// First occupied slot at or after `from`.
    pub(crate) fn next_occupied(&self, from: usize) -> Option<usize> {
        self.slots
            .get(from..)?
            .iter()
            .position(Option::is_some)
            .map(|off| from + off)
    }

    /// Release every chain; the length is unchanged.
    pub(crate) fn clear(&mut self) {
        self.slots.fill(None);
    }

    #[cfg(test)]
    pub(crate) fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    #[cfg(test)]
    pub(crate) fn total_len(&self) -> usize {
        self.slots.iter().flatten().map(Chain::len).sum()
    }
}
