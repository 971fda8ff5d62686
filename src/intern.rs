//! Intern table: a fixed-size, chained hash set of nodes keyed by value
//! equality on their states.
//!
//! The table never rehashes. Collisions chain through the nodes' intrusive
//! `bucket_next` links, appended in intern order, and lookups resolve them by
//! `Eq`; a weak hash costs scan time, not correctness.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::node::{Arena, NodeId};

pub(crate) struct InternTable {
    buckets: Box<[Option<NodeId>]>,
}

impl InternTable {
    pub(crate) fn new(num_buckets: usize) -> Self {
        Self {
            buckets: vec![None; num_buckets].into_boxed_slice(),
        }
    }

    // DefaultHasher::new() is keyed with fixed constants, so bucket
    // assignment is stable run to run.
    fn bucket_of<S: Hash>(&self, state: &S) -> usize {
        let mut hasher = DefaultHasher::new();
        state.hash(&mut hasher);
        (hasher.finish() % self.buckets.len() as u64) as usize
    }

    /// Look up an already-interned node holding a state equal to `state`.
    pub(crate) fn find<S: Eq + Hash>(&self, nodes: &Arena<S>, state: &S) -> Option<NodeId> {
        let mut cursor = self.buckets[self.bucket_of(state)];
        while let Some(id) = cursor {
            if nodes[id].state == *state {
                return Some(id);
            }
            cursor = nodes[id].bucket_next;
        }
        None
    }

    /// Link a freshly-allocated node into its bucket chain.
    ///
    /// The caller guarantees no equal state is already interned.
    pub(crate) fn insert<S: Eq + Hash>(&mut self, nodes: &mut Arena<S>, id: NodeId) {
        let bucket = self.bucket_of(&nodes[id].state);
        match self.buckets[bucket] {
            None => self.buckets[bucket] = Some(id),
            Some(head) => {
                let mut tail = head;
                while let Some(next) = nodes[tail].bucket_next {
                    tail = next;
                }
                nodes[tail].bucket_next = Some(id);
            }
        }
    }

    /// Length of the longest bucket chain.
    pub(crate) fn longest_chain<S>(&self, nodes: &Arena<S>) -> usize {
        self.buckets
            .iter()
            .map(|head| {
                let mut len = 0;
                let mut cursor = *head;
                while let Some(id) = cursor {
                    len += 1;
                    cursor = nodes[id].bucket_next;
                }
                len
            })
            .max()
            .unwrap_or(0)
    }
}
