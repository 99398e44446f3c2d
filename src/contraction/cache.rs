//! Memoized witness verdicts, indexed by the bypassed middle node.
//!
//! Contraction costs are re-evaluated many times while the ordering
//! converges; caching each `u -> x -> v` verdict avoids re-running the
//! same witness search. Entries go stale as soon as one of their edges
//! changes, so removal supports wildcards on origin and destination.

use crate::ids::{INVALID_NODE_ID, NodeId};
use crate::witness::Verdict;

/// Cached outcome of one witness search, keyed by the triple
/// `origin -> middle -> destination`.
#[derive(Clone, Copy, Debug)]
pub struct CacheEntry {
    pub status: Verdict,
    pub complexity: u32,
    pub origin: NodeId,
    pub middle: NodeId,
    pub destination: NodeId,
}

impl Default for CacheEntry {
    fn default() -> CacheEntry {
        CacheEntry {
            status: Verdict::Undecided,
            complexity: 0,
            origin: INVALID_NODE_ID,
            middle: INVALID_NODE_ID,
            destination: INVALID_NODE_ID,
        }
    }
}

impl CacheEntry {
    pub fn new(
        status: Verdict,
        complexity: u32,
        origin: NodeId,
        middle: NodeId,
        destination: NodeId,
    ) -> CacheEntry {
        CacheEntry { status, complexity, origin, middle, destination }
    }
}

/// All cached verdicts, one bucket per middle node.
pub struct WitnessCache {
    data: Vec<Vec<CacheEntry>>,
}

impl WitnessCache {
    pub fn new(nb_nodes: u32) -> WitnessCache {
        WitnessCache { data: vec![Vec::new(); nb_nodes as usize] }
    }

    pub fn empty(&self, x: NodeId) -> bool {
        self.data[x.idx()].is_empty()
    }

    /// Verdict recorded for `u -> x -> v`, or a default undecided
    /// entry when nothing is cached.
    pub fn lookup(&self, u: NodeId, x: NodeId, v: NodeId) -> CacheEntry {
        self.data[x.idx()]
            .iter()
            .find(|entry| entry.origin == u && entry.destination == v)
            .copied()
            .unwrap_or_default()
    }

    pub fn contains(&self, u: NodeId, x: NodeId, v: NodeId) -> bool {
        self.lookup(u, x, v).middle != INVALID_NODE_ID
    }

    pub fn insert(&mut self, entry: CacheEntry) {
        self.data[entry.middle.idx()].push(entry);
    }

    /// Drops every entry whose middle node is `x`.
    pub fn remove_middle(&mut self, x: NodeId) {
        self.data[x.idx()].clear();
        self.data[x.idx()].shrink_to_fit();
    }

    /// Drops entries through `x` matching `u` and `v`; the invalid
    /// node id acts as a wildcard on either endpoint.
    pub fn remove(&mut self, u: NodeId, x: NodeId, v: NodeId) {
        let bucket = &mut self.data[x.idx()];
        let mut i = 0;
        while i < bucket.len() {
            let entry = bucket[i];
            if (u == INVALID_NODE_ID || u == entry.origin)
                && (v == INVALID_NODE_ID || v == entry.destination)
            {
                bucket.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(u: u32, x: u32, v: u32) -> CacheEntry {
        CacheEntry::new(Verdict::Necessary, 3, NodeId(u), NodeId(x), NodeId(v))
    }

    #[test]
    fn lookup_finds_the_exact_triple() {
        let mut cache = WitnessCache::new(5);
        cache.insert(entry(0, 2, 4));
        cache.insert(entry(1, 2, 4));
        assert!(cache.contains(NodeId(0), NodeId(2), NodeId(4)));
        assert!(!cache.contains(NodeId(0), NodeId(2), NodeId(3)));
        assert_eq!(cache.lookup(NodeId(1), NodeId(2), NodeId(4)).complexity, 3);
        assert_eq!(cache.lookup(NodeId(3), NodeId(2), NodeId(4)).status, Verdict::Undecided);
    }

    #[test]
    fn wildcard_removal_clears_all_matching_endpoints() {
        let mut cache = WitnessCache::new(5);
        cache.insert(entry(0, 2, 4));
        cache.insert(entry(1, 2, 4));
        cache.insert(entry(1, 2, 3));
        cache.remove(INVALID_NODE_ID, NodeId(2), NodeId(4));
        assert!(!cache.contains(NodeId(0), NodeId(2), NodeId(4)));
        assert!(!cache.contains(NodeId(1), NodeId(2), NodeId(4)));
        assert!(cache.contains(NodeId(1), NodeId(2), NodeId(3)));
    }

    #[test]
    fn removing_the_middle_node_empties_its_bucket() {
        let mut cache = WitnessCache::new(5);
        cache.insert(entry(0, 2, 4));
        cache.remove_middle(NodeId(2));
        assert!(cache.empty(NodeId(2)));
    }
}
