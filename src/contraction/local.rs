//! Per-worker scratch state for the parallel contraction phases.

use crate::contraction::cache::CacheEntry;
use crate::distribution::Distribution;
use crate::graph::Graph;
use crate::graph::edge::Edge;
use crate::ids::NodeId;
use crate::witness::{Verdict, WitnessSearch};

/// Worker-local accumulator: one witness-search state plus the edges
/// and cache entries produced by the searches it ran. Results are
/// drained by the sequential merge step after each parallel phase.
pub struct LocalThread {
    witness: WitnessSearch,
    edges_to_insert: Vec<Edge>,
    witness_to_cache: Vec<CacheEntry>,
}

impl LocalThread {
    pub fn new(graph: &Graph) -> LocalThread {
        LocalThread {
            witness: WitnessSearch::new(graph),
            edges_to_insert: Vec::new(),
            witness_to_cache: Vec::new(),
        }
    }

    pub fn run(
        &mut self,
        graph: &Graph,
        u: NodeId,
        x: NodeId,
        v: NodeId,
        dist_uxv: &Distribution,
    ) -> Verdict {
        self.witness.run(graph, u, x, v, dist_uxv)
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.edges_to_insert.push(edge);
    }

    pub fn add_cache_entry(&mut self, entry: CacheEntry) {
        self.witness_to_cache.push(entry);
    }

    pub fn take_edges(&mut self) -> Vec<Edge> {
        std::mem::take(&mut self.edges_to_insert)
    }

    pub fn take_cache_entries(&mut self) -> Vec<CacheEntry> {
        std::mem::take(&mut self.witness_to_cache)
    }
}
