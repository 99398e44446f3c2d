//! Backward-grown paths of the label-correcting search.
//!
//! A [`SpotarPath`] always ends at the destination; growth happens by
//! prepending nodes. Besides the dominance degree it remembers the id
//! of the path it was extended from, which chains policies together.

use std::collections::VecDeque;

use crate::distribution::Distribution;
use crate::ids::{EdgeId, INVALID_NODE_ID, NodeId};

pub const INVALID_SPOTAR_ID: u32 = u32::MAX;

#[derive(Clone, Debug)]
pub struct SpotarPath {
    id: u32,
    dsd: i64,
    suffix_id: u32,
    nodes: VecDeque<NodeId>,
    edges: VecDeque<EdgeId>,
    dist: Distribution,
}

impl SpotarPath {
    /// Trivial path staying on the destination node.
    pub fn trivial(id: u32, node: NodeId, size: usize, delta: u32) -> SpotarPath {
        let mut nodes = VecDeque::new();
        nodes.push_back(node);
        SpotarPath {
            id,
            dsd: size as i64,
            suffix_id: INVALID_SPOTAR_ID,
            nodes,
            edges: VecDeque::new(),
            dist: Distribution::zero(size, delta),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    pub fn dsd(&self) -> i64 {
        self.dsd
    }

    pub fn set_dsd(&mut self, degree: i64) {
        self.dsd = degree;
    }

    pub fn increment_dsd(&mut self) {
        self.dsd += 1;
    }

    pub fn decrement_dsd(&mut self) {
        self.dsd -= 1;
    }

    pub fn suffix(&self) -> u32 {
        self.suffix_id
    }

    pub fn set_suffix(&mut self, path_id: u32) {
        self.suffix_id = path_id;
    }

    pub fn nodes(&self) -> &VecDeque<NodeId> {
        &self.nodes
    }

    pub fn first_node(&self) -> NodeId {
        self.nodes.front().copied().unwrap_or(INVALID_NODE_ID)
    }

    pub fn last_node(&self) -> NodeId {
        self.nodes.back().copied().unwrap_or(INVALID_NODE_ID)
    }

    pub fn edges(&self) -> &VecDeque<EdgeId> {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn distribution(&self) -> &Distribution {
        &self.dist
    }

    pub fn shortest_time(&self) -> u32 {
        self.dist.min()
    }

    pub fn largest_time(&self) -> u32 {
        self.dist.max()
    }

    /// On-time probability for time budget index `t`.
    pub fn cdf_at(&self, t: usize) -> f64 {
        self.dist.cdf_at(t)
    }

    pub fn visits(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Extends the path one edge backward, from `node` into its first
    /// node. Identifiers are left unset; the caller decides them.
    pub fn append_bw(&self, node: NodeId, edge: EdgeId, dist: &Distribution) -> SpotarPath {
        let mut nodes = self.nodes.clone();
        nodes.push_front(node);
        let mut edges = self.edges.clone();
        edges.push_front(edge);
        SpotarPath {
            id: INVALID_SPOTAR_ID,
            dsd: 0,
            suffix_id: INVALID_SPOTAR_ID,
            nodes,
            edges,
            dist: dist.convolute(&self.dist),
        }
    }
}
