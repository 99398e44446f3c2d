//! Per-direction search state of the bidirectional profile search.
//!
//! Unlike the contraction-time searches, query labels carry a whole
//! routing policy, so the arena is keyed directly by graph node and the
//! heap is addressed through a node-to-position table.

use std::collections::BTreeMap;

use ahash::AHashMap;
use ordered_float::OrderedFloat;

use crate::distribution::Distribution;
use crate::ids::{EdgeId, NodeId};
use crate::io::specif::Specif;
use crate::numeric::le;
use crate::query::policy::RoutingPolicy;

/// Label of one node in one search direction.
#[derive(Clone, Debug)]
pub struct QuerySearchNode {
    node_id: NodeId,
    enqueued: bool,
    policy: RoutingPolicy,
}

impl QuerySearchNode {
    /// Label of a search origin: trivial policy, in the queue.
    pub fn origin(node_id: NodeId, size: usize, delta: u32) -> QuerySearchNode {
        QuerySearchNode { node_id, enqueued: true, policy: RoutingPolicy::source(node_id, size, delta) }
    }

    /// Stand-in for a node the opposite search never reached.
    pub fn unreached(node_id: NodeId, size: usize, delta: u32) -> QuerySearchNode {
        QuerySearchNode { node_id, enqueued: false, policy: RoutingPolicy::empty(node_id, size, delta) }
    }

    /// Label produced by relaxing `edge` from a predecessor policy.
    pub fn relaxed(
        node_id: NodeId,
        pred: &RoutingPolicy,
        edge: EdgeId,
        dist: &Distribution,
    ) -> QuerySearchNode {
        QuerySearchNode {
            node_id,
            enqueued: true,
            policy: RoutingPolicy::extended(pred, node_id, edge, dist),
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn enqueued(&self) -> bool {
        self.enqueued
    }

    pub fn policy(&self) -> &RoutingPolicy {
        &self.policy
    }

    /// Smallest possible travel time of the policy frontier.
    pub fn dist_min(&self) -> f64 {
        self.policy.shortest_time()
    }

    /// Largest possible travel time of the policy frontier.
    pub fn dist_max(&self) -> f64 {
        self.policy.largest_time()
    }

    pub fn reset_policy(&mut self, pred: &RoutingPolicy, edge: EdgeId, dist: &Distribution) {
        self.policy.reset(pred, edge, dist);
    }

    pub fn add_paths(&mut self, pred: &RoutingPolicy, edge: EdgeId, dist: &Distribution) -> bool {
        self.policy.add_paths(pred, edge, dist)
    }

    /// Joins this forward policy with the backward policy of the same
    /// node into a destination policy.
    pub fn append_policy(&self, other: &QuerySearchNode) -> RoutingPolicy {
        self.policy.append(other.policy())
    }
}

#[derive(Clone, Copy)]
struct HeapEntry {
    priority: OrderedFloat<f64>,
    node: NodeId,
}

const NOT_QUEUED: usize = usize::MAX;

/// Node labels plus an addressable priority queue for one direction.
pub struct QueryContext {
    size: usize,
    delta: u32,
    nodes: BTreeMap<NodeId, QuerySearchNode>,
    heap: Vec<HeapEntry>,
    positions: AHashMap<NodeId, usize>,
}

impl QueryContext {
    pub fn new(specif: &Specif) -> QueryContext {
        QueryContext {
            size: specif.grid_size(),
            delta: specif.delta(),
            nodes: BTreeMap::new(),
            heap: Vec::new(),
            positions: AHashMap::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn delta(&self) -> u32 {
        self.delta
    }

    pub fn empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Whether the node owns a label, queued or not.
    pub fn reached(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|n| n.enqueued)
    }

    pub fn node(&self, node: NodeId) -> Option<&QuerySearchNode> {
        self.nodes.get(&node)
    }

    /// Priority of the queue minimum, or the maximum float when empty.
    pub fn min_priority(&self) -> f64 {
        match self.heap.first() {
            Some(entry) => entry.priority.into_inner(),
            None => f64::MAX,
        }
    }

    /// Seeds the search with its origin node.
    pub fn init(&mut self, node: NodeId, priority: f64) {
        debug_assert!(self.heap.is_empty());
        self.nodes.insert(node, QuerySearchNode::origin(node, self.size, self.delta));
        self.push_entry(HeapEntry { priority: OrderedFloat(priority), node });
    }

    /// Labels a freshly reached node with a relaxed policy.
    pub fn insert(
        &mut self,
        node: NodeId,
        priority: f64,
        pred: &RoutingPolicy,
        edge: EdgeId,
        dist: &Distribution,
    ) {
        self.nodes.insert(node, QuerySearchNode::relaxed(node, pred, edge, dist));
        self.push_entry(HeapEntry { priority: OrderedFloat(priority), node });
    }

    /// Re-enqueues a labelled node that left the queue earlier.
    pub fn insert_again(&mut self, node: NodeId, priority: f64) {
        if let Some(label) = self.nodes.get_mut(&node) {
            label.enqueued = true;
        }
        self.push_entry(HeapEntry { priority: OrderedFloat(priority), node });
    }

    /// Lowers the priority of an enqueued node.
    pub fn decrease(&mut self, node: NodeId, priority: f64) {
        if let Some(pos) = self.positions.get(&node).copied() {
            if pos != NOT_QUEUED && OrderedFloat(priority) < self.heap[pos].priority {
                self.heap[pos].priority = OrderedFloat(priority);
                self.sift_up(pos);
            }
        }
    }

    /// Enqueues or re-prioritizes depending on the node's queue state.
    pub fn update(&mut self, node: NodeId, priority: f64) {
        if self.contains(node) {
            self.decrease(node, priority);
        } else {
            self.insert_again(node, priority);
        }
    }

    /// Confronts a relaxed candidate policy with the label of `node`.
    ///
    /// Nothing happens when the existing frontier dominates the
    /// candidate deterministically; the label is rebuilt from scratch
    /// when the candidate dominates the frontier; otherwise the
    /// candidate paths fight their way in budget by budget. Returns
    /// true when the label changed and the queue must be refreshed.
    pub fn manage_policy(
        &mut self,
        node: NodeId,
        candidate_value: f64,
        pred: &RoutingPolicy,
        edge: EdgeId,
        dist_uv: &Distribution,
    ) -> bool {
        let Some(label) = self.nodes.get_mut(&node) else {
            return false;
        };
        if le(label.dist_max(), candidate_value) {
            return false;
        }
        if le(pred.largest_time() + f64::from(dist_uv.max()), label.dist_min()) {
            label.reset_policy(pred, edge, dist_uv);
            return true;
        }
        label.add_paths(pred, edge, dist_uv)
    }

    /// Pops the queue minimum and returns its node id.
    pub fn delete_min(&mut self) -> NodeId {
        debug_assert!(!self.heap.is_empty());
        let root = self.heap[0];
        let last = self.heap.pop().unwrap_or(root);
        if !self.heap.is_empty() {
            self.heap[0] = last;
            self.positions.insert(last.node, 0);
            self.sift_down(0);
        }
        self.positions.insert(root.node, NOT_QUEUED);
        if let Some(label) = self.nodes.get_mut(&root.node) {
            label.enqueued = false;
        }
        root.node
    }

    /// Drops every label and queued item.
    pub fn clear_all(&mut self) {
        self.nodes.clear();
        self.heap.clear();
        self.positions.clear();
    }

    fn push_entry(&mut self, entry: HeapEntry) {
        let pos = self.heap.len();
        self.positions.insert(entry.node, pos);
        self.heap.push(entry);
        self.sift_up(pos);
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.heap[parent].priority <= self.heap[pos].priority {
                break;
            }
            self.swap_entries(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        loop {
            let left = 2 * pos + 1;
            let right = 2 * pos + 2;
            let mut best = pos;
            if left < self.heap.len() && self.heap[left].priority < self.heap[best].priority {
                best = left;
            }
            if right < self.heap.len() && self.heap[right].priority < self.heap[best].priority {
                best = right;
            }
            if best == pos {
                break;
            }
            self.swap_entries(pos, best);
            pos = best;
        }
    }

    fn swap_entries(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.positions.insert(self.heap[a].node, a);
        self.positions.insert(self.heap[b].node, b);
    }
}
