//! Shared search state for the local searches run during contraction.
//!
//! A [`SearchContext`] bundles an arena of [`SearchNode`] labels, a
//! node-id index into that arena and an addressable binary min-heap.
//! The arena survives `clear_pq` so that a later search phase can reuse
//! the labels computed by an earlier one on the same node set.

use ahash::AHashMap;
use ordered_float::OrderedFloat;

use crate::distribution::Distribution;
use crate::ids::{EdgeId, INVALID_EDGE_ID, INVALID_NODE_ID, NodeId};
use crate::io::specif::Specif;

/// Arena slot of a search node; stable for the lifetime of a search.
pub type SlotId = usize;

pub const INVALID_SLOT: SlotId = usize::MAX;

/// Closed travel-time interval, infinite by default.
#[derive(Clone, Copy, Debug)]
pub struct Interval {
    lb: f64,
    ub: f64,
}

impl Default for Interval {
    fn default() -> Interval {
        Interval { lb: f64::MAX, ub: f64::MAX }
    }
}

impl Interval {
    pub fn new(lb: f64, ub: f64) -> Interval {
        Interval { lb, ub }
    }

    pub fn lb(&self) -> f64 {
        self.lb
    }

    pub fn ub(&self) -> f64 {
        self.ub
    }

    pub fn is_infinite(&self) -> bool {
        self.lb == f64::MAX && self.ub == f64::MAX
    }

    /// Componentwise minimum of both intervals.
    pub fn merge(&self, other: &Interval) -> Interval {
        Interval { lb: self.lb.min(other.lb), ub: self.ub.min(other.ub) }
    }
}

/// Incoming backward edge together with the arena slot it came from.
#[derive(Clone, Copy, Debug)]
pub struct Predecessor {
    pub bw_edge: EdgeId,
    pub slot: SlotId,
}

impl Default for Predecessor {
    fn default() -> Predecessor {
        Predecessor { bw_edge: INVALID_EDGE_ID, slot: INVALID_SLOT }
    }
}

/// Per-node label shared by the interval, expected-time and profile
/// phases. Each phase keeps its own hop counter; the predecessor pair
/// records the backward edges that produced the interval bounds and
/// spans the thinned graph the later phases walk.
#[derive(Clone, Debug)]
pub struct SearchNode {
    node_id: NodeId,
    pred_id: NodeId,
    enqueued: bool,
    interval_hop: u8,
    sample_hop: u8,
    profile_hop: u8,
    interval: Interval,
    expected_time: f64,
    distribution: Distribution,
    pred_lb: Predecessor,
    pred_ub: Predecessor,
}

impl SearchNode {
    fn new(node_id: NodeId, pred_id: NodeId, grid_size: usize, delta: u32) -> SearchNode {
        SearchNode {
            node_id,
            pred_id,
            enqueued: true,
            interval_hop: 0,
            sample_hop: 0,
            profile_hop: 0,
            interval: Interval::default(),
            expected_time: f64::MAX,
            distribution: Distribution::infinite(grid_size, delta),
            pred_lb: Predecessor::default(),
            pred_ub: Predecessor::default(),
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn pred_id(&self) -> NodeId {
        self.pred_id
    }

    pub fn set_pred_id(&mut self, pred: NodeId) {
        self.pred_id = pred;
    }

    pub fn enqueued(&self) -> bool {
        self.enqueued
    }

    pub fn interval_hop(&self) -> u8 {
        self.interval_hop
    }

    pub fn set_interval_hop(&mut self, hop: u8) {
        self.interval_hop = hop;
    }

    pub fn sample_hop(&self) -> u8 {
        self.sample_hop
    }

    pub fn set_sample_hop(&mut self, hop: u8) {
        self.sample_hop = hop;
    }

    pub fn profile_hop(&self) -> u8 {
        self.profile_hop
    }

    pub fn set_profile_hop(&mut self, hop: u8) {
        self.profile_hop = hop;
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn set_interval(&mut self, lb: f64, ub: f64) {
        self.interval = Interval::new(lb, ub);
    }

    pub fn expected_time(&self) -> f64 {
        self.expected_time
    }

    pub fn set_expected_time(&mut self, t: f64) {
        self.expected_time = t;
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    pub fn set_distribution(&mut self, dist: Distribution) {
        self.distribution = dist;
    }

    pub fn infinite_distribution(&self) -> bool {
        self.distribution.is_infinite()
    }

    pub fn predecessor_lb(&self) -> Predecessor {
        self.pred_lb
    }

    pub fn predecessor_ub(&self) -> Predecessor {
        self.pred_ub
    }

    pub fn set_predecessor_lb(&mut self, bw_edge: EdgeId, slot: SlotId) {
        self.pred_lb = Predecessor { bw_edge, slot };
    }

    pub fn set_predecessor_ub(&mut self, bw_edge: EdgeId, slot: SlotId) {
        self.pred_ub = Predecessor { bw_edge, slot };
    }

    pub fn set_bounding_predecessors(&mut self, bw_edge: EdgeId, slot: SlotId) {
        self.pred_lb = Predecessor { bw_edge, slot };
        self.pred_ub = Predecessor { bw_edge, slot };
    }
}

#[derive(Clone, Copy)]
struct HeapEntry {
    priority: OrderedFloat<f64>,
    slot: SlotId,
}

/// Label arena plus priority queue, reusable across search phases.
///
/// `clear_pq` empties the queue but keeps every label, so the phase
/// that follows can start from the state the previous one left behind.
/// `clear_all` resets everything for the next origin/destination pair.
pub struct SearchContext {
    nb_pts: u32,
    delta: u32,
    nodes: Vec<SearchNode>,
    index: AHashMap<NodeId, SlotId>,
    heap: Vec<HeapEntry>,
    /// Arena slot to heap position, `INVALID_SLOT` when dequeued.
    positions: Vec<usize>,
}

impl SearchContext {
    pub fn new(specif: &Specif) -> SearchContext {
        SearchContext {
            nb_pts: specif.nb_pts(),
            delta: specif.delta(),
            nodes: Vec::new(),
            index: AHashMap::new(),
            heap: Vec::new(),
            positions: Vec::new(),
        }
    }

    pub fn nb_pts(&self) -> u32 {
        self.nb_pts
    }

    pub fn delta(&self) -> u32 {
        self.delta
    }

    pub fn empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Whether the graph node already owns a label in the arena.
    pub fn reached(&self, node: NodeId) -> bool {
        self.index.contains_key(&node)
    }

    pub fn slot_of(&self, node: NodeId) -> Option<SlotId> {
        self.index.get(&node).copied()
    }

    pub fn node(&self, slot: SlotId) -> &SearchNode {
        &self.nodes[slot]
    }

    pub fn node_mut(&mut self, slot: SlotId) -> &mut SearchNode {
        &mut self.nodes[slot]
    }

    /// Priority of the queue minimum, or the maximum float when empty.
    pub fn min_priority(&self) -> f64 {
        match self.heap.first() {
            Some(entry) => entry.priority.into_inner(),
            None => f64::MAX,
        }
    }

    /// Creates a fresh label for `node` and enqueues it.
    pub fn insert(&mut self, node: NodeId, priority: f64, pred: NodeId) -> SlotId {
        let slot = self.nodes.len();
        let grid_size = self.nb_pts as usize + 1;
        self.nodes.push(SearchNode::new(node, pred, grid_size, self.delta));
        self.index.insert(node, slot);
        self.positions.push(INVALID_SLOT);
        self.push_entry(HeapEntry { priority: OrderedFloat(priority), slot });
        slot
    }

    /// Re-enqueues a label that already lives in the arena.
    pub fn insert_again(&mut self, slot: SlotId, priority: f64) {
        debug_assert!(!self.nodes[slot].enqueued);
        self.nodes[slot].enqueued = true;
        self.push_entry(HeapEntry { priority: OrderedFloat(priority), slot });
    }

    /// Lowers the priority of an enqueued label.
    pub fn decrease(&mut self, slot: SlotId, priority: f64) {
        debug_assert!(self.nodes[slot].enqueued);
        let pos = self.positions[slot];
        self.heap[pos].priority = OrderedFloat(priority);
        self.sift_up(pos);
    }

    /// Enqueues or re-prioritizes depending on the label's queue state.
    pub fn update(&mut self, slot: SlotId, priority: f64) {
        if self.nodes[slot].enqueued {
            self.decrease(slot, priority);
        } else {
            self.insert_again(slot, priority);
        }
    }

    /// Pops the queue minimum and returns its arena slot.
    pub fn delete_min(&mut self) -> SlotId {
        let root = self.heap[0];
        let last = self.heap.pop().unwrap_or(root);
        if !self.heap.is_empty() {
            self.heap[0] = last;
            self.positions[last.slot] = 0;
            self.sift_down(0);
        }
        self.positions[root.slot] = INVALID_SLOT;
        self.nodes[root.slot].enqueued = false;
        root.slot
    }

    /// Empties the queue without touching the labels.
    pub fn clear_pq(&mut self) {
        for entry in self.heap.drain(..) {
            self.nodes[entry.slot].enqueued = false;
        }
        for pos in self.positions.iter_mut() {
            *pos = INVALID_SLOT;
        }
    }

    /// Drops every label, index entry and queued item.
    pub fn clear_all(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.heap.clear();
        self.positions.clear();
    }

    fn push_entry(&mut self, entry: HeapEntry) {
        let pos = self.heap.len();
        self.positions[entry.slot] = pos;
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
        self.positions[self.heap[a].slot] = a;
        self.positions[self.heap[b].slot] = b;
    }
}

/// Dummy origin id for labels without a meaningful parent.
pub const NO_PREDECESSOR: NodeId = INVALID_NODE_ID;

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> SearchContext {
        SearchContext::new(&Specif::new(8, 8, 4, 5))
    }

    #[test]
    fn delete_min_returns_labels_in_priority_order() {
        let mut ctx = context();
        ctx.insert(NodeId(3), 7.0, NO_PREDECESSOR);
        ctx.insert(NodeId(1), 2.0, NO_PREDECESSOR);
        ctx.insert(NodeId(2), 5.0, NO_PREDECESSOR);
        let order: Vec<NodeId> = (0..3)
            .map(|_| {
                let slot = ctx.delete_min();
                ctx.node(slot).node_id()
            })
            .collect();
        assert_eq!(order, vec![NodeId(1), NodeId(2), NodeId(3)], "heap must pop by priority");
        assert!(ctx.empty());
        assert_eq!(ctx.min_priority(), f64::MAX);
    }

    #[test]
    fn decrease_moves_a_label_ahead() {
        let mut ctx = context();
        ctx.insert(NodeId(0), 10.0, NO_PREDECESSOR);
        let slot = ctx.insert(NodeId(1), 20.0, NO_PREDECESSOR);
        ctx.decrease(slot, 1.0);
        let popped = ctx.delete_min();
        assert_eq!(ctx.node(popped).node_id(), NodeId(1));
    }

    #[test]
    fn clear_pq_keeps_labels_but_empties_the_queue() {
        let mut ctx = context();
        let slot = ctx.insert(NodeId(4), 3.0, NO_PREDECESSOR);
        ctx.node_mut(slot).set_expected_time(12.0);
        ctx.clear_pq();
        assert!(ctx.empty());
        assert!(ctx.reached(NodeId(4)), "arena must survive a queue reset");
        assert!(!ctx.node(slot).enqueued());
        assert_eq!(ctx.node(slot).expected_time(), 12.0);
        ctx.insert_again(slot, 1.0);
        assert_eq!(ctx.delete_min(), slot);
    }

    #[test]
    fn clear_all_forgets_everything() {
        let mut ctx = context();
        ctx.insert(NodeId(4), 3.0, NO_PREDECESSOR);
        ctx.clear_all();
        assert!(!ctx.reached(NodeId(4)));
        assert!(ctx.empty());
    }

    #[test]
    fn interval_merge_takes_componentwise_minimum() {
        let a = Interval::new(3.0, 10.0);
        let b = Interval::new(5.0, 8.0);
        let merged = a.merge(&b);
        assert_eq!(merged.lb(), 3.0);
        assert_eq!(merged.ub(), 8.0);
        assert!(Interval::default().is_infinite());
    }
}
