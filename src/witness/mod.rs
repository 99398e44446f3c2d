//! Witness search deciding whether contracting a node needs a shortcut.
//!
//! Three phases of increasing cost share one [`SearchContext`]:
//! a hop-limited backward interval search that bounds travel times and
//! records the predecessor pairs spanning a thinned graph, a forward
//! expected-time search over that thinned graph to catch trivial
//! verdicts, and a forward profile search that convolutes full
//! distributions only when the cheaper phases stay inconclusive.

pub mod context;

use crate::distribution::Distribution;
use crate::graph::Graph;
use crate::ids::{INVALID_EDGE_ID, NodeId};
use crate::numeric::{eq, ge, gt, lt};
use crate::witness::context::{Interval, NO_PREDECESSOR, SearchContext};

/// Outcome of a witness search for one `u -> x -> v` triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Not yet searched, or invalidated since.
    Undecided,
    /// No witness path beats the deleted path, a shortcut is required.
    Necessary,
    /// A witness path dominates the deleted path.
    NotNecessary,
}

/// Paths longer than this many edges are never considered witnesses.
const HOP_LIMIT: u8 = 8;

pub struct WitnessSearch {
    pq: SearchContext,
}

impl WitnessSearch {
    pub fn new(graph: &Graph) -> WitnessSearch {
        WitnessSearch { pq: SearchContext::new(graph.specif()) }
    }

    /// Decides whether removing `x` forces a shortcut `u -> v` whose
    /// weight would be `dist_uxv`, the convolution of both deleted
    /// edges.
    pub fn run(
        &mut self,
        graph: &Graph,
        u_it: NodeId,
        x_it: NodeId,
        v_it: NodeId,
        dist_uxv: &Distribution,
    ) -> Verdict {
        self.pq.clear_all();
        self.backward_interval_search(graph, v_it, x_it, u_it);
        // An origin never reached backward means no witness path exists.
        let Some(u_slot) = self.pq.slot_of(u_it) else {
            return Verdict::Necessary;
        };
        let interval_uv = self.pq.node(u_slot).interval();
        if interval_uv.is_infinite() {
            return Verdict::Necessary;
        }
        if lt(interval_uv.ub(), dist_uxv.min() as f64) {
            return Verdict::NotNecessary;
        }
        if lt(dist_uxv.max() as f64, interval_uv.lb()) {
            return Verdict::Necessary;
        }
        self.pq.clear_pq();
        self.expected_time_search(graph, u_it, v_it);
        let Some(v_slot) = self.pq.slot_of(v_it) else {
            return Verdict::Necessary;
        };
        if lt(dist_uxv.esp(), self.pq.node(v_slot).expected_time()) {
            return Verdict::Necessary;
        }
        self.pq.clear_pq();
        self.profile_search(graph, u_it, v_it);
        let dist_uv = self.pq.node(v_slot).distribution();
        if dist_uv.is_infinite() {
            return Verdict::Necessary;
        }
        if lt(dist_uv.max() as f64, dist_uxv.min() as f64) {
            return Verdict::NotNecessary;
        }
        if dist_uv.is_larger_than(dist_uxv) {
            return Verdict::NotNecessary;
        }
        Verdict::Necessary
    }

    /// Hop-limited reverse search from `destination` that labels every
    /// node with a travel-time interval toward it, skipping `deleted`.
    /// Each label remembers the backward edges that produced its two
    /// bounds; those predecessor pairs span the graph walked by the
    /// forward phases.
    fn backward_interval_search(
        &mut self,
        graph: &Graph,
        destination: NodeId,
        deleted: NodeId,
        start: NodeId,
    ) {
        let d_slot = self.pq.insert(destination, 0.0, NO_PREDECESSOR);
        {
            let d = self.pq.node_mut(d_slot);
            d.set_interval_hop(0);
            d.set_interval(0.0, 0.0);
        }
        while !self.pq.empty() {
            // Settle early once the start interval beats the queue.
            if let Some(s_slot) = self.pq.slot_of(start) {
                let s_interval = self.pq.node(s_slot).interval();
                if !s_interval.is_infinite() && ge(self.pq.min_priority(), s_interval.ub()) {
                    return;
                }
            }
            let u_slot = self.pq.delete_min();
            let (u_it, u_pred, u_interval, u_hops) = {
                let u = self.pq.node(u_slot);
                if u.interval_hop() >= HOP_LIMIT {
                    continue;
                }
                (u.node_id(), u.pred_id(), u.interval(), u.interval_hop())
            };
            for e in graph.bw_edge_ids(u_it) {
                let edge = graph.bw_edge(e);
                let v_it = edge.origin;
                if v_it == deleted || v_it == u_pred {
                    continue;
                }
                let candidate = Interval::new(
                    u_interval.lb() + edge.weight.min() as f64,
                    u_interval.ub() + edge.weight.max() as f64,
                );
                match self.pq.slot_of(v_it) {
                    None => {
                        let v_slot = self.pq.insert(v_it, candidate.lb(), u_it);
                        let v = self.pq.node_mut(v_slot);
                        v.set_interval_hop(u_hops + 1);
                        v.set_interval(candidate.lb(), candidate.ub());
                        v.set_bounding_predecessors(e, u_slot);
                    }
                    Some(v_slot) => {
                        let v = self.pq.node_mut(v_slot);
                        let current = v.interval();
                        if ge(candidate.lb(), current.lb()) && ge(candidate.ub(), current.ub()) {
                            // Ties still diversify the upper-bound parent.
                            if eq(candidate.lb(), current.lb()) && eq(candidate.ub(), current.ub())
                            {
                                v.set_predecessor_ub(e, u_slot);
                            }
                            continue;
                        }
                        if lt(candidate.ub(), current.ub()) {
                            v.set_predecessor_ub(e, u_slot);
                        }
                        if lt(candidate.lb(), current.lb()) {
                            v.set_predecessor_lb(e, u_slot);
                        }
                        v.set_interval_hop(v.interval_hop().max(u_hops + 1));
                        let merged = current.merge(&candidate);
                        v.set_interval(merged.lb(), merged.ub());
                        self.pq.update(v_slot, merged.lb());
                        self.pq.node_mut(v_slot).set_pred_id(u_it);
                    }
                }
            }
        }
    }

    /// Forward least-expected-time search over the predecessor pairs
    /// left by the backward phase.
    fn expected_time_search(&mut self, graph: &Graph, start: NodeId, destination: NodeId) {
        let Some(s_slot) = self.pq.slot_of(start) else {
            return;
        };
        {
            let s = self.pq.node_mut(s_slot);
            s.set_sample_hop(0);
            s.set_expected_time(0.0);
        }
        let s_priority = self.pq.node(s_slot).interval().lb();
        self.pq.insert_again(s_slot, s_priority);
        let d_slot = self.pq.slot_of(destination);
        while !self.pq.empty() {
            if let Some(d_slot) = d_slot {
                let d_let = self.pq.node(d_slot).expected_time();
                if d_let != f64::MAX && ge(self.pq.min_priority(), d_let) {
                    return;
                }
            }
            let u_slot = self.pq.delete_min();
            let (u_hops, u_let, preds) = {
                let u = self.pq.node_mut(u_slot);
                if u.sample_hop() >= HOP_LIMIT {
                    continue;
                }
                // Identical bound parents would be relaxed twice.
                if u.predecessor_lb().bw_edge == u.predecessor_ub().bw_edge {
                    let slot = u.predecessor_ub().slot;
                    u.set_predecessor_ub(INVALID_EDGE_ID, slot);
                }
                (u.sample_hop(), u.expected_time(), [u.predecessor_lb(), u.predecessor_ub()])
            };
            for pred in preds {
                if !pred.bw_edge.is_valid() {
                    continue;
                }
                let let_v_new = u_let + graph.bw_edge(pred.bw_edge).weight.esp();
                let v_slot = pred.slot;
                let (v_let, v_lb) = {
                    let v = self.pq.node(v_slot);
                    (v.expected_time(), v.interval().lb())
                };
                if v_let == f64::MAX {
                    let v = self.pq.node_mut(v_slot);
                    v.set_sample_hop(u_hops + 1);
                    v.set_expected_time(let_v_new);
                    self.pq.insert_again(v_slot, let_v_new + v_lb);
                } else {
                    if ge(let_v_new, v_let) {
                        continue;
                    }
                    let v = self.pq.node_mut(v_slot);
                    v.set_sample_hop(u_hops + 1);
                    v.set_expected_time(let_v_new);
                    self.pq.update(v_slot, let_v_new + v_lb);
                }
            }
        }
    }

    /// Forward profile search over the same thinned graph, building
    /// the full travel-time distribution toward `destination`.
    fn profile_search(&mut self, graph: &Graph, start: NodeId, destination: NodeId) {
        let Some(s_slot) = self.pq.slot_of(start) else {
            return;
        };
        let grid_size = self.pq.nb_pts() as usize + 1;
        let delta = self.pq.delta();
        {
            let s = self.pq.node_mut(s_slot);
            // Departure is certain at time zero.
            s.set_distribution(Distribution::zero(grid_size, delta));
            s.set_profile_hop(0);
        }
        let s_priority = self.pq.node(s_slot).interval().lb();
        self.pq.insert_again(s_slot, s_priority);
        let d_slot = self.pq.slot_of(destination);
        while !self.pq.empty() {
            if let Some(d_slot) = d_slot {
                let d = self.pq.node(d_slot);
                if !d.infinite_distribution()
                    && gt(self.pq.min_priority(), d.distribution().max() as f64)
                {
                    return;
                }
            }
            let u_slot = self.pq.delete_min();
            let (u_hops, u_dist, preds) = {
                let u = self.pq.node_mut(u_slot);
                if u.profile_hop() >= HOP_LIMIT {
                    continue;
                }
                if u.predecessor_lb().bw_edge == u.predecessor_ub().bw_edge {
                    let slot = u.predecessor_ub().slot;
                    u.set_predecessor_ub(INVALID_EDGE_ID, slot);
                }
                (u.profile_hop(), u.distribution().clone(), [u.predecessor_lb(), u.predecessor_ub()])
            };
            for pred in preds {
                if !pred.bw_edge.is_valid() {
                    continue;
                }
                let weight = &graph.bw_edge(pred.bw_edge).weight;
                let v_slot = pred.slot;
                let (v_infinite, v_min_priority, v_dist_max) = {
                    let v = self.pq.node(v_slot);
                    (
                        v.infinite_distribution(),
                        v.interval().lb(),
                        v.distribution().max() as f64,
                    )
                };
                if !v_infinite {
                    let reach_min = (u_dist.min() + weight.min()) as f64;
                    // Deterministic pruning before paying for a convolution.
                    if ge(reach_min, v_dist_max) {
                        continue;
                    }
                    if gt(
                        reach_min + v_min_priority,
                        v_dist_max + self.pq.node(v_slot).interval().ub(),
                    ) {
                        continue;
                    }
                }
                let mut dist_v_new = u_dist.convolute(weight);
                if v_infinite {
                    let priority = dist_v_new.min() as f64 + v_min_priority;
                    let v = self.pq.node_mut(v_slot);
                    v.set_distribution(dist_v_new);
                    v.set_profile_hop(u_hops + 1);
                    self.pq.insert_again(v_slot, priority);
                } else {
                    if ge(dist_v_new.min() as f64, v_dist_max) {
                        continue;
                    }
                    dist_v_new.aggregate(self.pq.node(v_slot).distribution());
                    let priority = dist_v_new.min() as f64 + v_min_priority;
                    let v = self.pq.node_mut(v_slot);
                    v.set_distribution(dist_v_new);
                    v.set_profile_hop(v.profile_hop().max(u_hops + 1));
                    self.pq.update(v_slot, priority);
                }
            }
        }
    }
}

#[cfg(test)]
mod witness_test;
