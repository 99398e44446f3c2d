//! Point-to-point queries over the hierarchized graph.
//!
//! [`SchQuery`] runs an alternating bidirectional profile search going
//! only upward in the hierarchy, collects the nodes where both search
//! frontiers meet within the upper bound, and folds their forward and
//! backward policies into one Pareto-optimal policy at the destination.

pub mod context;
pub mod path;
pub mod policy;

use std::collections::BTreeSet;

use crate::graph::Graph;
use crate::ids::{INVALID_NODE_ID, NodeId};
use crate::numeric::{gt, le, lt};
use crate::query::context::QueryContext;
use crate::query::policy::RoutingPolicy;

const BACKWARD: usize = 0;
const FORWARD: usize = 1;

pub struct SchQuery<'a> {
    graph: &'a Graph,
    queues: [QueryContext; 2],
    candidates: BTreeSet<NodeId>,
    start: NodeId,
    destination: NodeId,
    forward: bool,
    upper_bound: f64,
}

impl<'a> SchQuery<'a> {
    pub fn new(graph: &'a Graph) -> SchQuery<'a> {
        let specif = graph.specif();
        SchQuery {
            graph,
            queues: [QueryContext::new(specif), QueryContext::new(specif)],
            candidates: BTreeSet::new(),
            start: INVALID_NODE_ID,
            destination: INVALID_NODE_ID,
            forward: false,
            upper_bound: f64::MAX,
        }
    }

    fn queue(&self, direction: usize) -> &QueryContext {
        &self.queues[direction]
    }

    fn current(&self) -> usize {
        if self.forward { FORWARD } else { BACKWARD }
    }

    fn opposite(&self) -> usize {
        if self.forward { BACKWARD } else { FORWARD }
    }

    /// Computes the Pareto-optimal routing policy from `start` to
    /// `destination`, with every shortcut developed into original
    /// edges.
    pub fn one_to_one(&mut self, start: NodeId, destination: NodeId) -> RoutingPolicy {
        self.start = start;
        self.destination = destination;
        let size = self.graph.specif().grid_size();
        let delta = self.graph.delta();
        if start == destination {
            return RoutingPolicy::empty(destination, size, delta);
        }
        self.candidates.clear();
        self.queues[BACKWARD].clear_all();
        self.queues[FORWARD].clear_all();
        self.forward = false;
        self.upper_bound = f64::MAX;
        self.bidirectional_profile_search();
        let mut solution = self.build_solution();
        solution.develop_paths(self.graph);
        solution
    }

    /// Alternating upward profile search from both endpoints.
    ///
    /// The forward queue grows policies away from the start, the
    /// backward queue away from the destination. Whenever a settled
    /// node carries a policy in both directions it tightens the upper
    /// bound and, if its combined lower bound fits under it, becomes a
    /// meeting candidate.
    fn bidirectional_profile_search(&mut self) {
        self.queues[FORWARD].init(self.start, 0.0);
        self.queues[BACKWARD].init(self.destination, 0.0);
        while !self.queues[FORWARD].empty() || !self.queues[BACKWARD].empty() {
            if !self.queues[FORWARD].empty()
                && !self.queues[BACKWARD].empty()
                && gt(
                    self.queues[FORWARD].min_priority().min(self.queues[BACKWARD].min_priority()),
                    self.upper_bound,
                )
            {
                break;
            }
            // Alternate as long as the opposite queue has work left.
            if !self.queue(self.opposite()).empty() {
                self.forward = !self.forward;
            }
            let cur = self.current();
            let opp = self.opposite();
            let u_id = self.queues[cur].delete_min();
            let Some(u) = self.queues[cur].node(u_id) else {
                continue;
            };
            let u_min = u.dist_min();
            let u_max = u.dist_max();
            let u_policy = u.policy().clone();
            let opposite_policy =
                self.queues[opp].node(u_id).map(|n| (n.dist_min(), n.dist_max(), n.policy().is_empty()));
            if !u_policy.is_empty() {
                if let Some((opp_min, opp_max, false)) = opposite_policy {
                    self.upper_bound = self.upper_bound.min(opp_max + u_max);
                    if lt(self.upper_bound, f64::MAX) && le(u_min + opp_min, self.upper_bound) {
                        self.candidates.insert(u_id);
                    }
                }
            }
            if u_id == self.destination && self.forward {
                continue;
            }
            if u_id == self.start && !self.forward {
                continue;
            }
            if self.forward {
                for e in self.graph.fw_edge_ids(u_id) {
                    let v_id = self.graph.fw_edge(e).destination;
                    if self.graph.level(v_id) < self.graph.level(u_id) {
                        continue;
                    }
                    let dist_uv = self.graph.fw_edge(e).weight.clone();
                    let candidate_value = u_min + f64::from(dist_uv.min());
                    if !self.queues[cur].reached(v_id) {
                        self.queues[cur].insert(v_id, candidate_value, &u_policy, e, &dist_uv);
                    } else if self.queues[cur].manage_policy(
                        v_id,
                        candidate_value,
                        &u_policy,
                        e,
                        &dist_uv,
                    ) {
                        self.queues[cur].update(v_id, candidate_value);
                    }
                }
            } else {
                for e in self.graph.bw_edge_ids(u_id) {
                    let v_id = self.graph.bw_edge(e).origin;
                    if self.graph.level(v_id) < self.graph.level(u_id) {
                        continue;
                    }
                    let dist_uv = self.graph.bw_edge(e).weight.clone();
                    let candidate_value = u_min + f64::from(dist_uv.min());
                    if !self.queues[cur].reached(v_id) {
                        self.queues[cur].insert(v_id, candidate_value, &u_policy, e, &dist_uv);
                    } else if self.queues[cur].manage_policy(
                        v_id,
                        candidate_value,
                        &u_policy,
                        e,
                        &dist_uv,
                    ) {
                        self.queues[cur].update(v_id, candidate_value);
                    }
                }
            }
        }
    }

    /// Joins forward and backward policies at every meeting candidate
    /// and merges the results into one destination policy.
    fn build_solution(&self) -> RoutingPolicy {
        let size = self.graph.specif().grid_size();
        let delta = self.graph.delta();
        let mut meeting = self.candidates.iter();
        let Some(first) = meeting.next() else {
            return RoutingPolicy::empty(self.destination, size, delta);
        };
        let mut solution = match (self.queues[FORWARD].node(*first), self.queues[BACKWARD].node(*first))
        {
            (Some(fw), Some(bw)) => fw.append_policy(bw),
            _ => return RoutingPolicy::empty(self.destination, size, delta),
        };
        for node in meeting {
            if let (Some(fw), Some(bw)) =
                (self.queues[FORWARD].node(*node), self.queues[BACKWARD].node(*node))
            {
                solution.merge(&fw.append_policy(bw));
            }
        }
        solution.clean();
        solution
    }
}

#[cfg(test)]
mod query_test;
