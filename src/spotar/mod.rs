//! One-to-all label-correcting search on the original graph.
//!
//! [`Spotar`] grows paths backward from a destination with a FIFO
//! queue: each popped path is extended along every incoming edge of its
//! first node, and an extension survives only when it is acyclic and
//! local-reliable at the reached node. The result is one Pareto-optimal
//! policy per node, which makes it the reference the hierarchized
//! query is checked against.

pub mod path;
pub mod policy;

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, VecDeque};

use crate::graph::Graph;
use crate::ids::NodeId;
use crate::spotar::path::SpotarPath;
use crate::spotar::policy::SpotarPolicy;

pub struct Spotar<'a> {
    graph: &'a Graph,
    destination: NodeId,
    policies: BTreeMap<NodeId, SpotarPolicy>,
    queue: VecDeque<SpotarPath>,
}

impl<'a> Spotar<'a> {
    pub fn new(graph: &'a Graph, destination: NodeId) -> Spotar<'a> {
        let size = graph.specif().grid_size();
        let mut policies = BTreeMap::new();
        policies.insert(destination, SpotarPolicy::source(destination, size, graph.delta()));
        Spotar { graph, destination, policies, queue: VecDeque::new() }
    }

    pub fn destination(&self) -> NodeId {
        self.destination
    }

    pub fn policy(&self, node: NodeId) -> Option<&SpotarPolicy> {
        self.policies.get(&node)
    }

    /// Computes the Pareto frontier toward the destination from every
    /// node that can reach it.
    pub fn run(&mut self) -> &BTreeMap<NodeId, SpotarPolicy> {
        let graph = self.graph;
        if let Some(initial) = self.policies.get(&self.destination).and_then(|p| p.first_path()) {
            self.queue.push_back(initial);
        }
        while let Some(current) = self.queue.pop_front() {
            let j = current.first_node();
            for e in graph.bw_edge_ids(j) {
                let edge = graph.bw_edge(e);
                let i = edge.origin;
                if current.visits(i) {
                    continue;
                }
                let mut candidate = current.append_bw(i, e, &edge.weight);
                match self.policies.entry(i) {
                    Entry::Vacant(slot) => {
                        candidate.set_id(1);
                        candidate.set_dsd(edge.weight.size() as i64);
                        candidate.set_suffix(current.id());
                        slot.insert(SpotarPolicy::from_path(candidate.clone()));
                        self.queue.push_back(candidate);
                    }
                    Entry::Occupied(mut slot) => {
                        let policy = slot.get_mut();
                        candidate.set_id(policy.nb_paths() as u32 + 1);
                        if policy.lrcheck(&mut candidate) {
                            candidate.set_suffix(current.id());
                            self.queue.push_back(candidate.clone());
                        }
                        policy.add_path(candidate);
                    }
                }
            }
        }
        for policy in self.policies.values_mut() {
            policy.clean();
        }
        &self.policies
    }
}

#[cfg(test)]
mod spotar_test;
