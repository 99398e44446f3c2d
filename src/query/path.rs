//! Route descriptions attached to a routing policy.
//!
//! A [`Path`] is a node/edge sequence over the hierarchized graph
//! together with the distribution obtained by convoluting its edge
//! laws. Its degree of strong dominance counts the time budgets for
//! which it currently realizes the Pareto frontier of its policy.

use std::collections::VecDeque;

use ahash::AHashSet;

use crate::distribution::Distribution;
use crate::graph::Graph;
use crate::ids::{EdgeId, INVALID_EDGE_ID, INVALID_NODE_ID, NodeId};

pub const INVALID_PATH_ID: u32 = u32::MAX;

#[derive(Clone, Debug)]
pub struct Path {
    id: u32,
    dsd: i64,
    nodes: VecDeque<NodeId>,
    edges: VecDeque<EdgeId>,
    dist: Distribution,
}

impl Path {
    /// Trivial path staying on `node`, with the zero travel-time law.
    pub fn trivial(id: u32, node: NodeId, size: usize, delta: u32) -> Path {
        let mut nodes = VecDeque::new();
        nodes.push_back(node);
        Path {
            id,
            dsd: size as i64,
            nodes,
            edges: VecDeque::new(),
            dist: Distribution::zero(size, delta),
        }
    }

    /// One-edge extension of `prefix` through `edge` toward `node`.
    pub fn extended(prefix: &Path, node: NodeId, edge: EdgeId, dist: &Distribution) -> Path {
        let mut nodes = prefix.nodes.clone();
        nodes.push_back(node);
        let mut edges = prefix.edges.clone();
        edges.push_back(edge);
        Path {
            id: prefix.id,
            dsd: prefix.dsd,
            nodes,
            edges,
            dist: prefix.dist.convolute(dist),
        }
    }

    fn from_parts(nodes: VecDeque<NodeId>, edges: VecDeque<EdgeId>, dist: Distribution) -> Path {
        Path { id: INVALID_PATH_ID, dsd: 0, nodes, edges, dist }
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

    pub fn nodes(&self) -> &VecDeque<NodeId> {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> NodeId {
        self.nodes[index]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
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

    pub fn distribution(&self) -> &Distribution {
        &self.dist
    }

    pub fn shortest_time(&self) -> u32 {
        self.dist.min()
    }

    pub fn largest_time(&self) -> u32 {
        self.dist.max()
    }

    /// On-time probability of the path for time budget index `t`.
    pub fn cdf_at(&self, t: usize) -> f64 {
        self.dist.cdf_at(t)
    }

    /// Joins a forward path with a backward one sharing its last node.
    ///
    /// The suffix was grown from the destination, so its node sequence
    /// is reversed before concatenation and the shared top node is
    /// dropped. A one-node suffix means both searches met exactly at
    /// the end of the prefix.
    pub fn append(&self, suffix: &Path) -> Path {
        debug_assert_eq!(self.last_node(), suffix.last_node());
        if suffix.len() == 1 {
            let mut joined = self.clone();
            joined.set_dsd(0);
            return joined;
        }
        let mut nodes = self.nodes.clone();
        for n in suffix.nodes.iter().rev().skip(1) {
            nodes.push_back(*n);
        }
        let mut edges = self.edges.clone();
        for e in suffix.edges.iter().rev() {
            edges.push_back(*e);
        }
        let dist = self.dist.convolute(&suffix.dist);
        Path::from_parts(nodes, edges, dist)
    }

    /// True when no node repeats along the sequence.
    pub fn acyclic(&self) -> bool {
        let mut seen = AHashSet::with_capacity(self.nodes.len());
        self.nodes.iter().all(|n| seen.insert(*n))
    }

    /// Expands every shortcut into the original edges it stands for.
    ///
    /// Each shortcut is unfolded through its middle node with a LIFO
    /// stack; the stored edge id is resolved in the forward table when
    /// the tail node sits below the head in the hierarchy, in the
    /// backward table otherwise.
    pub fn develop(&mut self, graph: &Graph) {
        debug_assert_eq!(self.nodes.len(), self.edges.len() + 1);
        if self.nodes.len() == 1 {
            return;
        }
        let mut new_nodes = VecDeque::new();
        new_nodes.push_back(self.first_node());
        let mut new_edges = VecDeque::new();
        for (section, e) in self.edges.iter().enumerate() {
            let section_u = self.nodes[section];
            let section_v = self.nodes[section + 1];
            let mut stack = vec![(section_u, *e, section_v)];
            while let Some((u, e, v)) = stack.pop() {
                let middle = if graph.level(u) < graph.level(v) {
                    graph.fw_edge(e).middle_node
                } else {
                    graph.bw_edge(e).middle_node
                };
                if middle == INVALID_NODE_ID {
                    new_edges.push_back(e);
                    new_nodes.push_back(v);
                    continue;
                }
                let mut incoming = INVALID_EDGE_ID;
                for e_in in graph.bw_edge_ids(middle) {
                    if graph.bw_edge(e_in).origin == u {
                        incoming = e_in;
                        break;
                    }
                }
                let mut outgoing = INVALID_EDGE_ID;
                for e_out in graph.fw_edge_ids(middle) {
                    if graph.fw_edge(e_out).destination == v {
                        outgoing = e_out;
                        break;
                    }
                }
                stack.push((middle, outgoing, v));
                stack.push((u, incoming, middle));
            }
        }
        self.nodes = new_nodes;
        self.edges = new_edges;
    }
}
