//! Dynamic doubly-indexed adjacency structure.
//!
//! Edges live in two parallel arrays (forward and backward); every live
//! edge knows the index of its mirror in the opposite array. Each
//! node's edge range is over-allocated with dummy slots so that
//! shortcut insertion during contraction is amortized O(1); when a
//! range runs out of slack it is relocated to the array tail and the
//! mirrors' back pointers are repaired.

pub mod edge;
pub mod node;

#[cfg(test)]
mod graph_test;

use crate::GROWTH_FACTOR;
use crate::distribution::Distribution;
use crate::ids::{EdgeId, INVALID_EDGE_ID, NodeId};
use crate::io::specif::Specif;
use anyhow::{Context, Result};
use edge::Edge;
use log::debug;
use node::Node;

pub struct Graph {
    specif: Specif,
    nodes: Vec<Node>,
    fw_edges: Vec<Edge>,
    bw_edges: Vec<Edge>,
    /// Hierarchy rank per node id.
    levels: Vec<u32>,
    /// Node id per hierarchy rank (inverse of `levels`).
    sorted_nodes: Vec<NodeId>,
}

/// Slack reserved when a node's range is created or relocated:
/// one slot for the edge being inserted plus head room.
fn insertion_slack(old_nb_edges: u32) -> u32 {
    let grown = ((1 + old_nb_edges) as f64 * GROWTH_FACTOR) as u32;
    1 + (old_nb_edges + 3).max(grown) - (1 + old_nb_edges)
}

/// Dummy padding appended after a node's initial edge run.
fn construction_slack(nb_edges: u32) -> u32 {
    (nb_edges + 2).max((nb_edges as f64 * GROWTH_FACTOR) as u32)
}

impl Graph {
    /// Build the doubly-indexed structure from a flat forward edge
    /// list (as produced by `GraphReader`).
    pub fn new(mut edges: Vec<Edge>, specif: Specif) -> Graph {
        let max_node = edges
            .iter()
            .map(|e| e.origin.0.max(e.destination.0))
            .max()
            .map_or(0, |m| m + 1);
        let mut nodes = vec![Node::default(); max_node as usize];
        let levels: Vec<u32> = (0..max_node).collect();
        let sorted_nodes: Vec<NodeId> = (0..max_node).map(NodeId).collect();

        // Forward array: edges grouped by origin, each run padded with
        // dummy slots for future shortcut insertions.
        edges.sort_by_key(|e| (e.origin, e.destination));
        let mut fw_edges: Vec<Edge> = Vec::new();
        let mut previous_origin: Option<NodeId> = None;
        for mut e in edges {
            if nodes[e.origin.idx()].fw_begin == INVALID_EDGE_ID {
                if let Some(prev) = previous_origin {
                    let run = nodes[prev.idx()].nb_fw_edges();
                    for _ in 0..construction_slack(run) {
                        fw_edges.push(Edge::dummy());
                    }
                }
                let start = EdgeId::from(fw_edges.len());
                nodes[e.origin.idx()].fw_begin = start;
                nodes[e.origin.idx()].fw_end = start;
            }
            previous_origin = Some(e.origin);
            e.forward = true;
            let origin = e.origin;
            fw_edges.push(e);
            nodes[origin.idx()].fw_end.0 += 1;
        }
        if let Some(prev) = previous_origin {
            let run = nodes[prev.idx()].nb_fw_edges();
            for _ in 0..construction_slack(run) {
                fw_edges.push(Edge::dummy());
            }
        }

        // Backward array: one mirror per forward edge, grouped by
        // destination, wired to its forward twin both ways.
        let mut mirrors: Vec<(NodeId, EdgeId)> = Vec::new();
        for source in 0..max_node {
            let node = nodes[source as usize];
            if node.fw_end == INVALID_EDGE_ID {
                continue;
            }
            for fw in node.fw_begin.0..node.fw_end.0 {
                mirrors.push((fw_edges[fw as usize].destination, EdgeId(fw)));
            }
        }
        mirrors.sort_by_key(|&(destination, _)| destination);
        let mut bw_edges: Vec<Edge> = Vec::new();
        let mut previous_target: Option<NodeId> = None;
        for (destination, fw_id) in mirrors {
            if nodes[destination.idx()].bw_begin == INVALID_EDGE_ID {
                if let Some(prev) = previous_target {
                    let run = nodes[prev.idx()].nb_bw_edges();
                    for _ in 0..construction_slack(run) {
                        bw_edges.push(Edge::dummy());
                    }
                }
                let start = EdgeId::from(bw_edges.len());
                nodes[destination.idx()].bw_begin = start;
                nodes[destination.idx()].bw_end = start;
            }
            previous_target = Some(destination);
            let bw_id = EdgeId::from(bw_edges.len());
            fw_edges[fw_id.idx()].sym_edge = bw_id;
            let fw = &fw_edges[fw_id.idx()];
            let mut mirror = Edge::new(
                false,
                fw.origin,
                fw.destination,
                fw.weight.clone(),
                fw.middle_node,
            );
            mirror.sym_edge = fw_id;
            bw_edges.push(mirror);
            nodes[destination.idx()].bw_end.0 += 1;
        }
        if let Some(prev) = previous_target {
            let run = nodes[prev.idx()].nb_bw_edges();
            for _ in 0..construction_slack(run) {
                bw_edges.push(Edge::dummy());
            }
        }

        debug!(
            "graph built: {} nodes, {} forward slots, {} backward slots",
            max_node,
            fw_edges.len(),
            bw_edges.len()
        );
        Graph {
            specif,
            nodes,
            fw_edges,
            bw_edges,
            levels,
            sorted_nodes,
        }
    }

    pub fn specif(&self) -> &Specif {
        &self.specif
    }

    pub fn nb_nodes(&self) -> u32 {
        self.nodes.len() as u32
    }

    pub fn nb_pts(&self) -> u32 {
        self.specif.nb_pts()
    }

    pub fn delta(&self) -> u32 {
        self.specif.delta()
    }

    pub fn node(&self, n: NodeId) -> &Node {
        &self.nodes[n.idx()]
    }

    pub fn fw_edge(&self, e: EdgeId) -> &Edge {
        &self.fw_edges[e.idx()]
    }

    pub fn bw_edge(&self, e: EdgeId) -> &Edge {
        &self.bw_edges[e.idx()]
    }

    pub fn node_begin_fw(&self, n: NodeId) -> EdgeId {
        self.nodes[n.idx()].fw_begin
    }

    pub fn node_end_fw(&self, n: NodeId) -> EdgeId {
        self.nodes[n.idx()].fw_end
    }

    pub fn node_begin_bw(&self, n: NodeId) -> EdgeId {
        self.nodes[n.idx()].bw_begin
    }

    pub fn node_end_bw(&self, n: NodeId) -> EdgeId {
        self.nodes[n.idx()].bw_end
    }

    /// Live outgoing edge ids of `n`.
    pub fn fw_edge_ids(&self, n: NodeId) -> impl Iterator<Item = EdgeId> + use<> {
        let node = self.nodes[n.idx()];
        let (begin, end) = if node.fw_end == INVALID_EDGE_ID {
            (0, 0)
        } else {
            (node.fw_begin.0, node.fw_end.0)
        };
        (begin..end).map(EdgeId)
    }

    /// Live incoming edge ids of `n`.
    pub fn bw_edge_ids(&self, n: NodeId) -> impl Iterator<Item = EdgeId> + use<> {
        let node = self.nodes[n.idx()];
        let (begin, end) = if node.bw_end == INVALID_EDGE_ID {
            (0, 0)
        } else {
            (node.bw_begin.0, node.bw_end.0)
        };
        (begin..end).map(EdgeId)
    }

    pub fn level(&self, n: NodeId) -> u32 {
        self.levels[n.idx()]
    }

    pub fn levels(&self) -> &[u32] {
        &self.levels
    }

    pub fn sorted_nodes(&self) -> &[NodeId] {
        &self.sorted_nodes
    }

    pub fn set_level(&mut self, n: NodeId, level: u32) {
        self.levels[n.idx()] = level;
        self.sorted_nodes[level as usize] = n;
    }

    /// Load a previously written hierarchy table.
    pub fn set_hierarchy(&mut self, path: &str) -> Result<()> {
        let table = crate::io::hierarchy::HierarchyIo::read(path)
            .with_context(|| format!("loading hierarchy from {}", path))?;
        table.recover_into(&mut self.sorted_nodes, &mut self.levels);
        Ok(())
    }

    /// Discard the hierarchy (back to the identity ordering).
    pub fn reset(&mut self) {
        for (i, l) in self.levels.iter_mut().enumerate() {
            *l = i as u32;
        }
        for (i, n) in self.sorted_nodes.iter_mut().enumerate() {
            *n = NodeId(i as u32);
        }
    }

    /// Linear scan for a live forward edge `origin -> destination`.
    pub fn identify_fw_edge(&self, origin: NodeId, destination: NodeId) -> EdgeId {
        for e in self.fw_edge_ids(origin) {
            if self.fw_edges[e.idx()].destination == destination {
                return e;
            }
        }
        INVALID_EDGE_ID
    }

    /// Linear scan of `destination`'s incoming range for `origin`.
    pub fn identify_bw_edge(&self, origin: NodeId, destination: NodeId) -> EdgeId {
        for e in self.bw_edge_ids(destination) {
            if self.bw_edges[e.idx()].origin == origin {
                return e;
            }
        }
        INVALID_EDGE_ID
    }

    /// Merge a candidate parallel edge into an existing pair of
    /// mirrors: pointwise-max distributions, candidate's middle node.
    pub fn update_edge_info(&mut self, fw: EdgeId, bw: EdgeId, candidate: &Edge) {
        self.fw_edges[fw.idx()].aggregate(candidate);
        self.fw_edges[fw.idx()].middle_node = candidate.middle_node;
        self.bw_edges[bw.idx()].aggregate(candidate);
        self.bw_edges[bw.idx()].middle_node = candidate.middle_node;
    }

    /// Insert a shortcut into both directional arrays and wire the
    /// mutual mirror pointers.
    pub fn add_shortcut(&mut self, edge: Edge) {
        let fw_insert = self.identify_fw_insert_id(edge.origin);
        let bw_insert = self.identify_bw_insert_id(edge.destination);
        let mut bw = edge.clone();
        let mut fw = edge;
        fw.forward = true;
        fw.sym_edge = bw_insert;
        self.fw_edges[fw_insert.idx()] = fw;
        bw.forward = false;
        bw.sym_edge = fw_insert;
        self.bw_edges[bw_insert.idx()] = bw;
        self.specif.increment_edge();
    }

    /// Find or create a free forward slot at `node`.
    ///
    /// Five cases: the node has no range yet; the range touches the
    /// array tail; a dummy sits just past the range; a dummy sits just
    /// before it; no adjacent slack, so the whole range relocates to
    /// the tail (repairing each mirror's back pointer) and fresh
    /// dummies are appended.
    pub fn identify_fw_insert_id(&mut self, node: NodeId) -> EdgeId {
        let begin = self.node_begin_fw(node);
        let end = self.node_end_fw(node);
        if end == INVALID_EDGE_ID {
            let insert = EdgeId::from(self.fw_edges.len());
            self.nodes[node.idx()].fw_begin = insert;
            self.nodes[node.idx()].fw_end = EdgeId(insert.0 + 1);
            for _ in 0..insertion_slack(0) {
                self.fw_edges.push(Edge::dummy());
            }
            insert
        } else if end.idx() == self.fw_edges.len() {
            for _ in 0..insertion_slack(end.0 - begin.0) {
                self.fw_edges.push(Edge::dummy());
            }
            self.nodes[node.idx()].fw_end = EdgeId(end.0 + 1);
            end
        } else if self.fw_edges[end.idx()].is_dummy() {
            self.nodes[node.idx()].fw_end = EdgeId(end.0 + 1);
            end
        } else if begin.0 > 0 && self.fw_edges[begin.idx() - 1].is_dummy() {
            self.nodes[node.idx()].fw_begin = EdgeId(begin.0 - 1);
            EdgeId(begin.0 - 1)
        } else {
            let old_size = self.fw_edges.len();
            let old_nb_edges = end.0 - begin.0;
            for it in begin.0..end.0 {
                let tail = EdgeId::from(self.fw_edges.len());
                let moved = std::mem::replace(&mut self.fw_edges[it as usize], Edge::dummy());
                self.bw_edges[moved.sym_edge.idx()].sym_edge = tail;
                self.fw_edges.push(moved);
            }
            self.nodes[node.idx()].fw_begin = EdgeId::from(old_size);
            let insert = EdgeId::from(self.fw_edges.len());
            self.nodes[node.idx()].fw_end = EdgeId(insert.0 + 1);
            for _ in 0..insertion_slack(old_nb_edges) {
                self.fw_edges.push(Edge::dummy());
            }
            insert
        }
    }

    /// Backward counterpart of [`identify_fw_insert_id`](Self::identify_fw_insert_id).
    pub fn identify_bw_insert_id(&mut self, node: NodeId) -> EdgeId {
        let begin = self.node_begin_bw(node);
        let end = self.node_end_bw(node);
        if end == INVALID_EDGE_ID {
            let insert = EdgeId::from(self.bw_edges.len());
            self.nodes[node.idx()].bw_begin = insert;
            self.nodes[node.idx()].bw_end = EdgeId(insert.0 + 1);
            for _ in 0..insertion_slack(0) {
                self.bw_edges.push(Edge::dummy());
            }
            insert
        } else if end.idx() == self.bw_edges.len() {
            for _ in 0..insertion_slack(end.0 - begin.0) {
                self.bw_edges.push(Edge::dummy());
            }
            self.nodes[node.idx()].bw_end = EdgeId(end.0 + 1);
            end
        } else if self.bw_edges[end.idx()].is_dummy() {
            self.nodes[node.idx()].bw_end = EdgeId(end.0 + 1);
            end
        } else if begin.0 > 0 && self.bw_edges[begin.idx() - 1].is_dummy() {
            self.nodes[node.idx()].bw_begin = EdgeId(begin.0 - 1);
            EdgeId(begin.0 - 1)
        } else {
            let old_size = self.bw_edges.len();
            let old_nb_edges = end.0 - begin.0;
            for it in begin.0..end.0 {
                let tail = EdgeId::from(self.bw_edges.len());
                let moved = std::mem::replace(&mut self.bw_edges[it as usize], Edge::dummy());
                self.fw_edges[moved.sym_edge.idx()].sym_edge = tail;
                self.bw_edges.push(moved);
            }
            self.nodes[node.idx()].bw_begin = EdgeId::from(old_size);
            let insert = EdgeId::from(self.bw_edges.len());
            self.nodes[node.idx()].bw_end = EdgeId(insert.0 + 1);
            for _ in 0..insertion_slack(old_nb_edges) {
                self.bw_edges.push(Edge::dummy());
            }
            insert
        }
    }

    /// Remove `u` and every incident edge.
    ///
    /// Each mirror in a neighbor's opposite range is swapped with the
    /// last live edge of that range before being tombstoned, keeping
    /// the live-prefix/dummy-suffix layout intact.
    pub fn delete_node(&mut self, u: NodeId) {
        let deleted_edges =
            self.nodes[u.idx()].nb_fw_edges() + self.nodes[u.idx()].nb_bw_edges();
        self.specif.set_nb_nodes(self.specif.nb_nodes() - 1);
        self.specif.set_nb_edges(self.specif.nb_edges() - deleted_edges);

        for e_fw in self.fw_edge_ids(u).collect::<Vec<_>>() {
            let target = self.fw_edges[e_fw.idx()].destination;
            let last_target_edge = EdgeId(self.nodes[target.idx()].bw_end.0 - 1);
            let sym = self.fw_edges[e_fw.idx()].sym_edge;
            if sym != last_target_edge {
                self.bw_edges[sym.idx()] = self.bw_edges[last_target_edge.idx()].clone();
                let moved_sym = self.bw_edges[sym.idx()].sym_edge;
                self.fw_edges[moved_sym.idx()].sym_edge = sym;
            }
            self.bw_edges[last_target_edge.idx()].make_dummy();
            self.nodes[target.idx()].bw_end.0 -= 1;
            self.fw_edges[e_fw.idx()].make_dummy();
        }
        self.nodes[u.idx()].fw_end = self.nodes[u.idx()].fw_begin;

        for e_bw in self.bw_edge_ids(u).collect::<Vec<_>>() {
            let source = self.bw_edges[e_bw.idx()].origin;
            let last_source_edge = EdgeId(self.nodes[source.idx()].fw_end.0 - 1);
            let sym = self.bw_edges[e_bw.idx()].sym_edge;
            if sym != last_source_edge {
                self.fw_edges[sym.idx()] = self.fw_edges[last_source_edge.idx()].clone();
                let moved_sym = self.fw_edges[sym.idx()].sym_edge;
                self.bw_edges[moved_sym.idx()].sym_edge = sym;
            }
            self.fw_edges[last_source_edge.idx()].make_dummy();
            self.nodes[source.idx()].fw_end.0 -= 1;
            self.bw_edges[e_bw.idx()].make_dummy();
        }
        self.nodes[u.idx()].bw_end = self.nodes[u.idx()].bw_begin;
    }

    /// Live (non-dummy) forward edges, for persistence and tests.
    pub fn live_fw_edges(&self) -> impl Iterator<Item = &Edge> {
        self.fw_edges.iter().filter(|e| !e.is_dummy())
    }

    /// Fresh "unreachable" distribution on this instance's grid.
    pub fn infinite_distribution(&self) -> Distribution {
        Distribution::infinite(self.specif.nb_pts() as usize + 1, self.specif.delta())
    }
}
