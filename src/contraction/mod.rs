//! Hierarchy construction by repeated contraction of independent sets.
//!
//! Every remaining node carries a contraction cost mixing four
//! indicators (edge quotient, hierarchy depth, original-edge quotient,
//! complexity quotient). Each round selects the nodes that are local
//! cost minima, contracts them in parallel, merges the resulting
//! shortcuts sequentially and re-evaluates the cost of their
//! neighbors. Worker results are collected in node order, so the
//! produced hierarchy does not depend on the thread count.

pub mod cache;
pub mod local;

use anyhow::{Context, Result};
use itertools::Itertools;
use rayon::prelude::*;
use std::collections::VecDeque;
use std::time::Instant;

use crate::contraction::cache::{CacheEntry, WitnessCache};
use crate::contraction::local::LocalThread;
use crate::graph::Graph;
use crate::graph::edge::Edge;
use crate::ids::{EdgeId, INVALID_NODE_ID, NodeId};
use crate::io::config::Config;
use crate::io::edges::EdgeIo;
use crate::io::hierarchy::HierarchyIo;
use crate::numeric::{eq, lt};
use crate::witness::Verdict;

/// Decides whether the path `e_in -> x -> e_out` must be covered by a
/// shortcut, consulting the cache before paying for a witness search.
/// During simulation the verdict is recorded for later reuse; during
/// an actual contraction the shortcut edge is built and queued.
fn decide_shortcut(
    graph: &Graph,
    wcache: &WitnessCache,
    local: &mut LocalThread,
    e_in: EdgeId,
    x: NodeId,
    e_out: EdgeId,
    simulate: bool,
) -> bool {
    let u = graph.bw_edge(e_in).origin;
    let v = graph.fw_edge(e_out).destination;
    let dist_uxv = graph.bw_edge(e_in).weight.convolute(&graph.fw_edge(e_out).weight);
    let witness =
        if wcache.empty(x) { CacheEntry::default() } else { wcache.lookup(u, x, v) };
    let complexity = if witness.status == Verdict::Undecided {
        dist_uxv.range()
    } else {
        witness.complexity
    };
    let nb_original_edges =
        graph.bw_edge(e_in).nb_original_edges + graph.fw_edge(e_out).nb_original_edges;
    let needed = if witness.status != Verdict::Undecided {
        witness.status == Verdict::Necessary
    } else {
        let status = local.run(graph, u, x, v, &dist_uxv);
        if simulate {
            local.add_cache_entry(CacheEntry::new(status, complexity, u, x, v));
        }
        status == Verdict::Necessary
    };
    if needed && !simulate {
        local.add_edge(Edge::shortcut(u, v, dist_uxv, complexity, nb_original_edges, x));
    }
    needed
}

/// Tentative cost of contracting `n` right now. Simulates the
/// contraction: counts the shortcuts that would appear against the
/// edges that would disappear, in number, original-edge thickness and
/// distribution complexity.
fn contraction_cost(
    graph: &Graph,
    wcache: &WitnessCache,
    config: &Config,
    depth: u32,
    local: &mut LocalThread,
    n: NodeId,
) -> f64 {
    let mut nb_inserted = 0u32;
    let mut nb_removed = 0u32;
    let mut original_inserted = 0u32;
    let mut original_removed = 0u32;
    let mut complexity_inserted = 0u32;
    let mut complexity_removed = 0u32;
    for e_in in graph.bw_edge_ids(n) {
        for e_out in graph.fw_edge_ids(n) {
            // u -> x -> u loops never need covering.
            if graph.bw_edge(e_in).origin == graph.fw_edge(e_out).destination {
                continue;
            }
            if decide_shortcut(graph, wcache, local, e_in, n, e_out, true) {
                nb_inserted += 1;
                original_inserted +=
                    graph.bw_edge(e_in).nb_original_edges + graph.fw_edge(e_out).nb_original_edges;
                complexity_inserted +=
                    graph.bw_edge(e_in).weight.range() + graph.fw_edge(e_out).weight.range();
            }
        }
    }
    if nb_inserted > 0 {
        for e in graph.fw_edge_ids(n) {
            nb_removed += 1;
            original_removed += graph.fw_edge(e).nb_original_edges;
            complexity_removed += graph.fw_edge(e).weight.range();
        }
        for e in graph.bw_edge_ids(n) {
            nb_removed += 1;
            original_removed += graph.bw_edge(e).nb_original_edges;
            complexity_removed += graph.bw_edge(e).weight.range();
        }
    }
    let edges_quotient = f64::from(nb_inserted) / f64::from(nb_removed).max(1.0);
    let original_edges_quotient = f64::from(original_inserted) / f64::from(original_removed).max(1.0);
    let complexity_quotient =
        f64::from(complexity_inserted) / f64::from(complexity_removed).max(1.0);
    config.param_eq * edges_quotient
        + config.param_ssd * f64::from(depth)
        + config.param_oeq * original_edges_quotient
        + config.param_cq * complexity_quotient
}

/// Cost comparison with node-id tie break, so that two runs over the
/// same instance always produce the same hierarchy.
fn smaller_cost(costs: &[f64], u: NodeId, v: NodeId) -> bool {
    if lt(costs[u.idx()], costs[v.idx()]) {
        return true;
    }
    eq(costs[u.idx()], costs[v.idx()]) && u < v
}

/// Whether no node within `hop_radius` hops of `x` has a smaller cost.
fn local_minimum(graph: &Graph, costs: &[f64], x: NodeId, hop_radius: u32) -> bool {
    let mut queue = VecDeque::new();
    queue.push_back(x);
    let mut hops: ahash::AHashMap<NodeId, u32> = ahash::AHashMap::new();
    hops.insert(x, 0);
    while let Some(u) = queue.pop_front() {
        let u_hops = hops[&u];
        let neighbors = graph
            .fw_edge_ids(u)
            .map(|e| graph.fw_edge(e).destination)
            .chain(graph.bw_edge_ids(u).map(|e| graph.bw_edge(e).origin));
        for v in neighbors {
            if hops.contains_key(&v) {
                continue;
            }
            if smaller_cost(costs, v, x) {
                return false;
            }
            hops.insert(v, u_hops + 1);
            if u_hops + 1 < hop_radius {
                queue.push_back(v);
            }
        }
    }
    true
}

/// Driver of the whole contraction. Owns the witness cache and the
/// cost table, mutates the graph it was given, and accumulates every
/// edge removed along the way (originals and shortcuts alike), which
/// is exactly the edge set of the hierarchized graph.
pub struct Ordering<'a> {
    graph: &'a mut Graph,
    wcache: WitnessCache,
    config: Config,
    node_ids: Vec<NodeId>,
    next_to_contract: Vec<bool>,
    contraction_cost: Vec<f64>,
    node_depth: Vec<u32>,
    first_working: usize,
    last_working: usize,
    new_edges: Vec<Edge>,
}

impl<'a> Ordering<'a> {
    pub fn new(graph: &'a mut Graph) -> Ordering<'a> {
        let nb_nodes = graph.nb_nodes();
        Ordering {
            graph,
            wcache: WitnessCache::new(nb_nodes),
            config: Config::default(),
            node_ids: (0..nb_nodes).map(NodeId).collect(),
            next_to_contract: vec![false; nb_nodes as usize],
            contraction_cost: vec![0.0; nb_nodes as usize],
            node_depth: vec![1; nb_nodes as usize],
            first_working: 0,
            last_working: 0,
            new_edges: Vec::new(),
        }
    }

    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    pub fn cost(&self, n: NodeId) -> f64 {
        self.contraction_cost[n.idx()]
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_ids
    }

    /// Edges removed from the graph so far, in contraction order.
    pub fn new_edges(&self) -> &[Edge] {
        &self.new_edges
    }

    /// Builds the hierarchy. `nb_threads` of zero keeps the default
    /// worker count.
    pub fn run(&mut self, nb_threads: usize) -> Result<()> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if nb_threads > 0 {
            builder = builder.num_threads(nb_threads);
        }
        let pool = builder.build().context("building the contraction thread pool")?;
        pool.install(|| self.run_inner());
        Ok(())
    }

    fn run_inner(&mut self) {
        let begin = Instant::now();
        let all_nodes = self.node_ids.clone();
        self.simulate_many(&all_nodes);
        log::info!(
            "initial contraction costs for {} nodes computed in {:.3}s",
            all_nodes.len(),
            begin.elapsed().as_secs_f64()
        );
        while self.first_working < self.node_ids.len() {
            self.next_contraction_set();
            let pending = self.contract_parallely();
            log::debug!(
                "contracting nodes [{}, {}) with {} candidate shortcuts",
                self.first_working,
                self.last_working,
                pending.len()
            );
            let mut nodes_to_update: Vec<NodeId> = Vec::new();
            for i in self.first_working..self.last_working {
                let x = self.node_ids[i];
                self.graph.set_level(x, i as u32);
                for e in self.graph.fw_edge_ids(x) {
                    let edge = self.graph.fw_edge(e).clone();
                    let d = edge.destination;
                    nodes_to_update.push(d);
                    self.node_depth[d.idx()] =
                        self.node_depth[d.idx()].max(self.node_depth[x.idx()] + 1);
                    self.new_edges.push(edge);
                }
                for e in self.graph.bw_edge_ids(x) {
                    let edge = self.graph.bw_edge(e).clone();
                    let o = edge.origin;
                    nodes_to_update.push(o);
                    self.node_depth[o.idx()] =
                        self.node_depth[o.idx()].max(self.node_depth[x.idx()] + 1);
                    self.new_edges.push(edge);
                }
                self.graph.delete_node(x);
            }
            let nodes_to_update: Vec<NodeId> =
                nodes_to_update.into_iter().sorted().dedup().collect();
            for candidate in pending {
                let origin = candidate.origin;
                let destination = candidate.destination;
                let fwe = self.graph.identify_fw_edge(origin, destination);
                if !fwe.is_valid() {
                    self.graph.add_shortcut(candidate);
                } else {
                    let bwe = self.graph.identify_bw_edge(origin, destination);
                    if candidate.weight.dominates(&self.graph.fw_edge(fwe).weight) {
                        self.graph.update_edge_info(fwe, bwe, &candidate);
                    } else {
                        self.graph.add_shortcut(candidate);
                    }
                    // The edge between both endpoints changed; every
                    // verdict that relied on it is stale.
                    self.wcache.remove(INVALID_NODE_ID, origin, destination);
                    self.wcache.remove(origin, destination, INVALID_NODE_ID);
                }
            }
            self.simulate_many(&nodes_to_update);
            self.first_working = self.last_working;
        }
        log::info!(
            "hierarchy of {} nodes built in {:.3}s ({} removed edges recorded)",
            self.node_ids.len(),
            begin.elapsed().as_secs_f64(),
            self.new_edges.len()
        );
    }

    /// Re-evaluates the contraction cost of every listed node in
    /// parallel, then folds the witness verdicts found on the way into
    /// the shared cache.
    fn simulate_many(&mut self, targets: &[NodeId]) {
        let graph = &*self.graph;
        let wcache = &self.wcache;
        let config = self.config;
        let depths = &self.node_depth;
        let results: Vec<(f64, Vec<CacheEntry>)> = targets
            .par_iter()
            .map_init(
                || LocalThread::new(graph),
                |local, &n| {
                    let cost =
                        contraction_cost(graph, wcache, &config, depths[n.idx()], local, n);
                    (cost, local.take_cache_entries())
                },
            )
            .collect();
        for (&n, (cost, entries)) in targets.iter().zip(results) {
            self.contraction_cost[n.idx()] = cost;
            for entry in entries {
                self.wcache.insert(entry);
            }
        }
    }

    /// Selects the next independent set: every not-yet-contracted node
    /// that is a cost minimum within two hops. Selected nodes are
    /// stably moved to the front of the remaining range.
    fn next_contraction_set(&mut self) {
        let graph = &*self.graph;
        let costs = &self.contraction_cost;
        let flags: Vec<bool> = self.node_ids[self.first_working..]
            .par_iter()
            .map(|&n| local_minimum(graph, costs, n, 2))
            .collect();
        for (offset, flag) in flags.into_iter().enumerate() {
            let n = self.node_ids[self.first_working + offset];
            self.next_to_contract[n.idx()] = flag;
        }
        let start = self.last_working;
        let selected_flags = &self.next_to_contract;
        let (mut selected, rest): (Vec<NodeId>, Vec<NodeId>) = self.node_ids[start..]
            .iter()
            .copied()
            .partition(|n| selected_flags[n.idx()]);
        let nb_selected = selected.len();
        selected.extend(rest);
        self.node_ids[start..].copy_from_slice(&selected);
        self.last_working = start + nb_selected;
    }

    /// Runs the witness searches for the whole working set in parallel
    /// and gathers the candidate shortcuts in node order. Also evicts
    /// every cache entry that mentions a contracted node.
    fn contract_parallely(&mut self) -> Vec<Edge> {
        let graph = &*self.graph;
        let wcache = &self.wcache;
        let batches: Vec<Vec<Edge>> = self.node_ids[self.first_working..self.last_working]
            .par_iter()
            .map_init(
                || LocalThread::new(graph),
                |local, &n| {
                    for e_in in graph.bw_edge_ids(n) {
                        for e_out in graph.fw_edge_ids(n) {
                            if graph.bw_edge(e_in).origin != graph.fw_edge(e_out).destination {
                                decide_shortcut(graph, wcache, local, e_in, n, e_out, false);
                            }
                        }
                    }
                    local.take_edges()
                },
            )
            .collect();
        for i in self.first_working..self.last_working {
            let n = self.node_ids[i];
            self.wcache.remove_middle(n);
            for e_in in self.graph.bw_edge_ids(n) {
                let u = self.graph.bw_edge(e_in).origin;
                self.wcache.remove(INVALID_NODE_ID, u, n);
                for e_out in self.graph.fw_edge_ids(n) {
                    let v = self.graph.fw_edge(e_out).destination;
                    self.wcache.remove(n, v, INVALID_NODE_ID);
                }
            }
        }
        batches.into_iter().flatten().collect()
    }

    /// Writes the node hierarchy and the removed-edge set, the two
    /// files a query run loads back.
    pub fn write_ordering(&self, hierarchy_path: &str, edge_path: &str) -> Result<()> {
        let saver =
            HierarchyIo::new(self.graph.sorted_nodes().to_vec(), self.graph.levels().to_vec());
        saver.write(hierarchy_path)?;
        EdgeIo::write(edge_path, &self.new_edges)
    }
}

#[cfg(test)]
mod contraction_test;
