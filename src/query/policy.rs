//! Pareto-optimal routing policies.
//!
//! A [`RoutingPolicy`] gathers the local-reliable paths reaching (or
//! leaving) a node together with their Pareto frontier: for each time
//! budget the frontier cdf holds the best on-time probability over all
//! retained paths, and `bestpaths` records which path realizes it.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;

use anyhow::{Context, Result};

use crate::distribution::Distribution;
use crate::graph::Graph;
use crate::ids::{EdgeId, NodeId};
use crate::numeric::{eq, lt};
use crate::query::path::Path;

#[derive(Clone, Debug)]
pub struct RoutingPolicy {
    node: NodeId,
    paths: BTreeMap<u32, Path>,
    frontier: Distribution,
    bestpaths: Vec<u32>,
}

impl RoutingPolicy {
    /// Policy with no path yet; the frontier starts infinite.
    pub fn empty(node: NodeId, size: usize, delta: u32) -> RoutingPolicy {
        RoutingPolicy {
            node,
            paths: BTreeMap::new(),
            frontier: Distribution::infinite(size, delta),
            bestpaths: vec![u32::MAX; size],
        }
    }

    /// Policy of a search origin: a single trivial path with the zero
    /// law, best for every time budget.
    pub fn source(node: NodeId, size: usize, delta: u32) -> RoutingPolicy {
        let path = Path::trivial(1, node, size, delta);
        let frontier = path.distribution().clone();
        let mut paths = BTreeMap::new();
        paths.insert(1, path);
        RoutingPolicy { node, paths, frontier, bestpaths: vec![1; size] }
    }

    /// Policy obtained by relaxing `edge` from the policy of the
    /// predecessor node: every path gets extended and the frontier is
    /// convoluted with the edge law.
    pub fn extended(
        pred: &RoutingPolicy,
        node: NodeId,
        edge: EdgeId,
        dist: &Distribution,
    ) -> RoutingPolicy {
        let paths = pred
            .paths
            .iter()
            .map(|(id, path)| (*id, Path::extended(path, node, edge, dist)))
            .collect();
        RoutingPolicy {
            node,
            paths,
            frontier: pred.frontier.convolute(dist),
            bestpaths: pred.bestpaths.clone(),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn frontier(&self) -> &Distribution {
        &self.frontier
    }

    pub fn shortest_time(&self) -> f64 {
        f64::from(self.frontier.min())
    }

    pub fn largest_time(&self) -> f64 {
        f64::from(self.frontier.max())
    }

    pub fn paths(&self) -> &BTreeMap<u32, Path> {
        &self.paths
    }

    pub fn best_path_ids(&self) -> &[u32] {
        &self.bestpaths
    }

    pub fn nb_paths(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        if self.paths.is_empty() {
            debug_assert!(self.frontier.is_infinite());
            return true;
        }
        false
    }

    /// Replaces the whole policy with the relaxation of `pred`, keeping
    /// only the candidate paths. Used when the candidate dominates the
    /// current frontier deterministically.
    pub fn reset(&mut self, pred: &RoutingPolicy, edge: EdgeId, dist: &Distribution) {
        let fresh = RoutingPolicy::extended(pred, self.node, edge, dist);
        self.paths = fresh.paths;
        self.frontier = fresh.frontier;
        self.bestpaths = fresh.bestpaths;
    }

    /// Confronts a candidate path with the Pareto frontier.
    ///
    /// Wherever the candidate strictly improves the on-time probability
    /// it takes over the budget, stealing one degree of strong
    /// dominance from the defeated path; a path whose degree falls to
    /// zero is dropped. Returns true when the candidate earned at least
    /// one budget and entered the policy under `candidate_id`.
    pub fn add_path(&mut self, mut candidate: Path, candidate_id: u32) -> bool {
        if self.paths.is_empty() {
            candidate.set_dsd(self.frontier.size() as i64);
            self.frontier = candidate.distribution().clone();
            self.bestpaths = vec![1; self.frontier.size()];
            self.paths.insert(1, candidate);
            return true;
        }
        for t in 0..self.frontier.size() {
            let last_best = self.bestpaths[t];
            if lt(self.frontier.cdf_at(t), candidate.cdf_at(t)) {
                self.frontier.set_cdf_at(t, candidate.cdf_at(t));
                candidate.increment_dsd();
                self.bestpaths[t] = candidate_id;
                if let Some(defeated) = self.paths.get_mut(&last_best) {
                    defeated.decrement_dsd();
                    if defeated.dsd() == 0 {
                        self.paths.remove(&last_best);
                    }
                }
            }
            // The pdf must follow the cdf rewrites.
            if t == 0 {
                self.frontier.set_pdf_at(t, self.frontier.cdf_at(t));
            } else {
                self.frontier.set_pdf_at(t, self.frontier.cdf_at(t) - self.frontier.cdf_at(t - 1));
            }
        }
        if candidate.dsd() > 0 {
            self.paths.insert(candidate_id, candidate);
            return true;
        }
        false
    }

    /// Confronts every relaxed path of `pred` with the current policy.
    /// Returns true when at least one of them survived.
    pub fn add_paths(&mut self, pred: &RoutingPolicy, edge: EdgeId, dist: &Distribution) -> bool {
        let mut candidate_id = self.paths.keys().next_back().copied().unwrap_or(0) + 1;
        let mut response = false;
        for path in pred.paths.values() {
            let mut candidate = Path::extended(path, self.node, edge, dist);
            candidate.set_dsd(0);
            candidate_id += 1;
            response |= self.add_path(candidate, candidate_id);
        }
        response
    }

    /// Combines a forward policy with the backward policy of the same
    /// top node into a policy at the destination. Every acyclic
    /// forward/backward path pair becomes a candidate complete route.
    pub fn append(&self, bw: &RoutingPolicy) -> RoutingPolicy {
        debug_assert_eq!(self.node, bw.node);
        let destination = match bw.paths.values().next() {
            Some(path) => path.first_node(),
            None => self.node,
        };
        let mut joined =
            RoutingPolicy::empty(destination, self.frontier.size(), self.frontier.delta());
        let mut path_counter = 0;
        for fw_path in self.paths.values() {
            for bw_path in bw.paths.values() {
                let complete = fw_path.append(bw_path);
                if complete.acyclic() {
                    path_counter += 1;
                    joined.add_path(complete, path_counter);
                }
            }
        }
        joined
    }

    /// Folds the paths of another policy at the same node into this
    /// one.
    pub fn merge(&mut self, candidate: &RoutingPolicy) {
        debug_assert_eq!(self.node, candidate.node);
        if self.paths.is_empty() {
            self.node = candidate.node;
            self.paths = candidate.paths.clone();
            self.frontier = candidate.frontier.clone();
            self.bestpaths = candidate.bestpaths.clone();
            return;
        }
        for path in candidate.paths.values() {
            let mut contender = path.clone();
            contender.set_dsd(0);
            let contender_id = self.paths.keys().next_back().copied().unwrap_or(0) + 1;
            self.add_path(contender, contender_id);
        }
    }

    /// Transfers the budgets held by useless paths to equally good
    /// useful substitutes, then erases the paths left with no budget.
    fn remove_useless_paths(&mut self, mut useless: BTreeSet<u32>, useful: &BTreeSet<u32>) {
        for t in 0..self.frontier.size() {
            let last_best = self.bestpaths[t];
            if !useless.contains(&last_best) {
                continue;
            }
            let substitute = useful.iter().copied().find(|id| {
                self.paths.get(id).is_some_and(|p| eq(self.frontier.cdf_at(t), p.cdf_at(t)))
            });
            if let Some(id) = substitute {
                self.bestpaths[t] = id;
                if let Some(defeated) = self.paths.get_mut(&last_best) {
                    defeated.decrement_dsd();
                }
                if let Some(winner) = self.paths.get_mut(&id) {
                    winner.increment_dsd();
                }
            }
            if self.paths.get(&last_best).is_some_and(|p| p.dsd() == 0) {
                self.paths.remove(&last_best);
                useless.remove(&last_best);
                if useless.is_empty() {
                    break;
                }
            }
        }
    }

    /// Drops paths that only tie the frontier where another retained
    /// path already realizes it. Ties slip in through the strict
    /// dominance test, typically where the cdf saturates at 0 or 1.
    pub fn clean(&mut self) {
        let mut useful: BTreeSet<u32> = BTreeSet::new();
        let mut useless: BTreeSet<u32> = self.paths.keys().copied().collect();
        for t in 0..self.frontier.size() {
            let mut contributors = 0;
            for path in self.paths.values() {
                if eq(path.cdf_at(t), self.frontier.cdf_at(t)) {
                    contributors += 1;
                }
                if contributors > 1 {
                    break;
                }
            }
            debug_assert!(contributors >= 1);
            if contributors == 1 {
                useful.insert(self.bestpaths[t]);
                useless.remove(&self.bestpaths[t]);
            }
            if useful.len() == self.paths.len() {
                debug_assert!(useless.is_empty());
                return;
            }
            if eq(self.frontier.cdf_at(t), 1.0) {
                break;
            }
        }
        self.remove_useless_paths(useless, &useful);
    }

    /// Unfolds the shortcuts of every retained path.
    pub fn develop_paths(&mut self, graph: &Graph) {
        for path in self.paths.values_mut() {
            path.develop(graph);
        }
    }

    /// Writes the policy into two text files: the frontier and per-path
    /// cdf values per time budget, and the path node sequences padded
    /// with `NA` up to the longest path.
    pub fn serialize(&self, policy_path: &str, nodes_path: &str) -> Result<()> {
        let mut policy_out = fs::File::create(policy_path)
            .with_context(|| format!("creating policy file {}", policy_path))?;
        let mut nodes_out = fs::File::create(nodes_path)
            .with_context(|| format!("creating path nodes file {}", nodes_path))?;
        let mut max_path_length = 0;
        write!(policy_out, "Frontier Best ")?;
        for (id, path) in &self.paths {
            max_path_length = max_path_length.max(path.len());
            write!(policy_out, "P{} ", id)?;
            write!(nodes_out, "P{} ", id)?;
        }
        writeln!(policy_out)?;
        writeln!(nodes_out)?;
        for t in 0..self.frontier.size() {
            write!(policy_out, "{} P{} ", self.frontier.cdf_at(t), self.bestpaths[t])?;
            for path in self.paths.values() {
                write!(policy_out, "{} ", path.cdf_at(t))?;
            }
            writeln!(policy_out)?;
        }
        for i in 0..max_path_length {
            for path in self.paths.values() {
                if i < path.len() {
                    write!(nodes_out, "{} ", path.node(i))?;
                } else {
                    write!(nodes_out, "NA ")?;
                }
            }
            writeln!(nodes_out)?;
        }
        Ok(())
    }
}
