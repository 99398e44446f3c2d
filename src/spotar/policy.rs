//! Per-node state of the label-correcting search.
//!
//! A [`SpotarPolicy`] tracks every path that ever reached its node and,
//! separately, the local-reliable subset that still contributes to the
//! Pareto frontier. Only local-reliable paths are worth extending.

use std::collections::{BTreeMap, BTreeSet};

use crate::distribution::Distribution;
use crate::ids::NodeId;
use crate::numeric::{eq, lt};
use crate::spotar::path::SpotarPath;

#[derive(Clone, Debug)]
pub struct SpotarPolicy {
    node: NodeId,
    paths: BTreeMap<u32, SpotarPath>,
    lr_paths: BTreeMap<u32, SpotarPath>,
    frontier: Distribution,
    bestpaths: Vec<u32>,
}

impl SpotarPolicy {
    /// Policy of the destination node: a single trivial path, best for
    /// every time budget.
    pub fn source(node: NodeId, size: usize, delta: u32) -> SpotarPolicy {
        let path = SpotarPath::trivial(1, node, size, delta);
        let frontier = path.distribution().clone();
        let mut paths = BTreeMap::new();
        paths.insert(1, path.clone());
        let mut lr_paths = BTreeMap::new();
        lr_paths.insert(1, path);
        SpotarPolicy { node, paths, lr_paths, frontier, bestpaths: vec![1; size] }
    }

    /// Policy created the first time a path reaches a node.
    pub fn from_path(path: SpotarPath) -> SpotarPolicy {
        let node = path.first_node();
        let frontier = path.distribution().clone();
        let bestpaths = vec![path.id(); frontier.size()];
        let mut paths = BTreeMap::new();
        paths.insert(path.id(), path.clone());
        let mut lr_paths = BTreeMap::new();
        lr_paths.insert(path.id(), path);
        SpotarPolicy { node, paths, lr_paths, frontier, bestpaths }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn frontier(&self) -> &Distribution {
        &self.frontier
    }

    pub fn paths(&self) -> &BTreeMap<u32, SpotarPath> {
        &self.paths
    }

    pub fn lr_paths(&self) -> &BTreeMap<u32, SpotarPath> {
        &self.lr_paths
    }

    pub fn best_path_ids(&self) -> &[u32] {
        &self.bestpaths
    }

    pub fn nb_paths(&self) -> usize {
        self.paths.len()
    }

    pub fn nb_lr_paths(&self) -> usize {
        self.lr_paths.len()
    }

    /// First local-reliable path, used to seed the search queue.
    pub fn first_path(&self) -> Option<SpotarPath> {
        self.lr_paths.values().next().cloned()
    }

    /// Records a path that reached the node, local-reliable or not.
    pub fn add_path(&mut self, path: SpotarPath) {
        self.paths.insert(path.id(), path);
    }

    /// Confronts a candidate path with the Pareto frontier.
    ///
    /// A candidate is local-reliable when it strictly improves the
    /// on-time probability for at least one time budget. It then takes
    /// over those budgets; defeated paths losing their last budget
    /// leave the local-reliable set (but stay in the full path map).
    pub fn lrcheck(&mut self, candidate: &mut SpotarPath) -> bool {
        let mut local_reliable = false;
        for t in 0..self.frontier.size() {
            let last_best = self.bestpaths[t];
            if lt(self.frontier.cdf_at(t), candidate.cdf_at(t)) {
                local_reliable = true;
                self.frontier.set_cdf_at(t, candidate.cdf_at(t));
                self.bestpaths[t] = candidate.id();
                candidate.increment_dsd();
                if let Some(defeated) = self.paths.get_mut(&last_best) {
                    defeated.decrement_dsd();
                }
                let drop_defeated = match self.lr_paths.get_mut(&last_best) {
                    Some(defeated) => {
                        defeated.decrement_dsd();
                        defeated.dsd() == 0
                    }
                    None => false,
                };
                if drop_defeated {
                    self.lr_paths.remove(&last_best);
                }
            }
            // The pdf must follow the cdf rewrites.
            if t == 0 {
                self.frontier.set_pdf_at(t, self.frontier.cdf_at(t));
            } else {
                self.frontier.set_pdf_at(t, self.frontier.cdf_at(t) - self.frontier.cdf_at(t - 1));
            }
        }
        if local_reliable {
            self.lr_paths.insert(candidate.id(), candidate.clone());
        }
        local_reliable
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
                self.lr_paths.get(id).is_some_and(|p| eq(self.frontier.cdf_at(t), p.cdf_at(t)))
            });
            if let Some(id) = substitute {
                self.bestpaths[t] = id;
                if let Some(defeated) = self.lr_paths.get_mut(&last_best) {
                    defeated.decrement_dsd();
                }
                if let Some(winner) = self.lr_paths.get_mut(&id) {
                    winner.increment_dsd();
                }
            }
            if self.lr_paths.get(&last_best).is_some_and(|p| p.dsd() == 0) {
                self.lr_paths.remove(&last_best);
                useless.remove(&last_best);
                if useless.is_empty() {
                    break;
                }
            }
        }
    }

    /// Drops local-reliable paths that only tie the frontier where
    /// another retained path already realizes it.
    pub fn clean(&mut self) {
        let mut useful: BTreeSet<u32> = BTreeSet::new();
        let mut useless: BTreeSet<u32> = self.lr_paths.keys().copied().collect();
        for t in 0..self.frontier.size() {
            let mut contributors = 0;
            for path in self.lr_paths.values() {
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
            if useful.len() == self.lr_paths.len() {
                debug_assert!(useless.is_empty());
                return;
            }
            if eq(self.frontier.cdf_at(t), 1.0) {
                break;
            }
        }
        self.remove_useless_paths(useless, &useful);
    }
}
