use crate::distribution::Distribution;
use crate::ids::{EdgeId, INVALID_EDGE_ID, INVALID_NODE_ID, NodeId};
use crate::numeric::lt;

/// Directed arc carrying a travel-time distribution.
///
/// Lives in one of the graph's two directional arrays; `sym_edge` is
/// the index of its exact mirror in the opposite array. An edge whose
/// `origin` is the invalid node is a dummy: a tombstone slot reserved
/// for a future insertion.
#[derive(Clone, Debug)]
pub struct Edge {
    pub forward: bool,
    pub origin: NodeId,
    pub destination: NodeId,
    pub sym_edge: EdgeId,
    pub weight: Distribution,
    /// Support range of the weight, a storage/compute cost proxy.
    pub complexity: u32,
    /// Number of original edges this edge stands for (shortcut
    /// thickness); 1 for an input edge.
    pub nb_original_edges: u32,
    /// Node this shortcut bypasses; invalid for an original edge.
    pub middle_node: NodeId,
}

impl Edge {
    pub fn dummy() -> Edge {
        Edge {
            forward: false,
            origin: INVALID_NODE_ID,
            destination: INVALID_NODE_ID,
            sym_edge: INVALID_EDGE_ID,
            weight: Distribution::from_parts(0, vec![1.0], vec![1.0]),
            complexity: 0,
            nb_original_edges: 1,
            middle_node: INVALID_NODE_ID,
        }
    }

    pub fn new(
        forward: bool,
        origin: NodeId,
        destination: NodeId,
        weight: Distribution,
        middle_node: NodeId,
    ) -> Edge {
        let complexity = weight.range();
        Edge {
            forward,
            origin,
            destination,
            sym_edge: INVALID_EDGE_ID,
            weight,
            complexity,
            nb_original_edges: 1,
            middle_node,
        }
    }

    /// Shortcut constructor: thickness and complexity are inherited
    /// from the two edges being composed.
    pub fn shortcut(
        origin: NodeId,
        destination: NodeId,
        weight: Distribution,
        complexity: u32,
        nb_original_edges: u32,
        middle_node: NodeId,
    ) -> Edge {
        Edge {
            forward: true,
            origin,
            destination,
            sym_edge: INVALID_EDGE_ID,
            weight,
            complexity,
            nb_original_edges,
            middle_node,
        }
    }

    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.origin == INVALID_NODE_ID
    }

    pub fn make_dummy(&mut self) {
        *self = Edge::dummy();
    }

    /// Pointwise-max merge of this edge's distribution with a parallel
    /// candidate. Returns false if the candidate is strictly worse
    /// somewhere (no clean improvement).
    pub fn aggregate(&mut self, candidate: &Edge) -> bool {
        let mut improvement = true;
        for t in 0..self.weight.size() {
            let candidate_cdf = candidate.weight.cdf_at(t);
            if lt(self.weight.cdf_at(t), candidate_cdf) {
                self.weight.set_cdf_at(t, candidate_cdf);
            }
            if lt(candidate_cdf, self.weight.cdf_at(t)) {
                improvement = false;
            }
            let pdf = if t == 0 {
                self.weight.cdf_at(0)
            } else {
                self.weight.cdf_at(t) - self.weight.cdf_at(t - 1)
            };
            self.weight.set_pdf_at(t, pdf);
        }
        improvement
    }
}
