use crate::distribution::Distribution;
use crate::graph::Graph;
use crate::ids::{INVALID_NODE_ID, NodeId};
use crate::io::specif::Specif;
use crate::query::SchQuery;

fn build_hierarchy(
    nb_pts: u32,
    delta: u32,
    arcs: &[(u32, u32, u32, &[f64])],
    levels: &[(u32, u32)],
) -> Graph {
    let edges: Vec<crate::graph::edge::Edge> = arcs
        .iter()
        .map(|&(origin, destination, middle, pdf)| {
            let middle = if middle == u32::MAX { INVALID_NODE_ID } else { NodeId(middle) };
            crate::graph::edge::Edge::new(
                true,
                NodeId(origin),
                NodeId(destination),
                Distribution::from_pdf(delta, pdf.to_vec()),
                middle,
            )
        })
        .collect();
    let nodes = arcs.iter().map(|&(o, d, _, _)| o.max(d)).max().map_or(0, |m| m + 1);
    let mut graph = Graph::new(edges, Specif::new(nodes, arcs.len() as u32, nb_pts, delta));
    for &(node, level) in levels {
        graph.set_level(NodeId(node), level);
    }
    graph
}

#[test]
fn query_to_the_start_node_yields_an_empty_policy() {
    let graph = build_hierarchy(
        4,
        5,
        &[(0, 1, u32::MAX, &[0.0, 1.0, 0.0, 0.0, 0.0])],
        &[(0, 0), (1, 1)],
    );
    let mut query = SchQuery::new(&graph);
    let policy = query.one_to_one(NodeId(0), NodeId(0));
    assert_eq!(policy.nb_paths(), 0, "staying in place needs no path");
    assert!(policy.frontier().is_infinite());
}

#[test]
fn chain_query_meets_at_the_top_node() {
    let graph = build_hierarchy(
        4,
        5,
        &[
            (0, 1, u32::MAX, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (1, 2, u32::MAX, &[0.0, 1.0, 0.0, 0.0, 0.0]),
        ],
        &[(0, 0), (2, 1), (1, 2)],
    );
    let mut query = SchQuery::new(&graph);
    let policy = query.one_to_one(NodeId(0), NodeId(2));
    assert_eq!(policy.node(), NodeId(2));
    assert_eq!(policy.nb_paths(), 1, "a single route exists");
    let path = policy.paths().values().next().unwrap();
    assert_eq!(path.nodes().iter().copied().collect::<Vec<_>>(), vec![NodeId(0), NodeId(1), NodeId(2)]);
    assert_eq!(policy.frontier().min(), 10);
    assert_eq!(policy.frontier().max(), 10);
}

#[test]
fn overlapping_alternatives_both_survive_in_the_frontier() {
    // Route through node 1 always takes 10; route through node 2 takes
    // 0 or 20 with equal odds twice. Neither dominates the other.
    let graph = build_hierarchy(
        4,
        5,
        &[
            (0, 1, u32::MAX, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (1, 3, u32::MAX, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (0, 2, u32::MAX, &[0.5, 0.0, 0.5, 0.0, 0.0]),
            (2, 3, u32::MAX, &[0.5, 0.0, 0.5, 0.0, 0.0]),
        ],
        &[(0, 0), (3, 1), (2, 2), (1, 3)],
    );
    let mut query = SchQuery::new(&graph);
    let policy = query.one_to_one(NodeId(0), NodeId(3));
    assert_eq!(policy.nb_paths(), 2, "both routes are Pareto-optimal");
    assert_eq!(policy.frontier().cdf_at(0), 0.25, "risky route wins the small budgets");
    assert_eq!(policy.frontier().cdf_at(2), 1.0, "safe route wins the large budgets");
}

#[test]
fn dominated_alternative_is_left_out_of_the_policy() {
    let graph = build_hierarchy(
        4,
        5,
        &[
            (0, 1, u32::MAX, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (1, 3, u32::MAX, &[1.0, 0.0, 0.0, 0.0, 0.0]),
            (0, 2, u32::MAX, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (2, 3, u32::MAX, &[0.0, 1.0, 0.0, 0.0, 0.0]),
        ],
        &[(0, 0), (3, 1), (2, 2), (1, 3)],
    );
    let mut query = SchQuery::new(&graph);
    let policy = query.one_to_one(NodeId(0), NodeId(3));
    assert_eq!(policy.nb_paths(), 1, "the slower route never beats the fast one");
    let path = policy.paths().values().next().unwrap();
    assert_eq!(path.nodes().iter().copied().collect::<Vec<_>>(), vec![NodeId(0), NodeId(1), NodeId(3)]);
    assert_eq!(policy.frontier().min(), 5);
}

#[test]
fn shortcuts_are_developed_into_original_edges() {
    // Node 1 sits at the bottom of the hierarchy; the query must ride
    // the 0->2 shortcut and unfold it afterwards.
    let graph = build_hierarchy(
        4,
        5,
        &[
            (0, 1, u32::MAX, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (1, 2, u32::MAX, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (0, 2, 1, &[0.0, 0.0, 1.0, 0.0, 0.0]),
        ],
        &[(1, 0), (0, 1), (2, 2)],
    );
    let mut query = SchQuery::new(&graph);
    let policy = query.one_to_one(NodeId(0), NodeId(2));
    assert_eq!(policy.nb_paths(), 1);
    let path = policy.paths().values().next().unwrap();
    assert_eq!(
        path.nodes().iter().copied().collect::<Vec<_>>(),
        vec![NodeId(0), NodeId(1), NodeId(2)],
        "the shortcut must be expanded through its middle node"
    );
    assert_eq!(path.edges().len(), 2);
    assert_eq!(policy.frontier().min(), 10);
}
