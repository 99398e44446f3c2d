use crate::distribution::Distribution;
use crate::graph::Graph;
use crate::graph::edge::Edge;
use crate::ids::{INVALID_NODE_ID, NodeId};
use crate::io::specif::Specif;
use crate::query::SchQuery;
use crate::spotar::Spotar;

fn build_graph(nb_pts: u32, delta: u32, arcs: &[(u32, u32, &[f64])]) -> Graph {
    let edges: Vec<Edge> = arcs
        .iter()
        .map(|&(origin, destination, pdf)| {
            Edge::new(
                true,
                NodeId(origin),
                NodeId(destination),
                Distribution::from_pdf(delta, pdf.to_vec()),
                INVALID_NODE_ID,
            )
        })
        .collect();
    let nodes = arcs.iter().map(|&(o, d, _)| o.max(d)).max().map_or(0, |m| m + 1);
    Graph::new(edges, Specif::new(nodes, arcs.len() as u32, nb_pts, delta))
}

#[test]
fn chain_policies_reach_every_upstream_node() {
    let graph = build_graph(
        4,
        5,
        &[(0, 1, &[0.0, 1.0, 0.0, 0.0, 0.0]), (1, 2, &[0.0, 1.0, 0.0, 0.0, 0.0])],
    );
    let mut spotar = Spotar::new(&graph, NodeId(2));
    let policies = spotar.run();
    assert_eq!(policies.len(), 3, "every node reaches the destination");
    let at_zero = &policies[&NodeId(0)];
    assert_eq!(at_zero.nb_lr_paths(), 1);
    let path = at_zero.lr_paths().values().next().unwrap();
    assert_eq!(path.nodes().iter().copied().collect::<Vec<_>>(), vec![NodeId(0), NodeId(1), NodeId(2)]);
    assert_eq!(at_zero.frontier().min(), 10);
    assert_eq!(policies[&NodeId(1)].frontier().min(), 5);
}

#[test]
fn overlapping_alternatives_are_both_local_reliable() {
    let graph = build_graph(
        4,
        5,
        &[
            (0, 1, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (1, 3, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (0, 2, &[0.5, 0.0, 0.5, 0.0, 0.0]),
            (2, 3, &[0.5, 0.0, 0.5, 0.0, 0.0]),
        ],
    );
    let mut spotar = Spotar::new(&graph, NodeId(3));
    let policies = spotar.run();
    let at_zero = &policies[&NodeId(0)];
    assert_eq!(at_zero.nb_lr_paths(), 2, "neither route dominates the other");
    assert_eq!(at_zero.frontier().cdf_at(0), 0.25);
    assert_eq!(at_zero.frontier().cdf_at(2), 1.0);
}

#[test]
fn dominated_route_is_recorded_but_not_local_reliable() {
    let graph = build_graph(
        4,
        5,
        &[
            (0, 1, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (1, 3, &[1.0, 0.0, 0.0, 0.0, 0.0]),
            (0, 2, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (2, 3, &[0.0, 1.0, 0.0, 0.0, 0.0]),
        ],
    );
    let mut spotar = Spotar::new(&graph, NodeId(3));
    let policies = spotar.run();
    let at_zero = &policies[&NodeId(0)];
    assert_eq!(at_zero.nb_paths(), 2, "every reaching path is recorded");
    assert_eq!(at_zero.nb_lr_paths(), 1, "only the fast route stays local-reliable");
    assert_eq!(at_zero.frontier().min(), 5);
}

#[test]
fn cycles_do_not_keep_the_search_alive() {
    let graph = build_graph(
        4,
        5,
        &[
            (0, 1, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (1, 0, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (1, 2, &[0.0, 1.0, 0.0, 0.0, 0.0]),
        ],
    );
    let mut spotar = Spotar::new(&graph, NodeId(2));
    let policies = spotar.run();
    assert_eq!(policies.len(), 3);
    assert_eq!(policies[&NodeId(0)].frontier().min(), 10);
}

#[test]
fn spotar_frontier_matches_the_hierarchized_query() {
    let arcs: &[(u32, u32, &[f64])] = &[
        (0, 1, &[0.0, 1.0, 0.0, 0.0, 0.0]),
        (1, 3, &[0.0, 1.0, 0.0, 0.0, 0.0]),
        (0, 2, &[0.5, 0.0, 0.5, 0.0, 0.0]),
        (2, 3, &[0.5, 0.0, 0.5, 0.0, 0.0]),
    ];
    let graph = build_graph(4, 5, arcs);
    let mut spotar = Spotar::new(&graph, NodeId(3));
    let reference = spotar.run()[&NodeId(0)].frontier().clone();

    let mut hierarchized = build_graph(4, 5, arcs);
    for (node, level) in [(0, 0), (3, 1), (2, 2), (1, 3)] {
        hierarchized.set_level(NodeId(node), level);
    }
    let mut query = SchQuery::new(&hierarchized);
    let policy = query.one_to_one(NodeId(0), NodeId(3));
    for t in 0..reference.size() {
        assert_eq!(
            policy.frontier().cdf_at(t),
            reference.cdf_at(t),
            "frontiers disagree at budget index {}",
            t
        );
    }
}
