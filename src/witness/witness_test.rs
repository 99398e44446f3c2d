use crate::distribution::Distribution;
use crate::graph::Graph;
use crate::graph::edge::Edge;
use crate::ids::{INVALID_NODE_ID, NodeId};
use crate::io::specif::Specif;
use crate::witness::{Verdict, WitnessSearch};

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

fn deleted_path(graph: &Graph, u: NodeId, x: NodeId, v: NodeId) -> Distribution {
    let ux = graph.fw_edge(graph.identify_fw_edge(u, x)).weight.clone();
    let xv = graph.fw_edge(graph.identify_fw_edge(x, v)).weight.clone();
    ux.convolute(&xv)
}

#[test]
fn faster_direct_edge_makes_the_shortcut_useless() {
    let graph = build_graph(
        2,
        5,
        &[
            (0, 1, &[0.0, 1.0, 0.0]),
            (1, 2, &[0.0, 1.0, 0.0]),
            (0, 2, &[1.0, 0.0, 0.0]),
        ],
    );
    let dist = deleted_path(&graph, NodeId(0), NodeId(1), NodeId(2));
    let mut search = WitnessSearch::new(&graph);
    let verdict = search.run(&graph, NodeId(0), NodeId(1), NodeId(2), &dist);
    assert_eq!(verdict, Verdict::NotNecessary, "instant direct edge beats the two-hop path");
}

#[test]
fn missing_alternative_forces_a_shortcut() {
    let graph = build_graph(2, 5, &[(0, 1, &[0.0, 1.0, 0.0]), (1, 2, &[0.0, 1.0, 0.0])]);
    let dist = deleted_path(&graph, NodeId(0), NodeId(1), NodeId(2));
    let mut search = WitnessSearch::new(&graph);
    let verdict = search.run(&graph, NodeId(0), NodeId(1), NodeId(2), &dist);
    assert_eq!(verdict, Verdict::Necessary, "only path runs through the contracted node");
}

#[test]
fn equal_cost_detour_counts_as_a_witness() {
    let graph = build_graph(
        4,
        5,
        &[
            (0, 1, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (1, 2, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (0, 3, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (3, 2, &[0.0, 1.0, 0.0, 0.0, 0.0]),
        ],
    );
    let dist = deleted_path(&graph, NodeId(0), NodeId(1), NodeId(2));
    let mut search = WitnessSearch::new(&graph);
    let verdict = search.run(&graph, NodeId(0), NodeId(1), NodeId(2), &dist);
    assert_eq!(verdict, Verdict::NotNecessary, "a tie is enough to skip the shortcut");
}

#[test]
fn strictly_slower_detour_is_rejected_on_intervals_alone() {
    let graph = build_graph(
        4,
        5,
        &[
            (0, 1, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (1, 2, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (0, 3, &[0.0, 0.0, 1.0, 0.0, 0.0]),
            (3, 2, &[0.0, 0.0, 1.0, 0.0, 0.0]),
        ],
    );
    let dist = deleted_path(&graph, NodeId(0), NodeId(1), NodeId(2));
    let mut search = WitnessSearch::new(&graph);
    let verdict = search.run(&graph, NodeId(0), NodeId(1), NodeId(2), &dist);
    assert_eq!(verdict, Verdict::Necessary, "detour lower bound exceeds the path upper bound");
}

#[test]
fn overlapping_laws_without_dominance_keep_the_shortcut() {
    // Direct edge CDF [0.2, 1.0] against the convolution's
    // [0.25, 0.75]: each leads at one support point, so no witness.
    let graph = build_graph(
        2,
        5,
        &[
            (0, 1, &[0.5, 0.5, 0.0]),
            (1, 2, &[0.5, 0.5, 0.0]),
            (0, 2, &[0.2, 0.8, 0.0]),
        ],
    );
    let dist = deleted_path(&graph, NodeId(0), NodeId(1), NodeId(2));
    let mut search = WitnessSearch::new(&graph);
    let verdict = search.run(&graph, NodeId(0), NodeId(1), NodeId(2), &dist);
    assert_eq!(verdict, Verdict::Necessary, "neither law dominates the other");
}

#[test]
fn stochastic_dominance_is_settled_by_the_profile_phase() {
    // Direct edge and two-hop path overlap on [0, 10]; only the full
    // profile comparison can tell the direct edge dominates.
    let graph = build_graph(
        4,
        5,
        &[
            (0, 1, &[0.5, 0.5, 0.0, 0.0, 0.0]),
            (1, 2, &[0.5, 0.5, 0.0, 0.0, 0.0]),
            (0, 2, &[0.5, 0.5, 0.0, 0.0, 0.0]),
        ],
    );
    let dist = deleted_path(&graph, NodeId(0), NodeId(1), NodeId(2));
    let mut search = WitnessSearch::new(&graph);
    let verdict = search.run(&graph, NodeId(0), NodeId(1), NodeId(2), &dist);
    assert_eq!(verdict, Verdict::NotNecessary, "direct edge CDF dominates pointwise");
}
