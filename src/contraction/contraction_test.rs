use crate::contraction::Ordering;
use crate::distribution::Distribution;
use crate::graph::Graph;
use crate::graph::edge::Edge;
use crate::ids::{INVALID_NODE_ID, NodeId};
use crate::io::config::Config;
use crate::io::specif::Specif;

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

fn config() -> Config {
    Config { param_eq: 2.0, param_ssd: 1.0, param_oeq: 1.0, param_cq: 2.0 }
}

fn assert_level_bijection(graph: &Graph) {
    let mut seen = vec![false; graph.nb_nodes() as usize];
    for n in 0..graph.nb_nodes() {
        let level = graph.level(NodeId(n)) as usize;
        assert!(!seen[level], "two nodes share level {}", level);
        seen[level] = true;
        assert_eq!(graph.sorted_nodes()[level], NodeId(n), "level table out of sync");
    }
}

#[test]
fn chain_endpoints_go_first_and_leave_no_shortcut() {
    let mut graph =
        build_graph(2, 5, &[(0, 1, &[0.0, 1.0, 0.0]), (1, 2, &[0.0, 1.0, 0.0])]);
    let mut ordering = Ordering::new(&mut graph);
    ordering.set_config(config());
    ordering.run(1).unwrap();
    assert_eq!(ordering.new_edges().len(), 2, "only the two input edges are removed");
    assert!(
        ordering.new_edges().iter().all(|e| e.middle_node == INVALID_NODE_ID),
        "contracting the cheap endpoints first needs no shortcut"
    );
    assert_eq!(graph.level(NodeId(1)), 2, "the expensive middle node is contracted last");
    assert_level_bijection(&graph);
}

#[test]
fn cycle_contraction_inserts_a_bypass_shortcut() {
    let mut graph = build_graph(
        4,
        5,
        &[
            (0, 1, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (1, 2, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (2, 0, &[0.0, 1.0, 0.0, 0.0, 0.0]),
        ],
    );
    let mut ordering = Ordering::new(&mut graph);
    ordering.set_config(config());
    ordering.run(1).unwrap();
    let shortcuts: Vec<&Edge> =
        ordering.new_edges().iter().filter(|e| e.middle_node != INVALID_NODE_ID).collect();
    assert_eq!(shortcuts.len(), 1, "the cycle needs exactly one covering shortcut");
    let shortcut = shortcuts[0];
    assert_eq!(shortcut.middle_node, NodeId(0), "the lowest id breaks the cost tie");
    assert_eq!((shortcut.origin, shortcut.destination), (NodeId(2), NodeId(1)));
    assert_eq!(shortcut.weight.min(), 10, "two deterministic hops of five time units");
    assert_eq!(shortcut.nb_original_edges, 2);
    assert_level_bijection(&graph);
}

#[test]
fn dominated_detour_never_spawns_a_shortcut() {
    // The slow path 0 -> 2 -> 3 is witnessed by the fast one, so
    // contracting node 2 must not create a shortcut.
    let mut graph = build_graph(
        4,
        5,
        &[
            (0, 1, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (1, 3, &[0.0, 1.0, 0.0, 0.0, 0.0]),
            (0, 2, &[0.0, 0.0, 1.0, 0.0, 0.0]),
            (2, 3, &[0.0, 0.0, 1.0, 0.0, 0.0]),
        ],
    );
    let mut ordering = Ordering::new(&mut graph);
    ordering.set_config(config());
    ordering.run(1).unwrap();
    assert!(
        ordering.new_edges().iter().all(|e| e.middle_node != NodeId(2)),
        "the dominated middle node must not spawn a shortcut"
    );
    assert_eq!(ordering.new_edges().len(), 4, "all four input edges are removed, nothing added");
    assert_level_bijection(&graph);
}

#[test]
fn hierarchy_does_not_depend_on_the_thread_count() {
    let arcs: &[(u32, u32, &[f64])] = &[
        (0, 1, &[0.5, 0.5, 0.0, 0.0, 0.0]),
        (1, 2, &[0.0, 1.0, 0.0, 0.0, 0.0]),
        (2, 3, &[0.2, 0.8, 0.0, 0.0, 0.0]),
        (3, 0, &[0.0, 1.0, 0.0, 0.0, 0.0]),
        (0, 2, &[0.0, 0.0, 1.0, 0.0, 0.0]),
        (3, 1, &[0.0, 0.5, 0.5, 0.0, 0.0]),
    ];
    let mut sequential = build_graph(4, 5, arcs);
    let mut parallel = build_graph(4, 5, arcs);
    let mut first = Ordering::new(&mut sequential);
    first.set_config(config());
    first.run(1).unwrap();
    let first_edges = first.new_edges().to_vec();
    drop(first);
    let mut second = Ordering::new(&mut parallel);
    second.set_config(config());
    second.run(4).unwrap();
    let second_edges = second.new_edges().to_vec();
    drop(second);
    assert_eq!(sequential.levels(), parallel.levels(), "levels must match across runs");
    assert_eq!(first_edges.len(), second_edges.len());
    for (a, b) in first_edges.iter().zip(second_edges.iter()) {
        assert_eq!((a.origin, a.destination, a.middle_node), (b.origin, b.destination, b.middle_node));
        assert_eq!(a.weight, b.weight);
    }
}
