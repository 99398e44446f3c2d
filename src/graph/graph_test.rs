use crate::distribution::Distribution;
use crate::graph::Graph;
use crate::graph::edge::Edge;
use crate::ids::{INVALID_EDGE_ID, INVALID_NODE_ID, NodeId};
use crate::io::specif::Specif;

fn det_edge(origin: u32, destination: u32) -> Edge {
    Edge::new(
        true,
        NodeId(origin),
        NodeId(destination),
        Distribution::from_pdf(5, vec![0.0, 1.0, 0.0]),
        INVALID_NODE_ID,
    )
}

fn diamond() -> Graph {
    let edges = vec![det_edge(0, 1), det_edge(0, 2), det_edge(1, 3), det_edge(2, 3)];
    Graph::new(edges, Specif::new(4, 4, 2, 5))
}

fn assert_mirrors_consistent(graph: &Graph) {
    for n in 0..graph.nb_nodes() {
        for e in graph.fw_edge_ids(NodeId(n)) {
            let fw = graph.fw_edge(e);
            assert!(!fw.is_dummy(), "live range holds a dummy at {}", e);
            assert!(fw.forward);
            let bw = graph.bw_edge(fw.sym_edge);
            assert!(!bw.forward);
            assert_eq!(bw.sym_edge, e, "mirror of {} points back elsewhere", e);
            assert_eq!(bw.origin, fw.origin);
            assert_eq!(bw.destination, fw.destination);
        }
        for e in graph.bw_edge_ids(NodeId(n)) {
            let bw = graph.bw_edge(e);
            assert!(!bw.is_dummy());
            assert_eq!(graph.fw_edge(bw.sym_edge).sym_edge, e);
        }
    }
}

#[test]
fn construction_groups_edges_and_wires_mirrors() {
    let graph = diamond();
    assert_eq!(graph.nb_nodes(), 4);
    assert_eq!(graph.fw_edge_ids(NodeId(0)).count(), 2);
    assert_eq!(graph.fw_edge_ids(NodeId(3)).count(), 0);
    assert_eq!(graph.bw_edge_ids(NodeId(3)).count(), 2);
    assert_eq!(graph.bw_edge_ids(NodeId(0)).count(), 0);
    assert_mirrors_consistent(&graph);
}

#[test]
fn edges_are_found_in_both_directional_indexes() {
    let graph = diamond();
    let fw = graph.identify_fw_edge(NodeId(0), NodeId(2));
    assert!(fw.is_valid());
    assert_eq!(graph.fw_edge(fw).destination, NodeId(2));
    let bw = graph.identify_bw_edge(NodeId(1), NodeId(3));
    assert!(bw.is_valid());
    assert_eq!(graph.bw_edge(bw).origin, NodeId(1));
    assert_eq!(graph.identify_fw_edge(NodeId(1), NodeId(2)), INVALID_EDGE_ID);
    assert_eq!(graph.identify_bw_edge(NodeId(3), NodeId(0)), INVALID_EDGE_ID);
}

#[test]
fn add_shortcut_wires_both_arrays() {
    let mut graph = diamond();
    let nb_edges_before = graph.specif().nb_edges();
    let weight = Distribution::from_pdf(5, vec![0.0, 0.0, 1.0]);
    graph.add_shortcut(Edge::shortcut(NodeId(0), NodeId(3), weight, 2, 2, NodeId(1)));
    let fw = graph.identify_fw_edge(NodeId(0), NodeId(3));
    assert!(fw.is_valid(), "shortcut missing from the forward index");
    assert_eq!(graph.fw_edge(fw).middle_node, NodeId(1));
    assert_eq!(graph.fw_edge(fw).nb_original_edges, 2);
    let bw = graph.identify_bw_edge(NodeId(0), NodeId(3));
    assert!(bw.is_valid(), "shortcut missing from the backward index");
    assert_eq!(graph.specif().nb_edges(), nb_edges_before + 1);
    assert_mirrors_consistent(&graph);
}

#[test]
fn delete_node_erases_both_mirror_families() {
    let mut graph = diamond();
    graph.delete_node(NodeId(1));
    assert_eq!(graph.fw_edge_ids(NodeId(1)).count(), 0);
    assert_eq!(graph.bw_edge_ids(NodeId(1)).count(), 0);
    assert_eq!(graph.identify_fw_edge(NodeId(0), NodeId(1)), INVALID_EDGE_ID);
    assert_eq!(graph.identify_bw_edge(NodeId(1), NodeId(3)), INVALID_EDGE_ID);
    // The untouched branch must survive the swaps.
    assert!(graph.identify_fw_edge(NodeId(0), NodeId(2)).is_valid());
    assert!(graph.identify_bw_edge(NodeId(2), NodeId(3)).is_valid());
    assert_mirrors_consistent(&graph);
}

#[test]
fn exhausted_slack_relocates_the_range_and_repairs_mirrors() {
    let mut graph = diamond();
    // Node 0 starts with two edges and a bounded dummy reserve; enough
    // parallel shortcuts force its forward range to move to the tail.
    for _ in 0..6 {
        let weight = Distribution::from_pdf(5, vec![0.0, 0.0, 1.0]);
        graph.add_shortcut(Edge::shortcut(NodeId(0), NodeId(3), weight, 2, 2, NodeId(1)));
    }
    assert_eq!(graph.fw_edge_ids(NodeId(0)).count(), 8);
    assert!(graph.identify_fw_edge(NodeId(0), NodeId(1)).is_valid());
    assert!(graph.identify_fw_edge(NodeId(0), NodeId(2)).is_valid());
    assert_mirrors_consistent(&graph);
}
