#![cfg(test)]

use crate::graph::{
    DependencyGraph, FifoDependencyGraph, LifoDependencyGraph, StripedFifoDependencyGraph,
    StripedLifoDependencyGraph, ValueOrder,
};

// The nine-node fixture used throughout:
//
//   [ A ] [ B ] [ D ]
//      \   / \   / |
//       \ /   \ /  |
//      [ C ] [ E ] |
//       / \   /    |
//      /   \ /     |
//     /   [ F ]    |
//    /    / | \    |
//    |   /  |  \   |
//    |  /   |   \  |
//   [ G ] [ H ] [ I ]
const EDGES: &[(&str, &str)] = &[
    ("C", "A"),
    ("C", "B"),
    ("E", "B"),
    ("E", "D"),
    ("F", "C"),
    ("F", "E"),
    ("G", "C"),
    ("G", "F"),
    ("H", "F"),
    ("I", "F"),
    ("I", "D"),
];

fn add_edges<F: FnMut(&'static str, &'static str)>(mut add: F) {
    for &(dependent, required) in EDGES {
        add(dependent, required);
    }
}

#[test]
fn value_order_sorts_independent_nodes_by_value() {
    let mut dg: DependencyGraph<&str, ValueOrder> = DependencyGraph::new();
    // Deliberately shuffled insertion; the result must not depend on it.
    for node in ["I", "D", "A", "G", "C", "B", "F", "E", "H"] {
        dg.add_node(node);
    }
    add_edges(|d, r| dg.add_edge(&d, &r));

    assert_eq!(dg.sort(), vec!["A", "B", "C", "D", "E", "F", "G", "H", "I"]);
}

#[test]
fn insertion_order_is_deterministic_for_fixed_sequence() {
    let mut dg: DependencyGraph<&str> = DependencyGraph::new();
    for node in ["B", "A"] {
        dg.add_node(node);
    }
    let first = dg.sort();
    assert_eq!(first, dg.sort());
    assert_eq!(first, vec!["B", "A"]);
}

#[test]
fn edges_are_respected_regardless_of_policy() {
    let mut dg: DependencyGraph<&str> = DependencyGraph::new();
    for node in ["A", "B", "C", "D", "E", "F", "G", "H", "I"] {
        dg.add_node(node);
    }
    add_edges(|d, r| dg.add_edge(&d, &r));

    let sorted = dg.sort();
    let pos = |n: &str| sorted.iter().position(|&s| s == n).unwrap();
    for &(dependent, required) in EDGES {
        assert!(
            pos(required) < pos(dependent),
            "{required} must precede {dependent} in {sorted:?}"
        );
    }
}

#[test]
fn fifo_emits_unconstrained_nodes_in_insertion_order() {
    let mut dg = FifoDependencyGraph::new();
    for node in ["A", "B", "D", "C", "E", "F", "H", "I", "G"] {
        dg.add_node(node);
    }
    add_edges(|d, r| dg.add_edge(&d, &r));

    assert_eq!(dg.sort(), vec!["A", "B", "D", "C", "E", "F", "H", "I", "G"]);
}

#[test]
fn fifo_without_edges_is_insertion_order() {
    let mut dg = FifoDependencyGraph::new();
    for node in ["X", "M", "A"] {
        dg.add_node(node);
    }
    assert_eq!(dg.sort(), vec!["X", "M", "A"]);
}

#[test]
fn lifo_emits_unconstrained_nodes_in_reverse_insertion_order() {
    let mut dg = LifoDependencyGraph::new();
    for node in ["A", "B", "C", "D", "E", "F", "G", "H", "I"] {
        dg.add_node(node);
    }
    add_edges(|d, r| dg.add_edge(&d, &r));

    assert_eq!(dg.sort(), vec!["D", "B", "E", "A", "C", "F", "I", "H", "G"]);
}

#[test]
fn lifo_without_edges_is_reverse_insertion_order() {
    let mut dg = LifoDependencyGraph::new();
    for node in ["X", "M", "A"] {
        dg.add_node(node);
    }
    assert_eq!(dg.sort(), vec!["A", "M", "X"]);
}

#[test]
fn striped_fifo_groups_by_stripe_then_insertion() {
    let mut dg = StripedFifoDependencyGraph::new();
    dg.add_node("A1", 1);
    dg.add_node("B1", 2);
    dg.add_node("C1", 3);
    dg.add_node("A2", 1);
    dg.add_node("B2", 2);
    dg.add_node("C2", 3);

    assert_eq!(dg.sort(), vec!["A1", "A2", "B1", "B2", "C1", "C2"]);
}

#[test]
fn striped_fifo_respects_edges_across_stripes() {
    let mut dg = StripedFifoDependencyGraph::new();
    dg.add_node("A1", 1);
    dg.add_node("B1", 2);
    dg.add_node("A2", 1);
    // A low-stripe node held back behind a high-stripe dependency.
    dg.add_edge(&"A1", &"B1");

    assert_eq!(dg.sort(), vec!["A2", "B1", "A1"]);
}

#[test]
fn striped_lifo_groups_by_stripe_then_reverse_insertion() {
    let mut dg = StripedLifoDependencyGraph::new();
    dg.add_node("A1", 1);
    dg.add_node("B1", 2);
    dg.add_node("A2", 1);
    dg.add_node("B2", 2);

    assert_eq!(dg.sort(), vec!["A2", "A1", "B2", "B1"]);
}

#[test]
fn cache_is_invalidated_by_mutation() {
    let mut dg: DependencyGraph<&str, ValueOrder> = DependencyGraph::new();
    dg.add_node("B");
    assert_eq!(dg.sort(), vec!["B"]);

    dg.add_node("A");
    assert_eq!(dg.sort(), vec!["A", "B"]);

    dg.add_edge(&"A", &"B");
    assert_eq!(dg.sort(), vec!["B", "A"]);
}

#[test]
#[should_panic(expected = "circular dependency detected")]
fn cycle_panics() {
    let mut dg: DependencyGraph<&str> = DependencyGraph::new();
    dg.add_node("A");
    dg.add_node("B");
    dg.add_edge(&"A", &"B");
    dg.add_edge(&"B", &"A");
    dg.sort();
}

#[test]
#[should_panic(expected = "already present")]
fn duplicate_node_panics() {
    let mut dg: DependencyGraph<&str> = DependencyGraph::new();
    dg.add_node("A");
    dg.add_node("A");
}

#[test]
#[should_panic(expected = "unknown")]
fn edge_with_unknown_endpoint_panics() {
    let mut dg: DependencyGraph<&str> = DependencyGraph::new();
    dg.add_node("A");
    dg.add_edge(&"A", &"B");
}
