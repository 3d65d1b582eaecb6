use std::cell::RefCell;
use std::cmp::Reverse;
use std::marker::PhantomData;

/// Tie-break policy deciding the order in which [`DependencyGraph::sort`]
/// scans nodes that have no dependency between them.
pub trait ScanOrder<T> {
    /// Returns node indices in the order the sort should consider them.
    fn scan_order(nodes: &[T]) -> Vec<usize>;
}

/// Scans nodes in the order they were added. The relative order of two
/// unconstrained nodes is unspecified but deterministic for a fixed
/// insertion sequence.
pub struct InsertionOrder;

/// Scans nodes in ascending value order, so unconstrained nodes emerge
/// sorted by their natural comparator. Requires `T: Ord`.
pub struct ValueOrder;

impl<T> ScanOrder<T> for InsertionOrder {
    fn scan_order(nodes: &[T]) -> Vec<usize> {
        (0..nodes.len()).collect()
    }
}

impl<T: Ord> ScanOrder<T> for ValueOrder {
    fn scan_order(nodes: &[T]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..nodes.len()).collect();
        order.sort_by(|&a, &b| nodes[a].cmp(&nodes[b]));
        order
    }
}

/// Sorts nodes so that every node comes after all the nodes it requires.
///
/// An edge added with [`add_edge(dependent, required)`](Self::add_edge)
/// guarantees `required` precedes `dependent` in [`sort`](Self::sort).
/// For nodes with no constraint between them, the `O` policy decides:
///
/// ```
/// use mosaic_core::graph::{DependencyGraph, ValueOrder};
///
/// let mut dg: DependencyGraph<&str, ValueOrder> = DependencyGraph::new();
/// dg.add_node("C");
/// dg.add_node("A");
/// dg.add_node("B");
/// dg.add_edge(&"C", &"A");       //   [ A ]   [ B ]
/// dg.add_edge(&"C", &"B");       //      \     /
///                                //       [ C ]
/// assert_eq!(dg.sort(), vec!["A", "B", "C"]);
/// ```
///
/// The sort result is cached; `add_node` and `add_edge` invalidate the
/// cache.
///
/// # Panics
///
/// `add_node` panics when the node is already present, `add_edge` when an
/// endpoint is unknown, and `sort` when the edges form a cycle. All three
/// indicate a bug in the calling code.
pub struct DependencyGraph<T, O = InsertionOrder> {
    nodes: Vec<T>,
    // Adjacency matrix: edges[dependent][required], grown on demand.
    edges: Vec<Vec<bool>>,
    cache: RefCell<Option<Vec<usize>>>,
    _order: PhantomData<O>,
}

impl<T, O> Default for DependencyGraph<T, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, O> DependencyGraph<T, O> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            cache: RefCell::new(None),
            _order: PhantomData,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn has_edge(&self, dependent_idx: usize, required_idx: usize) -> bool {
        self.edges
            .get(dependent_idx)
            .and_then(|row| row.get(required_idx))
            .copied()
            .unwrap_or(false)
    }
}

impl<T: PartialEq, O> DependencyGraph<T, O> {
    fn index_of(&self, node: &T) -> Option<usize> {
        self.nodes.iter().position(|n| n == node)
    }

    /// Adds a node. The node must not be present yet.
    pub fn add_node(&mut self, node: T) {
        assert!(
            self.index_of(&node).is_none(),
            "DependencyGraph::add_node: node already present"
        );
        self.nodes.push(node);
        self.cache.replace(None);
    }

    /// Declares that `dependent` requires `required`. Both nodes must have
    /// been added before.
    pub fn add_edge(&mut self, dependent: &T, required: &T) {
        let dependent_idx = self
            .index_of(dependent)
            .expect("DependencyGraph::add_edge: unknown dependent node");
        let required_idx = self
            .index_of(required)
            .expect("DependencyGraph::add_edge: unknown required node");

        let needed = dependent_idx.max(required_idx) + 1;
        if self.edges.len() < needed {
            for row in &mut self.edges {
                row.resize(needed, false);
            }
            self.edges.resize_with(needed, || vec![false; needed]);
        }
        self.edges[dependent_idx][required_idx] = true;
        self.cache.replace(None);
    }
}

impl<T: PartialEq + Clone, O: ScanOrder<T>> DependencyGraph<T, O> {
    /// Performs the topological sort.
    ///
    /// Repeatedly emits the first remaining node (in policy order) that
    /// requires no other remaining node. Panics when no such node exists,
    /// i.e. the remaining nodes form a cycle.
    pub fn sort(&self) -> Vec<T> {
        if self.cache.borrow().is_none() {
            let mut remaining = O::scan_order(&self.nodes);
            let mut sorted = Vec::with_capacity(remaining.len());

            loop {
                let independent = remaining.iter().position(|&idx| {
                    remaining.iter().all(|&other| !self.has_edge(idx, other))
                });
                match independent {
                    Some(pos) => sorted.push(remaining.remove(pos)),
                    None => break,
                }
            }

            assert!(
                remaining.is_empty(),
                "DependencyGraph::sort: circular dependency detected"
            );
            *self.cache.borrow_mut() = Some(sorted);
        }

        self.cache
            .borrow()
            .as_ref()
            .expect("sort cache filled above")
            .iter()
            .map(|&idx| self.nodes[idx].clone())
            .collect()
    }
}

/// Orders unconstrained nodes by the order they were added (first in,
/// first out).
///
/// The graph keeps the values aside and runs a value-ordered
/// [`DependencyGraph`] over their insertion indices, so two graphs with
/// the same edges but different insertion sequences sort differently —
/// and each of them deterministically.
pub struct FifoDependencyGraph<T> {
    nodes: Vec<T>,
    slave: DependencyGraph<usize, ValueOrder>,
}

impl<T: PartialEq + Clone> Default for FifoDependencyGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq + Clone> FifoDependencyGraph<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            slave: DependencyGraph::new(),
        }
    }

    pub fn add_node(&mut self, node: T) {
        assert!(
            !self.nodes.contains(&node),
            "FifoDependencyGraph::add_node: node already present"
        );
        self.slave.add_node(self.nodes.len());
        self.nodes.push(node);
    }

    pub fn add_edge(&mut self, dependent: &T, required: &T) {
        let dependent_idx = index_of(&self.nodes, dependent, "dependent");
        let required_idx = index_of(&self.nodes, required, "required");
        self.slave.add_edge(&dependent_idx, &required_idx);
    }

    pub fn sort(&self) -> Vec<T> {
        self.slave
            .sort()
            .into_iter()
            .map(|idx| self.nodes[idx].clone())
            .collect()
    }
}

/// Orders unconstrained nodes by the reverse of the order they were added
/// (last in, first out).
pub struct LifoDependencyGraph<T> {
    nodes: Vec<T>,
    slave: DependencyGraph<Reverse<usize>, ValueOrder>,
}

impl<T: PartialEq + Clone> Default for LifoDependencyGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq + Clone> LifoDependencyGraph<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            slave: DependencyGraph::new(),
        }
    }

    pub fn add_node(&mut self, node: T) {
        assert!(
            !self.nodes.contains(&node),
            "LifoDependencyGraph::add_node: node already present"
        );
        self.slave.add_node(Reverse(self.nodes.len()));
        self.nodes.push(node);
    }

    pub fn add_edge(&mut self, dependent: &T, required: &T) {
        let dependent_idx = index_of(&self.nodes, dependent, "dependent");
        let required_idx = index_of(&self.nodes, required, "required");
        self.slave
            .add_edge(&Reverse(dependent_idx), &Reverse(required_idx));
    }

    pub fn sort(&self) -> Vec<T> {
        self.slave
            .sort()
            .into_iter()
            .map(|Reverse(idx)| self.nodes[idx].clone())
            .collect()
    }
}

/// FIFO ordering with an additional stripe tag per node.
///
/// Among unconstrained nodes, those with a smaller stripe emerge first;
/// within a stripe the insertion order decides. This simulates interleaved
/// insertion sequences (`A1, B1, A2, B2, …` sorting as
/// `A1, A2, …, B1, B2, …`) without knowing the sequence length upfront.
pub struct StripedFifoDependencyGraph<T> {
    nodes: Vec<T>,
    stripes: Vec<i32>,
    slave: DependencyGraph<(i32, usize), ValueOrder>,
}

impl<T: PartialEq + Clone> Default for StripedFifoDependencyGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq + Clone> StripedFifoDependencyGraph<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            stripes: Vec::new(),
            slave: DependencyGraph::new(),
        }
    }

    pub fn add_node(&mut self, node: T, stripe: i32) {
        assert!(
            !self.nodes.contains(&node),
            "StripedFifoDependencyGraph::add_node: node already present"
        );
        self.slave.add_node((stripe, self.nodes.len()));
        self.nodes.push(node);
        self.stripes.push(stripe);
    }

    pub fn add_edge(&mut self, dependent: &T, required: &T) {
        let dependent_idx = index_of(&self.nodes, dependent, "dependent");
        let required_idx = index_of(&self.nodes, required, "required");
        self.slave.add_edge(
            &(self.stripes[dependent_idx], dependent_idx),
            &(self.stripes[required_idx], required_idx),
        );
    }

    pub fn sort(&self) -> Vec<T> {
        self.slave
            .sort()
            .into_iter()
            .map(|(_, idx)| self.nodes[idx].clone())
            .collect()
    }
}

/// LIFO ordering with an additional stripe tag per node.
///
/// See [`StripedFifoDependencyGraph`]; within a stripe the reverse
/// insertion order decides.
pub struct StripedLifoDependencyGraph<T> {
    nodes: Vec<T>,
    stripes: Vec<i32>,
    slave: DependencyGraph<(i32, Reverse<usize>), ValueOrder>,
}

impl<T: PartialEq + Clone> Default for StripedLifoDependencyGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq + Clone> StripedLifoDependencyGraph<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            stripes: Vec::new(),
            slave: DependencyGraph::new(),
        }
    }

    pub fn add_node(&mut self, node: T, stripe: i32) {
        assert!(
            !self.nodes.contains(&node),
            "StripedLifoDependencyGraph::add_node: node already present"
        );
        self.slave.add_node((stripe, Reverse(self.nodes.len())));
        self.nodes.push(node);
        self.stripes.push(stripe);
    }

    pub fn add_edge(&mut self, dependent: &T, required: &T) {
        let dependent_idx = index_of(&self.nodes, dependent, "dependent");
        let required_idx = index_of(&self.nodes, required, "required");
        self.slave.add_edge(
            &(self.stripes[dependent_idx], Reverse(dependent_idx)),
            &(self.stripes[required_idx], Reverse(required_idx)),
        );
    }

    pub fn sort(&self) -> Vec<T> {
        self.slave
            .sort()
            .into_iter()
            .map(|(_, Reverse(idx))| self.nodes[idx].clone())
            .collect()
    }
}

fn index_of<T: PartialEq>(nodes: &[T], node: &T, role: &str) -> usize {
    nodes
        .iter()
        .position(|n| n == node)
        .unwrap_or_else(|| panic!("add_edge: unknown {role} node"))
}
