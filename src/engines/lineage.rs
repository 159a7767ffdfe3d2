//! Family-tree reconstruction over the crossover log.
//!
//! Two independent traversals centered on a target individual: upstream
//! through the ancestry (binary, one crossover record per non-root
//! individual) and downstream through all recorded offspring. Both are
//! strictly bounded by a generation window, merged, and deduplicated.

use crate::error::{EvoVisError, Result};
use crate::records::crossover::CrossoverLog;
use crate::types::{dedup_preserving_order, Element};
use serde::Serialize;

/// Inclusive generation bounds for a lineage query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationWindow {
    min: u32,
    max: u32,
}

impl GenerationWindow {
    pub fn new(min: u32, max: u32) -> Result<Self> {
        if min > max {
            return Err(EvoVisError::Window(format!(
                "window minimum {min} exceeds maximum {max}"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn contains(&self, generation: u32) -> bool {
        self.min <= generation && generation <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub id: String,
    pub label: String,
    pub generation: u32,
    pub extinct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "edgelabel")]
    pub edge_label: u32,
}

pub type TreeElement = Element<TreeNode, TreeEdge>;

/// Ancestry + descendancy graph of one individual within a generation window.
/// Roots are the ancestors at the window minimum, kept separately so tree
/// layouts can anchor without inferring them from edge topology.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyTree {
    pub elements: Vec<TreeElement>,
    pub roots: Vec<String>,
}

impl FamilyTree {
    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.elements.iter().filter_map(TreeElement::as_node)
    }

    pub fn edges(&self) -> impl Iterator<Item = &TreeEdge> {
        self.elements.iter().filter_map(TreeElement::as_edge)
    }
}

/// Build the bounded family tree of `target_id` at `target_generation`.
///
/// The target generation must lie inside the window. A non-root ancestor with
/// no crossover record is a fatal lookup error; the log is corrupt and no
/// record is fabricated.
pub fn build_family_tree(
    log: &CrossoverLog,
    target_id: &str,
    target_generation: u32,
    window: GenerationWindow,
) -> Result<FamilyTree> {
    if !window.contains(target_generation) {
        return Err(EvoVisError::Window(format!(
            "target generation {target_generation} outside window [{}, {}]",
            window.min, window.max
        )));
    }

    let downstream = downstream_tree(log, target_generation, target_id, window);
    let (upstream, roots) = upstream_tree(log, target_generation, target_id, window)?;

    let mut elements = downstream;
    elements.extend(upstream);

    Ok(FamilyTree {
        elements: dedup_preserving_order(elements),
        roots: dedup_preserving_order(roots),
    })
}

fn node(log: &CrossoverLog, id: &str, generation: u32) -> TreeElement {
    // Extinction is a property of the individual, not of the traversal
    // direction: no recorded children means extinct.
    Element::node(TreeNode {
        id: id.to_string(),
        label: short_label(id),
        generation,
        extinct: log.children_of(id).is_empty(),
    })
}

fn short_label(id: &str) -> String {
    id.chars().take(3).collect()
}

/// Ancestor traversal: a binary recursion of depth `generation - window.min`,
/// terminating in the window-minimum individuals, which become roots. A root
/// can be reached via several ancestry paths; the final merge dedups.
fn upstream_tree(
    log: &CrossoverLog,
    generation: u32,
    individual: &str,
    window: GenerationWindow,
) -> Result<(Vec<TreeElement>, Vec<String>)> {
    if generation == window.min {
        return Ok((
            vec![node(log, individual, generation)],
            vec![individual.to_string()],
        ));
    }

    let record = log.parents_of(individual).ok_or_else(|| {
        EvoVisError::Lookup(format!(
            "no crossover record for individual '{individual}' (generation {generation})"
        ))
    })?;

    let own_elements = vec![
        node(log, individual, generation),
        Element::edge(TreeEdge {
            source: record.parent1.clone(),
            target: individual.to_string(),
            edge_label: record.crossover1,
        }),
        Element::edge(TreeEdge {
            source: record.parent2.clone(),
            target: individual.to_string(),
            edge_label: record.crossover2,
        }),
    ];

    let (parent1_tree, roots1) = upstream_tree(log, generation - 1, &record.parent1, window)?;
    let (parent2_tree, roots2) = upstream_tree(log, generation - 1, &record.parent2, window)?;

    let mut elements = parent1_tree;
    elements.extend(own_elements);
    elements.extend(parent2_tree);

    let mut roots = roots1;
    roots.extend(roots2);

    Ok((elements, roots))
}

/// Descendant traversal: one edge per recorded child, labelled with the
/// crossover point on this parent's side of the record.
fn downstream_tree(
    log: &CrossoverLog,
    generation: u32,
    individual: &str,
    window: GenerationWindow,
) -> Vec<TreeElement> {
    let children = log.children_of(individual);

    if generation == window.max {
        return vec![node(log, individual, generation)];
    }

    let mut own_elements = vec![node(log, individual, generation)];
    for (child, crossover) in &children {
        own_elements.push(Element::edge(TreeEdge {
            source: individual.to_string(),
            target: child.to_string(),
            edge_label: *crossover,
        }));
    }

    let mut elements = Vec::new();
    for (child, _) in &children {
        elements.extend(downstream_tree(log, generation + 1, child, window));
    }
    elements.extend(own_elements);
    elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::crossover::CrossoverRecord;

    fn record(generation: u32, p1: &str, x1: u32, p2: &str, x2: u32, child: &str) -> CrossoverRecord {
        CrossoverRecord {
            generation,
            parent1: p1.to_string(),
            crossover1: x1,
            parent2: p2.to_string(),
            crossover2: x2,
            offspring: child.to_string(),
        }
    }

    /// Log used by most tests:
    /// gen 1: (P1, P2) -> A, (P3, P4) -> B
    /// gen 2: (A, B) -> C
    fn three_generation_log() -> CrossoverLog {
        CrossoverLog::new(vec![
            record(1, "P1", 3, "P2", 5, "A"),
            record(1, "P3", 2, "P4", 4, "B"),
            record(2, "A", 6, "B", 7, "C"),
        ])
    }

    #[test]
    fn reconstructs_three_generation_example() {
        let log = three_generation_log();
        let window = GenerationWindow::new(1, 2).unwrap();
        let tree = build_family_tree(&log, "C", 2, window).unwrap();

        let mut nodes: Vec<(&str, u32)> = tree
            .nodes()
            .map(|n| (n.id.as_str(), n.generation))
            .collect();
        nodes.sort();
        assert_eq!(nodes, vec![("A", 1), ("B", 1), ("C", 2)]);

        let mut edges: Vec<(&str, &str, u32)> = tree
            .edges()
            .map(|e| (e.source.as_str(), e.target.as_str(), e.edge_label))
            .collect();
        edges.sort();
        assert_eq!(edges, vec![("A", "C", 6), ("B", "C", 7)]);

        let mut roots = tree.roots.clone();
        roots.sort();
        assert_eq!(roots, vec!["A", "B"]);
    }

    #[test]
    fn exactly_one_node_per_individual() {
        let log = three_generation_log();
        let window = GenerationWindow::new(1, 2).unwrap();
        let tree = build_family_tree(&log, "A", 1, window).unwrap();

        for id in ["A", "B", "C"] {
            let count = tree.nodes().filter(|n| n.id == id).count();
            assert!(count <= 1, "duplicate node for {id}");
        }
        assert_eq!(tree.nodes().filter(|n| n.id == "A").count(), 1);
    }

    #[test]
    fn roots_are_nodes_at_window_minimum() {
        let log = three_generation_log();
        let window = GenerationWindow::new(1, 2).unwrap();
        let tree = build_family_tree(&log, "C", 2, window).unwrap();

        for root in &tree.roots {
            let node = tree.nodes().find(|n| &n.id == root).expect("root missing node");
            assert_eq!(node.generation, window.min());
        }
    }

    #[test]
    fn window_bounds_terminate_recursion() {
        let log = three_generation_log();
        // Window [2, 2]: both traversals stop at C immediately even though
        // ancestry exists below the window.
        let window = GenerationWindow::new(2, 2).unwrap();
        let tree = build_family_tree(&log, "C", 2, window).unwrap();

        assert_eq!(tree.nodes().count(), 1);
        assert_eq!(tree.edges().count(), 0);
        assert_eq!(tree.roots, vec!["C"]);
    }

    #[test]
    fn extinct_flag_is_direction_independent() {
        let log = three_generation_log();
        let window = GenerationWindow::new(1, 2).unwrap();

        // C has no children anywhere in the log.
        let tree = build_family_tree(&log, "C", 2, window).unwrap();
        assert!(tree.nodes().find(|n| n.id == "C").unwrap().extinct);

        // A is a parent of C, so it is not extinct, also when reached purely
        // upstream.
        assert!(!tree.nodes().find(|n| n.id == "A").unwrap().extinct);

        let tree = build_family_tree(&log, "A", 1, window).unwrap();
        assert!(!tree.nodes().find(|n| n.id == "A").unwrap().extinct);
        assert!(tree.nodes().find(|n| n.id == "C").unwrap().extinct);
    }

    #[test]
    fn self_mating_parent_produces_both_edges() {
        let log = CrossoverLog::new(vec![record(1, "A", 1, "A", 4, "B")]);
        let window = GenerationWindow::new(1, 2).unwrap();
        let tree = build_family_tree(&log, "A", 1, window).unwrap();

        let labels: Vec<u32> = tree
            .edges()
            .filter(|e| e.source == "A" && e.target == "B")
            .map(|e| e.edge_label)
            .collect();
        assert_eq!(labels, vec![1, 4]);
    }

    #[test]
    fn idempotent_for_identical_inputs() {
        let log = three_generation_log();
        let window = GenerationWindow::new(1, 2).unwrap();

        let first = build_family_tree(&log, "C", 2, window).unwrap();
        let second = build_family_tree(&log, "C", 2, window).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_ancestor_record_is_fatal() {
        // B's record names parent X, which sits above the window minimum but
        // has no crossover record of its own.
        let log = CrossoverLog::new(vec![record(3, "X", 1, "X", 2, "B")]);
        let window = GenerationWindow::new(1, 3).unwrap();

        let err = build_family_tree(&log, "B", 3, window).unwrap_err();
        assert!(matches!(err, EvoVisError::Lookup(_)), "{err}");
    }

    #[test]
    fn out_of_window_target_is_rejected() {
        let log = three_generation_log();
        let window = GenerationWindow::new(1, 2).unwrap();

        let err = build_family_tree(&log, "C", 3, window).unwrap_err();
        assert!(matches!(err, EvoVisError::Window(_)));
    }

    #[test]
    fn inverted_window_is_rejected() {
        assert!(GenerationWindow::new(3, 1).is_err());
    }

    #[test]
    fn labels_are_first_three_characters() {
        let log = CrossoverLog::new(vec![record(1, "proud_panda", 1, "shy_shrew", 2, "calm_ibis")]);
        let window = GenerationWindow::new(1, 2).unwrap();
        let tree = build_family_tree(&log, "calm_ibis", 2, window).unwrap();

        let node = tree.nodes().find(|n| n.id == "calm_ibis").unwrap();
        assert_eq!(node.label, "cal");
    }
}
