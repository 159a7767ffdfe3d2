//! Search-space reachability graph built from `search_space.json`.
//!
//! The rule set defines which layer may follow which; group rules add edges
//! between whole categories at once. Layers not reachable from the `Start`
//! node are dead genes and never rendered, independent of their `exclude`
//! flag.

use crate::error::{EvoVisError, Result};
use crate::records::types::Gene;
use crate::types::{dedup_preserving_order, Element};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

pub const START_LAYER: &str = "Start";

/// Styling tag carried by group-derived edges so the renderer can distinguish
/// inherited from direct connections.
pub const GROUP_EDGE_CLASS: &str = "class-connect";

/// Allowed-successor rule of one layer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayerRule {
    pub rule: Vec<String>,
    #[serde(default)]
    pub exclude: bool,
}

/// Allowed-successor rule between groups.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroupRule {
    pub group: String,
    pub rule: Vec<String>,
    #[serde(default)]
    pub exclude: bool,
}

/// Parsed `search_space.json`: the gene pool grouped by category plus the
/// layer- and group-level transition rules.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchSpace {
    pub gene_pool: BTreeMap<String, Vec<Gene>>,
    pub rule_set: BTreeMap<String, LayerRule>,
    #[serde(default)]
    pub rule_set_group: Vec<GroupRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(flatten)]
    pub params: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

pub type GraphElement = Element<GraphNode, GraphEdge>;

/// Renderable search-space graph: `Start`, group containers, reachable
/// non-excluded layers, and their connections.
#[derive(Debug, Clone, PartialEq)]
pub struct GenePoolGraph {
    pub elements: Vec<GraphElement>,
    pub groups: Vec<String>,
}

impl GenePoolGraph {
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.elements.iter().filter_map(GraphElement::as_node)
    }

    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.elements.iter().filter_map(GraphElement::as_edge)
    }
}

impl SearchSpace {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(EvoVisError::MissingArtifact(path.display().to_string()));
        }
        serde_json::from_str(&std::fs::read_to_string(path)?)
            .map_err(|e| EvoVisError::Structure(format!("{}: {e}", path.display())))
    }

    /// Group name -> member layer ids, in gene-pool order.
    pub fn groups(&self) -> BTreeMap<String, Vec<String>> {
        self.gene_pool
            .iter()
            .map(|(group, genes)| {
                let layers = genes.iter().map(|gene| gene.layer.clone()).collect();
                (group.clone(), layers)
            })
            .collect()
    }

    /// All genes of the pool with their group recorded on each gene.
    pub fn flattened_genes(&self) -> Vec<Gene> {
        let mut genes = Vec::new();
        for (group, group_genes) in &self.gene_pool {
            for gene in group_genes {
                let mut gene = gene.clone();
                gene.group = Some(group.clone());
                genes.push(gene);
            }
        }
        genes
    }

    /// Layer adjacency from non-excluded layer rules. With
    /// `group_connections`, group rules are expanded to layer-level edges: a
    /// layer inherits the member layers of every group its own group may
    /// transition to.
    pub fn layer_graph(&self, group_connections: bool) -> BTreeMap<String, Vec<String>> {
        let mut graph: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (source, rule) in &self.rule_set {
            if !rule.exclude {
                graph.insert(source.clone(), rule.rule.clone());
            }
        }

        if !group_connections {
            return graph;
        }

        let groups = self.groups();
        for group_rule in &self.rule_set_group {
            if group_rule.exclude {
                continue;
            }
            let source_layers = groups.get(&group_rule.group).cloned().unwrap_or_default();
            for target_group in &group_rule.rule {
                let target_layers = groups.get(target_group).cloned().unwrap_or_default();
                for source in &source_layers {
                    graph
                        .entry(source.clone())
                        .or_default()
                        .extend(target_layers.iter().cloned());
                }
            }
        }

        graph
    }

    /// Group adjacency from non-excluded group rules.
    pub fn group_graph(&self) -> BTreeMap<String, Vec<String>> {
        self.rule_set_group
            .iter()
            .filter(|rule| !rule.exclude)
            .map(|rule| (rule.group.clone(), rule.rule.clone()))
            .collect()
    }

    /// Every layer reachable from `Start` in the group-expanded layer graph,
    /// in depth-first visitation order. Cycles are tolerated; the visited set
    /// guards the walk.
    pub fn reachable_layers(&self) -> Result<Vec<String>> {
        let graph = self.layer_graph(true);
        if !graph.contains_key(START_LAYER) {
            return Err(EvoVisError::Structure(format!(
                "start layer '{START_LAYER}' not found in the layer graph"
            )));
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![START_LAYER];

        while let Some(layer) = stack.pop() {
            if !visited.insert(layer) {
                continue;
            }
            order.push(layer.to_string());
            if let Some(targets) = graph.get(layer) {
                // Reversed so neighbors are visited in rule order.
                for target in targets.iter().rev() {
                    if !visited.contains(target.as_str()) {
                        stack.push(target);
                    }
                }
            }
        }

        Ok(order)
    }
}

/// Assemble the renderable graph: reachable non-excluded genes as nodes (group
/// promoted to `parent`), one container node per group, layer edges for
/// reachable sources, and group edges tagged [`GROUP_EDGE_CLASS`].
pub fn build_genepool_graph(space: &SearchSpace) -> Result<GenePoolGraph> {
    let reachable: HashSet<String> = space.reachable_layers()?.into_iter().collect();

    let mut elements: Vec<GraphElement> = vec![Element::node(GraphNode {
        id: START_LAYER.to_string(),
        label: START_LAYER.to_string(),
        layer: Some(START_LAYER.to_string()),
        f_name: Some(START_LAYER.to_string()),
        parent: None,
        params: BTreeMap::new(),
    })];
    let mut group_elements: Vec<GraphElement> = Vec::new();
    let mut groups: Vec<String> = Vec::new();

    for gene in space.flattened_genes() {
        if gene.exclude || !reachable.contains(&gene.layer) {
            continue;
        }

        elements.push(Element::node(GraphNode {
            id: gene.layer.clone(),
            label: gene.layer.replace('_', " "),
            layer: Some(gene.layer.clone()),
            f_name: Some(gene.f_name.clone()),
            parent: gene.group.clone(),
            params: gene.params.clone(),
        }));

        if let Some(group) = gene.group {
            if !groups.contains(&group) {
                group_elements.push(Element::node(GraphNode {
                    id: group.clone(),
                    label: group.clone(),
                    layer: None,
                    f_name: None,
                    parent: None,
                    params: BTreeMap::new(),
                }));
                groups.push(group);
            }
        }
    }

    // Group container nodes come first so the renderer nests layers into an
    // already-declared parent.
    let mut assembled = group_elements;
    assembled.append(&mut elements);

    for (source, targets) in space.layer_graph(false) {
        if !reachable.contains(&source) {
            continue;
        }
        for target in targets {
            let classes = format!("{source} {target}");
            assembled.push(Element::classed_edge(
                GraphEdge {
                    source: source.clone(),
                    target,
                },
                classes,
            ));
        }
    }

    for (source, targets) in space.group_graph() {
        if !groups.contains(&source) {
            continue;
        }
        for target in targets {
            assembled.push(Element::classed_edge(
                GraphEdge {
                    source: source.clone(),
                    target,
                },
                GROUP_EDGE_CLASS,
            ));
        }
    }

    Ok(GenePoolGraph {
        elements: dedup_preserving_order(assembled),
        groups,
    })
}
