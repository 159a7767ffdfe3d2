pub mod lineage;
pub mod search_space;

pub use lineage::{build_family_tree, FamilyTree, GenerationWindow};
pub use search_space::{build_genepool_graph, GenePoolGraph, SearchSpace};
