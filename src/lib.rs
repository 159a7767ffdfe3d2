//! Data core of the EvoVis dashboard: lineage reconstruction, search-space
//! reachability, and read-only access to ENAS run result artifacts.

pub mod config;
pub mod engines;
pub mod error;
pub mod records;
pub mod types;
pub mod validation;

pub use config::RunConfig;
pub use engines::lineage::{build_family_tree, FamilyTree, GenerationWindow};
pub use engines::search_space::{build_genepool_graph, GenePoolGraph, SearchSpace};
pub use error::{EvoVisError, Result};
pub use records::crossover::{CrossoverLog, CrossoverRecord};
pub use records::store::RunStore;
pub use validation::{validate_run, ValidationReport};
