pub mod crossover;
pub mod store;
pub mod types;

pub use crossover::{CrossoverLog, CrossoverRecord};
pub use store::{BestIndividual, RunStore};
pub use types::{Chromosome, Gene, ResultRecord};
