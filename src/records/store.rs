use crate::config::RunConfig;
use crate::engines::search_space::SearchSpace;
use crate::error::{EvoVisError, Result};
use crate::records::crossover::CrossoverLog;
use crate::records::types::{Chromosome, ResultRecord};
use rand::seq::SliceRandom;
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

const GENERATION_PREFIX: &str = "Generation_";

/// Per-generation results of every individual, keyed by name. `None` marks an
/// individual whose file is absent (still training or lost).
pub type GenerationResults = BTreeMap<String, Option<ResultRecord>>;
pub type GenerationChromosomes = BTreeMap<String, Option<Chromosome>>;

/// Highest-fitness individual of one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct BestIndividual {
    pub individual: String,
    pub fitness: f64,
    pub results: ResultRecord,
    pub chromosome: Option<Chromosome>,
}

/// Read-only accessor over one ENAS run results directory.
///
/// Every method is a pure function of the files on disk at call time; nothing
/// is cached between calls.
#[derive(Debug, Clone)]
pub struct RunStore {
    root: PathBuf,
}

impl RunStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(EvoVisError::MissingArtifact(format!(
                "run directory not found: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> Result<RunConfig> {
        RunConfig::load(&self.root.join("config.json"))
    }

    pub fn search_space(&self) -> Result<SearchSpace> {
        SearchSpace::load(&self.root.join("search_space.json"))
    }

    pub fn crossover_log(&self) -> Result<CrossoverLog> {
        CrossoverLog::load(&self.root.join("crossover_parents.csv"))
    }

    fn generation_dir(&self, generation: u32) -> PathBuf {
        self.root.join(format!("{GENERATION_PREFIX}{generation}"))
    }

    fn individual_dir(&self, generation: u32, individual: &str) -> PathBuf {
        self.generation_dir(generation).join(individual)
    }

    /// All `Generation_<n>` subdirectories, ascending by integer suffix,
    /// including a possibly still-running last generation.
    pub fn all_generations(&self) -> Result<Vec<u32>> {
        let mut generations = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(suffix) = name.strip_prefix(GENERATION_PREFIX) {
                if let Ok(number) = suffix.parse::<u32>() {
                    generations.push(number);
                }
            }
        }
        generations.sort_unstable();
        Ok(generations)
    }

    /// Finished generations, ascending. The latest generation is dropped when
    /// any individual in it has no fitness value yet (still running).
    pub fn generations(&self) -> Result<Vec<u32>> {
        let mut generations = self.all_generations()?;

        if let Some(&last) = generations.last() {
            let results = self.results_of_generation(last)?;
            let unfinished = results
                .values()
                .any(|result| result.as_ref().map_or(true, |r| r.fitness().is_none()));
            if unfinished {
                log::debug!("generation {last} still running, excluding it");
                generations.pop();
            }
        }

        Ok(generations)
    }

    /// Finished generations as directory names (`Generation_<n>`).
    pub fn generation_names(&self) -> Result<Vec<String>> {
        Ok(self
            .generations()?
            .into_iter()
            .map(|generation| format!("{GENERATION_PREFIX}{generation}"))
            .collect())
    }

    /// Individual names of one generation, sorted ascending.
    pub fn individuals(&self, generation: u32) -> Result<Vec<String>> {
        let dir = self.generation_dir(generation);
        if !dir.is_dir() {
            return Err(EvoVisError::MissingArtifact(format!(
                "generation directory not found: {}",
                dir.display()
            )));
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// One individual's result record, or `None` if `results.json` is absent.
    pub fn individual_result(
        &self,
        generation: u32,
        individual: &str,
    ) -> Result<Option<ResultRecord>> {
        let path = self.individual_dir(generation, individual).join("results.json");
        if !path.is_file() {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)
            .map_err(|e| EvoVisError::Structure(format!("{}: {e}", path.display())))?;
        ResultRecord::from_value(value).map(Some)
    }

    /// One individual's chromosome, or `None` if `chromosome.json` is absent.
    pub fn individual_chromosome(
        &self,
        generation: u32,
        individual: &str,
    ) -> Result<Option<Chromosome>> {
        let path = self
            .individual_dir(generation, individual)
            .join("chromosome.json");
        if !path.is_file() {
            return Ok(None);
        }
        let chromosome: Chromosome = serde_json::from_str(&std::fs::read_to_string(&path)?)
            .map_err(|e| EvoVisError::Structure(format!("{}: {e}", path.display())))?;
        Ok(Some(chromosome))
    }

    pub fn results_of_generation(&self, generation: u32) -> Result<GenerationResults> {
        let mut results = BTreeMap::new();
        for individual in self.individuals(generation)? {
            let result = self.individual_result(generation, &individual)?;
            results.insert(individual, result);
        }
        Ok(results)
    }

    pub fn chromosomes_of_generation(&self, generation: u32) -> Result<GenerationChromosomes> {
        let mut chromosomes = BTreeMap::new();
        for individual in self.individuals(generation)? {
            let chromosome = self.individual_chromosome(generation, &individual)?;
            chromosomes.insert(individual, chromosome);
        }
        Ok(chromosomes)
    }

    /// The requested generations, or all finished ones when `range` is `None`.
    /// Every generation in an explicit range must exist.
    fn selected_generations(&self, range: Option<RangeInclusive<u32>>) -> Result<Vec<u32>> {
        let available = self.generations()?;
        match range {
            None => Ok(available),
            Some(range) => {
                let selected: Vec<u32> = range.collect();
                if selected.is_empty() {
                    return Err(EvoVisError::Structure(
                        "empty generation range".to_string(),
                    ));
                }
                for generation in &selected {
                    if !available.contains(generation) {
                        return Err(EvoVisError::Structure(format!(
                            "generation {generation} not in run; available: {available:?}"
                        )));
                    }
                }
                Ok(selected)
            }
        }
    }

    /// Result records of all individuals over a generation range.
    pub fn results(
        &self,
        range: Option<RangeInclusive<u32>>,
    ) -> Result<BTreeMap<u32, GenerationResults>> {
        let mut per_generation = BTreeMap::new();
        for generation in self.selected_generations(range)? {
            per_generation.insert(generation, self.results_of_generation(generation)?);
        }
        Ok(per_generation)
    }

    /// Chromosomes of all individuals over a generation range.
    pub fn chromosomes(
        &self,
        range: Option<RangeInclusive<u32>>,
    ) -> Result<BTreeMap<u32, GenerationChromosomes>> {
        let mut per_generation = BTreeMap::new();
        for generation in self.selected_generations(range)? {
            per_generation.insert(generation, self.chromosomes_of_generation(generation)?);
        }
        Ok(per_generation)
    }

    /// Split result records into healthy and unhealthy individuals per the
    /// `error`-field rule. Individuals without a results file are skipped.
    #[allow(clippy::type_complexity)]
    pub fn healthy_partition(
        &self,
        range: Option<RangeInclusive<u32>>,
    ) -> Result<(
        BTreeMap<u32, BTreeMap<String, ResultRecord>>,
        BTreeMap<u32, BTreeMap<String, ResultRecord>>,
    )> {
        let mut healthy = BTreeMap::new();
        let mut unhealthy = BTreeMap::new();

        for (generation, results) in self.results(range)? {
            let mut healthy_gen = BTreeMap::new();
            let mut unhealthy_gen = BTreeMap::new();

            for (individual, result) in results {
                let Some(result) = result else { continue };
                if result.is_healthy() {
                    healthy_gen.insert(individual, result);
                } else {
                    unhealthy_gen.insert(individual, result);
                }
            }

            healthy.insert(generation, healthy_gen);
            unhealthy.insert(generation, unhealthy_gen);
        }

        Ok((healthy, unhealthy))
    }

    /// Highest-fitness individual per generation, with its results and
    /// chromosome. `None` when no individual of a generation has a positive
    /// fitness value.
    pub fn best_individuals(&self) -> Result<BTreeMap<u32, Option<BestIndividual>>> {
        let mut best = BTreeMap::new();

        for generation in self.generations()? {
            let results = self.results_of_generation(generation)?;
            let mut best_of_generation: Option<BestIndividual> = None;

            for (individual, result) in results {
                let Some(result) = result else { continue };
                let Some(fitness) = result.fitness() else { continue };

                let better = best_of_generation
                    .as_ref()
                    .map_or(fitness > 0.0, |current| fitness > current.fitness);
                if better {
                    let chromosome = self.individual_chromosome(generation, &individual)?;
                    best_of_generation = Some(BestIndividual {
                        individual,
                        fitness,
                        results: result,
                        chromosome,
                    });
                }
            }

            best.insert(generation, best_of_generation);
        }

        Ok(best)
    }

    /// Per-measurement (min, max) over all healthy individuals in the range,
    /// clamped to the boundaries configured for that measurement. `None` when
    /// no healthy individual carries a numeric value for the measurement.
    pub fn min_max_results(
        &self,
        config: &RunConfig,
        range: Option<RangeInclusive<u32>>,
    ) -> Result<BTreeMap<String, Option<(f64, f64)>>> {
        let (healthy, _) = self.healthy_partition(range)?;
        let records: Vec<&ResultRecord> = healthy
            .values()
            .flat_map(|generation| generation.values())
            .collect();

        let mut measurements = BTreeMap::new();
        for (name, info) in &config.results {
            measurements.insert(
                name.clone(),
                min_max_by_key(&records, name, info.min_boundary, info.max_boundary),
            );
        }
        Ok(measurements)
    }

    /// How often `layer` occurs across all chromosomes of one generation.
    pub fn gene_count(&self, generation: u32, layer: &str) -> Result<usize> {
        let chromosomes = self.chromosomes_of_generation(generation)?;
        let count = chromosomes
            .values()
            .flatten()
            .flatten()
            .filter(|gene| gene.layer == layer)
            .count();
        Ok(count)
    }

    /// The first sorted individual of `generation`, or of a randomly chosen
    /// finished generation when `None`.
    pub fn random_individual(&self, generation: Option<u32>) -> Result<(u32, String)> {
        let generation = match generation {
            Some(generation) => generation,
            None => *self
                .generations()?
                .choose(&mut rand::thread_rng())
                .ok_or_else(|| {
                    EvoVisError::MissingArtifact("run has no finished generations".to_string())
                })?,
        };

        let individuals = self.individuals(generation)?;
        let first = individuals.into_iter().next().ok_or_else(|| {
            EvoVisError::MissingArtifact(format!("generation {generation} has no individuals"))
        })?;
        Ok((generation, first))
    }
}

fn min_max_by_key(
    records: &[&ResultRecord],
    key: &str,
    min_boundary: Option<f64>,
    max_boundary: Option<f64>,
) -> Option<(f64, f64)> {
    let mut bounds: Option<(f64, f64)> = None;

    for record in records {
        let Some(mut value) = record.number(key) else { continue };
        if let Some(floor) = min_boundary {
            value = value.max(floor);
        }
        if let Some(ceiling) = max_boundary {
            value = value.min(ceiling);
        }
        bounds = Some(match bounds {
            None => (value, value),
            Some((min, max)) => (min.min(value), max.max(value)),
        });
    }

    bounds
}
