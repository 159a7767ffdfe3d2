use crate::error::{EvoVisError, Result};
use std::collections::HashMap;
use std::path::Path;

/// One row of the crossover-parentage log: two parents with their crossover
/// points and the offspring they produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossoverRecord {
    pub generation: u32,
    pub parent1: String,
    pub crossover1: u32,
    pub parent2: String,
    pub crossover2: u32,
    pub offspring: String,
}

impl CrossoverRecord {
    /// Parse one CSV row of the stored textual encoding:
    /// `"Generation: <int>", "Parent_1: (<id>, <int>)", "Parent_2: (<id>, <int>)",
    /// "New_Individual: <id>"`.
    pub fn parse_row(file: &str, row: usize, fields: &csv::StringRecord) -> Result<Self> {
        if fields.len() < 4 {
            return Err(malformed(file, row, "not all columns are present"));
        }

        let generation = labelled(file, row, &fields[0], "Generation: ")?;
        let generation = generation
            .trim()
            .parse()
            .map_err(|_| malformed(file, row, "generation should be a number"))?;

        let (parent1, crossover1) = parse_parent(file, row, &fields[1], "Parent_1: ")?;
        let (parent2, crossover2) = parse_parent(file, row, &fields[2], "Parent_2: ")?;

        let offspring = labelled(file, row, &fields[3], "New_Individual: ")?
            .trim()
            .to_string();
        if offspring.is_empty() {
            return Err(malformed(file, row, "new individual is missing"));
        }

        Ok(Self {
            generation,
            parent1,
            crossover1,
            parent2,
            crossover2,
            offspring,
        })
    }
}

fn malformed(file: &str, row: usize, reason: &str) -> EvoVisError {
    EvoVisError::MalformedRecord {
        file: file.to_string(),
        row,
        reason: reason.to_string(),
    }
}

fn labelled<'a>(file: &str, row: usize, field: &'a str, label: &str) -> Result<&'a str> {
    field.trim_start().strip_prefix(label).ok_or_else(|| {
        malformed(
            file,
            row,
            &format!("'{}' label not found", label.trim_end_matches(": ")),
        )
    })
}

fn parse_parent(file: &str, row: usize, field: &str, label: &str) -> Result<(String, u32)> {
    let tuple = labelled(file, row, field, label)?.trim();
    let inner = tuple
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| malformed(file, row, "expected a parenthesized (name, point) tuple"))?;

    let (name, point) = inner
        .split_once(',')
        .ok_or_else(|| malformed(file, row, "expected a parenthesized (name, point) tuple"))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(malformed(file, row, "parent name is missing"));
    }

    let point = point
        .trim()
        .parse()
        .map_err(|_| malformed(file, row, "crossover point should be a number"))?;

    Ok((name.to_string(), point))
}

/// The full crossover log of a run, indexed once for O(1) parent lookup and
/// cheap child lookup.
#[derive(Debug, Clone)]
pub struct CrossoverLog {
    records: Vec<CrossoverRecord>,
    by_offspring: HashMap<String, usize>,
    by_parent1: HashMap<String, Vec<usize>>,
    by_parent2: HashMap<String, Vec<usize>>,
}

impl CrossoverLog {
    pub fn new(records: Vec<CrossoverRecord>) -> Self {
        let mut by_offspring = HashMap::new();
        let mut by_parent1: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_parent2: HashMap<String, Vec<usize>> = HashMap::new();

        for (idx, record) in records.iter().enumerate() {
            by_offspring.insert(record.offspring.clone(), idx);
            by_parent1
                .entry(record.parent1.clone())
                .or_default()
                .push(idx);
            by_parent2
                .entry(record.parent2.clone())
                .or_default()
                .push(idx);
        }

        Self {
            records,
            by_offspring,
            by_parent1,
            by_parent2,
        }
    }

    /// Load and parse `crossover_parents.csv`. The file is headerless; fields
    /// are quoted because parent tuples contain commas.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(EvoVisError::MissingArtifact(path.display().to_string()));
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut records = Vec::new();
        for (idx, row) in reader.records().enumerate() {
            let row = row?;
            records.push(CrossoverRecord::parse_row(&file_name, idx + 1, &row)?);
        }

        log::debug!("loaded {} crossover records from {}", records.len(), file_name);
        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[CrossoverRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record that produced `individual`, if any. Initial-generation
    /// individuals have none.
    pub fn parents_of(&self, individual: &str) -> Option<&CrossoverRecord> {
        self.by_offspring
            .get(individual)
            .map(|&idx| &self.records[idx])
    }

    /// Every child of `individual`, paired with the crossover point taken from
    /// this parent's side of the record. Parent-1 matches come first, then
    /// parent-2 matches; an individual mated with itself contributes twice.
    pub fn children_of(&self, individual: &str) -> Vec<(&str, u32)> {
        let mut children = Vec::new();

        if let Some(indices) = self.by_parent1.get(individual) {
            for &idx in indices {
                let record = &self.records[idx];
                children.push((record.offspring.as_str(), record.crossover1));
            }
        }
        if let Some(indices) = self.by_parent2.get(individual) {
            for &idx in indices {
                let record = &self.records[idx];
                children.push((record.offspring.as_str(), record.crossover2));
            }
        }

        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn row(fields: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(fields.to_vec())
    }

    #[test]
    fn parses_labelled_row() {
        let record = CrossoverRecord::parse_row(
            "crossover_parents.csv",
            1,
            &row(&[
                "Generation: 2",
                "Parent_1: (agile_heron, 4)",
                "Parent_2: (bold_finch, 1)",
                "New_Individual: calm_ibis",
            ]),
        )
        .unwrap();

        assert_eq!(record.generation, 2);
        assert_eq!(record.parent1, "agile_heron");
        assert_eq!(record.crossover1, 4);
        assert_eq!(record.parent2, "bold_finch");
        assert_eq!(record.crossover2, 1);
        assert_eq!(record.offspring, "calm_ibis");
    }

    #[test]
    fn missing_label_is_an_error_with_row_context() {
        let err = CrossoverRecord::parse_row(
            "crossover_parents.csv",
            3,
            &row(&[
                "Gen: 2",
                "Parent_1: (a, 4)",
                "Parent_2: (b, 1)",
                "New_Individual: c",
            ]),
        )
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("row 3"), "{message}");
        assert!(message.contains("'Generation' label not found"), "{message}");
    }

    #[test]
    fn non_numeric_crossover_point_is_an_error() {
        let err = CrossoverRecord::parse_row(
            "crossover_parents.csv",
            1,
            &row(&[
                "Generation: 2",
                "Parent_1: (a, x)",
                "Parent_2: (b, 1)",
                "New_Individual: c",
            ]),
        )
        .unwrap_err();

        assert!(err.to_string().contains("crossover point should be a number"));
    }

    #[test]
    fn short_row_is_an_error() {
        let err =
            CrossoverRecord::parse_row("crossover_parents.csv", 1, &row(&["Generation: 2"]))
                .unwrap_err();
        assert!(err.to_string().contains("not all columns are present"));
    }

    #[test]
    fn indices_answer_parent_and_child_lookups() {
        let log = CrossoverLog::new(vec![
            CrossoverRecord {
                generation: 1,
                parent1: "p1".into(),
                crossover1: 2,
                parent2: "p2".into(),
                crossover2: 3,
                offspring: "a".into(),
            },
            CrossoverRecord {
                generation: 2,
                parent1: "a".into(),
                crossover1: 1,
                parent2: "a".into(),
                crossover2: 4,
                offspring: "b".into(),
            },
        ]);

        assert_eq!(log.parents_of("b").unwrap().parent1, "a");
        assert!(log.parents_of("p1").is_none());

        // Self-mating yields two entries, one per parent slot.
        assert_eq!(log.children_of("a"), vec![("b", 1), ("b", 4)]);
        assert!(log.children_of("b").is_empty());
    }

    #[test]
    fn loads_quoted_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crossover_parents.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "\"Generation: 1\",\"Parent_1: (p1, 2)\",\"Parent_2: (p2, 5)\",\"New_Individual: a\""
        )
        .unwrap();

        let log = CrossoverLog::load(&path).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.records()[0].crossover2, 5);
    }

    #[test]
    fn missing_file_is_a_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = CrossoverLog::load(&dir.path().join("crossover_parents.csv")).unwrap_err();
        assert!(matches!(err, EvoVisError::MissingArtifact(_)));
    }
}
