//! Structural checks over all run artifacts.
//!
//! Unlike the engines, which fail fast on corrupt input, validation
//! accumulates every finding into human-readable messages so the rendering
//! layer can show the full list instead of aborting at the first issue.

use crate::records::crossover::CrossoverRecord;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    messages: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn extend(&mut self, messages: Vec<String>) {
        self.messages.extend(messages);
    }

    pub fn is_ok(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

/// Run every artifact check over the run directory.
pub fn validate_run(root: &Path) -> ValidationReport {
    let mut report = ValidationReport::new();
    report.extend(validate_config(root));
    report.extend(validate_search_space(root));
    report.extend(validate_crossover_log(root));
    report.extend(validate_generations(root));
    if !report.is_ok() {
        log::warn!("run validation found {} issue(s)", report.len());
    }
    report
}

fn read_json(path: &Path) -> Result<Value, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|_| format!("file '{}' not found", file_name(path)))?;
    serde_json::from_str(&text)
        .map_err(|_| format!("invalid JSON format in {}", file_name(path)))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Checks over `config.json`: presence, JSON shape, the `hyperparameters` and
/// `results` sections, and the required `value` key per hyperparameter.
pub fn validate_config(root: &Path) -> Vec<String> {
    let path = root.join("config.json");
    let mut messages = Vec::new();

    let data = match read_json(&path) {
        Ok(data) => data,
        Err(reason) => return vec![format!("Error config.json file: {reason}.")],
    };

    match data.get("hyperparameters") {
        None => messages.push(
            "Error config.json file: Missing 'hyperparameters' key in config.json.".to_string(),
        ),
        Some(Value::Object(hyperparameters)) => {
            for (name, details) in hyperparameters {
                let Value::Object(details) = details else {
                    messages.push(format!(
                        "Error config.json file: Hyperparameter '{name}' settings must be a dictionary."
                    ));
                    continue;
                };
                if !details.contains_key("value") {
                    messages.push(format!(
                        "Error config.json file: Missing 'value' key for hyperparameter '{name}'."
                    ));
                }
            }
        }
        Some(_) => messages
            .push("Error config.json file: Hyperparameters must be a dictionary.".to_string()),
    }

    match data.get("results") {
        None => messages
            .push("Error config.json file: Missing 'results' key in config.json.".to_string()),
        Some(Value::Object(results)) => {
            for (name, details) in results {
                if !details.is_object() {
                    messages.push(format!(
                        "Error config.json file: Result '{name}' settings must be a dictionary."
                    ));
                }
            }
        }
        Some(_) => {
            messages.push("Error config.json file: Results must be a dictionary.".to_string())
        }
    }

    messages
}

/// Checks over `search_space.json`: required sections, per-gene `layer` and
/// `f_name` keys, per-rule `rule` keys, the `Start` rule, and group-rule
/// shape.
pub fn validate_search_space(root: &Path) -> Vec<String> {
    let path = root.join("search_space.json");
    let mut messages = Vec::new();

    let data = match read_json(&path) {
        Ok(data) => data,
        Err(reason) => return vec![format!("Error search_space.json file: {reason}.")],
    };

    match data.get("gene_pool") {
        None => messages.push(
            "Error search_space.json file: Missing 'gene_pool' key in search_space.json."
                .to_string(),
        ),
        Some(Value::Object(gene_pool)) => {
            for (group, genes) in gene_pool {
                let Value::Array(genes) = genes else {
                    messages.push(format!(
                        "Error search_space.json file: Gene pool '{group}' must be a list."
                    ));
                    continue;
                };
                for gene in genes {
                    let Value::Object(gene) = gene else {
                        messages.push(format!(
                            "Error search_space.json file: Gene in '{group}' must be a dictionary."
                        ));
                        continue;
                    };
                    if !gene.contains_key("layer") {
                        messages.push(format!(
                            "Error search_space.json file: Gene in '{group}' is missing 'layer' key."
                        ));
                    } else if !gene.contains_key("f_name") {
                        messages.push(format!(
                            "Error search_space.json file: Gene in '{group}' is missing 'f_name' key."
                        ));
                    }
                }
            }
        }
        Some(_) => messages
            .push("Error search_space.json file: Gene pool must be a dictionary.".to_string()),
    }

    match data.get("rule_set") {
        None => messages.push(
            "Error search_space.json file: Missing 'rule_set' key in search_space.json."
                .to_string(),
        ),
        Some(Value::Object(rule_set)) => {
            for (layer, entry) in rule_set {
                match entry {
                    Value::Object(entry) if entry.contains_key("rule") => {}
                    _ => messages.push(format!(
                        "Error search_space.json file: Rule entry '{layer}' in 'rule_set' is missing 'rule' key."
                    )),
                }
            }
            if !rule_set.contains_key("Start") {
                messages.push(
                    "Error search_space.json file: Rule entry with layer 'Start' is missing."
                        .to_string(),
                );
            }
        }
        Some(_) => messages
            .push("Error search_space.json file: Rule set must be a dictionary.".to_string()),
    }

    match data.get("rule_set_group") {
        // Optional section.
        None => {}
        Some(Value::Array(group_rules)) => {
            for entry in group_rules {
                let Value::Object(entry) = entry else {
                    messages.push(
                        "Error search_space.json file: Group rule in 'rule_set_group' must be a dictionary."
                            .to_string(),
                    );
                    continue;
                };
                if !entry.contains_key("group") {
                    messages.push(
                        "Error search_space.json file: Group rule entry in 'rule_set_group' is missing 'group' key."
                            .to_string(),
                    );
                } else if !entry.contains_key("rule") {
                    messages.push(
                        "Error search_space.json file: Group rule entry in 'rule_set_group' is missing 'rule' key."
                            .to_string(),
                    );
                }
            }
        }
        Some(_) => messages
            .push("Error search_space.json file: Rule set groups must be a list.".to_string()),
    }

    messages
}

/// Per-row checks over `crossover_parents.csv`, one message per offending row
/// with its 1-based index.
pub fn validate_crossover_log(root: &Path) -> Vec<String> {
    let path = root.join("crossover_parents.csv");
    if !path.is_file() {
        return vec![
            "Error crossover_parents.csv file: file 'crossover_parents.csv' not found."
                .to_string(),
        ];
    }

    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(&path);
    let mut reader = match reader {
        Ok(reader) => reader,
        Err(_) => {
            return vec![
                "Error crossover_parents.csv file: Invalid CSV format in crossover_parents.csv."
                    .to_string(),
            ]
        }
    };

    let mut messages = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        match row {
            Ok(row) => {
                if let Err(err) =
                    CrossoverRecord::parse_row("crossover_parents.csv", idx + 1, &row)
                {
                    messages.push(format!("Error crossover_parents.csv file: {err}."));
                }
            }
            Err(_) => messages.push(format!(
                "Error crossover_parents.csv file row {}: unreadable row.",
                idx + 1
            )),
        }
    }

    messages
}

/// Checks over the `Generation_<n>` directory tree: at least one generation,
/// and `chromosome.json` + `results.json` present and parseable per
/// individual.
pub fn validate_generations(root: &Path) -> Vec<String> {
    let mut messages = Vec::new();

    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(_) => return vec![format!("Run directory not found: {}.", root.display())],
    };

    let mut generation_dirs: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            let suffix = name.strip_prefix("Generation_")?;
            suffix.parse::<u32>().ok().map(|_| name)
        })
        .collect();
    generation_dirs.sort();

    if generation_dirs.is_empty() {
        return vec!["No generation directories found.".to_string()];
    }

    for generation_dir in &generation_dirs {
        let generation_path = root.join(generation_dir);
        let Ok(individuals) = std::fs::read_dir(&generation_path) else {
            continue;
        };

        for individual in individuals.flatten() {
            if !individual.path().is_dir() {
                continue;
            }
            let name = individual.file_name().to_string_lossy().to_string();

            for file_name in ["chromosome.json", "results.json"] {
                let file_path = individual.path().join(file_name);
                if !file_path.exists() {
                    messages.push(format!(
                        "Missing file in individual {name} ({generation_dir}): {file_name}."
                    ));
                } else if read_json(&file_path).is_err() {
                    messages.push(format!(
                        "Error {file_name} file for {name} in {generation_dir}: invalid JSON format."
                    ));
                }
            }
        }
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    #[test]
    fn missing_files_are_reported_not_panicked() {
        let dir = tempfile::tempdir().unwrap();
        let report = validate_run(dir.path());

        assert!(!report.is_ok());
        assert!(report
            .messages()
            .iter()
            .any(|m| m.contains("config.json") && m.contains("not found")));
        assert!(report
            .messages()
            .iter()
            .any(|m| m.contains("crossover_parents.csv") && m.contains("not found")));
        assert!(report
            .messages()
            .iter()
            .any(|m| m.contains("No generation directories found")));
    }

    #[test]
    fn config_issues_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.json"),
            json!({
                "hyperparameters": {
                    "good": { "value": 1 },
                    "no_value": { "unit": "ms" },
                    "not_a_dict": 42
                }
            })
            .to_string(),
        )
        .unwrap();

        let messages = validate_config(dir.path());
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().any(|m| m.contains("'no_value'")));
        assert!(messages.iter().any(|m| m.contains("'not_a_dict'")));
        assert!(messages.iter().any(|m| m.contains("Missing 'results' key")));
    }

    #[test]
    fn search_space_missing_start_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("search_space.json"),
            json!({
                "gene_pool": { "grp": [ { "layer": "L1" } ] },
                "rule_set": { "L1": { "rule": [] } }
            })
            .to_string(),
        )
        .unwrap();

        let messages = validate_search_space(dir.path());
        assert!(messages.iter().any(|m| m.contains("missing 'f_name' key")));
        assert!(messages
            .iter()
            .any(|m| m.contains("Rule entry with layer 'Start' is missing")));
    }

    #[test]
    fn malformed_crossover_rows_get_row_numbers() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("crossover_parents.csv"),
            "\"Generation: 1\",\"Parent_1: (a, 2)\",\"Parent_2: (b, 3)\",\"New_Individual: c\"\n\
             \"Generation: x\",\"Parent_1: (a, 2)\",\"Parent_2: (b, 3)\",\"New_Individual: d\"\n",
        )
        .unwrap();

        let messages = validate_crossover_log(dir.path());
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("row 2"), "{}", messages[0]);
    }

    #[test]
    fn generation_tree_issues_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let individual = dir.path().join("Generation_1").join("lonely_lynx");
        fs::create_dir_all(&individual).unwrap();
        fs::write(individual.join("results.json"), "not json").unwrap();

        let messages = validate_generations(dir.path());
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().any(|m| m.contains("chromosome.json")));
        assert!(messages
            .iter()
            .any(|m| m.contains("results.json") && m.contains("invalid JSON")));
    }
}
