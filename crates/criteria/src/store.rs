//! Criteria store keyed by research method.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::criterion::{CriteriaSet, CriterionRecord};
use crate::prompt::{render_prompt, CriterionPrompt};

/// Error type for criteria loading.
pub type Result<T> = std::result::Result<T, CriteriaError>;

/// Errors raised while reading criteria files.
///
/// Malformed rows are not errors; they are skipped with a warning.
#[derive(Debug, thiserror::Error)]
pub enum CriteriaError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// File being read
        path: PathBuf,
        /// Underlying reader error
        source: csv::Error,
    },
}

/// Counts from one CSV load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Rows merged into the store
    pub rows: usize,
    /// Rows skipped for having the wrong number of fields
    pub skipped: usize,
}

/// Number of fields in a criteria row:
/// `description, level, moscow_priority, attribute_text`.
const ROW_ARITY: usize = 4;

/// Quality criteria for multiple research methods.
///
/// Methods are loaded on demand from `<criteria_dir>/<method>.csv` and kept
/// for the life of the store.
#[derive(Debug, Clone)]
pub struct CriteriaStore {
    criteria_dir: PathBuf,
    criteria: BTreeMap<String, CriteriaSet>,
    loaded: HashSet<PathBuf>,
}

impl CriteriaStore {
    /// Create an empty store resolving criteria files under `criteria_dir`.
    pub fn new(criteria_dir: impl Into<PathBuf>) -> Self {
        Self {
            criteria_dir: criteria_dir.into(),
            criteria: BTreeMap::new(),
            loaded: HashSet::new(),
        }
    }

    /// Canonical criteria file for a method.
    pub fn criteria_path(&self, research_method: &str) -> PathBuf {
        self.criteria_dir.join(format!("{research_method}.csv"))
    }

    /// Load a criteria file, using its file stem as the research method.
    ///
    /// The header row is discarded. Loading merges into any criteria already
    /// present, so reading the same file twice changes nothing.
    pub fn load_from_csv(&mut self, path: impl AsRef<Path>) -> Result<LoadStats> {
        let path = path.as_ref();
        let research_method = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.load_csv_as(&research_method, path)
    }

    /// Load a criteria file into the set of `research_method`.
    fn load_csv_as(&mut self, research_method: &str, path: &Path) -> Result<LoadStats> {
        let csv_err = |source| CriteriaError::Csv { path: path.to_path_buf(), source };
        let file = std::fs::File::open(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let mut stats = LoadStats::default();
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            if record.len() != ROW_ARITY {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                warn!(
                    "Skipping malformed row at {}:{} ({} fields): {:?}",
                    path.display(),
                    line,
                    record.len(),
                    record.iter().collect::<Vec<_>>()
                );
                stats.skipped += 1;
                continue;
            }
            self.add_criterion(research_method, &record[0], &record[1], &record[2], &record[3]);
            stats.rows += 1;
        }

        self.loaded.insert(path.to_path_buf());
        debug!(
            "Loaded {} criteria rows for {} ({} skipped)",
            stats.rows, research_method, stats.skipped
        );
        Ok(stats)
    }

    /// Merge one criteria row into a method's set.
    ///
    /// When the description already exists only the attribute is added; the
    /// `level` of the first occurrence is kept.
    pub fn add_criterion(
        &mut self,
        research_method: &str,
        description: &str,
        level: &str,
        moscow: &str,
        attribute: &str,
    ) {
        self.criteria
            .entry(research_method.to_string())
            .or_default()
            .add(description, level, moscow, attribute);
    }

    /// Criteria set of a method, if any were loaded.
    pub fn get(&self, research_method: &str) -> Option<&CriteriaSet> {
        self.criteria.get(research_method)
    }

    /// Projections of all criteria for a method; empty for unknown methods.
    pub fn get_criteria_for_method(&self, research_method: &str) -> Vec<CriterionRecord> {
        self.criteria
            .get(research_method)
            .map(CriteriaSet::records)
            .unwrap_or_default()
    }

    /// Load the method's criteria file if it exists.
    ///
    /// Returns `None` when no file is defined for the method. A file is read
    /// at most once per store.
    pub fn load_if_present(&mut self, research_method: &str) -> Result<Option<&CriteriaSet>> {
        if !is_plain_method_name(research_method) {
            warn!("Research method '{}' cannot name a criteria file", research_method);
            return Ok(None);
        }

        let path = self.criteria_path(research_method);
        if !path.exists() {
            info!("No criteria file found for research method: {}", research_method);
            return Ok(None);
        }

        if self.loaded.contains(&path) {
            debug!("Criteria for {} already loaded from {}", research_method, path.display());
        } else {
            info!("Criteria file found: {}", path.display());
            self.load_csv_as(research_method, &path)?;
        }

        Ok(Some(self.criteria.entry(research_method.to_string()).or_default()))
    }

    /// Load the method's criteria if a file exists and return their
    /// projections; `None` means no criteria are defined for the method.
    pub fn is_criteria_available(&mut self, research_method: &str) -> Result<Option<Vec<CriterionRecord>>> {
        Ok(self.load_if_present(research_method)?.map(CriteriaSet::records))
    }

    /// Look up a criterion and render its question.
    pub fn lookup_prompt(&self, research_method: &str, description: &str) -> CriterionPrompt {
        match self.get(research_method).and_then(|set| set.get(description)) {
            Some(criterion) => CriterionPrompt::Found(render_prompt(criterion)),
            None => CriterionPrompt::not_found(research_method, description),
        }
    }

    /// Question for one criterion.
    ///
    /// An unknown description yields a placeholder question rather than an
    /// error.
    pub fn generate_prompt_for_criterion(&self, research_method: &str, description: &str) -> String {
        self.lookup_prompt(research_method, description).into_text()
    }

    /// Methods with a criteria file in the criteria directory, sorted.
    pub fn available_methods(&self) -> Result<Vec<String>> {
        let mut methods = Vec::new();
        for entry in std::fs::read_dir(&self.criteria_dir)? {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
            if is_csv {
                if let Some(stem) = path.file_stem() {
                    methods.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        methods.sort();
        Ok(methods)
    }

    /// Full dump of every loaded method and criterion.
    pub fn print_all_criteria(&self) -> String {
        self.to_string()
    }
}

/// Whether a method can be used as a file name inside the criteria directory.
fn is_plain_method_name(research_method: &str) -> bool {
    !research_method.is_empty()
        && !research_method.contains(['/', '\\'])
        && !research_method.contains("..")
}

impl Default for CriteriaStore {
    fn default() -> Self {
        Self::new("csv")
    }
}

impl std::fmt::Display for CriteriaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (research_method, set) in &self.criteria {
            writeln!(f, "Research Method: {research_method}")?;
            for criterion in set {
                write!(f, "{criterion}")?;
            }
        }
        Ok(())
    }
}
