//! Project paths and run settings.

use std::path::{Path, PathBuf};

use crate::types::Scenario;

/// Data roots and run settings shared by the pipeline binaries.
///
/// # Example
///
/// ```
/// use clpost_rs::config::ProjectConfig;
/// use clpost_rs::types::Scenario;
///
/// let config = ProjectConfig::new().with_last_full_year(2038);
/// let case = config.case_root(Scenario::S1);
/// assert!(case.ends_with("fin"));
/// ```
#[derive(Clone, Debug)]
pub struct ProjectConfig {
    emissions_root: PathBuf,
    model_root: PathBuf,
    output_root: PathBuf,
    scenarios: [Scenario; 2],
    last_full_year: i32,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            emissions_root: PathBuf::from("data/emissions"),
            model_root: PathBuf::from("data/model"),
            output_root: PathBuf::from("output"),
            scenarios: Scenario::BOTH,
            last_full_year: 2038,
        }
    }
}

impl ProjectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place all three data roots under one directory, the layout the
    /// binaries expect from their optional root argument.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        ProjectConfig {
            emissions_root: root.join("emissions"),
            model_root: root.join("model"),
            output_root: root.join("output"),
            ..Self::default()
        }
    }

    pub fn with_emissions_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.emissions_root = path.into();
        self
    }

    pub fn with_model_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_root = path.into();
        self
    }

    pub fn with_output_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_root = path.into();
        self
    }

    pub fn with_last_full_year(mut self, year: i32) -> Self {
        self.last_full_year = year;
        self
    }

    /// Root of the emission inventory files.
    pub fn emissions_root(&self) -> &Path {
        &self.emissions_root
    }

    /// Root of the model history output.
    pub fn model_root(&self) -> &Path {
        &self.model_root
    }

    /// Directory all products are written under.
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// The scenario pair every comparison runs over.
    pub fn scenarios(&self) -> [Scenario; 2] {
        self.scenarios
    }

    /// Last year with a full twelve months of model output.
    pub fn last_full_year(&self) -> i32 {
        self.last_full_year
    }

    /// Model output directory of one scenario.
    pub fn case_root(&self, scenario: Scenario) -> PathBuf {
        self.model_root.join(scenario.case_dir())
    }

    /// A file under the output root.
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_root.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_roots() {
        let config = ProjectConfig::new().with_model_root("/data/run");
        assert_eq!(
            config.case_root(Scenario::S1),
            PathBuf::from("/data/run/fin")
        );
        assert_eq!(
            config.case_root(Scenario::Ssp370),
            PathBuf::from("/data/run/nochg")
        );
    }

    #[test]
    fn test_under_root() {
        let config = ProjectConfig::under("/work");
        assert_eq!(config.emissions_root(), Path::new("/work/emissions"));
        assert_eq!(config.output_path("fldmean.csv"), PathBuf::from("/work/output/fldmean.csv"));
        assert_eq!(config.last_full_year(), 2038);
    }
}
