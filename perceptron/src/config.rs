//! Run configuration loaded from TOML.
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```
//! use perceptron::config::RunConfig;
//!
//! let config = RunConfig::from_toml_str("[training]\nepochs = 50\n").unwrap();
//! assert_eq!(config.training.epochs, 50);
//! assert_eq!(config.dataset.samples, 100);
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    dataset::SyntheticDataset,
    fit::TrainConfig,
    model::{Float, LinearModel},
    report::Reporter,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub training: TrainingSection,
    pub dataset: DatasetSection,
    pub report: ReportSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingSection {
    pub learning_rate: Float,
    pub epochs: usize,
    /// Half-open range for the random integer initial `m` and `b`.
    pub init_range: (i32, i32),
    /// Seeds both the dataset and the initial parameters.
    pub seed: Option<u64>,
}

impl Default for TrainingSection {
    fn default() -> Self {
        Self {
            learning_rate: 0.025,
            epochs: 2000,
            init_range: (-10, 10),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetSection {
    pub samples: usize,
    pub class_sep: Float,
    pub shift_range: (i32, i32),
}

impl Default for DatasetSection {
    fn default() -> Self {
        let dataset = SyntheticDataset::default();
        Self {
            samples: dataset.samples,
            class_sep: dataset.class_sep,
            shift_range: dataset.shift_range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSection {
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            width: 1024,
            height: 768,
        }
    }
}

impl RunConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn train_config(&self, initial: LinearModel) -> TrainConfig {
        TrainConfig::new(self.training.learning_rate, self.training.epochs, initial)
    }

    pub fn dataset(&self) -> SyntheticDataset {
        SyntheticDataset {
            samples: self.dataset.samples,
            class_sep: self.dataset.class_sep,
            shift_range: self.dataset.shift_range,
            seed: self.training.seed,
        }
    }

    pub fn reporter(&self) -> Reporter {
        Reporter::new(&self.report.output_dir).with_size(self.report.width, self.report.height)
    }
}
