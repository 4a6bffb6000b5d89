#![deny(warnings)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod fit;
pub mod model;
pub mod report;

pub use error::PerceptronError;
pub use fit::{train, train_from, train_until_stable, Fit, TrainConfig, Trajectory};
pub use model::{Float, LinearModel, Sample};
