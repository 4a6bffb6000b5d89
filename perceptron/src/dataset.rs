//! Synthetic one-feature, two-class datasets.
//!
//! Each class is a unit-variance gaussian blob centred at `-class_sep` or
//! `+class_sep`. The whole set is then shifted by one random integer so the
//! classes do not straddle the origin, and labels are handed out bipolar.

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use rand_distr::{Distribution, Normal, NormalError};
use thiserror::Error;

use crate::model::{Float, LinearModel, Sample};

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("invalid dataset parameter '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },

    #[error("could not build the feature distribution: {0}")]
    Distribution(#[from] NormalError),
}

/// Builds a seeded generator, or an OS-seeded one when `seed` is `None`.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn check_range(parameter: &'static str, range: (i32, i32)) -> Result<(), DatasetError> {
    if range.0 >= range.1 {
        return Err(DatasetError::InvalidParameter {
            parameter,
            reason: format!("range [{}, {}) is empty", range.0, range.1),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticDataset {
    pub samples: usize,
    pub class_sep: Float,
    /// Half-open range the integer shift is drawn from.
    pub shift_range: (i32, i32),
    pub seed: Option<u64>,
}

impl Default for SyntheticDataset {
    fn default() -> Self {
        Self {
            samples: 100,
            class_sep: 1.5,
            shift_range: (-10, 10),
            seed: None,
        }
    }
}

impl SyntheticDataset {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn generate(&self) -> Result<Vec<Sample>, DatasetError> {
        let mut rng = make_rng(self.seed);
        self.generate_with(&mut rng)
    }

    /// Draws the dataset from `rng`. Classes are balanced and their order is
    /// shuffled once; the trainer keeps that order for every epoch.
    pub fn generate_with<R: Rng>(&self, rng: &mut R) -> Result<Vec<Sample>, DatasetError> {
        if self.samples == 0 {
            return Err(DatasetError::InvalidParameter {
                parameter: "samples",
                reason: "at least one sample is required".to_string(),
            });
        }
        if !(self.class_sep >= 0.0 && self.class_sep.is_finite()) {
            return Err(DatasetError::InvalidParameter {
                parameter: "class_sep",
                reason: format!("must be finite and non-negative, got {}", self.class_sep),
            });
        }
        check_range("shift_range", self.shift_range)?;

        let noise = Normal::<Float>::new(0.0, 1.0)?;

        let mut classes: Vec<bool> = (0..self.samples).map(|i| i % 2 == 1).collect();
        classes.shuffle(rng);

        let shift = rng.random_range(self.shift_range.0..self.shift_range.1) as Float;
        let samples = classes
            .into_iter()
            .map(|class| {
                let centre = if class { self.class_sep } else { -self.class_sep };
                Sample::from_class(centre + noise.sample(rng) + shift, class)
            })
            .collect();
        Ok(samples)
    }
}

/// Picks integer-valued initial parameters from the half-open `range`.
pub fn random_initial_model<R: Rng>(
    rng: &mut R,
    range: (i32, i32),
) -> Result<LinearModel, DatasetError> {
    check_range("init_range", range)?;
    let slope = rng.random_range(range.0..range.1) as Float;
    let intercept = rng.random_range(range.0..range.1) as Float;
    Ok(LinearModel::new(slope, intercept))
}
