use std::fmt::Display;

use crate::error::PerceptronError;

pub type Float = f64;

/// One training example: a scalar feature and a bipolar label.
///
/// The label is expected to be exactly `+1` or `-1`; the trainer rejects
/// anything else before touching the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub feature: Float,
    pub label: i8,
}

impl Sample {
    pub fn new(feature: Float, label: i8) -> Self {
        Self { feature, label }
    }

    /// Builds a sample from a `{0, 1}` style class, mapping `false` to `-1`
    /// and `true` to `+1`.
    pub fn from_class(feature: Float, class: bool) -> Self {
        Self::new(feature, if class { 1 } else { -1 })
    }

    pub fn has_bipolar_label(&self) -> bool {
        self.label == 1 || self.label == -1
    }
}

impl From<(Float, i8)> for Sample {
    fn from(value: (Float, i8)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// The decision function `z(x) = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinearModel {
    pub slope: Float,
    pub intercept: Float,
}

impl LinearModel {
    pub fn new(slope: Float, intercept: Float) -> Self {
        Self { slope, intercept }
    }

    pub fn score(&self, x: Float) -> Float {
        self.slope * x + self.intercept
    }

    /// Zero scores classify as positive.
    pub fn predict(&self, x: Float) -> i8 {
        if self.score(x) >= 0.0 {
            1
        } else {
            -1
        }
    }

    pub fn classifies(&self, sample: &Sample) -> bool {
        self.predict(sample.feature) == sample.label
    }

    /// Fraction of `samples` classified correctly. An empty slice scores 0.
    pub fn accuracy(&self, samples: &[Sample]) -> Float {
        if samples.is_empty() {
            return 0.0;
        }
        let correct = samples.iter().filter(|s| self.classifies(s)).count();
        correct as Float / samples.len() as Float
    }

    /// The point `x* = -b / m` where the score crosses zero.
    pub fn boundary(&self) -> Result<Float, PerceptronError> {
        if self.slope == 0.0 {
            return Err(PerceptronError::DegenerateBoundary);
        }
        Ok(-self.intercept / self.slope)
    }

    pub fn is_finite(&self) -> bool {
        self.slope.is_finite() && self.intercept.is_finite()
    }
}

impl Display for LinearModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "z = {}x + {}", self.slope, self.intercept)
    }
}
