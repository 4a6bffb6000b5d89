use log::{debug, info};

use crate::{
    error::{PerceptronError, Result},
    model::{Float, LinearModel, Sample},
};

/// Hyperparameters and starting point of a training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    pub learning_rate: Float,
    pub epochs: usize,
    pub initial: LinearModel,
}

impl TrainConfig {
    pub fn new(learning_rate: Float, epochs: usize, initial: LinearModel) -> Self {
        Self {
            learning_rate,
            epochs,
            initial,
        }
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.025,
            epochs: 2000,
            initial: LinearModel::default(),
        }
    }
}

/// Snapshots of `(m, b)`: the initial model followed by one entry per
/// completed epoch. Only the trainer appends to it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    snapshots: Vec<LinearModel>,
}

impl Trajectory {
    fn starting_at(initial: LinearModel) -> Self {
        Self {
            snapshots: vec![initial],
        }
    }

    fn record(&mut self, model: LinearModel) {
        self.snapshots.push(model);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshot after `epoch` completed epochs; `get(0)` is the initial model.
    pub fn get(&self, epoch: usize) -> Option<&LinearModel> {
        self.snapshots.get(epoch)
    }

    pub fn first(&self) -> Option<&LinearModel> {
        self.snapshots.first()
    }

    pub fn last(&self) -> Option<&LinearModel> {
        self.snapshots.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LinearModel> {
        self.snapshots.iter()
    }

    pub fn as_slice(&self) -> &[LinearModel] {
        &self.snapshots
    }

    pub fn slopes(&self) -> impl Iterator<Item = Float> + '_ {
        self.snapshots.iter().map(|m| m.slope)
    }

    pub fn intercepts(&self) -> impl Iterator<Item = Float> + '_ {
        self.snapshots.iter().map(|m| m.intercept)
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a LinearModel;
    type IntoIter = std::slice::Iter<'a, LinearModel>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Result of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct Fit {
    model: LinearModel,
    trajectory: Trajectory,
    mistakes: Vec<usize>,
}

impl Fit {
    pub fn model(&self) -> &LinearModel {
        &self.model
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Number of updates applied during each epoch.
    pub fn mistakes(&self) -> &[usize] {
        &self.mistakes
    }

    pub fn epochs_run(&self) -> usize {
        self.mistakes.len()
    }
}

/// Mutable training state, owned by a single call to [`train`].
struct Perceptron<'a> {
    samples: &'a [Sample],
    learning_rate: Float,
    model: LinearModel,
}

impl<'a> Perceptron<'a> {
    fn new(samples: &'a [Sample], config: &TrainConfig) -> Self {
        Self {
            samples,
            learning_rate: config.learning_rate,
            model: config.initial,
        }
    }

    /// One ordered pass over the samples. Returns how many updates were made.
    fn run_epoch(&mut self, epoch: usize) -> Result<usize> {
        let mut updates = 0;
        for (index, sample) in self.samples.iter().enumerate() {
            if self.model.classifies(sample) {
                continue;
            }

            let label = Float::from(sample.label);
            self.model.slope += self.learning_rate * sample.feature * label;
            self.model.intercept += self.learning_rate * label;
            updates += 1;

            if !self.model.is_finite() {
                return Err(PerceptronError::NumericDivergence {
                    epoch,
                    sample: index,
                    slope: self.model.slope,
                    intercept: self.model.intercept,
                });
            }
        }
        Ok(updates)
    }
}

fn validate(samples: &[Sample], config: &TrainConfig) -> Result<()> {
    if samples.is_empty() {
        return Err(PerceptronError::invalid_config(
            "samples",
            "at least one sample is required",
        ));
    }
    // Also rejects NaN.
    if !(config.learning_rate > 0.0 && config.learning_rate.is_finite()) {
        return Err(PerceptronError::invalid_config(
            "learning_rate",
            format!("must be positive and finite, got {}", config.learning_rate),
        ));
    }
    if !config.initial.is_finite() {
        return Err(PerceptronError::invalid_config(
            "initial",
            format!("parameters must be finite, got ({})", config.initial),
        ));
    }

    for (index, sample) in samples.iter().enumerate() {
        if !sample.has_bipolar_label() {
            return Err(PerceptronError::InvalidLabel {
                index,
                label: sample.label,
            });
        }
        if !sample.feature.is_finite() {
            return Err(PerceptronError::NonFiniteFeature {
                index,
                value: sample.feature,
            });
        }
    }
    Ok(())
}

fn run<F>(samples: &[Sample], config: &TrainConfig, mut should_stop: F) -> Result<Fit>
where
    F: FnMut(&LinearModel, &LinearModel) -> bool,
{
    validate(samples, config)?;

    let mut perceptron = Perceptron::new(samples, config);
    let mut trajectory = Trajectory::starting_at(config.initial);
    let mut mistakes = Vec::with_capacity(config.epochs);

    for epoch in 0..config.epochs {
        let previous = perceptron.model;
        let updates = perceptron.run_epoch(epoch)?;

        trajectory.record(perceptron.model);
        mistakes.push(updates);
        debug!(
            "epoch: {}, m: {}, b: {}, updates: {}",
            epoch, perceptron.model.slope, perceptron.model.intercept, updates
        );

        if should_stop(&previous, &perceptron.model) {
            info!("parameters stable after {} epochs", epoch + 1);
            break;
        }
    }

    info!(
        "trained on {} samples for {} epochs: {}",
        samples.len(),
        mistakes.len(),
        perceptron.model
    );

    Ok(Fit {
        model: perceptron.model,
        trajectory,
        mistakes,
    })
}

/// Trains for exactly `config.epochs` passes over `samples`, in order.
///
/// A sample is only used for an update when the current model misclassifies
/// it: `m += lr * x * y` and `b += lr * y`. The returned trajectory always has
/// `config.epochs + 1` entries.
///
/// # Errors
/// * `InvalidConfiguration` for an empty sample set, a learning rate that is
///   not positive and finite, or non-finite initial parameters.
/// * `InvalidLabel` / `NonFiniteFeature` for the first malformed sample.
/// * `NumericDivergence` if an update produces a non-finite parameter.
pub fn train(samples: &[Sample], config: &TrainConfig) -> Result<Fit> {
    run(samples, config, |_, _| false)
}

pub fn train_from(
    samples: &[Sample],
    initial_m: Float,
    initial_b: Float,
    learning_rate: Float,
    epochs: usize,
) -> Result<Fit> {
    let config = TrainConfig::new(
        learning_rate,
        epochs,
        LinearModel::new(initial_m, initial_b),
    );
    train(samples, &config)
}

/// Like [`train`], but stops after the first epoch that moves neither `m`
/// nor `b` by more than `tolerance`. At most `config.epochs` epochs run and
/// the trajectory has `fit.epochs_run() + 1` entries.
pub fn train_until_stable(
    samples: &[Sample],
    config: &TrainConfig,
    tolerance: Float,
) -> Result<Fit> {
    if !(tolerance >= 0.0 && tolerance.is_finite()) {
        return Err(PerceptronError::invalid_config(
            "tolerance",
            format!("must be finite and non-negative, got {}", tolerance),
        ));
    }
    run(samples, config, |before, after| {
        (after.slope - before.slope).abs() <= tolerance
            && (after.intercept - before.intercept).abs() <= tolerance
    })
}
