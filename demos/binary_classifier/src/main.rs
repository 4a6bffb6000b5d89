#![deny(warnings)]

use std::{env, error::Error};

use log::info;
use perceptron::{
    config::RunConfig,
    dataset::{make_rng, random_initial_model},
    fit::train,
};

fn binary_classifier_example(config: &RunConfig) -> Result<(), Box<dyn Error>> {
    // One generator for both the data and the starting point, so a seed
    // reproduces the whole run.
    let mut rng = make_rng(config.training.seed);
    let samples = config.dataset().generate_with(&mut rng)?;
    let initial = random_initial_model(&mut rng, config.training.init_range)?;
    info!("{} samples, starting from {}", samples.len(), initial);

    let fit = train(&samples, &config.train_config(initial))?;
    let model = fit.model();
    info!(
        "final model: {}, accuracy: {:.2}",
        model,
        model.accuracy(&samples)
    );

    let summary = config.reporter().render(&samples, &fit)?;
    match summary.boundary {
        Some(x) => info!("decision boundary at x = {}", x),
        None => info!("no well-defined decision boundary"),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match env::args().nth(1) {
        Some(path) => RunConfig::load_from_file(&path)?,
        None => RunConfig::default(),
    };
    binary_classifier_example(&config)
}
