use std::fs;

use perceptron::{
    config::RunConfig,
    dataset::{make_rng, random_initial_model, SyntheticDataset},
    train, train_until_stable, LinearModel, TrainConfig,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn well_separated_data_is_learned_and_plotted() {
    init_logger();

    let dataset = SyntheticDataset {
        samples: 40,
        class_sep: 6.0,
        ..SyntheticDataset::default()
    }
    .with_seed(1);
    let samples = dataset.generate().unwrap();
    let config = TrainConfig::new(0.025, 2000, LinearModel::new(-7.0, 4.0));

    let fit = train(&samples, &config).unwrap();
    assert_eq!(fit.trajectory().len(), 2001);
    // Gaussian tails can still overlap, so allow a couple of stragglers.
    assert!(fit.model().accuracy(&samples) >= 0.95);

    let dir = std::env::temp_dir().join(format!("perceptron-pipeline-{}", std::process::id()));
    let summary = perceptron::report::Reporter::new(&dir)
        .with_size(400, 300)
        .render(&samples, &fit)
        .unwrap();
    assert!(summary.boundary_plot.exists());
    assert!(summary.parameters_plot.exists());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn configured_run_is_reproducible() {
    init_logger();

    let config = RunConfig::from_toml_str(
        r#"
        [training]
        learning_rate = 0.05
        epochs = 25
        seed = 1234

        [dataset]
        samples = 30
        "#,
    )
    .unwrap();

    let run = || {
        let mut rng = make_rng(config.training.seed);
        let samples = config.dataset().generate_with(&mut rng).unwrap();
        let initial = random_initial_model(&mut rng, config.training.init_range).unwrap();
        let fit = train(&samples, &config.train_config(initial)).unwrap();
        (samples, fit)
    };

    let (first_samples, first_fit) = run();
    let (second_samples, second_fit) = run();
    assert_eq!(first_samples, second_samples);
    assert_eq!(first_fit, second_fit);
    assert_eq!(first_fit.trajectory().len(), 26);
}

#[test]
fn early_stopping_never_outlasts_fixed_budget() {
    init_logger();

    let samples = SyntheticDataset {
        samples: 20,
        class_sep: 8.0,
        ..SyntheticDataset::default()
    }
    .with_seed(99)
    .generate()
    .unwrap();
    let config = TrainConfig::new(0.1, 500, LinearModel::new(3.0, -9.0));

    let full = train(&samples, &config).unwrap();
    let stable = train_until_stable(&samples, &config, 0.0).unwrap();

    assert!(stable.epochs_run() <= full.epochs_run());
    assert_eq!(stable.trajectory().len(), stable.epochs_run() + 1);
    // Stopping means a full pass changed nothing, so the rest of the fixed
    // run cannot have changed anything either.
    if stable.epochs_run() < full.epochs_run() {
        assert_eq!(stable.model(), full.model());
    }
}
