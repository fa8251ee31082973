use gridsweep::{
    algorithms::KNN,
    data::{Dataset, KFold, TrainTestSplit},
    ndarray::{Array1, Array2},
    sweep::{GridSearch, HyperparameterSpace},
    SweepConfig,
};
use log::info;

fn load_iris() -> Result<Dataset, Box<dyn std::error::Error>> {
    let iris = linfa_datasets::iris();
    let records = iris.records();
    let features = Array2::from_shape_vec(
        (records.nrows(), records.ncols()),
        records.iter().copied().collect(),
    )?;
    let targets = Array1::from_iter(iris.targets().iter().map(|&t| t as f64));
    Ok(Dataset::new(features, targets)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Hold out a quarter of the samples, keeping the class proportions
    let data = load_iris()?;
    let (train, test) = TrainTestSplit::new(0.25).seed(42).stratify(true).split(&data)?;
    info!("Training on {} samples, testing on {}", train.n_samples(), test.n_samples());

    // Baseline with the default hyperparameters
    let mut model = KNN::new().build();
    model.fit(train.features(), train.targets())?;
    let predictions = model.predict(test.features())?;
    println!(
        "Default KNN (k = {}) test accuracy: {:.4}\n",
        model.k(),
        model.calculate_accuracy(&predictions, test.targets())
    );

    // Accuracy on the held-out set as k varies
    let k_values: Vec<i64> = (1..=25).collect();
    let space = HyperparameterSpace::new().with_param("n_neighbors", k_values.clone());
    let by_k = GridSearch::new(KNN::from_combination, space).build().run_holdout(&train, &test)?;
    println!("Held-out accuracy by k:\n{}", by_k.table());

    // Accuracy grid over k and the vote weighting
    let space = HyperparameterSpace::new()
        .with_param("n_neighbors", k_values)
        .with_param("weights", ["uniform", "distance"]);
    let by_k_and_weights =
        GridSearch::new(KNN::from_combination, space).build().run_holdout(&train, &test)?;
    println!("{}", by_k_and_weights.score_grid("n_neighbors", "weights")?);

    // Cross-validated search on the training set only, refitting the winner
    let space = HyperparameterSpace::new()
        .with_param("n_neighbors", (1..=30).collect::<Vec<i64>>())
        .with_param("weights", ["uniform", "distance"])
        .with_param("metric", ["euclidean", "manhattan", "chebyshev"]);
    let search = GridSearch::new(KNN::from_combination, space)
        .config(SweepConfig::new().with_available_parallelism())
        .build();
    let outcome = search.fit(&train, &KFold::new(10).shuffle(42).stratified(true))?;

    println!("Top 10 of {} combinations (10-fold CV):", outcome.report().len());
    println!("{}", outcome.report().table().limit(10));

    let best = outcome.best()?;
    println!(
        "Best combination: {} (mean accuracy {:.4})",
        best.combination(),
        best.score().unwrap_or(f64::NAN)
    );

    if let Some(model) = outcome.best_model() {
        let predictions = model.predict(test.features())?;
        let accuracy = model.calculate_accuracy(&predictions, test.targets());
        println!("Refitted test accuracy: {:.4}", accuracy);
    }

    Ok(())
}
