//! Integration test: split, train, evaluate and select

use credit_scoring::config::PipelineConfig;
use credit_scoring::pipeline::ModelSelection;
use credit_scoring::preprocessing::{train_test_split, FeatureMatrix};
use credit_scoring::training::{
    accuracy, evaluate, train_models, DecisionTree, KNNClassifier, ModelKind, RandomForest,
};
use ndarray::{Array1, Array2};

/// Three bands of customers separated on the first two features
fn banded_data(n: usize) -> (FeatureMatrix, Array1<f64>) {
    let values = Array2::from_shape_fn((n, 3), |(r, c)| {
        let band = (r % 3) as f64;
        match c {
            0 => band * 10.0 + (r as f64 * 0.37).sin(),
            1 => band * 5.0 + (r as f64 * 0.11).cos(),
            _ => (r * 7 % 13) as f64 * 0.1,
        }
    });
    let x = FeatureMatrix::new(
        vec!["renda".into(), "dividas".into(), "ruido".into()],
        values,
    )
    .unwrap();
    let y = Array1::from_iter((0..n).map(|r| (r % 3) as f64));
    (x, y)
}

#[test]
fn test_both_models_learn_separable_bands() {
    let (x, y) = banded_data(90);
    let split = train_test_split(&x, &y, 0.2, 42).unwrap();
    assert_eq!(split.x_test.n_rows(), 18);

    let config = PipelineConfig::default().with_n_estimators(30);
    let models = train_models(&split.x_train, &split.y_train, &config).unwrap();
    let evaluation = evaluate(&models, &split.x_test, &split.y_test).unwrap();

    assert_eq!(evaluation.scores().len(), 2);
    for score in evaluation.scores() {
        assert!((0.0..=1.0).contains(&score.accuracy));
        assert!(score.accuracy >= 0.9, "{} accuracy {}", score.model, score.accuracy);
    }
}

#[test]
fn test_training_is_reproducible() {
    let (x, y) = banded_data(60);
    let config = PipelineConfig::default().with_n_estimators(20);

    let run = || {
        let split = train_test_split(&x, &y, 0.2, config.random_seed).unwrap();
        let models = train_models(&split.x_train, &split.y_train, &config).unwrap();
        let forest = models.get(ModelKind::RandomForest).unwrap();
        forest.predict(x.values()).unwrap()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_accuracy_matches_manual_count() {
    let (x, y) = banded_data(30);
    let mut tree = DecisionTree::new().with_max_depth(1).with_random_state(1);
    tree.fit(x.values(), &y, 3).unwrap();

    let predictions = tree.predict(x.values()).unwrap();
    let matches = predictions.iter().zip(y.iter()).filter(|(p, t)| p == t).count();
    assert_eq!(accuracy(&y, &predictions).unwrap(), matches as f64 / 30.0);
}

#[test]
fn test_selection_over_real_evaluation() {
    let (x, y) = banded_data(45);
    let split = train_test_split(&x, &y, 0.2, 7).unwrap();
    let config = PipelineConfig::default().with_n_estimators(10);
    let models = train_models(&split.x_train, &split.y_train, &config).unwrap();
    let evaluation = evaluate(&models, &split.x_test, &split.y_test).unwrap();

    let best = ModelSelection::BestAccuracy.select(&evaluation).unwrap();
    let best_acc = evaluation.get(best).unwrap();
    for score in evaluation.scores() {
        assert!(best_acc >= score.accuracy);
    }

    let fixed = ModelSelection::Fixed { model: ModelKind::KNearestNeighbors };
    assert_eq!(fixed.select(&evaluation).unwrap(), ModelKind::KNearestNeighbors);
}

#[test]
fn test_forest_ignores_noise_feature() {
    let (x, y) = banded_data(90);
    let mut forest = RandomForest::new(40).with_random_state(42);
    forest.fit(x.values(), &y, 3).unwrap();

    let importances = forest.feature_importances().unwrap();
    assert!((importances.sum() - 1.0).abs() < 1e-9);
    assert!(importances[2] < importances[0] + importances[1]);
}

#[test]
fn test_knn_requires_enough_rows() {
    let (x, y) = banded_data(4);
    let mut knn = KNNClassifier::with_k(5);
    assert!(knn.fit(x.values(), &y, 3).is_err());
}
