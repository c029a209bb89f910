use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use credit_scoring::training::{KNNClassifier, RandomForest};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn create_classification_data(n_rows: usize, n_features: usize) -> (Array2<f64>, Array1<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let x = Array2::from_shape_fn((n_rows, n_features), |_| rng.gen::<f64>() * 10.0);

    // Three classes from the first two features plus noise
    let y: Array1<f64> = x
        .rows()
        .into_iter()
        .map(|row| {
            let score = row[0] + row[1] + rng.gen::<f64>();
            if score < 7.0 {
                0.0
            } else if score < 13.0 {
                1.0
            } else {
                2.0
            }
        })
        .collect();

    (x, y)
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10); // Fewer samples for training benchmarks

    for n_rows in [1000, 5000, 10000].iter() {
        let data = create_classification_data(*n_rows, 10);

        group.bench_with_input(BenchmarkId::new("random_forest_fit", n_rows), &data, |b, (x, y)| {
            b.iter(|| {
                let mut forest = RandomForest::new(100).with_random_state(42);
                forest.fit(black_box(x), black_box(y), 3).unwrap();
                forest
            })
        });
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    // Train models once
    let (x_train, y_train) = create_classification_data(5000, 10);
    let mut forest = RandomForest::new(100).with_random_state(42);
    forest.fit(&x_train, &y_train, 3).unwrap();
    let mut knn = KNNClassifier::with_k(5);
    knn.fit(&x_train, &y_train, 3).unwrap();

    for n_rows in [100, 1000].iter() {
        let (x_test, _) = create_classification_data(*n_rows, 10);

        group.bench_with_input(BenchmarkId::new("random_forest", n_rows), &x_test, |b, x| {
            b.iter(|| forest.predict(black_box(x)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("knn", n_rows), &x_test, |b, x| {
            b.iter(|| knn.predict(black_box(x)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_training, bench_prediction);
criterion_main!(benches);
