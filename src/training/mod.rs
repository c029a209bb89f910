//! Model training module
//!
//! Provides the classifiers the pipeline compares:
//! - Decision trees and Random Forests
//! - K-Nearest Neighbors
//!
//! plus the trainer that fits them on shared inputs and the hold-out
//! evaluation that scores them.

mod models;
mod trainer;
pub mod decision_tree;
pub mod evaluation;
pub mod knn;
pub mod random_forest;

pub use decision_tree::{DecisionTree, TreeNode};
pub use evaluation::{accuracy, evaluate, Evaluation, ModelScore};
pub use knn::{KNNClassifier, KNNConfig};
pub use models::{ModelKind, TrainedModel};
pub use random_forest::RandomForest;
pub use trainer::{train_models, TrainedModels};
