//! Data preprocessing module
//!
//! Provides the preparation steps between a loaded table and a model:
//! - Categorical label encoding with reusable code tables
//! - Feature matrix and class label extraction
//! - Seeded train/test splitting

pub mod encoder;
pub mod features;
pub mod split;

pub use encoder::{CategoricalEncoder, Codebook, Encoded, EncodingWarning, LabelEncoder};
pub use features::{drop_columns_if_present, split_features_and_label, ClassLabels, FeatureMatrix};
pub use split::{n_test_samples, split_indices, train_test_split, TrainTestSplit};
