//! Trainable predictive models and the registry that owns them.
//!
//! Two model families are supported: a closed-form single-feature linear
//! regression and a gradient-descent logistic binary classifier. The
//! [`ModelRegistry`](registry::ModelRegistry) owns every named model
//! instance and is the only writer of model parameters: a training call
//! either fully succeeds (all fields set together) or fully fails (nothing
//! touched).

pub mod error;
pub mod linear;
pub mod logistic;
pub mod model;
pub mod registry;

pub use error::ModelError;
pub use model::{Model, ModelKind, ModelParams};
pub use registry::{ModelInfo, ModelRegistry, Prediction, TrainingReport};
