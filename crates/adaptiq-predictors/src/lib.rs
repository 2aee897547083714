//! adaptiq-predictors: Difficulty predictor integrations.
//!
//! Implements the `Predictor` trait for a local hold/fixed policy, a remote
//! HTTP model, and a scriptable mock, plus configuration loading and the
//! predictor factory.

pub mod config;
pub mod hold;
pub mod http;
pub mod mock;

pub use config::{create_predictor, load_config, load_config_from, AdaptiqConfig, PredictorConfig};
pub use hold::{FixedPredictor, HoldPredictor};
pub use http::HttpPredictor;
pub use mock::{MockPredictor, MockReply};
