//! adaptiq-core: Question selection, difficulty adaptation, and the game loop.
//!
//! This crate defines the question model, the predictor and presenter traits,
//! and the session state machine that the rest of adaptiq builds on.

pub mod controller;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod selection;
pub mod session;
pub mod statistics;
pub mod traits;
