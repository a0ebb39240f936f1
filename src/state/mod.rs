//! State module for tracking worker progress
//!
//! # Components
//!
//! - `WorkerState`: the per-worker state machine driven by the pipeline

mod worker_state;

pub use worker_state::WorkerState;
