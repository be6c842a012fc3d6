//! Training and evaluation pipeline abstractions
//!
//! This module provides:
//! - The observed Q-learning training loop
//! - Observers for progress, metrics and JSONL export
//! - Greedy evaluation of a learned table

pub mod evaluation;
pub mod observers;
pub mod training;

pub use evaluation::{Rollout, greedy_rollout};
// Re-export observer implementations (adapters)
pub use observers::{JsonlObserver, MetricsObserver, MetricsSummary, Observation, ProgressObserver};
pub use training::{TrainingOutcome, TrainingPipeline, TrainingResult};

pub use crate::ports::Observer;
