//! Reinforcement-learning sandbox: a deterministic grid world and tabular
//! Q-learning control
//!
//! This crate provides:
//! - Grid-world environment with pluggable reward strategies
//! - Q-table, epsilon-greedy policy and action sampler
//! - Q-learning control loop with observable training pipeline
//! - Greedy evaluation of learned tables
//! - JSON experiment configuration and a CLI

pub mod cli;
pub mod config;
pub mod error;
pub mod gridworld;
pub mod pipeline;
pub mod ports;
pub mod q_learning;

pub use config::{EnvironmentConfig, ExperimentConfig};
pub use error::{Error, Result};
pub use gridworld::{Action, GridWorld, RewardFunction, RewardModel, State, StepCost, Transition};
pub use q_learning::{QLearningConfig, QTable, q_learning};
