//! Grid-world environment
//!
//! The world is a rectangular grid of [`State`]s. The agent starts on a
//! configurable cell, moves one cell per step, and finishes by taking
//! [`Action::Finish`] from the bottom-right cell into [`State::TERMINAL`].
//! Rewards come from a pluggable [`RewardFunction`].

pub mod environment;
pub mod reward;
pub mod state;

pub use environment::GridWorld;
pub use reward::{RewardContext, RewardFunction, RewardModel, StepCost};
pub use state::{Action, State, Transition};
