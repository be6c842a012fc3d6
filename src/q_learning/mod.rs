//! Tabular Q-learning
//!
//! Off-policy temporal difference control over the grid world. The pieces
//! are kept separate so each can be exercised on its own:
//!
//! - [`QTable`]: action values for every (state, action) pair
//! - [`epsilon_greedy_policy`]: action probabilities derived from the table
//! - [`sample_action`]: draws an action from those probabilities
//! - [`run_episode`] / [`q_learning`]: the control loop
//!
//! ## Update rule
//!
//! Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
//!
//! The policy takes the table as an explicit argument on every call, so it
//! always sees the latest values.
//!
//! ## Usage Example
//!
//! ```no_run
//! use tdgrid::{
//!     gridworld::{GridWorld, RewardModel},
//!     q_learning::{QLearningConfig, q_learning},
//! };
//!
//! let mut env = GridWorld::new(4, 4)?.with_reward(Box::new(RewardModel::flat(800.0, -5.0)));
//! env.set_hazards([(1, 2), (2, 2)])?;
//!
//! let config = QLearningConfig::default().with_seed(42);
//! let q_table = q_learning(&mut env, &config)?;
//! println!("{q_table}");
//! # Ok::<(), tdgrid::Error>(())
//! ```

pub mod control;
pub mod policy;
pub mod q_table;
pub mod sampler;

pub use control::{EpisodeSummary, QLearningConfig, StepRecord, q_learning, run_episode};
pub use policy::{ActionDistribution, PROBABILITY_TOLERANCE, epsilon_greedy_policy};
pub use q_table::{ActionValues, QEntry, QTable};
pub use sampler::{build_rng, sample_action};
