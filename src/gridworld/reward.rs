//! Pluggable reward strategies
//!
//! Rewards are a pure function of the state an action lands in, plus the
//! hazard coordinates the environment was configured with. The environment
//! holds a [`RewardFunction`] trait object, so any strategy can be plugged in;
//! [`RewardModel`] covers the configurations used in practice:
//!
//! - a fixed reward for entering the terminal sentinel,
//! - a fixed penalty for landing on a hazard,
//! - a flat or distance-shaped cost for every other step.

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use super::state::State;

/// Everything a reward strategy may inspect about a transition
#[derive(Debug, Clone, Copy)]
pub struct RewardContext<'a> {
    /// State the action was taken from
    pub previous: State,
    /// State the action landed in
    pub next: State,
    /// Bottom-right goal cell of the grid
    pub goal: State,
    /// Hazard coordinates `(x, y)`
    pub hazards: &'a HashSet<(i32, i32)>,
}

impl RewardContext<'_> {
    /// Manhattan distance from the resulting cell to the goal cell
    pub fn distance_to_goal(&self) -> i32 {
        (self.goal.x() - self.next.x()).abs() + (self.goal.y() - self.next.y()).abs()
    }

    pub fn landed_on_hazard(&self) -> bool {
        !self.next.is_terminal() && self.hazards.contains(&self.next.coords())
    }
}

/// Reward strategy held by the environment
pub trait RewardFunction: fmt::Debug + Send + Sync {
    fn reward(&self, ctx: &RewardContext<'_>) -> f64;
}

/// Cost charged for a step that neither finishes nor hits a hazard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepCost {
    /// Same reward for every step (e.g. -5)
    Flat { penalty: f64 },
    /// Distance from the resulting cell to the goal, multiplied by `scale` (e.g. -1)
    Manhattan { scale: f64 },
}

impl Default for StepCost {
    fn default() -> Self {
        StepCost::Manhattan { scale: -1.0 }
    }
}

/// Configurable reward model: goal reward, hazard penalty and step cost
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardModel {
    pub goal_reward: f64,
    pub hazard_penalty: f64,
    pub step_cost: StepCost,
}

impl RewardModel {
    /// Flat per-step penalty
    pub fn flat(goal_reward: f64, penalty: f64) -> Self {
        Self {
            goal_reward,
            step_cost: StepCost::Flat { penalty },
            ..Self::default()
        }
    }

    /// Distance-shaped step cost
    pub fn manhattan(goal_reward: f64, scale: f64) -> Self {
        Self {
            goal_reward,
            step_cost: StepCost::Manhattan { scale },
            ..Self::default()
        }
    }

    pub fn with_hazard_penalty(mut self, penalty: f64) -> Self {
        self.hazard_penalty = penalty;
        self
    }
}

impl Default for RewardModel {
    fn default() -> Self {
        Self {
            goal_reward: 800.0,
            hazard_penalty: -1000.0,
            step_cost: StepCost::default(),
        }
    }
}

impl RewardFunction for RewardModel {
    fn reward(&self, ctx: &RewardContext<'_>) -> f64 {
        if ctx.next.is_terminal() {
            return self.goal_reward;
        }
        if ctx.landed_on_hazard() {
            return self.hazard_penalty;
        }
        match self.step_cost {
            StepCost::Flat { penalty } => penalty,
            StepCost::Manhattan { scale } => f64::from(ctx.distance_to_goal()) * scale,
        }
    }
}
