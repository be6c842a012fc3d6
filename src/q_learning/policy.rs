//! Epsilon-greedy policy derived from a Q-table

use serde::{Deserialize, Serialize};

use super::q_table::QTable;
use crate::{
    Error, Result,
    gridworld::{Action, State},
};

/// Tolerance on the total probability mass of a distribution
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Probability distribution over the legal actions of one state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDistribution {
    entries: Vec<(Action, f64)>,
}

impl ActionDistribution {
    /// Wrap `(action, probability)` pairs without validating them
    pub fn new(entries: Vec<(Action, f64)>) -> Self {
        Self { entries }
    }

    pub fn probability(&self, action: Action) -> Option<f64> {
        self.entries
            .iter()
            .find(|(a, _)| *a == action)
            .map(|&(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Action, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|&(_, p)| p).sum()
    }

    /// Check that the distribution is non-empty, has no negative or
    /// non-finite entries and sums to 1.
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(Error::MalformedDistribution {
                reason: "no actions".to_string(),
            });
        }
        if let Some(&(action, p)) = self
            .entries
            .iter()
            .find(|(_, p)| !p.is_finite() || *p < 0.0)
        {
            return Err(Error::MalformedDistribution {
                reason: format!("action '{action}' has probability {p}"),
            });
        }
        let total = self.total();
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(Error::MalformedDistribution {
                reason: format!("probabilities sum to {total}"),
            });
        }
        Ok(())
    }
}

/// Epsilon-greedy action probabilities for `state`.
///
/// Each of the `n` recorded actions gets `epsilon / n`; the greedy action
/// (first maximum in the table's action order) gets an extra `1 - epsilon`.
/// Reads the live table, so call it again after every update.
pub fn epsilon_greedy_policy(
    q_table: &QTable,
    state: &State,
    epsilon: f64,
) -> Result<ActionDistribution> {
    if !(0.0..=1.0).contains(&epsilon) {
        return Err(Error::InvalidParameter {
            name: "epsilon",
            value: epsilon,
            expected: "0 <= epsilon <= 1",
        });
    }

    let values = q_table.get_action_values(state)?;
    let (best_action, _) = q_table.best_action(state)?;
    let share = epsilon / values.len() as f64;

    let entries = values
        .actions()
        .map(|action| {
            let p = if action == best_action {
                share + (1.0 - epsilon)
            } else {
                share
            };
            (action, p)
        })
        .collect();

    Ok(ActionDistribution::new(entries))
}
