//! Q-learning control loop
//!
//! One episode: reset the environment, then repeatedly derive the
//! epsilon-greedy distribution from the live Q-table, sample an action,
//! step the environment and apply the Q-learning update, until the
//! environment reports a terminal transition.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::{
    policy::{ActionDistribution, epsilon_greedy_policy},
    q_table::QTable,
    sampler::sample_action,
};
use crate::{
    Error, Result,
    gridworld::{Action, GridWorld, State},
    pipeline::TrainingPipeline,
};

/// Hyperparameters of a Q-learning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Number of episodes; the loop always runs all of them
    pub num_episodes: usize,

    /// Exploration rate ε
    pub epsilon: f64,

    /// Discount factor γ
    pub discount_factor: f64,

    /// Step size α
    pub alpha: f64,

    /// Random seed for the action sampler
    pub seed: Option<u64>,

    /// Abandon an episode after this many steps; `None` runs until terminal
    pub max_steps_per_episode: Option<usize>,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            num_episodes: 500,
            epsilon: 0.1,
            discount_factor: 0.8,
            alpha: 0.5,
            seed: None,
            max_steps_per_episode: None,
        }
    }
}

impl QLearningConfig {
    pub fn with_episodes(mut self, num_episodes: usize) -> Self {
        self.num_episodes = num_episodes;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps_per_episode = Some(max_steps);
        self
    }

    /// Check every hyperparameter is in range
    pub fn validate(&self) -> Result<()> {
        check_unit("epsilon", self.epsilon, "0 <= epsilon <= 1")?;
        check_unit(
            "discount_factor",
            self.discount_factor,
            "0 <= discount_factor <= 1",
        )?;
        check_unit("alpha", self.alpha, "0 < alpha <= 1")?;
        if self.alpha == 0.0 {
            return Err(Error::InvalidParameter {
                name: "alpha",
                value: self.alpha,
                expected: "0 < alpha <= 1",
            });
        }
        if self.max_steps_per_episode == Some(0) {
            return Err(Error::InvalidConfiguration {
                message: "max_steps_per_episode must be positive".to_string(),
            });
        }
        Ok(())
    }
}

fn check_unit(name: &'static str, value: f64, expected: &'static str) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            value,
            expected,
        })
    }
}

/// One applied update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub episode: usize,
    pub step: usize,
    pub state: State,
    pub action: Action,
    pub reward: f64,
    pub next_state: State,
    pub done: bool,
    pub td_error: f64,
    /// Q(s, a) after the update
    pub value_after: f64,
    /// Distribution the action was drawn from
    pub probabilities: ActionDistribution,
}

/// Outcome of one episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    pub total_reward: f64,
    /// `false` if the episode hit the step cap before reaching the terminal state
    pub terminated: bool,
}

/// Run one episode, updating `q_table` in place.
///
/// `on_step` sees every update right after it is applied.
pub fn run_episode<R, F>(
    env: &mut GridWorld,
    q_table: &mut QTable,
    config: &QLearningConfig,
    rng: &mut R,
    episode: usize,
    mut on_step: F,
) -> Result<EpisodeSummary>
where
    R: Rng,
    F: FnMut(&StepRecord) -> Result<()>,
{
    let mut state = env.reset();
    let mut steps = 0;
    let mut total_reward = 0.0;

    loop {
        if config.max_steps_per_episode.is_some_and(|cap| steps >= cap) {
            warn!(episode, steps, "episode truncated before reaching the terminal state");
            return Ok(EpisodeSummary {
                episode,
                steps,
                total_reward,
                terminated: false,
            });
        }

        let probabilities = epsilon_greedy_policy(q_table, &state, config.epsilon)?;
        let action = sample_action(&probabilities, rng)?;
        let transition = env.step(action)?;

        let td_error = q_table.q_learning_update(
            &state,
            action,
            transition.reward,
            &transition.next_state,
            config.alpha,
            config.discount_factor,
        )?;
        let value_after = q_table.value(&state, action)?;
        trace!(%state, %action, td_error, value_after, "q update");

        on_step(&StepRecord {
            episode,
            step: steps,
            state,
            action,
            reward: transition.reward,
            next_state: transition.next_state,
            done: transition.done,
            td_error,
            value_after,
            probabilities,
        })?;

        steps += 1;
        total_reward += transition.reward;

        if transition.done {
            return Ok(EpisodeSummary {
                episode,
                steps,
                total_reward,
                terminated: true,
            });
        }
        state = transition.next_state;
    }
}

/// Learn a Q-table for `env` with tabular Q-learning.
///
/// Builds a fresh table from the environment's state/action space and runs
/// `config.num_episodes` episodes. Runs with the same seed produce the same
/// table.
pub fn q_learning(env: &mut GridWorld, config: &QLearningConfig) -> Result<QTable> {
    let outcome = TrainingPipeline::new(config.clone()).run(env)?;
    Ok(outcome.q_table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{gridworld::RewardModel, q_learning::sampler::build_rng};

    #[test]
    fn test_default_hyperparameters() {
        let config = QLearningConfig::default();
        assert_eq!(config.num_episodes, 500);
        assert_eq!(config.epsilon, 0.1);
        assert_eq!(config.discount_factor, 0.8);
        assert_eq!(config.alpha, 0.5);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(QLearningConfig::default().with_epsilon(1.1).validate().is_err());
        assert!(QLearningConfig::default().with_alpha(0.0).validate().is_err());
        assert!(
            QLearningConfig::default()
                .with_discount_factor(-0.1)
                .validate()
                .is_err()
        );
        assert!(QLearningConfig::default().with_max_steps(0).validate().is_err());
    }

    #[test]
    fn test_episode_ends_in_terminal_state() {
        let mut env = GridWorld::new(3, 3)
            .unwrap()
            .with_reward(Box::new(RewardModel::flat(800.0, -1.0)));
        let mut table = QTable::for_environment(&env).unwrap();
        let config = QLearningConfig::default();
        let mut rng = build_rng(Some(5));

        let mut records = Vec::new();
        let summary = run_episode(&mut env, &mut table, &config, &mut rng, 0, |record| {
            records.push(record.clone());
            Ok(())
        })
        .unwrap();

        assert!(summary.terminated);
        assert_eq!(summary.steps, records.len());
        let last = records.last().unwrap();
        assert_eq!(last.action, Action::Finish);
        assert_eq!(last.next_state, State::TERMINAL);
        assert!(last.done);
        assert!(records[..records.len() - 1].iter().all(|r| !r.done));
        // every step starts where the previous one ended
        for pair in records.windows(2) {
            assert_eq!(pair[0].next_state, pair[1].state);
        }
        let total: f64 = records.iter().map(|r| r.reward).sum();
        assert_eq!(summary.total_reward, total);
    }

    #[test]
    fn test_step_cap_truncates_episode() {
        let mut env = GridWorld::new(5, 5).unwrap();
        let mut table = QTable::for_environment(&env).unwrap();
        let config = QLearningConfig::default().with_max_steps(3);
        let mut rng = build_rng(Some(9));

        let summary = run_episode(&mut env, &mut table, &config, &mut rng, 0, |_| Ok(())).unwrap();
        assert!(!summary.terminated);
        assert_eq!(summary.steps, 3);
    }

    #[test]
    fn test_first_update_matches_rule() {
        // 1x2 grid: (0,0) -> Right -> (1,0) -> Finish
        let mut env = GridWorld::new(1, 2)
            .unwrap()
            .with_reward(Box::new(RewardModel::flat(10.0, -1.0)));
        let mut table = QTable::for_environment(&env).unwrap();
        let config = QLearningConfig::default()
            .with_epsilon(0.0)
            .with_alpha(0.5)
            .with_discount_factor(0.9);
        let mut rng = build_rng(Some(0));

        run_episode(&mut env, &mut table, &config, &mut rng, 0, |_| Ok(())).unwrap();

        // Q((0,0), r) = 0.5 * (-1 + 0.9 * 0) = -0.5
        assert_eq!(table.value(&State::new(0, 0), Action::Right).unwrap(), -0.5);
        // Q((1,0), t) = 0.5 * (10 + 0.9 * 0) = 5
        assert_eq!(table.value(&State::new(1, 0), Action::Finish).unwrap(), 5.0);
        assert_eq!(
            table.value(&State::TERMINAL, Action::Finish).unwrap(),
            0.0,
            "terminal entry is never updated"
        );
    }
}
