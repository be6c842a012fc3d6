//! Training pipeline: the observed Q-learning control loop

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Result,
    gridworld::GridWorld,
    ports::Observer,
    q_learning::{EpisodeSummary, QLearningConfig, QTable, build_rng, run_episode},
};

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Episodes played
    pub episodes: usize,

    /// Q-table updates applied over all episodes
    pub total_steps: usize,

    /// Average episode length
    pub mean_steps: f64,

    /// Average undiscounted episode return
    pub mean_return: f64,

    /// Length of the last episode
    pub final_episode_steps: usize,

    /// Return of the last episode
    pub final_episode_return: f64,

    /// Episodes abandoned at the step cap
    pub truncated_episodes: usize,
}

impl TrainingResult {
    /// Aggregate per-episode summaries
    pub fn from_episodes(summaries: &[EpisodeSummary]) -> Self {
        let episodes = summaries.len();
        let total_steps: usize = summaries.iter().map(|s| s.steps).sum();
        let total_return: f64 = summaries.iter().map(|s| s.total_reward).sum();
        let (mean_steps, mean_return) = if episodes > 0 {
            (
                total_steps as f64 / episodes as f64,
                total_return / episodes as f64,
            )
        } else {
            (0.0, 0.0)
        };
        let last = summaries.last();

        Self {
            episodes,
            total_steps,
            mean_steps,
            mean_return,
            final_episode_steps: last.map_or(0, |s| s.steps),
            final_episode_return: last.map_or(0.0, |s| s.total_reward),
            truncated_episodes: summaries.iter().filter(|s| !s.terminated).count(),
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Learned table together with run statistics
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub q_table: QTable,
    pub result: TrainingResult,
}

/// Runs Q-learning on an environment and reports to observers
pub struct TrainingPipeline {
    config: QLearningConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    pub fn new(config: QLearningConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    /// Train a fresh Q-table for `env`.
    ///
    /// Always runs `num_episodes` episodes; there is no convergence check.
    pub fn run(&mut self, env: &mut GridWorld) -> Result<TrainingOutcome> {
        self.config.validate()?;

        let mut q_table = QTable::for_environment(env)?;
        let mut rng = build_rng(self.config.seed);
        let config = &self.config;
        let observers = &mut self.observers;

        info!(
            height = env.height(),
            width = env.width(),
            episodes = config.num_episodes,
            epsilon = config.epsilon,
            discount_factor = config.discount_factor,
            alpha = config.alpha,
            seed = ?config.seed,
            "starting Q-learning"
        );

        for observer in observers.iter_mut() {
            observer.on_training_start(config.num_episodes)?;
        }

        let mut summaries = Vec::with_capacity(config.num_episodes);
        for episode in 0..config.num_episodes {
            for observer in observers.iter_mut() {
                observer.on_episode_start(episode)?;
            }

            let summary = run_episode(env, &mut q_table, config, &mut rng, episode, |record| {
                for observer in observers.iter_mut() {
                    observer.on_step(record)?;
                }
                Ok(())
            })?;
            debug!(
                episode,
                steps = summary.steps,
                total_reward = summary.total_reward,
                "episode finished"
            );

            for observer in observers.iter_mut() {
                observer.on_episode_end(&summary)?;
            }
            summaries.push(summary);
        }

        for observer in observers.iter_mut() {
            observer.on_training_end()?;
        }

        let result = TrainingResult::from_episodes(&summaries);
        info!(
            episodes = result.episodes,
            total_steps = result.total_steps,
            mean_steps = result.mean_steps,
            final_episode_steps = result.final_episode_steps,
            truncated = result.truncated_episodes,
            "Q-learning finished"
        );

        Ok(TrainingOutcome { q_table, result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gridworld::RewardModel;

    #[test]
    fn test_training_pipeline() {
        let mut env = GridWorld::new(3, 3)
            .unwrap()
            .with_reward(Box::new(RewardModel::flat(800.0, -1.0)));
        let config = QLearningConfig::default().with_episodes(20).with_seed(42);

        let outcome = TrainingPipeline::new(config).run(&mut env).unwrap();

        assert_eq!(outcome.result.episodes, 20);
        assert_eq!(outcome.result.truncated_episodes, 0);
        // shortest path on 3x3: 4 moves + finish
        assert!(outcome.result.final_episode_steps >= 5);
        assert_eq!(outcome.q_table.len(), 10);
    }

    #[test]
    fn test_invalid_config_fails_before_training() {
        let mut env = GridWorld::new(2, 2).unwrap();
        let config = QLearningConfig::default().with_epsilon(2.0);
        assert!(TrainingPipeline::new(config).run(&mut env).is_err());
        assert!(env.current_state().is_none());
    }

    #[test]
    fn test_result_from_episodes() {
        let summaries = [
            EpisodeSummary {
                episode: 0,
                steps: 10,
                total_reward: 700.0,
                terminated: true,
            },
            EpisodeSummary {
                episode: 1,
                steps: 4,
                total_reward: -20.0,
                terminated: false,
            },
        ];
        let result = TrainingResult::from_episodes(&summaries);
        assert_eq!(result.total_steps, 14);
        assert_eq!(result.mean_steps, 7.0);
        assert_eq!(result.mean_return, 340.0);
        assert_eq!(result.final_episode_steps, 4);
        assert_eq!(result.truncated_episodes, 1);

        let empty = TrainingResult::from_episodes(&[]);
        assert_eq!(empty.episodes, 0);
        assert_eq!(empty.mean_steps, 0.0);
    }
}
