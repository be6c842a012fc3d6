//! Experiment configuration
//!
//! An experiment is an environment, a reward model and Q-learning
//! hyperparameters. Every field has a default, so a JSON file only needs
//! to name what it changes:
//!
//! ```json
//! {
//!   "environment": { "height": 5, "width": 5, "hazards": [[1, 2], [2, 2]] },
//!   "reward": { "step_cost": { "kind": "flat", "penalty": -5.0 } },
//!   "training": { "num_episodes": 1000, "seed": 7 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    gridworld::{GridWorld, RewardModel},
    q_learning::QLearningConfig,
};

/// Grid geometry, start cell and hazards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub height: usize,
    pub width: usize,
    /// Start cell `(x, y)`
    pub start: (i32, i32),
    /// Hazard cells `(x, y)`
    pub hazards: Vec<(i32, i32)>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            height: 4,
            width: 4,
            start: (0, 0),
            hazards: Vec::new(),
        }
    }
}

/// Full experiment description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub environment: EnvironmentConfig,
    pub reward: RewardModel,
    pub training: QLearningConfig,
}

impl ExperimentConfig {
    /// Load a configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read config {}", path.display()),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Check hyperparameters and that the environment can be built
    pub fn validate(&self) -> Result<()> {
        self.training.validate()?;
        self.build_environment().map(|_| ())
    }

    /// Build the configured environment with its reward model
    pub fn build_environment(&self) -> Result<GridWorld> {
        let env_config = &self.environment;
        let mut env = GridWorld::new(env_config.height, env_config.width)?
            .with_reward(Box::new(self.reward));
        let (x, y) = env_config.start;
        env.set_start_state(x, y)?;
        env.set_hazards(env_config.hazards.iter().copied())?;
        Ok(env)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::gridworld::{State, StepCost};

    #[test]
    fn test_defaults() {
        let config = ExperimentConfig::default();
        assert_eq!(config.environment.height, 4);
        assert_eq!(config.training.num_episodes, 500);
        assert_eq!(config.reward.goal_reward, 800.0);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ExperimentConfig = serde_json::from_str(
            r#"{
                "environment": {"height": 3, "width": 5, "start": [1, 0], "hazards": [[2, 1]]},
                "reward": {"step_cost": {"kind": "flat", "penalty": -5.0}},
                "training": {"num_episodes": 10, "seed": 3}
            }"#,
        )
        .unwrap();
        assert_eq!(config.environment.width, 5);
        assert_eq!(config.reward.step_cost, StepCost::Flat { penalty: -5.0 });
        assert_eq!(config.training.epsilon, 0.1);
        assert_eq!(config.training.seed, Some(3));

        let mut env = config.build_environment().unwrap();
        assert_eq!(env.reset(), State::new(1, 0));
        assert!(env.hazards().contains(&(2, 1)));
    }

    #[test]
    fn test_load_rejects_bad_start() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"environment": {{"height": 2, "width": 2, "start": [5, 5]}}}}"#
        )
        .unwrap();
        assert!(matches!(
            ExperimentConfig::load(file.path()),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_save_then_load() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut config = ExperimentConfig::default();
        config.environment.hazards = vec![(1, 1)];
        config.training.seed = Some(11);
        config.save(file.path()).unwrap();
        assert_eq!(ExperimentConfig::load(file.path()).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            ExperimentConfig::load("/nonexistent/tdgrid.json"),
            Err(Error::Io { .. })
        ));
    }
}
