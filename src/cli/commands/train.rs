//! Train command - Learn a Q-table for a configured grid world

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::{
    cli::output::{print_kv, print_section, print_subsection},
    config::ExperimentConfig,
    gridworld::StepCost,
    pipeline::{
        JsonlObserver, ProgressObserver, Rollout, TrainingPipeline, TrainingResult,
        greedy_rollout,
    },
    q_learning::QEntry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StepCostKind {
    /// Same penalty for every step
    Flat,
    /// Distance to the goal times a scale
    Manhattan,
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile<'a> {
    config: &'a ExperimentConfig,
    training: &'a TrainingResult,
    greedy_path: &'a Rollout,
    q_values: Vec<QEntry>,
}

/// Parse a hazard coordinate written as `x,y`
pub(crate) fn parse_coordinate(value: &str) -> Result<(i32, i32)> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| anyhow!("Invalid coordinate '{value}' (expected 'x,y')"))?;
    let x = x
        .trim()
        .parse::<i32>()
        .with_context(|| format!("Invalid x in coordinate '{value}'"))?;
    let y = y
        .trim()
        .parse::<i32>()
        .with_context(|| format!("Invalid y in coordinate '{value}'"))?;
    Ok((x, y))
}

#[derive(Parser, Debug)]
#[command(about = "Train a Q-learning agent", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// JSON experiment configuration; flags below override it
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Grid height (rows)
    #[arg(long)]
    pub height: Option<usize>,

    /// Grid width (columns)
    #[arg(long)]
    pub width: Option<usize>,

    /// Start column
    #[arg(long)]
    pub start_x: Option<i32>,

    /// Start row
    #[arg(long)]
    pub start_y: Option<i32>,

    /// Hazard cell as `x,y` (repeatable)
    #[arg(long = "hazard")]
    pub hazards: Vec<String>,

    /// Reward for entering the terminal state
    #[arg(long)]
    pub goal_reward: Option<f64>,

    /// Reward for landing on a hazard
    #[arg(long)]
    pub hazard_penalty: Option<f64>,

    /// How ordinary steps are charged
    #[arg(long, value_enum)]
    pub step_cost: Option<StepCostKind>,

    /// Penalty per step for the flat step cost
    #[arg(long, default_value_t = -5.0)]
    pub step_penalty: f64,

    /// Multiplier of the goal distance for the manhattan step cost
    #[arg(long, default_value_t = -1.0)]
    pub distance_scale: f64,

    /// Number of training episodes
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Exploration rate
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Discount factor
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Step size
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Abandon episodes after this many steps
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Optional file for JSONL observations
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Print the learned Q-table
    #[arg(long)]
    pub show_q: bool,
}

impl TrainArgs {
    /// Load the configuration file (if any) and apply flag overrides
    pub fn resolve_config(&self) -> Result<ExperimentConfig> {
        let mut config = match &self.config {
            Some(path) => ExperimentConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ExperimentConfig::default(),
        };

        let env = &mut config.environment;
        if let Some(height) = self.height {
            env.height = height;
        }
        if let Some(width) = self.width {
            env.width = width;
        }
        if let Some(x) = self.start_x {
            env.start.0 = x;
        }
        if let Some(y) = self.start_y {
            env.start.1 = y;
        }
        if !self.hazards.is_empty() {
            env.hazards = self
                .hazards
                .iter()
                .map(|h| parse_coordinate(h))
                .collect::<Result<_>>()?;
        }

        let reward = &mut config.reward;
        if let Some(goal) = self.goal_reward {
            reward.goal_reward = goal;
        }
        if let Some(penalty) = self.hazard_penalty {
            reward.hazard_penalty = penalty;
        }
        match self.step_cost {
            Some(StepCostKind::Flat) => {
                reward.step_cost = StepCost::Flat {
                    penalty: self.step_penalty,
                }
            }
            Some(StepCostKind::Manhattan) => {
                reward.step_cost = StepCost::Manhattan {
                    scale: self.distance_scale,
                }
            }
            None => {}
        }

        let training = &mut config.training;
        if let Some(episodes) = self.episodes {
            training.num_episodes = episodes;
        }
        if let Some(epsilon) = self.epsilon {
            training.epsilon = epsilon;
        }
        if let Some(gamma) = self.gamma {
            training.discount_factor = gamma;
        }
        if let Some(alpha) = self.alpha {
            training.alpha = alpha;
        }
        if self.seed.is_some() {
            training.seed = self.seed;
        }
        if self.max_steps.is_some() {
            training.max_steps_per_episode = self.max_steps;
        }

        config.validate().context("Invalid experiment configuration")?;
        Ok(config)
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = args.resolve_config()?;
    let mut env = config.build_environment()?;

    let mut pipeline = TrainingPipeline::new(config.training.clone());
    if !args.no_progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        pipeline = pipeline.with_observer(Box::new(observer));
    }

    let outcome = pipeline.run(&mut env).context("Training failed")?;

    // Long enough to visit every cell twice before giving up
    let rollout_limit = 2 * env.height() * env.width() + 1;
    let rollout = greedy_rollout(&mut env, &outcome.q_table, rollout_limit)?;

    print_section("Training Summary");
    print_kv(
        "Grid",
        &format!("{}x{} (start {})", env.height(), env.width(), env.start_state()),
    );
    print_kv("Episodes", &outcome.result.episodes.to_string());
    print_kv("Total steps", &outcome.result.total_steps.to_string());
    print_kv("Mean steps", &format!("{:.2}", outcome.result.mean_steps));
    print_kv("Mean return", &format!("{:.2}", outcome.result.mean_return));
    print_kv(
        "Final episode",
        &format!(
            "{} steps, return {:.2}",
            outcome.result.final_episode_steps, outcome.result.final_episode_return
        ),
    );
    if outcome.result.truncated_episodes > 0 {
        print_kv("Truncated", &outcome.result.truncated_episodes.to_string());
    }

    print_subsection("Greedy path");
    println!("  {}", rollout.describe());
    if rollout.reached_terminal {
        print_kv(
            "Reached terminal",
            &format!("{} steps, return {:.2}", rollout.steps(), rollout.total_reward),
        );
    } else {
        print_kv("Reached terminal", "no (greedy policy loops)");
    }

    if args.show_q {
        print_subsection("Q-table");
        print!("{}", outcome.q_table);
    }

    if let Some(path) = &args.summary {
        let summary = TrainingSummaryFile {
            config: &config,
            training: &outcome.result,
            greedy_path: &rollout,
            q_values: outcome.q_table.snapshot(),
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        to_writer_pretty(file, &summary).context("Failed to write training summary")?;
        println!("\nSummary written to {}", path.display());
    }

    Ok(())
}
