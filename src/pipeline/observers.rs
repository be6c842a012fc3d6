//! Observer pattern for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! the control loop to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    ports::Observer,
    q_learning::{EpisodeSummary, StepRecord},
};

/// Complete observation of a training episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Episode number
    pub episode: usize,
    /// Whether the terminal state was reached
    pub terminated: bool,
    /// Undiscounted return
    pub total_reward: f64,
    /// Total steps in episode
    pub total_steps: usize,
    /// Steps in the episode
    pub steps: Vec<StepRecord>,
}

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    last_steps: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            last_steps: 0,
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.last_steps = summary.steps;
        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.episode as u64 + 1);
            pb.set_message(format!("last: {} steps", summary.steps));
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(format!("last: {} steps", self.last_steps));
        }
        Ok(())
    }
}

/// Metrics observer - Tracks episode lengths and returns
pub struct MetricsObserver {
    episode_steps: Vec<usize>,
    episode_returns: Vec<f64>,
    truncated: usize,
    td_error_sum: f64,
    updates: usize,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self {
            episode_steps: Vec::new(),
            episode_returns: Vec::new(),
            truncated: 0,
            td_error_sum: 0.0,
            updates: 0,
        }
    }

    pub fn episodes(&self) -> usize {
        self.episode_steps.len()
    }

    /// Length of every finished episode, in order
    pub fn episode_steps(&self) -> &[usize] {
        &self.episode_steps
    }

    /// Return of every finished episode, in order
    pub fn episode_returns(&self) -> &[f64] {
        &self.episode_returns
    }

    /// Get average episode length
    pub fn avg_episode_length(&self) -> f64 {
        if self.episode_steps.is_empty() {
            0.0
        } else {
            self.episode_steps.iter().sum::<usize>() as f64 / self.episode_steps.len() as f64
        }
    }

    pub fn avg_return(&self) -> f64 {
        if self.episode_returns.is_empty() {
            0.0
        } else {
            self.episode_returns.iter().sum::<f64>() / self.episode_returns.len() as f64
        }
    }

    /// Mean absolute TD error over all updates
    pub fn mean_abs_td_error(&self) -> f64 {
        if self.updates == 0 {
            0.0
        } else {
            self.td_error_sum / self.updates as f64
        }
    }

    /// Shortest episode seen so far
    pub fn min_episode_length(&self) -> Option<usize> {
        self.episode_steps.iter().copied().min()
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            episodes: self.episodes(),
            updates: self.updates,
            truncated: self.truncated,
            avg_episode_length: self.avg_episode_length(),
            min_episode_length: self.min_episode_length(),
            avg_return: self.avg_return(),
            mean_abs_td_error: self.mean_abs_td_error(),
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub updates: usize,
    pub truncated: usize,
    pub avg_episode_length: f64,
    pub min_episode_length: Option<usize>,
    pub avg_return: f64,
    pub mean_abs_td_error: f64,
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for MetricsObserver {
    fn on_step(&mut self, record: &StepRecord) -> Result<()> {
        self.td_error_sum += record.td_error.abs();
        self.updates += 1;
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.episode_steps.push(summary.steps);
        self.episode_returns.push(summary.total_reward);
        if !summary.terminated {
            self.truncated += 1;
        }
        Ok(())
    }
}

/// JSONL observer - Exports one JSON object per episode
pub struct JsonlObserver {
    writer: BufWriter<File>,
    current_steps: Vec<StepRecord>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self {
            writer,
            current_steps: Vec::new(),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        self.current_steps.clear();
        Ok(())
    }

    fn on_step(&mut self, record: &StepRecord) -> Result<()> {
        self.current_steps.push(record.clone());
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        let observation = Observation {
            episode: summary.episode,
            terminated: summary.terminated,
            total_reward: summary.total_reward,
            total_steps: summary.steps,
            steps: std::mem::take(&mut self.current_steps),
        };

        // Write as JSONL (one JSON object per line)
        serde_json::to_writer(&mut self.writer, &observation)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
