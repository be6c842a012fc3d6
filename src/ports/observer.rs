//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling the control
//! loop to specific output formats or metrics.

use crate::{
    Result,
    q_learning::{EpisodeSummary, StepRecord},
};

/// Observer trait for monitoring training
///
/// Observers can be composed to collect different types of data during
/// training, e.g. progress bars, JSONL export or metrics tracking.
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_step(record)` - After each Q-table update
///    - `on_episode_end(summary)`
/// 3. `on_training_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use tdgrid::{ports::Observer, q_learning::EpisodeSummary};
///
/// struct LengthObserver {
///     lengths: Vec<usize>,
/// }
///
/// impl Observer for LengthObserver {
///     fn on_episode_end(&mut self, summary: &EpisodeSummary) -> tdgrid::Result<()> {
///         self.lengths.push(summary.steps);
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when training starts.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called when an episode starts (0-based index).
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called after every Q-table update.
    ///
    /// `record.value_after` already reflects the update.
    fn on_step(&mut self, _record: &StepRecord) -> Result<()> {
        Ok(())
    }

    /// Called when an episode reaches the terminal state or its step cap.
    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called when training completes.
    ///
    /// Use this to finalize outputs, close files, or display summaries.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
