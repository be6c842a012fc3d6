//! Error types for the tdgrid crate

use thiserror::Error;

use crate::gridworld::{Action, State};

/// Main error type for the tdgrid crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("no action values recorded for state {state}; was the Q-table initialized?")]
    UninitializedState { state: State },

    #[error("Q-table is already initialized ({states} states)")]
    AlreadyInitialized { states: usize },

    #[error("action '{action}' is not recorded for state {state}")]
    UnknownAction { state: State, action: Action },

    #[error("illegal action '{action}' from state {state}")]
    IllegalAction { state: State, action: Action },

    #[error("environment has no current state; call reset() before step()")]
    EpisodeNotStarted,

    #[error("malformed action distribution: {reason}")]
    MalformedDistribution { reason: String },

    #[error("parameter {name} = {value} is out of range ({expected})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
