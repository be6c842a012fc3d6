//! Ports (trait boundaries) for external dependencies.
//!
//! The training pipeline reports to observers through the [`Observer`]
//! trait; output formats and metrics live in adapters implementing it.

pub mod observer;

pub use observer::Observer;
