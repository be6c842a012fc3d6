//! CLI infrastructure for the tdgrid sandbox
//!
//! This module provides the command-line interface for training Q-learning
//! agents and inspecting grid layouts.

pub mod commands;
pub mod output;
