//! Output module for operator-facing summaries
//!
//! This module handles:
//! - Loading collection statistics from storage
//! - Rendering them for the `--stats` command

pub mod stats;

pub use stats::{load_statistics, print_statistics, render_statistics, CollectionStatistics};
