//! Schelling Experiment: harness around the segregation kernel.
//!
//! This crate supplies what the engine treats as external collaborators:
//! - Initial grid population from configured fractions
//! - An experiment runner that times runs and records statistics
//! - Batch summaries persisted as JSON
//! - A command-line front end (see `main.rs`)

pub mod experiment;
pub mod generator;
pub mod results;
