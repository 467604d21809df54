//! CLI layer: argument parsing, dispatch, terminal output.

pub mod args;
pub mod commands;
pub mod error;
pub mod output;
