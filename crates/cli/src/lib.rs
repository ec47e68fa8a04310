//! nbrun command-line interface

pub mod cli;
pub mod commands;
pub mod display;

pub use cli::Cli;
