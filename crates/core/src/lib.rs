//! nbrun - a notebook training-job driver
//!
//! This crate provides functionality to:
//! - Execute external processes directly (no shell) with captured output
//! - Load, validate, and persist nbformat v4 notebook documents
//! - Run every cell of a notebook sequentially under a chosen kernel,
//!   with a whole-run timeout and deterministic failure reporting
//! - Run fixed pre-flight environment diagnostics before a run

pub mod command;
pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod kernel;
pub mod notebook;
pub mod profile;

// Re-export commonly used types
pub use command::{CommandResult, CommandRunner, CommandSpec};
pub use driver::{ErrorRecord, ExecutionConfig, ExecutionReport, FinalState, NotebookDriver};
pub use error::{Error, Result};
pub use kernel::KernelSpec;
pub use notebook::Notebook;
pub use profile::{Profile, ProfileFile};
