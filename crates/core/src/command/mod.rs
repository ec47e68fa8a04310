//! Direct subprocess invocation with captured output

mod runner;
mod spec;

pub use runner::{CommandResult, CommandRunner};
pub use spec::CommandSpec;
