use anyhow::Result;

use nbrun_core::{diagnostics, CommandRunner};

use crate::display;

/// Run the fixed pre-flight diagnostics and print each outcome. A failing
/// diagnostic never fails the command; it is operator information only.
pub fn check_command() -> Result<()> {
    let reports = diagnostics::run_preflight(&CommandRunner::new());
    display::print_diagnostics(&reports);
    Ok(())
}
