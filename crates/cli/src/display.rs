//! Terminal formatting for run reports and diagnostics

use nbrun_core::diagnostics::DiagnosticReport;
use nbrun_core::{ErrorRecord, ExecutionReport, FinalState};

pub fn print_report(report: &ExecutionReport) {
    match (&report.final_state, &report.error) {
        (FinalState::Completed, _) => {
            println!("Completed: {} cells executed", report.executed_cell_count);
        }
        (
            FinalState::Failed,
            Some(ErrorRecord::CellExecution {
                cell_index,
                ename,
                evalue,
                traceback,
            }),
        ) => {
            println!(
                "Failed at cell {cell_index}: {ename}: {evalue} ({} cells executed)",
                report.executed_cell_count
            );
            for line in traceback {
                println!("    {line}");
            }
        }
        (FinalState::Failed, Some(ErrorRecord::Timeout { timeout_secs })) => {
            println!(
                "Failed: run exceeded timeout of {timeout_secs}s ({} cells executed)",
                report.executed_cell_count
            );
        }
        (FinalState::Failed, None) => {
            println!("Failed ({} cells executed)", report.executed_cell_count);
        }
    }
}

pub fn print_diagnostics(reports: &[DiagnosticReport]) {
    for report in reports {
        println!("== {} ({})", report.label, report.spec);
        match &report.outcome {
            Ok(result) => {
                println!("   exit {}", result.exit_code);
                let stdout = result.stdout_lossy();
                for line in stdout.lines() {
                    println!("   {line}");
                }
                let stderr = result.stderr_lossy();
                for line in stderr.lines() {
                    println!("   ! {line}");
                }
            }
            Err(e) => println!("   failed: {e}"),
        }
    }
}
