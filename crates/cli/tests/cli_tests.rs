use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn nbrun() -> Command {
    Command::cargo_bin("nbrun").unwrap()
}

fn python3_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .is_ok()
}

fn write_notebook(body: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".ipynb").tempfile().unwrap();
    write!(file, "{body}").unwrap();
    file
}

const GOOD_NOTEBOOK: &str = r##"{
    "cells": [
        {"cell_type": "markdown", "source": "# smoke", "metadata": {}},
        {"cell_type": "code", "source": "print('hello from the kernel')",
         "metadata": {}, "outputs": [], "execution_count": null}
    ],
    "metadata": {"kernelspec": {"name": "python3", "display_name": "Python 3"}},
    "nbformat": 4,
    "nbformat_minor": 5
}"##;

const FAILING_NOTEBOOK: &str = r#"{
    "cells": [
        {"cell_type": "code", "source": "raise RuntimeError('training exploded')",
         "metadata": {}, "outputs": [], "execution_count": null}
    ],
    "metadata": {},
    "nbformat": 4,
    "nbformat_minor": 5
}"#;

#[test]
fn help_lists_subcommands() {
    nbrun()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("show"));
}

#[test]
fn show_summarizes_without_running() {
    let file = write_notebook(GOOD_NOTEBOOK);

    nbrun()
        .arg("show")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 (1 code)"))
        .stdout(predicate::str::contains("python3"));
}

#[test]
fn show_rejects_invalid_document() {
    let file = write_notebook("{\"cells\": 42}");

    nbrun()
        .arg("show")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid notebook document"));
}

#[test]
fn run_dry_run_prints_resolved_config() {
    let file = write_notebook(GOOD_NOTEBOOK);

    nbrun()
        .args(["run", "--dry-run", "--kernel", "python3", "--timeout", "42"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("python3"))
        .stdout(predicate::str::contains("42s"));
}

#[test]
fn run_executes_notebook_to_completion() {
    if !python3_available() {
        eprintln!("skipping: python3 not available");
        return;
    }
    let file = write_notebook(GOOD_NOTEBOOK);
    let output = tempfile::Builder::new().suffix(".ipynb").tempfile().unwrap();

    nbrun()
        .arg("run")
        .arg(file.path())
        .arg("--output")
        .arg(output.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed: 2 cells executed"));

    let executed = std::fs::read_to_string(output.path()).unwrap();
    assert!(executed.contains("hello from the kernel"));
}

#[test]
fn run_fails_with_nonzero_exit_on_cell_error() {
    if !python3_available() {
        eprintln!("skipping: python3 not available");
        return;
    }
    let file = write_notebook(FAILING_NOTEBOOK);

    nbrun()
        .arg("run")
        .arg(file.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Failed at cell 0"))
        .stdout(predicate::str::contains("RuntimeError"));
}

#[test]
fn run_with_unknown_profile_names_the_candidates() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("nbrun.toml"),
        "[profile.train]\nkernel = \"python3\"\n",
    )
    .unwrap();
    let notebook_path = dir.path().join("job.ipynb");
    std::fs::write(&notebook_path, GOOD_NOTEBOOK).unwrap();

    nbrun()
        .arg("run")
        .arg(&notebook_path)
        .args(["--profile", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("profile `missing` not found"))
        .stderr(predicate::str::contains("train"));
}

#[test]
fn run_resolves_profile_from_nbrun_toml() {
    if !python3_available() {
        eprintln!("skipping: python3 not available");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("nbrun.toml"),
        "[profile.train]\nkernel = \"python3\"\ntimeout_secs = 60\n",
    )
    .unwrap();
    let notebook_path = dir.path().join("job.ipynb");
    std::fs::write(&notebook_path, GOOD_NOTEBOOK).unwrap();

    nbrun()
        .arg("run")
        .arg(&notebook_path)
        .args(["--profile", "train"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed"));
}

#[test]
fn check_reports_every_diagnostic() {
    nbrun()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("available kernels"))
        .stdout(predicate::str::contains("working directory"))
        .stdout(predicate::str::contains("effective PATH"))
        .stdout(predicate::str::contains("installed packages"));
}
