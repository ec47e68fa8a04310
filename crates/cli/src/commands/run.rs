use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::debug;

use nbrun_core::{ExecutionConfig, KernelSpec, NotebookDriver, ProfileFile};

use crate::cli::RunArgs;
use crate::display;

pub fn run_command(args: RunArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    debug!(
        "resolved config: kernel={} workdir={} timeout={}s",
        config.kernel.name(),
        config.working_dir.display(),
        config.timeout.as_secs()
    );

    if args.dry_run {
        println!("notebook:  {}", args.notebook);
        println!(
            "kernel:    {} ({})",
            config.kernel.name(),
            config.kernel.interpreter()
        );
        println!("workdir:   {}", config.working_dir.display());
        println!("timeout:   {}s", config.timeout.as_secs());
        return Ok(());
    }

    let mut driver = NotebookDriver::new();
    if args.preflight {
        driver = driver.with_preflight();
    }

    let report = driver
        .execute(&args.notebook, &config)
        .with_context(|| format!("failed to execute {}", args.notebook))?;

    if let Some(output) = &args.output {
        report
            .notebook
            .save_to_path(output)
            .with_context(|| format!("failed to write executed notebook to {output}"))?;
        println!("Wrote executed notebook to {output}");
    }

    display::print_report(&report);

    if !report.completed() {
        std::process::exit(1);
    }
    Ok(())
}

fn resolve_config(args: &RunArgs) -> Result<ExecutionConfig> {
    let Some(profile_name) = &args.profile else {
        return Ok(ExecutionConfig::new(
            KernelSpec::named(&args.kernel),
            &args.workdir,
            Duration::from_secs(args.timeout),
        ));
    };

    let notebook_dir = Path::new(&args.notebook)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let config_path = ProfileFile::find_config_file(notebook_dir)
        .with_context(|| format!("no nbrun.toml found above {}", notebook_dir.display()))?;
    let profiles = ProfileFile::load_from_file(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    let Some(profile) = profiles.get(profile_name) else {
        let known: Vec<&str> = profiles.profile.keys().map(String::as_str).collect();
        bail!(
            "profile `{profile_name}` not found in {} (known: {})",
            config_path.display(),
            known.join(", ")
        );
    };

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    Ok(profile.to_execution_config(base_dir))
}
