use anyhow::Result;
use tracing::{info, info_span};

use npi_cli::cli::RunArgs;
use npi_cli::pipeline::{RunPlan, load_config, planned_files, run};
use npi_cli::summary::{methods_table, print_summary, summarize, write_summary_json};

pub fn run_methods() -> Result<()> {
    println!("{}", methods_table());
    Ok(())
}

pub fn run_comparability(args: &RunArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let plan = RunPlan::new(config, &args.overrides());

    if args.dry_run {
        let span = info_span!("dry_run");
        let _guard = span.enter();
        let files = planned_files(&plan.input)?;
        info!(files = files.len(), "dry run, nothing written");
        println!("Would import {} file(s):", files.len());
        for file in &files {
            println!("  {}", file.display());
        }
        println!("Would write: {}", plan.output_path.display());
        return Ok(());
    }

    let result = run(&plan)?;
    let summaries = summarize(&result.table)?;
    if let Some(path) = &args.summary_json {
        write_summary_json(path, &summaries)?;
    }
    print_summary(&result, &summaries);
    Ok(())
}
