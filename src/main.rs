use anyhow::Context;
use clap::Parser;
use comic_tool::{
    Approval, Cli, Commands, ConsoleReporter, PackArgs, ProcessMode, Renumberer, Reporter,
    TreeProcessor,
};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logger(&cli.log_file, cli.verbose)?;

    match cli.command {
        Commands::Split(args) => process_pack(&args, ProcessMode::Split),
        Commands::Compress(args) => process_pack(&args, ProcessMode::Copy),
        Commands::Renum { src_dir, yes } => process_renum(&src_dir, yes),
    }
}

/// Console output comes from the reporter; log records go to the file.
fn init_logger(log_file: &Path, verbose: bool) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Cannot open log file {}", log_file.display()))?;

    env_logger::Builder::new()
        .filter_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();

    Ok(())
}

fn process_pack(args: &PackArgs, mode: ProcessMode) -> anyhow::Result<()> {
    let processor = TreeProcessor::new(args.to_config(mode));
    let reporter = ConsoleReporter::new();

    let summary = processor
        .process(&args.src_dir, &args.dest_dir, &reporter)
        .with_context(|| format!("Processing {} failed", args.src_dir.display()))?;
    reporter.finish();

    for failure in &summary.errors {
        reporter.error(&format!(
            "{} was not processed: {}",
            failure.source.display(),
            failure.reason
        ));
    }
    reporter.info(&format!(
        "Total {} comic(s) processed.",
        summary.units_processed
    ));

    Ok(())
}

fn process_renum(src_dir: &Path, yes: bool) -> anyhow::Result<()> {
    let renumberer = Renumberer::new();
    let reporter = ConsoleReporter::new();

    let plan = renumberer.plan(src_dir, &reporter)?;
    reporter.finish();

    let approval = if plan.is_empty() {
        Approval::Declined
    } else {
        reporter.info(&format!(
            "Total {} files need to be renumbered. Check the log file for details.",
            plan.len()
        ));
        if yes {
            Approval::Approved
        } else {
            prompt_approval()?
        }
    };

    let renamed = renumberer.apply(&plan, approval, &reporter)?;
    reporter.info(&format!("Total {} files renumbered.", renamed));

    Ok(())
}

fn prompt_approval() -> anyhow::Result<Approval> {
    print!("Do you want to rename these files? (y/n): ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(Approval::from_answer(&answer))
}
