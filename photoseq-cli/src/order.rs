use anyhow::Result;
use photoseq_core::{order_operation, Confirmation, OutputFormatter, RunOptions};
use std::path::Path;

use crate::{CommandOutcome, OutputFormat};

pub fn handle_order(
    directory: &Path,
    manifest: &Path,
    overwrite: bool,
    run: &RunOptions,
    confirmation: &mut dyn Confirmation,
    output: OutputFormat,
) -> Result<CommandOutcome> {
    let (result, preview) = order_operation(directory, manifest, overwrite, run, confirmation)?;

    match output {
        OutputFormat::Json => {
            println!("{}", result.format_json());
        },
        OutputFormat::Summary => {
            if let Some(preview) = preview {
                println!("{}", preview);
            }
            if !run.quiet {
                print!("{}", result.format_summary());
            }
        },
    }

    Ok(CommandOutcome::from_failures(result.failures.len()))
}
