use anyhow::Result;
use photoseq_core::{number_operation, Confirmation, OutputFormatter, RunOptions};
use std::path::Path;

use crate::{CommandOutcome, OutputFormat};

pub fn handle_number(
    directory: &Path,
    run: &RunOptions,
    confirmation: &mut dyn Confirmation,
    output: OutputFormat,
) -> Result<CommandOutcome> {
    let (result, preview) = number_operation(directory, run, confirmation)?;

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
