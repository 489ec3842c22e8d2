use anyhow::Result;
use photoseq_core::{convert_operation, Confirmation, ConvertOptions, OutputFormatter, RunOptions};
use std::path::Path;

use crate::{CommandOutcome, OutputFormat};

pub fn handle_convert(
    directory: &Path,
    options: ConvertOptions,
    run: &RunOptions,
    confirmation: &mut dyn Confirmation,
    output: OutputFormat,
) -> Result<CommandOutcome> {
    let (result, preview) = convert_operation(directory, options, run, confirmation)?;

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
