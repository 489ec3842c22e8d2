use anyhow::{Context, Result};
use photoseq_core::{status_operation, OutputFormatter};
use std::path::Path;

use crate::{CommandOutcome, OutputFormat};

pub fn handle_status(
    directory: &Path,
    gallery_dir: &Path,
    output: OutputFormat,
) -> Result<CommandOutcome> {
    let result =
        status_operation(directory, Some(gallery_dir)).context("Failed to get status")?;

    match output {
        OutputFormat::Json => println!("{}", result.format_json()),
        OutputFormat::Summary => print!("{}", result.format_summary()),
    }

    Ok(CommandOutcome::Completed)
}
