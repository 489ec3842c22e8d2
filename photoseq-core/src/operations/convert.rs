use super::RunOptions;
use crate::confirm::{ConfirmRequest, Confirmation};
use crate::convert::{convert_batch, ConvertEvent, ConvertOptions};
use crate::error::PhotoseqError;
use crate::listing::{DirectoryListing, ExtensionSet};
use crate::output::{ConvertResult, RunStatus};
use crate::preview::{conversion_items, render_items};
use anyhow::Result;
use nu_ansi_term::Color;
use std::path::{Path, PathBuf};

/// Re-encode every convertible image of `directory` into
/// `options.output_dir`
pub fn convert_operation(
    directory: &Path,
    mut options: ConvertOptions,
    run: &RunOptions,
    confirmation: &mut dyn Confirmation,
) -> Result<(ConvertResult, Option<String>)> {
    let filter = ExtensionSet::convert()?;
    let listing = DirectoryListing::scan(directory, Some(&filter))?;
    if listing.is_empty() {
        return Err(PhotoseqError::EmptyListing(listing.root().to_path_buf()).into());
    }

    let files: Vec<PathBuf> = listing.entries().iter().map(|e| e.path.clone()).collect();
    let mut result = ConvertResult {
        source_dir: listing.root().to_path_buf(),
        output_dir: options.output_dir.clone(),
        format: options.format,
        quality: options.quality,
        status: RunStatus::NothingToDo,
        files_found: files.len(),
        converted: 0,
        skipped: 0,
        bytes_before: 0,
        bytes_after: 0,
        bytes_saved: 0,
        reduction_percent: 0.0,
        failures: Vec::new(),
    };

    let header = format!(
        "Source: {}\nDestination: {}\nQuality: {}\n{} files found:",
        listing.root().display(),
        options.output_dir.display(),
        options.quality,
        files.len()
    );
    let items = conversion_items(&files, options.format.extension());
    let body = render_items(&items, run.preview, run.preview_limit, run.use_color);
    let preview = if body.is_empty() {
        header
    } else {
        format!("{}\n{}", header, body.trim_end())
    };

    if run.dry_run {
        result.status = RunStatus::DryRun;
        return Ok((result, Some(preview)));
    }

    let question = format!(
        "Convert these {} files to {}?",
        files.len(),
        options.format.to_string().to_uppercase()
    );
    let approved = confirmation.confirm(&ConfirmRequest {
        preview: &preview,
        question: &question,
        count: files.len(),
    })?;
    if !approved {
        result.status = RunStatus::Cancelled;
        return Ok((result, None));
    }

    options.interrupt = run.interrupt.clone();
    let report = convert_batch(&files, &options, &mut |event| report_progress(run, event))?;

    result.record(report);
    Ok((result, None))
}

fn report_progress(run: &RunOptions, event: ConvertEvent<'_>) {
    if run.quiet {
        return;
    }
    match event {
        ConvertEvent::Converted {
            position,
            total,
            record,
        } => {
            eprintln!(
                "{}/{}: {} -> {}",
                position,
                total,
                display_name(&record.source),
                display_name(&record.output)
            );
            eprintln!(
                "         {} bytes -> {} bytes ({:.1}% reduction)",
                record.bytes_before,
                record.bytes_after,
                record.reduction_percent()
            );
        },
        ConvertEvent::Failed {
            position,
            total,
            failure,
        } => {
            let line = format!(
                "{}/{}: error with {}: {}",
                position,
                total,
                display_name(&failure.source),
                failure.message
            );
            if run.use_color {
                eprintln!("{}", Color::Red.paint(line));
            } else {
                eprintln!("{}", line);
            }
        },
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
