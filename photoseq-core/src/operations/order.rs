use super::{rename_preview, rename_progress, RunOptions};
use crate::apply::{apply_plan_with_observer, ApplyOptions};
use crate::confirm::{ConfirmRequest, Confirmation};
use crate::error::PhotoseqError;
use crate::listing::DirectoryListing;
use crate::manifest::OrderManifest;
use crate::output::{OrderResult, RunStatus};
use crate::plan::compute_order_apply_plan;
use anyhow::{Context, Result};
use std::path::Path;

/// Rename the files of `directory` to the positions given by the manifest.
///
/// Returns the result plus the rendered preview for dry runs, which the CLI
/// prints itself.
pub fn order_operation(
    directory: &Path,
    manifest_path: &Path,
    overwrite: bool,
    run: &RunOptions,
    confirmation: &mut dyn Confirmation,
) -> Result<(OrderResult, Option<String>)> {
    let manifest = OrderManifest::load(manifest_path)?;
    // Any regular file can be named in a manifest
    let listing = DirectoryListing::scan(directory, None)?;

    let plan = compute_order_apply_plan(&manifest.order, &listing);
    let mut result = OrderResult::new(
        &plan,
        manifest_path.to_path_buf(),
        manifest.timestamp_or_unknown(),
    );

    for warning in &plan.warnings {
        run.warn(&warning.to_string());
    }

    if plan.is_empty() {
        return Err(PhotoseqError::NothingToRename(listing.root().to_path_buf()).into());
    }

    if let Some(first) = plan.conflicts.first() {
        if !overwrite {
            return Err(PhotoseqError::DestinationConflict {
                count: plan.conflicts.len(),
                first: first.destination.clone(),
            }
            .into());
        }
        for conflict in &plan.conflicts {
            run.warn(&format!(
                "{} will be replaced",
                conflict.occupant.display()
            ));
        }
    }

    let header = format!(
        "Manifest saved: {}\n{} photos will be renamed in {}:",
        manifest.timestamp_or_unknown(),
        plan.len(),
        plan.directory.display()
    );
    let preview = rename_preview(&header, &plan, run);

    if run.dry_run {
        result.status = RunStatus::DryRun;
        result.plan = Some(plan);
        return Ok((result, Some(preview)));
    }

    let question = format!("Rename these {} photos?", plan.len());
    let approved = confirmation.confirm(&ConfirmRequest {
        preview: &preview,
        question: &question,
        count: plan.len(),
    })?;
    if !approved {
        result.status = RunStatus::Cancelled;
        return Ok((result, None));
    }

    let options = ApplyOptions {
        journal: run.journal_path(&plan.id),
        interrupt: run.interrupt.clone(),
    };
    let mut progress = rename_progress(run);
    let report = apply_plan_with_observer(&plan, &options, &mut progress)
        .with_context(|| format!("Failed to apply plan {}", plan.id))?;
    if let Some(ref error) = report.journal_error {
        run.warn(error);
    }

    result.record(report);
    Ok((result, None))
}
