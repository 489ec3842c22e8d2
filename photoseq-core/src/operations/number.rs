use super::{rename_preview, rename_progress, RunOptions};
use crate::apply::{apply_plan_with_observer, ApplyOptions};
use crate::confirm::{ConfirmRequest, Confirmation};
use crate::error::PhotoseqError;
use crate::listing::{DirectoryListing, ExtensionSet};
use crate::output::{NumberResult, RunStatus};
use crate::plan::compute_gap_fill_plan;
use anyhow::{Context, Result};
use std::path::Path;

/// Give every unnumbered image in `directory` the next free number
pub fn number_operation(
    directory: &Path,
    run: &RunOptions,
    confirmation: &mut dyn Confirmation,
) -> Result<(NumberResult, Option<String>)> {
    let filter = ExtensionSet::renumber()?;
    let listing = DirectoryListing::scan(directory, Some(&filter))?;
    if listing.is_empty() {
        return Err(PhotoseqError::EmptyListing(listing.root().to_path_buf()).into());
    }

    let plan = compute_gap_fill_plan(&listing)?;
    let mut result = NumberResult::new(&plan);

    // Nothing new: no prompt, no journal, no changes
    if plan.is_empty() {
        return Ok((result, None));
    }

    if let Some(first) = plan.conflicts.first() {
        return Err(PhotoseqError::DestinationConflict {
            count: plan.conflicts.len(),
            first: first.destination.clone(),
        }
        .into());
    }

    let header = format!(
        "{} photos already numbered, next number is {}\n{} new photos to number:",
        plan.numbered_existing,
        result.next_index,
        plan.len()
    );
    let preview = rename_preview(&header, &plan, run);

    if run.dry_run {
        result.status = RunStatus::DryRun;
        result.plan = Some(plan);
        return Ok((result, Some(preview)));
    }

    let question = format!("Number these {} new photos?", plan.len());
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::AssumeYes;
    use std::fs;
    use tempfile::TempDir;

    struct Counting(usize);

    impl Confirmation for Counting {
        fn confirm(&mut self, _request: &ConfirmRequest<'_>) -> Result<bool> {
            self.0 += 1;
            Ok(true)
        }
    }

    fn photos(files: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for name in files {
            fs::write(temp.path().join(name), name.as_bytes()).unwrap();
        }
        temp
    }

    fn quiet() -> RunOptions {
        RunOptions {
            quiet: true,
            ..RunOptions::default()
        }
    }

    #[test]
    fn test_number_new_photos_after_existing() {
        let temp = photos(&["1.jpg", "2.jpg", "vacation.png", "beach.gif"]);

        let (result, _) = number_operation(temp.path(), &quiet(), &mut AssumeYes).unwrap();

        assert_eq!(result.status, RunStatus::Applied);
        assert_eq!(result.numbered_existing, 2);
        assert_eq!(result.next_index, 3);
        assert_eq!(result.index_range, Some((3, 4)));
        assert_eq!(result.total_numbered(), 4);
        assert_eq!(fs::read(temp.path().join("3.jpg")).unwrap(), b"beach.gif");
        assert_eq!(fs::read(temp.path().join("4.jpg")).unwrap(), b"vacation.png");
        assert_eq!(fs::read(temp.path().join("1.jpg")).unwrap(), b"1.jpg");
    }

    #[test]
    fn test_nothing_new_does_not_prompt() {
        let temp = photos(&["1.jpg", "2.webp"]);
        let mut confirmation = Counting(0);

        let (result, _) = number_operation(temp.path(), &quiet(), &mut confirmation).unwrap();

        assert_eq!(result.status, RunStatus::NothingToDo);
        assert_eq!(confirmation.0, 0);
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let temp = photos(&["b.png", "a.png"]);
        number_operation(temp.path(), &quiet(), &mut AssumeYes).unwrap();

        let (result, _) = number_operation(temp.path(), &quiet(), &mut AssumeYes).unwrap();
        assert_eq!(result.status, RunStatus::NothingToDo);
        assert_eq!(result.numbered_existing, 2);
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let temp = photos(&["notes.txt"]);
        let err = number_operation(temp.path(), &quiet(), &mut AssumeYes).unwrap_err();
        assert!(matches!(
            PhotoseqError::find(&err),
            Some(PhotoseqError::EmptyListing(_))
        ));
    }

    #[test]
    fn test_duplicate_index_is_an_error() {
        let temp = photos(&["3.jpg", "3.png", "new.png"]);
        let err = number_operation(temp.path(), &quiet(), &mut AssumeYes).unwrap_err();
        assert!(matches!(
            PhotoseqError::find(&err),
            Some(PhotoseqError::DuplicateIndex { index: 3, .. })
        ));
        assert!(temp.path().join("new.png").exists());
    }

    #[test]
    fn test_journal_written_to_journal_dir() {
        let temp = photos(&["new.png"]);
        let logs = TempDir::new().unwrap();
        let run = RunOptions {
            journal_dir: Some(logs.path().to_path_buf()),
            ..quiet()
        };

        let (result, _) = number_operation(temp.path(), &run, &mut AssumeYes).unwrap();

        let journal = logs.path().join(format!("{}.log", result.plan_id));
        let content = fs::read_to_string(journal).unwrap();
        assert!(content.contains("Committed"));
    }
}
