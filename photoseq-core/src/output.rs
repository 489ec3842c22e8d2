use crate::apply::{ApplyReport, RenameFailure};
use crate::convert::{megabytes, ConversionFailure, ConversionReport, TargetFormat};
use crate::entry::FileEntry;
use crate::plan::{PlanWarning, RenamePlan};
use crate::status::{GalleryStatus, SequenceStatus};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Write;
use std::path::PathBuf;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Json,
}

/// How a mutating command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Applied,
    DryRun,
    Cancelled,
    NothingToDo,
    Interrupted,
}

impl RunStatus {
    pub fn from_interrupted(interrupted: bool) -> Self {
        if interrupted {
            Self::Interrupted
        } else {
            Self::Applied
        }
    }
}

/// Result of an `order` run
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResult {
    pub plan_id: String,
    pub directory: PathBuf,
    pub manifest: PathBuf,
    pub manifest_timestamp: String,
    pub status: RunStatus,
    pub planned: usize,
    pub renamed: usize,
    pub skipped: usize,
    pub warnings: Vec<PlanWarning>,
    pub failures: Vec<RenameFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<RenamePlan>,
}

/// Result of a `number` run
#[derive(Debug, Serialize, Deserialize)]
pub struct NumberResult {
    pub plan_id: String,
    pub directory: PathBuf,
    pub status: RunStatus,
    pub numbered_existing: usize,
    pub next_index: u64,
    pub planned: usize,
    pub renamed: usize,
    pub skipped: usize,
    /// First and last index handed out
    pub index_range: Option<(u64, u64)>,
    pub failures: Vec<RenameFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<RenamePlan>,
}

impl NumberResult {
    /// Numbered photos in the directory after this run
    pub fn total_numbered(&self) -> usize {
        self.numbered_existing + self.renamed
    }
}

/// Result of a `convert` run
#[derive(Debug, Serialize, Deserialize)]
pub struct ConvertResult {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub format: TargetFormat,
    pub quality: u8,
    pub status: RunStatus,
    pub files_found: usize,
    pub converted: usize,
    pub skipped: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
    pub bytes_saved: i64,
    pub reduction_percent: f64,
    pub failures: Vec<ConversionFailure>,
}

/// Result of a `status` run
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResult {
    #[serde(flatten)]
    pub sequence: SequenceStatus,
    /// Present when the converted output directory exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery: Option<GalleryStatus>,
}

/// Result of a version command
#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResult {
    pub name: String,
    pub version: String,
}

impl OrderResult {
    pub fn new(plan: &RenamePlan, manifest: PathBuf, manifest_timestamp: &str) -> Self {
        Self {
            plan_id: plan.id.clone(),
            directory: plan.directory.clone(),
            manifest,
            manifest_timestamp: manifest_timestamp.to_string(),
            status: RunStatus::NothingToDo,
            planned: plan.len(),
            renamed: 0,
            skipped: 0,
            warnings: plan.warnings.clone(),
            failures: Vec::new(),
            plan: None,
        }
    }

    pub fn record(&mut self, report: ApplyReport) {
        self.status = RunStatus::from_interrupted(report.interrupted);
        self.renamed = report.success_count();
        self.skipped = report.skipped;
        self.failures = report.failures;
    }
}

impl NumberResult {
    pub fn new(plan: &RenamePlan) -> Self {
        Self {
            plan_id: plan.id.clone(),
            directory: plan.directory.clone(),
            status: RunStatus::NothingToDo,
            numbered_existing: plan.numbered_existing,
            next_index: plan.next_index.unwrap_or(1),
            planned: plan.len(),
            renamed: 0,
            skipped: 0,
            index_range: plan.index_range(),
            failures: Vec::new(),
            plan: None,
        }
    }

    /// Record an applied plan. The range of numbers used shrinks to the
    /// renames that actually landed.
    pub fn record(&mut self, report: ApplyReport) {
        let committed: Vec<u64> = report
            .committed
            .iter()
            .filter_map(|(_, destination)| FileEntry::from_path(destination))
            .filter_map(|entry| entry.index())
            .collect();
        self.index_range = committed
            .iter()
            .min()
            .zip(committed.iter().max())
            .map(|(first, last)| (*first, *last));

        self.status = RunStatus::from_interrupted(report.interrupted);
        self.renamed = report.success_count();
        self.skipped = report.skipped;
        self.failures = report.failures;
    }
}

impl ConvertResult {
    pub fn record(&mut self, report: ConversionReport) {
        self.status = RunStatus::from_interrupted(report.interrupted);
        self.converted = report.success_count();
        self.skipped = report.skipped;
        self.bytes_before = report.total_before();
        self.bytes_after = report.total_after();
        self.bytes_saved = report.bytes_saved();
        self.reduction_percent = report.reduction_percent();
        self.failures = report.failures;
    }
}

/// Trait for formatting output in different formats
pub trait OutputFormatter {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => self.format_json(),
            OutputFormat::Summary => self.format_summary(),
        }
    }

    fn format_json(&self) -> String;
    fn format_summary(&self) -> String;
}

fn write_rename_failures(output: &mut String, failures: &[RenameFailure]) {
    if failures.is_empty() {
        return;
    }
    writeln!(output, "✗ {} rename(s) failed:", failures.len()).unwrap();
    for failure in failures {
        write!(
            output,
            "  {} -> {} ({} failed: {})",
            failure.source.display(),
            failure.destination.display(),
            failure.phase,
            failure.message
        )
        .unwrap();
        if let Some(stranded) = &failure.stranded_at {
            write!(output, ", file left at {}", stranded.display()).unwrap();
        }
        output.push('\n');
    }
}

impl OutputFormatter for OrderResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.failures.is_empty(),
            "operation": "order",
            "plan_id": self.plan_id,
            "status": self.status,
            "directory": self.directory,
            "manifest": self.manifest,
            "manifest_timestamp": self.manifest_timestamp,
            "summary": {
                "planned": self.planned,
                "renamed": self.renamed,
                "failed": self.failures.len(),
                "skipped": self.skipped,
                "missing": self.warnings.len(),
            },
            "warnings": self.warnings,
            "failures": self.failures,
            "plan": self.plan,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();

        match self.status {
            RunStatus::DryRun => {
                writeln!(
                    output,
                    "Dry run: {} photos would be renamed (plan {})",
                    self.planned, self.plan_id
                )
                .unwrap();
            },
            RunStatus::Cancelled => {
                writeln!(output, "Cancelled - no files were renamed").unwrap();
            },
            RunStatus::NothingToDo => {
                writeln!(output, "Nothing to rename").unwrap();
            },
            RunStatus::Applied | RunStatus::Interrupted => {
                writeln!(
                    output,
                    "✓ Renamed {} of {} photos in {}",
                    self.renamed,
                    self.planned,
                    self.directory.display()
                )
                .unwrap();
            },
        }

        if !self.warnings.is_empty() {
            writeln!(
                output,
                "⚠ {} manifest entries not found",
                self.warnings.len()
            )
            .unwrap();
        }

        write_rename_failures(&mut output, &self.failures);

        if self.status == RunStatus::Interrupted {
            writeln!(
                output,
                "Interrupted: {} photos were not renamed",
                self.skipped
            )
            .unwrap();
        }

        output
    }
}

impl OutputFormatter for NumberResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.failures.is_empty(),
            "operation": "number",
            "plan_id": self.plan_id,
            "status": self.status,
            "directory": self.directory,
            "summary": {
                "numbered_existing": self.numbered_existing,
                "next_index": self.next_index,
                "planned": self.planned,
                "renamed": self.renamed,
                "failed": self.failures.len(),
                "skipped": self.skipped,
                "total_numbered": self.total_numbered(),
            },
            "index_range": self.index_range.map(|(first, last)| json!({
                "first": first,
                "last": last,
            })),
            "failures": self.failures,
            "plan": self.plan,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();

        match self.status {
            RunStatus::NothingToDo => {
                writeln!(output, "No new photos to number").unwrap();
                writeln!(
                    output,
                    "{} photos already numbered",
                    self.numbered_existing
                )
                .unwrap();
                return output;
            },
            RunStatus::DryRun => {
                writeln!(
                    output,
                    "Dry run: {} new photos would be numbered (plan {})",
                    self.planned, self.plan_id
                )
                .unwrap();
            },
            RunStatus::Cancelled => {
                writeln!(output, "Cancelled - no files were renamed").unwrap();
            },
            RunStatus::Applied | RunStatus::Interrupted => {
                writeln!(
                    output,
                    "✓ Numbered {} of {} new photos",
                    self.renamed, self.planned
                )
                .unwrap();
            },
        }

        if let Some((first, last)) = self.index_range {
            writeln!(output, "Numbers used: {} to {}", first, last).unwrap();
        }

        write_rename_failures(&mut output, &self.failures);

        if self.status == RunStatus::Interrupted {
            writeln!(
                output,
                "Interrupted: {} photos were not renamed",
                self.skipped
            )
            .unwrap();
        }

        if matches!(self.status, RunStatus::Applied | RunStatus::Interrupted) {
            writeln!(
                output,
                "Total numbered photos: {}",
                self.total_numbered()
            )
            .unwrap();
        }

        output
    }
}

impl OutputFormatter for ConvertResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.failures.is_empty(),
            "operation": "convert",
            "status": self.status,
            "source_dir": self.source_dir,
            "output_dir": self.output_dir,
            "format": self.format,
            "quality": self.quality,
            "summary": {
                "files_found": self.files_found,
                "converted": self.converted,
                "failed": self.failures.len(),
                "skipped": self.skipped,
                "bytes_before": self.bytes_before,
                "bytes_after": self.bytes_after,
                "bytes_saved": self.bytes_saved,
                "reduction_percent": self.reduction_percent,
            },
            "failures": self.failures,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();

        match self.status {
            RunStatus::DryRun => {
                writeln!(
                    output,
                    "Dry run: {} files would be converted to {} (quality {})",
                    self.files_found, self.format, self.quality
                )
                .unwrap();
                return output;
            },
            RunStatus::Cancelled => {
                writeln!(output, "Cancelled - no files were converted").unwrap();
                return output;
            },
            RunStatus::NothingToDo => {
                writeln!(output, "No files to convert").unwrap();
                return output;
            },
            RunStatus::Applied | RunStatus::Interrupted => {},
        }

        writeln!(output, "✓ {} files converted", self.converted).unwrap();
        if !self.failures.is_empty() {
            writeln!(output, "✗ {} error(s):", self.failures.len()).unwrap();
            for failure in &self.failures {
                writeln!(
                    output,
                    "  {}: {}",
                    failure.source.display(),
                    failure.message
                )
                .unwrap();
            }
        }
        if self.status == RunStatus::Interrupted {
            writeln!(
                output,
                "Interrupted: {} files were not converted",
                self.skipped
            )
            .unwrap();
        }

        writeln!(
            output,
            "Total size before: {} bytes ({:.2} MB)",
            self.bytes_before,
            megabytes(self.bytes_before)
        )
        .unwrap();
        writeln!(
            output,
            "Total size after: {} bytes ({:.2} MB)",
            self.bytes_after,
            megabytes(self.bytes_after)
        )
        .unwrap();

        if self.bytes_before > 0 {
            writeln!(
                output,
                "Space saved: {} bytes ({:.2} MB)",
                self.bytes_saved,
                signed_megabytes(self.bytes_saved)
            )
            .unwrap();
            writeln!(
                output,
                "Overall reduction: {:.1}%",
                self.reduction_percent
            )
            .unwrap();
        }

        writeln!(output, "Output saved in: {}", self.output_dir.display()).unwrap();

        output
    }
}

fn signed_megabytes(bytes: i64) -> f64 {
    let magnitude = megabytes(bytes.unsigned_abs());
    if bytes < 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Gap ranges listed in the status summary before eliding the rest
const MISSING_RANGES_SHOWN: usize = 20;

impl OutputFormatter for StatusResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": true,
            "operation": "status",
            "status": self.sequence,
            "gallery": self.gallery,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let status = &self.sequence;
        let mut output = String::new();

        writeln!(output, "Directory: {}", status.directory.display()).unwrap();
        writeln!(output, "Numbered photos: {}", status.numbered).unwrap();
        writeln!(output, "Unnumbered photos: {}", status.unnumbered).unwrap();
        match status.max_index {
            Some(max) => writeln!(output, "Highest number: {}", max).unwrap(),
            None => writeln!(output, "Highest number: none").unwrap(),
        }
        writeln!(output, "Next number: {}", status.next_index).unwrap();

        if !status.missing.is_empty() {
            let missing: Vec<String> = status
                .missing
                .iter()
                .take(MISSING_RANGES_SHOWN)
                .map(ToString::to_string)
                .collect();
            let more = if status.missing.len() > MISSING_RANGES_SHOWN {
                ", ..."
            } else {
                ""
            };
            writeln!(
                output,
                "Missing numbers: {}{} ({} in total)",
                missing.join(", "),
                more,
                status.missing_count
            )
            .unwrap();
        }

        for duplicate in &status.duplicates {
            writeln!(
                output,
                "⚠ Number {} is used by: {}",
                duplicate.index,
                duplicate.files.join(", ")
            )
            .unwrap();
        }

        match self.gallery {
            Some(ref gallery) => writeln!(
                output,
                "Visible in gallery: {} of {} published in {}",
                gallery.visible,
                gallery.published,
                gallery.directory.display()
            )
            .unwrap(),
            None => writeln!(
                output,
                "Visible in gallery once converted: {} of {}",
                status.gallery_visible, status.numbered
            )
            .unwrap(),
        }

        if status.unnumbered > 0 {
            writeln!(
                output,
                "Run `photoseq number` to number {} new photos",
                status.unnumbered
            )
            .unwrap();
        }

        output
    }
}

impl OutputFormatter for VersionResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "name": self.name,
            "version": self.version,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        format!("{} {}", self.name, self.version)
    }
}
