//! High-level operations that correspond to CLI commands
//!
//! Each operation lists the directory, builds its plan, shows the preview
//! through the injected `Confirmation`, and only then touches the disk.

pub mod convert;
pub mod number;
pub mod order;
pub mod status;

pub use convert::convert_operation;
pub use number::number_operation;
pub use order::order_operation;
pub use status::status_operation;

use crate::apply::{ApplyEvent, Phase};
use crate::plan::RenamePlan;
use crate::preview::{render_plan, Preview, DEFAULT_PREVIEW_LIMIT};
use nu_ansi_term::Color;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Settings shared by every mutating operation
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub preview: Preview,
    pub preview_limit: usize,
    /// Plan and preview only
    pub dry_run: bool,
    pub use_color: bool,
    /// Suppress progress and warnings on stderr
    pub quiet: bool,
    /// Explicit journal file
    pub journal: Option<PathBuf>,
    /// Directory for per-plan journal files when no explicit file is given
    pub journal_dir: Option<PathBuf>,
    pub interrupt: Option<Arc<AtomicBool>>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            preview: Preview::List,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
            dry_run: false,
            use_color: false,
            quiet: false,
            journal: None,
            journal_dir: None,
            interrupt: None,
        }
    }
}

impl RunOptions {
    pub(crate) fn journal_path(&self, plan_id: &str) -> Option<PathBuf> {
        self.journal.clone().or_else(|| {
            self.journal_dir
                .as_ref()
                .map(|dir| dir.join(format!("{}.log", plan_id)))
        })
    }

    pub(crate) fn warn(&self, message: &str) {
        if self.quiet {
            return;
        }
        if self.use_color {
            eprintln!("{}", Color::Yellow.paint(format!("⚠ {}", message)));
        } else {
            eprintln!("⚠ {}", message);
        }
    }
}

/// Header line followed by the rendered plan
pub(crate) fn rename_preview(header: &str, plan: &RenamePlan, run: &RunOptions) -> String {
    let body = render_plan(plan, run.preview, run.preview_limit, run.use_color);
    if body.is_empty() {
        header.to_string()
    } else {
        format!("{}\n{}", header, body.trim_end())
    }
}

/// Observer printing two-phase rename progress to stderr
pub(crate) fn rename_progress(run: &RunOptions) -> impl FnMut(ApplyEvent<'_>) + '_ {
    let mut staging_announced = false;
    let mut commit_announced = false;

    move |event| {
        if run.quiet {
            return;
        }
        match event {
            ApplyEvent::Staged { .. } => {
                if !staging_announced {
                    eprintln!("Step 1/2: moving photos to temporary names...");
                    staging_announced = true;
                }
            },
            ApplyEvent::Committed {
                source,
                destination,
            } => {
                if !commit_announced {
                    eprintln!("Step 2/2: giving photos their final names...");
                    commit_announced = true;
                }
                let arrow = if run.use_color {
                    Color::Green.paint("->").to_string()
                } else {
                    "->".to_string()
                };
                eprintln!("  {} {} {}", file_name(source), arrow, file_name(destination));
            },
            ApplyEvent::Restored {
                source,
                destination,
            } => {
                eprintln!(
                    "  {} kept its name, {} is still in place",
                    file_name(source),
                    file_name(destination)
                );
            },
            ApplyEvent::Failed {
                phase,
                source,
                message,
            } => {
                let step = match phase {
                    Phase::Stage => "temporary rename",
                    Phase::Commit => "final rename",
                };
                let line = format!("  ✗ {}: {} failed: {}", file_name(source), step, message);
                if run.use_color {
                    eprintln!("{}", Color::Red.paint(line));
                } else {
                    eprintln!("{}", line);
                }
            },
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_journal_wins() {
        let run = RunOptions {
            journal: Some(PathBuf::from("apply.log")),
            journal_dir: Some(PathBuf::from("logs")),
            ..RunOptions::default()
        };
        assert_eq!(run.journal_path("order-1"), Some(PathBuf::from("apply.log")));
    }

    #[test]
    fn test_journal_dir_names_file_after_plan() {
        let run = RunOptions {
            journal_dir: Some(PathBuf::from("logs")),
            ..RunOptions::default()
        };
        assert_eq!(
            run.journal_path("order-1"),
            Some(PathBuf::from("logs").join("order-1.log"))
        );
        assert_eq!(RunOptions::default().journal_path("order-1"), None);
    }
}
