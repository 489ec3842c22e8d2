use crate::plan::RenamePlan;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Options for applying a rename plan
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Append a timestamped line per step to this file
    pub journal: Option<PathBuf>,
    /// Set by the Ctrl-C handler; stops staging further items
    pub interrupt: Option<Arc<AtomicBool>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Stage,
    Commit,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stage => write!(f, "stage"),
            Self::Commit => write!(f, "commit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemState {
    Pending,
    Staged,
    Committed,
    /// Moved back to its source because its destination was still occupied
    Restored,
    Failed { phase: Phase, message: String },
}

/// One plan item moving through `Pending -> Staged -> Committed`
#[derive(Debug, Clone)]
pub struct StagedRename {
    pub source: PathBuf,
    pub temporary: PathBuf,
    pub destination: PathBuf,
    pub state: ItemState,
}

/// A rename that did not reach its destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameFailure {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub phase: Phase,
    pub message: String,
    /// Where the file is now, when it was left under its temporary name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stranded_at: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyReport {
    pub committed: Vec<(PathBuf, PathBuf)>,
    pub failures: Vec<RenameFailure>,
    /// Items never staged because the run was interrupted
    pub skipped: usize,
    pub interrupted: bool,
    /// Set when the journal stopped accepting writes partway through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_error: Option<String>,
}

impl ApplyReport {
    pub fn success_count(&self) -> usize {
        self.committed.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Progress notifications emitted while a plan is applied
#[derive(Debug, Clone, Copy)]
pub enum ApplyEvent<'a> {
    Staged {
        position: usize,
        source: &'a Path,
        temporary: &'a Path,
    },
    Committed {
        source: &'a Path,
        destination: &'a Path,
    },
    Restored {
        source: &'a Path,
        destination: &'a Path,
    },
    Failed {
        phase: Phase,
        source: &'a Path,
        message: &'a str,
    },
}

struct Journal {
    path: Option<PathBuf>,
    file: Option<File>,
    error: Option<String>,
}

impl Journal {
    fn open(path: Option<&Path>) -> Result<Self> {
        let file = if let Some(path) = path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create journal directory {}", parent.display())
                })?;
            }
            Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open journal {}", path.display()))?,
            )
        } else {
            None
        };
        Ok(Self {
            path: path.map(Path::to_path_buf),
            file,
            error: None,
        })
    }

    /// Append one line. The first failed write closes the journal; renames
    /// carry on without it.
    fn log(&mut self, message: &str) {
        let Some(ref mut file) = self.file else {
            return;
        };
        let written = writeln!(
            file,
            "[{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            message
        )
        .and_then(|()| file.flush());

        if let Err(e) = written {
            let path = self
                .path
                .as_deref()
                .map_or_else(String::new, |p| p.display().to_string());
            self.error = Some(format!("Journal {path} stopped recording: {e}"));
            self.file = None;
        }
    }
}

/// Apply a plan without progress reporting
pub fn apply_plan(plan: &RenamePlan, options: &ApplyOptions) -> Result<ApplyReport> {
    apply_plan_with_observer(plan, options, &mut |_| {})
}

/// Apply a plan in two phases.
///
/// Phase 1 moves every source to a temporary name that no listed file can
/// have; phase 2 moves every staged file to its destination. Because all
/// sources are out of the way before the first destination is written, swaps
/// and cycles inside the plan never overwrite a file that is still waiting to
/// move.
///
/// Failures are per item and never roll back completed renames. An
/// interrupt stops staging, and whatever was staged is committed unless its
/// destination is still the source of an item that never left. Those items
/// are moved back to their original names instead.
pub fn apply_plan_with_observer(
    plan: &RenamePlan,
    options: &ApplyOptions,
    observer: &mut dyn FnMut(ApplyEvent<'_>),
) -> Result<ApplyReport> {
    let mut journal = Journal::open(options.journal.as_deref())?;
    journal.log(&format!(
        "Applying plan {} ({} renames) in {}",
        plan.id,
        plan.len(),
        plan.directory.display()
    ));

    let mut items = stage_items(plan)?;
    let mut report = ApplyReport::default();

    // Phase 1
    for (position, item) in items.iter_mut().enumerate() {
        if is_interrupted(options) {
            report.interrupted = true;
            break;
        }

        match fs::rename(&item.source, &item.temporary) {
            Ok(()) => {
                item.state = ItemState::Staged;
                journal.log(&format!(
                    "Staged {} -> {}",
                    item.source.display(),
                    item.temporary.display()
                ));
                observer(ApplyEvent::Staged {
                    position,
                    source: &item.source,
                    temporary: &item.temporary,
                });
            },
            Err(e) => {
                let message = e.to_string();
                journal.log(&format!(
                    "Failed to stage {}: {}",
                    item.source.display(),
                    message
                ));
                observer(ApplyEvent::Failed {
                    phase: Phase::Stage,
                    source: &item.source,
                    message: &message,
                });
                item.state = ItemState::Failed {
                    phase: Phase::Stage,
                    message,
                };
            },
        }
    }

    // Staged items aimed at a file that is still in place
    for position in blocked_items(&items) {
        let item = &mut items[position];
        match fs::rename(&item.temporary, &item.source) {
            Ok(()) => {
                item.state = ItemState::Restored;
                journal.log(&format!(
                    "Restored {} ({} is still occupied)",
                    item.source.display(),
                    item.destination.display()
                ));
                observer(ApplyEvent::Restored {
                    source: &item.source,
                    destination: &item.destination,
                });
            },
            Err(e) => {
                let message = format!("could not move back to original name: {e}");
                journal.log(&format!(
                    "Failed to restore {}: {} (file left at {})",
                    item.source.display(),
                    message,
                    item.temporary.display()
                ));
                observer(ApplyEvent::Failed {
                    phase: Phase::Commit,
                    source: &item.source,
                    message: &message,
                });
                item.state = ItemState::Failed {
                    phase: Phase::Commit,
                    message,
                };
            },
        }
    }

    // Phase 2
    for item in items.iter_mut().filter(|i| i.state == ItemState::Staged) {
        match fs::rename(&item.temporary, &item.destination) {
            Ok(()) => {
                item.state = ItemState::Committed;
                journal.log(&format!(
                    "Committed {} -> {}",
                    item.source.display(),
                    item.destination.display()
                ));
                observer(ApplyEvent::Committed {
                    source: &item.source,
                    destination: &item.destination,
                });
            },
            Err(e) => {
                let message = e.to_string();
                journal.log(&format!(
                    "Failed to commit {} -> {}: {} (file left at {})",
                    item.source.display(),
                    item.destination.display(),
                    message,
                    item.temporary.display()
                ));
                observer(ApplyEvent::Failed {
                    phase: Phase::Commit,
                    source: &item.source,
                    message: &message,
                });
                item.state = ItemState::Failed {
                    phase: Phase::Commit,
                    message,
                };
            },
        }
    }

    for item in items {
        match item.state {
            ItemState::Committed => report.committed.push((item.source, item.destination)),
            ItemState::Failed { phase, message } => report.failures.push(RenameFailure {
                stranded_at: (phase == Phase::Commit).then(|| item.temporary.clone()),
                source: item.source,
                destination: item.destination,
                phase,
                message,
            }),
            ItemState::Restored if report.interrupted => report.skipped += 1,
            ItemState::Restored => report.failures.push(RenameFailure {
                message: format!(
                    "{} could not be freed, file kept its original name",
                    item.destination.display()
                ),
                source: item.source,
                destination: item.destination,
                phase: Phase::Commit,
                stranded_at: None,
            }),
            // Staged items always leave phase 2 as committed or failed
            ItemState::Pending | ItemState::Staged => report.skipped += 1,
        }
    }

    journal.log(&format!(
        "Finished plan {}: {} renamed, {} failed, {} skipped",
        plan.id,
        report.success_count(),
        report.failure_count(),
        report.skipped
    ));
    report.journal_error = journal.error;

    Ok(report)
}

/// Staged items whose destination is still occupied by a plan source that
/// never moved. Moving such an item back re-occupies its own source, which
/// can block another staged item in turn, so this runs to a fixed point.
fn blocked_items(items: &[StagedRename]) -> Vec<usize> {
    let mut occupied: Vec<&Path> = items
        .iter()
        .filter(|item| item.state != ItemState::Staged)
        .filter(|item| fs::symlink_metadata(&item.source).is_ok())
        .map(|item| item.source.as_path())
        .collect();
    let mut blocked = vec![false; items.len()];

    loop {
        let mut changed = false;
        for (position, item) in items.iter().enumerate() {
            if item.state != ItemState::Staged || blocked[position] {
                continue;
            }
            if occupied
                .iter()
                .any(|path| same_file_name(path, &item.destination))
            {
                blocked[position] = true;
                occupied.push(&item.source);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    blocked
        .iter()
        .enumerate()
        .filter_map(|(position, is_blocked)| is_blocked.then_some(position))
        .collect()
}

/// Same directory and same name, ignoring ASCII case
fn same_file_name(a: &Path, b: &Path) -> bool {
    a.parent() == b.parent()
        && match (a.file_name(), b.file_name()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
}

/// Pair every plan item with a temporary path in the plan directory.
///
/// Temporary names end in `.tmp`, which no listing ever matches, and carry a
/// salt that is bumped until none of them exists on disk.
fn stage_items(plan: &RenamePlan) -> Result<Vec<StagedRename>> {
    let base_salt = std::process::id();
    let mut salt = base_salt;
    loop {
        let temporaries: Vec<PathBuf> = (0..plan.len())
            .map(|i| plan.directory.join(staging_name(salt, i)))
            .collect();

        if !temporaries.iter().any(|p| p.exists()) {
            return Ok(plan
                .renames
                .iter()
                .zip(temporaries)
                .map(|(rename, temporary)| StagedRename {
                    source: rename.source.clone(),
                    temporary,
                    destination: rename.destination.clone(),
                    state: ItemState::Pending,
                })
                .collect());
        }

        salt = salt.wrapping_add(1);
        if salt == base_salt {
            anyhow::bail!(
                "Could not find free temporary names in {}",
                plan.directory.display()
            );
        }
    }
}

fn staging_name(salt: u32, position: usize) -> String {
    format!(".photoseq-{salt}-{position}.tmp")
}

fn is_interrupted(options: &ApplyOptions) -> bool {
    options
        .interrupt
        .as_ref()
        .is_some_and(|flag| flag.load(Ordering::SeqCst))
}
