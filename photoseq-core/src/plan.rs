use crate::entry::{numbered_name, FileEntry};
use crate::error::PhotoseqError;
use crate::listing::DirectoryListing;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    /// Rename to manifest positions
    Order,
    /// Number new files after the existing sequence
    Number,
}

impl std::fmt::Display for PlanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Order => write!(f, "order"),
            Self::Number => write!(f, "number"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedRename {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub index: u64,
}

impl PlannedRename {
    pub fn source_name(&self) -> String {
        file_name_lossy(&self.source)
    }

    pub fn destination_name(&self) -> String {
        file_name_lossy(&self.destination)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PlanWarning {
    /// A manifest entry with no matching file; its position stays unused
    MissingSource { name: String, position: u64 },
}

impl std::fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSource { name, position } => {
                write!(f, "{name} does not exist, skipped (position {position})")
            },
        }
    }
}

/// A destination already taken by a file that the plan does not move away
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationConflict {
    pub destination: PathBuf,
    pub occupant: PathBuf,
}

/// Every rename of a run, computed before anything on disk changes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamePlan {
    pub id: String,
    pub created_at: String,
    pub kind: PlanKind,
    pub directory: PathBuf,
    pub renames: Vec<PlannedRename>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<PlanWarning>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<DestinationConflict>,
    /// First index handed out by gap-fill numbering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_index: Option<u64>,
    /// Files that already carried a number and were left alone
    #[serde(default)]
    pub numbered_existing: usize,
}

impl RenamePlan {
    fn new(kind: PlanKind, directory: &Path) -> Self {
        let now = chrono::Local::now();
        Self {
            id: format!("{}-{}", kind, now.format("%Y%m%d-%H%M%S")),
            created_at: now.to_rfc3339(),
            kind,
            directory: directory.to_path_buf(),
            renames: Vec::new(),
            warnings: Vec::new(),
            conflicts: Vec::new(),
            next_index: None,
            numbered_existing: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.renames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    /// Lowest and highest index assigned by this plan
    pub fn index_range(&self) -> Option<(u64, u64)> {
        let min = self.renames.iter().map(|r| r.index).min()?;
        let max = self.renames.iter().map(|r| r.index).max()?;
        Some((min, max))
    }
}

/// Plan renames from a manifest order.
///
/// The file at 1-based manifest position `i` becomes `<i>.jpg`. Entries that
/// don't exist in `listing` are skipped with a warning and their position is
/// left unused, so the resulting numbering can have gaps.
pub fn compute_order_apply_plan(order: &[String], listing: &DirectoryListing) -> RenamePlan {
    let mut plan = RenamePlan::new(PlanKind::Order, listing.root());

    for (i, name) in order.iter().enumerate() {
        let position = i as u64 + 1;
        match listing.find(name) {
            Some(entry) => plan.renames.push(PlannedRename {
                source: entry.path.clone(),
                destination: listing.root().join(numbered_name(position)),
                index: position,
            }),
            None => plan.warnings.push(PlanWarning::MissingSource {
                name: name.clone(),
                position,
            }),
        }
    }

    plan.conflicts = detect_conflicts(&plan.renames, listing);
    plan
}

/// Plan numbers for files that don't have one yet.
///
/// Numbered files are never part of the plan. Unnumbered files, sorted by
/// absolute path, receive `max + 1, max + 2, ...` (or `1, 2, ...` when
/// nothing is numbered yet) as `<n>.jpg`.
pub fn compute_gap_fill_plan(listing: &DirectoryListing) -> Result<RenamePlan, PhotoseqError> {
    let mut plan = RenamePlan::new(PlanKind::Number, listing.root());

    let mut numbered: BTreeMap<u64, &FileEntry> = BTreeMap::new();
    let mut unnumbered: Vec<&FileEntry> = Vec::new();
    for entry in listing.entries() {
        match entry.index() {
            Some(index) => {
                if let Some(previous) = numbered.insert(index, entry) {
                    return Err(PhotoseqError::DuplicateIndex {
                        index,
                        first: previous.path.clone(),
                        second: entry.path.clone(),
                    });
                }
            },
            None => unnumbered.push(entry),
        }
    }

    let next_index = match numbered.keys().next_back() {
        Some(&max) => max
            .checked_add(1)
            .ok_or(PhotoseqError::IndexOverflow(max))?,
        None => 1,
    };
    plan.next_index = Some(next_index);
    plan.numbered_existing = numbered.len();

    unnumbered.sort_by(|a, b| a.path.cmp(&b.path));
    for (offset, entry) in unnumbered.into_iter().enumerate() {
        let index = next_index
            .checked_add(offset as u64)
            .ok_or(PhotoseqError::IndexOverflow(next_index))?;
        plan.renames.push(PlannedRename {
            source: entry.path.clone(),
            destination: listing.root().join(numbered_name(index)),
            index,
        });
    }

    plan.conflicts = detect_conflicts(&plan.renames, listing);
    Ok(plan)
}

/// Destinations whose name (ignoring ASCII case) is held by a listed file
/// that is not itself a source of the plan
fn detect_conflicts(renames: &[PlannedRename], listing: &DirectoryListing) -> Vec<DestinationConflict> {
    let sources: HashSet<&Path> = renames.iter().map(|r| r.source.as_path()).collect();

    let mut conflicts = Vec::new();
    for rename in renames {
        let destination_name = rename.destination_name();
        for occupant in listing.entries().iter().filter(|e| {
            e.file_name.eq_ignore_ascii_case(&destination_name) && !sources.contains(e.path.as_path())
        }) {
            conflicts.push(DestinationConflict {
                destination: rename.destination.clone(),
                occupant: occupant.path.clone(),
            });
        }
    }
    conflicts
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
