use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors abort a run before anything on disk is touched.
///
/// Per-item problems (a missing manifest entry, a rename or a conversion that
/// fails) are not represented here; they are collected in the plan or in the
/// apply/convert reports so the rest of the batch can continue.
#[derive(Debug, Error)]
pub enum PhotoseqError {
    #[error("manifest not found: {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("failed to parse manifest {}: {source}", .path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest {} contains no photo order", .0.display())]
    EmptyOrder(PathBuf),

    #[error("manifest lists '{name}' more than once (positions {first} and {second})")]
    DuplicateManifestEntry {
        name: String,
        first: usize,
        second: usize,
    },

    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("no image files found in {}", .0.display())]
    EmptyListing(PathBuf),

    #[error("none of the manifest entries exist in {}; nothing to rename", .0.display())]
    NothingToRename(PathBuf),

    #[error("index {index} is used by more than one file: {} and {}", .first.display(), .second.display())]
    DuplicateIndex {
        index: u64,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("{count} destination(s) would overwrite files outside the plan (first: {}); use --overwrite to replace them", .first.display())]
    DestinationConflict { count: usize, first: PathBuf },

    #[error("cannot number past index {0}")]
    IndexOverflow(u64),

    #[error("invalid quality {0}: expected a value between 0 and 100")]
    InvalidQuality(i64),
}

impl PhotoseqError {
    /// Returns the error as a `PhotoseqError` if `err` wraps one.
    pub fn find(err: &anyhow::Error) -> Option<&Self> {
        err.chain().find_map(|cause| cause.downcast_ref::<Self>())
    }
}
