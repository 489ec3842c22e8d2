use crate::entry::FileEntry;
use crate::listing::DirectoryListing;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Consecutive missing indices after which the gallery stops looking
pub const GALLERY_MISS_LIMIT: u64 = 5;

/// Inclusive run of unused indices below the highest one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexGap {
    pub first: u64,
    pub last: u64,
}

impl IndexGap {
    pub fn count(self) -> u64 {
        self.last - self.first + 1
    }
}

impl std::fmt::Display for IndexGap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.last)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateIndex {
    pub index: u64,
    pub files: Vec<String>,
}

/// Read-only summary of how a directory is numbered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceStatus {
    pub directory: PathBuf,
    pub numbered: usize,
    pub unnumbered: usize,
    pub max_index: Option<u64>,
    pub next_index: u64,
    /// Runs of indices in `1..=max_index` with no file
    pub missing: Vec<IndexGap>,
    pub missing_count: u64,
    pub duplicates: Vec<DuplicateIndex>,
    /// Numbered files a gallery probing `1, 2, 3, ...` would display before
    /// giving up after `GALLERY_MISS_LIMIT` misses in a row, assuming every
    /// one of them has been converted. See [`GalleryStatus`] for what is
    /// actually published.
    pub gallery_visible: usize,
    pub unnumbered_files: Vec<String>,
}

/// The converted `<n>.webp` files the gallery actually fetches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryStatus {
    pub directory: PathBuf,
    pub published: usize,
    pub visible: usize,
}

impl SequenceStatus {
    /// Whether every numbered file is reachable and nothing needs numbering
    pub fn is_clean(&self) -> bool {
        self.unnumbered == 0 && self.duplicates.is_empty() && self.missing.is_empty()
    }
}

pub fn sequence_status(listing: &DirectoryListing) -> SequenceStatus {
    let (numbered, unnumbered) = listing.partition();

    let mut by_index: BTreeMap<u64, Vec<String>> = BTreeMap::new();
    for entry in &numbered {
        if let Some(index) = entry.index() {
            by_index
                .entry(index)
                .or_default()
                .push(entry.file_name.clone());
        }
    }

    let max_index = by_index.keys().next_back().copied();
    let next_index = max_index.map_or(1, |max| max.saturating_add(1));

    let present: BTreeSet<u64> = by_index.keys().copied().collect();
    let missing = index_gaps(&present);
    let missing_count = missing.iter().map(|gap| gap.count()).sum();

    let duplicates = by_index
        .iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|(index, files)| DuplicateIndex {
            index: *index,
            files: files.clone(),
        })
        .collect();

    let gallery_visible = gallery_visible(&present, GALLERY_MISS_LIMIT);

    SequenceStatus {
        directory: listing.root().to_path_buf(),
        numbered: numbered.len(),
        unnumbered: unnumbered.len(),
        max_index,
        next_index,
        missing,
        missing_count,
        duplicates,
        gallery_visible,
        unnumbered_files: unnumbered.iter().map(|e| e.file_name.clone()).collect(),
    }
}

/// What the gallery shows from a listing of published files. Only `<n>.webp` names count.
pub fn gallery_status(listing: &DirectoryListing) -> GalleryStatus {
    let present: BTreeSet<u64> = listing
        .entries()
        .iter()
        .filter(|entry| {
            entry
                .extension
                .as_deref()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("webp"))
        })
        .filter_map(FileEntry::index)
        .collect();

    GalleryStatus {
        directory: listing.root().to_path_buf(),
        published: present.len(),
        visible: gallery_visible(&present, GALLERY_MISS_LIMIT),
    }
}

/// Gaps between consecutive used indices, starting from 1
pub fn index_gaps(present: &BTreeSet<u64>) -> Vec<IndexGap> {
    let mut gaps = Vec::new();
    let mut expected = 1;
    for &index in present {
        if index > expected {
            gaps.push(IndexGap {
                first: expected,
                last: index - 1,
            });
        }
        expected = index.saturating_add(1);
    }
    gaps
}

/// Walk `1, 2, 3, ...` counting hits until `miss_limit` consecutive misses
pub fn gallery_visible(present: &BTreeSet<u64>, miss_limit: u64) -> usize {
    let Some(&max) = present.iter().next_back() else {
        return 0;
    };

    let mut visible = 0;
    let mut misses = 0;
    let mut index = 1;
    while misses < miss_limit && index <= max {
        if present.contains(&index) {
            visible += 1;
            misses = 0;
        } else {
            misses += 1;
        }
        index += 1;
    }
    visible
}
