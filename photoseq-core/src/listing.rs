use crate::entry::FileEntry;
use crate::error::PhotoseqError;
use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions considered by gap-fill numbering and the status report
pub const RENUMBER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Extensions accepted as conversion input
pub const CONVERT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Case-insensitive set of file extensions, matched against file names
#[derive(Debug, Clone)]
pub struct ExtensionSet {
    extensions: Vec<String>,
    globs: GlobSet,
}

impl ExtensionSet {
    pub fn new(extensions: &[&str]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for ext in extensions {
            let glob = GlobBuilder::new(&format!("*.{ext}"))
                .case_insensitive(true)
                .literal_separator(true)
                .build()
                .with_context(|| format!("Invalid extension pattern: {ext}"))?;
            builder.add(glob);
        }

        Ok(Self {
            extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
            globs: builder.build().context("Failed to build extension set")?,
        })
    }

    pub fn renumber() -> Result<Self> {
        Self::new(RENUMBER_EXTENSIONS)
    }

    pub fn convert() -> Result<Self> {
        Self::new(CONVERT_EXTENSIONS)
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.globs.is_match(file_name)
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

/// Regular files directly inside one directory, sorted by absolute path.
///
/// Entries are keyed by absolute path, so a file matched by more than one
/// pattern (e.g. `*.jpg` and `*.JPG` on a case-insensitive filesystem) shows
/// up once.
#[derive(Debug, Clone)]
pub struct DirectoryListing {
    root: PathBuf,
    entries: Vec<FileEntry>,
}

impl DirectoryListing {
    /// Scan `dir` (non-recursively). With a filter, only files whose name
    /// matches one of its extensions are kept; without one, every regular
    /// file is listed.
    pub fn scan(dir: &Path, filter: Option<&ExtensionSet>) -> Result<Self> {
        if !dir.is_dir() {
            return Err(PhotoseqError::DirectoryNotFound(dir.to_path_buf()).into());
        }

        let root = dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve directory {}", dir.display()))?;

        let mut by_path = BTreeMap::new();
        for entry in WalkDir::new(&root).min_depth(1).max_depth(1) {
            let entry =
                entry.with_context(|| format!("Failed to read directory {}", root.display()))?;
            let path = entry.path();

            // Follows symlinks: a link to a photo counts as a photo
            if !path.is_file() {
                continue;
            }

            let Some(file_entry) = FileEntry::from_path(path) else {
                continue;
            };

            if let Some(filter) = filter {
                if !filter.matches(&file_entry.file_name) {
                    continue;
                }
            }

            by_path.insert(path.to_path_buf(), file_entry);
        }

        Ok(Self {
            root,
            entries: by_path.into_values().collect(),
        })
    }

    /// Build a listing from already-known entries. Entries are re-sorted and
    /// deduplicated by path.
    pub fn from_entries(root: PathBuf, entries: Vec<FileEntry>) -> Self {
        let by_path: BTreeMap<PathBuf, FileEntry> = entries
            .into_iter()
            .map(|entry| (entry.path.clone(), entry))
            .collect();

        Self {
            root,
            entries: by_path.into_values().collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact file name lookup
    pub fn find(&self, file_name: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.file_name == file_name)
    }

    /// Case-insensitive file name lookup, used for collision checks
    pub fn find_ignore_case(&self, file_name: &str) -> Option<&FileEntry> {
        self.entries
            .iter()
            .find(|e| e.file_name.eq_ignore_ascii_case(file_name))
    }

    /// Split into (numbered, unnumbered), both in path order
    pub fn partition(&self) -> (Vec<&FileEntry>, Vec<&FileEntry>) {
        self.entries.iter().partition(|e| e.index().is_some())
    }
}
