use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Result of reading a file stem as a sequence number.
///
/// A stem is `Indexed` only when it is made of ASCII digits and fits in a
/// `u64`. Leading zeros are accepted (`007` is 7); signs, spaces and anything
/// else make the file unnumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "index")]
pub enum Numbering {
    Indexed(u64),
    Unnumbered,
}

impl Numbering {
    pub fn parse(stem: &str) -> Self {
        if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
            return Self::Unnumbered;
        }
        stem.parse::<u64>()
            .map_or(Self::Unnumbered, Self::Indexed)
    }

    pub fn index(self) -> Option<u64> {
        match self {
            Self::Indexed(index) => Some(index),
            Self::Unnumbered => None,
        }
    }
}

/// A regular file found in a photo directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: PathBuf,
    pub file_name: String,
    pub stem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    pub numbering: Numbering,
}

impl FileEntry {
    /// Build an entry from a path. Returns `None` when the path has no
    /// UTF-8 file name.
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&file_name)
            .to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_string);
        let numbering = Numbering::parse(&stem);

        Some(Self {
            path: path.to_path_buf(),
            file_name,
            stem,
            extension,
            numbering,
        })
    }

    pub fn index(&self) -> Option<u64> {
        self.numbering.index()
    }
}

/// Destination file name for a sequence number. Always `.jpg`, whatever the
/// source format was.
pub fn numbered_name(index: u64) -> String {
    format!("{index}.jpg")
}
