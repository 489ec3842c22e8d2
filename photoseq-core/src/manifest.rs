use crate::error::PhotoseqError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Photo order produced by the reorder page: filenames in their desired
/// final order, plus the time the order was saved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderManifest {
    #[serde(default)]
    pub order: Vec<String>,

    /// Display only, never validated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl OrderManifest {
    /// Load and validate a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PhotoseqError::ManifestNotFound(path.to_path_buf()).into());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let manifest: Self =
            serde_json::from_str(&content).map_err(|source| PhotoseqError::ManifestParse {
                path: path.to_path_buf(),
                source,
            })?;

        if manifest.order.is_empty() {
            return Err(PhotoseqError::EmptyOrder(path.to_path_buf()).into());
        }

        manifest.validate()?;
        Ok(manifest)
    }

    /// Reject manifests that list the same filename twice. Positions in the
    /// error are 1-based.
    pub fn validate(&self) -> Result<(), PhotoseqError> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (i, name) in self.order.iter().enumerate() {
            if let Some(first) = seen.insert(name.as_str(), i + 1) {
                return Err(PhotoseqError::DuplicateManifestEntry {
                    name: name.clone(),
                    first,
                    second: i + 1,
                });
            }
        }
        Ok(())
    }

    pub fn timestamp_or_unknown(&self) -> &str {
        self.timestamp.as_deref().unwrap_or("unknown")
    }
}
