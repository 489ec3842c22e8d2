use crate::listing::{DirectoryListing, ExtensionSet};
use crate::output::StatusResult;
use crate::status::{gallery_status, sequence_status};
use anyhow::Result;
use std::path::Path;

/// Status operation - returns structured data.
///
/// `gallery_dir` is the conversion output directory; it is scanned for
/// published `<n>.webp` files when it exists.
pub fn status_operation(directory: &Path, gallery_dir: Option<&Path>) -> Result<StatusResult> {
    let filter = ExtensionSet::renumber()?;
    let listing = DirectoryListing::scan(directory, Some(&filter))?;

    let gallery = match gallery_dir {
        Some(dir) if dir.is_dir() => {
            let published = DirectoryListing::scan(dir, Some(&ExtensionSet::new(&["webp"])?))?;
            Some(gallery_status(&published))
        },
        _ => None,
    };

    Ok(StatusResult {
        sequence: sequence_status(&listing),
        gallery,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::IndexGap;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_status_operation() {
        let temp = TempDir::new().unwrap();
        for name in ["1.jpg", "3.jpg", "new.png", "notes.txt"] {
            fs::write(temp.path().join(name), "x").unwrap();
        }

        let result = status_operation(temp.path(), None).unwrap();
        assert_eq!(result.sequence.numbered, 2);
        assert_eq!(result.sequence.unnumbered, 1);
        assert_eq!(result.sequence.missing, vec![IndexGap { first: 2, last: 2 }]);
        assert_eq!(result.sequence.next_index, 4);
        assert!(result.gallery.is_none());
    }

    #[test]
    fn test_status_counts_published_webp() {
        let temp = TempDir::new().unwrap();
        let photos = temp.path().join("photos");
        let published = temp.path().join("photos_webp");
        fs::create_dir(&photos).unwrap();
        fs::create_dir(&published).unwrap();
        for name in ["1.jpg", "2.jpg", "3.jpg"] {
            fs::write(photos.join(name), "x").unwrap();
        }
        // 2 was never converted, 3 still shows
        for name in ["1.webp", "3.webp", "3.jpg"] {
            fs::write(published.join(name), "x").unwrap();
        }

        let result = status_operation(&photos, Some(&published)).unwrap();
        let gallery = result.gallery.unwrap();
        assert_eq!(gallery.published, 2);
        assert_eq!(gallery.visible, 2);
        assert_eq!(result.sequence.gallery_visible, 3);
    }

    #[test]
    fn test_status_without_output_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("1.jpg"), "x").unwrap();

        let result = status_operation(temp.path(), Some(&temp.path().join("photos_webp"))).unwrap();
        assert!(result.gallery.is_none());
    }

    #[test]
    fn test_status_missing_directory() {
        let temp = TempDir::new().unwrap();
        assert!(status_operation(&temp.path().join("nope"), None).is_err());
    }
}
