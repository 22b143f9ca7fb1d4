//! Directory browsing.
//!
//! A game install is organised as zone directories holding `perm.bin`
//! resource packs and their `temp.bin` texture data.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;
use xiasi_common::TreeNode;

use crate::Result;

/// Suffix of a resource pack.
pub const RESOURCE_SUFFIX: &str = "perm.bin";

/// Suffix of a texture data pack.
pub const TEXTURE_SUFFIX: &str = "temp.bin";

/// What a browsed entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryKind {
    /// A directory.
    Zone,
    /// A `perm.bin` file.
    Resource,
    /// A `temp.bin` file.
    Texture,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntryKind::Zone => "Zone",
            EntryKind::Resource => "Resource",
            EntryKind::Texture => "Texture",
        })
    }
}

/// Classify a file name, or a directory.
pub fn classify(name: &str, is_dir: bool) -> Option<EntryKind> {
    if is_dir {
        Some(EntryKind::Zone)
    } else if name.ends_with(RESOURCE_SUFFIX) {
        Some(EntryKind::Resource)
    } else if name.ends_with(TEXTURE_SUFFIX) {
        Some(EntryKind::Texture)
    } else {
        None
    }
}

/// A classified directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BrowseEntry {
    pub path: PathBuf,
    pub name: String,
    pub kind: EntryKind,
}

impl fmt::Display for BrowseEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.kind)
    }
}

/// Classify everything under `root`, excluding `root` itself.
///
/// `max_depth` of `Some(1)` lists only the immediate children; `None`
/// descends into every zone. Entries are sorted by name within each
/// directory. Unrecognised files are left out and unreadable entries are
/// logged and skipped; only a failure to read `root` is an error.
pub fn browse(root: impl AsRef<Path>, max_depth: Option<usize>) -> Result<Vec<BrowseEntry>> {
    let mut walker = WalkDir::new(root.as_ref()).min_depth(1).sort_by_file_name();
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    let mut entries = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                warn!("skipping unreadable entry: {e}");
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(kind) = classify(&name, entry.file_type().is_dir()) {
            entries.push(BrowseEntry {
                path: entry.into_path(),
                name,
                kind,
            });
        }
    }
    Ok(entries)
}

/// Render browsed entries as a flat tree under `label`.
pub fn to_tree(label: impl Into<String>, entries: &[BrowseEntry]) -> TreeNode {
    TreeNode::new(label).children(entries.iter().map(|e| TreeNode::new(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_classify() {
        assert_eq!(classify("zone_a", true), Some(EntryKind::Zone));
        assert_eq!(classify("city.perm.bin", false), Some(EntryKind::Resource));
        assert_eq!(classify("city.temp.bin", false), Some(EntryKind::Texture));
        assert_eq!(classify("city.bin", false), None);
        assert_eq!(classify("readme.txt", false), None);
    }

    #[test]
    fn test_browse_directory() {
        let root = std::env::temp_dir().join(format!("xiasi-browse-{}", std::process::id()));
        let zone = root.join("zone_01");
        fs::create_dir_all(&zone).unwrap();
        fs::write(root.join("global.perm.bin"), b"").unwrap();
        fs::write(zone.join("zone_01.perm.bin"), b"").unwrap();
        fs::write(zone.join("zone_01.temp.bin"), b"").unwrap();
        fs::write(zone.join("notes.txt"), b"").unwrap();

        let all = browse(&root, None).unwrap();
        let labels: Vec<String> = all.iter().map(ToString::to_string).collect();
        assert_eq!(
            labels,
            vec![
                "global.perm.bin [Resource]",
                "zone_01 [Zone]",
                "zone_01.perm.bin [Resource]",
                "zone_01.temp.bin [Texture]",
            ]
        );

        let top = browse(&root, Some(1)).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(to_tree("root", &top).children.len(), 2);

        assert!(browse(root.join("missing"), None).is_err());
        let _ = fs::remove_dir_all(&root);
    }
}
