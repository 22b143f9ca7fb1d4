//! Signature scanning.
//!
//! Resource locations are found by searching the raw bytes for each type
//! tag. This is independent of chunk framing and will also report tags that
//! occur by coincidence inside other data.

use std::iter::FusedIterator;

use tracing::{debug, warn};
use xiasi_common::memchr::memmem::Finder;
use xiasi_common::TreeNode;

use crate::directory::{self, ResourceType};
use crate::texture::TextureInfo;

/// Lazy iterator over every offset where a tag's bytes occur.
///
/// Overlapping matches are reported. Cloning the scan, or calling
/// [`SignatureScan::rewind`], restarts it from the beginning.
#[derive(Clone)]
pub struct SignatureScan<'a> {
    data: &'a [u8],
    finder: Finder<'static>,
    next: usize,
}

impl<'a> SignatureScan<'a> {
    /// Scan for the little-endian encoding of `tag`.
    pub fn new(data: &'a [u8], tag: u32) -> Self {
        Self::for_bytes(data, &tag.to_le_bytes())
    }

    /// Scan for an arbitrary byte signature.
    pub fn for_bytes(data: &'a [u8], signature: &[u8]) -> Self {
        Self {
            data,
            finder: Finder::new(signature).into_owned(),
            next: 0,
        }
    }

    /// Restart the scan from the beginning of the buffer.
    pub fn rewind(&mut self) {
        self.next = 0;
    }
}

impl std::fmt::Debug for SignatureScan<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureScan")
            .field("signature", &self.finder.needle())
            .field("next", &self.next)
            .finish()
    }
}

impl Iterator for SignatureScan<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let rest = self.data.get(self.next..)?;
        match self.finder.find(rest) {
            Some(i) => {
                let offset = self.next + i;
                self.next = offset + 1;
                Some(offset)
            }
            None => {
                self.next = self.data.len() + 1;
                None
            }
        }
    }
}

impl FusedIterator for SignatureScan<'_> {}

/// One occurrence of a resource tag.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResourceMatch {
    pub offset: usize,
    /// Parsed detail, for texture matches whose header fits the buffer.
    pub texture: Option<TextureInfo>,
}

/// All matches of one resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResourceGroup {
    pub resource: ResourceType,
    pub matches: Vec<ResourceMatch>,
}

impl ResourceGroup {
    fn to_tree(&self) -> TreeNode {
        let label = format!("{} ({})", self.resource.name, self.matches.len());
        TreeNode::new(label).children(self.matches.iter().map(|m| {
            let offset = format!("Offset: {}", m.offset);
            match &m.texture {
                Some(info) => TreeNode::new(info.name.clone())
                    .leaf(offset)
                    .children(info.properties().into_iter().map(TreeNode::new)),
                None => TreeNode::new(offset),
            }
        }))
    }
}

/// Scan results grouped by resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScanResults {
    /// Groups with at least one match, in directory order.
    pub groups: Vec<ResourceGroup>,
}

impl ScanResults {
    /// Find a group by resource name.
    pub fn group(&self, name: &str) -> Option<&ResourceGroup> {
        self.groups.iter().find(|g| g.resource.name == name)
    }

    /// Total number of matches across all groups.
    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.matches.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group nodes, one per resource type.
    pub fn to_tree_nodes(&self) -> Vec<TreeNode> {
        self.groups.iter().map(ResourceGroup::to_tree).collect()
    }

    /// Render the results under a root node labelled `label`.
    pub fn to_tree(&self, label: impl Into<String>) -> TreeNode {
        TreeNode::new(label).children(self.to_tree_nodes())
    }
}

/// Collect the matches of one resource type.
pub fn scan_type(data: &[u8], resource: ResourceType) -> Vec<ResourceMatch> {
    let mut matches = Vec::new();
    for offset in SignatureScan::new(data, resource.tag) {
        if !resource.is_texture() {
            matches.push(ResourceMatch {
                offset,
                texture: None,
            });
            continue;
        }

        match TextureInfo::parse(data, offset) {
            Ok(info) => matches.push(ResourceMatch {
                offset,
                texture: Some(info),
            }),
            Err(crate::Error::Common(xiasi_common::Error::Utf8(e))) => {
                warn!(offset, "skipping texture with undecodable name: {e}");
            }
            Err(e) => {
                debug!(offset, "texture detail unavailable: {e}");
                matches.push(ResourceMatch {
                    offset,
                    texture: None,
                });
            }
        }
    }
    matches
}

/// Scan a buffer for every known resource type.
pub fn find_resources(data: &[u8]) -> ScanResults {
    scan_types(data, directory::iter())
}

/// Scan a buffer for the given resource types.
pub fn scan_types(data: &[u8], types: impl IntoIterator<Item = ResourceType>) -> ScanResults {
    let groups = types
        .into_iter()
        .filter_map(|resource| {
            let matches = scan_type(data, resource);
            (!matches.is_empty()).then_some(ResourceGroup { resource, matches })
        })
        .collect();
    ScanResults { groups }
}
