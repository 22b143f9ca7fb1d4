//! Labelled result trees.
//!
//! Decode reports and resource scans are presented to browsing front-ends
//! as a tree of `(label, children)` nodes.

use std::fmt;

/// A node in a display tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeNode {
    /// Display label.
    pub label: String,
    /// Child nodes, in display order.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a leaf node.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// Add a child node.
    pub fn child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    /// Add a leaf child with the given label.
    pub fn leaf(self, label: impl Into<String>) -> Self {
        self.child(TreeNode::new(label))
    }

    /// Add multiple children.
    pub fn children(mut self, children: impl IntoIterator<Item = TreeNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Check if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Count this node and all of its descendants.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }

    /// Find a direct child by label.
    pub fn find(&self, label: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.label == label)
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{}", "", self.label, indent = depth * 2)?;
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_render() {
        let tree = TreeNode::new("Texture (1)")
            .child(TreeNode::new("rock_d").leaf("Offset: 12").leaf("Type: DXT1"));

        assert_eq!(tree.count(), 4);
        assert!(tree.find("rock_d").is_some());
        assert_eq!(
            tree.to_string(),
            "Texture (1)\n  rock_d\n    Offset: 12\n    Type: DXT1\n"
        );
    }
}
