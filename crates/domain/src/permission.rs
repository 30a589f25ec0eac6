//! Permission tree served by the menu endpoint.
//!
//! The tree is a forest of menu, button and API nodes. It is replaced
//! wholesale on every menu fetch and only ever queried, never edited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::user::string_or_number;

/// One node of the permission forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PermissionNode {
    /// Node identifier.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Route path, empty for button/API nodes.
    #[serde(default)]
    pub path: String,
    /// Permission code guarding this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_code: Option<String>,
    /// Child nodes.
    #[serde(default)]
    pub children: Vec<PermissionNode>,
}

impl PermissionNode {
    /// Creates a route node.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Sets the permission code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.permission_code = Some(code.into());
        self
    }

    /// Appends a child node.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }
}

/// Searchable node fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeField {
    /// `id`
    Id,
    /// `title`
    Title,
    /// `path`
    Path,
    /// `permissionCode`
    PermissionCode,
}

impl NodeField {
    /// Reads this field from a node.
    #[must_use]
    pub fn value_of(self, node: &PermissionNode) -> Option<&str> {
        match self {
            Self::Id => Some(&node.id),
            Self::Title => Some(&node.title),
            Self::Path => Some(&node.path),
            Self::PermissionCode => node.permission_code.as_deref(),
        }
    }
}

impl fmt::Display for NodeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Path => "path",
            Self::PermissionCode => "permissionCode",
        })
    }
}

impl FromStr for NodeField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "title" => Ok(Self::Title),
            "path" => Ok(Self::Path),
            "permissionCode" | "permission_code" => Ok(Self::PermissionCode),
            other => Err(DomainError::UnknownNodeField(other.to_string())),
        }
    }
}

/// Ordered forest of permission nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct PermissionTree {
    roots: Vec<PermissionNode>,
}

impl PermissionTree {
    /// Creates a tree from its root nodes.
    #[must_use]
    pub const fn new(roots: Vec<PermissionNode>) -> Self {
        Self { roots }
    }

    /// Returns true if the forest has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Finds the first node, in depth-first pre-order, matching `predicate`.
    pub fn find_in_tree<P>(&self, predicate: P) -> Option<&PermissionNode>
    where
        P: Fn(&PermissionNode) -> bool,
    {
        find_in(&self.roots, &predicate)
    }

    /// Returns true if any node at any depth has `field == value`.
    #[must_use]
    pub fn has_node(&self, field: NodeField, value: &str) -> bool {
        self.find_in_tree(|node| field.value_of(node) == Some(value))
            .is_some()
    }

    /// Total number of nodes at every depth.
    #[must_use]
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[PermissionNode]) -> usize {
            nodes.iter().map(|node| 1 + count(&node.children)).sum()
        }
        count(&self.roots)
    }
}

impl From<Vec<PermissionNode>> for PermissionTree {
    fn from(roots: Vec<PermissionNode>) -> Self {
        Self::new(roots)
    }
}

fn find_in<'a, P>(nodes: &'a [PermissionNode], predicate: &P) -> Option<&'a PermissionNode>
where
    P: Fn(&PermissionNode) -> bool,
{
    for node in nodes {
        if predicate(node) {
            return Some(node);
        }
        if let Some(found) = find_in(&node.children, predicate) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> PermissionTree {
        PermissionTree::new(vec![
            PermissionNode::new("1", "A", "/a").with_child(PermissionNode::new("2", "B", "/b")),
            PermissionNode::new("3", "Users", "/system/users")
                .with_child(PermissionNode::new("4", "Add", "").with_code("user:add")),
        ])
    }

    #[test]
    fn test_has_node_nested_path() {
        let tree = sample();
        assert!(tree.has_node(NodeField::Path, "/b"));
        assert!(!tree.has_node(NodeField::Path, "/c"));
    }

    #[test]
    fn test_has_node_permission_code() {
        let tree = sample();
        assert!(tree.has_node(NodeField::PermissionCode, "user:add"));
        assert!(!tree.has_node(NodeField::PermissionCode, "user:delete"));
    }

    #[test]
    fn test_find_in_tree_preorder() {
        let tree = sample();
        let found = tree.find_in_tree(|n| n.id.parse::<u32>().unwrap() > 1).unwrap();
        assert_eq!(found.title, "B");
    }

    #[test]
    fn test_deserialize_menu_payload() {
        let json = r#"[{"id":1,"title":"A","path":"/a","permissionCode":null,"children":[{"id":2,"title":"B","path":"/b"}]}]"#;
        let tree: PermissionTree = serde_json::from_str(json).unwrap();
        assert_eq!(tree.node_count(), 2);
        assert!(tree.has_node(NodeField::Id, "2"));
        assert!(tree.find_in_tree(|n| n.permission_code.is_some()).is_none());
    }

    #[test]
    fn test_node_field_from_str() {
        assert_eq!("path".parse::<NodeField>().unwrap(), NodeField::Path);
        assert_eq!(
            "permissionCode".parse::<NodeField>().unwrap(),
            NodeField::PermissionCode
        );
        assert_eq!(
            "colour".parse::<NodeField>(),
            Err(DomainError::UnknownNodeField("colour".to_string()))
        );
    }
}
