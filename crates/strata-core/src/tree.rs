//! Requirement trees
//!
//! A tree mirrors a configurable's schema: value requirements become
//! [`RequirementTreeLeaf`]s and layer requirements become
//! [`RequirementTreeNode`]s with one [`Branch`] per layer type that could
//! fill them. Each branch carries the subtree of that layer type's own
//! schema. Node names are the configuration path components under which
//! values are read and written.

use crate::{LayerTypeRef, Requirement};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write;
use strata_config::ConfigPath;

#[derive(Debug, Clone)]
pub enum TreeNode {
    Leaf(RequirementTreeLeaf),
    Node(RequirementTreeNode),
}

/// A value requirement.
#[derive(Debug, Clone)]
pub struct RequirementTreeLeaf {
    pub name: String,
    pub requirement: Requirement,
}

/// A layer requirement and its candidate layer types, in priority order.
#[derive(Debug, Clone)]
pub struct RequirementTreeNode {
    pub name: String,
    pub requirement: Requirement,
    pub branches: Vec<Branch>,
}

/// One candidate layer type for a node, with its own requirements.
#[derive(Clone)]
pub struct Branch {
    pub layer_type: LayerTypeRef,
    pub subtree: Vec<TreeNode>,
}

impl std::fmt::Debug for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Branch")
            .field("layer_type", &self.layer_type.name())
            .field("subtree", &self.subtree)
            .finish()
    }
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            Self::Leaf(leaf) => &leaf.name,
            Self::Node(node) => &node.name,
        }
    }

    pub fn requirement(&self) -> &Requirement {
        match self {
            Self::Leaf(leaf) => &leaf.requirement,
            Self::Node(node) => &node.requirement,
        }
    }

    pub fn as_node(&self) -> Option<&RequirementTreeNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Leaf(_) => None,
        }
    }
}

impl RequirementTreeNode {
    /// Names of the candidate layer types, in priority order.
    pub fn candidates(&self) -> Vec<&str> {
        self.branches.iter().map(|b| b.layer_type.name()).collect()
    }

    pub fn branch(&self, layer_type: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.layer_type.name() == layer_type)
    }
}

/// Serializable outline of a tree, for display and comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeView {
    Leaf {
        name: String,
        requirement: &'static str,
        optional: bool,
    },
    Node {
        name: String,
        optional: bool,
        branches: Vec<BranchView>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchView {
    pub layer_type: String,
    pub subtree: Vec<TreeView>,
}

/// Outline `tree` as plain data.
pub fn view(tree: &[TreeNode]) -> Vec<TreeView> {
    tree.iter()
        .map(|node| match node {
            TreeNode::Leaf(leaf) => TreeView::Leaf {
                name: leaf.name.clone(),
                requirement: leaf.requirement.kind_name(),
                optional: leaf.requirement.optional,
            },
            TreeNode::Node(node) => TreeView::Node {
                name: node.name.clone(),
                optional: node.requirement.optional,
                branches: node
                    .branches
                    .iter()
                    .map(|branch| BranchView {
                        layer_type: branch.layer_type.name().to_string(),
                        subtree: view(&branch.subtree),
                    })
                    .collect(),
            },
        })
        .collect()
}

/// Render `tree` as indented text, two spaces per level.
pub fn render(tree: &[TreeNode]) -> String {
    let mut out = String::new();
    render_into(&mut out, tree, 0);
    out
}

fn render_into(out: &mut String, tree: &[TreeNode], depth: usize) {
    for node in tree {
        let requirement = node.requirement();
        let optional = if requirement.optional { " (optional)" } else { "" };
        let _ = writeln!(
            out,
            "{:indent$}{} [{}]{optional}",
            "",
            node.name(),
            requirement.kind_name(),
            indent = depth * 2
        );
        if let TreeNode::Node(node) = node {
            for branch in &node.branches {
                let _ = writeln!(out, "{:indent$}{}", "", branch.layer_type.name(), indent = depth * 2 + 2);
                render_into(out, &branch.subtree, depth + 2);
            }
        }
    }
}

/// Configuration paths of every leaf named `requirement`, across all branches.
///
/// Paths are relative to `base` and returned sorted without duplicates;
/// sibling branches share their node's path.
pub fn leaf_paths(tree: &[TreeNode], base: &ConfigPath, requirement: &str) -> Vec<ConfigPath> {
    let mut paths = BTreeSet::new();
    collect_leaf_paths(tree, base, requirement, &mut paths);
    paths.into_iter().collect()
}

fn collect_leaf_paths(
    tree: &[TreeNode],
    base: &ConfigPath,
    requirement: &str,
    paths: &mut BTreeSet<ConfigPath>,
) {
    for node in tree {
        let path = base.join(node.name());
        match node {
            TreeNode::Leaf(leaf) if leaf.requirement.name == requirement => {
                paths.insert(path);
            }
            TreeNode::Leaf(_) => {}
            TreeNode::Node(node) => {
                for branch in &node.branches {
                    collect_leaf_paths(&branch.subtree, &path, requirement, paths);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubType;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<TreeNode> {
        let physical = StubType::new("Physical").into_ref();
        let paged = StubType::new("Paged").into_ref();
        let location = |name: &str| {
            TreeNode::Leaf(RequirementTreeLeaf {
                name: name.to_string(),
                requirement: Requirement::string("location"),
            })
        };

        vec![TreeNode::Node(RequirementTreeNode {
            name: "primary".into(),
            requirement: Requirement::layer("primary"),
            branches: vec![
                Branch {
                    layer_type: paged,
                    subtree: vec![TreeNode::Node(RequirementTreeNode {
                        name: "memory_layer".into(),
                        requirement: Requirement::layer("memory_layer"),
                        branches: vec![Branch {
                            layer_type: physical.clone(),
                            subtree: vec![location("location")],
                        }],
                    })],
                },
                Branch {
                    layer_type: physical,
                    subtree: vec![location("location")],
                },
            ],
        })]
    }

    #[test]
    fn test_render() {
        let expected = "\
primary [layer]
  Paged
    memory_layer [layer]
      Physical
        location [string]
  Physical
    location [string]
";
        assert_eq!(render(&sample()), expected);
    }

    #[test]
    fn test_leaf_paths_span_branches() {
        let paths = leaf_paths(&sample(), &ConfigPath::new("plugin"), "location");
        assert_eq!(
            paths,
            vec![
                ConfigPath::new("plugin.primary.location"),
                ConfigPath::new("plugin.primary.memory_layer.location"),
            ]
        );
    }

    #[test]
    fn test_view_serializes() {
        let json = serde_json::to_value(view(&sample())).unwrap();
        assert_eq!(json[0]["kind"], "node");
        assert_eq!(json[0]["branches"][0]["layer_type"], "Paged");
        assert_eq!(json[0]["branches"][1]["subtree"][0]["requirement"], "string");
    }

    #[test]
    fn test_candidates() {
        let tree = sample();
        let node = tree[0].as_node().unwrap();
        assert_eq!(node.candidates(), vec!["Paged", "Physical"]);
        assert!(node.branch("Physical").is_some());
        assert!(node.branch("Missing").is_none());
    }
}
