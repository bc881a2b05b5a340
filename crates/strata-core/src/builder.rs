//! Requirement tree construction

use crate::matcher::satisfies;
use crate::tree::{Branch, RequirementTreeLeaf, RequirementTreeNode, TreeNode};
use crate::{Configurable, LayerRegistry, Requirement};
use std::collections::{HashMap, HashSet};

/// Builds requirement trees from a registry.
///
/// Building is pure: it reads the registry and the schemas of the layer
/// types in it, and returns the same tree for the same inputs.
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder<'a> {
    registry: &'a LayerRegistry,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(registry: &'a LayerRegistry) -> Self {
        Self { registry }
    }

    /// Build the tree for `configurable`'s schema, in declaration order.
    ///
    /// Top-level layer nodes are returned even when no layer type can fill
    /// them; resolution then fails on them unless they are optional.
    pub fn build_tree(&self, configurable: &dyn Configurable) -> Vec<TreeNode> {
        let mut stack = Vec::new();
        let tree = self.build_schema(configurable.schema(), &mut stack);
        tracing::debug!(configurable = configurable.name(), nodes = tree.len(), "Built requirement tree");
        tree
    }

    /// `stack` holds the layer types currently being expanded, outermost first.
    fn build_schema(&self, schema: Vec<Requirement>, stack: &mut Vec<String>) -> Vec<TreeNode> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut used: HashSet<String> = HashSet::new();
        let mut nodes = Vec::with_capacity(schema.len());

        for requirement in schema {
            let count = counts.entry(requirement.name.clone()).or_insert(0);
            *count += 1;
            let base = &requirement.name;
            let mut suffix = *count;
            let mut name = if suffix == 1 { base.clone() } else { format!("{base}{suffix}") };
            while used.contains(&name) {
                suffix += 1;
                name = format!("{base}{suffix}");
            }
            used.insert(name.clone());

            if requirement.is_layer() {
                nodes.push(TreeNode::Node(self.build_node(name, requirement, stack)));
            } else {
                nodes.push(TreeNode::Leaf(RequirementTreeLeaf { name, requirement }));
            }
        }
        nodes
    }

    fn build_node(
        &self,
        name: String,
        requirement: Requirement,
        stack: &mut Vec<String>,
    ) -> RequirementTreeNode {
        let mut branches = Vec::new();

        for layer_type in self.registry.layer_types() {
            if !satisfies(layer_type.as_ref(), &requirement) {
                continue;
            }
            let type_name = layer_type.name().to_string();
            if stack.contains(&type_name) {
                tracing::debug!(node = %name, layer_type = %type_name, "Skipping cyclic candidate");
                continue;
            }

            stack.push(type_name);
            let subtree = self.build_schema(layer_type.schema(), stack);
            stack.pop();

            if is_viable(&subtree) {
                branches.push(Branch {
                    layer_type: layer_type.clone(),
                    subtree,
                });
            } else {
                tracing::debug!(node = %name, layer_type = layer_type.name(), "Pruned candidate");
            }
        }

        RequirementTreeNode {
            name,
            requirement,
            branches,
        }
    }
}

/// Every mandatory layer node has at least one candidate.
///
/// Branches are only kept when viable, so checking direct children covers
/// the whole subtree.
fn is_viable(subtree: &[TreeNode]) -> bool {
    subtree.iter().all(|node| match node {
        TreeNode::Node(node) => node.requirement.optional || !node.branches.is_empty(),
        TreeNode::Leaf(_) => true,
    })
}
