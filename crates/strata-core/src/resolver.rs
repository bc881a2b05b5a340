//! Resolution of requirement trees into live layers
//!
//! The resolver walks a tree depth first, instantiating a layer for every
//! mandatory layer node and validating every configured value. Each layer
//! node with candidates is a choice point: before a candidate is tried the
//! context is checkpointed, and any later failure rolls back to the most
//! recent choice point and moves on to its next candidate.

use crate::builder::TreeBuilder;
use crate::context::Checkpoint;
use crate::tree::{Branch, RequirementTreeNode, TreeNode};
use crate::{Configurable, Context, Error, LayerRegistry, LayerType, Requirement, Result, matcher};
use strata_config::ConfigPath;

/// Pending work for the resolution walk.
#[derive(Debug, Clone)]
enum Step<'t> {
    /// Resolve or validate `node` beneath `base`.
    Visit { node: &'t TreeNode, base: ConfigPath },
    /// Instantiate `branch`'s layer type for `node`, its subtree being done.
    Commit {
        node: &'t RequirementTreeNode,
        branch: &'t Branch,
        node_path: ConfigPath,
    },
}

/// A layer node whose candidates are being tried in order.
struct ChoicePoint<'t> {
    node: &'t RequirementTreeNode,
    node_path: ConfigPath,
    checkpoint: Checkpoint,
    /// Work left after this node, restored on every attempt.
    continuation: Vec<Step<'t>>,
    next_branch: usize,
}

/// Builds requirement trees and resolves them against a [`Context`].
#[derive(Debug, Clone)]
pub struct DependencyResolver {
    registry: LayerRegistry,
}

impl DependencyResolver {
    pub fn new(registry: LayerRegistry) -> Self {
        Self { registry }
    }

    /// A resolver over the built-in layer types.
    pub fn with_builtins() -> Self {
        Self::new(LayerRegistry::with_builtins())
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    /// See [`TreeBuilder::build_tree`].
    pub fn build_tree(&self, configurable: &dyn Configurable) -> Vec<TreeNode> {
        TreeBuilder::new(&self.registry).build_tree(configurable)
    }

    /// See [`matcher::satisfies`].
    pub fn satisfies(&self, layer_type: &dyn LayerType, requirement: &Requirement) -> bool {
        matcher::satisfies(layer_type, requirement)
    }

    /// Build and resolve `configurable`'s tree beneath `base`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unresolved` if no combination of candidates works.
    pub fn resolve(
        &self,
        configurable: &dyn Configurable,
        context: &mut Context,
        base: &ConfigPath,
    ) -> Result<()> {
        let tree = self.build_tree(configurable);
        if self.validate_dependencies(&tree, context, base) {
            Ok(())
        } else {
            Err(Error::Unresolved {
                configurable: configurable.name().to_string(),
            })
        }
    }

    /// Resolve `tree` beneath `base`, instantiating layers into `context`.
    ///
    /// Mandatory layer nodes are filled by the first candidate, in priority
    /// order, for which the rest of the walk also succeeds. Nodes whose path
    /// already names a live layer are only validated. Optional layer nodes
    /// are never instantiated; like every other node they are validated when
    /// a value is configured, and a failure on an optional node is ignored.
    ///
    /// Returns `false` if the tree cannot be resolved, in which case
    /// `context` is left exactly as it was.
    pub fn validate_dependencies(
        &self,
        tree: &[TreeNode],
        context: &mut Context,
        base: &ConfigPath,
    ) -> bool {
        let start = context.checkpoint();
        let mut pending: Vec<Step<'_>> = tree
            .iter()
            .rev()
            .map(|node| Step::Visit {
                node,
                base: base.clone(),
            })
            .collect();
        let mut choices: Vec<ChoicePoint<'_>> = Vec::new();

        while let Some(step) = pending.pop() {
            let ok = match step {
                Step::Visit { node, base } => {
                    let node_path = base.join(node.name());
                    match node {
                        TreeNode::Node(layer_node)
                            if !layer_node.requirement.optional
                                && !is_preconfigured(&node_path, context) =>
                        {
                            choices.push(ChoicePoint {
                                node: layer_node,
                                node_path,
                                checkpoint: context.checkpoint(),
                                continuation: std::mem::take(&mut pending),
                                next_branch: 0,
                            });
                            false
                        }
                        _ => check(node.requirement(), &node_path, context),
                    }
                }
                Step::Commit {
                    node,
                    branch,
                    node_path,
                } => commit(node, branch, &node_path, context),
            };

            if !ok && !next_candidate(&mut choices, &mut pending, context) {
                tracing::debug!(%base, "Resolution failed");
                context.rollback(start);
                return false;
            }
        }

        true
    }
}

/// Roll back to the innermost choice point with an untried candidate and
/// queue that candidate. Returns `false` once every choice is exhausted.
fn next_candidate<'t>(
    choices: &mut Vec<ChoicePoint<'t>>,
    pending: &mut Vec<Step<'t>>,
    context: &mut Context,
) -> bool {
    while let Some(choice) = choices.last_mut() {
        context.rollback(choice.checkpoint.clone());

        let node = choice.node;
        if let Some(branch) = node.branches.get(choice.next_branch) {
            choice.next_branch += 1;
            tracing::debug!(
                node = %choice.node_path,
                layer_type = branch.layer_type.name(),
                "Trying candidate"
            );

            *pending = choice.continuation.clone();
            pending.push(Step::Commit {
                node,
                branch,
                node_path: choice.node_path.clone(),
            });
            pending.extend(branch.subtree.iter().rev().map(|child| Step::Visit {
                node: child,
                base: choice.node_path.clone(),
            }));
            return true;
        }

        tracing::debug!(node = %choice.node_path, "No candidate left");
        choices.pop();
    }
    false
}

/// The node's path already names a live layer.
fn is_preconfigured(node_path: &ConfigPath, context: &Context) -> bool {
    context
        .config
        .get_str(node_path)
        .is_some_and(|name| context.memory.contains(name))
}

/// Validate the value configured at `node_path`, tolerating optional failures.
fn check(requirement: &Requirement, node_path: &ConfigPath, context: &Context) -> bool {
    let outcome = match context.config.get(node_path) {
        Some(value) => requirement.validate(value, &context.memory),
        None => Err(Error::validation(&requirement.name, format!("nothing configured at '{node_path}'"))),
    };

    match outcome {
        Ok(()) => true,
        Err(e) if requirement.optional => {
            tracing::debug!(path = %node_path, error = %e, "Ignoring optional requirement");
            true
        }
        Err(e) => {
            tracing::debug!(path = %node_path, error = %e, "Requirement not met");
            false
        }
    }
}

/// Instantiate `branch`'s layer type for `node` and record it at `node_path`.
fn commit(
    node: &RequirementTreeNode,
    branch: &Branch,
    node_path: &ConfigPath,
    context: &mut Context,
) -> bool {
    let layer_type = &branch.layer_type;
    let name = context.memory.free_layer_name(&node.requirement.name);
    let params = context.config.branch(node_path);

    let layer = match layer_type.construct(context, node_path, &name, &params) {
        Ok(layer) => layer,
        Err(e) => {
            tracing::warn!(layer_type = layer_type.name(), path = %node_path, error = %e, "Layer construction failed");
            return false;
        }
    };
    if let Err(e) = context.memory.add_layer(layer) {
        tracing::warn!(layer_type = layer_type.name(), path = %node_path, error = %e, "Layer registration failed");
        return false;
    }

    context.config.write(node_path, name.as_str());
    tracing::info!(layer = %name, layer_type = layer_type.name(), path = %node_path, "Instantiated layer");
    check(&node.requirement, node_path, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubType;
    use crate::{PluginSchema, metadata};
    use pretty_assertions::assert_eq;

    fn plugin(requirements: Vec<Requirement>) -> PluginSchema {
        PluginSchema::new("plugin", requirements)
    }

    fn kind(value: &str) -> crate::Metadata {
        metadata([("kind", value)])
    }

    #[test]
    fn test_first_candidate_wins() {
        let resolver = DependencyResolver::new(LayerRegistry::new(vec![
            StubType::new("First").with_metadata(kind("top")).into_ref(),
            StubType::new("Second").with_metadata(kind("top")).into_ref(),
        ]));
        let mut context = Context::new();
        let base = ConfigPath::new("plugin");

        resolver
            .resolve(&plugin(vec![Requirement::layer("primary")]), &mut context, &base)
            .unwrap();

        assert_eq!(context.memory.names(), vec!["primary"]);
        assert_eq!(context.config.get_str("plugin.primary"), Some("primary"));
    }

    #[test]
    fn test_construction_failure_falls_through() {
        let resolver = DependencyResolver::new(LayerRegistry::new(vec![
            StubType::new("Broken").failing().into_ref(),
            StubType::new("Working").into_ref(),
        ]));
        let mut context = Context::new();
        let tree = resolver.build_tree(&plugin(vec![Requirement::layer("primary")]));

        assert!(resolver.validate_dependencies(&tree, &mut context, &ConfigPath::new("plugin")));
        assert_eq!(context.memory.names(), vec!["primary"]);
    }

    #[test]
    fn test_later_sibling_failure_revisits_earlier_choice() {
        // Heavy pulls in a swap layer, and Picky refuses to coexist with one
        let heavy = StubType::new("Heavy")
            .with_metadata(kind("top"))
            .with_schema(vec![Requirement::layer("swap").with_constraint("kind", "swap")]);
        let light = StubType::new("Light").with_metadata(kind("top"));
        let swap = StubType::new("Swap").with_metadata(kind("swap"));
        let picky = StubType::new("Picky")
            .with_metadata(kind("picky"))
            .conflicting_with("swap");

        let resolver = DependencyResolver::new(LayerRegistry::new(vec![
            heavy.into_ref(),
            light.into_ref(),
            swap.into_ref(),
            picky.into_ref(),
        ]));
        let mut context = Context::new();

        resolver
            .resolve(
                &plugin(vec![
                    Requirement::layer("primary").with_constraint("kind", "top"),
                    Requirement::layer("secondary").with_constraint("kind", "picky"),
                ]),
                &mut context,
                &ConfigPath::new("plugin"),
            )
            .unwrap();

        assert_eq!(context.memory.names(), vec!["primary", "secondary"]);
        assert!(!context.config.contains("plugin.primary.swap"));
    }

    #[test]
    fn test_failure_leaves_context_untouched() {
        let resolver = DependencyResolver::new(LayerRegistry::new(vec![
            StubType::new("Only").with_metadata(kind("top")).into_ref(),
        ]));
        let mut context = Context::new();
        context.config.write("unrelated", 7);

        let result = resolver.resolve(
            &plugin(vec![
                Requirement::layer("primary").with_constraint("kind", "top"),
                Requirement::integer("pid"),
            ]),
            &mut context,
            &ConfigPath::new("plugin"),
        );

        assert!(matches!(result, Err(Error::Unresolved { .. })));
        assert!(context.memory.is_empty());
        assert_eq!(context.config.len(), 1);
    }

    #[test]
    fn test_preconfigured_layer_is_reused() {
        let resolver = DependencyResolver::new(LayerRegistry::new(vec![StubType::new("Only").into_ref()]));
        let mut context = Context::new();
        context
            .memory
            .add_layer(Box::new(strata_layers::BufferLayer::new("existing", vec![])))
            .unwrap();
        context.config.write("plugin.primary", "existing");

        resolver
            .resolve(&plugin(vec![Requirement::layer("primary")]), &mut context, &ConfigPath::new("plugin"))
            .unwrap();
        assert_eq!(context.memory.names(), vec!["existing"]);
    }

    #[test]
    fn test_instance_names_are_unique() {
        let resolver = DependencyResolver::new(LayerRegistry::new(vec![StubType::new("Only").into_ref()]));
        let mut context = Context::new();

        resolver
            .resolve(
                &plugin(vec![Requirement::layer("primary"), Requirement::layer("primary")]),
                &mut context,
                &ConfigPath::new("plugin"),
            )
            .unwrap();

        assert_eq!(context.memory.names(), vec!["primary", "primary2"]);
        assert_eq!(context.config.get_str("plugin.primary"), Some("primary"));
        assert_eq!(context.config.get_str("plugin.primary2"), Some("primary2"));
    }

    #[test]
    fn test_optional_value_failure_is_ignored() {
        let resolver = DependencyResolver::new(LayerRegistry::default());
        let mut context = Context::new();
        context.config.write("plugin.pid", "not a number");

        let tree = resolver.build_tree(&plugin(vec![Requirement::integer("pid").optional()]));
        assert!(resolver.validate_dependencies(&tree, &mut context, &ConfigPath::new("plugin")));
    }
}
