//! End-to-end resolution scenarios
//!
//! Each scenario builds a registry of scripted layer types, builds the
//! requirement tree for a plugin, and resolves it against a fresh context.

use pretty_assertions::assert_eq;
use strata_config::ConfigPath;
use strata_core::tree::{TreeView, view};
use strata_core::{Context, DependencyResolver, LayerRegistry, Requirement};
use strata_test_utils::{MockLayerType, plugin};

fn base() -> ConfigPath {
    ConfigPath::new("plugins.test")
}

fn physical() -> MockLayerType {
    MockLayerType::new("Physical")
        .with_metadata("layer_kind", "physical")
        .with_requirement(Requirement::string("location"))
}

fn intel32() -> MockLayerType {
    MockLayerType::new("Intel32")
        .with_metadata("architecture", "intel")
        .with_metadata("layer_kind", "virtual")
        .with_requirement(Requirement::layer("memory_layer").with_constraint("architecture", ["intel"]))
        .with_requirement(Requirement::integer("page_map_offset"))
}

// ============================================================================
// Scenario A: a paged layer stacked on a physical layer
// ============================================================================

#[test]
fn test_scenario_a_builds_lower_layer_first() {
    let physical = physical();
    let intel = intel32();
    let resolver = DependencyResolver::new(LayerRegistry::new(vec![
        intel.clone().into_ref(),
        physical.clone().into_ref(),
    ]));
    let schema = plugin("test", vec![Requirement::layer("primary").with_constraint("architecture", "intel")]);

    let tree = resolver.build_tree(&schema);
    let node = tree[0].as_node().unwrap();
    assert_eq!(node.candidates()[0], "Intel32");
    assert_eq!(
        node.branch("Intel32").unwrap().subtree[0].as_node().unwrap().candidates(),
        vec!["Physical"]
    );

    let mut context = Context::new();
    context.config.write("plugins.test.primary.memory_layer.location", "/images/memory.raw");
    context.config.write("plugins.test.primary.page_map_offset", 0x1000);

    assert!(resolver.validate_dependencies(&tree, &mut context, &base()));
    assert_eq!(context.memory.names(), vec!["memory_layer", "primary"]);
    assert_eq!(physical.constructed(), vec!["memory_layer"]);
    assert_eq!(intel.constructed(), vec!["primary"]);
    assert_eq!(context.config.get_str("plugins.test.primary"), Some("primary"));
    assert_eq!(
        context.config.get_str("plugins.test.primary.memory_layer"),
        Some("memory_layer")
    );

    // The paged layer reads through the one beneath it
    let primary = context.memory.get("primary").unwrap();
    assert_eq!(primary.dependencies(), vec!["memory_layer".to_string()]);
}

// ============================================================================
// Scenario B: a list constraint excludes its members
// ============================================================================

#[test]
fn test_scenario_b_exclusion_list() {
    let linux = MockLayerType::new("Linux").with_metadata("os", "linux");
    let resolver = DependencyResolver::new(LayerRegistry::new(vec![linux.clone().into_ref()]));
    let requirement = Requirement::layer("primary").with_constraint("os", ["linux", "mac"]);

    assert!(!resolver.satisfies(&linux, &requirement));

    let tree = resolver.build_tree(&plugin("test", vec![requirement]));
    assert!(tree[0].as_node().unwrap().branches.is_empty());
}

// ============================================================================
// Scenario C: an optional requirement nothing can fill
// ============================================================================

#[test]
fn test_scenario_c_optional_without_candidates() {
    // Swapper is the only swap layer, and nothing can fill its backing store
    let swapper = MockLayerType::new("Swapper")
        .with_metadata("layer_kind", "swap")
        .with_requirement(Requirement::layer("backing").with_constraint("layer_kind", "disk"));
    let resolver = DependencyResolver::new(LayerRegistry::new(vec![
        physical().into_ref(),
        swapper.clone().into_ref(),
    ]));
    let schema = plugin(
        "test",
        vec![Requirement::layer("swap").with_constraint("layer_kind", "swap").optional()],
    );
    let tree = resolver.build_tree(&schema);
    assert_eq!(
        view(&tree),
        vec![TreeView::Node {
            name: "swap".into(),
            optional: true,
            branches: vec![],
        }]
    );

    let mut context = Context::new();
    assert!(resolver.validate_dependencies(&tree, &mut context, &base()));
    assert!(!context.config.contains("plugins.test.swap"));
    assert!(context.memory.is_empty());
    assert!(swapper.constructed().is_empty());
}

// ============================================================================
// Scenario D: the first candidate fails to construct
// ============================================================================

#[test]
fn test_scenario_d_failed_candidate_leaves_nothing_behind() {
    let broken = MockLayerType::new("Broken")
        .with_metadata("layer_kind", "virtual")
        .with_requirement(Requirement::layer("memory_layer").with_constraint("layer_kind", "physical"))
        .failing("corrupt page tables");
    let flat = MockLayerType::new("Flat").with_metadata("layer_kind", "virtual");
    let physical = physical();

    let resolver = DependencyResolver::new(LayerRegistry::new(vec![
        broken.clone().into_ref(),
        flat.clone().into_ref(),
        physical.clone().into_ref(),
    ]));
    let schema = plugin("test", vec![Requirement::layer("primary").with_constraint("layer_kind", "virtual")]);
    let mut context = Context::new();
    context.config.write("plugins.test.primary.memory_layer.location", "/images/memory.raw");

    resolver.resolve(&schema, &mut context, &base()).unwrap();

    // Physical was built for Broken, then rolled back with it
    assert_eq!(physical.constructed(), vec!["memory_layer"]);
    assert_eq!(broken.constructed(), vec!["primary"]);
    assert_eq!(flat.constructed(), vec!["primary"]);
    assert_eq!(context.memory.names(), vec!["primary"]);
    assert!(!context.config.contains("plugins.test.primary.memory_layer"));
    assert_eq!(context.config.get_str("plugins.test.primary"), Some("primary"));
}

// ============================================================================
// Backtracking and failure
// ============================================================================

#[test]
fn test_later_sibling_failure_selects_later_candidate() {
    // Heavy needs a swap layer; Picky cannot coexist with one
    let heavy = MockLayerType::new("Heavy")
        .with_metadata("role", "top")
        .with_requirement(Requirement::layer("swap").with_constraint("role", "swap"));
    let light = MockLayerType::new("Light").with_metadata("role", "top");
    let swap = MockLayerType::new("Swap").with_metadata("role", "swap");
    let picky = MockLayerType::new("Picky")
        .with_metadata("role", "picky")
        .conflicting_with("swap");

    let resolver = DependencyResolver::new(LayerRegistry::new(vec![
        heavy.clone().into_ref(),
        light.clone().into_ref(),
        swap.into_ref(),
        picky.clone().into_ref(),
    ]));
    let schema = plugin(
        "test",
        vec![
            Requirement::layer("primary").with_constraint("role", "top"),
            Requirement::layer("secondary").with_constraint("role", "picky"),
        ],
    );
    let mut context = Context::new();

    resolver.resolve(&schema, &mut context, &base()).unwrap();

    assert_eq!(heavy.constructed(), vec!["primary"]);
    assert_eq!(light.constructed(), vec!["primary"]);
    assert_eq!(picky.constructed(), vec!["secondary", "secondary"]);
    assert_eq!(context.memory.names(), vec!["primary", "secondary"]);
}

#[test]
fn test_unresolvable_tree_leaves_context_unchanged() {
    let resolver = DependencyResolver::new(LayerRegistry::new(vec![
        physical().into_ref(),
        intel32().into_ref(),
    ]));
    let schema = plugin(
        "test",
        vec![
            Requirement::layer("primary").with_constraint("architecture", "intel"),
            Requirement::string("output"),
        ],
    );
    let mut context = Context::new();
    context.config.write("plugins.test.primary.memory_layer.location", "/images/memory.raw");
    context.config.write("plugins.test.primary.page_map_offset", 0x1000);
    context.config.write("plugins.test.primary.location", "/images/memory.raw");
    let before = context.config.clone();

    assert!(resolver.resolve(&schema, &mut context, &base()).is_err());
    assert!(context.memory.is_empty());
    assert_eq!(context.config, before);
}

#[test]
fn test_cyclic_layer_types_terminate() {
    let left = MockLayerType::new("Left")
        .with_metadata("side", "left")
        .with_requirement(Requirement::layer("lower").with_constraint("side", "right"));
    let right = MockLayerType::new("Right")
        .with_metadata("side", "right")
        .with_requirement(Requirement::layer("lower").with_constraint("side", "left"));
    let resolver = DependencyResolver::new(LayerRegistry::new(vec![left.into_ref(), right.into_ref()]));

    let tree = resolver.build_tree(&plugin("test", vec![Requirement::layer("primary")]));
    assert!(tree[0].as_node().unwrap().branches.is_empty());

    let mut context = Context::new();
    assert!(!resolver.validate_dependencies(&tree, &mut context, &base()));
}

#[test]
fn test_resolution_is_deterministic() {
    let resolver = DependencyResolver::new(LayerRegistry::new(vec![
        intel32().into_ref(),
        physical().into_ref(),
    ]));
    let schema = plugin("test", vec![Requirement::layer("primary").with_constraint("layer_kind", "virtual")]);

    let run = || {
        let mut context = Context::new();
        context.config.write("plugins.test.primary.memory_layer.location", "/images/memory.raw");
        context.config.write("plugins.test.primary.page_map_offset", 0x1000);
        resolver.resolve(&schema, &mut context, &base()).unwrap();
        let names: Vec<String> = context.memory.names().into_iter().map(String::from).collect();
        (names, context.config)
    };

    assert_eq!(run(), run());
}

#[test]
fn test_registry_deduplicates_by_name() {
    let registry = LayerRegistry::new(vec![
        physical().into_ref(),
        physical().with_metadata("layer_kind", "other").into_ref(),
        intel32().into_ref(),
    ]);
    assert_eq!(registry.names(), vec!["Physical", "Intel32"]);

    let kinds: Vec<&str> = registry.aggregated_metadata()["layer_kind"]
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(kinds, vec!["physical", "virtual"]);
}

#[test]
fn test_preconfigured_layer_is_honoured() {
    let physical = physical();
    let resolver = DependencyResolver::new(LayerRegistry::new(vec![
        intel32().into_ref(),
        physical.clone().into_ref(),
    ]));
    let schema = plugin("test", vec![Requirement::layer("primary").with_constraint("architecture", "intel")]);
    let mut context = Context::new();
    context.config.write("plugins.test.primary.memory_layer.location", "/images/memory.raw");
    context.config.write("plugins.test.primary.page_map_offset", 0x1000);

    resolver.resolve(&schema, &mut context, &base()).unwrap();
    // Resolving again reuses what the first pass built
    resolver.resolve(&schema, &mut context, &base()).unwrap();

    assert_eq!(context.memory.names(), vec!["memory_layer", "primary"]);
    assert_eq!(physical.constructed().len(), 1);
}
