//! Property tests for transactional resolution

use proptest::prelude::*;
use strata_config::ConfigPath;
use strata_core::{Context, DependencyResolver, LayerRegistry, LayerTypeRef, Requirement};
use strata_test_utils::{MockLayerType, plugin};

/// One scripted candidate: whether it fails, and whether it stacks on a lower layer.
fn candidate(index: usize, fails: bool, stacked: bool) -> LayerTypeRef {
    let mut layer_type = MockLayerType::new(&format!("Candidate{index}")).with_metadata("role", "top");
    if stacked {
        layer_type = layer_type.with_requirement(Requirement::layer("lower").with_constraint("role", "lower"));
    }
    if fails {
        layer_type = layer_type.failing("scripted failure");
    }
    layer_type.into_ref()
}

proptest! {
    #[test]
    fn resolution_is_all_or_nothing(
        outcomes in prop::collection::vec((any::<bool>(), any::<bool>()), 1..6)
    ) {
        let mut types: Vec<LayerTypeRef> = outcomes
            .iter()
            .enumerate()
            .map(|(index, &(fails, stacked))| candidate(index, fails, stacked))
            .collect();
        types.push(MockLayerType::new("Lower").with_metadata("role", "lower").into_ref());
        let resolver = DependencyResolver::new(LayerRegistry::new(types));
        let schema = plugin("test", vec![Requirement::layer("primary").with_constraint("role", "top")]);

        let mut context = Context::new();
        context.config.write("plugins.test.unrelated", "kept");
        let before = context.config.clone();

        let result = resolver.resolve(&schema, &mut context, &ConfigPath::new("plugins.test"));

        match outcomes.iter().find(|(fails, _)| !fails) {
            Some(&(_, stacked)) => {
                prop_assert!(result.is_ok());
                let expected: Vec<&str> = if stacked { vec!["lower", "primary"] } else { vec!["primary"] };
                prop_assert_eq!(context.memory.names(), expected);
                prop_assert_eq!(context.config.get_str("plugins.test.primary"), Some("primary"));
            }
            None => {
                prop_assert!(result.is_err());
                prop_assert!(context.memory.is_empty());
                prop_assert_eq!(&context.config, &before);
            }
        }
    }

    #[test]
    fn instance_names_stay_unique(requests in 1usize..5) {
        let resolver = DependencyResolver::new(LayerRegistry::new(vec![
            MockLayerType::new("Flat").with_metadata("role", "top").into_ref(),
        ]));
        let schema = plugin("test", vec![Requirement::layer("primary")]);
        let mut context = Context::new();

        // Each plugin instance resolves under its own base path
        for request in 0..requests {
            let base = ConfigPath::new(format!("plugins.test{request}"));
            prop_assert!(resolver.resolve(&schema, &mut context, &base).is_ok());
        }

        let names = context.memory.names();
        prop_assert_eq!(names.len(), requests);
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), requests);
    }
}
