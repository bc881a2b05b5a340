//! Constraint matching between layer types and layer requirements

use crate::{LayerType, MetadataValue, Requirement};

/// Whether `layer_type` may fill `requirement`.
///
/// Value requirements are never satisfied by a layer type. For a layer
/// requirement, each constraint whose key the layer type's metadata also
/// carries must hold; keys the layer type does not mention are ignored.
///
/// - a single required value must equal the layer's value
/// - a list of values excludes them: the layer's value must not be one
///
/// A list-valued layer attribute neither equals a single value nor is a
/// member of a list.
pub fn satisfies(layer_type: &dyn LayerType, requirement: &Requirement) -> bool {
    let Some(constraints) = requirement.constraints() else {
        return false;
    };
    let metadata = layer_type.metadata();

    constraints.iter().all(|(key, required)| {
        let Some(actual) = metadata.get(key) else {
            return true;
        };
        match (required, actual) {
            (MetadataValue::One(want), MetadataValue::One(have)) => want == have,
            (MetadataValue::One(_), MetadataValue::Many(_)) => false,
            (MetadataValue::Many(excluded), MetadataValue::One(have)) => !excluded.contains(have),
            (MetadataValue::Many(_), MetadataValue::Many(_)) => true,
        }
    })
}
