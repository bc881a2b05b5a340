//! Requirements declared by configurable components

use crate::{Error, Metadata, MetadataValue, Result};
use serde::{Deserialize, Serialize};
use strata_config::ConfigValue;
use strata_layers::Memory;

/// What kind of value a requirement accepts.
///
/// The first four kinds are value requirements and become leaves of a
/// requirement tree. `Layer` requirements become nodes whose branches are
/// the layer types able to fill them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequirementKind {
    Integer,
    String,
    Boolean,
    Choice {
        choices: Vec<String>,
    },
    Layer {
        #[serde(default)]
        constraints: Metadata,
    },
}

/// A named, typed need of a configurable component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(flatten)]
    pub kind: RequirementKind,
}

impl Requirement {
    pub fn new(name: impl Into<String>, kind: RequirementKind) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            optional: false,
            kind,
        }
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, RequirementKind::Integer)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, RequirementKind::String)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, RequirementKind::Boolean)
    }

    pub fn choice<S: Into<String>>(name: impl Into<String>, choices: impl IntoIterator<Item = S>) -> Self {
        Self::new(
            name,
            RequirementKind::Choice {
                choices: choices.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// A layer requirement with no constraints.
    pub fn layer(name: impl Into<String>) -> Self {
        Self::new(
            name,
            RequirementKind::Layer {
                constraints: Metadata::new(),
            },
        )
    }

    /// Add a constraint. Only meaningful on layer requirements.
    pub fn with_constraint(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        if let RequirementKind::Layer { constraints } = &mut self.kind {
            constraints.insert(key.into(), value.into());
        }
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_layer(&self) -> bool {
        matches!(self.kind, RequirementKind::Layer { .. })
    }

    /// Constraints of a layer requirement, `None` for value requirements.
    pub fn constraints(&self) -> Option<&Metadata> {
        match &self.kind {
            RequirementKind::Layer { constraints } => Some(constraints),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            RequirementKind::Integer => "integer",
            RequirementKind::String => "string",
            RequirementKind::Boolean => "boolean",
            RequirementKind::Choice { .. } => "choice",
            RequirementKind::Layer { .. } => "layer",
        }
    }

    /// Check a configured value against this requirement.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` describing why the value was rejected.
    pub fn validate(&self, value: &ConfigValue, memory: &Memory) -> Result<()> {
        let fail = |reason: String| Err(Error::validation(&self.name, reason));
        match &self.kind {
            RequirementKind::Integer if value.is_i64() || value.is_u64() => Ok(()),
            RequirementKind::String | RequirementKind::Choice { .. } | RequirementKind::Layer { .. }
                if !value.is_string() =>
            {
                fail(format!("expected a string, found {value}"))
            }
            RequirementKind::Integer => fail(format!("expected an integer, found {value}")),
            RequirementKind::Boolean if value.is_boolean() => Ok(()),
            RequirementKind::Boolean => fail(format!("expected a boolean, found {value}")),
            RequirementKind::String => Ok(()),
            RequirementKind::Choice { choices } => {
                let chosen = value.as_str().unwrap_or_default();
                if choices.iter().any(|choice| choice == chosen) {
                    Ok(())
                } else {
                    fail(format!("'{chosen}' is not one of {choices:?}"))
                }
            }
            RequirementKind::Layer { .. } => {
                let name = value.as_str().unwrap_or_default();
                if memory.contains(name) {
                    Ok(())
                } else {
                    fail(format!("no layer named '{name}'"))
                }
            }
        }
    }
}
