//! Dotted configuration paths

use serde::{Deserialize, Serialize};

/// Separator between configuration path components.
pub const SEPARATOR: char = '.';

/// A normalized, dot-separated configuration path.
///
/// Empty components are dropped on construction, so `".a..b."` and `"a.b"`
/// name the same location. The empty path is the root of the namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ConfigPath {
    inner: String,
}

impl ConfigPath {
    /// Create a new path, normalizing separators.
    pub fn new(path: impl AsRef<str>) -> Self {
        let inner = path
            .as_ref()
            .split(SEPARATOR)
            .filter(|component| !component.is_empty())
            .collect::<Vec<_>>()
            .join(&SEPARATOR.to_string());
        Self { inner }
    }

    /// The root of the namespace.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn is_root(&self) -> bool {
        self.inner.is_empty()
    }

    /// Join this path with a (possibly dotted) segment.
    pub fn join(&self, segment: impl AsRef<str>) -> Self {
        let segment = Self::new(segment);
        if self.is_root() {
            segment
        } else if segment.is_root() {
            self.clone()
        } else {
            Self {
                inner: format!("{}{}{}", self.inner, SEPARATOR, segment.inner),
            }
        }
    }

    /// Get the parent path, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.inner.rfind(SEPARATOR) {
            Some(idx) => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            None => Some(Self::root()),
        }
    }

    /// Last component of the path.
    pub fn name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.inner.rsplit(SEPARATOR).next()
        }
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.inner.split(SEPARATOR).filter(|c| !c.is_empty())
    }

    /// Component-wise prefix test; `a.b` is not a prefix of `a.bc`.
    pub fn starts_with(&self, prefix: &ConfigPath) -> bool {
        self.strip_prefix(prefix).is_some()
    }

    /// The remainder of this path below `prefix`.
    pub fn strip_prefix(&self, prefix: &ConfigPath) -> Option<ConfigPath> {
        if prefix.is_root() {
            return Some(self.clone());
        }
        let rest = self.inner.strip_prefix(prefix.as_str())?;
        if rest.is_empty() {
            Some(Self::root())
        } else {
            rest.strip_prefix(SEPARATOR).map(|rest| Self {
                inner: rest.to_string(),
            })
        }
    }
}

impl std::fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl AsRef<str> for ConfigPath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl From<&str> for ConfigPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ConfigPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&ConfigPath> for ConfigPath {
    fn from(p: &ConfigPath) -> Self {
        p.clone()
    }
}

impl From<ConfigPath> for String {
    fn from(p: ConfigPath) -> Self {
        p.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a.b.c", "a.b.c")]
    #[case(".a..b.", "a.b")]
    #[case("", "")]
    #[case("...", "")]
    fn test_normalization(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(ConfigPath::new(input).as_str(), expected);
    }

    #[test]
    fn test_join_from_root() {
        let path = ConfigPath::root().join("plugin");
        assert_eq!(path.as_str(), "plugin");
        assert_eq!(path.join("primary.location").as_str(), "plugin.primary.location");
        assert_eq!(path.join(""), path);
    }

    #[test]
    fn test_parent_and_name() {
        let path = ConfigPath::new("plugin.primary.memory_layer");
        assert_eq!(path.name(), Some("memory_layer"));
        assert_eq!(path.parent().unwrap().as_str(), "plugin.primary");
        assert_eq!(ConfigPath::new("plugin").parent(), Some(ConfigPath::root()));
        assert_eq!(ConfigPath::root().parent(), None);
        assert_eq!(ConfigPath::root().name(), None);
    }

    #[test]
    fn test_prefix_is_component_wise() {
        let path = ConfigPath::new("plugin.primary2.location");
        assert!(path.starts_with(&ConfigPath::new("plugin")));
        assert!(!path.starts_with(&ConfigPath::new("plugin.primary")));
        assert_eq!(
            path.strip_prefix(&ConfigPath::new("plugin.primary2")),
            Some(ConfigPath::new("location"))
        );
        assert_eq!(path.strip_prefix(&path), Some(ConfigPath::root()));
    }
}
