//! Configuration for the layout engine

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Deserializer};

bitflags! {
    /// Direct-resolution passes that may bypass the general solver
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Optimizations: u32 {
        /// Resolve widgets whose edges follow arithmetically from resolved anchors
        const DIRECT = 1;
        /// Resolve barriers whose references are all resolved
        const BARRIER = 1 << 1;
        /// Lay out simple chains without solver rows
        const CHAINS = 1 << 2;
        /// Skip the solver for wrap containers whose children all resolve directly
        const GROUPING = 1 << 3;
        const STANDARD = Self::DIRECT.bits() | Self::BARRIER.bits() | Self::CHAINS.bits();
    }
}

impl Optimizations {
    pub const NONE: Optimizations = Optimizations::empty();

    /// Parse one flag name as used in scene files and on the command line
    pub fn from_name(name: &str) -> Option<Optimizations> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Optimizations::NONE),
            "direct" => Some(Optimizations::DIRECT),
            "barrier" => Some(Optimizations::BARRIER),
            "chains" => Some(Optimizations::CHAINS),
            "grouping" => Some(Optimizations::GROUPING),
            "standard" => Some(Optimizations::STANDARD),
            _ => None,
        }
    }
}

impl Default for Optimizations {
    fn default() -> Self {
        Optimizations::STANDARD
    }
}

impl<'de> Deserialize<'de> for Optimizations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        Optimizations::try_from(names).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Vec<String>> for Optimizations {
    type Error = String;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        names.iter().try_fold(Optimizations::NONE, |acc, name| {
            Optimizations::from_name(name)
                .map(|flag| acc | flag)
                .ok_or_else(|| format!("unknown optimization '{}'", name))
        })
    }
}

impl fmt::Display for Optimizations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (Optimizations::DIRECT, "direct"),
            (Optimizations::BARRIER, "barrier"),
            (Optimizations::CHAINS, "chains"),
            (Optimizations::GROUPING, "grouping"),
        ]
        .iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| *name)
        .collect();
        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

/// Configuration options for layout computation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Optional direct-resolution passes
    pub optimizations: Optimizations,

    /// Skip the equality that ties a barrier to a gone reference
    pub relax_gone_in_barriers: bool,

    /// Compile widgets after the widgets they depend on, instead of in child order
    pub dependency_ordering: bool,

    /// Cap on solver passes per container while wrap sizes grow
    pub max_iterations: usize,

    /// Right-to-left: horizontal chains are headed by their last widget
    pub rtl: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            optimizations: Optimizations::STANDARD,
            relax_gone_in_barriers: true,
            dependency_ordering: false,
            max_iterations: 8,
            rtl: false,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the enabled optimizations
    pub fn with_optimizations(mut self, optimizations: Optimizations) -> Self {
        self.optimizations = optimizations;
        self
    }

    pub fn with_relax_gone_in_barriers(mut self, relax: bool) -> Self {
        self.relax_gone_in_barriers = relax;
        self
    }

    pub fn with_dependency_ordering(mut self, enabled: bool) -> Self {
        self.dependency_ordering = enabled;
        self
    }

    /// Set the iteration cap; at least one pass always runs
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations.max(1);
        self
    }

    pub fn with_rtl(mut self, rtl: bool) -> Self {
        self.rtl = rtl;
        self
    }

    pub(crate) fn optimizes(&self, flag: Optimizations) -> bool {
        self.optimizations.contains(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LayoutConfig::default();
        assert_eq!(config.optimizations, Optimizations::STANDARD);
        assert_eq!(config.max_iterations, 8);
        assert!(config.relax_gone_in_barriers);
        assert!(!config.rtl);
    }

    #[test]
    fn test_builder_pattern() {
        let config = LayoutConfig::new()
            .with_optimizations(Optimizations::NONE)
            .with_max_iterations(0)
            .with_rtl(true);

        assert!(config.optimizations.is_empty());
        assert_eq!(config.max_iterations, 1);
        assert!(config.rtl);
    }

    #[test]
    fn test_standard_flags() {
        let standard = Optimizations::STANDARD;
        assert!(standard.contains(Optimizations::DIRECT));
        assert!(standard.contains(Optimizations::CHAINS));
        assert!(!standard.contains(Optimizations::GROUPING));
        assert_eq!(standard.to_string(), "direct|barrier|chains");
        assert_eq!(Optimizations::NONE.to_string(), "none");
    }

    #[test]
    fn test_flags_from_names() {
        let parsed = Optimizations::try_from(vec!["direct".to_string(), "Grouping".to_string()]);
        assert_eq!(parsed, Ok(Optimizations::DIRECT | Optimizations::GROUPING));
        assert!(Optimizations::try_from(vec!["fast".to_string()]).is_err());
    }

    #[test]
    fn test_flags_from_bits() {
        assert_eq!(
            Optimizations::from_bits(0b1111),
            Some(Optimizations::STANDARD | Optimizations::GROUPING)
        );
        assert_eq!(Optimizations::from_bits(1 << 7), None);
        let mut flags = Optimizations::STANDARD;
        flags.remove(Optimizations::CHAINS);
        assert_eq!(flags.to_string(), "direct|barrier");
    }

    #[test]
    fn test_unknown_flag_in_table_is_rejected() {
        let parsed: Result<LayoutConfig, _> = toml::from_str(r#"optimizations = ["direct", "fast"]"#);
        let message = parsed.unwrap_err().to_string();
        assert!(message.contains("unknown optimization 'fast'"), "{}", message);
    }

    #[test]
    fn test_deserialize_partial_table() {
        let config: LayoutConfig = toml::from_str(
            r#"
            optimizations = ["none"]
            rtl = true
            "#,
        )
        .unwrap();
        assert!(config.optimizations.is_empty());
        assert!(config.rtl);
        assert_eq!(config.max_iterations, 8);
    }
}
