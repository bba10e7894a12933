//! YAML configuration loader for layout constants, id format and user-facing strings.
use std::sync::LazyLock;

use serde::Deserialize;

// ============================================================================
// Engine Configuration
// ============================================================================

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    pub ids: IdConfig,
    pub messages: MessageConfig,
}

/// Spatial constants used by the layout calculator and the session.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Horizontal distance between sibling exchanges (`S`)
    pub branch_spacing: f64,
    /// Vertical distance from a parent to its children (`V`)
    pub vertical_offset: f64,
    pub placeholder_x: f64,
    pub placeholder_y: f64,
    /// Distance from the placeholder down to the first exchange
    pub first_exchange_offset: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IdConfig {
    pub prefix: String,
    pub start: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MessageConfig {
    pub start_failed: String,
    pub branch_failed: String,
}

// ============================================================================
// Loading Functions
// ============================================================================

/// Decode an embedded YAML file. Panics with the file name on malformed input.
pub fn parse_yaml<T: for<'de> Deserialize<'de>>(name: &str, content: &str) -> T {
    serde_yaml::from_str(content).unwrap_or_else(|e| panic!("Failed to parse {}: {}", name, e))
}

// ============================================================================
// Global Configuration (embedded at compile time)
// ============================================================================

pub static ENGINE: LazyLock<EngineConfig> =
    LazyLock::new(|| parse_yaml("engine.yaml", include_str!("../../../yamls/engine.yaml")));

impl Default for LayoutConfig {
    fn default() -> Self {
        ENGINE.layout
    }
}

impl Default for IdConfig {
    fn default() -> Self {
        ENGINE.ids.clone()
    }
}

impl Default for MessageConfig {
    fn default() -> Self {
        ENGINE.messages.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_engine_yaml_parses() {
        let cfg = &*ENGINE;
        assert_eq!(cfg.layout.branch_spacing, 350.0);
        assert_eq!(cfg.layout.vertical_offset, 200.0);
        assert_eq!(cfg.ids.prefix, "t");
        assert_eq!(cfg.ids.start, 0);
    }

    #[test]
    fn parse_yaml_decodes_any_deserializable() {
        let layout: LayoutConfig = parse_yaml(
            "inline.yaml",
            "branch_spacing: 10.0
vertical_offset: 4.0
placeholder_x: 0.0
placeholder_y: 0.0
first_exchange_offset: 2.0
",
        );
        assert_eq!(layout.branch_spacing, 10.0);
        assert_eq!(layout.vertical_offset, 4.0);
    }

    #[test]
    #[should_panic(expected = "Failed to parse broken.yaml")]
    fn parse_yaml_names_the_broken_file() {
        let _: LayoutConfig = parse_yaml("broken.yaml", "branch_spacing: [");
    }

    #[test]
    fn failure_messages_are_distinct() {
        let msgs = MessageConfig::default();
        assert_ne!(msgs.start_failed, msgs.branch_failed);
        assert!(msgs.branch_failed.contains("branch"));
    }
}
