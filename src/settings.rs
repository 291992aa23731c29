//! In-memory settings and their JSON schema.
//!
//! Three kinds of state are persisted: per-node records (position, size,
//! optional group size), one global record (view scroll/zoom plus the
//! selected object ids), and the id generator counter. Every record carries a
//! dirty bit and a mask of the *reasons* it became dirty; a save callback that
//! fails leaves both untouched so the edit is retried next frame.

use crate::geometry::Vec2;
use crate::object::NodeId;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

bitflags! {
    /// Why a settings record needs saving.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DirtyReason: u32 {
        const NAVIGATION = 1;
        const POSITION = 1 << 1;
        const SIZE = 1 << 2;
        const SELECTION = 1 << 3;
        const ADD_NODE = 1 << 4;
        const REMOVE_NODE = 1 << 5;
        const USER = 1 << 6;
    }
}

/// Parse failures surfaced by [`Settings::from_json`].
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("malformed settings json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("settings document is missing required key `{0}`")]
    MissingKey(&'static str),
}

/// Persisted state of one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeSettings {
    pub location: Vec2,
    pub size: Vec2,
    pub group_size: Option<Vec2>,
    pub dirty: bool,
    pub reason: DirtyReason,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            location: Vec2::ZERO,
            size: Vec2::ZERO,
            group_size: None,
            dirty: false,
            reason: DirtyReason::empty(),
        }
    }
}

/// Persisted view state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewSettings {
    pub scroll: Vec2,
    pub zoom: f32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            scroll: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

/// All persisted editor state plus the dirty-tracking protocol.
#[derive(Debug, Default)]
pub struct Settings {
    nodes: BTreeMap<NodeId, NodeSettings>,
    pub selection: Vec<i64>,
    pub view: ViewSettings,
    /// Seed for editor-generated ids; persisted so ids stay unique across
    /// sessions.
    pub generator_state: u64,
    dirty: bool,
    reason: DirtyReason,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for `node`, created zeroed on first access.
    pub fn node_mut(&mut self, node: NodeId) -> &mut NodeSettings {
        self.nodes.entry(node).or_default()
    }

    pub fn node(&self, node: NodeId) -> Option<&NodeSettings> {
        self.nodes.get(&node)
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn remove_node(&mut self, node: NodeId) {
        self.nodes.remove(&node);
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeSettings)> {
        self.nodes.iter().map(|(&id, record)| (id, record))
    }

    /// Raise `reason` on the global record, or on a node record when given.
    ///
    /// Node-level dirt also marks the global record since the whole document
    /// embeds the node sections.
    pub fn make_dirty(&mut self, reason: DirtyReason, node: Option<NodeId>) {
        if let Some(node) = node {
            let record = self.node_mut(node);
            record.dirty = true;
            record.reason |= reason;
        }
        self.dirty = true;
        self.reason |= reason;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty || self.nodes.values().any(|record| record.dirty)
    }

    pub fn dirty_reason(&self) -> DirtyReason {
        self.reason
    }

    /// Ids of nodes whose records are dirty.
    pub fn dirty_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, record)| record.dirty)
            .map(|(&id, _)| id)
            .collect()
    }

    /// Clear dirt on one node record after a successful save.
    pub fn clear_node_dirty(&mut self, node: NodeId) {
        if let Some(record) = self.nodes.get_mut(&node) {
            record.dirty = false;
            record.reason = DirtyReason::empty();
        }
    }

    /// Clear dirt on the global record after a successful save.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
        self.reason = DirtyReason::empty();
    }

    // === JSON ===

    /// Serialize the whole document.
    pub fn to_json(&self) -> String {
        let doc = SettingsJson {
            nodes: self
                .nodes
                .iter()
                .map(|(id, record)| (id.raw().to_string(), node_to_json(record)))
                .collect(),
            selection: self.selection.clone(),
            view: ViewJson {
                scroll: self.view.scroll,
                zoom: self.view.zoom,
            },
            state: StateJson {
                generator_state: self.generator_state,
            },
        };
        serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".to_string())
    }

    /// Serialize one node record.
    pub fn node_to_json(&self, node: NodeId) -> String {
        let record = self.nodes.get(&node).copied().unwrap_or_default();
        serde_json::to_string(&node_to_json(&record)).unwrap_or_else(|_| "{}".to_string())
    }

    /// Parse a whole document.
    ///
    /// The `nodes` key is required; individual node records that fail to
    /// parse are skipped without failing the rest.
    pub fn from_json(json: &str) -> Result<Settings, SettingsError> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        let nodes_value = value
            .get("nodes")
            .ok_or(SettingsError::MissingKey("nodes"))?;

        let mut settings = Settings::new();

        if let Some(map) = nodes_value.as_object() {
            for (key, node_value) in map {
                let Ok(id) = key.parse::<i64>() else {
                    log::warn!("skipping node settings with non-numeric id {key:?}");
                    continue;
                };
                match serde_json::from_value::<NodeSettingsJson>(node_value.clone()) {
                    Ok(parsed) => {
                        settings.nodes.insert(
                            NodeId::new(id),
                            NodeSettings {
                                location: parsed.location,
                                size: parsed.size.unwrap_or(Vec2::ZERO),
                                group_size: parsed.group_size,
                                dirty: false,
                                reason: DirtyReason::empty(),
                            },
                        );
                    }
                    Err(err) => {
                        log::warn!("skipping malformed settings for node {id}: {err}");
                    }
                }
            }
        }

        if let Some(selection) = value.get("selection").and_then(|v| v.as_array()) {
            settings.selection = selection.iter().filter_map(|v| v.as_i64()).collect();
        }

        if let Some(view) = value.get("view") {
            if let Ok(parsed) = serde_json::from_value::<ViewJson>(view.clone()) {
                settings.view = ViewSettings {
                    scroll: parsed.scroll,
                    zoom: if parsed.zoom > 0.0 { parsed.zoom } else { 1.0 },
                };
            }
        }

        if let Some(state) = value.get("state") {
            if let Some(generator) = state.get("generator_state").and_then(|v| v.as_u64()) {
                settings.generator_state = generator;
            }
        }

        Ok(settings)
    }

    /// Parse a single node record into this settings store.
    pub fn node_from_json(&mut self, node: NodeId, json: &str) -> Result<(), SettingsError> {
        let parsed: NodeSettingsJson = serde_json::from_str(json)?;
        self.nodes.insert(
            node,
            NodeSettings {
                location: parsed.location,
                size: parsed.size.unwrap_or(Vec2::ZERO),
                group_size: parsed.group_size,
                dirty: false,
                reason: DirtyReason::empty(),
            },
        );
        Ok(())
    }
}

fn node_to_json(record: &NodeSettings) -> NodeSettingsJson {
    NodeSettingsJson {
        location: record.location,
        size: Some(record.size),
        group_size: record.group_size,
    }
}

#[derive(Serialize)]
struct SettingsJson {
    nodes: BTreeMap<String, NodeSettingsJson>,
    selection: Vec<i64>,
    view: ViewJson,
    state: StateJson,
}

#[derive(Serialize, Deserialize)]
struct NodeSettingsJson {
    location: Vec2,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group_size: Option<Vec2>,
}

#[derive(Serialize, Deserialize)]
struct ViewJson {
    scroll: Vec2,
    zoom: f32,
}

#[derive(Serialize, Deserialize)]
struct StateJson {
    generator_state: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn populated() -> Settings {
        let mut settings = Settings::new();
        {
            let record = settings.node_mut(NodeId::new(1));
            record.location = Vec2::new(10.0, 20.0);
            record.size = Vec2::new(120.0, 60.0);
        }
        {
            let record = settings.node_mut(NodeId::new(7));
            record.location = Vec2::new(-5.5, 0.25);
            record.size = Vec2::new(200.0, 100.0);
            record.group_size = Some(Vec2::new(180.0, 80.0));
        }
        settings.selection = vec![1, 300];
        settings.view = ViewSettings {
            scroll: Vec2::new(33.0, -44.0),
            zoom: 1.5,
        };
        settings.generator_state = 42;
        settings
    }

    // ========================================================================
    // Dirty protocol
    // ========================================================================

    #[test]
    fn test_new_settings_clean() {
        let settings = Settings::new();
        assert!(!settings.is_dirty());
        assert_eq!(settings.dirty_reason(), DirtyReason::empty());
    }

    #[test]
    fn test_make_dirty_global() {
        let mut settings = Settings::new();
        settings.make_dirty(DirtyReason::NAVIGATION, None);
        assert!(settings.is_dirty());
        assert_eq!(settings.dirty_reason(), DirtyReason::NAVIGATION);
        assert!(settings.dirty_nodes().is_empty());
    }

    #[test]
    fn test_make_dirty_node_marks_global_too() {
        let mut settings = Settings::new();
        settings.make_dirty(DirtyReason::POSITION, Some(NodeId::new(5)));
        assert!(settings.is_dirty());
        assert_eq!(settings.dirty_nodes(), vec![NodeId::new(5)]);
        assert_eq!(
            settings.node(NodeId::new(5)).unwrap().reason,
            DirtyReason::POSITION
        );
    }

    #[test]
    fn test_reasons_accumulate() {
        let mut settings = Settings::new();
        settings.make_dirty(DirtyReason::POSITION, None);
        settings.make_dirty(DirtyReason::SELECTION, None);
        assert_eq!(
            settings.dirty_reason(),
            DirtyReason::POSITION | DirtyReason::SELECTION
        );
    }

    #[test]
    fn test_clear_dirty() {
        let mut settings = Settings::new();
        settings.make_dirty(DirtyReason::SIZE, Some(NodeId::new(2)));
        settings.clear_node_dirty(NodeId::new(2));
        assert!(settings.dirty_nodes().is_empty());
        // Global record is still dirty until cleared separately.
        assert!(settings.is_dirty());
        settings.clear_dirty();
        assert!(!settings.is_dirty());
    }

    // ========================================================================
    // JSON round trip
    // ========================================================================

    #[test]
    fn test_roundtrip_preserves_everything() {
        let settings = populated();
        let json = settings.to_json();
        let loaded = Settings::from_json(&json).expect("roundtrip parse");

        assert_eq!(
            loaded.node(NodeId::new(1)).unwrap().location,
            Vec2::new(10.0, 20.0)
        );
        assert_eq!(
            loaded.node(NodeId::new(1)).unwrap().size,
            Vec2::new(120.0, 60.0)
        );
        assert_eq!(loaded.node(NodeId::new(1)).unwrap().group_size, None);
        assert_eq!(
            loaded.node(NodeId::new(7)).unwrap().group_size,
            Some(Vec2::new(180.0, 80.0))
        );
        assert_eq!(loaded.selection, vec![1, 300]);
        assert_eq!(loaded.view.scroll, Vec2::new(33.0, -44.0));
        assert_eq!(loaded.view.zoom, 1.5);
        assert_eq!(loaded.generator_state, 42);
    }

    #[test]
    fn test_roundtrip_is_clean() {
        let mut settings = populated();
        settings.make_dirty(DirtyReason::USER, Some(NodeId::new(1)));
        let loaded = Settings::from_json(&settings.to_json()).unwrap();
        assert!(!loaded.is_dirty());
    }

    #[test]
    fn test_schema_shape() {
        let settings = populated();
        let value: serde_json::Value = serde_json::from_str(&settings.to_json()).unwrap();
        assert!(value["nodes"]["1"]["location"]["x"].is_number());
        assert!(value["nodes"]["7"]["group_size"]["y"].is_number());
        assert!(value["view"]["scroll"]["x"].is_number());
        assert!(value["view"]["zoom"].is_number());
        assert!(value["selection"].is_array());
        assert_eq!(value["state"]["generator_state"], 42);
    }

    // ========================================================================
    // Tolerant parsing
    // ========================================================================

    #[test]
    fn test_missing_nodes_key_is_error() {
        let err = Settings::from_json("{\"selection\": []}").unwrap_err();
        assert!(matches!(err, SettingsError::MissingKey("nodes")));
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(Settings::from_json("not json").is_err());
    }

    #[test]
    fn test_corrupt_node_record_skipped() {
        let json = r#"{
            "nodes": {
                "1": {"location": {"x": 1.0, "y": 2.0}},
                "2": {"no_location_here": true},
                "not-a-number": {"location": {"x": 0.0, "y": 0.0}}
            }
        }"#;
        let settings = Settings::from_json(json).unwrap();
        assert!(settings.contains_node(NodeId::new(1)));
        assert!(!settings.contains_node(NodeId::new(2)));
        assert_eq!(settings.nodes().count(), 1);
    }

    #[test]
    fn test_missing_optional_keys_default() {
        let json = r#"{"nodes": {"3": {"location": {"x": 5.0, "y": 6.0}}}}"#;
        let settings = Settings::from_json(json).unwrap();
        let record = settings.node(NodeId::new(3)).unwrap();
        assert_eq!(record.location, Vec2::new(5.0, 6.0));
        assert_eq!(record.size, Vec2::ZERO);
        assert_eq!(record.group_size, None);
        assert_eq!(settings.view.zoom, 1.0);
        assert!(settings.selection.is_empty());
    }

    #[test]
    fn test_nonpositive_zoom_sanitized() {
        let json = r#"{"nodes": {}, "view": {"scroll": {"x": 0.0, "y": 0.0}, "zoom": -2.0}}"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.view.zoom, 1.0);
    }

    #[test]
    fn test_node_record_roundtrip() {
        let mut settings = Settings::new();
        {
            let record = settings.node_mut(NodeId::new(9));
            record.location = Vec2::new(1.0, 2.0);
            record.size = Vec2::new(3.0, 4.0);
        }
        let json = settings.node_to_json(NodeId::new(9));

        let mut other = Settings::new();
        other.node_from_json(NodeId::new(9), &json).unwrap();
        assert_eq!(
            other.node(NodeId::new(9)).unwrap().location,
            Vec2::new(1.0, 2.0)
        );
        assert_eq!(other.node(NodeId::new(9)).unwrap().size, Vec2::new(3.0, 4.0));
    }
}
