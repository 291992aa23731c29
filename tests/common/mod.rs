//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use node_editor_core::{DirtyReason, NodeId, SettingsBackend};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared store behind [`RecordingBackend`] instances.
#[derive(Default)]
pub struct SavedState {
    /// Last whole-document JSON written, if any.
    pub json: Option<String>,
    /// Number of whole-document saves.
    pub saves: usize,
    /// Reasons accumulated over every save call.
    pub reasons: DirtyReason,
    /// Per-node saves with their reasons, in order.
    pub node_saves: Vec<(i64, DirtyReason)>,
    /// Number of begin/end save cycles observed.
    pub cycles: usize,
    /// When set, save calls report failure.
    pub fail_saves: bool,
}

/// Settings backend that records every call, for asserting the save
/// protocol. Clone it to keep a handle on the shared store.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    pub state: Rc<RefCell<SavedState>>,
    /// Document returned by `load`, if any.
    pub preloaded: Option<String>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preloaded(json: String) -> Self {
        Self {
            preloaded: Some(json),
            ..Self::default()
        }
    }

    pub fn saved_json(&self) -> Option<String> {
        self.state.borrow().json.clone()
    }

    pub fn save_count(&self) -> usize {
        self.state.borrow().saves
    }

    pub fn reasons(&self) -> DirtyReason {
        self.state.borrow().reasons
    }

    pub fn set_failing(&self, fail: bool) {
        self.state.borrow_mut().fail_saves = fail;
    }
}

impl SettingsBackend for RecordingBackend {
    fn begin_save(&mut self) {
        self.state.borrow_mut().cycles += 1;
    }

    fn save(&mut self, json: &str, reason: DirtyReason) -> bool {
        let mut state = self.state.borrow_mut();
        if state.fail_saves {
            return false;
        }
        state.json = Some(json.to_string());
        state.saves += 1;
        state.reasons |= reason;
        true
    }

    fn save_node(&mut self, node: NodeId, _json: &str, reason: DirtyReason) -> bool {
        let mut state = self.state.borrow_mut();
        if state.fail_saves {
            return false;
        }
        state.node_saves.push((node.raw(), reason));
        state.reasons |= reason;
        true
    }

    fn load(&mut self) -> Option<String> {
        self.preloaded.clone()
    }
}
