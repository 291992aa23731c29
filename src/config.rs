//! Editor construction-time configuration: persistence backend, input
//! bindings and view behavior.

use crate::object::{NodeId, PinId};
use crate::settings::DirtyReason;
use std::fs;
use std::path::PathBuf;

/// How the view adapts when the host window is resized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CanvasSizeMode {
    /// Scale the view so the same vertical span stays visible.
    #[default]
    FitVerticalView,
    /// Scale the view so the same horizontal span stays visible.
    FitHorizontalView,
    /// Keep zoom; keep the view center fixed.
    CenterOnly,
}

/// Host-side persistence for editor settings.
///
/// All methods have no-op defaults so hosts implement only what they need.
/// `save`/`save_node` return `false` to signal failure; the editor keeps the
/// record dirty and retries next frame.
pub trait SettingsBackend {
    fn begin_save(&mut self) {}

    fn end_save(&mut self) {}

    fn save(&mut self, json: &str, reason: DirtyReason) -> bool {
        let _ = (json, reason);
        true
    }

    fn load(&mut self) -> Option<String> {
        None
    }

    fn save_node(&mut self, node: NodeId, json: &str, reason: DirtyReason) -> bool {
        let _ = (node, json, reason);
        true
    }

    fn load_node(&mut self, node: NodeId) -> Option<String> {
        let _ = node;
        None
    }
}

/// Default backend: one JSON file holding the whole settings document.
pub struct FileSettingsBackend {
    path: PathBuf,
}

impl FileSettingsBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsBackend for FileSettingsBackend {
    fn save(&mut self, json: &str, _reason: DirtyReason) -> bool {
        match fs::write(&self.path, json) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("failed to write settings to {:?}: {err}", self.path);
                false
            }
        }
    }

    fn load(&mut self) -> Option<String> {
        fs::read_to_string(&self.path).ok()
    }
}

/// A link the host is asked to approve.
#[derive(Clone, Copy, Debug)]
pub struct LinkCandidate {
    pub receiver_pin: PinId,
    pub provider_pin: PinId,
    pub receiver_node: NodeId,
    pub provider_node: NodeId,
}

/// Notification that a pin-level link was made or broken.
#[derive(Clone, Copy, Debug)]
pub struct LinkEvent {
    pub receiver_pin: PinId,
    pub provider_pin: PinId,
    pub linked: bool,
}

pub type AcceptLinkFn = Box<dyn Fn(&LinkCandidate) -> bool>;
pub type LinkNotifyFn = Box<dyn FnMut(LinkEvent)>;

/// Configuration passed to [`crate::editor::Editor::new`].
pub struct Config {
    /// Persistence backend; `None` disables load/save entirely.
    pub settings_backend: Option<Box<dyn SettingsBackend>>,
    /// Replacement for the built-in zoom-level table; empty keeps the default.
    pub custom_zoom_levels: Vec<f32>,
    pub canvas_size_mode: CanvasSizeMode,
    /// Mouse button indices: drag, select, navigate, context menu.
    pub drag_button: usize,
    pub select_button: usize,
    pub navigate_button: usize,
    pub context_menu_button: usize,
    /// Multiply zoom by `smooth_zoom_power` per wheel notch instead of
    /// stepping through the zoom-level table.
    pub enable_smooth_zoom: bool,
    pub smooth_zoom_power: f32,
    /// Node-side veto for new pin links.
    pub accept_link: Option<AcceptLinkFn>,
    /// Observer for pin link/unlink events.
    pub link_notify: Option<LinkNotifyFn>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings_backend: None,
            custom_zoom_levels: Vec::new(),
            canvas_size_mode: CanvasSizeMode::default(),
            drag_button: 0,
            select_button: 0,
            navigate_button: 1,
            context_menu_button: 1,
            enable_smooth_zoom: false,
            smooth_zoom_power: default_smooth_zoom_power(),
            accept_link: None,
            link_notify: None,
        }
    }
}

fn default_smooth_zoom_power() -> f32 {
    if cfg!(target_os = "macos") {
        1.1
    } else {
        1.3
    }
}

impl Config {
    /// Configuration persisting to a JSON file at `path`.
    pub fn with_settings_file(path: impl Into<PathBuf>) -> Self {
        Self {
            settings_backend: Some(Box::new(FileSettingsBackend::new(path))),
            ..Self::default()
        }
    }
}
