//! Interaction actions: their state, the arbitration order, and the pure
//! helpers they share (zoom-level matching, grid snapping).
//!
//! At most one action is *current* at a time. Every frame the editor asks the
//! current action to continue processing, or, when none is current, offers
//! the frame to each action in [`ACTION_PRIORITY`] order. An action may also
//! answer `Possible`: it wants the cursor (e.g. a resize arrow over a group
//! border) without claiming input. The behavior lives on
//! [`crate::editor::Editor`]; this module owns the data.

use crate::animation::{NavigateAnimation, Timeline};
use crate::geometry::{Rect, RectRegion, Vec2};
use crate::object::{LinkId, NodeId, ObjectId, PinId};

/// Discrete zoom levels stepped through by the mouse wheel.
pub const ZOOM_LEVELS: [f32; 18] = [
    0.1, 0.15, 0.2, 0.25, 0.33, 0.5, 0.75, 1.0, 1.25, 1.5, 2.0, 2.5, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0,
];

/// Node drag snapping grid, in canvas pixels.
pub const SNAP_GRID: f32 = 16.0;

/// Fraction of the visible area kept free around navigated-to content.
pub const NAVIGATION_ZOOM_MARGIN: f32 = 0.1;

/// How long the released rubber band fades out, in seconds.
pub const SELECTION_FADE_OUT_DURATION: f32 = 0.15;

/// Step `steps` notches through the zoom table from `zoom`.
///
/// An off-table zoom first snaps to the nearest level in the step direction;
/// the result is always clamped to the table range.
pub fn next_zoom(zoom: f32, steps: i32, levels: &[f32]) -> f32 {
    if levels.is_empty() || steps == 0 {
        return zoom;
    }

    let mut nearest = 0;
    let mut nearest_distance = f32::MAX;
    for (i, &level) in levels.iter().enumerate() {
        let distance = (level - zoom).abs();
        if distance < nearest_distance {
            nearest_distance = distance;
            nearest = i;
        }
    }

    if nearest_distance > 1e-3 {
        // Off the table: move to the adjacent level in the step direction,
        // consuming one step.
        let target = if steps > 0 {
            levels
                .iter()
                .position(|&level| level > zoom)
                .unwrap_or(levels.len() - 1)
        } else {
            levels
                .iter()
                .rposition(|&level| level < zoom)
                .unwrap_or(0)
        };
        let remaining = steps + if steps > 0 { -1 } else { 1 };
        return next_zoom(levels[target], remaining, levels);
    }

    let index = (nearest as i64 + steps as i64).clamp(0, levels.len() as i64 - 1) as usize;
    levels[index]
}

/// Snap drag offset so the best-aligned pin pivot lands on the grid.
///
/// `pivot_centers` are the primary node's pivot centers at the *unsnapped*
/// candidate position. Each axis independently picks the pivot with the
/// smallest snap correction.
pub fn snap_offset(pivot_centers: &[Vec2], grid: f32) -> Vec2 {
    let mut best = Vec2::ZERO;
    let mut best_abs = Vec2::splat(f32::MAX);
    for &center in pivot_centers {
        let snapped = Vec2::new(
            (center.x / grid).round() * grid,
            (center.y / grid).round() * grid,
        );
        let delta = snapped - center;
        if delta.x.abs() < best_abs.x {
            best_abs.x = delta.x.abs();
            best.x = delta.x;
        }
        if delta.y.abs() < best_abs.y {
            best_abs.y = delta.y.abs();
            best.y = delta.y;
        }
    }
    if pivot_centers.is_empty() {
        Vec2::ZERO
    } else {
        best
    }
}

/// The mutually exclusive interaction modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Navigate,
    ContextMenu,
    Shortcut,
    Size,
    Drag,
    Select,
    CreateItem,
    DeleteItems,
}

/// Arbitration order: first acceptor wins.
pub const ACTION_PRIORITY: [ActionKind; 8] = [
    ActionKind::Navigate,
    ActionKind::ContextMenu,
    ActionKind::Shortcut,
    ActionKind::Size,
    ActionKind::Drag,
    ActionKind::Select,
    ActionKind::CreateItem,
    ActionKind::DeleteItems,
];

/// Answer of an action's acceptance probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcceptResult {
    True,
    False,
    /// Not claiming input, but wants to set the cursor.
    Possible,
}

// === Per-action state ===

#[derive(Debug, Default)]
pub struct NavigateState {
    pub active: bool,
    pub scroll_start: Vec2,
    pub animation: Option<NavigateAnimation>,
}

#[derive(Debug, Default)]
pub struct SizeState {
    pub active: bool,
    pub node: Option<NodeId>,
    pub region: Option<RectRegion>,
    pub start_bounds: Rect,
    pub start_group_bounds: Rect,
    /// Cleared for one frame when the rect snapped to its minimum, so the
    /// next frame keeps tracking the pointer.
    pub stable: bool,
}

#[derive(Debug, Default)]
pub struct DragState {
    pub active: bool,
    /// Primary node: the one the drag started on; snapping follows its pins.
    pub primary: Option<NodeId>,
    pub nodes: Vec<NodeId>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectMode {
    #[default]
    Nodes,
    Groups,
    Links,
}

#[derive(Debug, Default)]
pub struct SelectState {
    pub active: bool,
    /// Canvas-space anchor where the rubber band started.
    pub start: Vec2,
    pub rect: Rect,
    pub mode: SelectMode,
    /// Selection as it was before the drag, for the Ctrl XOR merge.
    pub initial: Vec<ObjectId>,
    pub xor_merge: bool,
    pub fade: Timeline,
    pub fade_rect: Rect,
}

/// What a context-menu click landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextMenuTarget {
    Node(NodeId),
    Pin(PinId),
    Link(LinkId),
    Background,
}

#[derive(Debug, Default)]
pub struct ContextMenuState {
    /// Stays pending until the host consumes it via a show query.
    pub pending: Option<ContextMenuTarget>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShortcutKind {
    Cut,
    Copy,
    Paste,
    Duplicate,
    CreateNode,
}

#[derive(Debug, Default)]
pub struct ShortcutState {
    pub active: Option<ShortcutKind>,
    pub context_nodes: Vec<NodeId>,
    pub context_links: Vec<LinkId>,
    pub in_block: bool,
}

/// Create-item state machine stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CreateStage {
    #[default]
    None,
    /// Dragging from a pin; candidate updates every frame.
    Possible,
    /// Host accepted a new-node query and is placing the node.
    Create,
}

/// Which query the host answered last inside a create block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreateQuery {
    Link,
    Node,
}

#[derive(Debug, Default)]
pub struct CreateState {
    pub stage: CreateStage,
    pub origin_pin: Option<PinId>,
    /// Pin under the pointer, compatible or not; compatibility is judged at
    /// accept time.
    pub candidate_pin: Option<PinId>,
    pub in_block: bool,
    pub last_query: Option<CreateQuery>,
    /// Candidate-link visuals passed to `begin_create`.
    pub color: crate::draw_list::Color,
    pub thickness: f32,
}

impl CreateState {
    pub fn reset(&mut self) {
        self.stage = CreateStage::None;
        self.origin_pin = None;
        self.candidate_pin = None;
        self.last_query = None;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteCandidate {
    Link(LinkId),
    Node(NodeId),
}

#[derive(Debug, Default)]
pub struct DeleteState {
    /// Links queued for deletion; always served before nodes.
    pub link_queue: Vec<LinkId>,
    pub node_queue: Vec<NodeId>,
    pub in_block: bool,
    /// Candidate currently offered to the host.
    pub current: Option<DeleteCandidate>,
}

impl DeleteState {
    pub fn queue_link(&mut self, link: LinkId) {
        if !self.link_queue.contains(&link) {
            self.link_queue.push(link);
        }
    }

    pub fn queue_node(&mut self, node: NodeId) {
        if !self.node_queue.contains(&node) {
            self.node_queue.push(node);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.link_queue.is_empty() && self.node_queue.is_empty()
    }
}
