//! Per-frame input state handed over by the host, plus the editor-side
//! tracking that turns raw button edges into drags and clicks.
//!
//! The editor never talks to an input device; the host samples its own
//! mouse/keyboard state once per frame and passes a [`FrameInput`] to
//! [`crate::editor::Editor::begin`].

use crate::geometry::{Rect, Vec2};
use crate::object::{LinkId, NodeId, ObjectId, PinId};

/// Mouse buttons the editor can be configured to use.
pub const BUTTON_COUNT: usize = 4;

/// Movement below this many screen pixels counts as a click, not a drag.
pub const DRAG_THRESHOLD: f32 = 1.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

/// Keys pressed this frame (edge, not level).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeysPressed {
    pub delete: bool,
    pub f: bool,
    pub space: bool,
    pub x: bool,
    pub c: bool,
    pub v: bool,
    pub d: bool,
}

/// One mouse button's state this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonInput {
    pub down: bool,
    /// Went down this frame.
    pub pressed: bool,
    /// Went up this frame.
    pub released: bool,
    pub double_clicked: bool,
}

/// Everything the editor reads from the host for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    /// Mouse position in screen space.
    pub mouse_pos: Vec2,
    pub buttons: [ButtonInput; BUTTON_COUNT],
    /// Wheel notches this frame; positive is up/away.
    pub wheel: f32,
    pub modifiers: Modifiers,
    pub keys: KeysPressed,
    pub window_focused: bool,
    /// Whether the pointer is over the editor window and not captured by
    /// another widget.
    pub window_hovered: bool,
    pub window_pos: Vec2,
    pub window_size: Vec2,
    /// Seconds since the previous frame.
    pub dt: f32,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            mouse_pos: Vec2::ZERO,
            buttons: [ButtonInput::default(); BUTTON_COUNT],
            wheel: 0.0,
            modifiers: Modifiers::default(),
            keys: KeysPressed::default(),
            window_focused: true,
            window_hovered: true,
            window_pos: Vec2::ZERO,
            window_size: Vec2::new(800.0, 600.0),
            dt: 1.0 / 60.0,
        }
    }
}

impl FrameInput {
    pub fn window_rect(&self) -> Rect {
        Rect::from_min_size(self.window_pos, self.window_size)
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct ButtonTrack {
    down: bool,
    press_pos: Vec2,
    dragging: bool,
    /// Set on the release frame when the press never became a drag.
    clicked: bool,
    /// Set on the release frame when it did.
    drag_released: bool,
}

/// Cross-frame mouse state: which buttons are held, where they were pressed,
/// and whether the press has turned into a drag.
#[derive(Debug, Default)]
pub struct MouseTracker {
    buttons: [ButtonTrack; BUTTON_COUNT],
    mouse_pos: Vec2,
}

impl MouseTracker {
    /// Fold this frame's raw input into the tracked state. Call once, at the
    /// top of the frame.
    pub fn begin_frame(&mut self, input: &FrameInput) {
        self.mouse_pos = input.mouse_pos;
        for (track, button) in self.buttons.iter_mut().zip(input.buttons.iter()) {
            track.clicked = false;
            track.drag_released = false;

            if button.pressed {
                track.down = true;
                track.press_pos = input.mouse_pos;
                track.dragging = false;
            }
            if track.down && !track.dragging {
                if input.mouse_pos.distance(track.press_pos) > DRAG_THRESHOLD {
                    track.dragging = true;
                }
            }
            if button.released {
                if track.down {
                    if track.dragging {
                        track.drag_released = true;
                    } else {
                        track.clicked = true;
                    }
                }
                track.down = false;
                track.dragging = false;
            }
        }
    }

    pub fn is_down(&self, button: usize) -> bool {
        self.buttons.get(button).is_some_and(|b| b.down)
    }

    pub fn is_dragging(&self, button: usize) -> bool {
        self.buttons.get(button).is_some_and(|b| b.dragging)
    }

    /// Pressed-released without crossing the drag threshold, this frame.
    pub fn clicked(&self, button: usize) -> bool {
        self.buttons.get(button).is_some_and(|b| b.clicked)
    }

    /// A drag ended this frame.
    pub fn drag_released(&self, button: usize) -> bool {
        self.buttons.get(button).is_some_and(|b| b.drag_released)
    }

    pub fn press_pos(&self, button: usize) -> Vec2 {
        self.buttons
            .get(button)
            .map(|b| b.press_pos)
            .unwrap_or(Vec2::ZERO)
    }

    /// Screen-space delta from the press position to the pointer.
    pub fn drag_delta(&self, button: usize) -> Vec2 {
        self.mouse_pos - self.press_pos(button)
    }
}

/// The frame's resolved pointer targets: at most one hot, active, clicked and
/// double-clicked object, plus the background fallbacks.
#[derive(Clone, Copy, Debug, Default)]
pub struct Control {
    pub hot: Option<ObjectId>,
    pub active: Option<ObjectId>,
    pub clicked: Option<ObjectId>,
    /// Button index of the object click, when `clicked` is set.
    pub clicked_button: Option<usize>,
    pub double_clicked: Option<ObjectId>,
    pub background_hot: bool,
    /// Button index of a background click this frame.
    pub background_clicked: Option<usize>,
    pub background_double_clicked: Option<usize>,
}

impl Control {
    pub fn hot_node(&self) -> Option<NodeId> {
        self.hot.and_then(ObjectId::as_node)
    }

    pub fn hot_pin(&self) -> Option<PinId> {
        self.hot.and_then(ObjectId::as_pin)
    }

    pub fn hot_link(&self) -> Option<LinkId> {
        self.hot.and_then(ObjectId::as_link)
    }

    pub fn double_clicked_node(&self) -> Option<NodeId> {
        self.double_clicked.and_then(ObjectId::as_node)
    }

    pub fn double_clicked_pin(&self) -> Option<PinId> {
        self.double_clicked.and_then(ObjectId::as_pin)
    }

    pub fn double_clicked_link(&self) -> Option<LinkId> {
        self.double_clicked.and_then(ObjectId::as_link)
    }
}

/// Mouse cursor the host should show this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorKind {
    #[default]
    Arrow,
    ResizeHorizontal,
    ResizeVertical,
    ResizeDiagonalNwSe,
    ResizeDiagonalNeSw,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(button: usize, at: Vec2) -> FrameInput {
        let mut input = FrameInput {
            mouse_pos: at,
            ..Default::default()
        };
        input.buttons[button].down = true;
        input.buttons[button].pressed = true;
        input
    }

    fn hold(button: usize, at: Vec2) -> FrameInput {
        let mut input = FrameInput {
            mouse_pos: at,
            ..Default::default()
        };
        input.buttons[button].down = true;
        input
    }

    fn release(button: usize, at: Vec2) -> FrameInput {
        let mut input = FrameInput {
            mouse_pos: at,
            ..Default::default()
        };
        input.buttons[button].released = true;
        input
    }

    // ========================================================================
    // Click vs drag classification
    // ========================================================================

    #[test]
    fn test_click_without_motion() {
        let mut tracker = MouseTracker::default();
        tracker.begin_frame(&press(0, Vec2::new(10.0, 10.0)));
        assert!(tracker.is_down(0));
        assert!(!tracker.is_dragging(0));

        tracker.begin_frame(&release(0, Vec2::new(10.0, 10.0)));
        assert!(tracker.clicked(0));
        assert!(!tracker.drag_released(0));
        assert!(!tracker.is_down(0));
    }

    #[test]
    fn test_drag_crosses_threshold() {
        let mut tracker = MouseTracker::default();
        tracker.begin_frame(&press(0, Vec2::new(10.0, 10.0)));
        tracker.begin_frame(&hold(0, Vec2::new(30.0, 10.0)));
        assert!(tracker.is_dragging(0));
        assert_eq!(tracker.drag_delta(0), Vec2::new(20.0, 0.0));

        tracker.begin_frame(&release(0, Vec2::new(30.0, 10.0)));
        assert!(!tracker.clicked(0));
        assert!(tracker.drag_released(0));
    }

    #[test]
    fn test_sub_threshold_motion_is_still_click() {
        let mut tracker = MouseTracker::default();
        tracker.begin_frame(&press(1, Vec2::new(10.0, 10.0)));
        tracker.begin_frame(&hold(1, Vec2::new(10.5, 10.0)));
        assert!(!tracker.is_dragging(1));
        tracker.begin_frame(&release(1, Vec2::new(10.5, 10.0)));
        assert!(tracker.clicked(1));
    }

    #[test]
    fn test_click_flags_last_one_frame() {
        let mut tracker = MouseTracker::default();
        tracker.begin_frame(&press(0, Vec2::ZERO));
        tracker.begin_frame(&release(0, Vec2::ZERO));
        assert!(tracker.clicked(0));
        tracker.begin_frame(&FrameInput::default());
        assert!(!tracker.clicked(0));
    }

    #[test]
    fn test_buttons_tracked_independently() {
        let mut tracker = MouseTracker::default();
        tracker.begin_frame(&press(0, Vec2::new(5.0, 5.0)));
        let mut input = hold(0, Vec2::new(50.0, 5.0));
        input.buttons[1].down = true;
        input.buttons[1].pressed = true;
        tracker.begin_frame(&input);

        assert!(tracker.is_dragging(0));
        assert!(!tracker.is_dragging(1));
        assert_eq!(tracker.press_pos(1), Vec2::new(50.0, 5.0));
    }

    #[test]
    fn test_out_of_range_button_is_inert() {
        let tracker = MouseTracker::default();
        assert!(!tracker.is_down(17));
        assert!(!tracker.clicked(17));
    }

    // ========================================================================
    // Control helpers
    // ========================================================================

    #[test]
    fn test_control_typed_accessors() {
        let control = Control {
            hot: Some(ObjectId::Pin(PinId::new(5))),
            double_clicked: Some(ObjectId::Node(NodeId::new(2))),
            ..Default::default()
        };
        assert_eq!(control.hot_pin(), Some(PinId::new(5)));
        assert_eq!(control.hot_node(), None);
        assert_eq!(control.double_clicked_node(), Some(NodeId::new(2)));
        assert_eq!(control.double_clicked_link(), None);
    }
}
