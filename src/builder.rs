//! Frame-scoped builders bracketing node and pin submission.
//!
//! `begin_node`/`end_node` and `begin_pin`/`end_pin` on the editor form a
//! stack of builder frames; each `begin` pushes and each `end` pops and
//! validates the match. The state itself lives here so the editor methods
//! stay thin.

use crate::geometry::{Rect, Vec2};
use crate::style::Style;

/// Pivot layout overrides collected between `begin_pin` and `end_pin`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PivotOverrides {
    pub rect: Option<Rect>,
    pub alignment: Option<Vec2>,
    pub size: Option<Vec2>,
    pub scale: Option<Vec2>,
}

/// State of the node currently being built, if any.
#[derive(Debug, Default)]
pub struct NodeBuilderState {
    /// Arena index of the node under construction.
    pub node: Option<usize>,
    /// Arena index of the pin under construction.
    pub pin: Option<usize>,
    /// Editor-space origin the host lays content out from.
    pub origin: Vec2,
    /// Union of everything submitted into the node this frame.
    pub content_bounds: Rect,
    /// Bounds reported for the current pin.
    pub pin_rect: Option<Rect>,
    pub pivot: PivotOverrides,
    /// Interior size requested by a `group` call.
    pub group_size: Option<Vec2>,
    /// Node size measured last frame, to detect changes.
    pub previous_size: Vec2,
}

impl NodeBuilderState {
    pub fn in_node(&self) -> bool {
        self.node.is_some()
    }

    pub fn in_pin(&self) -> bool {
        self.pin.is_some()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn reset_pin(&mut self) {
        self.pin = None;
        self.pin_rect = None;
        self.pivot = PivotOverrides::default();
    }

    /// Fold an item rectangle into the node's measured content.
    pub fn add_item_rect(&mut self, rect: Rect) {
        self.content_bounds = if self.content_bounds == Rect::NOTHING {
            rect
        } else {
            self.content_bounds.union(rect)
        };
    }
}

/// Resolve a pin's pivot rectangle from its bounds, style defaults and any
/// overrides the host issued.
pub fn resolve_pivot(bounds: Rect, style: &Style, overrides: &PivotOverrides) -> Rect {
    if let Some(rect) = overrides.rect {
        return rect;
    }
    let alignment = overrides.alignment.unwrap_or(style.pivot_alignment);
    let scale = overrides.scale.unwrap_or(style.pivot_scale);
    let size = overrides.size.unwrap_or(style.pivot_size);

    let anchor = bounds.min + bounds.size().scale(alignment);
    Rect::from_center_size(anchor, size.scale(scale))
}

/// Group-hint overlay state; active only while zoomed far enough out.
#[derive(Debug, Default)]
pub struct HintState {
    /// Arena index of the hinted group node.
    pub node: Option<usize>,
}

/// Zoom below which group hints appear.
pub const HINT_ZOOM_THRESHOLD: f32 = 0.75;
/// Zoom at which group hints are fully opaque.
pub const HINT_ZOOM_OPAQUE: f32 = 0.5;

/// Hint opacity for a zoom level: 0 at the threshold, 1 from the opaque
/// level down.
pub fn hint_alpha(zoom: f32) -> f32 {
    if zoom >= HINT_ZOOM_THRESHOLD {
        return 0.0;
    }
    ((HINT_ZOOM_THRESHOLD - zoom) / (HINT_ZOOM_THRESHOLD - HINT_ZOOM_OPAQUE)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Content measurement
    // ========================================================================

    #[test]
    fn test_add_item_rect_unions() {
        let mut state = NodeBuilderState {
            content_bounds: Rect::NOTHING,
            ..Default::default()
        };
        state.add_item_rect(Rect::from_min_size(Vec2::ZERO, Vec2::new(10.0, 10.0)));
        state.add_item_rect(Rect::from_min_size(Vec2::new(50.0, 5.0), Vec2::new(10.0, 10.0)));
        assert_eq!(state.content_bounds.min, Vec2::ZERO);
        assert_eq!(state.content_bounds.max, Vec2::new(60.0, 15.0));
    }

    #[test]
    fn test_reset_pin_keeps_node_state() {
        let mut state = NodeBuilderState {
            node: Some(3),
            pin: Some(7),
            pin_rect: Some(Rect::from_min_size(Vec2::ZERO, Vec2::new(5.0, 5.0))),
            ..Default::default()
        };
        state.pivot.alignment = Some(Vec2::new(1.0, 0.5));
        state.reset_pin();
        assert_eq!(state.node, Some(3));
        assert!(state.pin.is_none());
        assert!(state.pin_rect.is_none());
        assert!(state.pivot.alignment.is_none());
    }

    // ========================================================================
    // Pivot resolution
    // ========================================================================

    #[test]
    fn test_resolve_pivot_default_is_center_point() {
        let style = Style::default();
        let bounds = Rect::from_min_size(Vec2::new(10.0, 20.0), Vec2::new(20.0, 10.0));
        let pivot = resolve_pivot(bounds, &style, &PivotOverrides::default());
        // Default alignment (0.5, 0.5), size (0, 0): a point at the center.
        assert_eq!(pivot.center(), Vec2::new(20.0, 25.0));
        assert_eq!(pivot.size(), Vec2::ZERO);
    }

    #[test]
    fn test_resolve_pivot_explicit_rect_wins() {
        let style = Style::default();
        let explicit = Rect::from_min_size(Vec2::new(100.0, 100.0), Vec2::new(4.0, 4.0));
        let overrides = PivotOverrides {
            rect: Some(explicit),
            alignment: Some(Vec2::ZERO),
            ..Default::default()
        };
        let bounds = Rect::from_min_size(Vec2::ZERO, Vec2::new(20.0, 10.0));
        assert_eq!(resolve_pivot(bounds, &style, &overrides), explicit);
    }

    #[test]
    fn test_resolve_pivot_alignment_and_size() {
        let style = Style::default();
        let bounds = Rect::from_min_size(Vec2::ZERO, Vec2::new(20.0, 10.0));
        let overrides = PivotOverrides {
            alignment: Some(Vec2::new(1.0, 0.5)),
            size: Some(Vec2::new(8.0, 8.0)),
            ..Default::default()
        };
        let pivot = resolve_pivot(bounds, &style, &overrides);
        assert_eq!(pivot.center(), Vec2::new(20.0, 5.0));
        assert_eq!(pivot.size(), Vec2::new(8.0, 8.0));
    }

    #[test]
    fn test_resolve_pivot_scale_applies_to_size() {
        let style = Style::default();
        let bounds = Rect::from_min_size(Vec2::ZERO, Vec2::new(20.0, 10.0));
        let overrides = PivotOverrides {
            size: Some(Vec2::new(4.0, 4.0)),
            scale: Some(Vec2::new(2.0, 3.0)),
            ..Default::default()
        };
        let pivot = resolve_pivot(bounds, &style, &overrides);
        assert_eq!(pivot.size(), Vec2::new(8.0, 12.0));
    }

    // ========================================================================
    // Hints
    // ========================================================================

    #[test]
    fn test_hint_alpha_ramp() {
        assert_eq!(hint_alpha(1.0), 0.0);
        assert_eq!(hint_alpha(0.75), 0.0);
        assert!(hint_alpha(0.6) > 0.0 && hint_alpha(0.6) < 1.0);
        assert_eq!(hint_alpha(0.5), 1.0);
        assert_eq!(hint_alpha(0.2), 1.0);
    }
}
