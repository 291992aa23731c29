//! Time-driven animations: view navigation and link flow pulses.
//!
//! All animations advance at exactly one point inside the frame; nothing here
//! owns a clock.

use crate::bezier::CubicBezier;
use crate::draw_list::DrawList;
use crate::geometry::{ease_out_quad, Vec2};
use crate::object::LinkId;
use crate::style::{Style, StyleColor};

/// Shared play/update/finish lifecycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct Timeline {
    time: f32,
    duration: f32,
    playing: bool,
}

impl Timeline {
    pub fn play(&mut self, duration: f32) {
        self.time = 0.0;
        self.duration = duration.max(0.0);
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Advance by `dt`; returns true on the update that finishes the
    /// animation.
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.playing {
            return false;
        }
        self.time += dt.max(0.0);
        if self.time >= self.duration {
            self.time = self.duration;
            self.playing = false;
            return true;
        }
        false
    }

    /// Progress in [0, 1]; 1 when finished or zero-length.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.time / self.duration).clamp(0.0, 1.0)
    }
}

/// Animated transition of view scroll and zoom, eased quadratically.
#[derive(Clone, Copy, Debug)]
pub struct NavigateAnimation {
    pub timeline: Timeline,
    start_scroll: Vec2,
    start_zoom: f32,
    target_scroll: Vec2,
    target_zoom: f32,
}

impl NavigateAnimation {
    pub fn new(
        start_scroll: Vec2,
        start_zoom: f32,
        target_scroll: Vec2,
        target_zoom: f32,
        duration: f32,
    ) -> Self {
        let mut timeline = Timeline::default();
        timeline.play(duration);
        Self {
            timeline,
            start_scroll,
            start_zoom,
            target_scroll,
            target_zoom,
        }
    }

    /// Scroll and zoom at the current progress.
    pub fn current(&self) -> (Vec2, f32) {
        let k = ease_out_quad(self.timeline.progress());
        (
            self.start_scroll.lerp(self.target_scroll, k),
            self.start_zoom + (self.target_zoom - self.start_zoom) * k,
        )
    }

    pub fn target(&self) -> (Vec2, f32) {
        (self.target_scroll, self.target_zoom)
    }
}

/// Direction flow markers travel along a link.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlowDirection {
    #[default]
    Forward,
    Backward,
}

/// Per-link pulse: markers walking the link curve at a fixed arc-length
/// spacing, fading out over the flow duration.
#[derive(Clone, Copy, Debug)]
pub struct FlowAnimation {
    pub link: LinkId,
    pub direction: FlowDirection,
    pub timeline: Timeline,
    offset: f32,
    /// Endpoints the cached walk was computed for; a move invalidates it.
    path_key: (Vec2, Vec2),
}

impl FlowAnimation {
    pub fn new(link: LinkId, direction: FlowDirection, duration: f32) -> Self {
        let mut timeline = Timeline::default();
        timeline.play(duration);
        Self {
            link,
            direction,
            timeline,
            offset: 0.0,
            path_key: (Vec2::ZERO, Vec2::ZERO),
        }
    }

    /// Re-triggering an already-running flow restarts its lifetime but keeps
    /// marker phase so the pulse does not jump.
    pub fn retrigger(&mut self, direction: FlowDirection, duration: f32) {
        self.direction = direction;
        self.timeline.play(duration);
    }

    /// Advance marker phase by `speed` pixels/second.
    pub fn advance(&mut self, dt: f32, speed: f32, marker_distance: f32) -> bool {
        self.offset += speed * dt.max(0.0);
        if marker_distance > 0.0 {
            self.offset %= marker_distance;
        }
        self.timeline.update(dt)
    }

    /// Note the current endpoints; returns true when they moved since the
    /// last frame (the cached path must be rebuilt).
    pub fn refresh_path_key(&mut self, start: Vec2, end: Vec2) -> bool {
        let moved = self.path_key != (start, end);
        self.path_key = (start, end);
        moved
    }

    /// Draw the pulse markers along `curve`.
    pub fn draw(&self, curve: &CubicBezier, list: &mut DrawList, style: &Style) {
        let marker_distance = style.flow_marker_distance.max(1.0);
        let phase = match self.direction {
            FlowDirection::Forward => self.offset.rem_euclid(marker_distance),
            FlowDirection::Backward => {
                (marker_distance - self.offset).rem_euclid(marker_distance)
            }
        };

        let fade = (1.0 - self.timeline.progress()).powf(0.35);
        let color = style.color(StyleColor::FlowMarker).with_alpha_scaled(fade);
        let total = curve.length().max(1.0);

        curve.walk_fixed_step(phase, marker_distance, |wp| {
            let along = (wp.distance / total).clamp(0.0, 1.0);
            let radius = 6.0 - 4.0 * along;
            list.add_circle_filled(wp.point, radius, color, 12);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Timeline
    // ========================================================================

    #[test]
    fn test_timeline_plays_and_finishes() {
        let mut timeline = Timeline::default();
        timeline.play(1.0);
        assert!(timeline.is_playing());
        assert!(!timeline.update(0.4));
        assert!((timeline.progress() - 0.4).abs() < 1e-6);
        assert!(timeline.update(0.7));
        assert!(!timeline.is_playing());
        assert_eq!(timeline.progress(), 1.0);
    }

    #[test]
    fn test_timeline_zero_duration_finishes_immediately() {
        let mut timeline = Timeline::default();
        timeline.play(0.0);
        assert!(timeline.update(0.0));
        assert_eq!(timeline.progress(), 1.0);
    }

    #[test]
    fn test_timeline_update_when_stopped_is_noop() {
        let mut timeline = Timeline::default();
        assert!(!timeline.update(1.0));
        assert!(!timeline.is_playing());
    }

    // ========================================================================
    // Navigate animation
    // ========================================================================

    #[test]
    fn test_navigate_interpolates_toward_target() {
        let mut anim = NavigateAnimation::new(Vec2::ZERO, 1.0, Vec2::new(100.0, 0.0), 2.0, 1.0);
        let (scroll0, zoom0) = anim.current();
        assert_eq!(scroll0, Vec2::ZERO);
        assert_eq!(zoom0, 1.0);

        anim.timeline.update(0.5);
        let (scroll_mid, zoom_mid) = anim.current();
        // Ease-out is ahead of linear at the midpoint.
        assert!(scroll_mid.x > 50.0);
        assert!(zoom_mid > 1.5);

        anim.timeline.update(0.6);
        let (scroll1, zoom1) = anim.current();
        assert_eq!(scroll1, Vec2::new(100.0, 0.0));
        assert_eq!(zoom1, 2.0);
    }

    #[test]
    fn test_navigate_zero_duration_lands_on_target() {
        let mut anim = NavigateAnimation::new(Vec2::ZERO, 1.0, Vec2::new(10.0, 20.0), 0.5, 0.0);
        anim.timeline.update(0.0);
        let (scroll, zoom) = anim.current();
        assert_eq!(scroll, Vec2::new(10.0, 20.0));
        assert_eq!(zoom, 0.5);
    }

    // ========================================================================
    // Flow animation
    // ========================================================================

    #[test]
    fn test_flow_offset_wraps_at_marker_distance() {
        let mut flow = FlowAnimation::new(LinkId::new(1), FlowDirection::Forward, 2.0);
        flow.advance(0.1, 150.0, 30.0);
        assert!(flow.offset >= 0.0 && flow.offset < 30.0);
        flow.advance(1.0, 150.0, 30.0);
        assert!(flow.offset >= 0.0 && flow.offset < 30.0);
    }

    #[test]
    fn test_flow_finishes_after_duration() {
        let mut flow = FlowAnimation::new(LinkId::new(1), FlowDirection::Forward, 2.0);
        assert!(!flow.advance(1.0, 150.0, 30.0));
        assert!(flow.advance(1.5, 150.0, 30.0));
        assert!(!flow.timeline.is_playing());
    }

    #[test]
    fn test_flow_retrigger_restarts_lifetime() {
        let mut flow = FlowAnimation::new(LinkId::new(1), FlowDirection::Forward, 2.0);
        flow.advance(1.9, 150.0, 30.0);
        flow.retrigger(FlowDirection::Backward, 2.0);
        assert!(flow.timeline.is_playing());
        assert_eq!(flow.timeline.progress(), 0.0);
        assert_eq!(flow.direction, FlowDirection::Backward);
    }

    #[test]
    fn test_flow_path_key_detects_moves() {
        let mut flow = FlowAnimation::new(LinkId::new(1), FlowDirection::Forward, 2.0);
        assert!(flow.refresh_path_key(Vec2::ZERO, Vec2::new(10.0, 0.0)));
        assert!(!flow.refresh_path_key(Vec2::ZERO, Vec2::new(10.0, 0.0)));
        assert!(flow.refresh_path_key(Vec2::ZERO, Vec2::new(20.0, 0.0)));
    }

    #[test]
    fn test_flow_draw_emits_markers() {
        let flow = FlowAnimation::new(LinkId::new(1), FlowDirection::Forward, 2.0);
        let curve = CubicBezier::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(33.0, 0.0),
            Vec2::new(66.0, 0.0),
            Vec2::new(100.0, 0.0),
        );
        let mut list = DrawList::new();
        let style = Style::default();
        flow.draw(&curve, &mut list, &style);
        // 100px of curve at 30px spacing: at least 3 markers.
        assert!(!list.vertices().is_empty());
    }
}
