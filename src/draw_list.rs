//! Display list the editor draws into and the host rasterizes.
//!
//! The list is split into parallel *channels*: independent command/index
//! streams over one shared vertex buffer, concatenated in an explicit order at
//! merge time. The editor draws nodes, links and overlays into separate
//! channels, then reorders, transforms and merges them at the end of the
//! frame. The channel engine is a post-process layer; it never looks at what
//! a channel contains.

use crate::geometry::{Rect, Vec2};
use bitflags::bitflags;

/// 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}


impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Multiply alpha by `factor` (clamped to [0, 1]).
    pub fn with_alpha_scaled(self, factor: f32) -> Self {
        let a = (self.a as f32 * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

bitflags! {
    /// Which corners of a rectangle get rounded.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CornerFlags: u8 {
        const TOP_LEFT = 1;
        const TOP_RIGHT = 1 << 1;
        const BOTTOM_RIGHT = 1 << 2;
        const BOTTOM_LEFT = 1 << 3;
        const ALL = Self::TOP_LEFT.bits()
            | Self::TOP_RIGHT.bits()
            | Self::BOTTOM_RIGHT.bits()
            | Self::BOTTOM_LEFT.bits();
    }
}

/// One vertex: position plus color. The editor emits no textured geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub pos: Vec2,
    pub color: Color,
}

/// A run of indices sharing one clip rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCmd {
    pub clip_rect: Rect,
    /// Offset into the owning index stream.
    pub first_index: usize,
    pub index_count: usize,
}

#[derive(Clone, Debug, Default)]
struct Channel {
    cmds: Vec<DrawCmd>,
    indices: Vec<u32>,
}

impl Channel {
    fn open_cmd(&mut self, clip: Rect) {
        match self.cmds.last_mut() {
            Some(cmd) if cmd.index_count == 0 => cmd.clip_rect = clip,
            Some(cmd) if cmd.clip_rect == clip => {}
            _ => self.cmds.push(DrawCmd {
                clip_rect: clip,
                first_index: self.indices.len(),
                index_count: 0,
            }),
        }
    }
}

/// The display list: shared vertices, channelled commands, and the merged
/// output the host consumes after [`DrawList::merge`].
#[derive(Debug)]
pub struct DrawList {
    vertices: Vec<Vertex>,
    channels: Vec<Channel>,
    current: usize,
    clip_stack: Vec<Rect>,
    merged_cmds: Vec<DrawCmd>,
    merged_indices: Vec<u32>,
}

impl Default for DrawList {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawList {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            channels: vec![Channel::default()],
            current: 0,
            clip_stack: Vec::new(),
            merged_cmds: Vec::new(),
            merged_indices: Vec::new(),
        }
    }

    /// Reset for a new frame, keeping allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.channels.clear();
        self.channels.push(Channel::default());
        self.current = 0;
        self.clip_stack.clear();
        self.merged_cmds.clear();
        self.merged_indices.clear();
    }

    // === Clipping ===

    pub fn push_clip_rect(&mut self, rect: Rect, intersect_with_current: bool) {
        let rect = match (intersect_with_current, self.clip_stack.last()) {
            (true, Some(top)) => top.intersection(rect),
            _ => rect,
        };
        self.clip_stack.push(rect);
        let clip = self.current_clip();
        self.channels[self.current].open_cmd(clip);
    }

    pub fn pop_clip_rect(&mut self) {
        debug_assert!(!self.clip_stack.is_empty(), "clip stack underflow");
        self.clip_stack.pop();
        let clip = self.current_clip();
        self.channels[self.current].open_cmd(clip);
    }

    /// Current clip rect; a huge rect when the stack is empty.
    pub fn current_clip(&self) -> Rect {
        self.clip_stack.last().copied().unwrap_or(Rect::from_min_max(
            Vec2::new(f32::MIN / 2.0, f32::MIN / 2.0),
            Vec2::new(f32::MAX / 2.0, f32::MAX / 2.0),
        ))
    }

    // === Channels ===

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn current_channel(&self) -> usize {
        self.current
    }

    /// Grow to at least `count` channels.
    ///
    /// New channels start with a command inheriting the current clip rect so
    /// their initial state matches the outer list.
    pub fn channels_grow(&mut self, count: usize) {
        let clip = self.current_clip();
        while self.channels.len() < count {
            let mut channel = Channel::default();
            channel.open_cmd(clip);
            self.channels.push(channel);
        }
    }

    /// Route subsequent draw commands to `index`.
    pub fn set_current_channel(&mut self, index: usize) {
        debug_assert!(index < self.channels.len(), "channel {index} out of range");
        if index < self.channels.len() {
            self.current = index;
            let clip = self.current_clip();
            self.channels[self.current].open_cmd(clip);
        }
    }

    /// Exchange the command/index buffers of two channels without touching
    /// vertices.
    pub fn swap_channels(&mut self, a: usize, b: usize) {
        if a != b {
            self.channels.swap(a, b);
        }
    }

    /// Rewrite every vertex covered by commands of channels `[begin, end)` as
    /// `pos = (pos + pre_offset) * scale + post_offset`.
    ///
    /// Commands never share vertices, so each vertex is rewritten exactly
    /// once. Clip rects are untouched; see
    /// [`DrawList::translate_and_clamp_clips`].
    pub fn transform_channels(
        &mut self,
        begin: usize,
        end: usize,
        pre_offset: Vec2,
        scale: Vec2,
        post_offset: Vec2,
    ) {
        for channel in &self.channels[begin..end.min(self.channels.len())] {
            for cmd in &channel.cmds {
                if cmd.index_count == 0 {
                    continue;
                }
                let span = &channel.indices[cmd.first_index..cmd.first_index + cmd.index_count];
                let (mut min_idx, mut max_idx) = (u32::MAX, 0u32);
                for &i in span {
                    min_idx = min_idx.min(i);
                    max_idx = max_idx.max(i);
                }
                for vertex in &mut self.vertices[min_idx as usize..=max_idx as usize] {
                    vertex.pos = (vertex.pos + pre_offset).scale(scale) + post_offset;
                }
            }
        }
    }

    /// Translate the clip rect of every command in `[begin, end)` by `offset`
    /// and intersect it with `outer`.
    pub fn translate_and_clamp_clips(
        &mut self,
        begin: usize,
        end: usize,
        offset: Vec2,
        outer: Rect,
    ) {
        let end = end.min(self.channels.len());
        for channel in &mut self.channels[begin..end] {
            for cmd in &mut channel.cmds {
                cmd.clip_rect = cmd.clip_rect.translated(offset).intersection(outer);
            }
        }
    }

    /// Concatenate channels into the merged output in the given order.
    ///
    /// Channels not listed are dropped. Commands with no indices are elided.
    pub fn merge(&mut self, order: &[usize]) {
        self.merged_cmds.clear();
        self.merged_indices.clear();

        for &ci in order {
            let channel = &self.channels[ci];
            for cmd in &channel.cmds {
                if cmd.index_count == 0 {
                    continue;
                }
                let first_index = self.merged_indices.len();
                self.merged_indices
                    .extend_from_slice(&channel.indices[cmd.first_index..cmd.first_index + cmd.index_count]);
                // Coalesce with the previous run when the clip matches.
                match self.merged_cmds.last_mut() {
                    Some(prev) if prev.clip_rect == cmd.clip_rect => {
                        prev.index_count += cmd.index_count
                    }
                    _ => self.merged_cmds.push(DrawCmd {
                        clip_rect: cmd.clip_rect,
                        first_index,
                        index_count: cmd.index_count,
                    }),
                }
            }
        }
    }

    // === Output access ===

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn merged_commands(&self) -> &[DrawCmd] {
        &self.merged_cmds
    }

    pub fn merged_indices(&self) -> &[u32] {
        &self.merged_indices
    }

    /// Commands of one channel, mostly for tests and diagnostics.
    pub fn channel_commands(&self, channel: usize) -> &[DrawCmd] {
        &self.channels[channel].cmds
    }

    pub fn channel_index_count(&self, channel: usize) -> usize {
        self.channels[channel].indices.len()
    }

    /// Vertices referenced by one channel, in index order.
    pub fn channel_vertices(&self, channel: usize) -> Vec<Vertex> {
        self.channels[channel]
            .indices
            .iter()
            .map(|&i| self.vertices[i as usize])
            .collect()
    }

    // === Primitives ===

    fn reserve(&mut self, vertex_count: usize) -> u32 {
        let base = self.vertices.len() as u32;
        let clip = self.current_clip();
        self.channels[self.current].open_cmd(clip);
        self.vertices.reserve(vertex_count);
        base
    }

    fn push_indices(&mut self, indices: impl IntoIterator<Item = u32>) {
        let channel = &mut self.channels[self.current];
        let before = channel.indices.len();
        channel.indices.extend(indices);
        let added = channel.indices.len() - before;
        channel
            .cmds
            .last_mut()
            .expect("open_cmd precedes every primitive")
            .index_count += added;
    }

    /// Straight line segment of the given thickness.
    pub fn add_line(&mut self, a: Vec2, b: Vec2, color: Color, thickness: f32) {
        let dir = (b - a).normalized();
        if dir == Vec2::ZERO {
            return;
        }
        let n = Vec2::new(-dir.y, dir.x) * (thickness * 0.5);
        let base = self.reserve(4);
        self.vertices.extend_from_slice(&[
            Vertex { pos: a + n, color },
            Vertex { pos: b + n, color },
            Vertex { pos: b - n, color },
            Vertex { pos: a - n, color },
        ]);
        self.push_indices([base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Stroke a polyline as independent segment quads.
    pub fn add_polyline(&mut self, points: &[Vec2], color: Color, thickness: f32) {
        for pair in points.windows(2) {
            self.add_line(pair[0], pair[1], color, thickness);
        }
    }

    /// Filled convex polygon (triangle fan).
    pub fn add_convex_poly_filled(&mut self, points: &[Vec2], color: Color) {
        if points.len() < 3 {
            return;
        }
        let base = self.reserve(points.len());
        self.vertices
            .extend(points.iter().map(|&pos| Vertex { pos, color }));
        let mut indices = Vec::with_capacity((points.len() - 2) * 3);
        for i in 2..points.len() as u32 {
            indices.extend_from_slice(&[base, base + i - 1, base + i]);
        }
        self.push_indices(indices);
    }

    pub fn add_triangle_filled(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        self.add_convex_poly_filled(&[a, b, c], color);
    }

    /// Filled rectangle, optionally rounded on the masked corners.
    pub fn add_rect_filled(
        &mut self,
        rect: Rect,
        color: Color,
        rounding: f32,
        corners: CornerFlags,
    ) {
        if rect.is_empty() || color.a == 0 {
            return;
        }
        let path = rounded_rect_path(rect, rounding, corners);
        self.add_convex_poly_filled(&path, color);
    }

    /// Stroked rectangle, optionally rounded on the masked corners.
    pub fn add_rect(
        &mut self,
        rect: Rect,
        color: Color,
        rounding: f32,
        corners: CornerFlags,
        thickness: f32,
    ) {
        if rect.is_empty() || color.a == 0 {
            return;
        }
        let mut path = rounded_rect_path(rect, rounding, corners);
        path.push(path[0]);
        self.add_polyline(&path, color, thickness);
    }

    pub fn add_circle_filled(&mut self, center: Vec2, radius: f32, color: Color, segments: usize) {
        if radius <= 0.0 || color.a == 0 {
            return;
        }
        let path = circle_path(center, radius, segments.max(3));
        self.add_convex_poly_filled(&path, color);
    }

    pub fn add_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        color: Color,
        segments: usize,
        thickness: f32,
    ) {
        if radius <= 0.0 || color.a == 0 {
            return;
        }
        let mut path = circle_path(center, radius, segments.max(3));
        path.push(path[0]);
        self.add_polyline(&path, color, thickness);
    }

    /// Stroke a cubic Bézier by flattening it.
    pub fn add_bezier(&mut self, curve: &crate::bezier::CubicBezier, color: Color, thickness: f32) {
        let points = curve.flatten(0.25);
        self.add_polyline(&points, color, thickness);
    }
}

fn circle_path(center: Vec2, radius: f32, segments: usize) -> Vec<Vec2> {
    (0..segments)
        .map(|i| {
            let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

fn rounded_rect_path(rect: Rect, rounding: f32, corners: CornerFlags) -> Vec<Vec2> {
    let rounding = rounding
        .min(rect.width() * 0.5)
        .min(rect.height() * 0.5)
        .max(0.0);

    if rounding < 0.5 || corners.is_empty() {
        return vec![
            rect.min,
            Vec2::new(rect.max.x, rect.min.y),
            rect.max,
            Vec2::new(rect.min.x, rect.max.y),
        ];
    }

    const ARC_SEGMENTS: usize = 8;
    let mut path = Vec::with_capacity(4 * (ARC_SEGMENTS + 1));

    let corner = |path: &mut Vec<Vec2>, corner_pos: Vec2, center: Vec2, rounded: bool, start_angle: f32| {
        if rounded {
            for i in 0..=ARC_SEGMENTS {
                let angle = start_angle + i as f32 / ARC_SEGMENTS as f32 * std::f32::consts::FRAC_PI_2;
                path.push(center + Vec2::new(angle.cos(), angle.sin()) * rounding);
            }
        } else {
            path.push(corner_pos);
        }
    };

    use std::f32::consts::PI;
    // Clockwise from the top-left corner.
    corner(
        &mut path,
        rect.min,
        rect.min + Vec2::splat(rounding),
        corners.contains(CornerFlags::TOP_LEFT),
        PI,
    );
    corner(
        &mut path,
        Vec2::new(rect.max.x, rect.min.y),
        Vec2::new(rect.max.x - rounding, rect.min.y + rounding),
        corners.contains(CornerFlags::TOP_RIGHT),
        PI * 1.5,
    );
    corner(
        &mut path,
        rect.max,
        rect.max - Vec2::splat(rounding),
        corners.contains(CornerFlags::BOTTOM_RIGHT),
        0.0,
    );
    corner(
        &mut path,
        Vec2::new(rect.min.x, rect.max.y),
        Vec2::new(rect.min.x + rounding, rect.max.y - rounding),
        corners.contains(CornerFlags::BOTTOM_LEFT),
        PI * 0.5,
    );

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip() -> Rect {
        Rect::from_min_size(Vec2::ZERO, Vec2::new(1000.0, 1000.0))
    }

    // ========================================================================
    // Channel plumbing
    // ========================================================================

    #[test]
    fn test_starts_with_one_channel() {
        let list = DrawList::new();
        assert_eq!(list.channel_count(), 1);
        assert_eq!(list.current_channel(), 0);
    }

    #[test]
    fn test_grow_inherits_clip() {
        let mut list = DrawList::new();
        list.push_clip_rect(clip(), false);
        list.channels_grow(3);
        assert_eq!(list.channel_count(), 3);
        assert_eq!(list.channel_commands(2)[0].clip_rect, clip());
    }

    #[test]
    fn test_draw_goes_to_current_channel() {
        let mut list = DrawList::new();
        list.push_clip_rect(clip(), false);
        list.channels_grow(2);

        list.set_current_channel(1);
        list.add_line(Vec2::ZERO, Vec2::new(10.0, 0.0), Color::WHITE, 1.0);

        assert_eq!(list.channel_index_count(0), 0);
        assert_eq!(list.channel_index_count(1), 6);
    }

    #[test]
    fn test_swap_channels() {
        let mut list = DrawList::new();
        list.push_clip_rect(clip(), false);
        list.channels_grow(2);

        list.set_current_channel(0);
        list.add_line(Vec2::ZERO, Vec2::new(10.0, 0.0), Color::WHITE, 1.0);

        list.swap_channels(0, 1);
        assert_eq!(list.channel_index_count(0), 0);
        assert_eq!(list.channel_index_count(1), 6);
    }

    // ========================================================================
    // Vertex transform
    // ========================================================================

    #[test]
    fn test_transform_channels_applies_affine() {
        let mut list = DrawList::new();
        list.push_clip_rect(clip(), false);
        list.add_line(Vec2::new(0.0, 5.0), Vec2::new(10.0, 5.0), Color::WHITE, 2.0);

        list.transform_channels(0, 1, Vec2::new(1.0, 1.0), Vec2::splat(2.0), Vec2::new(100.0, 0.0));

        // Line endpoints were (0,5)-(10,5) with +-1 thickness offsets in y.
        // After (p + (1,1)) * 2 + (100,0): x in {102, 122}, y in {10, 14}.
        for v in list.vertices() {
            assert!(v.pos.x == 102.0 || v.pos.x == 122.0);
            assert!(v.pos.y == 10.0 || v.pos.y == 14.0);
        }
    }

    #[test]
    fn test_transform_skips_channels_outside_range() {
        let mut list = DrawList::new();
        list.push_clip_rect(clip(), false);
        list.channels_grow(2);

        list.set_current_channel(0);
        list.add_line(Vec2::ZERO, Vec2::new(10.0, 0.0), Color::WHITE, 2.0);
        let before: Vec<_> = list.channel_vertices(0);

        // Transform only channel 1; channel 0 vertices must be untouched.
        list.transform_channels(1, 2, Vec2::ZERO, Vec2::splat(3.0), Vec2::ZERO);
        assert_eq!(list.channel_vertices(0), before);
    }

    // ========================================================================
    // Clip clamping
    // ========================================================================

    #[test]
    fn test_translate_and_clamp_clips() {
        let mut list = DrawList::new();
        list.push_clip_rect(
            Rect::from_min_size(Vec2::ZERO, Vec2::new(100.0, 100.0)),
            false,
        );
        list.add_line(Vec2::ZERO, Vec2::new(10.0, 0.0), Color::WHITE, 1.0);

        let outer = Rect::from_min_size(Vec2::new(20.0, 0.0), Vec2::new(60.0, 60.0));
        list.translate_and_clamp_clips(0, 1, Vec2::new(10.0, 10.0), outer);

        let cmd = list.channel_commands(0).last().unwrap();
        // Translated to (10,10)-(110,110), clamped to outer (20,0)-(80,60).
        assert_eq!(cmd.clip_rect.min, Vec2::new(20.0, 10.0));
        assert_eq!(cmd.clip_rect.max, Vec2::new(80.0, 60.0));
    }

    #[test]
    fn test_push_clip_intersects_with_current() {
        let mut list = DrawList::new();
        list.push_clip_rect(
            Rect::from_min_size(Vec2::ZERO, Vec2::new(100.0, 100.0)),
            false,
        );
        list.push_clip_rect(
            Rect::from_min_size(Vec2::new(50.0, 50.0), Vec2::new(100.0, 100.0)),
            true,
        );
        let current = list.current_clip();
        assert_eq!(current.min, Vec2::new(50.0, 50.0));
        assert_eq!(current.max, Vec2::new(100.0, 100.0));
        list.pop_clip_rect();
        assert_eq!(list.current_clip().max, Vec2::new(100.0, 100.0));
    }

    // ========================================================================
    // Merge
    // ========================================================================

    #[test]
    fn test_merge_respects_order() {
        let mut list = DrawList::new();
        list.push_clip_rect(clip(), false);
        list.channels_grow(2);

        list.set_current_channel(1);
        list.add_triangle_filled(
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 10.0),
            Color::rgb(255, 0, 0),
        );
        list.set_current_channel(0);
        list.add_triangle_filled(
            Vec2::new(100.0, 0.0),
            Vec2::new(110.0, 0.0),
            Vec2::new(100.0, 10.0),
            Color::rgb(0, 255, 0),
        );

        // Channel 1 first: its triangle's indices must come first.
        list.merge(&[1, 0]);
        let indices = list.merged_indices();
        assert_eq!(indices.len(), 6);
        let first_vertex = list.vertices()[indices[0] as usize];
        assert_eq!(first_vertex.color, Color::rgb(255, 0, 0));
    }

    #[test]
    fn test_merge_coalesces_same_clip() {
        let mut list = DrawList::new();
        list.push_clip_rect(clip(), false);
        list.channels_grow(2);
        list.set_current_channel(0);
        list.add_line(Vec2::ZERO, Vec2::new(1.0, 0.0), Color::WHITE, 1.0);
        list.set_current_channel(1);
        list.add_line(Vec2::ZERO, Vec2::new(2.0, 0.0), Color::WHITE, 1.0);

        list.merge(&[0, 1]);
        assert_eq!(list.merged_commands().len(), 1);
        assert_eq!(list.merged_commands()[0].index_count, 12);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut list = DrawList::new();
        list.push_clip_rect(clip(), false);
        list.channels_grow(4);
        list.add_line(Vec2::ZERO, Vec2::new(1.0, 0.0), Color::WHITE, 1.0);
        list.merge(&[0]);

        list.clear();
        assert_eq!(list.channel_count(), 1);
        assert!(list.vertices().is_empty());
        assert!(list.merged_commands().is_empty());
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    #[test]
    fn test_rect_filled_plain_is_quad() {
        let mut list = DrawList::new();
        list.push_clip_rect(clip(), false);
        list.add_rect_filled(
            Rect::from_min_size(Vec2::ZERO, Vec2::new(10.0, 10.0)),
            Color::WHITE,
            0.0,
            CornerFlags::ALL,
        );
        assert_eq!(list.vertices().len(), 4);
        assert_eq!(list.channel_index_count(0), 6);
    }

    #[test]
    fn test_rect_filled_rounded_has_arcs() {
        let mut list = DrawList::new();
        list.push_clip_rect(clip(), false);
        list.add_rect_filled(
            Rect::from_min_size(Vec2::ZERO, Vec2::new(40.0, 40.0)),
            Color::WHITE,
            8.0,
            CornerFlags::ALL,
        );
        assert!(list.vertices().len() > 4);
        // All vertices stay inside the rect.
        for v in list.vertices() {
            assert!(v.pos.x >= -1e-3 && v.pos.x <= 40.0 + 1e-3);
            assert!(v.pos.y >= -1e-3 && v.pos.y <= 40.0 + 1e-3);
        }
    }

    #[test]
    fn test_degenerate_primitives_emit_nothing() {
        let mut list = DrawList::new();
        list.push_clip_rect(clip(), false);
        list.add_line(Vec2::ZERO, Vec2::ZERO, Color::WHITE, 1.0);
        list.add_circle_filled(Vec2::ZERO, 0.0, Color::WHITE, 12);
        list.add_rect_filled(Rect::NOTHING, Color::WHITE, 0.0, CornerFlags::ALL);
        assert!(list.vertices().is_empty());
    }

    #[test]
    fn test_bezier_stroke_covers_curve() {
        let mut list = DrawList::new();
        list.push_clip_rect(clip(), false);
        let curve = crate::bezier::CubicBezier::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(50.0, 0.0),
            Vec2::new(50.0, 100.0),
            Vec2::new(100.0, 100.0),
        );
        list.add_bezier(&curve, Color::WHITE, 2.0);
        assert!(!list.vertices().is_empty());
        let near_start = list
            .vertices()
            .iter()
            .any(|v| v.pos.distance(Vec2::ZERO) < 3.0);
        let near_end = list
            .vertices()
            .iter()
            .any(|v| v.pos.distance(Vec2::new(100.0, 100.0)) < 3.0);
        assert!(near_start && near_end);
    }
}
