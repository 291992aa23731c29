//! Background grid emission.
//!
//! Lines are drawn in canvas space over the visible bounds; the end-of-frame
//! channel transform carries them into screen space along with the rest of
//! the canvas content.

use crate::draw_list::{Color, DrawList};
use crate::geometry::{Rect, Vec2};

/// Default grid spacing in canvas pixels.
pub const GRID_SPACING: f32 = 64.0;

/// Below this many screen pixels between lines the grid is skipped entirely.
const MIN_VISIBLE_SPACING: f32 = 4.0;

/// Emit grid lines covering `visible` (canvas space) into `list`.
pub fn draw_grid(list: &mut DrawList, visible: Rect, spacing: f32, zoom: f32, color: Color) {
    if spacing <= 0.0 || color.a == 0 {
        return;
    }
    if spacing * zoom < MIN_VISIBLE_SPACING {
        return;
    }

    let thickness = 1.0 / zoom.max(f32::EPSILON);

    let mut x = (visible.min.x / spacing).floor() * spacing;
    while x <= visible.max.x {
        list.add_line(
            Vec2::new(x, visible.min.y),
            Vec2::new(x, visible.max.y),
            color,
            thickness,
        );
        x += spacing;
    }

    let mut y = (visible.min.y / spacing).floor() * spacing;
    while y <= visible.max.y {
        list.add_line(
            Vec2::new(visible.min.x, y),
            Vec2::new(visible.max.x, y),
            color,
            thickness,
        );
        y += spacing;
    }
}
