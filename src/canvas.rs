//! Coordinate engine mapping between the three editor spaces.
//!
//! - *Canvas space*: the virtual plane node positions live in.
//! - *Client space*: canvas coordinates shifted by the client origin, no zoom.
//! - *Screen space*: host window coordinates.
//!
//! Zoom is stored per axis with its inverse precomputed; when zoom drops
//! below 1 the effective client area grows by the inverse so content can be
//! authored at design resolution while the view shrinks.

use crate::geometry::{Rect, Vec2};

/// Pan/zoom state plus the window placement it projects into.
#[derive(Clone, Copy, Debug)]
pub struct Canvas {
    window_screen_pos: Vec2,
    window_screen_size: Vec2,
    client_origin: Vec2,
    client_size: Vec2,
    zoom: Vec2,
    inv_zoom: Vec2,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::ZERO, Vec2::splat(1.0), Vec2::ZERO, false)
    }
}

impl Canvas {
    /// Build a canvas for the given window rect, zoom and origin.
    ///
    /// `align_to_pixels` floors the origin so grid and borders land on whole
    /// pixels.
    pub fn new(
        window_screen_pos: Vec2,
        window_screen_size: Vec2,
        zoom: Vec2,
        origin: Vec2,
        align_to_pixels: bool,
    ) -> Self {
        let zoom = Vec2::new(safe_zoom(zoom.x), safe_zoom(zoom.y));
        let inv_zoom = Vec2::new(1.0 / zoom.x, 1.0 / zoom.y);
        let client_origin = if align_to_pixels { origin.floor() } else { origin };

        // A zoomed-out view covers more canvas than the window is wide.
        let mut client_size = window_screen_size;
        if inv_zoom.x > 1.0 {
            client_size.x *= inv_zoom.x;
        }
        if inv_zoom.y > 1.0 {
            client_size.y *= inv_zoom.y;
        }

        Self {
            window_screen_pos,
            window_screen_size,
            client_origin,
            client_size,
            zoom,
            inv_zoom,
        }
    }

    pub fn window_screen_pos(&self) -> Vec2 {
        self.window_screen_pos
    }

    pub fn window_screen_size(&self) -> Vec2 {
        self.window_screen_size
    }

    pub fn window_rect(&self) -> Rect {
        Rect::from_min_size(self.window_screen_pos, self.window_screen_size)
    }

    pub fn client_origin(&self) -> Vec2 {
        self.client_origin
    }

    pub fn client_size(&self) -> Vec2 {
        self.client_size
    }

    pub fn zoom(&self) -> Vec2 {
        self.zoom
    }

    pub fn inv_zoom(&self) -> Vec2 {
        self.inv_zoom
    }

    /// Screen position to canvas position.
    pub fn from_screen(&self, p: Vec2) -> Vec2 {
        (p - self.window_screen_pos - self.client_origin).scale(self.inv_zoom)
    }

    /// Canvas position to screen position.
    pub fn to_screen(&self, p: Vec2) -> Vec2 {
        p.scale(self.zoom) + self.client_origin + self.window_screen_pos
    }

    /// Client position (window-relative) to canvas position.
    pub fn from_client(&self, p: Vec2) -> Vec2 {
        (p - self.client_origin).scale(self.inv_zoom)
    }

    /// Canvas position to client position.
    pub fn to_client(&self, p: Vec2) -> Vec2 {
        p.scale(self.zoom) + self.client_origin
    }

    /// Canvas rect to screen rect.
    pub fn rect_to_screen(&self, r: Rect) -> Rect {
        Rect::from_min_max(self.to_screen(r.min), self.to_screen(r.max))
    }

    /// The canvas-space rectangle currently covered by the window.
    pub fn visible_bounds(&self) -> Rect {
        Rect::from_min_max(
            self.from_screen(self.window_screen_pos),
            self.from_screen(self.window_screen_pos + self.window_screen_size),
        )
    }
}

fn safe_zoom(zoom: f32) -> f32 {
    debug_assert!(zoom > 0.0, "zoom must be positive, got {zoom}");
    if zoom > 0.0 {
        zoom
    } else {
        1.0
    }
}
