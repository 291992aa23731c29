//! Scalar and vector primitives shared by the whole editor.
//!
//! Positions and sizes live in one of three spaces (canvas, client, screen);
//! the types here are space-agnostic. See [`crate::canvas`] for the transforms
//! between spaces.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// 2D vector used for positions, sizes and directions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length_sq(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    /// Unit vector pointing the same way, or zero for a zero vector.
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len > f32::EPSILON {
            self / len
        } else {
            Vec2::ZERO
        }
    }

    pub fn min(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x.min(other.x), self.y.min(other.y))
    }

    pub fn max(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x.max(other.x), self.y.max(other.y))
    }

    pub fn floor(self) -> Vec2 {
        Vec2::new(self.x.floor(), self.y.floor())
    }

    /// Component-wise product.
    pub fn scale(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x * other.x, self.y * other.y)
    }

    pub fn lerp(self, other: Vec2, t: f32) -> Vec2 {
        self + (other - self) * t
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        *self = *self + rhs;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        *self = *self - rhs;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Axis-aligned rectangle stored as min/max corners.
///
/// An empty rectangle has `max < min` on at least one axis; `Rect::NOTHING`
/// is the identity for [`Rect::union`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

/// Which part of a rectangle border a point is closest to.
///
/// Corners combine the two adjacent edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RectRegion {
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl RectRegion {
    pub fn moves_left(self) -> bool {
        matches!(self, Self::Left | Self::TopLeft | Self::BottomLeft)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, Self::Right | Self::TopRight | Self::BottomRight)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, Self::Top | Self::TopLeft | Self::TopRight)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::Bottom | Self::BottomLeft | Self::BottomRight)
    }
}

impl Rect {
    /// Inverted-infinite rect; unioning anything with it yields the other rect.
    pub const NOTHING: Rect = Rect {
        min: Vec2::new(f32::MAX, f32::MAX),
        max: Vec2::new(f32::MIN, f32::MIN),
    };

    pub const fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.min
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn contains_rect(&self, other: Rect) -> bool {
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
    }

    pub fn intersects(&self, other: Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn intersection(&self, other: Rect) -> Rect {
        Rect {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

    pub fn union(&self, other: Rect) -> Rect {
        Rect {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn union_point(&self, p: Vec2) -> Rect {
        Rect {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    pub fn expanded(&self, amount: f32) -> Rect {
        Rect {
            min: self.min - Vec2::splat(amount),
            max: self.max + Vec2::splat(amount),
        }
    }

    pub fn translated(&self, offset: Vec2) -> Rect {
        Rect {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Nearest point inside or on the border of the rectangle.
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
        )
    }

    /// Nearest point on the border, with the border region it falls into.
    ///
    /// Corners win when the point is within `corner_reach` of both adjacent
    /// edges. Used to classify group resize grips.
    pub fn closest_border_point(&self, p: Vec2, corner_reach: f32) -> (Vec2, RectRegion) {
        let clamped = self.closest_point(p);
        // Distances to the four edges from the clamped point.
        let dl = clamped.x - self.min.x;
        let dr = self.max.x - clamped.x;
        let dt = clamped.y - self.min.y;
        let db = self.max.y - clamped.y;

        let dx_min = dl.min(dr);
        let dy_min = dt.min(db);

        let on_left = dl <= dr;
        let on_top = dt <= db;

        let region = if dx_min <= corner_reach && dy_min <= corner_reach {
            match (on_top, on_left) {
                (true, true) => RectRegion::TopLeft,
                (true, false) => RectRegion::TopRight,
                (false, true) => RectRegion::BottomLeft,
                (false, false) => RectRegion::BottomRight,
            }
        } else if dx_min < dy_min {
            if on_left {
                RectRegion::Left
            } else {
                RectRegion::Right
            }
        } else if on_top {
            RectRegion::Top
        } else {
            RectRegion::Bottom
        };

        let point = match region {
            RectRegion::Left => Vec2::new(self.min.x, clamped.y),
            RectRegion::Right => Vec2::new(self.max.x, clamped.y),
            RectRegion::Top => Vec2::new(clamped.x, self.min.y),
            RectRegion::Bottom => Vec2::new(clamped.x, self.max.y),
            RectRegion::TopLeft => self.min,
            RectRegion::TopRight => Vec2::new(self.max.x, self.min.y),
            RectRegion::BottomLeft => Vec2::new(self.min.x, self.max.y),
            RectRegion::BottomRight => self.max,
        };

        (point, region)
    }

    /// Shortest straight segment between this rect inflated by `radius_a`
    /// and `other` inflated by `radius_b`.
    ///
    /// Converges in two clamp rounds because both shapes are convex.
    pub fn closest_line(
        &self,
        other: &Rect,
        radius_a: f32,
        radius_b: f32,
    ) -> (Vec2, Vec2) {
        let a = self.expanded(radius_a);
        let b = other.expanded(radius_b);

        let mut pa = a.closest_point(b.center());
        let mut pb = b.closest_point(pa);
        pa = a.closest_point(pb);
        pb = b.closest_point(pa);

        (pa, pb)
    }
}

/// Quadratic ease-out: fast start, slow settle. Input and output in [0, 1].
pub fn ease_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * (2.0 - t)
}
