//! Cubic Bézier curves and the handful of operations the editor needs from
//! them: sampling, tangents, bounds, splitting, point projection, line
//! intersection and fixed-step walking for flow markers.

use crate::geometry::{Rect, Vec2};
use smallvec::SmallVec;

/// Cubic Bézier curve defined by four control points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    pub p0: Vec2,
    pub p1: Vec2,
    pub p2: Vec2,
    pub p3: Vec2,
}

/// Result of projecting a point onto a curve.
#[derive(Clone, Copy, Debug)]
pub struct Projection {
    /// Curve parameter of the closest point.
    pub t: f32,
    /// The closest point itself.
    pub point: Vec2,
    /// Distance from the query point to `point`.
    pub distance: f32,
}

/// One step of a fixed-distance walk along a curve.
#[derive(Clone, Copy, Debug)]
pub struct WalkPoint {
    pub point: Vec2,
    pub direction: Vec2,
    /// Arc length from the curve start to this point.
    pub distance: f32,
}

impl CubicBezier {
    pub const fn new(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Evaluate the curve at parameter `t`.
    pub fn eval(&self, t: f32) -> Vec2 {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        self.p0 * mt3 + self.p1 * (3.0 * mt2 * t) + self.p2 * (3.0 * mt * t2) + self.p3 * t3
    }

    /// First derivative at `t`, unnormalized.
    pub fn derivative(&self, t: f32) -> Vec2 {
        let mt = 1.0 - t;
        (self.p1 - self.p0) * (3.0 * mt * mt)
            + (self.p2 - self.p1) * (6.0 * mt * t)
            + (self.p3 - self.p2) * (3.0 * t * t)
    }

    /// Unit tangent at `t`.
    ///
    /// Falls back to neighboring samples for degenerate control layouts where
    /// the derivative vanishes at the endpoints.
    pub fn tangent(&self, t: f32) -> Vec2 {
        let d = self.derivative(t);
        if d.length_sq() > f32::EPSILON {
            return d.normalized();
        }
        // Degenerate: sample a nudge inward.
        let eps = 1e-3;
        let (a, b) = if t < 0.5 {
            (self.eval(t), self.eval(t + eps))
        } else {
            (self.eval(t - eps), self.eval(t))
        };
        (b - a).normalized()
    }

    /// Tight axis-aligned bounding rectangle.
    ///
    /// Solves the quadratic derivative per axis and includes interior extrema
    /// along with both endpoints.
    pub fn bounds(&self) -> Rect {
        let mut rect = Rect::from_min_max(self.p0.min(self.p3), self.p0.max(self.p3));

        for axis in 0..2 {
            let (c0, c1, c2, c3) = match axis {
                0 => (self.p0.x, self.p1.x, self.p2.x, self.p3.x),
                _ => (self.p0.y, self.p1.y, self.p2.y, self.p3.y),
            };
            // Derivative coefficients: a t^2 + b t + c.
            let a = 3.0 * (-c0 + 3.0 * c1 - 3.0 * c2 + c3);
            let b = 6.0 * (c0 - 2.0 * c1 + c2);
            let c = 3.0 * (c1 - c0);

            let mut consider = |t: f32| {
                if t > 0.0 && t < 1.0 {
                    rect = rect.union_point(self.eval(t));
                }
            };

            if a.abs() < 1e-12 {
                if b.abs() > 1e-12 {
                    consider(-c / b);
                }
            } else {
                let disc = b * b - 4.0 * a * c;
                if disc >= 0.0 {
                    let sq = disc.sqrt();
                    consider((-b + sq) / (2.0 * a));
                    consider((-b - sq) / (2.0 * a));
                }
            }
        }

        rect
    }

    /// Approximate arc length by uniform sampling.
    pub fn length(&self) -> f32 {
        const SAMPLES: usize = 48;
        let mut total = 0.0;
        let mut prev = self.p0;
        for i in 1..=SAMPLES {
            let p = self.eval(i as f32 / SAMPLES as f32);
            total += prev.distance(p);
            prev = p;
        }
        total
    }

    /// Split at `t` into the left and right sub-curves (de Casteljau).
    pub fn split_at(&self, t: f32) -> (CubicBezier, CubicBezier) {
        let q0 = self.p0.lerp(self.p1, t);
        let q1 = self.p1.lerp(self.p2, t);
        let q2 = self.p2.lerp(self.p3, t);
        let r0 = q0.lerp(q1, t);
        let r1 = q1.lerp(q2, t);
        let s = r0.lerp(r1, t);

        (
            CubicBezier::new(self.p0, q0, r0, s),
            CubicBezier::new(s, r1, q2, self.p3),
        )
    }

    /// Project `point` onto the curve.
    ///
    /// Coarse scan over `steps` samples followed by a 10x finer scan around
    /// the best candidate.
    pub fn project_point(&self, point: Vec2, steps: usize) -> Projection {
        let steps = steps.max(1);
        let coarse = 1.0 / steps as f32;

        let mut best_t = 0.0;
        let mut best_dist = f32::MAX;
        for i in 0..=steps {
            let t = i as f32 * coarse;
            let d = point.distance(self.eval(t));
            if d < best_dist {
                best_dist = d;
                best_t = t;
            }
        }

        let fine = coarse / 10.0;
        let lo = (best_t - coarse).max(0.0);
        let hi = (best_t + coarse).min(1.0);
        let mut t = lo;
        while t <= hi {
            let d = point.distance(self.eval(t));
            if d < best_dist {
                best_dist = d;
                best_t = t;
            }
            t += fine;
        }

        Projection {
            t: best_t,
            point: self.eval(best_t),
            distance: best_dist,
        }
    }

    /// Intersections between the curve and the segment `a`-`b` (0 to 3 points).
    pub fn line_intersections(&self, a: Vec2, b: Vec2) -> SmallVec<[Vec2; 3]> {
        let mut out = SmallVec::new();

        let dir = b - a;
        let len = dir.length();
        if len < f32::EPSILON {
            return out;
        }
        let normal = Vec2::new(-dir.y, dir.x) / len;

        // Power-basis coefficients of the curve.
        let c0 = self.p0;
        let c1 = (self.p1 - self.p0) * 3.0;
        let c2 = (self.p2 - self.p1 * 2.0 + self.p0) * 3.0;
        let c3 = self.p3 - self.p2 * 3.0 + self.p1 * 3.0 - self.p0;

        // Signed distance to the line as a cubic in t.
        let offset = normal.dot(a);
        let roots = solve_cubic(
            normal.dot(c3),
            normal.dot(c2),
            normal.dot(c1),
            normal.dot(c0) - offset,
        );

        for t in roots {
            if !(-1e-4..=1.0 + 1e-4).contains(&t) {
                continue;
            }
            let p = self.eval(t.clamp(0.0, 1.0));
            // Keep only hits within the segment extent.
            let s = (p - a).dot(dir) / (len * len);
            if (-1e-4..=1.0 + 1e-4).contains(&s) {
                out.push(p);
            }
        }

        out
    }

    /// Flatten the curve into a polyline within `tolerance` of the true curve.
    ///
    /// Both endpoints are included.
    pub fn flatten(&self, tolerance: f32) -> Vec<Vec2> {
        let mut points = vec![self.p0];
        self.flatten_into(tolerance.max(1e-3), 0, &mut points);
        points
    }

    fn flatten_into(&self, tolerance: f32, depth: u32, out: &mut Vec<Vec2>) {
        // Flatness: control-point deviation from the chord.
        let d1 = deviation_from_chord(self.p1, self.p0, self.p3);
        let d2 = deviation_from_chord(self.p2, self.p0, self.p3);
        if depth >= 16 || d1.max(d2) <= tolerance {
            out.push(self.p3);
            return;
        }
        let (left, right) = self.split_at(0.5);
        left.flatten_into(tolerance, depth + 1, out);
        right.flatten_into(tolerance, depth + 1, out);
    }

    /// Walk the curve at fixed arc-length steps, starting `offset` pixels in.
    ///
    /// Calls `f` for each marker position with its travel direction. Used by
    /// the link flow animation.
    pub fn walk_fixed_step(&self, offset: f32, step: f32, mut f: impl FnMut(WalkPoint)) {
        if step <= f32::EPSILON {
            return;
        }

        let polyline = self.flatten(0.25);
        let mut traveled = 0.0;
        let mut next = offset.max(0.0);

        for pair in polyline.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let seg = b - a;
            let seg_len = seg.length();
            if seg_len < f32::EPSILON {
                continue;
            }
            while next <= traveled + seg_len {
                let local = (next - traveled) / seg_len;
                f(WalkPoint {
                    point: a.lerp(b, local),
                    direction: seg / seg_len,
                    distance: next,
                });
                next += step;
            }
            traveled += seg_len;
        }
    }
}

fn deviation_from_chord(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let chord = b - a;
    let len_sq = chord.length_sq();
    if len_sq < f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(chord) / len_sq).clamp(0.0, 1.0);
    p.distance(a + chord * t)
}

/// Real roots of `a t^3 + b t^2 + c t + d = 0`.
///
/// Degenerates gracefully to the quadratic and linear cases.
pub fn solve_cubic(a: f32, b: f32, c: f32, d: f32) -> SmallVec<[f32; 3]> {
    let mut roots = SmallVec::new();

    if a.abs() < 1e-9 {
        // Quadratic.
        if b.abs() < 1e-9 {
            if c.abs() > 1e-9 {
                roots.push(-d / c);
            }
            return roots;
        }
        let disc = c * c - 4.0 * b * d;
        if disc >= 0.0 {
            let sq = disc.sqrt();
            roots.push((-c + sq) / (2.0 * b));
            roots.push((-c - sq) / (2.0 * b));
        }
        return roots;
    }

    // Depressed cubic t = x - b/(3a): x^3 + px + q = 0.
    let a = a as f64;
    let b = b as f64 / a;
    let c = c as f64 / a;
    let d = d as f64 / a;

    let p = c - b * b / 3.0;
    let q = 2.0 * b * b * b / 27.0 - b * c / 3.0 + d;
    let shift = -b / 3.0;

    let half_q = q / 2.0;
    let third_p = p / 3.0;
    let disc = half_q * half_q + third_p * third_p * third_p;

    if disc > 1e-12 {
        // One real root.
        let sq = disc.sqrt();
        let u = cbrt(-half_q + sq);
        let v = cbrt(-half_q - sq);
        roots.push((u + v + shift) as f32);
    } else if disc < -1e-12 {
        // Three real roots, trigonometric form.
        let r = (-third_p * third_p * third_p).sqrt();
        let phi = (-half_q / r).clamp(-1.0, 1.0).acos();
        let m = 2.0 * (-third_p).sqrt();
        for k in 0..3 {
            let x = m * ((phi + 2.0 * std::f64::consts::PI * k as f64) / 3.0).cos();
            roots.push((x + shift) as f32);
        }
    } else {
        // Repeated roots.
        if half_q.abs() < 1e-12 {
            roots.push(shift as f32);
        } else {
            let u = cbrt(-half_q);
            roots.push((2.0 * u + shift) as f32);
            roots.push((-u + shift) as f32);
        }
    }

    roots
}

fn cbrt(v: f64) -> f64 {
    if v >= 0.0 {
        v.powf(1.0 / 3.0)
    } else {
        -(-v).powf(1.0 / 3.0)
    }
}
