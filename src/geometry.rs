//! Evaluation of single plan-view primitives.
//!
//! Every primitive is evaluated in its local frame (start at the origin,
//! heading along +x) and the result is rotated and translated by the
//! declared start pose. Dispatch is a plain `match` on [`GeometryKind`].

use glam::DVec2;
use std::ops::{Add, Mul};

use crate::error::{Error, Result};
use crate::model::{CubicPoly, GeometryKind, GeometryPrimitive, ParamRange};

/// Slack allowed when a station sits just outside a primitive.
pub const EVAL_TOLERANCE: f64 = 1e-6;

const CURVATURE_EPSILON: f64 = 1e-12;

/// Upper bound on the length of a single quadrature sub-interval.
const MAX_SUBINTERVAL: f64 = 4.0;
/// Upper bound on the heading change inside a single quadrature sub-interval.
const MAX_SUBINTERVAL_TURN: f64 = 0.2;
const MAX_SUBINTERVALS: usize = 4096;

const NEWTON_MAX_ITERATIONS: usize = 32;
const NEWTON_TOLERANCE: f64 = 1e-10;

/// Position, heading and signed curvature on a reference line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub hdg: f64,
    pub curvature: f64,
}

impl Pose {
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn tangent(&self) -> DVec2 {
        DVec2::from_angle(self.hdg)
    }

    /// Unit vector pointing to the left of the direction of travel.
    pub fn left_normal(&self) -> DVec2 {
        self.tangent().perp()
    }
}

/// Evaluates `primitive` at `local_s` metres from its start.
pub fn evaluate(primitive: &GeometryPrimitive, local_s: f64) -> Result<Pose> {
    let length = primitive.length.max(0.0);
    if !(local_s >= -EVAL_TOLERANCE && local_s <= length + EVAL_TOLERANCE) {
        return Err(Error::OutOfRange {
            s: local_s,
            start: 0.0,
            end: length,
        });
    }
    let ds = local_s.clamp(0.0, length);

    let (local, hdg_offset, curvature) = match primitive.kind {
        GeometryKind::Line => (DVec2::new(ds, 0.0), 0.0, 0.0),
        GeometryKind::Arc { curvature } => arc_local(curvature, ds),
        GeometryKind::Spiral {
            curv_start,
            curv_end,
        } => spiral_local(curv_start, curv_end, length, ds),
        GeometryKind::Poly3(poly) => poly3_local(&poly, ds),
        GeometryKind::ParamPoly3 { u, v, p_range } => {
            let p = match p_range {
                ParamRange::ArcLength => ds,
                ParamRange::Normalized if length > 0.0 => ds / length,
                ParamRange::Normalized => 0.0,
            };
            param_poly3_local(&u, &v, p)
        }
    };

    let position = DVec2::new(primitive.x, primitive.y) + DVec2::from_angle(primitive.hdg).rotate(local);
    Ok(Pose {
        x: position.x,
        y: position.y,
        hdg: primitive.hdg + hdg_offset,
        curvature,
    })
}

/// Pose at the end of `primitive`.
pub fn end_pose(primitive: &GeometryPrimitive) -> Result<Pose> {
    evaluate(primitive, primitive.length.max(0.0))
}

fn arc_local(curvature: f64, ds: f64) -> (DVec2, f64, f64) {
    if curvature.abs() < CURVATURE_EPSILON {
        return (DVec2::new(ds, 0.0), 0.0, 0.0);
    }
    let theta = curvature * ds;
    let (sin, cos) = theta.sin_cos();
    (
        DVec2::new(sin / curvature, (1.0 - cos) / curvature),
        theta,
        curvature,
    )
}

fn spiral_local(curv_start: f64, curv_end: f64, length: f64, ds: f64) -> (DVec2, f64, f64) {
    let rate = if length > 0.0 {
        (curv_end - curv_start) / length
    } else {
        0.0
    };
    let heading = |s: f64| curv_start * s + 0.5 * rate * s * s;

    let max_curvature = curv_start.abs().max((curv_start + rate * ds).abs());
    let position = gauss_legendre(
        |s| DVec2::from_angle(heading(s)),
        0.0,
        ds,
        subintervals(ds, max_curvature * ds),
    );

    (position, heading(ds), curv_start + rate * ds)
}

fn poly3_local(poly: &CubicPoly, ds: f64) -> (DVec2, f64, f64) {
    let speed = |u: f64| (1.0 + poly.derivative(u).powi(2)).sqrt();
    let arc_length = |u: f64| gauss_legendre(speed, 0.0, u, subintervals(u, 0.0));

    // The curve is never shorter than its projection, so u <= ds.
    let mut u = ds;
    for _ in 0..NEWTON_MAX_ITERATIONS {
        let residual = arc_length(u) - ds;
        if residual.abs() < NEWTON_TOLERANCE {
            break;
        }
        u = (u - residual / speed(u)).max(0.0);
    }

    let slope = poly.derivative(u);
    let curvature = poly.second_derivative(u) / (1.0 + slope * slope).powf(1.5);
    (DVec2::new(u, poly.eval(u)), slope.atan(), curvature)
}

fn param_poly3_local(u: &CubicPoly, v: &CubicPoly, p: f64) -> (DVec2, f64, f64) {
    let du = u.derivative(p);
    let dv = v.derivative(p);
    let ddu = u.second_derivative(p);
    let ddv = v.second_derivative(p);

    let speed_sq = du * du + dv * dv;
    let (hdg_offset, curvature) = if speed_sq > 0.0 {
        (dv.atan2(du), (du * ddv - dv * ddu) / speed_sq.powf(1.5))
    } else {
        (0.0, 0.0)
    };

    (DVec2::new(u.eval(p), v.eval(p)), hdg_offset, curvature)
}

fn subintervals(span: f64, turn: f64) -> usize {
    let by_length = (span.abs() / MAX_SUBINTERVAL).ceil();
    let by_turn = (turn.abs() / MAX_SUBINTERVAL_TURN).ceil();
    (by_length.max(by_turn) as usize).clamp(1, MAX_SUBINTERVALS)
}

const GL5_NODES: [f64; 5] = [
    0.0,
    -0.538_469_310_105_683_1,
    0.538_469_310_105_683_1,
    -0.906_179_845_938_664,
    0.906_179_845_938_664,
];
const GL5_WEIGHTS: [f64; 5] = [
    0.568_888_888_888_888_9,
    0.478_628_670_499_366_5,
    0.478_628_670_499_366_5,
    0.236_926_885_056_189_1,
    0.236_926_885_056_189_1,
];

/// Composite 5-point Gauss-Legendre quadrature of `f` over `[a, b]`.
fn gauss_legendre<T, F>(f: F, a: f64, b: f64, n: usize) -> T
where
    T: Copy + Default + Add<Output = T> + Mul<f64, Output = T>,
    F: Fn(f64) -> T,
{
    let h = (b - a) / n as f64;
    let mut sum = T::default();
    for i in 0..n {
        let mid = a + (i as f64 + 0.5) * h;
        for (node, weight) in GL5_NODES.iter().zip(GL5_WEIGHTS.iter()) {
            sum = sum + f(mid + 0.5 * h * node) * (weight * 0.5 * h);
        }
    }
    sum
}
