//! Motion-primitive templates.
//!
//! A template is computed once per starting heading and reused at every
//! vertex that shares that heading: translate the sampled path by the
//! vertex position to get a candidate edge.

use std::f64::consts::TAU;

/// One of the six motion primitives a vertex may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Straight,
    Left,
    Right,
    StraightReverse,
    LeftReverse,
    RightReverse,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 6] = [
        PrimitiveKind::Straight,
        PrimitiveKind::Left,
        PrimitiveKind::Right,
        PrimitiveKind::StraightReverse,
        PrimitiveKind::LeftReverse,
        PrimitiveKind::RightReverse,
    ];

    pub fn is_reverse(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::StraightReverse | PrimitiveKind::LeftReverse | PrimitiveKind::RightReverse
        )
    }
}

/// A template's relative endpoint: offset from the template's own origin,
/// plus the raw (not heading-bin-normalized) arrival heading.
#[derive(Debug, Clone, Copy)]
pub struct TemplateEnd {
    pub dx: f64,
    pub dy: f64,
    pub theta: f64,
}

/// A sampled relative path for one primitive, starting at `(0, 0)`.
#[derive(Debug, Clone)]
pub struct Template {
    pub kind: PrimitiveKind,
    pub end: TemplateEnd,
    pub path: Vec<(f64, f64)>,
}

/// The six templates rooted at a single starting heading `theta0`.
pub struct TemplateSet {
    pub templates: Vec<Template>,
}

/// Build all six templates for starting heading `theta0`.
///
/// Reverse variants are built by reflecting a forward template's sample
/// sequence about its own endpoint: `LeftReverse` reflects the *right* arc
/// (ending at the *left* arc's heading) and `RightReverse` reflects the
/// *left* arc (ending at the *right* arc's heading) — this looks like a
/// swap but is the reference convention (see DESIGN.md); reversing the
/// steering direction while driving backward traces the opposite arc's
/// geometry.
pub fn build_templates(
    theta0: f64,
    turning_radius: f64,
    primitive_length: f64,
    samples: u32,
) -> TemplateSet {
    let n = samples.max(2) as usize;

    let straight_path: Vec<(f64, f64)> = linspace(0.0, 1.0, n)
        .map(|t| (t * primitive_length * theta0.cos(), t * primitive_length * theta0.sin()))
        .collect();
    let straight_end = TemplateEnd {
        dx: primitive_length * theta0.cos(),
        dy: primitive_length * theta0.sin(),
        theta: theta0,
    };

    let dtheta = primitive_length / turning_radius;

    let left_cx = -turning_radius * theta0.sin();
    let left_cy = turning_radius * theta0.cos();
    let left_path: Vec<(f64, f64)> = linspace(0.0, dtheta, n)
        .map(|t| {
            (
                left_cx + turning_radius * (theta0 + t).sin(),
                left_cy - turning_radius * (theta0 + t).cos(),
            )
        })
        .collect();
    let left_end_xy = *left_path.last().unwrap();
    let left_end = TemplateEnd {
        dx: left_end_xy.0,
        dy: left_end_xy.1,
        theta: (theta0 + dtheta).rem_euclid(TAU),
    };

    let right_cx = turning_radius * theta0.sin();
    let right_cy = -turning_radius * theta0.cos();
    let right_path: Vec<(f64, f64)> = linspace(0.0, dtheta, n)
        .map(|t| {
            (
                right_cx - turning_radius * (theta0 - t).sin(),
                right_cy + turning_radius * (theta0 - t).cos(),
            )
        })
        .collect();
    let right_end_xy = *right_path.last().unwrap();
    let right_end = TemplateEnd {
        dx: right_end_xy.0,
        dy: right_end_xy.1,
        theta: (theta0 - dtheta).rem_euclid(TAU),
    };

    let (b_end, b_path) = reflect(&straight_path, (straight_end.dx, straight_end.dy), theta0);
    let (lb_end, lb_path) = reflect(&right_path, right_end_xy, left_end.theta);
    let (rb_end, rb_path) = reflect(&left_path, left_end_xy, right_end.theta);

    TemplateSet {
        templates: vec![
            Template {
                kind: PrimitiveKind::Straight,
                end: straight_end,
                path: straight_path,
            },
            Template {
                kind: PrimitiveKind::Left,
                end: left_end,
                path: left_path,
            },
            Template {
                kind: PrimitiveKind::Right,
                end: right_end,
                path: right_path,
            },
            Template {
                kind: PrimitiveKind::StraightReverse,
                end: b_end,
                path: b_path,
            },
            Template {
                kind: PrimitiveKind::LeftReverse,
                end: lb_end,
                path: lb_path,
            },
            Template {
                kind: PrimitiveKind::RightReverse,
                end: rb_end,
                path: rb_path,
            },
        ],
    }
}

/// Reflect `forward_path` about `forward_end`, producing a path that starts
/// at `(0, 0)` and ends at `-forward_end`, with the given arrival heading.
fn reflect(forward_path: &[(f64, f64)], forward_end: (f64, f64), end_heading: f64) -> (TemplateEnd, Vec<(f64, f64)>) {
    let path: Vec<(f64, f64)> = forward_path
        .iter()
        .rev()
        .map(|&(x, y)| (x - forward_end.0, y - forward_end.1))
        .collect();
    let (ex, ey) = *path.last().unwrap();
    (
        TemplateEnd {
            dx: ex,
            dy: ey,
            theta: end_heading,
        },
        path,
    )
}

fn linspace(start: f64, stop: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n <= 1 { 0.0 } else { (stop - start) / (n - 1) as f64 };
    (0..n).map(move |i| start + step * i as f64)
}

/// Total Euclidean length of a sampled path.
pub fn path_length(path: &[(f64, f64)]) -> f64 {
    path.windows(2)
        .map(|w| ((w[1].0 - w[0].0).powi(2) + (w[1].1 - w[0].1).powi(2)).sqrt())
        .sum()
}
