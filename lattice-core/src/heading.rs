//! The fixed heading discretization shared by the lattice builder and every
//! caller that needs to map a heading in radians to a bin index.

use std::f64::consts::PI;

/// Build the `n_headings`-element Heading Set, normalized to `(-pi, pi]`.
///
/// `headings[i] == ((2*pi*i / n_headings) + pi) mod 2*pi - pi`.
pub fn heading_set(n_headings: u32) -> Vec<f64> {
    (0..n_headings)
        .map(|i| normalize_bin_angle(i, n_headings))
        .collect()
}

fn normalize_bin_angle(i: u32, n_headings: u32) -> f64 {
    let raw = (2.0 * PI * i as f64 / n_headings as f64) + PI;
    let wrapped = raw.rem_euclid(2.0 * PI);
    wrapped - PI
}

/// Shortest-arc angular distance between two angles, in `[0, pi]`.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).abs();
    d.min(2.0 * PI - d)
}

/// Index of the heading bin nearest to `angle` (any real radian value).
pub fn nearest_heading_index(headings: &[f64], angle: f64) -> usize {
    headings
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            angular_distance(**a, angle)
                .partial_cmp(&angular_distance(**b, angle))
                .unwrap()
        })
        .map(|(i, _)| i)
        .expect("heading set is non-empty")
}
