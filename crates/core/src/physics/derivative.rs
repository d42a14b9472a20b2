//! Second-order finite differences on sampled signals
//!
//! Ignition criteria and wall-velocity construction both differentiate
//! discretely sampled traces. The scheme is second-order central
//! differences in the interior and second-order one-sided differences at
//! the boundaries, on a possibly non-uniform time grid (adaptive solvers
//! cluster samples near the ignition event).

/// First derivative `dy/dx` of a sampled signal
///
/// `x` must be strictly increasing and the same length as `y`, with at
/// least two samples. Interior points use the three-point central
/// formula weighted for non-uniform spacing; the end points use
/// three-point one-sided formulas of the same order.
#[must_use]
pub fn first_derivative(x: &[f64], y: &[f64]) -> Vec<f64> {
    assert_eq!(x.len(), y.len(), "sample arrays must have equal length");
    assert!(x.len() >= 2, "need at least two samples to differentiate");

    let n = x.len();
    if n == 2 {
        let slope = (y[1] - y[0]) / (x[1] - x[0]);
        return vec![slope, slope];
    }

    let mut dydx = vec![0.0; n];

    // Left boundary: second-order forward difference
    let h1 = x[1] - x[0];
    let h2 = x[2] - x[1];
    dydx[0] = -(2.0 * h1 + h2) / (h1 * (h1 + h2)) * y[0]
        + (h1 + h2) / (h1 * h2) * y[1]
        - h1 / (h2 * (h1 + h2)) * y[2];

    // Interior: central difference on non-uniform grid
    for i in 1..n - 1 {
        let hm = x[i] - x[i - 1];
        let hp = x[i + 1] - x[i];
        dydx[i] = (hm * hm * y[i + 1] + (hp * hp - hm * hm) * y[i] - hp * hp * y[i - 1])
            / (hm * hp * (hm + hp));
    }

    // Right boundary: second-order backward difference
    let h1 = x[n - 1] - x[n - 2];
    let h2 = x[n - 2] - x[n - 3];
    dydx[n - 1] = (2.0 * h1 + h2) / (h1 * (h1 + h2)) * y[n - 1]
        - (h1 + h2) / (h1 * h2) * y[n - 2]
        + h1 / (h2 * (h1 + h2)) * y[n - 3];

    dydx
}

/// Second derivative `d²y/dx²`, by differentiating twice
#[must_use]
pub fn second_derivative(x: &[f64], y: &[f64]) -> Vec<f64> {
    let first = first_derivative(x, y);
    first_derivative(x, &first)
}

/// Linear interpolation of a sampled function, clamping outside the grid
///
/// `left`/`right` are returned for query points before the first or after
/// the last sample.
#[must_use]
pub fn interp(x: f64, xs: &[f64], ys: &[f64], left: f64, right: f64) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    if xs.is_empty() || x < xs[0] {
        return left;
    }
    if x > xs[xs.len() - 1] {
        return right;
    }
    match xs.binary_search_by(|probe| probe.total_cmp(&x)) {
        Ok(i) => ys[i],
        Err(i) => {
            // xs[i - 1] < x < xs[i]
            let frac = (x - xs[i - 1]) / (xs[i] - xs[i - 1]);
            ys[i - 1] + frac * (ys[i] - ys[i - 1])
        }
    }
}
