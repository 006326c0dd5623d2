use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::SpectralDataset;
use crate::error::{EngineError, Result};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Polynomial order used when none is given.
pub const DEFAULT_POLYNOMIAL_ORDER: usize = 2;

/// Gaussian kernels are cut off at this many standard deviations.
const GAUSSIAN_TRUNCATE: f64 = 4.0;

/// Largest accepted Gaussian sigma, in samples.
pub const MAX_GAUSSIAN_SIGMA: f64 = 1e6;

fn default_order() -> usize {
    DEFAULT_POLYNOMIAL_ORDER
}

/// Smoothing method and its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SmoothingConfig {
    None,
    SavitzkyGolay {
        window: usize,
        #[serde(default = "default_order")]
        polynomial_order: usize,
    },
    Gaussian {
        sigma: f64,
    },
    MovingAverage {
        window: usize,
    },
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        SmoothingConfig::savitzky_golay(11)
    }
}

impl fmt::Display for SmoothingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmoothingConfig::None => write!(f, "none"),
            SmoothingConfig::SavitzkyGolay {
                window,
                polynomial_order,
            } => write!(f, "Savitzky-Golay (window {window}, order {polynomial_order})"),
            SmoothingConfig::Gaussian { sigma } => write!(f, "Gaussian (sigma {sigma})"),
            SmoothingConfig::MovingAverage { window } => write!(f, "moving average (window {window})"),
        }
    }
}

impl SmoothingConfig {
    /// Savitzky-Golay with the default quadratic fit.
    pub fn savitzky_golay(window: usize) -> Self {
        SmoothingConfig::SavitzkyGolay {
            window,
            polynomial_order: DEFAULT_POLYNOMIAL_ORDER,
        }
    }

    /// Short method name for menus and logs.
    pub fn method_name(&self) -> &'static str {
        match self {
            SmoothingConfig::None => "None",
            SmoothingConfig::SavitzkyGolay { .. } => "Savitzky-Golay",
            SmoothingConfig::Gaussian { .. } => "Gaussian",
            SmoothingConfig::MovingAverage { .. } => "Moving average",
        }
    }

    /// Force window sizes into their valid range and reject unusable values.
    ///
    /// Savitzky-Golay windows become the next odd number that is at least 3
    /// and longer than the polynomial order. Moving-average windows become
    /// at least 1.
    pub fn normalized(&self) -> Result<Self> {
        Ok(match *self {
            SmoothingConfig::None => SmoothingConfig::None,
            SmoothingConfig::SavitzkyGolay {
                window,
                polynomial_order,
            } => SmoothingConfig::SavitzkyGolay {
                window: next_odd(window.max(3).max(polynomial_order.saturating_add(1))),
                polynomial_order,
            },
            SmoothingConfig::Gaussian { sigma } => {
                if !sigma.is_finite() || sigma < 0.0 {
                    return Err(EngineError::Value(format!(
                        "Gaussian sigma must be a non-negative number, got {sigma}"
                    )));
                }
                if sigma > MAX_GAUSSIAN_SIGMA {
                    return Err(EngineError::Value(format!(
                        "Gaussian sigma {sigma} exceeds the limit of {MAX_GAUSSIAN_SIGMA}"
                    )));
                }
                SmoothingConfig::Gaussian { sigma }
            }
            SmoothingConfig::MovingAverage { window } => SmoothingConfig::MovingAverage {
                window: window.max(1),
            },
        })
    }

    /// Smooth one channel. The output always has `ys.len()` values.
    ///
    /// Expects a config that went through [`normalized`](Self::normalized).
    pub fn smooth(&self, ys: &[f64]) -> Vec<f64> {
        match *self {
            SmoothingConfig::None => ys.to_vec(),
            SmoothingConfig::SavitzkyGolay {
                window,
                polynomial_order,
            } => savitzky_golay(ys, window, polynomial_order),
            SmoothingConfig::Gaussian { sigma } => gaussian(ys, sigma),
            SmoothingConfig::MovingAverage { window } => moving_average(ys, window),
        }
    }
}

fn next_odd(n: usize) -> usize {
    if n % 2 == 0 {
        n + 1
    } else {
        n
    }
}

// ---------------------------------------------------------------------------
// Dataset operation
// ---------------------------------------------------------------------------

/// Smooth every channel of the pre-smoothing snapshot into `current`.
///
/// The snapshot is only captured when the slot is empty, so repeated calls
/// without an undo in between all start from the same data instead of
/// smoothing already-smoothed values.
pub fn apply_smoothing(dataset: &mut SpectralDataset, config: &SmoothingConfig) -> Result<()> {
    if !dataset.is_loaded() {
        return Err(EngineError::not_loaded());
    }
    let config = config.normalized()?;

    if dataset.discard_stale_snapshot() {
        log::warn!("channel layout changed since the last snapshot; smoothing from current data");
    }
    dataset.capture_snapshot();

    let (Some(source), Some(current)) = dataset.parts_mut() else {
        return Err(EngineError::not_loaded());
    };
    for (out, ys) in current.channels_mut().iter_mut().zip(source.channels()) {
        *out = config.smooth(ys);
    }

    log::info!("applied {config} smoothing to {} channels", source.channel_count());
    Ok(())
}

// ---------------------------------------------------------------------------
// Savitzky-Golay
// ---------------------------------------------------------------------------

/// Least-squares polynomial smoothing.
///
/// Interior points use the fit of the window centred on them. The first and
/// last `window / 2` points are evaluated on the fit of the first and last
/// full window. A window longer than the data shrinks to the longest odd
/// length that fits; data too short for the polynomial is returned as is.
pub fn savitzky_golay(ys: &[f64], window: usize, order: usize) -> Vec<f64> {
    let n = ys.len();
    let window = if window > n {
        if n % 2 == 0 {
            n.saturating_sub(1)
        } else {
            n
        }
    } else {
        window
    };
    if window <= order || window < 3 {
        return ys.to_vec();
    }

    let half = window / 2;
    let Some(center) = savgol_weights(window, order, 0.0) else {
        return ys.to_vec();
    };

    let mut out = vec![0.0; n];
    for i in half..n - half {
        out[i] = dot(&center, &ys[i - half..=i + half]);
    }

    let head = &ys[..window];
    let tail = &ys[n - window..];
    for k in 0..half {
        let u = k as f64 - half as f64;
        let Some(w) = savgol_weights(window, order, u) else {
            return ys.to_vec();
        };
        out[k] = dot(&w, head);

        let Some(w) = savgol_weights(window, order, -u) else {
            return ys.to_vec();
        };
        out[n - 1 - k] = dot(&w, tail);
    }
    out
}

/// Weights that evaluate the least-squares polynomial of degree `order`,
/// fitted over a window of `window` samples, at offset `u` from the window
/// centre.
fn savgol_weights(window: usize, order: usize, u: f64) -> Option<Vec<f64>> {
    let half = (window / 2) as f64;
    let terms = order + 1;
    let powers = |t: f64| -> Vec<f64> {
        std::iter::successors(Some(1.0), |p| Some(p * t))
            .take(terms)
            .collect()
    };
    let design: Vec<Vec<f64>> = (0..window).map(|j| powers(j as f64 - half)).collect();

    // Normal equations: (A^T A) z = p(u); weights = A z.
    let mut normal = vec![vec![0.0; terms]; terms];
    for row in &design {
        for a in 0..terms {
            for b in 0..terms {
                normal[a][b] += row[a] * row[b];
            }
        }
    }
    let z = solve(normal, powers(u))?;
    Some(design.iter().map(|row| dot(row, &z)).collect())
}

/// Gaussian elimination with partial pivoting on a small dense system.
fn solve(mut m: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Option<Vec<f64>> {
    let n = rhs.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))?;
        if m[pivot][col].abs() < f64::EPSILON {
            return None;
        }
        m.swap(col, pivot);
        rhs.swap(col, pivot);

        let pivot_row = m[col].clone();
        let pivot_rhs = rhs[col];
        for r in col + 1..n {
            let factor = m[r][col] / pivot_row[col];
            for c in col..n {
                m[r][c] -= factor * pivot_row[c];
            }
            rhs[r] -= factor * pivot_rhs;
        }
    }

    let mut x = vec![0.0; n];
    for r in (0..n).rev() {
        let tail: f64 = (r + 1..n).map(|c| m[r][c] * x[c]).sum();
        x[r] = (rhs[r] - tail) / m[r][r];
    }
    Some(x)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

// ---------------------------------------------------------------------------
// Gaussian
// ---------------------------------------------------------------------------

/// Convolution with a normalized Gaussian truncated at 4 sigma.
///
/// Samples beyond the ends are mirrored (`d c b a | a b c d | d c b a`).
/// Kernels wider than the mirror period `2n` are folded onto it, so the
/// work per sample never exceeds `2n` taps. Sigma is capped at
/// [`MAX_GAUSSIAN_SIGMA`].
pub fn gaussian(ys: &[f64], sigma: f64) -> Vec<f64> {
    let n = ys.len();
    if n == 0 || sigma == 0.0 {
        return ys.to_vec();
    }
    let sigma = sigma.min(MAX_GAUSSIAN_SIGMA);

    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as isize;
    let period = 2 * n as isize;
    let weight = |j: isize| (-0.5 * (j as f64 / sigma).powi(2)).exp();

    let mut taps: Vec<(isize, f64)> = if 2 * radius + 1 <= period {
        (-radius..=radius).map(|j| (j, weight(j))).collect()
    } else {
        let mut folded = vec![0.0; period as usize];
        for j in -radius..=radius {
            folded[j.rem_euclid(period) as usize] += weight(j);
        }
        folded.into_iter().enumerate().map(|(m, w)| (m as isize, w)).collect()
    };
    let total: f64 = taps.iter().map(|&(_, w)| w).sum();
    taps.iter_mut().for_each(|(_, w)| *w /= total);

    (0..n as isize)
        .map(|i| taps.iter().map(|&(j, w)| w * ys[reflect(i + j, n)]).sum())
        .collect()
}

fn reflect(i: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let m = i.rem_euclid(period) as usize;
    if m < n {
        m
    } else {
        2 * n - 1 - m
    }
}

// ---------------------------------------------------------------------------
// Moving average
// ---------------------------------------------------------------------------

/// Boxcar average over `window` samples, padded at both ends with the first
/// and last averaged value so the length is unchanged.
pub fn moving_average(ys: &[f64], window: usize) -> Vec<f64> {
    let n = ys.len();
    let window = window.clamp(1, n.max(1));
    if n == 0 || window == 1 {
        return ys.to_vec();
    }

    let averages: Vec<f64> = ys
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect();

    let left = (window - 1) / 2;
    let right = window - 1 - left;
    let first = averages[0];
    let last = averages[averages.len() - 1];

    let mut out = Vec::with_capacity(n);
    out.extend(std::iter::repeat(first).take(left));
    out.extend_from_slice(&averages);
    out.extend(std::iter::repeat(last).take(right));
    out
}
