use crate::data::SpectralDataset;
use crate::error::{EngineError, Result};

// ---------------------------------------------------------------------------
// Anchor parsing and mapping
// ---------------------------------------------------------------------------

/// Parse a comma-separated list of anchor positions and sort it ascending.
pub fn parse_anchors(text: &str) -> Result<Vec<f64>> {
    if text.trim().is_empty() {
        return Err(EngineError::Value("no anchor positions given".into()));
    }

    let mut anchors = text
        .split(',')
        .map(|tok| {
            let tok = tok.trim();
            match tok.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(EngineError::Value(format!("'{tok}' is not a valid anchor position"))),
            }
        })
        .collect::<Result<Vec<f64>>>()?;

    anchors.sort_by(f64::total_cmp);
    Ok(anchors)
}

/// Index of the sample closest to `position`; the first one wins ties.
///
/// Positions outside the sampled range land on the nearest boundary row.
pub fn nearest_row(x: &[f64], position: f64) -> usize {
    x.iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(best, best_dist), (i, &xi)| {
            let dist = (xi - position).abs();
            if dist < best_dist {
                (i, dist)
            } else {
                (best, best_dist)
            }
        })
        .0
}

/// Row indices of the anchors, implicit leading anchor included, in
/// ascending row order.
///
/// Sorting by row keeps segments contiguous when x is descending, as it is
/// for most wavenumber files.
pub fn anchor_rows(x: &[f64], anchors: &[f64]) -> Vec<usize> {
    let Some(&first) = x.first() else {
        return Vec::new();
    };
    let mut rows: Vec<usize> = std::iter::once(first)
        .chain(anchors.iter().copied())
        .map(|a| nearest_row(x, a))
        .collect();
    rows.sort_unstable();
    rows
}

// ---------------------------------------------------------------------------
// Baseline assembly
// ---------------------------------------------------------------------------

/// Piecewise-linear baseline of `ys` through the given anchor rows.
///
/// Rows outside every segment keep a zero baseline. Consecutive anchors on
/// the same row form an empty segment and add nothing.
pub fn piecewise_baseline(ys: &[f64], rows: &[usize]) -> Vec<f64> {
    let mut baseline = vec![0.0; ys.len()];
    for pair in rows.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        if start == end {
            continue;
        }
        let (y0, y1) = (ys[start], ys[end]);
        let span = (end - start) as f64;
        for (r, b) in baseline.iter_mut().enumerate().take(end + 1).skip(start) {
            let t = (r - start) as f64 / span;
            // Weighted form reproduces y0 and y1 exactly at the segment ends.
            *b = y0 * (1.0 - t) + y1 * t;
        }
    }
    baseline
}

/// Subtract an anchor-interpolated baseline from every channel in place.
///
/// `anchor_text` is the user's comma-separated list of positions. The
/// dataset's first x value is always used as an extra leading anchor.
/// A snapshot is captured before any value changes.
pub fn apply_baseline(dataset: &mut SpectralDataset, anchor_text: &str) -> Result<()> {
    let matrix = dataset.current().ok_or_else(EngineError::not_loaded)?;
    let anchors = parse_anchors(anchor_text)?;
    let rows = anchor_rows(matrix.x(), &anchors);
    log::debug!("baseline anchors {anchors:?} -> rows {rows:?}");

    let baselines: Vec<Vec<f64>> = matrix
        .channels()
        .iter()
        .map(|ys| piecewise_baseline(ys, &rows))
        .collect();

    dataset.capture_snapshot();
    let current = dataset.current_mut().ok_or_else(EngineError::not_loaded)?;
    for (ys, baseline) in current.channels_mut().iter_mut().zip(&baselines) {
        for (y, b) in ys.iter_mut().zip(baseline) {
            *y -= b;
        }
    }

    log::info!(
        "baseline subtracted on {} channels using {} anchors",
        baselines.len(),
        rows.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawMatrix;
    use crate::error::ErrorKind;
    use approx::assert_abs_diff_eq;
    use std::path::Path;

    fn dataset(rows: &[Vec<f64>]) -> SpectralDataset {
        let mut ds = SpectralDataset::new();
        ds.replace(RawMatrix::from_rows(rows).unwrap(), Path::new("mem.dat"));
        ds
    }

    /// Descending wavenumbers 1004..1000, one linear channel and one bumped.
    fn sloped() -> SpectralDataset {
        dataset(&[
            vec![1004.0, 1.0, 0.0],
            vec![1003.0, 2.0, 0.0],
            vec![1002.0, 3.0, 5.0],
            vec![1001.0, 4.0, 0.0],
            vec![1000.0, 5.0, 0.0],
        ])
    }

    #[test]
    fn anchors_are_parsed_and_sorted() {
        assert_eq!(parse_anchors(" 3.5, 1,2 ").unwrap(), vec![1.0, 2.0, 3.5]);
    }

    #[test]
    fn bad_anchor_text_is_value_error() {
        for text in ["", "1,,2", "abc", "1;2", "nan"] {
            assert_eq!(parse_anchors(text).unwrap_err().kind(), ErrorKind::Value, "{text:?}");
        }
    }

    #[test]
    fn nearest_row_clamps_and_prefers_first() {
        let x = [10.0, 8.0, 6.0];
        assert_eq!(nearest_row(&x, 100.0), 0);
        assert_eq!(nearest_row(&x, -3.0), 2);
        assert_eq!(nearest_row(&x, 9.0), 0);
        assert_eq!(nearest_row(&x, 6.5), 2);
        assert_eq!(nearest_row(&x, 7.2), 1);
    }

    #[test]
    fn linear_channel_is_flattened() {
        let mut ds = sloped();
        apply_baseline(&mut ds, "1000").unwrap();

        let cur = ds.current().unwrap();
        for &y in cur.channel(0).unwrap() {
            assert_abs_diff_eq!(y, 0.0, epsilon = 1e-12);
        }
        // A peak between the anchors survives untouched.
        assert_eq!(cur.channel(1).unwrap(), &[0.0, 0.0, 5.0, 0.0, 0.0]);
    }

    #[test]
    fn anchor_rows_are_zero_after_correction() {
        let mut ds = dataset(&[
            vec![1.0, 0.3],
            vec![2.0, 0.9],
            vec![3.0, 0.4],
            vec![4.0, 0.8],
            vec![5.0, 0.2],
        ]);
        apply_baseline(&mut ds, "5, 3").unwrap();
        let ys = ds.current().unwrap().channel(0).unwrap();
        assert_eq!(ys[0], 0.0);
        assert_eq!(ys[2], 0.0);
        assert_eq!(ys[4], 0.0);
    }

    #[test]
    fn duplicate_anchor_rows_are_harmless() {
        let mut ds = sloped();
        apply_baseline(&mut ds, "1004, 1003.9, 1000.2, 1000").unwrap();
        let ys = ds.current().unwrap().channel(0).unwrap();
        assert!(ys.iter().all(|y| y.is_finite()));
        assert_abs_diff_eq!(ys[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn only_leading_anchor_changes_nothing() {
        let mut ds = sloped();
        let before = ds.current().unwrap().clone();
        apply_baseline(&mut ds, "1004").unwrap();
        assert_eq!(ds.current().unwrap(), &before);
        assert!(ds.has_snapshot());
    }

    #[test]
    fn rows_past_last_anchor_are_left_alone() {
        let mut ds = sloped();
        apply_baseline(&mut ds, "1002").unwrap();
        let ys = ds.current().unwrap().channel(0).unwrap();
        assert_eq!(&ys[3..], &[4.0, 5.0]);
    }

    #[test]
    fn failures_leave_dataset_untouched() {
        let mut empty = SpectralDataset::new();
        assert_eq!(apply_baseline(&mut empty, "1").unwrap_err().kind(), ErrorKind::State);

        let mut ds = sloped();
        let before = ds.current().unwrap().clone();
        assert_eq!(apply_baseline(&mut ds, "1001, x").unwrap_err().kind(), ErrorKind::Value);
        assert_eq!(ds.current().unwrap(), &before);
        assert!(!ds.has_snapshot());
    }

    #[test]
    fn snapshot_holds_pre_correction_data() {
        let mut ds = sloped();
        let before = ds.current().unwrap().clone();
        apply_baseline(&mut ds, "1000").unwrap();
        assert_eq!(ds.snapshot(), Some(&before));
    }
}
