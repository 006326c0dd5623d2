use crate::data::RawMatrix;

// ---------------------------------------------------------------------------
// Offset stacking
// ---------------------------------------------------------------------------

/// One channel ready for plotting: `(x, y)` pairs in file row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub channel: usize,
    pub points: Vec<[f64; 2]>,
}

impl Trace {
    pub fn ys(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p[1])
    }
}

/// Row whose value is subtracted from each channel.
///
/// The second sample is used rather than the first, which is often an
/// instrument edge artefact. Single-row matrices fall back to row 0.
pub const REFERENCE_ROW: usize = 1;

/// Stack every channel of `matrix` for display.
///
/// `trace_i = channel_i - channel_i[REFERENCE_ROW] + offset * i`
pub fn project(matrix: &RawMatrix, offset: f64) -> Vec<Trace> {
    let reference = REFERENCE_ROW.min(matrix.rows().saturating_sub(1));
    let x = matrix.x();

    matrix
        .channels()
        .iter()
        .enumerate()
        .map(|(i, ys)| {
            let shift = offset * i as f64 - ys[reference];
            let points = x.iter().zip(ys).map(|(&xi, &yi)| [xi, yi + shift]).collect();
            Trace { channel: i, points }
        })
        .collect()
}
