use std::path::{Path, PathBuf};

use crate::error::{EngineError, Result};

use super::loader::{self, FileFormat};

// ---------------------------------------------------------------------------
// RawMatrix – the numeric content of one or more sample files
// ---------------------------------------------------------------------------

/// A loaded sample matrix, stored column-wise.
///
/// Column 0 of the source file becomes `x` (the wavenumber axis); every
/// other column becomes one channel. All channels have exactly `x.len()`
/// values.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMatrix {
    x: Vec<f64>,
    channels: Vec<Vec<f64>>,
}

impl RawMatrix {
    /// Build a matrix from file rows (`[x, ch0, ch1, ...]`).
    ///
    /// Fails if there are no rows, fewer than two columns, or ragged rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() {
            return Err(EngineError::Value("matrix has no rows".into()));
        }
        if width < 2 {
            return Err(EngineError::Value(format!(
                "matrix needs at least 2 columns, found {width}"
            )));
        }
        if let Some(i) = rows.iter().position(|r| r.len() != width) {
            return Err(EngineError::Value(format!(
                "row {i} has {} columns, expected {width}",
                rows[i].len()
            )));
        }

        let x = rows.iter().map(|r| r[0]).collect();
        let channels = (1..width)
            .map(|c| rows.iter().map(|r| r[c]).collect())
            .collect();
        Ok(RawMatrix { x, channels })
    }

    /// Build directly from an x axis and channel columns.
    pub fn from_columns(x: Vec<f64>, channels: Vec<Vec<f64>>) -> Result<Self> {
        if x.is_empty() {
            return Err(EngineError::Value("matrix has no rows".into()));
        }
        if channels.is_empty() {
            return Err(EngineError::Value("matrix needs at least one channel".into()));
        }
        if let Some(c) = channels.iter().position(|ch| ch.len() != x.len()) {
            return Err(EngineError::Value(format!(
                "channel {c} has {} values, expected {}",
                channels[c].len(),
                x.len()
            )));
        }
        Ok(RawMatrix { x, channels })
    }

    /// Number of samples (rows).
    pub fn rows(&self) -> usize {
        self.x.len()
    }

    /// Number of intensity channels (columns 1..N of the file).
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// `(rows, columns)` including the independent-variable column.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.channels.len() + 1)
    }

    /// Independent-variable axis.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn channel(&self, index: usize) -> Option<&[f64]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f64>] {
        &self.channels
    }

    pub(crate) fn channels_mut(&mut self) -> &mut [Vec<f64>] {
        &mut self.channels
    }

    /// Rebuild the matrix row `row` as `[x, ch0, ch1, ...]`.
    pub fn row(&self, row: usize) -> Option<Vec<f64>> {
        let x = *self.x.get(row)?;
        let mut out = Vec::with_capacity(self.channels.len() + 1);
        out.push(x);
        out.extend(self.channels.iter().map(|ch| ch[row]));
        Some(out)
    }
}

// ---------------------------------------------------------------------------
// SpectralDataset – current matrix plus single-level undo slot
// ---------------------------------------------------------------------------

/// The session's data: the working matrix, one retained previous state and
/// the files it was built from.
///
/// The snapshot slot is filled only when empty (see [`capture_snapshot`]),
/// so a chain of smoothing passes always starts again from the data as it
/// was before the first of them. Undo is one level deep on purpose.
///
/// [`capture_snapshot`]: SpectralDataset::capture_snapshot
#[derive(Debug, Clone, Default)]
pub struct SpectralDataset {
    current: Option<RawMatrix>,
    snapshot: Option<RawMatrix>,
    sources: Vec<PathBuf>,
}

impl SpectralDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the working matrix with the contents of `path`.
    ///
    /// Any retained snapshot belongs to the previous data and is dropped.
    pub fn load_file(&mut self, path: &Path) -> Result<FileFormat> {
        let (matrix, format) = loader::load_with_format(path)?;
        log::info!(
            "loaded {} rows x {} channels from {}",
            matrix.rows(),
            matrix.channel_count(),
            path.display()
        );
        self.replace(matrix, path);
        Ok(format)
    }

    /// Install an already-parsed matrix as if it had been loaded from `source`.
    pub fn replace(&mut self, matrix: RawMatrix, source: &Path) {
        self.current = Some(matrix);
        self.snapshot = None;
        self.sources = vec![source.to_path_buf()];
    }

    /// Merge the channel columns of `path` onto the loaded matrix.
    ///
    /// The appended file's x column is discarded. Nothing is modified unless
    /// the file parses and has the same row count.
    pub fn append_file(&mut self, path: &Path) -> Result<usize> {
        let current = self
            .current
            .as_mut()
            .ok_or_else(|| EngineError::State("load a file before appending".into()))?;

        let extra = loader::load(path)?;
        if extra.rows() != current.rows() {
            return Err(EngineError::DimensionMismatch {
                expected: current.rows(),
                found: extra.rows(),
            });
        }

        let added = extra.channel_count();
        current.channels.extend(extra.channels);
        self.sources.push(path.to_path_buf());
        log::info!(
            "appended {added} channels from {} ({} total)",
            path.display(),
            current.channel_count()
        );
        Ok(added)
    }

    /// Copy `current` into the snapshot slot, unless a snapshot is already held.
    ///
    /// Returns `true` when a new snapshot was taken.
    pub fn capture_snapshot(&mut self) -> bool {
        match (&self.snapshot, &self.current) {
            (None, Some(current)) => {
                self.snapshot = Some(current.clone());
                true
            }
            _ => false,
        }
    }

    /// Swap the snapshot back in as `current` and empty the slot.
    pub fn restore_snapshot(&mut self) -> Result<()> {
        let snapshot = self
            .snapshot
            .take()
            .ok_or_else(|| EngineError::State("nothing to undo".into()))?;
        self.current = Some(snapshot);
        Ok(())
    }

    /// Drop a snapshot whose shape no longer matches `current`.
    ///
    /// This happens when channels are appended after an uncommitted
    /// baseline or smoothing pass.
    pub(crate) fn discard_stale_snapshot(&mut self) -> bool {
        let stale = match (&self.snapshot, &self.current) {
            (Some(snap), Some(cur)) => snap.shape() != cur.shape(),
            _ => false,
        };
        if stale {
            self.snapshot = None;
        }
        stale
    }

    pub(crate) fn parts_mut(&mut self) -> (Option<&RawMatrix>, Option<&mut RawMatrix>) {
        (self.snapshot.as_ref(), self.current.as_mut())
    }

    pub(crate) fn current_mut(&mut self) -> Option<&mut RawMatrix> {
        self.current.as_mut()
    }

    pub fn current(&self) -> Option<&RawMatrix> {
        self.current.as_ref()
    }

    pub fn snapshot(&self) -> Option<&RawMatrix> {
        self.snapshot.as_ref()
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    /// Number of channels in the working matrix (0 when nothing is loaded).
    pub fn channel_count(&self) -> usize {
        self.current.as_ref().map_or(0, RawMatrix::channel_count)
    }

    pub fn rows(&self) -> usize {
        self.current.as_ref().map_or(0, RawMatrix::rows)
    }

    /// Most recently loaded or appended file.
    pub fn source(&self) -> Option<&Path> {
        self.sources.last().map(PathBuf::as_path)
    }

    /// Every file that contributed to `current`, in load/append order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}
