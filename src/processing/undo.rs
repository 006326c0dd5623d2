use std::fmt;

use crate::data::SpectralDataset;

/// What an undo request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The snapshot replaced the working matrix.
    Restored,
    /// No mutation was pending; the dataset is unchanged.
    NothingToUndo,
}

impl fmt::Display for UndoOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndoOutcome::Restored => write!(f, "last change undone"),
            UndoOutcome::NothingToUndo => write!(f, "nothing to undo"),
        }
    }
}

/// Revert the last baseline or smoothing pass.
///
/// Undo is a single level: a second call without a new mutation in between
/// reports [`UndoOutcome::NothingToUndo`].
pub fn undo(dataset: &mut SpectralDataset) -> UndoOutcome {
    match dataset.restore_snapshot() {
        Ok(()) => {
            log::info!("restored snapshot");
            UndoOutcome::Restored
        }
        Err(e) => {
            log::debug!("undo ignored: {e}");
            UndoOutcome::NothingToUndo
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawMatrix;
    use crate::processing::{apply_baseline, apply_smoothing, SmoothingConfig};
    use std::path::Path;

    fn dataset() -> SpectralDataset {
        let mut ds = SpectralDataset::new();
        let m = RawMatrix::from_rows(&[
            vec![10.0, 0.31, 1.7],
            vec![9.0, 0.52, 1.1],
            vec![8.0, 0.13, 1.9],
            vec![7.0, 0.44, 1.3],
        ])
        .unwrap();
        ds.replace(m, Path::new("mem.dat"));
        ds
    }

    #[test]
    fn undo_restores_bit_identical_data() {
        let mut ds = dataset();
        let before = ds.current().unwrap().clone();

        apply_baseline(&mut ds, "7").unwrap();
        assert_ne!(ds.current().unwrap(), &before);
        assert_eq!(undo(&mut ds), UndoOutcome::Restored);
        assert_eq!(ds.current().unwrap(), &before);

        apply_smoothing(&mut ds, &SmoothingConfig::Gaussian { sigma: 1.0 }).unwrap();
        assert_eq!(undo(&mut ds), UndoOutcome::Restored);
        assert_eq!(ds.current().unwrap(), &before);
    }

    #[test]
    fn second_undo_reports_nothing() {
        let mut ds = dataset();
        apply_smoothing(&mut ds, &SmoothingConfig::MovingAverage { window: 3 }).unwrap();
        assert_eq!(undo(&mut ds), UndoOutcome::Restored);
        assert_eq!(undo(&mut ds), UndoOutcome::NothingToUndo);
        assert_eq!(undo(&mut SpectralDataset::new()), UndoOutcome::NothingToUndo);
    }

    #[test]
    fn baseline_then_smoothing_undoes_both() {
        let mut ds = dataset();
        let before = ds.current().unwrap().clone();
        apply_baseline(&mut ds, "7").unwrap();
        apply_smoothing(&mut ds, &SmoothingConfig::savitzky_golay(3)).unwrap();
        assert_eq!(undo(&mut ds), UndoOutcome::Restored);
        assert_eq!(ds.current().unwrap(), &before);
    }
}
