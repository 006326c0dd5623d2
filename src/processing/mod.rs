/// Processing layer: everything derived from or applied to a dataset.
///
/// ```text
///   SpectralDataset ──► offset::project ──► Vec<Trace>   (read-only)
///         │
///         ├── baseline::apply_baseline   ┐
///         ├── smoothing::apply_smoothing ┘ capture snapshot, then mutate
///         └── undo::undo                   restore snapshot
/// ```

pub mod baseline;
pub mod offset;
pub mod smoothing;
pub mod undo;

pub use baseline::apply_baseline;
pub use offset::{project, Trace};
pub use smoothing::{apply_smoothing, SmoothingConfig};
pub use undo::{undo, UndoOutcome};
