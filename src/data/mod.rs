/// Data layer: sample-file parsing and the session dataset.
///
/// Architecture:
/// ```text
///   .dat / .txt / .csv  (comma or tab, optional header)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  detect header + delimiter → RawMatrix
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────┐
///   │ SpectralDataset  │  current matrix, undo snapshot, source files
///   └─────────────────┘
/// ```

pub mod loader;
pub mod model;

pub use loader::{detect_format, load, load_with_format, Delimiter, FileFormat};
pub use model::{RawMatrix, SpectralDataset};
