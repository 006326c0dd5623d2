//! Numeric engine behind the spectra-stack viewer.
//!
//! Load comma- or tab-delimited spectra, stack their channels with a
//! vertical offset, subtract anchor-point baselines, smooth, and undo the
//! last change. Rendering lives in the binary; everything here is headless.

pub mod activity;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod processing;
pub mod state;

pub use error::{EngineError, ErrorKind, Result};
