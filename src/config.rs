use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::Palette;
use crate::processing::SmoothingConfig;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Environment variable pointing at a settings file.
pub const CONFIG_ENV: &str = "SPECTRA_STACK_CONFIG";

/// Settings file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "spectra-stack.json";

/// Start-up values for a session. Every field is optional in the file.
///
/// ```json
/// {
///   "log_file": "error.log",
///   "offset": 0.05,
///   "palette": "Thermometer",
///   "smoothing": { "method": "savitzky_golay", "window": 11 },
///   "anchors": "2500, 1800"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Activity log destination; `null` disables the file sink.
    pub log_file: Option<PathBuf>,
    /// Initial vertical offset between stacked channels.
    pub offset: f64,
    pub palette: Palette,
    pub smoothing: SmoothingConfig,
    /// Initial baseline anchor text.
    pub anchors: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_file: Some(PathBuf::from("error.log")),
            offset: 0.0,
            palette: Palette::default(),
            smoothing: SmoothingConfig::default(),
            anchors: String::new(),
        }
    }
}

impl Settings {
    /// Read settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing settings {}", path.display()))
    }

    /// Settings from `$SPECTRA_STACK_CONFIG`, else `./spectra-stack.json`,
    /// else built-in defaults.
    pub fn discover() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::load(local);
        }
        Ok(Self::default())
    }
}
