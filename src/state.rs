use std::path::Path;

use crate::activity::ActivityLog;
use crate::color::{ColorAssignment, Palette};
use crate::config::Settings;
use crate::data::SpectralDataset;
use crate::error::Result;
use crate::processing::{self, SmoothingConfig, Trace, UndoOutcome};

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

/// Last message shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Info(s) | Status::Error(s) => s,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Everything one viewer window works on, independent of rendering.
///
/// All changes go through the methods below; each one refreshes the
/// derived traces and colours and writes to the activity log.
pub struct Session {
    /// Loaded data plus undo snapshot.
    pub dataset: SpectralDataset,

    /// Vertical distance between consecutive stacked channels.
    pub offset: f64,

    /// Active colour ramp.
    pub palette: Palette,

    /// Per-channel colours, index-aligned with `traces`.
    pub colors: ColorAssignment,

    /// Projected traces for the current data and offset (cached).
    pub traces: Vec<Trace>,

    /// Baseline anchor text as typed by the user.
    pub anchor_text: String,

    /// Smoothing method selected in the UI.
    pub smoothing: SmoothingConfig,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,

    activity: ActivityLog,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&Settings::default(), ActivityLog::disabled())
    }
}

impl Session {
    pub fn new(settings: &Settings, activity: ActivityLog) -> Self {
        Self {
            dataset: SpectralDataset::new(),
            offset: settings.offset,
            palette: settings.palette,
            colors: ColorAssignment::new(),
            traces: Vec::new(),
            anchor_text: settings.anchors.clone(),
            smoothing: settings.smoothing,
            status: None,
            activity,
        }
    }

    /// Build a session, opening the activity log named in `settings`.
    ///
    /// An unwritable log file only costs the file sink.
    pub fn from_settings(settings: &Settings) -> Self {
        let activity = match &settings.log_file {
            Some(path) => ActivityLog::open(path).unwrap_or_else(|e| {
                log::warn!("cannot open activity log {}: {e}", path.display());
                ActivityLog::disabled()
            }),
            None => ActivityLog::disabled(),
        };
        Self::new(settings, activity)
    }

    /// Replace the data with the contents of `path`.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        match self.dataset.load_file(path) {
            Ok(format) => {
                self.activity.record(format!("File loaded: {}", path.display()));
                self.activity.record(format!(
                    "header_lines={} and delimiter={}",
                    format.header_lines, format.delimiter
                ));
                self.refresh();
                self.info(format!(
                    "{} loaded: {} channels, {} rows",
                    file_name(path),
                    self.dataset.channel_count(),
                    self.dataset.rows()
                ));
                Ok(())
            }
            Err(e) => Err(self.fail(format!("Failed to load file {}", path.display()), e)),
        }
    }

    /// Add the channels of `path` to the loaded data.
    pub fn append_file(&mut self, path: &Path) -> Result<()> {
        match self.dataset.append_file(path) {
            Ok(added) => {
                self.activity
                    .record(format!("File appended: {} ({added} channels)", path.display()));
                self.refresh();
                self.info(format!(
                    "{} appended: {} channels total",
                    file_name(path),
                    self.dataset.channel_count()
                ));
                Ok(())
            }
            Err(e) => Err(self.fail(format!("Failed to append file {}", path.display()), e)),
        }
    }

    /// A file dialog was closed without choosing anything.
    pub fn no_file_selected(&mut self) {
        self.activity.record("No file selected");
    }

    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
        self.refresh_traces();
        self.activity.record(format!("Plot updated with offset {offset}"));
    }

    pub fn apply_palette(&mut self, palette: Palette) {
        self.palette = palette;
        self.refresh_colors();
        self.activity.record(format!("Colors applied: {palette}"));
    }

    /// Subtract the baseline through `anchor_text` (see [`processing::apply_baseline`]).
    pub fn apply_baseline(&mut self, anchor_text: &str) -> Result<()> {
        match processing::apply_baseline(&mut self.dataset, anchor_text) {
            Ok(()) => {
                self.activity
                    .record(format!("Baseline corrected with anchors [{anchor_text}]"));
                self.refresh_traces();
                self.info("Baseline corrected");
                Ok(())
            }
            Err(e) => Err(self.fail("Failed to apply baseline", e)),
        }
    }

    /// Smooth the pre-smoothing data with `config` (see [`processing::apply_smoothing`]).
    pub fn apply_smoothing(&mut self, config: SmoothingConfig) -> Result<()> {
        match processing::apply_smoothing(&mut self.dataset, &config) {
            Ok(()) => {
                self.activity.record(format!("Smoothing applied: {config}"));
                self.refresh_traces();
                self.info(format!("{} smoothing applied", config.method_name()));
                Ok(())
            }
            Err(e) => Err(self.fail("Failed to apply smoothing", e)),
        }
    }

    pub fn undo(&mut self) -> UndoOutcome {
        let outcome = processing::undo(&mut self.dataset);
        self.activity.record(format!("Undo: {outcome}"));
        if outcome == UndoOutcome::Restored {
            self.refresh();
        }
        self.info(capitalize(&outcome.to_string()));
        outcome
    }

    /// Recompute traces and colours after the data changed.
    fn refresh(&mut self) {
        self.refresh_traces();
        self.refresh_colors();
    }

    fn refresh_traces(&mut self) {
        self.traces = self
            .dataset
            .current()
            .map(|m| processing::project(m, self.offset))
            .unwrap_or_default();
    }

    fn refresh_colors(&mut self) {
        self.colors = self.palette.colors(self.dataset.channel_count());
    }

    fn info(&mut self, message: impl Into<String>) {
        self.status = Some(Status::Info(message.into()));
    }

    fn fail<E: std::fmt::Display>(&mut self, context: impl Into<String>, err: E) -> E {
        let message = format!("{}: {err}", context.into());
        self.activity.record_error(&message);
        self.status = Some(Status::Error(message));
        err
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_dat(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(body.as_bytes())
            .unwrap();
        path
    }

    fn logged_session(dir: &tempfile::TempDir) -> (Session, PathBuf) {
        let log_path = dir.path().join("activity.log");
        let settings = Settings {
            log_file: Some(log_path.clone()),
            ..Settings::default()
        };
        (Session::from_settings(&settings), log_path)
    }

    #[test]
    fn load_refreshes_traces_and_colors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_dat(&dir, "a.dat", "1000\t0.1\t0.2\n999\t0.15\t0.25\n998\t0.12\t0.22\n");

        let mut session = Session::default();
        session.load_file(&path).unwrap();
        assert_eq!(session.traces.len(), 2);
        assert_eq!(session.colors.len(), 2);
        assert!(!session.status.as_ref().unwrap().is_error());

        session.set_offset(1.0);
        assert_eq!(session.traces[1].points[1][1], 1.0);
    }

    #[test]
    fn every_action_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_dat(&dir, "a.dat", "x,y\n3,1\n2,2\n1,3\n");
        let short = write_dat(&dir, "b.dat", "3,1\n2,2\n");
        let (mut session, log_path) = logged_session(&dir);

        session.no_file_selected();
        session.load_file(&a).unwrap();
        session.apply_palette(Palette::Red);
        session.apply_baseline("1").unwrap();
        session.apply_smoothing(SmoothingConfig::MovingAverage { window: 2 }).unwrap();
        assert_eq!(session.undo(), UndoOutcome::Restored);
        assert_eq!(session.undo(), UndoOutcome::NothingToUndo);
        let err = session.append_file(&short).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DimensionMismatch);
        assert!(session.status.as_ref().unwrap().is_error());
        drop(session);

        let text = std::fs::read_to_string(&log_path).unwrap();
        for needle in [
            "Application started",
            "No file selected",
            "File loaded:",
            "header_lines=1 and delimiter=comma",
            "Colors applied: Red",
            "Baseline corrected with anchors [1]",
            "Smoothing applied: moving average (window 2)",
            "Undo: last change undone",
            "Undo: nothing to undo",
            "Error: Failed to append file",
            "Application finished",
        ] {
            assert!(text.contains(needle), "missing {needle:?} in\n{text}");
        }
    }

    #[test]
    fn failed_load_keeps_previous_data() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_dat(&dir, "a.dat", "1,2\n3,4\n");
        let bad = write_dat(&dir, "bad.dat", "header only\n");

        let mut session = Session::default();
        session.load_file(&good).unwrap();
        let before = session.dataset.current().cloned();
        assert_eq!(session.load_file(&bad).unwrap_err().kind(), ErrorKind::Parse);
        assert_eq!(session.dataset.current().cloned(), before);
        assert_eq!(session.traces.len(), 1);
    }

    #[test]
    fn undo_with_nothing_is_reported_not_fatal() {
        let mut session = Session::default();
        assert_eq!(session.undo(), UndoOutcome::NothingToUndo);
        assert_eq!(session.status, Some(Status::Info("Nothing to undo".into())));
    }
}
