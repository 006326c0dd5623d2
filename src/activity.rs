use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

// ---------------------------------------------------------------------------
// Activity log – timestamped, append-only record of user actions
// ---------------------------------------------------------------------------

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const RULE_WIDTH: usize = 100;

/// Writes one `timestamp: message` line per session event.
///
/// Lines are also forwarded to the `log` facade. A sink that stops
/// accepting writes is reported once and then ignored; logging never fails
/// an operation.
pub struct ActivityLog {
    sink: Option<Box<dyn Write + Send>>,
    /// Set once the start banner is written; the finish banner pairs with it.
    started: bool,
}

impl ActivityLog {
    /// Open (or create) `path` for appending and mark the session start.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut log = Self::with_writer(file);
        log.start();
        Ok(log)
    }

    /// Log to an arbitrary writer, without start or finish banners.
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Some(Box::new(writer)),
            started: false,
        }
    }

    /// Forward to the `log` facade only.
    pub fn disabled() -> Self {
        Self {
            sink: None,
            started: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn record(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        log::info!("{message}");
        self.write_line(message);
    }

    pub fn record_error(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        log::error!("{message}");
        self.write_line(&format!("Error: {message}"));
    }

    fn start(&mut self) {
        self.write_line(&"-".repeat(RULE_WIDTH));
        self.write_line("Application started");
        self.started = true;
    }

    fn finish(&mut self) {
        if !self.started {
            return;
        }
        self.write_line("Application finished");
        self.write_line(&"-".repeat(RULE_WIDTH));
    }

    fn write_line(&mut self, message: &str) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        let result = writeln!(sink, "{timestamp}: {message}").and_then(|()| sink.flush());
        if let Err(e) = result {
            log::warn!("activity log disabled after write failure: {e}");
            self.sink = None;
        }
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Drop for ActivityLog {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_appends_timestamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.log");

        {
            let mut log = ActivityLog::open(&path).unwrap();
            log.record("File loaded: a.dat");
            log.record_error("bad anchor");
        }
        ActivityLog::open(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert!(lines[1].ends_with(": Application started"));
        assert!(lines[2].ends_with(": File loaded: a.dat"));
        assert!(lines[3].ends_with(": Error: bad anchor"));
        assert!(lines[4].ends_with(": Application finished"));

        // "YYYY-MM-DD HH:MM:SS: "
        let stamp = &lines[2][..19];
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok());
        assert_eq!(lines[2].as_bytes()[19], b':');
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writer_log_has_no_banners() {
        let buffer = SharedBuffer::default();
        {
            let mut log = ActivityLog::with_writer(buffer.clone());
            log.record("Colors applied: Red");
        }
        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(": Colors applied: Red"));
    }

    #[test]
    fn disabled_log_accepts_records() {
        let mut log = ActivityLog::disabled();
        assert!(!log.is_enabled());
        log.record("ignored");
    }
}
