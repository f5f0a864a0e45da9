use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::handler::{impl_core_handler, Handler, HandlerCore};
use crate::{Level, LogError, LogRecord, LogResult};

/// Where a [`StreamHandler`] writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamTarget {
    /// The process' standard output.
    Stdout,
    /// The process' standard error.
    Stderr,
    /// A file, opened in append mode and created when missing.
    Path(PathBuf),
}

impl StreamTarget {
    /// Parses `stdout`, `stderr` (optionally prefixed with `std://`) or a
    /// file path (optionally prefixed with `file://`).
    pub fn parse(stream: &str) -> Self {
        let name = stream.strip_prefix("std://").unwrap_or(stream);
        match name {
            "stdout" | "output" => StreamTarget::Stdout,
            "stderr" => StreamTarget::Stderr,
            _ => StreamTarget::Path(PathBuf::from(
                stream.strip_prefix("file://").unwrap_or(stream),
            )),
        }
    }

    fn describe(&self) -> String {
        match self {
            StreamTarget::Stdout => "stdout".to_owned(),
            StreamTarget::Stderr => "stderr".to_owned(),
            StreamTarget::Path(path) => path.display().to_string(),
        }
    }
}

/// Writes formatted records to stdout, stderr, a file or any writer.
///
/// Files are opened lazily on the first handled record.
pub struct StreamHandler {
    core: HandlerCore,
    target: Option<StreamTarget>,
    file_permission: Option<u32>,
    writer: Mutex<Option<Box<dyn Write + Send>>>,
}

impl StreamHandler {
    /// Creates a handler writing to `target`.
    pub fn new(target: StreamTarget, level: Level, bubble: bool) -> Self {
        StreamHandler {
            core: HandlerCore::new(level, bubble),
            target: Some(target),
            file_permission: None,
            writer: Mutex::new(None),
        }
    }

    /// Creates a handler writing to an already opened writer.
    pub fn from_writer(writer: Box<dyn Write + Send>, level: Level, bubble: bool) -> Self {
        StreamHandler {
            core: HandlerCore::new(level, bubble),
            target: None,
            file_permission: None,
            writer: Mutex::new(Some(writer)),
        }
    }

    /// Unix permission bits applied when the file is created.
    pub fn with_file_permission(mut self, mode: u32) -> Self {
        self.file_permission = Some(mode);
        self
    }

    /// The configured target; `None` for handlers built from a writer.
    pub fn target(&self) -> Option<&StreamTarget> {
        self.target.as_ref()
    }

    /// Permission bits applied to created files.
    pub fn file_permission(&self) -> Option<u32> {
        self.file_permission
    }

    /// Minimum level handled.
    pub fn level(&self) -> Level {
        self.core.level()
    }

    /// Whether handled records keep bubbling.
    pub fn bubble(&self) -> bool {
        self.core.bubble()
    }

    fn describe(&self) -> String {
        self.target
            .as_ref()
            .map(StreamTarget::describe)
            .unwrap_or_else(|| "writer".to_owned())
    }

    fn open(&self) -> LogResult<Box<dyn Write + Send>> {
        match &self.target {
            Some(StreamTarget::Stdout) => Ok(Box::new(io::stdout())),
            Some(StreamTarget::Stderr) => Ok(Box::new(io::stderr())),
            Some(StreamTarget::Path(path)) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)
                        .map_err(|err| LogError::io(self.describe(), err))?;
                }
                let mut options = OpenOptions::new();
                options.create(true).append(true);
                #[cfg(unix)]
                if let Some(mode) = self.file_permission {
                    use std::os::unix::fs::OpenOptionsExt;
                    options.mode(mode);
                }
                let file = options
                    .open(path)
                    .map_err(|err| LogError::io(self.describe(), err))?;
                Ok(Box::new(file))
            }
            None => Err(LogError::InvalidArgument(format!(
                "{} has no stream to reopen",
                self.describe()
            ))),
        }
    }

    fn write(&self, output: &str) -> LogResult<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| LogError::LockPoisoned("StreamHandler"))?;
        if writer.is_none() {
            *writer = Some(self.open()?);
        }
        if let Some(stream) = writer.as_mut() {
            stream
                .write_all(output.as_bytes())
                .and_then(|_| stream.flush())
                .map_err(|err| LogError::io(self.describe(), err))?;
        }
        Ok(())
    }
}

impl fmt::Debug for StreamHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandler")
            .field("core", &self.core)
            .field("target", &self.target)
            .field("file_permission", &self.file_permission)
            .finish()
    }
}

impl Handler for StreamHandler {
    fn is_handling(&self, record: &LogRecord) -> bool {
        self.core.is_handling(record)
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        if !self.is_handling(&record) {
            return Ok(false);
        }
        let record = self.core.process(record);
        self.write(&self.core.format(&record))?;
        Ok(!self.core.bubble())
    }

    fn handle_batch(&self, records: Vec<LogRecord>) -> LogResult<()> {
        let records: Vec<LogRecord> = records
            .into_iter()
            .filter(|record| self.is_handling(record))
            .map(|record| self.core.process(record))
            .collect();
        if records.is_empty() {
            return Ok(());
        }
        self.write(&self.core.formatter().format_batch(&records))
    }

    fn close(&self) -> LogResult<()> {
        // Writers passed in by the caller cannot be reopened, keep them.
        if self.target.is_none() {
            return Ok(());
        }
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| LogError::LockPoisoned("StreamHandler"))?;
        if let Some(mut stream) = writer.take() {
            stream
                .flush()
                .map_err(|err| LogError::io(self.describe(), err))?;
        }
        Ok(())
    }
}

impl_core_handler!(StreamHandler);
