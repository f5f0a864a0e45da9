use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::handler::{impl_core_handler, Handler, HandlerCore};
use crate::{Level, LogError, LogRecord, LogResult};

/// Day granularity, the default.
pub const FILE_PER_DAY: &str = "%Y-%m-%d";
/// Month granularity.
pub const FILE_PER_MONTH: &str = "%Y-%m";
/// Year granularity.
pub const FILE_PER_YEAR: &str = "%Y";

const ALLOWED_DATE_FORMATS: [&str; 5] =
    [FILE_PER_DAY, "%Y%m%d", FILE_PER_MONTH, "%Y%m", FILE_PER_YEAR];
const DEFAULT_FILENAME_FORMAT: &str = "{filename}-{date}";

/// Writes to one file per day (or month, or year) and keeps at most
/// `max_files` of them.
///
/// The date of a file comes from the records written to it. `max_files = 0`
/// keeps every file.
#[derive(Debug)]
pub struct RotatingFileHandler {
    core: HandlerCore,
    filename: PathBuf,
    max_files: usize,
    file_permission: Option<u32>,
    filename_format: String,
    date_format: String,
    current: Mutex<Option<(PathBuf, File)>>,
}

impl RotatingFileHandler {
    /// Creates a handler for `filename`, e.g. `logs/app.log` becomes
    /// `logs/app-2024-01-31.log`.
    pub fn new(filename: impl Into<PathBuf>, max_files: usize, level: Level, bubble: bool) -> Self {
        RotatingFileHandler {
            core: HandlerCore::new(level, bubble),
            filename: filename.into(),
            max_files,
            file_permission: None,
            filename_format: DEFAULT_FILENAME_FORMAT.to_owned(),
            date_format: FILE_PER_DAY.to_owned(),
            current: Mutex::new(None),
        }
    }

    /// Unix permission bits applied when a file is created.
    pub fn with_file_permission(mut self, mode: u32) -> Self {
        self.file_permission = Some(mode);
        self
    }

    /// Changes how rotated files are named.
    ///
    /// `filename_format` must contain `{date}` and may contain `{filename}`;
    /// `date_format` must be one of `%Y-%m-%d`, `%Y%m%d`, `%Y-%m`, `%Y%m` or
    /// `%Y`.
    pub fn set_filename_format(
        &mut self,
        filename_format: &str,
        date_format: &str,
    ) -> LogResult<()> {
        if !ALLOWED_DATE_FORMATS.contains(&date_format) {
            return Err(LogError::InvalidArgument(format!(
                "invalid date format {date_format:?}, use one of {}",
                ALLOWED_DATE_FORMATS.join(", ")
            )));
        }
        if !filename_format.contains("{date}") {
            return Err(LogError::InvalidArgument(
                "invalid filename format, it must contain {date}".to_owned(),
            ));
        }
        self.filename_format = filename_format.to_owned();
        self.date_format = date_format.to_owned();
        if let Ok(mut current) = self.current.lock() {
            current.take();
        }
        Ok(())
    }

    /// Base file name.
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// How many files are kept; 0 keeps all.
    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Pattern used to name rotated files.
    pub fn filename_format(&self) -> &str {
        &self.filename_format
    }

    /// Date granularity of rotated files.
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Permission bits applied to created files.
    pub fn file_permission(&self) -> Option<u32> {
        self.file_permission
    }

    /// The file written for records created at `datetime`.
    pub fn timed_filename(&self, datetime: DateTime<Utc>) -> PathBuf {
        let date = datetime.format(&self.date_format).to_string();
        self.render(&date)
    }

    fn stem_and_extension(&self) -> (String, Option<String>) {
        let stem = self
            .filename
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = self
            .filename
            .extension()
            .map(|e| e.to_string_lossy().into_owned());
        (stem, extension)
    }

    fn render(&self, date: &str) -> PathBuf {
        let (stem, extension) = self.stem_and_extension();
        let mut name = self
            .filename_format
            .replace("{filename}", &stem)
            .replace("{date}", date);
        if let Some(extension) = extension {
            name.push('.');
            name.push_str(&extension);
        }
        match self.filename.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        }
    }

    fn open(&self, path: &Path) -> LogResult<File> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|err| LogError::io(parent.display().to_string(), err))?;
        }
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        if let Some(mode) = self.file_permission {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        options
            .open(path)
            .map_err(|err| LogError::io(path.display().to_string(), err))
    }

    /// Removes the oldest rotated files beyond `max_files`.
    fn rotate(&self) {
        if self.max_files == 0 {
            return;
        }
        let directory = match self.filename.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        };
        let Some(pattern) = self.render("\0").file_name().map(|n| n.to_string_lossy().into_owned())
        else {
            return;
        };
        let Some((prefix, suffix)) = pattern.split_once('\0') else {
            return;
        };
        let Ok(entries) = std::fs::read_dir(&directory) else {
            return;
        };

        let mut logs: Vec<(String, PathBuf)> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                let date = name.strip_prefix(prefix)?.strip_suffix(suffix)?;
                if date.is_empty() || !date.chars().all(|c| c.is_ascii_digit() || c == '-') {
                    return None;
                }
                Some((date.to_owned(), entry.path()))
            })
            .collect();
        if logs.len() <= self.max_files {
            return;
        }
        logs.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, path) in logs.into_iter().skip(self.max_files) {
            if let Err(err) = std::fs::remove_file(&path) {
                crate::logwire_warn!(
                    name: "RotatingFileHandler.RemoveFailed",
                    file = path.display().to_string(),
                    error = err.to_string()
                );
            }
        }
    }

    fn write(&self, datetime: DateTime<Utc>, output: &str) -> LogResult<()> {
        let path = self.timed_filename(datetime);
        let mut current = self
            .current
            .lock()
            .map_err(|_| LogError::LockPoisoned("RotatingFileHandler"))?;
        let reopen = !matches!(current.as_ref(), Some((open, _)) if *open == path);
        if reopen {
            let file = self.open(&path)?;
            *current = Some((path.clone(), file));
            self.rotate();
        }
        if let Some((_, file)) = current.as_mut() {
            file.write_all(output.as_bytes())
                .and_then(|_| file.flush())
                .map_err(|err| LogError::io(path.display().to_string(), err))?;
        }
        Ok(())
    }
}

impl Handler for RotatingFileHandler {
    fn is_handling(&self, record: &LogRecord) -> bool {
        self.core.is_handling(record)
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        if !self.is_handling(&record) {
            return Ok(false);
        }
        let record = self.core.process(record);
        self.write(record.datetime, &self.core.format(&record))?;
        Ok(!self.core.bubble())
    }

    fn close(&self) -> LogResult<()> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| LogError::LockPoisoned("RotatingFileHandler"))?;
        current.take();
        Ok(())
    }
}

impl_core_handler!(RotatingFileHandler);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn names_files_by_date() {
        let handler = RotatingFileHandler::new("/var/log/app.log", 0, Level::Debug, true);
        assert_eq!(
            handler.timed_filename(at(5)),
            PathBuf::from("/var/log/app-2024-03-05.log")
        );
    }

    #[test]
    fn custom_filename_format() {
        let mut handler = RotatingFileHandler::new("logs/app.log", 0, Level::Debug, true);
        handler.set_filename_format("{date}_{filename}", "%Y%m").unwrap();
        assert_eq!(handler.timed_filename(at(5)), PathBuf::from("logs/202403_app.log"));
    }

    #[test]
    fn monthly_and_yearly_files() {
        let mut handler = RotatingFileHandler::new("logs/app.log", 0, Level::Debug, true);
        handler.set_filename_format("{filename}-{date}", FILE_PER_MONTH).unwrap();
        assert_eq!(handler.timed_filename(at(5)), PathBuf::from("logs/app-2024-03.log"));

        handler.set_filename_format("{filename}-{date}", FILE_PER_YEAR).unwrap();
        assert_eq!(handler.timed_filename(at(5)), PathBuf::from("logs/app-2024.log"));
    }

    #[test]
    fn rejects_bad_formats() {
        let mut handler = RotatingFileHandler::new("app.log", 0, Level::Debug, true);
        assert!(handler.set_filename_format("{filename}", "%Y-%m-%d").is_err());
        assert!(handler.set_filename_format("{filename}-{date}", "%d/%m/%Y").is_err());
    }

    #[test]
    fn keeps_at_most_max_files() {
        let dir = tempfile::tempdir().unwrap();
        let handler = RotatingFileHandler::new(dir.path().join("app.log"), 2, Level::Debug, true);

        for day in 1..=4 {
            handler
                .handle(LogRecord::new("app", Level::Info, "entry").with_datetime(at(day)))
                .unwrap();
        }
        std::fs::write(dir.path().join("unrelated.txt"), "keep").unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec!["app-2024-03-03.log", "app-2024-03-04.log", "unrelated.txt"]
        );

        let content = std::fs::read_to_string(dir.path().join("app-2024-03-04.log")).unwrap();
        assert!(content.contains("app.INFO: entry"));
    }
}
