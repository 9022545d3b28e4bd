use crate::error::{Error, Result};
use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Console logging through env_logger, mirrored to an optional file as
/// `YYYY-mm-dd HH:MM:SS [LEVEL] message` lines.
pub struct Logger {
    console: env_logger::Logger,
    file: Option<Mutex<File>>,
    file_level: LevelFilter,
}

impl Logger {
    pub fn new(debug: bool, log_file: Option<&Path>) -> Result<Self> {
        let level = if debug { LevelFilter::Debug } else { LevelFilter::Info };
        let console = env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .build();

        let file = match log_file {
            Some(path) => Some(Mutex::new(open_log_file(path)?)),
            None => None,
        };

        Ok(Self {
            console,
            file,
            file_level: level,
        })
    }

    pub fn max_level(&self) -> LevelFilter {
        if self.file.is_some() {
            self.console.filter().max(self.file_level)
        } else {
            self.console.filter()
        }
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

fn format_line(record: &Record) -> String {
    format!(
        "{} [{}] {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.args()
    )
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console.enabled(metadata) || (self.file.is_some() && metadata.level() <= self.file_level)
    }

    fn log(&self, record: &Record) {
        if self.console.enabled(record.metadata()) {
            self.console.log(record);
        }
        if let Some(file) = &self.file {
            if record.level() <= self.file_level {
                if let Ok(mut file) = file.lock() {
                    let _ = writeln!(file, "{}", format_line(record));
                }
            }
        }
    }

    fn flush(&self) {
        self.console.flush();
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

/// Installs the global logger. `debug` lowers the level to Debug; `RUST_LOG`
/// still overrides the console filter.
pub fn init(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let logger = Logger::new(debug, log_file)?;
    let max_level = logger.max_level();
    log::set_boxed_logger(Box::new(logger))
        .map_err(|e| Error::InternalError(format!("logger already installed: {}", e)))?;
    log::set_max_level(max_level);
    Ok(())
}
