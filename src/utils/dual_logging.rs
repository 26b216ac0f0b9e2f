use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use crate::utils::app_paths::AppPaths;

/// Global file logger instance
static DUAL_LOGGER: OnceLock<DualLogger> = OnceLock::new();

/// Appends formatted log lines to a timestamped file
pub struct DualLogger {
    log_file: Mutex<Option<File>>,
    log_path: PathBuf,
}

impl DualLogger {
    /// Open `member-admin_<timestamp>.log` in `log_dir`
    pub fn new(log_dir: &Path) -> Self {
        let _ = std::fs::create_dir_all(log_dir);

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("member-admin_{}.log", timestamp));

        #[cfg(unix)]
        {
            let latest_path = log_dir.join("latest.log");
            let _ = std::fs::remove_file(&latest_path);
            let _ = std::os::unix::fs::symlink(&log_path, &latest_path);
        }

        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .ok();

        Self {
            log_file: Mutex::new(log_file),
            log_path,
        }
    }

    /// Write one line to the file
    pub fn log(&self, level: &str, target: &str, message: &str) {
        if let Ok(mut file_opt) = self.log_file.lock() {
            if let Some(ref mut file) = *file_opt {
                let line = format!(
                    "[{}] {} [{}] {}\n",
                    Local::now().format("%H:%M:%S%.3f"),
                    level,
                    target,
                    message
                );
                let _ = file.write_all(line.as_bytes());
                let _ = file.flush();
            }
        }
    }

    pub fn log_path(&self) -> &PathBuf {
        &self.log_path
    }

    pub fn flush(&self) {
        if let Ok(mut file_opt) = self.log_file.lock() {
            if let Some(ref mut file) = *file_opt {
                let _ = file.flush();
            }
        }
    }
}

/// Initialize the global file logger in the default log directory
pub fn init_dual_logger() -> &'static DualLogger {
    DUAL_LOGGER.get_or_init(|| DualLogger::new(&AppPaths::log_dir()))
}

/// Get the global file logger
pub fn get_dual_logger() -> Option<&'static DualLogger> {
    DUAL_LOGGER.get()
}
