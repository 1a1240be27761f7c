use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use once_cell::sync::Lazy;

use crate::storage::data_dir;

static LOG_PATH: Lazy<PathBuf> = Lazy::new(|| {
    let dir = data_dir();
    let _ = fs::create_dir_all(&dir);
    dir.join("nightfall.log")
});

pub fn log_line(line: &str) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&*LOG_PATH) {
        let ts = Local::now().format("%Y-%m-%d %H:%M:%S");
        let _ = writeln!(f, "[{}] {}", ts, line);
    }
}

pub fn log_error(prefix: &str, e: &dyn std::error::Error) {
    log_line(&format!("ERROR: {}: {}", prefix, e));
}
