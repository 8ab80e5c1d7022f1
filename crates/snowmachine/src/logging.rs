//! File logging. The terminal is busy drawing snow, so logs go to
//! `snowmachine.log` in the platform data directory.

use std::fs::{self, File};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::project_dirs;

/// Environment variable holding the log filter, e.g. `snowmachine_render=trace`.
const LOG_ENV: &str = "SNOWMACHINE_LOG";

/// Install the global subscriber. Logging stays off if the file cannot be
/// created.
pub fn init() {
    let Some(dirs) = project_dirs() else {
        return;
    };
    let dir = dirs.data_local_dir();
    if fs::create_dir_all(dir).is_err() {
        return;
    }
    let Ok(file) = File::create(dir.join("snowmachine.log")) else {
        return;
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
