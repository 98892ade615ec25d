use std::path::{Path, PathBuf};

const HOME_ENV: &str = "TABGROUP_LINKER_HOME";

/// Root directory for everything the background process writes.
///
/// Honours `TABGROUP_LINKER_HOME` so tests and the simulator can point at a
/// scratch directory instead of `~/.tabgroup-linker`.
pub fn app_root() -> PathBuf {
    if let Some(dir) = std::env::var_os(HOME_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| Path::new("/").to_path_buf())
        .join(".tabgroup-linker")
}

pub fn log_dir() -> PathBuf {
    app_root().join("logs")
}

pub fn profile_dir(profile: &str) -> PathBuf {
    app_root().join("profiles").join(profile)
}
