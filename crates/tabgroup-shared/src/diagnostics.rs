use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    OnceLock,
};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::paths;

const DIAG_ENV: &str = "TABGROUP_LINKER_DIAG";

static DIAG_ENABLED: AtomicBool = AtomicBool::new(false);
static DIAG_ENABLED_INIT: OnceLock<()> = OnceLock::new();

/// Explicitly set diagnostics enabled state. Call early in main().
/// If not called, falls back to checking TABGROUP_LINKER_DIAG env var.
pub fn set_enabled(enabled: bool) {
    DIAG_ENABLED.store(enabled, Ordering::Relaxed);
    let _ = DIAG_ENABLED_INIT.set(());
}

pub fn enabled() -> bool {
    if DIAG_ENABLED_INIT.get().is_some() {
        return DIAG_ENABLED.load(Ordering::Relaxed);
    }

    let env_enabled = std::env::var(DIAG_ENV)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false);
    if env_enabled {
        DIAG_ENABLED.store(true, Ordering::Relaxed);
    }
    let _ = DIAG_ENABLED_INIT.set(());
    env_enabled
}

fn diagnostics_path() -> PathBuf {
    static PATH: OnceLock<PathBuf> = OnceLock::new();
    PATH.get_or_init(|| paths::log_dir().join("diagnostics.log"))
        .clone()
}

fn append_to_file(level: &str, message: &str) {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown-time".to_string());
    let line = format!("[{}] {} {}\n", timestamp, level, message);

    let path = diagnostics_path();
    if let Some(parent) = path.parent() {
        let _ = create_dir_all(parent);
    }
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) {
        let _ = file.write_all(line.as_bytes());
    }
}

/// Debug-only trace line. Dropped entirely unless diagnostics are enabled.
pub fn log(message: impl AsRef<str>) {
    if !enabled() {
        return;
    }
    let message = message.as_ref();
    append_to_file("INFO", message);
    log::info!(target: "tabgroup", "{}", message);
}

/// Debug-only warning.
pub fn warn(message: impl AsRef<str>) {
    if !enabled() {
        return;
    }
    let message = message.as_ref();
    append_to_file("WARN", message);
    log::warn!(target: "tabgroup", "{}", message);
}

/// Errors are always reported. With diagnostics off only the first line of
/// the message is kept so detail dumps stay out of production logs.
pub fn error(message: impl AsRef<str>) {
    let message = message.as_ref();
    if enabled() {
        append_to_file("ERROR", message);
        log::error!(target: "tabgroup", "{}", message);
    } else {
        let summary = message.lines().next().unwrap_or_default();
        log::error!(target: "tabgroup", "{}", summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_enabled_overrides_env() {
        set_enabled(false);
        assert!(!enabled());
        // No file writes happen while disabled; this must not panic.
        log("diag_test_line");
        warn("diag_test_warning");
        error("diag_test_error\nwith detail");
    }
}
