// globals.rs

//! # Global Configuration Module
//!
//! This module stores the process-wide workspace location and the resolved
//! settings using `OnceCell` for safe, single initialization. Only
//! configuration lives here; datasets are always passed explicitly.
//!
//! ## Example Usage
//! ```rust
//! use crate::globals::{init_globals, workspace_dir, settings};
//!
//! init_globals(PathBuf::from("/srv/payroll"), Settings::default());
//! println!("Templates under: {}", workspace_dir().join("html").display());
//! println!("Branch: {}", settings().branch);
//! ```

use std::path::{Path, PathBuf};

use once_cell::sync::{Lazy, OnceCell};

use crate::app::DEFAULT_WORKSPACE;
use crate::core::config::Settings;

// ============================
// Global Static Variables
// ============================

/// Workspace root holding `html/`, `json/`, `excel/` and `payslip.yml`.
static WORKSPACE_DIR: OnceCell<PathBuf> = OnceCell::new();

/// Settings resolved from `payslip.yml`, `.env` and `-e` overrides.
static SETTINGS: OnceCell<Settings> = OnceCell::new();

static DEFAULT_SETTINGS: Lazy<Settings> = Lazy::new(Settings::default);

// ============================
// Initialization Function
// ============================

/// Initializes the global workspace and settings.
///
/// First initialization wins; later calls are ignored.
pub fn init_globals(workspace: PathBuf, settings: Settings) {
    WORKSPACE_DIR.set(workspace).ok();
    SETTINGS.set(settings).ok();
}

// ============================
// Getter Functions
// ============================

/// Returns the configured workspace directory, or `.` when not initialized.
pub fn workspace_dir() -> &'static Path {
    WORKSPACE_DIR
        .get()
        .map_or(Path::new(DEFAULT_WORKSPACE), |p| p.as_path())
}

/// Returns the resolved settings, or the defaults when not initialized.
pub fn settings() -> &'static Settings {
    SETTINGS.get().unwrap_or(&DEFAULT_SETTINGS)
}
