// utils/binary.rs

//! # Binary Utility Module
//!
//! Locates the external programs the application drives (`wkhtmltopdf`,
//! `sendmail`). A configured value containing a path separator is checked
//! as a path; a bare name is looked up in the current directory and then in
//! `PATH`.

use std::env;
use std::path::{Path, PathBuf};

use super::platform::executable_name;

/// Returns the full path of `binary`, if it can be found.
pub fn find_binary(binary: &str) -> Option<PathBuf> {
    let candidate = Path::new(binary);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let name = executable_name(binary);

    if let Ok(current_dir) = env::current_dir() {
        let local = current_dir.join(&name);
        if local.is_file() {
            return Some(local);
        }
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(&name))
        .find(|full| full.is_file())
}
