// core/env.rs

//! # Environment Variable Handling
//!
//! Collects `PAYSLIP_*` settings overrides from three layers, later layers
//! winning: the process environment, a `.env` file, and `-e KEY=VALUE` flags.

use std::collections::HashMap;
use std::env;
use std::path::Path;

use log::{debug, warn};

/// Prefix of every variable the application reads.
const ENV_PREFIX: &str = "PAYSLIP_";

/// Load settings overrides from the environment, a .env file and CLI flags.
///
/// # Arguments
/// * `env_file` - Path to the .env file; a missing file is not an error
/// * `overrides` - Additional KEY=VALUE pairs from `-e` CLI flags
pub fn load_env_vars(env_file: &Path, overrides: &[String]) -> HashMap<String, String> {
    let mut env_vars: HashMap<String, String> = env::vars()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect();

    if env_file.exists() {
        debug!("Loading environment variables from: {}", env_file.display());
        match dotenvy::from_path_iter(env_file) {
            Ok(iter) => {
                for (key, value) in iter.flatten() {
                    if key.starts_with(ENV_PREFIX) {
                        debug!("  Loaded env var: {}", key);
                        env_vars.insert(key, value);
                    }
                }
            }
            Err(e) => warn!("Could not load env file {}: {}", env_file.display(), e),
        }
    } else {
        debug!("No env file found at: {}", env_file.display());
    }

    for raw in overrides {
        match parse_env_var(raw) {
            Some((key, value)) => {
                debug!("  Override env var: {}", key);
                env_vars.insert(key, value);
            }
            None => warn!("Ignoring malformed override '{}', expected KEY=VALUE", raw),
        }
    }

    env_vars
}

/// Parse a single KEY=VALUE string. The key must be non-empty.
fn parse_env_var(s: &str) -> Option<(String, String)> {
    let (key, value) = s.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}
