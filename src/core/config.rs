// core/config.rs

//! # Configuration Module
//!
//! Loads the workspace configuration file (`payslip.yml`), applies
//! environment overrides and validates the result.
//!
//! Every field has a default, so a workspace without a configuration file is
//! valid. A minimal file looks like:
//!
//! ```yaml
//! branch: Sion
//! identifier_column: HR EMP CODE
//! workers: 4
//! renderer:
//!   binary: /usr/local/bin/wkhtmltopdf
//! mail:
//!   sender: payroll@example.org
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app::{
    CONFIG_FILE_NAME, DEFAULT_BRANCH, DEFAULT_DATABASE, DEFAULT_IDENTIFIER_COLUMN,
    DEFAULT_SENDMAIL, DEFAULT_WKHTMLTOPDF,
};

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid field: {0}")]
    InvalidField(String),
}

/// Type alias for configuration results
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Resolved application settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Literal bound to the `branch` field of every slip
    pub branch: String,

    /// Identifier column hint, matched fuzzily against the dataset columns
    pub identifier_column: String,

    /// SQLite payroll database, relative paths resolve against the workspace
    pub database: PathBuf,

    /// Maximum concurrent PDF renders
    pub workers: usize,

    /// HTML to PDF engine settings
    pub renderer: RendererSettings,

    /// Outgoing mail settings
    pub mail: MailSettings,
}

/// Settings for the `wkhtmltopdf` renderer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RendererSettings {
    pub binary: String,
    pub page_size: String,
    pub margin: String,
    pub extra_args: Vec<String>,
}

/// Settings for the sendmail transport.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MailSettings {
    /// `From:` address
    pub sender: String,
    pub binary: String,
    pub args: Vec<String>,
    pub workers: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            branch: DEFAULT_BRANCH.to_string(),
            identifier_column: DEFAULT_IDENTIFIER_COLUMN.to_string(),
            database: PathBuf::from(DEFAULT_DATABASE),
            workers: num_cpus::get(),
            renderer: RendererSettings::default(),
            mail: MailSettings::default(),
        }
    }
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            binary: DEFAULT_WKHTMLTOPDF.to_string(),
            page_size: "A4".to_string(),
            margin: "0.5in".to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            sender: String::new(),
            binary: DEFAULT_SENDMAIL.to_string(),
            args: vec!["-t".to_string(), "-i".to_string()],
            workers: 4,
        }
    }
}

impl Settings {
    /// Loads settings from a YAML file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads `payslip.yml` from the workspace, falling back to defaults when absent.
    pub fn load_from_workspace(workspace: &Path) -> ConfigResult<Self> {
        let path = workspace.join(CONFIG_FILE_NAME);
        if path.exists() {
            debug!("Loading configuration from: {}", path.display());
            Self::load_from_file(&path)
        } else {
            debug!("No configuration file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Applies `PAYSLIP_*` overrides from the loaded environment variables.
    pub fn apply_env(&mut self, vars: &HashMap<String, String>) -> ConfigResult<()> {
        if let Some(db) = vars.get("PAYSLIP_DATABASE") {
            self.database = PathBuf::from(db);
        }
        if let Some(branch) = vars.get("PAYSLIP_BRANCH") {
            self.branch = branch.clone();
        }
        if let Some(binary) = vars.get("PAYSLIP_WKHTMLTOPDF") {
            self.renderer.binary = binary.clone();
        }
        if let Some(sender) = vars.get("PAYSLIP_SENDER") {
            self.mail.sender = sender.clone();
        }
        if let Some(workers) = vars.get("PAYSLIP_WORKERS") {
            self.workers = workers.trim().parse().map_err(|_| {
                ConfigError::InvalidField(format!("PAYSLIP_WORKERS is not a number: {}", workers))
            })?;
        }
        self.validate()
    }

    /// Resolves the database path against the workspace.
    pub fn database_path(&self, workspace: &Path) -> PathBuf {
        if self.database.is_absolute() {
            self.database.clone()
        } else {
            workspace.join(&self.database)
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidField("workers must be at least 1".to_string()));
        }
        if self.mail.workers == 0 {
            return Err(ConfigError::InvalidField(
                "mail.workers must be at least 1".to_string(),
            ));
        }
        if self.renderer.binary.trim().is_empty() {
            return Err(ConfigError::InvalidField("renderer.binary is empty".to_string()));
        }
        if self.mail.binary.trim().is_empty() {
            return Err(ConfigError::InvalidField("mail.binary is empty".to_string()));
        }
        if self.identifier_column.trim().is_empty() {
            return Err(ConfigError::InvalidField("identifier_column is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "branch: Vidyavihar").unwrap();
        writeln!(file, "workers: 2").unwrap();
        writeln!(file, "renderer:").unwrap();
        writeln!(file, "  binary: /opt/wk/bin/wkhtmltopdf").unwrap();

        let settings = Settings::load_from_file(file.path()).unwrap();
        assert_eq!(settings.branch, "Vidyavihar");
        assert_eq!(settings.workers, 2);
        assert_eq!(settings.renderer.binary, "/opt/wk/bin/wkhtmltopdf");
        assert_eq!(settings.renderer.page_size, "A4");
        assert_eq!(settings.identifier_column, DEFAULT_IDENTIFIER_COLUMN);
        assert_eq!(settings.mail.args, vec!["-t", "-i"]);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "workers: 0").unwrap();

        match Settings::load_from_file(file.path()) {
            Err(ConfigError::InvalidField(msg)) => assert!(msg.contains("workers")),
            other => panic!("Expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_workspace_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load_from_workspace(dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        let mut vars = HashMap::new();
        vars.insert("PAYSLIP_BRANCH".to_string(), "Kurla".to_string());
        vars.insert("PAYSLIP_WORKERS".to_string(), "3".to_string());
        vars.insert("PAYSLIP_DATABASE".to_string(), "/var/lib/payroll.db".to_string());

        settings.apply_env(&vars).unwrap();
        assert_eq!(settings.branch, "Kurla");
        assert_eq!(settings.workers, 3);
        assert_eq!(
            settings.database_path(Path::new("/ws")),
            PathBuf::from("/var/lib/payroll.db")
        );

        vars.insert("PAYSLIP_WORKERS".to_string(), "many".to_string());
        assert!(settings.apply_env(&vars).is_err());
    }

    #[test]
    fn test_relative_database_resolves_against_workspace() {
        let settings = Settings::default();
        assert_eq!(
            settings.database_path(Path::new("/ws")),
            PathBuf::from("/ws").join(DEFAULT_DATABASE)
        );
    }
}
