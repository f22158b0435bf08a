// template/workspace.rs

//! # Template Workspace
//!
//! File handling for the `html/`, `json/` and `excel/` folders of a workspace.
//! Template files are only ever created inside `html/` or `json/` and are never
//! overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::app::{EXCEL_DIR, HTML_DIR, JSON_DIR};

use super::authoring::AuthoredTemplate;
use super::defaults::BUILT_IN;
use super::{TemplateError, TemplateResult};

/// Result of a no-overwrite file creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Created(PathBuf),
    AlreadyExists(PathBuf),
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatus::Created(p) => write!(f, "File Created: {}", p.display()),
            FileStatus::AlreadyExists(p) => write!(f, "'{}' already exists!", p.display()),
        }
    }
}

/// The template folders of one workspace.
#[derive(Debug, Clone)]
pub struct TemplateWorkspace {
    html_dir: PathBuf,
    json_dir: PathBuf,
    excel_dir: PathBuf,
}

impl TemplateWorkspace {
    pub fn new(root: &Path) -> Self {
        Self {
            html_dir: root.join(HTML_DIR),
            json_dir: root.join(JSON_DIR),
            excel_dir: root.join(EXCEL_DIR),
        }
    }

    pub fn html_dir(&self) -> &Path {
        &self.html_dir
    }

    pub fn json_dir(&self) -> &Path {
        &self.json_dir
    }

    pub fn excel_dir(&self) -> &Path {
        &self.excel_dir
    }

    /// Path of the HTML template `name` (`.html` appended when missing).
    pub fn html_path(&self, name: &str) -> PathBuf {
        self.html_dir.join(with_extension(name, "html"))
    }

    /// Path of the JSON mapping `name` (`.json` appended when missing).
    pub fn json_path(&self, name: &str) -> PathBuf {
        self.json_dir.join(with_extension(name, "json"))
    }

    /// File names of the available HTML templates, sorted.
    pub fn list_html(&self) -> Vec<String> {
        list_with_extension(&self.html_dir, "html")
    }

    /// File names of the available JSON mappings, sorted.
    pub fn list_json(&self) -> Vec<String> {
        list_with_extension(&self.json_dir, "json")
    }

    /// Creates `path` with `contents` unless it exists.
    ///
    /// `path` must sit directly inside the `html/` or `json/` folder.
    pub fn make_file(&self, path: &Path, contents: &str) -> TemplateResult<FileStatus> {
        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        if parent != self.html_dir && parent != self.json_dir {
            return Err(TemplateError::OutsideWorkspace(format!(
                "File path must be within these paths only: {}, {}",
                self.html_dir.display(),
                self.json_dir.display()
            )));
        }

        fs::create_dir_all(parent)?;
        if path.exists() {
            return Ok(FileStatus::AlreadyExists(path.to_path_buf()));
        }

        fs::write(path, contents)?;
        Ok(FileStatus::Created(path.to_path_buf()))
    }

    /// Creates the workspace folders and writes the built-in templates.
    pub fn init(&self) -> TemplateResult<Vec<FileStatus>> {
        for dir in [&self.html_dir, &self.json_dir, &self.excel_dir] {
            fs::create_dir_all(dir)?;
        }

        let mut statuses = Vec::new();
        for (name, html, json) in BUILT_IN {
            statuses.push(self.make_file(&self.html_path(name), html)?);
            statuses.push(self.make_file(&self.json_path(name), json)?);
        }

        for status in &statuses {
            match status {
                FileStatus::Created(_) => info!("[PARSE] {}", status),
                FileStatus::AlreadyExists(_) => error!("[PARSE] {}", status),
            }
        }
        Ok(statuses)
    }

    /// Writes an authored template as `html/<name>.html` and `json/<name>.json`.
    /// Spaces in `name` become underscores.
    pub fn save_authored(
        &self,
        name: &str,
        authored: &AuthoredTemplate,
    ) -> TemplateResult<(FileStatus, FileStatus)> {
        let name = name.trim().replace(' ', "_");
        let html = self.make_file(&self.html_path(&name), &authored.html)?;
        let json = self.make_file(&self.json_path(&name), &authored.mapping_json()?)?;
        Ok((html, json))
    }
}

fn with_extension(name: &str, extension: &str) -> String {
    let suffix = format!(".{}", extension);
    if name.ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{}{}", name, suffix)
    }
}

fn list_with_extension(dir: &Path, extension: &str) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            error!("[PARSE] cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().map_or(false, |e| e == extension))
        .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().to_string()))
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn test_init_never_overwrites() {
        let dir = tempdir().unwrap();
        let workspace = TemplateWorkspace::new(dir.path());

        let first = workspace.init().unwrap();
        assert!(first.iter().all(|s| matches!(s, FileStatus::Created(_))));
        assert!(workspace.excel_dir().is_dir());

        fs::write(workspace.html_path("teaching"), "custom").unwrap();
        let second = workspace.init().unwrap();
        assert!(second.iter().all(|s| matches!(s, FileStatus::AlreadyExists(_))));
        assert_eq!(
            fs::read_to_string(workspace.html_path("teaching")).unwrap(),
            "custom"
        );
    }

    #[test]
    fn test_make_file_outside_workspace() {
        let dir = tempdir().unwrap();
        let workspace = TemplateWorkspace::new(dir.path());
        let result = workspace.make_file(&dir.path().join("evil.html"), "x");
        assert!(matches!(result, Err(TemplateError::OutsideWorkspace(_))));
    }

    #[test]
    fn test_listing() {
        let dir = tempdir().unwrap();
        let workspace = TemplateWorkspace::new(dir.path());
        workspace.init().unwrap();
        fs::write(workspace.html_dir().join("notes.txt"), "").unwrap();

        assert_eq!(workspace.list_html(), vec!["svv.html", "teaching.html"]);
        assert_eq!(workspace.list_json(), vec!["svv.json", "teaching.json"]);
    }

    #[test]
    fn test_listing_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        let workspace = TemplateWorkspace::new(&dir.path().join("nowhere"));
        assert!(workspace.list_html().is_empty());
    }

    #[test]
    fn test_save_authored() {
        let dir = tempdir().unwrap();
        let workspace = TemplateWorkspace::new(dir.path());
        let mut mapping = BTreeMap::new();
        mapping.insert("0".to_string(), "Name".to_string());
        let authored = AuthoredTemplate {
            html: "<p>{{0}}</p>".to_string(),
            mapping,
        };

        let (html, json) = workspace.save_authored("new slip", &authored).unwrap();
        assert_eq!(html, FileStatus::Created(workspace.html_path("new_slip")));
        assert_eq!(json, FileStatus::Created(workspace.json_path("new_slip")));
        assert!(workspace.html_path("new_slip.html").is_file());
    }
}
