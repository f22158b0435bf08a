// dataset/loader.rs

//! # Spreadsheet Loader
//!
//! Reads payroll spreadsheets into a `Dataset`. Workbooks (`.xlsx`, `.xlsm`,
//! `.xlsb`, `.xls`, `.ods`) are read with `calamine`, one table per sheet with
//! the first row as header. `.csv` files become a single sheet named after the
//! file stem.
//!
//! Password-protected OOXML workbooks are stored as OLE compound files
//! instead of zip archives; they are detected up front and reported as
//! `LoadError::Encrypted`.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Days, NaiveDate};
use log::{debug, info};
use thiserror::Error;

use super::{Dataset, Table};

/// OLE compound file signature.
const CFB_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Errors that can occur when loading a spreadsheet.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("{0}")]
    Encrypted(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Loads every sheet of the spreadsheet at `path`.
///
/// `password` is accepted for protected workbooks; since decryption is not
/// supported, a protected workbook fails with `LoadError::Encrypted` whether
/// or not a password is given, with a message telling the two cases apart.
pub fn load(path: &Path, password: Option<&str>) -> LoadResult<Dataset> {
    if !path.is_file() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let dataset = match extension.as_str() {
        "csv" => load_csv(path)?,
        "xlsx" | "xlsm" | "xlsb" => {
            if is_encrypted(path)? {
                return Err(LoadError::Encrypted(match password {
                    Some(_) => format!(
                        "{} is password protected and cannot be decrypted; save an unprotected copy",
                        path.display()
                    ),
                    None => format!("{} is password protected; a password is required", path.display()),
                }));
            }
            load_workbook(path)?
        }
        "xls" | "ods" => load_workbook(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    info!(
        "[PARSE] Loaded {} sheet(s) from {}",
        dataset.sheet_names().count(),
        path.display()
    );
    Ok(dataset)
}

/// Loads one sheet, or the first sheet when `sheet` is `None`.
pub fn load_table(path: &Path, password: Option<&str>, sheet: Option<&str>) -> LoadResult<Table> {
    load(path, password)?
        .into_table(sheet)
        .ok_or_else(|| LoadError::SheetNotFound(sheet.unwrap_or("<first>").to_string()))
}

/// Returns true when an OOXML workbook is wrapped in an encrypted OLE container.
fn is_encrypted(path: &Path) -> LoadResult<bool> {
    let mut header = [0u8; 8];
    let mut file = File::open(path)?;
    let read = file.read(&mut header)?;
    Ok(read == header.len() && header == CFB_MAGIC)
}

fn load_workbook(path: &Path) -> LoadResult<Dataset> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| LoadError::Workbook(e.to_string()))?;
    let mut dataset = Dataset::new();

    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| LoadError::Workbook(format!("{}: {}", name, e)))?;

        let mut rows = range.rows();
        let columns: Vec<String> = match rows.next() {
            Some(header) => header.iter().map(cell_to_string).collect(),
            None => {
                debug!("[PARSE] Sheet '{}' is empty", name);
                dataset.insert(name, Table::new(Vec::new(), Vec::new()));
                continue;
            }
        };
        let body: Vec<Vec<String>> = rows
            .map(|row| row.iter().map(cell_to_string).collect::<Vec<String>>())
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .collect();

        debug!("[PARSE] Sheet '{}': {} columns, {} rows", name, columns.len(), body.len());
        dataset.insert(name, Table::with_refined_columns(columns, body));
    }

    Ok(dataset)
}

fn load_csv(path: &Path) -> LoadResult<Dataset> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut body = Vec::new();
    for record in reader.records() {
        let record = record?;
        body.push(record.iter().map(str::to_string).collect());
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Sheet1".to_string());

    let mut dataset = Dataset::new();
    dataset.insert(name, Table::with_refined_columns(columns, body));
    Ok(dataset)
}

/// Renders a cell as text. Integral floats lose their fraction, dates are ISO.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
                format!("{:.0}", f)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(serial) => excel_serial_to_date(serial.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#ERROR:{:?}", e),
    }
}

/// Converts an Excel 1900-system serial to `YYYY-MM-DD`.
fn excel_serial_to_date(serial: f64) -> String {
    let days = serial.floor().max(0.0) as u64;
    let Some(base) = NaiveDate::from_ymd_opt(1899, 12, 30) else {
        return serial.to_string();
    };
    match base.checked_add_days(Days::new(days)) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => serial.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file() {
        match load(Path::new("/no/such/payroll.xlsx"), None) {
            Err(LoadError::NotFound(p)) => assert!(p.ends_with("payroll.xlsx")),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_csv_becomes_single_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("march.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "HR EMP CODE ,Name,Email").unwrap();
        writeln!(file, "E100,Jane Doe,jane@x.com").unwrap();
        writeln!(file, "E101,John Roe").unwrap();

        let dataset = load(&path, None).unwrap();
        let table = dataset.sheet("march").unwrap();
        assert_eq!(table.columns()[0], "HR EMP CODE");
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].get("Email"), Some(""));
    }

    #[test]
    fn test_encrypted_workbook_detected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("locked.xlsx");
        let mut file = File::create(&path).unwrap();
        file.write_all(&CFB_MAGIC).unwrap();
        file.write_all(&[0u8; 64]).unwrap();

        match load(&path, None) {
            Err(LoadError::Encrypted(msg)) => assert!(msg.contains("password is required")),
            other => panic!("Expected Encrypted, got {:?}", other),
        }
        match load(&path, Some("secret")) {
            Err(LoadError::Encrypted(msg)) => assert!(msg.contains("cannot be decrypted")),
            other => panic!("Expected Encrypted, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        File::create(&path).unwrap();
        assert!(matches!(load(&path, None), Err(LoadError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_load_table_sheet_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("april.csv");
        std::fs::write(&path, "A,B\n1,2\n").unwrap();

        assert_eq!(load_table(&path, None, None).unwrap().len(), 1);
        assert!(matches!(
            load_table(&path, None, Some("May")),
            Err(LoadError::SheetNotFound(_))
        ));
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Float(12.0)), "12");
        assert_eq!(cell_to_string(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(excel_serial_to_date(45292.0), "2024-01-01");
    }
}
