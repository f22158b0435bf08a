// store/database.rs

//! # Payroll Database
//!
//! An embedded SQLite database holding one table per
//! `(institute, staff type, month, year)`. Every column is `TEXT`; the
//! identifier column (found fuzzily, `HR EMP CODE` by default) is the primary
//! key, so re-uploading a sheet updates existing employees in place.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use log::{debug, error, info, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use crate::app::DEFAULT_IDENTIFIER_COLUMN;
use crate::core::utils::{clean_value, text_clean};
use crate::dataset::Table;
use crate::template::mapping::map_column;

use super::key::{Month, TableKey};
use super::{CreateResult, DropResult, StoreError, StoreResult, UpsertResult};

/// Stored tables grouped institute -> staff type -> year -> months.
pub type TableListing = BTreeMap<String, BTreeMap<String, BTreeMap<u32, BTreeSet<Month>>>>;

pub struct PayrollStore {
    conn: Connection,
    identifier_column: String,
}

/// Quotes an SQL identifier.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('\n', "").trim().replace('"', "\"\""))
}

impl PayrollStore {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        info!("[DB] Connected to database {}", path.display());
        Ok(Self::with_connection(conn))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::with_connection(Connection::open_in_memory()?))
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn,
            identifier_column: DEFAULT_IDENTIFIER_COLUMN.to_string(),
        }
    }

    /// Sets the identifier column hint used to find the primary key column.
    pub fn with_identifier_column(mut self, column: &str) -> Self {
        self.identifier_column = column.to_string();
        self
    }

    pub fn table_exists(&self, key: &TableKey) -> StoreResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [key.table_name()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Column names of a stored table, in table order.
    pub fn columns(&self, key: &TableKey) -> StoreResult<Vec<String>> {
        if !self.table_exists(key)? {
            return Err(StoreError::TableNotFound(key.table_name()));
        }
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(&key.table_name())))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    /// Creates the table for `key` with `columns` (all `TEXT`).
    pub fn create_table(&self, key: &TableKey, columns: &[String]) -> CreateResult {
        let mut columns: Vec<String> = columns.iter().map(|c| text_clean(c)).collect();
        columns.sort();

        let Some(identifier) = map_column(&columns, &self.identifier_column) else {
            return CreateResult::NoIdentifier;
        };

        match self.table_exists(key) {
            Ok(true) => {
                return match self.columns(key) {
                    Ok(existing) => {
                        let existing: HashSet<&str> = existing.iter().map(String::as_str).collect();
                        let wanted: HashSet<&str> = columns.iter().map(String::as_str).collect();
                        if existing == wanted {
                            CreateResult::Exists
                        } else {
                            CreateResult::ColumnsMismatch
                        }
                    }
                    Err(e) => CreateResult::Error(e.to_string()),
                };
            }
            Ok(false) => {}
            Err(e) => return CreateResult::Error(e.to_string()),
        }

        let definitions: Vec<String> = columns
            .iter()
            .map(|col| {
                if *col == identifier {
                    format!("{} TEXT PRIMARY KEY", quote_ident(col))
                } else {
                    format!("{} TEXT", quote_ident(col))
                }
            })
            .collect();
        let sql = format!(
            "CREATE TABLE {} ({})",
            quote_ident(&key.table_name()),
            definitions.join(", ")
        );

        match self.conn.execute(&sql, []) {
            Ok(_) => {
                info!("[DB] Created table {}", key);
                CreateResult::Success
            }
            Err(e) => {
                error!("[DB] {}", e);
                CreateResult::Error(e.to_string())
            }
        }
    }

    /// Inserts every row of `table`, updating rows whose identifier already exists.
    pub fn upsert_rows(&mut self, key: &TableKey, table: &Table) -> UpsertResult {
        let stored = match self.columns(key) {
            Ok(columns) => columns,
            Err(StoreError::TableNotFound(name)) => {
                warn!("[DB] table {} does not exist", name);
                return UpsertResult::ColumnsMismatch;
            }
            Err(e) => return UpsertResult::Error(e.to_string()),
        };

        let stored: HashSet<&str> = stored.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        let columns_match = table
            .columns()
            .iter()
            .all(|c| stored.contains(c.as_str()) && seen.insert(c.as_str()));
        if !columns_match {
            return UpsertResult::ColumnsMismatch;
        }

        let Some(identifier) = map_column(table.columns(), &self.identifier_column) else {
            return UpsertResult::NoIdentifier;
        };

        match self.write_rows(key, table, &identifier) {
            Ok(count) => {
                info!("[DB] Inserted or updated {} row(s) in {}", count, key);
                UpsertResult::Success(count)
            }
            Err(e) => {
                error!("[DB] {}", e);
                UpsertResult::Error(e.to_string())
            }
        }
    }

    fn write_rows(&mut self, key: &TableKey, table: &Table, identifier: &str) -> StoreResult<usize> {
        let quoted: Vec<String> = table.columns().iter().map(|c| quote_ident(c)).collect();
        let placeholders: Vec<String> = (1..=quoted.len()).map(|i| format!("?{}", i)).collect();
        let updates: Vec<String> = table
            .columns()
            .iter()
            .filter(|c| c.as_str() != identifier)
            .map(|c| format!("{col} = excluded.{col}", col = quote_ident(c)))
            .collect();

        let conflict = if updates.is_empty() {
            "DO NOTHING".to_string()
        } else {
            format!("DO UPDATE SET {}", updates.join(", "))
        };
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) {}",
            quote_ident(&key.table_name()),
            quoted.join(", "),
            placeholders.join(", "),
            quote_ident(identifier),
            conflict
        );
        debug!("[DB] {}", sql);

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in table.rows() {
                stmt.execute(params_from_iter(row.values().iter().map(|v| clean_value(v))))?;
            }
        }
        tx.commit()?;
        Ok(table.len())
    }

    /// Reads a whole stored table; every value comes back as text.
    pub fn fetch_all(&self, key: &TableKey) -> StoreResult<Table> {
        if !self.table_exists(key)? {
            return Err(StoreError::TableNotFound(key.table_name()));
        }

        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {}", quote_ident(&key.table_name())))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, Value>(i).map(value_to_string))
                    .collect::<Result<Vec<String>, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!("[DB] Fetched {} row(s) from {}", rows.len(), key);
        Ok(Table::new(columns, rows))
    }

    pub fn drop_table(&self, key: &TableKey) -> DropResult {
        match self.table_exists(key) {
            Ok(false) => return DropResult::TableNotFound,
            Ok(true) => {}
            Err(e) => return DropResult::Error(e.to_string()),
        }

        match self
            .conn
            .execute(&format!("DROP TABLE {}", quote_ident(&key.table_name())), [])
        {
            Ok(_) => {
                info!("[DB] Dropped table {}", key);
                DropResult::Success
            }
            Err(e) => {
                error!("[DB] {}", e);
                DropResult::Error(e.to_string())
            }
        }
    }

    /// Lists stored payroll tables. Names not following the table pattern are skipped.
    pub fn list_tables(&self) -> StoreResult<TableListing> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut listing = TableListing::new();
        for name in names {
            let Some(key) = TableKey::parse(&name) else {
                warn!("[DB] skipping table with unexpected name '{}'", name);
                continue;
            };
            listing
                .entry(key.institute.as_str().to_string())
                .or_default()
                .entry(key.staff_type.as_str().to_string())
                .or_default()
                .entry(key.year)
                .or_default()
                .insert(key.month);
        }
        Ok(listing)
    }
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s,
        Value::Blob(b) => String::from_utf8_lossy(&b).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::key::{Institute, StaffType};
    use tempfile::tempdir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn key(month: Month) -> TableKey {
        TableKey::new(Institute::Somaiya, StaffType::Teaching, month, 2024)
    }

    fn payroll(rows: Vec<Vec<String>>) -> Table {
        Table::new(strings(&["HR EMP CODE", "Name", "Joined"]), rows)
    }

    #[test]
    fn test_create_table_outcomes() {
        let store = PayrollStore::open_in_memory().unwrap();
        let columns = strings(&["HR EMP CODE", "Name", "Joined"]);

        assert_eq!(store.create_table(&key(Month::Jan), &columns), CreateResult::Success);
        assert_eq!(store.create_table(&key(Month::Jan), &columns), CreateResult::Exists);
        assert_eq!(
            store.create_table(&key(Month::Jan), &strings(&["HR EMP CODE", "Name"])),
            CreateResult::ColumnsMismatch
        );
        assert_eq!(
            store.create_table(&key(Month::Feb), &strings(&["Name", "Joined"])),
            CreateResult::NoIdentifier
        );
    }

    #[test]
    fn test_upsert_and_fetch() {
        let mut store = PayrollStore::open_in_memory().unwrap();
        let k = key(Month::Mar);
        store.create_table(&k, &strings(&["HR EMP CODE", "Name", "Joined"]));

        let first = payroll(vec![
            strings(&["E1", "Jane \"JD\" Doe", "2020-04-01"]),
            strings(&["E2", "John", "12.0"]),
        ]);
        assert_eq!(store.upsert_rows(&k, &first), UpsertResult::Success(2));

        let second = payroll(vec![strings(&["E1", "Jane Roe", "2020-04-01"])]);
        assert_eq!(store.upsert_rows(&k, &second), UpsertResult::Success(1));

        let table = store.fetch_all(&k).unwrap();
        assert_eq!(table.len(), 2);
        let e1 = table.find_by("HR EMP CODE", "E1").unwrap();
        assert_eq!(e1.get("Name"), Some("Jane Roe"));
        assert_eq!(e1.get("Joined"), Some("01-04-2020"));
        let e2 = table.find_by("HR EMP CODE", "E2").unwrap();
        assert_eq!(e2.get("Joined"), Some("12"));
    }

    #[test]
    fn test_quotes_become_single_quotes() {
        let mut store = PayrollStore::open_in_memory().unwrap();
        let k = key(Month::Apr);
        store.create_table(&k, &strings(&["HR EMP CODE", "Name", "Joined"]));
        store.upsert_rows(&k, &payroll(vec![strings(&["E1", "say \"hi\"", ""])]));

        let table = store.fetch_all(&k).unwrap();
        assert_eq!(table.rows()[0].get("Name"), Some("say 'hi'"));
    }

    #[test]
    fn test_upsert_rejections() {
        let mut store = PayrollStore::open_in_memory().unwrap();
        let k = key(Month::May);

        assert_eq!(store.upsert_rows(&k, &payroll(vec![])), UpsertResult::ColumnsMismatch);

        store.create_table(&k, &strings(&["HR EMP CODE", "Name", "Joined"]));
        let extra = Table::new(strings(&["HR EMP CODE", "Salary"]), vec![]);
        assert_eq!(store.upsert_rows(&k, &extra), UpsertResult::ColumnsMismatch);

        let no_id = Table::new(strings(&["Name"]), vec![strings(&["x"])]);
        assert_eq!(store.upsert_rows(&k, &no_id), UpsertResult::NoIdentifier);
    }

    #[test]
    fn test_drop_table() {
        let store = PayrollStore::open_in_memory().unwrap();
        let k = key(Month::Jun);
        assert_eq!(store.drop_table(&k), DropResult::TableNotFound);
        store.create_table(&k, &strings(&["HR EMP CODE"]));
        assert_eq!(store.drop_table(&k), DropResult::Success);
        assert!(matches!(store.fetch_all(&k), Err(StoreError::TableNotFound(_))));
    }

    #[test]
    fn test_list_tables_groups_and_skips() {
        let store = PayrollStore::open_in_memory().unwrap();
        let id = strings(&["HR EMP CODE"]);
        store.create_table(&key(Month::Sept), &id);
        store.create_table(&key(Month::Jan), &id);
        store.create_table(
            &TableKey::new(Institute::Svv, StaffType::NonTeaching, Month::Dec, 2023),
            &id,
        );
        store
            .conn
            .execute("CREATE TABLE notes (x TEXT)", [])
            .unwrap();

        let listing = store.list_tables().unwrap();
        let months: Vec<Month> = listing["somaiya"]["teaching"][&2024].iter().copied().collect();
        assert_eq!(months, vec![Month::Jan, Month::Sept]);
        assert!(listing["svv"]["nonteaching"].contains_key(&2023));
        assert_eq!(listing.len(), 2);
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("payroll.db");
        {
            let store = PayrollStore::open(&path).unwrap();
            store.create_table(&key(Month::Jul), &strings(&["HR EMP CODE", "Name"]));
        }
        let store = PayrollStore::open(&path).unwrap();
        assert_eq!(
            store.columns(&key(Month::Jul)).unwrap(),
            strings(&["HR EMP CODE", "Name"])
        );
    }
}
