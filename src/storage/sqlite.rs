use crate::model::{Company, RawTable, StorageError};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// Local copy of provider payloads with their fetch time.
pub struct SqliteCache {
    conn: Connection,
    ttl: Duration,
}

impl SqliteCache {
    /// Opens (or creates) the cache database and runs migrations.
    pub fn open(path: &Path, ttl_hours: i64) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn, ttl_hours)
    }

    pub fn in_memory(ttl_hours: i64) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?, ttl_hours)
    }

    fn with_connection(conn: Connection, ttl_hours: i64) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS universe (
                position INTEGER PRIMARY KEY,
                code TEXT NOT NULL,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS universe_meta (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                fetched_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS abstracts (
                code TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                fetched_at TEXT NOT NULL
            );
            ",
        )?;

        Ok(Self {
            conn,
            ttl: Duration::hours(ttl_hours),
        })
    }

    fn is_fresh(&self, fetched_at: DateTime<Utc>) -> bool {
        Utc::now() - fetched_at < self.ttl
    }

    /// Cached universe, or `None` when missing or older than the TTL.
    pub fn load_universe(&self) -> Result<Option<Vec<Company>>, StorageError> {
        let fetched_at: Option<DateTime<Utc>> = self
            .conn
            .query_row(
                "SELECT fetched_at FROM universe_meta WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match fetched_at {
            Some(ts) if self.is_fresh(ts) => {}
            _ => return Ok(None),
        }

        let mut stmt = self
            .conn
            .prepare("SELECT name, code FROM universe ORDER BY position")?;
        let companies = stmt
            .query_map([], |row| {
                Ok(Company {
                    name: row.get(0)?,
                    code: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if companies.is_empty() {
            return Ok(None);
        }
        Ok(Some(companies))
    }

    /// Replaces the cached universe, keeping provider order.
    pub fn store_universe(&mut self, companies: &[Company]) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM universe", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO universe (position, code, name) VALUES (?1, ?2, ?3)")?;
            for (position, company) in companies.iter().enumerate() {
                stmt.execute(params![position as i64, &company.code, &company.name])?;
            }
        }
        tx.execute(
            "INSERT OR REPLACE INTO universe_meta (id, fetched_at) VALUES (1, ?1)",
            params![Utc::now()],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn load_abstract(&self, code: &str) -> Result<Option<RawTable>, StorageError> {
        let row: Option<(String, DateTime<Utc>)> = self
            .conn
            .query_row(
                "SELECT payload, fetched_at FROM abstracts WHERE code = ?1",
                params![code],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((payload, ts)) if self.is_fresh(ts) => Ok(Some(serde_json::from_str(&payload)?)),
            _ => Ok(None),
        }
    }

    pub fn store_abstract(&self, code: &str, table: &RawTable) -> Result<(), StorageError> {
        let payload = serde_json::to_string(table)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO abstracts (code, payload, fetched_at) VALUES (?1, ?2, ?3)",
            params![code, payload, Utc::now()],
        )?;
        Ok(())
    }

    #[cfg(test)]
    fn backdate_all(&self, hours: i64) -> Result<(), StorageError> {
        let past = Utc::now() - Duration::hours(hours);
        self.conn
            .execute("UPDATE abstracts SET fetched_at = ?1", params![past])?;
        self.conn
            .execute("UPDATE universe_meta SET fetched_at = ?1", params![past])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawCell, RawRow};
    use std::collections::BTreeMap;

    fn table() -> RawTable {
        let mut cells = BTreeMap::new();
        cells.insert("20231231".to_string(), RawCell::Number(1.0));
        cells.insert("20221231".to_string(), RawCell::Text("--".into()));
        cells.insert("20211231".to_string(), RawCell::Missing);
        RawTable {
            periods: vec!["20231231".into(), "20221231".into(), "20211231".into()],
            rows: vec![RawRow {
                label: "营业总收入".into(),
                cells,
            }],
        }
    }

    #[test]
    fn universe_round_trip_keeps_order() {
        let mut cache = SqliteCache::in_memory(24).unwrap();
        assert_eq!(cache.load_universe().unwrap(), None);

        let companies = vec![
            Company::new("贵州茅台", "600519"),
            Company::new("平安银行", "000001"),
        ];
        cache.store_universe(&companies).unwrap();
        assert_eq!(cache.load_universe().unwrap(), Some(companies.clone()));

        cache.store_universe(&companies[..1]).unwrap();
        assert_eq!(cache.load_universe().unwrap().unwrap().len(), 1);
    }

    #[test]
    fn abstract_round_trip() {
        let cache = SqliteCache::in_memory(24).unwrap();
        assert_eq!(cache.load_abstract("600519").unwrap(), None);
        cache.store_abstract("600519", &table()).unwrap();
        assert_eq!(cache.load_abstract("600519").unwrap(), Some(table()));
    }

    #[test]
    fn stale_entries_are_ignored() {
        let mut cache = SqliteCache::in_memory(24).unwrap();
        cache.store_abstract("600519", &table()).unwrap();
        cache
            .store_universe(&[Company::new("贵州茅台", "600519")])
            .unwrap();
        cache.backdate_all(48).unwrap();

        assert_eq!(cache.load_abstract("600519").unwrap(), None);
        assert_eq!(cache.load_universe().unwrap(), None);
    }
}
