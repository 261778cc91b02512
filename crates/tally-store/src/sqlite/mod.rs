//! SQLite backed fact store.
//!
//! Dates are stored as `YYYY-MM-DD` text so that lexical and chronological
//! order agree.

mod read;

use crate::consolidation::Consolidation;
use crate::dimensions::{
    Company, ConsolidationRow, DissectionGroupRow, Head, Industry, Sector, SectorIndustry, Term,
    Unit,
};
use crate::error::{Result, StoreError};
use crate::filter::FactRow;
use crate::partition::{DissectionGroup, HeadKind, Partition};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// SQLite store for dimensions and facts.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at `path`.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn: Mutex::new(conn) };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn: Mutex::new(conn) };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Lock the connection. A poisoned lock still guards a usable connection
    /// because every write runs inside a transaction.
    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn();

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sectors (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS industries (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS sector_industries (
                sector_id INTEGER NOT NULL,
                industry_id INTEGER NOT NULL,
                PRIMARY KEY (sector_id, industry_id)
            );
            CREATE TABLE IF NOT EXISTS companies (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                ticker TEXT NOT NULL,
                sector_id INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS units (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS terms (
                id INTEGER PRIMARY KEY,
                code TEXT NOT NULL,
                period_end TEXT
            );
            CREATE TABLE IF NOT EXISTS consolidations (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS dissection_groups (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );",
        )?;

        for kind in [HeadKind::Regular, HeadKind::Ratio] {
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {} (
                        id INTEGER PRIMARY KEY,
                        name TEXT NOT NULL,
                        industry_id INTEGER NOT NULL,
                        unit_id INTEGER
                    )",
                    kind.table_name()
                ),
                [],
            )?;
        }

        for partition in Partition::all() {
            let table = partition.table_name();
            let (group_column, key) = if partition.is_dissection() {
                (
                    "group_id INTEGER NOT NULL,",
                    "company_id, head_id, term_id, consolidation_id, period_end, group_id",
                )
            } else {
                ("", "company_id, head_id, term_id, consolidation_id, period_end")
            };
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                        company_id INTEGER NOT NULL,
                        head_id INTEGER NOT NULL,
                        term_id INTEGER NOT NULL,
                        consolidation_id INTEGER NOT NULL,
                        period_end TEXT NOT NULL,
                        {group_column}
                        value REAL NOT NULL,
                        PRIMARY KEY ({key})
                    )"
                ),
                [],
            )?;
            conn.execute(
                &format!(
                    "CREATE INDEX IF NOT EXISTS idx_{table}_company_head
                     ON {table}(company_id, head_id, period_end)"
                ),
                [],
            )?;
        }

        // Fixed rows
        for flag in Consolidation::all() {
            conn.execute(
                "INSERT OR IGNORE INTO consolidations (id, name) VALUES (?1, ?2)",
                params![flag.id().0, flag.name()],
            )?;
        }
        for group in DissectionGroup::all() {
            conn.execute(
                "INSERT OR IGNORE INTO dissection_groups (id, name) VALUES (?1, ?2)",
                params![group.id().0, group.name()],
            )?;
        }

        debug!("schema initialized");
        Ok(())
    }

    /// Store a sector.
    pub fn put_sector(&self, sector: &Sector) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO sectors (id, name) VALUES (?1, ?2)",
            params![sector.id.0, sector.name],
        )?;
        Ok(())
    }

    /// Store an industry.
    pub fn put_industry(&self, industry: &Industry) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO industries (id, name) VALUES (?1, ?2)",
            params![industry.id.0, industry.name],
        )?;
        Ok(())
    }

    /// Map an industry to a sector.
    pub fn put_sector_industry(&self, mapping: &SectorIndustry) -> Result<()> {
        self.conn().execute(
            "INSERT OR IGNORE INTO sector_industries (sector_id, industry_id) VALUES (?1, ?2)",
            params![mapping.sector_id.0, mapping.industry_id.0],
        )?;
        Ok(())
    }

    /// Store a company.
    pub fn put_company(&self, company: &Company) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO companies (id, name, ticker, sector_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![company.id.0, company.name, company.ticker, company.sector_id.0],
        )?;
        Ok(())
    }

    /// Store a unit of measurement.
    pub fn put_unit(&self, unit: &Unit) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO units (id, name) VALUES (?1, ?2)",
            params![unit.id.0, unit.name],
        )?;
        Ok(())
    }

    /// Store a head in the regular or ratio dimension.
    pub fn put_head(&self, kind: HeadKind, head: &Head) -> Result<()> {
        self.conn().execute(
            &format!(
                "INSERT OR REPLACE INTO {} (id, name, industry_id, unit_id)
                 VALUES (?1, ?2, ?3, ?4)",
                kind.table_name()
            ),
            params![
                head.id.0,
                head.name,
                head.industry_id.0,
                head.unit_id.map(|u| u.0)
            ],
        )?;
        Ok(())
    }

    /// Store a term.
    pub fn put_term(&self, term: &Term) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO terms (id, code, period_end) VALUES (?1, ?2, ?3)",
            params![term.id.0, term.code, term.period_end.map(|d| d.to_string())],
        )?;
        Ok(())
    }

    /// Store a consolidation flag row. Ids 1 and 2 are seeded on creation.
    pub fn put_consolidation(&self, row: &ConsolidationRow) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO consolidations (id, name) VALUES (?1, ?2)",
            params![row.id.0, row.name],
        )?;
        Ok(())
    }

    /// Store a dissection group row. Groups 1 to 5 are seeded on creation.
    pub fn put_dissection_group(&self, row: &DissectionGroupRow) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO dissection_groups (id, name) VALUES (?1, ?2)",
            params![row.id.0, row.name],
        )?;
        Ok(())
    }

    /// Store a single fact.
    pub fn put_fact(&self, partition: Partition, row: &FactRow) -> Result<()> {
        self.put_facts(partition, std::slice::from_ref(row))
    }

    /// Store facts in one transaction.
    ///
    /// Dissection partitions require a group id on every row.
    pub fn put_facts(&self, partition: Partition, rows: &[FactRow]) -> Result<()> {
        let conn = self.conn();
        let tx = conn.unchecked_transaction()?;
        let table = partition.table_name();

        for row in rows {
            let period_end = row.period_end.to_string();
            if partition.is_dissection() {
                let group_id = row.group_id.ok_or_else(|| {
                    StoreError::Parse(format!("Missing group_id for {} row", table))
                })?;
                tx.execute(
                    &format!(
                        "INSERT OR REPLACE INTO {table}
                         (company_id, head_id, term_id, consolidation_id, period_end, group_id, value)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                    ),
                    params![
                        row.company_id.0,
                        row.head_id.0,
                        row.term_id.0,
                        row.consolidation_id.0,
                        period_end,
                        group_id.0,
                        row.value
                    ],
                )?;
            } else {
                tx.execute(
                    &format!(
                        "INSERT OR REPLACE INTO {table}
                         (company_id, head_id, term_id, consolidation_id, period_end, value)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
                    ),
                    params![
                        row.company_id.0,
                        row.head_id.0,
                        row.term_id.0,
                        row.consolidation_id.0,
                        period_end,
                        row.value
                    ],
                )?;
            }
        }

        tx.commit()?;
        debug!(table, rows = rows.len(), "facts stored");
        Ok(())
    }
}

/// Parse a stored `YYYY-MM-DD` date.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| StoreError::Parse(format!("Invalid date '{}': {}", raw, e)))
}
