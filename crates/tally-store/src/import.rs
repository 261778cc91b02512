//! CSV import into a [`SqliteStore`].
//!
//! Each table is read from a headed CSV whose columns match the row struct
//! field names, e.g. `id,name,ticker,sector_id` for companies. Fact tables
//! take `company_id,head_id,term_id,consolidation_id,period_end,value` plus
//! `group_id` for dissection partitions.

use crate::dimensions::{
    Company, ConsolidationRow, DissectionGroupRow, Head, Industry, Sector, SectorIndustry, Term,
    Unit,
};
use crate::error::{Result, StoreError};
use crate::filter::FactRow;
use crate::partition::{HeadKind, Partition};
use crate::sqlite::SqliteStore;
use serde::de::DeserializeOwned;
use std::io::Read;
use tracing::info;

/// Target of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportTarget {
    /// companies
    Companies,
    /// sectors
    Sectors,
    /// industries
    Industries,
    /// sector_industries
    SectorIndustries,
    /// units
    Units,
    /// heads or ratio_heads
    Heads(HeadKind),
    /// terms
    Terms,
    /// consolidations
    Consolidations,
    /// dissection_groups
    DissectionGroups,
    /// Any of the ten fact tables
    Facts(Partition),
}

impl ImportTarget {
    /// Parse a target from a table name.
    pub fn from_table_name(name: &str) -> Result<Self> {
        let target = match name {
            "companies" => Self::Companies,
            "sectors" => Self::Sectors,
            "industries" => Self::Industries,
            "sector_industries" => Self::SectorIndustries,
            "units" => Self::Units,
            "heads" => Self::Heads(HeadKind::Regular),
            "ratio_heads" => Self::Heads(HeadKind::Ratio),
            "terms" => Self::Terms,
            "consolidations" => Self::Consolidations,
            "dissection_groups" => Self::DissectionGroups,
            other => Self::Facts(Partition::from_table_name(other)?),
        };
        Ok(target)
    }
}

fn read_rows<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let rows = csv_reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()?;
    Ok(rows)
}

fn store_each<T, F>(rows: &[T], mut put: F) -> Result<usize>
where
    F: FnMut(&T) -> Result<()>,
{
    for row in rows {
        put(row)?;
    }
    Ok(rows.len())
}

/// Import CSV rows into `target`. Returns the number of rows stored.
pub fn import_csv<R: Read>(store: &SqliteStore, target: ImportTarget, reader: R) -> Result<usize> {
    let count = match target {
        ImportTarget::Companies => {
            store_each(&read_rows::<Company, _>(reader)?, |r| store.put_company(r))?
        }
        ImportTarget::Sectors => {
            store_each(&read_rows::<Sector, _>(reader)?, |r| store.put_sector(r))?
        }
        ImportTarget::Industries => {
            store_each(&read_rows::<Industry, _>(reader)?, |r| store.put_industry(r))?
        }
        ImportTarget::SectorIndustries => store_each(
            &read_rows::<SectorIndustry, _>(reader)?,
            |r| store.put_sector_industry(r),
        )?,
        ImportTarget::Units => store_each(&read_rows::<Unit, _>(reader)?, |r| store.put_unit(r))?,
        ImportTarget::Heads(kind) => {
            store_each(&read_rows::<Head, _>(reader)?, |r| store.put_head(kind, r))?
        }
        ImportTarget::Terms => store_each(&read_rows::<Term, _>(reader)?, |r| store.put_term(r))?,
        ImportTarget::Consolidations => store_each(
            &read_rows::<ConsolidationRow, _>(reader)?,
            |r| store.put_consolidation(r),
        )?,
        ImportTarget::DissectionGroups => store_each(
            &read_rows::<DissectionGroupRow, _>(reader)?,
            |r| store.put_dissection_group(r),
        )?,
        ImportTarget::Facts(partition) => {
            let rows = read_rows::<FactRow, _>(reader)?;
            if partition.is_dissection() && rows.iter().any(|r| r.group_id.is_none()) {
                return Err(StoreError::Parse(format!(
                    "{} rows require a group_id column",
                    partition
                )));
            }
            store.put_facts(partition, &rows)?;
            rows.len()
        }
    };

    info!(?target, count, "csv imported");
    Ok(count)
}
