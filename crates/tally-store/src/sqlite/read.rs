//! Query side of the SQLite store.

use super::{SqliteStore, parse_date};
use crate::dimensions::{
    Company, ConsolidationRow, Dimensions, DissectionGroupRow, Head, Industry, Sector,
    SectorIndustry, Term, Unit,
};
use crate::error::{Result, StoreError};
use crate::filter::{FactFilter, FactRecord, PeriodRow};
use crate::ids::{
    CompanyId, ConsolidationId, GroupId, HeadId, IndustryId, SectorId, TermId, UnitId,
};
use crate::partition::{HeadKind, Partition};
use crate::store::FactStore;
use polars::prelude::*;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params_from_iter};
use tracing::debug;

/// Build the `WHERE` clause and its bound values for a filter over the fact
/// table aliased `f`.
fn where_clause(partition: Partition, filter: &FactFilter) -> (String, Vec<Value>) {
    let mut clauses = vec!["f.company_id = ?".to_string()];
    let mut values = vec![Value::Integer(filter.company_id.0)];

    if let Some(head_id) = filter.head_id {
        clauses.push("f.head_id = ?".to_string());
        values.push(Value::Integer(head_id.0));
    }
    if !filter.term_ids.is_empty() {
        let marks = vec!["?"; filter.term_ids.len()].join(", ");
        clauses.push(format!("f.term_id IN ({marks})"));
        values.extend(filter.term_ids.iter().map(|t| Value::Integer(t.0)));
    }
    if let Some(consolidation_id) = filter.consolidation_id {
        clauses.push("f.consolidation_id = ?".to_string());
        values.push(Value::Integer(consolidation_id.0));
    }
    if let Some(period_end) = filter.period_end {
        clauses.push("f.period_end = ?".to_string());
        values.push(Value::Text(period_end.to_string()));
    }
    if let Some(from) = filter.period_from {
        clauses.push("f.period_end >= ?".to_string());
        values.push(Value::Text(from.to_string()));
    }
    if let Some(to) = filter.period_to {
        clauses.push("f.period_end <= ?".to_string());
        values.push(Value::Text(to.to_string()));
    }
    if let (Some(group_id), true) = (filter.group_id, partition.is_dissection()) {
        clauses.push("f.group_id = ?".to_string());
        values.push(Value::Integer(group_id.0));
    }

    (clauses.join(" AND "), values)
}

/// Column expression for the group id, NULL outside dissection partitions.
const fn group_column(partition: Partition, aggregate: bool) -> &'static str {
    match (partition.is_dissection(), aggregate) {
        (true, true) => "MAX(f.group_id)",
        (true, false) => "f.group_id",
        (false, _) => "NULL",
    }
}

fn load_heads(conn: &Connection, kind: HeadKind) -> Result<Vec<Head>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, name, industry_id, unit_id FROM {} ORDER BY rowid",
        kind.table_name()
    ))?;
    let heads = stmt
        .query_map([], |row| {
            Ok(Head {
                id: HeadId(row.get(0)?),
                name: row.get(1)?,
                industry_id: IndustryId(row.get(2)?),
                unit_id: row.get::<_, Option<i64>>(3)?.map(UnitId),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(heads)
}

fn load_terms(conn: &Connection) -> Result<Vec<Term>> {
    let mut stmt = conn.prepare("SELECT id, code, period_end FROM terms ORDER BY rowid")?;
    let raw = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    raw.into_iter()
        .map(|(id, code, period_end)| {
            Ok(Term {
                id: TermId(id),
                code,
                period_end: period_end.as_deref().map(parse_date).transpose()?,
            })
        })
        .collect()
}

impl FactStore for SqliteStore {
    fn load_dimensions(&self) -> Result<Dimensions> {
        let conn = self.conn();

        let companies = conn
            .prepare("SELECT id, name, ticker, sector_id FROM companies ORDER BY rowid")?
            .query_map([], |row| {
                Ok(Company {
                    id: CompanyId(row.get(0)?),
                    name: row.get(1)?,
                    ticker: row.get(2)?,
                    sector_id: SectorId(row.get(3)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let sectors = conn
            .prepare("SELECT id, name FROM sectors ORDER BY rowid")?
            .query_map([], |row| Ok(Sector { id: SectorId(row.get(0)?), name: row.get(1)? }))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let industries = conn
            .prepare("SELECT id, name FROM industries ORDER BY rowid")?
            .query_map([], |row| Ok(Industry { id: IndustryId(row.get(0)?), name: row.get(1)? }))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let sector_industries = conn
            .prepare("SELECT sector_id, industry_id FROM sector_industries ORDER BY rowid")?
            .query_map([], |row| {
                Ok(SectorIndustry {
                    sector_id: SectorId(row.get(0)?),
                    industry_id: IndustryId(row.get(1)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let units = conn
            .prepare("SELECT id, name FROM units ORDER BY rowid")?
            .query_map([], |row| Ok(Unit { id: UnitId(row.get(0)?), name: row.get(1)? }))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let consolidations = conn
            .prepare("SELECT id, name FROM consolidations ORDER BY id")?
            .query_map([], |row| {
                Ok(ConsolidationRow { id: ConsolidationId(row.get(0)?), name: row.get(1)? })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let dissection_groups = conn
            .prepare("SELECT id, name FROM dissection_groups ORDER BY id")?
            .query_map([], |row| {
                Ok(DissectionGroupRow { id: GroupId(row.get(0)?), name: row.get(1)? })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let dims = Dimensions {
            companies,
            sectors,
            industries,
            sector_industries,
            units,
            heads: load_heads(&conn, HeadKind::Regular)?,
            ratio_heads: load_heads(&conn, HeadKind::Ratio)?,
            terms: load_terms(&conn)?,
            consolidations,
            dissection_groups,
        };

        debug!(
            companies = dims.companies.len(),
            heads = dims.heads.len(),
            ratio_heads = dims.ratio_heads.len(),
            "dimensions loaded"
        );
        Ok(dims)
    }

    fn count_facts(&self, partition: Partition, filter: &FactFilter) -> Result<u64> {
        let (predicate, values) = where_clause(partition, filter);
        let sql = format!(
            "SELECT COUNT(*) FROM {} f WHERE {predicate}",
            partition.table_name()
        );

        let count: i64 = self
            .conn()
            .query_row(&sql, params_from_iter(values), |row| row.get(0))?;

        debug!(%partition, head = ?filter.head_id, count, "fact count");
        Ok(count.max(0) as u64)
    }

    fn period_at(
        &self,
        partition: Partition,
        filter: &FactFilter,
        offset: usize,
    ) -> Result<Option<PeriodRow>> {
        let (predicate, mut values) = where_clause(partition, filter);
        let sql = format!(
            "SELECT f.period_end, MAX(f.term_id), {}
             FROM {} f
             WHERE {predicate}
             GROUP BY f.period_end
             ORDER BY f.period_end DESC
             LIMIT 1 OFFSET ?",
            group_column(partition, true),
            partition.table_name()
        );
        values.push(Value::Integer(offset as i64));

        let raw = self
            .conn()
            .query_row(&sql, params_from_iter(values), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                ))
            })
            .optional()?;

        raw.map(|(period_end, term_id, group_id)| {
            Ok(PeriodRow {
                term_id: TermId(term_id),
                period_end: parse_date(&period_end)?,
                group_id: group_id.map(GroupId),
            })
        })
        .transpose()
    }

    fn fetch_fact(&self, partition: Partition, filter: &FactFilter) -> Result<Option<FactRecord>> {
        let (predicate, values) = where_clause(partition, filter);
        let sql = format!(
            "SELECT f.value, u.name, t.code, c.name, h.name, k.name, f.period_end, {}
             FROM {} f
             JOIN companies c ON c.id = f.company_id
             JOIN {} h ON h.id = f.head_id
             LEFT JOIN units u ON u.id = h.unit_id
             JOIN terms t ON t.id = f.term_id
             JOIN consolidations k ON k.id = f.consolidation_id
             WHERE {predicate}
             ORDER BY f.period_end DESC
             LIMIT 1",
            group_column(partition, false),
            partition.table_name(),
            partition.head_kind().table_name()
        );

        let raw = self
            .conn()
            .query_row(&sql, params_from_iter(values), |row| {
                Ok((
                    row.get::<_, f64>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, Option<i64>>(7)?,
                ))
            })
            .optional()?;

        raw.map(
            |(value, unit, term, company_name, metric_name, consolidation_name, period_end, group)| {
                Ok(FactRecord {
                    value,
                    unit,
                    term,
                    company_name,
                    metric_name,
                    consolidation_name,
                    period_end: parse_date(&period_end)?,
                    group_id: group.map(GroupId),
                })
            },
        )
        .transpose()
    }

    fn fact_series(&self, partition: Partition, filter: &FactFilter) -> Result<DataFrame> {
        let (predicate, values) = where_clause(partition, filter);
        let sql = format!(
            "SELECT f.period_end, t.code, f.value
             FROM {} f
             JOIN terms t ON t.id = f.term_id
             WHERE {predicate}
             ORDER BY f.period_end ASC, t.code ASC",
            partition.table_name()
        );

        let mut dates = Vec::new();
        let mut terms = Vec::new();
        let mut fact_values = Vec::new();
        {
            let conn = self.conn();
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })?;

            for row in rows {
                let (date, term, value) = row?;
                dates.push(date);
                terms.push(term);
                fact_values.push(value);
            }
        }

        if dates.is_empty() {
            return Err(StoreError::MissingData {
                table: partition.table_name().to_string(),
                reason: format!("No rows for company {}", filter.company_id),
            });
        }

        let df = DataFrame::new(vec![
            Series::new("period_end".into(), dates).into(),
            Series::new("term".into(), terms).into(),
            Series::new("value".into(), fact_values).into(),
        ])?;

        // Convert date strings to Date type
        let df = df
            .lazy()
            .with_column(col("period_end").cast(DataType::Date))
            .collect()?;

        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CompanyId;
    use crate::partition::{Horizon, StorageKind};
    use chrono::NaiveDate;

    #[test]
    fn test_where_clause_binds_every_value() {
        let filter = FactFilter::new(CompanyId(1))
            .with_head(HeadId(2))
            .with_terms(vec![TermId(3), TermId(4)])
            .with_consolidation(Some(ConsolidationId(2)))
            .with_period_end(NaiveDate::from_ymd_opt(2023, 6, 30))
            .with_group(Some(GroupId(1)));

        let (sql, values) = where_clause(Partition::Dissection(StorageKind::Regular), &filter);
        assert_eq!(sql.matches('?').count(), values.len());
        assert!(sql.contains("f.term_id IN (?, ?)"));
        assert!(sql.contains("f.group_id = ?"));
    }

    #[test]
    fn test_where_clause_ignores_group_outside_dissection() {
        let filter = FactFilter::new(CompanyId(1)).with_group(Some(GroupId(1)));
        let (sql, values) =
            where_clause(Partition::fact(HeadKind::Regular, Horizon::Standard), &filter);
        assert!(!sql.contains("group_id"));
        assert_eq!(values.len(), 1);
    }
}
