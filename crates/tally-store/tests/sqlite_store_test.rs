//! Integration tests for the SQLite fact store

use approx::assert_relative_eq;
use chrono::NaiveDate;
use polars::prelude::*;
use tally_store::dimensions::{Company, Head, Term, Unit};
use tally_store::{
    CompanyId, ConsolidationId, FactFilter, FactRow, FactStore, GroupId, HeadId, HeadKind,
    Horizon, IndustryId, Partition, SectorId, SqliteStore, StorageKind, TermId, UnitId,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn row(term: i64, period_end: NaiveDate, value: f64) -> FactRow {
    FactRow {
        company_id: CompanyId(1),
        head_id: HeadId(100),
        term_id: TermId(term),
        consolidation_id: ConsolidationId(2),
        period_end,
        value,
        group_id: None,
    }
}

fn seeded() -> SqliteStore {
    let store = SqliteStore::in_memory().unwrap();
    store
        .put_company(&Company {
            id: CompanyId(1),
            name: "Habib Bank Limited".to_string(),
            ticker: "HBL".to_string(),
            sector_id: SectorId(10),
        })
        .unwrap();
    store.put_unit(&Unit { id: UnitId(1), name: "PKR".to_string() }).unwrap();
    store
        .put_head(
            HeadKind::Regular,
            &Head {
                id: HeadId(100),
                name: "Net Profit".to_string(),
                industry_id: IndustryId(20),
                unit_id: Some(UnitId(1)),
            },
        )
        .unwrap();
    for (id, code) in [(1, "3M"), (2, "6M"), (3, "9M"), (4, "12M")] {
        store
            .put_term(&Term { id: TermId(id), code: code.to_string(), period_end: None })
            .unwrap();
    }

    let quarterly = Partition::fact(HeadKind::Regular, Horizon::Quarterly);
    store
        .put_facts(
            quarterly,
            &[
                row(1, date(2022, 12, 31), 10.0),
                row(1, date(2023, 3, 31), 11.0),
                row(1, date(2023, 6, 30), 12.5),
            ],
        )
        .unwrap();
    store
        .put_fact(
            Partition::fact(HeadKind::Regular, Horizon::Standard),
            &row(2, date(2023, 6, 30), 23.5),
        )
        .unwrap();
    store
}

#[test]
fn test_period_at_walks_backwards() {
    let store = seeded();
    let quarterly = Partition::fact(HeadKind::Regular, Horizon::Quarterly);
    let filter = FactFilter::new(CompanyId(1)).with_head(HeadId(100));

    let latest = store.period_at(quarterly, &filter, 0).unwrap().unwrap();
    let previous = store.period_at(quarterly, &filter, 1).unwrap().unwrap();
    let beyond = store.period_at(quarterly, &filter, 3).unwrap();

    assert_eq!(latest.period_end, date(2023, 6, 30));
    assert_eq!(previous.period_end, date(2023, 3, 31));
    assert!(latest.group_id.is_none());
    assert!(beyond.is_none());
}

#[test]
fn test_count_facts_applies_every_filter() {
    let store = seeded();
    let quarterly = Partition::fact(HeadKind::Regular, Horizon::Quarterly);
    let base = FactFilter::new(CompanyId(1)).with_head(HeadId(100));

    assert_eq!(store.count_facts(quarterly, &base).unwrap(), 3);
    assert_eq!(
        store
            .count_facts(quarterly, &base.clone().within(date(2023, 1, 1), date(2023, 12, 31)))
            .unwrap(),
        2
    );
    assert!(
        !store
            .has_facts(quarterly, &base.clone().with_consolidation(Some(ConsolidationId(1))))
            .unwrap()
    );
    assert!(!store.has_facts(quarterly, &FactFilter::new(CompanyId(2))).unwrap());
}

#[test]
fn test_fetch_fact_joins_labels() {
    let store = seeded();
    let filter = FactFilter::new(CompanyId(1))
        .with_head(HeadId(100))
        .with_terms(vec![TermId(2)]);

    let fact = store
        .fetch_fact(Partition::fact(HeadKind::Regular, Horizon::Standard), &filter)
        .unwrap()
        .unwrap();

    assert_relative_eq!(fact.value, 23.5);
    assert_eq!(fact.unit.as_deref(), Some("PKR"));
    assert_eq!(fact.term, "6M");
    assert_eq!(fact.company_name, "Habib Bank Limited");
    assert_eq!(fact.metric_name, "Net Profit");
    assert_eq!(fact.consolidation_name, "Unconsolidated");
    assert_eq!(fact.period_end, date(2023, 6, 30));
}

#[test]
fn test_fetch_fact_missing_row() {
    let store = seeded();
    let filter = FactFilter::new(CompanyId(1))
        .with_head(HeadId(100))
        .with_period_end(Some(date(2020, 1, 1)));

    let fact = store
        .fetch_fact(Partition::fact(HeadKind::Regular, Horizon::Standard), &filter)
        .unwrap();
    assert!(fact.is_none());
}

#[test]
fn test_dissection_group_filter() {
    let store = seeded();
    let partition = Partition::Dissection(StorageKind::Regular);
    let mut fact = row(2, date(2023, 6, 30), 4.1);
    fact.group_id = Some(GroupId(1));
    store.put_fact(partition, &fact).unwrap();

    let base = FactFilter::new(CompanyId(1)).with_head(HeadId(100));
    let hit = store
        .period_at(partition, &base.clone().with_group(Some(GroupId(1))), 0)
        .unwrap()
        .unwrap();
    assert_eq!(hit.group_id, Some(GroupId(1)));

    let miss = store
        .period_at(partition, &base.with_group(Some(GroupId(3))), 0)
        .unwrap();
    assert!(miss.is_none());
}

#[test]
fn test_fact_series_is_ordered() {
    let store = seeded();
    let filter = FactFilter::new(CompanyId(1)).with_head(HeadId(100));

    let df = store
        .fact_series(Partition::fact(HeadKind::Regular, Horizon::Quarterly), &filter)
        .unwrap();

    assert_eq!(df.height(), 3);
    assert_eq!(df.column("period_end").unwrap().dtype(), &DataType::Date);
    let values: Vec<f64> = df
        .column("value")
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_eq!(values, vec![10.0, 11.0, 12.5]);
}

#[test]
fn test_fact_series_empty_is_missing_data() {
    let store = seeded();
    let filter = FactFilter::new(CompanyId(9));

    assert!(
        store
            .fact_series(Partition::fact(HeadKind::Ratio, Horizon::Standard), &filter)
            .is_err()
    );
}
