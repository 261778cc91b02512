//! End-to-end query tests over a seeded SQLite store

use approx::assert_relative_eq;
use chrono::NaiveDate;
use tally::store::dimensions::{Company, Head, Sector, SectorIndustry, Term, Unit};
use tally::store::{
    CompanyId, ConsolidationId, DissectionGroup, FactRow, GroupId, HeadId, HeadKind, Horizon,
    IndustryId, Partition, SectorId, StorageKind, TermId, UnitId,
};
use tally::{
    AnswerFormat, Consolidation, Engine, QueryRequest, ResolveError, ResolverConfig, SqliteStore,
    render,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn as_of() -> NaiveDate {
    date(2023, 11, 1)
}

fn head(id: i64, name: &str, unit: Option<i64>) -> Head {
    Head {
        id: HeadId(id),
        name: name.to_string(),
        industry_id: IndustryId(10),
        unit_id: unit.map(UnitId),
    }
}

fn fact(head: i64, term: i64, period_end: NaiveDate, value: f64, group: Option<i64>) -> FactRow {
    FactRow {
        company_id: CompanyId(1),
        head_id: HeadId(head),
        term_id: TermId(term),
        consolidation_id: ConsolidationId(2),
        period_end,
        value,
        group_id: group.map(GroupId),
    }
}

fn seeded_store() -> SqliteStore {
    let store = SqliteStore::in_memory().unwrap();
    store.put_sector(&Sector { id: SectorId(1), name: "Commercial Banks".to_string() }).unwrap();
    store
        .put_sector_industry(&SectorIndustry { sector_id: SectorId(1), industry_id: IndustryId(10) })
        .unwrap();
    store
        .put_company(&Company {
            id: CompanyId(1),
            name: "Habib Bank Limited".to_string(),
            ticker: "HBL".to_string(),
            sector_id: SectorId(1),
        })
        .unwrap();
    store.put_unit(&Unit { id: UnitId(1), name: "PKR mn".to_string() }).unwrap();

    store.put_head(HeadKind::Regular, &head(100, "EPS", None)).unwrap();
    store.put_head(HeadKind::Regular, &head(101, "Net Profit", Some(1))).unwrap();
    store.put_head(HeadKind::Ratio, &head(200, "Debt to Equity", None)).unwrap();
    store.put_head(HeadKind::Ratio, &head(201, "ROI", None)).unwrap();
    for (id, code) in [(1, "3M"), (2, "6M"), (3, "9M"), (4, "12M")] {
        store
            .put_term(&Term { id: TermId(id), code: code.to_string(), period_end: None })
            .unwrap();
    }

    store
        .put_facts(
            Partition::fact(HeadKind::Regular, Horizon::Quarterly),
            &[
                fact(101, 1, date(2023, 3, 31), 9_500.0, None),
                fact(101, 1, date(2023, 6, 30), 11_200.0, None),
            ],
        )
        .unwrap();
    store
        .put_facts(
            Partition::fact(HeadKind::Regular, Horizon::Standard),
            &[
                fact(101, 2, date(2022, 6, 30), 18_000.0, None),
                fact(101, 2, date(2023, 6, 30), 20_700.0, None),
                fact(101, 4, date(2022, 12, 31), 37_100.0, None),
            ],
        )
        .unwrap();
    store
        .put_fact(
            Partition::Dissection(StorageKind::Regular),
            &fact(100, 2, date(2023, 6, 30), 14.1, Some(1)),
        )
        .unwrap();
    store
        .put_fact(
            Partition::Dissection(StorageKind::Ratio),
            &fact(201, 4, date(2022, 12, 31), 0.82, Some(3)),
        )
        .unwrap();
    store
        .put_fact(
            Partition::fact(HeadKind::Ratio, Horizon::Standard),
            &fact(200, 2, date(2022, 6, 30), 1.35, None),
        )
        .unwrap();
    store
}

fn engine() -> Engine<SqliteStore> {
    Engine::new(seeded_store(), ResolverConfig::default()).unwrap()
}

#[test]
fn test_per_share_query() {
    let engine = engine();
    let request = QueryRequest::new("HBL", "EPS per share", "FY 2023");
    let answer = engine.query_as_of(&request, as_of()).unwrap();

    assert_eq!(answer.interpretation.class.group(), Some(DissectionGroup::PerShare));
    assert_eq!(answer.interpretation.base, "EPS");
    assert_eq!(answer.metric.head_id, HeadId(100));
    assert_eq!(answer.coordinate.partition, Partition::Dissection(StorageKind::Regular));
    assert_eq!(answer.coordinate.dissection_group, Some(GroupId(1)));
    assert_eq!(answer.fact.period_end, date(2023, 6, 30));
    assert_relative_eq!(answer.fact.value, 14.1);
}

#[test]
fn test_ratio_without_rows_in_year_reports_no_data() {
    let engine = engine();
    let request = QueryRequest::new("HBL", "Debt to Equity", "FY 2023");
    let err = engine.query_as_of(&request, as_of()).unwrap_err();

    match err {
        ResolveError::MetricNoData { candidate, head_id, coordinate } => {
            assert_eq!(candidate, "Debt to Equity");
            assert_eq!(head_id, HeadId(200));
            assert!(coordinate.is_none());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_ratio_with_rows_in_year() {
    let engine = engine();
    let answer = engine
        .query_as_of(&QueryRequest::new("HBL", "Debt to Equity", "FY 2022"), as_of())
        .unwrap();

    assert_eq!(answer.metric.head_id, HeadId(200));
    assert_eq!(answer.fact.period_end, date(2022, 6, 30));
    assert_relative_eq!(answer.fact.value, 1.35);
}

#[test]
fn test_term_without_year_takes_latest_row() {
    let engine = engine();
    let answer = engine
        .query_as_of(&QueryRequest::new("HBL", "Net Profit", "6M"), as_of())
        .unwrap();

    assert_eq!(answer.coordinate.term_id, Some(TermId(2)));
    assert_eq!(answer.coordinate.period_end, Some(date(2023, 6, 30)));
    assert_eq!(answer.fact.period_end, date(2023, 6, 30));
    assert_relative_eq!(answer.fact.value, 20_700.0);
}

#[test]
fn test_most_recent_and_last_quarter() {
    let engine = engine();

    let latest = engine
        .query_as_of(&QueryRequest::new("HBL", "Net Profit", "most recent quarter"), as_of())
        .unwrap();
    assert_eq!(latest.fact.period_end, date(2023, 6, 30));
    assert_relative_eq!(latest.fact.value, 11_200.0);
    assert_eq!(latest.fact.unit.as_deref(), Some("PKR mn"));
    assert_eq!(
        latest.coordinate.partition,
        Partition::fact(HeadKind::Regular, Horizon::Quarterly)
    );

    let previous = engine
        .query_as_of(&QueryRequest::new("HBL", "Net Profit", "last quarter"), as_of())
        .unwrap();
    assert_eq!(previous.fact.period_end, date(2023, 3, 31));
    assert_relative_eq!(previous.fact.value, 9_500.0);
}

#[test]
fn test_percent_of_assets_dissection() {
    let engine = engine();
    let request = QueryRequest::new("Habib Bank", "ROI/Asset", "12M 2022");
    let answer = engine.query_as_of(&request, as_of()).unwrap();

    assert_eq!(answer.interpretation.class.group(), Some(DissectionGroup::PercentOfAssets));
    assert_eq!(answer.interpretation.base, "ROI");
    assert_eq!(answer.metric.head_id, HeadId(201));
    assert_eq!(answer.coordinate.dissection_group, Some(GroupId(3)));
    assert!(answer.coordinate.is_ratio);
    assert_relative_eq!(answer.fact.value, 0.82);
}

#[test]
fn test_unknown_company() {
    let engine = engine();
    let err = engine
        .query_as_of(&QueryRequest::new("NoSuchTicker", "Net Profit", "FY 2023"), as_of())
        .unwrap_err();
    assert!(matches!(err, ResolveError::CompanyNotFound(_)));
}

#[test]
fn test_explicit_date_without_row() {
    let engine = engine();
    let err = engine
        .query_as_of(&QueryRequest::new("HBL", "Net Profit", "2021-12-31"), as_of())
        .unwrap_err();
    assert!(matches!(err, ResolveError::MetricNoData { ref candidate, .. } if candidate == "Net Profit"));
}

#[test]
fn test_explicit_date_with_row() {
    let engine = engine();
    let answer = engine
        .query_as_of(&QueryRequest::new("HBL", "Net Profit", "31-12-2022"), as_of())
        .unwrap();
    assert_eq!(answer.fact.term, "12M");
    assert_relative_eq!(answer.fact.value, 37_100.0);
}

#[test]
fn test_consolidation_is_part_of_the_coordinate() {
    let engine = engine();

    let default = engine
        .query_as_of(&QueryRequest::new("HBL", "Net Profit", "FY 2022"), as_of())
        .unwrap();
    assert_eq!(default.coordinate.consolidation_id, ConsolidationId(2));
    assert_eq!(default.fact.consolidation_name, "Unconsolidated");

    let request = QueryRequest::new("HBL", "Net Profit", "FY 2022")
        .with_consolidation(Consolidation::Consolidated);
    let err = engine.query_as_of(&request, as_of()).unwrap_err();
    assert!(matches!(err, ResolveError::MetricNoData { .. }));
}

#[test]
fn test_series_is_oldest_first() {
    let engine = engine();
    let (metric, frame) = engine.series(&QueryRequest::new("HBL", "Net Profit", "")).unwrap();

    assert_eq!(metric.head_id, HeadId(101));
    assert_eq!(frame.height(), 3);
    let values: Vec<f64> = frame.column("value").unwrap().f64().unwrap().into_no_null_iter().collect();
    assert_eq!(values, vec![18_000.0, 37_100.0, 20_700.0]);
}

#[test]
fn test_render_text_and_json() {
    let engine = engine();
    let answer = engine
        .query_as_of(&QueryRequest::new("HBL", "Net Profit", "FY 2022"), as_of())
        .unwrap();

    let text = render(&answer, AnswerFormat::Text).unwrap();
    assert!(text.starts_with("Habib Bank Limited (HBL)"));
    assert!(text.contains("Net Profit: 18000 PKR mn"));
    assert!(text.contains("2022-06-30 (6M)"));

    let json: serde_json::Value =
        serde_json::from_str(&render(&answer, AnswerFormat::Json).unwrap()).unwrap();
    assert_eq!(json["fact"]["metric_name"], "Net Profit");
    assert_eq!(json["coordinate"]["head_id"], 101);
}

#[test]
fn test_reload_picks_up_new_companies() {
    let engine = engine();
    engine
        .store()
        .put_company(&Company {
            id: CompanyId(2),
            name: "Meezan Bank".to_string(),
            ticker: "MEBL".to_string(),
            sector_id: SectorId(1),
        })
        .unwrap();

    let request = QueryRequest::new("MEBL", "Net Profit", "FY 2022");
    assert!(matches!(
        engine.query_as_of(&request, as_of()),
        Err(ResolveError::CompanyNotFound(_))
    ));

    engine.reload().unwrap();
    // Known now, but it has no facts.
    assert!(matches!(
        engine.query_as_of(&request, as_of()),
        Err(ResolveError::MetricNoData { .. })
    ));
}
