//! Reference dimension rows and the in-memory snapshot built from them.

use crate::ids::{CompanyId, ConsolidationId, GroupId, HeadId, IndustryId, SectorId, TermId, UnitId};
use crate::partition::HeadKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A listed company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Company id
    pub id: CompanyId,
    /// Full name
    pub name: String,
    /// Exchange ticker
    pub ticker: String,
    /// Sector the company belongs to
    pub sector_id: SectorId,
}

/// A sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    /// Sector id
    pub id: SectorId,
    /// Sector name
    pub name: String,
}

/// An industry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industry {
    /// Industry id
    pub id: IndustryId,
    /// Industry name
    pub name: String,
}

/// Sector to industry mapping entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorIndustry {
    /// Sector id
    pub sector_id: SectorId,
    /// Industry id
    pub industry_id: IndustryId,
}

/// A unit of measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Unit id
    pub id: UnitId,
    /// Unit name
    pub name: String,
}

/// A metric head, regular or ratio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Head {
    /// Head id
    pub id: HeadId,
    /// Display name
    pub name: String,
    /// Owning industry
    pub industry_id: IndustryId,
    /// Unit of the stored values
    pub unit_id: Option<UnitId>,
}

/// A reporting term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Term id
    pub id: TermId,
    /// Term code such as "3M", "Q2", "TTM" or "FY"
    pub code: String,
    /// Period end bound to the term, if any
    pub period_end: Option<NaiveDate>,
}

/// A consolidation flag row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationRow {
    /// Flag id
    pub id: ConsolidationId,
    /// Display name
    pub name: String,
}

/// A dissection group row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DissectionGroupRow {
    /// Group id
    pub id: GroupId,
    /// Group name
    pub name: String,
}

/// Snapshot of every reference dimension.
///
/// Rows keep storage order, which is the tie-break order used by every
/// lookup that can match more than one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dimensions {
    /// Companies
    pub companies: Vec<Company>,
    /// Sectors
    pub sectors: Vec<Sector>,
    /// Industries
    pub industries: Vec<Industry>,
    /// Sector to industry mapping
    pub sector_industries: Vec<SectorIndustry>,
    /// Units of measurement
    pub units: Vec<Unit>,
    /// Regular metric heads
    pub heads: Vec<Head>,
    /// Ratio heads
    pub ratio_heads: Vec<Head>,
    /// Reporting terms
    pub terms: Vec<Term>,
    /// Consolidation flags
    pub consolidations: Vec<ConsolidationRow>,
    /// Dissection groups
    pub dissection_groups: Vec<DissectionGroupRow>,
}

impl Dimensions {
    /// Heads of the given kind.
    pub fn heads_of(&self, kind: HeadKind) -> &[Head] {
        match kind {
            HeadKind::Regular => &self.heads,
            HeadKind::Ratio => &self.ratio_heads,
        }
    }

    /// Look up a head by id within one dimension.
    pub fn head(&self, kind: HeadKind, id: HeadId) -> Option<&Head> {
        self.heads_of(kind).iter().find(|h| h.id == id)
    }

    /// Look up a company by id.
    pub fn company(&self, id: CompanyId) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == id)
    }

    /// Industries mapped to a sector, in mapping order, without duplicates.
    pub fn industries_for_sector(&self, sector_id: SectorId) -> Vec<IndustryId> {
        let mut out = Vec::new();
        for mapping in self.sector_industries.iter().filter(|m| m.sector_id == sector_id) {
            if !out.contains(&mapping.industry_id) {
                out.push(mapping.industry_id);
            }
        }
        out
    }

    /// Look up a term by code, ignoring case.
    pub fn term_by_code(&self, code: &str) -> Option<&Term> {
        self.terms.iter().find(|t| t.code.eq_ignore_ascii_case(code))
    }

    /// Ids of every term whose code matches one of `codes`, ignoring case.
    pub fn term_ids_for_codes<S: AsRef<str>>(&self, codes: &[S]) -> Vec<TermId> {
        self.terms
            .iter()
            .filter(|t| codes.iter().any(|c| t.code.eq_ignore_ascii_case(c.as_ref())))
            .map(|t| t.id)
            .collect()
    }

    /// Look up a term by id.
    pub fn term(&self, id: TermId) -> Option<&Term> {
        self.terms.iter().find(|t| t.id == id)
    }

    /// Look up a unit by id.
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Row counts per dimension table, in schema order.
    pub fn counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("companies", self.companies.len()),
            ("sectors", self.sectors.len()),
            ("industries", self.industries.len()),
            ("sector_industries", self.sector_industries.len()),
            ("units", self.units.len()),
            ("heads", self.heads.len()),
            ("ratio_heads", self.ratio_heads.len()),
            ("terms", self.terms.len()),
            ("consolidations", self.consolidations.len()),
            ("dissection_groups", self.dissection_groups.len()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dimensions {
        Dimensions {
            sector_industries: vec![
                SectorIndustry { sector_id: SectorId(1), industry_id: IndustryId(10) },
                SectorIndustry { sector_id: SectorId(2), industry_id: IndustryId(20) },
                SectorIndustry { sector_id: SectorId(1), industry_id: IndustryId(11) },
                SectorIndustry { sector_id: SectorId(1), industry_id: IndustryId(10) },
            ],
            terms: vec![
                Term { id: TermId(1), code: "3M".to_string(), period_end: None },
                Term { id: TermId(4), code: "12M".to_string(), period_end: None },
                Term { id: TermId(5), code: "FY".to_string(), period_end: None },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_industries_for_sector_dedups_in_order() {
        let dims = sample();
        assert_eq!(
            dims.industries_for_sector(SectorId(1)),
            vec![IndustryId(10), IndustryId(11)]
        );
        assert!(dims.industries_for_sector(SectorId(9)).is_empty());
    }

    #[test]
    fn test_term_lookup_ignores_case() {
        let dims = sample();
        assert_eq!(dims.term_by_code("fy").map(|t| t.id), Some(TermId(5)));
        assert_eq!(dims.term_ids_for_codes(&["12M", "fy"]), vec![TermId(4), TermId(5)]);
        assert!(dims.term_by_code("Q9").is_none());
    }
}
