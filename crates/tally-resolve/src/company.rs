//! Company lookup and sector/industry scoping.

use crate::error::{ResolveError, Result};
use serde::Serialize;
use tally_store::{CompanyId, Dimensions, IndustryId, SectorId};
use tracing::{debug, info};

/// A resolved company and the industries its metrics are searched in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyScope {
    /// Company id
    pub company_id: CompanyId,
    /// Company name
    pub name: String,
    /// Exchange ticker
    pub ticker: String,
    /// Sector id
    pub sector_id: SectorId,
    /// First industry mapped to the sector
    pub industry_id: Option<IndustryId>,
    /// Every industry mapped to the sector
    pub industries: Vec<IndustryId>,
}

/// Resolve a company by exact ticker, then by name substring.
///
/// Both comparisons ignore case. Ties go to the first row in dimension
/// order.
pub fn resolve_company(dims: &Dimensions, query: &str) -> Result<CompanyScope> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(ResolveError::CompanyNotFound(query.to_string()));
    }

    let company = dims
        .companies
        .iter()
        .find(|c| c.ticker.to_lowercase() == needle)
        .inspect(|c| debug!(ticker = %c.ticker, "company matched by ticker"))
        .or_else(|| {
            dims.companies
                .iter()
                .find(|c| c.name.to_lowercase().contains(&needle))
                .inspect(|c| debug!(name = %c.name, "company matched by name"))
        })
        .ok_or_else(|| ResolveError::CompanyNotFound(query.to_string()))?;

    let industries = dims.industries_for_sector(company.sector_id);
    info!(
        company = %company.name,
        sector = %company.sector_id,
        industries = industries.len(),
        "company resolved"
    );

    Ok(CompanyScope {
        company_id: company.id,
        name: company.name.clone(),
        ticker: company.ticker.clone(),
        sector_id: company.sector_id,
        industry_id: industries.first().copied(),
        industries,
    })
}
