//! Metric head resolution.
//!
//! Candidates are gathered syntactically from one head dimension at a time
//! and then confirmed against fact rows. The first candidate with data wins.

use crate::classify::{MetricClass, is_ttm_eps};
use crate::company::CompanyScope;
use crate::config::{RatioFallback, ResolverConfig};
use crate::context::ResolutionContext;
use crate::error::{ResolveError, Result};
use crate::priority::{SearchClass, plan_for, validation_partitions};
use serde::Serialize;
use tally_store::dimensions::Head;
use tally_store::{
    DissectionGroup, Dimensions, FactFilter, FactStore, HeadId, HeadKind, Horizon, Partition,
};
use tracing::{debug, info, warn};

/// Outcome of metric resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricResolution {
    /// Chosen head id
    pub head_id: HeadId,
    /// Chosen head name
    pub head_name: String,
    /// Dimension the head belongs to
    pub head_kind: HeadKind,
    /// Dissection group, for dissected metrics
    pub group: Option<DissectionGroup>,
    /// Partition where rows were found; `None` when no candidate had data
    pub partition: Option<Partition>,
}

impl MetricResolution {
    /// Whether rows were found for the head.
    pub const fn has_data(&self) -> bool {
        self.partition.is_some()
    }

    /// Whether the head is a ratio head.
    pub const fn is_ratio(&self) -> bool {
        self.head_kind.is_ratio()
    }
}

/// Resolves a metric phrase to a head with data.
#[derive(Debug)]
pub struct MetricResolver<'a, S: FactStore + ?Sized> {
    store: &'a S,
    dims: &'a Dimensions,
    config: &'a ResolverConfig,
}

impl<'a, S: FactStore + ?Sized> MetricResolver<'a, S> {
    /// Create a resolver over one dimension snapshot.
    pub const fn new(store: &'a S, dims: &'a Dimensions, config: &'a ResolverConfig) -> Self {
        Self { store, dims, config }
    }

    /// Resolve `phrase` for the company in `scope`.
    ///
    /// `phrase` is the base metric, already stripped of any dissection
    /// qualifier. Returns a resolution without a partition when heads matched
    /// but none had rows; returns [`ResolveError::MetricNotFound`] when no
    /// head matched at all. Rows only count when they fall inside the
    /// context's explicit date and term scope.
    pub fn resolve(
        &self,
        phrase: &str,
        class: &MetricClass,
        scope: &CompanyScope,
        ctx: &ResolutionContext,
    ) -> Result<MetricResolution> {
        let phrase = self.config.alias_for(phrase).unwrap_or(phrase);
        let ttm_eps = is_ttm_eps(phrase);
        let (phrase, search_class) = if ttm_eps {
            ("eps", SearchClass::Regular)
        } else {
            (phrase, SearchClass::of(class))
        };
        let plan = plan_for(search_class);
        let group = class.group();
        let fallback_on_no_data =
            ttm_eps || self.config.ratio_fallback == RatioFallback::OnNoData;

        debug!(phrase, ?search_class, ?group, horizon = ?ctx.horizon, "resolving metric");

        let primary = self.candidates(plan.primary, phrase, scope);
        if let Some(first) = primary.first() {
            if let Some(hit) = self.first_with_data(plan.primary, &primary, group, scope, ctx)? {
                return Ok(hit);
            }
            if let (Some(fallback), true) = (plan.fallback, fallback_on_no_data) {
                let secondary = self.candidates(fallback, phrase, scope);
                warn!(
                    phrase,
                    candidates = secondary.len(),
                    "no data for {} heads, trying {} heads",
                    plan.primary,
                    fallback
                );
                if let Some(hit) = self.first_with_data(fallback, &secondary, group, scope, ctx)? {
                    return Ok(hit);
                }
            }
            return Ok(no_data(first, plan.primary, group));
        }

        let Some(fallback) = plan.fallback else {
            return Err(self.not_found(phrase));
        };
        let secondary = self.candidates(fallback, phrase, scope);
        let Some(first) = secondary.first() else {
            return Err(self.not_found(phrase));
        };
        warn!(phrase, "no {} heads matched, falling back to {} heads", plan.primary, fallback);

        match self.first_with_data(fallback, &secondary, group, scope, ctx)? {
            Some(hit) => Ok(hit),
            None => Ok(no_data(first, fallback, group)),
        }
    }

    /// Syntactic candidates from one dimension: industry-scoped first, the
    /// whole dimension when the scoped search is empty.
    fn candidates(&self, kind: HeadKind, phrase: &str, scope: &CompanyScope) -> Vec<&'a Head> {
        let heads = self.dims.heads_of(kind);
        let scoped = tiered_matches(
            heads.iter().filter(|h| scope.industries.contains(&h.industry_id)),
            phrase,
        );
        if !scoped.is_empty() {
            debug!(%kind, count = scoped.len(), "industry-scoped candidates");
            return scoped;
        }

        let unscoped = tiered_matches(heads.iter(), phrase);
        if !unscoped.is_empty() {
            warn!(%kind, phrase, count = unscoped.len(), "using candidates outside company industries");
        }
        unscoped
    }

    fn first_with_data(
        &self,
        kind: HeadKind,
        candidates: &[&Head],
        group: Option<DissectionGroup>,
        scope: &CompanyScope,
        ctx: &ResolutionContext,
    ) -> Result<Option<MetricResolution>> {
        let partitions = validation_partitions(kind, group, ctx.horizon);

        for head in candidates {
            let mut filter = FactFilter::new(scope.company_id)
                .with_head(head.id)
                .with_consolidation(Some(ctx.consolidation.id()))
                .with_period_end(ctx.period_end)
                .with_group(group.map(|g| g.id()));
            if let Some(term) = &ctx.term {
                filter = term.apply(filter);
            }

            for partition in &partitions {
                if self.store.has_facts(*partition, &filter)? {
                    info!(head = %head.name, id = %head.id, %partition, "metric resolved");
                    return Ok(Some(MetricResolution {
                        head_id: head.id,
                        head_name: head.name.clone(),
                        head_kind: kind,
                        group,
                        partition: Some(*partition),
                    }));
                }
                debug!(head = %head.name, %partition, "no rows");
            }
        }
        Ok(None)
    }

    fn not_found(&self, phrase: &str) -> ResolveError {
        ResolveError::MetricNotFound {
            phrase: phrase.to_string(),
            suggestions: suggestions(self.dims, phrase, self.config.max_suggestions),
        }
    }
}

fn no_data(head: &Head, kind: HeadKind, group: Option<DissectionGroup>) -> MetricResolution {
    warn!(head = %head.name, id = %head.id, "no candidate has data");
    MetricResolution {
        head_id: head.id,
        head_name: head.name.clone(),
        head_kind: kind,
        group,
        partition: None,
    }
}

/// Match heads in three tiers: exact name, name containing the phrase,
/// phrase containing the name. Order within a tier follows the input.
fn tiered_matches<'h, I>(heads: I, phrase: &str) -> Vec<&'h Head>
where
    I: Iterator<Item = &'h Head> + Clone,
{
    let needle = phrase.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let tiers: [&dyn Fn(&str) -> bool; 3] = [
        &|name: &str| name == needle,
        &|name: &str| name.contains(needle.as_str()),
        &|name: &str| !name.is_empty() && needle.contains(name),
    ];

    let mut out: Vec<&Head> = Vec::new();
    for tier in tiers {
        for head in heads.clone() {
            let name = head.name.trim().to_lowercase();
            if tier(&name) && !out.iter().any(|h| h.id == head.id) {
                out.push(head);
            }
        }
    }
    out
}

/// Head names sharing a word of three or more letters with the phrase.
fn suggestions(dims: &Dimensions, phrase: &str, limit: usize) -> Vec<String> {
    let words: Vec<String> = phrase
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 3)
        .map(str::to_lowercase)
        .collect();
    if words.is_empty() {
        return Vec::new();
    }

    let mut out: Vec<String> = Vec::new();
    for head in dims.heads.iter().chain(dims.ratio_heads.iter()) {
        let name = head.name.to_lowercase();
        let shares_word = name
            .split(|c: char| !c.is_alphanumeric())
            .any(|w| words.iter().any(|p| p == w));
        if shares_word && !out.contains(&head.name) {
            out.push(head.name.clone());
        }
        if out.len() >= limit {
            break;
        }
    }
    out
}

/// Horizon implied by the metric phrase itself, if it overrides the period.
pub fn metric_horizon(phrase: &str) -> Option<Horizon> {
    is_ttm_eps(phrase).then_some(Horizon::Trailing)
}
