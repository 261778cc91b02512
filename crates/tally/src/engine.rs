//! End-to-end query pipeline.

use chrono::{NaiveDate, Utc};
use polars::prelude::DataFrame;
use serde::Serialize;
use std::sync::Arc;
use tally_resolve::metric::metric_horizon;
use tally_resolve::{
    CompanyScope, DimensionCache, DissectionNormalizer, MetricClass, MetricResolution,
    MetricResolver, PeriodRequest, PeriodResolution, PeriodResolver, ResolutionContext,
    ResolveError, ResolvedCoordinate, ResolverConfig, Result, classify, compose, resolve_company,
};
use tally_store::{Consolidation, Dimensions, FactRecord, FactStore, Horizon, Partition};
use tracing::{debug, info};

/// A question to answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    /// Company name or ticker
    pub company: String,
    /// Metric phrase
    pub metric: String,
    /// Period phrase
    pub period: String,
    /// Consolidation; the configured default when absent
    pub consolidation: Option<Consolidation>,
}

impl QueryRequest {
    /// Create a request with the default consolidation.
    pub fn new(
        company: impl Into<String>,
        metric: impl Into<String>,
        period: impl Into<String>,
    ) -> Self {
        Self {
            company: company.into(),
            metric: metric.into(),
            period: period.into(),
            consolidation: None,
        }
    }

    /// Set the consolidation.
    pub fn with_consolidation(mut self, consolidation: Consolidation) -> Self {
        self.consolidation = Some(consolidation);
        self
    }
}

/// Classification of a metric phrase and its base metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricInterpretation {
    /// Classification
    pub class: MetricClass,
    /// Phrase with any dissection qualifier removed
    pub base: String,
}

/// A resolved question and its fact.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// Resolved company
    pub company: CompanyScope,
    /// How the metric phrase was read
    pub interpretation: MetricInterpretation,
    /// Resolved metric head
    pub metric: MetricResolution,
    /// Resolved period
    pub period: PeriodResolution,
    /// Coordinate of the fact
    pub coordinate: ResolvedCoordinate,
    /// The fact itself
    pub fact: FactRecord,
}

/// Runs the resolution pipeline over a fact store.
#[derive(Debug)]
pub struct Engine<S: FactStore> {
    store: S,
    cache: DimensionCache,
    config: ResolverConfig,
    normalizer: DissectionNormalizer,
}

impl<S: FactStore> Engine<S> {
    /// Create an engine, loading the dimension snapshot from `store`.
    pub fn new(store: S, config: ResolverConfig) -> Result<Self> {
        let cache = DimensionCache::load(&store)?;
        Ok(Self { store, cache, config, normalizer: DissectionNormalizer::new()? })
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The active configuration.
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Current dimension snapshot.
    pub fn dimensions(&self) -> Arc<Dimensions> {
        self.cache.snapshot()
    }

    /// Reload the dimension snapshot from the store.
    pub fn reload(&self) -> Result<()> {
        self.cache.reload(&self.store)
    }

    /// Classify a metric phrase and strip its dissection qualifier.
    pub fn interpret(&self, phrase: &str) -> MetricInterpretation {
        let class = classify(phrase);
        let base = match class.group() {
            Some(group) => self.normalizer.normalize(phrase, group),
            None => phrase.split_whitespace().collect::<Vec<_>>().join(" "),
        };
        debug!(phrase, ?class, base = %base, "metric interpreted");
        MetricInterpretation { class, base }
    }

    /// Answer a request using today's date for "current year" rules.
    pub fn query(&self, request: &QueryRequest) -> Result<Answer> {
        self.query_as_of(request, Utc::now().date_naive())
    }

    /// Answer a request with an explicit reference date.
    pub fn query_as_of(&self, request: &QueryRequest, as_of: NaiveDate) -> Result<Answer> {
        let interpretation = self.interpret(&request.metric);
        let period_request = PeriodRequest::parse(&request.period, &self.config);
        let dims = self.cache.snapshot();
        let company = resolve_company(&dims, &request.company)?;

        let ctx = self
            .context(request, &interpretation.class, &period_request, as_of)
            .with_term(period_request.term_scope(&dims));

        let metric = MetricResolver::new(&self.store, &dims, &self.config).resolve(
            &interpretation.base,
            &interpretation.class,
            &company,
            &ctx,
        )?;
        if !metric.has_data() {
            return Err(ResolveError::MetricNoData {
                candidate: metric.head_name,
                head_id: metric.head_id,
                coordinate: None,
            });
        }

        let period = PeriodResolver::new(&self.store, &dims, &self.config)
            .resolve(&period_request, &metric, &company, &ctx)?;
        let coordinate = compose(company.company_id, Some(&metric), &period, &ctx)?;

        let Some(fact) = self.store.fetch_fact(coordinate.partition, &coordinate.filter())? else {
            return Err(ResolveError::MetricNoData {
                candidate: metric.head_name,
                head_id: metric.head_id,
                coordinate: Some(Box::new(coordinate)),
            });
        };

        info!(
            company = %company.name,
            metric = %fact.metric_name,
            period_end = %fact.period_end,
            value = fact.value,
            "query answered"
        );
        Ok(Answer { company, interpretation, metric, period, coordinate, fact })
    }

    /// Every stored period of the requested metric, oldest first.
    ///
    /// The period phrase only selects the horizon; an empty phrase reads the
    /// standard partitions.
    pub fn series(&self, request: &QueryRequest) -> Result<(MetricResolution, DataFrame)> {
        let interpretation = self.interpret(&request.metric);
        let period_request = PeriodRequest::parse(&request.period, &self.config);
        let ctx = self
            .context(request, &interpretation.class, &period_request, Utc::now().date_naive())
            .with_period_end(None);

        let dims = self.cache.snapshot();
        let company = resolve_company(&dims, &request.company)?;
        let metric = MetricResolver::new(&self.store, &dims, &self.config).resolve(
            &interpretation.base,
            &interpretation.class,
            &company,
            &ctx,
        )?;

        let Some(partition) = metric.partition else {
            return Err(ResolveError::MetricNoData {
                candidate: metric.head_name,
                head_id: metric.head_id,
                coordinate: None,
            });
        };
        let filter = series_filter(&company, &metric, &ctx, partition);
        let frame = self.store.fact_series(partition, &filter)?;
        Ok((metric, frame))
    }

    fn context(
        &self,
        request: &QueryRequest,
        class: &MetricClass,
        period: &PeriodRequest,
        as_of: NaiveDate,
    ) -> ResolutionContext {
        let horizon = match (metric_horizon(&request.metric), period.horizon()) {
            (Some(horizon), Horizon::Standard) if period.explicit_date().is_none() => horizon,
            (_, horizon) => horizon,
        };
        ResolutionContext::new(as_of)
            .with_horizon(horizon)
            .with_consolidation(request.consolidation.unwrap_or(self.config.default_consolidation))
            .with_period_end(period.explicit_date())
            .with_dissection(class.group())
    }
}

fn series_filter(
    company: &CompanyScope,
    metric: &MetricResolution,
    ctx: &ResolutionContext,
    partition: Partition,
) -> tally_store::FactFilter {
    tally_store::FactFilter::new(company.company_id)
        .with_head(metric.head_id)
        .with_consolidation(Some(ctx.consolidation.id()))
        .with_group(if partition.is_dissection() { metric.group.map(|g| g.id()) } else { None })
}
