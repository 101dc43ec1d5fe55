use crate::query::context::SearchContext;
use crate::query::parser::{parse_query, Query};
use crate::query::planner::SearchPlan;
use crate::query::registry::ModifierRegistry;
use crate::query::result_set::ResultSet;
use crate::store::{CreatorResolver, SpeciesStore, StoreError};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("store lookup failed: {0}")]
    Store(#[from] StoreError),
}

/// Runs queries against a store: keyword match first, then every
/// modifier in query order, each finishing before the next starts.
pub struct SearchExecutor<'a> {
    store: &'a dyn SpeciesStore,
    creators: &'a dyn CreatorResolver,
    registry: &'a ModifierRegistry,
    seed: Option<u64>,
    now: Option<DateTime<Utc>>,
}

impl<'a> SearchExecutor<'a> {
    pub fn new(
        store: &'a dyn SpeciesStore,
        creators: &'a dyn CreatorResolver,
        registry: &'a ModifierRegistry,
    ) -> Self {
        Self {
            store,
            creators,
            registry,
            seed: None,
            now: None,
        }
    }

    /// Make `random:` reproducible
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Pin the clock used by `recent:`
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Parse and execute a raw query string
    pub async fn execute(&self, input: &str) -> Result<ResultSet, SearchError> {
        self.execute_query(&parse_query(input)).await
    }

    pub async fn execute_query(&self, query: &Query) -> Result<ResultSet, SearchError> {
        let plan = SearchPlan::from_query(query, self.registry);
        self.execute_plan(&plan).await
    }

    pub async fn execute_plan(&self, plan: &SearchPlan) -> Result<ResultSet, SearchError> {
        let mut ctx = SearchContext::new(self.store, self.creators);
        if let Some(seed) = self.seed {
            ctx = ctx.with_seed(seed);
        }
        if let Some(now) = self.now {
            ctx = ctx.with_now(now);
        }

        let initial = self.store.search(&plan.keywords).await?;
        debug!(
            "keywords {:?} matched {} species",
            plan.keywords,
            initial.len()
        );
        let mut results = ResultSet::from_species(initial);

        for modifier in &plan.modifiers {
            let before = results.len();
            modifier.apply(&mut ctx, &mut results).await?;
            debug!(
                "{} modifier {}:{} (invert={}): {} -> {} entries",
                modifier.kind().family(),
                modifier.name(),
                modifier.value(),
                modifier.invert(),
                before,
                results.len()
            );
        }

        Ok(results)
    }
}
