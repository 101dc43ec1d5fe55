//! Per-query execution context.
//!
//! Holds the store collaborators, the clock and RNG used by time- and
//! sampling-based modifiers, and a memo of relation lookups keyed by
//! (species id, relation). Several filters ask for the same relations, so
//! each one is fetched from the store at most once per query.

use crate::store::{
    Creator, CreatorResolver, Generation, Picture, Role, Species, SpeciesId, SpeciesStore,
    StoreResult, Taxon, Zone,
};
use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::{FxHashMap, FxHashSet};
use std::future::Future;
use std::sync::Arc;
use tracing::trace;

#[derive(Default)]
struct RelationCache {
    ancestors: FxHashMap<SpeciesId, Arc<[SpeciesId]>>,
    descendants: FxHashMap<SpeciesId, Arc<[Arc<Species>]>>,
    zones: FxHashMap<SpeciesId, Arc<[Zone]>>,
    roles: FxHashMap<SpeciesId, Arc<[Role]>>,
    taxa: FxHashMap<SpeciesId, Arc<[Taxon]>>,
    pictures: FxHashMap<SpeciesId, Arc<[Picture]>>,
    predators: FxHashMap<SpeciesId, Arc<[Arc<Species>]>>,
    prey: FxHashMap<SpeciesId, Arc<[Arc<Species>]>>,
    endangered: FxHashMap<SpeciesId, bool>,
    creators: FxHashMap<SpeciesId, Option<Creator>>,
    generations: FxHashMap<SpeciesId, Option<Generation>>,
}

/// State shared by all modifiers of one query execution
pub struct SearchContext<'a> {
    store: &'a dyn SpeciesStore,
    creators: &'a dyn CreatorResolver,
    now: DateTime<Utc>,
    rng: StdRng,
    cache: RelationCache,
}

impl<'a> SearchContext<'a> {
    pub fn new(store: &'a dyn SpeciesStore, creators: &'a dyn CreatorResolver) -> Self {
        Self {
            store,
            creators,
            now: Utc::now(),
            rng: StdRng::from_entropy(),
            cache: RelationCache::default(),
        }
    }

    /// Fix "now" for `recent:` windows
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Seed `random:` sampling
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn store(&self) -> &'a dyn SpeciesStore {
        self.store
    }

    pub fn creator_resolver(&self) -> &'a dyn CreatorResolver {
        self.creators
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    // Each lookup below returns one entry per input species, in order.

    pub async fn ancestor_ids(
        &mut self,
        species: &[Arc<Species>],
    ) -> StoreResult<Vec<Arc<[SpeciesId]>>> {
        let store = self.store;
        memoize(&mut self.cache.ancestors, species, |sp| store.ancestor_ids(sp)).await
    }

    pub async fn descendants(
        &mut self,
        species: &[Arc<Species>],
    ) -> StoreResult<Vec<Arc<[Arc<Species>]>>> {
        let store = self.store;
        memoize(&mut self.cache.descendants, species, |sp| store.descendants(sp)).await
    }

    pub async fn zones(&mut self, species: &[Arc<Species>]) -> StoreResult<Vec<Arc<[Zone]>>> {
        let store = self.store;
        memoize(&mut self.cache.zones, species, |sp| store.zones(sp)).await
    }

    pub async fn roles(&mut self, species: &[Arc<Species>]) -> StoreResult<Vec<Arc<[Role]>>> {
        let store = self.store;
        memoize(&mut self.cache.roles, species, |sp| store.roles(sp)).await
    }

    pub async fn taxa(&mut self, species: &[Arc<Species>]) -> StoreResult<Vec<Arc<[Taxon]>>> {
        let store = self.store;
        memoize(&mut self.cache.taxa, species, |sp| store.taxa(sp)).await
    }

    pub async fn pictures(
        &mut self,
        species: &[Arc<Species>],
    ) -> StoreResult<Vec<Arc<[Picture]>>> {
        let store = self.store;
        memoize(&mut self.cache.pictures, species, |sp| store.pictures(sp)).await
    }

    pub async fn predators(
        &mut self,
        species: &[Arc<Species>],
    ) -> StoreResult<Vec<Arc<[Arc<Species>]>>> {
        let store = self.store;
        memoize(&mut self.cache.predators, species, |sp| store.predators(sp)).await
    }

    pub async fn prey(
        &mut self,
        species: &[Arc<Species>],
    ) -> StoreResult<Vec<Arc<[Arc<Species>]>>> {
        let store = self.store;
        memoize(&mut self.cache.prey, species, |sp| store.prey(sp)).await
    }

    pub async fn endangered(&mut self, species: &[Arc<Species>]) -> StoreResult<Vec<bool>> {
        let store = self.store;
        memoize(&mut self.cache.endangered, species, |sp| store.is_endangered(sp)).await
    }

    /// Canonical creator of each species, if it can be resolved
    pub async fn creators(
        &mut self,
        species: &[Arc<Species>],
    ) -> StoreResult<Vec<Option<Creator>>> {
        let resolver = self.creators;
        memoize(&mut self.cache.creators, species, |sp| {
            resolver.resolve_creator(&sp.creator)
        })
        .await
    }

    /// Generation each species was created in
    pub async fn generations(
        &mut self,
        species: &[Arc<Species>],
    ) -> StoreResult<Vec<Option<Generation>>> {
        let store = self.store;
        memoize(&mut self.cache.generations, species, |sp| {
            store.generation_by_date(sp.created)
        })
        .await
    }
}

/// Fetch the relation for every species not yet in `cache` (concurrently,
/// all awaited before returning), then answer from the cache.
async fn memoize<'s, V, W, F, Fut>(
    cache: &mut FxHashMap<SpeciesId, V>,
    species: &'s [Arc<Species>],
    fetch: F,
) -> StoreResult<Vec<V>>
where
    V: Clone + Default,
    W: Into<V>,
    F: Fn(&'s Species) -> Fut,
    Fut: Future<Output = StoreResult<W>>,
{
    let mut pending = FxHashSet::default();
    let missing: Vec<&'s Species> = species
        .iter()
        .map(|sp| &**sp)
        .filter(|sp| !cache.contains_key(&sp.id) && pending.insert(sp.id))
        .collect();

    if missing.len() < species.len() {
        trace!(
            "relation cache: {} hits, {} misses",
            species.len() - missing.len(),
            missing.len()
        );
    }

    if !missing.is_empty() {
        let fetched = try_join_all(missing.iter().map(|sp| fetch(*sp))).await?;
        for (sp, value) in missing.iter().zip(fetched) {
            cache.insert(sp.id, value.into());
        }
    }

    Ok(species
        .iter()
        .map(|sp| cache.get(&sp.id).cloned().unwrap_or_default())
        .collect())
}
