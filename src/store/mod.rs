//! Store collaborators consumed by the search engine.
//!
//! The engine treats every lookup as a black box behind two async traits:
//!
//! - [`SpeciesStore`] - resolves species and their relations
//! - [`CreatorResolver`] - canonicalizes raw creator references
//!
//! [`memory::MemoryStore`] implements both over a JSON catalog.

pub mod memory;
pub mod types;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

pub use memory::{Catalog, MemoryStore, SpeciesRecord};
pub use types::*;

/// Errors raised by store collaborators
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("lookup failed: {0}")]
    Lookup(String),

    #[error("invalid catalog: {0}")]
    Catalog(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Read access to species and everything the search modifiers look at.
#[async_trait]
pub trait SpeciesStore: Send + Sync {
    async fn species_by_id(&self, id: SpeciesId) -> StoreResult<Option<Arc<Species>>>;

    /// Resolve a binomial, short ("g. epithet") or unique bare epithet
    async fn species_by_name(&self, name: &str) -> StoreResult<Option<Arc<Species>>>;

    /// Species matching every keyword; no keywords matches everything
    async fn search(&self, keywords: &[String]) -> StoreResult<Vec<Arc<Species>>>;

    /// Ancestor ids, oldest first, not including the species itself
    async fn ancestor_ids(&self, species: &Species) -> StoreResult<Vec<SpeciesId>>;

    /// Direct descendants only
    async fn descendants(&self, species: &Species) -> StoreResult<Vec<Arc<Species>>>;

    async fn zones(&self, species: &Species) -> StoreResult<Vec<Zone>>;

    async fn zone_by_name(&self, name: &str) -> StoreResult<Option<Zone>>;

    async fn roles(&self, species: &Species) -> StoreResult<Vec<Role>>;

    async fn role_by_name(&self, name: &str) -> StoreResult<Option<Role>>;

    /// Classification from genus upward
    async fn taxa(&self, species: &Species) -> StoreResult<Vec<Taxon>>;

    async fn pictures(&self, species: &Species) -> StoreResult<Vec<Picture>>;

    async fn predators(&self, species: &Species) -> StoreResult<Vec<Arc<Species>>>;

    async fn prey(&self, species: &Species) -> StoreResult<Vec<Arc<Species>>>;

    async fn is_endangered(&self, species: &Species) -> StoreResult<bool>;

    async fn generation_by_date(&self, ts: DateTime<Utc>) -> StoreResult<Option<Generation>>;

    async fn generation_by_number(&self, number: u32) -> StoreResult<Option<Generation>>;
}

/// Turns a partial creator reference into a canonical record.
#[async_trait]
pub trait CreatorResolver: Send + Sync {
    async fn resolve_creator(&self, creator: &CreatorRef) -> StoreResult<Option<Creator>>;
}
