//! In-memory store backed by a JSON catalog.
//!
//! The catalog is loaded once and indexed for O(1) id lookup; inverse
//! relations (predators, descendants) are derived at load time.

use super::types::*;
use super::{CreatorResolver, SpeciesStore, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// On-disk catalog layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub taxa: Vec<Taxon>,
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub creators: Vec<Creator>,
    #[serde(default)]
    pub generations: Vec<Generation>,
    #[serde(default)]
    pub species: Vec<SpeciesRecord>,
}

/// A species plus the relations the catalog records for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesRecord {
    #[serde(flatten)]
    pub species: Species,
    /// Genus taxon; looked up by genus name when absent
    #[serde(default)]
    pub genus_id: Option<TaxonId>,
    /// Direct ancestor species
    #[serde(default)]
    pub ancestor: Option<SpeciesId>,
    #[serde(default)]
    pub zones: Vec<ZoneId>,
    #[serde(default)]
    pub roles: Vec<RoleId>,
    #[serde(default)]
    pub prey: Vec<SpeciesId>,
    #[serde(default)]
    pub pictures: Vec<Picture>,
}

impl SpeciesRecord {
    pub fn new(species: Species) -> Self {
        Self {
            species,
            genus_id: None,
            ancestor: None,
            zones: Vec::new(),
            roles: Vec::new(),
            prey: Vec::new(),
            pictures: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct Relations {
    genus_id: Option<TaxonId>,
    ancestor: Option<SpeciesId>,
    zones: Vec<ZoneId>,
    roles: Vec<RoleId>,
    prey: Vec<SpeciesId>,
    predators: Vec<SpeciesId>,
    descendants: Vec<SpeciesId>,
    pictures: Vec<Picture>,
}

/// In-memory [`SpeciesStore`] and [`CreatorResolver`]
pub struct MemoryStore {
    /// Species in catalog order
    species: Vec<Arc<Species>>,
    /// O(1) lookup index: species id -> index in `species`
    id_to_index: FxHashMap<SpeciesId, usize>,
    relations: FxHashMap<SpeciesId, Relations>,
    taxa: FxHashMap<TaxonId, Taxon>,
    zones: Vec<Zone>,
    roles: Vec<Role>,
    creators: Vec<Creator>,
    generations: Vec<Generation>,
}

impl MemoryStore {
    /// Load a catalog file
    pub async fn open(path: &Path) -> StoreResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let store = Self::from_json(&content)?;
        info!(
            "loaded catalog {} ({} species)",
            path.display(),
            store.species.len()
        );
        Ok(store)
    }

    pub fn from_json(json: &str) -> StoreResult<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        Self::from_catalog(catalog)
    }

    /// Index a catalog, rejecting duplicate ids and dangling references
    pub fn from_catalog(catalog: Catalog) -> StoreResult<Self> {
        let taxa: FxHashMap<TaxonId, Taxon> =
            catalog.taxa.into_iter().map(|t| (t.id, t)).collect();

        let zone_ids: FxHashSet<ZoneId> = catalog.zones.iter().map(|z| z.id).collect();
        let role_ids: FxHashSet<RoleId> = catalog.roles.iter().map(|r| r.id).collect();

        let mut species = Vec::with_capacity(catalog.species.len());
        let mut id_to_index = FxHashMap::default();
        let mut relations: FxHashMap<SpeciesId, Relations> = FxHashMap::default();

        for record in catalog.species {
            let id = record.species.id;
            if id_to_index.insert(id, species.len()).is_some() {
                return Err(StoreError::Catalog(format!("duplicate species id {}", id)));
            }
            if let Some(zone) = record.zones.iter().find(|z| !zone_ids.contains(*z)) {
                return Err(StoreError::Catalog(format!(
                    "species {} references unknown zone {}",
                    id, zone
                )));
            }
            if let Some(role) = record.roles.iter().find(|r| !role_ids.contains(*r)) {
                return Err(StoreError::Catalog(format!(
                    "species {} references unknown role {}",
                    id, role
                )));
            }

            let genus_id = record.genus_id.or_else(|| {
                taxa.values()
                    .find(|t| {
                        t.rank == TaxonRank::Genus
                            && t.name.eq_ignore_ascii_case(&record.species.genus)
                    })
                    .map(|t| t.id)
            });

            relations.insert(
                id,
                Relations {
                    genus_id,
                    ancestor: record.ancestor,
                    zones: record.zones,
                    roles: record.roles,
                    prey: record.prey,
                    pictures: record.pictures,
                    ..Default::default()
                },
            );
            species.push(Arc::new(record.species));
        }

        // Derive inverse relations once all ids are known
        let mut predators: Vec<(SpeciesId, SpeciesId)> = Vec::new();
        let mut descendants: Vec<(SpeciesId, SpeciesId)> = Vec::new();
        for sp in &species {
            let rel = &relations[&sp.id];
            for &prey in &rel.prey {
                if !id_to_index.contains_key(&prey) {
                    return Err(StoreError::Catalog(format!(
                        "species {} preys on unknown species {}",
                        sp.id, prey
                    )));
                }
                predators.push((prey, sp.id));
            }
            if let Some(ancestor) = rel.ancestor {
                if !id_to_index.contains_key(&ancestor) {
                    return Err(StoreError::Catalog(format!(
                        "species {} descends from unknown species {}",
                        sp.id, ancestor
                    )));
                }
                descendants.push((ancestor, sp.id));
            }
        }
        for (prey, predator) in predators {
            if let Some(rel) = relations.get_mut(&prey) {
                rel.predators.push(predator);
            }
        }
        for (ancestor, child) in descendants {
            if let Some(rel) = relations.get_mut(&ancestor) {
                rel.descendants.push(child);
            }
        }

        Ok(Self {
            species,
            id_to_index,
            relations,
            taxa,
            zones: catalog.zones,
            roles: catalog.roles,
            creators: catalog.creators,
            generations: catalog.generations,
        })
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    fn get(&self, id: SpeciesId) -> Option<Arc<Species>> {
        self.id_to_index
            .get(&id)
            .and_then(|&idx| self.species.get(idx))
            .cloned()
    }

    fn get_all(&self, ids: &[SpeciesId]) -> Vec<Arc<Species>> {
        ids.iter().filter_map(|&id| self.get(id)).collect()
    }

    fn relations(&self, species: &Species) -> StoreResult<&Relations> {
        self.relations
            .get(&species.id)
            .ok_or_else(|| StoreError::Lookup(format!("unknown species {}", species.id)))
    }

    fn matches_keyword(species: &Species, keyword: &str) -> bool {
        species.full_name().to_lowercase().contains(keyword)
            || species
                .common_name
                .as_deref()
                .map(|c| c.to_lowercase().contains(keyword))
                .unwrap_or(false)
            || species.description.to_lowercase().contains(keyword)
    }
}

/// Lower-case a zone name and drop a leading "zone" word
fn normalize_zone_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    match lower.strip_prefix("zone") {
        Some(rest) if rest.starts_with(' ') => rest.trim().to_string(),
        _ => lower,
    }
}

/// Lower-case a role name and drop a plural "s"
fn normalize_role_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    match lower.strip_suffix('s') {
        Some(singular) if !singular.is_empty() => singular.to_string(),
        _ => lower,
    }
}

#[async_trait]
impl SpeciesStore for MemoryStore {
    async fn species_by_id(&self, id: SpeciesId) -> StoreResult<Option<Arc<Species>>> {
        Ok(self.get(id))
    }

    async fn species_by_name(&self, name: &str) -> StoreResult<Option<Arc<Species>>> {
        let name = name.trim().trim_matches('"').trim().to_lowercase();
        if name.is_empty() {
            return Ok(None);
        }

        if let Some((genus, epithet)) = name.split_once(char::is_whitespace) {
            let epithet = epithet.trim();
            let found = self.species.iter().find(|sp| {
                if !sp.name.eq_ignore_ascii_case(epithet) {
                    return false;
                }
                match genus.strip_suffix('.') {
                    Some(initial) => sp.genus.to_lowercase().starts_with(initial),
                    None => sp.genus.eq_ignore_ascii_case(genus),
                }
            });
            return Ok(found.cloned());
        }

        // Bare epithet only resolves when unambiguous
        let mut matches = self
            .species
            .iter()
            .filter(|sp| sp.name.eq_ignore_ascii_case(&name));
        match (matches.next(), matches.next()) {
            (Some(sp), None) => Ok(Some(Arc::clone(sp))),
            _ => Ok(None),
        }
    }

    async fn search(&self, keywords: &[String]) -> StoreResult<Vec<Arc<Species>>> {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.trim_matches('"').trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Ok(self
            .species
            .iter()
            .filter(|sp| keywords.iter().all(|k| Self::matches_keyword(sp, k)))
            .cloned()
            .collect())
    }

    async fn ancestor_ids(&self, species: &Species) -> StoreResult<Vec<SpeciesId>> {
        let mut chain = Vec::new();
        let mut seen = FxHashSet::default();
        seen.insert(species.id);

        let mut current = self.relations(species)?.ancestor;
        while let Some(id) = current {
            // Malformed catalogs may contain cycles
            if !seen.insert(id) {
                break;
            }
            chain.push(id);
            current = self.relations.get(&id).and_then(|rel| rel.ancestor);
        }

        chain.reverse();
        Ok(chain)
    }

    async fn descendants(&self, species: &Species) -> StoreResult<Vec<Arc<Species>>> {
        Ok(self.get_all(&self.relations(species)?.descendants))
    }

    async fn zones(&self, species: &Species) -> StoreResult<Vec<Zone>> {
        let ids = &self.relations(species)?.zones;
        Ok(self
            .zones
            .iter()
            .filter(|z| ids.contains(&z.id))
            .cloned()
            .collect())
    }

    async fn zone_by_name(&self, name: &str) -> StoreResult<Option<Zone>> {
        let wanted = normalize_zone_name(name);
        Ok(self
            .zones
            .iter()
            .find(|z| normalize_zone_name(&z.name) == wanted)
            .cloned())
    }

    async fn roles(&self, species: &Species) -> StoreResult<Vec<Role>> {
        let ids = &self.relations(species)?.roles;
        Ok(self
            .roles
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let wanted = normalize_role_name(name);
        Ok(self
            .roles
            .iter()
            .find(|r| normalize_role_name(&r.name) == wanted)
            .cloned())
    }

    async fn taxa(&self, species: &Species) -> StoreResult<Vec<Taxon>> {
        let mut taxa = Vec::new();
        let mut seen = FxHashSet::default();
        let mut current = self.relations(species)?.genus_id;
        while let Some(id) = current {
            if !seen.insert(id) {
                break;
            }
            match self.taxa.get(&id) {
                Some(taxon) => {
                    current = taxon.parent;
                    taxa.push(taxon.clone());
                }
                None => break,
            }
        }
        Ok(taxa)
    }

    async fn pictures(&self, species: &Species) -> StoreResult<Vec<Picture>> {
        Ok(self.relations(species)?.pictures.clone())
    }

    async fn predators(&self, species: &Species) -> StoreResult<Vec<Arc<Species>>> {
        Ok(self.get_all(&self.relations(species)?.predators))
    }

    async fn prey(&self, species: &Species) -> StoreResult<Vec<Arc<Species>>> {
        Ok(self.get_all(&self.relations(species)?.prey))
    }

    async fn is_endangered(&self, species: &Species) -> StoreResult<bool> {
        if species.is_extinct() {
            return Ok(false);
        }
        let prey = self.get_all(&self.relations(species)?.prey);
        Ok(!prey.is_empty() && prey.iter().all(|p| p.is_extinct()))
    }

    async fn generation_by_date(&self, ts: DateTime<Utc>) -> StoreResult<Option<Generation>> {
        Ok(self.generations.iter().find(|g| g.contains(ts)).cloned())
    }

    async fn generation_by_number(&self, number: u32) -> StoreResult<Option<Generation>> {
        Ok(self
            .generations
            .iter()
            .find(|g| g.number == number)
            .cloned())
    }
}

#[async_trait]
impl CreatorResolver for MemoryStore {
    async fn resolve_creator(&self, creator: &CreatorRef) -> StoreResult<Option<Creator>> {
        let known = match (creator.user_id, creator.name.as_deref()) {
            (Some(id), _) => self.creators.iter().find(|c| c.user_id == Some(id)),
            (None, Some(name)) => self
                .creators
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(name.trim())),
            (None, None) => return Ok(None),
        };

        // Unknown creators still compare by whatever half we were given
        Ok(Some(known.cloned().unwrap_or_else(|| Creator {
            name: creator
                .name
                .clone()
                .or_else(|| creator.user_id.map(|id| id.to_string()))
                .unwrap_or_default(),
            user_id: creator.user_id,
        })))
    }
}
