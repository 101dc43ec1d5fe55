//! Filter family of modifiers.
//!
//! Every filter computes the set of species it would remove, then the
//! result set drops a species iff `filtered XOR invert`. Predicates are
//! evaluated once per distinct species against the result set as it was
//! before the filter ran, so sampling filters (`random`, `limit`) see one
//! global list rather than one list per group.
//!
//! A filter whose value cannot be used at all (blank, non-numeric, bad
//! duration) filters nothing. A filter whose value names something the
//! store does not know keeps nothing.

use crate::query::context::SearchContext;
use crate::query::parser::ParsedModifier;
use crate::query::result_set::ResultSet;
use crate::store::{CreatorRef, Species, SpeciesId, StoreResult, TaxonRank};
use crate::utils::{parse_duration, parse_size};
use chrono::{DateTime, Utc};
use roaring::RoaringBitmap;
use rustc_hash::FxHashMap;
use std::slice;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Status,
    Zone,
    Role,
    /// Taxon of a given rank, or of any rank
    Taxon(Option<TaxonRank>),
    Creator,
    Ancestor,
    Descendant,
    Predator,
    Prey,
    Competitors,
    Has,
    Recent,
    Random,
    Limit,
    Generation,
}

/// Multi-value OR rule: a species is filtered only when it fails every
/// listed value.
pub fn fails_every<T>(values: &[T], mut matches: impl FnMut(&T) -> bool) -> bool {
    !values.iter().any(|value| matches(value))
}

/// Run a filter modifier against the result set
pub async fn apply_filter(
    kind: FilterKind,
    args: &ParsedModifier,
    ctx: &mut SearchContext<'_>,
    results: &mut ResultSet,
) -> StoreResult<()> {
    let species = results.unique_species();

    let filtered = match kind {
        FilterKind::Status => status(args, ctx, &species).await?,
        FilterKind::Zone => zone(args, ctx, &species).await?,
        FilterKind::Role => role(args, ctx, &species).await?,
        FilterKind::Taxon(rank) => taxon(rank, args, ctx, &species).await?,
        FilterKind::Creator => creator(args, ctx, &species).await?,
        FilterKind::Ancestor => ancestor(args, ctx, &species).await?,
        FilterKind::Descendant => descendant(args, ctx, &species).await?,
        FilterKind::Predator => predator(args, ctx, &species).await?,
        FilterKind::Prey => prey(args, ctx, &species).await?,
        FilterKind::Competitors => competitors(args, ctx, &species).await?,
        FilterKind::Has => has(args, ctx, &species).await?,
        FilterKind::Recent => recent(args, ctx.now(), &species),
        FilterKind::Random => random(args, ctx, &species),
        FilterKind::Limit => limit(args, &species),
        FilterKind::Generation => generation(args, ctx, &species).await?,
    };

    match filtered {
        Some(filtered) => results.filter_by(|sp| filtered.contains(sp.id), args.invert),
        None => debug!("{}: unusable value {:?}, nothing filtered", args.name, args.value),
    }
    Ok(())
}

/// Ids of the species for which `is_filtered(index, species)` holds
fn collect_filtered(
    species: &[Arc<Species>],
    mut is_filtered: impl FnMut(usize, &Species) -> bool,
) -> RoaringBitmap {
    species
        .iter()
        .enumerate()
        .filter(|(i, sp)| is_filtered(*i, sp))
        .map(|(_, sp)| sp.id)
        .collect()
}

fn ids_of(species: &[Arc<Species>]) -> RoaringBitmap {
    species.iter().map(|sp| sp.id).collect()
}

/// Values with blanks dropped; empty means the modifier has nothing to use
fn non_blank(args: &ParsedModifier) -> Vec<&str> {
    args.values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect()
}

/// The species a relation filter is anchored on
enum Reference {
    /// No name given
    Blank,
    /// Name given but unknown to the store
    Missing,
    Found(Arc<Species>),
}

async fn reference(args: &ParsedModifier, ctx: &SearchContext<'_>) -> StoreResult<Reference> {
    let name = args.value.trim();
    if name.is_empty() {
        return Ok(Reference::Blank);
    }
    Ok(match ctx.store().species_by_name(name).await? {
        Some(species) => Reference::Found(species),
        None => {
            debug!("{}: no species named {:?}", args.name, name);
            Reference::Missing
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusValue {
    Extant,
    Extinct,
    Endangered,
}

impl StatusValue {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "extant" | "alive" | "living" | "lc" => Some(StatusValue::Extant),
            "extinct" | "dead" | "ex" => Some(StatusValue::Extinct),
            "endangered" | "en" => Some(StatusValue::Endangered),
            _ => None,
        }
    }
}

async fn status(
    args: &ParsedModifier,
    ctx: &mut SearchContext<'_>,
    species: &[Arc<Species>],
) -> StoreResult<Option<RoaringBitmap>> {
    let wanted: Vec<StatusValue> = non_blank(args)
        .into_iter()
        .filter_map(StatusValue::from_name)
        .collect();
    if wanted.is_empty() {
        return Ok(None);
    }

    let endangered = if wanted.contains(&StatusValue::Endangered) {
        ctx.endangered(species).await?
    } else {
        vec![false; species.len()]
    };

    Ok(Some(collect_filtered(species, |i, sp| {
        fails_every(&wanted, |status| match status {
            StatusValue::Extant => !sp.is_extinct(),
            StatusValue::Extinct => sp.is_extinct(),
            StatusValue::Endangered => endangered[i],
        })
    })))
}

async fn zone(
    args: &ParsedModifier,
    ctx: &mut SearchContext<'_>,
    species: &[Arc<Species>],
) -> StoreResult<Option<RoaringBitmap>> {
    let names = non_blank(args);
    if names.is_empty() {
        return Ok(None);
    }

    let mut wanted = Vec::new();
    for name in names {
        if let Some(zone) = ctx.store().zone_by_name(name).await? {
            wanted.push(zone.id);
        }
    }

    let zones = ctx.zones(species).await?;
    Ok(Some(collect_filtered(species, |i, _| {
        fails_every(&wanted, |id| zones[i].iter().any(|z| z.id == *id))
    })))
}

async fn role(
    args: &ParsedModifier,
    ctx: &mut SearchContext<'_>,
    species: &[Arc<Species>],
) -> StoreResult<Option<RoaringBitmap>> {
    let names = non_blank(args);
    if names.is_empty() {
        return Ok(None);
    }

    let mut wanted = Vec::new();
    for name in names {
        if let Some(role) = ctx.store().role_by_name(name).await? {
            wanted.push(role.id);
        }
    }

    let roles = ctx.roles(species).await?;
    Ok(Some(collect_filtered(species, |i, _| {
        fails_every(&wanted, |id| roles[i].iter().any(|r| r.id == *id))
    })))
}

async fn taxon(
    rank: Option<TaxonRank>,
    args: &ParsedModifier,
    ctx: &mut SearchContext<'_>,
    species: &[Arc<Species>],
) -> StoreResult<Option<RoaringBitmap>> {
    let wanted = non_blank(args);
    if wanted.is_empty() {
        return Ok(None);
    }

    let taxa = ctx.taxa(species).await?;
    let genus_applies = matches!(rank, None | Some(TaxonRank::Genus));

    Ok(Some(collect_filtered(species, |i, sp| {
        fails_every(&wanted, |name| {
            taxa[i].iter().any(|t| {
                rank.map(|r| t.rank == r).unwrap_or(true) && t.name.eq_ignore_ascii_case(name)
            }) || (genus_applies && sp.genus.eq_ignore_ascii_case(name))
        })
    })))
}

async fn creator(
    args: &ParsedModifier,
    ctx: &mut SearchContext<'_>,
    species: &[Arc<Species>],
) -> StoreResult<Option<RoaringBitmap>> {
    let names = non_blank(args);
    if names.is_empty() {
        return Ok(None);
    }

    let resolver = ctx.creator_resolver();
    let mut wanted = Vec::new();
    for name in names {
        if let Some(creator) = resolver
            .resolve_creator(&CreatorRef::from_query_value(name))
            .await?
        {
            wanted.push(creator);
        }
    }

    let creators = ctx.creators(species).await?;
    Ok(Some(collect_filtered(species, |i, _| {
        fails_every(&wanted, |wanted| {
            creators[i]
                .as_ref()
                .map(|c| c.is_same(wanted))
                .unwrap_or(false)
        })
    })))
}

/// Keeps species descended from the reference
async fn ancestor(
    args: &ParsedModifier,
    ctx: &mut SearchContext<'_>,
    species: &[Arc<Species>],
) -> StoreResult<Option<RoaringBitmap>> {
    let reference = match reference(args, ctx).await? {
        Reference::Blank => return Ok(None),
        Reference::Missing => return Ok(Some(ids_of(species))),
        Reference::Found(reference) => reference,
    };

    let chains = ctx.ancestor_ids(species).await?;

    // id -> descends from reference; a chain's prefix is its members' chains
    let mut descends: FxHashMap<SpeciesId, bool> = FxHashMap::default();
    descends.insert(reference.id, false);

    Ok(Some(collect_filtered(species, |i, sp| {
        if let Some(&known) = descends.get(&sp.id) {
            return !known;
        }
        let mut found = false;
        for &id in chains[i].iter() {
            if id == reference.id {
                found = true;
                continue;
            }
            descends.entry(id).or_insert(found);
        }
        descends.insert(sp.id, found);
        !found
    })))
}

/// Keeps species the reference descends from
async fn descendant(
    args: &ParsedModifier,
    ctx: &mut SearchContext<'_>,
    species: &[Arc<Species>],
) -> StoreResult<Option<RoaringBitmap>> {
    let reference = match reference(args, ctx).await? {
        Reference::Blank => return Ok(None),
        Reference::Missing => return Ok(Some(ids_of(species))),
        Reference::Found(reference) => reference,
    };

    let chain = ctx
        .ancestor_ids(slice::from_ref(&reference))
        .await?
        .pop()
        .unwrap_or_default();
    let ancestors: RoaringBitmap = chain.iter().copied().collect();

    Ok(Some(collect_filtered(species, |_, sp| !ancestors.contains(sp.id))))
}

/// Keeps species that prey on the reference
async fn predator(
    args: &ParsedModifier,
    ctx: &mut SearchContext<'_>,
    species: &[Arc<Species>],
) -> StoreResult<Option<RoaringBitmap>> {
    let reference = match reference(args, ctx).await? {
        Reference::Blank => return Ok(None),
        Reference::Missing => return Ok(Some(ids_of(species))),
        Reference::Found(reference) => reference,
    };

    let predators = ctx
        .predators(slice::from_ref(&reference))
        .await?
        .pop()
        .unwrap_or_default();
    let keep = ids_of(&predators);

    Ok(Some(collect_filtered(species, |_, sp| !keep.contains(sp.id))))
}

/// Keeps species the reference preys on
async fn prey(
    args: &ParsedModifier,
    ctx: &mut SearchContext<'_>,
    species: &[Arc<Species>],
) -> StoreResult<Option<RoaringBitmap>> {
    let reference = match reference(args, ctx).await? {
        Reference::Blank => return Ok(None),
        Reference::Missing => return Ok(Some(ids_of(species))),
        Reference::Found(reference) => reference,
    };

    let prey = ctx
        .prey(slice::from_ref(&reference))
        .await?
        .pop()
        .unwrap_or_default();
    let keep = ids_of(&prey);

    Ok(Some(collect_filtered(species, |_, sp| !keep.contains(sp.id))))
}

/// Keeps living species sharing a zone with the reference and competing
/// for its food: shared prey, or shared roles when the reference has no prey
async fn competitors(
    args: &ParsedModifier,
    ctx: &mut SearchContext<'_>,
    species: &[Arc<Species>],
) -> StoreResult<Option<RoaringBitmap>> {
    let reference = match reference(args, ctx).await? {
        Reference::Blank => return Ok(None),
        Reference::Missing => return Ok(Some(ids_of(species))),
        Reference::Found(reference) => reference,
    };
    let anchor = slice::from_ref(&reference);

    let reference_zones: RoaringBitmap = ctx
        .zones(anchor)
        .await?
        .iter()
        .flat_map(|zones| zones.iter().map(|z| z.id))
        .collect();
    let reference_prey: RoaringBitmap = ctx
        .prey(anchor)
        .await?
        .iter()
        .flat_map(|prey| prey.iter().map(|p| p.id))
        .collect();

    let (niche, candidate_niches): (RoaringBitmap, Vec<RoaringBitmap>) =
        if !reference_prey.is_empty() {
            let candidate_prey = ctx.prey(species).await?;
            (
                reference_prey,
                candidate_prey.iter().map(|prey| ids_of(prey)).collect(),
            )
        } else {
            let reference_roles: RoaringBitmap = ctx
                .roles(anchor)
                .await?
                .iter()
                .flat_map(|roles| roles.iter().map(|r| r.id))
                .collect();
            let candidate_roles = ctx.roles(species).await?;
            (
                reference_roles,
                candidate_roles
                    .iter()
                    .map(|roles| roles.iter().map(|r| r.id).collect())
                    .collect(),
            )
        };

    let zones = ctx.zones(species).await?;

    Ok(Some(collect_filtered(species, |i, sp| {
        let shares_zone = zones[i].iter().any(|z| reference_zones.contains(z.id));
        let competes = !sp.is_extinct()
            && sp.id != reference.id
            && shares_zone
            && !candidate_niches[i].is_disjoint(&niche);
        !competes
    })))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HasTarget {
    Prey,
    Predators,
    Ancestor,
    Descendants,
    Roles,
    Zones,
    Pictures,
    Size,
}

impl HasTarget {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "prey" | "food" => Some(HasTarget::Prey),
            "predator" | "predators" => Some(HasTarget::Predators),
            "ancestor" | "ancestors" => Some(HasTarget::Ancestor),
            "descendant" | "descendants" | "evolution" | "evolutions" => {
                Some(HasTarget::Descendants)
            }
            "role" | "roles" => Some(HasTarget::Roles),
            "zone" | "zones" => Some(HasTarget::Zones),
            "picture" | "pictures" | "pic" | "pics" | "image" | "images" | "gallery" => {
                Some(HasTarget::Pictures)
            }
            "size" => Some(HasTarget::Size),
            _ => None,
        }
    }
}

async fn has(
    args: &ParsedModifier,
    ctx: &mut SearchContext<'_>,
    species: &[Arc<Species>],
) -> StoreResult<Option<RoaringBitmap>> {
    let mut targets: Vec<HasTarget> = Vec::new();
    for target in non_blank(args).into_iter().filter_map(HasTarget::from_name) {
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
    if targets.is_empty() {
        return Ok(None);
    }

    let mut present: Vec<Vec<bool>> = Vec::with_capacity(targets.len());
    for target in targets {
        let flags: Vec<bool> = match target {
            HasTarget::Prey => ctx
                .prey(species)
                .await?
                .iter()
                .map(|r| !r.is_empty())
                .collect(),
            HasTarget::Predators => ctx
                .predators(species)
                .await?
                .iter()
                .map(|r| !r.is_empty())
                .collect(),
            HasTarget::Ancestor => ctx
                .ancestor_ids(species)
                .await?
                .iter()
                .map(|r| !r.is_empty())
                .collect(),
            HasTarget::Descendants => ctx
                .descendants(species)
                .await?
                .iter()
                .map(|r| !r.is_empty())
                .collect(),
            HasTarget::Roles => ctx
                .roles(species)
                .await?
                .iter()
                .map(|r| !r.is_empty())
                .collect(),
            HasTarget::Zones => ctx
                .zones(species)
                .await?
                .iter()
                .map(|r| !r.is_empty())
                .collect(),
            HasTarget::Pictures => ctx
                .pictures(species)
                .await?
                .iter()
                .map(|r| !r.is_empty())
                .collect(),
            HasTarget::Size => species
                .iter()
                .map(|sp| parse_size(&sp.description).is_some())
                .collect(),
        };
        present.push(flags);
    }

    Ok(Some(collect_filtered(species, |i, _| {
        fails_every(&present, |flags| flags[i])
    })))
}

fn recent(
    args: &ParsedModifier,
    now: DateTime<Utc>,
    species: &[Arc<Species>],
) -> Option<RoaringBitmap> {
    let window = parse_duration(&args.value)?;
    let cutoff = now
        .checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    Some(collect_filtered(species, |_, sp| sp.created < cutoff))
}

/// Samples from the whole current list, not per group
fn random(
    args: &ParsedModifier,
    ctx: &mut SearchContext<'_>,
    species: &[Arc<Species>],
) -> Option<RoaringBitmap> {
    let count: usize = args.first_value().trim().parse().ok()?;
    let amount = count.min(species.len());
    let keep: RoaringBitmap = rand::seq::index::sample(ctx.rng(), species.len(), amount)
        .into_iter()
        .filter_map(|idx| species.get(idx))
        .map(|sp| sp.id)
        .collect();
    Some(collect_filtered(species, |_, sp| !keep.contains(sp.id)))
}

/// Keeps the first `n` species of the current ordering
fn limit(args: &ParsedModifier, species: &[Arc<Species>]) -> Option<RoaringBitmap> {
    let count: usize = args.first_value().trim().parse().ok()?;
    Some(collect_filtered(species, |i, _| i >= count))
}

async fn generation(
    args: &ParsedModifier,
    ctx: &mut SearchContext<'_>,
    species: &[Arc<Species>],
) -> StoreResult<Option<RoaringBitmap>> {
    let Ok(number) = args.first_value().trim().parse::<u32>() else {
        return Ok(None);
    };

    Ok(Some(match ctx.store().generation_by_number(number).await? {
        Some(generation) => collect_filtered(species, |_, sp| !generation.contains(sp.created)),
        None => ids_of(species),
    }))
}
