use crate::query::context::SearchContext;
use crate::query::filters::{apply_filter, FilterKind};
use crate::query::ordering::{GroupOrder, NameFormat, OrderKey};
use crate::query::parser::ParsedModifier;
use crate::query::result_set::{DisplayFormat, ResultSet};
use crate::store::{SpeciesId, StoreResult, TaxonRank};
use crate::utils::{parse_size, SizeRange};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Pipeline stage family of a modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKind {
    Filter(FilterKind),
    GroupBy,
    OrderBy,
    FormatBy,
}

impl ModifierKind {
    pub fn family(&self) -> &'static str {
        match self {
            ModifierKind::Filter(_) => "filter",
            ModifierKind::GroupBy => "group",
            ModifierKind::OrderBy => "order",
            ModifierKind::FormatBy => "format",
        }
    }
}

/// A resolved modifier: its kind plus the token it was parsed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modifier {
    kind: ModifierKind,
    args: ParsedModifier,
}

impl Modifier {
    pub fn new(kind: ModifierKind, args: ParsedModifier) -> Self {
        Self { kind, args }
    }

    pub fn kind(&self) -> ModifierKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.args.name
    }

    pub fn value(&self) -> &str {
        &self.args.value
    }

    pub fn values(&self) -> &[String] {
        &self.args.values
    }

    pub fn invert(&self) -> bool {
        self.args.invert
    }

    /// Run this stage against the result set.
    ///
    /// Store errors propagate; bad values degrade to a no-op.
    pub async fn apply(
        &self,
        ctx: &mut SearchContext<'_>,
        results: &mut ResultSet,
    ) -> StoreResult<()> {
        match self.kind {
            ModifierKind::Filter(kind) => apply_filter(kind, &self.args, ctx, results).await,
            ModifierKind::GroupBy => self.apply_group_by(ctx, results).await,
            ModifierKind::OrderBy => {
                self.apply_order_by(results);
                Ok(())
            }
            ModifierKind::FormatBy => {
                self.apply_format_by(results);
                Ok(())
            }
        }
    }

    async fn apply_group_by(
        &self,
        ctx: &mut SearchContext<'_>,
        results: &mut ResultSet,
    ) -> StoreResult<()> {
        let Some(projection) = Projection::from_name(self.args.first_value()) else {
            debug!("{}: unknown projection {:?}", self.args.name, self.args.value);
            return Ok(());
        };

        let species = results.unique_species();
        let names: Vec<Vec<String>> = match projection {
            Projection::Zone => ctx
                .zones(&species)
                .await?
                .iter()
                .map(|zones| zones.iter().map(|z| z.name.clone()).collect())
                .collect(),
            Projection::Role => ctx
                .roles(&species)
                .await?
                .iter()
                .map(|roles| roles.iter().map(|r| r.name.clone()).collect())
                .collect(),
            Projection::Rank(rank) => {
                let taxa = ctx.taxa(&species).await?;
                species
                    .iter()
                    .zip(taxa.iter())
                    .map(|(sp, taxa)| {
                        let names: Vec<String> = taxa
                            .iter()
                            .filter(|t| t.rank == rank)
                            .map(|t| t.name.clone())
                            .collect();
                        if names.is_empty() && rank == TaxonRank::Genus {
                            vec![sp.genus_name()]
                        } else {
                            names
                        }
                    })
                    .collect()
            }
            Projection::Creator => ctx
                .creators(&species)
                .await?
                .into_iter()
                .map(|creator| creator.map(|c| c.name).into_iter().collect())
                .collect(),
            Projection::Status => species
                .iter()
                .map(|sp| vec![sp.status.as_str().to_string()])
                .collect(),
            Projection::Generation => ctx
                .generations(&species)
                .await?
                .iter()
                .map(|generation| generation.iter().map(|g| g.name()).collect())
                .collect(),
        };

        let mut membership: FxHashMap<SpeciesId, Vec<String>> = species
            .iter()
            .map(|sp| sp.id)
            .zip(names)
            .collect();

        results.group_by(|sp| membership.remove(&sp.id).unwrap_or_default());
        debug!("grouped by {:?} into {} groups", projection, results.group_count());
        Ok(())
    }

    fn apply_order_by(&self, results: &mut ResultSet) {
        let Some(key) = OrderKey::from_name(self.args.first_value()) else {
            debug!("{}: unknown order {:?}", self.args.name, self.args.value);
            return;
        };
        let reverse = self.args.invert;

        match key {
            OrderKey::Items(order) => {
                let sizes: FxHashMap<SpeciesId, SizeRange> = if order.needs_sizes() {
                    results
                        .unique_species()
                        .iter()
                        .filter_map(|sp| parse_size(&sp.description).map(|size| (sp.id, size)))
                        .collect()
                } else {
                    FxHashMap::default()
                };

                results.order_by(|a, b| {
                    let ordering = order.compare(a, b, &sizes);
                    if reverse {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                });
            }
            OrderKey::Groups(order) => results.order_groups_by(order, reverse),
        }
    }

    fn apply_format_by(&self, results: &mut ResultSet) {
        let value = self.args.first_value();
        match value {
            "gallery" | "pictures" | "images" => {
                results.set_display_format(DisplayFormat::Gallery);
            }
            "leaderboard" | "lb" => {
                results.set_display_format(DisplayFormat::Leaderboard);
                if results.has_default_ordering() && results.group_order().is_none() {
                    results.order_groups_by(GroupOrder::Count, false);
                }
            }
            "list" | "none" => results.set_display_format(DisplayFormat::None),
            _ => match name_format(value) {
                Some(format) => results.format_by(format),
                None => debug!("{}: unknown format {:?}", self.args.name, value),
            },
        }
    }
}

fn name_format(value: &str) -> Option<NameFormat> {
    match value {
        "common" | "commonname" | "commonnames" => Some(NameFormat::Common),
        "full" | "fullname" | "binomial" => Some(NameFormat::Full),
        "short" | "shortname" | "abbreviated" => Some(NameFormat::Short),
        "species" | "speciesonly" | "epithet" => Some(NameFormat::SpeciesOnly),
        _ => None,
    }
}

/// Group-name projection for `groupby:`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Projection {
    Zone,
    Role,
    Rank(TaxonRank),
    Creator,
    Status,
    Generation,
}

impl Projection {
    fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "zone" | "zones" | "z" => Some(Projection::Zone),
            "role" | "roles" => Some(Projection::Role),
            "creator" | "creators" | "owner" | "owners" | "user" => Some(Projection::Creator),
            "status" => Some(Projection::Status),
            "generation" | "generations" | "gen" => Some(Projection::Generation),
            other => TaxonRank::from_name(other).map(Projection::Rank),
        }
    }
}
