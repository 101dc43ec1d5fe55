//! Alias table mapping modifier names to modifier kinds.
//!
//! The built-in set is a static table, so the full list of supported
//! modifiers can be enumerated (see `taxa modifiers`).

use crate::query::filters::FilterKind;
use crate::query::modifier::{Modifier, ModifierKind};
use crate::query::parser::ParsedModifier;
use crate::store::TaxonRank;
use rustc_hash::FxHashMap;

/// One registered modifier kind and the names it answers to
#[derive(Debug, Clone)]
pub struct ModifierEntry {
    pub aliases: Vec<String>,
    pub summary: String,
    pub kind: ModifierKind,
}

#[derive(Debug, Clone, Default)]
pub struct ModifierRegistry {
    entries: Vec<ModifierEntry>,
    by_alias: FxHashMap<String, usize>,
}

/// Built-in table: (aliases, summary, kind)
const BUILTINS: &[(&[&str], &str, ModifierKind)] = &[
    (
        &["status", "s"],
        "extant, extinct or endangered",
        ModifierKind::Filter(FilterKind::Status),
    ),
    (
        &["zone", "zones", "z"],
        "lives in any of the given zones",
        ModifierKind::Filter(FilterKind::Zone),
    ),
    (
        &["role", "roles", "r"],
        "has any of the given roles",
        ModifierKind::Filter(FilterKind::Role),
    ),
    (
        &["taxon", "taxa", "t"],
        "belongs to a taxon of any rank",
        ModifierKind::Filter(FilterKind::Taxon(None)),
    ),
    (
        &["genus"],
        "belongs to the genus",
        ModifierKind::Filter(FilterKind::Taxon(Some(TaxonRank::Genus))),
    ),
    (
        &["family"],
        "belongs to the family",
        ModifierKind::Filter(FilterKind::Taxon(Some(TaxonRank::Family))),
    ),
    (
        &["order"],
        "belongs to the order",
        ModifierKind::Filter(FilterKind::Taxon(Some(TaxonRank::Order))),
    ),
    (
        &["class"],
        "belongs to the class",
        ModifierKind::Filter(FilterKind::Taxon(Some(TaxonRank::Class))),
    ),
    (
        &["phylum"],
        "belongs to the phylum",
        ModifierKind::Filter(FilterKind::Taxon(Some(TaxonRank::Phylum))),
    ),
    (
        &["kingdom"],
        "belongs to the kingdom",
        ModifierKind::Filter(FilterKind::Taxon(Some(TaxonRank::Kingdom))),
    ),
    (
        &["domain"],
        "belongs to the domain",
        ModifierKind::Filter(FilterKind::Taxon(Some(TaxonRank::Domain))),
    ),
    (
        &["creator", "owner", "by", "user"],
        "created by any of the given users (name or id)",
        ModifierKind::Filter(FilterKind::Creator),
    ),
    (
        &["ancestor", "ancestors", "anc"],
        "descends from the named species",
        ModifierKind::Filter(FilterKind::Ancestor),
    ),
    (
        &["descendant", "descendants", "desc"],
        "is an ancestor of the named species",
        ModifierKind::Filter(FilterKind::Descendant),
    ),
    (
        &["predator", "predators", "eats"],
        "preys on the named species",
        ModifierKind::Filter(FilterKind::Predator),
    ),
    (
        &["prey", "eatenby"],
        "is preyed on by the named species",
        ModifierKind::Filter(FilterKind::Prey),
    ),
    (
        &["competitor", "competitors", "competes"],
        "competes with the named species for food",
        ModifierKind::Filter(FilterKind::Competitors),
    ),
    (
        &["has"],
        "has prey, predators, ancestor, descendants, roles, zones, pictures or size",
        ModifierKind::Filter(FilterKind::Has),
    ),
    (
        &["recent", "since"],
        "created within a duration, e.g. 2w3d",
        ModifierKind::Filter(FilterKind::Recent),
    ),
    (
        &["random", "rand"],
        "keep n species picked at random",
        ModifierKind::Filter(FilterKind::Random),
    ),
    (
        &["limit", "top", "first"],
        "keep the first n species",
        ModifierKind::Filter(FilterKind::Limit),
    ),
    (
        &["generation", "gen"],
        "created during generation n",
        ModifierKind::Filter(FilterKind::Generation),
    ),
    (
        &["groupby", "group", "g"],
        "group by zone, role, rank, creator, status or generation",
        ModifierKind::GroupBy,
    ),
    (
        &["orderby", "order-by", "sort", "sortby", "o"],
        "order by name, newest, oldest, smallest, largest or count",
        ModifierKind::OrderBy,
    ),
    (
        &["format", "formatby", "f"],
        "format as common, full, short, species, gallery or leaderboard",
        ModifierKind::FormatBy,
    ),
];

impl ModifierRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in modifier
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (aliases, summary, kind) in BUILTINS {
            registry.register(aliases, summary, *kind);
        }
        registry
    }

    /// Register a kind under one or more aliases. A later registration of
    /// an alias replaces the earlier one.
    pub fn register(&mut self, aliases: &[&str], summary: &str, kind: ModifierKind) {
        let index = self.entries.len();
        self.entries.push(ModifierEntry {
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            summary: summary.to_string(),
            kind,
        });
        for alias in aliases {
            self.by_alias.insert(alias.to_lowercase(), index);
        }
    }

    /// Case-insensitive lookup of the modifier's name
    pub fn resolve(&self, parsed: ParsedModifier) -> Option<Modifier> {
        let index = *self.by_alias.get(&parsed.name.to_lowercase())?;
        let entry = self.entries.get(index)?;
        Some(Modifier::new(entry.kind, parsed))
    }

    pub fn entries(&self) -> &[ModifierEntry] {
        &self.entries
    }
}
