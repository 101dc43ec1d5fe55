//! Comparators and name formatters used by the order-by and format-by
//! modifiers.

use crate::query::result_set::Group;
use crate::store::{Species, SpeciesId};
use crate::utils::{natural_cmp, SizeRange};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;

/// How a species is rendered in string results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameFormat {
    /// "A. vulgaris"
    #[default]
    Short,
    /// "Aspidoceras vulgaris"
    Full,
    /// Common name, or the full name when there is none
    Common,
    /// "vulgaris"
    SpeciesOnly,
}

impl NameFormat {
    pub fn format(&self, species: &Species) -> String {
        match self {
            NameFormat::Short => species.short_name(),
            NameFormat::Full => species.full_name(),
            NameFormat::Common => species.common_or_full_name(),
            NameFormat::SpeciesOnly => species.name.to_lowercase(),
        }
    }
}

/// Per-group item orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOrder {
    /// Short name, the default listing order
    Name,
    FullName,
    CommonName,
    Newest,
    Oldest,
    /// Smallest minimum size first; species without a size go last
    Smallest,
    /// Largest maximum size first; species without a size go last
    Largest,
}

impl ItemOrder {
    /// Whether the comparator reads parsed sizes
    pub fn needs_sizes(&self) -> bool {
        matches!(self, ItemOrder::Smallest | ItemOrder::Largest)
    }

    pub fn compare(
        &self,
        a: &Species,
        b: &Species,
        sizes: &FxHashMap<SpeciesId, SizeRange>,
    ) -> Ordering {
        match self {
            ItemOrder::Name => natural_cmp(&a.short_name(), &b.short_name()),
            ItemOrder::FullName => natural_cmp(&a.full_name(), &b.full_name()),
            ItemOrder::CommonName => {
                natural_cmp(&a.common_or_full_name(), &b.common_or_full_name())
            }
            ItemOrder::Newest => b.created.cmp(&a.created),
            ItemOrder::Oldest => a.created.cmp(&b.created),
            ItemOrder::Smallest => compare_sizes(
                sizes.get(&a.id).map(|s| s.min),
                sizes.get(&b.id).map(|s| s.min),
                false,
            ),
            ItemOrder::Largest => compare_sizes(
                sizes.get(&a.id).map(|s| s.max),
                sizes.get(&b.id).map(|s| s.max),
                true,
            ),
        }
    }
}

/// Missing sizes always sort after known ones, whichever direction
fn compare_sizes(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) if descending => y.total_cmp(&x),
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Read-time group orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOrder {
    /// Largest groups first, the leaderboard order
    Count,
    /// Natural order of group names (the storage order)
    Name,
}

impl GroupOrder {
    pub fn compare(&self, a: &Group, b: &Group) -> Ordering {
        match self {
            GroupOrder::Count => b.len().cmp(&a.len()),
            GroupOrder::Name => natural_cmp(a.name(), b.name()),
        }
    }
}

/// Parsed `orderby:` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKey {
    Items(ItemOrder),
    Groups(GroupOrder),
}

impl OrderKey {
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name.trim().to_lowercase().as_str() {
            "name" | "default" | "short" | "shortname" | "abc" | "alphabetical" => {
                OrderKey::Items(ItemOrder::Name)
            }
            "full" | "fullname" => OrderKey::Items(ItemOrder::FullName),
            "common" | "commonname" => OrderKey::Items(ItemOrder::CommonName),
            "newest" | "new" | "recent" => OrderKey::Items(ItemOrder::Newest),
            "oldest" | "old" => OrderKey::Items(ItemOrder::Oldest),
            "smallest" | "small" | "size" => OrderKey::Items(ItemOrder::Smallest),
            "largest" | "large" | "biggest" => OrderKey::Items(ItemOrder::Largest),
            "count" | "members" | "leaderboard" => OrderKey::Groups(GroupOrder::Count),
            "group" | "groupname" => OrderKey::Groups(GroupOrder::Name),
            _ => return None,
        };
        Some(key)
    }
}
