//! The mutable result structure every modifier operates on.
//!
//! Species are partitioned into named groups. Storage is always keyed by
//! the natural order of group names; a group ordering set by a modifier is
//! only applied when groups are read back.

use crate::query::ordering::{GroupOrder, NameFormat};
use crate::store::{Species, SpeciesId};
use crate::utils::natural_cmp;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Name of the single group that exists until a group-by runs
pub const DEFAULT_GROUP: &str = "";

/// Presentation hint attached to a finished result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayFormat {
    #[default]
    None,
    Gallery,
    Leaderboard,
}

/// Group name ordered naturally ("Zone 2" before "Zone 10")
#[derive(Debug, Clone, PartialEq, Eq)]
struct GroupKey(String);

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.0, &other.0)
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A named partition of the result set
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    items: Vec<Arc<Species>>,
    formatter: Option<NameFormat>,
}

impl Group {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            items: Vec::new(),
            formatter: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> &[Arc<Species>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn formatter(&self) -> Option<NameFormat> {
        self.formatter
    }

    /// Render one species with this group's formatter; extinct species
    /// are struck out.
    pub fn format(&self, species: &Species) -> String {
        let name = self.formatter.unwrap_or_default().format(species);
        if species.is_extinct() {
            format!("~~{}~~", name)
        } else {
            name
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResultSet {
    groups: BTreeMap<GroupKey, Group>,
    group_order: Option<(GroupOrder, bool)>,
    has_default_grouping: bool,
    has_default_ordering: bool,
    display_format: DisplayFormat,
}

impl Default for ResultSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultSet {
    pub fn new() -> Self {
        Self {
            groups: BTreeMap::new(),
            group_order: None,
            has_default_grouping: true,
            has_default_ordering: true,
            display_format: DisplayFormat::None,
        }
    }

    /// Result set holding `species` in the default group
    pub fn from_species(species: Vec<Arc<Species>>) -> Self {
        let mut results = Self::new();
        if !species.is_empty() {
            results.add(DEFAULT_GROUP, species);
        }
        results
    }

    /// Append species to a group, creating it if needed.
    ///
    /// Duplicates are kept; only a group-by removes them. A group created
    /// here does not pick up a formatter set by an earlier `format_by`.
    pub fn add(&mut self, group: &str, species: impl IntoIterator<Item = Arc<Species>>) {
        self.groups
            .entry(GroupKey(group.to_string()))
            .or_insert_with(|| Group::new(group))
            .items
            .extend(species);
    }

    pub fn contains_group(&self, name: &str) -> bool {
        self.groups.contains_key(&GroupKey(name.to_string()))
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(&GroupKey(name.to_string()))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Groups in display order: natural key order, then the group
    /// ordering if one was set (stable, so ties keep key order)
    pub fn groups(&self) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self.groups.values().collect();
        if let Some((order, reverse)) = self.group_order {
            groups.sort_by(|a, b| {
                let ord = order.compare(a, b);
                if reverse { ord.reverse() } else { ord }
            });
        }
        groups
    }

    /// Remove every species where `is_filtered(species) != invert`, then
    /// prune groups left empty.
    pub fn filter_by<F>(&mut self, mut is_filtered: F, invert: bool)
    where
        F: FnMut(&Species) -> bool,
    {
        for group in self.groups.values_mut() {
            group.items.retain(|species| is_filtered(species) == invert);
        }
        self.groups.retain(|_, group| !group.is_empty());
    }

    /// Re-partition all species by `projection`.
    ///
    /// Species are de-duplicated by id first. A species lands in every
    /// group its projection names, or in none if the projection is empty.
    /// The new groups start without a formatter.
    pub fn group_by<F>(&mut self, mut projection: F)
    where
        F: FnMut(&Species) -> Vec<String>,
    {
        let species = self.unique_species();
        self.groups.clear();

        for sp in species {
            let mut seen = FxHashSet::default();
            for name in projection(&sp) {
                if seen.insert(name.clone()) {
                    self.add(&name, [Arc::clone(&sp)]);
                }
            }
        }

        self.has_default_grouping = false;
    }

    /// Sort each group's items independently
    pub fn order_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Species, &Species) -> Ordering,
    {
        for group in self.groups.values_mut() {
            group.items.sort_by(|a, b| compare(a, b));
        }
        self.has_default_ordering = false;
    }

    /// Set the read-time group ordering; storage order is untouched
    pub fn order_groups_by(&mut self, order: GroupOrder, reverse: bool) {
        self.group_order = Some((order, reverse));
    }

    /// Set the formatter on every group that exists right now
    pub fn format_by(&mut self, format: NameFormat) {
        for group in self.groups.values_mut() {
            group.formatter = Some(format);
        }
    }

    pub fn set_display_format(&mut self, format: DisplayFormat) {
        self.display_format = format;
    }

    pub fn display_format(&self) -> DisplayFormat {
        self.display_format
    }

    pub fn has_default_grouping(&self) -> bool {
        self.has_default_grouping
    }

    pub fn has_default_ordering(&self) -> bool {
        self.has_default_ordering
    }

    pub fn group_order(&self) -> Option<GroupOrder> {
        self.group_order.map(|(order, _)| order)
    }

    /// Total number of entries across groups (multi-group species count
    /// once per group)
    pub fn len(&self) -> usize {
        self.groups.values().map(Group::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Group::is_empty)
    }

    /// Distinct species in display order, first occurrence wins
    pub fn unique_species(&self) -> Vec<Arc<Species>> {
        let mut seen: FxHashSet<SpeciesId> = FxHashSet::default();
        self.groups()
            .into_iter()
            .flat_map(|group| group.items.iter())
            .filter(|sp| seen.insert(sp.id))
            .cloned()
            .collect()
    }

    /// All species, group by group, in display order
    pub fn get_results(&self) -> Vec<Arc<Species>> {
        self.groups()
            .into_iter()
            .flat_map(|group| group.items.iter().cloned())
            .collect()
    }

    /// Like [`get_results`](Self::get_results), rendered through each
    /// group's formatter
    pub fn get_string_results(&self) -> Vec<String> {
        self.groups()
            .into_iter()
            .flat_map(|group| group.items.iter().map(move |sp| group.format(sp)))
            .collect()
    }
}
