use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a species in the store
pub type SpeciesId = u32;

/// Unique identifier for a taxon (genus and above)
pub type TaxonId = u32;

/// Unique identifier for a zone
pub type ZoneId = u32;

/// Unique identifier for an ecological role
pub type RoleId = u32;

/// Whether a species is still alive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Extant,
    Extinct,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Extant => "extant",
            Status::Extinct => "extinct",
        }
    }
}

/// Taxonomic rank of a [`Taxon`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxonRank {
    Domain,
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
}

impl TaxonRank {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "domain" | "domains" => Some(TaxonRank::Domain),
            "kingdom" | "kingdoms" => Some(TaxonRank::Kingdom),
            "phylum" | "phyla" => Some(TaxonRank::Phylum),
            "class" | "classes" => Some(TaxonRank::Class),
            "order" | "orders" => Some(TaxonRank::Order),
            "family" | "families" => Some(TaxonRank::Family),
            "genus" | "genera" => Some(TaxonRank::Genus),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonRank::Domain => "domain",
            TaxonRank::Kingdom => "kingdom",
            TaxonRank::Phylum => "phylum",
            TaxonRank::Class => "class",
            TaxonRank::Order => "order",
            TaxonRank::Family => "family",
            TaxonRank::Genus => "genus",
        }
    }
}

/// A named rank in the classification tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxon {
    pub id: TaxonId,
    pub name: String,
    pub rank: TaxonRank,
    /// Parent taxon one rank up, if any
    #[serde(default)]
    pub parent: Option<TaxonId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    pub url: String,
    #[serde(default)]
    pub artist: Option<String>,
}

/// Raw creator reference as recorded on a species.
///
/// Either half may be missing; compare references through a
/// [`CreatorResolver`](super::CreatorResolver) rather than directly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreatorRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user_id: Option<u64>,
}

impl CreatorRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            user_id: None,
        }
    }

    /// Parse a raw query value: all digits is a user id, anything else a name
    pub fn from_query_value(value: &str) -> Self {
        let value = value.trim();
        match value.parse::<u64>() {
            Ok(id) => Self {
                name: None,
                user_id: Some(id),
            },
            Err(_) => Self::named(value),
        }
    }
}

/// Canonical creator record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub name: String,
    #[serde(default)]
    pub user_id: Option<u64>,
}

impl Creator {
    /// Same creator: ids decide when both are known, names otherwise
    pub fn is_same(&self, other: &Creator) -> bool {
        match (self.user_id, other.user_id) {
            (Some(a), Some(b)) => a == b,
            _ => self.name.eq_ignore_ascii_case(&other.name),
        }
    }
}

/// A numbered period of the world's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    pub number: u32,
    pub start: DateTime<Utc>,
    /// Open-ended for the current generation
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl Generation {
    pub fn name(&self) -> String {
        format!("Gen {}", self.number)
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && self.end.map(|end| ts < end).unwrap_or(true)
    }
}

/// A species record.
///
/// The search engine never mutates species; it only selects and arranges
/// shared references to them. Relations (zones, prey, ancestry...) live in
/// the store and are looked up on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: SpeciesId,
    /// Genus name, e.g. "Aspidoceras"
    pub genus: String,
    /// Specific epithet, e.g. "vulgaris"
    pub name: String,
    #[serde(default)]
    pub common_name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Status,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub creator: CreatorRef,
}

impl Species {
    pub fn is_extinct(&self) -> bool {
        self.status == Status::Extinct
    }

    /// "A. vulgaris"
    pub fn short_name(&self) -> String {
        let initial = self
            .genus
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect::<String>())
            .unwrap_or_default();
        format!("{}. {}", initial, self.name.to_lowercase())
    }

    /// Capitalized genus, e.g. "Aspidoceras"
    pub fn genus_name(&self) -> String {
        capitalize(&self.genus)
    }

    /// "Aspidoceras vulgaris"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.genus_name(), self.name.to_lowercase())
    }

    /// Common name in title case, falling back to the full name
    pub fn common_or_full_name(&self) -> String {
        match self.common_name.as_deref().map(str::trim) {
            Some(common) if !common.is_empty() => title_case(common),
            _ => self.full_name(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}
