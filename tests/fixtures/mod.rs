//! Shared catalogs for integration tests.
//!
//! The reef catalog:
//!
//! | id | species         | status  | zones        | roles    | prey | ancestor | created    | creator |
//! |----|-----------------|---------|--------------|----------|------|----------|------------|---------|
//! | 1  | Herba prima     | extant  | 1, 2         | producer |      |          | 2024-01-02 | Ana     |
//! | 2  | Herba secunda   | extinct | 2            | producer |      | 1        | 2024-01-05 | Ana     |
//! | 3  | Aspis vulgaris  | extant  | 10           | grazer   | 1    |          | 2024-01-10 | Blake   |
//! | 4  | Aspis rara      | extant  | 2, 10        | grazer   | 1    | 3        | 2024-02-03 | Blake   |
//! | 5  | Aspis magna     | extant  | 2            | grazer   | 2    | 4        | 2024-02-10 | Ana     |
//! | 6  | Borus ferox     | extant  | 1, 10        | predator | 3, 4 |          | 2024-02-15 | #2      |
//! | 7  | Borus antiquus  | extinct | 10           | predator | 3    |          | 2024-01-03 | Blake   |
//! | 8  | Herba tertia    | extant  | 10           | producer |      | 2        | 2024-02-20 | Ana     |
//! | 9  | Aspis parva     | extant  | 10           | grazer   | 1    | 4        | 2024-02-25 | Blake   |
//! | 10 | Herba quarta    | extant  | 1            | producer |      |          | 2024-03-01 | #1      |

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use taxa::query::{ModifierRegistry, ResultSet, SearchExecutor};
use taxa::store::{Catalog, CreatorRef, MemoryStore, Species, SpeciesRecord, Status};

pub const REEF_CATALOG: &str = r#"{
    "taxa": [
        {"id": 1, "name": "Animalia", "rank": "kingdom"},
        {"id": 2, "name": "Chordata", "rank": "phylum", "parent": 1},
        {"id": 3, "name": "Piscidae", "rank": "family", "parent": 2},
        {"id": 4, "name": "Aspis", "rank": "genus", "parent": 3},
        {"id": 5, "name": "Borus", "rank": "genus", "parent": 3},
        {"id": 6, "name": "Plantae", "rank": "kingdom"},
        {"id": 7, "name": "Herbidae", "rank": "family", "parent": 6},
        {"id": 8, "name": "Herba", "rank": "genus", "parent": 7}
    ],
    "zones": [
        {"id": 1, "name": "Zone 1"},
        {"id": 2, "name": "Zone 2"},
        {"id": 3, "name": "Zone 10"}
    ],
    "roles": [
        {"id": 1, "name": "Producer"},
        {"id": 2, "name": "Grazer"},
        {"id": 3, "name": "Predator"}
    ],
    "creators": [
        {"name": "Ana", "user_id": 1},
        {"name": "Blake", "user_id": 2}
    ],
    "generations": [
        {"number": 1, "start": "2024-01-01T00:00:00Z", "end": "2024-02-01T00:00:00Z"},
        {"number": 2, "start": "2024-02-01T00:00:00Z"}
    ],
    "species": [
        {"id": 1, "genus": "herba", "name": "prima", "common_name": "mat weed",
         "description": "A low mat weed, 1-3 cm tall.",
         "created": "2024-01-02T00:00:00Z", "creator": {"name": "Ana"},
         "zones": [1, 2], "roles": [1],
         "pictures": [{"url": "https://pics.example/prima.png", "artist": "Ana"}]},
        {"id": 2, "genus": "herba", "name": "secunda", "status": "extinct",
         "description": "A tall reed reaching 2 m.",
         "created": "2024-01-05T00:00:00Z", "creator": {"name": "Ana"},
         "zones": [2], "roles": [1], "ancestor": 1},
        {"id": 3, "genus": "aspis", "name": "vulgaris",
         "description": "Small grazing fish, 10 cm long.",
         "created": "2024-01-10T00:00:00Z", "creator": {"name": "Blake"},
         "zones": [3], "roles": [2], "prey": [1]},
        {"id": 4, "genus": "aspis", "name": "rara",
         "description": "Shy grazer of the shallows.",
         "created": "2024-02-03T00:00:00Z", "creator": {"name": "Blake"},
         "zones": [2, 3], "roles": [2], "prey": [1], "ancestor": 3},
        {"id": 5, "genus": "aspis", "name": "magna",
         "description": "Bulky grazer with armored scales.",
         "created": "2024-02-10T00:00:00Z", "creator": {"name": "Ana"},
         "zones": [2], "roles": [2], "prey": [2], "ancestor": 4},
        {"id": 6, "genus": "borus", "name": "ferox",
         "description": "Ambush predator reaching 1.5 m.",
         "created": "2024-02-15T00:00:00Z", "creator": {"user_id": 2},
         "zones": [1, 3], "roles": [3], "prey": [3, 4],
         "pictures": [{"url": "https://pics.example/ferox.png"}]},
        {"id": 7, "genus": "borus", "name": "antiquus", "status": "extinct",
         "description": "Early hunter of the reef.",
         "created": "2024-01-03T00:00:00Z", "creator": {"name": "Blake"},
         "zones": [3], "roles": [3], "prey": [3]},
        {"id": 8, "genus": "herba", "name": "tertia",
         "description": "Creeping weed of deep water.",
         "created": "2024-02-20T00:00:00Z", "creator": {"name": "Ana"},
         "zones": [3], "roles": [1], "ancestor": 2},
        {"id": 9, "genus": "aspis", "name": "parva",
         "description": "Tiny grazer of the deep.",
         "created": "2024-02-25T00:00:00Z", "creator": {"name": "Blake"},
         "zones": [3], "roles": [2], "prey": [1], "ancestor": 4},
        {"id": 10, "genus": "herba", "name": "quarta", "common_name": "quarter grass",
         "description": "Sparse grass of open sand.",
         "created": "2024-03-01T00:00:00Z", "creator": {"user_id": 1},
         "zones": [1], "roles": [1]}
    ]
}"#;

pub const SEED: u64 = 7;

pub fn reef() -> MemoryStore {
    MemoryStore::from_json(REEF_CATALOG).expect("reef catalog is valid")
}

/// Clock pinned one day after the newest reef species
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap()
}

/// `count` unrelated species "Numerus n1".., created one day apart; every
/// third one is extinct
pub fn numbered(count: u32) -> MemoryStore {
    let species = (1..=count)
        .map(|id| {
            SpeciesRecord::new(Species {
                id,
                genus: "numerus".to_string(),
                name: format!("n{}", id),
                common_name: None,
                description: String::new(),
                status: if id % 3 == 0 { Status::Extinct } else { Status::Extant },
                created: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                    + chrono::TimeDelta::days(i64::from(id)),
                creator: CreatorRef::named("Ana"),
            })
        })
        .collect();

    MemoryStore::from_catalog(Catalog {
        species,
        ..Default::default()
    })
    .expect("numbered catalog is valid")
}

/// Run a query against a store with a fixed seed and clock
pub async fn run(store: &MemoryStore, query: &str) -> ResultSet {
    let registry = ModifierRegistry::with_builtins();
    SearchExecutor::new(store, store, &registry)
        .with_seed(Some(SEED))
        .with_now(now())
        .execute(query)
        .await
        .expect("query runs")
}

/// Distinct species ids in display order
pub fn ids(results: &ResultSet) -> Vec<u32> {
    results.unique_species().iter().map(|sp| sp.id).collect()
}

/// Distinct species ids, sorted
pub fn sorted_ids(results: &ResultSet) -> Vec<u32> {
    let mut ids = ids(results);
    ids.sort_unstable();
    ids
}
