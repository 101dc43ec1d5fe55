//! End-to-end tests of the query pipeline against the reef catalog
//! (see `fixtures/mod.rs` for the table of species).

mod fixtures;

use fixtures::{ids, numbered, reef, run, sorted_ids};
use rustc_hash::FxHashSet;
use taxa::query::{parse_query, DisplayFormat, ParsedModifier, ResultSet};
use taxa::store::MemoryStore;

const ALL: [u32; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

fn group_names(results: &ResultSet) -> Vec<String> {
    results
        .groups()
        .iter()
        .map(|g| g.name().to_string())
        .collect()
}

#[test]
fn test_tokenize_keywords_and_modifiers() {
    let query = parse_query("dragon zone:1,2 -status:extinct");
    assert_eq!(query.keywords, vec!["dragon"]);
    assert_eq!(query.modifiers, vec!["zone:1,2", "-status:extinct"]);

    let status = ParsedModifier::parse(&query.modifiers[1]);
    assert_eq!(status.name, "status");
    assert_eq!(status.value, "extinct");
    assert!(status.invert);
}

#[tokio::test]
async fn test_invert_removes_the_complement() {
    let store = reef();
    let filters = [
        "status:extinct",
        "status:endangered",
        "zone:1",
        "zone:1,2",
        "role:grazer",
        "family:piscidae",
        "creator:ana",
        "ancestor:\"herba prima\"",
        "descendant:\"aspis magna\"",
        "predator:\"aspis vulgaris\"",
        "prey:\"borus ferox\"",
        "competitors:\"aspis vulgaris\"",
        "has:prey,pictures",
        "recent:7d",
        "limit:3",
        "random:4",
        "generation:1",
        "ancestor:nosuch",
    ];

    for filter in filters {
        let kept: FxHashSet<u32> = ids(&run(&store, filter).await).into_iter().collect();
        let inverted: FxHashSet<u32> = ids(&run(&store, &format!("-{}", filter)).await)
            .into_iter()
            .collect();

        assert!(kept.is_disjoint(&inverted), "{} overlaps its inverse", filter);
        let mut union: Vec<u32> = kept.union(&inverted).copied().collect();
        union.sort_unstable();
        assert_eq!(union, ALL, "{} and its inverse do not cover the set", filter);
    }
}

#[tokio::test]
async fn test_status_filter() {
    let store = MemoryStore::from_json(
        r#"{"species": [
            {"id": 1, "genus": "alpha", "name": "a", "created": "2024-01-01T00:00:00Z"},
            {"id": 2, "genus": "beta", "name": "b", "status": "extinct", "created": "2024-01-01T00:00:00Z"},
            {"id": 3, "genus": "gamma", "name": "c", "created": "2024-01-01T00:00:00Z"}
        ]}"#,
    )
    .unwrap();

    assert_eq!(ids(&run(&store, "status:extinct").await), vec![2]);
    assert_eq!(ids(&run(&store, "-status:extinct").await), vec![1, 3]);
    assert_eq!(ids(&run(&store, "status:extant").await), vec![1, 3]);
}

#[tokio::test]
async fn test_filter_prunes_empty_groups() {
    let store = reef();
    let results = run(&store, "groupby:zone status:extinct").await;

    assert!(!results.contains_group("Zone 1"));
    assert_eq!(group_names(&results), vec!["Zone 2", "Zone 10"]);
    assert!(results.groups().iter().all(|g| !g.is_empty()));
}

#[tokio::test]
async fn test_species_in_many_groups() {
    let store = reef();
    let mut results = run(&store, "groupby:zone").await;

    assert_eq!(group_names(&results), vec!["Zone 1", "Zone 2", "Zone 10"]);
    let holds_prima = |results: &ResultSet, zone: &str| {
        results
            .group(zone)
            .map(|g| g.items().iter().any(|sp| sp.id == 1))
            .unwrap_or(false)
    };
    assert!(holds_prima(&results, "Zone 1"));
    assert!(holds_prima(&results, "Zone 2"));

    // Drop prima from the first group that holds it only
    let mut dropped = false;
    results.filter_by(
        |sp| {
            if sp.id == 1 && !dropped {
                dropped = true;
                return true;
            }
            false
        },
        false,
    );
    assert!(!holds_prima(&results, "Zone 1"));
    assert!(holds_prima(&results, "Zone 2"));
}

#[tokio::test]
async fn test_limit_depends_on_preceding_order() {
    let store = reef();
    assert_eq!(ids(&run(&store, "limit:3").await), vec![1, 2, 3]);
    assert_eq!(ids(&run(&store, "orderby:oldest limit:3").await), vec![1, 7, 2]);
}

#[tokio::test]
async fn test_random_sample_bounds() {
    let store = numbered(20);

    let sample = ids(&run(&store, "random:5").await);
    assert_eq!(sample.len(), 5);
    let unique: FxHashSet<u32> = sample.iter().copied().collect();
    assert_eq!(unique.len(), 5);
    assert!(sample.iter().all(|id| (1..=20).contains(id)));

    assert_eq!(ids(&run(&store, "random:50").await).len(), 20);
    assert!(run(&store, "random:0").await.is_empty());
    assert_eq!(ids(&run(&store, "random:many").await).len(), 20);
}

#[tokio::test]
async fn test_random_is_one_global_sample() {
    let store = numbered(20);
    let results = run(&store, "groupby:status random:4").await;
    assert_eq!(results.unique_species().len(), 4);
    assert_eq!(results.len(), 4);
}

#[tokio::test]
async fn test_filters_are_idempotent() {
    let store = reef();
    let filters = [
        "status:extinct",
        "zone:1,2",
        "ancestor:\"aspis vulgaris\"",
        "has:prey",
        "limit:3",
        "recent:7d",
        "competitors:\"aspis vulgaris\"",
        "-creator:blake",
    ];

    for filter in filters {
        let once = ids(&run(&store, filter).await);
        let twice = ids(&run(&store, &format!("{} {}", filter, filter)).await);
        assert_eq!(once, twice, "{} is not idempotent", filter);
    }
}

#[tokio::test]
async fn test_unknown_modifier_is_ignored() {
    let store = reef();
    let plain = ids(&run(&store, "aspis").await);
    assert_eq!(plain, vec![3, 4, 5, 9]);
    assert_eq!(ids(&run(&store, "aspis colour:red").await), plain);
}

#[tokio::test]
async fn test_keyword_search() {
    let store = reef();
    assert_eq!(ids(&run(&store, "weed").await), vec![1, 8]);
    assert_eq!(ids(&run(&store, "\"mat weed\"").await), vec![1]);
    assert_eq!(ids(&run(&store, "").await), ALL);
    assert!(run(&store, "kraken").await.is_empty());
}

#[tokio::test]
async fn test_relation_filters() {
    let store = reef();
    assert_eq!(sorted_ids(&run(&store, "ancestor:\"herba prima\"").await), vec![2, 8]);
    assert_eq!(sorted_ids(&run(&store, "ancestor:vulgaris").await), vec![4, 5, 9]);
    assert_eq!(sorted_ids(&run(&store, "descendant:\"aspis magna\"").await), vec![3, 4]);
    assert_eq!(sorted_ids(&run(&store, "predator:\"aspis vulgaris\"").await), vec![6, 7]);
    assert_eq!(sorted_ids(&run(&store, "prey:\"b. ferox\"").await), vec![3, 4]);
    assert_eq!(sorted_ids(&run(&store, "competitors:\"aspis vulgaris\"").await), vec![4, 9]);
    assert_eq!(sorted_ids(&run(&store, "competitors:\"herba prima\"").await), vec![10]);
}

#[tokio::test]
async fn test_unresolved_reference_filters_everything() {
    let store = reef();
    for query in ["ancestor:nosuch", "predator:nosuch", "competitors:nosuch"] {
        assert!(run(&store, query).await.is_empty(), "{} kept species", query);
    }
    // No name at all is a no-op
    assert_eq!(ids(&run(&store, "ancestor:").await), ALL);
}

#[tokio::test]
async fn test_attribute_filters() {
    let store = reef();
    assert_eq!(sorted_ids(&run(&store, "status:endangered").await), vec![5]);
    assert_eq!(sorted_ids(&run(&store, "status:extinct,endangered").await), vec![2, 5, 7]);
    assert_eq!(ids(&run(&store, "status:sleeping").await), ALL);

    assert_eq!(sorted_ids(&run(&store, "zone:1").await), vec![1, 6, 10]);
    assert_eq!(sorted_ids(&run(&store, "z:\"zone 2\"").await), vec![1, 2, 4, 5]);
    assert_eq!(sorted_ids(&run(&store, "zone:1,2").await), vec![1, 2, 4, 5, 6, 10]);
    assert!(run(&store, "zone:99").await.is_empty());

    assert_eq!(sorted_ids(&run(&store, "role:grazers").await), vec![3, 4, 5, 9]);
}

#[tokio::test]
async fn test_taxon_and_creator_filters() {
    let store = reef();
    assert_eq!(sorted_ids(&run(&store, "family:piscidae").await), vec![3, 4, 5, 6, 7, 9]);
    assert_eq!(sorted_ids(&run(&store, "kingdom:plantae").await), vec![1, 2, 8, 10]);
    assert_eq!(sorted_ids(&run(&store, "genus:borus").await), vec![6, 7]);
    assert_eq!(sorted_ids(&run(&store, "taxon:chordata").await), vec![3, 4, 5, 6, 7, 9]);
    // Rank-specific filters ignore other ranks
    assert!(run(&store, "family:chordata").await.is_empty());

    assert_eq!(sorted_ids(&run(&store, "creator:ana").await), vec![1, 2, 5, 8, 10]);
    assert_eq!(sorted_ids(&run(&store, "creator:2").await), vec![3, 4, 6, 7, 9]);
    assert_eq!(ids(&run(&store, "creator:ana,blake").await), ALL);
}

#[tokio::test]
async fn test_has_filter() {
    let store = reef();
    assert_eq!(sorted_ids(&run(&store, "has:pictures").await), vec![1, 6]);
    assert_eq!(sorted_ids(&run(&store, "has:size").await), vec![1, 2, 3, 6]);
    assert_eq!(sorted_ids(&run(&store, "has:prey,pictures").await), vec![1, 3, 4, 5, 6, 7, 9]);
    assert_eq!(sorted_ids(&run(&store, "has:descendants").await), vec![1, 2, 3, 4]);
    assert_eq!(ids(&run(&store, "has:wings").await), ALL);
}

#[tokio::test]
async fn test_time_filters() {
    let store = reef();
    assert_eq!(sorted_ids(&run(&store, "recent:7d").await), vec![9, 10]);
    assert_eq!(ids(&run(&store, "recent:soon").await), ALL);

    assert_eq!(sorted_ids(&run(&store, "generation:1").await), vec![1, 2, 3, 7]);
    assert_eq!(sorted_ids(&run(&store, "gen:2").await), vec![4, 5, 6, 8, 9, 10]);
    assert!(run(&store, "generation:9").await.is_empty());
    assert_eq!(ids(&run(&store, "generation:first").await), ALL);
}

#[tokio::test]
async fn test_group_projections() {
    let store = reef();

    let results = run(&store, "groupby:family").await;
    assert!(!results.has_default_grouping());
    assert_eq!(group_names(&results), vec!["Herbidae", "Piscidae"]);

    let results = run(&store, "groupby:generation").await;
    assert_eq!(group_names(&results), vec!["Gen 1", "Gen 2"]);

    let results = run(&store, "groupby:creator").await;
    assert_eq!(group_names(&results), vec!["Ana", "Blake"]);
    assert_eq!(results.group("Ana").map(|g| g.len()), Some(5));

    let results = run(&store, "groupby:status").await;
    assert_eq!(group_names(&results), vec!["extant", "extinct"]);

    let results = run(&store, "groupby:colour").await;
    assert!(results.has_default_grouping());
    assert_eq!(results.group_count(), 1);
}

#[tokio::test]
async fn test_item_orderings() {
    let store = reef();

    let results = run(&store, "orderby:newest").await;
    assert!(!results.has_default_ordering());
    assert_eq!(ids(&results), vec![10, 9, 8, 6, 5, 4, 3, 2, 7, 1]);

    assert_eq!(ids(&run(&store, "-orderby:newest").await), vec![1, 7, 2, 3, 4, 5, 6, 8, 9, 10]);
    assert_eq!(ids(&run(&store, "orderby:largest").await), vec![2, 6, 3, 1, 4, 5, 7, 8, 9, 10]);
    assert_eq!(ids(&run(&store, "orderby:smallest").await), vec![1, 3, 6, 2, 4, 5, 7, 8, 9, 10]);

    let results = run(&store, "orderby:sideways").await;
    assert!(results.has_default_ordering());
    assert_eq!(ids(&results), ALL);
}

#[tokio::test]
async fn test_leaderboard_respects_explicit_order() {
    let store = reef();

    let results = run(&store, "groupby:zone format:leaderboard").await;
    assert_eq!(results.display_format(), DisplayFormat::Leaderboard);
    assert_eq!(group_names(&results), vec!["Zone 10", "Zone 2", "Zone 1"]);

    let results = run(&store, "groupby:zone orderby:oldest format:leaderboard").await;
    assert_eq!(results.display_format(), DisplayFormat::Leaderboard);
    assert_eq!(group_names(&results), vec!["Zone 1", "Zone 2", "Zone 10"]);

    let results = run(&store, "groupby:zone -orderby:count format:leaderboard").await;
    assert_eq!(results.display_format(), DisplayFormat::Leaderboard);
    assert_eq!(group_names(&results), vec!["Zone 1", "Zone 2", "Zone 10"]);

    let results = run(&store, "groupby:zone orderby:group format:leaderboard").await;
    assert_eq!(group_names(&results), vec!["Zone 1", "Zone 2", "Zone 10"]);

    let results = run(&store, "groupby:zone orderby:count").await;
    assert_eq!(results.display_format(), DisplayFormat::None);
    assert_eq!(group_names(&results), vec!["Zone 10", "Zone 2", "Zone 1"]);
}

#[tokio::test]
async fn test_name_formats() {
    let store = reef();

    let results = run(&store, "herba format:common").await;
    assert_eq!(
        results.get_string_results(),
        vec!["Mat Weed", "~~Herba secunda~~", "Herba tertia", "Quarter Grass"]
    );

    let results = run(&store, "aspis format:species").await;
    assert_eq!(results.get_string_results(), vec!["vulgaris", "rara", "magna", "parva"]);

    let results = run(&store, "aspis").await;
    assert_eq!(
        results.get_string_results(),
        vec!["A. vulgaris", "A. rara", "A. magna", "A. parva"]
    );

    let results = run(&store, "f:gallery").await;
    assert_eq!(results.display_format(), DisplayFormat::Gallery);
}

/// Pins current behavior: a formatter only applies to groups that exist
/// when it runs, so regrouping afterwards drops it.
#[tokio::test]
async fn test_format_before_regroup_is_lost() {
    let store = reef();

    let regrouped = run(&store, "aspis format:full groupby:zone").await;
    let strings = regrouped.get_string_results();
    assert!(!strings.is_empty());
    assert!(strings.iter().all(|s| s.starts_with("A. ")), "{:?}", strings);

    let formatted = run(&store, "aspis groupby:zone format:full").await;
    let strings = formatted.get_string_results();
    assert!(strings.iter().all(|s| s.starts_with("Aspis ")), "{:?}", strings);
}
