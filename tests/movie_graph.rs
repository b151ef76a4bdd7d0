// End-to-end behavior of the movie graph through GraphQL documents

use movie_graph::{
    EngineConfig, ExecutionState, Fixture, Movie, MovieGraph, MovieId, PathSegment,
    SequentialIdGenerator, Tag, TagId,
};
use movie_graph::{Artwork, ArtworkType, LatencyConfig};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

fn fixture() -> Fixture {
    Fixture::new()
        .tag(Tag::new("tag-1", "Drama"))
        .tag(Tag::new("tag-2", "Comedy"))
        .tag(Tag::new("tag-3", "Thriller"))
        .movie(
            Movie::new("1", "some movie 1")
                .with_tags(["tag-1", "tag-2"])
                .with_artworks(vec![
                    Artwork::new("1-en-boxart", "box en", "en", ArtworkType::Boxart),
                    Artwork::new("1-es-boxart", "box es", "es", ArtworkType::Boxart),
                    Artwork::new("1-en-billboard", "bill en", "en", ArtworkType::Billboard),
                ])
                .with_details("first movie"),
        )
        .movie(
            Movie::new("2", "some movie 2")
                .with_artworks(vec![
                    Artwork::new("2-fr-boxart", "box fr", "fr", ArtworkType::Boxart),
                    Artwork::new("2-en-story", "story en", "en", ArtworkType::StoryArt),
                ])
                .with_details("second movie"),
        )
}

fn graph() -> MovieGraph {
    MovieGraph::builder()
        .with_config(EngineConfig::instant())
        .with_fixture(fixture())
        .with_id_generator(Arc::new(SequentialIdGenerator::new("req")))
        .build()
        .unwrap()
}

fn vars(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[tokio::test]
async fn tag_order_follows_mutations() {
    let graph = graph();

    let before = graph
        .execute_document(r#"{ movie(movieId: "1") { id tags { id name } } }"#, None, None)
        .await;
    assert!(before.errors.is_empty());
    assert_eq!(
        before.data,
        json!({"movie": {"id": "1", "tags": [
            {"id": "tag-1", "name": "Drama"},
            {"id": "tag-2", "name": "Comedy"}
        ]}})
    );

    let removed = graph
        .execute_document(
            r#"mutation { removeTagsFromMovie(movieId: "1", tagIds: ["tag-1"]) { id tags { id } } }"#,
            None,
            None,
        )
        .await;
    assert_eq!(
        removed.data,
        json!({"removeTagsFromMovie": {"id": "1", "tags": [{"id": "tag-2"}]}})
    );

    let after = graph
        .execute_document(r#"{ movie(movieId: 1) { tags { id name } } }"#, None, None)
        .await;
    assert_eq!(
        after.data,
        json!({"movie": {"tags": [{"id": "tag-2", "name": "Comedy"}]}})
    );
}

#[tokio::test]
async fn root_language_filter_applies_across_movies() {
    let graph = graph();
    let response = graph
        .execute_document(
            r#"{ movies(filters: { languages: ["en"], types: [] }) { id artworks { id language type } } }"#,
            None,
            None,
        )
        .await;

    assert!(response.errors.is_empty());
    assert_eq!(
        response.data,
        json!({"movies": [
            {"id": "1", "artworks": [
                {"id": "1-en-boxart", "language": "en", "type": "BOXART"},
                {"id": "1-en-billboard", "language": "en", "type": "BILLBOARD"}
            ]},
            {"id": "2", "artworks": [
                {"id": "2-en-story", "language": "en", "type": "STORY_ART"}
            ]}
        ]})
    );
}

#[tokio::test]
async fn sibling_filters_are_independent() {
    let graph = graph();
    let response = graph
        .execute_document(
            r#"{
                movie(movieId: "1") {
                    boxart: artworks(filters: { types: [BOXART] }) { id }
                    english: artworks(filters: { languages: ["en"] }) { id }
                    all: artworks { id }
                }
            }"#,
            None,
            None,
        )
        .await;
    assert_eq!(
        response.data,
        json!({"movie": {
            "boxart": [{"id": "1-en-boxart"}, {"id": "1-es-boxart"}],
            "english": [{"id": "1-en-boxart"}, {"id": "1-en-billboard"}],
            "all": [{"id": "1-en-boxart"}, {"id": "1-es-boxart"}, {"id": "1-en-billboard"}]
        }})
    );
}

#[tokio::test]
async fn mutating_missing_movie_is_not_found() {
    let graph = graph();
    let execution = graph
        .run_document(
            r#"mutation { addTagsToMovie(movieId: "404", tagIds: ["tag-1"]) { id } }"#,
            None,
            None,
        )
        .await;

    // Movie! at the mutation root: the failure reaches the whole response
    assert_eq!(execution.state, ExecutionState::Failed);
    assert_eq!(execution.response.data, Value::Null);
    assert_eq!(execution.response.errors.len(), 1);
    assert_eq!(execution.response.errors[0].code(), "NOT_FOUND");
    assert_eq!(
        execution.response.errors[0].path,
        vec![PathSegment::Field("addTagsToMovie".into())]
    );
}

#[tokio::test]
async fn add_tags_twice_keeps_one_copy() {
    let graph = graph();
    let mutation = r#"mutation Add($id: ID!, $tags: [ID!]!) {
        addTagsToMovie(movieId: $id, tagIds: $tags) { tags { id } }
    }"#;
    let variables = vars(json!({"id": 2, "tags": ["tag-3"]}));

    graph.execute_document(mutation, Some(&variables), None).await;
    let second = graph.execute_document(mutation, Some(&variables), None).await;
    assert_eq!(
        second.data,
        json!({"addTagsToMovie": {"tags": [{"id": "tag-3"}]}})
    );
}

#[tokio::test]
async fn unknown_tag_leaves_movie_untouched() {
    let graph = graph();
    let response = graph
        .execute_document(
            r#"mutation { addTagsToMovie(movieId: "2", tagIds: ["tag-3", "tag-404"]) { id } }"#,
            None,
            None,
        )
        .await;
    assert_eq!(response.errors[0].code(), "NOT_FOUND");

    let movie = graph
        .storage()
        .get_movie(&MovieId::from("2"))
        .await
        .unwrap()
        .unwrap();
    assert!(movie.tag_ids.is_empty());
}

#[tokio::test]
async fn remove_absent_tag_is_a_no_op() {
    let graph = graph();
    let response = graph
        .execute_document(
            r#"mutation { removeTagsFromMovie(movieId: "2", tagIds: ["tag-1"]) { tags { id } } }"#,
            None,
            None,
        )
        .await;
    assert!(response.errors.is_empty());
    assert_eq!(response.data, json!({"removeTagsFromMovie": {"tags": []}}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_keep_both_tags() {
    let graph = graph();
    let add = |tag: &'static str| {
        let graph = graph.clone();
        tokio::spawn(async move {
            let source = format!(
                r#"mutation {{ addTagsToMovie(movieId: "2", tagIds: ["{}"]) {{ id }} }}"#,
                tag
            );
            graph.execute_document(&source, None, None).await
        })
    };

    let (first, second) = tokio::join!(add("tag-1"), add("tag-2"));
    assert!(first.unwrap().errors.is_empty());
    assert!(second.unwrap().errors.is_empty());

    let mut tags = graph
        .storage()
        .get_movie(&MovieId::from("2"))
        .await
        .unwrap()
        .unwrap()
        .tag_ids;
    tags.sort();
    assert_eq!(tags, vec![TagId::from("tag-1"), TagId::from("tag-2")]);
}

#[tokio::test]
async fn deleted_movie_disappears_from_reads() {
    let graph = graph();
    let response = graph
        .execute_document(
            r#"{ movie(movieId: "1") { details { description details { id tags { name } } } } }"#,
            None,
            None,
        )
        .await;
    assert_eq!(
        response.data,
        json!({"movie": {"details": {
            "description": "first movie",
            "details": {"id": "1", "tags": [{"name": "Drama"}, {"name": "Comedy"}]}
        }}})
    );

    let deleted = graph
        .execute_document(r#"mutation { deleteMovie(movieId: "1") }"#, None, None)
        .await;
    assert_eq!(deleted.data, json!({"deleteMovie": true}));

    let response = graph
        .execute_document(r#"{ movie(movieId: "1") { title } movies { id } }"#, None, None)
        .await;
    assert!(response.errors.is_empty());
    assert_eq!(response.data, json!({"movie": null, "movies": [{"id": "2"}]}));
}

#[tokio::test(start_paused = true)]
async fn delete_during_resolution_nulls_nearest_nullable_ancestor() {
    let config = EngineConfig {
        latency: LatencyConfig {
            read_delay_ms: 2000,
            write_delay_ms: 0,
            jitter_ms: 0,
        },
        ..EngineConfig::default()
    };
    let graph = MovieGraph::builder()
        .with_config(config)
        .with_fixture(fixture())
        .build()
        .unwrap();

    let query = {
        let graph = graph.clone();
        tokio::spawn(async move {
            graph
                .run_document(
                    r#"{ movie(movieId: "1") { title details { details { tags { name } } } } }"#,
                    None,
                    None,
                )
                .await
        })
    };

    // movie resolves at 2s, Details.tags runs at 4s
    tokio::time::sleep(Duration::from_millis(3000)).await;
    assert!(graph.storage().delete_movie(&MovieId::from("1")).await.unwrap());

    let execution = query.await.unwrap();
    // [Tag!]! -> Details! -> nullable Movie.details
    assert_eq!(execution.state, ExecutionState::Complete);
    assert_eq!(
        execution.response.data,
        json!({"movie": {"title": "some movie 1", "details": null}})
    );
    assert_eq!(execution.response.errors.len(), 1);
    assert_eq!(execution.response.errors[0].code(), "NOT_FOUND");
    assert_eq!(
        execution.response.errors[0].path,
        vec![
            PathSegment::Field("movie".into()),
            PathSegment::Field("details".into()),
            PathSegment::Field("details".into()),
            PathSegment::Field("tags".into()),
        ]
    );
}

#[tokio::test]
async fn validation_errors_fail_before_resolution() {
    let graph = graph();
    let execution = graph
        .run_document(r#"{ movies { id rating } tags { id } }"#, None, None)
        .await;
    assert_eq!(execution.state, ExecutionState::Failed);
    assert_eq!(execution.response.data, Value::Null);
    assert_eq!(execution.response.errors[0].code(), "INVALID_SELECTION");

    let execution = graph.run_document(r#"{ movie { id } }"#, None, None).await;
    assert_eq!(execution.response.errors[0].code(), "INVALID_ARGUMENT");
}

#[tokio::test]
async fn conflicting_aliases_are_rejected() {
    let graph = graph();
    let execution = graph
        .run_document(
            r#"{ m: movie(movieId: "1") { id } m: movie(movieId: "2") { title } }"#,
            None,
            None,
        )
        .await;
    assert_eq!(execution.state, ExecutionState::Failed);
    assert_eq!(execution.response.data, Value::Null);
    assert_eq!(execution.response.errors[0].code(), "INVALID_SELECTION");
}

#[tokio::test]
async fn movies_by_ids_keep_requested_order() {
    let graph = graph();
    let response = graph
        .execute_document(
            r#"{ movies(movieIds: ["2", "missing", 1]) { movieId internalTitle __typename } }"#,
            None,
            None,
        )
        .await;
    assert_eq!(
        response.data,
        json!({"movies": [
            {"movieId": "2", "internalTitle": "some movie 2", "__typename": "Movie"},
            {"movieId": "1", "internalTitle": "some movie 1", "__typename": "Movie"}
        ]})
    );
}

#[tokio::test(start_paused = true)]
async fn read_latency_overlaps_across_list_items() {
    let config = EngineConfig {
        latency: LatencyConfig {
            read_delay_ms: 2000,
            write_delay_ms: 100,
            jitter_ms: 0,
        },
        ..EngineConfig::default()
    };
    let graph = MovieGraph::builder()
        .with_config(config)
        .with_fixture(fixture())
        .build()
        .unwrap();

    let start = tokio::time::Instant::now();
    let response = graph
        .execute_document("{ movies { id tags { id } } }", None, None)
        .await;
    let elapsed = start.elapsed();

    assert!(response.errors.is_empty());
    // movies (2s) then both movies' tags concurrently (2s)
    assert!(elapsed >= Duration::from_millis(4000));
    assert!(elapsed < Duration::from_millis(5000));
}

#[tokio::test(start_paused = true)]
async fn alias_fields_add_no_read_latency() {
    let config = EngineConfig {
        latency: LatencyConfig {
            read_delay_ms: 2000,
            write_delay_ms: 100,
            jitter_ms: 0,
        },
        ..EngineConfig::default()
    };
    let graph = MovieGraph::builder()
        .with_config(config)
        .with_fixture(fixture())
        .build()
        .unwrap();

    let start = tokio::time::Instant::now();
    let response = graph
        .execute_document("{ movies { movieId internalTitle } }", None, None)
        .await;
    let elapsed = start.elapsed();

    assert!(response.errors.is_empty());
    assert_eq!(response.data["movies"][1]["internalTitle"], "some movie 2");
    // only the root movies resolver waits
    assert!(elapsed >= Duration::from_millis(2000));
    assert!(elapsed < Duration::from_millis(3000));
}

#[tokio::test]
async fn catalog_is_served_by_default() {
    let graph = MovieGraph::new(EngineConfig::instant()).unwrap();
    let response = graph
        .execute_document(
            r#"{ movie(movieId: 80117715) { title artworks(filters: { languages: ["fr"], types: [BILLBOARD] }) { language type } } tags { id } }"#,
            None,
            None,
        )
        .await;
    assert!(response.errors.is_empty());
    assert_eq!(response.data["movie"]["title"], "some movie 80117715");
    assert_eq!(
        response.data["movie"]["artworks"],
        json!([{"language": "fr", "type": "BILLBOARD"}])
    );
    assert_eq!(response.data["tags"].as_array().unwrap().len(), 5);
}
