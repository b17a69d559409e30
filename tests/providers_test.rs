//! End-to-end engine tests against mocked provider APIs.

use mediahint::config::Config;
use mediahint::metadata::SuggestionEngine;
use mediahint_common::{Category, SearchField};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Default config with every provider pointed at `server`.
fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    let p = &mut config.providers;
    for endpoint in [
        &mut p.omdb,
        &mut p.anilist,
        &mut p.itunes,
        &mut p.google_books,
        &mut p.tmdb,
        &mut p.jikan,
        &mut p.musicbrainz,
        &mut p.cover_art_archive,
        &mut p.open_library,
        &mut p.open_library_covers,
    ] {
        endpoint.base_url = Some(server.uri());
    }
    p.omdb.api_key = Some("omdb-key".into());
    p.tmdb.api_key = Some("tmdb-key".into());
    p.musicbrainz.requests_per_second = None;
    config
}

fn engine(server: &MockServer, profile: &str) -> SuggestionEngine {
    SuggestionEngine::from_config(&config_for(server), profile).unwrap()
}

// ---------------------------------------------------------------------------
// Film (OMDb + TMDB)
// ---------------------------------------------------------------------------

async fn mount_omdb_search(server: &MockServer, term: &str, items: serde_json::Value) {
    let total = items.as_array().map_or(0, Vec::len).to_string();
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("s", term))
        .and(query_param("apikey", "omdb-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Search": items,
            "totalResults": total,
            "Response": "True"
        })))
        .mount(server)
        .await;
}

async fn mount_omdb_detail(server: &MockServer, id: &str, director: &str, poster: &str) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("i", id))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Year": "1996",
            "Director": director,
            "Poster": poster,
            "Response": "True"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn film_title_search_fetches_director_per_candidate() {
    let server = MockServer::start().await;
    mount_omdb_search(
        &server,
        "fargo",
        json!([
            { "Title": "Fargo", "Year": "1996", "imdbID": "tt0116282", "Poster": "https://img/fargo.jpg" },
            { "Title": "Fargo Express", "Year": "2014–2015", "imdbID": "tt9000001", "Poster": "N/A" }
        ]),
    )
    .await;
    mount_omdb_detail(&server, "tt0116282", "Joel Coen, Ethan Coen", "https://img/fargo.jpg").await;
    mount_omdb_detail(&server, "tt9000001", "Someone Else", "N/A").await;

    let results = engine(&server, "create")
        .resolve(Category::Film, SearchField::Title, "fargo", "", 5)
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title.as_deref(), Some("Fargo"));
    assert_eq!(results[0].creator, "Joel Coen, Ethan Coen");
    assert_eq!(results[0].year, Some(1996));
    assert_eq!(results[1].creator, "Someone Else");
    assert_eq!(results[1].year, Some(2014));
    // The create profile has no film fallback.
    assert!(results[1].poster_url.is_none());
}

#[tokio::test]
async fn film_creator_search_splits_co_directors() {
    let server = MockServer::start().await;
    mount_omdb_search(
        &server,
        "coen",
        json!([
            { "Title": "Fargo", "Year": "1996", "imdbID": "tt1", "Poster": "N/A" },
            { "Title": "Barton Fink", "Year": "1991", "imdbID": "tt2", "Poster": "N/A" }
        ]),
    )
    .await;
    mount_omdb_detail(&server, "tt1", "Joel Coen, Ethan Coen", "N/A").await;
    mount_omdb_detail(&server, "tt2", "Joel Coen", "N/A").await;

    let results = engine(&server, "create")
        .resolve(Category::Film, SearchField::Creator, "coen", "", 5)
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].creator, "Joel Coen");
    assert_eq!(results[0].related_works, vec!["Fargo", "Barton Fink"]);
    assert_eq!(results[1].creator, "Ethan Coen");
    assert_eq!(results[1].related_works, vec!["Fargo"]);
    assert!(results.iter().all(|s| s.title.is_none()));
}

#[tokio::test]
async fn film_detail_failure_keeps_search_candidate() {
    let server = MockServer::start().await;
    mount_omdb_search(
        &server,
        "heat",
        json!([
            { "Title": "Heat", "Year": "1995", "imdbID": "tt1", "Poster": "https://img/heat.jpg" },
            { "Title": "Heat Wave", "Year": "1990", "imdbID": "tt2", "Poster": "https://img/wave.jpg" }
        ]),
    )
    .await;
    mount_omdb_detail(&server, "tt1", "Michael Mann", "N/A").await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("i", "tt2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let results = engine(&server, "create")
        .resolve(Category::Film, SearchField::Title, "heat", "", 5)
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].creator, "Michael Mann");
    assert_eq!(results[1].title.as_deref(), Some("Heat Wave"));
    assert_eq!(results[1].creator, "");
    assert_eq!(results[1].poster_url.as_deref(), Some("https://img/wave.jpg"));
}

#[tokio::test]
async fn edit_profile_backfills_film_poster_from_tmdb() {
    let server = MockServer::start().await;
    mount_omdb_search(
        &server,
        "arrival",
        json!([{ "Title": "Arrival", "Year": "2016", "imdbID": "tt2543164", "Poster": "N/A" }]),
    )
    .await;
    mount_omdb_detail(&server, "tt2543164", "Denis Villeneuve", "N/A").await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", "Arrival"))
        .and(query_param("api_key", "tmdb-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "title": "Arrival of the Fittest", "release_date": "2012-01-01", "poster_path": "/other.jpg" },
                { "title": "Arrival", "release_date": "2016-11-10", "poster_path": "/arrival.jpg" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = engine(&server, "edit")
        .resolve(Category::Film, SearchField::Title, "arrival", "", 5)
        .await;

    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].poster_url.as_deref(),
        Some("https://image.tmdb.org/t/p/w500/arrival.jpg")
    );
}

#[tokio::test]
async fn film_without_api_key_returns_nothing() {
    let server = MockServer::start().await;
    let mut config = config_for(&server);
    config.providers.omdb.api_key = None;

    let results = SuggestionEngine::from_config(&config, "create")
        .unwrap()
        .resolve(Category::Film, SearchField::Title, "fargo", "", 5)
        .await;

    assert!(results.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Anime (AniList + Jikan)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn anime_studio_search_groups_works_without_duplicates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("studios(search"))
        .and(body_string_contains("studio ghibli"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "Page": { "studios": [
                { "name": "Studio Ghibli", "media": { "nodes": [
                    { "title": { "english": "Spirited Away", "romaji": "Sen to Chihiro no Kamikakushi" } },
                    { "title": { "english": null, "romaji": "Tonari no Totoro" } }
                ] } },
                { "name": "STUDIO GHIBLI", "media": { "nodes": [
                    { "title": { "english": "Spirited Away" } },
                    { "title": { "english": "Princess Mononoke" } }
                ] } },
                { "name": "Ghibli Museum Shorts", "media": { "nodes": [] } }
            ] } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = engine(&server, "create")
        .resolve(Category::Anime, SearchField::Creator, "studio ghibli", "", 5)
        .await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].creator, "Studio Ghibli");
    assert_eq!(
        results[0].related_works,
        vec!["Spirited Away", "Tonari no Totoro", "Princess Mononoke"]
    );
}

#[tokio::test]
async fn anime_title_missing_cover_falls_back_to_jikan() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("media(search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "Page": { "media": [
                {
                    "title": { "english": "Mushishi", "romaji": "Mushishi" },
                    "coverImage": null,
                    "startDate": { "year": 2005 },
                    "studios": { "nodes": [{ "name": "Artland" }] }
                },
                {
                    "title": { "english": "Mushishi Zoku Shou" },
                    "coverImage": { "extraLarge": "https://anilist/zoku.jpg" },
                    "startDate": { "year": 2014 },
                    "studios": { "nodes": [{ "name": "Artland" }] }
                }
            ] } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/anime"))
        .and(query_param("q", "Mushishi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "images": { "jpg": {
                "image_url": "https://jikan/mushishi.jpg",
                "large_image_url": "https://jikan/mushishi-l.jpg"
            } } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = engine(&server, "create")
        .resolve(Category::Anime, SearchField::Title, "mushishi", "artland", 5)
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].poster_url.as_deref(), Some("https://jikan/mushishi-l.jpg"));
    assert_eq!(results[0].year, Some(2005));
    assert_eq!(results[1].poster_url.as_deref(), Some("https://anilist/zoku.jpg"));
}

// ---------------------------------------------------------------------------
// Music (iTunes + MusicBrainz/Cover Art Archive)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn music_title_prepends_artist_and_backfills_from_cover_art_archive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("term", "radiohead ok computer"))
        .and(query_param("entity", "album"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "collectionId": 1, "collectionName": "OK Computer", "artistName": "Radiohead",
                  "releaseDate": "1997-05-21T07:00:00Z" },
                { "collectionId": 2, "collectionName": "OK Computer (Covers)", "artistName": "Various Artists",
                  "artworkUrl100": "https://itunes/100x100bb.jpg" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/release/"))
        .and(query_param(
            "query",
            "release:\"OK Computer\" AND artist:\"Radiohead\"",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "releases": [{ "id": "b1392450-e666-3926-a536-22c65f834433" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/release/b1392450-e666-3926-a536-22c65f834433"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "images": [{
                "front": true,
                "image": "https://caa/full.jpg",
                "thumbnails": { "large": "https://caa/500.jpg" }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = engine(&server, "create")
        .resolve(Category::Music, SearchField::Title, "ok computer", "radiohead", 5)
        .await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].creator, "Radiohead");
    assert_eq!(results[0].year, Some(1997));
    assert_eq!(results[0].poster_url.as_deref(), Some("https://caa/500.jpg"));
}

#[tokio::test]
async fn music_creator_search_is_artist_scoped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("term", "portishead"))
        .and(query_param("attribute", "artistTerm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "collectionName": "Dummy", "artistName": "Portishead" },
                { "collectionName": "Third", "artistName": "Portishead" },
                { "collectionName": "Dummy", "artistName": "Portishead" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = engine(&server, "create")
        .resolve(Category::Music, SearchField::Creator, "portishead", "", 5)
        .await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].related_works, vec!["Dummy", "Third"]);
    assert!(results[0].poster_url.is_none());
}

// ---------------------------------------------------------------------------
// Books (Google Books + Open Library)
// ---------------------------------------------------------------------------

fn dune_volumes() -> serde_json::Value {
    json!({
        "items": [
            { "id": "a", "volumeInfo": {
                "title": "Dune", "authors": ["Frank Herbert"], "publishedDate": "1965",
                "industryIdentifiers": [
                    { "type": "ISBN_10", "identifier": "0441013597" },
                    { "type": "ISBN_13", "identifier": "9780441013593" }
                ]
            } },
            { "id": "b", "volumeInfo": {
                "title": "Dune Messiah", "authors": ["Frank Herbert"],
                "imageLinks": { "thumbnail": "http://books.google.com/messiah.jpg" }
            } },
            { "id": "c", "volumeInfo": { "title": "Dune Road", "authors": ["Sally Writer"] } },
            { "id": "d", "volumeInfo": {
                "title": "Dune: House Atreides", "authors": ["Brian Herbert", "Kevin J. Anderson"],
                "imageLinks": { "smallThumbnail": "https://books.google.com/atreides.jpg" }
            } }
        ]
    })
}

#[tokio::test]
async fn book_title_with_author_filters_and_tries_isbn_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .and(query_param("q", r#"intitle:"dune" inauthor:"herbert""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(dune_volumes()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .and(query_param("bibkeys", "ISBN:9780441013593"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ISBN:9780441013593": { "cover": { "large": "https://covers/dune-L.jpg" } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "docs": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let results = engine(&server, "create")
        .resolve(Category::Book, SearchField::Title, "dune", "herbert", 5)
        .await;

    assert_eq!(results.len(), 3);
    assert!(results
        .iter()
        .all(|s| s.creator.to_lowercase().contains("herbert")));
    assert!(results
        .iter()
        .any(|s| s.title.as_deref().is_some_and(|t| t.to_lowercase().contains("dune"))));

    assert_eq!(results[0].isbn.as_deref(), Some("9780441013593"));
    assert_eq!(results[0].poster_url.as_deref(), Some("https://covers/dune-L.jpg"));
    assert_eq!(
        results[1].poster_url.as_deref(),
        Some("https://books.google.com/messiah.jpg")
    );
    assert_eq!(results[2].creator, "Brian Herbert, Kevin J. Anderson");
}

#[tokio::test]
async fn book_isbn_miss_falls_back_to_title_author_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "volumeInfo": {
                "title": "Hyperion", "authors": ["Dan Simmons"],
                "industryIdentifiers": [{ "type": "ISBN_13", "identifier": "9780553283686" }]
            } }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("title", "Hyperion"))
        .and(query_param("author", "Dan Simmons"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "docs": [{ "cover_i": 240727 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = engine(&server, "create")
        .resolve(Category::Book, SearchField::Title, "hyperion", "", 5)
        .await;

    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].poster_url,
        Some(format!("{}/b/id/240727-L.jpg", server.uri()))
    );
}

#[tokio::test]
async fn now_playing_profile_stops_after_isbn_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dune_volumes()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "docs": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let engine = engine(&server, "now_playing");
    assert_eq!(engine.default_max_results(), 3);

    let results = engine
        .resolve(Category::Book, SearchField::Title, "dune", "", 3)
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].poster_url.is_none());
    // "Dune Road" has neither an image nor an ISBN.
    assert!(results[2].poster_url.is_none());
}

#[tokio::test]
async fn book_creator_search_groups_by_author() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .and(query_param("q", r#"inauthor:"herbert""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(dune_volumes()))
        .mount(&server)
        .await;

    let results = engine(&server, "create")
        .resolve(Category::Book, SearchField::Creator, "herbert", "", 5)
        .await;

    let names: Vec<_> = results.iter().map(|s| s.creator.as_str()).collect();
    assert_eq!(
        names,
        vec!["Frank Herbert", "Sally Writer", "Brian Herbert", "Kevin J. Anderson"]
    );
    assert_eq!(results[0].related_works, vec!["Dune", "Dune Messiah"]);
}

// ---------------------------------------------------------------------------
// Failure policy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn provider_error_yields_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let results = engine(&server, "create")
        .resolve(Category::Book, SearchField::Title, "dune", "", 5)
        .await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn malformed_response_yields_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let results = engine(&server, "create")
        .resolve(Category::Music, SearchField::Title, "kid a", "", 5)
        .await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn empty_primary_term_issues_no_requests() {
    let server = MockServer::start().await;
    let engine = engine(&server, "create");

    for category in Category::ALL {
        for field in [SearchField::Title, SearchField::Creator] {
            assert!(engine.resolve(category, field, "", "herbert", 5).await.is_empty());
        }
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn secondary_filter_may_empty_the_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dune_volumes()))
        .mount(&server)
        .await;

    let results = engine(&server, "create")
        .resolve(Category::Book, SearchField::Title, "dune", "tolkien", 5)
        .await;
    assert!(results.is_empty());
}
