//! HTTP-level integration tests for the `/films` resource.
//!
//! Covers the full add / view / list / update / delete workflow, ownership
//! checks, duplicate titles, closed-genre validation and list query parsing.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get_auth, post_json_auth, put_json_auth, register_and_login,
};
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn film_body(title: &str, release_date: &str, genres: &[&str]) -> Value {
    json!({
        "title": title,
        "director": "Denis Villeneuve",
        "release_date": release_date,
        "synopsis": "A story told across a very long running time.",
        "genres": genres,
        "casts": ["Timothee Chalamet", "Zendaya"],
    })
}

async fn create_film(app: &axum::Router, token: &str, body: Value) -> Value {
    let response = post_json_auth(app.clone(), "/api/v1/films", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

fn titles(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["title"].as_str().unwrap().to_string())
        .collect()
}

fn names(items: &Value) -> Vec<String> {
    let mut names: Vec<String> = items
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}

// ---------------------------------------------------------------------------
// Add / view
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_and_view_film(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_login(&app, "paul_atreides").await;

    let film = create_film(&app, &token, film_body("Dune", "2021-10-22", &["Sci-Fi", "Drama"])).await;
    assert_eq!(film["title"], "Dune");
    assert_eq!(film["director"]["name"], "Denis Villeneuve");
    assert!(film["director"]["id"].is_number());
    assert_eq!(names(&film["genres"]), ["drama", "sci-fi"]);
    assert_eq!(names(&film["casts"]), ["Timothee Chalamet", "Zendaya"]);

    let id = film["id"].as_str().unwrap();
    let response = get_auth(app, &format!("/api/v1/films/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let viewed = body_json(response).await["data"].clone();
    assert_eq!(viewed["id"], film["id"]);
    assert_eq!(viewed["creator"]["username"], "paul_atreides");
    assert_eq!(viewed["release_date"], "2021-10-22");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_duplicate_title(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_login(&app, "paul_atreides").await;
    create_film(&app, &token, film_body("Dune", "2021-10-22", &["sci-fi"])).await;

    let response = post_json_auth(
        app,
        "/api/v1/films",
        film_body("Dune", "1984-12-14", &["sci-fi"]),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_json(response).await["fields"]["title"].is_array());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_unknown_genre(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = register_and_login(&app, "paul_atreides").await;

    let response = post_json_auth(
        app,
        "/api/v1/films",
        film_body("Dune", "2021-10-22", &["sci-fi", "space-opera"]),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["fields"]["genres"][0]
        .as_str()
        .unwrap()
        .contains("space-opera"));

    let films: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM films")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(films, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_validates_body(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_login(&app, "paul_atreides").await;

    let mut body = film_body("Du", "2021-10-22", &["sci-fi"]);
    body["synopsis"] = json!("short");
    let response = post_json_auth(app.clone(), "/api/v1/films", body, &token).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["fields"]["title"].is_array());
    assert!(json["fields"]["synopsis"].is_array());

    let body = film_body("Dune", "22-10-2021", &["sci-fi"]);
    let response = post_json_auth(app, "/api/v1/films", body, &token).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_json(response).await["fields"]["release_date"].is_array());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_view_missing_film(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_login(&app, "paul_atreides").await;

    let uri = format!("/api/v1/films/{}", uuid::Uuid::new_v4());
    let response = get_auth(app, &uri, &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_by_owner(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_login(&app, "paul_atreides").await;
    let film = create_film(&app, &token, film_body("Dune", "2021-10-22", &["sci-fi"])).await;
    let uri = format!("/api/v1/films/{}", film["id"].as_str().unwrap());

    let mut body = film_body("Dune: Part One", "2021-10-22", &["sci-fi", "adventure"]);
    body["director"] = json!("David Lynch");
    body["casts"] = json!(["Kyle MacLachlan"]);
    let response = put_json_auth(app.clone(), &uri, body, &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["id"], film["id"]);
    assert_eq!(updated["title"], "Dune: Part One");
    assert_eq!(updated["director"]["name"], "David Lynch");
    assert_eq!(names(&updated["genres"]), ["adventure", "sci-fi"]);
    assert_eq!(names(&updated["casts"]), ["Kyle MacLachlan"]);

    // Keeping its own title is not a duplicate.
    let response = put_json_auth(
        app,
        &uri,
        film_body("Dune: Part One", "2021-10-22", &["sci-fi"]),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_only_the_creator_may_modify(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_and_login(&app, "paul_atreides").await;
    let other = register_and_login(&app, "feyd_rautha").await;
    let film = create_film(&app, &owner, film_body("Dune", "2021-10-22", &["sci-fi"])).await;
    let uri = format!("/api/v1/films/{}", film["id"].as_str().unwrap());

    let response = put_json_auth(
        app.clone(),
        &uri,
        film_body("Dune (Harkonnen cut)", "2021-10-22", &["sci-fi"]),
        &other,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app.clone(), &uri, &other).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app, &uri, &other).await;
    assert_eq!(body_json(response).await["data"]["title"], "Dune");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_film(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_login(&app, "paul_atreides").await;
    let film = create_film(&app, &token, film_body("Dune", "2021-10-22", &["sci-fi"])).await;
    let uri = format!("/api/v1/films/{}", film["id"].as_str().unwrap());

    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

async fn seed_listing(app: &axum::Router) -> String {
    let token = register_and_login(app, "paul_atreides").await;
    create_film(app, &token, film_body("Dune", "2021-10-22", &["sci-fi", "adventure"])).await;
    create_film(app, &token, film_body("Arrival", "2016-11-11", &["sci-fi", "drama"])).await;
    create_film(app, &token, film_body("Sicario", "2015-09-18", &["crime", "thriller"])).await;
    create_film(app, &token, film_body("Prisoners", "2013-09-20", &["crime", "drama"])).await;
    token
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_defaults_to_newest_first(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = seed_listing(&app).await;

    let response = get_auth(app, "/api/v1/films", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await["data"].clone();
    assert_eq!(titles(&page), ["Dune", "Arrival", "Sicario", "Prisoners"]);
    assert_eq!(
        page["pagination"],
        json!({ "page": 1, "page_size": 20, "total_count": 4, "total_pages": 1 })
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_sorts_and_pages(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = seed_listing(&app).await;

    let response = get_auth(
        app,
        "/api/v1/films?sort=title.asc&limit=2&offset=2",
        &token,
    )
    .await;

    let page = body_json(response).await["data"].clone();
    assert_eq!(titles(&page), ["Prisoners", "Sicario"]);
    assert_eq!(
        page["pagination"],
        json!({ "page": 2, "page_size": 2, "total_count": 4, "total_pages": 2 })
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_filters(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = seed_listing(&app).await;

    let response = get_auth(app.clone(), "/api/v1/films?genres=Drama&sort=title.asc", &token).await;
    let page = body_json(response).await["data"].clone();
    assert_eq!(titles(&page), ["Arrival", "Prisoners"]);

    let response = get_auth(
        app.clone(),
        "/api/v1/films?release_date=2015-01-01:2016-12-31&sort=release_date.asc",
        &token,
    )
    .await;
    let page = body_json(response).await["data"].clone();
    assert_eq!(titles(&page), ["Sicario", "Arrival"]);

    let response = get_auth(app.clone(), "/api/v1/films?release_date=2021-10-22", &token).await;
    let page = body_json(response).await["data"].clone();
    assert_eq!(titles(&page), ["Dune"]);

    let response = get_auth(app, "/api/v1/films?title=ris", &token).await;
    let page = body_json(response).await["data"].clone();
    assert_eq!(titles(&page), ["Prisoners"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_empty_result(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = seed_listing(&app).await;

    let response = get_auth(app, "/api/v1/films?title=Solaris", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await["data"].clone();
    assert!(page["items"].as_array().unwrap().is_empty());
    assert_eq!(page["pagination"]["page"], 1);
    assert_eq!(page["pagination"]["total_pages"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_rejects_bad_queries(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = seed_listing(&app).await;

    let cases = [
        ("/api/v1/films?sort=rating.asc", "sort"),
        ("/api/v1/films?sort=title.ASC", "sort"),
        ("/api/v1/films?limit=101", "limit"),
        ("/api/v1/films?offset=-1", "offset"),
        ("/api/v1/films?release_date=2021-13-01", "release_date"),
        ("/api/v1/films?genres=western", "genres"),
    ];

    for (uri, field) in cases {
        let response = get_auth(app.clone(), uri, &token).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        let json = body_json(response).await;
        assert!(json["fields"][field].is_array(), "{uri}: {json}");
    }
}
