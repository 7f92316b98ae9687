// Integration tests for the Pug or Ugh HTTP API

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use pugorugh::models::{NewDog, DogSize, Gender};
use pugorugh::routes::{configure_routes, AppState};
use pugorugh::services::{AuthService, MemoryStore, Store};
use serde_json::{json, Value};
use std::sync::Arc;

fn create_state() -> (AppState, Arc<MemoryStore>) {
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn Store> = memory.clone();
    let auth = Arc::new(AuthService::new(b"integration-test-secret", 24, 100, 60));
    (AppState::new(store, auth), memory)
}

fn new_dog(name: &str, age: i32) -> NewDog {
    NewDog {
        name: name.to_string(),
        image_filename: format!("{}.jpg", name.to_lowercase()),
        breed: "Pug".to_string(),
        age,
        gender: Gender::Female,
        size: DogSize::Small,
        microchipped: true,
    }
}

async fn seed_dogs(store: &MemoryStore, count: usize) {
    for i in 1..=count {
        store.insert_dog(new_dog(&format!("Dog{}", i), 30)).await.unwrap();
    }
}

async fn register_and_login<S>(app: &S, username: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/user/")
        .set_json(json!({ "username": username, "password": "woof-woof" }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/user/login/")
        .set_json(json!({ "username": username, "password": "woof-woof" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(app, req).await;
    body["token"].as_str().unwrap().to_string()
}

fn authed(method: &str, uri: &str, token: &str) -> test::TestRequest {
    let req = match method {
        "PUT" => test::TestRequest::put(),
        "POST" => test::TestRequest::post(),
        "DELETE" => test::TestRequest::delete(),
        _ => test::TestRequest::get(),
    };
    req.uri(uri)
        .insert_header((header::AUTHORIZATION, format!("Token {}", token)))
}

async fn next_dog_id<S>(app: &S, token: &str, cursor: i64, status: &str) -> Option<i64>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let uri = format!("/api/dog/{}/{}/next/", cursor, status);
    let resp = test::call_service(app, authed("GET", &uri, token).to_request()).await;
    if resp.status() == StatusCode::NOT_FOUND {
        return None;
    }
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    body["id"].as_i64()
}

#[actix_web::test]
async fn test_register_and_login() {
    let (state, _) = create_state();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/user/")
        .set_json(json!({ "username": "john", "password": "secret" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "john");
    assert!(body.get("password").is_none());

    let req = test::TestRequest::post()
        .uri("/api/user/login/")
        .set_json(json!({ "username": "john", "password": "secret" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[actix_web::test]
async fn test_duplicate_username_rejected() {
    let (state, _) = create_state();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;

    register_and_login(&app, "john").await;

    let req = test::TestRequest::post()
        .uri("/api/user/")
        .set_json(json!({ "username": "john", "password": "other" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["fields"]["username"].is_array());
}

#[actix_web::test]
async fn test_blank_username_rejected() {
    let (state, store) = create_state();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/user/")
        .set_json(json!({ "username": "   ", "password": "pw" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["fields"]["username"].is_array());

    assert!(store.find_user_by_username("").await.unwrap().is_none());
}

#[actix_web::test]
async fn test_wrong_password_rejected() {
    let (state, _) = create_state();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;

    register_and_login(&app, "john").await;

    let req = test::TestRequest::post()
        .uri("/api/user/login/")
        .set_json(json!({ "username": "john", "password": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_protected_routes_require_token() {
    let (state, _) = create_state();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;

    for uri in [
        "/api/user/preferences/",
        "/api/dog/-1/undecided/next/",
        "/api/dog/1/liked/",
        "/api/dog/1/",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    for (method, uri) in [
        ("PUT", "/api/user/preferences/"),
        ("POST", "/api/dog/add/"),
        ("DELETE", "/api/dog/1/delete/"),
        ("PUT", "/api/dog/1/blacklist/true/"),
        ("PUT", "/api/dog/1/liked/"),
    ] {
        let req = match method {
            "PUT" => test::TestRequest::put(),
            "POST" => test::TestRequest::post(),
            _ => test::TestRequest::delete(),
        };
        let resp = test::call_service(&app, req.uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    let req = test::TestRequest::get()
        .uri("/api/user/preferences/")
        .insert_header((header::AUTHORIZATION, "Token not-a-real-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_preferences_created_with_defaults() {
    let (state, _) = create_state();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;
    let token = register_and_login(&app, "john").await;

    let first: Value =
        test::call_and_read_body_json(&app, authed("GET", "/api/user/preferences/", &token).to_request())
            .await;
    assert_eq!(first["age"], "b,y,a,s");
    assert_eq!(first["gender"], "m,f,u");
    assert_eq!(first["size"], "s,m,l,xl");
    assert_eq!(first["microchipped"], "e");

    let second: Value =
        test::call_and_read_body_json(&app, authed("GET", "/api/user/preferences/", &token).to_request())
            .await;
    assert_eq!(first["id"], second["id"]);
}

#[actix_web::test]
async fn test_update_preferences_normalizes_tokens() {
    let (state, _) = create_state();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;
    let token = register_and_login(&app, "john").await;

    let req = authed("PUT", "/api/user/preferences/", &token)
        .set_json(json!({ "age": " b, y ,b", "gender": "f", "size": "s,m", "microchipped": "y" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["age"], "b,y");
    assert_eq!(body["gender"], "f");
    assert_eq!(body["size"], "s,m");
    assert_eq!(body["microchipped"], "y");

    let stored: Value =
        test::call_and_read_body_json(&app, authed("GET", "/api/user/preferences/", &token).to_request())
            .await;
    assert_eq!(stored["age"], "b,y");
}

#[actix_web::test]
async fn test_update_preferences_rejects_unknown_token() {
    let (state, _) = create_state();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;
    let token = register_and_login(&app, "john").await;

    let req = authed("PUT", "/api/user/preferences/", &token)
        .set_json(json!({ "age": "b", "gender": "f", "size": "xxl", "microchipped": "e" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["fields"]["size"].is_array());
    assert!(body["fields"].get("age").is_none());
}

#[actix_web::test]
async fn test_next_dog_walks_buckets() {
    let (state, store) = create_state();
    seed_dogs(&store, 4).await;
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;
    let token = register_and_login(&app, "john").await;

    for (dog_id, status) in [(2, "disliked"), (3, "undecided"), (4, "liked")] {
        let uri = format!("/api/dog/{}/{}/", dog_id, status);
        let resp = test::call_service(&app, authed("PUT", &uri, &token).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    assert_eq!(next_dog_id(&app, &token, -1, "undecided").await, Some(1));
    assert_eq!(next_dog_id(&app, &token, 1, "undecided").await, Some(3));
    assert_eq!(next_dog_id(&app, &token, 200, "undecided").await, Some(1));
    assert_eq!(next_dog_id(&app, &token, -1, "liked").await, Some(4));
    assert_eq!(next_dog_id(&app, &token, 4, "liked").await, Some(4));
    assert_eq!(next_dog_id(&app, &token, -1, "disliked").await, Some(2));
}

#[actix_web::test]
async fn test_next_dog_empty_bucket_is_not_found() {
    let (state, store) = create_state();
    seed_dogs(&store, 2).await;
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;
    let token = register_and_login(&app, "john").await;

    assert_eq!(next_dog_id(&app, &token, -1, "liked").await, None);
    assert_eq!(next_dog_id(&app, &token, -1, "disliked").await, None);
}

#[actix_web::test]
async fn test_next_dog_honours_age_preference() {
    let (state, store) = create_state();
    store.insert_dog(new_dog("Grown", 24)).await.unwrap();
    store.insert_dog(new_dog("Puppy", 6)).await.unwrap();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;
    let token = register_and_login(&app, "john").await;

    let req = authed("PUT", "/api/user/preferences/", &token)
        .set_json(json!({ "age": "b,y", "gender": "m,f,u", "size": "s,m,l,xl", "microchipped": "e" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    assert_eq!(next_dog_id(&app, &token, -1, "undecided").await, Some(2));
    assert_eq!(next_dog_id(&app, &token, 2, "undecided").await, Some(2));
}

#[actix_web::test]
async fn test_next_dog_does_not_create_preferences() {
    let (state, store) = create_state();
    seed_dogs(&store, 1).await;
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;
    let token = register_and_login(&app, "john").await;

    assert_eq!(next_dog_id(&app, &token, -1, "undecided").await, Some(1));

    let user = store.find_user_by_username("john").await.unwrap().unwrap();
    assert!(store.find_preference(user.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn test_setting_status_twice_keeps_one_rating() {
    let (state, store) = create_state();
    seed_dogs(&store, 1).await;
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;
    let token = register_and_login(&app, "john").await;

    let first: Value =
        test::call_and_read_body_json(&app, authed("PUT", "/api/dog/1/liked/", &token).to_request()).await;
    let second: Value =
        test::call_and_read_body_json(&app, authed("GET", "/api/dog/1/disliked/", &token).to_request()).await;

    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["dog_id"], 1);
    assert_eq!(store.rating_count().await, 1);

    assert_eq!(next_dog_id(&app, &token, -1, "liked").await, None);
    assert_eq!(next_dog_id(&app, &token, -1, "disliked").await, Some(1));
}

#[actix_web::test]
async fn test_rating_unknown_dog_is_not_found() {
    let (state, _) = create_state();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;
    let token = register_and_login(&app, "john").await;

    let resp = test::call_service(&app, authed("PUT", "/api/dog/99/liked/", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_blacklist_hides_and_restores() {
    let (state, store) = create_state();
    seed_dogs(&store, 2).await;
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;
    let token = register_and_login(&app, "john").await;

    let resp =
        test::call_service(&app, authed("PUT", "/api/dog/1/blacklist/true/", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(store.rating_count().await, 1);

    let user = store.find_user_by_username("john").await.unwrap().unwrap();
    let rating = store.get_rating(user.id, 1).await.unwrap().unwrap();
    assert!(rating.blacklisted);

    assert_eq!(next_dog_id(&app, &token, -1, "undecided").await, Some(2));
    assert_eq!(next_dog_id(&app, &token, 2, "undecided").await, Some(2));

    let resp =
        test::call_service(&app, authed("GET", "/api/dog/1/blacklist/false/", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(next_dog_id(&app, &token, -1, "undecided").await, Some(1));
}

#[actix_web::test]
async fn test_add_get_and_delete_dog() {
    let (state, _) = create_state();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;
    let token = register_and_login(&app, "john").await;

    let req = authed("POST", "/api/dog/add/", &token)
        .set_json(json!({
            "name": "Muffin",
            "image_filename": "muffin.jpg",
            "breed": "Boxer",
            "age": 12,
            "gender": "m",
            "size": "l",
            "microchipped": true
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let dog: Value = test::read_body_json(resp).await;
    let id = dog["id"].as_i64().unwrap();
    assert_eq!(dog["gender"], "m");
    assert_eq!(dog["size"], "l");

    let uri = format!("/api/dog/{}/", id);
    let fetched: Value = test::call_and_read_body_json(&app, authed("GET", &uri, &token).to_request()).await;
    assert_eq!(fetched["name"], "Muffin");

    let uri = format!("/api/dog/{}/delete/", id);
    let resp = test::call_service(&app, authed("DELETE", &uri, &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = test::call_service(&app, authed("DELETE", &uri, &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let uri = format!("/api/dog/{}/", id);
    let resp = test::call_service(&app, authed("GET", &uri, &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_add_dog_validation() {
    let (state, _) = create_state();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;
    let token = register_and_login(&app, "john").await;

    let req = authed("POST", "/api/dog/add/", &token)
        .set_json(json!({
            "name": "Muffin",
            "image_filename": "muffin.jpg",
            "breed": "Boxer",
            "age": 12,
            "gender": "x",
            "size": "l"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["fields"]["gender"].is_array());
}

#[actix_web::test]
async fn test_unknown_status_segment_does_not_route() {
    let (state, store) = create_state();
    seed_dogs(&store, 1).await;
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;
    let token = register_and_login(&app, "john").await;

    for uri in [
        "/api/dog/1/loved/",
        "/api/dog/-1/maybe/next/",
        "/api/dog/1/blacklist/yes/",
    ] {
        let resp = test::call_service(&app, authed("GET", uri, &token).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[actix_web::test]
async fn test_health_check() {
    let (state, _) = create_state();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
}
