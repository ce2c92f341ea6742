use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use db::cooking::{MealType, RecipeFields, TagList};
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use tower::ServiceExt;

use crate::{
    http_server::{build_app, cookies::CookieKey},
    state::VersionInfo,
    AppConfig, AppState,
};

pub fn create_test_app(pool: PgPool) -> Router {
    let state = AppState {
        app: AppConfig {
            base_url: "http://localhost:3000".parse().unwrap(),
        },
        versions: VersionInfo {
            version: "test-version",
            git_commit: "test-commit",
        },
        db: pool,
        cookie_key: CookieKey(tower_cookies::Key::generate()),
    };

    build_app(state)
}

pub fn recipe_fields(title: &str) -> RecipeFields {
    RecipeFields {
        title: title.to_string(),
        description: "A test recipe".to_string(),
        ingredients: "1 onion\n2 carrots".to_string(),
        instructions: "1. Chop\n2. Simmer".to_string(),
        prep_time: 10,
        cook_time: 30,
        servings: 4,
        image_url: None,
        meal_type: MealType::Dinner,
        tags: TagList::default(),
    }
}

/// All `Set-Cookie` pairs of a response, joined as a `Cookie` request header.
pub fn cookies_from(response: &Response<Body>) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Logs `username` in through the login form and returns the session cookie.
pub async fn login(app: &Router, username: &str) -> String {
    let response = app
        .clone()
        .oneshot(form_request("/login", None, &format!("username={username}")))
        .await
        .unwrap();
    assert_eq!(response.status(), 303, "login should redirect");

    cookies_from(&response)
        .split("; ")
        .filter(|pair| pair.starts_with("session_id="))
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    builder.body(Body::empty()).unwrap()
}

pub fn form_request(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn json_request(uri: &str, cookie: Option<&str>, body: &serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

pub async fn response_text(response: Response<Body>) -> String {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body_bytes.to_vec()).unwrap()
}

pub async fn response_body_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}
