use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use db::users::User;
use maud::{html, Markup};
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::{
    http_server::{
        current_user::{CurrentUser, MaybeUser},
        flash::Flash,
        session::DBSession,
        templates::{base, buttons::ButtonType, Layout},
        ResponseResult,
    },
    AppState,
};

const USERNAME_MAX_CHARS: usize = 150;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LoginQuery {
    return_to: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LoginForm {
    username: String,
    return_to: Option<String>,
}

/// Only same-site paths are followed after logging in. The path must be
/// visible ASCII to fit in a `Location` header.
fn safe_return_to(return_to: Option<&str>) -> &str {
    match return_to {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && path.chars().all(|c| c.is_ascii_graphic()) =>
        {
            path
        }
        _ => "/",
    }
}

fn validate_username(username: &str) -> Result<&str, &'static str> {
    let username = username.trim();

    if username.is_empty() {
        return Err("Enter a username.");
    }
    if username.chars().count() > USERNAME_MAX_CHARS {
        return Err("Usernames are at most 150 characters.");
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err("Usernames may contain only letters, numbers, and @/./+/-/_ characters.");
    }

    Ok(username)
}

fn login_page(layout: Layout<'_>, username: &str, return_to: &str, error: Option<&str>) -> Markup {
    base(
        layout,
        html! {
            div class="max-w-sm m-auto bg-white rounded-lg shadow p-6" {
                h1 class="text-2xl font-semibold mb-4" { "Log in" }
                p class="text-stone-600 mb-4" { "Pick a username to cook under. New names get a fresh account." }

                form method="post" action="/login" {
                    input type="hidden" name="return_to" value=(return_to);

                    label for="username" class="block font-medium" { "Username" }
                    input type="text" id="username" name="username" value=(username) autofocus
                        class="mt-1 mb-2 block w-full rounded border border-stone-300 px-3 py-2";
                    @if let Some(error) = error {
                        p class="text-sm text-red-700 mb-2" { (error) }
                    }

                    button type="submit" class=(ButtonType::Primary.classes()) { "Log in" }
                }
            }
        },
    )
}

pub(crate) async fn login_get(
    user: MaybeUser,
    flash: Flash,
    Query(query): Query<LoginQuery>,
) -> Response {
    let return_to = safe_return_to(query.return_to.as_deref());

    if user.user().is_some() {
        return Redirect::to(return_to).into_response();
    }

    login_page(Layout::new("Log in", None, flash.take()), "", return_to, None).into_response()
}

pub(crate) async fn login_post(
    State(app_state): State<AppState>,
    cookies: Cookies,
    flash: Flash,
    Form(form): Form<LoginForm>,
) -> ResponseResult {
    let return_to = safe_return_to(form.return_to.as_deref());

    let username = match validate_username(&form.username) {
        Ok(username) => username,
        Err(error) => {
            let page = login_page(
                Layout::new("Log in", None, vec![]),
                &form.username,
                return_to,
                Some(error),
            );

            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    let user = User::get_or_create_by_username(app_state.db(), username).await?;
    DBSession::create(user.user_id, &app_state, &cookies).await?;

    tracing::info!(user_id = %user.user_id, "Logged in");
    flash.success(format!("Welcome, {}!", user.username));

    Ok(Redirect::to(return_to).into_response())
}

pub(crate) async fn logout(
    State(app_state): State<AppState>,
    current_user: CurrentUser,
    cookies: Cookies,
    flash: Flash,
) -> ResponseResult {
    current_user.session.end(&app_state, &cookies).await?;

    flash.info("You have been logged out.");

    Ok(Redirect::to("/").into_response())
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use tower::ServiceExt;

    use super::*;
    use crate::http_server::test_helpers::{
        create_test_app, form_request, get_request, location, login, response_text,
    };

    #[test]
    fn return_to_must_be_local() {
        assert_eq!(safe_return_to(Some("/recipes/new")), "/recipes/new");
        assert_eq!(safe_return_to(Some("https://evil.example")), "/");
        assert_eq!(safe_return_to(Some("//evil.example")), "/");
        assert_eq!(safe_return_to(None), "/");
        assert_eq!(safe_return_to(Some("/\nevil")), "/");
        assert_eq!(safe_return_to(Some("/recipes\t")), "/");
        assert_eq!(safe_return_to(Some("/recettes/crème")), "/");
        assert_eq!(
            safe_return_to(Some("/recipes?q=mac%20cheese&page=2")),
            "/recipes?q=mac%20cheese&page=2"
        );
    }

    #[test]
    fn usernames_are_trimmed_and_checked() {
        assert_eq!(validate_username("  julia_c "), Ok("julia_c"));
        assert!(validate_username("   ").is_err());
        assert!(validate_username("no spaces allowed").is_err());
        assert!(validate_username(&"a".repeat(151)).is_err());
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn login_redirects_back_and_logout_ends_session(pool: PgPool) {
        let app = create_test_app(pool.clone());

        let response = app
            .clone()
            .oneshot(form_request(
                "/login",
                None,
                "username=julia&return_to=%2Fplanner",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 303);
        assert_eq!(location(&response), "/planner");

        let session = login(&app, "julia").await;
        let response = app
            .clone()
            .oneshot(get_request("/planner", Some(&session)))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let response = app
            .clone()
            .oneshot(form_request("/logout", Some(&session), ""))
            .await
            .unwrap();
        assert_eq!(response.status(), 303);

        let sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Sessions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(sessions, 1, "only the first login's session is left");

        let response = app
            .oneshot(get_request("/planner", Some(&session)))
            .await
            .unwrap();
        assert_eq!(response.status(), 303);
        assert_eq!(location(&response), "/login");
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn protected_pages_send_visitors_to_login(pool: PgPool) {
        let app = create_test_app(pool);

        let response = app
            .clone()
            .oneshot(get_request("/recipes/new", None))
            .await
            .unwrap();

        assert_eq!(response.status(), 303);
        assert_eq!(location(&response), "/login?return_to=%2Frecipes%2Fnew");

        let response = app
            .oneshot(form_request("/login", None, "username=bad+name"))
            .await
            .unwrap();
        assert_eq!(response.status(), 422);
        assert!(response_text(response).await.contains("Usernames may contain only"));
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn return_to_with_control_characters_goes_home(pool: PgPool) {
        let app = create_test_app(pool);

        let response = app
            .oneshot(form_request(
                "/login",
                None,
                "username=julia&return_to=%2F%0Aevil",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), 303);
        assert_eq!(location(&response), "/");
    }
}
