use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{self, header, Response, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

use crate::AppState;

const SESSION_COOKIE: &str = "session_id";

#[derive(Debug, Clone, Deserialize, Serialize, sqlx::FromRow)]
pub struct DBSession {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionRedirect {
    location: String,
}

impl SessionRedirect {
    pub fn to(location: &str) -> Self {
        Self {
            location: location.to_string(),
        }
    }

    /// Sends the visitor to the login page, coming back to `return_to` after.
    pub fn login(return_to: &str) -> Self {
        let query = serde_urlencoded::to_string([("return_to", return_to)])
            .unwrap_or_default();

        Self::to(&format!("/login?{query}"))
    }
}

impl IntoResponse for SessionRedirect {
    fn into_response(self) -> Response<Body> {
        // 303 so a form POST turns into a GET of the login page
        (StatusCode::SEE_OTHER, [(header::LOCATION, self.location)]).into_response()
    }
}

impl FromRequestParts<AppState> for DBSession {
    type Rejection = SessionRedirect;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| {
                tracing::error!("Failed to get cookies: {msg}");

                SessionRedirect::to("/login")
            })?;

        let private = cookies.private(&state.cookie_key);

        let Some(session_cookie) = private.get(SESSION_COOKIE) else {
            let return_to_path = parts
                .uri
                .path_and_query()
                .map_or("/", http::uri::PathAndQuery::as_str);

            return Err(SessionRedirect::login(return_to_path));
        };

        let session_id = session_cookie.value().to_string();
        let Ok(session_id) = Uuid::parse_str(&session_id) else {
            tracing::error!("Failed to parse session id: {session_id}");

            return Err(SessionRedirect::to("/login"));
        };

        let session = sqlx::query_as::<_, DBSession>(
            r"
        SELECT *
        FROM Sessions
        WHERE session_id = $1
        ",
        )
        .bind(session_id)
        .fetch_optional(state.db())
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch session: {e}");

            SessionRedirect::to("/login")
        })?;

        let Some(session) = session else {
            private.remove(Cookie::build(SESSION_COOKIE).path("/").into());

            return Err(SessionRedirect::to("/login"));
        };

        Ok(session)
    }
}

impl DBSession {
    pub async fn create(
        user_id: Uuid,
        app_state: &AppState,
        cookies: &Cookies,
    ) -> color_eyre::Result<Self> {
        let session = sqlx::query_as::<_, DBSession>(
            r"
        INSERT INTO Sessions (session_id, user_id)
        VALUES ($1, $2)
        RETURNING *
        ",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .fetch_one(app_state.db())
        .await?;

        let private = cookies.private(&app_state.cookie_key);

        let session_cookie = Cookie::build((SESSION_COOKIE, session.session_id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(tower_cookies::cookie::SameSite::Lax)
            .secure(app_state.app.secure_cookies());
        private.add(session_cookie.into());

        Ok(session)
    }

    pub async fn end(self, app_state: &AppState, cookies: &Cookies) -> color_eyre::Result<()> {
        sqlx::query("DELETE FROM Sessions WHERE session_id = $1")
            .bind(self.session_id)
            .execute(app_state.db())
            .await?;

        cookies
            .private(&app_state.cookie_key)
            .remove(Cookie::build(SESSION_COOKIE).path("/").into());

        Ok(())
    }
}
