use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, Response, StatusCode},
    response::IntoResponse,
};
use db::users::User;

use super::{
    errors::ServerError,
    session::{DBSession, SessionRedirect},
};
use crate::AppState;

pub struct CurrentUser {
    pub user: User,
    pub session: DBSession,
}

pub enum CurrentUserError {
    SessionRedirect(SessionRedirect),
    NotStaff,
    DBError(color_eyre::Report),
}

impl From<SessionRedirect> for CurrentUserError {
    fn from(value: SessionRedirect) -> Self {
        Self::SessionRedirect(value)
    }
}

impl From<color_eyre::Report> for CurrentUserError {
    fn from(e: color_eyre::Report) -> Self {
        Self::DBError(e)
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = CurrentUserError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = DBSession::from_request_parts(parts, state).await?;

        let Some(user) = User::get_by_id(state.db(), session.user_id).await? else {
            return Err(SessionRedirect::to("/login").into());
        };

        Ok(Self { user, session })
    }
}

impl IntoResponse for CurrentUserError {
    fn into_response(self) -> Response<Body> {
        match self {
            Self::SessionRedirect(session_redirect) => session_redirect.into_response(),
            Self::NotStaff => {
                ServerError::forbidden("Only moderators can see this page").into_response()
            }
            Self::DBError(e) => {
                tracing::error!(error = ?e, "CurrentUserError");

                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// The logged in user, when there is one. Pages that anyone can read use
/// this to decide what to offer.
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    pub fn is_author_of(&self, author_user_id: uuid::Uuid) -> bool {
        self.user().is_some_and(|u| u.user_id == author_user_id)
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Ok(session) = DBSession::from_request_parts(parts, state).await else {
            return Ok(Self(None));
        };

        let user = User::get_by_id(state.db(), session.user_id).await?;

        Ok(Self(user))
    }
}

/// A logged in user with the staff flag, allowed to moderate comments.
pub struct StaffUser(pub CurrentUser);

impl FromRequestParts<AppState> for StaffUser {
    type Rejection = CurrentUserError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current_user = CurrentUser::from_request_parts(parts, state).await?;

        if !current_user.user.is_staff {
            return Err(CurrentUserError::NotStaff);
        }

        Ok(Self(current_user))
    }
}
