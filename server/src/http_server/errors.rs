use std::fmt::{Debug, Display};

use axum::http::StatusCode;
use axum::response::IntoResponse;
use color_eyre::eyre::eyre;

use super::templates::error_page;

/// Error returned from handlers: the report plus the status to answer with.
pub struct ServerError(pub(crate) color_eyre::Report, pub(crate) StatusCode);

impl ServerError {
    pub fn not_found(what: &str) -> Self {
        Self(eyre!("{what} not found"), StatusCode::NOT_FOUND)
    }

    pub fn forbidden(reason: &str) -> Self {
        Self(eyre!("{reason}"), StatusCode::FORBIDDEN)
    }

    pub fn bad_request(reason: impl Display) -> Self {
        Self(eyre!("{reason}"), StatusCode::BAD_REQUEST)
    }
}

impl Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.1, self.0)
    }
}

impl Debug for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("Status Code: {}\n", self.1))?;

        Debug::fmt(&self.0, f)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let ServerError(report, status) = self;

        if status.is_server_error() {
            let error: &(dyn std::error::Error + 'static) = report.as_ref();
            sentry::capture_error(error);

            tracing::error!(error = ?report, %status, "ServerError");
        } else {
            tracing::info!(error = %report, %status, "Request rejected");
        }

        let message = if status.is_server_error() {
            "Something went wrong on our end. Please try again.".to_string()
        } else {
            report.to_string()
        };

        (status, error_page(status, &message)).into_response()
    }
}

impl<E> From<E> for ServerError
where
    E: Into<color_eyre::Report>,
{
    fn from(err: E) -> Self {
        ServerError(err.into(), StatusCode::INTERNAL_SERVER_ERROR)
    }
}

pub trait WithStatus<T> {
    fn with_status(self, status: StatusCode) -> Result<T, ServerError>;
}

impl<T, E> WithStatus<T> for Result<T, E>
where
    E: Into<color_eyre::Report>,
{
    fn with_status(self, status: StatusCode) -> Result<T, ServerError> {
        self.map_err(|err| ServerError(err.into(), status))
    }
}

impl<T> WithStatus<T> for Option<T> {
    fn with_status(self, status: StatusCode) -> Result<T, ServerError> {
        self.ok_or_else(|| ServerError(eyre!("Not found"), status))
    }
}
