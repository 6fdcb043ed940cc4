use axum::{
    http::StatusCode,
    response::{Html, IntoResponse as _, Response},
};

macro_rules! try500 {
    ($val:expr, $ctx:literal) => {
        match $val {
            Ok(r) => r,
            Err(err) => {
                tracing::error!("error {}: {err:#}", $ctx);
                return crate::controllers::internal_error();
            }
        }
    };
}

pub(crate) mod accounts;
pub(crate) mod comments;
pub(crate) mod pages;
pub(crate) mod quiz;

pub(crate) fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html("Algo salió mal, inténtalo de nuevo más tarde."),
    )
        .into_response()
}
