//! Cookie-based sessions.
//!
//! A session is a signed cookie holding the id of the logged-in account. The account is reloaded
//! from the database on every request: a cookie naming a missing account is anonymous.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse as _, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use serde::Serialize;
use tracing as log;

use crate::{controllers::internal_error, db::models::accounts::Account, AppContext};

pub(crate) const SESSION_COOKIE: &str = "session";

/// Key used to sign the session cookie, extracted from the app context.
#[derive(Clone)]
pub(crate) struct CookieKey(pub Key);

impl From<CookieKey> for Key {
    fn from(key: CookieKey) -> Key {
        key.0
    }
}

impl FromRef<Arc<AppContext>> for CookieKey {
    fn from_ref(ctx: &Arc<AppContext>) -> Self {
        CookieKey(ctx.cookie_key.clone())
    }
}

pub(crate) type SessionJar = SignedCookieJar<CookieKey>;

/// The logged-in account, as exposed to handlers and templates.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct SessionUser {
    pub id: i64,
    pub username: String,
}

impl From<Account> for SessionUser {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
        }
    }
}

pub(crate) fn start(jar: SessionJar, account_id: i64) -> SessionJar {
    jar.add(
        Cookie::build(SESSION_COOKIE, account_id.to_string())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish(),
    )
}

pub(crate) fn end(jar: SessionJar) -> SessionJar {
    jar.remove(Cookie::build(SESSION_COOKIE, "").path("/").finish())
}

/// Whether `target` is safe to redirect to after login: only paths on this site.
pub(crate) fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.starts_with("/\\")
}

fn login_redirect(next: &str) -> Redirect {
    match serde_html_form::to_string([("next", next)]) {
        Ok(query) => Redirect::to(&format!("/login?{query}")),
        Err(err) => {
            log::error!("unable to encode login redirect to {next}: {err}");
            Redirect::to("/login")
        }
    }
}

/// The logged-in account, if any.
pub(crate) struct MaybeUser(pub Option<SessionUser>);

#[async_trait]
impl FromRequestParts<Arc<AppContext>> for MaybeUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        let jar = match SessionJar::from_request_parts(parts, ctx).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };

        // Unsigned, tampered or malformed cookies never make it here.
        let Some(account_id) = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| cookie.value().parse::<i64>().ok())
        else {
            return Ok(MaybeUser(None));
        };

        let account = {
            let mut conn = ctx.db_connection.lock().await;
            Account::by_id(&mut conn, account_id).await
        };

        match account {
            Ok(account) => Ok(MaybeUser(account.map(SessionUser::from))),
            Err(err) => {
                log::error!("error when loading the session account {account_id}: {err:#}");
                Err(internal_error())
            }
        }
    }
}

/// Protects a route: anonymous visitors are sent to the login page, which brings them back
/// afterwards.
pub(crate) struct RequireUser(pub SessionUser);

#[async_trait]
impl FromRequestParts<Arc<AppContext>> for RequireUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, ctx).await?;
        match user {
            Some(user) => Ok(RequireUser(user)),
            None => Err(login_redirect(parts.uri.path()).into_response()),
        }
    }
}
