//! Helpers to drive the whole router in tests, against an in-memory database.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use axum_extra::extract::cookie::Key;
use tower::ServiceExt as _;

use crate::{router, AppConfig, AppContext};

fn config() -> AppConfig {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    AppConfig {
        port: 0,
        interface_ipv4: [127, 0, 0, 1].into(),
        database_url: "sqlite::memory:".to_owned(),
        templates_dir: root.join("templates"),
        static_dir: root.join("static"),
        watch_templates: false,
    }
}

pub(crate) async fn app() -> anyhow::Result<Router> {
    let (_, app) = app_with_context().await?;
    Ok(app)
}

/// Same as [`app`], keeping a handle on the context so tests can tamper with the database.
pub(crate) async fn app_with_context() -> anyhow::Result<(Arc<AppContext>, Router)> {
    let ctx = Arc::new(AppContext::new(config(), Key::generate()).await?);
    Ok((ctx.clone(), router(ctx)))
}

pub(crate) fn get(uri: &str, cookie: Option<&str>) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    Ok(builder.body(Body::empty())?)
}

pub(crate) fn post_form(
    uri: &str,
    body: &'static str,
    cookie: Option<&str>,
) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    Ok(builder.body(Body::from(body))?)
}

pub(crate) async fn body_string(response: Response) -> anyhow::Result<String> {
    let bytes = hyper::body::to_bytes(response.into_body()).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

pub(crate) fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

/// Registers an account, logs it in, and returns the `Cookie` header value of its session.
pub(crate) async fn register_and_login(
    app: &Router,
    username: &str,
    password: &str,
) -> anyhow::Result<String> {
    let credentials = format!("username={username}&password={password}");

    let register = Request::builder()
        .method("POST")
        .uri("/registro")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(credentials.clone()))?;
    app.clone().oneshot(register).await?;

    let login = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(credentials))?;
    let response = app.clone().oneshot(login).await?;

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .context("login didn't set a session cookie")?
        .to_str()?;
    let cookie = set_cookie
        .split(';')
        .next()
        .context("empty set-cookie header")?;
    Ok(cookie.to_owned())
}
