use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse as _, Redirect, Response},
    Form,
};
use serde::{Deserialize, Serialize};
use tracing as log;

use crate::{
    db::models::accounts::Account,
    session::{self, MaybeUser, RequireUser, SessionJar, SessionUser},
    templates::{page_context_with, render},
    AppContext,
};

const MISSING_FIELDS: &str = "Usuario y contraseña son obligatorios.";
const USERNAME_TAKEN: &str = "El usuario ya existe, intenta otro.";
const REGISTRATION_FAILED: &str = "Error al registrar al usuario.";
const BAD_CREDENTIALS: &str = "Usuario o contraseña incorrectos";

#[derive(Serialize)]
struct FormPage<'a> {
    message: Option<&'a str>,
    next: Option<&'a str>,
}

fn render_form(
    ctx: &AppContext,
    user: Option<&SessionUser>,
    template: &str,
    page: FormPage<'_>,
    status: StatusCode,
) -> Response {
    let page = try500!(
        page_context_with(user, &page),
        "building an account form context"
    );
    let page = try500!(render(ctx, template, &page), "rendering an account form");
    (status, Html(page)).into_response()
}

#[derive(Deserialize)]
pub(crate) struct Registration {
    username: String,
    password: String,
}

pub(crate) async fn register_form(
    State(ctx): State<Arc<AppContext>>,
    MaybeUser(user): MaybeUser,
) -> Response {
    let page = FormPage {
        message: None,
        next: None,
    };
    render_form(&ctx, user.as_ref(), "registro.html", page, StatusCode::OK)
}

pub(crate) async fn register(
    State(ctx): State<Arc<AppContext>>,
    MaybeUser(user): MaybeUser,
    Form(payload): Form<Registration>,
) -> Response {
    let failure = |message: &'static str| {
        let page = FormPage {
            message: Some(message),
            next: None,
        };
        render_form(&ctx, user.as_ref(), "registro.html", page, StatusCode::OK)
    };

    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return failure(MISSING_FIELDS);
    }

    let existing = {
        let mut conn = ctx.db_connection.lock().await;
        try500!(
            Account::by_username(&mut conn, username).await,
            "looking up a username before registration"
        )
    };
    if existing.is_some() {
        return failure(USERNAME_TAKEN);
    }

    let password_hash = try500!(
        Account::hash_password(&payload.password),
        "hashing a new password"
    );

    let inserted = {
        let mut conn = ctx.db_connection.lock().await;
        Account::insert(&mut conn, username, &password_hash).await
    };

    match inserted {
        Ok(id) => {
            log::debug!("registered account {username} with id {id}");
            Redirect::to("/login").into_response()
        }
        Err(err) => {
            // Also reached when someone else grabbed the username in the meanwhile.
            log::error!("error when inserting account {username}: {err:#}");
            failure(REGISTRATION_FAILED)
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct LoginQuery {
    next: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct Login {
    username: String,
    password: String,
    next: Option<String>,
}

pub(crate) async fn login_form(
    State(ctx): State<Arc<AppContext>>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<LoginQuery>,
) -> Response {
    let page = FormPage {
        message: None,
        next: query.next.as_deref().filter(|next| session::is_local_path(next)),
    };
    render_form(&ctx, user.as_ref(), "login.html", page, StatusCode::OK)
}

pub(crate) async fn login(
    State(ctx): State<Arc<AppContext>>,
    MaybeUser(user): MaybeUser,
    jar: SessionJar,
    Query(query): Query<LoginQuery>,
    Form(payload): Form<Login>,
) -> Response {
    // The form field wins over the query string.
    let next = payload
        .next
        .as_deref()
        .or(query.next.as_deref())
        .filter(|next| session::is_local_path(next));

    let account = {
        let mut conn = ctx.db_connection.lock().await;
        try500!(
            Account::by_username(&mut conn, payload.username.trim()).await,
            "looking up an account on login"
        )
    };

    let verified = match &account {
        Some(account) => account.check_password(&payload.password),
        None => Account::check_missing_password(&payload.password),
    };

    match account {
        Some(account) if verified => {
            log::debug!("account {} logged in", account.username);
            let jar = session::start(jar, account.id);
            (jar, Redirect::to(next.unwrap_or("/"))).into_response()
        }
        _ => {
            let page = FormPage {
                message: Some(BAD_CREDENTIALS),
                next,
            };
            render_form(&ctx, user.as_ref(), "login.html", page, StatusCode::OK)
        }
    }
}

pub(crate) async fn logout(RequireUser(user): RequireUser, jar: SessionJar) -> Response {
    log::debug!("account {} logged out", user.username);
    (session::end(jar), Redirect::to("/login")).into_response()
}
