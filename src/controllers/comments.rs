use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse as _, Redirect, Response},
    Form,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing as log;

use crate::{
    db::models::comments::Comment,
    session::{RequireUser, SessionUser},
    templates::{page_context_with, render},
    AppContext,
};

const EMPTY_COMMENT: &str = "El comentario no puede estar vacío.";

#[derive(Serialize)]
struct CommentCtx {
    author: String,
    date: String,
    body: String,
}

#[derive(Serialize)]
struct BoardPage {
    comments: Vec<CommentCtx>,
    message: Option<&'static str>,
}

async fn render_board(
    ctx: &AppContext,
    user: &SessionUser,
    message: Option<&'static str>,
    status: StatusCode,
) -> Response {
    let comments = {
        let mut conn = ctx.db_connection.lock().await;
        try500!(
            Comment::get_all_with_authors(&mut conn).await,
            "retrieving the list of comments"
        )
    };

    let comments = comments
        .into_iter()
        .map(|c| CommentCtx {
            date: c
                .date()
                .map(|date| date.format("%d/%m/%Y %H:%M").to_string())
                .unwrap_or_default(),
            author: c.author,
            body: c.body,
        })
        .collect();

    let page = try500!(
        page_context_with(Some(user), &BoardPage { comments, message }),
        "building the comment board context"
    );
    let page = try500!(
        render(ctx, "comentario.html", &page),
        "rendering the comment board"
    );
    (status, Html(page)).into_response()
}

pub(crate) async fn board(
    State(ctx): State<Arc<AppContext>>,
    RequireUser(user): RequireUser,
) -> Response {
    render_board(&ctx, &user, None, StatusCode::OK).await
}

#[derive(Deserialize)]
pub(crate) struct NewComment {
    body: String,
}

pub(crate) async fn create(
    State(ctx): State<Arc<AppContext>>,
    RequireUser(user): RequireUser,
    Form(payload): Form<NewComment>,
) -> Response {
    let body = payload.body.trim();
    if body.is_empty() {
        return render_board(&ctx, &user, Some(EMPTY_COMMENT), StatusCode::BAD_REQUEST).await;
    }

    let comment = Comment {
        body: body.to_owned(),
        date: Utc::now(),
        account_id: user.id,
    };

    let id = {
        let mut conn = ctx.db_connection.lock().await;
        try500!(
            Comment::insert(&mut conn, &comment).await,
            "inserting a new comment"
        )
    };
    log::debug!("account {} posted comment {id}", user.username);

    Redirect::to("/comentario").into_response()
}
