use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::State,
    response::{Html, IntoResponse as _, Response},
    Form,
};
use serde::Serialize;
use tracing as log;

use crate::{
    quiz::{self, Question, Score, QUESTIONS},
    session::MaybeUser,
    templates::{page_context_with, render},
    AppContext,
};

#[derive(Serialize)]
struct QuizPage {
    questions: &'static [Question],
}

#[derive(Serialize)]
struct ResultPage {
    score: Score,
}

pub(crate) async fn form(State(ctx): State<Arc<AppContext>>, MaybeUser(user): MaybeUser) -> Response {
    let page = try500!(
        page_context_with(user.as_ref(), &QuizPage { questions: &QUESTIONS }),
        "building the quiz context"
    );
    let page = try500!(render(&ctx, "encuesta.html", &page), "rendering the quiz");
    Html(page).into_response()
}

pub(crate) async fn submit(
    State(ctx): State<Arc<AppContext>>,
    MaybeUser(user): MaybeUser,
    Form(answers): Form<HashMap<String, String>>,
) -> Response {
    let score = quiz::score(&QUESTIONS, &answers);
    log::debug!("quiz submitted: {}/{}", score.points, score.max_points);

    let page = try500!(
        page_context_with(user.as_ref(), &ResultPage { score }),
        "building the quiz result context"
    );
    let page = try500!(
        render(&ctx, "resultado.html", &page),
        "rendering the quiz result"
    );
    Html(page).into_response()
}
