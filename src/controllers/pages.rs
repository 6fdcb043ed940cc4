use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse as _, Response},
};

use crate::{
    session::MaybeUser,
    templates::{page_context, render},
    AppContext,
};

fn render_page(ctx: &AppContext, user: MaybeUser, template: &str, status: StatusCode) -> Response {
    let page = try500!(
        render(ctx, template, &page_context(user.0.as_ref())),
        "rendering an informational page"
    );
    (status, Html(page)).into_response()
}

pub(crate) async fn index(State(ctx): State<Arc<AppContext>>, user: MaybeUser) -> Response {
    render_page(&ctx, user, "index.html", StatusCode::OK)
}

pub(crate) async fn benefits(State(ctx): State<Arc<AppContext>>, user: MaybeUser) -> Response {
    render_page(&ctx, user, "beneficios.html", StatusCode::OK)
}

pub(crate) async fn how_to_recycle(
    State(ctx): State<Arc<AppContext>>,
    user: MaybeUser,
) -> Response {
    render_page(&ctx, user, "como_reciclar.html", StatusCode::OK)
}

pub(crate) async fn what_is_pet(State(ctx): State<Arc<AppContext>>, user: MaybeUser) -> Response {
    render_page(&ctx, user, "concepto_del_pet.html", StatusCode::OK)
}

pub(crate) async fn importance(State(ctx): State<Arc<AppContext>>, user: MaybeUser) -> Response {
    render_page(&ctx, user, "importancia.html", StatusCode::OK)
}

pub(crate) async fn goals(State(ctx): State<Arc<AppContext>>, user: MaybeUser) -> Response {
    render_page(&ctx, user, "objetivos.html", StatusCode::OK)
}

pub(crate) async fn not_found(State(ctx): State<Arc<AppContext>>, user: MaybeUser) -> Response {
    render_page(&ctx, user, "404.html", StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};
    use tower::ServiceExt as _;

    use crate::testing;

    #[tokio::test]
    async fn every_page_renders() -> anyhow::Result<()> {
        let app = testing::app().await?;

        for (uri, needle) in [
            ("/", "Reciclaje PET"),
            ("/beneficios", "Beneficios"),
            ("/como_reciclar", "Cómo reciclar"),
            ("/concepto_del_pet", "¿Qué es el PET?"),
            ("/importancia", "Importancia"),
            ("/objetivos", "Objetivos"),
        ] {
            let response = app.clone().oneshot(testing::get(uri, None)?).await?;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            let body = testing::body_string(response).await?;
            assert!(body.contains(needle), "{uri} should mention {needle}");
            assert!(body.contains("Iniciar sesión"), "{uri} is anonymous");
        }

        Ok(())
    }

    #[tokio::test]
    async fn layout_shows_the_logged_in_user() -> anyhow::Result<()> {
        let app = testing::app().await?;
        let cookie = testing::register_and_login(&app, "ana", "botella-pet").await?;

        let response = app.oneshot(testing::get("/", Some(cookie.as_str()))?).await?;
        let body = testing::body_string(response).await?;
        assert!(body.contains("ana"));
        assert!(body.contains("Cerrar sesión"));
        assert!(!body.contains("Iniciar sesión"));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_path_is_a_404_page() -> anyhow::Result<()> {
        let app = testing::app().await?;
        let response = app.oneshot(testing::get("/reciclaje", None)?).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = testing::body_string(response).await?;
        assert!(body.contains("Página no encontrada"));
        Ok(())
    }

    #[tokio::test]
    async fn stylesheet_is_served() -> anyhow::Result<()> {
        let app = testing::app().await?;
        let response = app
            .clone()
            .oneshot(testing::get("/static/css/style.css", None)?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.starts_with("text/css"));
        let body = testing::body_string(response).await?;
        assert!(body.contains(".comments"));

        let response = app
            .oneshot(testing::get("/static/css/missing.css", None)?)
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn forged_session_cookie_is_anonymous() -> anyhow::Result<()> {
        let app = testing::app().await?;
        testing::register_and_login(&app, "ana", "botella-pet").await?;

        let response = app.oneshot(testing::get("/", Some("session=1"))?).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body = testing::body_string(response).await?;
        assert!(body.contains("Iniciar sesión"));
        Ok(())
    }
}
