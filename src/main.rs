use anyhow::Context as _;
use axum::{routing::get, Router};
use axum_extra::extract::cookie::Key;
use sqlx::AnyConnection;
use std::{env, net::Ipv4Addr, path::PathBuf, sync::Arc};
use std::{net::SocketAddr, sync::RwLock};
use tokio::sync::Mutex;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing as log;

mod controllers;
mod db;
mod quiz;
mod session;
mod templates;

#[cfg(test)]
mod testing;

use controllers::{accounts, comments, pages, quiz as quiz_controller};

pub(crate) struct AppConfig {
    /// which port the app is listening on
    port: u16,

    /// which ipv4 interface the app is listening on
    interface_ipv4: Ipv4Addr,

    /// sqlx connection url, e.g. `sqlite://recycling.db?mode=rwc`
    database_url: String,

    /// Directory containing the Tera templates
    templates_dir: PathBuf,

    /// Directory containing the css and images, served under /static
    static_dir: PathBuf,

    /// Reload the templates when they change on disk
    watch_templates: bool,
}

pub(crate) struct AppContext {
    config: AppConfig,
    db_connection: Mutex<AnyConnection>,
    templates: RwLock<tera::Tera>,
    cookie_key: Key,
}

impl AppContext {
    async fn new(config: AppConfig, cookie_key: Key) -> anyhow::Result<Self> {
        let db_connection = db::open(&config.database_url).await?;
        let templates = templates::load(&config.templates_dir)?;
        Ok(Self {
            config,
            db_connection: Mutex::new(db_connection),
            templates: RwLock::new(templates),
            cookie_key,
        })
    }
}

fn parse_app_config() -> anyhow::Result<(AppConfig, Key)> {
    // override environment variables with contents of .env file, unless they were already set
    // explicitly.
    dotenvy::dotenv().ok();

    let port = env::var("PORT")
        .context("missing PORT variable")?
        .parse()
        .context("PORT isn't a u16 value")?;

    let interface_ipv4 = env::var("HOST")
        .context("missing HOST variable")?
        .parse()
        .context("HOST must be an ipv4 addr specification")?;

    let database_url = env::var("DATABASE_URL").context("missing DATABASE_URL variable")?;

    let secret_key = env::var("SECRET_KEY").context("missing SECRET_KEY variable")?;
    anyhow::ensure!(
        secret_key.len() >= 32,
        "SECRET_KEY must be at least 32 bytes long"
    );
    let cookie_key = Key::derive_from(secret_key.as_bytes());

    let templates_dir = env::var("TEMPLATES_DIR").unwrap_or_else(|_| "templates".to_owned());
    let templates_dir = PathBuf::from(templates_dir);
    anyhow::ensure!(
        templates_dir.is_dir(),
        "TEMPLATES_DIR {templates_dir:?} isn't a directory"
    );

    let static_dir = PathBuf::from(env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_owned()));

    let watch_templates = match env::var("WATCH_TEMPLATES") {
        Ok(val) => matches!(val.as_str(), "1" | "true"),
        Err(_) => false,
    };

    Ok((
        AppConfig {
            port,
            interface_ipv4,
            database_url,
            templates_dir,
            static_dir,
            watch_templates,
        },
        cookie_key,
    ))
}

pub(crate) fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/beneficios", get(pages::benefits))
        .route("/como_reciclar", get(pages::how_to_recycle))
        .route("/concepto_del_pet", get(pages::what_is_pet))
        .route("/importancia", get(pages::importance))
        .route("/objetivos", get(pages::goals))
        .route(
            "/encuesta",
            get(quiz_controller::form).post(quiz_controller::submit),
        )
        .route(
            "/registro",
            get(accounts::register_form).post(accounts::register),
        )
        .route("/login", get(accounts::login_form).post(accounts::login))
        .route("/logout", get(accounts::logout))
        .route("/comentario", get(comments::board).post(comments::create))
        .nest_service("/static", ServeDir::new(&ctx.config.static_dir))
        .fallback(pages::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn real_main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let (config, cookie_key) = parse_app_config()?;
    let ctx = Arc::new(AppContext::new(config, cookie_key).await?);

    let _watcher = if ctx.config.watch_templates {
        Some(templates::watch(ctx.clone())?)
    } else {
        None
    };

    let addr = SocketAddr::from((ctx.config.interface_ipv4, ctx.config.port));
    let app = router(ctx);

    log::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Since this function is under the tokio::main macro, rust-analyzer has issues with it. Put
    // the main in the real_main function instead.
    real_main().await
}
