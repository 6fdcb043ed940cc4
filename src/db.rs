use anyhow::Context as _;
use sqlx::{AnyConnection, Connection};

mod migrations;

pub mod models {
    pub mod accounts;
    pub mod comments;
}

pub async fn open(url: &str) -> anyhow::Result<AnyConnection> {
    let mut conn = AnyConnection::connect(url)
        .await
        .context("when opening database")?;

    migrations::run_migrations(&mut conn)
        .await
        .context("when running migrations")?;

    Ok(conn)
}
