use anyhow::Context as _;
use sqlx::{AnyConnection, Executor as _};
use tracing as log;

mod m1;

async fn read_latest_migration(conn: &mut AnyConnection) -> anyhow::Result<i64> {
    let version: Result<(i64,), _> = sqlx::query_as("SELECT version FROM migrations;")
        .fetch_one(&mut *conn)
        .await;

    let version = match version {
        Ok((version,)) => version,
        Err(err) => {
            log::debug!("error when reading latest migration version: {err}, attempting to create the migrations table...");

            create_migration_table(conn).await?;

            let version: (i64,) = sqlx::query_as("SELECT version FROM migrations;")
                .fetch_one(&mut *conn)
                .await?;

            version.0
        }
    };

    Ok(version)
}

async fn create_migration_table(conn: &mut AnyConnection) -> anyhow::Result<()> {
    conn.execute(
        r#"
        CREATE TABLE migrations (
            version INT
        );"#,
    )
    .await?;

    conn.execute("INSERT INTO migrations (version) VALUES (0);")
        .await?;

    Ok(())
}

async fn bump_version(conn: &mut AnyConnection, from: i64, to: i64) -> anyhow::Result<()> {
    sqlx::query("UPDATE migrations SET version = $1 WHERE version = $2;")
        .bind(to)
        .bind(from)
        .execute(conn)
        .await
        .with_context(|| format!("when upgrading db version number from {from} to {to}"))?;
    Ok(())
}

pub(super) async fn run_migrations(conn: &mut AnyConnection) -> anyhow::Result<()> {
    let version = read_latest_migration(conn).await?;
    if version < 1 {
        log::info!("running migration 1");
        m1::run(conn).await?;
        bump_version(conn, 0, 1).await?;
    }
    Ok(())
}
