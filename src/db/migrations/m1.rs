use sqlx::{AnyConnection, Executor as _};

/// Migration 1: accounts and the comments they own.
pub(super) async fn run(conn: &mut AnyConnection) -> anyhow::Result<()> {
    conn.execute(
        r#"
            CREATE TABLE accounts (
                id INTEGER PRIMARY KEY,
                username VARCHAR(100) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL
            );
        "#,
    )
    .await?;

    conn.execute(
        r#"
            CREATE TABLE comments (
                id INTEGER PRIMARY KEY,
                body TEXT NOT NULL,
                date INTEGER NOT NULL,
                account_id INTEGER NOT NULL,
                FOREIGN KEY (account_id) REFERENCES accounts(id)
            );
        "#,
    )
    .await?;

    Ok(())
}
