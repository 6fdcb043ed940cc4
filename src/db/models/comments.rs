use chrono::{DateTime, Utc};
use sqlx::AnyConnection;

#[derive(Debug)]
pub struct Comment {
    pub body: String,
    pub date: DateTime<Utc>,
    pub account_id: i64,
}

/// A comment joined with the username of the account that wrote it.
#[derive(Debug, sqlx::FromRow)]
pub struct CommentWithAuthor {
    pub body: String,
    /// Seconds since the Unix epoch.
    pub date: i64,
    pub author: String,
}

impl CommentWithAuthor {
    pub fn date(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.date, 0)
    }
}

impl Comment {
    pub async fn insert(conn: &mut AnyConnection, c: &Comment) -> anyhow::Result<i64> {
        let (id,) = sqlx::query_as::<_, (i64,)>(
            r#"
            INSERT INTO comments (body, date, account_id) VALUES ($1, $2, $3) RETURNING id
        "#,
        )
        .bind(&c.body)
        .bind(c.date.timestamp())
        .bind(c.account_id)
        .fetch_one(conn)
        .await?;
        Ok(id)
    }

    /// All the comments, in creation order.
    pub async fn get_all_with_authors(
        conn: &mut AnyConnection,
    ) -> anyhow::Result<Vec<CommentWithAuthor>> {
        let comments = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.body, c.date, a.username AS author
            FROM comments AS c
            JOIN accounts AS a ON a.id == c.account_id
            ORDER BY c.id;
        "#,
        )
        .fetch_all(conn)
        .await?;
        Ok(comments)
    }
}
