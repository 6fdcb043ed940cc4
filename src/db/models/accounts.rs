use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
};
use sqlx::AnyConnection;
use std::sync::OnceLock;
use tracing as log;

const NOBODY_PASSWORD: &str = "nobody-has-this-password";

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

impl Account {
    /// Hashes a plain-text password with Argon2id and a fresh random salt, into a PHC string.
    pub fn hash_password(password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| anyhow::anyhow!("unable to hash password: {err}"))?;
        Ok(hash.to_string())
    }

    pub fn check_password(&self, password: &str) -> bool {
        let parsed = match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::error!("malformed password hash for account {}: {err}", self.id);
                return false;
            }
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Runs a full verification for a username that doesn't exist, so that unknown and known
    /// usernames take as long to refuse. Always false.
    pub fn check_missing_password(password: &str) -> bool {
        static NOBODY: OnceLock<Option<Account>> = OnceLock::new();

        let nobody = NOBODY.get_or_init(|| match Account::hash_password(NOBODY_PASSWORD) {
            Ok(password_hash) => Some(Account {
                id: 0,
                username: String::new(),
                password_hash,
            }),
            Err(err) => {
                log::error!("unable to prepare the missing account hash: {err:#}");
                None
            }
        });

        if let Some(nobody) = nobody {
            nobody.check_password(password);
        }
        false
    }

    pub async fn insert(
        conn: &mut AnyConnection,
        username: &str,
        password_hash: &str,
    ) -> anyhow::Result<i64> {
        let (id,) = sqlx::query_as::<_, (i64,)>(
            r#"
            INSERT INTO accounts (username, password_hash) VALUES ($1, $2) RETURNING id
        "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(conn)
        .await?;
        Ok(id)
    }

    pub async fn by_username(
        conn: &mut AnyConnection,
        username: &str,
    ) -> anyhow::Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, password_hash FROM accounts WHERE username = $1;
        "#,
        )
        .bind(username)
        .fetch_optional(conn)
        .await?;
        Ok(account)
    }

    pub async fn by_id(conn: &mut AnyConnection, id: i64) -> anyhow::Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, password_hash FROM accounts WHERE id = $1;
        "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(account)
    }
}
