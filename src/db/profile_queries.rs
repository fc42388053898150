use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::models::profile::Profile;

fn profile_from_row(row: &PgRow) -> Result<Profile, sqlx::Error> {
    Ok(Profile {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        is_admin: row.try_get("is_admin")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Create an account. Emails are stored lowercased and unique.
pub async fn create_profile(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
) -> Result<Profile, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO profiles (email, password_hash, is_admin)
        VALUES (LOWER($1), $2, FALSE)
        RETURNING id, email, password_hash, is_admin, created_at
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    profile_from_row(&row)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Profile>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, email, password_hash, is_admin, created_at
        FROM profiles
        WHERE email = LOWER($1)
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(profile_from_row).transpose()
}
