// Catalog CRUD against the relational store.
//
// Category create/delete run in explicit transactions so their two
// steps cannot interleave with other writers. The view counter is
// bumped with a single atomic UPDATE, so concurrent viewers cannot
// lose increments.

use sqlx::SqlitePool;
use crate::models::{Presentation, User};
use crate::types::{ApiError, AppResult};
use chrono::Utc;

pub struct DatabaseOperations;

impl DatabaseOperations {
    // User operations

    pub async fn get_or_create_user(pool: &SqlitePool, email: &str) -> AppResult<User> {
        sqlx::query("INSERT INTO users (email) VALUES (?1) ON CONFLICT (email) DO NOTHING")
            .bind(email)
            .execute(pool)
            .await?;

        let user = sqlx::query_as::<_, User>("SELECT id, email FROM users WHERE email = ?1")
            .bind(email)
            .fetch_one(pool)
            .await?;

        Ok(user)
    }

    // Presentation operations

    pub async fn create_presentation(
        pool: &SqlitePool,
        title: &str,
        category: &str,
        file_path: &str,
    ) -> AppResult<Presentation> {
        let presentation = sqlx::query_as::<_, Presentation>(
            r#"
            INSERT INTO presentations (title, category, upload_date, views, file_path)
            VALUES (?1, ?2, ?3, 0, ?4)
            RETURNING id, title, category, upload_date, views, file_path
            "#,
        )
        .bind(title)
        .bind(category)
        .bind(Utc::now())
        .bind(file_path)
        .fetch_one(pool)
        .await?;

        Ok(presentation)
    }

    /// Rows whose title contains the filter substring, matched
    /// case-insensitively; an empty filter returns everything. Ordered
    /// by id so a response is stable.
    pub async fn list_presentations(
        pool: &SqlitePool,
        title_filter: &str,
    ) -> AppResult<Vec<Presentation>> {
        let rows = sqlx::query_as::<_, Presentation>(
            r#"
            SELECT id, title, category, upload_date, views, file_path
            FROM presentations
            WHERE title LIKE ?1
            ORDER BY id
            "#,
        )
        .bind(format!("%{}%", title_filter))
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_presentation(pool: &SqlitePool, id: i64) -> AppResult<Presentation> {
        sqlx::query_as::<_, Presentation>(
            "SELECT id, title, category, upload_date, views, file_path FROM presentations WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound("Presentation"))
    }

    /// Bumps the view counter and returns the updated row. A single
    /// statement, so two concurrent views both land.
    pub async fn record_view(pool: &SqlitePool, id: i64) -> AppResult<Presentation> {
        sqlx::query_as::<_, Presentation>(
            r#"
            UPDATE presentations
            SET views = views + 1
            WHERE id = ?1
            RETURNING id, title, category, upload_date, views, file_path
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound("Presentation"))
    }

    /// Relabels one presentation. Last write wins under concurrency.
    pub async fn assign_category(pool: &SqlitePool, id: i64, category: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE presentations SET category = ?1 WHERE id = ?2")
            .bind(category)
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Presentation"));
        }

        Ok(())
    }

    pub async fn unassign_category(pool: &SqlitePool, id: i64) -> AppResult<()> {
        Self::assign_category(pool, id, "").await
    }

    // Category operations

    /// Stored category names unioned with the distinct non-empty labels
    /// presentations carry, deduplicated and sorted.
    pub async fn list_categories(pool: &SqlitePool) -> AppResult<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT name FROM categories
            UNION
            SELECT category FROM presentations WHERE category != ''
            ORDER BY name
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(names)
    }

    pub async fn create_category(pool: &SqlitePool, name: &str) -> AppResult<()> {
        let mut tx = pool.begin().await?;

        let labeled: Option<i64> =
            sqlx::query_scalar("SELECT id FROM presentations WHERE category = ?1 LIMIT 1")
                .bind(name)
                .fetch_optional(&mut *tx)
                .await?;
        if labeled.is_some() {
            return Err(ApiError::AlreadyExists);
        }

        // Losing an insert race reads back as zero rows, same as an
        // existing row.
        let inserted =
            sqlx::query("INSERT INTO categories (name) VALUES (?1) ON CONFLICT (name) DO NOTHING")
                .bind(name)
                .execute(&mut *tx)
                .await?;
        if inserted.rows_affected() == 0 {
            return Err(ApiError::AlreadyExists);
        }

        tx.commit().await?;
        Ok(())
    }

    /// Removes the stored category and clears the label from every
    /// presentation carrying it, in one transaction. Presentations
    /// themselves are never deleted. Returns how many were unassigned.
    pub async fn delete_category(pool: &SqlitePool, name: &str) -> AppResult<u64> {
        let mut tx = pool.begin().await?;

        let removed = sqlx::query("DELETE FROM categories WHERE name = ?1")
            .bind(name)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let unassigned = sqlx::query("UPDATE presentations SET category = '' WHERE category = ?1")
            .bind(name)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 && unassigned == 0 {
            return Err(ApiError::NotFound("Category"));
        }

        tx.commit().await?;
        Ok(unassigned)
    }
}
