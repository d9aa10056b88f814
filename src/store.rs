use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::error::AppError;
use crate::models::tag::validate_tag_fields;
use crate::models::{NewTag, Tag, TagUpdate};
use crate::suggest::{suggest_similar_tags, SuggestOptions};

/// Owner of the tag table. Every tag mutation goes through here.
#[derive(Clone)]
pub struct TagStore {
    db: SqlitePool,
    max_name_len: usize,
}

impl TagStore {
    pub fn new(db: SqlitePool, max_name_len: usize) -> Self {
        Self { db, max_name_len }
    }

    pub fn max_name_len(&self) -> usize {
        self.max_name_len
    }

    /// All tags by name, optionally restricted to names containing `query`.
    pub async fn list(&self, query: Option<&str>) -> Result<Vec<Tag>, AppError> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());

        let tags = sqlx::query_as(
            r#"
            SELECT * FROM tags
            WHERE ? IS NULL OR instr(lower(name), lower(?)) > 0
            ORDER BY name COLLATE NOCASE ASC
            "#,
        )
        .bind(query)
        .bind(query)
        .fetch_all(&self.db)
        .await?;

        Ok(tags)
    }

    /// Most used tags first. Unused tags are left out.
    pub async fn popular(&self, limit: i64) -> Result<Vec<Tag>, AppError> {
        let tags = sqlx::query_as(
            "SELECT * FROM tags WHERE count > 0 ORDER BY count DESC, name COLLATE NOCASE ASC LIMIT ?",
        )
        .bind(limit.max(0))
        .fetch_all(&self.db)
        .await?;

        Ok(tags)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Tag>, AppError> {
        let tag = sqlx::query_as("SELECT * FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(tag)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>, AppError> {
        let tag = sqlx::query_as("SELECT * FROM tags WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.db)
            .await?;
        Ok(tag)
    }

    pub async fn add(&self, new: NewTag) -> Result<Tag, AppError> {
        check(validate_tag_fields(
            &new.name,
            new.slug.as_deref(),
            new.color.as_deref(),
            self.max_name_len,
        ))?;

        let tag = Tag::new(new);

        sqlx::query(
            r#"
            INSERT INTO tags (id, name, slug, count, color, description, featured, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tag.id)
        .bind(&tag.name)
        .bind(&tag.slug)
        .bind(tag.count)
        .bind(&tag.color)
        .bind(&tag.description)
        .bind(tag.featured)
        .bind(&tag.created_at)
        .bind(&tag.updated_at)
        .execute(&self.db)
        .await?;

        tracing::info!(tag_id = %tag.id, slug = %tag.slug, "created tag");
        Ok(tag)
    }

    pub async fn update(&self, id: &str, update: TagUpdate) -> Result<Tag, AppError> {
        let Some(mut tag) = self.get(id).await? else {
            return Err(AppError::NotFound);
        };

        check(validate_tag_fields(
            &update.name,
            update.slug.as_deref(),
            update.color.as_deref(),
            self.max_name_len,
        ))?;

        tag.apply(update);

        sqlx::query(
            r#"
            UPDATE tags
            SET name = ?, slug = ?, color = ?, description = ?, featured = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&tag.name)
        .bind(&tag.slug)
        .bind(&tag.color)
        .bind(&tag.description)
        .bind(tag.featured)
        .bind(&tag.updated_at)
        .bind(&tag.id)
        .execute(&self.db)
        .await?;

        tracing::info!(tag_id = %tag.id, slug = %tag.slug, "updated tag");
        Ok(tag)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        tracing::info!(tag_id = %id, "deleted tag");
        Ok(())
    }

    /// Fold the usage counts of `source_ids` into `target_id` and remove the
    /// sources. Either every source is merged or nothing changes.
    pub async fn merge(&self, target_id: &str, source_ids: &[String]) -> Result<Tag, AppError> {
        let mut sources: Vec<&str> = Vec::new();
        for id in source_ids.iter().map(String::as_str) {
            if id != target_id && !sources.contains(&id) {
                sources.push(id);
            }
        }

        if sources.is_empty() {
            return Err(AppError::Validation(
                "Select at least one other tag to merge".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        let target: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE id = ?")
            .bind(target_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(mut target) = target else {
            return Err(AppError::NotFound);
        };

        let mut folded: i64 = 0;
        for id in &sources {
            let count: Option<(i64,)> = sqlx::query_as("SELECT count FROM tags WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
            let Some((count,)) = count else {
                // dropping tx rolls back the deletes done so far
                return Err(AppError::NotFound);
            };
            folded = folded.checked_add(count).ok_or_else(count_overflow)?;

            sqlx::query("DELETE FROM tags WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        target.count = target.count.checked_add(folded).ok_or_else(count_overflow)?;
        target.updated_at = chrono::Utc::now().to_rfc3339();

        sqlx::query("UPDATE tags SET count = ?, updated_at = ? WHERE id = ?")
            .bind(target.count)
            .bind(&target.updated_at)
            .bind(&target.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            tag_id = %target.id,
            merged = sources.len(),
            count = target.count,
            "merged tags"
        );
        Ok(target)
    }

    /// Restore previously exported tags, keeping their ids and counts.
    /// Records whose id or slug already exists are skipped.
    pub async fn import(&self, tags: &[Tag]) -> Result<usize, AppError> {
        let mut imported = 0;
        let mut tx = self.db.begin().await?;

        for tag in tags {
            let errors = validate_tag_fields(
                &tag.name,
                Some(tag.slug.as_str()),
                tag.color.as_deref(),
                self.max_name_len,
            );
            if let Err(AppError::Validation(reason)) = check(errors) {
                tracing::warn!(tag_id = %tag.id, %reason, "skipping invalid tag");
                continue;
            }
            let slug = crate::models::tag::resolve_slug(&tag.name, Some(tag.slug.as_str()));

            let result = sqlx::query(
                r#"
                INSERT OR IGNORE INTO tags (id, name, slug, count, color, description, featured, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&tag.id)
            .bind(tag.name.trim())
            .bind(&slug)
            .bind(tag.count.max(0))
            .bind(&tag.color)
            .bind(&tag.description)
            .bind(tag.featured)
            .bind(&tag.created_at)
            .bind(&tag.updated_at)
            .execute(&mut *tx)
            .await?;

            imported += result.rows_affected() as usize;
        }

        tx.commit().await?;
        tracing::info!(imported, total = tags.len(), "imported tags");
        Ok(imported)
    }

    /// Existing tags that look like near-duplicates of `candidate`.
    pub async fn suggest(&self, candidate: &str, options: &SuggestOptions) -> Result<Vec<Tag>, AppError> {
        let snapshot = self.list(None).await?;
        Ok(suggest_similar_tags(candidate, &snapshot, options))
    }
}

fn count_overflow() -> AppError {
    AppError::Validation("Merged usage count is too large".to_string())
}

fn check(errors: HashMap<String, String>) -> Result<(), AppError> {
    if errors.is_empty() {
        return Ok(());
    }
    let mut messages: Vec<String> = errors.into_values().collect();
    messages.sort();
    Err(AppError::Validation(messages.join("; ")))
}
