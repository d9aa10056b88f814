use anyhow::Context;
use sqlx::SqlitePool;
use std::fs;

use crate::models::Operator;
use crate::routes::export::ExportData;
use crate::store::TagStore;
use crate::suggest::{rank_similar_tags, SuggestOptions};

pub async fn create_operator(pool: &SqlitePool, name: &str, email: Option<&str>) -> anyhow::Result<Operator> {
    let operator = Operator::new(name.to_string(), email.map(str::to_string));

    sqlx::query(
        "INSERT INTO operators (id, name, email, access_code, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)"
    )
    .bind(&operator.id)
    .bind(&operator.name)
    .bind(&operator.email)
    .bind(&operator.access_code)
    .bind(&operator.created_at)
    .bind(&operator.updated_at)
    .execute(pool)
    .await?;

    println!("Created operator:");
    println!("  ID: {}", operator.id);
    println!("  Name: {}", operator.name);
    println!("  Access Code: {}", operator.access_code);

    Ok(operator)
}

/// Load a file written by `/export` into the tag table.
pub async fn import_tags(store: &TagStore, file_path: &str) -> anyhow::Result<usize> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("reading {file_path}"))?;
    let data: ExportData = serde_json::from_str(&content)
        .with_context(|| format!("parsing {file_path}"))?;

    let imported = store.import(&data.tags).await?;
    println!("Imported {} of {} tags", imported, data.tags.len());

    Ok(imported)
}

pub async fn print_suggestions(store: &TagStore, candidate: &str, options: &SuggestOptions) -> anyhow::Result<()> {
    let snapshot = store.list(None).await?;
    let suggestions = rank_similar_tags(candidate, &snapshot, options);

    if suggestions.is_empty() {
        println!("No similar tags for {candidate:?}");
        return Ok(());
    }

    for s in suggestions {
        println!("{:>2}  {} ({}, used {}x)", s.distance, s.tag.name, s.tag.slug, s.tag.count);
    }
    Ok(())
}
