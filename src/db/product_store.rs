//! Tabular product store
//!
//! Resolves product names discovered in the knowledge graph to their full
//! ingredient lists. Loaded once at startup and shared read-only.

use anyhow::Context;
use serde::Deserialize;
use sqlx::PgPool;
use std::collections::HashMap;
use std::path::Path;

use super::postgres::fetch_product_rows;

#[derive(Debug, Deserialize)]
struct ProductRow {
    title: String,
    #[serde(default)]
    composition_list_standard: Option<String>,
}

/// Product name -> ingredient list, exact-name lookup
#[derive(Debug, Clone, Default)]
pub struct ProductStore {
    products: HashMap<String, Vec<String>>,
}

impl ProductStore {
    /// Builds a store from `(title, ingredient cell)` rows
    ///
    /// Rows sharing a title overwrite earlier ones, so the last row wins.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        let mut products = HashMap::new();
        for (title, cell) in rows {
            let ingredients = cell
                .as_deref()
                .map(parse_ingredient_cell)
                .unwrap_or_default();
            products.insert(title, ingredients);
        }
        Self { products }
    }

    /// Loads the product table from a CSV file with `title` and
    /// `composition_list_standard` columns
    pub fn from_csv(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open product store: {}", path.display()))?;

        let mut rows = Vec::new();
        for (idx, record) in reader.deserialize::<ProductRow>().enumerate() {
            let row = record.with_context(|| format!("Failed to read product row {}", idx + 1))?;
            rows.push((row.title, row.composition_list_standard));
        }

        let store = Self::from_rows(rows);
        tracing::info!(
            path = %path.display(),
            products = store.len(),
            "Loaded product store from CSV"
        );
        Ok(store)
    }

    /// Loads the product table from Postgres
    pub async fn from_postgres(pool: &PgPool, table: &str) -> anyhow::Result<Self> {
        let rows = fetch_product_rows(pool, table).await?;
        let store = Self::from_rows(rows);
        tracing::info!(
            table = %table,
            products = store.len(),
            "Loaded product store from Postgres"
        );
        Ok(store)
    }

    /// Ingredients of `name`, or `None` if the store has no exact match
    pub fn ingredients(&self, name: &str) -> Option<&[String]> {
        self.products.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Parses an ingredient cell
///
/// Cells are either list literals (`['water', 'glycerin']`, `["water"]`) or
/// plain comma-separated text. Quoted list items keep their inner commas, so
/// `'1,2-hexanediol'` stays one ingredient.
pub fn parse_ingredient_cell(cell: &str) -> Vec<String> {
    let trimmed = cell.trim();
    match trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        Some(body) if body.contains(|c| c == '\'' || c == '"') => quoted_items(body),
        Some(body) => split_plain(body),
        None => split_plain(trimmed),
    }
}

fn split_plain(text: &str) -> Vec<String> {
    text.split(',')
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Items between matching quotes; anything outside quotes is a separator
fn quoted_items(body: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut open: Option<char> = None;

    let mut push = |current: &mut String| {
        let item = current.trim();
        if !item.is_empty() {
            items.push(item.to_string());
        }
        current.clear();
    };

    for c in body.chars() {
        match open {
            Some(quote) if c == quote => {
                open = None;
                push(&mut current);
            }
            Some(_) => current.push(c),
            None if c == '\'' || c == '"' => open = Some(c),
            None => {}
        }
    }
    // unterminated final item
    push(&mut current);

    items
}
