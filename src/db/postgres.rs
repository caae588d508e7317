use sqlx::{postgres::PgPoolOptions, PgPool};

/// Creates a PostgreSQL connection pool
///
/// Only used at startup to load the product table, so the pool is kept small.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Reads `(title, composition_list_standard)` rows in table order
pub async fn fetch_product_rows(
    pool: &PgPool,
    table: &str,
) -> anyhow::Result<Vec<(String, Option<String>)>> {
    if !table
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        anyhow::bail!("Invalid product table name: {}", table);
    }

    let query = format!(
        "SELECT title, composition_list_standard FROM {} ORDER BY ctid",
        table
    );
    let rows: Vec<(String, Option<String>)> = sqlx::query_as(&query).fetch_all(pool).await?;

    Ok(rows)
}
