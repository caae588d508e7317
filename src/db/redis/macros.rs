/// Read-through caching over [`Cache`](crate::db::Cache).
///
/// Returns the cached value for `$key` when present. Otherwise awaits
/// `$block`, queues the result for a background write with `$ttl` seconds,
/// and returns it. A failed cache read is logged and treated as a miss;
/// errors from `$block` propagate with `?`.
///
/// ```rust,ignore
/// let catalog = cached!(cache, CacheKey::Catalog(code), ttl, async move {
///     fetch_catalog(code).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let lookup = $cache.get_from_cache(&$key).await;
        if let Err(e) = &lookup {
            tracing::warn!(key = %$key, error = %e, "Cache read failed, bypassing cache");
        }

        if let Ok(Some(cached)) = lookup {
            tracing::debug!(key = %$key, "Cache hit");
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
