pub mod postgres;
pub mod product_store;
pub mod redis;

pub use self::postgres::create_pool;
pub use self::product_store::ProductStore;
pub use self::redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
