//! Query cache for backend reads.
//!
//! Reads of products, the cart, the profile and orders go through a
//! `moka` cache. Concurrent loads of the same key are deduplicated (one
//! request, every caller gets its result). Mutations invalidate the keys
//! they affect; logout clears everything.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use shopfront_core::{Address, Cart, Order, OrderList, OrderTracking, Product, ProductList, User};
use tracing::{debug, warn};

use crate::api::ApiError;

/// Cache key for backend reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum QueryKey {
    Products { page: u32, page_size: u32 },
    Product(String),
    Cart,
    Me,
    Addresses,
    Orders { page: u32, page_size: u32 },
    Order(String),
    Tracking(String),
}

impl QueryKey {
    /// Whether this key holds per-user data that must not outlive a session.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        !matches!(self, Self::Products { .. } | Self::Product(_))
    }

    const fn is_order(&self) -> bool {
        matches!(
            self,
            Self::Orders { .. } | Self::Order(_) | Self::Tracking(_)
        )
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum QueryValue {
    Products(Arc<ProductList>),
    Product(Arc<Product>),
    Cart(Arc<Cart>),
    Me(Arc<User>),
    Addresses(Arc<Vec<Address>>),
    Orders(Arc<OrderList>),
    Order(Arc<Order>),
    Tracking(Arc<OrderTracking>),
}

/// A type that can be stored in the [`QueryCache`].
pub trait CachedQuery: Sized + Clone {
    fn into_value(self) -> QueryValue;
    fn from_value(value: QueryValue) -> Option<Self>;
}

macro_rules! cached_query {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        $(
            impl CachedQuery for $ty {
                fn into_value(self) -> QueryValue {
                    QueryValue::$variant(Arc::new(self))
                }

                fn from_value(value: QueryValue) -> Option<Self> {
                    match value {
                        QueryValue::$variant(v) => Some(Arc::unwrap_or_clone(v)),
                        _ => None,
                    }
                }
            }
        )+
    };
}

cached_query! {
    Products => ProductList,
    Product => Product,
    Cart => Cart,
    Me => User,
    Addresses => Vec<Address>,
    Orders => OrderList,
    Order => Order,
    Tracking => OrderTracking,
}

/// TTL cache with request deduplication.
#[derive(Clone)]
pub struct QueryCache {
    cache: Cache<QueryKey, QueryValue>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl QueryCache {
    /// Create a cache whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .support_invalidation_closures()
            .build();
        Self { cache }
    }

    /// Return the cached value for `key`, or run `load` to fetch it.
    ///
    /// Callers racing on the same key share one `load`. Errors are not
    /// cached.
    ///
    /// # Errors
    ///
    /// Returns the loader's error, shared between all waiters.
    pub async fn get_with<T, F, Fut>(&self, key: QueryKey, load: F) -> Result<T, Arc<ApiError>>
    where
        T: CachedQuery,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let value = self
            .cache
            .try_get_with(key.clone(), async { load().await.map(T::into_value) })
            .await?;

        if let Some(hit) = T::from_value(value) {
            return Ok(hit);
        }

        // A key is only ever filled with one type; a mismatch means a bug.
        warn!(?key, "Cached value has unexpected type, reloading");
        self.cache.invalidate(&key).await;
        load().await.map_err(Arc::new)
    }

    /// Store a value fetched outside [`QueryCache::get_with`].
    pub async fn put<T: CachedQuery>(&self, key: QueryKey, value: T) {
        self.cache.insert(key, value.into_value()).await;
    }

    /// Drop one key.
    pub async fn invalidate(&self, key: &QueryKey) {
        debug!(?key, "Invalidating cached query");
        self.cache.invalidate(key).await;
    }

    /// Drop the order list, every order and every tracking entry.
    pub fn invalidate_orders(&self) {
        self.invalidate_where(QueryKey::is_order);
    }

    /// Drop every per-user entry, keeping the public catalogue.
    pub fn invalidate_private(&self) {
        self.invalidate_where(QueryKey::is_private);
    }

    /// Drop everything.
    pub fn clear(&self) {
        debug!("Clearing query cache");
        self.cache.invalidate_all();
    }

    fn invalidate_where(&self, predicate: fn(&QueryKey) -> bool) {
        if let Err(e) = self
            .cache
            .invalidate_entries_if(move |key, _| predicate(key))
        {
            warn!(error = %e, "Predicate invalidation unavailable, clearing cache");
            self.cache.invalidate_all();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rust_decimal::Decimal;

    use super::*;

    fn cache() -> QueryCache {
        QueryCache::new(Duration::from_secs(300))
    }

    #[tokio::test]
    async fn test_second_read_is_cached() {
        let cache = cache();
        let calls = &AtomicUsize::new(0);
        let load = || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Cart::empty())
        };

        cache.get_with(QueryKey::Cart, load).await.unwrap();
        cache.get_with(QueryKey::Cart, load).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_one_load() {
        let cache = cache();
        let calls = &AtomicUsize::new(0);
        let load = || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(Cart::empty())
        };

        let (a, b) = tokio::join!(
            cache.get_with(QueryKey::Cart, load),
            cache.get_with(QueryKey::Cart, load)
        );
        a.unwrap();
        b.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = cache();
        let calls = &AtomicUsize::new(0);
        let failing = || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<Cart, _>(ApiError::Status {
                status: 503,
                message: String::new(),
            })
        };

        assert!(cache.get_with(QueryKey::Cart, failing).await.is_err());
        assert!(cache.get_with(QueryKey::Cart, failing).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let cache = cache();
        let calls = &AtomicUsize::new(0);
        let load = || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Cart {
                items: Vec::new(),
                subtotal: Decimal::ONE,
                item_count: 0,
            })
        };

        cache.get_with(QueryKey::Cart, load).await.unwrap();
        cache.invalidate(&QueryKey::Cart).await;
        cache.get_with(QueryKey::Cart, load).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clear_forces_reload() {
        let cache = cache();
        let calls = &AtomicUsize::new(0);
        let load = || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::<Address>::new())
        };

        cache.get_with(QueryKey::Addresses, load).await.unwrap();
        cache.clear();
        cache.get_with(QueryKey::Addresses, load).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_key_privacy() {
        assert!(QueryKey::Cart.is_private());
        assert!(QueryKey::Order("ORD1".to_string()).is_private());
        assert!(!QueryKey::Product("oil".to_string()).is_private());
    }
}
