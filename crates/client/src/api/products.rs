//! Catalogue endpoints. Public, no token required.

use reqwest::Method;
use shopfront_core::{Product, ProductList};
use tracing::instrument;

use super::{ApiClient, ApiError};

/// Largest page the backend serves.
pub const MAX_PAGE_SIZE: u32 = 50;

impl ApiClient {
    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get one page of active products, newest first.
    ///
    /// `page` starts at 1; `page_size` is clamped to `1..=50`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, page: u32, page_size: u32) -> Result<ProductList, ApiError> {
        let query = [
            ("page", page.max(1).to_string()),
            ("page_size", page_size.clamp(1, MAX_PAGE_SIZE).to_string()),
        ];
        self.public_query("products", &query).await
    }

    /// Get a product by id or slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id_or_slug: &str) -> Result<Product, ApiError> {
        let path = format!("products/{}", encode_segment(id_or_slug));
        self.public::<_, ()>(Method::GET, &path, None).await
    }
}

/// Percent-encode a single path segment.
pub(super) fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
