//! Remote storefront cart API.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::StorefrontError;

mod client;
pub mod model;
mod queries;

pub use client::StorefrontClient;
pub use model::{Cart, CartId, CartLine, CartLineInput, CartLineUpdateInput};

/// Cart operations offered by the remote commerce platform.
///
/// The platform owns all cart state and business rules; implementations only forward requests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CartApi: Send + Sync {
    /// Create a cart, optionally seeded with lines.
    async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, StorefrontError>;

    /// Fetch a cart. `Ok(None)` means the platform no longer knows this id.
    async fn cart(&self, id: &CartId) -> Result<Option<Cart>, StorefrontError>;

    async fn add_lines(
        &self,
        id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, StorefrontError>;

    async fn update_lines(
        &self,
        id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, StorefrontError>;

    async fn remove_lines(&self, id: &CartId, line_ids: Vec<String>)
    -> Result<Cart, StorefrontError>;
}
